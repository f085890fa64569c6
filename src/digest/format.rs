//! Digest message formatting for Feed Courier.
//!
//! Turns the ordered entries of a bucket into the final outbound message.
//! Output is fully deterministic for a given entry sequence and label.

use serde::Serialize;

use crate::config::{DigestConfig, PeriodMode};
use crate::digest::entry::FeedEntry;

/// Title used when a bucket is empty or was never touched.
const EMPTY_TITLE: &str = "Nothing to report! Sorry! 😅";
/// Filler body for an empty digest.
const EMPTY_BODY: &str = "No feed entries made it in this time.";
/// Footer for an empty digest.
const EMPTY_FOOTER: &str = "Disclaimer: It's possible I missed some submissions. Oops.";
/// Footer for a non-empty digest.
const FOOTER: &str = "Disclaimer: This is not sorted in any particular order of interest.";
/// Remark appended when a daily digest falls short of the expected count.
const TOO_FEW_REMARK: &str = "A slow one today. Didn't even hit the usual count! 🙄";
/// Remark appended when a daily digest exceeds the expected count.
const TOO_MANY_REMARK: &str = "Sorry for the amount! Just a few more!";
/// Remark appended when a weekly digest exceeds the weekly maximum.
const WEEKLY_TOO_MANY_REMARK: &str = "Big week! Apologies for the wall of links.";

/// Color tag of an outbound digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestColor {
    /// Regular digest with content.
    Normal,
    /// Warning tone, used for empty digests.
    Alert,
}

impl DigestColor {
    /// Numeric color code for embed payloads.
    pub fn code(&self) -> u32 {
        match self {
            DigestColor::Normal => 0x5865F2,
            DigestColor::Alert => 0xED4245,
        }
    }
}

/// A fully formatted digest, ready for dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DigestMessage {
    /// Message title.
    pub title: String,
    /// Color tag.
    pub color: DigestColor,
    /// Message body (possibly multi-paragraph).
    pub body: String,
    /// Fixed footer disclaimer.
    pub footer: String,
}

/// Formats bucket entries into digest messages.
#[derive(Debug, Clone)]
pub struct DigestFormatter {
    mode: PeriodMode,
    expected_count: usize,
    weekly_max: usize,
}

impl DigestFormatter {
    /// Build a formatter from the digest configuration.
    pub fn from_config(config: &DigestConfig) -> Self {
        Self {
            mode: config.mode,
            expected_count: config.expected_count,
            weekly_max: config.weekly_max,
        }
    }

    /// Format the ordered entries of a bucket into the outbound message.
    ///
    /// An empty sequence produces the fixed "nothing to report" message.
    /// Otherwise entries are enumerated 1-indexed in arrival order, with a
    /// count-threshold remark appended when the bucket is unusually small
    /// or large.
    pub fn format(&self, entries: &[FeedEntry], label: &str) -> DigestMessage {
        if entries.is_empty() {
            return DigestMessage {
                title: EMPTY_TITLE.to_string(),
                color: DigestColor::Alert,
                body: EMPTY_BODY.to_string(),
                footer: EMPTY_FOOTER.to_string(),
            };
        }

        let mut body = String::new();
        for (index, entry) in entries.iter().enumerate() {
            body.push_str(&format!(
                "**{}.** _{}_: {}\n",
                index + 1,
                entry.title,
                entry.link
            ));
            body.push_str(&format!("_Feed:_ `{}`\n", entry.feed));
        }

        if let Some(remark) = self.remark(entries.len()) {
            body.push('\n');
            body.push_str(remark);
            body.push('\n');
        }

        DigestMessage {
            title: format!("Posts for {label}"),
            color: DigestColor::Normal,
            body: body.trim_end().to_string(),
            footer: FOOTER.to_string(),
        }
    }

    /// Count-threshold commentary, if any.
    fn remark(&self, count: usize) -> Option<&'static str> {
        match self.mode {
            PeriodMode::Daily => {
                if count < self.expected_count {
                    Some(TOO_FEW_REMARK)
                } else if count > self.expected_count {
                    Some(TOO_MANY_REMARK)
                } else {
                    None
                }
            }
            PeriodMode::Weekly => {
                if count > self.weekly_max {
                    Some(WEEKLY_TOO_MANY_REMARK)
                } else {
                    None
                }
            }
        }
    }
}
