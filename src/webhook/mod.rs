//! Webhook dispatch for Feed Courier.
//!
//! Sends a formatted digest to every configured endpoint concurrently.
//! Endpoint sends are independent: one failing endpoint never prevents the
//! others from being attempted. There is no retry; a failed send is
//! terminal for that occasion.

use std::time::Duration;

use futures::future::join_all;
use reqwest::Client;
use serde::Serialize;
use tracing::{error, info};

use crate::config::WebhookConfig;
use crate::digest::DigestMessage;
use crate::{CourierError, Result};

/// Display name used for outbound webhook messages.
const SENDER_NAME: &str = "Feed Courier";

#[derive(Serialize)]
struct EmbedFooter<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct Embed<'a> {
    title: &'a str,
    color: u32,
    description: &'a str,
    footer: EmbedFooter<'a>,
}

#[derive(Serialize)]
struct WebhookPayload<'a> {
    username: &'static str,
    embeds: Vec<Embed<'a>>,
}

impl<'a> WebhookPayload<'a> {
    fn from_message(message: &'a DigestMessage) -> Self {
        Self {
            username: SENDER_NAME,
            embeds: vec![Embed {
                title: &message.title,
                color: message.color.code(),
                description: &message.body,
                footer: EmbedFooter {
                    text: &message.footer,
                },
            }],
        }
    }
}

/// Dispatches digests to the configured webhook endpoints.
#[derive(Clone)]
pub struct WebhookDispatcher {
    endpoints: Vec<String>,
    client: Client,
    timeout: Duration,
}

impl WebhookDispatcher {
    /// Build a dispatcher from the webhook configuration. The URL list is
    /// comma-separated; blank items are skipped.
    pub fn from_config(config: &WebhookConfig) -> Self {
        let endpoints = config
            .urls
            .split(',')
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map(str::to_string)
            .collect();
        Self {
            endpoints,
            client: Client::new(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    /// The configured endpoints.
    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }

    /// Send the digest to every endpoint concurrently and await them all.
    ///
    /// Per-endpoint failures are logged; the first one is surfaced as the
    /// aggregate error after all sends have completed.
    pub async fn send(&self, message: &DigestMessage) -> Result<()> {
        let payload = WebhookPayload::from_message(message);

        let sends = self
            .endpoints
            .iter()
            .map(|url| self.send_one(url, &payload));
        let results = join_all(sends).await;

        let mut first_error = None;
        for (url, result) in self.endpoints.iter().zip(results) {
            match result {
                Ok(()) => info!("Sent webhook to {url}"),
                Err(e) => {
                    error!("Could not send webhook to {url}: {e}");
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        match first_error {
            None => Ok(()),
            Some(e) => Err(e),
        }
    }

    async fn send_one(&self, url: &str, payload: &WebhookPayload<'_>) -> Result<()> {
        let response = self
            .client
            .post(url)
            .timeout(self.timeout)
            .json(payload)
            .send()
            .await
            .map_err(|e| CourierError::Dispatch(format!("request failed: {e}")))?;

        response
            .error_for_status()
            .map_err(|e| CourierError::Dispatch(format!("endpoint returned error: {e}")))?;
        Ok(())
    }
}
