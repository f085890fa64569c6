//! Bucket resolution for Feed Courier.
//!
//! Maps an instant to the canonical aggregation bucket for the configured
//! period mode and time zone. Daily buckets roll over at a cutoff hour:
//! entries submitted strictly after that hour land in the next day's
//! digest. Weekly buckets end at a fixed weekday and hour.

use chrono::{DateTime, Datelike, Days, NaiveDate, TimeZone, Timelike, Utc, Weekday};
use chrono_tz::Tz;

use crate::config::{DigestConfig, PeriodMode};
use crate::Result;

/// Date format used for bucket keys, e.g. "Jan 05, 2026".
const KEY_FORMAT: &str = "%b %d, %Y";

/// A resolved aggregation bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketWindow {
    /// Canonical bucket key (short date of the effective/boundary day).
    pub key: String,
    /// Display label for the digest title (date, or "Week N").
    pub label: String,
    /// Inclusive start of the submission window, UTC.
    pub start: DateTime<Utc>,
    /// Exclusive end of the submission window, UTC.
    pub end: DateTime<Utc>,
}

/// Computes the canonical bucket for "now".
#[derive(Debug, Clone)]
pub struct BucketResolver {
    tz: Tz,
    mode: PeriodMode,
    cutoff_hour: u32,
    weekday: Weekday,
}

impl BucketResolver {
    /// Build a resolver from the digest configuration.
    pub fn from_config(config: &DigestConfig) -> Result<Self> {
        Ok(Self {
            tz: config.tz()?,
            mode: config.mode,
            cutoff_hour: config.cutoff_hour,
            weekday: config.boundary_weekday()?,
        })
    }

    /// The configured time zone.
    pub fn tz(&self) -> Tz {
        self.tz
    }

    /// The configured period mode.
    pub fn mode(&self) -> PeriodMode {
        self.mode
    }

    /// Resolve the bucket that a submission (or a send) at `now` belongs to.
    pub fn current_bucket(&self, now: DateTime<Utc>) -> BucketWindow {
        match self.mode {
            PeriodMode::Daily => self.daily_bucket(now),
            PeriodMode::Weekly => self.weekly_bucket(now),
        }
    }

    /// Daily bucket: strictly past the cutoff hour the effective date is
    /// tomorrow, otherwise today. A send firing exactly at the cutoff hour
    /// therefore still resolves the bucket whose window just closed.
    fn daily_bucket(&self, now: DateTime<Utc>) -> BucketWindow {
        let local = now.with_timezone(&self.tz);
        let effective = if local.hour() > self.cutoff_hour {
            local.date_naive() + Days::new(1)
        } else {
            local.date_naive()
        };

        // Submissions map to the effective date up to and including the
        // cutoff hour, so the window boundary sits at cutoff + 1.
        let end = local_instant(self.tz, effective, self.cutoff_hour + 1);
        let start = local_instant(self.tz, effective - Days::new(1), self.cutoff_hour + 1);
        let key = effective.format(KEY_FORMAT).to_string();

        BucketWindow {
            label: key.clone(),
            key,
            start,
            end,
        }
    }

    /// Weekly bucket: the next occurrence of the boundary weekday at the
    /// boundary hour. If `now` is strictly past this week's occurrence,
    /// the bucket boundary is seven days later; exactly at the boundary
    /// the bucket is the week that just closed, so a send firing at the
    /// boundary reads the accumulated week rather than the fresh one.
    /// The submission window is the seven days ending at the boundary.
    fn weekly_bucket(&self, now: DateTime<Utc>) -> BucketWindow {
        let local = now.with_timezone(&self.tz);
        let mut boundary_date = local.date_naive();
        while boundary_date.weekday() != self.weekday {
            boundary_date = boundary_date + Days::new(1);
        }
        let mut boundary = local_instant(self.tz, boundary_date, self.cutoff_hour);
        if boundary < now {
            boundary_date = boundary_date + Days::new(7);
            boundary = local_instant(self.tz, boundary_date, self.cutoff_hour);
        }
        let start = local_instant(self.tz, boundary_date - Days::new(7), self.cutoff_hour);

        let iso = boundary_date.iso_week();
        BucketWindow {
            key: boundary_date.format(KEY_FORMAT).to_string(),
            label: format!("Week {}", iso.week()),
            start,
            end: boundary,
        }
    }

    /// Next instant at which the scheduled digest fires: the cutoff hour in
    /// daily mode, the weekly boundary in weekly mode. Always strictly in
    /// the future of `now`.
    pub fn next_fire(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self.mode {
            PeriodMode::Daily => {
                let local = now.with_timezone(&self.tz);
                let mut date = local.date_naive();
                let mut fire = local_instant(self.tz, date, self.cutoff_hour);
                if fire <= now {
                    date = date + Days::new(1);
                    fire = local_instant(self.tz, date, self.cutoff_hour);
                }
                fire
            }
            PeriodMode::Weekly => {
                // Unlike bucket resolution, the next fire at the boundary
                // instant itself is a week away.
                let local = now.with_timezone(&self.tz);
                let mut date = local.date_naive();
                while date.weekday() != self.weekday {
                    date = date + Days::new(1);
                }
                let mut fire = local_instant(self.tz, date, self.cutoff_hour);
                if fire <= now {
                    date = date + Days::new(7);
                    fire = local_instant(self.tz, date, self.cutoff_hour);
                }
                fire
            }
        }
    }
}

/// Resolve a wall-clock hour on a local date to a UTC instant using
/// zone-aware rules. Hours falling in a spring-forward gap resolve to the
/// earliest valid instant after the gap; ambiguous fall-back hours resolve
/// to the earlier offset. An hour of 24 carries into the next day.
fn local_instant(tz: Tz, date: NaiveDate, hour: u32) -> DateTime<Utc> {
    let (date, hour) = if hour >= 24 {
        (date + Days::new(1), hour - 24)
    } else {
        (date, hour)
    };

    for h in hour..=hour.saturating_add(3).min(23) {
        if let Some(t) = tz
            .with_ymd_and_hms(date.year(), date.month(), date.day(), h, 0, 0)
            .earliest()
        {
            return t.with_timezone(&Utc);
        }
    }

    // A whole run of missing local hours cannot happen with IANA zones;
    // fall back to treating the wall-clock time as UTC.
    Utc.with_ymd_and_hms(date.year(), date.month(), date.day(), hour, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn daily_resolver() -> BucketResolver {
        BucketResolver::from_config(&DigestConfig::default()).unwrap()
    }

    fn weekly_resolver() -> BucketResolver {
        let config = DigestConfig {
            mode: PeriodMode::Weekly,
            ..DigestConfig::default()
        };
        BucketResolver::from_config(&config).unwrap()
    }

    /// 2026-01-05 09:00 Pacific, one hour before the 10:00 cutoff.
    fn before_cutoff() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 5, 17, 0, 0).unwrap()
    }

    #[test]
    fn test_daily_before_cutoff_is_today() {
        let bucket = daily_resolver().current_bucket(before_cutoff());
        assert_eq!(bucket.key, "Jan 05, 2026");
        assert_eq!(bucket.label, "Jan 05, 2026");
    }

    #[test]
    fn test_daily_after_cutoff_is_tomorrow() {
        // 2026-01-05 11:00 Pacific
        let now = Utc.with_ymd_and_hms(2026, 1, 5, 19, 0, 0).unwrap();
        let bucket = daily_resolver().current_bucket(now);
        assert_eq!(bucket.key, "Jan 06, 2026");
    }

    #[test]
    fn test_daily_at_cutoff_hour_is_today() {
        // 2026-01-05 10:30 Pacific: hour 10 is not strictly greater than 10
        let now = Utc.with_ymd_and_hms(2026, 1, 5, 18, 30, 0).unwrap();
        let bucket = daily_resolver().current_bucket(now);
        assert_eq!(bucket.key, "Jan 05, 2026");
    }

    #[test]
    fn test_daily_window_covers_submission_instant() {
        let resolver = daily_resolver();
        let now = before_cutoff();
        let bucket = resolver.current_bucket(now);
        assert!(bucket.start <= now && now < bucket.end);
        // Window closes at 11:00 local on the effective day
        assert_eq!(
            bucket.end,
            Utc.with_ymd_and_hms(2026, 1, 5, 19, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_daily_window_across_dst_transition() {
        // US DST starts 2026-03-08; the effective day is one hour short.
        // 2026-03-08 09:00 PDT
        let now = Utc.with_ymd_and_hms(2026, 3, 8, 16, 0, 0).unwrap();
        let bucket = daily_resolver().current_bucket(now);
        assert_eq!(bucket.key, "Mar 08, 2026");
        assert_eq!(bucket.end - bucket.start, Duration::hours(23));
    }

    #[test]
    fn test_weekly_window_across_spring_forward() {
        // US DST starts 2026-03-08; the week ending Sunday Mar 08 10:00
        // Pacific loses an hour. 2026-03-07 04:00 PST
        let now = Utc.with_ymd_and_hms(2026, 3, 7, 12, 0, 0).unwrap();
        let bucket = weekly_resolver().current_bucket(now);
        assert_eq!(bucket.key, "Mar 08, 2026");
        assert_eq!(bucket.end - bucket.start, Duration::hours(167));
        assert!(bucket.start <= now && now < bucket.end);
    }

    #[test]
    fn test_weekly_window_across_fall_back() {
        // US DST ends 2026-11-01; the week ending Sunday Nov 01 10:00
        // Pacific gains an hour. 2026-10-31 05:00 PDT
        let now = Utc.with_ymd_and_hms(2026, 10, 31, 12, 0, 0).unwrap();
        let bucket = weekly_resolver().current_bucket(now);
        assert_eq!(bucket.key, "Nov 01, 2026");
        assert_eq!(bucket.end - bucket.start, Duration::hours(169));
        assert!(bucket.start <= now && now < bucket.end);
    }

    #[test]
    fn test_weekly_boundary_is_next_sunday() {
        // Monday 2026-01-05 09:00 Pacific; next Sunday is Jan 11
        let bucket = weekly_resolver().current_bucket(before_cutoff());
        assert_eq!(bucket.key, "Jan 11, 2026");
        assert_eq!(bucket.label, "Week 2");
        assert_eq!(bucket.end - bucket.start, Duration::days(7));
    }

    #[test]
    fn test_weekly_at_boundary_resolves_closing_week() {
        // Exactly Sunday 2026-01-11 10:00 Pacific: the send fires here and
        // must read the week that just closed, not the fresh one
        let at_boundary = Utc.with_ymd_and_hms(2026, 1, 11, 18, 0, 0).unwrap();
        let bucket = weekly_resolver().current_bucket(at_boundary);
        assert_eq!(bucket.key, "Jan 11, 2026");
        assert_eq!(bucket.end, at_boundary);
        assert_eq!(bucket.start, at_boundary - Duration::days(7));
    }

    #[test]
    fn test_weekly_past_boundary_rolls_a_week() {
        // One second past the boundary the fresh week begins
        let past = Utc.with_ymd_and_hms(2026, 1, 11, 18, 0, 1).unwrap();
        let bucket = weekly_resolver().current_bucket(past);
        assert_eq!(bucket.key, "Jan 18, 2026");
        assert!(bucket.start <= past && past < bucket.end);
    }

    #[test]
    fn test_weekly_fire_window_covers_late_submission() {
        // An entry submitted an hour before the boundary must fall inside
        // the window the scheduled send resolves at its fire instant
        let resolver = weekly_resolver();
        let submitted = Utc.with_ymd_and_hms(2026, 1, 11, 17, 0, 0).unwrap();
        let fire = resolver.next_fire(submitted);
        assert_eq!(fire, Utc.with_ymd_and_hms(2026, 1, 11, 18, 0, 0).unwrap());

        let bucket = resolver.current_bucket(fire);
        assert!(bucket.start <= submitted && submitted < bucket.end);
    }

    #[test]
    fn test_weekly_window_range_is_half_open() {
        let resolver = weekly_resolver();
        let now = before_cutoff();
        let bucket = resolver.current_bucket(now);
        assert!(bucket.start <= now && now < bucket.end);
    }

    #[test]
    fn test_next_fire_daily_is_cutoff_hour() {
        let fire = daily_resolver().next_fire(before_cutoff());
        // 10:00 Pacific on the same day
        assert_eq!(fire, Utc.with_ymd_and_hms(2026, 1, 5, 18, 0, 0).unwrap());
    }

    #[test]
    fn test_next_fire_daily_after_cutoff_is_tomorrow() {
        let now = Utc.with_ymd_and_hms(2026, 1, 5, 19, 0, 0).unwrap();
        let fire = daily_resolver().next_fire(now);
        assert_eq!(fire, Utc.with_ymd_and_hms(2026, 1, 6, 18, 0, 0).unwrap());
    }

    #[test]
    fn test_next_fire_weekly_at_boundary_is_a_week_out() {
        // At the fire instant the next fire is seven days later, never now
        let resolver = weekly_resolver();
        let at_fire = Utc.with_ymd_and_hms(2026, 1, 11, 18, 0, 0).unwrap();
        let fire = resolver.next_fire(at_fire);
        assert_eq!(fire, Utc.with_ymd_and_hms(2026, 1, 18, 18, 0, 0).unwrap());
    }

    #[test]
    fn test_next_fire_weekly_mid_week() {
        // Monday 2026-01-05: the coming Sunday boundary
        let fire = weekly_resolver().next_fire(before_cutoff());
        assert_eq!(fire, Utc.with_ymd_and_hms(2026, 1, 11, 18, 0, 0).unwrap());
    }

    #[test]
    fn test_next_fire_is_strictly_future() {
        let resolver = daily_resolver();
        let at_fire = Utc.with_ymd_and_hms(2026, 1, 5, 18, 0, 0).unwrap();
        assert!(resolver.next_fire(at_fire) > at_fire);
    }

    #[test]
    fn test_fire_instant_resolves_closing_bucket() {
        // Firing exactly at 10:00 resolves today's bucket, whose window
        // of "yesterday after cutoff through today at cutoff" just closed.
        let resolver = daily_resolver();
        let at_fire = Utc.with_ymd_and_hms(2026, 1, 5, 18, 0, 0).unwrap();
        let bucket = resolver.current_bucket(at_fire);
        assert_eq!(bucket.key, "Jan 05, 2026");
    }

    #[test]
    fn test_local_instant_spring_forward_gap() {
        // 2026-03-08 02:00 does not exist in US Pacific; resolves to the
        // earliest valid instant after the gap (03:00 PDT = 10:00 UTC).
        let tz: Tz = "America/Los_Angeles".parse().unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 3, 8).unwrap();
        let t = local_instant(tz, date, 2);
        assert_eq!(t, Utc.with_ymd_and_hms(2026, 3, 8, 10, 0, 0).unwrap());
    }

    #[test]
    fn test_local_instant_hour_carry() {
        let tz: Tz = "UTC".parse().unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let t = local_instant(tz, date, 24);
        assert_eq!(t, Utc.with_ymd_and_hms(2026, 1, 6, 0, 0, 0).unwrap());
    }
}
