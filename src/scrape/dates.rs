//! Best-effort start-time parsing for the date strings Enrollware prints.
//!
//! Handled shapes:
//! * `Monday, December 29, 2025 at 9:00 AM` / `December 29, 2025 at 9 AM`
//! * `Mon 12/29/2025 9:00 AM`
//! * `Mon Dec 29 9:00 AM` (year inferred from the reference time)
//! * ISO `2025-12-29T09:00[:00][offset]`
//!
//! Naive times are local to the configured zone.

use chrono::{DateTime, Datelike, Duration, Month, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use regex::{Captures, Regex};
use std::str::FromStr;
use std::sync::OnceLock;

use super::text::normspace;

/// A date whose year was inferred is pushed into next year once it is this far behind "now".
const YEAR_ROLLOVER_DAYS: i64 = 180;

fn long_form() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)\b(jan|feb|mar|apr|may|jun|jul|aug|sep|sept|oct|nov|dec)[a-z]*\.?\s+(\d{1,2}),?\s+(\d{4})(?:\s+at)?,?\s+(\d{1,2})(?::(\d{2}))?\s*([ap])\.?m\.?",
        )
        .unwrap()
    })
}

fn numeric_form() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(\d{1,2})/(\d{1,2})/(\d{4})\s+(?:at\s+)?(\d{1,2})(?::(\d{2}))?\s*([ap])\.?m\.?").unwrap()
    })
}

fn short_form() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)\b(?:mon|tue|wed|thu|fri|sat|sun)[a-z]*,?\s+(jan|feb|mar|apr|may|jun|jul|aug|sep|sept|oct|nov|dec)[a-z]*\.?\s+(\d{1,2}),?\s+(?:at\s+)?(\d{1,2})(?::(\d{2}))?\s*([ap])\.?m\.?",
        )
        .unwrap()
    })
}

fn iso_form() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\d{4}-\d{2}-\d{2}[T ]\d{1,2}:\d{2}(?::\d{2}(?:\.\d+)?)?(?:Z|[+-]\d{2}:?\d{2})?").unwrap()
    })
}

/// Parsed start time plus the derived fields stored on a session.
#[derive(Debug, Clone, PartialEq)]
pub struct StartTime {
    pub at: DateTime<Tz>,
}

impl StartTime {
    pub fn iso(&self) -> String {
        self.at.to_rfc3339()
    }

    pub fn millis(&self) -> i64 {
        self.at.timestamp_millis()
    }

    pub fn is_past(&self, now: DateTime<Utc>) -> bool {
        self.at.with_timezone(&Utc) < now
    }
}

pub fn parse_start(text: &str, tz: Tz, now: DateTime<Utc>) -> Option<StartTime> {
    let s = normspace(text);
    if s.is_empty() {
        return None;
    }

    let at = parse_iso(&s, tz)
        .or_else(|| long_form().captures(&s).and_then(|c| from_long(&c)).and_then(|n| localize(n, tz)))
        .or_else(|| numeric_form().captures(&s).and_then(|c| from_numeric(&c)).and_then(|n| localize(n, tz)))
        .or_else(|| {
            short_form()
                .captures(&s)
                .and_then(|c| from_short(&c, tz, now))
                .and_then(|n| localize(n, tz))
        })?;

    Some(StartTime { at })
}

/// RFC 3339 keeps its own offset (re-expressed in `tz`); naive ISO is taken as local.
pub fn parse_iso(text: &str, tz: Tz) -> Option<DateTime<Tz>> {
    let m = iso_form().find(text)?;
    let raw = m.as_str().replace(' ', "T");

    if let Ok(dt) = DateTime::parse_from_rfc3339(&raw) {
        return Some(dt.with_timezone(&tz));
    }
    if let Ok(dt) = DateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M%z") {
        return Some(dt.with_timezone(&tz));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(&raw, fmt).ok())
        .and_then(|n| localize(n, tz))
}

fn localize(naive: NaiveDateTime, tz: Tz) -> Option<DateTime<Tz>> {
    // Ambiguous fall-back hour resolves to the earlier instant; skipped spring-forward hour yields None.
    tz.from_local_datetime(&naive).earliest()
}

fn month_number(name: &str) -> Option<u32> {
    let name = if name.eq_ignore_ascii_case("sept") { "sep" } else { name };
    Month::from_str(name).ok().map(|m| m.number_from_month())
}

fn clock(hour: &str, minute: Option<&str>, meridiem: &str) -> Option<NaiveTime> {
    let hour: u32 = hour.parse().ok()?;
    let minute: u32 = minute.map(str::parse::<u32>).transpose().ok()?.unwrap_or(0);
    if !(1..=12).contains(&hour) {
        return None;
    }
    let pm = meridiem.eq_ignore_ascii_case("p");
    let hour24 = match (hour, pm) {
        (12, false) => 0,
        (12, true) => 12,
        (h, false) => h,
        (h, true) => h + 12,
    };
    NaiveTime::from_hms_opt(hour24, minute, 0)
}

fn from_long(c: &Captures) -> Option<NaiveDateTime> {
    let month = month_number(&c[1])?;
    let day: u32 = c[2].parse().ok()?;
    let year: i32 = c[3].parse().ok()?;
    let time = clock(&c[4], c.get(5).map(|m| m.as_str()), &c[6])?;
    NaiveDate::from_ymd_opt(year, month, day).map(|d| d.and_time(time))
}

fn from_numeric(c: &Captures) -> Option<NaiveDateTime> {
    let month: u32 = c[1].parse().ok()?;
    let day: u32 = c[2].parse().ok()?;
    let year: i32 = c[3].parse().ok()?;
    let time = clock(&c[4], c.get(5).map(|m| m.as_str()), &c[6])?;
    NaiveDate::from_ymd_opt(year, month, day).map(|d| d.and_time(time))
}

fn from_short(c: &Captures, tz: Tz, now: DateTime<Utc>) -> Option<NaiveDateTime> {
    let month = month_number(&c[1])?;
    let day: u32 = c[2].parse().ok()?;
    let time = clock(&c[3], c.get(4).map(|m| m.as_str()), &c[5])?;

    let today = now.with_timezone(&tz).date_naive();
    let next_year = || NaiveDate::from_ymd_opt(today.year() + 1, month, day);
    // Feb 29 outside a leap year can only mean next year's date.
    let date = match NaiveDate::from_ymd_opt(today.year(), month, day) {
        Some(date) if today - date > Duration::days(YEAR_ROLLOVER_DAYS) => next_year()?,
        Some(date) => date,
        None => next_year()?,
    };
    Some(date.and_time(time))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::America::New_York;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 12, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_long_form_with_weekday() {
        let start = parse_start("Monday, December 29, 2025 at 9:00 AM", New_York, now()).unwrap();
        assert_eq!(start.iso(), "2025-12-29T09:00:00-05:00");
        assert!(!start.is_past(now()));
    }

    #[test]
    fn test_long_form_without_minutes() {
        let start = parse_start("December 29, 2025 at 1 PM", New_York, now()).unwrap();
        assert_eq!(start.iso(), "2025-12-29T13:00:00-05:00");
    }

    #[test]
    fn test_numeric_form_in_summer_uses_dst_offset() {
        let start = parse_start("Sat 7/11/2026 8:30 AM NC - Wilmington", New_York, now()).unwrap();
        assert_eq!(start.iso(), "2026-07-11T08:30:00-04:00");
    }

    #[test]
    fn test_short_form_infers_year() {
        let start = parse_start("Mon Dec 29 6:00 PM", New_York, now()).unwrap();
        assert_eq!(start.iso(), "2025-12-29T18:00:00-05:00");

        // January is behind December 1st by more than the rollover window, so next year.
        let start = parse_start("Tue Jan 13 9:00 AM", New_York, now()).unwrap();
        assert_eq!(start.iso(), "2026-01-13T09:00:00-05:00");
    }

    #[test]
    fn test_short_form_leap_day_rolls_to_next_year() {
        let late_2027 = Utc.with_ymd_and_hms(2027, 12, 1, 12, 0, 0).unwrap();
        let start = parse_start("Tue Feb 29 9:00 AM", New_York, late_2027).unwrap();
        assert_eq!(start.iso(), "2028-02-29T09:00:00-05:00");

        // Neither 2026 nor 2027 has a Feb 29.
        let early_2026 = Utc.with_ymd_and_hms(2026, 2, 1, 12, 0, 0).unwrap();
        assert!(parse_start("Sun Feb 29 9:00 AM", New_York, early_2026).is_none());
    }

    #[test]
    fn test_iso_forms() {
        let start = parse_start("2025-12-29T09:00", New_York, now()).unwrap();
        assert_eq!(start.iso(), "2025-12-29T09:00:00-05:00");

        let start = parse_start("2025-12-29T14:00:00Z", New_York, now()).unwrap();
        assert_eq!(start.iso(), "2025-12-29T09:00:00-05:00");
        assert_eq!(start.millis(), 1_767_016_800_000);
    }

    #[test]
    fn test_past_detection() {
        let start = parse_start("November 3, 2025 at 12:00 PM", New_York, now()).unwrap();
        assert!(start.is_past(now()));
        assert_eq!(start.iso(), "2025-11-03T12:00:00-05:00");
    }

    #[test]
    fn test_midnight_and_noon() {
        let start = parse_start("March 2, 2026 at 12:15 AM", New_York, now()).unwrap();
        assert_eq!(start.iso(), "2026-03-02T00:15:00-05:00");
    }

    #[test]
    fn test_unparseable_text() {
        assert!(parse_start("", New_York, now()).is_none());
        assert!(parse_start("Call to schedule", New_York, now()).is_none());
        assert!(parse_start("February 30, 2026 at 9:00 AM", New_York, now()).is_none());
    }
}
