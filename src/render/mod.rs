//! HTML and SVG output.

pub mod class_lander;
pub mod course_image;
pub mod homepage;
pub mod router_lander;
pub mod schedule_page;

use crate::domain::model::Session;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::OnceLock;

fn placeholder() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\{([A-Z0-9_]+)\}\}").unwrap())
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Replaces `{{KEY}}` placeholders in one pass; values are inserted verbatim and unknown keys are kept.
pub fn fill(template: &str, values: &[(&str, String)]) -> String {
    let lookup: HashMap<&str, &str> = values.iter().map(|(k, v)| (*k, v.as_str())).collect();
    placeholder()
        .replace_all(template, |caps: &Captures| match lookup.get(&caps[1]) {
            Some(v) => (*v).to_string(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Session start in the site time zone, from the stored RFC 3339 value.
pub fn session_start(session: &Session, tz: Tz) -> Option<DateTime<Tz>> {
    let raw = session.start_iso.as_deref()?;
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&tz))
}

/// `Monday, December 29, 2025 at 9:00 AM`
pub fn long_date(dt: &DateTime<Tz>) -> String {
    dt.format("%A, %B %-d, %Y at %-I:%M %p").to_string()
}

/// Where a session sits relative to build time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeStatus {
    Future,
    Past,
    Unknown,
}

impl TimeStatus {
    pub fn of(session: &Session, now: DateTime<Utc>) -> Self {
        match session
            .start_iso
            .as_deref()
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        {
            Some(start) if start.with_timezone(&Utc) >= now => TimeStatus::Future,
            Some(_) => TimeStatus::Past,
            None => TimeStatus::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeStatus::Future => "future",
            TimeStatus::Past => "past",
            TimeStatus::Unknown => "unknown",
        }
    }
}

/// `tel:` target for a display phone number, assuming a US number.
pub fn tel_href(phone: &str) -> String {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() == 10 {
        format!("tel:+1{}", digits)
    } else {
        format!("tel:+{}", digits)
    }
}
