//! Heuristic parsing of Enrollware schedule snapshots.

pub mod dates;
pub mod enrollware;
pub mod links;
pub mod text;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use url::Url;

pub use enrollware::parse_snapshot;

/// Everything the parser needs besides the markup itself.
#[derive(Debug, Clone)]
pub struct ScrapeContext {
    /// Relative enroll and schedule links are resolved against this.
    pub base_url: Url,
    /// Zone naive dates are read in.
    pub tz: Tz,
    /// Reference time for `is_past` and year inference.
    pub now: DateTime<Utc>,
    /// Recorded as `meta.source`.
    pub source: String,
}
