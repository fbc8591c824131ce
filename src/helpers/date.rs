//! Date helper functions
//!
//! Content dates carry no zone; they are treated as UTC wherever one is needed.

use chrono::{NaiveDateTime, TimeZone, Utc};

/// RFC 2822, as RSS wants it
///
/// # Examples
/// ```ignore
/// rfc2822(&date) // -> "Mon, 15 Jan 2024 00:00:00 +0000"
/// ```
pub fn rfc2822(date: &NaiveDateTime) -> String {
    Utc.from_utc_datetime(date).to_rfc2822()
}

/// W3C datetime for sitemap `<lastmod>`
pub fn date_xml(date: &NaiveDateTime) -> String {
    Utc.from_utc_datetime(date)
        .format("%Y-%m-%dT%H:%M:%S%:z")
        .to_string()
}
