//! Time related utils.

use crate::Error;
use chrono::NaiveDateTime;
use chrono::Utc;

/// DateTime in UTC, the only timezone used while signing.
pub type DateTime = chrono::DateTime<Utc>;

/// Time format for ISO 8601 basic: "20220313T072004Z"
const ISO8601: &str = "%Y%m%dT%H%M%SZ";

/// Create the current utc time.
pub fn now() -> DateTime {
    Utc::now()
}

/// Format time into ISO 8601 basic: `20220313T072004Z`
///
/// Sub-second precision is dropped.
pub fn format_iso8601(t: DateTime) -> String {
    t.format(ISO8601).to_string()
}

/// Parse ISO 8601 basic time: `20220313T072004Z`
pub fn parse_iso8601(s: &str) -> crate::Result<DateTime> {
    NaiveDateTime::parse_from_str(s, ISO8601)
        .map(|t| t.and_utc())
        .map_err(|e| {
            Error::config_invalid(format!("invalid ISO 8601 basic timestamp: {s}")).with_source(e)
        })
}
