// HTTP endpoint handlers

pub mod chat;
pub mod google;
pub mod keys;
pub mod krea;
pub mod system;

use chrono::{SecondsFormat, Utc};

/// RFC 3339 UTC timestamp with millisecond precision, the format the
/// frontend already parses.
pub(crate) fn iso_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
