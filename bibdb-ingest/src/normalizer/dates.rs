//! Best-effort timestamp normalization

use chrono::NaiveDateTime;

/// Accepted input form, e.g. `2024-01-15T09:30:00Z`
const INPUT_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Canonical stored form, e.g. `2024/01/15 09:30:00`
const OUTPUT_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// Normalize a harvested timestamp
///
/// Only the first comma-separated value is considered. Anything that does not
/// parse is returned verbatim; an unparseable date never fails the record.
pub fn normalize_timestamp(raw: &str) -> String {
    let first = raw.split(',').next().unwrap_or_default().trim();
    match NaiveDateTime::parse_from_str(first, INPUT_FORMAT) {
        Ok(dt) => dt.format(OUTPUT_FORMAT).to_string(),
        Err(_) => raw.to_string(),
    }
}
