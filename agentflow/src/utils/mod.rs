//! Identifier, timestamp, and naming helpers.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Generates a new UUID v4.
#[must_use]
pub fn generate_uuid() -> Uuid {
    Uuid::new_v4()
}

/// Returns the current UTC time as an ISO 8601 formatted string.
#[must_use]
pub fn iso_timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.6f+00:00").to_string()
}

/// Returns the current UTC timestamp.
#[must_use]
pub fn now_utc() -> DateTime<Utc> {
    Utc::now()
}

/// Derives a filesystem-safe stem from free text.
///
/// Keeps at most 50 characters, lowercases, and maps anything that is not
/// alphanumeric to a dash.
#[must_use]
pub fn sanitize_file_stem(text: &str) -> String {
    text.chars()
        .take(50)
        .map(|c| {
            if c.is_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect()
}
