//! Timestamp value object for immutable points in time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Immutable point in time, always UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a timestamp for the current moment.
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Formats as a short wall-clock label (`HH:MM`) for transcripts.
    pub fn clock_label(&self) -> String {
        self.0.format("%H:%M").to_string()
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn timestamp_now_creates_current_time() {
        let before = Timestamp(Utc::now());
        let ts = Timestamp::now();
        let after = Timestamp(Utc::now());

        assert!(before <= ts);
        assert!(ts <= after);
    }

    #[test]
    fn clock_label_is_hours_and_minutes() {
        let ts = Timestamp(Utc.with_ymd_and_hms(2024, 3, 7, 14, 2, 59).unwrap());
        assert_eq!(ts.clock_label(), "14:02");
    }

    #[test]
    fn serializes_as_rfc3339_string() {
        let ts = Timestamp(Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap());
        let json = serde_json::to_string(&ts).unwrap();
        assert!(json.starts_with("\"2024-01-15T10:30:00"));
    }
}
