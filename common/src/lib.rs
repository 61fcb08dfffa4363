#![warn(clippy::nursery, clippy::pedantic)]

//! Contains common functions and structures shared by the snipbin crates

use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};

pub mod base64 {
    /// Standard Base64 encoding, used to embed paste content in markup.
    pub fn encode(input: impl AsRef<[u8]>) -> String {
        base64::encode(input)
    }

    /// Standard Base64 decoding.
    pub fn decode(input: impl AsRef<[u8]>) -> Result<Vec<u8>, base64::DecodeError> {
        base64::decode(input)
    }
}

/// How long a paste lives before the cleanup sweep may remove it.
///
/// Labels outside the closed set fall back to [`Lifetime::Day`], so parsing
/// form input is total.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Lifetime {
    #[default]
    Day,
    Week,
    Month,
}

impl From<&str> for Lifetime {
    fn from(label: &str) -> Self {
        match label {
            "month" => Self::Month,
            "week" => Self::Week,
            _ => Self::Day,
        }
    }
}

impl Lifetime {
    /// Absolute expiration timestamp for a paste created at `created`.
    ///
    /// A month is a calendar month, with the day-of-month clamped the way
    /// calendar arithmetic requires (Jan 31 + 1 month = Feb 28).
    #[must_use]
    pub fn expires_at(self, created: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Self::Day => created + Duration::days(1),
            Self::Week => created + Duration::days(7),
            Self::Month => created + Months::new(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn day_and_week_are_fixed_offsets() {
        let created = Utc.with_ymd_and_hms(2022, 8, 4, 12, 30, 15).unwrap();
        assert_eq!(
            Lifetime::Day.expires_at(created),
            created + Duration::days(1)
        );
        assert_eq!(
            Lifetime::Week.expires_at(created),
            created + Duration::days(7)
        );
    }

    #[test]
    fn month_is_calendar_arithmetic() {
        let created = Utc.with_ymd_and_hms(2022, 3, 15, 0, 0, 0).unwrap();
        assert_eq!(
            Lifetime::Month.expires_at(created),
            Utc.with_ymd_and_hms(2022, 4, 15, 0, 0, 0).unwrap()
        );

        // End-of-month clamping
        let created = Utc.with_ymd_and_hms(2022, 1, 31, 23, 59, 59).unwrap();
        assert_eq!(
            Lifetime::Month.expires_at(created),
            Utc.with_ymd_and_hms(2022, 2, 28, 23, 59, 59).unwrap()
        );
    }

    #[test]
    fn unrecognized_labels_fall_back_to_day() {
        assert_eq!(Lifetime::from("day"), Lifetime::Day);
        assert_eq!(Lifetime::from("week"), Lifetime::Week);
        assert_eq!(Lifetime::from("month"), Lifetime::Month);
        assert_eq!(Lifetime::from(""), Lifetime::default());
        assert_eq!(Lifetime::from("fortnight"), Lifetime::Day);
        assert_eq!(Lifetime::from("WEEK"), Lifetime::Day);
    }

    #[test]
    fn expiry_is_always_after_creation() {
        let created = Utc.with_ymd_and_hms(2022, 12, 31, 23, 59, 59).unwrap();
        for lifetime in [Lifetime::Day, Lifetime::Week, Lifetime::Month] {
            assert!(lifetime.expires_at(created) > created);
        }
    }
}
