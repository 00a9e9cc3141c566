//! API timestamp codec
//!
//! The TPG API emits timestamps as `YYYY-MM-DDTHH:MM:SS±HHMM`, an ISO-8601
//! variant whose UTC offset carries no colon. [`Timestamp`] parses exactly
//! that layout and nothing else.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use thiserror::Error;

/// chrono layout of API timestamps
const API_LAYOUT: &str = "%Y-%m-%dT%H:%M:%S%z";

/// Byte shape of an API timestamp: `d` is an ASCII digit, `s` the offset sign
const API_SHAPE: &[u8; 24] = b"dddd-dd-ddTdd:dd:ddsdddd";

/// A timestamp string did not match the API layout
#[derive(Debug, Error)]
#[error("Invalid timestamp {raw:?}: expected YYYY-MM-DDTHH:MM:SS±HHMM")]
pub struct TimestampError {
    raw: String,
    #[source]
    source: Option<chrono::ParseError>,
}

impl TimestampError {
    /// The string that failed to parse
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }
}

/// A point in time as reported by the API, keeping the server's UTC offset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Timestamp(DateTime<FixedOffset>);

impl Timestamp {
    /// Parse an API timestamp
    ///
    /// # Errors
    ///
    /// Returns [`TimestampError`] if `raw` is not exactly
    /// `YYYY-MM-DDTHH:MM:SS±HHMM` or names an impossible date or time.
    pub fn parse(raw: &str) -> Result<Self, TimestampError> {
        if !has_api_shape(raw) {
            return Err(TimestampError {
                raw: raw.to_string(),
                source: None,
            });
        }

        DateTime::parse_from_str(raw, API_LAYOUT)
            .map(Self)
            .map_err(|e| TimestampError {
                raw: raw.to_string(),
                source: Some(e),
            })
    }

    /// Render in the API layout
    #[must_use]
    pub fn to_api_string(&self) -> String {
        self.0.format(API_LAYOUT).to_string()
    }

    /// The underlying time value, with the server's offset
    #[must_use]
    pub const fn as_datetime(&self) -> &DateTime<FixedOffset> {
        &self.0
    }

    /// The same instant in UTC
    #[must_use]
    pub fn to_utc(&self) -> DateTime<Utc> {
        self.0.with_timezone(&Utc)
    }
}

fn has_api_shape(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    bytes.len() == API_SHAPE.len()
        && bytes.iter().zip(API_SHAPE).all(|(&b, &expected)| match expected {
            b'd' => b.is_ascii_digit(),
            b's' => b == b'+' || b == b'-',
            _ => b == expected,
        })
}

impl From<DateTime<FixedOffset>> for Timestamp {
    fn from(value: DateTime<FixedOffset>) -> Self {
        Self(value)
    }
}

impl From<Timestamp> for DateTime<FixedOffset> {
    fn from(value: Timestamp) -> Self {
        value.0
    }
}

impl<Tz: chrono::TimeZone> PartialEq<DateTime<Tz>> for Timestamp {
    fn eq(&self, other: &DateTime<Tz>) -> bool {
        self.0 == *other
    }
}

impl FromStr for Timestamp {
    type Err = TimestampError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_api_string())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TimestampVisitor;

        impl de::Visitor<'_> for TimestampVisitor {
            type Value = Timestamp;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a timestamp formatted as YYYY-MM-DDTHH:MM:SS±HHMM")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Timestamp::parse(v).map_err(E::custom)
            }
        }

        deserializer.deserialize_str(TimestampVisitor)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn geneva_winter() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(3600)
            .unwrap()
            .with_ymd_and_hms(2018, 12, 14, 8, 34, 36)
            .unwrap()
    }

    #[test]
    fn test_parse_api_layout() {
        let ts = Timestamp::parse("2018-12-14T08:34:36+0100").unwrap();
        assert_eq!(ts, geneva_winter());
        assert_eq!(ts.as_datetime().offset().local_minus_utc(), 3600);
    }

    #[test]
    fn test_parse_negative_offset() {
        let ts = Timestamp::parse("2018-12-14T02:34:36-0500").unwrap();
        assert_eq!(ts.to_utc(), Utc.with_ymd_and_hms(2018, 12, 14, 7, 34, 36).unwrap());
    }

    #[test]
    fn test_same_instant_in_other_offset_is_equal() {
        let ts = Timestamp::parse("2018-12-14T08:34:36+0100").unwrap();
        let utc = Utc.with_ymd_and_hms(2018, 12, 14, 7, 34, 36).unwrap();
        assert_eq!(ts, utc);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        let err = Timestamp::parse("2018-14-14T99:34:36").unwrap_err();
        assert_eq!(err.raw(), "2018-14-14T99:34:36");
    }

    #[test]
    fn test_parse_rejects_out_of_range_fields() {
        assert!(Timestamp::parse("2018-14-14T08:34:36+0100").is_err());
        assert!(Timestamp::parse("2018-12-14T25:34:36+0100").is_err());
    }

    #[test]
    fn test_parse_rejects_layout_variants() {
        assert!(Timestamp::parse("2018-12-14T08:34:36+01:00").is_err());
        assert!(Timestamp::parse("2018-12-14T08:34:36Z").is_err());
        assert!(Timestamp::parse("2018-12-14T08:34:36.123+0100").is_err());
        assert!(Timestamp::parse("2018-12-14 08:34:36+0100").is_err());
        assert!(Timestamp::parse("2018-12-14T08:34:36").is_err());
        assert!(Timestamp::parse("").is_err());
    }

    #[test]
    fn test_api_string_keeps_layout() {
        let raw = "2018-12-14T08:34:36+0100";
        assert_eq!(Timestamp::parse(raw).unwrap().to_api_string(), raw);
    }

    #[test]
    fn test_display_uses_chrono_form() {
        let ts = Timestamp::parse("2018-12-14T08:34:36+0100").unwrap();
        assert_eq!(ts.to_string(), "2018-12-14 08:34:36 +01:00");
    }

    #[test]
    fn test_deserialize_struct_field() {
        #[derive(Deserialize)]
        struct Wrapper {
            time: Timestamp,
        }

        let json = r#"{ "time": "2018-12-14T08:34:36+0100" }"#;
        let wrapper: Wrapper = serde_json::from_str(json).unwrap();
        assert_eq!(wrapper.time, geneva_winter());
    }

    #[test]
    fn test_deserialize_rejects_bad_layout() {
        let result: Result<Timestamp, _> = serde_json::from_str(r#""2018-12-14""#);
        assert!(result.is_err());

        let result: Result<Timestamp, _> = serde_json::from_str("1544772876");
        assert!(result.is_err());
    }

    #[test]
    fn test_serialize_api_layout() {
        let ts = Timestamp::parse("2018-12-14T08:34:36+0100").unwrap();
        let json = serde_json::to_string(&ts).unwrap();
        assert_eq!(json, r#""2018-12-14T08:34:36+0100""#);
    }
}
