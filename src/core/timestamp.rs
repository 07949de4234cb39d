//! Purpose: Native temporal representation for events plus coercion from raw JSON.
//! Exports: `Timestamp`.
//! Role: Timestamp boundary between decoded payload values and the event model.
//! Invariants: Values constructed through this API always render as RFC 3339 UTC.
//! Invariants: Coercion failures are ordinary errors; nothing here panics on input.

use std::fmt;

use serde_json::Value;
use time::format_description::well_known::{Iso8601, Rfc3339};
use time::{OffsetDateTime, UtcOffset};

use crate::core::error::{Error, ErrorKind};

const NANOS_PER_SECOND: f64 = 1_000_000_000.0;

#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord)]
pub struct Timestamp(OffsetDateTime);

impl Timestamp {
    pub fn now() -> Self {
        Self(OffsetDateTime::now_utc())
    }

    /// Parse timestamp text, RFC 3339 first with an ISO 8601 fallback.
    pub fn parse(text: &str) -> Result<Self, Error> {
        let parsed = OffsetDateTime::parse(text, &Rfc3339)
            .or_else(|_| OffsetDateTime::parse(text, &Iso8601::DEFAULT))
            .map_err(|err| {
                Error::new(ErrorKind::Timestamp)
                    .with_message("unparsable timestamp text")
                    .with_source(err)
            })?;
        let utc = parsed.checked_to_offset(UtcOffset::UTC).ok_or_else(|| {
            Error::new(ErrorKind::Timestamp).with_message("timestamp out of range")
        })?;
        Ok(Self(utc))
    }

    /// Interpret a whole number as Unix epoch seconds.
    pub fn from_unix_timestamp(seconds: i64) -> Result<Self, Error> {
        let parsed = OffsetDateTime::from_unix_timestamp(seconds).map_err(|err| {
            Error::new(ErrorKind::Timestamp)
                .with_message("timestamp out of range")
                .with_source(err)
        })?;
        Self::from_datetime(parsed)
    }

    /// Interpret a number as Unix epoch seconds, fractional part preserved.
    pub fn from_unix_seconds(seconds: f64) -> Result<Self, Error> {
        if !seconds.is_finite() {
            return Err(Error::new(ErrorKind::Timestamp)
                .with_message("timestamp seconds must be finite"));
        }
        let nanos = (seconds * NANOS_PER_SECOND).round() as i128;
        let parsed = OffsetDateTime::from_unix_timestamp_nanos(nanos).map_err(|err| {
            Error::new(ErrorKind::Timestamp)
                .with_message("timestamp out of range")
                .with_source(err)
        })?;
        Self::from_datetime(parsed)
    }

    /// Coerce a decoded JSON value into a timestamp. Strings parse as
    /// timestamp text, numbers as epoch seconds; every other shape fails.
    /// Whole-number seconds avoid the float path so large epochs stay exact.
    pub fn coerce(value: &Value) -> Result<Self, Error> {
        match value {
            Value::String(text) => Self::parse(text),
            Value::Number(number) => {
                if let Some(seconds) = number.as_i64() {
                    return Self::from_unix_timestamp(seconds);
                }
                let seconds = number.as_f64().ok_or_else(|| {
                    Error::new(ErrorKind::Timestamp)
                        .with_message("timestamp number is not representable")
                })?;
                Self::from_unix_seconds(seconds)
            }
            _ => Err(Error::new(ErrorKind::Timestamp)
                .with_message("timestamp must be a string or number")),
        }
    }

    fn from_datetime(parsed: OffsetDateTime) -> Result<Self, Error> {
        // RFC 3339 cannot render years before 0000.
        if parsed.year() < 0 {
            return Err(Error::new(ErrorKind::Timestamp).with_message("timestamp out of range"));
        }
        Ok(Self(parsed))
    }

    pub fn to_rfc3339(&self) -> Result<String, Error> {
        self.0.format(&Rfc3339).map_err(|err| {
            Error::new(ErrorKind::Internal)
                .with_message("timestamp format failed")
                .with_source(err)
        })
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_rfc3339() {
            Ok(text) => f.write_str(&text),
            Err(_) => write!(f, "{:?}", self.0),
        }
    }
}
