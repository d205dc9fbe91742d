//! Timestamp value object for immutable points in time.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Immutable point in time, always UTC, at millisecond precision.
///
/// Serialized as Unix epoch milliseconds, which is how Eiffel carries
/// `meta.time` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "i64", try_from = "i64")]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a timestamp for the current moment, truncated to milliseconds.
    pub fn now() -> Self {
        let millis = Utc::now().timestamp_millis();
        // Any millisecond count produced by `Utc::now()` is in range.
        Self::from_unix_millis(millis).unwrap_or(Self(Utc::now()))
    }

    /// Creates a timestamp from Unix epoch milliseconds.
    ///
    /// Returns `None` when the value is outside chrono's supported range.
    pub fn from_unix_millis(millis: i64) -> Option<Self> {
        Utc.timestamp_millis_opt(millis).single().map(Self)
    }

    /// Returns the timestamp as Unix epoch milliseconds.
    pub fn as_unix_millis(&self) -> i64 {
        self.0.timestamp_millis()
    }

    /// Returns the inner DateTime.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

impl From<Timestamp> for i64 {
    fn from(ts: Timestamp) -> Self {
        ts.as_unix_millis()
    }
}

impl TryFrom<i64> for Timestamp {
    type Error = OutOfRangeMillis;

    fn try_from(millis: i64) -> Result<Self, Self::Error> {
        Self::from_unix_millis(millis).ok_or(OutOfRangeMillis(millis))
    }
}

/// Epoch milliseconds that do not map onto a representable date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutOfRangeMillis(pub i64);

impl fmt::Display for OutOfRangeMillis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "epoch milliseconds out of range: {}", self.0)
    }
}
