//! ISO-8601 UTC timestamps and the `Clock` seam that keeps wall-clock reads
//! out of reducers (spec §4.3, §9 "Wall-clock reads inside reducers are
//! forbidden; the kernel passes `event.at` explicitly").

use serde::{Deserialize, Serialize};
use std::fmt;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// A UTC instant, serialized as RFC 3339 / ISO-8601 (e.g.
/// `2026-01-31T12:00:00Z`). Always UTC — no local offsets are stored.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Timestamp(i128);

impl Timestamp {
    /// Builds a `Timestamp` from a `time::OffsetDateTime`, normalizing to UTC.
    pub fn from_offset(dt: OffsetDateTime) -> Self {
        Self(dt.to_offset(time::UtcOffset::UTC).unix_timestamp_nanos())
    }

    /// The underlying `OffsetDateTime`, always at UTC offset.
    ///
    /// Falls back to the Unix epoch if the stored nanosecond count is ever
    /// out of `OffsetDateTime`'s representable range; in practice this can't
    /// happen since `Timestamp` is only ever constructed from an existing
    /// valid `OffsetDateTime`.
    pub fn as_offset(&self) -> OffsetDateTime {
        OffsetDateTime::from_unix_timestamp_nanos(self.0).unwrap_or(OffsetDateTime::UNIX_EPOCH)
    }

    /// Parses an RFC 3339 string.
    pub fn parse(s: &str) -> Result<Self, time::error::Parse> {
        OffsetDateTime::parse(s, &Rfc3339).map(Self::from_offset)
    }

    /// Formats as RFC 3339 with a literal `Z` suffix (UTC).
    pub fn to_rfc3339(&self) -> String {
        self.as_offset()
            .format(&Rfc3339)
            .expect("UTC offset always formats under Rfc3339")
    }

    /// Whether `self` falls within `[start, end)`.
    pub fn in_half_open_range(&self, start: &Timestamp, end: &Timestamp) -> bool {
        self >= start && self < end
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_rfc3339())
    }
}

impl TryFrom<String> for Timestamp {
    type Error = time::error::Parse;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<Timestamp> for String {
    fn from(t: Timestamp) -> Self {
        t.to_rfc3339()
    }
}

/// A seam for obtaining "now" so tests can supply a canned clock instead of
/// `OffsetDateTime::now_utc()`. Every ingress handler reads `Clock::now()`
/// exactly once and threads the resulting `Timestamp` through as `event.at`
/// — reducers themselves never call a clock (spec §9).
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// The system clock, backed by `OffsetDateTime::now_utc()`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_offset(OffsetDateTime::now_utc())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrips_through_rfc3339() {
        let original = Timestamp::parse("2026-01-31T12:00:00Z").unwrap();
        let text = original.to_rfc3339();
        let reparsed = Timestamp::parse(&text).unwrap();
        assert_eq!(original, reparsed);
    }

    #[test]
    fn half_open_range() {
        let start = Timestamp::parse("2026-01-01T00:00:00Z").unwrap();
        let end = Timestamp::parse("2026-02-01T00:00:00Z").unwrap();
        let inside = Timestamp::parse("2026-01-15T00:00:00Z").unwrap();
        assert!(inside.in_half_open_range(&start, &end));
        assert!(!end.in_half_open_range(&start, &end));
    }
}
