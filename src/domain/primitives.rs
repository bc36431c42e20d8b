//! Domain primitives: TimeMs, InstrumentId, RecordId, SnapshotId, EventKind.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Time in milliseconds since Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimeMs(pub i64);

impl TimeMs {
    pub fn new(ms: i64) -> Self {
        TimeMs(ms)
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }

    /// Midnight UTC of a calendar date.
    pub fn from_date(date: NaiveDate) -> Self {
        TimeMs(date.and_time(chrono::NaiveTime::MIN).and_utc().timestamp_millis())
    }

    /// Parse millis, a `YYYY-MM-DD` date, or an RFC 3339 timestamp.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if let Ok(ms) = input.parse::<i64>() {
            return Some(TimeMs(ms));
        }
        if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
            return Some(Self::from_date(date));
        }
        DateTime::parse_from_rfc3339(input)
            .ok()
            .map(|dt| TimeMs(dt.with_timezone(&Utc).timestamp_millis()))
    }
}

impl std::fmt::Display for TimeMs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stable identifier of a tradable instrument (ticker).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InstrumentId(pub i64);

impl InstrumentId {
    pub fn new(id: i64) -> Self {
        InstrumentId(id)
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for InstrumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of the purchase or sale record an event came from.
///
/// Lots and disposals live in separate id spaces; pair it with an [`EventKind`]
/// to identify a record uniquely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordId(pub i64);

impl RecordId {
    pub fn new(id: i64) -> Self {
        RecordId(id)
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a historical price snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SnapshotId(pub i64);

impl SnapshotId {
    pub fn new(id: i64) -> Self {
        SnapshotId(id)
    }
}

impl std::fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Event kind: a purchase (Lot) or a sale (Disposal).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Buy,
    Sell,
}

impl EventKind {
    /// Rank used on timestamp ties: buys replay before sells.
    pub fn tie_rank(&self) -> u8 {
        match self {
            EventKind::Buy => 0,
            EventKind::Sell => 1,
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventKind::Buy => write!(f, "buy"),
            EventKind::Sell => write!(f, "sell"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tie_rank_puts_buy_first() {
        assert!(EventKind::Buy.tie_rank() < EventKind::Sell.tie_rank());
    }

    #[test]
    fn test_event_kind_serialization() {
        assert_eq!(serde_json::to_string(&EventKind::Buy).unwrap(), "\"buy\"");
        assert_eq!(serde_json::to_string(&EventKind::Sell).unwrap(), "\"sell\"");
    }

    #[test]
    fn test_timems_parse_formats() {
        assert_eq!(TimeMs::parse("1700000000000"), Some(TimeMs::new(1_700_000_000_000)));
        assert_eq!(TimeMs::parse("1970-01-02"), Some(TimeMs::new(86_400_000)));
        assert_eq!(
            TimeMs::parse("1970-01-01T00:00:01Z"),
            Some(TimeMs::new(1_000))
        );
        assert_eq!(
            TimeMs::parse("1970-01-01T01:00:00+01:00"),
            Some(TimeMs::new(0))
        );
        assert_eq!(TimeMs::parse("not a date"), None);
    }

    #[test]
    fn test_timems_ordering() {
        assert!(TimeMs::new(1000) < TimeMs::new(2000));
    }

    #[test]
    fn test_ids_display() {
        assert_eq!(InstrumentId::new(18).to_string(), "18");
        assert_eq!(RecordId::new(7).to_string(), "7");
    }
}
