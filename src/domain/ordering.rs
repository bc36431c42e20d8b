//! Stable event ordering for deterministic replay.

use crate::domain::{Event, RecordId, TimeMs};
use serde::{Deserialize, Serialize};

/// Stable ordering key for events.
///
/// Ordering: time_ms -> kind (buy before sell) -> record_id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EventOrderingKey {
    /// Time in milliseconds (primary sort).
    pub time_ms: TimeMs,
    /// 0 for buys, 1 for sells. A purchase at the same instant as a sale
    /// increases the position before the sale reduces it.
    pub kind_rank: u8,
    /// Originating record id (fallback sort).
    pub record_id: RecordId,
}

impl EventOrderingKey {
    pub fn from_event(event: &Event) -> Self {
        EventOrderingKey {
            time_ms: event.time_ms,
            kind_rank: event.kind.tie_rank(),
            record_id: event.record_id,
        }
    }

    /// Returns true if event_a should replay before event_b.
    pub fn should_come_before(event_a: &Event, event_b: &Event) -> bool {
        Self::from_event(event_a) < Self::from_event(event_b)
    }
}

/// Sort events deterministically.
pub fn sort_events_deterministic(events: &mut [Event]) {
    events.sort_by_key(EventOrderingKey::from_event);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Decimal, EventKind, InstrumentId};

    fn make_event(time_ms: i64, kind: EventKind, record_id: i64) -> Event {
        Event {
            instrument_id: InstrumentId::new(1),
            time_ms: TimeMs::new(time_ms),
            kind,
            shares: Decimal::from(1),
            price: Decimal::from(100),
            record_id: RecordId::new(record_id),
        }
    }

    #[test]
    fn test_event_ordering_by_time() {
        let a = make_event(1000, EventKind::Sell, 1);
        let b = make_event(2000, EventKind::Buy, 1);
        assert!(EventOrderingKey::should_come_before(&a, &b));
        assert!(!EventOrderingKey::should_come_before(&b, &a));
    }

    #[test]
    fn test_buy_before_sell_on_tie() {
        let sell = make_event(1000, EventKind::Sell, 1);
        let buy = make_event(1000, EventKind::Buy, 99);
        assert!(EventOrderingKey::should_come_before(&buy, &sell));
        assert!(!EventOrderingKey::should_come_before(&sell, &buy));
    }

    #[test]
    fn test_same_kind_tie_falls_back_to_record_id() {
        let a = make_event(1000, EventKind::Buy, 1);
        let b = make_event(1000, EventKind::Buy, 2);
        assert!(EventOrderingKey::should_come_before(&a, &b));
    }

    #[test]
    fn test_sort_events_deterministic() {
        let mut events = vec![
            make_event(2000, EventKind::Buy, 3),
            make_event(1000, EventKind::Sell, 1),
            make_event(1000, EventKind::Buy, 2),
        ];

        sort_events_deterministic(&mut events);

        assert_eq!(events[0].kind, EventKind::Buy);
        assert_eq!(events[0].time_ms, TimeMs::new(1000));
        assert_eq!(events[1].kind, EventKind::Sell);
        assert_eq!(events[2].time_ms, TimeMs::new(2000));
    }
}
