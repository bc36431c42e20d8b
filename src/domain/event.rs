//! Unified replay event built from lots and disposals.

use crate::domain::{Decimal, Disposal, EventKind, InstrumentId, Lot, RecordId, TimeMs};
use serde::{Deserialize, Serialize};

/// One buy or sell, as seen by the replay engine.
///
/// Built fresh for every computation; lot identity is not carried past this
/// point beyond `record_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub instrument_id: InstrumentId,
    pub time_ms: TimeMs,
    pub kind: EventKind,
    pub shares: Decimal,
    pub price: Decimal,
    pub record_id: RecordId,
}

impl Event {
    pub fn from_lot(lot: &Lot) -> Self {
        Event {
            instrument_id: lot.instrument_id,
            time_ms: lot.time_ms,
            kind: EventKind::Buy,
            shares: lot.shares,
            price: lot.price,
            record_id: lot.id,
        }
    }

    pub fn from_disposal(disposal: &Disposal) -> Self {
        Event {
            instrument_id: disposal.instrument_id,
            time_ms: disposal.time_ms,
            kind: EventKind::Sell,
            shares: disposal.shares,
            price: disposal.price,
            record_id: disposal.id,
        }
    }

    pub fn is_buy(&self) -> bool {
        self.kind == EventKind::Buy
    }

    pub fn is_sell(&self) -> bool {
        self.kind == EventKind::Sell
    }
}

/// Normalize one instrument's lots and disposals into events.
///
/// Records for other instruments are skipped. The result is unordered; see
/// [`crate::domain::ordering::sort_events_deterministic`].
pub fn events_for_instrument(
    instrument_id: InstrumentId,
    lots: &[Lot],
    disposals: &[Disposal],
) -> Vec<Event> {
    let buys = lots
        .iter()
        .filter(|lot| lot.instrument_id == instrument_id)
        .map(Event::from_lot);
    let sells = disposals
        .iter()
        .filter(|d| d.instrument_id == instrument_id)
        .map(Event::from_disposal);
    buys.chain(sells).collect()
}
