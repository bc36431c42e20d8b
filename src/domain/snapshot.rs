//! Historical price snapshot.

use crate::domain::{Decimal, InstrumentId, SnapshotId, TimeMs};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Instrument prices recorded at one historical instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSnapshot {
    pub id: SnapshotId,
    pub time_ms: TimeMs,
    /// BTreeMap for deterministic iteration order.
    pub prices: BTreeMap<InstrumentId, Decimal>,
}

impl PortfolioSnapshot {
    pub fn new(id: SnapshotId, time_ms: TimeMs) -> Self {
        Self {
            id,
            time_ms,
            prices: BTreeMap::new(),
        }
    }

    pub fn with_price(mut self, instrument_id: InstrumentId, price: Decimal) -> Self {
        self.prices.insert(instrument_id, price);
        self
    }

    pub fn price_of(&self, instrument_id: InstrumentId) -> Option<Decimal> {
        self.prices.get(&instrument_id).copied()
    }
}
