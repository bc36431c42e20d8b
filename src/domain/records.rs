//! Source records supplied by the surrounding application: instruments, lots and disposals.

use crate::domain::{Decimal, InstrumentId, RecordId, TimeMs};
use serde::{Deserialize, Serialize};

/// A tradable instrument with its current reference price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instrument {
    pub id: InstrumentId,
    pub name: String,
    pub current_price: Decimal,
}

impl Instrument {
    pub fn new(id: InstrumentId, name: impl Into<String>, current_price: Decimal) -> Self {
        Self {
            id,
            name: name.into(),
            current_price,
        }
    }
}

/// A purchase of shares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lot {
    pub id: RecordId,
    pub instrument_id: InstrumentId,
    pub time_ms: TimeMs,
    pub shares: Decimal,
    pub price: Decimal,
    /// Broker commission. Informational; never enters the cost basis.
    #[serde(default)]
    pub operation_cost: Decimal,
}

impl Lot {
    pub fn new(
        id: RecordId,
        instrument_id: InstrumentId,
        time_ms: TimeMs,
        shares: Decimal,
        price: Decimal,
    ) -> Self {
        Self {
            id,
            instrument_id,
            time_ms,
            shares,
            price,
            operation_cost: Decimal::zero(),
        }
    }

    pub fn with_operation_cost(mut self, operation_cost: Decimal) -> Self {
        self.operation_cost = operation_cost;
        self
    }

    /// `shares * price`, the amount this lot adds to capital.
    pub fn gross_cost(&self) -> Decimal {
        self.shares * self.price
    }
}

/// A sale of shares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Disposal {
    pub id: RecordId,
    pub instrument_id: InstrumentId,
    pub time_ms: TimeMs,
    pub shares: Decimal,
    pub price: Decimal,
    #[serde(default)]
    pub operation_cost: Decimal,
    #[serde(default)]
    pub withheld_tax: Decimal,
}

impl Disposal {
    pub fn new(
        id: RecordId,
        instrument_id: InstrumentId,
        time_ms: TimeMs,
        shares: Decimal,
        price: Decimal,
    ) -> Self {
        Self {
            id,
            instrument_id,
            time_ms,
            shares,
            price,
            operation_cost: Decimal::zero(),
            withheld_tax: Decimal::zero(),
        }
    }

    pub fn with_costs(mut self, operation_cost: Decimal, withheld_tax: Decimal) -> Self {
        self.operation_cost = operation_cost;
        self.withheld_tax = withheld_tax;
        self
    }

    pub fn gross_proceeds(&self) -> Decimal {
        self.shares * self.price
    }

    /// Cash actually received: gross proceeds minus commission and withheld tax.
    pub fn net_proceeds(&self) -> Decimal {
        self.gross_proceeds() - self.operation_cost - self.withheld_tax
    }
}
