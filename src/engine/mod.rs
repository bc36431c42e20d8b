//! Pure computation engine for weighted-average-cost position replay.

use crate::domain::{Decimal, InstrumentId, RecordId, TimeMs};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod aggregate;
pub mod point_in_time;
pub mod replay;
pub mod timeseries;

pub use aggregate::{aggregate_portfolio, PortfolioTotals, PositionSummary};
pub use point_in_time::{
    outcome_at_sale, state_at, state_before_sale, PurchaseLine, SaleCalculation,
};
pub use replay::{replay, Replay, WacReplayer};
pub use timeseries::{build_utility_series, InstrumentHistory, UtilityPoint};

/// Running position for one instrument.
///
/// `capital` is `shares * wac`. It is reset to exactly zero whenever a sale
/// leaves `shares` at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayState {
    pub shares: Decimal,
    pub capital: Decimal,
}

impl ReplayState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current weighted average cost, or zero with no shares held.
    pub fn wac(&self) -> Decimal {
        self.capital.checked_ratio(self.shares)
    }

    pub fn is_open(&self) -> bool {
        self.shares.is_positive()
    }

    /// Value the remaining position at `current_price`.
    ///
    /// An instrument without a positive share count reports zero utility and
    /// zero performance.
    pub fn valuation(&self, current_price: Decimal) -> PositionValuation {
        let final_wac = self.wac();
        let unrealized_value = self.shares * current_price;
        let (unrealized_utility, unrealized_performance_pct) = if self.is_open() {
            (
                unrealized_value - self.capital,
                ((current_price - final_wac) * Decimal::hundred()).checked_ratio(final_wac),
            )
        } else {
            (Decimal::zero(), Decimal::zero())
        };

        PositionValuation {
            shares: self.shares,
            final_wac,
            capital: self.capital,
            unrealized_value,
            unrealized_utility,
            unrealized_performance_pct,
        }
    }
}

/// End-of-stream figures for one instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionValuation {
    pub shares: Decimal,
    pub final_wac: Decimal,
    pub capital: Decimal,
    pub unrealized_value: Decimal,
    pub unrealized_utility: Decimal,
    pub unrealized_performance_pct: Decimal,
}

/// Result of replaying one disposal, captured when it was processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleOutcome {
    pub instrument_id: InstrumentId,
    pub record_id: RecordId,
    pub time_ms: TimeMs,
    /// Shares actually removed from the position (may be less than requested under `Clamp`).
    pub shares: Decimal,
    pub sale_price: Decimal,
    pub wac_at_sale: Decimal,
    /// `wac_at_sale * shares`
    pub cost_basis: Decimal,
    pub gross_proceeds: Decimal,
    pub realized_profit: Decimal,
    pub realized_performance_pct: Decimal,
}

/// What to do with a sale larger than the held position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OversellPolicy {
    /// Fail the replay.
    #[default]
    Reject,
    /// Sell only what is held.
    Clamp,
    /// Apply the sale as recorded; shares may go negative.
    Allow,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error(
        "sale {record_id} of instrument {instrument_id} sells {requested} shares but only {held} are held"
    )]
    Oversell {
        instrument_id: InstrumentId,
        record_id: RecordId,
        held: Decimal,
        requested: Decimal,
    },
    #[error("no sale {record_id} in the event stream of instrument {instrument_id}")]
    UnknownDisposal {
        instrument_id: InstrumentId,
        record_id: RecordId,
    },
    #[error("record {record_id} of instrument {instrument_id} overflows the decimal range")]
    Overflow {
        instrument_id: InstrumentId,
        record_id: RecordId,
    },
    #[error("event for instrument {found} fed to replay of instrument {expected}")]
    InstrumentMismatch {
        expected: InstrumentId,
        found: InstrumentId,
    },
}
