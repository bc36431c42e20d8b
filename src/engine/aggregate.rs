//! Portfolio-level reduction over per-instrument replays.

use crate::domain::{Decimal, Instrument, InstrumentId};
use serde::{Deserialize, Serialize};

use super::replay::Replay;

/// Per-instrument line of the portfolio summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionSummary {
    pub instrument_id: InstrumentId,
    pub name: String,
    pub shares: Decimal,
    pub final_wac: Decimal,
    pub capital: Decimal,
    pub current_price: Decimal,
    pub unrealized_value: Decimal,
    pub unrealized_utility: Decimal,
    pub unrealized_performance_pct: Decimal,
    pub realized_profit: Decimal,
    pub sales: usize,
}

impl PositionSummary {
    pub fn from_replay(instrument: &Instrument, replay: &Replay) -> Self {
        let valuation = replay.state.valuation(instrument.current_price);
        Self {
            instrument_id: instrument.id,
            name: instrument.name.clone(),
            shares: valuation.shares,
            final_wac: valuation.final_wac,
            capital: valuation.capital,
            current_price: instrument.current_price,
            unrealized_value: valuation.unrealized_value,
            unrealized_utility: valuation.unrealized_utility,
            unrealized_performance_pct: valuation.unrealized_performance_pct,
            realized_profit: replay.realized_profit(),
            sales: replay.outcomes.len(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.shares.is_positive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioTotals {
    pub total_capital: Decimal,
    pub total_unrealized_value: Decimal,
    pub total_unrealized_utility: Decimal,
    pub total_performance_pct: Decimal,
    pub total_realized_profit: Decimal,
    pub num_positions: usize,
}

/// Reduce instrument summaries into portfolio totals.
///
/// Only open positions (`shares > 0`) count towards capital, value, utility and
/// `num_positions`; realized profit is summed over every instrument.
pub fn aggregate_portfolio(positions: &[PositionSummary]) -> PortfolioTotals {
    let mut totals = PortfolioTotals::default();

    for position in positions {
        totals.total_realized_profit += position.realized_profit;
        if !position.is_open() {
            continue;
        }
        totals.total_capital += position.capital;
        totals.total_unrealized_value += position.unrealized_value;
        totals.total_unrealized_utility += position.unrealized_utility;
        totals.num_positions += 1;
    }

    totals.total_performance_pct = (totals.total_unrealized_utility * Decimal::hundred())
        .checked_ratio(totals.total_capital);
    totals
}
