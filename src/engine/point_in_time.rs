//! Point-in-time reconstruction: replay an instrument's history up to a cutoff.
//!
//! Every query replays from the start of the instrument's history. See
//! [`crate::compile`] for resuming from a checkpoint instead.

use crate::domain::{
    sort_events_deterministic, Decimal, Event, EventOrderingKey, InstrumentId, RecordId, TimeMs,
};
use serde::{Deserialize, Serialize};

use super::replay::{replay, Replay, WacReplayer};
use super::{EngineError, OversellPolicy, ReplayState, SaleOutcome};

/// Replay only events with `time_ms <= cutoff`.
pub fn state_at(
    instrument_id: InstrumentId,
    events: &[Event],
    cutoff: TimeMs,
    policy: OversellPolicy,
) -> Result<Replay, EngineError> {
    let included: Vec<Event> = events
        .iter()
        .filter(|e| e.time_ms <= cutoff)
        .cloned()
        .collect();
    replay(instrument_id, &included, policy)
}

/// One purchase contributing to the position a sale drew from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseLine {
    pub record_id: RecordId,
    pub time_ms: TimeMs,
    pub shares: Decimal,
    pub price: Decimal,
    /// `shares * price`
    pub total: Decimal,
}

/// How a sale's cost basis was derived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleCalculation {
    pub instrument_id: InstrumentId,
    pub record_id: RecordId,
    /// Purchases replayed before the sale, in replay order.
    pub purchases: Vec<PurchaseLine>,
    /// Position immediately before the sale.
    pub state_before: ReplayState,
    pub total_capital: Decimal,
    pub total_shares: Decimal,
    pub wac: Decimal,
    pub sale_price: Decimal,
    pub shares: Decimal,
    pub profit: Decimal,
    pub outcome: SaleOutcome,
}

/// Reconstruct the position just before a given disposal and replay the
/// disposal itself.
///
/// The cut is made on the ordering key, so purchases at the same instant as
/// the sale are included and the sale is not.
pub fn state_before_sale(
    instrument_id: InstrumentId,
    events: &[Event],
    record_id: RecordId,
    policy: OversellPolicy,
) -> Result<SaleCalculation, EngineError> {
    let sale = events
        .iter()
        .find(|e| e.is_sell() && e.record_id == record_id)
        .ok_or(EngineError::UnknownDisposal {
            instrument_id,
            record_id,
        })?;
    let sale_key = EventOrderingKey::from_event(sale);

    let mut preceding: Vec<Event> = events
        .iter()
        .filter(|e| EventOrderingKey::from_event(e) < sale_key)
        .cloned()
        .collect();
    sort_events_deterministic(&mut preceding);

    let mut replayer = WacReplayer::new(instrument_id, policy);
    for event in &preceding {
        replayer.process_event(event)?;
    }
    let state_before = replayer.state;

    replayer.process_event(sale)?;
    let outcome = replayer
        .outcomes()
        .last()
        .cloned()
        .ok_or(EngineError::UnknownDisposal {
            instrument_id,
            record_id,
        })?;

    let purchases = preceding
        .iter()
        .filter(|e| e.is_buy())
        .map(|e| PurchaseLine {
            record_id: e.record_id,
            time_ms: e.time_ms,
            shares: e.shares,
            price: e.price,
            total: e.shares * e.price,
        })
        .collect();

    Ok(SaleCalculation {
        instrument_id,
        record_id,
        purchases,
        state_before,
        total_capital: state_before.capital,
        total_shares: state_before.shares,
        wac: outcome.wac_at_sale,
        sale_price: outcome.sale_price,
        shares: outcome.shares,
        profit: outcome.realized_profit,
        outcome,
    })
}

/// The outcome a given disposal receives in a full replay.
pub fn outcome_at_sale(
    instrument_id: InstrumentId,
    events: &[Event],
    record_id: RecordId,
    policy: OversellPolicy,
) -> Result<SaleOutcome, EngineError> {
    state_before_sale(instrument_id, events, record_id, policy).map(|calc| calc.outcome)
}
