use crate::domain::{sort_events_deterministic, Decimal, Event, EventKind, InstrumentId};

use super::{EngineError, OversellPolicy, ReplayState, SaleOutcome};

/// Folds one instrument's ordered events into a running [`ReplayState`].
pub struct WacReplayer {
    pub instrument_id: InstrumentId,
    pub state: ReplayState,
    policy: OversellPolicy,

    // Outputs accumulated during processing.
    outcomes: Vec<SaleOutcome>,
}

impl WacReplayer {
    pub fn new(instrument_id: InstrumentId, policy: OversellPolicy) -> Self {
        Self::resume(instrument_id, ReplayState::new(), policy)
    }

    /// Continue from a previously computed state.
    pub fn resume(instrument_id: InstrumentId, state: ReplayState, policy: OversellPolicy) -> Self {
        Self {
            instrument_id,
            state,
            policy,
            outcomes: Vec::new(),
        }
    }

    /// Process a single event, updating state and emitting a sale outcome for sells.
    ///
    /// Callers must feed events in [`crate::domain::EventOrderingKey`] order.
    pub fn process_event(&mut self, event: &Event) -> Result<(), EngineError> {
        if event.instrument_id != self.instrument_id {
            return Err(EngineError::InstrumentMismatch {
                expected: self.instrument_id,
                found: event.instrument_id,
            });
        }

        match event.kind {
            EventKind::Buy => self.handle_buy(event),
            EventKind::Sell => self.handle_sell(event),
        }
    }

    fn overflow(&self, event: &Event) -> EngineError {
        EngineError::Overflow {
            instrument_id: self.instrument_id,
            record_id: event.record_id,
        }
    }

    fn handle_buy(&mut self, event: &Event) -> Result<(), EngineError> {
        let cost = event
            .shares
            .checked_mul(event.price)
            .ok_or_else(|| self.overflow(event))?;
        let shares = self
            .state
            .shares
            .checked_add(event.shares)
            .ok_or_else(|| self.overflow(event))?;
        let capital = self
            .state
            .capital
            .checked_add(cost)
            .ok_or_else(|| self.overflow(event))?;

        self.state = ReplayState { shares, capital };
        Ok(())
    }

    fn handle_sell(&mut self, event: &Event) -> Result<(), EngineError> {
        let held = self.state.shares;
        let shares = if event.shares > held {
            match self.policy {
                OversellPolicy::Reject => {
                    return Err(EngineError::Oversell {
                        instrument_id: self.instrument_id,
                        record_id: event.record_id,
                        held,
                        requested: event.shares,
                    })
                }
                OversellPolicy::Clamp => {
                    tracing::warn!(
                        instrument_id = %self.instrument_id,
                        record_id = %event.record_id,
                        held = %held,
                        requested = %event.shares,
                        "Sale exceeds held position, clamping"
                    );
                    if held.is_positive() {
                        held
                    } else {
                        Decimal::zero()
                    }
                }
                OversellPolicy::Allow => event.shares,
            }
        } else {
            event.shares
        };

        let wac = self.state.wac();
        let cost_basis = wac.checked_mul(shares).ok_or_else(|| self.overflow(event))?;
        let gross_proceeds = event
            .price
            .checked_mul(shares)
            .ok_or_else(|| self.overflow(event))?;
        let margin = event
            .price
            .checked_sub(wac)
            .ok_or_else(|| self.overflow(event))?;
        let realized_profit = margin
            .checked_mul(shares)
            .ok_or_else(|| self.overflow(event))?;
        let realized_performance_pct = margin
            .checked_mul(Decimal::hundred())
            .ok_or_else(|| self.overflow(event))?
            .checked_ratio(wac);

        let remaining = self
            .state
            .shares
            .checked_sub(shares)
            .ok_or_else(|| self.overflow(event))?;
        let capital = if remaining.is_zero() {
            Decimal::zero()
        } else {
            self.state
                .capital
                .checked_sub(cost_basis)
                .ok_or_else(|| self.overflow(event))?
        };
        self.state = ReplayState {
            shares: remaining,
            capital,
        };

        self.outcomes.push(SaleOutcome {
            instrument_id: self.instrument_id,
            record_id: event.record_id,
            time_ms: event.time_ms,
            shares,
            sale_price: event.price,
            wac_at_sale: wac,
            cost_basis,
            gross_proceeds,
            realized_profit,
            realized_performance_pct,
        });
        Ok(())
    }

    pub fn outcomes(&self) -> &[SaleOutcome] {
        &self.outcomes
    }

    pub fn into_replay(self) -> Replay {
        Replay {
            instrument_id: self.instrument_id,
            state: self.state,
            outcomes: self.outcomes,
        }
    }
}

/// Final state and per-sale captures of a full replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replay {
    pub instrument_id: InstrumentId,
    pub state: ReplayState,
    pub outcomes: Vec<SaleOutcome>,
}

impl Replay {
    pub fn realized_profit(&self) -> Decimal {
        self.outcomes.iter().map(|o| o.realized_profit).sum()
    }
}

/// Replay one instrument's events from an empty position.
///
/// The input may be in any order; a sorted copy is replayed.
pub fn replay(
    instrument_id: InstrumentId,
    events: &[Event],
    policy: OversellPolicy,
) -> Result<Replay, EngineError> {
    let mut ordered = events.to_vec();
    sort_events_deterministic(&mut ordered);

    let mut replayer = WacReplayer::new(instrument_id, policy);
    for event in &ordered {
        replayer.process_event(event)?;
    }

    tracing::debug!(
        instrument_id = %instrument_id,
        events = ordered.len(),
        shares = %replayer.state.shares,
        capital = %replayer.state.capital,
        "Replayed instrument"
    );
    Ok(replayer.into_replay())
}
