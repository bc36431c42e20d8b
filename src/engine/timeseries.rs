//! Unrealized utility over historical price snapshots.

use crate::domain::{Decimal, Event, InstrumentId, PortfolioSnapshot, SnapshotId, TimeMs};
use serde::{Deserialize, Serialize};

use super::point_in_time::state_at;
use super::{EngineError, OversellPolicy};

/// Full event history of one instrument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstrumentHistory {
    pub instrument_id: InstrumentId,
    pub events: Vec<Event>,
}

impl InstrumentHistory {
    pub fn new(instrument_id: InstrumentId, events: Vec<Event>) -> Self {
        Self {
            instrument_id,
            events,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UtilityPoint {
    pub snapshot_id: SnapshotId,
    pub time_ms: TimeMs,
    pub utility: Decimal,
}

/// Value every instrument's position at each snapshot.
///
/// Each point sums `(snapshot_price - wac) * shares` over instruments holding a
/// positive position at the snapshot's instant. An instrument with no price in
/// a snapshot contributes nothing. Points are ordered by `(time_ms, id)`; no
/// interpolation happens between snapshots.
pub fn build_utility_series(
    histories: &[InstrumentHistory],
    snapshots: &[PortfolioSnapshot],
    policy: OversellPolicy,
) -> Result<Vec<UtilityPoint>, EngineError> {
    let mut ordered: Vec<&PortfolioSnapshot> = snapshots.iter().collect();
    ordered.sort_by_key(|s| (s.time_ms, s.id));

    let mut series = Vec::with_capacity(ordered.len());
    for snapshot in ordered {
        let mut utility = Decimal::zero();
        for history in histories {
            let replay = state_at(history.instrument_id, &history.events, snapshot.time_ms, policy)?;
            if !replay.state.is_open() {
                continue;
            }
            let Some(price) = snapshot.price_of(history.instrument_id) else {
                tracing::debug!(
                    instrument_id = %history.instrument_id,
                    snapshot_time_ms = %snapshot.time_ms,
                    "Snapshot has no price for open position"
                );
                continue;
            };
            utility += (price - replay.state.wac()) * replay.state.shares;
        }

        series.push(UtilityPoint {
            snapshot_id: snapshot.id,
            time_ms: snapshot.time_ms,
            utility,
        });
    }

    Ok(series)
}
