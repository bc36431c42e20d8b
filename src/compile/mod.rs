//! Checkpointed replay for instruments whose history only grows at the end.
//!
//! This module provides:
//! - Watermark-based incremental replay
//! - Resumption from a stored [`ReplayState`] instead of replaying from zero

use crate::domain::{EventOrderingKey, InstrumentId};
use crate::engine::{ReplayState, SaleOutcome};
use serde::{Deserialize, Serialize};

pub mod incremental;

pub use incremental::{CompileError, Compiler};

/// Compile state for one instrument.
///
/// Stores the running position and the ordering key of the last replayed
/// event so later events can be applied without a full replay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileState {
    pub instrument_id: InstrumentId,
    pub state: ReplayState,
    /// Key of the last processed event.
    pub watermark: Option<EventOrderingKey>,
    /// Outcomes of every sale replayed so far, in replay order.
    pub outcomes: Vec<SaleOutcome>,
}

impl CompileState {
    pub fn new(instrument_id: InstrumentId) -> Self {
        Self {
            instrument_id,
            state: ReplayState::new(),
            watermark: None,
            outcomes: Vec::new(),
        }
    }

    /// Check if this is the first compilation (no watermark set).
    pub fn is_first_compilation(&self) -> bool {
        self.watermark.is_none()
    }

    pub fn update_watermark(&mut self, key: EventOrderingKey) {
        self.watermark = Some(key);
    }
}
