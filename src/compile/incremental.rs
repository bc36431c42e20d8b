//! Incremental replay: apply only the events past a compile state's watermark.

use crate::domain::{sort_events_deterministic, Event, EventOrderingKey};
use crate::engine::{EngineError, OversellPolicy, WacReplayer};
use thiserror::Error;

use super::CompileState;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("event keyed {found:?} is not past watermark {watermark:?}; rebuild from scratch")]
    OutOfOrder {
        watermark: EventOrderingKey,
        found: EventOrderingKey,
    },
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Compiler for incremental replay.
pub struct Compiler;

impl Compiler {
    /// Apply `new_events` on top of `compile_state`.
    ///
    /// Every event must order strictly after the watermark; an event keyed at
    /// or before it means history changed and the state must be rebuilt with
    /// [`CompileState::new`]. On error the compile state is left untouched.
    ///
    /// # Returns
    /// Number of events processed
    pub fn compile_incremental(
        compile_state: &mut CompileState,
        new_events: &[Event],
        policy: OversellPolicy,
    ) -> Result<usize, CompileError> {
        if new_events.is_empty() {
            return Ok(0);
        }

        let mut ordered = new_events.to_vec();
        sort_events_deterministic(&mut ordered);

        if let Some(watermark) = compile_state.watermark {
            let first = EventOrderingKey::from_event(&ordered[0]);
            if first <= watermark {
                return Err(CompileError::OutOfOrder {
                    watermark,
                    found: first,
                });
            }
        }

        let mut replayer =
            WacReplayer::resume(compile_state.instrument_id, compile_state.state, policy);
        for event in &ordered {
            replayer.process_event(event)?;
        }

        let last_key = ordered.last().map(EventOrderingKey::from_event);
        let replay = replayer.into_replay();
        compile_state.state = replay.state;
        compile_state.outcomes.extend(replay.outcomes);
        if let Some(key) = last_key {
            compile_state.update_watermark(key);
        }

        tracing::debug!(
            instrument_id = %compile_state.instrument_id,
            processed = ordered.len(),
            "Compiled events past watermark"
        );
        Ok(ordered.len())
    }
}
