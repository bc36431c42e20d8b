//! Domain types and determinism layer for the WAC position engine.
//!
//! This module provides:
//! - Lossless numeric handling via Decimal wrapper
//! - Domain primitives: TimeMs, InstrumentId, RecordId, SnapshotId, EventKind
//! - Source records (Instrument, Lot, Disposal) and the unified Event
//! - Stable event ordering key with the buy-before-sell tie-break

pub mod decimal;
pub mod event;
pub mod ordering;
pub mod primitives;
pub mod records;
pub mod snapshot;

pub use decimal::Decimal;
pub use event::{events_for_instrument, Event};
pub use ordering::{sort_events_deterministic, EventOrderingKey};
pub use primitives::{EventKind, InstrumentId, RecordId, SnapshotId, TimeMs};
pub use records::{Disposal, Instrument, Lot};
pub use snapshot::PortfolioSnapshot;
