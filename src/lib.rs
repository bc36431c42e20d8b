pub mod compile;
pub mod config;
pub mod datasource;
pub mod domain;
pub mod engine;
pub mod error;
pub mod orchestration;

pub use compile::{CompileState, Compiler};
pub use config::Config;
pub use datasource::{CsvDataSource, DataSource, DataSourceError, MockDataSource};
pub use domain::{
    Decimal, Disposal, Event, EventKind, Instrument, InstrumentId, Lot, PortfolioSnapshot,
    RecordId, SnapshotId, TimeMs,
};
pub use engine::{OversellPolicy, ReplayState, SaleOutcome};
pub use error::AppError;
pub use orchestration::{PortfolioReport, PortfolioReporter};
