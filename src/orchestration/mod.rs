//! Glue between data sources and the replay engine.

pub mod reporter;
pub mod validation;

pub use reporter::{PortfolioReport, PortfolioReporter, ReportError, SaleReport};
pub use validation::{max_magnitude, validate_records, validate_snapshots, ValidationError};
