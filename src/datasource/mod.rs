//! Data source abstraction for loading instruments, trade records and price snapshots.

use crate::domain::{Disposal, Instrument, Lot, PortfolioSnapshot};
use std::fmt;

pub mod csv_dir;
pub mod mock;

pub use csv_dir::CsvDataSource;
pub use mock::MockDataSource;

/// Data source trait for the records the engine replays.
///
/// Implementations return records as stored; validation happens in
/// [`crate::orchestration::validation`].
pub trait DataSource: Send + Sync + fmt::Debug {
    /// Fetch every instrument with its current reference price.
    fn fetch_instruments(&self) -> Result<Vec<Instrument>, DataSourceError>;

    /// Fetch all purchases, any order.
    fn fetch_lots(&self) -> Result<Vec<Lot>, DataSourceError>;

    /// Fetch all sales, any order.
    fn fetch_disposals(&self) -> Result<Vec<Disposal>, DataSourceError>;

    /// Fetch historical price snapshots. Sources without history return an
    /// empty vector.
    fn fetch_snapshots(&self) -> Result<Vec<PortfolioSnapshot>, DataSourceError>;
}

/// Error type for data source operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSourceError {
    /// A required file or table is absent.
    Missing(String),
    /// Reading failed (e.g., permissions, truncated file)
    Io(String),
    /// A row could not be parsed.
    Parse { source: String, message: String },
    /// Other error
    Other(String),
}

impl fmt::Display for DataSourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSourceError::Missing(what) => write!(f, "Missing data: {}", what),
            DataSourceError::Io(msg) => write!(f, "IO error: {}", msg),
            DataSourceError::Parse { source, message } => {
                write!(f, "Parse error in {}: {}", source, message)
            }
            DataSourceError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for DataSourceError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_datasource_error_display() {
        let err = DataSourceError::Missing("lots.csv".to_string());
        assert_eq!(err.to_string(), "Missing data: lots.csv");

        let err = DataSourceError::Parse {
            source: "lots.csv".to_string(),
            message: "invalid shares".to_string(),
        };
        assert_eq!(err.to_string(), "Parse error in lots.csv: invalid shares");

        let err = DataSourceError::Io("permission denied".to_string());
        assert_eq!(err.to_string(), "IO error: permission denied");
    }
}
