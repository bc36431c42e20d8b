//! In-memory data source for tests and embedding.

use super::{DataSource, DataSourceError};
use crate::domain::{Disposal, Instrument, Lot, PortfolioSnapshot};

/// Data source that returns predefined records.
#[derive(Debug, Clone, Default)]
pub struct MockDataSource {
    instruments: Vec<Instrument>,
    lots: Vec<Lot>,
    disposals: Vec<Disposal>,
    snapshots: Vec<PortfolioSnapshot>,
}

impl MockDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_instrument(mut self, instrument: Instrument) -> Self {
        self.instruments.push(instrument);
        self
    }

    pub fn with_lot(mut self, lot: Lot) -> Self {
        self.lots.push(lot);
        self
    }

    pub fn with_lots(mut self, lots: Vec<Lot>) -> Self {
        self.lots.extend(lots);
        self
    }

    pub fn with_disposal(mut self, disposal: Disposal) -> Self {
        self.disposals.push(disposal);
        self
    }

    pub fn with_disposals(mut self, disposals: Vec<Disposal>) -> Self {
        self.disposals.extend(disposals);
        self
    }

    pub fn with_snapshot(mut self, snapshot: PortfolioSnapshot) -> Self {
        self.snapshots.push(snapshot);
        self
    }
}

impl DataSource for MockDataSource {
    fn fetch_instruments(&self) -> Result<Vec<Instrument>, DataSourceError> {
        Ok(self.instruments.clone())
    }

    fn fetch_lots(&self) -> Result<Vec<Lot>, DataSourceError> {
        Ok(self.lots.clone())
    }

    fn fetch_disposals(&self) -> Result<Vec<Disposal>, DataSourceError> {
        Ok(self.disposals.clone())
    }

    fn fetch_snapshots(&self) -> Result<Vec<PortfolioSnapshot>, DataSourceError> {
        Ok(self.snapshots.clone())
    }
}
