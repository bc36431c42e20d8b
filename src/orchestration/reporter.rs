use crate::datasource::{DataSource, DataSourceError};
use crate::domain::{
    events_for_instrument, Decimal, Disposal, Instrument, Lot, PortfolioSnapshot, RecordId,
};
use crate::engine::{
    aggregate_portfolio, build_utility_series, replay, state_before_sale, EngineError,
    InstrumentHistory, OversellPolicy, PortfolioTotals, PositionSummary, SaleCalculation,
    SaleOutcome, UtilityPoint,
};
use crate::orchestration::validation::{validate_records, validate_snapshots, ValidationError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("data source error: {0}")]
    Source(#[from] DataSourceError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("no disposal with id {0}")]
    UnknownSale(RecordId),
}

/// One sale line: the replay outcome plus the informational costs of the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleReport {
    #[serde(flatten)]
    pub outcome: SaleOutcome,
    pub operation_cost: Decimal,
    pub withheld_tax: Decimal,
    pub net_proceeds: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioReport {
    /// One entry per instrument, ordered by instrument id.
    pub positions: Vec<PositionSummary>,
    /// Every sale, ordered by time then instrument then record id.
    pub sales: Vec<SaleReport>,
    pub totals: PortfolioTotals,
    pub utility_series: Vec<UtilityPoint>,
}

struct LoadedRecords {
    instruments: Vec<Instrument>,
    lots: Vec<Lot>,
    disposals: Vec<Disposal>,
}

/// Drives the engine over everything a data source holds.
#[derive(Debug, Clone, Copy, Default)]
pub struct PortfolioReporter {
    policy: OversellPolicy,
}

impl PortfolioReporter {
    pub fn new(policy: OversellPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> OversellPolicy {
        self.policy
    }

    fn load(&self, source: &dyn DataSource) -> Result<LoadedRecords, ReportError> {
        let mut instruments = source.fetch_instruments()?;
        instruments.sort_by_key(|i| i.id);
        let lots = source.fetch_lots()?;
        let disposals = source.fetch_disposals()?;
        validate_records(&instruments, &lots, &disposals)?;

        Ok(LoadedRecords {
            instruments,
            lots,
            disposals,
        })
    }

    /// Replay every instrument, aggregate the results and value the
    /// portfolio at each stored snapshot.
    pub fn build_report(&self, source: &dyn DataSource) -> Result<PortfolioReport, ReportError> {
        let records = self.load(source)?;
        let snapshots: Vec<PortfolioSnapshot> = source.fetch_snapshots()?;
        validate_snapshots(&snapshots)?;

        let disposals_by_id: HashMap<RecordId, &Disposal> =
            records.disposals.iter().map(|d| (d.id, d)).collect();

        let mut positions = Vec::with_capacity(records.instruments.len());
        let mut sales = Vec::with_capacity(records.disposals.len());
        let mut histories = Vec::with_capacity(records.instruments.len());

        for instrument in &records.instruments {
            let events = events_for_instrument(instrument.id, &records.lots, &records.disposals);
            let replayed = replay(instrument.id, &events, self.policy)?;
            positions.push(PositionSummary::from_replay(instrument, &replayed));

            for outcome in replayed.outcomes {
                let Some(disposal) = disposals_by_id.get(&outcome.record_id) else {
                    continue;
                };
                sales.push(SaleReport {
                    operation_cost: disposal.operation_cost,
                    withheld_tax: disposal.withheld_tax,
                    net_proceeds: disposal.net_proceeds(),
                    outcome,
                });
            }
            histories.push(InstrumentHistory::new(instrument.id, events));
        }

        sales.sort_by_key(|s| {
            (
                s.outcome.time_ms,
                s.outcome.instrument_id,
                s.outcome.record_id,
            )
        });

        let totals = aggregate_portfolio(&positions);
        let utility_series = build_utility_series(&histories, &snapshots, self.policy)?;

        tracing::info!(
            instruments = positions.len(),
            sales = sales.len(),
            snapshots = utility_series.len(),
            num_positions = totals.num_positions,
            "Built portfolio report"
        );

        Ok(PortfolioReport {
            positions,
            sales,
            totals,
            utility_series,
        })
    }

    /// Explain how the cost basis of one disposal was derived.
    pub fn sale_calculation(
        &self,
        source: &dyn DataSource,
        record_id: RecordId,
    ) -> Result<SaleCalculation, ReportError> {
        let records = self.load(source)?;
        let disposal = records
            .disposals
            .iter()
            .find(|d| d.id == record_id)
            .ok_or(ReportError::UnknownSale(record_id))?;

        let events = events_for_instrument(disposal.instrument_id, &records.lots, &records.disposals);
        Ok(state_before_sale(
            disposal.instrument_id,
            &events,
            record_id,
            self.policy,
        )?)
    }
}
