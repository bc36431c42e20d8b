//! Loading records from a directory of CSV exports.
//!
//! Expected files (header row required):
//! - `instruments.csv`: `id,name,current_price`
//! - `lots.csv`: `id,instrument_id,date,shares,price[,operation_cost]`
//! - `disposals.csv`: `id,instrument_id,date,shares,price[,operation_cost,withheld_tax]`
//! - `snapshots.csv` (optional): `snapshot_id,date,instrument_id,price`
//!
//! Dates accept epoch millis, `YYYY-MM-DD`, or RFC 3339.

use super::{DataSource, DataSourceError};
use crate::domain::{
    Decimal, Disposal, Instrument, InstrumentId, Lot, PortfolioSnapshot, RecordId, SnapshotId,
    TimeMs,
};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const INSTRUMENTS_FILE: &str = "instruments.csv";
pub const LOTS_FILE: &str = "lots.csv";
pub const DISPOSALS_FILE: &str = "disposals.csv";
pub const SNAPSHOTS_FILE: &str = "snapshots.csv";

#[derive(Debug, Clone)]
pub struct CsvDataSource {
    dir: PathBuf,
}

impl CsvDataSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn read_file(&self, name: &str) -> Result<Option<Vec<u8>>, DataSourceError> {
        let path = self.dir.join(name);
        match std::fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(DataSourceError::Io(format!("{}: {}", path.display(), e))),
        }
    }

    fn read_required(&self, name: &str) -> Result<Vec<u8>, DataSourceError> {
        self.read_file(name)?
            .ok_or_else(|| DataSourceError::Missing(self.dir.join(name).display().to_string()))
    }

    fn parse_rows<R: DeserializeOwned>(name: &str, bytes: &[u8]) -> Result<Vec<R>, DataSourceError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(bytes);

        reader
            .deserialize::<R>()
            .map(|record| record.map_err(|e| parse_error(name, e.to_string())))
            .collect()
    }
}

fn parse_error(source: &str, message: String) -> DataSourceError {
    DataSourceError::Parse {
        source: source.to_string(),
        message,
    }
}

fn parse_decimal(source: &str, field: &str, raw: &str) -> Result<Decimal, DataSourceError> {
    Decimal::from_str_canonical(raw)
        .map_err(|e| parse_error(source, format!("invalid {} {:?}: {}", field, raw, e)))
}

fn parse_optional_decimal(
    source: &str,
    field: &str,
    raw: Option<&str>,
) -> Result<Decimal, DataSourceError> {
    match raw.filter(|s| !s.is_empty()) {
        Some(raw) => parse_decimal(source, field, raw),
        None => Ok(Decimal::zero()),
    }
}

fn parse_time(source: &str, raw: &str) -> Result<TimeMs, DataSourceError> {
    TimeMs::parse(raw).ok_or_else(|| parse_error(source, format!("invalid date {:?}", raw)))
}

#[derive(Debug, serde::Deserialize)]
struct InstrumentRow {
    id: i64,
    name: String,
    current_price: String,
}

#[derive(Debug, serde::Deserialize)]
struct LotRow {
    id: i64,
    instrument_id: i64,
    date: String,
    shares: String,
    price: String,
    operation_cost: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
struct DisposalRow {
    id: i64,
    instrument_id: i64,
    date: String,
    shares: String,
    price: String,
    operation_cost: Option<String>,
    withheld_tax: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
struct SnapshotRow {
    snapshot_id: i64,
    date: String,
    instrument_id: i64,
    price: String,
}

impl DataSource for CsvDataSource {
    fn fetch_instruments(&self) -> Result<Vec<Instrument>, DataSourceError> {
        let bytes = self.read_required(INSTRUMENTS_FILE)?;
        Self::parse_rows::<InstrumentRow>(INSTRUMENTS_FILE, &bytes)?
            .into_iter()
            .map(|row| {
                Ok(Instrument::new(
                    InstrumentId::new(row.id),
                    row.name,
                    parse_decimal(INSTRUMENTS_FILE, "current_price", &row.current_price)?,
                ))
            })
            .collect()
    }

    fn fetch_lots(&self) -> Result<Vec<Lot>, DataSourceError> {
        let bytes = self.read_required(LOTS_FILE)?;
        Self::parse_rows::<LotRow>(LOTS_FILE, &bytes)?
            .into_iter()
            .map(|row| {
                let lot = Lot::new(
                    RecordId::new(row.id),
                    InstrumentId::new(row.instrument_id),
                    parse_time(LOTS_FILE, &row.date)?,
                    parse_decimal(LOTS_FILE, "shares", &row.shares)?,
                    parse_decimal(LOTS_FILE, "price", &row.price)?,
                );
                let cost =
                    parse_optional_decimal(LOTS_FILE, "operation_cost", row.operation_cost.as_deref())?;
                Ok(lot.with_operation_cost(cost))
            })
            .collect()
    }

    fn fetch_disposals(&self) -> Result<Vec<Disposal>, DataSourceError> {
        let bytes = self.read_required(DISPOSALS_FILE)?;
        Self::parse_rows::<DisposalRow>(DISPOSALS_FILE, &bytes)?
            .into_iter()
            .map(|row| {
                let disposal = Disposal::new(
                    RecordId::new(row.id),
                    InstrumentId::new(row.instrument_id),
                    parse_time(DISPOSALS_FILE, &row.date)?,
                    parse_decimal(DISPOSALS_FILE, "shares", &row.shares)?,
                    parse_decimal(DISPOSALS_FILE, "price", &row.price)?,
                );
                let operation_cost = parse_optional_decimal(
                    DISPOSALS_FILE,
                    "operation_cost",
                    row.operation_cost.as_deref(),
                )?;
                let withheld_tax = parse_optional_decimal(
                    DISPOSALS_FILE,
                    "withheld_tax",
                    row.withheld_tax.as_deref(),
                )?;
                Ok(disposal.with_costs(operation_cost, withheld_tax))
            })
            .collect()
    }

    fn fetch_snapshots(&self) -> Result<Vec<PortfolioSnapshot>, DataSourceError> {
        let Some(bytes) = self.read_file(SNAPSHOTS_FILE)? else {
            return Ok(Vec::new());
        };

        let mut grouped: BTreeMap<i64, PortfolioSnapshot> = BTreeMap::new();
        for row in Self::parse_rows::<SnapshotRow>(SNAPSHOTS_FILE, &bytes)? {
            let time_ms = parse_time(SNAPSHOTS_FILE, &row.date)?;
            let price = parse_decimal(SNAPSHOTS_FILE, "price", &row.price)?;
            let snapshot = grouped
                .entry(row.snapshot_id)
                .or_insert_with(|| PortfolioSnapshot::new(SnapshotId::new(row.snapshot_id), time_ms));
            if snapshot.time_ms != time_ms {
                return Err(parse_error(
                    SNAPSHOTS_FILE,
                    format!("snapshot {} has rows with different dates", row.snapshot_id),
                ));
            }
            let instrument_id = InstrumentId::new(row.instrument_id);
            if snapshot.prices.insert(instrument_id, price).is_some() {
                return Err(parse_error(
                    SNAPSHOTS_FILE,
                    format!(
                        "snapshot {} has more than one price for instrument {}",
                        row.snapshot_id, instrument_id
                    ),
                ));
            }
        }

        Ok(grouped.into_values().collect())
    }
}
