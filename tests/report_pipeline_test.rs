//! End-to-end report building from CSV exports and in-memory sources.

use std::fs;
use tempfile::TempDir;
use wacfolio::datasource::csv_dir::{DISPOSALS_FILE, INSTRUMENTS_FILE, LOTS_FILE, SNAPSHOTS_FILE};
use wacfolio::engine::EngineError;
use wacfolio::orchestration::{ReportError, ValidationError};
use wacfolio::{
    CsvDataSource, DataSourceError, Decimal, Disposal, Instrument, InstrumentId, Lot,
    MockDataSource, OversellPolicy, PortfolioReporter, PortfolioSnapshot, RecordId, SnapshotId,
    TimeMs,
};

fn d(s: &str) -> Decimal {
    Decimal::from_str_canonical(s).unwrap()
}

fn write_portfolio(dir: &TempDir) {
    fs::write(
        dir.path().join(INSTRUMENTS_FILE),
        "id,name,current_price\n1,ACME,120\n2,BETA,50\n",
    )
    .unwrap();
    fs::write(
        dir.path().join(LOTS_FILE),
        "id,instrument_id,date,shares,price,operation_cost\n\
         2,1,2024-02-01,10,200,\n\
         1,1,2024-01-01,10,100,\n\
         3,2,2024-01-15,4,40,1.5\n",
    )
    .unwrap();
    fs::write(
        dir.path().join(DISPOSALS_FILE),
        "id,instrument_id,date,shares,price,operation_cost,withheld_tax\n\
         1,1,2024-03-01,5,180,2,10\n\
         2,2,2024-03-02,4,45,,\n",
    )
    .unwrap();
    fs::write(
        dir.path().join(SNAPSHOTS_FILE),
        "snapshot_id,date,instrument_id,price\n\
         2,2024-03-10,1,160\n\
         1,2024-01-20,1,110\n\
         1,2024-01-20,2,42\n",
    )
    .unwrap();
}

#[test]
fn test_csv_report_end_to_end() {
    let dir = TempDir::new().unwrap();
    write_portfolio(&dir);
    let source = CsvDataSource::new(dir.path());

    let report = PortfolioReporter::new(OversellPolicy::Reject)
        .build_report(&source)
        .unwrap();

    assert_eq!(report.positions.len(), 2);
    let acme = &report.positions[0];
    assert_eq!(acme.instrument_id, InstrumentId::new(1));
    assert_eq!(acme.shares, d("15"));
    assert_eq!(acme.final_wac, d("150"));
    assert_eq!(acme.capital, d("2250"));
    assert_eq!(acme.unrealized_value, d("1800"));
    assert_eq!(acme.unrealized_utility, d("-450"));
    assert_eq!(acme.unrealized_performance_pct, d("-20"));

    let beta = &report.positions[1];
    assert!(!beta.is_open());
    assert_eq!(beta.unrealized_utility, Decimal::zero());
    assert_eq!(beta.realized_profit, d("20"));

    assert_eq!(report.totals.num_positions, 1);
    assert_eq!(report.totals.total_capital, d("2250"));
    assert_eq!(report.totals.total_unrealized_utility, d("-450"));
    assert_eq!(report.totals.total_performance_pct, d("-20"));
    assert_eq!(report.totals.total_realized_profit, d("170"));

    let sale_ids: Vec<RecordId> = report.sales.iter().map(|s| s.outcome.record_id).collect();
    assert_eq!(sale_ids, vec![RecordId::new(1), RecordId::new(2)]);
    assert_eq!(report.sales[0].outcome.realized_profit, d("150"));
    assert_eq!(report.sales[0].net_proceeds, d("888"));
    assert_eq!(report.sales[1].withheld_tax, Decimal::zero());

    let utilities: Vec<Decimal> = report.utility_series.iter().map(|p| p.utility).collect();
    assert_eq!(utilities, vec![d("108"), d("150")]);
}

#[test]
fn test_report_serializes_camel_case() {
    let dir = TempDir::new().unwrap();
    write_portfolio(&dir);
    let report = PortfolioReporter::default()
        .build_report(&CsvDataSource::new(dir.path()))
        .unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["totals"]["numPositions"], 1);
    assert!(json["positions"][0].get("finalWac").is_some());
    assert!(json["sales"][0].get("wacAtSale").is_some());
    assert!(json["sales"][0].get("netProceeds").is_some());
    assert_eq!(json["utilitySeries"].as_array().unwrap().len(), 2);
}

#[test]
fn test_sale_calculation_from_csv() {
    let dir = TempDir::new().unwrap();
    write_portfolio(&dir);

    let calc = PortfolioReporter::default()
        .sale_calculation(&CsvDataSource::new(dir.path()), RecordId::new(1))
        .unwrap();
    assert_eq!(calc.purchases.len(), 2);
    assert_eq!(calc.total_capital, d("3000"));
    assert_eq!(calc.total_shares, d("20"));
    assert_eq!(calc.wac, d("150"));
    assert_eq!(calc.profit, d("150"));
}

#[test]
fn test_missing_instruments_file() {
    let dir = TempDir::new().unwrap();
    let err = PortfolioReporter::default()
        .build_report(&CsvDataSource::new(dir.path()))
        .unwrap_err();
    assert!(matches!(err, ReportError::Source(DataSourceError::Missing(_))));
}

#[test]
fn test_snapshots_file_is_optional() {
    let dir = TempDir::new().unwrap();
    write_portfolio(&dir);
    fs::remove_file(dir.path().join(SNAPSHOTS_FILE)).unwrap();

    let report = PortfolioReporter::default()
        .build_report(&CsvDataSource::new(dir.path()))
        .unwrap();
    assert!(report.utility_series.is_empty());
    assert_eq!(report.positions.len(), 2);
}

fn oversold_source() -> MockDataSource {
    let acme = InstrumentId::new(1);
    MockDataSource::new()
        .with_instrument(Instrument::new(acme, "ACME", d("10")))
        .with_lot(Lot::new(RecordId::new(1), acme, TimeMs::new(1000), d("1"), d("100")))
        .with_disposal(Disposal::new(RecordId::new(7), acme, TimeMs::new(2000), d("2"), d("110")))
}

#[test]
fn test_oversell_is_rejected_by_default() {
    let err = PortfolioReporter::default()
        .build_report(&oversold_source())
        .unwrap_err();
    match err {
        ReportError::Engine(EngineError::Oversell {
            record_id,
            held,
            requested,
            ..
        }) => {
            assert_eq!(record_id, RecordId::new(7));
            assert_eq!(held, d("1"));
            assert_eq!(requested, d("2"));
        }
        other => panic!("Expected oversell error, got {:?}", other),
    }
}

#[test]
fn test_oversell_clamped_closes_position() {
    let report = PortfolioReporter::new(OversellPolicy::Clamp)
        .build_report(&oversold_source())
        .unwrap();
    assert_eq!(report.totals.num_positions, 0);
    assert_eq!(report.totals.total_capital, Decimal::zero());
    assert_eq!(report.totals.total_performance_pct, Decimal::zero());
    assert_eq!(report.sales[0].outcome.shares, d("1"));
}

#[test]
fn test_invalid_records_are_rejected_before_replay() {
    let acme = InstrumentId::new(1);
    let source = MockDataSource::new()
        .with_instrument(Instrument::new(acme, "ACME", d("10")))
        .with_lot(Lot::new(RecordId::new(1), acme, TimeMs::new(1000), d("0"), d("100")));

    let err = PortfolioReporter::default().build_report(&source).unwrap_err();
    assert!(matches!(
        err,
        ReportError::Validation(ValidationError::NotPositive { field: "shares", .. })
    ));
}

#[test]
fn test_report_is_idempotent() {
    let dir = TempDir::new().unwrap();
    write_portfolio(&dir);
    let source = CsvDataSource::new(dir.path());
    let reporter = PortfolioReporter::default();

    let first = reporter.build_report(&source).unwrap();
    let second = reporter.build_report(&source).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_repeated_instrument_row_is_rejected() {
    let acme = InstrumentId::new(1);
    let source = MockDataSource::new()
        .with_instrument(Instrument::new(acme, "ACME", d("20")))
        .with_instrument(Instrument::new(acme, "ACME", d("20")))
        .with_lot(Lot::new(RecordId::new(1), acme, TimeMs::new(1000), d("1"), d("10")));

    let err = PortfolioReporter::default().build_report(&source).unwrap_err();
    assert!(matches!(
        err,
        ReportError::Validation(ValidationError::DuplicateInstrument(id)) if id == acme
    ));
}

#[test]
fn test_out_of_range_lot_is_an_error_not_a_panic() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(INSTRUMENTS_FILE), "id,name,current_price\n1,ACME,10\n").unwrap();
    fs::write(
        dir.path().join(LOTS_FILE),
        "id,instrument_id,date,shares,price\n1,1,2024-01-01,100000000000000000,1000000000000\n",
    )
    .unwrap();
    fs::write(dir.path().join(DISPOSALS_FILE), "id,instrument_id,date,shares,price\n").unwrap();

    let err = PortfolioReporter::default()
        .build_report(&CsvDataSource::new(dir.path()))
        .unwrap_err();
    assert!(matches!(
        err,
        ReportError::Validation(ValidationError::TooLarge { field: "shares", .. })
    ));
}

#[test]
fn test_non_positive_snapshot_price_is_rejected() {
    let acme = InstrumentId::new(1);
    let source = MockDataSource::new()
        .with_instrument(Instrument::new(acme, "ACME", d("20")))
        .with_lot(Lot::new(RecordId::new(1), acme, TimeMs::new(1000), d("1"), d("10")))
        .with_snapshot(
            PortfolioSnapshot::new(SnapshotId::new(3), TimeMs::new(2000)).with_price(acme, d("0")),
        );

    let err = PortfolioReporter::default().build_report(&source).unwrap_err();
    assert!(matches!(
        err,
        ReportError::Validation(ValidationError::InvalidSnapshotPrice { .. })
    ));
}

#[test]
fn test_repeated_snapshot_price_row_is_rejected() {
    let dir = TempDir::new().unwrap();
    write_portfolio(&dir);
    fs::write(
        dir.path().join(SNAPSHOTS_FILE),
        "snapshot_id,date,instrument_id,price\n1,2024-01-20,1,110\n1,2024-01-20,1,115\n",
    )
    .unwrap();

    let err = PortfolioReporter::default()
        .build_report(&CsvDataSource::new(dir.path()))
        .unwrap_err();
    assert!(matches!(err, ReportError::Source(DataSourceError::Parse { .. })));
}
