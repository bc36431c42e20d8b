//! Boundary checks applied before records reach the replay engine.

use crate::domain::{
    Decimal, Disposal, Instrument, InstrumentId, Lot, PortfolioSnapshot, RecordId, SnapshotId,
};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{record} {id}: {field} must be positive, got {value}")]
    NotPositive {
        record: &'static str,
        id: RecordId,
        field: &'static str,
        value: Decimal,
    },
    #[error("{record} {id}: {field} must not be negative, got {value}")]
    Negative {
        record: &'static str,
        id: RecordId,
        field: &'static str,
        value: Decimal,
    },
    #[error("{record} {id} references unknown instrument {instrument_id}")]
    UnknownInstrument {
        record: &'static str,
        id: RecordId,
        instrument_id: InstrumentId,
    },
    #[error("{record} {id}: {field} {value} exceeds the accepted maximum")]
    TooLarge {
        record: &'static str,
        id: RecordId,
        field: &'static str,
        value: Decimal,
    },
    #[error("duplicate {record} id {id}")]
    DuplicateId { record: &'static str, id: RecordId },
    #[error("duplicate instrument id {0}")]
    DuplicateInstrument(InstrumentId),
    #[error("instrument {0} has a negative current price")]
    NegativeCurrentPrice(InstrumentId),
    #[error("instrument {0} has a current price above the accepted maximum")]
    CurrentPriceTooLarge(InstrumentId),
    #[error(
        "snapshot {snapshot_id}: price {price} of instrument {instrument_id} is not positive or exceeds the accepted maximum"
    )]
    InvalidSnapshotPrice {
        snapshot_id: SnapshotId,
        instrument_id: InstrumentId,
        price: Decimal,
    },
}

/// Largest share count, price or cost accepted from a source.
///
/// Keeps `shares * price` of a single record well inside the decimal range.
pub fn max_magnitude() -> Decimal {
    Decimal::from(100_000_000_000_000)
}

fn require_positive(
    record: &'static str,
    id: RecordId,
    field: &'static str,
    value: Decimal,
) -> Result<(), ValidationError> {
    if value.is_positive() {
        Ok(())
    } else {
        Err(ValidationError::NotPositive {
            record,
            id,
            field,
            value,
        })
    }
}

fn require_bounded(
    record: &'static str,
    id: RecordId,
    field: &'static str,
    value: Decimal,
) -> Result<(), ValidationError> {
    if value > max_magnitude() {
        Err(ValidationError::TooLarge {
            record,
            id,
            field,
            value,
        })
    } else {
        Ok(())
    }
}

fn require_non_negative(
    record: &'static str,
    id: RecordId,
    field: &'static str,
    value: Decimal,
) -> Result<(), ValidationError> {
    if value.is_negative() {
        Err(ValidationError::Negative {
            record,
            id,
            field,
            value,
        })
    } else {
        Ok(())
    }
}

/// Reject records the engine must never see.
///
/// Shares and prices must be strictly positive, costs and taxes non-negative,
/// and every amount at most [`max_magnitude`]. Ids are unique per record type,
/// instruments included, and every record must reference a known instrument.
/// Over-selling is checked later, during replay.
pub fn validate_records(
    instruments: &[Instrument],
    lots: &[Lot],
    disposals: &[Disposal],
) -> Result<(), ValidationError> {
    let mut known = HashSet::new();
    for instrument in instruments {
        if instrument.current_price.is_negative() {
            return Err(ValidationError::NegativeCurrentPrice(instrument.id));
        }
        if instrument.current_price > max_magnitude() {
            return Err(ValidationError::CurrentPriceTooLarge(instrument.id));
        }
        if !known.insert(instrument.id) {
            return Err(ValidationError::DuplicateInstrument(instrument.id));
        }
    }

    let mut seen = HashSet::new();
    for lot in lots {
        if !seen.insert(lot.id) {
            return Err(ValidationError::DuplicateId {
                record: "lot",
                id: lot.id,
            });
        }
        if !known.contains(&lot.instrument_id) {
            return Err(ValidationError::UnknownInstrument {
                record: "lot",
                id: lot.id,
                instrument_id: lot.instrument_id,
            });
        }
        require_positive("lot", lot.id, "shares", lot.shares)?;
        require_positive("lot", lot.id, "price", lot.price)?;
        require_non_negative("lot", lot.id, "operation_cost", lot.operation_cost)?;
        require_bounded("lot", lot.id, "shares", lot.shares)?;
        require_bounded("lot", lot.id, "price", lot.price)?;
        require_bounded("lot", lot.id, "operation_cost", lot.operation_cost)?;
    }

    let mut seen = HashSet::new();
    for sale in disposals {
        if !seen.insert(sale.id) {
            return Err(ValidationError::DuplicateId {
                record: "disposal",
                id: sale.id,
            });
        }
        if !known.contains(&sale.instrument_id) {
            return Err(ValidationError::UnknownInstrument {
                record: "disposal",
                id: sale.id,
                instrument_id: sale.instrument_id,
            });
        }
        require_positive("disposal", sale.id, "shares", sale.shares)?;
        require_positive("disposal", sale.id, "price", sale.price)?;
        require_non_negative("disposal", sale.id, "operation_cost", sale.operation_cost)?;
        require_non_negative("disposal", sale.id, "withheld_tax", sale.withheld_tax)?;
        require_bounded("disposal", sale.id, "shares", sale.shares)?;
        require_bounded("disposal", sale.id, "price", sale.price)?;
        require_bounded("disposal", sale.id, "operation_cost", sale.operation_cost)?;
        require_bounded("disposal", sale.id, "withheld_tax", sale.withheld_tax)?;
    }

    Ok(())
}

/// Every snapshot price must be strictly positive and at most [`max_magnitude`].
pub fn validate_snapshots(snapshots: &[PortfolioSnapshot]) -> Result<(), ValidationError> {
    for snapshot in snapshots {
        for (&instrument_id, &price) in &snapshot.prices {
            if !price.is_positive() || price > max_magnitude() {
                return Err(ValidationError::InvalidSnapshotPrice {
                    snapshot_id: snapshot.id,
                    instrument_id,
                    price,
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TimeMs;

    fn d(s: &str) -> Decimal {
        Decimal::from_str_canonical(s).unwrap()
    }

    fn instruments() -> Vec<Instrument> {
        vec![Instrument::new(InstrumentId::new(1), "ACME", d("10"))]
    }

    fn lot(id: i64, instrument: i64, shares: &str, price: &str) -> Lot {
        Lot::new(
            RecordId::new(id),
            InstrumentId::new(instrument),
            TimeMs::new(0),
            d(shares),
            d(price),
        )
    }

    fn sale(id: i64, shares: &str, price: &str) -> Disposal {
        Disposal::new(RecordId::new(id), InstrumentId::new(1), TimeMs::new(1), d(shares), d(price))
    }

    #[test]
    fn test_valid_records_pass() {
        let result = validate_records(&instruments(), &[lot(1, 1, "1", "10")], &[sale(1, "1", "12")]);
        assert_eq!(result, Ok(()));
    }

    #[test]
    fn test_zero_shares_rejected() {
        let err = validate_records(&instruments(), &[lot(1, 1, "0", "10")], &[]).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::NotPositive {
                field: "shares",
                ..
            }
        ));
    }

    #[test]
    fn test_negative_sale_price_rejected() {
        let err = validate_records(&instruments(), &[], &[sale(3, "1", "-5")]).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::NotPositive {
                record: "disposal",
                field: "price",
                ..
            }
        ));
    }

    #[test]
    fn test_negative_withheld_tax_rejected() {
        let bad = sale(3, "1", "5").with_costs(Decimal::zero(), d("-1"));
        let err = validate_records(&instruments(), &[], &[bad]).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::Negative {
                field: "withheld_tax",
                ..
            }
        ));
    }

    #[test]
    fn test_unknown_instrument_rejected() {
        let err = validate_records(&instruments(), &[lot(1, 9, "1", "10")], &[]).unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnknownInstrument {
                record: "lot",
                id: RecordId::new(1),
                instrument_id: InstrumentId::new(9),
            }
        );
    }

    #[test]
    fn test_duplicate_ids_rejected_per_record_type() {
        // Lot 1 and disposal 1 live in different id spaces.
        assert!(validate_records(&instruments(), &[lot(1, 1, "2", "10")], &[sale(1, "1", "12")]).is_ok());

        let err = validate_records(
            &instruments(),
            &[lot(1, 1, "1", "10"), lot(1, 1, "1", "11")],
            &[],
        )
        .unwrap_err();
        assert!(matches!(err, ValidationError::DuplicateId { record: "lot", .. }));
    }

    #[test]
    fn test_duplicate_instrument_rejected() {
        let instruments = vec![
            Instrument::new(InstrumentId::new(1), "ACME", d("20")),
            Instrument::new(InstrumentId::new(1), "ACME", d("20")),
        ];
        let err = validate_records(&instruments, &[lot(1, 1, "1", "10")], &[]).unwrap_err();
        assert_eq!(err, ValidationError::DuplicateInstrument(InstrumentId::new(1)));
    }

    #[test]
    fn test_amounts_above_bound_rejected() {
        let err = validate_records(
            &instruments(),
            &[lot(1, 1, "100000000000000000", "1000000000000")],
            &[],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ValidationError::TooLarge {
                record: "lot",
                field: "shares",
                ..
            }
        ));

        let at_bound = max_magnitude().to_canonical_string();
        assert!(validate_records(&instruments(), &[lot(1, 1, &at_bound, &at_bound)], &[]).is_ok());

        let huge_price = vec![Instrument::new(InstrumentId::new(1), "ACME", d("100000000000000000000"))];
        assert_eq!(
            validate_records(&huge_price, &[], &[]),
            Err(ValidationError::CurrentPriceTooLarge(InstrumentId::new(1)))
        );
    }

    #[test]
    fn test_snapshot_prices_must_be_positive() {
        let ok = PortfolioSnapshot::new(SnapshotId::new(1), TimeMs::new(0))
            .with_price(InstrumentId::new(1), d("10"));
        assert_eq!(validate_snapshots(&[ok.clone()]), Ok(()));

        for bad_price in ["0", "-3"] {
            let bad = PortfolioSnapshot::new(SnapshotId::new(2), TimeMs::new(5))
                .with_price(InstrumentId::new(4), d(bad_price));
            assert_eq!(
                validate_snapshots(&[ok.clone(), bad]),
                Err(ValidationError::InvalidSnapshotPrice {
                    snapshot_id: SnapshotId::new(2),
                    instrument_id: InstrumentId::new(4),
                    price: d(bad_price),
                })
            );
        }
    }
}
