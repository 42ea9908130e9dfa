use crate::db;
use fuelops_commons::status::ApprovalStatus;
use fuelops_commons::status::FlowStatus;
use fuelops_commons::status::ReadingSource;
use rust_decimal::Decimal;
use rust_decimal::RoundingStrategy;
use time::Date;
use time::OffsetDateTime;
use time::Time;
use uuid::Uuid;

/// Money rounding used for sale amounts: half-up to two decimals.
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Litres sold between a meter value and its baseline. A negative raw
/// difference is a meter reset and yields zero.
pub fn litres_sold(reading_value: Decimal, previous: Decimal) -> (Decimal, bool) {
    let raw = reading_value - previous;
    if raw < Decimal::ZERO {
        (Decimal::ZERO, true)
    } else {
        (raw, false)
    }
}

#[derive(Debug, Clone)]
pub struct Reading {
    pub id: Uuid,
    pub nozzle_id: Uuid,
    pub station_id: Uuid,
    pub pump_id: Uuid,
    pub fuel_type: String,
    pub entered_by: Uuid,
    pub reading_date: Date,
    pub reading_time: Option<Time>,
    pub reading_value: Decimal,
    pub previous_reading_id: Option<Uuid>,
    pub previous_reading_value: Option<Decimal>,
    pub litres_sold: Decimal,
    pub price_per_litre: Decimal,
    pub total_amount: Decimal,
    pub is_sample: bool,
    pub meter_reset: bool,
    pub source: ReadingSource,
    pub approval_status: ApprovalStatus,
    pub rejection_reason: Option<String>,
    pub shift_id: Option<Uuid>,
    pub settlement_id: Option<Uuid>,
    pub transaction_id: Option<Uuid>,
    pub flow_status: FlowStatus,
    pub notes: Option<String>,
    pub created_at: OffsetDateTime,
}

impl From<db::readings::Reading> for Reading {
    fn from(value: db::readings::Reading) -> Self {
        Reading {
            id: value.id,
            nozzle_id: value.nozzle_id,
            station_id: value.station_id,
            pump_id: value.pump_id,
            fuel_type: value.fuel_type,
            entered_by: value.entered_by,
            reading_date: value.reading_date,
            reading_time: value.reading_time,
            reading_value: value.reading_value,
            previous_reading_id: value.previous_reading_id,
            previous_reading_value: value.previous_reading_value,
            litres_sold: value.litres_sold,
            price_per_litre: value.price_per_litre,
            total_amount: value.total_amount,
            is_sample: value.is_sample,
            meter_reset: value.meter_reset,
            source: value.source.into(),
            approval_status: value.approval_status.into(),
            rejection_reason: value.rejection_reason,
            shift_id: value.shift_id,
            settlement_id: value.settlement_id,
            transaction_id: value.transaction_id,
            flow_status: value.flow_status.into(),
            notes: value.notes,
            created_at: value.created_at,
        }
    }
}

/// Outcome of `create_reading`: the persisted reading plus transient
/// warnings (meter reset, tank level) that are surfaced but not stored.
#[derive(Debug, Clone)]
pub struct CreatedReading {
    pub reading: Reading,
    pub warnings: Vec<String>,
    /// False when an identical reading already existed and was returned
    /// instead of a new row.
    pub created: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn rounding_is_half_up() {
        assert_eq!(round2(dec!(5050.005)), dec!(5050.01));
        assert_eq!(round2(dec!(5050.004)), dec!(5050.00));
        assert_eq!(round2(dec!(-0.005)), dec!(-0.01));
    }

    #[test]
    fn litres_from_meter_difference() {
        assert_eq!(litres_sold(dec!(1050.500), dec!(1000.000)), (dec!(50.500), false));
        assert_eq!(litres_sold(dec!(1000), dec!(1000)), (dec!(0), false));
    }

    #[test]
    fn meter_reset_yields_zero_litres() {
        let (litres, reset) = litres_sold(dec!(50.000), dec!(100.000));
        assert_eq!(litres, Decimal::ZERO);
        assert!(reset);
    }

    #[test]
    fn sale_amount_matches_spec_scenario() {
        // 50.5 l at 100.00 per litre.
        let (litres, _) = litres_sold(dec!(1050.500), dec!(1000.000));
        assert_eq!(round2(litres * dec!(100.00)), dec!(5050.00));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn volume() -> impl Strategy<Value = Decimal> {
            // Meter values up to 10M litres with millilitre precision.
            (0i64..10_000_000_000).prop_map(|millis| Decimal::new(millis, 3))
        }

        fn price() -> impl Strategy<Value = Decimal> {
            (1i64..100_000).prop_map(|paise| Decimal::new(paise, 2))
        }

        proptest! {
            #[test]
            fn litres_are_never_negative(value in volume(), previous in volume()) {
                let (litres, reset) = litres_sold(value, previous);
                prop_assert!(litres >= Decimal::ZERO);
                prop_assert_eq!(reset, value < previous);
                if !reset {
                    prop_assert_eq!(litres, value - previous);
                } else {
                    prop_assert_eq!(litres, Decimal::ZERO);
                }
            }

            #[test]
            fn amount_is_litres_times_price_rounded(value in volume(), previous in volume(), price in price()) {
                let (litres, _) = litres_sold(value, previous);
                let amount = round2(litres * price);

                prop_assert_eq!(amount.scale() <= 2, true);
                // Rounding moves the amount by at most half a unit.
                let raw = litres * price;
                prop_assert!((amount - raw).abs() <= Decimal::new(5, 3));
            }
        }
    }
}
