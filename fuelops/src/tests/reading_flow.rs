use crate::reading;
use crate::reading::CreateReading;
use crate::run_migration;
use crate::sales;
use crate::tests::build_pool;
use crate::tests::fixture;
use crate::tests::fixture_with_code;
use crate::tests::start_postgres;
use fuelops_commons::requests::PaymentBreakdown;
use fuelops_commons::status::ReadingSource;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use testcontainers::clients::Cli;
use time::macros::date;
use time::macros::time;
use time::Date;
use time::Time;
use uuid::Uuid;

const TODAY: Date = date!(2024 - 06 - 30);

fn input(nozzle_id: Uuid, date: Date, t: Time, value: Decimal) -> CreateReading {
    CreateReading {
        nozzle_id,
        reading_date: date,
        reading_time: Some(t),
        reading_value: value,
        shift_id: None,
        notes: None,
        is_sample: false,
        attempted_initial: false,
        source: ReadingSource::Manual,
    }
}

#[tokio::test]
#[ignore = "requires docker"]
async fn single_sale_derivation() {
    let docker = Cli::default();
    let (_container, conn_spec) = start_postgres(&docker).unwrap();
    let pool = build_pool(&conn_spec);
    let mut conn = pool.get().unwrap();
    run_migration(&mut conn);

    let fx = fixture(&mut conn);

    let r1 = reading::create_reading(
        &mut conn,
        &fx.employee,
        input(fx.nozzle_1, date!(2024 - 06 - 01), time!(08:00:00), dec!(1000.000)),
        TODAY,
        30,
    )
    .unwrap();

    // First ever snapshot of an uninitialized nozzle establishes the
    // baseline.
    assert_eq!(r1.reading.previous_reading_id, None);
    assert_eq!(r1.reading.litres_sold, dec!(0));
    assert_eq!(r1.reading.total_amount, dec!(0));

    let r2 = reading::create_reading(
        &mut conn,
        &fx.employee,
        input(fx.nozzle_1, date!(2024 - 06 - 02), time!(08:00:00), dec!(1050.500)),
        TODAY,
        30,
    )
    .unwrap();

    assert_eq!(r2.reading.previous_reading_id, Some(r1.reading.id));
    assert_eq!(r2.reading.litres_sold, dec!(50.500));
    assert_eq!(r2.reading.price_per_litre, dec!(100.00));
    assert_eq!(r2.reading.total_amount, dec!(5050.00));
}

#[tokio::test]
#[ignore = "requires docker"]
async fn identical_reading_is_idempotent() {
    let docker = Cli::default();
    let (_container, conn_spec) = start_postgres(&docker).unwrap();
    let pool = build_pool(&conn_spec);
    let mut conn = pool.get().unwrap();
    run_migration(&mut conn);

    let fx = fixture(&mut conn);
    let make = || input(fx.nozzle_1, date!(2024 - 06 - 01), time!(08:00:00), dec!(500.000));

    let first = reading::create_reading(&mut conn, &fx.employee, make(), TODAY, 30).unwrap();
    assert!(first.created);

    let second = reading::create_reading(&mut conn, &fx.employee, make(), TODAY, 30).unwrap();
    assert!(!second.created);
    assert_eq!(second.reading.id, first.reading.id);
}

#[tokio::test]
#[ignore = "requires docker"]
async fn meter_reset_records_zero_litres() {
    let docker = Cli::default();
    let (_container, conn_spec) = start_postgres(&docker).unwrap();
    let pool = build_pool(&conn_spec);
    let mut conn = pool.get().unwrap();
    run_migration(&mut conn);

    let fx = fixture(&mut conn);

    reading::create_reading(
        &mut conn,
        &fx.employee,
        input(fx.nozzle_1, date!(2024 - 06 - 01), time!(08:00:00), dec!(100.000)),
        TODAY,
        30,
    )
    .unwrap();

    let reset = reading::create_reading(
        &mut conn,
        &fx.employee,
        input(fx.nozzle_1, date!(2024 - 06 - 02), time!(08:00:00), dec!(50.000)),
        TODAY,
        30,
    )
    .unwrap();

    assert_eq!(reset.reading.litres_sold, dec!(0));
    assert!(reset.reading.meter_reset);
    assert!(reset.warnings.iter().any(|w| w.contains("meter_reset")));

    // The reset value is the new baseline.
    let next = reading::create_reading(
        &mut conn,
        &fx.employee,
        input(fx.nozzle_1, date!(2024 - 06 - 03), time!(08:00:00), dec!(75.000)),
        TODAY,
        30,
    )
    .unwrap();
    assert_eq!(next.reading.litres_sold, dec!(25.000));
}

#[tokio::test]
#[ignore = "requires docker"]
async fn tenant_isolation_for_identical_pump_serials() {
    let docker = Cli::default();
    let (_container, conn_spec) = start_postgres(&docker).unwrap();
    let pool = build_pool(&conn_spec);
    let mut conn = pool.get().unwrap();
    run_migration(&mut conn);

    // Both stations carry a pump with serial TEST001.
    let s1 = fixture_with_code(&mut conn, "S1");
    let s2 = fixture_with_code(&mut conn, "S2");

    reading::create_reading(
        &mut conn,
        &s1.employee,
        input(s1.nozzle_1, date!(2024 - 06 - 01), time!(08:00:00), dec!(1000.000)),
        TODAY,
        30,
    )
    .unwrap();

    reading::create_reading(
        &mut conn,
        &s2.employee,
        input(s2.nozzle_1, date!(2024 - 06 - 01), time!(08:00:00), dec!(1500.000)),
        TODAY,
        30,
    )
    .unwrap();

    let r = reading::create_reading(
        &mut conn,
        &s1.employee,
        input(s1.nozzle_1, date!(2024 - 06 - 02), time!(08:00:00), dec!(1100.000)),
        TODAY,
        30,
    )
    .unwrap();

    // Never 0, never negative, never S2's meter.
    assert_eq!(r.reading.litres_sold, dec!(100.000));
    assert_eq!(r.reading.previous_reading_value, Some(dec!(1000.000)));

    // And an employee of S2 cannot write into S1.
    let err = reading::create_reading(
        &mut conn,
        &s2.employee,
        input(s1.nozzle_1, date!(2024 - 06 - 03), time!(08:00:00), dec!(1200.000)),
        TODAY,
        30,
    )
    .unwrap_err();
    assert_eq!(err.code(), "FORBIDDEN");
}

#[tokio::test]
#[ignore = "requires docker"]
async fn sample_reading_moves_baseline_without_revenue() {
    let docker = Cli::default();
    let (_container, conn_spec) = start_postgres(&docker).unwrap();
    let pool = build_pool(&conn_spec);
    let mut conn = pool.get().unwrap();
    run_migration(&mut conn);

    let fx = fixture(&mut conn);

    reading::create_reading(
        &mut conn,
        &fx.employee,
        input(fx.nozzle_1, date!(2024 - 06 - 01), time!(08:00:00), dec!(1000.000)),
        TODAY,
        30,
    )
    .unwrap();

    let mut sample = input(fx.nozzle_1, date!(2024 - 06 - 02), time!(08:00:00), dec!(1005.000));
    sample.is_sample = true;
    let sample = reading::create_reading(&mut conn, &fx.employee, sample, TODAY, 30).unwrap();
    assert_eq!(sample.reading.litres_sold, dec!(0));
    assert_eq!(sample.reading.total_amount, dec!(0));

    // The next sale difference starts from the sample's meter value.
    let next = reading::create_reading(
        &mut conn,
        &fx.employee,
        input(fx.nozzle_1, date!(2024 - 06 - 03), time!(08:00:00), dec!(1015.000)),
        TODAY,
        30,
    )
    .unwrap();
    assert_eq!(next.reading.litres_sold, dec!(10.000));
}

#[tokio::test]
#[ignore = "requires docker"]
async fn transaction_groups_readings_and_balances() {
    let docker = Cli::default();
    let (_container, conn_spec) = start_postgres(&docker).unwrap();
    let pool = build_pool(&conn_spec);
    let mut conn = pool.get().unwrap();
    run_migration(&mut conn);

    let fx = fixture(&mut conn);

    reading::create_reading(
        &mut conn,
        &fx.employee,
        input(fx.nozzle_1, date!(2024 - 06 - 01), time!(08:00:00), dec!(1000.000)),
        TODAY,
        30,
    )
    .unwrap();

    let sale = reading::create_reading(
        &mut conn,
        &fx.employee,
        input(fx.nozzle_1, date!(2024 - 06 - 02), time!(08:00:00), dec!(1050.500)),
        TODAY,
        30,
    )
    .unwrap();

    let transaction = sales::create_transaction(
        &mut conn,
        &fx.owner,
        sales::CreateTransaction {
            station_id: fx.station_id,
            date: date!(2024 - 06 - 02),
            reading_ids: vec![sale.reading.id],
            breakdown: PaymentBreakdown {
                cash: dec!(3000.00),
                online: dec!(2050.00),
                credit: dec!(0),
            },
            credit_allocations: vec![],
            notes: None,
        },
    )
    .unwrap();

    assert_eq!(transaction.total_litres, dec!(50.500));
    assert_eq!(transaction.total_sale_value, dec!(5050.00));

    // A second transaction over the same reading is refused.
    let err = sales::create_transaction(
        &mut conn,
        &fx.owner,
        sales::CreateTransaction {
            station_id: fx.station_id,
            date: date!(2024 - 06 - 02),
            reading_ids: vec![sale.reading.id],
            breakdown: PaymentBreakdown {
                cash: dec!(5050.00),
                online: dec!(0),
                credit: dec!(0),
            },
            credit_allocations: vec![],
            notes: None,
        },
    )
    .unwrap_err();
    assert_eq!(err.code(), "READING_ALREADY_GROUPED");

    // An unbalanced breakdown is refused outright.
    let err = sales::create_transaction(
        &mut conn,
        &fx.owner,
        sales::CreateTransaction {
            station_id: fx.station_id,
            date: date!(2024 - 06 - 02),
            reading_ids: vec![Uuid::new_v4()],
            breakdown: PaymentBreakdown {
                cash: dec!(1.00),
                online: dec!(0),
                credit: dec!(0),
            },
            credit_allocations: vec![],
            notes: None,
        },
    )
    .unwrap_err();
    assert_eq!(err.code(), "NOT_FOUND");
}
