use crate::credit;
use crate::db::credit_transactions::SettlementLink;
use crate::db::creditors::Creditor;
use crate::db::creditors::NewCreditor;
use crate::run_migration;
use crate::tests::build_pool;
use crate::tests::fixture;
use crate::tests::start_postgres;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use testcontainers::clients::Cli;
use time::macros::date;
use uuid::Uuid;

const TODAY: time::Date = date!(2024 - 06 - 30);

#[tokio::test]
#[ignore = "requires docker"]
async fn credit_limit_and_fifo_settlement() {
    let docker = Cli::default();
    let (_container, conn_spec) = start_postgres(&docker).unwrap();
    let pool = build_pool(&conn_spec);
    let mut conn = pool.get().unwrap();
    run_migration(&mut conn);

    let fx = fixture(&mut conn);

    let creditor = Creditor::insert(
        &mut conn,
        NewCreditor {
            id: Uuid::new_v4(),
            station_id: fx.station_id,
            name: "Acme Haulage".to_string(),
            business_name: None,
            contact: None,
            credit_limit: dec!(10000),
            credit_period_days: 30,
        },
    )
    .unwrap();

    let first = credit::record_credit(
        &mut conn,
        &fx.owner,
        fx.station_id,
        credit::CreditInput {
            creditor_id: creditor.id,
            amount: dec!(9500),
            fuel_type: None,
            litres: None,
            price_per_litre: None,
            reading_id: None,
            invoice_number: Some("INV-1".to_string()),
            vehicle_number: None,
            transaction_date: date!(2024 - 06 - 01),
        },
    )
    .unwrap();

    // 9500 + 600 would breach the 10000 limit.
    let err = credit::record_credit(
        &mut conn,
        &fx.owner,
        fx.station_id,
        credit::CreditInput {
            creditor_id: creditor.id,
            amount: dec!(600),
            fuel_type: None,
            litres: None,
            price_per_litre: None,
            reading_id: None,
            invoice_number: None,
            vehicle_number: None,
            transaction_date: date!(2024 - 06 - 10),
        },
    )
    .unwrap_err();
    assert_eq!(err.code(), "CREDIT_LIMIT_EXCEEDED");

    let balance = Creditor::by_id(&mut conn, creditor.id)
        .unwrap()
        .unwrap()
        .current_balance;
    assert_eq!(balance, dec!(9500));

    // Exactly at the limit is allowed.
    let second = credit::record_credit(
        &mut conn,
        &fx.owner,
        fx.station_id,
        credit::CreditInput {
            creditor_id: creditor.id,
            amount: dec!(500),
            fuel_type: None,
            litres: None,
            price_per_litre: None,
            reading_id: None,
            invoice_number: Some("INV-2".to_string()),
            vehicle_number: None,
            transaction_date: date!(2024 - 06 - 10),
        },
    )
    .unwrap();

    let balance = Creditor::by_id(&mut conn, creditor.id)
        .unwrap()
        .unwrap()
        .current_balance;
    assert_eq!(balance, dec!(10000));

    // Settlement without explicit links allocates oldest-first.
    let settlement = credit::record_settlement(
        &mut conn,
        &fx.owner,
        fx.station_id,
        credit::SettlementInput {
            creditor_id: creditor.id,
            amount: dec!(400),
            transaction_date: date!(2024 - 06 - 15),
            invoice_number: None,
            links: vec![],
        },
        TODAY,
    )
    .unwrap();

    let creditor = Creditor::by_id(&mut conn, creditor.id).unwrap().unwrap();
    assert_eq!(creditor.current_balance, dec!(9600));
    assert_eq!(creditor.last_payment_date, Some(date!(2024 - 06 - 15)));

    let links = SettlementLink::for_settlement_transaction(&mut conn, settlement.id).unwrap();
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].credit_transaction_id, first.id);
    assert_eq!(links[0].amount, dec!(400));

    assert_eq!(
        SettlementLink::allocated_against(&mut conn, second.id).unwrap(),
        Decimal::ZERO
    );
}

#[tokio::test]
#[ignore = "requires docker"]
async fn flagged_creditor_is_refused() {
    let docker = Cli::default();
    let (_container, conn_spec) = start_postgres(&docker).unwrap();
    let pool = build_pool(&conn_spec);
    let mut conn = pool.get().unwrap();
    run_migration(&mut conn);

    let fx = fixture(&mut conn);

    let creditor = Creditor::insert(
        &mut conn,
        NewCreditor {
            id: Uuid::new_v4(),
            station_id: fx.station_id,
            name: "Flagged Fleet".to_string(),
            business_name: None,
            contact: None,
            credit_limit: Decimal::ZERO,
            credit_period_days: 30,
        },
    )
    .unwrap();

    Creditor::set_flag(
        &mut conn,
        creditor.id,
        true,
        Some("repeated defaults".to_string()),
    )
    .unwrap();

    let err = credit::record_credit(
        &mut conn,
        &fx.owner,
        fx.station_id,
        credit::CreditInput {
            creditor_id: creditor.id,
            amount: dec!(100),
            fuel_type: None,
            litres: None,
            price_per_litre: None,
            reading_id: None,
            invoice_number: None,
            vehicle_number: None,
            transaction_date: date!(2024 - 06 - 01),
        },
    )
    .unwrap_err();
    assert_eq!(err.code(), "CREDITOR_FLAGGED");
}

#[tokio::test]
#[ignore = "requires docker"]
async fn settlement_with_explicit_links_respects_invoice_caps() {
    let docker = Cli::default();
    let (_container, conn_spec) = start_postgres(&docker).unwrap();
    let pool = build_pool(&conn_spec);
    let mut conn = pool.get().unwrap();
    run_migration(&mut conn);

    let fx = fixture(&mut conn);

    let creditor = Creditor::insert(
        &mut conn,
        NewCreditor {
            id: Uuid::new_v4(),
            station_id: fx.station_id,
            name: "Linked Logistics".to_string(),
            business_name: None,
            contact: None,
            credit_limit: Decimal::ZERO,
            credit_period_days: 30,
        },
    )
    .unwrap();

    let invoice = credit::record_credit(
        &mut conn,
        &fx.owner,
        fx.station_id,
        credit::CreditInput {
            creditor_id: creditor.id,
            amount: dec!(300),
            fuel_type: None,
            litres: None,
            price_per_litre: None,
            reading_id: None,
            invoice_number: Some("INV-9".to_string()),
            vehicle_number: None,
            transaction_date: date!(2024 - 06 - 01),
        },
    )
    .unwrap();

    // Allocating more than the invoice's open amount is a conflict.
    let err = credit::record_settlement(
        &mut conn,
        &fx.owner,
        fx.station_id,
        credit::SettlementInput {
            creditor_id: creditor.id,
            amount: dec!(500),
            transaction_date: date!(2024 - 06 - 20),
            invoice_number: None,
            links: vec![fuelops_commons::requests::SettlementLinkRequest {
                credit_transaction_id: invoice.id,
                amount: dec!(400),
            }],
        },
        TODAY,
    )
    .unwrap_err();
    assert_eq!(err.code(), "OVER_ALLOCATED");

    // A partial allocation leaves the residual unallocated on the account.
    credit::record_settlement(
        &mut conn,
        &fx.owner,
        fx.station_id,
        credit::SettlementInput {
            creditor_id: creditor.id,
            amount: dec!(500),
            transaction_date: date!(2024 - 06 - 20),
            invoice_number: None,
            links: vec![fuelops_commons::requests::SettlementLinkRequest {
                credit_transaction_id: invoice.id,
                amount: dec!(300),
            }],
        },
        TODAY,
    )
    .unwrap();

    let creditor = Creditor::by_id(&mut conn, creditor.id).unwrap().unwrap();
    assert_eq!(creditor.current_balance, dec!(-200));
}
