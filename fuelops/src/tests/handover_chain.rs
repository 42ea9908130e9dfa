use crate::handover;
use crate::handover::VarianceRule;
use crate::run_migration;
use crate::tests::build_pool;
use crate::tests::fixture;
use crate::tests::start_postgres;
use fuelops_commons::requests::CreateHandoverRequest;
use fuelops_commons::status::HandoverStatus;
use fuelops_commons::status::HandoverType;
use rust_decimal_macros::dec;
use testcontainers::clients::Cli;
use time::macros::date;

fn handover_request(
    station_id: uuid::Uuid,
    handover_type: HandoverType,
    to_user_id: Option<uuid::Uuid>,
    expected: rust_decimal::Decimal,
) -> CreateHandoverRequest {
    CreateHandoverRequest {
        handover_type,
        station_id: Some(station_id),
        to_user_id,
        handover_date: Some(date!(2024 - 06 - 02)),
        expected_amount: expected,
        previous_handover_id: None,
        shift_id: None,
        bank_name: None,
        deposit_reference: None,
        deposit_receipt_url: None,
        notes: None,
    }
}

#[tokio::test]
#[ignore = "requires docker"]
async fn variance_thresholds_drive_dispute() {
    let docker = Cli::default();
    let (_container, conn_spec) = start_postgres(&docker).unwrap();
    let pool = build_pool(&conn_spec);
    let mut conn = pool.get().unwrap();
    run_migration(&mut conn);

    let fx = fixture(&mut conn);
    let rule = VarianceRule::default();

    // 150 short on 5000 expected: 3% variance, disputed.
    let h1 = handover::create_handover(
        &mut conn,
        &fx.employee,
        handover_request(
            fx.station_id,
            HandoverType::ShiftCollection,
            Some(fx.owner.id),
            dec!(5000.00),
        ),
        date!(2024 - 06 - 02),
    )
    .unwrap();

    let h1 = handover::confirm(&mut conn, &rule, &fx.owner, h1.id, dec!(4850.00), None).unwrap();
    assert_eq!(h1.difference, Some(dec!(-150.00)));
    assert_eq!(
        fuelops_commons::status::HandoverStatus::from(h1.status),
        HandoverStatus::Disputed
    );

    // 50 short is inside both floors: confirmed.
    let h2 = handover::create_handover(
        &mut conn,
        &fx.employee,
        handover_request(
            fx.station_id,
            HandoverType::ShiftCollection,
            Some(fx.owner.id),
            dec!(5000.00),
        ),
        date!(2024 - 06 - 02),
    )
    .unwrap();

    let h2 = handover::confirm(&mut conn, &rule, &fx.owner, h2.id, dec!(4950.00), None).unwrap();
    assert_eq!(h2.difference, Some(dec!(-50.00)));
    assert_eq!(
        fuelops_commons::status::HandoverStatus::from(h2.status),
        HandoverStatus::Confirmed
    );

    // The disputed one resolves, and only from disputed.
    let resolved = handover::resolve_dispute(
        &mut conn,
        &fx.owner,
        h1.id,
        "counted again with the employee".to_string(),
    )
    .unwrap();
    assert_eq!(
        fuelops_commons::status::HandoverStatus::from(resolved.status),
        HandoverStatus::Resolved
    );

    let err = handover::resolve_dispute(&mut conn, &fx.owner, h2.id, "noop".to_string())
        .unwrap_err();
    assert_eq!(err.code(), "INVALID_STATE");
}

#[tokio::test]
#[ignore = "requires docker"]
async fn chain_enforces_confirmed_predecessors() {
    let docker = Cli::default();
    let (_container, conn_spec) = start_postgres(&docker).unwrap();
    let pool = build_pool(&conn_spec);
    let mut conn = pool.get().unwrap();
    run_migration(&mut conn);

    let fx = fixture(&mut conn);
    let rule = VarianceRule::default();

    // No confirmed shift collection yet: employee-to-manager is refused.
    let err = handover::create_handover(
        &mut conn,
        &fx.employee,
        handover_request(
            fx.station_id,
            HandoverType::EmployeeToManager,
            Some(fx.owner.id),
            dec!(5000.00),
        ),
        date!(2024 - 06 - 02),
    )
    .unwrap_err();
    assert_eq!(err.code(), "SEQUENCE_VIOLATION");

    // Seed and confirm the chain hop by hop.
    let collection = handover::create_handover(
        &mut conn,
        &fx.employee,
        handover_request(
            fx.station_id,
            HandoverType::ShiftCollection,
            Some(fx.owner.id),
            dec!(5000.00),
        ),
        date!(2024 - 06 - 02),
    )
    .unwrap();
    handover::confirm(&mut conn, &rule, &fx.owner, collection.id, dec!(5000.00), None).unwrap();

    let to_manager = handover::create_handover(
        &mut conn,
        &fx.employee,
        handover_request(
            fx.station_id,
            HandoverType::EmployeeToManager,
            Some(fx.owner.id),
            dec!(5000.00),
        ),
        date!(2024 - 06 - 02),
    )
    .unwrap();
    handover::confirm(&mut conn, &rule, &fx.owner, to_manager.id, dec!(5000.00), None).unwrap();

    let to_owner = handover::create_handover(
        &mut conn,
        &fx.owner,
        handover_request(
            fx.station_id,
            HandoverType::ManagerToOwner,
            Some(fx.owner.id),
            dec!(5000.00),
        ),
        date!(2024 - 06 - 02),
    )
    .unwrap();
    handover::confirm(&mut conn, &rule, &fx.owner, to_owner.id, dec!(5000.00), None).unwrap();

    // Deposit without bank details cannot leave pending.
    let deposit = handover::create_handover(
        &mut conn,
        &fx.owner,
        handover_request(
            fx.station_id,
            HandoverType::DepositToBank,
            None,
            dec!(5000.00),
        ),
        date!(2024 - 06 - 02),
    )
    .unwrap();

    let err = handover::confirm(&mut conn, &rule, &fx.owner, deposit.id, dec!(5000.00), None)
        .unwrap_err();
    assert_eq!(err.code(), "DEPOSIT_DETAILS_REQUIRED");

    // With bank details the deposit confirms cleanly.
    let mut request = handover_request(
        fx.station_id,
        HandoverType::DepositToBank,
        None,
        dec!(5000.00),
    );
    request.bank_name = Some("State Bank".to_string());
    request.deposit_reference = Some("DEP-42".to_string());

    let deposit = handover::create_handover(&mut conn, &fx.owner, request, date!(2024 - 06 - 02))
        .unwrap();
    let deposit =
        handover::confirm(&mut conn, &rule, &fx.owner, deposit.id, dec!(5000.00), None).unwrap();
    assert_eq!(
        fuelops_commons::status::HandoverStatus::from(deposit.status),
        HandoverStatus::Confirmed
    );
}
