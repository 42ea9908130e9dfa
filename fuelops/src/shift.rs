use crate::audit::AuditEntry;
use crate::auth;
use crate::auth::AuthUser;
use crate::db::audit_logs::AuditCategory;
use crate::db::audit_logs::AuditSeverity;
use crate::db::daily_transactions::DailyTransaction;
use crate::db::readings::Reading;
use crate::db::shifts::NewShift;
use crate::db::shifts::Shift;
use crate::db::shifts::ShiftStatus;
use crate::db::shifts::ShiftTotals;
use crate::db::shifts::ShiftType;
use crate::error::ServiceError;
use crate::handover;
use diesel::Connection;
use diesel::PgConnection;
use fuelops_commons::requests::EndShiftRequest;
use fuelops_commons::requests::StartShiftRequest;
use rust_decimal::Decimal;
use serde_json::json;
use std::collections::BTreeSet;
use time::Date;
use time::Time;
use uuid::Uuid;

pub fn start_shift(
    conn: &mut PgConnection,
    caller: &AuthUser,
    station_id: Option<Uuid>,
    request: StartShiftRequest,
    today: Date,
    now: Time,
) -> Result<Shift, ServiceError> {
    conn.transaction::<_, ServiceError, _>(|conn| {
        let station_id = auth::resolve_station(conn, caller, station_id)?;

        if Shift::active_for_employee(conn, caller.id)?.is_some() {
            return Err(ServiceError::conflict(
                "SHIFT_ACTIVE",
                "an active shift already exists for this employee",
            ));
        }

        let shift = Shift::insert(
            conn,
            NewShift {
                id: Uuid::new_v4(),
                station_id,
                employee_id: caller.id,
                shift_date: request.shift_date.unwrap_or(today),
                start_time: request.start_time.unwrap_or(now),
                shift_type: request
                    .shift_type
                    .map(ShiftType::from)
                    .unwrap_or(ShiftType::FullDay),
                opening_cash: request.opening_cash.unwrap_or(Decimal::ZERO),
                status: ShiftStatus::Active,
                notes: request.notes,
            },
        )?;

        AuditEntry::new("shift_start", "shift")
            .by(caller)
            .station(station_id)
            .entity(shift.id)
            .category(AuditCategory::Data)
            .emit(conn)?;

        Ok(shift)
    })
}

/// Ends a shift: aggregates the employee's readings for the day, derives
/// the expected cash from the transactions those readings entered, and
/// seeds the shift-collection handover.
pub fn end_shift(
    conn: &mut PgConnection,
    caller: &AuthUser,
    shift_id: Uuid,
    request: EndShiftRequest,
    now: Time,
) -> Result<Shift, ServiceError> {
    conn.transaction::<_, ServiceError, _>(|conn| {
        let shift = Shift::by_id(conn, shift_id)?
            .ok_or_else(|| ServiceError::NotFound("shift".to_string()))?;

        auth::assert_station(conn, caller, shift.station_id)?;

        if shift.status != ShiftStatus::Active {
            return Err(ServiceError::conflict(
                "INVALID_STATE",
                "only active shifts can be ended",
            ));
        }

        let readings = Reading::for_employee_between(
            conn,
            shift.station_id,
            shift.employee_id,
            shift.shift_date,
        )?;

        let total_litres: Decimal = readings.iter().map(|r| r.litres_sold).sum();
        let total_sales: Decimal = readings.iter().map(|r| r.total_amount).sum();

        let transaction_ids: BTreeSet<Uuid> =
            readings.iter().filter_map(|r| r.transaction_id).collect();

        let mut expected_cash = Decimal::ZERO;
        for id in transaction_ids {
            if let Some(transaction) = DailyTransaction::by_id(conn, id)? {
                expected_cash += transaction.payment_cash;
            }
        }

        let cash_collected = request.cash_collected.unwrap_or(Decimal::ZERO);

        let shift = Shift::end(
            conn,
            shift.id,
            ShiftTotals {
                end_time: request.end_time.unwrap_or(now),
                cash_collected,
                online_collected: request.online_collected.unwrap_or(Decimal::ZERO),
                expected_cash,
                cash_difference: cash_collected - expected_cash,
                readings_count: readings.len() as i32,
                total_litres_sold: total_litres,
                total_sales_amount: total_sales,
                ended_by: caller.id,
                end_notes: request.end_notes,
            },
        )?;

        let handover = handover::create_from_shift(conn, &shift)?;

        AuditEntry::new("shift_end", "shift")
            .by(caller)
            .station(shift.station_id)
            .entity(shift.id)
            .new_values(json!({
                "readings": shift.readings_count,
                "totalLitres": shift.total_litres_sold,
                "totalSales": shift.total_sales_amount,
                "expectedCash": expected_cash,
                "cashCollected": cash_collected,
                "handoverId": handover.id,
            }))
            .category(AuditCategory::Data)
            .emit(conn)?;

        Ok(shift)
    })
}

/// Cancelled shifts keep whatever aggregates they had; nothing is
/// recomputed.
pub fn cancel_shift(
    conn: &mut PgConnection,
    caller: &AuthUser,
    shift_id: Uuid,
) -> Result<(), ServiceError> {
    conn.transaction::<_, ServiceError, _>(|conn| {
        let shift = Shift::by_id(conn, shift_id)?
            .ok_or_else(|| ServiceError::NotFound("shift".to_string()))?;

        auth::assert_station(conn, caller, shift.station_id)?;

        Shift::cancel(conn, shift.id, caller.id).map_err(|_| {
            ServiceError::conflict("INVALID_STATE", "only active shifts can be cancelled")
        })?;

        AuditEntry::new("shift_cancel", "shift")
            .by(caller)
            .station(shift.station_id)
            .entity(shift.id)
            .severity(AuditSeverity::Warning)
            .category(AuditCategory::Data)
            .emit(conn)?;

        Ok(())
    })
}
