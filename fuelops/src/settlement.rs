//! Owner-side end-of-day reconciliation: draft → final → locked.

use crate::audit::AuditEntry;
use crate::auth;
use crate::auth::AuthUser;
use crate::db::audit_logs::AuditCategory;
use crate::db::audit_logs::AuditSeverity;
use crate::db::daily_transactions::DailyTransaction;
use crate::db::daily_transactions::TransactionStatus;
use crate::db::readings::FlowStatus;
use crate::db::readings::Reading;
use crate::db::settlements::NewSettlement;
use crate::db::settlements::NewSettlementShortfall;
use crate::db::settlements::Settlement;
use crate::db::settlements::SettlementShortfall;
use crate::db::settlements::SettlementStatus;
use crate::db::shifts::Shift;
use crate::db::shifts::ShiftStatus;
use crate::db::users::User;
use crate::error::ServiceError;
use diesel::Connection;
use diesel::PgConnection;
use fuelops_commons::requests::CreateSettlementRequest;
use fuelops_commons::requests::FinalizeSettlementRequest;
use rust_decimal::Decimal;
use serde_json::json;
use uuid::Uuid;

pub fn create_settlement(
    conn: &mut PgConnection,
    caller: &AuthUser,
    station_id: Uuid,
    request: CreateSettlementRequest,
) -> Result<Settlement, ServiceError> {
    conn.transaction::<_, ServiceError, _>(|conn| {
        auth::assert_station(conn, caller, station_id)?;

        if Settlement::by_station_date(conn, station_id, request.settlement_date)?.is_some() {
            return Err(ServiceError::conflict(
                "DUPLICATE_SETTLEMENT",
                format!(
                    "a settlement already exists for {}",
                    request.settlement_date
                ),
            ));
        }

        // Expected cash is derived from the day's declared transactions,
        // never reported by the caller.
        let transactions = DailyTransaction::active_for_station_date(
            conn,
            station_id,
            request.settlement_date,
        )?;
        let expected_cash: Decimal = transactions.iter().map(|t| t.payment_cash).sum();

        let settlement = Settlement::insert(
            conn,
            NewSettlement {
                id: Uuid::new_v4(),
                station_id,
                settlement_date: request.settlement_date,
                expected_cash,
                reported_cash: request.reported_cash,
                reported_online: request.reported_online,
                reported_credit: request.reported_credit,
                status: SettlementStatus::Draft,
                created_by: caller.id,
            },
        )?;

        let reading_ids: Vec<Uuid> = if request.reading_ids.is_empty() {
            Reading::for_station_on(conn, station_id, request.settlement_date)?
                .into_iter()
                .filter(|r| r.settlement_id.is_none())
                .map(|r| r.id)
                .collect()
        } else {
            let readings = Reading::by_ids(conn, &request.reading_ids)?;
            for reading in &readings {
                if reading.station_id != station_id {
                    return Err(ServiceError::forbidden_station());
                }
                if reading.settlement_id.is_some() {
                    return Err(ServiceError::conflict(
                        "READING_ALREADY_SETTLED",
                        format!("reading {} already belongs to a settlement", reading.id),
                    ));
                }
            }
            request.reading_ids.clone()
        };

        Reading::attach_to_settlement(
            conn,
            &reading_ids,
            settlement.id,
            FlowStatus::PendingSettlement,
        )?;

        AuditEntry::new("settlement_create", "settlement")
            .by(caller)
            .station(station_id)
            .entity(settlement.id)
            .new_values(json!({
                "date": request.settlement_date.to_string(),
                "expectedCash": expected_cash,
                "readings": reading_ids.len(),
            }))
            .category(AuditCategory::Finance)
            .emit(conn)?;

        Ok(settlement)
    })
}

/// Finalizing fixes the actual counts, computes the variances, marks the
/// linked readings settled and attributes shortfalls to the employees who
/// worked the day.
pub fn finalize(
    conn: &mut PgConnection,
    caller: &AuthUser,
    settlement_id: Uuid,
    request: FinalizeSettlementRequest,
) -> Result<Settlement, ServiceError> {
    conn.transaction::<_, ServiceError, _>(|conn| {
        let settlement = Settlement::by_id(conn, settlement_id)?
            .ok_or_else(|| ServiceError::NotFound("settlement".to_string()))?;

        auth::assert_station(conn, caller, settlement.station_id)?;

        if settlement.status != SettlementStatus::Draft {
            return Err(ServiceError::conflict(
                "INVALID_STATE",
                "only draft settlements can be finalized",
            ));
        }

        let variance = request.actual_cash - settlement.expected_cash;
        let variance_online = request
            .confirmed_online
            .map(|confirmed| confirmed - settlement.reported_online);
        let variance_credit = request
            .confirmed_credit
            .map(|confirmed| confirmed - settlement.reported_credit);

        let settlement = Settlement::finalize(
            conn,
            settlement.id,
            request.actual_cash,
            variance,
            request.confirmed_online,
            request.confirmed_credit,
            variance_online,
            variance_credit,
        )?;

        Reading::mark_settled_for_settlement(conn, settlement.id)?;

        for transaction in DailyTransaction::active_for_station_date(
            conn,
            settlement.station_id,
            settlement.settlement_date,
        )? {
            if transaction.settlement_id.is_none()
                && transaction.status == TransactionStatus::Submitted
            {
                DailyTransaction::set_settlement(conn, transaction.id, settlement.id)?;
            }
        }

        record_shortfalls(conn, &settlement)?;

        // Older readings that never made it into any settlement roll over.
        Reading::carry_forward_unsettled(conn, settlement.station_id, settlement.settlement_date)?;

        AuditEntry::new("settlement_finalize", "settlement")
            .by(caller)
            .station(settlement.station_id)
            .entity(settlement.id)
            .new_values(json!({
                "actualCash": request.actual_cash,
                "variance": variance,
            }))
            .severity(if variance < Decimal::ZERO {
                AuditSeverity::Warning
            } else {
                AuditSeverity::Info
            })
            .category(AuditCategory::Finance)
            .emit(conn)?;

        Ok(settlement)
    })
}

fn record_shortfalls(conn: &mut PgConnection, settlement: &Settlement) -> Result<(), ServiceError> {
    let shifts = Shift::for_station_on(conn, settlement.station_id, settlement.settlement_date)?;

    for shift in shifts
        .iter()
        .filter(|s| s.status == ShiftStatus::Ended)
    {
        let Some(difference) = shift.cash_difference else {
            continue;
        };

        if difference >= Decimal::ZERO {
            continue;
        }

        let name = User::by_id(conn, shift.employee_id)?
            .map(|u| u.name)
            .unwrap_or_else(|| "unknown".to_string());

        SettlementShortfall::insert(
            conn,
            NewSettlementShortfall {
                id: Uuid::new_v4(),
                settlement_id: settlement.id,
                user_id: shift.employee_id,
                user_name: name,
                shortfall: -difference,
                reading_count: shift.readings_count,
            },
        )?;
    }

    Ok(())
}

/// A locked settlement can no longer be edited and its readings cannot be
/// reassigned.
pub fn lock(
    conn: &mut PgConnection,
    caller: &AuthUser,
    settlement_id: Uuid,
) -> Result<Settlement, ServiceError> {
    conn.transaction::<_, ServiceError, _>(|conn| {
        let settlement = Settlement::by_id(conn, settlement_id)?
            .ok_or_else(|| ServiceError::NotFound("settlement".to_string()))?;

        auth::assert_station(conn, caller, settlement.station_id)?;

        if settlement.status != SettlementStatus::Final {
            return Err(ServiceError::conflict(
                "INVALID_STATE",
                "only final settlements can be locked",
            ));
        }

        Settlement::lock(conn, settlement.id)
            .map_err(|e| ServiceError::Internal(anyhow::anyhow!(e)))?;

        AuditEntry::new("settlement_lock", "settlement")
            .by(caller)
            .station(settlement.station_id)
            .entity(settlement.id)
            .category(AuditCategory::Finance)
            .emit(conn)?;

        let settlement = Settlement::by_id(conn, settlement_id)?
            .ok_or_else(|| ServiceError::NotFound("settlement".to_string()))?;

        Ok(settlement)
    })
}
