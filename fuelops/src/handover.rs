//! The cash-handover chain: shift collection, employee to manager, manager
//! to owner, deposit to bank, each hop with its own confirmation and
//! variance check.

use crate::audit::AuditEntry;
use crate::auth;
use crate::auth::AuthUser;
use crate::db::audit_logs::AuditCategory;
use crate::db::audit_logs::AuditSeverity;
use crate::db::handovers::CashHandover;
use crate::db::handovers::HandoverStatus;
use crate::db::handovers::HandoverType;
use crate::db::handovers::NewCashHandover;
use crate::db::shifts::Shift;
use crate::db::stations::Station;
use crate::db::users::User;
use crate::error::ServiceError;
use diesel::Connection;
use diesel::PgConnection;
use fuelops_commons::requests::CreateHandoverRequest;
use rust_decimal::Decimal;
use serde_json::json;
use time::Date;
use uuid::Uuid;

/// Dispute thresholds: a confirmation is disputed when the absolute
/// difference exceeds both the cash floor and the percentage of the
/// expected amount, i.e. `|Δ| > max(abs, pct% of expected)`.
#[derive(Debug, Clone, Copy)]
pub struct VarianceRule {
    pub max_cash_difference: Decimal,
    pub max_percent: Decimal,
}

impl Default for VarianceRule {
    fn default() -> Self {
        Self {
            max_cash_difference: Decimal::from(100),
            max_percent: Decimal::from(2),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VarianceOutcome {
    pub difference: Decimal,
    pub variance_percent: Decimal,
    pub disputed: bool,
}

pub fn evaluate_variance(
    rule: &VarianceRule,
    expected: Decimal,
    actual: Decimal,
) -> VarianceOutcome {
    let difference = actual - expected;
    let variance_percent = if expected.is_zero() {
        Decimal::ZERO
    } else {
        (difference.abs() / expected * Decimal::from(100)).round_dp(2)
    };

    let tolerance = rule
        .max_cash_difference
        .max(expected * rule.max_percent / Decimal::from(100));

    VarianceOutcome {
        difference,
        variance_percent,
        disputed: difference.abs() > tolerance,
    }
}

/// Looks up the confirmed predecessor the chain requires, failing with
/// `SEQUENCE_VIOLATION` when it is missing.
pub fn validate_sequence(
    conn: &mut PgConnection,
    station_id: Uuid,
    handover_type: HandoverType,
    from_user_id: Uuid,
) -> Result<Option<CashHandover>, ServiceError> {
    let commons_type = fuelops_commons::status::HandoverType::from(handover_type);
    let Some(required) = commons_type.required_predecessor() else {
        return Ok(None);
    };

    // Only the employee-to-manager hop pins the predecessor to a user: an
    // employee can only pass on cash they collected themselves.
    let pinned_user = match handover_type {
        HandoverType::EmployeeToManager => Some(from_user_id),
        _ => None,
    };

    let predecessor = CashHandover::latest_confirmed(
        conn,
        station_id,
        HandoverType::from(required),
        pinned_user,
    )?;

    predecessor
        .map(Some)
        .ok_or_else(|| {
            ServiceError::conflict(
                "SEQUENCE_VIOLATION",
                format!(
                    "no confirmed {required:?} handover precedes this {commons_type:?} handover"
                ),
            )
        })
}

/// Seeds the chain when a shift ends. The collection goes to the first
/// active manager of the station, or to the owner when no manager exists.
pub fn create_from_shift(conn: &mut PgConnection, shift: &Shift) -> Result<CashHandover, ServiceError> {
    let station = Station::by_id(conn, shift.station_id)?
        .ok_or_else(|| ServiceError::NotFound("station".to_string()))?;

    let to_user = User::managers_for_station(conn, station.id)?
        .into_iter()
        .next()
        .map(|m| m.id)
        .unwrap_or(station.owner_id);

    let expected = shift
        .expected_cash
        .or(shift.cash_collected)
        .unwrap_or(Decimal::ZERO);

    let handover = CashHandover::insert(
        conn,
        NewCashHandover {
            id: Uuid::new_v4(),
            station_id: station.id,
            handover_type: HandoverType::ShiftCollection,
            handover_date: shift.shift_date,
            from_user_id: Some(shift.employee_id),
            to_user_id: Some(to_user),
            expected_amount: expected,
            previous_handover_id: None,
            status: HandoverStatus::Pending,
            shift_id: Some(shift.id),
            bank_name: None,
            deposit_reference: None,
            deposit_receipt_url: None,
            notes: None,
        },
    )?;

    Ok(handover)
}

pub fn create_handover(
    conn: &mut PgConnection,
    caller: &AuthUser,
    request: CreateHandoverRequest,
    today: Date,
) -> Result<CashHandover, ServiceError> {
    if request.expected_amount < Decimal::ZERO {
        return Err(ServiceError::Validation(
            "expectedAmount must not be negative".to_string(),
        ));
    }

    conn.transaction::<_, ServiceError, _>(|conn| {
        let station_id = auth::resolve_station(conn, caller, request.station_id)?;

        // Sequence validation and insert run under the station lock.
        Station::by_id_locked(conn, station_id)?
            .ok_or_else(|| ServiceError::NotFound("station".to_string()))?;

        let handover_type = HandoverType::from(request.handover_type);
        let predecessor = validate_sequence(conn, station_id, handover_type, caller.id)?;

        let is_deposit = handover_type == HandoverType::DepositToBank;
        if !is_deposit && request.to_user_id.is_none() {
            return Err(ServiceError::Validation(
                "toUserId is required for non-deposit handovers".to_string(),
            ));
        }

        let handover = CashHandover::insert(
            conn,
            NewCashHandover {
                id: Uuid::new_v4(),
                station_id,
                handover_type,
                handover_date: request.handover_date.unwrap_or(today),
                from_user_id: Some(caller.id),
                to_user_id: if is_deposit { None } else { request.to_user_id },
                expected_amount: request.expected_amount,
                previous_handover_id: request
                    .previous_handover_id
                    .or(predecessor.map(|p| p.id)),
                status: HandoverStatus::Pending,
                shift_id: request.shift_id,
                bank_name: request.bank_name,
                deposit_reference: request.deposit_reference,
                deposit_receipt_url: request.deposit_receipt_url,
                notes: request.notes,
            },
        )?;

        AuditEntry::new("handover_create", "cash_handover")
            .by(caller)
            .station(station_id)
            .entity(handover.id)
            .new_values(json!({
                "type": format!("{:?}", request.handover_type),
                "expectedAmount": handover.expected_amount,
            }))
            .category(AuditCategory::Finance)
            .emit(conn)?;

        Ok(handover)
    })
}

pub fn confirm(
    conn: &mut PgConnection,
    rule: &VarianceRule,
    caller: &AuthUser,
    handover_id: Uuid,
    actual_amount: Decimal,
    notes: Option<String>,
) -> Result<CashHandover, ServiceError> {
    conn.transaction::<_, ServiceError, _>(|conn| {
        let handover = CashHandover::by_id(conn, handover_id)?
            .ok_or_else(|| ServiceError::NotFound("handover".to_string()))?;

        auth::assert_station(conn, caller, handover.station_id)?;

        if handover.status != HandoverStatus::Pending {
            return Err(ServiceError::conflict(
                "INVALID_STATE",
                "only pending handovers can be confirmed",
            ));
        }

        if let Some(to_user) = handover.to_user_id {
            if caller.id != to_user && caller.role == fuelops_commons::Role::Employee {
                return Err(ServiceError::Forbidden(
                    "only the receiving user may confirm this handover".to_string(),
                ));
            }
        }

        if handover.handover_type == HandoverType::DepositToBank
            && (handover.bank_name.is_none() || handover.deposit_reference.is_none())
        {
            return Err(ServiceError::conflict(
                "DEPOSIT_DETAILS_REQUIRED",
                "bank name and deposit reference are required before a deposit can be confirmed",
            ));
        }

        let outcome = evaluate_variance(rule, handover.expected_amount, actual_amount);

        let (status, dispute_notes) = if outcome.disputed {
            let note = format!(
                "auto-disputed: expected {}, counted {actual_amount}, variance {}%",
                handover.expected_amount, outcome.variance_percent
            );
            (
                HandoverStatus::Disputed,
                Some(match &notes {
                    Some(extra) => format!("{note}; {extra}"),
                    None => note,
                }),
            )
        } else {
            (HandoverStatus::Confirmed, notes.clone())
        };

        let handover = CashHandover::confirm(
            conn,
            handover.id,
            status,
            actual_amount,
            outcome.difference,
            caller.id,
            dispute_notes,
        )?;

        AuditEntry::new("handover_confirm", "cash_handover")
            .by(caller)
            .station(handover.station_id)
            .entity(handover.id)
            .new_values(json!({
                "actualAmount": actual_amount,
                "difference": outcome.difference,
                "variancePercent": outcome.variance_percent,
                "status": format!("{:?}", handover.status),
            }))
            .severity(if outcome.disputed {
                AuditSeverity::Warning
            } else {
                AuditSeverity::Info
            })
            .category(AuditCategory::Finance)
            .emit(conn)?;

        Ok(handover)
    })
}

pub fn resolve_dispute(
    conn: &mut PgConnection,
    caller: &AuthUser,
    handover_id: Uuid,
    resolution_notes: String,
) -> Result<CashHandover, ServiceError> {
    conn.transaction::<_, ServiceError, _>(|conn| {
        let handover = CashHandover::by_id(conn, handover_id)?
            .ok_or_else(|| ServiceError::NotFound("handover".to_string()))?;

        auth::assert_station(conn, caller, handover.station_id)?;

        if handover.status != HandoverStatus::Disputed {
            return Err(ServiceError::conflict(
                "INVALID_STATE",
                "only disputed handovers can be resolved",
            ));
        }

        let handover = CashHandover::resolve(conn, handover.id, resolution_notes.clone(), caller.id)?;

        AuditEntry::new("handover_resolve", "cash_handover")
            .by(caller)
            .station(handover.station_id)
            .entity(handover.id)
            .describe(resolution_notes)
            .category(AuditCategory::Finance)
            .emit(conn)?;

        Ok(handover)
    })
}

#[derive(Debug, Default, Clone)]
pub struct TypeFlow {
    pub count: usize,
    pub expected: Decimal,
    pub actual: Decimal,
}

#[derive(Debug, Default, Clone)]
pub struct CashFlowSummary {
    pub shift_collection: TypeFlow,
    pub employee_to_manager: TypeFlow,
    pub manager_to_owner: TypeFlow,
    pub deposit_to_bank: TypeFlow,
    pub pending_count: usize,
    pub disputed_count: usize,
}

pub fn cash_flow_summary(
    conn: &mut PgConnection,
    station_id: Uuid,
    from: Option<Date>,
    to: Option<Date>,
) -> Result<CashFlowSummary, ServiceError> {
    let handovers = CashHandover::for_station(conn, station_id, from, to, None)?;

    let mut summary = CashFlowSummary::default();
    for handover in &handovers {
        let flow = match handover.handover_type {
            HandoverType::ShiftCollection => &mut summary.shift_collection,
            HandoverType::EmployeeToManager => &mut summary.employee_to_manager,
            HandoverType::ManagerToOwner => &mut summary.manager_to_owner,
            HandoverType::DepositToBank => &mut summary.deposit_to_bank,
        };

        flow.count += 1;
        flow.expected += handover.expected_amount;
        flow.actual += handover.actual_amount.unwrap_or(Decimal::ZERO);

        match handover.status {
            HandoverStatus::Pending => summary.pending_count += 1,
            HandoverStatus::Disputed => summary.disputed_count += 1,
            _ => {}
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn large_shortfall_disputes() {
        let rule = VarianceRule::default();
        let outcome = evaluate_variance(&rule, dec!(5000.00), dec!(4850.00));
        assert_eq!(outcome.difference, dec!(-150.00));
        assert_eq!(outcome.variance_percent, dec!(3.00));
        assert!(outcome.disputed);
    }

    #[test]
    fn small_shortfall_confirms() {
        let rule = VarianceRule::default();
        let outcome = evaluate_variance(&rule, dec!(5000.00), dec!(4950.00));
        assert_eq!(outcome.difference, dec!(-50.00));
        assert_eq!(outcome.variance_percent, dec!(1.00));
        assert!(!outcome.disputed);
    }

    #[test]
    fn percentage_floor_scales_with_expected() {
        let rule = VarianceRule::default();

        // 150 over 100 in cash, but only 1.5% of 10000: within tolerance.
        let outcome = evaluate_variance(&rule, dec!(10000.00), dec!(9850.00));
        assert!(!outcome.disputed);

        // 250 exceeds both floors.
        let outcome = evaluate_variance(&rule, dec!(10000.00), dec!(9750.00));
        assert!(outcome.disputed);
    }

    #[test]
    fn zero_expected_has_zero_variance() {
        let rule = VarianceRule::default();
        let outcome = evaluate_variance(&rule, dec!(0), dec!(40.00));
        assert_eq!(outcome.variance_percent, Decimal::ZERO);
        // Still within the absolute floor.
        assert!(!outcome.disputed);
    }

    #[test]
    fn overage_is_treated_like_shortfall() {
        let rule = VarianceRule::default();
        let outcome = evaluate_variance(&rule, dec!(5000.00), dec!(5200.00));
        assert_eq!(outcome.difference, dec!(200.00));
        assert!(outcome.disputed);
    }
}
