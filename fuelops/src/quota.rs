use crate::db::creditors::Creditor;
use crate::db::monthly_usage::MonthlyUsage;
use crate::db::nozzles::Nozzle;
use crate::db::plans::Plan;
use crate::db::pumps::Pump;
use crate::db::stations::Station;
use crate::db::users::User;
use crate::error::ServiceError;
use diesel::PgConnection;
use time::Date;
use time::Duration;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonthlyKind {
    Exports,
    Reports,
    ManualEntries,
}

impl MonthlyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MonthlyKind::Exports => "exports",
            MonthlyKind::Reports => "reports",
            MonthlyKind::ManualEntries => "manual_entries",
        }
    }

    fn limit(&self, plan: &Plan) -> i32 {
        match self {
            MonthlyKind::Exports => plan.monthly_exports,
            MonthlyKind::Reports => plan.monthly_reports,
            MonthlyKind::ManualEntries => plan.monthly_manual_entries,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    Export,
    ExpenseTracking,
    CreditTracking,
    ProfitLoss,
}

pub fn month_key(date: Date) -> String {
    format!("{:04}-{:02}", date.year(), u8::from(date.month()))
}

/// The plan governing an owner right now. Within the downgrade grace
/// window the previous plan's limits still apply where they are higher.
pub fn effective_plan(
    conn: &mut PgConnection,
    owner: &User,
    grace_days: i64,
) -> Result<Plan, ServiceError> {
    let plan_id = owner
        .plan_id
        .ok_or_else(|| ServiceError::QuotaExceeded("owner has no subscription plan".to_string()))?;

    let plan = Plan::by_id(conn, plan_id)?
        .ok_or_else(|| ServiceError::NotFound("plan".to_string()))?;

    let in_grace = match owner.plan_changed_at {
        Some(changed_at) => {
            OffsetDateTime::now_utc() - changed_at <= Duration::days(grace_days)
        }
        None => false,
    };

    if !in_grace {
        return Ok(plan);
    }

    match owner.previous_plan_id {
        Some(previous_id) => {
            let previous = Plan::by_id(conn, previous_id)?;
            Ok(previous.map(|p| merge_generous(plan.clone(), p)).unwrap_or(plan))
        }
        None => Ok(plan),
    }
}

/// Elementwise maximum of two plans' allowances.
fn merge_generous(a: Plan, b: Plan) -> Plan {
    Plan {
        max_stations: a.max_stations.max(b.max_stations),
        max_pumps_per_station: a.max_pumps_per_station.max(b.max_pumps_per_station),
        max_nozzles_per_pump: a.max_nozzles_per_pump.max(b.max_nozzles_per_pump),
        max_employees: a.max_employees.max(b.max_employees),
        max_creditors: a.max_creditors.max(b.max_creditors),
        monthly_exports: a.monthly_exports.max(b.monthly_exports),
        monthly_reports: a.monthly_reports.max(b.monthly_reports),
        monthly_manual_entries: a.monthly_manual_entries.max(b.monthly_manual_entries),
        sales_retention_days: merge_retention(a.sales_retention_days, b.sales_retention_days),
        profit_retention_days: merge_retention(a.profit_retention_days, b.profit_retention_days),
        analytics_retention_days: merge_retention(
            a.analytics_retention_days,
            b.analytics_retention_days,
        ),
        audit_retention_days: merge_retention(a.audit_retention_days, b.audit_retention_days),
        transactions_retention_days: merge_retention(
            a.transactions_retention_days,
            b.transactions_retention_days,
        ),
        backdated_days: a.backdated_days.max(b.backdated_days),
        can_export: a.can_export || b.can_export,
        can_track_expenses: a.can_track_expenses || b.can_track_expenses,
        can_track_credits: a.can_track_credits || b.can_track_credits,
        can_view_profit_loss: a.can_view_profit_loss || b.can_view_profit_loss,
        ..a
    }
}

// -1 means unlimited and beats any finite window.
fn merge_retention(a: i32, b: i32) -> i32 {
    if a < 0 || b < 0 {
        -1
    } else {
        a.max(b)
    }
}

pub fn require_feature(plan: &Plan, feature: Feature) -> Result<(), ServiceError> {
    let (enabled, name) = match feature {
        Feature::Export => (plan.can_export, "export"),
        Feature::ExpenseTracking => (plan.can_track_expenses, "expense tracking"),
        Feature::CreditTracking => (plan.can_track_credits, "credit tracking"),
        Feature::ProfitLoss => (plan.can_view_profit_loss, "profit & loss"),
    };

    if enabled {
        Ok(())
    } else {
        Err(ServiceError::QuotaExceeded(format!(
            "the current plan does not include {name}"
        )))
    }
}

fn ceiling_check(current: i64, limit: i32, what: &str) -> Result<(), ServiceError> {
    if limit >= 0 && current >= i64::from(limit) {
        return Err(ServiceError::QuotaExceeded(format!(
            "plan allows at most {limit} {what}"
        )));
    }

    Ok(())
}

pub fn ensure_station_allowed(
    conn: &mut PgConnection,
    owner_id: Uuid,
    plan: &Plan,
) -> Result<(), ServiceError> {
    let current = Station::count_for_owner(conn, owner_id)?;
    ceiling_check(current, plan.max_stations, "stations")
}

pub fn ensure_pump_allowed(
    conn: &mut PgConnection,
    station_id: Uuid,
    plan: &Plan,
) -> Result<(), ServiceError> {
    let current = Pump::count_for_station(conn, station_id)?;
    ceiling_check(current, plan.max_pumps_per_station, "pumps per station")
}

pub fn ensure_nozzle_allowed(
    conn: &mut PgConnection,
    pump_id: Uuid,
    plan: &Plan,
) -> Result<(), ServiceError> {
    let current = Nozzle::count_for_pump(conn, pump_id)?;
    ceiling_check(current, plan.max_nozzles_per_pump, "nozzles per pump")
}

pub fn ensure_staff_allowed(
    conn: &mut PgConnection,
    owner_id: Uuid,
    plan: &Plan,
) -> Result<(), ServiceError> {
    let current = User::count_staff_for_owner(conn, owner_id)?;
    ceiling_check(current, plan.max_employees, "staff accounts")
}

pub fn ensure_creditor_allowed(
    conn: &mut PgConnection,
    owner_id: Uuid,
    plan: &Plan,
) -> Result<(), ServiceError> {
    let current = Creditor::count_for_owner(conn, owner_id)?;
    ceiling_check(current, plan.max_creditors, "creditors")
}

/// Checks the counter without consuming it.
pub fn ensure_monthly_allowed(
    conn: &mut PgConnection,
    owner_id: Uuid,
    plan: &Plan,
    kind: MonthlyKind,
    today: Date,
) -> Result<(), ServiceError> {
    let limit = kind.limit(plan);
    if limit < 0 {
        return Ok(());
    }

    let used = MonthlyUsage::current(conn, owner_id, &month_key(today), kind.as_str())?;
    if used >= limit {
        return Err(ServiceError::QuotaExceeded(format!(
            "monthly {} quota of {limit} reached",
            kind.as_str().replace('_', " ")
        )));
    }

    Ok(())
}

/// Consumes one unit after the gated operation succeeded, inside the same
/// transaction.
pub fn record_monthly_use(
    conn: &mut PgConnection,
    owner_id: Uuid,
    kind: MonthlyKind,
    today: Date,
) -> Result<(), ServiceError> {
    MonthlyUsage::increment(conn, owner_id, &month_key(today), kind.as_str())?;
    Ok(())
}

/// Clamps the start of a read window to the plan's retention horizon.
/// `-1` means unlimited.
pub fn clamp_to_retention(requested_from: Option<Date>, retention_days: i32, today: Date) -> Option<Date> {
    if retention_days < 0 {
        return requested_from;
    }

    let horizon = today - Duration::days(i64::from(retention_days));
    match requested_from {
        Some(from) if from >= horizon => Some(from),
        _ => Some(horizon),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn month_key_is_zero_padded() {
        assert_eq!(month_key(date!(2024 - 06 - 01)), "2024-06");
        assert_eq!(month_key(date!(2024 - 11 - 30)), "2024-11");
    }

    #[test]
    fn retention_clamps_old_requests() {
        let today = date!(2024 - 06 - 30);

        // Window inside retention passes through.
        assert_eq!(
            clamp_to_retention(Some(date!(2024 - 06 - 10)), 30, today),
            Some(date!(2024 - 06 - 10))
        );

        // Requests past the horizon are pulled forward.
        assert_eq!(
            clamp_to_retention(Some(date!(2024 - 01 - 01)), 30, today),
            Some(date!(2024 - 05 - 31))
        );

        // No explicit start still clamps.
        assert_eq!(clamp_to_retention(None, 30, today), Some(date!(2024 - 05 - 31)));

        // Unlimited retention is a no-op.
        assert_eq!(clamp_to_retention(None, -1, today), None);
    }

    #[test]
    fn retention_merge_prefers_unlimited() {
        assert_eq!(merge_retention(30, -1), -1);
        assert_eq!(merge_retention(30, 90), 90);
    }
}
