use crate::auth;
use crate::auth::AuthUser;
use crate::dashboard;
use crate::db::plans::Plan;
use crate::error::ServiceError;
use crate::quota;
use crate::quota::Feature;
use crate::quota::MonthlyKind;
use crate::reports;
use crate::routes::with_conn;
use crate::routes::AppState;
use crate::routes::RangeQuery;
use crate::AppError;
use axum::extract::Query;
use axum::extract::State;
use axum::Json;
use fuelops_commons::ApiResponse;
use std::sync::Arc;
use time::Date;
use time::Duration;
use time::OffsetDateTime;
use uuid::Uuid;

const MAX_SHIFT_REPORT_DAYS: i64 = 92;

/// Applies the plan gates shared by all report endpoints: retention clamp
/// on the window and the monthly report counter.
fn prepare_report(
    conn: &mut diesel::PgConnection,
    caller: &AuthUser,
    query: &RangeQuery,
    grace_days: i64,
    retention: fn(&Plan) -> i32,
) -> Result<(Uuid, Option<Date>, Option<Date>), ServiceError> {
    let station_id = auth::resolve_station(conn, caller, query.station_id)?;
    let owner = auth::station_owner(conn, station_id)?;
    let plan = quota::effective_plan(conn, &owner, grace_days)?;
    let today = OffsetDateTime::now_utc().date();

    quota::ensure_monthly_allowed(conn, owner.id, &plan, MonthlyKind::Reports, today)?;
    quota::record_monthly_use(conn, owner.id, MonthlyKind::Reports, today)?;

    let from = quota::clamp_to_retention(query.from.or(query.date), retention(&plan), today);
    let to = query.to.or(query.date);

    Ok((station_id, from, to))
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesReportQuery {
    pub station_id: Option<Uuid>,
    #[serde(default, with = "fuelops_commons::serde_fmt::ymd::option")]
    pub from: Option<Date>,
    #[serde(default, with = "fuelops_commons::serde_fmt::ymd::option")]
    pub to: Option<Date>,
    /// When set, the caller intends to export the result; gated by the
    /// plan's export flag and monthly export counter.
    #[serde(default)]
    pub export: bool,
}

pub async fn sales(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Query(query): Query<SalesReportQuery>,
) -> Result<Json<ApiResponse<reports::SalesReport>>, AppError> {
    let grace_days = state.settings.plan_downgrade_grace_days;

    let report = with_conn(&state, move |conn| {
        let range = RangeQuery {
            station_id: query.station_id,
            from: query.from,
            to: query.to,
            date: None,
            page: None,
            limit: None,
        };

        let (station_id, from, to) =
            prepare_report(conn, &caller, &range, grace_days, |p| p.sales_retention_days)?;

        if query.export {
            let owner = auth::station_owner(conn, station_id)?;
            let plan = quota::effective_plan(conn, &owner, grace_days)?;
            quota::require_feature(&plan, Feature::Export)?;

            let today = OffsetDateTime::now_utc().date();
            quota::ensure_monthly_allowed(conn, owner.id, &plan, MonthlyKind::Exports, today)?;
            quota::record_monthly_use(conn, owner.id, MonthlyKind::Exports, today)?;
        }

        reports::sales(conn, station_id, from, to)
    })
    .await?;

    Ok(Json(ApiResponse::ok(report)))
}

pub async fn daily_sales(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Query(query): Query<RangeQuery>,
) -> Result<Json<ApiResponse<Vec<reports::DailySalesRow>>>, AppError> {
    let grace_days = state.settings.plan_downgrade_grace_days;

    let rows = with_conn(&state, move |conn| {
        let (station_id, from, to) = prepare_report(conn, &caller, &query, grace_days, |p| {
            p.transactions_retention_days
        })?;
        reports::daily_sales(conn, station_id, from, to)
    })
    .await?;

    Ok(Json(ApiResponse::ok(rows)))
}

pub async fn shifts(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Query(query): Query<RangeQuery>,
) -> Result<Json<ApiResponse<Vec<reports::ShiftReportRow>>>, AppError> {
    let grace_days = state.settings.plan_downgrade_grace_days;

    let rows = with_conn(&state, move |conn| {
        let (station_id, from, to) =
            prepare_report(conn, &caller, &query, grace_days, |p| p.sales_retention_days)?;

        let today = OffsetDateTime::now_utc().date();
        let to = to.unwrap_or(today);
        let from = from.unwrap_or(to - Duration::days(30));
        let (from, to) = reports::clamp_range(from, to, MAX_SHIFT_REPORT_DAYS);

        reports::shifts(conn, station_id, from, to)
    })
    .await?;

    Ok(Json(ApiResponse::ok(rows)))
}

pub async fn pumps(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Query(query): Query<RangeQuery>,
) -> Result<Json<ApiResponse<Vec<dashboard::PumpPerformanceRow>>>, AppError> {
    let grace_days = state.settings.plan_downgrade_grace_days;

    let rows = with_conn(&state, move |conn| {
        let (station_id, from, to) =
            prepare_report(conn, &caller, &query, grace_days, |p| p.sales_retention_days)?;
        dashboard::pump_performance(conn, station_id, from, to)
    })
    .await?;

    Ok(Json(ApiResponse::ok(rows)))
}

/// Profit is additionally feature-gated.
pub async fn profit(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Query(query): Query<RangeQuery>,
) -> Result<Json<ApiResponse<reports::ProfitReport>>, AppError> {
    let grace_days = state.settings.plan_downgrade_grace_days;

    let report = with_conn(&state, move |conn| {
        let station_id = auth::resolve_station(conn, &caller, query.station_id)?;
        let owner = auth::station_owner(conn, station_id)?;
        let plan = quota::effective_plan(conn, &owner, grace_days)?;
        quota::require_feature(&plan, Feature::ProfitLoss)?;

        let today = OffsetDateTime::now_utc().date();
        quota::ensure_monthly_allowed(conn, owner.id, &plan, MonthlyKind::Reports, today)?;
        quota::record_monthly_use(conn, owner.id, MonthlyKind::Reports, today)?;

        let to = query.to.or(query.date).unwrap_or(today);
        let from = quota::clamp_to_retention(
            query.from.or(query.date),
            plan.profit_retention_days,
            today,
        )
        .unwrap_or(to - Duration::days(30));

        reports::profit(conn, station_id, from, to)
    })
    .await?;

    Ok(Json(ApiResponse::ok(report)))
}

pub async fn audit(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Query(query): Query<RangeQuery>,
) -> Result<Json<ApiResponse<Vec<reports::AuditReportRow>>>, AppError> {
    let grace_days = state.settings.plan_downgrade_grace_days;
    let limit = query.limit.unwrap_or(200).clamp(1, 1000);

    let rows = with_conn(&state, move |conn| {
        let station_id = auth::resolve_station(conn, &caller, query.station_id)?;
        let owner = auth::station_owner(conn, station_id)?;
        let plan = quota::effective_plan(conn, &owner, grace_days)?;

        let today = OffsetDateTime::now_utc().date();
        let from =
            quota::clamp_to_retention(query.from.or(query.date), plan.audit_retention_days, today);

        reports::audit_trail(conn, station_id, from, limit)
    })
    .await?;

    Ok(Json(ApiResponse::ok(rows)))
}
