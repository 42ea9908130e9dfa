use crate::auth;
use crate::auth::AuthUser;
use crate::dashboard;
use crate::error::ServiceError;
use crate::quota;
use crate::routes::with_conn;
use crate::routes::AppState;
use crate::routes::RangeQuery;
use crate::AppError;
use axum::extract::Query;
use axum::extract::State;
use axum::Json;
use fuelops_commons::ApiResponse;
use fuelops_commons::Role;
use std::sync::Arc;
use time::OffsetDateTime;
use uuid::Uuid;

/// Analytics reads are clamped to the owner's plan retention window.
fn clamped_range(
    conn: &mut diesel::PgConnection,
    station_id: Uuid,
    query: &RangeQuery,
    grace_days: i64,
) -> Result<(Option<time::Date>, Option<time::Date>), ServiceError> {
    let owner = auth::station_owner(conn, station_id)?;
    let plan = quota::effective_plan(conn, &owner, grace_days)?;
    let today = OffsetDateTime::now_utc().date();

    let from = quota::clamp_to_retention(
        query.from.or(query.date),
        plan.analytics_retention_days,
        today,
    );

    Ok((from, query.to.or(query.date)))
}

pub async fn summary(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Query(query): Query<RangeQuery>,
) -> Result<Json<ApiResponse<dashboard::DashboardSummary>>, AppError> {
    let grace_days = state.settings.plan_downgrade_grace_days;

    let summary = with_conn(&state, move |conn| {
        let station_id = auth::resolve_station(conn, &caller, query.station_id)?;
        let (from, to) = clamped_range(conn, station_id, &query, grace_days)?;
        dashboard::summary(conn, station_id, from, to)
    })
    .await?;

    Ok(Json(ApiResponse::ok(summary)))
}

pub async fn daily(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Query(query): Query<RangeQuery>,
) -> Result<Json<ApiResponse<dashboard::DashboardSummary>>, AppError> {
    let summary = with_conn(&state, move |conn| {
        let station_id = auth::resolve_station(conn, &caller, query.station_id)?;
        let date = query
            .date
            .unwrap_or_else(|| OffsetDateTime::now_utc().date());
        dashboard::summary(conn, station_id, Some(date), Some(date))
    })
    .await?;

    Ok(Json(ApiResponse::ok(summary)))
}

pub async fn trends(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Query(query): Query<RangeQuery>,
) -> Result<Json<ApiResponse<Vec<dashboard::TrendPoint>>>, AppError> {
    let grace_days = state.settings.plan_downgrade_grace_days;

    let points = with_conn(&state, move |conn| {
        let station_id = auth::resolve_station(conn, &caller, query.station_id)?;
        let (from, to) = clamped_range(conn, station_id, &query, grace_days)?;
        dashboard::trends(conn, station_id, from, to)
    })
    .await?;

    Ok(Json(ApiResponse::ok(points)))
}

pub async fn fuel_breakdown(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Query(query): Query<RangeQuery>,
) -> Result<Json<ApiResponse<Vec<dashboard::FuelBreakdownRow>>>, AppError> {
    let grace_days = state.settings.plan_downgrade_grace_days;

    let rows = with_conn(&state, move |conn| {
        let station_id = auth::resolve_station(conn, &caller, query.station_id)?;
        let (from, to) = clamped_range(conn, station_id, &query, grace_days)?;
        dashboard::fuel_breakdown(conn, station_id, from, to)
    })
    .await?;

    Ok(Json(ApiResponse::ok(rows)))
}

pub async fn pump_performance(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Query(query): Query<RangeQuery>,
) -> Result<Json<ApiResponse<Vec<dashboard::PumpPerformanceRow>>>, AppError> {
    let grace_days = state.settings.plan_downgrade_grace_days;

    let rows = with_conn(&state, move |conn| {
        let station_id = auth::resolve_station(conn, &caller, query.station_id)?;
        let (from, to) = clamped_range(conn, station_id, &query, grace_days)?;
        dashboard::pump_performance(conn, station_id, from, to)
    })
    .await?;

    Ok(Json(ApiResponse::ok(rows)))
}

pub async fn shift_breakdown(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Query(query): Query<RangeQuery>,
) -> Result<Json<ApiResponse<Vec<dashboard::ShiftBreakdownRow>>>, AppError> {
    let rows = with_conn(&state, move |conn| {
        let station_id = auth::resolve_station(conn, &caller, query.station_id)?;
        let date = query
            .date
            .unwrap_or_else(|| OffsetDateTime::now_utc().date());
        dashboard::shift_breakdown(conn, station_id, date)
    })
    .await?;

    Ok(Json(ApiResponse::ok(rows)))
}

pub async fn nozzle_breakdown(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Query(query): Query<RangeQuery>,
) -> Result<Json<ApiResponse<Vec<dashboard::NozzleBreakdownRow>>>, AppError> {
    let grace_days = state.settings.plan_downgrade_grace_days;

    let rows = with_conn(&state, move |conn| {
        let station_id = auth::resolve_station(conn, &caller, query.station_id)?;
        let (from, to) = clamped_range(conn, station_id, &query, grace_days)?;
        dashboard::nozzle_breakdown(conn, station_id, from, to)
    })
    .await?;

    Ok(Json(ApiResponse::ok(rows)))
}

pub async fn admin_overview(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
) -> Result<Json<ApiResponse<dashboard::AdminOverview>>, AppError> {
    if caller.role != Role::SuperAdmin {
        return Err(AppError(ServiceError::Forbidden(
            "admin overview is super-admin only".to_string(),
        )));
    }

    let overview = with_conn(&state, move |conn| dashboard::admin_overview(conn)).await?;

    Ok(Json(ApiResponse::ok(overview)))
}
