use crate::auth;
use crate::auth::AuthUser;
use crate::db::shifts::Shift;
use crate::routes::with_conn;
use crate::routes::AppState;
use crate::routes::RangeQuery;
use crate::shift;
use crate::AppError;
use axum::extract::Path;
use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use fuelops_commons::requests::EndShiftRequest;
use fuelops_commons::requests::StartShiftRequest;
use fuelops_commons::ApiResponse;
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use time::Date;
use time::OffsetDateTime;
use time::Time;
use uuid::Uuid;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftDto {
    pub id: Uuid,
    pub station_id: Uuid,
    pub employee_id: Uuid,
    #[serde(with = "fuelops_commons::serde_fmt::ymd")]
    pub shift_date: Date,
    #[serde(with = "fuelops_commons::serde_fmt::hms")]
    pub start_time: Time,
    #[serde(
        with = "fuelops_commons::serde_fmt::hms::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_time: Option<Time>,
    pub shift_type: fuelops_commons::status::ShiftType,
    pub status: fuelops_commons::status::ShiftStatus,
    #[serde(with = "rust_decimal::serde::float")]
    pub opening_cash: Decimal,
    #[serde(
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub cash_collected: Option<Decimal>,
    #[serde(
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub online_collected: Option<Decimal>,
    #[serde(
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub expected_cash: Option<Decimal>,
    #[serde(
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub cash_difference: Option<Decimal>,
    pub readings_count: i32,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_litres_sold: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_sales_amount: Decimal,
}

impl From<Shift> for ShiftDto {
    fn from(s: Shift) -> Self {
        ShiftDto {
            id: s.id,
            station_id: s.station_id,
            employee_id: s.employee_id,
            shift_date: s.shift_date,
            start_time: s.start_time,
            end_time: s.end_time,
            shift_type: s.shift_type.into(),
            status: s.status.into(),
            opening_cash: s.opening_cash,
            cash_collected: s.cash_collected,
            online_collected: s.online_collected,
            expected_cash: s.expected_cash,
            cash_difference: s.cash_difference,
            readings_count: s.readings_count,
            total_litres_sold: s.total_litres_sold,
            total_sales_amount: s.total_sales_amount,
        }
    }
}

pub async fn start(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Json(request): Json<StartShiftRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ShiftDto>>), AppError> {
    let now = OffsetDateTime::now_utc();

    let shift = with_conn(&state, move |conn| {
        shift::start_shift(conn, &caller, None, request, now.date(), now.time())
    })
    .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(shift.into()))))
}

pub async fn end(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<EndShiftRequest>,
) -> Result<Json<ApiResponse<ShiftDto>>, AppError> {
    let now = OffsetDateTime::now_utc().time();

    let shift = with_conn(&state, move |conn| {
        shift::end_shift(conn, &caller, id, request, now)
    })
    .await?;

    Ok(Json(ApiResponse::ok(shift.into())))
}

pub async fn cancel(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    with_conn(&state, move |conn| shift::cancel_shift(conn, &caller, id)).await?;

    Ok(Json(ApiResponse::ok(())))
}

pub async fn current(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
) -> Result<Json<ApiResponse<Option<ShiftDto>>>, AppError> {
    let shift = with_conn(&state, move |conn| {
        Shift::active_for_employee(conn, caller.id).map_err(Into::into)
    })
    .await?;

    Ok(Json(ApiResponse::ok(shift.map(Into::into))))
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Query(query): Query<RangeQuery>,
) -> Result<Json<ApiResponse<Vec<ShiftDto>>>, AppError> {
    let shifts = with_conn(&state, move |conn| {
        let station_id = auth::resolve_station(conn, &caller, query.station_id)?;
        let date = query
            .date
            .unwrap_or_else(|| OffsetDateTime::now_utc().date());

        Shift::for_station_on(conn, station_id, date).map_err(Into::into)
    })
    .await?;

    Ok(Json(ApiResponse::ok(
        shifts.into_iter().map(Into::into).collect(),
    )))
}
