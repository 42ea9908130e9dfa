use crate::auth;
use crate::auth::AuthUser;
use crate::db::settlements::Settlement;
use crate::db::settlements::SettlementShortfall;
use crate::error::ServiceError;
use crate::routes::with_conn;
use crate::routes::AppState;
use crate::routes::RangeQuery;
use crate::settlement;
use crate::AppError;
use axum::extract::Path;
use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use fuelops_commons::requests::CreateSettlementRequest;
use fuelops_commons::requests::FinalizeSettlementRequest;
use fuelops_commons::status::SettlementStatus;
use fuelops_commons::ApiResponse;
use fuelops_commons::Role;
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use time::Date;
use uuid::Uuid;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementDto {
    pub id: Uuid,
    pub station_id: Uuid,
    #[serde(with = "fuelops_commons::serde_fmt::ymd")]
    pub settlement_date: Date,
    #[serde(with = "rust_decimal::serde::float")]
    pub expected_cash: Decimal,
    #[serde(
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub actual_cash: Option<Decimal>,
    #[serde(
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub variance: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float")]
    pub reported_cash: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub reported_online: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub reported_credit: Decimal,
    #[serde(
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub confirmed_online: Option<Decimal>,
    #[serde(
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub confirmed_credit: Option<Decimal>,
    #[serde(
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub variance_online: Option<Decimal>,
    #[serde(
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub variance_credit: Option<Decimal>,
    pub status: SettlementStatus,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub employee_shortfalls: Vec<ShortfallDto>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortfallDto {
    pub user_id: Uuid,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub shortfall: Decimal,
    pub reading_count: i32,
}

impl SettlementDto {
    fn from_row(s: Settlement, shortfalls: Vec<SettlementShortfall>) -> Self {
        SettlementDto {
            id: s.id,
            station_id: s.station_id,
            settlement_date: s.settlement_date,
            expected_cash: s.expected_cash,
            actual_cash: s.actual_cash,
            variance: s.variance,
            reported_cash: s.reported_cash,
            reported_online: s.reported_online,
            reported_credit: s.reported_credit,
            confirmed_online: s.confirmed_online,
            confirmed_credit: s.confirmed_credit,
            variance_online: s.variance_online,
            variance_credit: s.variance_credit,
            status: s.status.into(),
            employee_shortfalls: shortfalls
                .into_iter()
                .map(|row| ShortfallDto {
                    user_id: row.user_id,
                    name: row.user_name,
                    shortfall: row.shortfall,
                    reading_count: row.reading_count,
                })
                .collect(),
        }
    }
}

fn require_owner_or_manager(caller: &AuthUser) -> Result<(), AppError> {
    if caller.role == Role::Employee {
        return Err(AppError(ServiceError::Forbidden(
            "settlements require a manager or owner".to_string(),
        )));
    }

    Ok(())
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Path(station_id): Path<Uuid>,
    Json(request): Json<CreateSettlementRequest>,
) -> Result<(StatusCode, Json<ApiResponse<SettlementDto>>), AppError> {
    require_owner_or_manager(&caller)?;

    let settlement = with_conn(&state, move |conn| {
        let settlement = settlement::create_settlement(conn, &caller, station_id, request)?;
        Ok(SettlementDto::from_row(settlement, Vec::new()))
    })
    .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(settlement))))
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Path(station_id): Path<Uuid>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<ApiResponse<Vec<SettlementDto>>>, AppError> {
    let settlements = with_conn(&state, move |conn| {
        auth::assert_station(conn, &caller, station_id)?;

        let rows = Settlement::for_station(conn, station_id, query.from, query.to)?;
        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let shortfalls = SettlementShortfall::for_settlement(conn, row.id)?;
            out.push(SettlementDto::from_row(row, shortfalls));
        }

        Ok(out)
    })
    .await?;

    Ok(Json(ApiResponse::ok(settlements)))
}

pub async fn get_one(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<SettlementDto>>, AppError> {
    let settlement = with_conn(&state, move |conn| {
        let settlement = Settlement::by_id(conn, id)?
            .ok_or_else(|| ServiceError::NotFound("settlement".to_string()))?;
        auth::assert_station(conn, &caller, settlement.station_id)?;

        let shortfalls = SettlementShortfall::for_settlement(conn, settlement.id)?;
        Ok(SettlementDto::from_row(settlement, shortfalls))
    })
    .await?;

    Ok(Json(ApiResponse::ok(settlement)))
}

pub async fn finalize(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<FinalizeSettlementRequest>,
) -> Result<Json<ApiResponse<SettlementDto>>, AppError> {
    require_owner_or_manager(&caller)?;

    let settlement = with_conn(&state, move |conn| {
        let settlement = settlement::finalize(conn, &caller, id, request)?;
        let shortfalls = SettlementShortfall::for_settlement(conn, settlement.id)?;
        Ok(SettlementDto::from_row(settlement, shortfalls))
    })
    .await?;

    Ok(Json(ApiResponse::ok(settlement)))
}

pub async fn lock(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<SettlementDto>>, AppError> {
    require_owner_or_manager(&caller)?;

    let settlement = with_conn(&state, move |conn| {
        let settlement = settlement::lock(conn, &caller, id)?;
        let shortfalls = SettlementShortfall::for_settlement(conn, settlement.id)?;
        Ok(SettlementDto::from_row(settlement, shortfalls))
    })
    .await?;

    Ok(Json(ApiResponse::ok(settlement)))
}
