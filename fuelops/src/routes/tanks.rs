use crate::audit::AuditEntry;
use crate::auth;
use crate::auth::AuthUser;
use crate::db::audit_logs::AuditCategory;
use crate::db::tank_refills::TankRefill;
use crate::db::tanks::NewTank;
use crate::db::tanks::Tank;
use crate::db::tanks::TrackingMode;
use crate::error::ServiceError;
use crate::routes::with_conn;
use crate::routes::AppState;
use crate::tank;
use crate::AppError;
use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use fuelops_commons::requests::CreateRefillRequest;
use fuelops_commons::requests::CreateTankRequest;
use fuelops_commons::requests::DipCalibrationRequest;
use fuelops_commons::status::TankLevelStatus;
use fuelops_commons::ApiResponse;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use time::Date;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TankDto {
    pub id: Uuid,
    pub station_id: Uuid,
    pub fuel_type: String,
    pub name: Option<String>,
    pub fuel_display_name: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub capacity: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub current_level: Decimal,
    pub status: TankLevelStatus,
    pub tracking_mode: fuelops_commons::status::TrackingMode,
    pub allow_negative: bool,
    #[serde(
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub since_last_refill: Option<Decimal>,
    #[serde(
        with = "fuelops_commons::serde_fmt::ymd::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_refill_date: Option<Date>,
    #[serde(
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_refill_amount: Option<Decimal>,
    #[serde(
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_dip_reading: Option<Decimal>,
}

impl From<Tank> for TankDto {
    fn from(t: Tank) -> Self {
        let status = tank::classify(&t);
        let since = tank::since_last_refill(&t);
        TankDto {
            id: t.id,
            station_id: t.station_id,
            fuel_type: t.fuel_type,
            name: t.name,
            fuel_display_name: t.fuel_display_name,
            capacity: t.capacity,
            current_level: t.current_level,
            status,
            tracking_mode: t.tracking_mode.into(),
            allow_negative: t.allow_negative,
            since_last_refill: since,
            last_refill_date: t.last_refill_date,
            last_refill_amount: t.last_refill_amount,
            last_dip_reading: t.last_dip_reading,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefillDto {
    pub id: Uuid,
    pub tank_id: Uuid,
    #[serde(with = "rust_decimal::serde::float")]
    pub litres: Decimal,
    #[serde(with = "fuelops_commons::serde_fmt::ymd")]
    pub refill_date: Date,
    #[serde(
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub cost_per_litre: Option<Decimal>,
    #[serde(
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub total_cost: Option<Decimal>,
    pub supplier: Option<String>,
    pub invoice_number: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub tank_level_before: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub tank_level_after: Decimal,
    pub entry_type: fuelops_commons::status::RefillEntryType,
    pub is_backdated: bool,
    pub is_verified: bool,
}

impl From<TankRefill> for RefillDto {
    fn from(r: TankRefill) -> Self {
        RefillDto {
            id: r.id,
            tank_id: r.tank_id,
            litres: r.litres,
            refill_date: r.refill_date,
            cost_per_litre: r.cost_per_litre,
            total_cost: r.total_cost,
            supplier: r.supplier,
            invoice_number: r.invoice_number,
            tank_level_before: r.tank_level_before,
            tank_level_after: r.tank_level_after,
            entry_type: r.entry_type.into(),
            is_backdated: r.is_backdated,
            is_verified: r.is_verified,
        }
    }
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Path(station_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<TankDto>>>, AppError> {
    let tanks = with_conn(&state, move |conn| {
        auth::assert_station(conn, &caller, station_id)?;
        Tank::list_for_station(conn, station_id).map_err(Into::into)
    })
    .await?;

    Ok(Json(ApiResponse::ok(
        tanks.into_iter().map(Into::into).collect(),
    )))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Path(station_id): Path<Uuid>,
    Json(request): Json<CreateTankRequest>,
) -> Result<(StatusCode, Json<ApiResponse<TankDto>>), AppError> {
    if request.capacity <= Decimal::ZERO {
        return Err(AppError(ServiceError::Validation(
            "tank capacity must be positive".to_string(),
        )));
    }

    let tank = with_conn(&state, move |conn| {
        auth::assert_station(conn, &caller, station_id)?;

        let tank = Tank::insert(
            conn,
            NewTank {
                id: Uuid::new_v4(),
                station_id,
                fuel_type: request.fuel_type.to_string(),
                name: request.name,
                fuel_display_name: request.fuel_display_name,
                capacity: request.capacity,
                current_level: request.current_level.unwrap_or(Decimal::ZERO),
                low_level_warning: request.low_level_warning,
                low_level_percent: request.low_level_percent,
                critical_level: request.critical_level,
                critical_level_percent: request.critical_level_percent,
                tracking_mode: request
                    .tracking_mode
                    .map(TrackingMode::from)
                    .unwrap_or(TrackingMode::Warning),
                allow_negative: request.allow_negative,
            },
        )?;

        AuditEntry::new("tank_create", "tank")
            .by(&caller)
            .station(station_id)
            .entity(tank.id)
            .new_values(json!({
                "fuelType": tank.fuel_type,
                "capacity": tank.capacity,
                "currentLevel": tank.current_level,
            }))
            .category(AuditCategory::Data)
            .emit(conn)?;

        Ok(TankDto::from(tank))
    })
    .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(tank))))
}

pub async fn create_refill(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Path(tank_id): Path<Uuid>,
    Json(request): Json<CreateRefillRequest>,
) -> Result<(StatusCode, Json<ApiResponse<RefillDto>>), AppError> {
    let refill = with_conn(&state, move |conn| {
        let existing = Tank::by_id(conn, tank_id)?
            .ok_or_else(|| ServiceError::NotFound("tank".to_string()))?;
        auth::assert_station(conn, &caller, existing.station_id)?;

        tank::record_refill(
            conn,
            &caller,
            tank_id,
            request,
            OffsetDateTime::now_utc().date(),
        )
    })
    .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(refill.into()))))
}

pub async fn list_refills(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Path(tank_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<RefillDto>>>, AppError> {
    let refills = with_conn(&state, move |conn| {
        let tank = Tank::by_id(conn, tank_id)?
            .ok_or_else(|| ServiceError::NotFound("tank".to_string()))?;
        auth::assert_station(conn, &caller, tank.station_id)?;

        TankRefill::for_tank(conn, tank_id).map_err(Into::into)
    })
    .await?;

    Ok(Json(ApiResponse::ok(
        refills.into_iter().map(Into::into).collect(),
    )))
}

pub async fn delete_refill(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    with_conn(&state, move |conn| {
        let refill = TankRefill::by_id(conn, id)?
            .ok_or_else(|| ServiceError::NotFound("tank refill".to_string()))?;
        auth::assert_station(conn, &caller, refill.station_id)?;

        tank::delete_refill(conn, &caller, id)
    })
    .await?;

    Ok(Json(ApiResponse::ok(())))
}

pub async fn dip_calibration(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Path(tank_id): Path<Uuid>,
    Json(request): Json<DipCalibrationRequest>,
) -> Result<Json<ApiResponse<TankDto>>, AppError> {
    let tank = with_conn(&state, move |conn| {
        let existing = Tank::by_id(conn, tank_id)?
            .ok_or_else(|| ServiceError::NotFound("tank".to_string()))?;
        auth::assert_station(conn, &caller, existing.station_id)?;

        tank::calibrate(
            conn,
            &caller,
            tank_id,
            request.dip_level,
            request
                .reading_date
                .unwrap_or_else(|| OffsetDateTime::now_utc().date()),
        )
    })
    .await?;

    Ok(Json(ApiResponse::ok(tank.into())))
}
