use crate::audit::AuditEntry;
use crate::auth;
use crate::auth::AuthUser;
use crate::auth::StationScope;
use crate::db::audit_logs::AuditCategory;
use crate::db::fuel_prices::FuelPrice;
use crate::db::fuel_prices::NewFuelPrice;
use crate::db::nozzles::NewNozzle;
use crate::db::nozzles::Nozzle;
use crate::db::plans::NewPlan;
use crate::db::plans::Plan;
use crate::db::pumps::EquipmentStatus;
use crate::db::pumps::NewPump;
use crate::db::pumps::Pump;
use crate::db::stations::NewStation;
use crate::db::stations::Station;
use crate::db::users::NewUser;
use crate::db::users::User;
use crate::db::users::UserRole;
use crate::error::ServiceError;
use crate::quota;
use crate::routes::with_conn;
use crate::routes::AppState;
use crate::AppError;
use axum::extract::Path;
use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use fuelops_commons::requests::CreateFuelPriceRequest;
use fuelops_commons::requests::CreateNozzleRequest;
use fuelops_commons::requests::CreatePumpRequest;
use fuelops_commons::requests::CreateStationRequest;
use fuelops_commons::requests::CreateUserRequest;
use fuelops_commons::ApiResponse;
use fuelops_commons::Role;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use time::Date;
use uuid::Uuid;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub station_id: Option<Uuid>,
    pub plan_id: Option<Uuid>,
    pub is_active: bool,
}

impl From<User> for UserDto {
    fn from(u: User) -> Self {
        UserDto {
            id: u.id,
            email: u.email,
            name: u.name,
            role: u.role.into(),
            station_id: u.station_id,
            plan_id: u.plan_id,
            is_active: u.is_active,
        }
    }
}

pub async fn create_user(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserDto>>), AppError> {
    let grace_days = state.settings.plan_downgrade_grace_days;

    let user = with_conn(&state, move |conn| {
        match (caller.role, request.role) {
            (Role::SuperAdmin, Role::Owner) | (Role::SuperAdmin, Role::SuperAdmin) => {}
            (Role::Owner, Role::Manager) | (Role::Owner, Role::Employee) => {
                let station_id = request.station_id.ok_or_else(|| {
                    ServiceError::Validation(
                        "managers and employees need a station assignment".to_string(),
                    )
                })?;
                auth::assert_station(conn, &caller, station_id)?;

                let owner = User::by_id(conn, caller.id)?
                    .ok_or_else(|| ServiceError::NotFound("user".to_string()))?;
                let plan = quota::effective_plan(conn, &owner, grace_days)?;
                quota::ensure_staff_allowed(conn, owner.id, &plan)?;
            }
            _ => {
                return Err(ServiceError::Forbidden(format!(
                    "a {:?} cannot create a {:?} account",
                    caller.role, request.role
                )));
            }
        }

        if User::by_email(conn, &request.email)?.is_some() {
            return Err(ServiceError::conflict(
                "DUPLICATE_EMAIL",
                "a user with this email already exists",
            ));
        }

        if request.role == Role::Owner && request.plan_id.is_none() {
            return Err(ServiceError::Validation(
                "owners must be assigned a plan".to_string(),
            ));
        }

        let password_hash = auth::hash_password(&request.password)?;
        let user = User::insert(
            conn,
            NewUser {
                id: Uuid::new_v4(),
                email: request.email,
                password_hash,
                name: request.name,
                role: UserRole::from(request.role),
                station_id: request.station_id,
                plan_id: request.plan_id,
                created_by: Some(caller.id),
            },
        )?;

        AuditEntry::new("user_create", "user")
            .by(&caller)
            .entity(user.id)
            .new_values(json!({
                "email": user.email,
                "role": format!("{:?}", request.role),
                "stationId": user.station_id,
            }))
            .category(AuditCategory::Auth)
            .emit(conn)?;

        Ok(UserDto::from(user))
    })
    .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(user))))
}

pub async fn list_users(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
) -> Result<Json<ApiResponse<Vec<UserDto>>>, AppError> {
    let users = with_conn(&state, move |conn| {
        let users = match auth::station_scope(conn, &caller)? {
            StationScope::All => User::list_created_by(conn, caller.id)?,
            StationScope::Stations(station_ids) => {
                let mut users = Vec::new();
                for station_id in station_ids {
                    users.extend(User::list_for_station(conn, station_id)?);
                }
                users
            }
        };

        Ok(users.into_iter().map(UserDto::from).collect::<Vec<_>>())
    })
    .await?;

    Ok(Json(ApiResponse::ok(users)))
}

#[derive(Debug, Deserialize)]
pub struct SetActiveRequest {
    pub active: bool,
}

pub async fn set_user_active(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<SetActiveRequest>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    with_conn(&state, move |conn| {
        let target = User::by_id(conn, id)?
            .ok_or_else(|| ServiceError::NotFound("user".to_string()))?;

        match caller.role {
            Role::SuperAdmin => {}
            Role::Owner => {
                let station_id = target.station_id.ok_or_else(ServiceError::forbidden_station)?;
                auth::assert_station(conn, &caller, station_id)?;
            }
            _ => return Err(ServiceError::Forbidden("not allowed".to_string())),
        }

        User::set_active(conn, id, request.active)
            .map_err(|e| ServiceError::Internal(anyhow::anyhow!(e)))?;

        AuditEntry::new("user_set_active", "user")
            .by(&caller)
            .entity(id)
            .new_values(json!({ "active": request.active }))
            .category(AuditCategory::Auth)
            .emit(conn)?;

        Ok(())
    })
    .await?;

    Ok(Json(ApiResponse::ok(())))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePlanRequest {
    pub plan_id: Uuid,
}

pub async fn change_plan(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<ChangePlanRequest>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    if caller.role != Role::SuperAdmin {
        return Err(AppError(ServiceError::Forbidden(
            "plan changes are super-admin only".to_string(),
        )));
    }

    with_conn(&state, move |conn| {
        let target = User::by_id(conn, id)?
            .ok_or_else(|| ServiceError::NotFound("user".to_string()))?;
        if target.role != UserRole::Owner {
            return Err(ServiceError::Validation(
                "plans are assigned to owners".to_string(),
            ));
        }

        Plan::by_id(conn, request.plan_id)?
            .ok_or_else(|| ServiceError::NotFound("plan".to_string()))?;

        User::change_plan(conn, id, request.plan_id)
            .map_err(|e| ServiceError::Internal(anyhow::anyhow!(e)))?;

        AuditEntry::new("user_change_plan", "user")
            .by(&caller)
            .entity(id)
            .old(json!({ "planId": target.plan_id }))
            .new_values(json!({ "planId": request.plan_id }))
            .category(AuditCategory::System)
            .emit(conn)?;

        Ok(())
    })
    .await?;

    Ok(Json(ApiResponse::ok(())))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StationDto {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub owner_id: Uuid,
    pub brand: Option<String>,
    pub shift_required_for_reading: bool,
    pub missed_reading_alert_days: Option<i32>,
    pub is_active: bool,
}

impl From<Station> for StationDto {
    fn from(s: Station) -> Self {
        StationDto {
            id: s.id,
            name: s.name,
            code: s.code,
            owner_id: s.owner_id,
            brand: s.brand,
            shift_required_for_reading: s.shift_required_for_reading,
            missed_reading_alert_days: s.missed_reading_alert_days,
            is_active: s.is_active,
        }
    }
}

pub async fn create_station(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Json(request): Json<CreateStationRequest>,
) -> Result<(StatusCode, Json<ApiResponse<StationDto>>), AppError> {
    let grace_days = state.settings.plan_downgrade_grace_days;

    let station = with_conn(&state, move |conn| {
        let owner_id = match caller.role {
            Role::Owner => caller.id,
            Role::SuperAdmin => request.owner_id.ok_or_else(|| {
                ServiceError::Validation("ownerId is required for super-admin".to_string())
            })?,
            _ => {
                return Err(ServiceError::Forbidden(
                    "only owners can create stations".to_string(),
                ))
            }
        };

        let owner = User::by_id(conn, owner_id)?
            .ok_or_else(|| ServiceError::NotFound("owner".to_string()))?;
        let plan = quota::effective_plan(conn, &owner, grace_days)?;
        quota::ensure_station_allowed(conn, owner_id, &plan)?;

        if Station::by_code(conn, &request.code)?.is_some() {
            return Err(ServiceError::conflict(
                "DUPLICATE_CODE",
                "a station with this code already exists",
            ));
        }

        let station = Station::insert(
            conn,
            NewStation {
                id: Uuid::new_v4(),
                name: request.name,
                code: request.code,
                address: request.address,
                phone: request.phone,
                owner_id,
                brand: request.brand,
                shift_required_for_reading: request.shift_required_for_reading,
                missed_reading_alert_days: request.missed_reading_alert_days,
            },
        )?;

        AuditEntry::new("station_create", "station")
            .by(&caller)
            .station(station.id)
            .entity(station.id)
            .new_values(json!({ "name": station.name, "code": station.code }))
            .category(AuditCategory::Data)
            .emit(conn)?;

        Ok(StationDto::from(station))
    })
    .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(station))))
}

pub async fn list_stations(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
) -> Result<Json<ApiResponse<Vec<StationDto>>>, AppError> {
    let stations = with_conn(&state, move |conn| {
        let stations = match auth::station_scope(conn, &caller)? {
            StationScope::All => Station::all_active(conn)?,
            StationScope::Stations(ids) => {
                let mut stations = Vec::new();
                for id in ids {
                    if let Some(station) = Station::by_id(conn, id)? {
                        stations.push(station);
                    }
                }
                stations
            }
        };

        Ok(stations
            .into_iter()
            .map(StationDto::from)
            .collect::<Vec<_>>())
    })
    .await?;

    Ok(Json(ApiResponse::ok(stations)))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PumpDto {
    pub id: Uuid,
    pub station_id: Uuid,
    pub name: String,
    pub pump_number: i32,
    pub serial_number: Option<String>,
    pub status: fuelops_commons::status::PumpStatus,
}

impl From<Pump> for PumpDto {
    fn from(p: Pump) -> Self {
        PumpDto {
            id: p.id,
            station_id: p.station_id,
            name: p.name,
            pump_number: p.pump_number,
            serial_number: p.serial_number,
            status: p.status.into(),
        }
    }
}

pub async fn create_pump(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Path(station_id): Path<Uuid>,
    Json(request): Json<CreatePumpRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PumpDto>>), AppError> {
    let grace_days = state.settings.plan_downgrade_grace_days;

    let pump = with_conn(&state, move |conn| {
        auth::assert_station(conn, &caller, station_id)?;

        let owner = auth::station_owner(conn, station_id)?;
        let plan = quota::effective_plan(conn, &owner, grace_days)?;
        quota::ensure_pump_allowed(conn, station_id, &plan)?;

        let pump = Pump::insert(
            conn,
            NewPump {
                id: Uuid::new_v4(),
                station_id,
                name: request.name,
                pump_number: request.pump_number,
                serial_number: request.serial_number,
                status: EquipmentStatus::Active,
            },
        )?;

        AuditEntry::new("pump_create", "pump")
            .by(&caller)
            .station(station_id)
            .entity(pump.id)
            .new_values(json!({ "pumpNumber": pump.pump_number, "name": pump.name }))
            .category(AuditCategory::Data)
            .emit(conn)?;

        Ok(PumpDto::from(pump))
    })
    .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(pump))))
}

pub async fn list_pumps(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Path(station_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<PumpDto>>>, AppError> {
    let pumps = with_conn(&state, move |conn| {
        auth::assert_station(conn, &caller, station_id)?;
        Pump::list_for_station(conn, station_id).map_err(Into::into)
    })
    .await?;

    Ok(Json(ApiResponse::ok(
        pumps.into_iter().map(Into::into).collect(),
    )))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NozzleDto {
    pub id: Uuid,
    pub pump_id: Uuid,
    pub station_id: Uuid,
    pub nozzle_number: i32,
    pub fuel_type: String,
    pub status: fuelops_commons::status::PumpStatus,
    #[serde(
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub initial_reading: Option<Decimal>,
    #[serde(
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_reading: Option<Decimal>,
    #[serde(
        with = "fuelops_commons::serde_fmt::ymd::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_reading_date: Option<Date>,
}

impl From<Nozzle> for NozzleDto {
    fn from(n: Nozzle) -> Self {
        NozzleDto {
            id: n.id,
            pump_id: n.pump_id,
            station_id: n.station_id,
            nozzle_number: n.nozzle_number,
            fuel_type: n.fuel_type,
            status: n.status.into(),
            initial_reading: n.initial_reading,
            last_reading: n.last_reading,
            last_reading_date: n.last_reading_date,
        }
    }
}

pub async fn create_nozzle(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Path(pump_id): Path<Uuid>,
    Json(request): Json<CreateNozzleRequest>,
) -> Result<(StatusCode, Json<ApiResponse<NozzleDto>>), AppError> {
    let grace_days = state.settings.plan_downgrade_grace_days;

    let nozzle = with_conn(&state, move |conn| {
        let pump = Pump::by_id(conn, pump_id)?
            .ok_or_else(|| ServiceError::NotFound("pump".to_string()))?;
        auth::assert_station(conn, &caller, pump.station_id)?;

        let owner = auth::station_owner(conn, pump.station_id)?;
        let plan = quota::effective_plan(conn, &owner, grace_days)?;
        quota::ensure_nozzle_allowed(conn, pump.id, &plan)?;

        let nozzle = Nozzle::insert(
            conn,
            NewNozzle {
                id: Uuid::new_v4(),
                pump_id: pump.id,
                station_id: pump.station_id,
                nozzle_number: request.nozzle_number,
                fuel_type: request.fuel_type.to_string(),
                status: EquipmentStatus::Active,
                initial_reading: request.initial_reading,
            },
        )?;

        AuditEntry::new("nozzle_create", "nozzle")
            .by(&caller)
            .station(pump.station_id)
            .entity(nozzle.id)
            .new_values(json!({
                "nozzleNumber": nozzle.nozzle_number,
                "fuelType": nozzle.fuel_type,
            }))
            .category(AuditCategory::Data)
            .emit(conn)?;

        Ok(NozzleDto::from(nozzle))
    })
    .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(nozzle))))
}

pub async fn list_nozzles(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Path(pump_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<NozzleDto>>>, AppError> {
    let nozzles = with_conn(&state, move |conn| {
        let pump = Pump::by_id(conn, pump_id)?
            .ok_or_else(|| ServiceError::NotFound("pump".to_string()))?;
        auth::assert_station(conn, &caller, pump.station_id)?;

        Nozzle::list_for_pump(conn, pump_id).map_err(Into::into)
    })
    .await?;

    Ok(Json(ApiResponse::ok(
        nozzles.into_iter().map(Into::into).collect(),
    )))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FuelPriceDto {
    pub id: Uuid,
    pub station_id: Uuid,
    pub fuel_type: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub selling_price: Decimal,
    #[serde(
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub cost_price: Option<Decimal>,
    #[serde(with = "fuelops_commons::serde_fmt::ymd")]
    pub effective_from: Date,
}

impl From<FuelPrice> for FuelPriceDto {
    fn from(p: FuelPrice) -> Self {
        FuelPriceDto {
            id: p.id,
            station_id: p.station_id,
            fuel_type: p.fuel_type,
            selling_price: p.selling_price,
            cost_price: p.cost_price,
            effective_from: p.effective_from,
        }
    }
}

pub async fn create_fuel_price(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Path(station_id): Path<Uuid>,
    Json(request): Json<CreateFuelPriceRequest>,
) -> Result<(StatusCode, Json<ApiResponse<FuelPriceDto>>), AppError> {
    if request.selling_price <= Decimal::ZERO {
        return Err(AppError(ServiceError::Validation(
            "sellingPrice must be positive".to_string(),
        )));
    }

    let price = with_conn(&state, move |conn| {
        auth::assert_station(conn, &caller, station_id)?;

        if caller.role == Role::Employee {
            return Err(ServiceError::Forbidden(
                "price changes require a manager or owner".to_string(),
            ));
        }

        let price = FuelPrice::insert(
            conn,
            NewFuelPrice {
                id: Uuid::new_v4(),
                station_id,
                fuel_type: request.fuel_type.to_string(),
                selling_price: request.selling_price,
                cost_price: request.cost_price,
                effective_from: request.effective_from,
                created_by: Some(caller.id),
            },
        )
        .map_err(|e| match e {
            diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::UniqueViolation,
                _,
            ) => ServiceError::conflict(
                "DUPLICATE_PRICE",
                "a price for this fuel and effective date already exists",
            ),
            other => ServiceError::Database(other),
        })?;

        AuditEntry::new("fuel_price_create", "fuel_price")
            .by(&caller)
            .station(station_id)
            .entity(price.id)
            .new_values(json!({
                "fuelType": price.fuel_type,
                "sellingPrice": price.selling_price,
                "effectiveFrom": price.effective_from.to_string(),
            }))
            .category(AuditCategory::Finance)
            .emit(conn)?;

        Ok(FuelPriceDto::from(price))
    })
    .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(price))))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuery {
    pub fuel_type: Option<String>,
}

pub async fn list_fuel_prices(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Path(station_id): Path<Uuid>,
    Query(query): Query<PriceQuery>,
) -> Result<Json<ApiResponse<Vec<FuelPriceDto>>>, AppError> {
    let prices = with_conn(&state, move |conn| {
        auth::assert_station(conn, &caller, station_id)?;
        FuelPrice::history(conn, station_id, query.fuel_type.as_deref()).map_err(Into::into)
    })
    .await?;

    Ok(Json(ApiResponse::ok(
        prices.into_iter().map(Into::into).collect(),
    )))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanDto {
    pub id: Uuid,
    pub name: String,
    pub max_stations: i32,
    pub max_pumps_per_station: i32,
    pub max_nozzles_per_pump: i32,
    pub max_employees: i32,
    pub max_creditors: i32,
    pub monthly_exports: i32,
    pub monthly_reports: i32,
    pub monthly_manual_entries: i32,
    pub backdated_days: i32,
    pub can_export: bool,
    pub can_track_expenses: bool,
    pub can_track_credits: bool,
    pub can_view_profit_loss: bool,
}

impl From<Plan> for PlanDto {
    fn from(p: Plan) -> Self {
        PlanDto {
            id: p.id,
            name: p.name,
            max_stations: p.max_stations,
            max_pumps_per_station: p.max_pumps_per_station,
            max_nozzles_per_pump: p.max_nozzles_per_pump,
            max_employees: p.max_employees,
            max_creditors: p.max_creditors,
            monthly_exports: p.monthly_exports,
            monthly_reports: p.monthly_reports,
            monthly_manual_entries: p.monthly_manual_entries,
            backdated_days: p.backdated_days,
            can_export: p.can_export,
            can_track_expenses: p.can_track_expenses,
            can_track_credits: p.can_track_credits,
            can_view_profit_loss: p.can_view_profit_loss,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlanBody {
    pub name: String,
    pub max_stations: i32,
    pub max_pumps_per_station: i32,
    pub max_nozzles_per_pump: i32,
    pub max_employees: i32,
    pub max_creditors: i32,
    pub monthly_exports: i32,
    pub monthly_reports: i32,
    pub monthly_manual_entries: i32,
    pub retention_days: i32,
    pub backdated_days: i32,
    #[serde(default)]
    pub can_export: bool,
    #[serde(default)]
    pub can_track_expenses: bool,
    #[serde(default)]
    pub can_track_credits: bool,
    #[serde(default)]
    pub can_view_profit_loss: bool,
}

pub async fn create_plan(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Json(request): Json<CreatePlanBody>,
) -> Result<(StatusCode, Json<ApiResponse<PlanDto>>), AppError> {
    if caller.role != Role::SuperAdmin {
        return Err(AppError(ServiceError::Forbidden(
            "plan management is super-admin only".to_string(),
        )));
    }

    let plan = with_conn(&state, move |conn| {
        if Plan::by_name(conn, &request.name)?.is_some() {
            return Err(ServiceError::conflict(
                "DUPLICATE_PLAN",
                "a plan with this name already exists",
            ));
        }

        let plan = Plan::insert(
            conn,
            NewPlan {
                id: Uuid::new_v4(),
                name: request.name,
                max_stations: request.max_stations,
                max_pumps_per_station: request.max_pumps_per_station,
                max_nozzles_per_pump: request.max_nozzles_per_pump,
                max_employees: request.max_employees,
                max_creditors: request.max_creditors,
                monthly_exports: request.monthly_exports,
                monthly_reports: request.monthly_reports,
                monthly_manual_entries: request.monthly_manual_entries,
                sales_retention_days: request.retention_days,
                profit_retention_days: request.retention_days,
                analytics_retention_days: request.retention_days,
                audit_retention_days: request.retention_days,
                transactions_retention_days: request.retention_days,
                backdated_days: request.backdated_days,
                can_export: request.can_export,
                can_track_expenses: request.can_track_expenses,
                can_track_credits: request.can_track_credits,
                can_view_profit_loss: request.can_view_profit_loss,
            },
        )?;

        AuditEntry::new("plan_create", "plan")
            .by(&caller)
            .entity(plan.id)
            .new_values(json!({ "name": plan.name }))
            .category(AuditCategory::System)
            .emit(conn)?;

        Ok(PlanDto::from(plan))
    })
    .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(plan))))
}

pub async fn list_plans(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
) -> Result<Json<ApiResponse<Vec<PlanDto>>>, AppError> {
    if caller.role == Role::Employee {
        return Err(AppError(ServiceError::Forbidden(
            "plans are not visible to employees".to_string(),
        )));
    }

    let plans = with_conn(&state, move |conn| {
        Plan::all(conn).map_err(ServiceError::from)
    })
    .await?;

    Ok(Json(ApiResponse::ok(
        plans.into_iter().map(Into::into).collect(),
    )))
}
