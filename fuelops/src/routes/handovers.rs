use crate::auth;
use crate::auth::AuthUser;
use crate::db::handovers::CashHandover;
use crate::db::handovers::HandoverType;
use crate::handover;
use crate::routes::with_conn;
use crate::routes::AppState;
use crate::routes::RangeQuery;
use crate::AppError;
use axum::extract::Path;
use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use fuelops_commons::requests::ConfirmHandoverRequest;
use fuelops_commons::requests::CreateHandoverRequest;
use fuelops_commons::requests::ResolveDisputeRequest;
use fuelops_commons::status::HandoverStatus;
use fuelops_commons::ApiResponse;
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use time::Date;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HandoverDto {
    pub id: Uuid,
    pub station_id: Uuid,
    pub handover_type: fuelops_commons::status::HandoverType,
    #[serde(with = "fuelops_commons::serde_fmt::ymd")]
    pub handover_date: Date,
    pub from_user_id: Option<Uuid>,
    pub to_user_id: Option<Uuid>,
    #[serde(with = "rust_decimal::serde::float")]
    pub expected_amount: Decimal,
    #[serde(
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub actual_amount: Option<Decimal>,
    #[serde(
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub difference: Option<Decimal>,
    pub previous_handover_id: Option<Uuid>,
    pub status: HandoverStatus,
    pub shift_id: Option<Uuid>,
    pub bank_name: Option<String>,
    pub deposit_reference: Option<String>,
    pub dispute_notes: Option<String>,
    pub resolution_notes: Option<String>,
}

impl From<CashHandover> for HandoverDto {
    fn from(h: CashHandover) -> Self {
        HandoverDto {
            id: h.id,
            station_id: h.station_id,
            handover_type: h.handover_type.into(),
            handover_date: h.handover_date,
            from_user_id: h.from_user_id,
            to_user_id: h.to_user_id,
            expected_amount: h.expected_amount,
            actual_amount: h.actual_amount,
            difference: h.difference,
            previous_handover_id: h.previous_handover_id,
            status: h.status.into(),
            shift_id: h.shift_id,
            bank_name: h.bank_name,
            deposit_reference: h.deposit_reference,
            dispute_notes: h.dispute_notes,
            resolution_notes: h.resolution_notes,
        }
    }
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Json(request): Json<CreateHandoverRequest>,
) -> Result<(StatusCode, Json<ApiResponse<HandoverDto>>), AppError> {
    let handover = with_conn(&state, move |conn| {
        handover::create_handover(conn, &caller, request, OffsetDateTime::now_utc().date())
    })
    .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(handover.into()))))
}

pub async fn confirm(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<ConfirmHandoverRequest>,
) -> Result<Json<ApiResponse<HandoverDto>>, AppError> {
    let rule = state.settings.variance_rule();

    let handover = with_conn(&state, move |conn| {
        handover::confirm(
            conn,
            &rule,
            &caller,
            id,
            request.actual_amount,
            request.notes,
        )
    })
    .await?;

    Ok(Json(ApiResponse::ok(handover.into())))
}

pub async fn resolve(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<ResolveDisputeRequest>,
) -> Result<Json<ApiResponse<HandoverDto>>, AppError> {
    let handover = with_conn(&state, move |conn| {
        handover::resolve_dispute(conn, &caller, id, request.resolution_notes)
    })
    .await?;

    Ok(Json(ApiResponse::ok(handover.into())))
}

pub async fn pending(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
) -> Result<Json<ApiResponse<Vec<HandoverDto>>>, AppError> {
    let handovers = with_conn(&state, move |conn| {
        CashHandover::pending_for_user(conn, caller.id).map_err(Into::into)
    })
    .await?;

    Ok(Json(ApiResponse::ok(
        handovers.into_iter().map(Into::into).collect(),
    )))
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Query(query): Query<RangeQuery>,
) -> Result<Json<ApiResponse<Vec<HandoverDto>>>, AppError> {
    let handovers = with_conn(&state, move |conn| {
        let station_id = auth::resolve_station(conn, &caller, query.station_id)?;
        CashHandover::for_station(conn, station_id, query.from, query.to, None).map_err(Into::into)
    })
    .await?;

    Ok(Json(ApiResponse::ok(
        handovers.into_iter().map(Into::into).collect(),
    )))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeFlowDto {
    pub count: usize,
    #[serde(with = "rust_decimal::serde::float")]
    pub expected: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub actual: Decimal,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CashFlowDto {
    pub shift_collection: TypeFlowDto,
    pub employee_to_manager: TypeFlowDto,
    pub manager_to_owner: TypeFlowDto,
    pub deposit_to_bank: TypeFlowDto,
    pub pending_count: usize,
    pub disputed_count: usize,
}

fn flow_dto(flow: handover::TypeFlow) -> TypeFlowDto {
    TypeFlowDto {
        count: flow.count,
        expected: flow.expected,
        actual: flow.actual,
    }
}

pub async fn summary(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Query(query): Query<RangeQuery>,
) -> Result<Json<ApiResponse<CashFlowDto>>, AppError> {
    let summary = with_conn(&state, move |conn| {
        let station_id = auth::resolve_station(conn, &caller, query.station_id)?;
        handover::cash_flow_summary(conn, station_id, query.from, query.to)
    })
    .await?;

    Ok(Json(ApiResponse::ok(CashFlowDto {
        shift_collection: flow_dto(summary.shift_collection),
        employee_to_manager: flow_dto(summary.employee_to_manager),
        manager_to_owner: flow_dto(summary.manager_to_owner),
        deposit_to_bank: flow_dto(summary.deposit_to_bank),
        pending_count: summary.pending_count,
        disputed_count: summary.disputed_count,
    })))
}

pub async fn bank_deposits(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Query(query): Query<RangeQuery>,
) -> Result<Json<ApiResponse<Vec<HandoverDto>>>, AppError> {
    let deposits = with_conn(&state, move |conn| {
        let station_id = auth::resolve_station(conn, &caller, query.station_id)?;
        CashHandover::for_station(
            conn,
            station_id,
            query.from,
            query.to,
            Some(HandoverType::DepositToBank),
        )
        .map_err(Into::into)
    })
    .await?;

    Ok(Json(ApiResponse::ok(
        deposits.into_iter().map(Into::into).collect(),
    )))
}
