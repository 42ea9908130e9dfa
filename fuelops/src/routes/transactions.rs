use crate::auth;
use crate::auth::AuthUser;
use crate::db::daily_transactions::CreditAllocationRow;
use crate::db::daily_transactions::DailyTransaction;
use crate::error::ServiceError;
use crate::routes::with_conn;
use crate::routes::AppState;
use crate::routes::RangeQuery;
use crate::sales;
use crate::AppError;
use axum::extract::Path;
use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use fuelops_commons::requests::CreateTransactionRequest;
use fuelops_commons::requests::UpdateTransactionRequest;
use fuelops_commons::status::TransactionStatus;
use fuelops_commons::ApiResponse;
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use time::Date;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDto {
    pub id: Uuid,
    pub station_id: Uuid,
    #[serde(with = "fuelops_commons::serde_fmt::ymd")]
    pub transaction_date: Date,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_litres: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_sale_value: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub cash: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub online: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub credit: Decimal,
    pub status: TransactionStatus,
    pub settlement_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub credit_allocations: Vec<AllocationDto>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationDto {
    pub creditor_id: Uuid,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

impl TransactionDto {
    fn from_row(t: DailyTransaction, allocations: Vec<CreditAllocationRow>) -> Self {
        TransactionDto {
            id: t.id,
            station_id: t.station_id,
            transaction_date: t.transaction_date,
            total_litres: t.total_litres,
            total_sale_value: t.total_sale_value,
            cash: t.payment_cash,
            online: t.payment_online,
            credit: t.payment_credit,
            status: t.status.into(),
            settlement_id: t.settlement_id,
            credit_allocations: allocations
                .into_iter()
                .map(|a| AllocationDto {
                    creditor_id: a.creditor_id,
                    amount: a.amount,
                })
                .collect(),
        }
    }
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Json(request): Json<CreateTransactionRequest>,
) -> Result<(StatusCode, Json<ApiResponse<TransactionDto>>), AppError> {
    let transaction = with_conn(&state, move |conn| {
        let station_id = auth::resolve_station(conn, &caller, request.station_id)?;

        let transaction = sales::create_transaction(
            conn,
            &caller,
            sales::CreateTransaction {
                station_id,
                date: request.date,
                reading_ids: request.reading_ids,
                breakdown: request.payment_breakdown,
                credit_allocations: request.credit_allocations,
                notes: request.notes,
            },
        )?;

        let allocations = CreditAllocationRow::for_transaction(conn, transaction.id)?;
        Ok(TransactionDto::from_row(transaction, allocations))
    })
    .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(transaction))))
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Query(query): Query<RangeQuery>,
) -> Result<Json<ApiResponse<Vec<TransactionDto>>>, AppError> {
    let transactions = with_conn(&state, move |conn| {
        let station_id = auth::resolve_station(conn, &caller, query.station_id)?;

        let rows = DailyTransaction::for_station(
            conn,
            station_id,
            query.from.or(query.date),
            query.to.or(query.date),
        )?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let allocations = CreditAllocationRow::for_transaction(conn, row.id)?;
            out.push(TransactionDto::from_row(row, allocations));
        }

        Ok(out)
    })
    .await?;

    Ok(Json(ApiResponse::ok(transactions)))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateTransactionRequest>,
) -> Result<Json<ApiResponse<TransactionDto>>, AppError> {
    let transaction = with_conn(&state, move |conn| {
        let existing = DailyTransaction::by_id(conn, id)?
            .ok_or_else(|| ServiceError::NotFound("transaction".to_string()))?;
        auth::assert_station(conn, &caller, existing.station_id)?;

        let updated = sales::update_transaction(
            conn,
            &caller,
            id,
            request.payment_breakdown,
            request.credit_allocations,
            request.notes,
            OffsetDateTime::now_utc().date(),
        )?;

        let allocations = CreditAllocationRow::for_transaction(conn, updated.id)?;
        Ok(TransactionDto::from_row(updated, allocations))
    })
    .await?;

    Ok(Json(ApiResponse::ok(transaction)))
}

pub async fn cancel(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    with_conn(&state, move |conn| {
        let existing = DailyTransaction::by_id(conn, id)?
            .ok_or_else(|| ServiceError::NotFound("transaction".to_string()))?;
        auth::assert_station(conn, &caller, existing.station_id)?;

        sales::cancel_transaction(conn, &caller, id, OffsetDateTime::now_utc().date())
    })
    .await?;

    Ok(Json(ApiResponse::ok(())))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryDto {
    pub transaction_count: usize,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_litres: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_sale_value: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub cash: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub online: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub credit: Decimal,
}

pub async fn summary(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Query(query): Query<RangeQuery>,
) -> Result<Json<ApiResponse<SummaryDto>>, AppError> {
    let summary = with_conn(&state, move |conn| {
        let station_id = auth::resolve_station(conn, &caller, query.station_id)?;
        sales::summarize(conn, station_id, query.from, query.to)
    })
    .await?;

    Ok(Json(ApiResponse::ok(SummaryDto {
        transaction_count: summary.transaction_count,
        total_litres: summary.total_litres,
        total_sale_value: summary.total_sale_value,
        cash: summary.cash,
        online: summary.online,
        credit: summary.credit,
    })))
}
