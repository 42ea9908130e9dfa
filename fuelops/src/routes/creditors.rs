use crate::audit::AuditEntry;
use crate::auth;
use crate::auth::AuthUser;
use crate::credit;
use crate::db::audit_logs::AuditCategory;
use crate::db::credit_transactions::CreditTransaction;
use crate::db::credit_transactions::SettlementLink;
use crate::db::creditors::Creditor;
use crate::db::creditors::NewCreditor;
use crate::error::ServiceError;
use crate::quota;
use crate::quota::Feature;
use crate::routes::with_conn;
use crate::routes::AppState;
use crate::AppError;
use axum::extract::Path;
use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use fuelops_commons::requests::CreateCreditRequest;
use fuelops_commons::requests::CreateCreditSettlementRequest;
use fuelops_commons::requests::CreateCreditorRequest;
use fuelops_commons::status::CreditTransactionType;
use fuelops_commons::ApiResponse;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use time::Date;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditorDto {
    pub id: Uuid,
    pub station_id: Uuid,
    pub name: String,
    pub business_name: Option<String>,
    pub contact: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub credit_limit: Decimal,
    pub credit_period_days: i32,
    #[serde(with = "rust_decimal::serde::float")]
    pub current_balance: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub aging_0_30: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub aging_31_60: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub aging_61_90: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub aging_over_90: Decimal,
    #[serde(
        with = "fuelops_commons::serde_fmt::ymd::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_transaction_date: Option<Date>,
    #[serde(
        with = "fuelops_commons::serde_fmt::ymd::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_payment_date: Option<Date>,
    pub is_flagged: bool,
    pub flag_reason: Option<String>,
    pub is_active: bool,
    pub is_overdue: bool,
}

impl CreditorDto {
    fn from_row(c: Creditor, today: Date) -> Self {
        let is_overdue = credit::is_overdue(&c, today);
        CreditorDto {
            id: c.id,
            station_id: c.station_id,
            name: c.name,
            business_name: c.business_name,
            contact: c.contact,
            credit_limit: c.credit_limit,
            credit_period_days: c.credit_period_days,
            current_balance: c.current_balance,
            aging_0_30: c.aging_0_30,
            aging_31_60: c.aging_31_60,
            aging_61_90: c.aging_61_90,
            aging_over_90: c.aging_over_90,
            last_transaction_date: c.last_transaction_date,
            last_payment_date: c.last_payment_date,
            is_flagged: c.is_flagged,
            flag_reason: c.flag_reason,
            is_active: c.is_active,
            is_overdue,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditTransactionDto {
    pub id: Uuid,
    pub creditor_id: Uuid,
    pub transaction_type: CreditTransactionType,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub fuel_type: Option<String>,
    #[serde(
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub litres: Option<Decimal>,
    pub invoice_number: Option<String>,
    pub vehicle_number: Option<String>,
    #[serde(with = "fuelops_commons::serde_fmt::ymd")]
    pub transaction_date: Date,
}

impl From<CreditTransaction> for CreditTransactionDto {
    fn from(t: CreditTransaction) -> Self {
        CreditTransactionDto {
            id: t.id,
            creditor_id: t.creditor_id,
            transaction_type: t.transaction_type.into(),
            amount: t.amount,
            fuel_type: t.fuel_type,
            litres: t.litres,
            invoice_number: t.invoice_number,
            vehicle_number: t.vehicle_number,
            transaction_date: t.transaction_date,
        }
    }
}

/// Creditor endpoints are feature-gated on the owner's plan.
fn require_credit_tracking(
    conn: &mut diesel::PgConnection,
    station_id: Uuid,
    grace_days: i64,
) -> Result<(), ServiceError> {
    let owner = auth::station_owner(conn, station_id)?;
    let plan = quota::effective_plan(conn, &owner, grace_days)?;
    quota::require_feature(&plan, Feature::CreditTracking)
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Path(station_id): Path<Uuid>,
    Json(request): Json<CreateCreditorRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CreditorDto>>), AppError> {
    let grace_days = state.settings.plan_downgrade_grace_days;

    let creditor = with_conn(&state, move |conn| {
        auth::assert_station(conn, &caller, station_id)?;
        require_credit_tracking(conn, station_id, grace_days)?;

        let owner = auth::station_owner(conn, station_id)?;
        let plan = quota::effective_plan(conn, &owner, grace_days)?;
        quota::ensure_creditor_allowed(conn, owner.id, &plan)?;

        let creditor = Creditor::insert(
            conn,
            NewCreditor {
                id: Uuid::new_v4(),
                station_id,
                name: request.name,
                business_name: request.business_name,
                contact: request.contact,
                credit_limit: request.credit_limit.unwrap_or(Decimal::ZERO),
                credit_period_days: request.credit_period_days.unwrap_or(30),
            },
        )?;

        AuditEntry::new("creditor_create", "creditor")
            .by(&caller)
            .station(station_id)
            .entity(creditor.id)
            .new_values(json!({ "name": creditor.name, "creditLimit": creditor.credit_limit }))
            .category(AuditCategory::Finance)
            .emit(conn)?;

        Ok(CreditorDto::from_row(
            creditor,
            OffsetDateTime::now_utc().date(),
        ))
    })
    .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(creditor))))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub include_inactive: Option<bool>,
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Path(station_id): Path<Uuid>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<Vec<CreditorDto>>>, AppError> {
    let creditors = with_conn(&state, move |conn| {
        auth::assert_station(conn, &caller, station_id)?;

        let today = OffsetDateTime::now_utc().date();
        let rows = Creditor::list_for_station(
            conn,
            station_id,
            !query.include_inactive.unwrap_or(false),
        )?;

        Ok(rows
            .into_iter()
            .map(|c| CreditorDto::from_row(c, today))
            .collect::<Vec<_>>())
    })
    .await?;

    Ok(Json(ApiResponse::ok(creditors)))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgingReportRow {
    pub creditor: CreditorDto,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_outstanding: Decimal,
}

/// Recomputes aging for every creditor of the station and returns the
/// refreshed buckets.
pub async fn aging_report(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Path(station_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<AgingReportRow>>>, AppError> {
    let rows = with_conn(&state, move |conn| {
        auth::assert_station(conn, &caller, station_id)?;

        let today = OffsetDateTime::now_utc().date();
        let creditors = Creditor::list_for_station(conn, station_id, true)?;

        let mut out = Vec::with_capacity(creditors.len());
        for creditor in creditors {
            let buckets = credit::recompute_aging(conn, creditor.id, today)?;
            let creditor = Creditor::by_id(conn, creditor.id)?
                .ok_or_else(|| ServiceError::NotFound("creditor".to_string()))?;

            out.push(AgingReportRow {
                total_outstanding: buckets.total(),
                creditor: CreditorDto::from_row(creditor, today),
            });
        }

        Ok(out)
    })
    .await?;

    Ok(Json(ApiResponse::ok(rows)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlagRequest {
    pub flagged: bool,
    pub reason: Option<String>,
}

pub async fn flag(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<FlagRequest>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    with_conn(&state, move |conn| {
        let creditor = Creditor::by_id(conn, id)?
            .ok_or_else(|| ServiceError::NotFound("creditor".to_string()))?;
        auth::assert_station(conn, &caller, creditor.station_id)?;

        Creditor::set_flag(conn, id, request.flagged, request.reason.clone())
            .map_err(|e| ServiceError::Internal(anyhow::anyhow!(e)))?;

        AuditEntry::new("creditor_flag", "creditor")
            .by(&caller)
            .station(creditor.station_id)
            .entity(creditor.id)
            .new_values(json!({ "flagged": request.flagged, "reason": request.reason }))
            .category(AuditCategory::Finance)
            .emit(conn)?;

        Ok(())
    })
    .await?;

    Ok(Json(ApiResponse::ok(())))
}

pub async fn transactions(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<CreditTransactionDto>>>, AppError> {
    let rows = with_conn(&state, move |conn| {
        let creditor = Creditor::by_id(conn, id)?
            .ok_or_else(|| ServiceError::NotFound("creditor".to_string()))?;
        auth::assert_station(conn, &caller, creditor.station_id)?;

        let rows = CreditTransaction::for_creditor(conn, id)?;
        Ok(rows.into_iter().map(Into::into).collect::<Vec<_>>())
    })
    .await?;

    Ok(Json(ApiResponse::ok(rows)))
}

pub async fn create_credit(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Json(request): Json<CreateCreditRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CreditTransactionDto>>), AppError> {
    let grace_days = state.settings.plan_downgrade_grace_days;

    let entry = with_conn(&state, move |conn| {
        let creditor = Creditor::by_id(conn, request.creditor_id)?
            .ok_or_else(|| ServiceError::NotFound("creditor".to_string()))?;
        auth::assert_station(conn, &caller, creditor.station_id)?;
        require_credit_tracking(conn, creditor.station_id, grace_days)?;

        let entry = credit::record_credit(
            conn,
            &caller,
            creditor.station_id,
            credit::CreditInput {
                creditor_id: request.creditor_id,
                amount: request.amount,
                fuel_type: request.fuel_type.map(|f| f.to_string()),
                litres: request.litres,
                price_per_litre: request.price_per_litre,
                reading_id: request.reading_id,
                invoice_number: request.invoice_number,
                vehicle_number: request.vehicle_number,
                transaction_date: request.transaction_date,
            },
        )?;

        Ok(CreditTransactionDto::from(entry))
    })
    .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(entry))))
}

pub async fn create_settlement(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Json(request): Json<CreateCreditSettlementRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CreditTransactionDto>>), AppError> {
    let grace_days = state.settings.plan_downgrade_grace_days;

    let entry = with_conn(&state, move |conn| {
        let creditor = Creditor::by_id(conn, request.creditor_id)?
            .ok_or_else(|| ServiceError::NotFound("creditor".to_string()))?;
        auth::assert_station(conn, &caller, creditor.station_id)?;
        require_credit_tracking(conn, creditor.station_id, grace_days)?;

        let entry = credit::record_settlement(
            conn,
            &caller,
            creditor.station_id,
            credit::SettlementInput {
                creditor_id: request.creditor_id,
                amount: request.amount,
                transaction_date: request.transaction_date,
                invoice_number: request.invoice_number,
                links: request.links,
            },
            OffsetDateTime::now_utc().date(),
        )?;

        Ok(CreditTransactionDto::from(entry))
    })
    .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(entry))))
}

pub async fn delete_transaction(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    with_conn(&state, move |conn| {
        let entry = CreditTransaction::by_id(conn, id)?
            .ok_or_else(|| ServiceError::NotFound("credit transaction".to_string()))?;
        auth::assert_station(conn, &caller, entry.station_id)?;

        credit::delete_transaction(conn, &caller, id, OffsetDateTime::now_utc().date())
    })
    .await?;

    Ok(Json(ApiResponse::ok(())))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementLinkDto {
    pub id: Uuid,
    pub settlement_transaction_id: Uuid,
    pub credit_transaction_id: Uuid,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

pub async fn settlement_links(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<SettlementLinkDto>>>, AppError> {
    let links = with_conn(&state, move |conn| {
        let entry = CreditTransaction::by_id(conn, id)?
            .ok_or_else(|| ServiceError::NotFound("credit transaction".to_string()))?;
        auth::assert_station(conn, &caller, entry.station_id)?;

        let links = match entry.transaction_type {
            crate::db::credit_transactions::CreditEntryType::Settlement => {
                SettlementLink::for_settlement_transaction(conn, entry.id)?
            }
            crate::db::credit_transactions::CreditEntryType::Credit => {
                SettlementLink::for_credit_transaction(conn, entry.id)?
            }
        };

        Ok(links
            .into_iter()
            .map(|l| SettlementLinkDto {
                id: l.id,
                settlement_transaction_id: l.settlement_transaction_id,
                credit_transaction_id: l.credit_transaction_id,
                amount: l.amount,
            })
            .collect::<Vec<_>>())
    })
    .await?;

    Ok(Json(ApiResponse::ok(links)))
}
