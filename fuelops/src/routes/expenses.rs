use crate::audit::AuditEntry;
use crate::auth;
use crate::auth::AuthUser;
use crate::db::audit_logs::AuditCategory;
use crate::db::expenses::Expense;
use crate::db::expenses::NewExpense;
use crate::error::ServiceError;
use crate::quota;
use crate::quota::Feature;
use crate::routes::with_conn;
use crate::routes::AppState;
use crate::routes::RangeQuery;
use crate::AppError;
use axum::extract::Path;
use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use fuelops_commons::requests::CreateExpenseRequest;
use fuelops_commons::ApiResponse;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use time::Date;
use uuid::Uuid;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseDto {
    pub id: Uuid,
    pub station_id: Uuid,
    pub category: String,
    pub description: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(with = "fuelops_commons::serde_fmt::ymd")]
    pub expense_date: Date,
    pub expense_month: String,
    pub receipt_number: Option<String>,
    pub payment_method: Option<String>,
}

impl From<Expense> for ExpenseDto {
    fn from(e: Expense) -> Self {
        ExpenseDto {
            id: e.id,
            station_id: e.station_id,
            category: e.category,
            description: e.description,
            amount: e.amount,
            expense_date: e.expense_date,
            expense_month: e.expense_month,
            receipt_number: e.receipt_number,
            payment_method: e.payment_method,
        }
    }
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Path(station_id): Path<Uuid>,
    Json(request): Json<CreateExpenseRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ExpenseDto>>), AppError> {
    if request.amount <= Decimal::ZERO {
        return Err(AppError(ServiceError::Validation(
            "expense amount must be positive".to_string(),
        )));
    }

    let grace_days = state.settings.plan_downgrade_grace_days;

    let expense = with_conn(&state, move |conn| {
        auth::assert_station(conn, &caller, station_id)?;

        let owner = auth::station_owner(conn, station_id)?;
        let plan = quota::effective_plan(conn, &owner, grace_days)?;
        quota::require_feature(&plan, Feature::ExpenseTracking)?;

        let expense = Expense::insert(
            conn,
            NewExpense {
                id: Uuid::new_v4(),
                station_id,
                category: request.category,
                description: request.description,
                amount: request.amount,
                expense_date: request.expense_date,
                expense_month: quota::month_key(request.expense_date),
                receipt_number: request.receipt_number,
                payment_method: request.payment_method,
                entered_by: caller.id,
            },
        )?;

        AuditEntry::new("expense_create", "expense")
            .by(&caller)
            .station(station_id)
            .entity(expense.id)
            .new_values(json!({
                "category": expense.category,
                "amount": expense.amount,
                "expenseMonth": expense.expense_month,
            }))
            .category(AuditCategory::Finance)
            .emit(conn)?;

        Ok(ExpenseDto::from(expense))
    })
    .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(expense))))
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Path(station_id): Path<Uuid>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<ApiResponse<Vec<ExpenseDto>>>, AppError> {
    let expenses = with_conn(&state, move |conn| {
        auth::assert_station(conn, &caller, station_id)?;
        Expense::for_station(conn, station_id, query.from, query.to).map_err(Into::into)
    })
    .await?;

    Ok(Json(ApiResponse::ok(
        expenses.into_iter().map(Into::into).collect(),
    )))
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    with_conn(&state, move |conn| {
        let expense = Expense::by_id(conn, id)?
            .ok_or_else(|| ServiceError::NotFound("expense".to_string()))?;
        auth::assert_station(conn, &caller, expense.station_id)?;

        Expense::delete(conn, id)?;

        AuditEntry::new("expense_delete", "expense")
            .by(&caller)
            .station(expense.station_id)
            .entity(expense.id)
            .old(json!({ "category": expense.category, "amount": expense.amount }))
            .category(AuditCategory::Finance)
            .emit(conn)?;

        Ok(())
    })
    .await?;

    Ok(Json(ApiResponse::ok(())))
}
