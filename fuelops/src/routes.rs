pub mod admin;
pub mod auth_routes;
pub mod creditors;
pub mod dashboard_routes;
pub mod expenses;
pub mod handovers;
pub mod readings;
pub mod reports_routes;
pub mod settlements;
pub mod shifts;
pub mod tanks;
pub mod transactions;

use crate::blob::BlobStore;
use crate::error::ServiceError;
use crate::metrics;
use crate::ocr::OcrClient;
use crate::settings::Settings;
use crate::AppError;
use crate::PgPool;
use axum::extract::State;
use axum::routing::get;
use axum::routing::patch;
use axum::routing::post;
use axum::Json;
use axum::Router;
use diesel::PgConnection;
use fuelops_commons::ApiResponse;
use serde::Deserialize;
use serde::Serialize;
use std::sync::Arc;
use time::Date;
use tokio::task::spawn_blocking;
use uuid::Uuid;

pub struct AppState {
    pub pool: PgPool,
    pub settings: Settings,
    pub jwt_secret: String,
    pub jwt_expires_in_secs: i64,
    pub ocr: OcrClient,
    pub blob: BlobStore,
}

/// Shared query parameters for list and aggregate endpoints.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeQuery {
    pub station_id: Option<Uuid>,
    #[serde(default, with = "fuelops_commons::serde_fmt::ymd::option")]
    pub from: Option<Date>,
    #[serde(default, with = "fuelops_commons::serde_fmt::ymd::option")]
    pub to: Option<Date>,
    #[serde(default, with = "fuelops_commons::serde_fmt::ymd::option")]
    pub date: Option<Date>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl RangeQuery {
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(50).clamp(1, 500)
    }
}

/// Runs a closure against a pooled connection on the blocking thread pool.
pub(crate) async fn with_conn<F, T>(state: &Arc<AppState>, f: F) -> Result<T, AppError>
where
    F: FnOnce(&mut PgConnection) -> Result<T, ServiceError> + Send + 'static,
    T: Send + 'static,
{
    let pool = state.pool.clone();

    spawn_blocking(move || {
        let mut conn = pool.get()?;
        f(&mut conn)
    })
    .await
    .map_err(|e| AppError(ServiceError::Internal(anyhow::anyhow!("task panicked: {e}"))))?
    .map_err(AppError)
}

pub fn router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/auth/login", post(auth_routes::login))
        .route("/auth/change-password", post(auth_routes::change_password))
        .route(
            "/readings",
            post(readings::create_reading).get(readings::list_readings),
        )
        .route("/readings/manual", post(readings::create_reading))
        .route("/readings/upload", post(readings::upload_receipt))
        .route("/readings/last", get(readings::last_reading))
        .route("/readings/:id/approve", post(readings::approve))
        .route("/readings/:id/reject", post(readings::reject))
        .route(
            "/transactions",
            post(transactions::create).get(transactions::list),
        )
        .route("/transactions/summary", get(transactions::summary))
        .route(
            "/transactions/:id",
            patch(transactions::update).delete(transactions::cancel),
        )
        .route(
            "/stations/:station_id/settlements",
            get(settlements::list).post(settlements::create),
        )
        .route("/settlements/:id", get(settlements::get_one))
        .route("/settlements/:id/finalize", post(settlements::finalize))
        .route("/settlements/:id/lock", post(settlements::lock))
        .route(
            "/stations/:station_id/creditors",
            get(creditors::list).post(creditors::create),
        )
        .route("/stations/:station_id/creditors/aging", get(creditors::aging_report))
        .route("/creditors/:id/flag", post(creditors::flag))
        .route("/creditors/:id/transactions", get(creditors::transactions))
        .route("/credit-transactions", post(creditors::create_credit))
        .route("/credit-settlements", post(creditors::create_settlement))
        .route(
            "/credit-transactions/:id",
            axum::routing::delete(creditors::delete_transaction),
        )
        .route(
            "/credit-transactions/:id/links",
            get(creditors::settlement_links),
        )
        .route("/handovers", post(handovers::create).get(handovers::list))
        .route("/handovers/pending", get(handovers::pending))
        .route("/handovers/summary", get(handovers::summary))
        .route("/handovers/bank-deposits", get(handovers::bank_deposits))
        .route("/handovers/:id/confirm", post(handovers::confirm))
        .route("/handovers/:id/resolve", post(handovers::resolve))
        .route(
            "/stations/:station_id/tanks",
            get(tanks::list).post(tanks::create),
        )
        .route(
            "/tanks/:id/refills",
            post(tanks::create_refill).get(tanks::list_refills),
        )
        .route("/refills/:id", axum::routing::delete(tanks::delete_refill))
        .route("/tanks/:id/dip", post(tanks::dip_calibration))
        .route("/shifts/start", post(shifts::start))
        .route("/shifts/current", get(shifts::current))
        .route("/shifts", get(shifts::list))
        .route("/shifts/:id/end", post(shifts::end))
        .route("/shifts/:id/cancel", post(shifts::cancel))
        .route("/dashboard/summary", get(dashboard_routes::summary))
        .route("/dashboard/daily", get(dashboard_routes::daily))
        .route("/dashboard/trends", get(dashboard_routes::trends))
        .route(
            "/dashboard/fuel-breakdown",
            get(dashboard_routes::fuel_breakdown),
        )
        .route(
            "/dashboard/pump-performance",
            get(dashboard_routes::pump_performance),
        )
        .route(
            "/dashboard/shift-breakdown",
            get(dashboard_routes::shift_breakdown),
        )
        .route(
            "/dashboard/nozzle-breakdown",
            get(dashboard_routes::nozzle_breakdown),
        )
        .route(
            "/dashboard/admin-overview",
            get(dashboard_routes::admin_overview),
        )
        .route("/reports/sales", get(reports_routes::sales))
        .route("/reports/daily-sales", get(reports_routes::daily_sales))
        .route("/reports/shifts", get(reports_routes::shifts))
        .route("/reports/pumps", get(reports_routes::pumps))
        .route("/reports/profit", get(reports_routes::profit))
        .route("/reports/audit", get(reports_routes::audit))
        .route(
            "/stations/:station_id/expenses",
            get(expenses::list).post(expenses::create),
        )
        .route("/expenses/:id", axum::routing::delete(expenses::delete))
        .route("/users", post(admin::create_user).get(admin::list_users))
        .route("/users/:id/active", post(admin::set_user_active))
        .route("/users/:id/plan", post(admin::change_plan))
        .route("/stations", post(admin::create_station).get(admin::list_stations))
        .route(
            "/stations/:station_id/pumps",
            post(admin::create_pump).get(admin::list_pumps),
        )
        .route(
            "/pumps/:pump_id/nozzles",
            post(admin::create_nozzle).get(admin::list_nozzles),
        )
        .route(
            "/stations/:station_id/fuel-prices",
            post(admin::create_fuel_price).get(admin::list_fuel_prices),
        )
        .route("/stations/:station_id/uploads", get(readings::list_uploads))
        .route("/plans", post(admin::create_plan).get(admin::list_plans));

    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(get_metrics))
        .nest("/api/v1", api)
        .with_state(state)
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
    database: bool,
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<ApiResponse<Health>> {
    let database = {
        let pool = state.pool.clone();
        spawn_blocking(move || pool.get().is_ok())
            .await
            .unwrap_or(false)
    };

    Json(ApiResponse::ok(Health {
        status: if database { "ok" } else { "degraded" },
        database,
    }))
}

pub async fn get_metrics() -> String {
    metrics::encode()
}
