pub mod audit;
pub mod auth;
pub mod blob;
pub mod cli;
pub mod credit;
pub mod dashboard;
pub mod db;
pub mod error;
pub mod handover;
pub mod logger;
pub mod metrics;
pub mod ocr;
pub mod quota;
pub mod reading;
pub mod reports;
pub mod routes;
pub mod sales;
pub mod scheduler;
pub mod seed;
pub mod settings;
pub mod settlement;
pub mod shift;
pub mod schema;
pub mod tank;

#[cfg(test)]
mod tests;

use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use diesel::r2d2::ConnectionManager;
use diesel::PgConnection;
use diesel_migrations::embed_migrations;
use diesel_migrations::EmbeddedMigrations;
use diesel_migrations::MigrationHarness;
use error::ServiceError;
use fuelops_commons::ApiResponse;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

pub type PgPool = diesel::r2d2::Pool<ConnectionManager<PgConnection>>;

pub fn run_migration(conn: &mut PgConnection) {
    conn.run_pending_migrations(MIGRATIONS)
        .expect("migrations to succeed");
}

/// Our app's top level error type.
#[derive(Debug)]
pub struct AppError(pub ServiceError);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.0.status();

        if status.is_server_error() {
            tracing::error!(code = self.0.code(), "Request failed: {:#}", self.0);
        } else {
            tracing::debug!(code = self.0.code(), "Request rejected: {}", self.0);
        }

        // Internal detail stays in the logs; the client gets a stable code
        // and a generic message for 5xx.
        let message = if status.is_server_error() {
            "internal server error".to_string()
        } else {
            self.0.to_string()
        };

        let body = Json(ApiResponse::<()>::err(
            message,
            Some(self.0.code().to_string()),
        ));

        (status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<ServiceError>,
{
    fn from(e: E) -> Self {
        AppError(e.into())
    }
}
