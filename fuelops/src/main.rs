use anyhow::Context;
use anyhow::Result;
use diesel::r2d2;
use diesel::r2d2::ConnectionManager;
use diesel::Connection;
use diesel::PgConnection;
use diesel_migrations::MigrationHarness;
use fuelops::blob::BlobStore;
use fuelops::cli::Command;
use fuelops::cli::MigrateCommand;
use fuelops::cli::Opts;
use fuelops::logger;
use fuelops::metrics;
use fuelops::ocr::OcrClient;
use fuelops::routes;
use fuelops::routes::AppState;
use fuelops::scheduler::MaintenanceScheduler;
use fuelops::seed;
use fuelops::settings::Settings;
use fuelops::MIGRATIONS;
use std::sync::Arc;
use std::time::Duration;
use tracing::metadata::LevelFilter;

const DEFAULT_JWT_EXPIRES_IN_SECS: i64 = 86_400;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let opts = Opts::read();

    let level = match std::env::var("LOG_LEVEL").ok().as_deref() {
        Some("trace") => LevelFilter::TRACE,
        Some("debug") => LevelFilter::DEBUG,
        Some("warn") => LevelFilter::WARN,
        Some("error") => LevelFilter::ERROR,
        _ => LevelFilter::INFO,
    };
    logger::init_tracing(level, opts.json)?;

    let database_url = opts.database_url()?;
    let manager = ConnectionManager::<PgConnection>::new(database_url.clone());
    let pool = r2d2::Pool::builder()
        .max_size(10)
        .build(manager)
        .context("Failed to build database connection pool")?;

    match opts.command {
        Some(Command::Migrate { direction }) => {
            let mut conn =
                PgConnection::establish(&database_url).context("Failed to connect for migration")?;
            run_migrate(&mut conn, direction)?;
            return Ok(());
        }
        Some(Command::Seed) => {
            let mut conn = pool.get()?;
            fuelops::run_migration(&mut conn);
            seed::run(&mut conn)?;
            return Ok(());
        }
        None => {}
    }

    let mut conn = pool.get()?;
    fuelops::run_migration(&mut conn);
    drop(conn);

    let data_dir = opts.data_dir()?;
    if !data_dir.exists() {
        std::fs::create_dir_all(&data_dir)
            .context(format!("Could not create data dir {}", data_dir.display()))?;
    }
    let settings = Settings::new(&data_dir).await;

    let jwt_secret = std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?;
    let jwt_expires_in_secs = std::env::var("JWT_EXPIRES_IN")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_JWT_EXPIRES_IN_SECS);

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(settings.request_timeout_secs))
        .build()
        .context("Failed to build HTTP client")?;

    let ocr = OcrClient::new(
        http.clone(),
        std::env::var("OCR_ENDPOINT").unwrap_or_else(|_| "http://localhost:7071".to_string()),
        std::env::var("OCR_API_KEY").unwrap_or_default(),
        settings.ocr_poll_attempts,
        Duration::from_secs(settings.ocr_poll_interval_secs),
    );

    let blob = BlobStore::new(
        http,
        std::env::var("BLOB_ENDPOINT").unwrap_or_else(|_| "http://localhost:7072".to_string()),
        std::env::var("BLOB_API_KEY").unwrap_or_default(),
    );

    metrics::init();

    let scheduler = MaintenanceScheduler::new().await;
    scheduler.add_aging_job(pool.clone()).await?;
    scheduler.add_missed_reading_job(pool.clone()).await?;
    scheduler
        .add_audit_purge_job(pool.clone(), settings.audit_retention_days)
        .await?;
    scheduler.start().await?;

    let mut http_address = opts.http_address;
    if let Ok(port) = std::env::var("PORT") {
        if let Ok(port) = port.parse() {
            http_address.set_port(port);
        }
    }

    let state = Arc::new(AppState {
        pool,
        settings,
        jwt_secret,
        jwt_expires_in_secs,
        ocr,
        blob,
    });

    let app = routes::router(state);

    tracing::info!("Listening on {http_address}");
    axum::Server::bind(&http_address)
        .serve(app.into_make_service())
        .await
        .context("HTTP server failed")?;

    Ok(())
}

fn run_migrate(conn: &mut PgConnection, direction: MigrateCommand) -> Result<()> {
    match direction {
        MigrateCommand::Up => {
            let applied = conn
                .run_pending_migrations(MIGRATIONS)
                .map_err(|e| anyhow::anyhow!("migrations failed: {e}"))?;
            for migration in applied {
                tracing::info!(%migration, "Applied migration");
            }
        }
        MigrateCommand::Down => {
            let reverted = conn
                .revert_last_migration(MIGRATIONS)
                .map_err(|e| anyhow::anyhow!("revert failed: {e}"))?;
            tracing::info!(migration = %reverted, "Reverted migration");
        }
        MigrateCommand::Status => {
            let pending = conn
                .pending_migrations(MIGRATIONS)
                .map_err(|e| anyhow::anyhow!("could not read migrations: {e}"))?;
            if pending.is_empty() {
                tracing::info!("No pending migrations");
            }
            for migration in pending {
                tracing::info!(migration = %migration.name(), "Pending migration");
            }
        }
    }

    Ok(())
}
