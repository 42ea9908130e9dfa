use crate::handover::VarianceRule;
use anyhow::Context;
use anyhow::Result;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde::Serialize;
use std::path::Path;
use std::path::PathBuf;
use tokio::fs;
use tokio::io::AsyncWriteExt;

const SETTINGS_FILE_NAME: &str = "fuelops-settings.toml";

/// Top-level runtime settings.
///
/// Operational policy an operator may tune without a rebuild; secrets and
/// endpoints stay in the environment.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    /// Cash floor for auto-disputing a handover confirmation.
    pub handover_max_cash_difference: Decimal,
    /// Percentage floor for auto-disputing a handover confirmation.
    pub handover_max_variance_percent: Decimal,

    /// How often the OCR operation is polled before the upload fails.
    pub ocr_poll_attempts: u32,
    pub ocr_poll_interval_secs: u64,

    /// Window during which a downgraded plan keeps its old limits.
    pub plan_downgrade_grace_days: i64,

    /// Non-critical audit rows older than this are purged by the nightly
    /// job.
    pub audit_retention_days: i64,

    /// Per-request wall clock enforced at the HTTP boundary.
    pub request_timeout_secs: u64,

    // Special parameter, where the settings file is located
    pub path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            handover_max_cash_difference: Decimal::from(100),
            handover_max_variance_percent: Decimal::from(2),
            ocr_poll_attempts: 15,
            ocr_poll_interval_secs: 2,
            plan_downgrade_grace_days: 30,
            audit_retention_days: 365,
            request_timeout_secs: 30,
            path: None,
        }
    }
}

async fn read_settings(data_dir: &Path) -> Result<Settings> {
    let settings_path = data_dir.join(SETTINGS_FILE_NAME);
    let data = fs::read_to_string(settings_path).await?;
    toml::from_str(&data).context("Unable to parse settings file")
}

impl Settings {
    pub async fn new(data_dir: &Path) -> Self {
        match read_settings(data_dir).await {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("Unable to read {SETTINGS_FILE_NAME} file, using defaults: {e}");
                let new = Settings {
                    path: Some(data_dir.join(SETTINGS_FILE_NAME)),
                    ..Settings::default()
                };
                if let Err(e) = new.write_to_file().await {
                    tracing::error!("Unable to write default settings to file: {e}");
                } else {
                    tracing::info!("Default settings written to file");
                }
                new
            }
        }
    }

    pub async fn write_to_file(&self) -> Result<()> {
        let data =
            toml::to_string_pretty(&self).context("Unable to serialize settings to TOML format")?;

        let settings_path = self.path.as_ref().context("Settings path not set")?.clone();
        let mut file = fs::File::create(settings_path).await?;
        file.write_all(data.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    pub fn variance_rule(&self) -> VarianceRule {
        VarianceRule {
            max_cash_difference: self.handover_max_cash_difference,
            max_percent: self.handover_max_variance_percent,
        }
    }
}
