use crate::credit;
use crate::db::audit_logs::AuditLog;
use crate::db::creditors::Creditor;
use crate::db::nozzles::Nozzle;
use crate::db::stations::Station;
use crate::PgPool;
use anyhow::Result;
use time::Duration;
use time::OffsetDateTime;
use tokio_cron_scheduler::Job;
use tokio_cron_scheduler::JobScheduler;

/// Credit aging recomputation runs nightly at 02:05 UTC
const AGING_SCHEDULE: &str = "0 5 2 * * *";
/// Missed-reading scan runs every morning at 06:35 UTC
const MISSED_READING_SCHEDULE: &str = "0 35 6 * * *";
/// Audit retention purge runs nightly at 03:25 UTC
const AUDIT_PURGE_SCHEDULE: &str = "0 25 3 * * *";

pub struct MaintenanceScheduler {
    scheduler: JobScheduler,
}

impl MaintenanceScheduler {
    pub async fn new() -> Self {
        let scheduler = JobScheduler::new()
            .await
            .expect("To be able to start the scheduler");

        Self { scheduler }
    }

    /// Recomputes cached aging buckets for every creditor carrying a
    /// balance.
    pub async fn add_aging_job(&self, pool: PgPool) -> Result<()> {
        let uuid = self
            .scheduler
            .add(
                Job::new_async(AGING_SCHEDULE, move |_, _| {
                    let pool = pool.clone();
                    Box::pin(async move {
                        let result = tokio::task::spawn_blocking(move || {
                            let mut conn = pool.get()?;
                            let today = OffsetDateTime::now_utc().date();

                            let creditors = Creditor::all_with_balance(&mut conn)?;
                            let count = creditors.len();
                            for creditor in creditors {
                                credit::recompute_aging(&mut conn, creditor.id, today)?;
                            }

                            anyhow::Ok(count)
                        })
                        .await;

                        match result {
                            Ok(Ok(count)) => {
                                tracing::debug!(creditors = count, "Recomputed credit aging")
                            }
                            Ok(Err(e)) => tracing::error!("Aging recomputation failed: {e:#}"),
                            Err(e) => tracing::error!("Aging job panicked: {e:#}"),
                        }
                    })
                })
                .expect("To be able to add the job"),
            )
            .await?;

        tracing::debug!(job_id = uuid.to_string(), "Started credit aging job");
        Ok(())
    }

    /// Warns per station when nozzles have not seen a reading within the
    /// station's alert threshold.
    pub async fn add_missed_reading_job(&self, pool: PgPool) -> Result<()> {
        let uuid = self
            .scheduler
            .add(
                Job::new_async(MISSED_READING_SCHEDULE, move |_, _| {
                    let pool = pool.clone();
                    Box::pin(async move {
                        let result = tokio::task::spawn_blocking(move || {
                            let mut conn = pool.get()?;
                            let today = OffsetDateTime::now_utc().date();

                            for station in Station::all_active(&mut conn)? {
                                let Some(threshold) = station.missed_reading_alert_days else {
                                    continue;
                                };
                                let horizon = today - Duration::days(i64::from(threshold));

                                for nozzle in
                                    Nozzle::list_for_station(&mut conn, station.id)?
                                {
                                    let stale = nozzle
                                        .last_reading_date
                                        .map(|d| d < horizon)
                                        .unwrap_or(false);

                                    if stale {
                                        tracing::warn!(
                                            station = %station.code,
                                            nozzle = nozzle.nozzle_number,
                                            last_reading_date = ?nozzle.last_reading_date,
                                            "Nozzle has no recent reading"
                                        );
                                    }
                                }
                            }

                            anyhow::Ok(())
                        })
                        .await;

                        match result {
                            Ok(Ok(())) => {}
                            Ok(Err(e)) => tracing::error!("Missed-reading scan failed: {e:#}"),
                            Err(e) => tracing::error!("Missed-reading job panicked: {e:#}"),
                        }
                    })
                })
                .expect("To be able to add the job"),
            )
            .await?;

        tracing::debug!(job_id = uuid.to_string(), "Started missed-reading job");
        Ok(())
    }

    /// Purges non-critical audit rows past the configured retention.
    pub async fn add_audit_purge_job(&self, pool: PgPool, retention_days: i64) -> Result<()> {
        let uuid = self
            .scheduler
            .add(
                Job::new_async(AUDIT_PURGE_SCHEDULE, move |_, _| {
                    let pool = pool.clone();
                    Box::pin(async move {
                        let result = tokio::task::spawn_blocking(move || {
                            let mut conn = pool.get()?;
                            let cutoff =
                                OffsetDateTime::now_utc() - Duration::days(retention_days);
                            let purged = AuditLog::purge_older_than(&mut conn, cutoff)?;
                            anyhow::Ok(purged)
                        })
                        .await;

                        match result {
                            Ok(Ok(purged)) if purged > 0 => {
                                tracing::info!(purged, "Purged audit rows past retention")
                            }
                            Ok(Ok(_)) => {}
                            Ok(Err(e)) => tracing::error!("Audit purge failed: {e:#}"),
                            Err(e) => tracing::error!("Audit purge job panicked: {e:#}"),
                        }
                    })
                })
                .expect("To be able to add the job"),
            )
            .await?;

        tracing::debug!(job_id = uuid.to_string(), "Started audit purge job");
        Ok(())
    }

    pub async fn start(&self) -> Result<()> {
        self.scheduler.start().await?;
        Ok(())
    }
}
