use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;

use crate::db::dao::{DaoContext, DaoResult};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PurgeReport {
    pub codes: u64,
    pub revoked_tokens: u64,
}

/// Deletes one-time codes and blacklist entries whose expiry has passed.
pub async fn purge_expired(daos: &DaoContext) -> DaoResult<PurgeReport> {
    let now = Utc::now().fixed_offset();
    let codes = daos.one_time_code().purge_expired(now).await?;
    let revoked_tokens = daos.revoked_token().purge_expired(now).await?;
    Ok(PurgeReport {
        codes,
        revoked_tokens,
    })
}

pub fn spawn_purge_task(daos: DaoContext, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            match purge_expired(&daos).await {
                Ok(report) if report.codes + report.revoked_tokens > 0 => tracing::info!(
                    codes = report.codes,
                    revoked_tokens = report.revoked_tokens,
                    "purged expired rows"
                ),
                Ok(_) => {}
                Err(err) => tracing::error!(error = %err, "expired row purge failed"),
            }
        }
    })
}
