//! Background reaping of orphan batches
//!
//! With two-phase writes a failed upload can leave a batch that never received
//! its records. The sweeper periodically deletes childless batches older than a
//! grace period. Legitimately empty batches age out the same way.

use sqlx::SqlitePool;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info};

use crate::config::OrphanSweepConfig;
use crate::db::batches;

pub struct OrphanSweeper {
    pool: SqlitePool,
    config: OrphanSweepConfig,
}

impl OrphanSweeper {
    pub fn new(pool: SqlitePool, config: OrphanSweepConfig) -> Self {
        Self { pool, config }
    }

    /// Start the sweeper in background. The first pass runs after one full
    /// interval.
    pub fn start(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            info!(
                interval_secs = self.config.interval_secs,
                grace_secs = self.config.grace_secs,
                "Orphan batch sweeper started"
            );

            let mut ticker = interval(Duration::from_secs(self.config.interval_secs.max(1)));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await;

            loop {
                ticker.tick().await;
                if let Err(e) = self.run_once().await {
                    error!("Orphan sweep failed: {}", e);
                }
            }
        })
    }

    /// Run one sweep pass and return how many batches were removed
    pub async fn run_once(&self) -> Result<u64, sqlx::Error> {
        let grace = Duration::from_secs(self.config.grace_secs);
        let reaped = batches::reap_orphan_batches(&self.pool, grace).await?;
        if reaped > 0 {
            info!(reaped, "Reaped orphan batches");
        }
        Ok(reaped)
    }
}
