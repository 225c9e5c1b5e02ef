//! The sync driver: one reconciliation cycle, run at startup and then on a
//! fixed cadence.

pub mod events;
pub mod members;

use sqlx::MySqlPool;
use tokio::time::{self, MissedTickBehavior};
use tracing::{error, info};

use crate::config::Config;
use crate::error::SyncResult;
use crate::notion::DocumentStore;

pub use members::MemberSyncOutcome;

/// Runs a cycle immediately, then once per configured interval, forever.
///
/// The loop is strictly sequential; a cycle that outlives the cadence absorbs
/// the missed tick instead of racing a second cycle against the same stores.
/// A failed cycle is logged and the next tick starts fresh — reconciliation
/// is safe to re-run from scratch, so the schedule is the retry policy.
pub async fn run(store: &dyn DocumentStore, config: &Config, pool: &MySqlPool) {
    let mut interval = time::interval(config.sync_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        interval.tick().await;
        if let Err(err) = run_cycle(store, config, pool).await {
            error!(error = %err, "sync cycle failed");
        }
    }
}

/// One full cycle: events first, then members.
pub async fn run_cycle(
    store: &dyn DocumentStore,
    config: &Config,
    pool: &MySqlPool,
) -> SyncResult<()> {
    info!("starting sync cycle");

    let events = events::sync_events(store, config, pool).await?;
    let members = members::sync_members(store, config, pool).await?;

    info!(
        events,
        inserted = members.inserted,
        updated = members.updated,
        skipped = members.skipped,
        "sync cycle complete"
    );

    Ok(())
}
