//! The generic periodic-worker harness every concrete worker in this crate
//! runs on top of (spec §5 "Background workers respect a stop signal and
//! finish the current unit of work before exiting."): acquire the shard
//! lease, run one tick, release, sleep, repeat.

use std::sync::Arc;

use settld_types::{Clock, Timestamp};
use tracing::{info, warn};

use crate::error::OpsError;
use crate::lease::LeaseManager;

/// One worker's unit of work. Implemented by the concrete workers in this
/// crate (`retention`, `finance_reconcile`, `month_close`, `delivery_ack`);
/// the coordinator supplies the subsystem calls each tick actually makes.
#[async_trait::async_trait]
pub trait WorkerTick: Send + Sync {
    async fn tick(&self, at: Timestamp) -> anyhow::Result<()>;
}

/// Runs `tick` on `interval`, serialized across the fleet by a lease on
/// `shard` held for `lease_ttl`. Stops as soon as the current tick
/// finishes once `stop` fires — never mid-tick.
pub async fn run_worker_loop(
    worker_id: String,
    shard: String,
    lease_manager: Arc<LeaseManager>,
    clock: Arc<dyn Clock>,
    interval: std::time::Duration,
    lease_ttl: time::Duration,
    tick: Arc<dyn WorkerTick>,
    mut stop: tokio::sync::watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(interval);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let now = clock.now();
                match lease_manager.acquire(&worker_id, &shard, now, lease_ttl) {
                    Ok(_lease) => {
                        if let Err(err) = tick.tick(now).await {
                            warn!(worker_id = %worker_id, shard = %shard, error = %err, "worker tick failed");
                        }
                    }
                    Err(OpsError::LeaseHeld { .. }) => {
                        info!(worker_id = %worker_id, shard = %shard, "lease held elsewhere, skipping tick");
                    }
                    Err(err) => {
                        warn!(worker_id = %worker_id, shard = %shard, error = %err, "lease acquisition error");
                    }
                }
            }
            _ = stop.changed() => {
                if *stop.borrow() {
                    info!(worker_id = %worker_id, shard = %shard, "stop signal received, exiting after current tick");
                    break;
                }
            }
        }
    }
}
