// src/scheduler.rs
//
// The periodic driver behind the lifecycle engine. One tick = one
// `sweep(now)` with the wall clock; everything time-dependent below this
// point takes `now` as a parameter, so tests never wait on real time.
use chrono::Utc;
use log::info;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::engine::AuctionEngine;

pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Spawns the sweep loop. Sweeps are idempotent and retry-by-next-tick,
/// so the loop never aborts on a failed pass; delayed ticks are not
/// bursted to catch up.
pub fn spawn_sweeper(engine: AuctionEngine, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let now = Utc::now();
            let report = engine.sweep(now);
            if !report.is_quiet() {
                info!(
                    "sweep at {}: {} activated, {} settled, {} failed",
                    now, report.activated, report.settled, report.failed
                );
            }
        }
    })
}
