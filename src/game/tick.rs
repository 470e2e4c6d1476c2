//! Session Tick Driver
//!
//! One background task advances every arena once per game-second. It takes
//! the same lock as player actions, so ticks and actions never interleave.
//! Missed ticks are skipped rather than replayed in a burst.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, instrument};

use crate::game::api::GameApi;
use crate::host::Host;

/// Run the tick loop until a shutdown signal arrives.
///
/// Each tick reads the API's own game clock, the same one gun actions use.
/// Returns the number of ticks applied.
#[instrument(skip(api, shutdown))]
pub async fn run_tick_loop<H>(
    api: Arc<Mutex<GameApi<H>>>,
    period: Duration,
    mut shutdown: broadcast::Receiver<()>,
) -> u64
where
    H: Host + Send + 'static,
{
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut ticks = 0u64;

    info!(period_ms = period.as_millis() as u64, "tick loop started");

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let report = api.lock().await.tick();
                ticks += 1;

                for (arena, transition) in &report.transitions {
                    debug!(%arena, from = %transition.from, to = %transition.to, "arena transition");
                }
                for arena in &report.ended {
                    info!(%arena, "arena session ended");
                }
            }
            _ = shutdown.recv() => {
                info!(ticks, "tick loop shutting down");
                break;
            }
        }
    }

    ticks
}
