//! One-second ticker background task

use std::{sync::Arc, time::Duration};
use tokio::{
    sync::watch,
    time::{interval, MissedTickBehavior},
};
use tracing::{debug, error, info};

use crate::state::{AppState, TickOutcome, TimerMode};

pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Background task that drives the timer once per second until shutdown
pub async fn ticker_task(state: Arc<AppState>, mut shutdown: watch::Receiver<bool>) {
    info!("Starting timer ticker task");

    let mut interval = interval(TICK_INTERVAL);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // First tick completes immediately
    interval.tick().await;

    loop {
        tokio::select! {
            _ = interval.tick() => {
                match state.tick() {
                    Ok(TickOutcome::PhaseChanged(TimerMode::Break)) => {
                        match state.snapshot() {
                            Ok(snapshot) => info!(
                                "Focus phase complete (session #{}), break ready: {}s",
                                snapshot.session_count, snapshot.time_left
                            ),
                            Err(_) => info!("Focus phase complete, break ready"),
                        }
                    }
                    Ok(TickOutcome::PhaseChanged(TimerMode::Work)) => {
                        info!("Break over, focus phase ready");
                    }
                    Ok(_) => {}
                    Err(e) => error!("Timer tick failed: {}", e),
                }
            }

            _ = shutdown.changed() => {
                debug!("Ticker received shutdown");
                break;
            }
        }
    }

    info!("Timer ticker task stopped");
}
