use super::orchestrator::{CycleOutcome, SyncOrchestrator};
use crate::model::Snapshot;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Ticks `orch` every `period`. Ticks that fire while a cycle is still running
/// are dropped, never queued. Stops after `max_cycles` ticks when given.
/// `on_cycle` sees each outcome together with the state it left behind.
pub async fn run_loop<F>(
    orch: Arc<SyncOrchestrator>,
    period: Duration,
    max_cycles: Option<u64>,
    mut on_cycle: F,
) where
    F: FnMut(&CycleOutcome, &Snapshot) + Send,
{
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut ticks = 0u64;
    loop {
        if max_cycles.is_some_and(|max| ticks >= max) {
            break;
        }
        ticker.tick().await;
        ticks += 1;

        let outcome = orch.run_cycle().await;
        let snapshot = orch.peek(None).await;
        on_cycle(&outcome, &snapshot);
    }
}

pub fn spawn(orch: Arc<SyncOrchestrator>, period: Duration) -> JoinHandle<()> {
    tracing::info!(
        event = "scheduler.start",
        feed = %orch.name(),
        interval_ms = period.as_millis() as u64
    );
    tokio::spawn(run_loop(orch, period, None, |_, _| {}))
}
