use crate::accuracy::AccuracyTracker;
use crate::config::WatchConfig;
use crate::history::HistoryLedger;
use crate::ledger::PredictionLedger;
use crate::model::{render_symbols, Snapshot, SnapshotStatus, SyncStatus};
use chrono::{DateTime, Utc};

/// Everything one feed's pipeline owns. Lives behind a single lock.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub history: HistoryLedger,
    pub predictions: PredictionLedger,
    pub accuracy: AccuracyTracker,
    pub sync: SyncStatus,
}

impl SessionState {
    pub fn new(cfg: &WatchConfig) -> Self {
        Self {
            history: HistoryLedger::new(cfg.history.capacity),
            predictions: PredictionLedger::new(&cfg.ledger),
            accuracy: AccuracyTracker::new(),
            sync: SyncStatus::default(),
        }
    }

    pub fn snapshot(&self, feed: &str, history_len: usize) -> Snapshot {
        let latest = self.history.latest().cloned();
        let prediction = latest
            .as_ref()
            .and_then(|r| r.id.checked_add(1))
            .and_then(|next| self.predictions.get(next))
            .cloned();
        let status = if latest.is_some() {
            SnapshotStatus::Ready
        } else {
            SnapshotStatus::AwaitingData
        };
        Snapshot {
            feed: feed.to_string(),
            status,
            latest,
            prediction,
            history: render_symbols(&self.history.sequence(history_len)),
            stats: self.accuracy.stats(),
            win_rate: self.accuracy.win_rate(),
            live_predictions: self.predictions.len(),
            expired_predictions: self.predictions.expired_total(),
            sync: self.sync.clone(),
        }
    }

    pub(crate) fn mark_success(&mut self, at: DateTime<Utc>) {
        self.sync.cycles_completed += 1;
        self.sync.consecutive_failures = 0;
        self.sync.last_success_at = Some(at);
    }

    pub(crate) fn mark_failure(&mut self, error: String, at: DateTime<Utc>) {
        self.sync.consecutive_failures = self.sync.consecutive_failures.saturating_add(1);
        self.sync.last_error = Some(error);
        self.sync.last_error_at = Some(at);
    }
}
