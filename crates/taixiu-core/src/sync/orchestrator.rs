use super::state::SessionState;
use crate::config::WatchConfig;
use crate::engine::PredictionEngine;
use crate::history::{sort_batch, Admission};
use crate::model::{ResolvedOutcome, Snapshot};
use crate::normalize::normalize_batch;
use crate::providers::RoundFeed;
use chrono::Utc;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum SyncPhase {
    Idle = 0,
    Fetching = 1,
    Normalizing = 2,
    Ingesting = 3,
    Resolving = 4,
    Predicting = 5,
}

/// Puts the phase back to `Idle` when a cycle ends, including when its future is dropped.
struct PhaseReset<'a>(&'a AtomicU8);

impl Drop for PhaseReset<'_> {
    fn drop(&mut self) {
        self.0.store(SyncPhase::Idle as u8, Ordering::Release);
    }
}

impl SyncPhase {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => SyncPhase::Fetching,
            2 => SyncPhase::Normalizing,
            3 => SyncPhase::Ingesting,
            4 => SyncPhase::Resolving,
            5 => SyncPhase::Predicting,
            _ => SyncPhase::Idle,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    pub fetched: usize,
    pub normalized: usize,
    pub rejected: usize,
    pub accepted: usize,
    pub duplicates: usize,
    pub stale: usize,
    pub resolved_correct: usize,
    pub resolved_incorrect: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issued_for: Option<u64>,
    pub expired: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum CycleOutcome {
    Completed(CycleReport),
    /// Fetch succeeded but yielded no usable records.
    Empty(CycleReport),
    FetchFailed { error: String },
    /// Another cycle was in flight.
    Skipped,
}

impl CycleOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, CycleOutcome::Completed(_))
    }

    pub fn report(&self) -> Option<&CycleReport> {
        match self {
            CycleOutcome::Completed(r) | CycleOutcome::Empty(r) => Some(r),
            _ => None,
        }
    }
}

/// Drives one feed: fetch, normalize, ingest, resolve, predict.
///
/// At most one cycle runs at a time. The fetch happens without holding the
/// state lock; everything after it commits under a single write guard, so
/// readers observe either the pre-cycle or the post-cycle state.
pub struct SyncOrchestrator {
    feed: Arc<dyn RoundFeed>,
    engine: PredictionEngine,
    state: RwLock<SessionState>,
    gate: Mutex<()>,
    phase: AtomicU8,
    bootstrapped: AtomicBool,
    history_len: usize,
}

impl SyncOrchestrator {
    pub fn new(feed: Arc<dyn RoundFeed>, cfg: &WatchConfig) -> Self {
        let engine = PredictionEngine::new(cfg.engine.clone());
        Self::with_engine(feed, cfg, engine)
    }

    pub fn with_engine(feed: Arc<dyn RoundFeed>, cfg: &WatchConfig, engine: PredictionEngine) -> Self {
        Self {
            feed,
            engine,
            state: RwLock::new(SessionState::new(cfg)),
            gate: Mutex::new(()),
            phase: AtomicU8::new(SyncPhase::Idle as u8),
            bootstrapped: AtomicBool::new(false),
            history_len: cfg.snapshot.history_len,
        }
    }

    pub fn name(&self) -> &str {
        self.feed.feed_name()
    }

    pub fn phase(&self) -> SyncPhase {
        SyncPhase::from_u8(self.phase.load(Ordering::Acquire))
    }

    fn set_phase(&self, phase: SyncPhase) {
        self.phase.store(phase as u8, Ordering::Release);
    }

    /// Runs one cycle unless one is already in flight. Never returns an error:
    /// every failure is absorbed into the outcome and the sync status.
    pub async fn run_cycle(&self) -> CycleOutcome {
        let Ok(_guard) = self.gate.try_lock() else {
            tracing::debug!(event = "sync.cycle.skipped", feed = %self.name());
            return CycleOutcome::Skipped;
        };
        let _idle = PhaseReset(&self.phase);
        self.cycle().await
    }

    async fn cycle(&self) -> CycleOutcome {
        let feed = self.name().to_string();

        self.set_phase(SyncPhase::Fetching);
        let raw = match self.feed.fetch().await {
            Ok(raw) => raw,
            Err(e) => {
                let error = e.to_string();
                tracing::warn!(event = "sync.fetch.failed", feed = %feed, error = %error);
                self.state.write().await.mark_failure(error.clone(), Utc::now());
                return CycleOutcome::FetchFailed { error };
            }
        };

        self.set_phase(SyncPhase::Normalizing);
        let observed_at = Utc::now();
        let (mut rounds, errors) = normalize_batch(&raw, observed_at);
        for e in &errors {
            tracing::warn!(event = "sync.record.rejected", feed = %feed, error = %e);
        }
        sort_batch(&mut rounds);

        let mut report = CycleReport {
            fetched: raw.len(),
            normalized: rounds.len(),
            rejected: errors.len(),
            ..Default::default()
        };

        let mut state = self.state.write().await;

        if rounds.is_empty() {
            tracing::info!(
                event = "sync.batch.empty",
                feed = %feed,
                fetched = report.fetched,
                rejected = report.rejected
            );
            state.mark_success(observed_at);
            return CycleOutcome::Empty(report);
        }

        self.set_phase(SyncPhase::Ingesting);
        for round in rounds {
            match state.history.accept(round.clone()) {
                Admission::New => {
                    report.accepted += 1;
                    self.set_phase(SyncPhase::Resolving);
                    if let Some(res) = state.predictions.resolve(&round) {
                        state.accuracy.record(res.outcome);
                        match res.outcome {
                            ResolvedOutcome::Correct => report.resolved_correct += 1,
                            ResolvedOutcome::Incorrect => report.resolved_incorrect += 1,
                        }
                        tracing::info!(
                            event = "prediction.resolved",
                            feed = %feed,
                            round_id = round.id,
                            predicted = ?res.prediction.symbol,
                            actual = ?res.actual,
                            result = ?res.outcome
                        );
                    }
                    self.set_phase(SyncPhase::Ingesting);
                }
                Admission::Duplicate => report.duplicates += 1,
                Admission::Stale => report.stale += 1,
            }
        }

        self.set_phase(SyncPhase::Predicting);
        if let Some(latest_id) = state.history.latest().map(|r| r.id) {
            // No round can follow u64::MAX.
            let next_id = latest_id.checked_add(1);
            if let Some(next_id) = next_id.filter(|id| state.predictions.get(*id).is_none()) {
                let sequence = state.history.sequence(state.history.len());
                let result = self.engine.predict(&sequence);
                tracing::info!(
                    event = "prediction.issued",
                    feed = %feed,
                    target_round_id = next_id,
                    symbol = ?result.symbol,
                    rule = ?result.rule,
                    confidence = result.confidence,
                    rationale = %result.rationale
                );
                if state.predictions.issue_if_absent(next_id, result, Utc::now()) {
                    report.issued_for = Some(next_id);
                }
            }
            report.expired = state.predictions.expire(latest_id);
        }

        state.mark_success(observed_at);
        tracing::info!(
            event = "sync.cycle.completed",
            feed = %feed,
            fetched = report.fetched,
            accepted = report.accepted,
            duplicates = report.duplicates,
            rejected = report.rejected,
            correct = report.resolved_correct,
            incorrect = report.resolved_incorrect,
            expired = report.expired
        );
        CycleOutcome::Completed(report)
    }

    /// Best available snapshot. The very first read on a cold session runs one
    /// bootstrap cycle; every other read is a pure read of current state.
    pub async fn snapshot(&self, history_len: Option<usize>) -> Snapshot {
        let cold = self.state.read().await.sync.cycles_completed == 0;
        if cold && !self.bootstrapped.swap(true, Ordering::AcqRel) {
            tracing::info!(event = "sync.bootstrap", feed = %self.name());
            self.run_cycle().await;
        }
        self.peek(history_len).await
    }

    /// Snapshot without any bootstrap.
    pub async fn peek(&self, history_len: Option<usize>) -> Snapshot {
        let len = history_len.unwrap_or(self.history_len);
        self.state.read().await.snapshot(self.name(), len)
    }

    /// Runs `f` against a consistent view of the session.
    pub async fn inspect<R>(&self, f: impl FnOnce(&SessionState) -> R) -> R {
        f(&*self.state.read().await)
    }
}
