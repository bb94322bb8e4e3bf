//! Live predictions keyed by the round they target.

use crate::config::LedgerConfig;
use crate::model::{Outcome, Prediction, PredictionResult, ResolvedOutcome, Round};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub prediction: Prediction,
    pub actual: Outcome,
    pub outcome: ResolvedOutcome,
}

#[derive(Debug, Clone)]
pub struct PredictionLedger {
    live: BTreeMap<u64, Prediction>,
    expiry_horizon: u64,
    max_live: usize,
    expired_total: u64,
}

impl PredictionLedger {
    pub fn new(cfg: &LedgerConfig) -> Self {
        Self {
            live: BTreeMap::new(),
            expiry_horizon: cfg.expiry_horizon,
            max_live: cfg.max_live.max(1),
            expired_total: 0,
        }
    }

    /// Stores the prediction unless one is already live for `target_round_id`.
    /// Returns whether it was stored.
    pub fn issue_if_absent(
        &mut self,
        target_round_id: u64,
        result: PredictionResult,
        issued_at: DateTime<Utc>,
    ) -> bool {
        if self.live.contains_key(&target_round_id) {
            return false;
        }
        self.live.insert(
            target_round_id,
            Prediction::bind(target_round_id, result, issued_at),
        );
        true
    }

    pub fn get(&self, target_round_id: u64) -> Option<&Prediction> {
        self.live.get(&target_round_id)
    }

    /// Consumes the live prediction for `actual.id`, if any.
    pub fn resolve(&mut self, actual: &Round) -> Option<Resolution> {
        let prediction = self.live.remove(&actual.id)?;
        let outcome = if prediction.symbol == actual.symbol() {
            ResolvedOutcome::Correct
        } else {
            ResolvedOutcome::Incorrect
        };
        Some(Resolution {
            prediction,
            actual: actual.outcome,
            outcome,
        })
    }

    /// Drops predictions whose target trails `latest_id` by more than the horizon,
    /// then trims the oldest targets down to the live cap. Returns how many went.
    pub fn expire(&mut self, latest_id: u64) -> usize {
        let before = self.live.len();
        let horizon = self.expiry_horizon;
        self.live
            .retain(|target, _| target.saturating_add(horizon) >= latest_id);
        while self.live.len() > self.max_live {
            self.live.pop_first();
        }
        let dropped = before - self.live.len();
        self.expired_total += dropped as u64;
        dropped
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    pub fn expired_total(&self) -> u64 {
        self.expired_total
    }

    pub fn targets(&self) -> Vec<u64> {
        self.live.keys().copied().collect()
    }
}

impl Default for PredictionLedger {
    fn default() -> Self {
        Self::new(&LedgerConfig::default())
    }
}
