//! Deduplicated, id-ordered, size-bounded round store.

use crate::model::{OutcomeSymbol, Round};
use std::collections::BTreeMap;

pub const DEFAULT_CAPACITY: usize = 100;

/// Result of offering a round to the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    New,
    /// Id already stored. Nothing changed.
    Duplicate,
    /// Ledger is full and the round is older than everything retained.
    Stale,
}

impl Admission {
    pub fn is_new(self) -> bool {
        matches!(self, Admission::New)
    }
}

#[derive(Debug, Clone)]
pub struct HistoryLedger {
    capacity: usize,
    rounds: BTreeMap<u64, Round>,
}

impl HistoryLedger {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            rounds: BTreeMap::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn accept(&mut self, round: Round) -> Admission {
        if let Some(existing) = self.rounds.get(&round.id) {
            if existing.outcome != round.outcome || existing.dice != round.dice {
                tracing::warn!(
                    event = "history.conflicting_redelivery",
                    round_id = round.id,
                    stored = ?existing.outcome,
                    incoming = ?round.outcome,
                    "ignoring re-delivered round with different content"
                );
            }
            return Admission::Duplicate;
        }

        if self.rounds.len() >= self.capacity {
            if let Some((&oldest, _)) = self.rounds.first_key_value() {
                if round.id < oldest {
                    return Admission::Stale;
                }
            }
        }

        self.rounds.insert(round.id, round);
        while self.rounds.len() > self.capacity {
            self.rounds.pop_first();
        }
        Admission::New
    }

    /// Highest-id round seen so far (that is still retained).
    pub fn latest(&self) -> Option<&Round> {
        self.rounds.last_key_value().map(|(_, r)| r)
    }

    pub fn contains(&self, id: u64) -> bool {
        self.rounds.contains_key(&id)
    }

    /// Last `n` symbols in ascending id order; `n` is clamped to the current length.
    pub fn sequence(&self, n: usize) -> Vec<OutcomeSymbol> {
        let skip = self.rounds.len().saturating_sub(n);
        self.rounds.values().skip(skip).map(|r| r.symbol()).collect()
    }

    pub fn ids(&self) -> Vec<u64> {
        self.rounds.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.rounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }
}

impl Default for HistoryLedger {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// Orders an upstream batch ascending by id before sequential `accept` calls.
pub fn sort_batch(rounds: &mut [Round]) {
    rounds.sort_by_key(|r| r.id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{render_symbols, Outcome};
    use chrono::Utc;

    fn round(id: u64, outcome: Outcome) -> Round {
        let dice = match outcome {
            Outcome::Big => [6, 5, 4],
            Outcome::Small => [1, 2, 3],
        };
        Round {
            id,
            dice,
            sum: dice.iter().sum(),
            outcome,
            observed_at: Utc::now(),
        }
    }

    #[test]
    fn test_accept_is_idempotent() {
        let mut h = HistoryLedger::new(10);
        assert!(h.accept(round(1, Outcome::Big)).is_new());
        assert_eq!(h.accept(round(1, Outcome::Big)), Admission::Duplicate);
        assert_eq!(h.len(), 1);
        assert_eq!(render_symbols(&h.sequence(10)), "B");
    }

    #[test]
    fn test_conflicting_redelivery_keeps_original() {
        let mut h = HistoryLedger::new(10);
        h.accept(round(7, Outcome::Small));
        assert_eq!(h.accept(round(7, Outcome::Big)), Admission::Duplicate);
        assert_eq!(h.latest().unwrap().outcome, Outcome::Small);
    }

    #[test]
    fn test_sorted_batch_keeps_sequence_chronological() {
        let mut h = HistoryLedger::new(10);
        let mut batch = vec![
            round(3, Outcome::Small),
            round(1, Outcome::Big),
            round(2, Outcome::Big),
        ];
        sort_batch(&mut batch);
        for r in batch {
            h.accept(r);
        }
        assert_eq!(render_symbols(&h.sequence(3)), "BBS");
        assert_eq!(h.latest().unwrap().id, 3);
    }

    #[test]
    fn test_late_round_lands_in_id_order() {
        let mut h = HistoryLedger::new(10);
        h.accept(round(1, Outcome::Big));
        h.accept(round(3, Outcome::Big));
        h.accept(round(2, Outcome::Small));
        assert_eq!(h.ids(), vec![1, 2, 3]);
        assert_eq!(render_symbols(&h.sequence(3)), "BSB");
        assert_eq!(h.latest().unwrap().id, 3);
    }

    #[test]
    fn test_eviction_keeps_highest_ids() {
        let mut h = HistoryLedger::new(3);
        for id in 1..=5 {
            h.accept(round(id, Outcome::Big));
        }
        assert_eq!(h.ids(), vec![3, 4, 5]);
        assert_eq!(h.accept(round(1, Outcome::Small)), Admission::Stale);
        assert_eq!(h.ids(), vec![3, 4, 5]);
    }

    #[test]
    fn test_sequence_clamps_and_is_pure() {
        let mut h = HistoryLedger::new(5);
        h.accept(round(1, Outcome::Big));
        h.accept(round(2, Outcome::Small));
        assert_eq!(h.sequence(100).len(), 2);
        assert_eq!(h.sequence(1), vec![OutcomeSymbol::S]);
        assert_eq!(h.sequence(1), h.sequence(1));
        assert!(h.sequence(0).is_empty());
    }
}
