//! Streak and frequency rules applied when the pattern table misses.

use crate::model::OutcomeSymbol;

fn tail(history: &[OutcomeSymbol], len: usize) -> Option<&[OutcomeSymbol]> {
    if len == 0 || history.len() < len {
        return None;
    }
    Some(&history[history.len() - len..])
}

/// The last `len` symbols are identical; returns that symbol.
pub fn trailing_run(history: &[OutcomeSymbol], len: usize) -> Option<OutcomeSymbol> {
    let t = tail(history, len)?;
    let first = t[0];
    t.iter().all(|s| *s == first).then_some(first)
}

/// The last `len` symbols strictly alternate; returns the symbol that continues it.
pub fn trailing_alternation(history: &[OutcomeSymbol], len: usize) -> Option<OutcomeSymbol> {
    if len < 2 {
        return None;
    }
    let t = tail(history, len)?;
    let alternating = t.windows(2).all(|w| w[0] != w[1]);
    alternating.then(|| t[t.len() - 1].opposite())
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MajorityHit {
    pub symbol: OutcomeSymbol,
    pub share: f64,
    pub window: usize,
}

/// Share of the leading symbol over the last `window` symbols, if it reaches `threshold`.
/// Windows longer than the history are not evaluated.
pub fn majority(history: &[OutcomeSymbol], window: usize, threshold: f64) -> Option<MajorityHit> {
    let t = tail(history, window)?;
    let bigs = t.iter().filter(|s| **s == OutcomeSymbol::B).count();
    let (symbol, count) = if bigs * 2 >= t.len() {
        (OutcomeSymbol::B, bigs)
    } else {
        (OutcomeSymbol::S, t.len() - bigs)
    };
    let share = count as f64 / t.len() as f64;
    (share >= threshold).then_some(MajorityHit {
        symbol,
        share,
        window,
    })
}
