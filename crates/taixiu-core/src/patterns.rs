//! Curated window → next-symbol table.
//!
//! Keys are written in the feed's native notation: `T` (Tài, Big) and `X`
//! (Xỉu, Small). The table is fixed at compile time.

use crate::model::OutcomeSymbol;
use std::collections::HashMap;

pub const DEFAULT_WINDOW: usize = 14;

const BUILTIN_PATTERNS: &[(&str, char)] = &[
    // 1-1 alternation
    ("TXTXTXTXTXTXTX", 'T'),
    ("XTXTXTXTXTXTXT", 'X'),
    // 2-2 pairs
    ("TTXXTTXXTTXXTT", 'X'),
    ("XXTTXXTTXXTTXX", 'T'),
    // 3-3 triples
    ("TTTXXXTTTXXXTT", 'T'),
    ("XXXTTTXXXTTTXX", 'X'),
    // long runs
    ("TTTTTTTTTTTTTT", 'T'),
    ("XXXXXXXXXXXXXX", 'X'),
    // 1-2 and 2-1 cadences
    ("TXXTXXTXXTXXTX", 'X'),
    ("XTTXTTXTTXTTXT", 'T'),
    ("TTXTTXTTXTTXTT", 'X'),
    ("XXTXXTXXTXXTXX", 'T'),
    // 4-4 blocks
    ("TTTTXXXXTTTTXX", 'X'),
    ("XXXXTTTTXXXXTT", 'T'),
    // run break after a long streak
    ("TTTTTTTXXXXXXX", 'T'),
    ("XXXXXXXTTTTTTT", 'X'),
    // 1-2-3 staircase
    ("TXXTTTXTXXTTTX", 'T'),
    ("XTTXXXTXTTXXXT", 'X'),
];

/// Converts `T`/`X` notation into outcome symbols.
pub fn from_notation(s: &str) -> Option<Vec<OutcomeSymbol>> {
    s.chars().map(symbol_from_notation).collect()
}

fn symbol_from_notation(c: char) -> Option<OutcomeSymbol> {
    match c {
        'T' => Some(OutcomeSymbol::B),
        'X' => Some(OutcomeSymbol::S),
        _ => None,
    }
}

pub fn to_notation(symbols: &[OutcomeSymbol]) -> String {
    symbols
        .iter()
        .map(|s| match s {
            OutcomeSymbol::B => 'T',
            OutcomeSymbol::S => 'X',
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct PatternDatabase {
    window: usize,
    entries: HashMap<Vec<OutcomeSymbol>, OutcomeSymbol>,
}

impl PatternDatabase {
    pub fn builtin() -> Self {
        let mut entries = HashMap::with_capacity(BUILTIN_PATTERNS.len());
        for (key, next) in BUILTIN_PATTERNS {
            if let (Some(k), Some(v)) = (from_notation(key), symbol_from_notation(*next)) {
                entries.insert(k, v);
            }
        }
        Self {
            window: DEFAULT_WINDOW,
            entries,
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Exact match only. Windows of any other length never hit.
    pub fn lookup(&self, window: &[OutcomeSymbol]) -> Option<OutcomeSymbol> {
        if window.len() != self.window {
            return None;
        }
        self.entries.get(window).copied()
    }
}

impl Default for PatternDatabase {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table_is_well_formed() {
        let db = PatternDatabase::builtin();
        assert_eq!(db.len(), BUILTIN_PATTERNS.len(), "duplicate or malformed keys");
        for (key, _) in BUILTIN_PATTERNS {
            assert_eq!(key.len(), DEFAULT_WINDOW, "{key}");
        }
    }

    #[test]
    fn test_exact_lookup() {
        let db = PatternDatabase::builtin();
        let w = from_notation("TTXXTTXXTTXXTT").unwrap();
        assert_eq!(db.lookup(&w), Some(OutcomeSymbol::S));
        assert_eq!(to_notation(&w), "TTXXTTXXTTXXTT");
    }

    #[test]
    fn test_no_fuzzy_or_partial_match() {
        let db = PatternDatabase::builtin();
        let near = from_notation("TTXXTTXXTTXXTX").unwrap();
        assert_eq!(db.lookup(&near), None);
        let short = from_notation("TTXXTTXXTTXXT").unwrap();
        assert_eq!(db.lookup(&short), None);
    }
}
