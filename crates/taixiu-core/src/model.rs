use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lowest dice total classified as Big (Tài). Totals 4..=10 are Small (Xỉu).
pub const BIG_MIN_SUM: u8 = 11;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Big,
    Small,
}

impl Outcome {
    pub fn from_sum(sum: u8) -> Self {
        if sum >= BIG_MIN_SUM {
            Outcome::Big
        } else {
            Outcome::Small
        }
    }

    pub fn symbol(self) -> OutcomeSymbol {
        match self {
            Outcome::Big => OutcomeSymbol::B,
            Outcome::Small => OutcomeSymbol::S,
        }
    }
}

/// Single-token encoding of an outcome, the alphabet of the history sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutcomeSymbol {
    B,
    S,
}

impl OutcomeSymbol {
    pub fn as_char(self) -> char {
        match self {
            OutcomeSymbol::B => 'B',
            OutcomeSymbol::S => 'S',
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'B' => Some(OutcomeSymbol::B),
            'S' => Some(OutcomeSymbol::S),
            _ => None,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            OutcomeSymbol::B => OutcomeSymbol::S,
            OutcomeSymbol::S => OutcomeSymbol::B,
        }
    }

    pub fn outcome(self) -> Outcome {
        match self {
            OutcomeSymbol::B => Outcome::Big,
            OutcomeSymbol::S => Outcome::Small,
        }
    }
}

/// Renders symbols as a compact string, e.g. `BBSB`.
pub fn render_symbols(symbols: &[OutcomeSymbol]) -> String {
    symbols.iter().map(|s| s.as_char()).collect()
}

/// Parses a `B`/`S` string. Returns `None` on any other character.
pub fn parse_symbols(s: &str) -> Option<Vec<OutcomeSymbol>> {
    s.chars().map(OutcomeSymbol::from_char).collect()
}

/// One resolved round of the game. Only the normalizer constructs these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    pub id: u64,
    pub dice: [u8; 3],
    pub sum: u8,
    pub outcome: Outcome,
    pub observed_at: DateTime<Utc>,
}

impl Round {
    pub fn symbol(&self) -> OutcomeSymbol {
        self.outcome.symbol()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionRule {
    InsufficientData,
    PatternMatch,
    RunContinuation,
    AlternationContinuation,
    Majority,
    Reversal,
}

/// Engine output before it is bound to a target round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub symbol: OutcomeSymbol,
    pub rationale: String,
    pub confidence: f64,
    pub rule: PredictionRule,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub target_round_id: u64,
    pub symbol: OutcomeSymbol,
    pub outcome: Outcome,
    pub rationale: String,
    pub confidence: f64,
    pub rule: PredictionRule,
    pub issued_at: DateTime<Utc>,
}

impl Prediction {
    pub fn bind(target_round_id: u64, result: PredictionResult, issued_at: DateTime<Utc>) -> Self {
        Self {
            target_round_id,
            symbol: result.symbol,
            outcome: result.symbol.outcome(),
            rationale: result.rationale,
            confidence: result.confidence,
            rule: result.rule,
            issued_at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolvedOutcome {
    Correct,
    Incorrect,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccuracyStats {
    pub total_resolved: u64,
    pub total_correct: u64,
    /// Positive: consecutive correct. Negative: consecutive incorrect.
    pub current_streak: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncStatus {
    pub cycles_completed: u64,
    pub consecutive_failures: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_success_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotStatus {
    AwaitingData,
    Ready,
}

/// Owned, point-in-time view of one feed's session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub feed: String,
    pub status: SnapshotStatus,
    pub latest: Option<Round>,
    pub prediction: Option<Prediction>,
    pub history: String,
    pub stats: AccuracyStats,
    pub win_rate: f64,
    pub live_predictions: usize,
    pub expired_predictions: u64,
    pub sync: SyncStatus,
}
