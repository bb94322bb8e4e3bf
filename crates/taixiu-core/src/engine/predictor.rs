use super::coin::{CoinSource, ThreadCoin};
use super::heuristics;
use crate::config::EngineConfig;
use crate::model::{OutcomeSymbol, PredictionResult, PredictionRule};
use crate::patterns::{self, PatternDatabase};
use std::sync::Arc;

/// Pattern table first, then run / alternation / majority, then reversal.
///
/// Every branch is a pure function of the history except the empty-history
/// coin flip, which goes through the injected [`CoinSource`].
pub struct PredictionEngine {
    cfg: EngineConfig,
    patterns: PatternDatabase,
    coin: Arc<dyn CoinSource>,
}

impl PredictionEngine {
    pub fn new(cfg: EngineConfig) -> Self {
        Self::with_coin(cfg, Arc::new(ThreadCoin))
    }

    pub fn with_coin(cfg: EngineConfig, coin: Arc<dyn CoinSource>) -> Self {
        Self {
            cfg,
            patterns: PatternDatabase::builtin(),
            coin,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.cfg
    }

    pub fn predict(&self, history: &[OutcomeSymbol]) -> PredictionResult {
        let window = self.cfg.window;

        if history.len() < window {
            return self.insufficient(history);
        }

        let recent = &history[history.len() - window..];
        if let Some(symbol) = self.patterns.lookup(recent) {
            return PredictionResult {
                symbol,
                rationale: format!(
                    "pattern match on window {} -> {}",
                    patterns::to_notation(recent),
                    symbol.as_char()
                ),
                confidence: self.cfg.pattern_confidence,
                rule: PredictionRule::PatternMatch,
            };
        }

        if let Some(symbol) = heuristics::trailing_run(history, self.cfg.run_length) {
            return PredictionResult {
                symbol,
                rationale: format!(
                    "run of {} {} continues",
                    self.cfg.run_length,
                    symbol.as_char()
                ),
                confidence: self.cfg.run_confidence,
                rule: PredictionRule::RunContinuation,
            };
        }

        if let Some(symbol) = heuristics::trailing_alternation(history, self.cfg.alternation_length)
        {
            return PredictionResult {
                symbol,
                rationale: format!(
                    "alternation over last {} continues with {}",
                    self.cfg.alternation_length,
                    symbol.as_char()
                ),
                confidence: self.cfg.alternation_confidence,
                rule: PredictionRule::AlternationContinuation,
            };
        }

        for &w in &self.cfg.majority_windows {
            if let Some(hit) = heuristics::majority(history, w, self.cfg.majority_threshold) {
                return PredictionResult {
                    symbol: hit.symbol,
                    rationale: format!(
                        "{} holds {:.0}% of last {}",
                        hit.symbol.as_char(),
                        hit.share * 100.0,
                        hit.window
                    ),
                    confidence: self.cfg.majority_confidence,
                    rule: PredictionRule::Majority,
                };
            }
        }

        // len >= window > 0, so there is a last symbol.
        let last = history[history.len() - 1];
        PredictionResult {
            symbol: last.opposite(),
            rationale: format!("no signal, reversing last result {}", last.as_char()),
            confidence: self.cfg.reversal_confidence,
            rule: PredictionRule::Reversal,
        }
    }

    fn insufficient(&self, history: &[OutcomeSymbol]) -> PredictionResult {
        let (symbol, rationale) = match history.last() {
            Some(&last) => (
                last,
                format!(
                    "insufficient data ({} of {} rounds), following last result {}",
                    history.len(),
                    self.cfg.window,
                    last.as_char()
                ),
            ),
            None => {
                let s = self.coin.flip();
                (s, "insufficient data (no rounds yet), coin flip".to_string())
            }
        };
        PredictionResult {
            symbol,
            rationale,
            confidence: self.cfg.insufficient_confidence,
            rule: PredictionRule::InsufficientData,
        }
    }
}
