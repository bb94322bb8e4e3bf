pub mod coin;
pub mod heuristics;
pub mod predictor;

pub use coin::{CoinSource, FixedCoin, SeededCoin, ThreadCoin};
pub use predictor::PredictionEngine;
