use crate::model::OutcomeSymbol;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

/// Source of the single random decision the engine makes (empty history).
pub trait CoinSource: Send + Sync {
    fn flip(&self) -> OutcomeSymbol;
}

fn side(heads: bool) -> OutcomeSymbol {
    if heads {
        OutcomeSymbol::B
    } else {
        OutcomeSymbol::S
    }
}

/// Uniform coin backed by the thread-local generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadCoin;

impl CoinSource for ThreadCoin {
    fn flip(&self) -> OutcomeSymbol {
        side(rand::thread_rng().gen_bool(0.5))
    }
}

/// Reproducible coin for replays.
pub struct SeededCoin {
    rng: Mutex<StdRng>,
}

impl SeededCoin {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl CoinSource for SeededCoin {
    fn flip(&self) -> OutcomeSymbol {
        let heads = match self.rng.lock() {
            Ok(mut rng) => rng.gen_bool(0.5),
            Err(poisoned) => poisoned.into_inner().gen_bool(0.5),
        };
        side(heads)
    }
}

/// Always lands on the same side.
#[derive(Debug, Clone, Copy)]
pub struct FixedCoin(pub OutcomeSymbol);

impl CoinSource for FixedCoin {
    fn flip(&self) -> OutcomeSymbol {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_coin_is_reproducible() {
        let a = SeededCoin::new(7);
        let b = SeededCoin::new(7);
        let xs: Vec<_> = (0..32).map(|_| a.flip()).collect();
        let ys: Vec<_> = (0..32).map(|_| b.flip()).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn test_fixed_coin() {
        assert_eq!(FixedCoin(OutcomeSymbol::S).flip(), OutcomeSymbol::S);
    }
}
