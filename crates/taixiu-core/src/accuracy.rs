use crate::model::{AccuracyStats, ResolvedOutcome};

/// Process-lifetime hit counters. Only resolution feeds this.
#[derive(Debug, Clone, Default)]
pub struct AccuracyTracker {
    stats: AccuracyStats,
}

impl AccuracyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, outcome: ResolvedOutcome) {
        let s = &mut self.stats;
        s.total_resolved += 1;
        match outcome {
            ResolvedOutcome::Correct => {
                s.total_correct += 1;
                s.current_streak = if s.current_streak < 0 {
                    1
                } else {
                    s.current_streak + 1
                };
            }
            ResolvedOutcome::Incorrect => {
                s.current_streak = if s.current_streak > 0 {
                    -1
                } else {
                    s.current_streak - 1
                };
            }
        }
    }

    pub fn win_rate(&self) -> f64 {
        if self.stats.total_resolved == 0 {
            return 0.0;
        }
        self.stats.total_correct as f64 / self.stats.total_resolved as f64
    }

    pub fn stats(&self) -> AccuracyStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ResolvedOutcome::{Correct, Incorrect};

    #[test]
    fn test_streak_trajectory() {
        let mut t = AccuracyTracker::new();
        let mut streaks = Vec::new();
        for o in [Correct, Correct, Incorrect, Incorrect, Incorrect, Correct] {
            t.record(o);
            streaks.push(t.stats().current_streak);
        }
        assert_eq!(streaks, vec![1, 2, -1, -2, -3, 1]);
        assert_eq!(t.stats().total_resolved, 6);
        assert_eq!(t.stats().total_correct, 3);
        assert!((t.win_rate() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_win_rate_empty() {
        assert_eq!(AccuracyTracker::new().win_rate(), 0.0);
    }

    #[test]
    fn test_first_incorrect_goes_negative() {
        let mut t = AccuracyTracker::new();
        t.record(Incorrect);
        assert_eq!(t.stats().current_streak, -1);
    }
}
