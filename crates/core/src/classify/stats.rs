//! Aggregate statistics over a sequence of classified moves

use std::collections::BTreeMap;

use serde::Serialize;

use super::tier::Tier;

/// Exponential decay constant mapping average centipawn loss to an
/// accuracy percentage. Loss 0 maps to 100, loss 120 to ~36.8.
const ACCURACY_DECAY_CP: f64 = 120.0;

pub fn accuracy_for_cpl(avg_cp_loss: f64) -> f64 {
    100.0 * (-avg_cp_loss / ACCURACY_DECAY_CP).exp()
}

/// Per-side summary of a classified game.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GameStats {
    pub moves: u32,
    pub tier_counts: BTreeMap<Tier, u32>,
    pub total_cp_loss: i64,
}

impl GameStats {
    pub fn record(&mut self, tier: Tier, cp_loss: i32) {
        self.moves += 1;
        *self.tier_counts.entry(tier).or_insert(0) += 1;
        self.total_cp_loss += cp_loss as i64;
    }

    pub fn count(&self, tier: Tier) -> u32 {
        self.tier_counts.get(&tier).copied().unwrap_or(0)
    }

    pub fn average_cp_loss(&self) -> f64 {
        if self.moves == 0 {
            return 0.0;
        }
        self.total_cp_loss as f64 / self.moves as f64
    }

    pub fn accuracy(&self) -> f64 {
        accuracy_for_cpl(self.average_cp_loss())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accuracy_bounds() {
        assert_eq!(accuracy_for_cpl(0.0), 100.0);
        assert!(accuracy_for_cpl(30.0) > 75.0);
        assert!(accuracy_for_cpl(300.0) < 10.0);
    }

    #[test]
    fn test_stats_accumulate() {
        let mut stats = GameStats::default();
        stats.record(Tier::Best, 4);
        stats.record(Tier::Best, 0);
        stats.record(Tier::Mistake, 140);

        assert_eq!(stats.moves, 3);
        assert_eq!(stats.count(Tier::Best), 2);
        assert_eq!(stats.count(Tier::Mistake), 1);
        assert_eq!(stats.count(Tier::Blunder), 0);
        assert_eq!(stats.average_cp_loss(), 48.0);
        assert!(stats.accuracy() > 60.0 && stats.accuracy() < 70.0);
    }

    #[test]
    fn test_empty_stats() {
        let stats = GameStats::default();
        assert_eq!(stats.average_cp_loss(), 0.0);
        assert_eq!(stats.accuracy(), 100.0);
    }
}
