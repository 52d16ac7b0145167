//! Tuning knobs for the brilliant-move gate pipeline

use serde::Serialize;
use shakmaty::Role;

/// Gate weights contributing to the overall confidence score. Sums to 1.0.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct GateWeights {
    pub sacrifice: f64,
    pub near_best: f64,
    pub forcing: f64,
    pub uniqueness: f64,
    pub non_trivial: f64,
    pub stability: f64,
}

impl Default for GateWeights {
    fn default() -> Self {
        GateWeights {
            sacrifice: 0.25,
            near_best: 0.15,
            forcing: 0.20,
            uniqueness: 0.15,
            non_trivial: 0.15,
            stability: 0.10,
        }
    }
}

/// Thresholds for every brilliant gate. Built once per classification run
/// and never mutated afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct BrilliantConfig {
    /// Centipawn loss at or below which a move counts as near-best
    pub near_best_eps: i32,
    /// Lines requested from the root MultiPV search
    pub root_multipv: u8,
    /// Net material loss that makes a full sacrifice
    pub sac_cp_min: i32,
    /// Net material loss that makes an exchange sacrifice
    pub sac_exchange_min: i32,
    /// PV plies walked after the move looking for the material low point
    pub sac_recovery_plies: usize,
    /// Best-to-second-best reply gap that makes the position forcing
    pub forcing_gap_after: i32,
    /// Stricter forcing gap applied during the opening
    pub forcing_gap_opening: i32,
    /// Replies within `uniqueness_reply_eps` of the best still "good"
    pub uniqueness_reply_eps: i32,
    /// Good-reply count at or below which the move is unique
    pub uniqueness_max_good_replies: u32,
    /// Pre-move advantage beyond which extra proof of impact is required
    pub winning_guard_cp: i32,
    /// Win-probability jump that satisfies the guard
    pub wdl_jump_min: f64,
    /// Reply gap that satisfies the guard when probabilities are missing
    pub winning_guard_gap: i32,
    /// PV plies re-evaluated by the stability check
    pub stability_plies: usize,
    /// Maximum tolerated drift from the initial evaluation
    pub stability_drift_cp: i32,
    /// Piece count at or below which the stricter endgame rule applies
    pub endgame_piece_max: u32,
    /// Endgame cap on good replies
    pub endgame_max_good_replies: u32,
    pub weights: GateWeights,
    /// Minimum confidence for a positive verdict
    pub confidence_min: f64,
}

impl Default for BrilliantConfig {
    fn default() -> Self {
        BrilliantConfig {
            near_best_eps: 10,
            root_multipv: 5,
            sac_cp_min: 300,
            sac_exchange_min: 150,
            sac_recovery_plies: 2,
            forcing_gap_after: 250,
            forcing_gap_opening: 300,
            uniqueness_reply_eps: 50,
            uniqueness_max_good_replies: 2,
            winning_guard_cp: 400,
            wdl_jump_min: 0.10,
            winning_guard_gap: 350,
            stability_plies: 8,
            stability_drift_cp: 60,
            endgame_piece_max: 10,
            endgame_max_good_replies: 1,
            weights: GateWeights::default(),
            confidence_min: 0.85,
        }
    }
}

/// Material value of a piece in centipawns.
pub fn piece_value(role: Role) -> i32 {
    match role {
        Role::Pawn => 100,
        Role::Knight => 320,
        Role::Bishop => 330,
        Role::Rook => 500,
        Role::Queen => 900,
        Role::King => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weights_sum_to_one() {
        let w = GateWeights::default();
        let sum = w.sacrifice + w.near_best + w.forcing + w.uniqueness + w.non_trivial + w.stability;
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_piece_values() {
        assert_eq!(piece_value(Role::Pawn), 100);
        assert_eq!(piece_value(Role::Knight), 320);
        assert_eq!(piece_value(Role::Bishop), 330);
        assert_eq!(piece_value(Role::Rook), 500);
        assert_eq!(piece_value(Role::Queen), 900);
        assert_eq!(piece_value(Role::King), 0);
    }
}
