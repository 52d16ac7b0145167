//! Brilliant-move detection
//!
//! A move is brilliant when it sacrifices material, still ranks with the
//! engine's best, leaves the opponent without real alternatives, changes a
//! game that was not already decided, and survives being played out. Each of
//! those is a gate; the pipeline runs them in order and accumulates a
//! weighted confidence score.

mod config;
mod sacrifice;
mod stability;
mod uniqueness;

pub use config::{piece_value, BrilliantConfig, GateWeights};
pub use sacrifice::{detect_sacrifice, side_material, SacrificeResult};
pub use stability::{check_stability, StabilityResult};
pub use uniqueness::{evaluate_uniqueness, UniquenessResult};

use serde::Serialize;
use shakmaty::Position;
use tracing::debug;

use crate::engine::{CancelToken, Oracle, SearchOptions, Wdl};
use crate::error::{Error, Result};
use crate::phase::{piece_count, GamePhase};
use crate::score::rank_lines;
use crate::util::{apply_uci, fen_of, position_from_fen};

/// The six gate outcomes. All default to false; incomplete data can only
/// make a move less brilliant.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct GateState {
    pub sacrifice: bool,
    pub near_best: bool,
    pub forcing: bool,
    pub uniqueness: bool,
    pub non_trivial: bool,
    pub stability: bool,
}

impl GateState {
    fn confidence(&self, weights: &GateWeights) -> f64 {
        let mut c = 0.0;
        if self.sacrifice {
            c += weights.sacrifice;
        }
        if self.near_best {
            c += weights.near_best;
        }
        if self.forcing {
            c += weights.forcing;
        }
        if self.uniqueness {
            c += weights.uniqueness;
        }
        if self.non_trivial {
            c += weights.non_trivial;
        }
        if self.stability {
            c += weights.stability;
        }
        c
    }
}

/// Full outcome of the gate pipeline for one candidate move.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BrilliantAnalysis {
    pub verdict: bool,
    pub gates: GateState,
    pub confidence: f64,
    pub reasons: Vec<String>,
    pub sacrifice: SacrificeResult,
    pub uniqueness: UniquenessResult,
    pub stability: Option<StabilityResult>,
    /// Gap between the opponent's best and second-best reply after the move
    pub pv_gap_after: i32,
}

/// Inputs already computed by the surrounding classification run.
#[derive(Debug)]
pub struct BrilliantInput<'a> {
    pub fen_before: &'a str,
    pub uci: &'a str,
    /// Centipawn loss of the candidate against the best move
    pub cp_loss: i32,
    /// Pre-move evaluation from the mover's perspective
    pub eval_before: i32,
    pub wdl_before: Option<Wdl>,
    /// Principal variation of the candidate, starting with the move itself
    pub candidate_pv: &'a [String],
    pub depth: u8,
}

/// The final decision rule, separated out so it can be tested without an
/// oracle: the four required gates, at least one of forcing or uniqueness,
/// and enough accumulated confidence.
pub fn decide(gates: &GateState, confidence: f64, config: &BrilliantConfig) -> bool {
    gates.sacrifice
        && gates.near_best
        && gates.non_trivial
        && gates.stability
        && (gates.forcing || gates.uniqueness)
        && confidence >= config.confidence_min
}

/// Cheap pre-check deciding whether the expensive pipeline is worth
/// running at all. Trivial opening moves and moves that already lost
/// ground never qualify.
pub fn should_check_brilliant(
    cp_loss: i32,
    move_number: u32,
    pieces: u32,
    forced: bool,
    phase: GamePhase,
    config: &BrilliantConfig,
) -> bool {
    if cp_loss > config.near_best_eps {
        return false;
    }
    if move_number <= 3 && pieces >= 32 {
        return false;
    }
    forced || phase == GamePhase::Middlegame
}

fn ensure_live(cancel: &CancelToken) -> Result<()> {
    if cancel.is_cancelled() {
        return Err(Error::Cancelled);
    }
    Ok(())
}

/// Runs the six-gate pipeline for one candidate move.
///
/// Gates one and two (near-best, sacrifice) are hard requirements and
/// short-circuit the run; the remaining gates are always evaluated so the
/// result carries the full soft signal. This is the most expensive call in
/// the crate, up to six extra oracle searches, so callers gate it behind
/// [`should_check_brilliant`]. The cancel token is checked before each
/// oracle call.
pub async fn analyze_brilliant<O: Oracle>(
    oracle: &mut O,
    input: &BrilliantInput<'_>,
    cancel: &CancelToken,
    config: &BrilliantConfig,
) -> Result<BrilliantAnalysis> {
    let before = position_from_fen(input.fen_before)?;
    let root = before.turn();
    let pieces = piece_count(&before);
    let opening = GamePhase::Opening == crate::phase::game_phase(&before);

    let mut analysis = BrilliantAnalysis::default();

    // Gate 1: near-best
    analysis.gates.near_best = input.cp_loss <= config.near_best_eps;
    if !analysis.gates.near_best {
        analysis
            .reasons
            .push(format!("loses {} centipawns against the best move", input.cp_loss));
        analysis.confidence = analysis.gates.confidence(&config.weights);
        return Ok(analysis);
    }

    // Gate 2: sacrifice
    let continuation = if input.candidate_pv.first().map(String::as_str) == Some(input.uci) {
        &input.candidate_pv[1..]
    } else {
        input.candidate_pv
    };
    analysis.sacrifice = detect_sacrifice(&before, input.uci, continuation, root, config);
    analysis.gates.sacrifice = analysis.sacrifice.qualifies();
    if !analysis.gates.sacrifice {
        analysis.reasons.push("no material is sacrificed".into());
        analysis.confidence = analysis.gates.confidence(&config.weights);
        return Ok(analysis);
    }
    if analysis.sacrifice.is_exchange_sacrifice {
        analysis.reasons.push(format!(
            "gives up the exchange ({} centipawns)",
            analysis.sacrifice.material_lost
        ));
    } else {
        analysis.reasons.push(format!(
            "sacrifices {} centipawns of material",
            analysis.sacrifice.material_lost
        ));
    }

    let Some(after) = apply_uci(&before, input.uci) else {
        return Err(Error::InvalidMove {
            mv: input.uci.to_string(),
            fen: input.fen_before.to_string(),
        });
    };
    let fen_after = fen_of(&after);

    // Gate 3: forcing. The opponent's reply search doubles as the source
    // of the post-move win probability.
    ensure_live(cancel)?;
    let reply_options = SearchOptions::depth(input.depth).multi_pv(config.root_multipv);
    let reply_analysis = oracle.analyze(&fen_after, &reply_options).await?;
    let wdl_after = reply_analysis.wdl;
    let replies = rank_lines(reply_analysis.lines, after.turn());
    analysis.pv_gap_after = match replies.as_slice() {
        [best, second, ..] => best.root_score - second.root_score,
        _ => 0,
    };
    let forcing_gap = if opening {
        config.forcing_gap_opening
    } else {
        config.forcing_gap_after
    };
    analysis.gates.forcing = analysis.pv_gap_after >= forcing_gap;
    if analysis.gates.forcing {
        analysis
            .reasons
            .push("the reply is forced, every alternative is much worse".into());
    }

    // Gate 4: uniqueness
    ensure_live(cancel)?;
    analysis.uniqueness = evaluate_uniqueness(oracle, &fen_after, input.depth, config).await?;
    analysis.gates.uniqueness = analysis.uniqueness.is_unique;
    if analysis.gates.uniqueness {
        analysis.reasons.push(format!(
            "the opponent has only {} good repl{}",
            analysis.uniqueness.good_replies,
            if analysis.uniqueness.good_replies == 1 { "y" } else { "ies" }
        ));
    }

    // Gate 5: non-trivial. A position already won needs extra proof the
    // move actually changed something.
    analysis.gates.non_trivial = if input.eval_before.abs() < config.winning_guard_cp {
        true
    } else {
        let jump = wdl_jump(
            root_win_probability(input.wdl_before, true),
            root_win_probability(wdl_after, false),
        );
        let jumped = jump.map(|j| j >= config.wdl_jump_min).unwrap_or(false);
        jumped || analysis.pv_gap_after >= config.winning_guard_gap
    };
    if !analysis.gates.non_trivial {
        analysis
            .reasons
            .push("the position was already winning, the move changes little".into());
    }

    // Gate 6: stability along the candidate's own line. The walk checks
    // the token itself before each of its searches.
    let stability =
        check_stability(oracle, input.fen_before, input.candidate_pv, input.depth, cancel, config)
            .await?;
    analysis.gates.stability = stability.is_stable;
    if !stability.is_stable {
        analysis.reasons.push(format!(
            "the evaluation drifts {} centipawns when the line is played out",
            stability.max_drift
        ));
    }
    analysis.stability = Some(stability);

    analysis.confidence = analysis.gates.confidence(&config.weights);
    analysis.verdict = decide(&analysis.gates, analysis.confidence, config);

    // Sparse boards leave fewer ways to go wrong, so demand a truly
    // only-move reply.
    if analysis.verdict
        && pieces <= config.endgame_piece_max
        && analysis.uniqueness.good_replies > config.endgame_max_good_replies
    {
        debug!(good_replies = analysis.uniqueness.good_replies, "endgame rule rejects verdict");
        analysis.verdict = false;
        analysis
            .reasons
            .push("in the endgame the opponent keeps more than one good reply".into());
    }

    Ok(analysis)
}

/// Win probability for the side that made the move. Before the move that
/// side is to move; after the move the probabilities belong to the opponent.
fn root_win_probability(wdl: Option<Wdl>, root_to_move: bool) -> Option<f64> {
    wdl.map(|w| {
        if root_to_move {
            w.win_probability()
        } else {
            w.loss_probability()
        }
    })
}

fn wdl_jump(before: Option<f64>, after: Option<f64>) -> Option<f64> {
    Some(after? - before?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decide_requires_all_hard_gates() {
        let config = BrilliantConfig::default();
        let all = GateState {
            sacrifice: true,
            near_best: true,
            forcing: true,
            uniqueness: true,
            non_trivial: true,
            stability: true,
        };
        assert!(decide(&all, 1.0, &config));

        for missing in ["sacrifice", "near_best", "non_trivial", "stability"] {
            let mut gates = all;
            match missing {
                "sacrifice" => gates.sacrifice = false,
                "near_best" => gates.near_best = false,
                "non_trivial" => gates.non_trivial = false,
                _ => gates.stability = false,
            }
            // High confidence never overrides a required gate
            assert!(!decide(&gates, 0.95, &config), "{missing} should be required");
        }
    }

    #[test]
    fn test_decide_needs_forcing_or_uniqueness() {
        let config = BrilliantConfig::default();
        let mut gates = GateState {
            sacrifice: true,
            near_best: true,
            forcing: false,
            uniqueness: false,
            non_trivial: true,
            stability: true,
        };
        assert!(!decide(&gates, 0.95, &config));

        gates.forcing = true;
        let confidence = gates.confidence(&GateWeights::default());
        assert!((confidence - 0.85).abs() < 1e-9);
        assert!(decide(&gates, confidence, &config));
    }

    #[test]
    fn test_confidence_threshold() {
        let config = BrilliantConfig::default();
        // Uniqueness alone (weight .15) leaves confidence at 0.80
        let gates = GateState {
            sacrifice: true,
            near_best: true,
            forcing: false,
            uniqueness: true,
            non_trivial: true,
            stability: true,
        };
        let confidence = gates.confidence(&GateWeights::default());
        assert!((confidence - 0.80).abs() < 1e-9);
        assert!(!decide(&gates, confidence, &config));
    }

    #[test]
    fn test_precheck_skips_trivial_opening_moves() {
        let config = BrilliantConfig::default();
        assert!(!should_check_brilliant(0, 1, 32, false, GamePhase::Opening, &config));
        assert!(!should_check_brilliant(0, 2, 32, false, GamePhase::Opening, &config));
        // Same move number after material has left the board
        assert!(should_check_brilliant(0, 3, 30, true, GamePhase::Opening, &config));
    }

    #[test]
    fn test_precheck_rejects_losing_moves() {
        let config = BrilliantConfig::default();
        assert!(!should_check_brilliant(40, 20, 24, true, GamePhase::Middlegame, &config));
    }

    #[test]
    fn test_precheck_phase_rules() {
        let config = BrilliantConfig::default();
        assert!(should_check_brilliant(5, 20, 24, false, GamePhase::Middlegame, &config));
        assert!(should_check_brilliant(5, 40, 8, true, GamePhase::Endgame, &config));
        assert!(!should_check_brilliant(5, 40, 8, false, GamePhase::Endgame, &config));
    }

    #[test]
    fn test_wdl_jump_needs_both_sides() {
        let jump = wdl_jump(Some(0.5), Some(0.7)).unwrap();
        assert!((jump - 0.2).abs() < 1e-9);
        assert_eq!(wdl_jump(None, Some(0.7)), None);
        assert_eq!(wdl_jump(Some(0.5), None), None);
    }
}
