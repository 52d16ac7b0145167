//! Score normalization across perspectives
//!
//! Engine evaluations are always relative to the side to move at the node
//! that was searched. Everything downstream works on a single fixed
//! reference: the side to move at the root of the analysis. A score must be
//! negated whenever the node's side to move differs from the root's.

use serde::Serialize;
use shakmaty::Color;

use crate::engine::{EngineLine, Evaluation};

/// Mate scores map to this magnitude, shaded by mate distance so closer
/// mates sort higher. Must dominate any realistic centipawn score (±~3000).
const MATE_SCORE_BASE: i32 = 100_000;
const MATE_SHADE_MAX: i32 = 100;

/// Converts an evaluation reported at `node` into a signed centipawn-
/// equivalent score from `root`'s perspective. A missing evaluation
/// normalizes to 0.
pub fn eval_for_root(root: Color, node: Color, evaluation: Option<Evaluation>) -> i32 {
    let Some(evaluation) = evaluation else {
        return 0;
    };

    let score = match evaluation {
        Evaluation::Cp(cp) => cp,
        Evaluation::Mate(m) => {
            let sign = if m > 0 { 1 } else { -1 };
            sign * (MATE_SCORE_BASE - (m.abs() * 2).min(MATE_SHADE_MAX))
        }
    };

    if node == root {
        score
    } else {
        -score
    }
}

/// A MultiPV line annotated with its root-relative score.
#[derive(Debug, Clone, Serialize)]
pub struct RankedLine {
    #[serde(flatten)]
    pub line: EngineLine,
    /// Signed score from the root side's perspective
    pub root_score: i32,
}

impl RankedLine {
    pub fn first_move(&self) -> Option<&str> {
        self.line.first_move()
    }
}

/// Annotates and sorts MultiPV lines best-first from the root side.
///
/// MultiPV results are reported at the root node, so the node side equals
/// the root side. The sort is stable: ties keep the engine's original order.
/// Empty input yields empty output; callers must treat that as an error
/// condition, never as an even position.
pub fn rank_lines(lines: Vec<EngineLine>, root: Color) -> Vec<RankedLine> {
    let mut ranked: Vec<RankedLine> = lines
        .into_iter()
        .map(|line| {
            let root_score = eval_for_root(root, root, Some(line.evaluation));
            RankedLine { line, root_score }
        })
        .collect();

    ranked.sort_by(|a, b| b.root_score.cmp(&a.root_score));
    ranked
}

/// Non-negative loss of the candidate move relative to the best move, both
/// scored at the root.
///
/// Clamped at zero: a single-move-restricted search can score a candidate
/// slightly above the original best line (search variance), and that must
/// never read as negative loss.
pub fn centipawn_loss(best_root_score: i32, candidate_root_score: i32) -> i32 {
    (best_root_score - candidate_root_score).max(0)
}
