//! Base tier classification from centipawn loss and contextual flags

use serde::Serialize;

use crate::engine::Evaluation;

use super::tier::{Classification, Tier};

/// Loss at or below which a move still counts as best.
pub const BEST_LOSS_MAX: i32 = 10;
pub const EXCELLENT_LOSS_MAX: i32 = 25;
pub const GOOD_LOSS_MAX: i32 = 50;
pub const INACCURACY_LOSS_MAX: i32 = 100;
pub const MISTAKE_LOSS_MAX: i32 = 200;

/// Loss band that can turn a merely suboptimal move into a miss.
/// Provisional boundaries; see [`missed_opportunity`].
pub const MISS_LOSS_MIN: i32 = 50;
pub const MISS_LOSS_MAX: i32 = 100;
/// Advantage the best move had to promise for a miss to apply.
pub const MISS_BEST_SCORE_MIN: i32 = 200;

/// Outcome of comparing mate distances when both moves mate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SlowerMate {
    #[default]
    None,
    /// Candidate mates two or more moves slower than best
    Inaccuracy,
    /// Candidate mates exactly one move slower
    Good,
}

/// Contextual flags feeding [`classify_tier`], computed upstream.
#[derive(Debug, Clone, Copy, Default)]
pub struct TierFlags {
    pub in_top3: bool,
    pub within_epsilon: bool,
    pub forced: bool,
    pub missed_mate: bool,
    pub is_book: bool,
    pub is_brilliant: bool,
    pub missed_opportunity: bool,
    pub slower_mate: SlowerMate,
}

/// Maps a centipawn loss plus contextual flags to a quality tier.
///
/// First match wins; several predicates overlap, so the rule order is
/// load-bearing. Book moves report a loss of 0 regardless of the measured
/// value.
pub fn classify_tier(cp_loss: i32, flags: &TierFlags) -> Classification {
    if flags.slower_mate == SlowerMate::Inaccuracy {
        return Classification::new(Tier::Inaccuracy, cp_loss);
    }
    if flags.slower_mate == SlowerMate::Good {
        return Classification::new(Tier::Good, cp_loss);
    }
    if flags.missed_mate && cp_loss >= MISTAKE_LOSS_MAX {
        return Classification::new(Tier::Blunder, cp_loss);
    }
    if flags.is_brilliant && cp_loss <= BEST_LOSS_MAX {
        return Classification::new(Tier::Brilliant, cp_loss);
    }
    if flags.is_book && cp_loss <= BEST_LOSS_MAX {
        return Classification::new(Tier::Book, 0);
    }
    if cp_loss <= BEST_LOSS_MAX || (flags.in_top3 && flags.within_epsilon) {
        return Classification::new(Tier::Best, cp_loss);
    }
    if cp_loss <= EXCELLENT_LOSS_MAX {
        return Classification::new(Tier::Excellent, cp_loss);
    }
    if cp_loss <= GOOD_LOSS_MAX {
        return Classification::new(Tier::Good, cp_loss);
    }
    if flags.missed_opportunity {
        return Classification::new(Tier::Miss, cp_loss);
    }
    if cp_loss <= INACCURACY_LOSS_MAX {
        return Classification::new(Tier::Inaccuracy, cp_loss);
    }
    if cp_loss <= MISTAKE_LOSS_MAX {
        return Classification::new(Tier::Mistake, cp_loss);
    }
    Classification::new(Tier::Blunder, cp_loss)
}

/// Compares mate distances when both the best move and the candidate
/// deliver mate for the same side. Candidate mating as fast or faster
/// falls through to the numeric thresholds.
pub fn slower_mate(best: Evaluation, candidate: Evaluation) -> SlowerMate {
    let (Evaluation::Mate(b), Evaluation::Mate(c)) = (best, candidate) else {
        return SlowerMate::None;
    };
    if b <= 0 || c <= 0 {
        return SlowerMate::None;
    }

    match c - b {
        d if d >= 2 => SlowerMate::Inaccuracy,
        1 => SlowerMate::Good,
        _ => SlowerMate::None,
    }
}

/// A move that let a concrete chance slip without being an outright error:
/// either the best move mated and the candidate does not (while keeping
/// most of the advantage), or a clearly winning continuation was traded
/// for a noticeably worse one.
pub fn missed_opportunity(
    best_is_mate: bool,
    candidate_is_mate: bool,
    cp_loss: i32,
    best_root_score: i32,
    is_book: bool,
) -> bool {
    if best_is_mate && !candidate_is_mate && cp_loss < MISTAKE_LOSS_MAX {
        return true;
    }

    !best_is_mate
        && cp_loss >= MISS_LOSS_MIN
        && cp_loss < MISS_LOSS_MAX
        && best_root_score >= MISS_BEST_SCORE_MIN
        && !is_book
}
