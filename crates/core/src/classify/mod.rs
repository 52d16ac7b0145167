//! Move classification
//!
//! The entry points are [`classify_move`] for one (position, move) pair and
//! [`classify_game`] for a whole parsed game. Each run is independent and
//! owns the oracle for its duration.

mod base;
mod stats;
mod tier;

pub use base::{
    classify_tier, missed_opportunity, slower_mate, SlowerMate, TierFlags, BEST_LOSS_MAX,
    EXCELLENT_LOSS_MAX, GOOD_LOSS_MAX, INACCURACY_LOSS_MAX, MISTAKE_LOSS_MAX,
};
pub use stats::{accuracy_for_cpl, GameStats};
pub use tier::{Classification, Tier};

use serde::Serialize;
use shakmaty::{Chess, Color, Position};
use tracing::{debug, info};

use crate::brilliant::{analyze_brilliant, should_check_brilliant, BrilliantAnalysis, BrilliantConfig, BrilliantInput};
use crate::engine::{CancelToken, Evaluation, Oracle, SearchOptions, Wdl};
use crate::error::{Error, Result};
use crate::explain::{detect_motifs, explain, Explanation, Motif};
use crate::parser::GameRecord;
use crate::phase::{game_phase, is_opening_phase, piece_count, GamePhase};
use crate::score::{centipawn_loss, eval_for_root, rank_lines, RankedLine};
use crate::util::{parse_uci_move, position_from_fen, uci_to_san};

/// Root-score gap to the second line beyond which the position counts as
/// forced.
const FORCED_GAP: i32 = 200;

/// Common opening moves accepted by the book heuristic while the position
/// is still in the opening phase. Coarse by design; a real opening database
/// is a caller-side concern.
const BOOK_MOVES: &[&str] = &[
    "e2e4", "d2d4", "c2c4", "g1f3", "b1c3", "f1c4", "f1b5", "f1e2", "c1f4", "c1g5", "d2d3",
    "e2e3", "g2g3", "f1g2", "e1g1", "e7e5", "c7c5", "e7e6", "c7c6", "d7d5", "d7d6", "g8f6",
    "b8c6", "f8c5", "f8e7", "f8b4", "b7b6", "g7g6", "f8g7", "e8g8", "c8f5", "c8g4",
];

/// Options for one classification run.
#[derive(Debug, Clone)]
pub struct ClassifyOptions {
    pub depth: u8,
    /// Loss band for the within-epsilon flag
    pub epsilon: i32,
    /// Apply the opening book heuristic
    pub detect_book: bool,
    /// Never run the brilliant pipeline, regardless of the pre-check
    pub skip_brilliant: bool,
    pub cancel: CancelToken,
    pub brilliant: BrilliantConfig,
}

impl Default for ClassifyOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassifyOptions {
    pub fn new() -> Self {
        ClassifyOptions {
            depth: 20,
            epsilon: 10,
            detect_book: true,
            skip_brilliant: false,
            cancel: CancelToken::new(),
            brilliant: BrilliantConfig::default(),
        }
    }

    pub fn depth(mut self, depth: u8) -> Self {
        self.depth = depth;
        self
    }

    pub fn cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }
}

/// Everything known about one classified move.
#[derive(Debug, Clone, Serialize)]
pub struct MoveReport {
    pub classification: Classification,
    pub best_move: String,
    pub best_move_san: Option<String>,
    pub player_move: String,
    pub player_move_san: Option<String>,
    /// Best line's evaluation before the move
    pub engine_eval: Evaluation,
    /// The played move's evaluation under a restricted search
    pub move_eval: Option<Evaluation>,
    pub forced: bool,
    pub missed_mate: bool,
    /// Moves to mate for the best line, when it mates
    pub mate_in: Option<u32>,
    pub is_book: bool,
    pub is_brilliant: bool,
    pub brilliant: Option<BrilliantAnalysis>,
    pub phase: GamePhase,
    pub lines: Vec<RankedLine>,
    pub motifs: Vec<Motif>,
    pub explanation: Explanation,
}

fn ensure_live(cancel: &CancelToken) -> Result<()> {
    if cancel.is_cancelled() {
        return Err(Error::Cancelled);
    }
    Ok(())
}

/// True when the best line towers over every alternative.
fn is_forced(ranked: &[RankedLine]) -> bool {
    match ranked {
        [_] => true,
        [best, second, ..] => best.root_score - second.root_score >= FORCED_GAP,
        [] => false,
    }
}

fn is_book_move(position: &Chess, uci: &str) -> bool {
    is_opening_phase(position) && BOOK_MOVES.contains(&uci)
}

/// Restricted-search score for a single move, from the mover's perspective.
async fn score_single_move<O: Oracle>(
    oracle: &mut O,
    fen: &str,
    uci: &str,
    root: Color,
    depth: u8,
) -> Result<(i32, Option<Evaluation>, Vec<String>)> {
    let options = SearchOptions::depth(depth).search_moves(vec![uci.to_string()]);
    let analysis = oracle.analyze(fen, &options).await?;

    let evaluation = analysis
        .evaluation
        .or_else(|| analysis.lines.first().map(|l| l.evaluation));
    let score = eval_for_root(root, root, evaluation);
    let pv = analysis
        .lines
        .first()
        .map(|l| l.pv.clone())
        .unwrap_or_else(|| vec![uci.to_string()]);

    Ok((score, evaluation, pv))
}

/// Classifies one candidate move in the given position.
///
/// Runs the full pipeline: a MultiPV root search, two single-move restricted
/// searches, the tier rules, the brilliant pipeline behind its pre-check,
/// and the explanation generator. Hard oracle failures abort the run;
/// sub-analysis walks degrade silently.
pub async fn classify_move<O: Oracle>(
    oracle: &mut O,
    fen: &str,
    uci: &str,
    options: &ClassifyOptions,
) -> Result<MoveReport> {
    let position = position_from_fen(fen)?;
    let root = position.turn();
    parse_uci_move(&position, uci)?;

    let move_number = position.fullmoves().get();
    let pieces = piece_count(&position);
    let phase = game_phase(&position);
    let is_book = options.detect_book && is_book_move(&position, uci);

    // Root search: the candidate lines everything else is judged against
    ensure_live(&options.cancel)?;
    let root_options = SearchOptions::depth(options.depth).multi_pv(options.brilliant.root_multipv);
    let root_analysis = oracle.analyze(fen, &root_options).await?;
    let wdl_before: Option<Wdl> = root_analysis.wdl;
    let ranked = rank_lines(root_analysis.lines, root);
    if ranked.is_empty() {
        return Err(Error::NoLinesReturned(fen.to_string()));
    }

    let best_move = ranked[0]
        .first_move()
        .ok_or_else(|| Error::NoLinesReturned(fen.to_string()))?
        .to_string();
    let best_eval = ranked[0].line.evaluation;
    let forced = is_forced(&ranked);

    // Score the candidate and the best move on equal footing
    ensure_live(&options.cancel)?;
    let (candidate_score, candidate_eval, candidate_pv) =
        score_single_move(oracle, fen, uci, root, options.depth).await?;

    ensure_live(&options.cancel)?;
    let (best_score, _, _) = score_single_move(oracle, fen, &best_move, root, options.depth).await?;

    let cp_loss = centipawn_loss(best_score, candidate_score);
    debug!(uci, cp_loss, best_move = best_move.as_str(), "scored candidate");

    let in_top3 = ranked
        .iter()
        .take(3)
        .any(|line| line.first_move() == Some(uci));
    let within_epsilon = ranked
        .iter()
        .find(|line| line.first_move() == Some(uci))
        .map(|line| ranked[0].root_score - line.root_score <= options.epsilon)
        .unwrap_or(false);

    let best_is_mate = best_eval.is_mate() && ranked[0].root_score > 0;
    let candidate_is_mate = candidate_eval.map(|e| e.is_mate()).unwrap_or(false);
    let missed_mate = best_is_mate && !candidate_is_mate;
    let slower = match candidate_eval {
        Some(eval) if best_is_mate => slower_mate(best_eval, eval),
        _ => SlowerMate::None,
    };
    let missed = missed_opportunity(best_is_mate, candidate_is_mate, cp_loss, best_score, is_book);

    // The expensive part, behind its pre-check
    let mut brilliant = None;
    let mut is_brilliant = false;
    if !options.skip_brilliant
        && should_check_brilliant(cp_loss, move_number, pieces, forced, phase, &options.brilliant)
    {
        let input = BrilliantInput {
            fen_before: fen,
            uci,
            cp_loss,
            eval_before: ranked[0].root_score,
            wdl_before,
            candidate_pv: &candidate_pv,
            depth: options.depth,
        };
        let analysis =
            analyze_brilliant(oracle, &input, &options.cancel, &options.brilliant).await?;
        is_brilliant = analysis.verdict;
        brilliant = Some(analysis);
    }

    let flags = TierFlags {
        in_top3,
        within_epsilon,
        forced,
        missed_mate,
        is_book,
        is_brilliant,
        missed_opportunity: missed,
        slower_mate: slower,
    };
    let classification = classify_tier(cp_loss, &flags);
    info!(
        uci,
        tier = classification.label,
        cp_loss = classification.cp_loss,
        "classified move"
    );

    let motifs = detect_motifs(&position, uci);
    let best_move_san = uci_to_san(&position, &best_move);
    let explanation = explain(&classification, motifs.clone(), best_move_san.as_deref());

    Ok(MoveReport {
        best_move_san,
        player_move: uci.to_string(),
        player_move_san: uci_to_san(&position, uci),
        engine_eval: best_eval,
        move_eval: candidate_eval,
        forced,
        missed_mate,
        mate_in: if best_is_mate { best_eval.mate_in() } else { None },
        is_book,
        is_brilliant,
        brilliant,
        phase,
        lines: ranked,
        motifs,
        explanation,
        classification,
        best_move,
    })
}

/// One classified ply of a game.
#[derive(Debug, Clone, Serialize)]
pub struct ClassifiedPly {
    pub move_number: u32,
    #[serde(serialize_with = "crate::util::serialize_color")]
    pub color: Color,
    pub san: String,
    pub uci: String,
    pub report: MoveReport,
}

/// A fully classified game with per-side statistics.
#[derive(Debug, Clone, Serialize)]
pub struct GameReport {
    pub plies: Vec<ClassifiedPly>,
    pub white: GameStats,
    pub black: GameStats,
}

/// Classifies every move of a parsed game in order. Cancellation is
/// checked between plies as well as inside each run.
pub async fn classify_game<O: Oracle>(
    oracle: &mut O,
    game: &GameRecord,
    options: &ClassifyOptions,
) -> Result<GameReport> {
    let mut plies = Vec::with_capacity(game.plies.len());
    let mut white = GameStats::default();
    let mut black = GameStats::default();

    for ply in &game.plies {
        ensure_live(&options.cancel)?;
        let report = classify_move(oracle, &ply.fen_before, &ply.uci, options).await?;

        let stats = match ply.color {
            Color::White => &mut white,
            Color::Black => &mut black,
        };
        stats.record(report.classification.tier, report.classification.cp_loss);

        plies.push(ClassifiedPly {
            move_number: ply.move_number,
            color: ply.color,
            san: ply.san.clone(),
            uci: ply.uci.clone(),
            report,
        });
    }

    Ok(GameReport { plies, white, black })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineLine;

    fn ranked(scores: &[i32]) -> Vec<RankedLine> {
        scores
            .iter()
            .map(|&cp| RankedLine {
                line: EngineLine {
                    pv: vec!["e2e4".to_string()],
                    evaluation: Evaluation::Cp(cp),
                    depth: 20,
                    nodes: 0,
                },
                root_score: cp,
            })
            .collect()
    }

    #[test]
    fn test_forced_detection() {
        assert!(is_forced(&ranked(&[350])));
        assert!(is_forced(&ranked(&[350, 100])));
        assert!(!is_forced(&ranked(&[350, 200])));
        assert!(!is_forced(&ranked(&[])));
    }

    #[test]
    fn test_book_heuristic() {
        let start = Chess::default();
        assert!(is_book_move(&start, "e2e4"));
        assert!(!is_book_move(&start, "a2a4"));

        // Out of the opening phase nothing is book
        let late = crate::util::position_from_fen(
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 20",
        )
        .unwrap();
        assert!(!is_book_move(&late, "e2e4"));
    }

    #[test]
    fn test_default_options() {
        let options = ClassifyOptions::new();
        assert_eq!(options.depth, 20);
        assert_eq!(options.epsilon, 10);
        assert!(options.detect_book);
        assert!(!options.skip_brilliant);
    }
}
