//! Reply uniqueness: how many good options does the opponent keep?

use serde::Serialize;
use shakmaty::Position;
use tracing::warn;

use crate::engine::{Oracle, SearchOptions};
use crate::error::Result;
use crate::score::rank_lines;
use crate::util::position_from_fen;

use super::config::BrilliantConfig;

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct UniquenessResult {
    /// Replies scoring within the epsilon band of the opponent's best
    pub good_replies: u32,
    /// Score gap between the best and second-best reply, 0 with one line
    pub gap_to_second: i32,
    pub is_unique: bool,
}

/// Counts the opponent's good replies in the position after the candidate
/// move. Lines are ranked from the opponent's own perspective, since the
/// question is how many decent options the opponent keeps.
///
/// No lines from the oracle yields `is_unique = false`. Absence of data must
/// never read as "very unique".
pub async fn evaluate_uniqueness<O: Oracle>(
    oracle: &mut O,
    fen_after: &str,
    depth: u8,
    config: &BrilliantConfig,
) -> Result<UniquenessResult> {
    let opponent = position_from_fen(fen_after)?.turn();

    let options = SearchOptions::depth(depth).multi_pv(config.root_multipv);
    let analysis = oracle.analyze(fen_after, &options).await?;

    let ranked = rank_lines(analysis.lines, opponent);
    if ranked.is_empty() {
        warn!(fen = fen_after, "no reply lines, failing uniqueness closed");
        return Ok(UniquenessResult::default());
    }

    let best = ranked[0].root_score;
    let good_replies = ranked
        .iter()
        .filter(|line| best - line.root_score <= config.uniqueness_reply_eps)
        .count() as u32;
    let gap_to_second = ranked.get(1).map(|l| best - l.root_score).unwrap_or(0);

    Ok(UniquenessResult {
        good_replies,
        gap_to_second,
        is_unique: good_replies <= config.uniqueness_max_good_replies,
    })
}
