//! Evaluation stability along a principal variation
//!
//! A sacrifice that only looks good at the horizon will drift as the line is
//! actually played out. Re-evaluating a few plies deep and bounding the
//! drift filters those out.

use serde::Serialize;
use shakmaty::Position;
use tracing::debug;

use crate::engine::{CancelToken, Oracle, SearchOptions};
use crate::error::{Error, Result};
use crate::score::eval_for_root;
use crate::util::{apply_uci, fen_of, position_from_fen};

use super::config::BrilliantConfig;

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct StabilityResult {
    pub is_stable: bool,
    pub max_drift: i32,
    pub plies_checked: u32,
}

/// Walks up to `stability_plies` of `pv` from `fen_before`, re-evaluating
/// after each ply and measuring the worst drift from the initial score, both
/// normalized to the side to move at `fen_before`.
///
/// An illegal or unparseable move truncates the walk without error.
/// Exits early once drift exceeds twice the threshold. The cancel token is
/// checked before every search the walk issues.
pub async fn check_stability<O: Oracle>(
    oracle: &mut O,
    fen_before: &str,
    pv: &[String],
    depth: u8,
    cancel: &CancelToken,
    config: &BrilliantConfig,
) -> Result<StabilityResult> {
    let mut position = position_from_fen(fen_before)?;
    let root = position.turn();

    let options = SearchOptions::depth(depth);
    if cancel.is_cancelled() {
        return Err(Error::Cancelled);
    }
    let initial = oracle.analyze(fen_before, &options).await?;
    let initial_score = eval_for_root(root, root, initial.evaluation);

    let mut max_drift = 0;
    let mut plies_checked = 0;

    for mv in pv.iter().take(config.stability_plies) {
        match apply_uci(&position, mv) {
            Some(next) => position = next,
            None => {
                debug!(uci = mv.as_str(), "stability walk truncated at illegal move");
                break;
            }
        }
        plies_checked += 1;

        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        let analysis = oracle.analyze(&fen_of(&position), &options).await?;
        let score = eval_for_root(root, position.turn(), analysis.evaluation);
        max_drift = max_drift.max((score - initial_score).abs());

        // Twice the threshold settles the question
        if max_drift > config.stability_drift_cp * 2 {
            break;
        }
    }

    Ok(StabilityResult {
        is_stable: max_drift <= config.stability_drift_cp,
        max_drift,
        plies_checked,
    })
}
