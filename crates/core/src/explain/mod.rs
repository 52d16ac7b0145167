//! Natural-language explanations for classified moves

mod motifs;

pub use motifs::{detect_motifs, primary_motif, Motif, MotifKind};

use serde::Serialize;

use crate::classify::{Classification, Tier};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExplainCategory {
    Tactical,
    Positional,
    Defensive,
    Critical,
    Opening,
    Endgame,
    General,
}

#[derive(Debug, Clone, Serialize)]
pub struct Explanation {
    /// One-line summary shown next to the move
    pub reason: String,
    pub category: ExplainCategory,
    /// Longer text expanding on the reason
    pub detailed: String,
    /// The move that should have been played, for the bad tiers
    pub better_move: Option<String>,
    pub motifs: Vec<Motif>,
}

/// Builds the explanation for a classified move from its tier and the
/// detected motifs. Deterministic template lookup, no oracle involved.
pub fn explain(
    classification: &Classification,
    motifs: Vec<Motif>,
    best_move_san: Option<&str>,
) -> Explanation {
    let primary = primary_motif(&motifs);
    let better = best_move_san.map(String::from);

    let (reason, category, detailed) = match classification.tier {
        Tier::Brilliant => (
            "A brilliant sacrifice".to_string(),
            ExplainCategory::Tactical,
            "This move gives up material for a decisive advantage the engine confirms. \
             The opponent has no good way to refuse or refute it."
                .to_string(),
        ),
        Tier::Great => (
            "A great move".to_string(),
            ExplainCategory::Tactical,
            "A difficult move that keeps the position firmly under control.".to_string(),
        ),
        Tier::Book => (
            "A book move".to_string(),
            ExplainCategory::Opening,
            "Established opening theory. Development and the center stay on track.".to_string(),
        ),
        Tier::Best => (
            "The best move".to_string(),
            ExplainCategory::General,
            "This matches the engine's top choice in this position.".to_string(),
        ),
        Tier::Excellent => (
            "An excellent move".to_string(),
            ExplainCategory::Positional,
            "Very close to the engine's first choice; the difference is negligible.".to_string(),
        ),
        Tier::Good => (
            "A good move".to_string(),
            ExplainCategory::Positional,
            "A sound continuation that gives up only a little of the position's potential."
                .to_string(),
        ),
        Tier::Miss => {
            let detailed = match better {
                Some(ref mv) => format!(
                    "A strong opportunity slipped by. {} kept a much larger advantage.",
                    mv
                ),
                None => "A strong opportunity slipped by.".to_string(),
            };
            ("A missed chance".to_string(), ExplainCategory::Critical, detailed)
        }
        Tier::Inaccuracy => (
            "An inaccuracy".to_string(),
            ExplainCategory::Positional,
            "Slightly imprecise. The position gets harder to play from here.".to_string(),
        ),
        Tier::Mistake => {
            let detailed = match primary {
                Some(m) => format!("This move {}.", m.description),
                None => "This concedes a significant part of the advantage.".to_string(),
            };
            ("A mistake".to_string(), ExplainCategory::Critical, detailed)
        }
        Tier::Blunder => {
            let detailed = match primary {
                Some(m) => format!("This move {}.", m.description),
                None => "This move throws away the game's balance.".to_string(),
            };
            ("A blunder".to_string(), ExplainCategory::Critical, detailed)
        }
    };

    // A concrete motif sharpens the one-liner for the error tiers
    let reason = match (classification.tier.is_bad(), primary) {
        (true, Some(m)) if m.kind == MotifKind::AllowsMate => {
            format!("{}, it {}", reason, m.description)
        }
        (true, Some(m)) if m.kind == MotifKind::HangingPiece => {
            format!("{}, it {}", reason, m.description)
        }
        _ => reason,
    };

    Explanation {
        reason,
        category,
        detailed,
        better_move: better,
        motifs,
    }
}
