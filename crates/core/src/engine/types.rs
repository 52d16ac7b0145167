//! Types shared by every oracle implementation

use std::fmt;

use serde::{Deserialize, Serialize};

/// A position judgment from the engine, always relative to the side to move
/// at the node that was searched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Evaluation {
    /// Centipawn score (positive = side to move is better)
    Cp(i32),
    /// Moves to forced mate (positive = side to move mates)
    Mate(i32),
}

impl Evaluation {
    pub fn is_mate(&self) -> bool {
        matches!(self, Evaluation::Mate(_))
    }

    /// Mate distance in moves, if this is a mate score.
    pub fn mate_in(&self) -> Option<u32> {
        match self {
            Evaluation::Mate(m) => Some(m.unsigned_abs()),
            Evaluation::Cp(_) => None,
        }
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Evaluation::Cp(cp) => {
                let score = *cp as f32 / 100.0;
                if score >= 0.0 {
                    write!(f, "+{:.2}", score)
                } else {
                    write!(f, "{:.2}", score)
                }
            }
            Evaluation::Mate(moves) => write!(f, "M{}", moves),
        }
    }
}

/// Win/draw/loss probabilities in permille, side-to-move perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wdl {
    pub win: u32,
    pub draw: u32,
    pub loss: u32,
}

impl Wdl {
    /// Win probability for the side to move, 0.0..=1.0.
    pub fn win_probability(&self) -> f64 {
        self.win as f64 / 1000.0
    }

    /// Win probability for the side that is *not* to move.
    pub fn loss_probability(&self) -> f64 {
        self.loss as f64 / 1000.0
    }
}

/// One candidate continuation from a MultiPV search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineLine {
    /// Principal variation as UCI move strings
    pub pv: Vec<String>,
    pub evaluation: Evaluation,
    pub depth: u8,
    #[serde(default)]
    pub nodes: u64,
}

impl EngineLine {
    /// The first move of the line, if the engine reported one.
    pub fn first_move(&self) -> Option<&str> {
        self.pv.first().map(String::as_str)
    }
}

/// Complete result of one oracle search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionAnalysis {
    /// Candidate lines, best first as reported by the engine
    pub lines: Vec<EngineLine>,
    /// Evaluation of the top line
    pub evaluation: Option<Evaluation>,
    /// Best move found, if any
    pub best_move: Option<String>,
    /// Depth reached
    pub depth: u8,
    /// Win/draw/loss probabilities, when the engine reports them
    #[serde(default)]
    pub wdl: Option<Wdl>,
}

impl PositionAnalysis {
    pub fn summary(&self) -> String {
        format!(
            "Eval: {} | Best: {} | Depth: {} | Lines: {}",
            self.evaluation
                .map(|e| e.to_string())
                .unwrap_or_else(|| "?".into()),
            self.best_move.as_deref().unwrap_or("?"),
            self.depth,
            self.lines.len()
        )
    }
}

/// Parameters for one oracle search.
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    pub depth: u8,
    pub multi_pv: u8,
    /// Restrict the search to exactly these moves (UCI `searchmoves`)
    pub search_moves: Option<Vec<String>>,
    /// Time budget in milliseconds, used instead of depth when set
    pub movetime: Option<u64>,
}

impl SearchOptions {
    pub fn depth(depth: u8) -> Self {
        SearchOptions {
            depth,
            multi_pv: 1,
            ..Default::default()
        }
    }

    pub fn multi_pv(mut self, n: u8) -> Self {
        self.multi_pv = n;
        self
    }

    pub fn search_moves(mut self, moves: Vec<String>) -> Self {
        self.search_moves = Some(moves);
        self
    }

    pub fn movetime(mut self, ms: u64) -> Self {
        self.movetime = Some(ms);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluation_display() {
        assert_eq!(Evaluation::Cp(35).to_string(), "+0.35");
        assert_eq!(Evaluation::Cp(-250).to_string(), "-2.50");
        assert_eq!(Evaluation::Mate(3).to_string(), "M3");
        assert_eq!(Evaluation::Mate(-2).to_string(), "M-2");
    }

    #[test]
    fn test_mate_in() {
        assert_eq!(Evaluation::Mate(-4).mate_in(), Some(4));
        assert_eq!(Evaluation::Cp(100).mate_in(), None);
    }

    #[test]
    fn test_evaluation_serde_wire_format() {
        let eval: Evaluation = serde_json::from_str(r#"{"type":"cp","value":42}"#).unwrap();
        assert_eq!(eval, Evaluation::Cp(42));

        let eval: Evaluation = serde_json::from_str(r#"{"type":"mate","value":-3}"#).unwrap();
        assert_eq!(eval, Evaluation::Mate(-3));
    }
}
