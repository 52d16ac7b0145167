//! Tactical motif detection by diffing positions
//!
//! Advisory only: the detectors here feed explanation text, never a numeric
//! gate, and may both over- and under-report.

use serde::Serialize;
use shakmaty::{Chess, Color, Position, Role, Square};

use crate::brilliant::piece_value;
use crate::util::apply_uci;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MotifKind {
    /// The mover left one of their own pieces attacked and undefended
    HangingPiece,
    /// A profitable capture was available and not taken
    MissedCapture,
    /// The move lets the opponent mate in one
    AllowsMate,
    /// The move threatens mate in one
    MateThreat,
}

impl MotifKind {
    /// Lower is more important when choosing the primary motif.
    fn priority(&self) -> u8 {
        match self {
            MotifKind::HangingPiece => 0,
            MotifKind::MissedCapture => 1,
            MotifKind::AllowsMate => 2,
            MotifKind::MateThreat => 3,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Motif {
    pub kind: MotifKind,
    /// Square the motif is about, when it has one
    pub square: Option<String>,
    pub piece: Option<String>,
    pub description: String,
}

fn role_name(role: Role) -> &'static str {
    match role {
        Role::Pawn => "pawn",
        Role::Knight => "knight",
        Role::Bishop => "bishop",
        Role::Rook => "rook",
        Role::Queen => "queen",
        Role::King => "king",
    }
}

/// Squares holding `side` pieces that are attacked and have no defender.
/// The king is never reported; it cannot be captured.
fn hanging_squares(position: &Chess, side: Color) -> Vec<(Square, Role)> {
    let board = position.board();
    let occupied = board.occupied();
    let mut hanging = Vec::new();

    for square in board.by_color(side) {
        let Some(piece) = board.piece_at(square) else {
            continue;
        };
        if piece.role == Role::King {
            continue;
        }

        let attackers = board.attacks_to(square, !side, occupied);
        let defenders = board.attacks_to(square, side, occupied);
        if attackers.any() && defenders.is_empty() {
            hanging.push((square, piece.role));
        }
    }

    hanging
}

/// Best capture available to the side to move, by captured piece value.
fn best_capture(position: &Chess) -> Option<(String, Role)> {
    position
        .legal_moves()
        .iter()
        .filter_map(|mv| {
            let captured = mv.capture()?;
            Some((crate::util::move_to_uci(mv), captured, piece_value(captured)))
        })
        .max_by_key(|(_, _, value)| *value)
        .map(|(uci, role, _)| (uci, role))
}

/// The same board with the other side to move, or `None` when passing the
/// turn is not a legal state (side to move giving check, en passant).
fn swap_side(position: &Chess) -> Option<Chess> {
    let fen = crate::util::fen_of(position);
    let mut fields: Vec<&str> = fen.split(' ').collect();
    if fields.len() < 4 {
        return None;
    }
    fields[1] = if fields[1] == "w" { "b" } else { "w" };
    fields[3] = "-";
    crate::util::position_from_fen(&fields.join(" ")).ok()
}

/// True when the side to move has a mate in one.
fn has_mate_in_one(position: &Chess) -> bool {
    position.legal_moves().iter().any(|mv| {
        position
            .clone()
            .play(mv.clone())
            .map(|next| next.is_checkmate())
            .unwrap_or(false)
    })
}

/// Diffs the positions around a move and reports what the move gave up or
/// threatened. `before` is the position the move was played in.
pub fn detect_motifs(before: &Chess, uci: &str) -> Vec<Motif> {
    let mover = before.turn();
    let Some(after) = apply_uci(before, uci) else {
        return Vec::new();
    };

    let mut motifs = Vec::new();

    // Pieces the move left en prise, ignoring ones already hanging before
    let hanging_before = hanging_squares(before, mover);
    for (square, role) in hanging_squares(&after, mover) {
        if hanging_before.iter().any(|(s, _)| *s == square) {
            continue;
        }
        motifs.push(Motif {
            kind: MotifKind::HangingPiece,
            square: Some(square.to_string()),
            piece: Some(role_name(role).to_string()),
            description: format!("leaves the {} on {} undefended", role_name(role), square),
        });
    }

    // A capture that was on the table and declined
    if let Some((capture_uci, victim)) = best_capture(before) {
        if capture_uci != uci && piece_value(victim) >= 300 {
            motifs.push(Motif {
                kind: MotifKind::MissedCapture,
                square: capture_uci.get(2..4).map(String::from),
                piece: Some(role_name(victim).to_string()),
                description: format!("a {} could have been captured", role_name(victim)),
            });
        }
    }

    // Mate in one for the opponent after the move
    if has_mate_in_one(&after) {
        motifs.push(Motif {
            kind: MotifKind::AllowsMate,
            square: None,
            piece: None,
            description: "allows a mate in one".to_string(),
        });
    }

    // Mate threat: the mover would mate in one if allowed to move again.
    // Approximated with a null move; impossible while the opponent is in
    // check, in which case no threat is reported.
    if let Some(null_moved) = swap_side(&after) {
        if has_mate_in_one(&null_moved) {
            motifs.push(Motif {
                kind: MotifKind::MateThreat,
                square: None,
                piece: None,
                description: "threatens mate in one".to_string(),
            });
        }
    }

    motifs.sort_by_key(|m| m.kind.priority());
    motifs
}

/// The motif that should drive the explanation template, if any.
pub fn primary_motif(motifs: &[Motif]) -> Option<&Motif> {
    motifs.first()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::position_from_fen;

    #[test]
    fn test_quiet_opening_move_has_no_motifs() {
        let pos = Chess::default();
        assert!(detect_motifs(&pos, "e2e4").is_empty());
    }

    #[test]
    fn test_hanging_queen_detected() {
        // White queen steps to h5 where only the g6 pawn attacks it
        let pos = position_from_fen("rnbqkbnr/pppppp1p/6p1/8/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2")
            .unwrap();
        let motifs = detect_motifs(&pos, "d1h5");

        let hanging: Vec<_> = motifs
            .iter()
            .filter(|m| m.kind == MotifKind::HangingPiece)
            .collect();
        assert_eq!(hanging.len(), 1);
        assert_eq!(hanging[0].square.as_deref(), Some("h5"));
        assert_eq!(hanging[0].piece.as_deref(), Some("queen"));
    }

    #[test]
    fn test_missed_capture_detected() {
        // Black queen sits on e4 where the d3 pawn can take it; white
        // plays something else
        let pos =
            position_from_fen("rnb1kbnr/pppp1ppp/8/8/4q3/3P4/PPP1PPPP/RNBQKBNR w KQkq - 0 3")
                .unwrap();
        let motifs = detect_motifs(&pos, "g1f3");

        assert!(motifs
            .iter()
            .any(|m| m.kind == MotifKind::MissedCapture && m.piece.as_deref() == Some("queen")));
    }

    #[test]
    fn test_allows_mate_detected() {
        // After g2g4 black mates with Qh4
        let pos =
            position_from_fen("rnbqkbnr/pppp1ppp/8/4p3/8/5P2/PPPPP1PP/RNBQKBNR w KQkq - 0 2")
                .unwrap();
        let motifs = detect_motifs(&pos, "g2g4");

        assert!(motifs.iter().any(|m| m.kind == MotifKind::AllowsMate));
    }

    #[test]
    fn test_primary_motif_priority() {
        let motifs = vec![
            Motif {
                kind: MotifKind::MissedCapture,
                square: None,
                piece: None,
                description: String::new(),
            },
            Motif {
                kind: MotifKind::HangingPiece,
                square: None,
                piece: None,
                description: String::new(),
            },
        ];
        let mut sorted = motifs;
        sorted.sort_by_key(|m| m.kind.priority());
        assert_eq!(primary_motif(&sorted).unwrap().kind, MotifKind::HangingPiece);
    }
}
