//! Game phase detection and basic position facts

use serde::Serialize;
use shakmaty::{Chess, Color, Position};

/// Move number at or below which a position can still count as opening.
const OPENING_MOVE_MAX: u32 = 8;
/// Minimum pieces on the board for the opening phase.
const OPENING_PIECE_MIN: u32 = 30;
/// Maximum pieces on the board for the endgame phase.
const ENDGAME_PIECE_MAX: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GamePhase {
    Opening,
    Middlegame,
    Endgame,
}

/// Classifies the phase from piece count and fullmove number.
pub fn game_phase(position: &Chess) -> GamePhase {
    let pieces = piece_count(position);
    let move_number = position.fullmoves().get();

    if move_number <= OPENING_MOVE_MAX && pieces >= OPENING_PIECE_MIN {
        GamePhase::Opening
    } else if pieces <= ENDGAME_PIECE_MAX {
        GamePhase::Endgame
    } else {
        GamePhase::Middlegame
    }
}

pub fn piece_count(position: &Chess) -> u32 {
    position.board().occupied().count() as u32
}

/// True while opening theory can plausibly apply. Used by the legacy book
/// heuristic: very early game with all or nearly all pieces still on.
pub fn is_opening_phase(position: &Chess) -> bool {
    game_phase(position) == GamePhase::Opening
}

/// Basic facts about a position, independent of any engine.
#[derive(Debug)]
pub struct PositionInfo {
    pub piece_count: u32,
    pub legal_move_count: u32,
    pub side_to_move: Color,
    pub is_check: bool,
    pub is_checkmate: bool,
    pub is_stalemate: bool,
}

pub fn position_info(position: &Chess) -> PositionInfo {
    PositionInfo {
        piece_count: piece_count(position),
        legal_move_count: position.legal_moves().len() as u32,
        side_to_move: position.turn(),
        is_check: position.is_check(),
        is_checkmate: position.is_checkmate(),
        is_stalemate: position.is_stalemate(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::position_from_fen;

    #[test]
    fn test_starting_position_is_opening() {
        let pos = Chess::default();
        assert_eq!(game_phase(&pos), GamePhase::Opening);
        assert!(is_opening_phase(&pos));
    }

    #[test]
    fn test_starting_position_info() {
        let info = position_info(&Chess::default());
        assert_eq!(info.piece_count, 32);
        assert_eq!(info.legal_move_count, 20);
        assert_eq!(info.side_to_move, Color::White);
        assert!(!info.is_check);
    }

    #[test]
    fn test_late_move_number_leaves_opening() {
        // Full material but move 20: middlegame
        let pos =
            position_from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 20").unwrap();
        assert_eq!(game_phase(&pos), GamePhase::Middlegame);
    }

    #[test]
    fn test_sparse_board_is_endgame() {
        let pos = position_from_fen("8/5k2/8/8/8/3K4/4P3/8 w - - 0 50").unwrap();
        assert_eq!(game_phase(&pos), GamePhase::Endgame);
    }
}
