//! FEN and UCI interchange helpers around shakmaty

use serde::Serializer;
use shakmaty::fen::Fen;
use shakmaty::san::San;
use shakmaty::uci::UciMove;
use shakmaty::{CastlingMode, Chess, Color, EnPassantMode, Move, Position};

use crate::error::{Error, Result};

/// Serde helper: renders a side as `"white"` or `"black"`.
pub fn serialize_color<S: Serializer>(color: &Color, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(if color.is_white() { "white" } else { "black" })
}

pub fn position_from_fen(fen: &str) -> Result<Chess> {
    let parsed: Fen = fen.parse().map_err(|e| Error::Fen(format!("{}: {}", fen, e)))?;
    parsed
        .into_position(CastlingMode::Standard)
        .map_err(|e| Error::Fen(format!("{}: {}", fen, e)))
}

pub fn fen_of(position: &Chess) -> String {
    Fen::from_position(position, EnPassantMode::Legal).to_string()
}

/// Resolves a UCI move string against a position, failing on illegal moves.
pub fn parse_uci_move(position: &Chess, uci: &str) -> Result<Move> {
    let invalid = || Error::InvalidMove {
        mv: uci.to_string(),
        fen: fen_of(position),
    };

    let parsed: UciMove = uci.parse().map_err(|_| invalid())?;
    parsed.to_move(position).map_err(|_| invalid())
}

/// Applies a UCI move, returning the resulting position. `None` on any
/// illegal or unparseable move; used by PV walks that truncate silently.
pub fn apply_uci(position: &Chess, uci: &str) -> Option<Chess> {
    let parsed: UciMove = uci.parse().ok()?;
    let mv = parsed.to_move(position).ok()?;
    position.clone().play(mv).ok()
}

pub fn move_to_uci(mv: &Move) -> String {
    mv.to_uci(CastlingMode::Standard).to_string()
}

/// SAN rendering of a UCI move in a given position, when it is legal there.
pub fn uci_to_san(position: &Chess, uci: &str) -> Option<String> {
    let parsed: UciMove = uci.parse().ok()?;
    let mv = parsed.to_move(position).ok()?;
    Some(San::from_move(position, mv).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const START: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    #[test]
    fn test_fen_round_trip() {
        let pos = position_from_fen(START).unwrap();
        assert_eq!(fen_of(&pos), START);
    }

    #[test]
    fn test_parse_uci_move_legal() {
        let pos = position_from_fen(START).unwrap();
        let mv = parse_uci_move(&pos, "e2e4").unwrap();
        assert_eq!(move_to_uci(&mv), "e2e4");
    }

    #[test]
    fn test_parse_uci_move_illegal() {
        let pos = position_from_fen(START).unwrap();
        assert!(matches!(
            parse_uci_move(&pos, "e2e5"),
            Err(Error::InvalidMove { .. })
        ));
    }

    #[test]
    fn test_apply_uci_silent_on_garbage() {
        let pos = position_from_fen(START).unwrap();
        assert!(apply_uci(&pos, "zz99").is_none());
        assert!(apply_uci(&pos, "e7e5").is_none());

        let after = apply_uci(&pos, "e2e4").unwrap();
        assert!(fen_of(&after).starts_with("rnbqkbnr/pppppppp/8/8/4P3"));
    }

    #[test]
    fn test_uci_to_san() {
        let pos = position_from_fen(START).unwrap();
        assert_eq!(uci_to_san(&pos, "g1f3").as_deref(), Some("Nf3"));
        assert_eq!(uci_to_san(&pos, "e2e4").as_deref(), Some("e4"));
    }
}
