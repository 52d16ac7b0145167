//! PGN parsing into per-ply classification inputs

use std::fs;
use std::io::Cursor;
use std::ops::ControlFlow;
use std::path::Path;

use pgn_reader::{RawTag, SanPlus, Skip, Visitor};
use shakmaty::{Chess, Color, Position};

use crate::error::{Error, Result};
use crate::util::{fen_of, move_to_uci};

/// One played half-move with the position it was played in, ready to feed
/// the classifier.
#[derive(Debug, Clone)]
pub struct PlyRecord {
    pub move_number: u32,
    pub color: Color,
    pub san: String,
    pub uci: String,
    /// FEN of the position before the move
    pub fen_before: String,
}

/// A parsed game: headers plus the replayable move list.
#[derive(Debug, Clone)]
pub struct GameRecord {
    pub event: Option<String>,
    pub site: Option<String>,
    pub date: Option<String>,
    pub white: Option<String>,
    pub black: Option<String>,
    pub result: Option<String>,
    pub white_elo: Option<u16>,
    pub black_elo: Option<u16>,
    pub plies: Vec<PlyRecord>,
    pub final_position: Chess,
}

impl GameRecord {
    pub fn ply_count(&self) -> usize {
        self.plies.len()
    }

    pub fn summary(&self) -> String {
        let white = self.white.as_deref().unwrap_or("Unknown");
        let black = self.black.as_deref().unwrap_or("Unknown");
        let result = self.result.as_deref().unwrap_or("*");
        format!("{} vs {} - {}", white, black, result)
    }
}

#[derive(Default)]
struct GameTags {
    event: Option<String>,
    site: Option<String>,
    date: Option<String>,
    white: Option<String>,
    black: Option<String>,
    result: Option<String>,
    white_elo: Option<u16>,
    black_elo: Option<u16>,
}

struct GameMoves {
    tags: GameTags,
    plies: Vec<PlyRecord>,
    current_position: Chess,
    success: bool,
}

struct GameParser;

impl Visitor for GameParser {
    type Tags = GameTags;
    type Movetext = GameMoves;
    type Output = Option<GameRecord>;

    fn begin_tags(&mut self) -> ControlFlow<Self::Output, Self::Tags> {
        ControlFlow::Continue(GameTags::default())
    }

    fn tag(
        &mut self,
        tags: &mut Self::Tags,
        name: &[u8],
        value: RawTag<'_>,
    ) -> ControlFlow<Self::Output> {
        let name_str = String::from_utf8_lossy(name);
        let value_str = value.decode_utf8_lossy().to_string();

        match name_str.as_ref() {
            "Event" => tags.event = Some(value_str),
            "Site" => tags.site = Some(value_str),
            "Date" => tags.date = Some(value_str),
            "White" => tags.white = Some(value_str),
            "Black" => tags.black = Some(value_str),
            "Result" => tags.result = Some(value_str),
            "WhiteElo" => tags.white_elo = value_str.parse().ok(),
            "BlackElo" => tags.black_elo = value_str.parse().ok(),
            _ => {}
        }

        ControlFlow::Continue(())
    }

    fn begin_movetext(&mut self, tags: Self::Tags) -> ControlFlow<Self::Output, Self::Movetext> {
        ControlFlow::Continue(GameMoves {
            tags,
            plies: Vec::new(),
            current_position: Chess::default(),
            success: true,
        })
    }

    fn san(&mut self, movetext: &mut Self::Movetext, san: SanPlus) -> ControlFlow<Self::Output> {
        if !movetext.success {
            return ControlFlow::Continue(());
        }

        let position = &movetext.current_position;
        match san.san.to_move(position) {
            Ok(m) => {
                let record = PlyRecord {
                    move_number: position.fullmoves().get(),
                    color: position.turn(),
                    san: san.to_string(),
                    uci: move_to_uci(&m),
                    fen_before: fen_of(position),
                };
                match movetext.current_position.clone().play(m) {
                    Ok(new_pos) => {
                        movetext.plies.push(record);
                        movetext.current_position = new_pos;
                    }
                    Err(_) => {
                        movetext.success = false;
                    }
                }
            }
            Err(_) => {
                movetext.success = false;
            }
        }

        ControlFlow::Continue(())
    }

    fn begin_variation(
        &mut self,
        _movetext: &mut Self::Movetext,
    ) -> ControlFlow<Self::Output, Skip> {
        ControlFlow::Continue(Skip(true))
    }

    fn end_game(&mut self, movetext: Self::Movetext) -> Self::Output {
        if movetext.success {
            Some(GameRecord {
                event: movetext.tags.event,
                site: movetext.tags.site,
                date: movetext.tags.date,
                white: movetext.tags.white,
                black: movetext.tags.black,
                result: movetext.tags.result,
                white_elo: movetext.tags.white_elo,
                black_elo: movetext.tags.black_elo,
                plies: movetext.plies,
                final_position: movetext.current_position,
            })
        } else {
            None
        }
    }
}

pub fn parse_pgn_file<P: AsRef<Path>>(path: P) -> Result<Vec<GameRecord>> {
    let contents = fs::read_to_string(path)?;
    parse_pgn_string(&contents)
}

pub fn parse_pgn_string(pgn: &str) -> Result<Vec<GameRecord>> {
    let mut parser = GameParser;
    let mut games: Vec<GameRecord> = Vec::new();

    let cursor = Cursor::new(pgn.as_bytes());
    let mut reader = pgn_reader::Reader::new(cursor);

    loop {
        match reader.read_game(&mut parser) {
            Ok(Some(maybe_game)) => {
                if let Some(game) = maybe_game {
                    games.push(game);
                }
            }
            Ok(None) => break,
            Err(e) => return Err(Error::Pgn(e.to_string())),
        }
    }

    if games.is_empty() {
        return Err(Error::Pgn("no valid games found".to_string()));
    }
    Ok(games)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_PGN: &str = r#"[Event "Test"]
[White "Alice"]
[Black "Bob"]
[Result "1-0"]

1. e4 e5 2. Nf3 Nc6 3. Bb5 1-0
"#;

    #[test]
    fn test_parse_single_game() {
        let games = parse_pgn_string(SAMPLE_PGN).unwrap();
        assert_eq!(games.len(), 1);

        let game = &games[0];
        assert_eq!(game.white.as_deref(), Some("Alice"));
        assert_eq!(game.black.as_deref(), Some("Bob"));
        assert_eq!(game.result.as_deref(), Some("1-0"));
        assert_eq!(game.ply_count(), 5);
        assert_eq!(game.summary(), "Alice vs Bob - 1-0");
    }

    #[test]
    fn test_ply_records_carry_positions() {
        let games = parse_pgn_string(SAMPLE_PGN).unwrap();
        let plies = &games[0].plies;

        assert_eq!(plies[0].uci, "e2e4");
        assert_eq!(plies[0].san, "e4");
        assert_eq!(plies[0].color, Color::White);
        assert_eq!(plies[0].move_number, 1);
        assert!(plies[0].fen_before.starts_with("rnbqkbnr/pppppppp"));

        assert_eq!(plies[1].uci, "e7e5");
        assert_eq!(plies[1].color, Color::Black);
        assert_eq!(plies[1].move_number, 1);

        assert_eq!(plies[4].uci, "f1b5");
        assert_eq!(plies[4].san, "Bb5");
        assert_eq!(plies[4].move_number, 3);
        // The record holds the position the move was played in
        assert!(plies[4].fen_before.contains(" w "));
    }

    #[test]
    fn test_illegal_movetext_is_dropped() {
        let pgn = r#"[Event "Broken"]

1. e4 e5 2. Ke2 Ke7 3. Qxd8 1-0
"#;
        assert!(parse_pgn_string(pgn).is_err());
    }

    #[test]
    fn test_variations_are_skipped() {
        let pgn = r#"[Event "Var"]

1. e4 (1. d4 d5) 1... e5 2. Nf3 1-0
"#;
        let games = parse_pgn_string(pgn).unwrap();
        assert_eq!(games[0].ply_count(), 3);
    }
}
