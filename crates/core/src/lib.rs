//! Move classification core library
//!
//! Takes a position, a candidate move, and an engine oracle, and produces a
//! quality tier (brilliant through blunder), a centipawn-loss figure, and a
//! natural-language explanation. The engine is consumed through the
//! [`engine::Oracle`] trait; UCI subprocess and HTTP backends are provided.

pub mod brilliant;
pub mod classify;
pub mod engine;
pub mod error;
pub mod explain;
pub mod parser;
pub mod phase;
pub mod score;
pub mod util;

pub use brilliant::{BrilliantAnalysis, BrilliantConfig};
pub use classify::{
    classify_game, classify_move, ClassifyOptions, GameReport, MoveReport, Tier,
};
pub use engine::{CancelToken, HttpOracle, Oracle, UciOracle};
pub use error::{Error, Result};
pub use parser::{parse_pgn_file, parse_pgn_string, GameRecord};
pub use phase::{game_phase, position_info, GamePhase, PositionInfo};
