//! Error types for chess-classify-core

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("oracle unavailable: {0}")]
    OracleUnavailable(String),

    #[error("illegal move {mv} in position {fen}")]
    InvalidMove { mv: String, fen: String },

    #[error("oracle returned no lines for {0}")]
    NoLinesReturned(String),

    #[error("classification cancelled")]
    Cancelled,

    #[error("invalid FEN: {0}")]
    Fen(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("PGN parsing error: {0}")]
    Pgn(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
