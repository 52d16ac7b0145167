//! Oracle interfaces and implementations
//!
//! The classification pipeline only depends on the [`Oracle`] trait; the UCI
//! subprocess and HTTP backends are interchangeable behind it.

mod http;
mod oracle;
mod types;
mod uci;

pub use http::HttpOracle;
pub use oracle::{CancelToken, Oracle};
pub use types::{EngineLine, Evaluation, PositionAnalysis, SearchOptions, Wdl};
pub use uci::UciOracle;
