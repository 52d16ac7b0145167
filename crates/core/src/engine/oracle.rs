//! The oracle abstraction consumed by the classification pipeline

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::Result;

use super::types::{PositionAnalysis, SearchOptions};

/// An external chess engine that evaluates positions on demand.
///
/// Every call takes the position as an explicit FEN argument; implementations
/// must not keep an implicit "current position". A failed or timed-out search
/// surfaces as an error, never as a silent zero evaluation.
pub trait Oracle {
    /// Search `fen` with the given parameters and return the engine's
    /// judgment. When `options.search_moves` names a single move, the
    /// returned evaluation reflects exactly that move's outcome.
    fn analyze(
        &mut self,
        fen: &str,
        options: &SearchOptions,
    ) -> impl std::future::Future<Output = Result<PositionAnalysis>> + Send;
}

/// Cooperative cancellation flag shared between a classification run and its
/// caller. Checked before each oracle call; never interrupts one mid-flight.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_token() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());

        let clone = token.clone();
        clone.cancel();
        assert!(token.is_cancelled());
    }
}
