//! HTTP analysis backend oracle
//!
//! Talks to a remote engine service exposing a `/analyze` endpoint that
//! accepts a FEN plus search parameters and replies with JSON in the same
//! shape as [`PositionAnalysis`].

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use crate::error::{Error, Result};

use super::oracle::Oracle;
use super::types::{EngineLine, Evaluation, PositionAnalysis, SearchOptions, Wdl};

/// Oracle backed by a remote analysis server.
pub struct HttpOracle {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeResponse {
    #[serde(default)]
    evaluation: Option<Evaluation>,
    #[serde(default)]
    lines: Vec<EngineLine>,
    #[serde(default)]
    best_move: Option<String>,
    #[serde(default)]
    depth: u8,
    #[serde(default)]
    wdl: Option<Wdl>,
}

impl HttpOracle {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    async fn request(&self, fen: &str, options: &SearchOptions) -> Result<PositionAnalysis> {
        let url = format!("{}/analyze", self.base_url);

        let mut form = vec![
            ("fen", fen.to_string()),
            ("depth", options.depth.to_string()),
            ("multipv", options.multi_pv.max(1).to_string()),
        ];
        if let Some(ms) = options.movetime {
            form.push(("movetime", ms.to_string()));
        }
        if let Some(moves) = &options.search_moves {
            if !moves.is_empty() {
                form.push(("searchmoves", moves.join(" ")));
            }
        }

        let response = self.client.post(&url).form(&form).send().await?;

        if !response.status().is_success() {
            return Err(Error::OracleUnavailable(format!(
                "analysis backend returned {}",
                response.status()
            )));
        }

        let body: AnalyzeResponse = response.json().await?;

        let evaluation = body
            .evaluation
            .or_else(|| body.lines.first().map(|l| l.evaluation));
        let best_move = body
            .best_move
            .or_else(|| body.lines.first().and_then(|l| l.first_move().map(String::from)));

        Ok(PositionAnalysis {
            lines: body.lines,
            evaluation,
            best_move,
            depth: body.depth.max(options.depth),
            wdl: body.wdl,
        })
    }
}

impl Oracle for HttpOracle {
    fn analyze(
        &mut self,
        fen: &str,
        options: &SearchOptions,
    ) -> impl Future<Output = Result<PositionAnalysis>> + Send {
        self.request(fen, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_backend_response() {
        let body = r#"{
            "evaluation": {"type": "cp", "value": 31},
            "bestMove": "e2e4",
            "depth": 18,
            "lines": [
                {"pv": ["e2e4", "e7e5"], "evaluation": {"type": "cp", "value": 31}, "depth": 18},
                {"pv": ["d2d4"], "evaluation": {"type": "cp", "value": 25}, "depth": 18}
            ]
        }"#;

        let parsed: AnalyzeResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.evaluation, Some(Evaluation::Cp(31)));
        assert_eq!(parsed.best_move.as_deref(), Some("e2e4"));
        assert_eq!(parsed.lines.len(), 2);
        assert_eq!(parsed.lines[1].first_move(), Some("d2d4"));
    }

    #[test]
    fn test_decode_mate_line() {
        let body = r#"{
            "lines": [
                {"pv": ["d8h4"], "evaluation": {"type": "mate", "value": 1}, "depth": 12}
            ],
            "depth": 12
        }"#;

        let parsed: AnalyzeResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.lines[0].evaluation, Evaluation::Mate(1));
        assert!(parsed.best_move.is_none());
    }
}
