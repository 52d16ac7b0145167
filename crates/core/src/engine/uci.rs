//! UCI chess engine oracle
//!
//! Spawns a UCI engine (Stockfish by default) as a subprocess and drives it
//! over stdin/stdout. Implements [`Oracle`] so the classification pipeline
//! can use a local engine directly.

use std::future::Future;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::Duration;

use crate::error::{Error, Result};

use super::oracle::Oracle;
use super::types::{EngineLine, Evaluation, PositionAnalysis, SearchOptions, Wdl};

/// Subprocess UCI engine handle.
pub struct UciOracle {
    process: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    initialized: bool,
}

impl UciOracle {
    /// Spawns the engine and completes the UCI handshake.
    ///
    /// # Arguments
    /// * `path` - Path to the engine binary (or "stockfish" if in PATH)
    pub fn new(path: &str) -> Result<Self> {
        let mut process = Command::new(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| Error::OracleUnavailable(format!("failed to start engine: {}", e)))?;

        let stdin = process
            .stdin
            .take()
            .ok_or_else(|| Error::OracleUnavailable("failed to open stdin".into()))?;

        let stdout = process
            .stdout
            .take()
            .ok_or_else(|| Error::OracleUnavailable("failed to open stdout".into()))?;

        let mut engine = UciOracle {
            process,
            stdin,
            stdout: BufReader::new(stdout),
            initialized: false,
        };

        engine.init_uci()?;
        Ok(engine)
    }

    fn send(&mut self, cmd: &str) -> Result<()> {
        writeln!(self.stdin, "{}", cmd)?;
        self.stdin.flush()?;
        Ok(())
    }

    fn read_line(&mut self) -> Result<String> {
        let mut line = String::new();
        let n = self.stdout.read_line(&mut line)?;
        if n == 0 {
            return Err(Error::OracleUnavailable("engine closed its pipe".into()));
        }
        Ok(line.trim().to_string())
    }

    fn read_until(&mut self, expected: &str) -> Result<Vec<String>> {
        let mut lines = Vec::new();
        loop {
            let line = self.read_line()?;
            let done = line.starts_with(expected);
            lines.push(line);
            if done {
                break;
            }
        }
        Ok(lines)
    }

    fn init_uci(&mut self) -> Result<()> {
        self.send("uci")?;
        self.read_until("uciok")?;

        // WDL output feeds the non-triviality gate when the engine supports it
        self.send("setoption name UCI_ShowWDL value true")?;

        self.send("isready")?;
        self.read_until("readyok")?;

        self.initialized = true;
        Ok(())
    }

    /// Runs one search and collects the final info line per MultiPV index.
    fn search(&mut self, fen: &str, options: &SearchOptions) -> Result<PositionAnalysis> {
        if !self.initialized {
            return Err(Error::OracleUnavailable("engine not initialized".into()));
        }

        let multi_pv = options.multi_pv.max(1);
        self.send(&format!("setoption name MultiPV value {}", multi_pv))?;
        self.send(&format!("position fen {}", fen))?;

        let mut go = match options.movetime {
            Some(ms) => format!("go movetime {}", ms),
            None => format!("go depth {}", options.depth),
        };
        if let Some(moves) = &options.search_moves {
            if !moves.is_empty() {
                go.push_str(" searchmoves ");
                go.push_str(&moves.join(" "));
            }
        }
        self.send(&go)?;

        let mut slots: Vec<Option<EngineLine>> = vec![None; multi_pv as usize];
        let mut wdl = None;
        let mut best_move = None;
        let mut final_depth = 0u8;

        loop {
            let line = self.read_line()?;

            if let Some(rest) = line.strip_prefix("bestmove") {
                let mv = rest.split_whitespace().next().unwrap_or("");
                if !mv.is_empty() && mv != "(none)" {
                    best_move = Some(mv.to_string());
                }
                break;
            }

            if line.starts_with("info") {
                if let Some((index, parsed, line_wdl)) = parse_info_line(&line) {
                    final_depth = final_depth.max(parsed.depth);
                    if index == 0 {
                        if let Some(w) = line_wdl {
                            wdl = Some(w);
                        }
                    }
                    if let Some(slot) = slots.get_mut(index) {
                        *slot = Some(parsed);
                    }
                }
            }
        }

        let lines: Vec<EngineLine> = slots.into_iter().flatten().collect();
        let evaluation = lines.first().map(|l| l.evaluation);

        Ok(PositionAnalysis {
            lines,
            evaluation,
            best_move,
            depth: final_depth,
            wdl,
        })
    }

    /// Quit the engine cleanly.
    pub fn quit(&mut self) -> Result<()> {
        self.send("quit")?;
        std::thread::sleep(Duration::from_millis(100));
        let _ = self.process.kill();
        Ok(())
    }
}

impl Oracle for UciOracle {
    fn analyze(
        &mut self,
        fen: &str,
        options: &SearchOptions,
    ) -> impl Future<Output = Result<PositionAnalysis>> + Send {
        let result = self.search(fen, options);
        async move { result }
    }
}

impl Drop for UciOracle {
    fn drop(&mut self) {
        let _ = self.quit();
    }
}

/// Parses a UCI `info` line carrying a score and PV.
///
/// Returns the zero-based MultiPV index, the parsed line, and the WDL triple
/// when present. Lines without a PV (currmove chatter, upperbound reports)
/// yield `None`.
fn parse_info_line(line: &str) -> Option<(usize, EngineLine, Option<Wdl>)> {
    let parts: Vec<&str> = line.split_whitespace().collect();

    let mut index = 0usize;
    let mut depth = 0u8;
    let mut nodes = 0u64;
    let mut evaluation = None;
    let mut wdl = None;
    let mut pv = Vec::new();

    let mut i = 0;
    while i < parts.len() {
        match parts[i] {
            "multipv" => {
                if let Some(n) = parts.get(i + 1).and_then(|s| s.parse::<usize>().ok()) {
                    index = n.saturating_sub(1);
                }
                i += 2;
            }
            "depth" => {
                if let Some(d) = parts.get(i + 1).and_then(|s| s.parse().ok()) {
                    depth = d;
                }
                i += 2;
            }
            "score" => {
                match (parts.get(i + 1), parts.get(i + 2)) {
                    (Some(&"cp"), Some(v)) => {
                        if let Ok(cp) = v.parse() {
                            evaluation = Some(Evaluation::Cp(cp));
                        }
                    }
                    (Some(&"mate"), Some(v)) => {
                        if let Ok(m) = v.parse() {
                            evaluation = Some(Evaluation::Mate(m));
                        }
                    }
                    _ => {}
                }
                i += 3;
            }
            "wdl" => {
                if let (Some(w), Some(d), Some(l)) = (
                    parts.get(i + 1).and_then(|s| s.parse().ok()),
                    parts.get(i + 2).and_then(|s| s.parse().ok()),
                    parts.get(i + 3).and_then(|s| s.parse().ok()),
                ) {
                    wdl = Some(Wdl {
                        win: w,
                        draw: d,
                        loss: l,
                    });
                }
                i += 4;
            }
            "nodes" => {
                if let Some(n) = parts.get(i + 1).and_then(|s| s.parse().ok()) {
                    nodes = n;
                }
                i += 2;
            }
            "pv" => {
                pv = parts[i + 1..].iter().map(|s| s.to_string()).collect();
                break;
            }
            _ => {
                i += 1;
            }
        }
    }

    let evaluation = evaluation?;
    if pv.is_empty() {
        return None;
    }

    Some((
        index,
        EngineLine {
            pv,
            evaluation,
            depth,
            nodes,
        },
        wdl,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_info_line_cp() {
        let line = "info depth 20 seldepth 28 multipv 1 score cp 35 wdl 312 564 124 \
                    nodes 1500000 nps 900000 pv e2e4 e7e5 g1f3";
        let (index, parsed, wdl) = parse_info_line(line).unwrap();
        assert_eq!(index, 0);
        assert_eq!(parsed.depth, 20);
        assert_eq!(parsed.evaluation, Evaluation::Cp(35));
        assert_eq!(parsed.nodes, 1_500_000);
        assert_eq!(parsed.pv, vec!["e2e4", "e7e5", "g1f3"]);
        assert_eq!(
            wdl,
            Some(Wdl {
                win: 312,
                draw: 564,
                loss: 124
            })
        );
    }

    #[test]
    fn test_parse_info_line_mate_multipv() {
        let line = "info depth 18 multipv 3 score mate -4 nodes 42 pv h7h6";
        let (index, parsed, wdl) = parse_info_line(line).unwrap();
        assert_eq!(index, 2);
        assert_eq!(parsed.evaluation, Evaluation::Mate(-4));
        assert!(wdl.is_none());
    }

    #[test]
    fn test_parse_info_line_without_pv() {
        assert!(parse_info_line("info depth 10 currmove e2e4 currmovenumber 1").is_none());
    }

    #[test]
    #[ignore] // Requires stockfish installed
    fn test_engine_init() {
        let engine = UciOracle::new("stockfish");
        assert!(engine.is_ok());
    }

    #[test]
    #[ignore]
    fn test_search_starting_position() {
        let mut engine = UciOracle::new("stockfish").unwrap();
        let analysis = engine
            .search(
                "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
                &SearchOptions::depth(10).multi_pv(3),
            )
            .unwrap();

        assert!(analysis.best_move.is_some());
        assert_eq!(analysis.lines.len(), 3);
    }
}
