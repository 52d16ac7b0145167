use std::env;
use std::process;

use chess_classify_core::classify::{classify_game, classify_move, ClassifyOptions};
use chess_classify_core::engine::{Oracle, SearchOptions, UciOracle};
use chess_classify_core::parser::parse_pgn_file;
use chess_classify_core::Tier;
use tracing::info;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage(&args[0]);
        process::exit(1);
    }

    match args[1].as_str() {
        "classify" => {
            if args.len() < 4 {
                println!("Error: Please provide a FEN string and a UCI move");
                println!("Usage: {} classify \"<fen>\" <move>", args[0]);
                process::exit(1);
            }
            classify_one(&args[2], &args[3], json_flag(&args)).await;
        }
        "game" => {
            if args.len() < 3 {
                println!("Error: Please provide a PGN file");
                println!("Usage: {} game <pgn_file>", args[0]);
                process::exit(1);
            }
            classify_pgn(&args[2], json_flag(&args)).await;
        }
        "test-engine" => {
            test_engine().await;
        }
        _ => {
            print_usage(&args[0]);
            process::exit(1);
        }
    }
}

fn print_usage(program: &str) {
    println!("Usage: {} <command> [arguments]", program);
    println!();
    println!("Commands:");
    println!("  classify \"<fen>\" <move>   Classify one move in a position");
    println!("  game <pgn_file>           Classify every move of a game");
    println!("  test-engine               Test the engine connection");
    println!();
    println!("Options:");
    println!("  --json                    Print the full report as JSON");
    println!();
    println!("The engine binary defaults to `stockfish` on PATH; override");
    println!("with the CHESS_ENGINE environment variable.");
}

fn json_flag(args: &[String]) -> bool {
    args.iter().any(|a| a == "--json")
}

fn engine_path() -> String {
    env::var("CHESS_ENGINE").unwrap_or_else(|_| "stockfish".to_string())
}

fn open_engine() -> UciOracle {
    match UciOracle::new(&engine_path()) {
        Ok(oracle) => oracle,
        Err(e) => {
            eprintln!("Failed to start engine '{}': {}", engine_path(), e);
            process::exit(1);
        }
    }
}

fn tier_marker(tier: Tier) -> &'static str {
    match tier {
        Tier::Brilliant => "!!",
        Tier::Great => "!",
        Tier::Miss | Tier::Inaccuracy => "?!",
        Tier::Mistake => "?",
        Tier::Blunder => "??",
        _ => "",
    }
}

async fn classify_one(fen: &str, uci: &str, json: bool) {
    let mut oracle = open_engine();
    let options = ClassifyOptions::new();

    match classify_move(&mut oracle, fen, uci, &options).await {
        Ok(report) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&report).unwrap());
                return;
            }

            let tier = report.classification.tier;
            println!(
                "{}{} - {} ({} cp loss)",
                report.player_move_san.as_deref().unwrap_or(uci),
                tier_marker(tier),
                report.classification.label,
                report.classification.cp_loss
            );
            println!("Best: {}", report.best_move_san.as_deref().unwrap_or(&report.best_move));
            println!("Eval: {}", report.engine_eval);
            println!("{}", report.explanation.reason);
            if !report.explanation.detailed.is_empty() {
                println!("{}", report.explanation.detailed);
            }
        }
        Err(e) => {
            eprintln!("Classification failed: {}", e);
            process::exit(1);
        }
    }
}

async fn classify_pgn(path: &str, json: bool) {
    let games = match parse_pgn_file(path) {
        Ok(games) => games,
        Err(e) => {
            eprintln!("Failed to parse {}: {}", path, e);
            process::exit(1);
        }
    };

    let mut oracle = open_engine();
    let options = ClassifyOptions::new().depth(16);
    info!(games = games.len(), path, "classifying");

    for game in &games {
        println!("{}", game.summary());
        println!();

        match classify_game(&mut oracle, game, &options).await {
            Ok(report) => {
                if json {
                    println!("{}", serde_json::to_string_pretty(&report).unwrap());
                    continue;
                }

                for ply in &report.plies {
                    let number = if ply.color.is_white() {
                        format!("{}.", ply.move_number)
                    } else {
                        format!("{}...", ply.move_number)
                    };
                    println!(
                        "  {} {}{} - {} ({} cp)",
                        number,
                        ply.san,
                        tier_marker(ply.report.classification.tier),
                        ply.report.classification.label,
                        ply.report.classification.cp_loss
                    );
                }

                println!();
                println!(
                    "  White accuracy: {:.1}% (avg loss {:.0} cp)",
                    report.white.accuracy(),
                    report.white.average_cp_loss()
                );
                println!(
                    "  Black accuracy: {:.1}% (avg loss {:.0} cp)",
                    report.black.accuracy(),
                    report.black.average_cp_loss()
                );
            }
            Err(e) => {
                eprintln!("Analysis failed: {}", e);
                process::exit(1);
            }
        }
        println!();
    }
}

async fn test_engine() {
    println!("Testing engine at '{}'...", engine_path());

    let mut oracle = open_engine();
    let start = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
    let options = SearchOptions::depth(12).multi_pv(3);

    match oracle.analyze(start, &options).await {
        Ok(analysis) => {
            println!("[OK] Engine responded");
            println!("{}", analysis.summary());
            for (i, line) in analysis.lines.iter().enumerate() {
                println!(
                    "  {}. {} {} (depth {})",
                    i + 1,
                    line.first_move().unwrap_or("?"),
                    line.evaluation,
                    line.depth
                );
            }
        }
        Err(e) => {
            eprintln!("[FAIL] {}", e);
            process::exit(1);
        }
    }
}
