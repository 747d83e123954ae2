use std::process::ExitCode;

use rust_chess_engine::ai::{AiEngine, SearchAi};
use rust_chess_engine::config::AppConfig;
use rust_chess_engine::engine::{Difficulty, Position};
use serde_json::json;

const USAGE: &str = "usage: rust-chess-engine [--fen <FEN>] [--difficulty <level>] [--selfplay]";

struct Args {
    fen: Option<String>,
    difficulty: Option<Difficulty>,
    selfplay: bool,
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args {
        fen: None,
        difficulty: None,
        selfplay: false,
    };
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--fen" => args.fen = Some(iter.next().ok_or("--fen needs a value")?),
            "--difficulty" => {
                let raw = iter.next().ok_or("--difficulty needs a value")?;
                args.difficulty = Some(raw.parse::<Difficulty>().map_err(|e| e.to_string())?);
            }
            "--selfplay" => args.selfplay = true,
            "-h" | "--help" => return Err(USAGE.to_string()),
            other => return Err(format!("unknown argument: {other}\n{USAGE}")),
        }
    }
    Ok(args)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rust_chess_engine=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::from(2);
        }
    };

    match run(args, AppConfig::from_env()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args, config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let position = match &args.fen {
        Some(fen) => Position::from_fen(fen)?,
        None => Position::starting(),
    };
    let difficulty = args.difficulty.unwrap_or(config.default_difficulty);
    let engine = SearchAi::from_config(&config);

    tracing::info!(
        "rust-chess-engine v{} ({}, {difficulty})",
        env!("CARGO_PKG_VERSION"),
        engine.name()
    );

    if args.selfplay {
        selfplay(position, difficulty, &engine, config.selfplay_max_plies)
    } else {
        analyse(&position, difficulty, &engine)
    }
}

/// Print a JSON report for one position, including the engine's reply.
fn analyse(
    position: &Position,
    difficulty: Difficulty,
    engine: &SearchAi,
) -> Result<(), Box<dyn std::error::Error>> {
    let reply = if position.is_game_over() {
        None
    } else {
        let mv = engine.best_move(position, difficulty)?;
        position
            .apply_move(&mv)
            .and_then(|next| next.last_move().cloned())
    };

    let report = json!({
        "fen": position.to_fen(),
        "sideToMove": position.side_to_move(),
        "legalMoves": position.legal_moves().len(),
        "inCheck": position.in_check(),
        "result": position.result(),
        "drawClaims": position.draw_claims(),
        "difficulty": difficulty,
        "aiMove": reply,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Let the engine play both sides until the game ends or `max_plies` is hit.
fn selfplay(
    mut position: Position,
    difficulty: Difficulty,
    engine: &SearchAi,
    max_plies: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    for _ in 0..max_plies {
        if position.is_game_over() {
            break;
        }
        let mv = engine.best_move(&position, difficulty)?;
        position = position
            .apply_move(&mv)
            .ok_or_else(|| format!("engine produced illegal move {mv}"))?;
        if let Some(record) = position.last_move() {
            println!("{:>3}. {}", position.move_history().len(), record.san);
        }
    }

    println!("{}", position.to_fen());
    match position.result() {
        Some(result) => println!("result: {result}"),
        None => println!("result: unfinished after {max_plies} plies"),
    }
    Ok(())
}
