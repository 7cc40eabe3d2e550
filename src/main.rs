use anyhow::{bail, Context, Result};
use chess_core::engine::config::EngineConfig;
use chess_core::engine::{SearchLimit, SearchProgress};
use chess_core::logic::board::{ChessBoard, GameStatus, START_FEN};
use chess_core::logic::position::Position;
use chess_core::worker::{SearchRequest, SearchWorker};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_DEPTH: u8 = 4;

#[derive(Parser)]
#[command(name = "chess_bot", version, about = "Alpha-beta chess engine")]
struct Cli {
    /// JSON engine configuration; missing fields keep their defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct Budget {
    /// Search depth in plies
    #[arg(long, conflicts_with = "time_ms")]
    depth: Option<u8>,

    /// Time budget per move in milliseconds
    #[arg(long)]
    time_ms: Option<u64>,
}

impl Budget {
    fn limit(&self) -> SearchLimit {
        match (self.depth, self.time_ms) {
            (_, Some(ms)) => SearchLimit::Time(ms),
            (Some(depth), None) => SearchLimit::Depth(depth),
            (None, None) => SearchLimit::Depth(DEFAULT_DEPTH),
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Search one position and print the best move
    Analyse {
        #[arg(long, default_value = START_FEN)]
        fen: String,

        #[command(flatten)]
        budget: Budget,

        /// Print the full search result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Let the engine play both sides from a position
    SelfPlay {
        #[arg(long, default_value = START_FEN)]
        fen: String,

        #[command(flatten)]
        budget: Budget,

        #[arg(long, default_value_t = 40)]
        max_plies: usize,
    },
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Analyse { fen, budget, json } => analyse(config, &fen, budget.limit(), json),
        Command::SelfPlay {
            fen,
            budget,
            max_plies,
        } => self_play(config, &fen, budget.limit(), max_plies),
    }
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    EngineConfig::load_from_json(&text)
        .with_context(|| format!("parsing config {}", path.display()))
}

fn request_for(board: &ChessBoard, limit: SearchLimit) -> SearchRequest {
    SearchRequest {
        fen: board.serialize(),
        side_to_move: board.side_to_move(),
        limit,
        config: None,
    }
}

fn log_progress(progress: SearchProgress) {
    debug!(
        depth = progress.depth,
        moves = progress.moves_evaluated,
        nodes = progress.nodes_visited,
        "progress"
    );
}

fn analyse(config: EngineConfig, fen: &str, limit: SearchLimit, json: bool) -> Result<()> {
    let board = ChessBoard::from_fen(fen)?;
    let worker = SearchWorker::spawn::<ChessBoard>(config);

    let result = worker
        .submit(request_for(&board, limit))
        .wait_with_progress(log_progress)
        .context("search failed")?;
    worker.shutdown();

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    let Some(best_move) = result.best_move else {
        bail!("no move found for {fen}");
    };
    info!(
        depth = result.depth,
        score = result.score,
        nodes = result.nodes_visited,
        time_ms = result.time_ms,
        "analysis complete"
    );
    println!("bestmove {best_move} score {} depth {}", result.score, result.depth);
    Ok(())
}

fn self_play(config: EngineConfig, fen: &str, limit: SearchLimit, max_plies: usize) -> Result<()> {
    let mut board = ChessBoard::from_fen(fen)?;
    // One worker for both sides, so the table carries over between moves.
    let worker = SearchWorker::spawn::<ChessBoard>(config);

    for ply in 0..max_plies {
        if board.status() != GameStatus::Playing {
            break;
        }

        let side = board.side_to_move();
        let result = worker
            .submit(request_for(&board, limit))
            .wait_with_progress(log_progress)
            .with_context(|| format!("search failed at ply {ply}"))?;
        let Some(best_move) = result.best_move else {
            bail!("engine returned no move at ply {ply}");
        };

        info!(
            ply,
            side = %side,
            best_move = %best_move,
            score = result.score,
            depth = result.depth,
            nodes = result.nodes_visited,
            "move"
        );
        println!("{:>3}. {side} {best_move} ({})", ply / 2 + 1, result.score);

        board.apply(&best_move)?;
    }
    worker.shutdown();

    match board.status() {
        GameStatus::Checkmate(winner) => println!("checkmate, {winner} wins"),
        GameStatus::Stalemate => println!("stalemate"),
        GameStatus::Draw => println!("draw"),
        GameStatus::Playing => println!("stopped after {} plies", board.ply()),
    }
    println!("{board}");
    Ok(())
}
