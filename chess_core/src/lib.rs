pub mod engine;
pub mod error;
pub mod logic;
pub mod worker;

pub use engine::config::{BusyPolicy, EngineConfig};
pub use engine::search::AlphaBetaEngine;
pub use engine::{SearchLimit, SearchProgress, SearchResult, Searcher};
pub use error::EngineError;
pub use logic::board::{ChessBoard, GameStatus};
pub use logic::position::{Color, Move, Position};
pub use worker::{SearchHandle, SearchRequest, SearchWorker};
