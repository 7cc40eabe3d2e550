use crate::error::EngineError;
use crate::logic::position::{Move, Position};
use serde::{Deserialize, Serialize};
use std::ops::ControlFlow;

pub mod config;
pub mod eval;
pub mod eval_constants;
pub mod ordering;
pub mod search;
pub mod tt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchLimit {
    Depth(u8),
    Time(u64), // milliseconds
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// `None` only when the side to move has no legal move.
    pub best_move: Option<Move>,
    pub score: i32,
    /// Deepest fully completed iteration.
    pub depth: u8,
    pub nodes_visited: u64,
    pub time_ms: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchProgress {
    pub depth: u8,
    pub moves_evaluated: u32,
    pub nodes_visited: u64,
}

pub trait Evaluator {
    fn evaluate<P: Position + ?Sized>(&self, position: &P) -> i32;
}

pub trait Searcher {
    fn search<P: Position>(
        &mut self,
        position: &mut P,
        limit: SearchLimit,
        on_progress: &mut dyn FnMut(SearchProgress) -> ControlFlow<()>,
    ) -> Result<SearchResult, EngineError>;
}
