use crate::logic::position::{Color, Move};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum EngineError {
    #[error("position has {actual} to move, request says {expected}")]
    StateMismatch { expected: Color, actual: Color },

    #[error("no legal moves in the submitted position")]
    NoLegalMoves,

    #[error("illegal move {0} for the current position")]
    IllegalMove(Move),

    #[error("invalid position: {0}")]
    InvalidPosition(String),

    #[error("a search is already in flight on this engine")]
    Busy,

    #[error("search was cancelled")]
    Cancelled,

    #[error("search worker is no longer running")]
    WorkerDisconnected,
}
