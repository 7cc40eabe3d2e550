use crate::engine::eval_constants::{get_piece_value, get_pst_value};
use crate::engine::Evaluator;
use crate::logic::position::{Color, Position, Square};

/// Material plus piece-square evaluation from White's point of view.
#[derive(Debug, Clone, Copy, Default)]
pub struct PstEvaluator;

impl PstEvaluator {
    pub const fn new() -> Self {
        Self
    }
}

impl Evaluator for PstEvaluator {
    fn evaluate<P: Position + ?Sized>(&self, position: &P) -> i32 {
        let mut score = 0;
        for square in Square::all() {
            let Some(piece) = position.piece_at(square) else {
                continue;
            };
            let white = piece.color == Color::White;
            let value = get_piece_value(piece.kind)
                + get_pst_value(piece.kind, white, square.rank(), square.file());
            if white {
                score += value;
            } else {
                score -= value;
            }
        }
        score
    }
}
