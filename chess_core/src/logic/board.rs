use crate::error::EngineError;
use crate::logic::position::{Color, Move, Piece, PieceKind, Position, Square};
use chess::{BoardStatus, ChessMove, MoveGen};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    Playing,
    Checkmate(Color), // Winner
    Stalemate,
    Draw,
}

/// Rules-engine collaborator backed by the `chess` crate.
///
/// `chess::Board` is a small `Copy` value, so the undo stack just keeps the
/// boards that preceded each applied move.
#[derive(Debug, Clone)]
pub struct ChessBoard {
    board: chess::Board,
    history: Vec<chess::Board>,
}

impl Default for ChessBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl ChessBoard {
    #[must_use]
    pub fn new() -> Self {
        Self {
            board: chess::Board::default(),
            history: Vec::with_capacity(64),
        }
    }

    pub fn from_fen(fen: &str) -> Result<Self, EngineError> {
        let board = chess::Board::from_str(fen)
            .map_err(|_| EngineError::InvalidPosition(fen.to_string()))?;
        Ok(Self {
            board,
            history: Vec::with_capacity(64),
        })
    }

    /// Number of moves currently applied on top of the initial position.
    pub fn ply(&self) -> usize {
        self.history.len()
    }

    pub fn is_checkmate(&self) -> bool {
        self.board.status() == BoardStatus::Checkmate
    }

    pub fn is_stalemate(&self) -> bool {
        self.board.status() == BoardStatus::Stalemate
    }

    /// Stalemate, insufficient material, or threefold repetition over the
    /// moves applied to this instance.
    pub fn is_draw(&self) -> bool {
        self.is_stalemate() || self.has_insufficient_material() || self.is_threefold_repetition()
    }

    pub fn status(&self) -> GameStatus {
        if self.is_checkmate() {
            GameStatus::Checkmate(self.side_to_move().opposite())
        } else if self.is_stalemate() {
            GameStatus::Stalemate
        } else if self.is_draw() {
            GameStatus::Draw
        } else {
            GameStatus::Playing
        }
    }

    fn has_insufficient_material(&self) -> bool {
        let mut minors = 0;
        for square in Square::all() {
            match self.piece_at(square).map(|p| p.kind) {
                None | Some(PieceKind::King) => {}
                Some(PieceKind::Knight | PieceKind::Bishop) => minors += 1,
                Some(_) => return false,
            }
        }
        minors <= 1
    }

    fn is_threefold_repetition(&self) -> bool {
        let hash = self.board.get_hash();
        self.history
            .iter()
            .filter(|b| b.get_hash() == hash)
            .count()
            >= 2
    }

    fn convert_move(&self, cm: ChessMove) -> Move {
        let source = cm.get_source();
        let dest = cm.get_dest();
        // En passant lands on an empty square, so also flag diagonal pawn moves.
        let is_capture = self.board.piece_on(dest).is_some()
            || (self.board.piece_on(source) == Some(chess::Piece::Pawn)
                && source.get_file() != dest.get_file());
        Move {
            from: from_chess_square(source),
            to: from_chess_square(dest),
            promotion: cm.get_promotion().map(from_chess_piece),
            is_capture,
        }
    }
}

impl FromStr for ChessBoard {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_fen(s)
    }
}

impl fmt::Display for ChessBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.board)
    }
}

impl Position for ChessBoard {
    fn from_serialized(serialized: &str) -> Result<Self, EngineError> {
        Self::from_fen(serialized)
    }

    fn legal_moves(&self) -> Vec<Move> {
        MoveGen::new_legal(&self.board)
            .map(|cm| self.convert_move(cm))
            .collect()
    }

    fn apply(&mut self, mv: &Move) -> Result<(), EngineError> {
        let cm = to_chess_move(mv);
        // Validate before touching any state.
        if !self.board.legal(cm) {
            return Err(EngineError::IllegalMove(*mv));
        }
        let next = self.board.make_move_new(cm);
        self.history.push(self.board);
        self.board = next;
        Ok(())
    }

    fn apply_null(&mut self) -> bool {
        match self.board.null_move() {
            Some(next) => {
                self.history.push(self.board);
                self.board = next;
                true
            }
            None => false,
        }
    }

    fn revert(&mut self) {
        let Some(previous) = self.history.pop() else {
            panic!("revert called without a matching apply");
        };
        self.board = previous;
    }

    fn side_to_move(&self) -> Color {
        from_chess_color(self.board.side_to_move())
    }

    fn is_in_check(&self) -> bool {
        self.board.checkers().popcnt() > 0
    }

    fn serialize(&self) -> String {
        self.board.to_string()
    }

    fn piece_at(&self, square: Square) -> Option<Piece> {
        let sq = to_chess_square(square);
        let kind = self.board.piece_on(sq)?;
        let color = self.board.color_on(sq)?;
        Some(Piece::new(from_chess_piece(kind), from_chess_color(color)))
    }
}

fn to_chess_square(square: Square) -> chess::Square {
    chess::Square::make_square(
        chess::Rank::from_index(usize::from(square.rank())),
        chess::File::from_index(usize::from(square.file())),
    )
}

fn from_chess_square(sq: chess::Square) -> Square {
    #[allow(clippy::cast_possible_truncation)]
    let index = sq.to_index() as u8;
    Square::from_index(index).unwrap_or_else(|| unreachable!("chess squares are 0..64"))
}

const fn from_chess_color(color: chess::Color) -> Color {
    match color {
        chess::Color::White => Color::White,
        chess::Color::Black => Color::Black,
    }
}

const fn from_chess_piece(piece: chess::Piece) -> PieceKind {
    match piece {
        chess::Piece::Pawn => PieceKind::Pawn,
        chess::Piece::Knight => PieceKind::Knight,
        chess::Piece::Bishop => PieceKind::Bishop,
        chess::Piece::Rook => PieceKind::Rook,
        chess::Piece::Queen => PieceKind::Queen,
        chess::Piece::King => PieceKind::King,
    }
}

const fn to_chess_piece(kind: PieceKind) -> chess::Piece {
    match kind {
        PieceKind::Pawn => chess::Piece::Pawn,
        PieceKind::Knight => chess::Piece::Knight,
        PieceKind::Bishop => chess::Piece::Bishop,
        PieceKind::Rook => chess::Piece::Rook,
        PieceKind::Queen => chess::Piece::Queen,
        PieceKind::King => chess::Piece::King,
    }
}

fn to_chess_move(mv: &Move) -> ChessMove {
    ChessMove::new(
        to_chess_square(mv.from),
        to_chess_square(mv.to),
        mv.promotion.map(to_chess_piece),
    )
}
