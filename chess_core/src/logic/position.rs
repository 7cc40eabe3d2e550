use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    White,
    Black,
}

impl Color {
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }

    /// White maximizes, Black minimizes.
    pub const fn is_maximizing(self) -> bool {
        matches!(self, Self::White)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::White => write!(f, "white"),
            Self::Black => write!(f, "black"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    pub const ALL: [Self; 6] = [
        Self::Pawn,
        Self::Knight,
        Self::Bishop,
        Self::Rook,
        Self::Queen,
        Self::King,
    ];

    pub const fn to_char(self) -> char {
        match self {
            Self::Pawn => 'p',
            Self::Knight => 'n',
            Self::Bishop => 'b',
            Self::Rook => 'r',
            Self::Queen => 'q',
            Self::King => 'k',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub kind: PieceKind,
    pub color: Color,
}

impl Piece {
    pub const fn new(kind: PieceKind, color: Color) -> Self {
        Self { kind, color }
    }
}

/// Board square, `rank * 8 + file` with a1 = 0 and h8 = 63.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Square(u8);

impl Square {
    /// Returns `None` when rank or file is off the board.
    pub const fn new(rank: u8, file: u8) -> Option<Self> {
        if rank < 8 && file < 8 {
            Some(Self(rank * 8 + file))
        } else {
            None
        }
    }

    pub const fn from_index(index: u8) -> Option<Self> {
        if index < 64 {
            Some(Self(index))
        } else {
            None
        }
    }

    pub const fn rank(self) -> u8 {
        self.0 / 8
    }

    pub const fn file(self) -> u8 {
        self.0 % 8
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }

    pub fn all() -> impl Iterator<Item = Self> {
        (0..64).map(Self)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let file = char::from(b'a' + self.file());
        let rank = char::from(b'1' + self.rank());
        write!(f, "{file}{rank}")
    }
}

impl FromStr for Square {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EngineError::InvalidPosition(format!("bad square '{s}'"));
        let &[file, rank] = s.as_bytes() else {
            return Err(invalid());
        };
        Self::new(rank.wrapping_sub(b'1'), file.wrapping_sub(b'a')).ok_or_else(invalid)
    }
}

/// A move as produced by the rules engine. Ordering scores are never stored
/// on the move itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceKind>,
    pub is_capture: bool,
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(kind) = self.promotion {
            write!(f, "{}", kind.to_char())?;
        }
        Ok(())
    }
}

/// Capabilities the search consumes from a rules engine.
///
/// Exploration is depth-first over a single mutable instance: every
/// successful `apply` (or `apply_null`) is undone by exactly one `revert`.
pub trait Position {
    fn from_serialized(serialized: &str) -> Result<Self, EngineError>
    where
        Self: Sized;

    /// Legal moves for the side to move, in generation order.
    fn legal_moves(&self) -> Vec<Move>;

    /// Plays `mv` in place. Fails with `IllegalMove` without touching the
    /// position when `mv` is not currently legal.
    fn apply(&mut self, mv: &Move) -> Result<(), EngineError>;

    /// Passes the turn to the opponent. Returns `false` (and leaves the
    /// position untouched) when the side to move is in check.
    fn apply_null(&mut self) -> bool;

    /// Undoes the most recent `apply` or `apply_null`.
    ///
    /// # Panics
    /// When there is nothing to undo.
    fn revert(&mut self);

    fn side_to_move(&self) -> Color;

    fn is_in_check(&self) -> bool;

    /// Canonical key for the transposition table.
    fn serialize(&self) -> String;

    fn piece_at(&self, square: Square) -> Option<Piece>;
}
