use crate::logic::position::PieceKind;

// Piece Values (tenths of a pawn-unit of 10)
pub const VAL_PAWN: i32 = 100;
pub const VAL_KNIGHT: i32 = 300;
pub const VAL_BISHOP: i32 = 300;
pub const VAL_ROOK: i32 = 500;
pub const VAL_QUEEN: i32 = 900;
pub const VAL_KING: i32 = 9000;

pub const fn get_piece_value(kind: PieceKind) -> i32 {
    match kind {
        PieceKind::Pawn => VAL_PAWN,
        PieceKind::Knight => VAL_KNIGHT,
        PieceKind::Bishop => VAL_BISHOP,
        PieceKind::Rook => VAL_ROOK,
        PieceKind::Queen => VAL_QUEEN,
        PieceKind::King => VAL_KING,
    }
}

// Piece-Square Tables, White's point of view.
// Row 0 is rank 8, row 7 is rank 1. Black reads them with ranks reversed.

#[rustfmt::skip]
pub const PST_PAWN: [[i32; 8]; 8] = [
    [  0,   0,   0,   0,   0,   0,   0,   0],
    [ 50,  50,  50,  50,  50,  50,  50,  50],
    [ 10,  10,  20,  30,  30,  20,  10,  10],
    [  5,   5,  10,  25,  25,  10,   5,   5],
    [  0,   0,   0,  20,  20,   0,   0,   0],
    [  5,  -5, -10,   0,   0, -10,  -5,   5],
    [  5,  10,  10, -20, -20,  10,  10,   5],
    [  0,   0,   0,   0,   0,   0,   0,   0],
];

#[rustfmt::skip]
pub const PST_BISHOP: [[i32; 8]; 8] = [
    [-20, -10, -10, -10, -10, -10, -10, -20],
    [-10,   0,   0,   0,   0,   0,   0, -10],
    [-10,   0,   5,  10,  10,   5,   0, -10],
    [-10,   5,   5,  10,  10,   5,   5, -10],
    [-10,   0,  10,  10,  10,  10,   0, -10],
    [-10,  10,  10,  10,  10,  10,  10, -10],
    [-10,   5,   0,   0,   0,   0,   5, -10],
    [-20, -10, -10, -10, -10, -10, -10, -20],
];

#[rustfmt::skip]
pub const PST_ROOK: [[i32; 8]; 8] = [
    [  0,   0,   0,   0,   0,   0,   0,   0],
    [  5,  10,  10,  10,  10,  10,  10,   5],
    [ -5,   0,   0,   0,   0,   0,   0,  -5],
    [ -5,   0,   0,   0,   0,   0,   0,  -5],
    [ -5,   0,   0,   0,   0,   0,   0,  -5],
    [ -5,   0,   0,   0,   0,   0,   0,  -5],
    [ -5,   0,   0,   0,   0,   0,   0,  -5],
    [  0,   0,   0,   5,   5,   0,   0,   0],
];

#[rustfmt::skip]
pub const PST_KING: [[i32; 8]; 8] = [
    [-30, -40, -40, -50, -50, -40, -40, -30],
    [-30, -40, -40, -50, -50, -40, -40, -30],
    [-30, -40, -40, -50, -50, -40, -40, -30],
    [-30, -40, -40, -50, -50, -40, -40, -30],
    [-20, -30, -30, -40, -40, -30, -30, -20],
    [-10, -20, -20, -20, -20, -20, -20, -10],
    [ 20,  20,   0,   0,   0,   0,  20,  20],
    [ 20,  30,  10,   0,   0,  10,  30,  20],
];

// Knight and queen tables are their own vertical mirror, so both colors use
// them as-is.

#[rustfmt::skip]
pub const PST_KNIGHT: [[i32; 8]; 8] = [
    [-50, -40, -30, -30, -30, -30, -40, -50],
    [-40, -20,   0,   5,   5,   0, -20, -40],
    [-30,   5,  10,  15,  15,  10,   5, -30],
    [-30,   0,  15,  20,  20,  15,   0, -30],
    [-30,   0,  15,  20,  20,  15,   0, -30],
    [-30,   5,  10,  15,  15,  10,   5, -30],
    [-40, -20,   0,   5,   5,   0, -20, -40],
    [-50, -40, -30, -30, -30, -30, -40, -50],
];

#[rustfmt::skip]
pub const PST_QUEEN: [[i32; 8]; 8] = [
    [-20, -10, -10,  -5,  -5, -10, -10, -20],
    [-10,   0,   5,   0,   0,   0,   0, -10],
    [-10,   5,   5,   5,   5,   5,   0, -10],
    [ -5,   0,   5,   5,   5,   5,   0,  -5],
    [ -5,   0,   5,   5,   5,   5,   0,  -5],
    [-10,   5,   5,   5,   5,   5,   0, -10],
    [-10,   0,   5,   0,   0,   0,   0, -10],
    [-20, -10, -10,  -5,  -5, -10, -10, -20],
];

const fn table_for(kind: PieceKind) -> &'static [[i32; 8]; 8] {
    match kind {
        PieceKind::Pawn => &PST_PAWN,
        PieceKind::Knight => &PST_KNIGHT,
        PieceKind::Bishop => &PST_BISHOP,
        PieceKind::Rook => &PST_ROOK,
        PieceKind::Queen => &PST_QUEEN,
        PieceKind::King => &PST_KING,
    }
}

const fn is_color_symmetric(kind: PieceKind) -> bool {
    matches!(kind, PieceKind::Knight | PieceKind::Queen)
}

/// Positional bonus for a piece of `kind` on `(rank, file)`, where rank 0 is
/// White's back rank. Always a bonus for the owner, never sign-flipped.
pub fn get_pst_value(kind: PieceKind, white: bool, rank: u8, file: u8) -> i32 {
    let rank = usize::from(rank.min(7));
    let file = usize::from(file.min(7));
    let row = if white || is_color_symmetric(kind) {
        7 - rank
    } else {
        rank
    };
    table_for(kind)[row][file]
}
