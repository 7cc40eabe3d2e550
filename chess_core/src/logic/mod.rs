pub mod board;
pub mod position;
