// game/mod.rs

pub mod evaluation;
pub mod search;

use shakmaty::fen::Fen;
use shakmaty::{Chess, Color, EnPassantMode, Position};

/// Draw by rule: stalemate, dead position, or an exhausted fifty-move clock.
/// Threefold repetition needs the game history, which the caller owns.
pub fn is_draw(pos: &Chess) -> bool {
    pos.is_stalemate() || pos.is_insufficient_material() || pos.halfmoves() >= 100
}

/// Cache key for a position: the full FEN, unique per distinct reachable state
/// (board layout, side to move, castling rights, en passant, clocks).
pub fn canonical_key(pos: &Chess) -> String {
    Fen::from_position(pos, EnPassantMode::Legal).to_string()
}

/// Plies played so far; zero at the initial position.
pub fn ply_count(pos: &Chess) -> u32 {
    (pos.fullmoves().get() - 1) * 2 + u32::from(pos.turn() == Color::Black)
}
