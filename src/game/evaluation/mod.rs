//! Evaluation of a chess position.
//!
//! Scores are absolute: positive always favors White, whoever is to move.
//! Everything beyond the terminal shortcuts is derived from the control maps
//! plus raw material, with all weights supplied by [`SearchConfig`].

pub mod control;

use shakmaty::{attacks, Board, Chess, Color, Piece, Position, Role, Square};

use crate::constants::MATE_SCORE;
use crate::game::is_draw;
use crate::game::search::SearchConfig;

// Role is 1-indexed (Pawn = 1 .. King = 6).
pub(crate) fn role_index(role: Role) -> usize {
    role as usize - 1
}

/// Evaluates the board, White-positive.
///
/// Checkmate scores as the extreme favoring the side that delivered it (the
/// side to move here is the mated side); a drawn position scores exactly zero.
pub fn evaluate(pos: &Chess, config: &SearchConfig) -> i32 {
    if pos.is_checkmate() {
        return if pos.turn() == Color::White {
            -MATE_SCORE
        } else {
            MATE_SCORE
        };
    }
    if is_draw(pos) {
        return 0;
    }
    control_score(pos, config)
}

/// Raw material balance, White-positive.
pub fn material_score(board: &Board, config: &SearchConfig) -> i32 {
    let mut score = 0;
    for &color in &Color::ALL {
        let side = if color.is_white() { 1 } else { -1 };
        for &role in &Role::ALL {
            let count = board.by_piece(Piece { role, color }).count() as i32;
            score += count * config.material_values[role_index(role)] * side;
        }
    }
    score
}

fn control_score(pos: &Chess, config: &SearchConfig) -> i32 {
    let board = pos.board();
    let maps = control::build(pos);
    let mut score = 0;

    for square in Square::ALL {
        let sign = maps.combined.sign(square);

        if let Some(piece) = board.piece_at(square) {
            let enemy_map = match piece.color {
                Color::White => &maps.black,
                Color::Black => &maps.white,
            };
            // A piece under enemy pressure is worth fighting over; credit
            // whoever holds the square.
            if enemy_map.get(square) != 0 {
                score += config.control_values[role_index(piece.role)] * sign;
            }
            if piece.role == Role::Pawn {
                let rank_number = square.rank() as i32 + 1;
                if piece.color.is_white() {
                    score += rank_number * config.pawn_rank_mod;
                } else {
                    score -= (9 - rank_number) * config.pawn_rank_mod;
                }
            }
        }

        // Holding central squares counts whether or not they are occupied.
        score += (config.center_file_weights[square.file() as usize]
            + config.center_rank_weights[square.rank() as usize])
            * sign;
    }

    score += king_ring_score(pos, &maps, config);
    score + material_score(board, config)
}

/// Pressure on the squares the defending king could step to. The tuned
/// variants disagree on whether this helps; a zero weight disables it.
fn king_ring_score(pos: &Chess, maps: &control::ControlMaps, config: &SearchConfig) -> i32 {
    if config.king_ring_control_weight == 0 {
        return 0;
    }
    let Some(king_square) = pos.board().king_of(!pos.turn()) else {
        return 0;
    };
    let mover = pos.turn();
    let mover_map = match mover {
        Color::White => &maps.white,
        Color::Black => &maps.black,
    };
    let side = if mover.is_white() { 1 } else { -1 };
    let mut score = 0;
    for square in attacks::king_attacks(king_square) {
        if mover_map.get(square) != 0 {
            score += config.king_ring_control_weight * side;
        }
    }
    score
}
