// src/variants/revolt.rs
//
// Peasants' revolt: eight white pawns against a black knight horde. Plays
// under the standard rules; only the starting material differs.

use crate::board::{Board, BoardError};
use crate::variant::Variant;
use crate::variants::standard;

const INIT_POS: &[&str] = &[
    "1nn1knn1", "4p3", "8", "8", "8", "8", "PPPPPPPP", "4K3",
];

fn board() -> Result<Board, BoardError> {
    let mut board = Board::construct(8, 8, standard::LAYOUT)?;
    board.populate(INIT_POS, standard::piece)?;
    Ok(board)
}

pub static REVOLT: Variant = Variant {
    name: "revolt",
    title: "Peasants' Revolt",
    blurb: "Eight pawns and a king take on four knights, a pawn and a king.",
    board,
    pieces: standard::piece,
    game_start: None,
    after_move: None,
    after_capture: None,
    move_filter: None,
    capture_filter: None,
    win: None,
    promotions: None,
    online_play: false,
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::Side;

    #[test]
    fn starting_material() {
        let board = board().unwrap();
        let white = board.pieces_of(Side::White);
        let black = board.pieces_of(Side::Black);
        assert_eq!(white.len(), 9);
        assert_eq!(black.len(), 6);
        let knights = black
            .iter()
            .filter(|&&c| board.piece_at(c).map(|p| p.code) == Some('n'))
            .count();
        assert_eq!(knights, 4);
    }
}
