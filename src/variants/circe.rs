// src/variants/circe.rs
//
// Circe: a captured piece is immediately reborn on its starting square,
// provided that square is vacant. Rooks, knights and bishops have two
// starting squares; the one whose shade matches the capture square wins.

use crate::board::Coord;
use crate::game::GameState;
use crate::piece::{Piece, Side};
use crate::variant::Variant;
use crate::variants::standard;
use crate::variants::wotk::no_win;

fn rebirth(state: &mut GameState, at: Coord, captured: &Piece) {
    let shade = match state.board.get(at).and_then(|t| t.shade) {
        Some(s) => s,
        None => return,
    };
    let back = if captured.side == Side::White {
        state.board.height - 1
    } else {
        0
    };
    let pick = |a: i32, b: i32| {
        let matches = state
            .board
            .get(Coord::new(a, back))
            .and_then(|t| t.shade)
            == Some(shade);
        if matches {
            a
        } else {
            b
        }
    };
    let home = match captured.name {
        "Pawn" => Coord::new(at.x, back + standard::forward(captured.side)),
        "Queen" => Coord::new(3, back),
        "Rook" => Coord::new(pick(0, 7), back),
        "Knight" => Coord::new(pick(1, 6), back),
        "Bishop" => Coord::new(pick(2, 5), back),
        _ => return,
    };
    let vacant = state
        .board
        .get(home)
        .map(|t| t.is_playable() && t.piece.is_none())
        .unwrap_or(false);
    if !vacant {
        return;
    }
    if let Some(reborn) = (state.variant.pieces)(captured.code) {
        state.board.place_piece(home, reborn);
    }
}

pub static CIRCE: Variant = Variant {
    name: "circe",
    title: "Circe Chess",
    blurb: "Captured pieces are reborn on their starting squares when those are vacant.",
    board: standard::board,
    pieces: standard::piece,
    game_start: None,
    after_move: None,
    after_capture: Some(rebirth),
    move_filter: None,
    capture_filter: None,
    // Rebirth can undo a mate on the next ply, so the standard verdict is
    // not trusted; games end by resignation or agreement.
    win: Some(no_win),
    promotions: None,
    online_play: false,
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Committed;
    use crate::notation::algebraic_to_coord;

    fn coord(state: &GameState, s: &str) -> Coord {
        algebraic_to_coord(&state.board, s).unwrap()
    }

    #[test]
    fn rook_is_reborn_on_the_matching_shade() {
        let mut state = GameState::new(&CIRCE).unwrap();
        state
            .import_position("4k3/8/8/3r4/8/4N3/8/4K3 w - - 0 1")
            .unwrap();
        let (e3, d5) = (coord(&state, "e3"), coord(&state, "d5"));
        state.select(e3).unwrap();
        assert_eq!(state.commit(d5), Committed::Moved);
        // d5 is a light square, so the rook returns to a8 rather than h8.
        let a8 = coord(&state, "a8");
        let reborn = state.board.piece_at(a8).unwrap();
        assert_eq!(reborn.code, 'r');
        assert!(state.board.piece_at(coord(&state, "h8")).is_none());
    }

    #[test]
    fn occupied_home_square_cancels_rebirth() {
        let mut state = GameState::new(&CIRCE).unwrap();
        state
            .import_position("r3k3/8/8/3r4/8/4N3/8/4K3 w - - 0 1")
            .unwrap();
        let (e3, d5) = (coord(&state, "e3"), coord(&state, "d5"));
        state.select(e3).unwrap();
        assert_eq!(state.commit(d5), Committed::Moved);
        // a8 already holds a rook, so the captured one stays in the pocket.
        assert_eq!(state.board.piece_at(coord(&state, "a8")).unwrap().code, 'r');
        assert!(state.board.piece_at(coord(&state, "h8")).is_none());
        assert_eq!(state.board.pockets[Side::White.index()].len(), 1);
    }

    #[test]
    fn pawn_returns_to_its_own_file() {
        let mut state = GameState::new(&CIRCE).unwrap();
        state
            .import_position("4k3/8/8/4p3/8/8/8/Q3K3 w - - 0 1")
            .unwrap();
        let (a1, e5) = (coord(&state, "a1"), coord(&state, "e5"));
        state.select(a1).unwrap();
        assert_eq!(state.commit(e5), Committed::Moved);
        assert_eq!(state.board.piece_at(coord(&state, "e7")).unwrap().code, 'p');
    }
}
