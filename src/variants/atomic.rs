// src/variants/atomic.rs
//
// Atomic chess: every capture detonates. The capturing piece and all
// pieces adjacent to the capture square are removed, pawns excepted; the
// victim is already gone by the time the blast goes off.

use crate::board::Coord;
use crate::game::GameState;
use crate::piece::Piece;
use crate::variant::Variant;
use crate::variants::standard;

// The blast is centred on the capturer's landing square, so an en passant
// capture detonates where the pawn lands, not where the victim stood.
fn explode(state: &mut GameState, at: Coord, _captured: &Piece) {
    for dx in -1..=1 {
        for dy in -1..=1 {
            if dx == 0 && dy == 0 {
                continue;
            }
            let c = at.offset(dx, dy);
            let fragile = state
                .board
                .piece_at(c)
                .map(|p| p.name != "Pawn")
                .unwrap_or(false);
            if fragile {
                state.board.take_piece(c);
            }
        }
    }
    // The capturer goes up with the blast, pawn or not.
    state.board.take_piece(at);
}

pub static ATOMIC: Variant = Variant {
    name: "atomic",
    title: "Atomic Chess",
    blurb: "Captures explode, removing the capturer and every adjacent piece except pawns.",
    board: standard::board,
    pieces: standard::piece,
    game_start: None,
    after_move: None,
    after_capture: Some(explode),
    move_filter: None,
    capture_filter: None,
    win: None,
    promotions: None,
    online_play: false,
};
