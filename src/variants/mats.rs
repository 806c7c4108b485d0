// src/variants/mats.rs
//
// Maharajah and the sepoys: a lone white super-piece against the full
// black army. The maharajah moves as queen and knight combined but is
// forbidden from entering or capturing into any attacked square, so the
// sepoys win by boxing it in and taking it.

use crate::board::{Board, BoardError, Coord};
use crate::game::GameState;
use crate::movement::{self, capture, UNLIMITED};
use crate::piece::{Behaviour, Piece, Side};
use crate::rules::{self, Verdict, WinReason};
use crate::variant::Variant;
use crate::variants::standard;

const INIT_POS: &[&str] = &[
    "rnbqkbnr", "pppppppp", "8", "8", "8", "8", "8", "4M3",
];

pub struct Maharajah;

impl Behaviour for Maharajah {
    fn moves(&self, board: &Board, at: Coord) -> Vec<Coord> {
        let piece = match board.piece_at(at) {
            Some(p) => p,
            None => return Vec::new(),
        };
        let mut out = movement::orthogonals(board, at, UNLIMITED);
        out.extend(movement::diagonals(board, at, UNLIMITED));
        out.extend(movement::l_shape(board, at, 2, 1, 1));
        // It may never stand where the sepoys could take it.
        let danger = rules::attack_map(board, piece.side.opponent());
        out.retain(|c| !danger.contains(c));
        out
    }

    fn capture_squares(&self, board: &Board, at: Coord, hypo: bool) -> Vec<Coord> {
        let mut out = capture::orthogonals(board, at, UNLIMITED, hypo);
        out.extend(capture::diagonals(board, at, UNLIMITED, hypo));
        out.extend(capture::l_shape(board, at, 2, 1, 1, hypo));
        if !hypo {
            if let Some(piece) = board.piece_at(at) {
                let danger = rules::attack_map(board, piece.side.opponent());
                out.retain(|c| !danger.contains(c));
            }
        }
        out
    }

    fn lines_of_sight(&self, board: &Board, at: Coord) -> Vec<Vec<Coord>> {
        let dirs = [
            (1, 0), (-1, 0), (0, 1), (0, -1),
            (1, 1), (1, -1), (-1, 1), (-1, -1),
        ];
        dirs.into_iter()
            .map(|(dx, dy)| movement::sight(board, at, dx, dy, UNLIMITED))
            .filter(|line| !line.is_empty())
            .collect()
    }
}

static MAHARAJAH: Maharajah = Maharajah;

fn piece(code: char) -> Option<Piece> {
    if code == 'M' {
        return Some(Piece::new('M', "Maharajah", 13, Side::White, false, &MAHARAJAH));
    }
    standard::piece(code)
}

fn board() -> Result<Board, BoardError> {
    let mut board = Board::construct(8, 8, standard::LAYOUT)?;
    board.populate(INIT_POS, piece)?;
    Ok(board)
}

// White has no royal, so mate detection never fires for it; losing the
// maharajah is the loss condition.
fn sepoys_win_by_elimination(state: &mut GameState) -> Verdict {
    if state.board.pieces_of(Side::White).is_empty() {
        return Verdict::Win(Side::Black, WinReason::Elimination);
    }
    rules::win(&mut state.board)
}

pub static MATS: Variant = Variant {
    name: "mats",
    title: "Maharajah and the Sepoys",
    blurb: "A lone queen-plus-knight piece that shuns attacked squares faces the full army.",
    board,
    pieces: piece,
    game_start: None,
    after_move: None,
    after_capture: None,
    move_filter: None,
    capture_filter: None,
    win: Some(sepoys_win_by_elimination),
    promotions: None,
    online_play: false,
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notation::algebraic_to_coord;

    fn sq(state: &GameState, name: &str) -> Coord {
        algebraic_to_coord(&state.board, name).unwrap()
    }

    #[test]
    fn maharajah_shuns_attacked_squares() {
        let mut state = GameState::new(&MATS).unwrap();
        let e1 = sq(&state, "e1");
        let dests = state.select(e1).unwrap().clone();
        // e6 is covered by the d7 and f7 pawns; e5 is safe.
        assert!(!dests.moves.contains(&sq(&state, "e6")));
        assert!(dests.moves.contains(&sq(&state, "e5")));
        // The e7 pawn is in reach but defended, so no capture is offered.
        assert!(dests.captures.is_empty());
    }

    #[test]
    fn maharajah_takes_only_undefended_pieces() {
        let mut state = GameState::new(&MATS).unwrap();
        state
            .import_position("3rk3/8/8/3r4/8/8/8/3M4 w - - 0 1")
            .unwrap();
        let d1 = sq(&state, "d1");
        let d5 = sq(&state, "d5");
        let dests = state.select(d1).unwrap().clone();
        assert!(!dests.captures.contains(&d5));
        state.deselect();
        // Remove the defender and the capture opens up.
        state
            .import_position("4k3/8/8/3r4/8/8/8/3M4 w - - 0 1")
            .unwrap();
        state.select(d1).unwrap();
        assert!(state.destinations.captures.contains(&d5));
        assert_eq!(state.commit(d5), crate::game::Committed::Moved);
        assert_eq!(state.board.piece_at(d5).unwrap().code, 'M');
    }

    #[test]
    fn losing_the_maharajah_loses_the_game() {
        let mut state = GameState::new(&MATS).unwrap();
        state
            .import_position("4k3/8/8/8/8/8/3r4/3M4 b - - 0 1")
            .unwrap();
        let d2 = sq(&state, "d2");
        let d1 = sq(&state, "d1");
        state.select(d2).unwrap();
        assert_eq!(state.commit(d1), crate::game::Committed::Moved);
        assert_eq!(state.verdict, Verdict::Win(Side::Black, WinReason::Elimination));
    }
}
