// src/variants/duck.rs
//
// Duck chess: every turn is two sub-moves. The player first moves one of
// their own pieces, then relocates the duck to any empty square. The duck
// belongs to no one, captures nothing and cannot be captured; it just sits
// there, blocking lines.

use crate::board::{Board, BoardError, Coord};
use crate::game::{expire_en_passant, GameState};
use crate::movement;
use crate::piece::{Behaviour, Piece, Side};
use crate::variant::Variant;
use crate::variants::standard;

const INIT_POS: &[&str] = &[
    "rnbqkbnr", "pppppppp", "8", "d7", "8", "8", "PPPPPPPP", "RNBQKBNR",
];

struct DuckMoves;

impl Behaviour for DuckMoves {
    fn moves(&self, board: &Board, at: Coord) -> Vec<Coord> {
        movement::anywhere(board, at)
    }

    fn capture_squares(&self, _board: &Board, _at: Coord, _hypo: bool) -> Vec<Coord> {
        Vec::new()
    }
}

static DUCK_MOVES: DuckMoves = DuckMoves;

fn is_duck(board: &Board, at: Coord) -> bool {
    board.piece_at(at).map(|p| p.name == "Duck").unwrap_or(false)
}

fn piece(code: char) -> Option<Piece> {
    if code == 'd' {
        return Some(Piece::new('d', "Duck", 0, Side::Any, false, &DUCK_MOVES));
    }
    standard::piece(code)
}

fn board() -> Result<Board, BoardError> {
    let mut board = Board::construct(8, 8, standard::LAYOUT)?;
    board.populate(INIT_POS, piece)?;
    Ok(board)
}

// Sub-move 0 is the piece move, sub-move 1 the duck drop; each filter
// admits only the right kind of mover for the current sub-move.
fn only_movers(state: &GameState, at: Coord, moves: &mut Vec<Coord>) {
    let duck_phase = state.board.aux.submove == 1;
    if is_duck(&state.board, at) != duck_phase {
        moves.clear();
    }
}

fn no_duck_phase_captures(state: &GameState, _at: Coord, captures: &mut Vec<Coord>) {
    if state.board.aux.submove == 1 {
        captures.clear();
    }
}

fn two_submove_turn(state: &mut GameState) {
    if state.board.aux.submove == 0 {
        // Same player keeps the turn for the duck drop.
        state.board.aux.submove = 1;
    } else {
        state.board.aux.submove = 0;
        state.board.progress_turn();
        expire_en_passant(&mut state.board);
    }
}

pub static DUCK: Variant = Variant {
    name: "duck",
    title: "Duck Chess",
    blurb: "After each move the mover parks an uncapturable duck on any empty square.",
    board,
    pieces: piece,
    game_start: None,
    after_move: Some(two_submove_turn),
    after_capture: None,
    move_filter: Some(only_movers),
    capture_filter: Some(no_duck_phase_captures),
    win: None,
    promotions: None,
    online_play: false,
};
