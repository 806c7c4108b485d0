// src/variants/checkers.rs
//
// English draughts on the chess engine. A capture is committed by clicking
// the victim; the piece lands on the square beyond it. Captures are forced,
// multi-jumps keep the turn (and pin selection to the jumping piece), and
// a man reaching the far rank is crowned, which ends the jump.

use crate::board::{Board, BoardError, Coord};
use crate::game::GameState;
use crate::movement;
use crate::piece::{relocate, Behaviour, MoveEffects, Piece, Side};
use crate::rules::{Verdict, WinReason};
use crate::variant::Variant;
use crate::variants::standard;

const INIT_POS: &[&str] = &[
    "1m1m1m1m", "m1m1m1m1", "1m1m1m1m", "8", "8", "M1M1M1M1", "1M1M1M1M", "M1M1M1M1",
];

// --- Jump geometry ---

fn jump_dirs(piece: &Piece) -> Vec<i32> {
    if piece.name == "King" {
        vec![-1, 1]
    } else {
        vec![standard::forward(piece.side)]
    }
}

/// Victim squares this piece can jump right now. The landing square is
/// always the victim's square reflected through the victim.
fn jumps_from(board: &Board, at: Coord) -> Vec<Coord> {
    let piece = match board.piece_at(at) {
        Some(p) => p,
        None => return Vec::new(),
    };
    let mut out = Vec::new();
    for dy in jump_dirs(piece) {
        for dx in [-1, 1] {
            let victim = at.offset(dx, dy);
            let landing = at.offset(2 * dx, 2 * dy);
            let victim_ok = board
                .piece_at(victim)
                .map(|v| piece.side.hostile_to(v.side))
                .unwrap_or(false);
            let landing_ok = board
                .get(landing)
                .map(|t| t.is_playable() && t.piece.is_none())
                .unwrap_or(false);
            if victim_ok && landing_ok {
                out.push(victim);
            }
        }
    }
    out
}

fn side_has_jump(board: &Board, side: Side) -> bool {
    board
        .pieces_of(side)
        .into_iter()
        .any(|c| !jumps_from(board, c).is_empty())
}

fn crown(board: &mut Board, at: Coord) -> bool {
    let side = match board.piece_at(at) {
        Some(p) if p.name == "Man" => p.side,
        _ => return false,
    };
    if at.y != standard::promotion_rank(board, side) {
        return false;
    }
    let code = if side == Side::White { 'K' } else { 'k' };
    board.take_piece(at);
    if let Some(mut king) = piece(code) {
        king.moved = true;
        board.place_piece(at, king);
    }
    true
}

/// Shared move execution. A hostile destination is a jump: the victim is
/// lifted and the mover lands beyond it. Crowning ends a jump chain;
/// otherwise a further jump from the landing square holds the turn open
/// and pins selection to the jumper.
fn execute(board: &mut Board, from: Coord, to: Coord) -> MoveEffects {
    let jumping = match (board.piece_at(from), board.piece_at(to)) {
        (Some(mover), Some(victim)) => mover.side.hostile_to(victim.side),
        _ => false,
    };
    let (effects, landing) = if jumping {
        let landing = to.offset(to.x - from.x, to.y - from.y);
        let mut mover = match board.take_piece(from) {
            Some(p) => p,
            None => return MoveEffects::none(),
        };
        mover.moved = true;
        let victim = board.take_piece(to);
        board.place_piece(landing, mover);
        let effects = MoveEffects {
            captured: victim,
            captured_at: Some(to),
            landed: Some(landing),
            promotion: false,
        };
        (effects, landing)
    } else {
        (relocate(board, from, to), to)
    };
    let crowned = crown(board, landing);
    if effects.captured.is_some() && !crowned && !jumps_from(board, landing).is_empty() {
        board.aux.end_turn = false;
        board.aux.select_again = Some(landing);
    } else {
        board.aux.end_turn = true;
        board.aux.select_again = None;
    }
    effects
}

// --- Behaviours ---

pub struct Man;

impl Behaviour for Man {
    fn moves(&self, board: &Board, at: Coord) -> Vec<Coord> {
        let piece = match board.piece_at(at) {
            Some(p) => p,
            None => return Vec::new(),
        };
        if board.aux.select_again.is_some() || side_has_jump(board, piece.side) {
            return Vec::new();
        }
        let dir = standard::forward(piece.side);
        let mut out = movement::diagonal(board, at, 1, dir, 1);
        out.extend(movement::diagonal(board, at, -1, dir, 1));
        out
    }

    fn capture_squares(&self, board: &Board, at: Coord, hypo: bool) -> Vec<Coord> {
        if !hypo {
            let on_turn = board
                .piece_at(at)
                .map(|p| p.side == board.turn())
                .unwrap_or(false);
            if !on_turn {
                return Vec::new();
            }
        }
        jumps_from(board, at)
    }

    fn move_to(&self, board: &mut Board, from: Coord, to: Coord) -> MoveEffects {
        execute(board, from, to)
    }
}

pub struct CrownedKing;

impl Behaviour for CrownedKing {
    fn moves(&self, board: &Board, at: Coord) -> Vec<Coord> {
        let piece = match board.piece_at(at) {
            Some(p) => p,
            None => return Vec::new(),
        };
        if board.aux.select_again.is_some() || side_has_jump(board, piece.side) {
            return Vec::new();
        }
        movement::diagonals(board, at, 1)
    }

    fn capture_squares(&self, board: &Board, at: Coord, hypo: bool) -> Vec<Coord> {
        if !hypo {
            let on_turn = board
                .piece_at(at)
                .map(|p| p.side == board.turn())
                .unwrap_or(false);
            if !on_turn {
                return Vec::new();
            }
        }
        jumps_from(board, at)
    }

    fn move_to(&self, board: &mut Board, from: Coord, to: Coord) -> MoveEffects {
        execute(board, from, to)
    }
}

static MAN: Man = Man;
static CROWNED: CrownedKing = CrownedKing;

fn piece(code: char) -> Option<Piece> {
    let side = if code.is_ascii_uppercase() {
        Side::White
    } else {
        Side::Black
    };
    let piece = match code.to_ascii_lowercase() {
        'm' => Piece::new(code, "Man", 1, side, false, &MAN),
        'k' => Piece::new(code, "King", 2, side, false, &CROWNED),
        _ => return None,
    };
    Some(piece)
}

fn board() -> Result<Board, BoardError> {
    let mut board = Board::construct(8, 8, standard::LAYOUT)?;
    board.populate(INIT_POS, piece)?;
    // Dark moves first.
    board.turn_number = 1;
    Ok(board)
}

// --- Turn and verdict ---

fn chained_turns(state: &mut GameState) {
    if state.board.aux.end_turn {
        state.board.aux.select_again = None;
        state.board.progress_turn();
    } else {
        state.board.aux.end_turn = true;
    }
}

/// You lose when you are out of pieces or out of moves. No royals, no
/// check; a jump chain in progress is never judged.
fn last_side_standing(state: &mut GameState) -> Verdict {
    if state.board.aux.select_again.is_some() {
        return Verdict::Ongoing;
    }
    let side = state.board.turn();
    let pieces = state.board.pieces_of(side);
    if pieces.is_empty() {
        return Verdict::Win(side.opponent(), WinReason::Elimination);
    }
    let stuck = pieces.iter().all(|&at| {
        match state.board.piece_at(at) {
            Some(p) => {
                p.behaviour.moves(&state.board, at).is_empty()
                    && p.behaviour.capture_squares(&state.board, at, false).is_empty()
            }
            None => true,
        }
    });
    if stuck {
        return Verdict::Win(side.opponent(), WinReason::Elimination);
    }
    Verdict::Ongoing
}

pub static CHECKERS: Variant = Variant {
    name: "checkers",
    title: "Checkers",
    blurb: "English draughts: forced captures, multi-jumps, crowned kings.",
    board,
    pieces: piece,
    game_start: None,
    after_move: Some(chained_turns),
    after_capture: None,
    move_filter: None,
    capture_filter: None,
    win: Some(last_side_standing),
    promotions: None,
    online_play: false,
};
