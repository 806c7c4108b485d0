// src/variants/chad.rs
//
// Chad: two walled castles on a 12x12 field. A piece may capture only
// across a wall, in two scenarios: standing on the enemy wall and taking a
// piece inside the enemy castle, or standing inside its own castle and
// taking a piece on its own wall. Check detection ignores the restriction
// and follows ordinary lines of sight, and kings are exempt from it,
// capturing as they move.

use crate::board::{Board, BoardError, Coord};
use crate::movement::{self, capture, UNLIMITED};
use crate::piece::{relocate, Behaviour, MoveEffects, Piece, Side};
use crate::rules;
use crate::variant::Variant;

const LAYOUT: &[&str] = &["93"; 12];
const INIT_POS: &[&str] = &[
    "93", "93", "7rrr2", "7rkr2", "7rrr2", "93",
    "93", "2RRR7", "2RKR7", "2RRR7", "93", "93",
];

// Indexed by Side::index(): White's wall and castle first.
const WALLS: [&[(i32, i32)]; 2] = [
    &[
        (2, 6), (3, 6), (4, 6), (1, 7), (1, 8), (1, 9),
        (5, 7), (5, 8), (5, 9), (2, 10), (3, 10), (4, 10),
    ],
    &[
        (7, 1), (8, 1), (9, 1), (6, 2), (6, 3), (6, 4),
        (10, 2), (10, 3), (10, 4), (7, 5), (8, 5), (9, 5),
    ],
];
const CASTLES: [&[(i32, i32)]; 2] = [
    &[
        (2, 7), (3, 7), (4, 7), (2, 8), (3, 8), (4, 8),
        (2, 9), (3, 9), (4, 9),
    ],
    &[
        (7, 2), (8, 2), (9, 2), (7, 3), (8, 3), (9, 3),
        (7, 4), (8, 4), (9, 4),
    ],
];

fn on(zone: &[(i32, i32)], at: Coord) -> bool {
    zone.contains(&(at.x, at.y))
}

/// The wall rule: keeps only the raw capture targets the capturer's
/// position entitles it to. From anywhere else it captures nothing.
fn across_the_wall(side: Side, from: Coord, raw: Vec<Coord>) -> Vec<Coord> {
    let us = side.index();
    let them = side.opponent().index();
    if on(WALLS[them], from) {
        raw.into_iter().filter(|c| on(CASTLES[them], *c)).collect()
    } else if on(CASTLES[us], from) {
        raw.into_iter().filter(|c| on(WALLS[us], *c)).collect()
    } else {
        Vec::new()
    }
}

/// Squares `side` covers, royals excluded. The kings filter their own
/// reach through this, so including them would chase the two kings round
/// in circles.
fn cover_excluding_royals(board: &Board, side: Side) -> Vec<Coord> {
    let mut out = Vec::new();
    for at in board.pieces_of(side) {
        let piece = match board.piece_at(at) {
            Some(p) if !p.royal => p,
            _ => continue,
        };
        for c in piece.behaviour.capture_squares(board, at, true) {
            if !out.contains(&c) {
                out.push(c);
            }
        }
    }
    out
}

/// Orthogonal slider worth one point. Entering the enemy castle promotes
/// it on the spot.
pub struct ChadRook;

impl Behaviour for ChadRook {
    fn moves(&self, board: &Board, at: Coord) -> Vec<Coord> {
        movement::orthogonals(board, at, UNLIMITED)
    }

    fn capture_squares(&self, board: &Board, at: Coord, hypo: bool) -> Vec<Coord> {
        let raw = capture::orthogonals(board, at, UNLIMITED, hypo);
        if hypo {
            return raw;
        }
        match board.piece_at(at) {
            Some(p) => across_the_wall(p.side, at, raw),
            None => Vec::new(),
        }
    }

    fn move_to(&self, board: &mut Board, from: Coord, to: Coord) -> MoveEffects {
        let side = match board.piece_at(from) {
            Some(p) => p.side,
            None => return MoveEffects::none(),
        };
        let effects = relocate(board, from, to);
        if on(CASTLES[side.opponent().index()], to) {
            let code = if side == Side::White { 'Q' } else { 'q' };
            if let Some(mut queen) = piece(code) {
                queen.moved = true;
                board.take_piece(to);
                board.place_piece(to, queen);
            }
        }
        effects
    }

    fn lines_of_sight(&self, board: &Board, at: Coord) -> Vec<Vec<Coord>> {
        [(1, 0), (-1, 0), (0, 1), (0, -1)]
            .into_iter()
            .map(|(dx, dy)| movement::sight(board, at, dx, dy, UNLIMITED))
            .filter(|line| !line.is_empty())
            .collect()
    }
}

/// What a rook becomes inside the enemy castle: a full slider worth two.
pub struct ChadQueen;

impl Behaviour for ChadQueen {
    fn moves(&self, board: &Board, at: Coord) -> Vec<Coord> {
        let mut out = movement::orthogonals(board, at, UNLIMITED);
        out.extend(movement::diagonals(board, at, UNLIMITED));
        out
    }

    fn capture_squares(&self, board: &Board, at: Coord, hypo: bool) -> Vec<Coord> {
        let mut raw = capture::orthogonals(board, at, UNLIMITED, hypo);
        raw.extend(capture::diagonals(board, at, UNLIMITED, hypo));
        if hypo {
            return raw;
        }
        match board.piece_at(at) {
            Some(p) => across_the_wall(p.side, at, raw),
            None => Vec::new(),
        }
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

/// A king that never leaves its castle. It steps one square any way or
/// leaps like a knight, shunning covered squares, and takes invaders
/// without regard for the wall rule.
pub struct ChadKing;

impl ChadKing {
    fn reach(board: &Board, at: Coord) -> Vec<Coord> {
        let mut out = movement::orthogonals(board, at, 1);
        out.extend(movement::diagonals(board, at, 1));
        out.extend(movement::l_shape(board, at, 2, 1, 1));
        out
    }
}

impl Behaviour for ChadKing {
    fn moves(&self, board: &Board, at: Coord) -> Vec<Coord> {
        let side = match board.piece_at(at) {
            Some(p) => p.side,
            None => return Vec::new(),
        };
        let mut out = ChadKing::reach(board, at);
        let danger = rules::attack_map(board, side.opponent());
        out.retain(|c| on(CASTLES[side.index()], *c) && !danger.contains(c));
        out
    }

    fn capture_squares(&self, board: &Board, at: Coord, hypo: bool) -> Vec<Coord> {
        let side = match board.piece_at(at) {
            Some(p) => p.side,
            None => return Vec::new(),
        };
        let mut out = capture::orthogonals(board, at, 1, hypo);
        out.extend(capture::diagonals(board, at, 1, hypo));
        out.extend(capture::l_shape(board, at, 2, 1, 1, hypo));
        // The castle confinement holds even hypothetically; a king only
        // ever threatens squares it could actually occupy.
        let danger = cover_excluding_royals(board, side.opponent());
        out.retain(|c| on(CASTLES[side.index()], *c) && !danger.contains(c));
        out
    }
}

static CHAD_ROOK: ChadRook = ChadRook;
static CHAD_QUEEN: ChadQueen = ChadQueen;
static CHAD_KING: ChadKing = ChadKing;

fn piece(code: char) -> Option<Piece> {
    let side = if code.is_ascii_uppercase() {
        Side::White
    } else {
        Side::Black
    };
    let piece = match code.to_ascii_lowercase() {
        'r' => Piece::new(code, "Rook", 1, side, false, &CHAD_ROOK),
        'q' => Piece::new(code, "Queen", 2, side, false, &CHAD_QUEEN),
        'k' => Piece::new(code, "King", 0, side, true, &CHAD_KING),
        _ => return None,
    };
    Some(piece)
}

fn board() -> Result<Board, BoardError> {
    let mut board = Board::construct(12, 12, LAYOUT)?;
    board.populate(INIT_POS, piece)?;
    Ok(board)
}

pub static CHAD: Variant = Variant {
    name: "chad",
    title: "Chad",
    blurb: "Eight rooks a side besiege two walled castles; captures only happen across a wall.",
    board,
    pieces: piece,
    game_start: None,
    after_move: None,
    after_capture: None,
    move_filter: None,
    capture_filter: None,
    win: None,
    promotions: None,
    online_play: false,
};
