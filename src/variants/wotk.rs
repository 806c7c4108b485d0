// src/variants/wotk.rs
//
// Way of the Knight: both armies are made of adventurers that level up
// instead of promoting. Beating a worthy opponent (one of at least half
// the victor's level) or a deep forward march earns a level; levels 1, 5
// and 7 end with a choice between the knightly and bishoply paths. The
// game itself never ends by rule, only by resignation or agreement.

use crate::board::{Board, BoardError, Coord};
use crate::game::GameState;
use crate::movement::{self, capture, UNLIMITED};
use crate::piece::{relocate, Behaviour, MoveEffects, Piece, Side};
use crate::rules::Verdict;
use crate::variant::Variant;
use crate::variants::standard;

const INIT_POS: &[&str] = &[
    "aaaaaaaa", "aaaaaaaa", "8", "8", "8", "8", "AAAAAAAA", "AAAAAAAA",
];

/// Verdict override for games the engine must never adjudicate.
pub fn no_win(_state: &mut GameState) -> Verdict {
    Verdict::Ongoing
}

#[derive(Copy, Clone)]
enum Path {
    Knight,
    Bishop,
}

// Jump tables for the levels no standard archetype covers.
const VERTICAL_TWO: &[(i32, i32)] = &[(0, 2), (0, -2)];
const ALFIL_DABBABA: &[(i32, i32)] = &[
    (2, 0), (-2, 0), (0, 2), (0, -2),
    (2, 2), (-2, 2), (2, -2), (-2, -2),
];
const DABBABA: &[(i32, i32)] = &[(2, 0), (-2, 0), (0, 2), (0, -2)];
const FERZ_DABBABA_CAMEL: &[(i32, i32)] = &[
    (1, 1), (-1, 1), (1, -1), (-1, -1),
    (2, 0), (-2, 0), (0, 2), (0, -2),
    (1, 3), (-1, 3), (1, -3), (-1, -3),
    (3, 1), (3, -1), (-3, 1), (-3, -1),
];

/// Past the crossroads levels the next step is fixed; `None` marks both a
/// crossroads (the player chooses) and the summit.
fn next_code(level: u8, path: Option<Path>) -> Option<char> {
    match (level, path) {
        (2, Some(Path::Knight)) => Some('n'),
        (2, Some(Path::Bishop)) => Some('b'),
        (3, Some(Path::Knight)) => Some('e'),
        (3, Some(Path::Bishop)) => Some('f'),
        (4, _) => Some('r'),
        (6, _) => Some('h'),
        (8, _) => Some('i'),
        (9, _) => Some('j'),
        (10, _) => Some('k'),
        _ => None,
    }
}

struct Adventurer {
    level: u8,
    path: Option<Path>,
}

impl Behaviour for Adventurer {
    fn moves(&self, board: &Board, at: Coord) -> Vec<Coord> {
        match (self.level, self.path) {
            (1, _) => standard::PAWN.moves(board, at),
            (2, Some(Path::Knight)) => {
                let mut out = movement::orthogonals(board, at, 1);
                out.extend(movement::leaps(board, at, VERTICAL_TWO));
                out
            }
            (2, Some(Path::Bishop)) => movement::leaps(board, at, ALFIL_DABBABA),
            (3, Some(Path::Knight)) => standard::KNIGHT.moves(board, at),
            (3, Some(Path::Bishop)) => standard::BISHOP.moves(board, at),
            (4, Some(Path::Knight)) => {
                let mut out = standard::KNIGHT.moves(board, at);
                out.extend(movement::orthogonals(board, at, 1));
                out
            }
            (4, Some(Path::Bishop)) => {
                let mut out = standard::BISHOP.moves(board, at);
                out.extend(movement::leaps(board, at, DABBABA));
                out
            }
            (5, _) => standard::ROOK.moves(board, at),
            (6, Some(Path::Knight)) => movement::l_shape(board, at, 2, 1, UNLIMITED),
            (6, Some(Path::Bishop)) => movement::leaps(board, at, FERZ_DABBABA_CAMEL),
            (7, _) => {
                let mut out = standard::BISHOP.moves(board, at);
                out.extend(standard::KNIGHT.moves(board, at));
                out
            }
            (8, Some(Path::Knight)) => {
                let mut out = standard::ROOK.moves(board, at);
                out.extend(standard::KNIGHT.moves(board, at));
                out
            }
            (8, Some(Path::Bishop)) => standard::QUEEN.moves(board, at),
            (9, _) => {
                let mut out = standard::BISHOP.moves(board, at);
                out.extend(movement::l_shape(board, at, 2, 1, UNLIMITED));
                out
            }
            (10, _) => {
                let mut out = standard::ROOK.moves(board, at);
                out.extend(movement::l_shape(board, at, 2, 1, UNLIMITED));
                out
            }
            _ => standard::KING.moves(board, at),
        }
    }

    fn capture_squares(&self, board: &Board, at: Coord, hypo: bool) -> Vec<Coord> {
        match (self.level, self.path) {
            (1, _) => standard::PAWN.capture_squares(board, at, hypo),
            (2, Some(Path::Knight)) => {
                let mut out = capture::orthogonals(board, at, 1, hypo);
                out.extend(capture::leaps(board, at, VERTICAL_TWO, hypo));
                out
            }
            (2, Some(Path::Bishop)) => capture::leaps(board, at, ALFIL_DABBABA, hypo),
            (3, Some(Path::Knight)) => standard::KNIGHT.capture_squares(board, at, hypo),
            (3, Some(Path::Bishop)) => standard::BISHOP.capture_squares(board, at, hypo),
            (4, Some(Path::Knight)) => {
                let mut out = standard::KNIGHT.capture_squares(board, at, hypo);
                out.extend(capture::orthogonals(board, at, 1, hypo));
                out
            }
            (4, Some(Path::Bishop)) => {
                let mut out = standard::BISHOP.capture_squares(board, at, hypo);
                out.extend(capture::leaps(board, at, DABBABA, hypo));
                out
            }
            (5, _) => standard::ROOK.capture_squares(board, at, hypo),
            (6, Some(Path::Knight)) => capture::l_shape(board, at, 2, 1, UNLIMITED, hypo),
            (6, Some(Path::Bishop)) => capture::leaps(board, at, FERZ_DABBABA_CAMEL, hypo),
            (7, _) => {
                let mut out = standard::BISHOP.capture_squares(board, at, hypo);
                out.extend(standard::KNIGHT.capture_squares(board, at, hypo));
                out
            }
            (8, Some(Path::Knight)) => {
                let mut out = standard::ROOK.capture_squares(board, at, hypo);
                out.extend(standard::KNIGHT.capture_squares(board, at, hypo));
                out
            }
            (8, Some(Path::Bishop)) => standard::QUEEN.capture_squares(board, at, hypo),
            (9, _) => {
                let mut out = standard::BISHOP.capture_squares(board, at, hypo);
                out.extend(capture::l_shape(board, at, 2, 1, UNLIMITED, hypo));
                out
            }
            (10, _) => {
                let mut out = standard::ROOK.capture_squares(board, at, hypo);
                out.extend(capture::l_shape(board, at, 2, 1, UNLIMITED, hypo));
                out
            }
            _ => standard::KING.capture_squares(board, at, hypo),
        }
    }

    fn move_to(&self, board: &mut Board, from: Coord, to: Coord) -> MoveEffects {
        let side = match board.piece_at(from) {
            Some(p) => p.side,
            None => return MoveEffects::none(),
        };
        // A worthy prize is half the victor's level or better; the value of
        // an adventurer is its level.
        let prize = board.piece_at(to).map(|p| p.value);
        let advance = (to.y - from.y) * standard::forward(side);
        let mut effects = relocate(board, from, to);
        let earned =
            prize.map(|v| 2 * v >= self.level as u32).unwrap_or(false) || advance >= 5;
        if earned && self.level < 11 {
            if matches!(self.level, 1 | 5 | 7) {
                // Crossroads: the player picks the next form.
                effects.promotion = true;
            } else if let Some(code) = next_code(self.level, self.path) {
                let coded = match side {
                    Side::White => code.to_ascii_uppercase(),
                    _ => code,
                };
                if let Some(mut next) = piece(coded) {
                    next.moved = true;
                    board.take_piece(to);
                    board.place_piece(to, next);
                }
            }
        }
        effects
    }
}

static A1: Adventurer = Adventurer { level: 1, path: None };
static A2K: Adventurer = Adventurer { level: 2, path: Some(Path::Knight) };
static A2B: Adventurer = Adventurer { level: 2, path: Some(Path::Bishop) };
static A3K: Adventurer = Adventurer { level: 3, path: Some(Path::Knight) };
static A3B: Adventurer = Adventurer { level: 3, path: Some(Path::Bishop) };
static A4K: Adventurer = Adventurer { level: 4, path: Some(Path::Knight) };
static A4B: Adventurer = Adventurer { level: 4, path: Some(Path::Bishop) };
static A5: Adventurer = Adventurer { level: 5, path: None };
static A6K: Adventurer = Adventurer { level: 6, path: Some(Path::Knight) };
static A6B: Adventurer = Adventurer { level: 6, path: Some(Path::Bishop) };
static A7: Adventurer = Adventurer { level: 7, path: None };
static A8K: Adventurer = Adventurer { level: 8, path: Some(Path::Knight) };
static A8B: Adventurer = Adventurer { level: 8, path: Some(Path::Bishop) };
static A9: Adventurer = Adventurer { level: 9, path: None };
static A10: Adventurer = Adventurer { level: 10, path: None };
static A11: Adventurer = Adventurer { level: 11, path: None };

fn piece(code: char) -> Option<Piece> {
    let side = if code.is_ascii_uppercase() {
        Side::White
    } else {
        Side::Black
    };
    let form: &'static Adventurer = match code.to_ascii_lowercase() {
        'a' => &A1,
        'w' => &A2K,
        'd' => &A2B,
        'n' => &A3K,
        'b' => &A3B,
        'e' => &A4K,
        'f' => &A4B,
        'r' => &A5,
        's' => &A6K,
        'g' => &A6B,
        'h' => &A7,
        'c' => &A8K,
        'q' => &A8B,
        'i' => &A9,
        'j' => &A10,
        'k' => &A11,
        _ => return None,
    };
    Some(Piece::new(code, "Adventurer", form.level as u32, side, false, form))
}

fn board() -> Result<Board, BoardError> {
    let mut board = Board::construct(8, 8, standard::LAYOUT)?;
    board.populate(INIT_POS, piece)?;
    Ok(board)
}

fn crossroads(state: &GameState, at: Coord) -> Vec<char> {
    let level = match state.board.piece_at(at) {
        Some(p) => p.value,
        None => return Vec::new(),
    };
    match level {
        1 => vec!['w', 'd'],
        5 => vec!['s', 'g'],
        7 => vec!['c', 'q'],
        _ => Vec::new(),
    }
}

pub static WOTK: Variant = Variant {
    name: "wotk",
    title: "Way of the Knight",
    blurb: "Armies of adventurers that level up through eleven forms along two paths.",
    board,
    pieces: piece,
    game_start: None,
    after_move: None,
    after_capture: None,
    move_filter: None,
    capture_filter: None,
    win: Some(no_win),
    promotions: Some(crossroads),
    online_play: false,
};
