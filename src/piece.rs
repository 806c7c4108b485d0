// src/piece.rs
//
// Pieces carry their identity (code, name, value, side, royal flag) plus a
// shared behaviour object. One behaviour instance per archetype serves both
// colours; anything colour-dependent is read off the piece at query time.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::board::{Board, Coord};

// --- Sides ---

/// `Any` is the colourless side used by pieces that belong to neither
/// player (the duck, probe sentinels). It is never "to move" but its pieces
/// may still act when a variant hands them the turn.
#[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Side {
    White,
    Black,
    Any,
}

impl Side {
    pub fn opponent(&self) -> Side {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
            Side::Any => Side::Any,
        }
    }

    /// Pocket/clock index. `Any` never owns a pocket.
    pub fn index(&self) -> usize {
        match self {
            Side::White => 0,
            Side::Black | Side::Any => 1,
        }
    }

    /// True when a piece of this side is hostile to a piece of `other`.
    /// `Any` is hostile to no one and no one is hostile to it.
    pub fn hostile_to(&self, other: Side) -> bool {
        match (self, other) {
            (Side::Any, _) | (_, Side::Any) => false,
            (a, b) => *a != b,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::White => write!(f, "White"),
            Side::Black => write!(f, "Black"),
            Side::Any => write!(f, "Neutral"),
        }
    }
}

// --- Move effects ---

/// What a committed move did beyond relocating the piece. The game layer
/// pockets the capture, runs the variant hooks, and opens the promotion
/// prompt when asked to.
#[derive(Debug, Default)]
pub struct MoveEffects {
    pub captured: Option<Piece>,
    pub captured_at: Option<Coord>,
    /// Where the mover ended up. Differs from the committed square for
    /// checkers jumps (the landing lies beyond the victim) and matters to
    /// hooks when an en passant capture lands off the victim's square.
    pub landed: Option<Coord>,
    pub promotion: bool,
}

impl MoveEffects {
    pub fn none() -> Self {
        MoveEffects::default()
    }
}

// --- Behaviour contract ---

/// The capability contract every archetype implements. Implementations are
/// `'static` values shared by every piece of that archetype, both colours.
pub trait Behaviour: Sync {
    /// Legal non-capturing destinations for the piece at `at`. Empty when it
    /// is not that piece's side's turn. Never includes occupied or locked
    /// squares.
    fn moves(&self, board: &Board, at: Coord) -> Vec<Coord>;

    /// Squares this piece captures on. With `hypo` set, every square it
    /// threatens regardless of occupancy and regardless of whose turn it is;
    /// this is what check detection and attack maps are built from. Without
    /// it, only squares holding a capturable enemy piece, gated on turn and
    /// on the locked flag.
    fn capture_squares(&self, board: &Board, at: Coord, hypo: bool) -> Vec<Coord>;

    /// Executes the move, including side effects (en passant removal,
    /// castling rook hop, jump landing, promotion request).
    fn move_to(&self, board: &mut Board, from: Coord, to: Coord) -> MoveEffects {
        relocate(board, from, to)
    }

    /// Ordered ray squares for sliding pieces, one vector per ray, each ray
    /// running up to and including the first occupied square. Leapers return
    /// nothing; check resolution probes them instead.
    fn lines_of_sight(&self, board: &Board, at: Coord) -> Vec<Vec<Coord>> {
        let _ = (board, at);
        Vec::new()
    }
}

/// Plain relocation: capture whatever sits on `to`, then hand the piece from
/// one slot to the other. The `moved` flag is set here so castling and
/// double-step eligibility decay uniformly.
pub fn relocate(board: &mut Board, from: Coord, to: Coord) -> MoveEffects {
    let captured = board.take_piece(to);
    if let Some(mut piece) = board.take_piece(from) {
        piece.moved = true;
        board.place_piece(to, piece);
    }
    MoveEffects {
        captured_at: captured.as_ref().map(|_| to),
        captured,
        landed: Some(to),
        promotion: false,
    }
}

// --- Pieces ---

pub struct Piece {
    /// The factory-table character; doubles as the display glyph.
    pub code: char,
    pub name: &'static str,
    pub value: u32,
    pub side: Side,
    pub royal: bool,
    pub behaviour: &'static dyn Behaviour,
    pub moved: bool,
    pub en_passantable: bool,
}

impl Piece {
    pub fn new(
        code: char,
        name: &'static str,
        value: u32,
        side: Side,
        royal: bool,
        behaviour: &'static dyn Behaviour,
    ) -> Self {
        Piece {
            code,
            name,
            value,
            side,
            royal,
            behaviour,
            moved: false,
            en_passantable: false,
        }
    }
}

impl Clone for Piece {
    fn clone(&self) -> Self {
        Piece {
            code: self.code,
            name: self.name,
            value: self.value,
            side: self.side,
            royal: self.royal,
            behaviour: self.behaviour,
            moved: self.moved,
            en_passantable: self.en_passantable,
        }
    }
}

impl fmt::Debug for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Piece")
            .field("code", &self.code)
            .field("name", &self.name)
            .field("side", &self.side)
            .field("moved", &self.moved)
            .finish()
    }
}

impl PartialEq for Piece {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code
            && self.side == other.side
            && self.moved == other.moved
            && self.en_passantable == other.en_passantable
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code)
    }
}

// --- Probe sentinel ---

/// An inert blocker used by check resolution to test whether occupying a
/// square would cut an attack. It moves nowhere and captures nothing.
pub struct Inert;

impl Behaviour for Inert {
    fn moves(&self, _board: &Board, _at: Coord) -> Vec<Coord> {
        Vec::new()
    }

    fn capture_squares(&self, _board: &Board, _at: Coord, _hypo: bool) -> Vec<Coord> {
        Vec::new()
    }
}

static INERT: Inert = Inert;

impl Piece {
    pub fn sentinel() -> Piece {
        Piece::new('#', "Sentinel", 0, Side::Any, false, &INERT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;

    #[test]
    fn hostility_rules() {
        assert!(Side::White.hostile_to(Side::Black));
        assert!(Side::Black.hostile_to(Side::White));
        assert!(!Side::White.hostile_to(Side::White));
        assert!(!Side::Any.hostile_to(Side::White));
        assert!(!Side::Black.hostile_to(Side::Any));
    }

    #[test]
    fn relocate_is_single_slot_handoff() {
        let mut board = Board::construct(8, 8, &["8"; 8]).unwrap();
        let from = Coord::new(0, 0);
        let to = Coord::new(0, 5);
        board.place_piece(from, Piece::sentinel());
        let effects = relocate(&mut board, from, to);
        assert!(effects.captured.is_none());
        assert!(board.piece_at(from).is_none());
        let moved = board.piece_at(to).unwrap();
        assert!(moved.moved);
    }

    #[test]
    fn relocate_reports_capture() {
        let mut board = Board::construct(8, 8, &["8"; 8]).unwrap();
        let from = Coord::new(0, 0);
        let to = Coord::new(1, 1);
        board.place_piece(from, Piece::sentinel());
        board.place_piece(to, Piece::sentinel());
        let effects = relocate(&mut board, from, to);
        assert!(effects.captured.is_some());
        assert_eq!(effects.captured_at, Some(to));
    }
}
