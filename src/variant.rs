// src/variant.rs
//
// A variant is a record of data plus optional hook functions, not a type
// hierarchy. Whatever a variant leaves as `None` falls through to the
// default turn cycle and the default win evaluation.

use lazy_static::lazy_static;

use crate::board::{Board, BoardError, Coord};
use crate::game::GameState;
use crate::piece::Piece;
use crate::rules::Verdict;

/// Per-variant piece table: maps an initpos/notation character to a fresh
/// piece. Snapshots and position imports rebuild pieces through this.
pub type PieceFactory = fn(char) -> Option<Piece>;

pub struct Variant {
    /// Registry key, as typed at the variant prompt.
    pub name: &'static str,
    pub title: &'static str,
    /// Almanac entry.
    pub blurb: &'static str,
    pub board: fn() -> Result<Board, BoardError>,
    pub pieces: PieceFactory,
    /// Runs once after the board is built (Fischer random shuffles here).
    pub game_start: Option<fn(&mut GameState)>,
    /// Replaces the default end-of-move bookkeeping (turn progression and
    /// en passant expiry).
    pub after_move: Option<fn(&mut GameState)>,
    /// Runs after a capture lands; `Coord` is the square the capturer
    /// landed on (not the victim's square when those differ).
    pub after_capture: Option<fn(&mut GameState, Coord, &Piece)>,
    /// Prunes the destination lists a selection offers.
    pub move_filter: Option<fn(&GameState, Coord, &mut Vec<Coord>)>,
    pub capture_filter: Option<fn(&GameState, Coord, &mut Vec<Coord>)>,
    /// Replaces the default verdict evaluation.
    pub win: Option<fn(&mut GameState) -> Verdict>,
    /// Restricts what a promotion at `Coord` may become. `None` admits any
    /// non-royal piece of the mover's side from the piece table.
    pub promotions: Option<fn(&GameState, Coord) -> Vec<char>>,
    /// Reserved: no networking is implemented.
    pub online_play: bool,
}

lazy_static! {
    /// Every playable variant, in menu order.
    pub static ref REGISTRY: Vec<&'static Variant> = vec![
        &crate::variants::standard::STANDARD,
        &crate::variants::fischer_random::FISCHER_RANDOM,
        &crate::variants::atomic::ATOMIC,
        &crate::variants::circe::CIRCE,
        &crate::variants::duck::DUCK,
        &crate::variants::checkers::CHECKERS,
        &crate::variants::revolt::REVOLT,
        &crate::variants::mats::MATS,
        &crate::variants::chad::CHAD,
        &crate::variants::wotk::WOTK,
    ];
}

pub fn find(name: &str) -> Option<&'static Variant> {
    REGISTRY
        .iter()
        .copied()
        .find(|v| v.name.eq_ignore_ascii_case(name.trim()))
}
