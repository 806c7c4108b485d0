// src/game.rs
//
// The live game: board + variant + move log + selection, driven by the
// select/commit cycle. The shell (or any front end) only ever talks to
// this type; illegal destinations are silent no-ops so a click on a bad
// square never needs an error path.

use std::error::Error;
use std::fmt;
use std::fs;
use std::io;
use std::time::Duration;

use serde::Serialize;

use crate::board::{Board, BoardError, Coord};
use crate::log::{MoveLog, Snapshot};
use crate::notation::{self, NotationError};
use crate::piece::Side;
use crate::rules::{self, Clock, LockReport, Verdict, WinReason};
use crate::variant::Variant;

// --- Destination sets ---

#[derive(Debug, Default, Clone)]
pub struct Destinations {
    pub moves: Vec<Coord>,
    pub captures: Vec<Coord>,
}

impl Destinations {
    pub fn contains(&self, c: Coord) -> bool {
        self.moves.contains(&c) || self.captures.contains(&c)
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty() && self.captures.is_empty()
    }
}

/// Outcome of a commit attempt.
#[derive(Debug, PartialEq, Eq)]
pub enum Committed {
    /// Nothing selected or the destination was not offered; the board is
    /// untouched.
    Rejected,
    Moved,
    /// The move needs a promotion choice before it completes.
    PromotionPending,
}

// --- Game record (savegame) ---

#[derive(Debug, Clone, Serialize)]
pub struct MoveRecord {
    pub ply: usize,
    pub player: Side,
    pub from: String,
    pub to: String,
    pub captured: Option<char>,
    pub is_check: bool,
}

#[derive(Debug, Serialize)]
struct GameRecord<'a> {
    variant: &'a str,
    result: Option<Verdict>,
    moves: &'a [MoveRecord],
}

#[derive(Debug)]
pub enum SaveLoadError {
    Serialization(serde_json::Error),
    Io(String, io::Error),
}

impl fmt::Display for SaveLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveLoadError::Serialization(e) => write!(f, "Serialization error: {}", e),
            SaveLoadError::Io(file, e) => write!(f, "I/O error with file '{}': {}", file, e),
        }
    }
}

impl Error for SaveLoadError {}

// --- Game state ---

struct PendingMove {
    from: Coord,
    to: Coord,
    captured: Option<char>,
}

pub struct GameState {
    pub board: Board,
    pub variant: &'static Variant,
    pub log: MoveLog,
    pub selected: Option<Coord>,
    pub destinations: Destinations,
    pub verdict: Verdict,
    pub clock: Option<Clock>,
    pub events: Vec<MoveRecord>,
    pending_promotion: Option<PendingMove>,
    /// The current half-move's lock, computed once and reused across
    /// deselect/reselect cycles. Cleared whenever the position changes.
    lock_cache: Option<Option<LockReport>>,
}

impl GameState {
    pub fn new(variant: &'static Variant) -> Result<GameState, BoardError> {
        let board = (variant.board)()?;
        let snapshot = Snapshot::capture(&board);
        let mut state = GameState {
            board,
            variant,
            log: MoveLog::new(snapshot),
            selected: None,
            destinations: Destinations::default(),
            verdict: Verdict::Ongoing,
            clock: None,
            events: Vec::new(),
            pending_promotion: None,
            lock_cache: None,
        };
        if let Some(start) = variant.game_start {
            start(&mut state);
            // The shuffled position is the real move zero.
            state.log = MoveLog::new(Snapshot::capture(&state.board));
        }
        Ok(state)
    }

    pub fn with_clock(mut self, per_side: Duration) -> GameState {
        let mut clock = Clock::new(per_side);
        clock.start();
        self.clock = Some(clock);
        self
    }

    pub fn promotion_pending(&self) -> bool {
        self.pending_promotion.is_some()
    }

    /// Selects the piece on `at` and computes its destinations. Returns
    /// `None` (and deselects) when the square holds nothing selectable:
    /// wrong side, finished game, or a multi-jump pin on another piece.
    pub fn select(&mut self, at: Coord) -> Option<&Destinations> {
        self.selected = None;
        self.destinations = Destinations::default();
        if self.verdict != Verdict::Ongoing || self.pending_promotion.is_some() {
            return None;
        }
        if let Some(pinned) = self.board.aux.select_again {
            if pinned != at {
                return None;
            }
        }
        let turn = self.board.turn();
        let behaviour = match self.board.piece_at(at) {
            Some(p) if p.side == turn || p.side == Side::Any => p.behaviour,
            _ => return None,
        };

        // One lock computation per half-move; reselections stamp from the
        // cached report and the generators read the stamped flags.
        self.board.scrub();
        if self.lock_cache.is_none() {
            self.lock_cache = Some(rules::lock(&mut self.board));
        }
        if let Some(Some(report)) = &self.lock_cache {
            rules::stamp(&mut self.board, report);
        }

        let mut moves = behaviour.moves(&self.board, at);
        let mut captures = behaviour.capture_squares(&self.board, at, false);
        if let Some(filter) = self.variant.move_filter {
            filter(self, at, &mut moves);
        }
        if let Some(filter) = self.variant.capture_filter {
            filter(self, at, &mut captures);
        }

        for &c in &moves {
            if let Some(tile) = self.board.get_mut(c) {
                tile.move_target = true;
            }
        }
        for &c in &captures {
            if let Some(tile) = self.board.get_mut(c) {
                tile.capture_target = true;
            }
        }
        self.selected = Some(at);
        self.destinations = Destinations { moves, captures };
        Some(&self.destinations)
    }

    pub fn deselect(&mut self) {
        self.selected = None;
        self.destinations = Destinations::default();
        self.board.scrub();
    }

    /// Commits the selected piece to `to`. A destination that was never
    /// offered is rejected without touching the board.
    pub fn commit(&mut self, to: Coord) -> Committed {
        let from = match self.selected {
            Some(c) => c,
            None => return Committed::Rejected,
        };
        if !self.destinations.contains(to) {
            return Committed::Rejected;
        }
        let (side, behaviour, pawnish) = match self.board.piece_at(from) {
            Some(p) => (p.side, p.behaviour, p.name == "Pawn" || p.name == "Man"),
            None => return Committed::Rejected,
        };

        let effects = behaviour.move_to(&mut self.board, from, to);
        self.selected = None;
        self.destinations = Destinations::default();
        self.lock_cache = None;

        if effects.captured.is_some() || pawnish {
            self.board.halfmove_clock = 0;
        } else {
            self.board.halfmove_clock += 1;
        }

        let mut captured_code = None;
        if let Some(captured) = effects.captured {
            captured_code = Some(captured.code);
            if side != Side::Any {
                self.board.pockets[side.index()].push(captured.clone());
            }
            // Hooks see the capturer's landing square, which parts company
            // with the committed square on en passant and checkers jumps.
            let site = effects.landed.unwrap_or(to);
            if let Some(hook) = self.variant.after_capture {
                hook(self, site, &captured);
            }
        }

        if effects.promotion {
            self.pending_promotion = Some(PendingMove {
                from,
                to,
                captured: captured_code,
            });
            return Committed::PromotionPending;
        }

        self.finish_move(from, to, captured_code);
        Committed::Moved
    }

    /// The promotion letters the variant admits for the pending square,
    /// when it restricts them.
    pub fn promotion_options(&self) -> Option<Vec<char>> {
        let pending = self.pending_promotion.as_ref()?;
        let options = self.variant.promotions?;
        Some(options(self, pending.to))
    }

    /// Completes a pending promotion. `kind` is the piece letter as typed
    /// (case-insensitive); royals and pawns are refused.
    pub fn resolve_promotion(&mut self, kind: char) -> bool {
        let pending = match &self.pending_promotion {
            Some(p) => p,
            None => return false,
        };
        let at = pending.to;
        let side = match self.board.piece_at(at) {
            Some(p) => p.side,
            None => return false,
        };
        if let Some(options) = self.variant.promotions {
            if !options(self, at).contains(&kind.to_ascii_lowercase()) {
                return false;
            }
        }
        let code = match side {
            Side::White => kind.to_ascii_uppercase(),
            _ => kind.to_ascii_lowercase(),
        };
        let mut piece = match (self.variant.pieces)(code) {
            Some(p) if !p.royal && p.name != "Pawn" && p.side == side => p,
            _ => return false,
        };
        piece.moved = true;
        self.board.take_piece(at);
        self.board.place_piece(at, piece);
        let pending = match self.pending_promotion.take() {
            Some(p) => p,
            None => return false,
        };
        self.finish_move(pending.from, pending.to, pending.captured);
        true
    }

    fn finish_move(&mut self, from: Coord, to: Coord, captured: Option<char>) {
        let player = self.board.turn();
        match self.variant.after_move {
            Some(hook) => hook(self),
            None => default_after_move(self),
        }
        self.board.scrub();
        let report = rules::lock(&mut self.board);
        let is_check = report.is_some();
        self.board.scrub();
        // The report belongs to the new side to move; the next select
        // reuses it.
        self.lock_cache = Some(report);

        if let Some(clock) = &mut self.clock {
            clock.switch_to(self.board.turn());
        }

        self.events.push(MoveRecord {
            ply: self.log.cursor() + 1,
            player,
            from: notation::coord_to_algebraic(&self.board, from),
            to: notation::coord_to_algebraic(&self.board, to),
            captured,
            is_check,
        });
        self.log.record(Snapshot::capture(&self.board));
        self.evaluate();
    }

    /// Recomputes the verdict: tripped clock first, then the variant's win
    /// override or the default rules.
    pub fn evaluate(&mut self) {
        if let Some(clock) = &mut self.clock {
            clock.poll();
            if let Some(loser) = clock.tripped() {
                self.verdict = Verdict::Win(loser.opponent(), WinReason::Timeout);
                return;
            }
        }
        self.verdict = match self.variant.win {
            Some(judge) => judge(self),
            None => rules::win(&mut self.board),
        };
        self.board.scrub();
    }

    pub fn undo(&mut self) -> bool {
        self.step_log(true)
    }

    pub fn redo(&mut self) -> bool {
        self.step_log(false)
    }

    fn step_log(&mut self, back: bool) -> bool {
        let factory = self.variant.pieces;
        let snapshot = {
            let snap = if back { self.log.undo() } else { self.log.redo() };
            match snap {
                Some(s) => s.clone(),
                None => return false,
            }
        };
        if snapshot.restore(&mut self.board, factory).is_err() {
            return false;
        }
        self.selected = None;
        self.destinations = Destinations::default();
        self.pending_promotion = None;
        self.lock_cache = None;
        if let Some(clock) = &mut self.clock {
            clock.switch_to(self.board.turn());
        }
        self.evaluate();
        true
    }

    pub fn resign(&mut self) {
        let resigning = self.board.turn();
        self.verdict = Verdict::Win(resigning.opponent(), WinReason::Resignation);
    }

    pub fn agree_draw(&mut self) {
        self.verdict = Verdict::Draw(rules::DrawReason::Agreement);
    }

    // --- Position notation ---

    pub fn export_position(&self) -> String {
        notation::export_position(&self.board)
    }

    /// Replaces the live position. The move log restarts from the imported
    /// position; a rejected string changes nothing.
    pub fn import_position(&mut self, text: &str) -> Result<(), NotationError> {
        let board = notation::import_position(&self.board, text, self.variant.pieces)?;
        self.board = board;
        self.selected = None;
        self.destinations = Destinations::default();
        self.pending_promotion = None;
        self.lock_cache = None;
        self.log = MoveLog::new(Snapshot::capture(&self.board));
        self.events.clear();
        self.evaluate();
        Ok(())
    }

    // --- Saving ---

    pub fn save_record(&self, filename: &str) -> Result<(), SaveLoadError> {
        let record = GameRecord {
            variant: self.variant.name,
            result: match self.verdict {
                Verdict::Ongoing => None,
                v => Some(v),
            },
            moves: &self.events,
        };
        let json = serde_json::to_string_pretty(&record).map_err(SaveLoadError::Serialization)?;
        fs::write(filename, json).map_err(|e| SaveLoadError::Io(filename.to_string(), e))?;
        Ok(())
    }
}

/// Default end-of-move bookkeeping: the turn passes, and the new mover's
/// own en passant eligibility from two half-moves ago expires.
pub fn default_after_move(state: &mut GameState) {
    state.board.progress_turn();
    expire_en_passant(&mut state.board);
}

/// Clears the side-to-move's en passant flags. Called after the turn has
/// progressed, so the window a double step opens lasts exactly one enemy
/// half-move.
pub fn expire_en_passant(board: &mut Board) {
    let mover = board.turn();
    for c in board.pieces_of(mover) {
        if let Some(piece) = board.get_mut(c).and_then(|t| t.piece.as_mut()) {
            piece.en_passantable = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variants::standard::STANDARD;

    fn game() -> GameState {
        GameState::new(&STANDARD).unwrap()
    }

    fn sq(state: &GameState, name: &str) -> Coord {
        notation::algebraic_to_coord(&state.board, name).unwrap()
    }

    fn play(state: &mut GameState, from: &str, to: &str) {
        let f = sq(state, from);
        let t = sq(state, to);
        assert!(state.select(f).is_some(), "select {} failed", from);
        assert_eq!(state.commit(t), Committed::Moved, "{} -> {}", from, to);
    }

    #[test]
    fn select_offers_pawn_moves() {
        let mut state = game();
        let e2 = sq(&state, "e2");
        let dests = state.select(e2).unwrap().clone();
        assert!(dests.moves.contains(&sq(&state, "e3")));
        assert!(dests.moves.contains(&sq(&state, "e4")));
        assert!(dests.captures.is_empty());
    }

    #[test]
    fn cannot_select_off_turn_piece() {
        let mut state = game();
        let e7 = sq(&state, "e7");
        assert!(state.select(e7).is_none());
    }

    #[test]
    fn commit_rejects_unoffered_squares() {
        let mut state = game();
        let e2 = sq(&state, "e2");
        state.select(e2).unwrap();
        assert_eq!(state.commit(sq(&state, "e5")), Committed::Rejected);
        assert!(state.board.piece_at(e2).is_some());
    }

    #[test]
    fn full_turn_cycle() {
        let mut state = game();
        play(&mut state, "e2", "e4");
        assert_eq!(state.board.turn(), Side::Black);
        assert!(state.board.piece_at(sq(&state, "e4")).is_some());
        assert!(state.board.piece_at(sq(&state, "e2")).is_none());
        assert_eq!(state.log.cursor(), 1);
        assert_eq!(state.events.len(), 1);
        assert_eq!(state.events[0].from, "e2");
        assert_eq!(state.events[0].to, "e4");
    }

    #[test]
    fn captures_land_in_the_pocket() {
        let mut state = game();
        play(&mut state, "e2", "e4");
        play(&mut state, "d7", "d5");
        let e4 = sq(&state, "e4");
        let d5 = sq(&state, "d5");
        state.select(e4).unwrap();
        assert_eq!(state.commit(d5), Committed::Moved);
        assert_eq!(state.board.pockets[Side::White.index()].len(), 1);
        assert_eq!(state.board.pockets[Side::White.index()][0].code, 'p');
        assert_eq!(state.board.halfmove_clock, 0);
    }

    #[test]
    fn en_passant_window_lasts_one_enemy_half_move() {
        let mut state = game();
        play(&mut state, "e2", "e4");
        play(&mut state, "a7", "a6");
        play(&mut state, "e4", "e5");
        play(&mut state, "d7", "d5");
        // The capture is available right now...
        let e5 = sq(&state, "e5");
        let d6 = sq(&state, "d6");
        let dests = state.select(e5).unwrap().clone();
        assert!(dests.captures.contains(&d6));
        state.deselect();
        // ...but gone after White plays something else.
        play(&mut state, "h2", "h3");
        play(&mut state, "a6", "a5");
        let dests = state.select(e5).unwrap().clone();
        assert!(!dests.captures.contains(&d6));
    }

    #[test]
    fn en_passant_capture_removes_the_passed_pawn() {
        let mut state = game();
        play(&mut state, "e2", "e4");
        play(&mut state, "a7", "a6");
        play(&mut state, "e4", "e5");
        play(&mut state, "d7", "d5");
        let e5 = sq(&state, "e5");
        let d6 = sq(&state, "d6");
        let d5 = sq(&state, "d5");
        state.select(e5).unwrap();
        assert_eq!(state.commit(d6), Committed::Moved);
        assert!(state.board.piece_at(d5).is_none());
        assert_eq!(state.board.piece_at(d6).unwrap().code, 'P');
        assert_eq!(state.board.pockets[Side::White.index()].len(), 1);
    }

    #[test]
    fn undo_redo_round_trip() {
        let mut state = game();
        let opening = state.export_position();
        play(&mut state, "e2", "e4");
        play(&mut state, "e7", "e5");
        play(&mut state, "g1", "f3");
        let after_three = state.export_position();
        assert!(state.undo());
        assert!(state.undo());
        assert!(state.undo());
        assert_eq!(state.export_position(), opening);
        assert!(!state.undo());
        assert!(state.redo());
        assert!(state.redo());
        assert!(state.redo());
        assert_eq!(state.export_position(), after_three);
        assert!(!state.redo());
    }

    #[test]
    fn moving_after_undo_discards_the_redo_branch() {
        let mut state = game();
        play(&mut state, "e2", "e4");
        assert!(state.undo());
        play(&mut state, "d2", "d4");
        assert!(!state.redo());
        assert!(state.board.piece_at(sq(&state, "d4")).is_some());
        assert!(state.board.piece_at(sq(&state, "e4")).is_none());
    }

    #[test]
    fn promotion_prompt_and_reversion() {
        let mut state = game();
        state
            .import_position("4k3/P7/8/8/8/8/8/4K3 w - - 0 1")
            .unwrap();
        let a7 = sq(&state, "a7");
        let a8 = sq(&state, "a8");
        state.select(a7).unwrap();
        assert_eq!(state.commit(a8), Committed::PromotionPending);
        // The pawn sits on the last rank until the choice lands.
        assert!(state.promotion_pending());
        assert!(!state.resolve_promotion('k'));
        assert!(state.resolve_promotion('q'));
        assert_eq!(state.board.piece_at(a8).unwrap().code, 'Q');
        assert_eq!(state.board.turn(), Side::Black);
        // Undo restores the unpromoted pawn.
        assert!(state.undo());
        assert_eq!(state.board.piece_at(a7).unwrap().code, 'P');
        assert!(state.board.piece_at(a8).is_none());
        // Redo brings the queen back.
        assert!(state.redo());
        assert_eq!(state.board.piece_at(a8).unwrap().code, 'Q');
    }

    #[test]
    fn import_position_restarts_the_log() {
        let mut state = game();
        play(&mut state, "e2", "e4");
        state
            .import_position("4k3/8/8/8/8/8/8/4K3 b - - 0 1")
            .unwrap();
        assert!(!state.undo());
        assert_eq!(state.board.turn(), Side::Black);
    }

    #[test]
    fn bad_import_changes_nothing() {
        let mut state = game();
        play(&mut state, "e2", "e4");
        let before = state.export_position();
        assert!(state.import_position("total nonsense").is_err());
        assert_eq!(state.export_position(), before);
        assert!(state.undo());
    }

    #[test]
    fn lock_constraints_survive_reselection() {
        let mut state = game();
        state
            .import_position("4k3/8/8/8/8/8/4r3/4K3 w - - 0 1")
            .unwrap();
        let e1 = sq(&state, "e1");
        let e2 = sq(&state, "e2");
        let first = state.select(e1).unwrap().clone();
        state.deselect();
        let second = state.select(e1).unwrap().clone();
        assert_eq!(first.moves, second.moves);
        assert_eq!(first.captures, second.captures);
        assert!(second.captures.contains(&e2));
        // Taking the rook clears the check; the next half-move starts
        // from a fresh report.
        assert_eq!(state.commit(e2), Committed::Moved);
        let e8 = sq(&state, "e8");
        let dests = state.select(e8).unwrap().clone();
        assert!(!dests.moves.is_empty());
    }

    #[test]
    fn resignation_ends_the_game() {
        let mut state = game();
        state.resign();
        assert_eq!(
            state.verdict,
            Verdict::Win(Side::Black, WinReason::Resignation)
        );
        assert!(state.select(sq(&state, "e2")).is_none());
    }

    #[test]
    fn save_record_writes_json() {
        let mut state = game();
        play(&mut state, "e2", "e4");
        let path = std::env::temp_dir().join("chess_plus_record_test.json");
        let path = path.to_string_lossy().to_string();
        state.save_record(&path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("\"variant\": \"standard\""));
        assert!(written.contains("\"from\": \"e2\""));
        let _ = std::fs::remove_file(&path);
    }
}
