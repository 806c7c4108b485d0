// src/rules.rs
//
// The generalized check/checkmate engine. Nothing here knows which variant
// is playing: it asks the pieces themselves via the behaviour contract, so
// any board with (or without) a royal piece gets the right constraint.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::board::{Board, Coord};
use crate::piece::{Piece, Side};

// --- Verdicts ---

#[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq, Eq)]
pub enum WinReason {
    Checkmate,
    Timeout,
    Resignation,
    Elimination,
}

#[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq, Eq)]
pub enum DrawReason {
    Stalemate,
    Agreement,
}

/// Three-way outcome. A stalemate is a draw, never anyone's win.
#[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq, Eq)]
pub enum Verdict {
    Ongoing,
    Win(Side, WinReason),
    Draw(DrawReason),
}

// --- Attack maps ---

/// Every square threatened by `side`: the union of its pieces'
/// hypothetical capture squares.
pub fn attack_map(board: &Board, side: Side) -> Vec<Coord> {
    let mut map: Vec<Coord> = Vec::new();
    for at in board.pieces_of(side) {
        let behaviour = match board.piece_at(at) {
            Some(p) => p.behaviour,
            None => continue,
        };
        for c in behaviour.capture_squares(board, at, true) {
            if !map.contains(&c) {
                map.push(c);
            }
        }
    }
    map
}

// --- Probe sentinel guard ---

/// Places an inert sentinel on a square and removes it again when dropped,
/// so a probed board is restored on every exit path.
pub struct SentinelGuard<'a> {
    board: &'a mut Board,
    at: Coord,
}

impl<'a> SentinelGuard<'a> {
    pub fn place(board: &'a mut Board, at: Coord) -> Self {
        board.place_piece(at, Piece::sentinel());
        SentinelGuard { board, at }
    }

    pub fn board(&self) -> &Board {
        self.board
    }
}

impl Drop for SentinelGuard<'_> {
    fn drop(&mut self) {
        self.board.take_piece(self.at);
    }
}

// --- Check detection ---

/// What `lock` found. Callers compute it once per half-move and stamp the
/// `locked` flags; the generators then filter destinations by them.
#[derive(Debug, Clone)]
pub struct LockReport {
    /// The endangered royal piece's square.
    pub royal: Coord,
    /// Squares of every enemy piece giving check.
    pub attackers: Vec<Coord>,
    /// The royal piece's safe destinations.
    pub royal_moves: Vec<Coord>,
    /// Squares where interposing a piece cuts every attack at once.
    pub occlude: Vec<Coord>,
    /// Every playable square that is not a permitted destination.
    pub locked: Vec<Coord>,
}

/// Squares where a blocker would cut this attacker's line to the royal.
/// Sliders answer through their sight lines (the squares strictly between
/// attacker and royal); anything without sight lines is probed square by
/// square with a temporary sentinel.
fn occlusion_squares(board: &mut Board, attacker: Coord, royal: Coord) -> Vec<Coord> {
    let behaviour = match board.piece_at(attacker) {
        Some(p) => p.behaviour,
        None => return Vec::new(),
    };
    let lines = behaviour.lines_of_sight(board, attacker);
    if !lines.is_empty() {
        for line in lines {
            if let Some(pos) = line.iter().position(|&c| c == royal) {
                return line[..pos].to_vec();
            }
        }
        return Vec::new();
    }
    // No declared sight lines: probe each threatened empty square.
    let candidates: Vec<Coord> = behaviour
        .capture_squares(board, attacker, true)
        .into_iter()
        .filter(|&c| c != royal && board.piece_at(c).is_none())
        .collect();
    let mut out = Vec::new();
    for c in candidates {
        let guard = SentinelGuard::place(board, c);
        let still_attacks = behaviour
            .capture_squares(guard.board(), attacker, true)
            .contains(&royal);
        drop(guard);
        if !still_attacks {
            out.push(c);
        }
    }
    out
}

/// Determines whether the side to move is in check and, if so, which
/// squares remain permitted. Returns `None` when there is no constraint:
/// either the side has no royal piece or nothing attacks it.
pub fn lock(board: &mut Board) -> Option<LockReport> {
    let side = board.turn();
    let royal = board.royal_of(side)?;
    let enemy = side.opponent();

    let mut attackers = Vec::new();
    for at in board.pieces_of(enemy) {
        let behaviour = match board.piece_at(at) {
            Some(p) => p.behaviour,
            None => continue,
        };
        if behaviour.capture_squares(board, at, true).contains(&royal) {
            attackers.push(at);
        }
    }
    if attackers.is_empty() {
        return None;
    }

    // The danger map is computed with the royal lifted off the board so
    // checking rays extend through its square; otherwise stepping backwards
    // along the ray would look safe.
    let lifted = board.take_piece(royal);
    let danger = attack_map(board, enemy);
    if let Some(p) = lifted {
        board.place_piece(royal, p);
    }

    let royal_moves: Vec<Coord> = board
        .piece_at(royal)
        .map(|p| p.behaviour.moves(board, royal))
        .unwrap_or_default()
        .into_iter()
        .filter(|c| !danger.contains(c))
        .collect();

    // Blocking must cut every attack at once, so intersect per-attacker
    // occlusion sets.
    let mut occlude = occlusion_squares(board, attackers[0], royal);
    for &attacker in &attackers[1..] {
        let also = occlusion_squares(board, attacker, royal);
        occlude.retain(|c| also.contains(c));
    }

    let mut not_locked = royal_moves.clone();
    not_locked.extend(occlude.iter().copied());
    if attackers.len() == 1 {
        not_locked.push(attackers[0]);
    }
    let locked: Vec<Coord> = board
        .coords()
        .filter(|c| *c != royal && !not_locked.contains(c))
        .collect();

    Some(LockReport {
        royal,
        attackers,
        royal_moves,
        occlude,
        locked,
    })
}

/// Stamps a lock report onto the tile flags.
pub fn stamp(board: &mut Board, report: &LockReport) {
    for &c in &report.locked {
        if let Some(tile) = board.get_mut(c) {
            tile.locked = true;
        }
    }
}

/// The default end-of-position evaluation: checkmate, stalemate or ongoing
/// play, judged for the side to move. Variants with their own victory rules
/// override this wholesale.
pub fn win(board: &mut Board) -> Verdict {
    board.scrub();
    let side = board.turn();
    let report = lock(board);
    if let Some(report) = &report {
        stamp(board, report);
    }
    let friends = board.pieces_of(side);

    match report {
        None => {
            // Not in check: the game goes on unless no piece can move.
            for &at in &friends {
                let behaviour = match board.piece_at(at) {
                    Some(p) => p.behaviour,
                    None => continue,
                };
                if !behaviour.moves(board, at).is_empty()
                    || !behaviour.capture_squares(board, at, false).is_empty()
                {
                    return Verdict::Ongoing;
                }
            }
            if friends.is_empty() {
                // Royal-less armies that run out of pieces are handled by
                // variant overrides; with no royal and no pieces the default
                // can only call it a dead position.
                return Verdict::Draw(DrawReason::Stalemate);
            }
            Verdict::Draw(DrawReason::Stalemate)
        }
        Some(report) => {
            if !report.royal_moves.is_empty() {
                return Verdict::Ongoing;
            }
            // A friendly piece lands on a common occlusion square.
            for &at in &friends {
                if at == report.royal {
                    continue;
                }
                let behaviour = match board.piece_at(at) {
                    Some(p) => p.behaviour,
                    None => continue,
                };
                if behaviour
                    .moves(board, at)
                    .iter()
                    .any(|c| report.occlude.contains(c))
                {
                    return Verdict::Ongoing;
                }
            }
            // A friendly piece captures the sole attacker. The royal itself
            // only escapes this way if the attacker is undefended.
            if report.attackers.len() == 1 {
                let target = report.attackers[0];
                let danger = attack_map(board, side.opponent());
                for &at in &friends {
                    let (royal_capturer, behaviour) = match board.piece_at(at) {
                        Some(p) => (p.royal, p.behaviour),
                        None => continue,
                    };
                    if royal_capturer && danger.contains(&target) {
                        continue;
                    }
                    if behaviour
                        .capture_squares(board, at, false)
                        .contains(&target)
                    {
                        return Verdict::Ongoing;
                    }
                }
            }
            Verdict::Win(side.opponent(), WinReason::Checkmate)
        }
    }
}

// --- Chess clocks ---

/// Per-side countdown clock. The game layer switches it on turn changes and
/// the shell polls it between prompts.
pub struct Clock {
    remaining: [Duration; 2],
    active: usize,
    last_tick: Option<Instant>,
}

impl Clock {
    pub fn new(per_side: Duration) -> Self {
        Clock {
            remaining: [per_side, per_side],
            active: Side::White.index(),
            last_tick: None,
        }
    }

    /// Starts (or resumes) ticking for the active side.
    pub fn start(&mut self) {
        self.last_tick = Some(Instant::now());
    }

    /// Charges elapsed time to the active side.
    pub fn poll(&mut self) {
        if let Some(tick) = self.last_tick {
            let now = Instant::now();
            self.remaining[self.active] =
                self.remaining[self.active].saturating_sub(now.duration_since(tick));
            self.last_tick = Some(now);
        }
    }

    pub fn switch_to(&mut self, side: Side) {
        self.poll();
        self.active = side.index();
    }

    pub fn remaining(&self, side: Side) -> Duration {
        self.remaining[side.index()]
    }

    /// The side whose flag has fallen, if either has.
    pub fn tripped(&self) -> Option<Side> {
        if self.remaining[Side::White.index()].is_zero() {
            Some(Side::White)
        } else if self.remaining[Side::Black.index()].is_zero() {
            Some(Side::Black)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variants::standard;

    fn empty_board() -> Board {
        Board::construct(8, 8, &["8"; 8]).unwrap()
    }

    fn put(board: &mut Board, code: char, at: Coord) {
        board.place_piece(at, standard::piece(code).unwrap());
    }

    #[test]
    fn rook_check_reports_attacker_and_occlusion() {
        let mut board = empty_board();
        put(&mut board, 'K', Coord::new(4, 7)); // e1
        put(&mut board, 'r', Coord::new(4, 0)); // e8
        let report = lock(&mut board).unwrap();
        assert_eq!(report.attackers, vec![Coord::new(4, 0)]);
        // Squares strictly between the rook and the king.
        assert_eq!(report.occlude.len(), 6);
        assert!(report.occlude.contains(&Coord::new(4, 3)));
        assert!(!report.occlude.contains(&Coord::new(4, 0)));
        assert!(!report.occlude.contains(&Coord::new(4, 7)));
        // The king may sidestep off the file.
        assert!(report.royal_moves.contains(&Coord::new(3, 7)));
        assert!(report.royal_moves.contains(&Coord::new(5, 6)));
        assert!(!report.royal_moves.contains(&Coord::new(4, 6)));
    }

    #[test]
    fn no_check_means_no_constraint() {
        let mut board = empty_board();
        put(&mut board, 'K', Coord::new(4, 7));
        put(&mut board, 'r', Coord::new(0, 0));
        assert!(lock(&mut board).is_none());
    }

    #[test]
    fn missing_royal_means_no_constraint() {
        let mut board = empty_board();
        put(&mut board, 'R', Coord::new(4, 7));
        put(&mut board, 'q', Coord::new(4, 0));
        assert!(lock(&mut board).is_none());
    }

    #[test]
    fn knight_check_has_no_occlusion() {
        let mut board = empty_board();
        put(&mut board, 'K', Coord::new(4, 7));
        put(&mut board, 'n', Coord::new(3, 5));
        let before: usize = board.pieces_of(Side::Black).len() + board.pieces_of(Side::White).len();
        let report = lock(&mut board).unwrap();
        assert_eq!(report.attackers, vec![Coord::new(3, 5)]);
        // Jumps cannot be blocked, and the probe leaves no sentinel behind.
        assert!(report.occlude.is_empty());
        let after: usize = board.pieces_of(Side::Black).len() + board.pieces_of(Side::White).len();
        assert_eq!(before, after);
        assert!(board.piece_at(Coord::new(3, 6)).is_none());
    }

    #[test]
    fn stepping_back_along_the_ray_is_not_an_escape() {
        let mut board = empty_board();
        put(&mut board, 'K', Coord::new(4, 7)); // e1
        put(&mut board, 'r', Coord::new(0, 7)); // a1, checking along the rank
        let report = lock(&mut board).unwrap();
        // f1 continues the checking ray behind the king.
        assert!(!report.royal_moves.contains(&Coord::new(5, 7)));
        assert!(report.royal_moves.contains(&Coord::new(4, 6)));
    }

    #[test]
    fn back_rank_mate() {
        let mut board = empty_board();
        put(&mut board, 'K', Coord::new(6, 7)); // g1
        put(&mut board, 'P', Coord::new(5, 6)); // f2
        put(&mut board, 'P', Coord::new(6, 6)); // g2
        put(&mut board, 'P', Coord::new(7, 6)); // h2
        put(&mut board, 'q', Coord::new(4, 7)); // e1
        put(&mut board, 'k', Coord::new(0, 0));
        assert_eq!(
            win(&mut board),
            Verdict::Win(Side::Black, WinReason::Checkmate)
        );
    }

    #[test]
    fn boxed_king_without_check_is_not_mate() {
        let mut board = empty_board();
        put(&mut board, 'K', Coord::new(6, 7));
        put(&mut board, 'P', Coord::new(5, 6));
        put(&mut board, 'P', Coord::new(6, 6));
        put(&mut board, 'P', Coord::new(7, 6));
        put(&mut board, 'q', Coord::new(0, 3)); // far away, no check
        put(&mut board, 'k', Coord::new(0, 0));
        assert_eq!(win(&mut board), Verdict::Ongoing);
    }

    #[test]
    fn check_blocked_by_interposition_is_not_mate() {
        let mut board = empty_board();
        put(&mut board, 'K', Coord::new(6, 7)); // g1
        put(&mut board, 'P', Coord::new(5, 6));
        put(&mut board, 'P', Coord::new(6, 6));
        put(&mut board, 'P', Coord::new(7, 6));
        put(&mut board, 'q', Coord::new(0, 7)); // a1
        put(&mut board, 'R', Coord::new(2, 0)); // c8 can drop to c1
        put(&mut board, 'k', Coord::new(0, 0));
        assert_eq!(win(&mut board), Verdict::Ongoing);
    }

    #[test]
    fn stalemate_is_a_draw_not_a_win() {
        let mut board = empty_board();
        put(&mut board, 'k', Coord::new(0, 0)); // a8
        put(&mut board, 'Q', Coord::new(2, 1)); // c7
        put(&mut board, 'K', Coord::new(2, 2)); // c6
        board.progress_turn(); // Black to move
        assert_eq!(win(&mut board), Verdict::Draw(DrawReason::Stalemate));
    }

    #[test]
    fn clock_trips_only_at_zero() {
        let clock = Clock::new(Duration::from_secs(60));
        assert_eq!(clock.tripped(), None);
        let clock = Clock::new(Duration::ZERO);
        assert_eq!(clock.tripped(), Some(Side::White));
    }
}
