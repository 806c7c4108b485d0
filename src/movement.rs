// src/movement.rs
//
// The primitive move/capture generators every archetype is assembled from.
// Move-flavoured generators yield empty squares a piece may step onto;
// capture-flavoured ones live in the `capture` submodule and yield squares a
// piece takes on. Both are free functions over (board, origin) so variants
// can mix them freely.
//
// Shared rules:
//  - generators read the acting piece off the board at `from`; when it is
//    not that piece's side's turn they yield nothing (the `Any` side is
//    always allowed to act, its turns are policed by variant filters);
//  - rays stop at board edges, void tiles and the first occupied square;
//  - squares flagged `locked` are skipped as destinations but do not block
//    traversal;
//  - capture generators take a `hypo` flag: with it set they ignore the turn
//    gate and the locked flag and report every threatened square up to and
//    including the first occupied one, which is what attack maps are built
//    from. Without it a ray yields at most its first occupied square, and
//    only if hostile.

use crate::board::{Board, Coord, TileKind};
use crate::piece::Side;

pub const UNLIMITED: u32 = u32::MAX;

/// Axis selector for `line`: which coordinate the ray walks along.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// Side of the piece at `from`, if any.
fn acting_side(board: &Board, from: Coord) -> Option<Side> {
    board.piece_at(from).map(|p| p.side)
}

/// Turn gate for non-hypothetical generators.
fn on_turn(board: &Board, from: Coord) -> bool {
    match acting_side(board, from) {
        Some(Side::Any) => true,
        Some(side) => side == board.turn(),
        None => false,
    }
}

/// Walks one ray collecting empty squares. Stops at edges, voids and the
/// first occupied square.
fn step_ray(board: &Board, from: Coord, dx: i32, dy: i32, limit: u32, out: &mut Vec<Coord>) {
    let mut at = from;
    let mut count = 0u32;
    while count < limit {
        at = at.offset(dx, dy);
        let tile = match board.get(at) {
            Some(t) if t.kind == TileKind::Playable => t,
            _ => return,
        };
        if tile.piece.is_some() {
            return;
        }
        if !tile.locked {
            out.push(at);
        }
        count += 1;
    }
}

// --- Move-flavoured generators ---

/// Straight ray along one axis. `step` is +1 or -1; pieces that only move
/// forward pass the sign that matches their side's direction of play.
pub fn line(board: &Board, from: Coord, axis: Axis, step: i32, limit: u32) -> Vec<Coord> {
    if !on_turn(board, from) {
        return Vec::new();
    }
    let (dx, dy) = match axis {
        Axis::X => (step, 0),
        Axis::Y => (0, step),
    };
    let mut out = Vec::new();
    step_ray(board, from, dx, dy, limit, &mut out);
    out
}

pub fn diagonal(board: &Board, from: Coord, step_x: i32, step_y: i32, limit: u32) -> Vec<Coord> {
    if !on_turn(board, from) {
        return Vec::new();
    }
    let mut out = Vec::new();
    step_ray(board, from, step_x, step_y, limit, &mut out);
    out
}

/// All four straight rays.
pub fn orthogonals(board: &Board, from: Coord, limit: u32) -> Vec<Coord> {
    if !on_turn(board, from) {
        return Vec::new();
    }
    let mut out = Vec::new();
    for (dx, dy) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
        step_ray(board, from, dx, dy, limit, &mut out);
    }
    out
}

/// All four diagonal rays.
pub fn diagonals(board: &Board, from: Coord, limit: u32) -> Vec<Coord> {
    if !on_turn(board, from) {
        return Vec::new();
    }
    let mut out = Vec::new();
    for (dx, dy) in [(1, 1), (1, -1), (-1, 1), (-1, -1)] {
        step_ray(board, from, dx, dy, limit, &mut out);
    }
    out
}

const L_ROTATIONS: [(i32, i32); 8] = [
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
    // legs swapped
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

fn l_offsets(leg_x: i32, leg_y: i32) -> [(i32, i32); 8] {
    let mut offs = [(0, 0); 8];
    for (i, (sx, sy)) in L_ROTATIONS.iter().enumerate() {
        offs[i] = if i < 4 {
            (leg_x * sx, leg_y * sy)
        } else {
            (leg_y * sx, leg_x * sy)
        };
    }
    offs
}

/// Knight-style jumps: all eight rotations of the (leg_x, leg_y) offset,
/// repeated up to `limit` times along each direction (a repeating jumper is
/// blocked by the first occupied landing square).
pub fn l_shape(board: &Board, from: Coord, leg_x: i32, leg_y: i32, limit: u32) -> Vec<Coord> {
    if !on_turn(board, from) {
        return Vec::new();
    }
    let mut out = Vec::new();
    for (dx, dy) in l_offsets(leg_x, leg_y) {
        for i in 1..=limit as i32 {
            let at = from.offset(dx * i, dy * i);
            let tile = match board.get(at) {
                Some(t) if t.kind == TileKind::Playable => t,
                _ => break,
            };
            if tile.piece.is_some() {
                break;
            }
            if !tile.locked && !out.contains(&at) {
                out.push(at);
            }
        }
    }
    out
}

/// Single jumps from an explicit offset table, for fairy leapers whose
/// pattern is not a rotation set `l_shape` can express.
pub fn leaps(board: &Board, from: Coord, offsets: &[(i32, i32)]) -> Vec<Coord> {
    if !on_turn(board, from) {
        return Vec::new();
    }
    let mut out = Vec::new();
    for &(dx, dy) in offsets {
        let at = from.offset(dx, dy);
        let tile = match board.get(at) {
            Some(t) if t.kind == TileKind::Playable => t,
            _ => continue,
        };
        if tile.piece.is_none() && !tile.locked && !out.contains(&at) {
            out.push(at);
        }
    }
    out
}

/// Every empty playable square on the board (the duck's move).
pub fn anywhere(board: &Board, from: Coord) -> Vec<Coord> {
    if !on_turn(board, from) {
        return Vec::new();
    }
    board
        .coords()
        .filter(|&c| {
            c != from
                && board
                    .get(c)
                    .map(|t| t.piece.is_none() && !t.locked)
                    .unwrap_or(false)
        })
        .collect()
}

/// Zips an x-axis square list against a y-axis one, pairing the x of the
/// first with the y of the second. Diagonal sight lines are built this way
/// from two straight scans.
pub fn compound(xs: &[Coord], ys: &[Coord]) -> Vec<Coord> {
    xs.iter()
        .zip(ys.iter())
        .map(|(a, b)| Coord::new(a.x, b.y))
        .collect()
}

/// One sight ray: every square up to and including the first occupied one.
/// Used by `lines_of_sight` implementations; never filtered by turn or lock.
pub fn sight(board: &Board, from: Coord, dx: i32, dy: i32, limit: u32) -> Vec<Coord> {
    let mut out = Vec::new();
    let mut at = from;
    let mut count = 0u32;
    while count < limit {
        at = at.offset(dx, dy);
        let tile = match board.get(at) {
            Some(t) if t.kind == TileKind::Playable => t,
            _ => break,
        };
        out.push(at);
        if tile.piece.is_some() {
            break;
        }
        count += 1;
    }
    out
}

// --- Capture-flavoured generators ---

pub mod capture {
    use super::*;

    /// Walks one capture ray. Yields the first occupied square if hostile
    /// (or unconditionally with `hypo`, in which case the empty squares
    /// crossed on the way are threatened and reported too).
    fn capture_ray(
        board: &Board,
        from: Coord,
        dx: i32,
        dy: i32,
        limit: u32,
        hypo: bool,
        out: &mut Vec<Coord>,
    ) {
        let side = match acting_side(board, from) {
            Some(s) => s,
            None => return,
        };
        let mut at = from;
        let mut count = 0u32;
        while count < limit {
            at = at.offset(dx, dy);
            let tile = match board.get(at) {
                Some(t) if t.kind == TileKind::Playable => t,
                _ => return,
            };
            match &tile.piece {
                Some(target) => {
                    if hypo {
                        out.push(at);
                    } else if side.hostile_to(target.side) && !tile.locked {
                        out.push(at);
                    }
                    return;
                }
                None => {
                    if hypo {
                        out.push(at);
                    }
                }
            }
            count += 1;
        }
    }

    pub fn line(
        board: &Board,
        from: Coord,
        axis: Axis,
        step: i32,
        limit: u32,
        hypo: bool,
    ) -> Vec<Coord> {
        if !hypo && !on_turn(board, from) {
            return Vec::new();
        }
        let (dx, dy) = match axis {
            Axis::X => (step, 0),
            Axis::Y => (0, step),
        };
        let mut out = Vec::new();
        capture_ray(board, from, dx, dy, limit, hypo, &mut out);
        out
    }

    pub fn diagonal(
        board: &Board,
        from: Coord,
        step_x: i32,
        step_y: i32,
        limit: u32,
        hypo: bool,
    ) -> Vec<Coord> {
        if !hypo && !on_turn(board, from) {
            return Vec::new();
        }
        let mut out = Vec::new();
        capture_ray(board, from, step_x, step_y, limit, hypo, &mut out);
        out
    }

    pub fn orthogonals(board: &Board, from: Coord, limit: u32, hypo: bool) -> Vec<Coord> {
        if !hypo && !on_turn(board, from) {
            return Vec::new();
        }
        let mut out = Vec::new();
        for (dx, dy) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
            capture_ray(board, from, dx, dy, limit, hypo, &mut out);
        }
        out
    }

    pub fn diagonals(board: &Board, from: Coord, limit: u32, hypo: bool) -> Vec<Coord> {
        if !hypo && !on_turn(board, from) {
            return Vec::new();
        }
        let mut out = Vec::new();
        for (dx, dy) in [(1, 1), (1, -1), (-1, 1), (-1, -1)] {
            capture_ray(board, from, dx, dy, limit, hypo, &mut out);
        }
        out
    }

    pub fn l_shape(
        board: &Board,
        from: Coord,
        leg_x: i32,
        leg_y: i32,
        limit: u32,
        hypo: bool,
    ) -> Vec<Coord> {
        if !hypo && !on_turn(board, from) {
            return Vec::new();
        }
        let side = match acting_side(board, from) {
            Some(s) => s,
            None => return Vec::new(),
        };
        let mut out = Vec::new();
        for (dx, dy) in l_offsets(leg_x, leg_y) {
            for i in 1..=limit as i32 {
                let at = from.offset(dx * i, dy * i);
                let tile = match board.get(at) {
                    Some(t) if t.kind == TileKind::Playable => t,
                    _ => break,
                };
                match &tile.piece {
                    Some(target) => {
                        let take = if hypo {
                            true
                        } else {
                            side.hostile_to(target.side) && !tile.locked
                        };
                        if take && !out.contains(&at) {
                            out.push(at);
                        }
                        break;
                    }
                    None => {
                        if hypo && !out.contains(&at) {
                            out.push(at);
                        }
                    }
                }
            }
        }
        out
    }

    /// Capture flavour of the offset-table jump.
    pub fn leaps(board: &Board, from: Coord, offsets: &[(i32, i32)], hypo: bool) -> Vec<Coord> {
        if !hypo && !on_turn(board, from) {
            return Vec::new();
        }
        let side = match acting_side(board, from) {
            Some(s) => s,
            None => return Vec::new(),
        };
        let mut out = Vec::new();
        for &(dx, dy) in offsets {
            let at = from.offset(dx, dy);
            let tile = match board.get(at) {
                Some(t) if t.kind == TileKind::Playable => t,
                _ => continue,
            };
            let take = match &tile.piece {
                Some(target) => hypo || (side.hostile_to(target.side) && !tile.locked),
                None => hypo,
            };
            if take && !out.contains(&at) {
                out.push(at);
            }
        }
        out
    }

    /// Every enemy-occupied square. No piece in the catalogue uses it, but
    /// the library carries it for custom archetypes.
    pub fn anywhere(board: &Board, from: Coord, hypo: bool) -> Vec<Coord> {
        if !hypo && !on_turn(board, from) {
            return Vec::new();
        }
        let side = match acting_side(board, from) {
            Some(s) => s,
            None => return Vec::new(),
        };
        board
            .coords()
            .filter(|&c| {
                board
                    .get(c)
                    .map(|tile| match &tile.piece {
                        Some(target) => side.hostile_to(target.side) && (hypo || !tile.locked),
                        None => false,
                    })
                    .unwrap_or(false)
            })
            .collect()
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
    fn line_stops_at_edge_and_blocker() {
        let mut board = empty_board();
        put(&mut board, 'R', Coord::new(0, 7));
        put(&mut board, 'P', Coord::new(0, 4));
        let up = line(&board, Coord::new(0, 7), Axis::Y, -1, UNLIMITED);
        assert_eq!(up, vec![Coord::new(0, 6), Coord::new(0, 5)]);
        let right = line(&board, Coord::new(0, 7), Axis::X, 1, UNLIMITED);
        assert_eq!(right.len(), 7);
    }

    #[test]
    fn capture_ray_yields_at_most_first_occupied() {
        let mut board = empty_board();
        put(&mut board, 'R', Coord::new(0, 7));
        put(&mut board, 'p', Coord::new(0, 3));
        put(&mut board, 'q', Coord::new(0, 1));
        let hits = capture::line(&board, Coord::new(0, 7), Axis::Y, -1, UNLIMITED, false);
        // Only the nearest enemy; the queen behind it is shielded.
        assert_eq!(hits, vec![Coord::new(0, 3)]);
    }

    #[test]
    fn capture_ray_yields_nothing_for_friendly_blocker() {
        let mut board = empty_board();
        put(&mut board, 'R', Coord::new(0, 7));
        put(&mut board, 'P', Coord::new(0, 3));
        let hits = capture::line(&board, Coord::new(0, 7), Axis::Y, -1, UNLIMITED, false);
        assert!(hits.is_empty());
    }

    #[test]
    fn hypothetical_captures_ignore_turn_and_friendliness() {
        let mut board = empty_board();
        put(&mut board, 'r', Coord::new(0, 0));
        put(&mut board, 'p', Coord::new(0, 3));
        // White to move, so the black rook has no real captures...
        assert!(capture::line(&board, Coord::new(0, 0), Axis::Y, 1, UNLIMITED, false).is_empty());
        // ...but hypothetically it threatens everything down to and
        // including its own pawn.
        let threat = capture::line(&board, Coord::new(0, 0), Axis::Y, 1, UNLIMITED, true);
        assert_eq!(
            threat,
            vec![Coord::new(0, 1), Coord::new(0, 2), Coord::new(0, 3)]
        );
    }

    #[test]
    fn turn_gate_silences_off_turn_pieces() {
        let mut board = empty_board();
        put(&mut board, 'r', Coord::new(0, 0));
        assert!(line(&board, Coord::new(0, 0), Axis::Y, 1, UNLIMITED).is_empty());
        board.progress_turn();
        assert!(!line(&board, Coord::new(0, 0), Axis::Y, 1, UNLIMITED).is_empty());
    }

    #[test]
    fn l_shape_knight_jumps() {
        let mut board = empty_board();
        put(&mut board, 'N', Coord::new(3, 4));
        let jumps = l_shape(&board, Coord::new(3, 4), 2, 1, 1);
        assert_eq!(jumps.len(), 8);
        assert!(jumps.contains(&Coord::new(5, 5)));
        assert!(jumps.contains(&Coord::new(1, 3)));
    }

    #[test]
    fn mirrored_pieces_have_mirrored_moves() {
        let mut board = empty_board();
        put(&mut board, 'N', Coord::new(1, 7));
        put(&mut board, 'n', Coord::new(1, 0));
        let white = l_shape(&board, Coord::new(1, 7), 2, 1, 1);
        board.progress_turn();
        let black = l_shape(&board, Coord::new(1, 0), 2, 1, 1);
        let mirrored: Vec<Coord> = black.iter().map(|c| Coord::new(c.x, 7 - c.y)).collect();
        assert_eq!(white.len(), mirrored.len());
        for c in &white {
            assert!(mirrored.contains(c));
        }
    }

    #[test]
    fn locked_squares_are_skipped_but_not_blocking() {
        let mut board = empty_board();
        put(&mut board, 'R', Coord::new(0, 7));
        board.get_mut(Coord::new(0, 5)).unwrap().locked = true;
        let up = line(&board, Coord::new(0, 7), Axis::Y, -1, UNLIMITED);
        assert!(!up.contains(&Coord::new(0, 5)));
        // The ray continues past the locked square.
        assert!(up.contains(&Coord::new(0, 4)));
    }

    #[test]
    fn anywhere_covers_every_empty_square() {
        let mut board = empty_board();
        put(&mut board, 'R', Coord::new(0, 0));
        put(&mut board, 'P', Coord::new(5, 5));
        let all = anywhere(&board, Coord::new(0, 0));
        assert_eq!(all.len(), 62);
        assert!(!all.contains(&Coord::new(5, 5)));
        assert!(!all.contains(&Coord::new(0, 0)));
    }

    #[test]
    fn leaps_split_empty_and_occupied_targets() {
        let mut board = empty_board();
        put(&mut board, 'R', Coord::new(4, 4));
        put(&mut board, 'p', Coord::new(4, 2));
        let jumps = leaps(&board, Coord::new(4, 4), &[(0, 2), (0, -2)]);
        assert_eq!(jumps, vec![Coord::new(4, 6)]);
        let caps = capture::leaps(&board, Coord::new(4, 4), &[(0, 2), (0, -2)], false);
        assert_eq!(caps, vec![Coord::new(4, 2)]);
    }

    #[test]
    fn compound_zips_axes() {
        let xs = vec![Coord::new(2, 0), Coord::new(1, 0)];
        let ys = vec![Coord::new(0, 5), Coord::new(0, 4)];
        assert_eq!(
            compound(&xs, &ys),
            vec![Coord::new(2, 5), Coord::new(1, 4)]
        );
    }

    #[test]
    fn sight_includes_the_blocker() {
        let mut board = empty_board();
        put(&mut board, 'R', Coord::new(0, 7));
        put(&mut board, 'p', Coord::new(0, 4));
        let ray = sight(&board, Coord::new(0, 7), 0, -1, UNLIMITED);
        assert_eq!(
            ray,
            vec![Coord::new(0, 6), Coord::new(0, 5), Coord::new(0, 4)]
        );
    }
}
