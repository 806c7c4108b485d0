// src/variants/standard.rs
//
// Standard occidental chess, and the piece archetypes most other variants
// reuse. Each archetype is one static behaviour value shared by both
// colours; direction-of-play is read off the acting piece.

use crate::board::{Board, BoardError, Coord};
use crate::movement::{self, capture, Axis, UNLIMITED};
use crate::piece::{relocate, Behaviour, MoveEffects, Piece, Side};
use crate::rules;
use crate::variant::Variant;

pub const LAYOUT: &[&str] = &["8", "8", "8", "8", "8", "8", "8", "8"];
pub const INIT_POS: &[&str] = &[
    "rnbqkbnr", "pppppppp", "8", "8", "8", "8", "PPPPPPPP", "RNBQKBNR",
];

/// Direction of play along y: White advances up the board (towards row 0),
/// Black down.
pub fn forward(side: Side) -> i32 {
    match side {
        Side::White => -1,
        Side::Black => 1,
        Side::Any => 0,
    }
}

/// The rank a pawn of `side` promotes on.
pub fn promotion_rank(board: &Board, side: Side) -> i32 {
    match side {
        Side::White => 0,
        _ => board.height - 1,
    }
}

// --- Sliding pieces ---

pub struct Slider {
    pub orth: bool,
    pub diag: bool,
    pub limit: u32,
}

impl Behaviour for Slider {
    fn moves(&self, board: &Board, at: Coord) -> Vec<Coord> {
        let mut out = Vec::new();
        if self.orth {
            out.extend(movement::orthogonals(board, at, self.limit));
        }
        if self.diag {
            out.extend(movement::diagonals(board, at, self.limit));
        }
        out
    }

    fn capture_squares(&self, board: &Board, at: Coord, hypo: bool) -> Vec<Coord> {
        let mut out = Vec::new();
        if self.orth {
            out.extend(capture::orthogonals(board, at, self.limit, hypo));
        }
        if self.diag {
            out.extend(capture::diagonals(board, at, self.limit, hypo));
        }
        out
    }

    fn lines_of_sight(&self, board: &Board, at: Coord) -> Vec<Vec<Coord>> {
        let mut dirs: Vec<(i32, i32)> = Vec::new();
        if self.orth {
            dirs.extend([(1, 0), (-1, 0), (0, 1), (0, -1)]);
        }
        if self.diag {
            dirs.extend([(1, 1), (1, -1), (-1, 1), (-1, -1)]);
        }
        dirs.into_iter()
            .map(|(dx, dy)| movement::sight(board, at, dx, dy, self.limit))
            .filter(|line| !line.is_empty())
            .collect()
    }
}

// --- Leapers ---

pub struct Leaper {
    pub leg_x: i32,
    pub leg_y: i32,
    pub limit: u32,
}

impl Behaviour for Leaper {
    fn moves(&self, board: &Board, at: Coord) -> Vec<Coord> {
        movement::l_shape(board, at, self.leg_x, self.leg_y, self.limit)
    }

    fn capture_squares(&self, board: &Board, at: Coord, hypo: bool) -> Vec<Coord> {
        capture::l_shape(board, at, self.leg_x, self.leg_y, self.limit, hypo)
    }
}

// --- Pawns ---

pub struct Pawn;

impl Behaviour for Pawn {
    fn moves(&self, board: &Board, at: Coord) -> Vec<Coord> {
        let piece = match board.piece_at(at) {
            Some(p) => p,
            None => return Vec::new(),
        };
        let reach = if piece.moved { 1 } else { 2 };
        movement::line(board, at, Axis::Y, forward(piece.side), reach)
    }

    fn capture_squares(&self, board: &Board, at: Coord, hypo: bool) -> Vec<Coord> {
        let piece = match board.piece_at(at) {
            Some(p) => p,
            None => return Vec::new(),
        };
        let side = piece.side;
        let dir = forward(side);
        let mut out = capture::diagonal(board, at, 1, dir, 1, hypo);
        out.extend(capture::diagonal(board, at, -1, dir, 1, hypo));
        if !hypo && board.turn() == side {
            // En passant: a passed, still-flagged enemy pawn beside us is
            // taken on the empty square behind it.
            for dx in [-1, 1] {
                let beside = at.offset(dx, 0);
                let landing = at.offset(dx, dir);
                let victim_ok = board
                    .piece_at(beside)
                    .map(|p| p.en_passantable && side.hostile_to(p.side))
                    .unwrap_or(false);
                let landing_ok = board
                    .get(landing)
                    .map(|t| t.is_playable() && t.piece.is_none() && !t.locked)
                    .unwrap_or(false);
                if victim_ok && landing_ok && !out.contains(&landing) {
                    out.push(landing);
                }
            }
        }
        out
    }

    fn move_to(&self, board: &mut Board, from: Coord, to: Coord) -> MoveEffects {
        let side = match board.piece_at(from) {
            Some(p) => p.side,
            None => return MoveEffects::none(),
        };
        let mut effects = relocate(board, from, to);
        if to.x != from.x && effects.captured.is_none() {
            // Diagonal onto an empty square: the en passant victim stands
            // beside the origin.
            let victim = Coord::new(to.x, from.y);
            effects.captured = board.take_piece(victim);
            effects.captured_at = Some(victim);
        }
        if (to.y - from.y).abs() == 2 {
            if let Some(piece) = board.get_mut(to).and_then(|t| t.piece.as_mut()) {
                piece.en_passantable = true;
            }
        }
        if to.y == promotion_rank(board, side) {
            effects.promotion = true;
        }
        effects
    }

    fn lines_of_sight(&self, board: &Board, at: Coord) -> Vec<Vec<Coord>> {
        let piece = match board.piece_at(at) {
            Some(p) => p,
            None => return Vec::new(),
        };
        let fwd = movement::sight(board, at, 0, forward(piece.side), 1);
        let mut lines = Vec::new();
        for dx in [-1, 1] {
            let flank = movement::sight(board, at, dx, 0, 1);
            let line = movement::compound(&flank, &fwd);
            if !line.is_empty() {
                lines.push(line);
            }
        }
        lines
    }
}

// --- Kings ---

pub struct King;

impl Behaviour for King {
    fn moves(&self, board: &Board, at: Coord) -> Vec<Coord> {
        let piece = match board.piece_at(at) {
            Some(p) => p,
            None => return Vec::new(),
        };
        let side = piece.side;
        if side != Side::Any && board.turn() != side {
            return Vec::new();
        }
        let mut out = movement::orthogonals(board, at, 1);
        out.extend(movement::diagonals(board, at, 1));
        let danger = rules::attack_map(board, side.opponent());
        out.retain(|c| !danger.contains(c));

        if !piece.moved && !danger.contains(&at) {
            'castle: for (dir, corner_x) in [(1, board.width - 1), (-1, 0)] {
                let corner = Coord::new(corner_x, at.y);
                let rook_ok = board
                    .piece_at(corner)
                    .map(|r| r.name == "Rook" && r.side == side && !r.moved)
                    .unwrap_or(false);
                if !rook_ok {
                    continue;
                }
                let mut x = at.x + dir;
                while x != corner_x {
                    match board.get(Coord::new(x, at.y)) {
                        Some(t) if t.is_playable() && t.piece.is_none() => {}
                        _ => continue 'castle,
                    }
                    x += dir;
                }
                // The king may not cross an attacked square.
                for step in 1..=2 {
                    if danger.contains(&at.offset(dir * step, 0)) {
                        continue 'castle;
                    }
                }
                let dest = at.offset(dir * 2, 0);
                let dest_ok = board
                    .get(dest)
                    .map(|t| t.is_playable() && !t.locked)
                    .unwrap_or(false);
                if dest_ok && !out.contains(&dest) {
                    out.push(dest);
                }
            }
        }
        out
    }

    fn capture_squares(&self, board: &Board, at: Coord, hypo: bool) -> Vec<Coord> {
        let mut out = capture::orthogonals(board, at, 1, hypo);
        out.extend(capture::diagonals(board, at, 1, hypo));
        if !hypo {
            // A royal piece never takes a defended piece.
            if let Some(piece) = board.piece_at(at) {
                let danger = rules::attack_map(board, piece.side.opponent());
                out.retain(|c| !danger.contains(c));
            }
        }
        out
    }

    fn move_to(&self, board: &mut Board, from: Coord, to: Coord) -> MoveEffects {
        let effects = relocate(board, from, to);
        let dx = to.x - from.x;
        if dx.abs() == 2 {
            // Castling: the rook is the first piece past the king's
            // destination and lands on the square the king crossed.
            let dir = dx.signum();
            let mut x = to.x + dir;
            while let Some(tile) = board.get(Coord::new(x, from.y)) {
                if tile.piece.is_some() {
                    if let Some(mut rook) = board.take_piece(Coord::new(x, from.y)) {
                        rook.moved = true;
                        board.place_piece(from.offset(dir, 0), rook);
                    }
                    break;
                }
                x += dir;
            }
        }
        effects
    }
}

// --- Shared statics ---

pub static PAWN: Pawn = Pawn;
pub static KNIGHT: Leaper = Leaper { leg_x: 2, leg_y: 1, limit: 1 };
pub static BISHOP: Slider = Slider { orth: false, diag: true, limit: UNLIMITED };
pub static ROOK: Slider = Slider { orth: true, diag: false, limit: UNLIMITED };
pub static QUEEN: Slider = Slider { orth: true, diag: true, limit: UNLIMITED };
pub static KING: King = King;

/// The standard piece table: uppercase White, lowercase Black.
pub fn piece(code: char) -> Option<Piece> {
    let side = if code.is_ascii_uppercase() {
        Side::White
    } else {
        Side::Black
    };
    let piece = match code.to_ascii_lowercase() {
        'p' => Piece::new(code, "Pawn", 1, side, false, &PAWN),
        'n' => Piece::new(code, "Knight", 3, side, false, &KNIGHT),
        'b' => Piece::new(code, "Bishop", 3, side, false, &BISHOP),
        'r' => Piece::new(code, "Rook", 5, side, false, &ROOK),
        'q' => Piece::new(code, "Queen", 9, side, false, &QUEEN),
        'k' => Piece::new(code, "King", 0, side, true, &KING),
        _ => return None,
    };
    Some(piece)
}

pub fn board() -> Result<Board, BoardError> {
    let mut board = Board::construct(8, 8, LAYOUT)?;
    board.populate(INIT_POS, piece)?;
    Ok(board)
}

pub static STANDARD: Variant = Variant {
    name: "standard",
    title: "Standard Chess",
    blurb: "The classical game: win by checkmating the enemy king.",
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

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_board() -> Board {
        Board::construct(8, 8, &["8"; 8]).unwrap()
    }

    fn put(board: &mut Board, code: char, at: Coord) {
        board.place_piece(at, piece(code).unwrap());
    }

    fn put_moved(board: &mut Board, code: char, at: Coord) {
        let mut p = piece(code).unwrap();
        p.moved = true;
        board.place_piece(at, p);
    }

    #[test]
    fn pawn_double_step_decays() {
        let mut board = empty_board();
        put(&mut board, 'P', Coord::new(4, 6));
        let fresh = PAWN.moves(&board, Coord::new(4, 6));
        assert_eq!(fresh, vec![Coord::new(4, 5), Coord::new(4, 4)]);
        put_moved(&mut board, 'P', Coord::new(0, 4));
        let stale = PAWN.moves(&board, Coord::new(0, 4));
        assert_eq!(stale, vec![Coord::new(0, 3)]);
    }

    #[test]
    fn blocked_pawn_does_not_hop() {
        let mut board = empty_board();
        put(&mut board, 'P', Coord::new(4, 6));
        put(&mut board, 'n', Coord::new(4, 5));
        assert!(PAWN.moves(&board, Coord::new(4, 6)).is_empty());
    }

    #[test]
    fn pawn_captures_diagonally_only() {
        let mut board = empty_board();
        put(&mut board, 'P', Coord::new(4, 4));
        put(&mut board, 'p', Coord::new(3, 3));
        put(&mut board, 'p', Coord::new(4, 3));
        let caps = PAWN.capture_squares(&board, Coord::new(4, 4), false);
        assert_eq!(caps, vec![Coord::new(3, 3)]);
    }

    #[test]
    fn pawn_promotion_flag_on_last_rank() {
        let mut board = empty_board();
        put_moved(&mut board, 'P', Coord::new(0, 1));
        let effects = PAWN.move_to(&mut board, Coord::new(0, 1), Coord::new(0, 0));
        assert!(effects.promotion);
    }

    #[test]
    fn kingside_castle_when_path_is_clear() {
        let mut board = empty_board();
        put(&mut board, 'K', Coord::new(4, 7));
        put(&mut board, 'R', Coord::new(7, 7));
        put(&mut board, 'k', Coord::new(4, 0));
        let moves = KING.moves(&board, Coord::new(4, 7));
        assert!(moves.contains(&Coord::new(6, 7)));
        // Executing it hops the rook over.
        KING.move_to(&mut board, Coord::new(4, 7), Coord::new(6, 7));
        assert_eq!(board.piece_at(Coord::new(6, 7)).unwrap().code, 'K');
        assert_eq!(board.piece_at(Coord::new(5, 7)).unwrap().code, 'R');
        assert!(board.piece_at(Coord::new(7, 7)).is_none());
    }

    #[test]
    fn no_castle_through_an_attacked_square() {
        let mut board = empty_board();
        put(&mut board, 'K', Coord::new(4, 7));
        put(&mut board, 'R', Coord::new(7, 7));
        put(&mut board, 'k', Coord::new(4, 0));
        put(&mut board, 'r', Coord::new(5, 2)); // covers f1
        let moves = KING.moves(&board, Coord::new(4, 7));
        assert!(!moves.contains(&Coord::new(6, 7)));
    }

    #[test]
    fn no_castle_after_the_rook_has_moved() {
        let mut board = empty_board();
        put(&mut board, 'K', Coord::new(4, 7));
        put_moved(&mut board, 'R', Coord::new(7, 7));
        put(&mut board, 'k', Coord::new(4, 0));
        let moves = KING.moves(&board, Coord::new(4, 7));
        assert!(!moves.contains(&Coord::new(6, 7)));
    }

    #[test]
    fn king_refuses_attacked_squares() {
        let mut board = empty_board();
        put(&mut board, 'K', Coord::new(4, 7));
        put(&mut board, 'r', Coord::new(3, 0)); // covers the d-file
        put(&mut board, 'k', Coord::new(0, 0));
        let moves = KING.moves(&board, Coord::new(4, 7));
        assert!(!moves.contains(&Coord::new(3, 7)));
        assert!(!moves.contains(&Coord::new(3, 6)));
        assert!(moves.contains(&Coord::new(5, 7)));
    }

    #[test]
    fn king_will_not_take_a_defended_piece() {
        let mut board = empty_board();
        put(&mut board, 'K', Coord::new(4, 7));
        put(&mut board, 'n', Coord::new(4, 6)); // adjacent knight
        put(&mut board, 'r', Coord::new(4, 0)); // defends it down the file
        put(&mut board, 'k', Coord::new(0, 0));
        let caps = KING.capture_squares(&board, Coord::new(4, 7), false);
        assert!(!caps.contains(&Coord::new(4, 6)));
        // Undefended, it is fair game.
        board.take_piece(Coord::new(4, 0));
        let caps = KING.capture_squares(&board, Coord::new(4, 7), false);
        assert!(caps.contains(&Coord::new(4, 6)));
    }

    #[test]
    fn slider_sight_lines_end_on_the_blocker() {
        let mut board = empty_board();
        put(&mut board, 'R', Coord::new(0, 7));
        put(&mut board, 'p', Coord::new(0, 4));
        let lines = ROOK.lines_of_sight(&board, Coord::new(0, 7));
        let up = lines
            .iter()
            .find(|l| l.contains(&Coord::new(0, 6)))
            .unwrap();
        assert_eq!(up.last(), Some(&Coord::new(0, 4)));
    }
}
