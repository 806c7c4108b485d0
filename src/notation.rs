// src/notation.rs
//
// The human-editable position notation, modelled on FEN: piece placement
// rows from the top of the board down, side to move, castle rights, en
// passant target, halfmove clock, fullmove number. Import validates the
// whole string first and builds a fresh board; the live position is only
// replaced once everything has been accepted.
//
// Empty runs are written digit by digit ("93" is twelve squares), matching
// the layout and initpos notations.

use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;

use crate::board::{Board, Coord};
use crate::piece::{Piece, Side};

lazy_static! {
    static ref POSITION_RE: Regex = Regex::new(
        r"^([A-Za-z0-9]+(?:/[A-Za-z0-9]+)*) ([wb]) (-|K?Q?k?q?) (-|[a-z][0-9]{1,2}) ([0-9]+) ([0-9]+)$"
    )
    .unwrap();
}

// --- Errors ---

#[derive(Debug)]
pub enum NotationError {
    BadFormat(String),
    RowCountMismatch { expected: i32, found: usize },
    RowWidthMismatch { row: usize, expected: i32, found: i32 },
    UnknownPiece(char),
    PieceOnVoid(Coord),
    BadCastleRights(char),
    BadEnPassant(String),
    BadSquare(String),
    BadCount(String),
}

impl fmt::Display for NotationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotationError::BadFormat(s) => write!(f, "Malformed position string: '{}'", s),
            NotationError::RowCountMismatch { expected, found } => {
                write!(f, "Position has {} rows, the board has {}.", found, expected)
            }
            NotationError::RowWidthMismatch { row, expected, found } => {
                write!(f, "Row {} spans {} squares, the board is {} wide.", row, found, expected)
            }
            NotationError::UnknownPiece(c) => {
                write!(f, "No piece registered for code '{}'.", c)
            }
            NotationError::PieceOnVoid(c) => {
                write!(f, "A piece is placed on the void square at {}.", c)
            }
            NotationError::BadCastleRights(c) => {
                write!(f, "Castle right '{}' names a piece that is not in place.", c)
            }
            NotationError::BadEnPassant(s) => {
                write!(f, "En passant target '{}' has no matching pawn.", s)
            }
            NotationError::BadSquare(s) => write!(f, "Not a board square: '{}'", s),
            NotationError::BadCount(s) => write!(f, "Not a valid move count: '{}'", s),
        }
    }
}

impl std::error::Error for NotationError {}

// --- Algebraic coordinates ---

/// "e2"-style square name. Files are letters from the left edge, ranks
/// count up from the bottom row.
pub fn coord_to_algebraic(board: &Board, coord: Coord) -> String {
    let file = (b'a' + coord.x as u8) as char;
    format!("{}{}", file, board.height - coord.y)
}

pub fn algebraic_to_coord(board: &Board, s: &str) -> Option<Coord> {
    let mut chars = s.chars();
    let file = chars.next()?;
    if !file.is_ascii_lowercase() {
        return None;
    }
    let rank: i32 = chars.as_str().parse().ok()?;
    let coord = Coord::new((file as u8 - b'a') as i32, board.height - rank);
    board.get(coord).map(|t| t.coord)
}

// --- Export ---

fn castle_right(board: &Board, royal_code: char, rook_corner: Coord) -> bool {
    let royal_side = if royal_code.is_uppercase() {
        Side::White
    } else {
        Side::Black
    };
    let royal_ok = board
        .royal_of(royal_side)
        .and_then(|c| board.piece_at(c))
        .map(|p| !p.moved)
        .unwrap_or(false);
    let rook_ok = board
        .piece_at(rook_corner)
        .map(|p| p.name == "Rook" && p.side == royal_side && !p.moved)
        .unwrap_or(false);
    royal_ok && rook_ok
}

/// Serializes the live position. Void squares are written as empties.
pub fn export_position(board: &Board) -> String {
    let mut rows = Vec::with_capacity(board.height as usize);
    for y in 0..board.height {
        let mut row = String::new();
        let mut run = 0u32;
        for x in 0..board.width {
            match board.piece_at(Coord::new(x, y)) {
                Some(piece) => {
                    while run > 0 {
                        let chunk = run.min(9);
                        row.push(char::from_digit(chunk, 10).unwrap_or('9'));
                        run -= chunk;
                    }
                    row.push(piece.code);
                }
                None => run += 1,
            }
        }
        while run > 0 {
            let chunk = run.min(9);
            row.push(char::from_digit(chunk, 10).unwrap_or('9'));
            run -= chunk;
        }
        rows.push(row);
    }

    let side = if board.turn() == Side::White { 'w' } else { 'b' };

    let mut rights = String::new();
    let bottom = board.height - 1;
    if castle_right(board, 'K', Coord::new(board.width - 1, bottom)) {
        rights.push('K');
    }
    if castle_right(board, 'K', Coord::new(0, bottom)) {
        rights.push('Q');
    }
    if castle_right(board, 'k', Coord::new(board.width - 1, 0)) {
        rights.push('k');
    }
    if castle_right(board, 'k', Coord::new(0, 0)) {
        rights.push('q');
    }
    if rights.is_empty() {
        rights.push('-');
    }

    let mut ep = String::from("-");
    for c in board.coords() {
        if let Some(piece) = board.piece_at(c) {
            if piece.en_passantable {
                // The target is the square the pawn skipped.
                let dy = if piece.side == Side::White { 1 } else { -1 };
                ep = coord_to_algebraic(board, c.offset(0, dy));
                break;
            }
        }
    }

    let fullmove = board.turn_number / 2 + 1;
    format!(
        "{} {} {} {} {} {}",
        rows.join("/"),
        side,
        rights,
        ep,
        board.halfmove_clock,
        fullmove
    )
}

// --- Import ---

fn apply_castle_right(
    board: &mut Board,
    letter: char,
    royal_side: Side,
    rook_corner: Coord,
) -> Result<(), NotationError> {
    let royal = board
        .royal_of(royal_side)
        .ok_or(NotationError::BadCastleRights(letter))?;
    match board.get_mut(royal).and_then(|t| t.piece.as_mut()) {
        Some(p) => p.moved = false,
        None => return Err(NotationError::BadCastleRights(letter)),
    }
    match board.get_mut(rook_corner).and_then(|t| t.piece.as_mut()) {
        Some(p) if p.name == "Rook" && p.side == royal_side => p.moved = false,
        _ => return Err(NotationError::BadCastleRights(letter)),
    }
    Ok(())
}

/// Parses a position string against `board`'s geometry and piece table.
/// Returns a new board carrying the imported position; any error leaves the
/// caller's board untouched.
pub fn import_position(
    board: &Board,
    text: &str,
    factory: fn(char) -> Option<Piece>,
) -> Result<Board, NotationError> {
    let text = text.trim();
    let caps = POSITION_RE
        .captures(text)
        .ok_or_else(|| NotationError::BadFormat(text.to_string()))?;
    let rows: Vec<&str> = caps[1].split('/').collect();
    if rows.len() != board.height as usize {
        return Err(NotationError::RowCountMismatch {
            expected: board.height,
            found: rows.len(),
        });
    }

    let mut fresh = board.clone();
    let coords: Vec<Coord> = fresh.coords().collect();
    for c in coords {
        fresh.take_piece(c);
    }
    fresh.scrub();

    for (y, row) in rows.iter().enumerate() {
        let mut x: i32 = 0;
        for code in row.chars() {
            if let Some(run) = code.to_digit(10) {
                x += run as i32;
            } else {
                let mut piece = factory(code).ok_or(NotationError::UnknownPiece(code))?;
                let coord = Coord::new(x, y as i32);
                match fresh.get(coord) {
                    Some(tile) if tile.is_playable() => {
                        // Until the castle-rights field says otherwise,
                        // everything counts as having moved; pawns keep
                        // their double step only on their home rank.
                        let home_rank = match piece.side {
                            Side::White => board.height - 2,
                            Side::Black => 1,
                            Side::Any => coord.y,
                        };
                        piece.moved = piece.name != "Pawn" || coord.y != home_rank;
                        fresh.place_piece(coord, piece);
                    }
                    Some(_) => return Err(NotationError::PieceOnVoid(coord)),
                    None => {
                        return Err(NotationError::RowWidthMismatch {
                            row: y,
                            expected: board.width,
                            found: x + 1,
                        })
                    }
                }
                x += 1;
            }
        }
        if x != board.width {
            return Err(NotationError::RowWidthMismatch {
                row: y,
                expected: board.width,
                found: x,
            });
        }
    }

    let side_to_move = if &caps[2] == "w" { Side::White } else { Side::Black };

    let rights = &caps[3];
    if rights.is_empty() {
        return Err(NotationError::BadFormat(text.to_string()));
    }
    if rights != "-" {
        let bottom = fresh.height - 1;
        let right_edge = fresh.width - 1;
        for letter in rights.chars() {
            let (side, corner) = match letter {
                'K' => (Side::White, Coord::new(right_edge, bottom)),
                'Q' => (Side::White, Coord::new(0, bottom)),
                'k' => (Side::Black, Coord::new(right_edge, 0)),
                'q' => (Side::Black, Coord::new(0, 0)),
                other => return Err(NotationError::BadCastleRights(other)),
            };
            apply_castle_right(&mut fresh, letter, side, corner)?;
        }
    }

    let ep = &caps[4];
    if ep != "-" {
        let target = algebraic_to_coord(&fresh, ep)
            .ok_or_else(|| NotationError::BadSquare(ep.to_string()))?;
        // The double-stepped pawn belongs to the side that just moved and
        // stands one square past the target.
        let owner = side_to_move.opponent();
        let mut found = false;
        for dy in [-1, 1] {
            let at = target.offset(0, dy);
            if let Some(tile) = fresh.get_mut(at) {
                if let Some(piece) = tile.piece.as_mut() {
                    if piece.side == owner && piece.name == "Pawn" {
                        piece.en_passantable = true;
                        found = true;
                        break;
                    }
                }
            }
        }
        if !found {
            return Err(NotationError::BadEnPassant(ep.to_string()));
        }
    }

    let halfmove: u32 = caps[5]
        .parse()
        .map_err(|_| NotationError::BadCount(caps[5].to_string()))?;
    let fullmove: u32 = caps[6]
        .parse()
        .map_err(|_| NotationError::BadCount(caps[6].to_string()))?;
    if fullmove == 0 {
        return Err(NotationError::BadCount(caps[6].to_string()));
    }
    fresh.halfmove_clock = halfmove;
    fresh.turn_number =
        (fullmove - 1) * 2 + if side_to_move == Side::Black { 1 } else { 0 };
    fresh.aux = Default::default();
    fresh.pockets = [Vec::new(), Vec::new()];

    Ok(fresh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variants::standard;

    const OPENING: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    fn standard_board() -> Board {
        standard::board().unwrap()
    }

    #[test]
    fn algebraic_round_trip() {
        let board = standard_board();
        let e2 = Coord::new(4, 6);
        assert_eq!(coord_to_algebraic(&board, e2), "e2");
        assert_eq!(algebraic_to_coord(&board, "e2"), Some(e2));
        assert_eq!(algebraic_to_coord(&board, "a8"), Some(Coord::new(0, 0)));
        assert_eq!(algebraic_to_coord(&board, "h1"), Some(Coord::new(7, 7)));
        assert_eq!(algebraic_to_coord(&board, "i1"), None);
        assert_eq!(algebraic_to_coord(&board, "e9"), None);
    }

    #[test]
    fn exports_the_opening_position() {
        let board = standard_board();
        assert_eq!(export_position(&board), OPENING);
    }

    #[test]
    fn import_export_round_trip() {
        let board = standard_board();
        let imported = import_position(&board, OPENING, standard::piece).unwrap();
        assert_eq!(export_position(&imported), OPENING);
        assert_eq!(imported.piece_at(Coord::new(4, 7)).unwrap().code, 'K');
        assert!(!imported.piece_at(Coord::new(4, 7)).unwrap().moved);
    }

    #[test]
    fn round_trips_en_passant_and_partial_rights() {
        let board = standard_board();
        let text = "rnbqkbnr/ppp1pppp/8/3p4/8/8/PPPPPPPP/RNBQKBNR w Kq d6 0 2";
        let imported = import_position(&board, text, standard::piece).unwrap();
        let pawn = imported.piece_at(Coord::new(3, 3)).unwrap();
        assert!(pawn.en_passantable);
        // Only the white kingside rook and black queenside rook keep
        // their castle rights.
        assert!(!imported.piece_at(Coord::new(7, 7)).unwrap().moved);
        assert!(imported.piece_at(Coord::new(0, 7)).unwrap().moved);
        assert!(!imported.piece_at(Coord::new(0, 0)).unwrap().moved);
        assert!(imported.piece_at(Coord::new(7, 0)).unwrap().moved);
        assert_eq!(export_position(&imported), text);
    }

    #[test]
    fn import_fails_closed() {
        let board = standard_board();
        assert!(import_position(&board, "not a position", standard::piece).is_err());
        // Wrong row count.
        assert!(import_position(
            &board,
            "8/8/8/8/8/8/8 w - - 0 1",
            standard::piece
        )
        .is_err());
        // Row too wide.
        assert!(import_position(
            &board,
            "9/8/8/8/8/8/8/8 w - - 0 1",
            standard::piece
        )
        .is_err());
        // Unknown piece code.
        assert!(import_position(
            &board,
            "Z7/8/8/8/8/8/8/8 w - - 0 1",
            standard::piece
        )
        .is_err());
        // Rights claimed for absent rooks.
        assert!(import_position(
            &board,
            "4k3/8/8/8/8/8/8/4K3 w KQkq - 0 1",
            standard::piece
        )
        .is_err());
        // En passant target with no pawn behind it.
        assert!(import_position(
            &board,
            "4k3/8/8/8/8/8/8/4K3 w - e3 0 1",
            standard::piece
        )
        .is_err());
    }

    #[test]
    fn imported_pawns_off_their_home_rank_cannot_double_step() {
        let board = standard_board();
        let text = "4k3/8/8/8/8/4P3/8/4K3 b - - 3 9";
        let imported = import_position(&board, text, standard::piece).unwrap();
        assert!(imported.piece_at(Coord::new(4, 5)).unwrap().moved);
        assert_eq!(imported.turn(), Side::Black);
        assert_eq!(imported.halfmove_clock, 3);
        assert_eq!(imported.turn_number, 17);
    }
}
