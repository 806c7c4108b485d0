// src/board.rs
//
// The board is a rectangular grid of tiles. Tiles are either playable or
// void (holes in the board, used by some variant layouts); playable tiles
// carry an optional piece plus the transient selection flags the UI and the
// rules engine stamp between moves.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::piece::{Piece, Side};

// --- Coordinates ---

/// A board coordinate. `x` grows rightwards, `y` grows downwards, so `y = 0`
/// is the top row (Black's home rank in the standard set). Out-of-range
/// coordinates are representable; `Board::get` simply returns `None` for
/// them, which is what the movement generators rely on to stop at edges.
#[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub fn new(x: i32, y: i32) -> Self {
        Coord { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Coord {
        Coord::new(self.x + dx, self.y + dy)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// --- Tiles ---

/// Light/dark square shading. Purely presentational, except that circe
/// rebirth picks a home square by the shade of the capture square.
#[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq, Eq)]
pub enum Shade {
    Light,
    Dark,
}

#[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq, Eq)]
pub enum TileKind {
    Playable,
    Void,
}

#[derive(Debug, Clone)]
pub struct Tile {
    pub coord: Coord,
    pub kind: TileKind,
    pub shade: Option<Shade>,
    pub piece: Option<Piece>,
    // Transient selection-cycle flags. All three are recomputed between
    // moves; `scrub` resets them.
    pub move_target: bool,
    pub capture_target: bool,
    pub locked: bool,
}

impl Tile {
    fn playable(coord: Coord, shade: Shade) -> Self {
        Tile {
            coord,
            kind: TileKind::Playable,
            shade: Some(shade),
            piece: None,
            move_target: false,
            capture_target: false,
            locked: false,
        }
    }

    fn void(coord: Coord) -> Self {
        Tile {
            coord,
            kind: TileKind::Void,
            shade: None,
            piece: None,
            move_target: false,
            capture_target: false,
            locked: false,
        }
    }

    pub fn is_playable(&self) -> bool {
        self.kind == TileKind::Playable
    }
}

// --- Per-variant scratch state ---

/// Typed scratch state some variants thread through a turn. Regular chess
/// never touches it; duck uses `submove`, checkers uses the rest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Aux {
    /// Which sub-move of the current turn is in progress (duck: 0 = piece
    /// move, 1 = duck drop).
    pub submove: u8,
    /// Whether the turn passes to the opponent when the current move
    /// finishes (checkers clears it mid multi-jump).
    pub end_turn: bool,
    /// A piece that must move again this turn, pinning selection to it.
    pub select_again: Option<Coord>,
}

impl Default for Aux {
    fn default() -> Self {
        Aux {
            submove: 0,
            end_turn: true,
            select_again: None,
        }
    }
}

// --- Errors ---

#[derive(Debug)]
pub enum BoardError {
    InvalidLayoutCode(char),
    RowCountMismatch { expected: usize, found: usize },
    RowLengthMismatch { row: usize, expected: i32, found: i32 },
    UnknownPieceCode(char),
    PieceOnVoid(Coord),
}

impl fmt::Display for BoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoardError::InvalidLayoutCode(c) => {
                write!(f, "Invalid layout code '{}': expected a digit or a-z.", c)
            }
            BoardError::RowCountMismatch { expected, found } => {
                write!(f, "Layout has {} rows, expected {}.", found, expected)
            }
            BoardError::RowLengthMismatch { row, expected, found } => {
                write!(f, "Row {} spans {} squares, expected {}.", row, found, expected)
            }
            BoardError::UnknownPieceCode(c) => {
                write!(f, "No piece registered for code '{}'.", c)
            }
            BoardError::PieceOnVoid(c) => {
                write!(f, "Cannot place a piece on the void square at {}.", c)
            }
        }
    }
}

impl std::error::Error for BoardError {}

// --- Geometry ---

/// Screen rectangle of a tile, for hit-testing in a windowed front end.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

// --- Board ---

#[derive(Clone)]
pub struct Board {
    pub width: i32,
    pub height: i32,
    grid: Vec<Vec<Tile>>,
    /// Monotonic half-move counter; the side to move is derived from its
    /// parity, so variants may bump or hold it to reorder turns.
    pub turn_number: u32,
    /// Half-moves since the last capture or pawn advance.
    pub halfmove_clock: u32,
    /// Captured pieces, indexed by the capturing side.
    pub pockets: [Vec<Piece>; 2],
    pub aux: Aux,
    anchor: (i32, i32),
    tile_size: (i32, i32),
}

impl Board {
    /// Builds an empty board from a layout notation: one string per row, digits
    /// emitting runs of playable squares and letters `a..z` emitting runs of
    /// void squares of length = alphabet index + 1 (`a` = 1, `b` = 2, ...).
    /// Every row must span exactly `width` squares and there must be exactly
    /// `height` rows; nothing is truncated or padded.
    pub fn construct(height: usize, width: usize, layout: &[&str]) -> Result<Board, BoardError> {
        if layout.len() != height {
            return Err(BoardError::RowCountMismatch {
                expected: height,
                found: layout.len(),
            });
        }
        let width = width as i32;
        let mut grid = Vec::with_capacity(height);
        for (y, row_codes) in layout.iter().enumerate() {
            let mut row = Vec::with_capacity(width as usize);
            let mut x: i32 = 0;
            for code in row_codes.chars() {
                if let Some(run) = code.to_digit(10) {
                    for _ in 0..run {
                        let coord = Coord::new(x, y as i32);
                        let shade = if (coord.x + coord.y) % 2 == 0 {
                            Shade::Light
                        } else {
                            Shade::Dark
                        };
                        row.push(Tile::playable(coord, shade));
                        x += 1;
                    }
                } else if code.is_ascii_lowercase() {
                    let run = (code as u8 - b'a') as u32 + 1;
                    for _ in 0..run {
                        row.push(Tile::void(Coord::new(x, y as i32)));
                        x += 1;
                    }
                } else {
                    return Err(BoardError::InvalidLayoutCode(code));
                }
            }
            if x != width {
                return Err(BoardError::RowLengthMismatch {
                    row: y,
                    expected: width,
                    found: x,
                });
            }
            grid.push(row);
        }
        Ok(Board {
            width,
            height: height as i32,
            grid,
            turn_number: 0,
            halfmove_clock: 0,
            pockets: [Vec::new(), Vec::new()],
            aux: Aux::default(),
            anchor: (0, 0),
            tile_size: (64, 64),
        })
    }

    /// Places the starting pieces from an initpos notation: digits skip that many
    /// squares, any other character goes through the variant's piece factory.
    pub fn populate(
        &mut self,
        initpos: &[&str],
        factory: fn(char) -> Option<Piece>,
    ) -> Result<(), BoardError> {
        if initpos.len() != self.height as usize {
            return Err(BoardError::RowCountMismatch {
                expected: self.height as usize,
                found: initpos.len(),
            });
        }
        for (y, row_codes) in initpos.iter().enumerate() {
            let mut x: i32 = 0;
            for code in row_codes.chars() {
                if let Some(run) = code.to_digit(10) {
                    x += run as i32;
                } else {
                    let piece = factory(code).ok_or(BoardError::UnknownPieceCode(code))?;
                    let coord = Coord::new(x, y as i32);
                    match self.get_mut(coord) {
                        Some(tile) if tile.is_playable() => tile.piece = Some(piece),
                        Some(_) => return Err(BoardError::PieceOnVoid(coord)),
                        None => {
                            return Err(BoardError::RowLengthMismatch {
                                row: y,
                                expected: self.width,
                                found: x + 1,
                            })
                        }
                    }
                    x += 1;
                }
            }
            if x > self.width {
                return Err(BoardError::RowLengthMismatch {
                    row: y,
                    expected: self.width,
                    found: x,
                });
            }
        }
        Ok(())
    }

    pub fn get(&self, coord: Coord) -> Option<&Tile> {
        if coord.x < 0 || coord.y < 0 || coord.x >= self.width || coord.y >= self.height {
            return None;
        }
        Some(&self.grid[coord.y as usize][coord.x as usize])
    }

    pub fn get_mut(&mut self, coord: Coord) -> Option<&mut Tile> {
        if coord.x < 0 || coord.y < 0 || coord.x >= self.width || coord.y >= self.height {
            return None;
        }
        Some(&mut self.grid[coord.y as usize][coord.x as usize])
    }

    pub fn piece_at(&self, coord: Coord) -> Option<&Piece> {
        self.get(coord).and_then(|t| t.piece.as_ref())
    }

    /// Lifts the piece off a tile, leaving the slot empty. Relocation is
    /// always a take-then-place pair so a piece is never in two slots.
    pub fn take_piece(&mut self, coord: Coord) -> Option<Piece> {
        self.get_mut(coord).and_then(|t| t.piece.take())
    }

    pub fn place_piece(&mut self, coord: Coord, piece: Piece) {
        if let Some(tile) = self.get_mut(coord) {
            tile.piece = Some(piece);
        }
    }

    /// Clears all transient selection flags.
    pub fn scrub(&mut self) {
        for row in &mut self.grid {
            for tile in row {
                tile.move_target = false;
                tile.capture_target = false;
                tile.locked = false;
            }
        }
    }

    pub fn progress_turn(&mut self) {
        self.turn_number += 1;
    }

    /// The side to move, derived from the turn counter's parity.
    pub fn turn(&self) -> Side {
        if self.turn_number % 2 == 0 {
            Side::White
        } else {
            Side::Black
        }
    }

    /// Every playable coordinate, in reading order.
    pub fn coords(&self) -> impl Iterator<Item = Coord> + '_ {
        self.grid
            .iter()
            .flatten()
            .filter(|t| t.is_playable())
            .map(|t| t.coord)
    }

    /// Coordinates of every piece belonging to `side`, in reading order.
    pub fn pieces_of(&self, side: Side) -> Vec<Coord> {
        self.grid
            .iter()
            .flatten()
            .filter(|t| t.piece.as_ref().map(|p| p.side == side).unwrap_or(false))
            .map(|t| t.coord)
            .collect()
    }

    /// The first royal piece of `side`, if it has one on the board.
    pub fn royal_of(&self, side: Side) -> Option<Coord> {
        self.grid
            .iter()
            .flatten()
            .find(|t| {
                t.piece
                    .as_ref()
                    .map(|p| p.royal && p.side == side)
                    .unwrap_or(false)
            })
            .map(|t| t.coord)
    }

    // --- Display geometry ---

    pub fn set_geometry(&mut self, anchor: (i32, i32), tile_size: (i32, i32)) {
        self.anchor = anchor;
        self.tile_size = tile_size;
    }

    /// Maps a screen point to the board square under it, if any.
    pub fn point_to_coord(&self, point: (i32, i32)) -> Option<Coord> {
        let (px, py) = point;
        let (ax, ay) = self.anchor;
        let (tw, th) = self.tile_size;
        if px < ax || py < ay {
            return None;
        }
        let coord = Coord::new((px - ax) / tw, (py - ay) / th);
        self.get(coord).map(|t| t.coord)
    }

    /// The screen rectangle covering a board square.
    pub fn coord_to_rect(&self, coord: Coord) -> Option<Rect> {
        self.get(coord)?;
        let (ax, ay) = self.anchor;
        let (tw, th) = self.tile_size;
        Some(Rect {
            x: ax + coord.x * tw,
            y: ay + coord.y * th,
            w: tw,
            h: th,
        })
    }
}

// Display trait for printing the board in the terminal shell.
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "   +")?;
        for _ in 0..self.width {
            write!(f, "---")?;
        }
        writeln!(f, "+")?;
        for (y, row) in self.grid.iter().enumerate() {
            // Rank numbers count up from the bottom, like printed diagrams.
            write!(f, "{:>2} |", self.height - y as i32)?;
            for tile in row {
                match (tile.kind, &tile.piece) {
                    (TileKind::Void, _) => write!(f, "   ")?,
                    (_, Some(piece)) => write!(f, " {} ", piece.code)?,
                    (_, None) => write!(f, " . ")?,
                }
            }
            writeln!(f, "|")?;
        }
        write!(f, "   +")?;
        for _ in 0..self.width {
            write!(f, "---")?;
        }
        writeln!(f, "+")?;
        write!(f, "    ")?;
        for x in 0..self.width {
            write!(f, " {} ", (b'a' + x as u8) as char)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variants::standard;

    #[test]
    fn construct_standard_board() {
        let board = Board::construct(8, 8, &["8"; 8]).unwrap();
        assert_eq!(board.width, 8);
        assert_eq!(board.height, 8);
        assert_eq!(board.coords().count(), 64);
        // a8 is a light square; shades checkerboard.
        assert_eq!(board.get(Coord::new(0, 0)).unwrap().shade, Some(Shade::Light));
        assert_eq!(board.get(Coord::new(1, 0)).unwrap().shade, Some(Shade::Dark));
        assert_eq!(board.get(Coord::new(0, 1)).unwrap().shade, Some(Shade::Dark));
    }

    #[test]
    fn construct_void_runs() {
        // 'b' is a run of two void squares.
        let board = Board::construct(2, 8, &["3b3", "8"]).unwrap();
        assert!(!board.get(Coord::new(3, 0)).unwrap().is_playable());
        assert!(!board.get(Coord::new(4, 0)).unwrap().is_playable());
        assert!(board.get(Coord::new(5, 0)).unwrap().is_playable());
        assert_eq!(board.coords().count(), 14);
    }

    #[test]
    fn construct_rejects_bad_input() {
        assert!(matches!(
            Board::construct(8, 8, &["8"; 7]),
            Err(BoardError::RowCountMismatch { .. })
        ));
        assert!(matches!(
            Board::construct(1, 8, &["7"]),
            Err(BoardError::RowLengthMismatch { .. })
        ));
        assert!(matches!(
            Board::construct(1, 8, &["4X4"]),
            Err(BoardError::InvalidLayoutCode('X'))
        ));
    }

    #[test]
    fn populate_standard_openings() {
        let mut board = Board::construct(8, 8, &["8"; 8]).unwrap();
        board.populate(standard::INIT_POS, standard::piece).unwrap();
        assert_eq!(board.piece_at(Coord::new(4, 7)).unwrap().code, 'K');
        assert_eq!(board.piece_at(Coord::new(4, 0)).unwrap().code, 'k');
        assert_eq!(board.piece_at(Coord::new(0, 6)).unwrap().code, 'P');
        assert!(board.piece_at(Coord::new(3, 3)).is_none());
        assert_eq!(board.pieces_of(Side::White).len(), 16);
        assert_eq!(board.pieces_of(Side::Black).len(), 16);
    }

    #[test]
    fn populate_rejects_unknown_code() {
        let mut board = Board::construct(8, 8, &["8"; 8]).unwrap();
        let err = board.populate(&["$7", "8", "8", "8", "8", "8", "8", "8"], standard::piece);
        assert!(matches!(err, Err(BoardError::UnknownPieceCode('$'))));
    }

    #[test]
    fn get_out_of_range_is_none() {
        let board = Board::construct(8, 8, &["8"; 8]).unwrap();
        assert!(board.get(Coord::new(-1, 0)).is_none());
        assert!(board.get(Coord::new(8, 0)).is_none());
        assert!(board.get(Coord::new(0, 8)).is_none());
    }

    #[test]
    fn turn_parity() {
        let mut board = Board::construct(8, 8, &["8"; 8]).unwrap();
        assert_eq!(board.turn(), Side::White);
        board.progress_turn();
        assert_eq!(board.turn(), Side::Black);
        board.progress_turn();
        assert_eq!(board.turn(), Side::White);
    }

    #[test]
    fn scrub_clears_flags() {
        let mut board = Board::construct(8, 8, &["8"; 8]).unwrap();
        {
            let tile = board.get_mut(Coord::new(3, 3)).unwrap();
            tile.move_target = true;
            tile.capture_target = true;
            tile.locked = true;
        }
        board.scrub();
        let tile = board.get(Coord::new(3, 3)).unwrap();
        assert!(!tile.move_target && !tile.capture_target && !tile.locked);
    }

    #[test]
    fn geometry_round_trip() {
        let mut board = Board::construct(8, 8, &["8"; 8]).unwrap();
        board.set_geometry((100, 50), (64, 64));
        let rect = board.coord_to_rect(Coord::new(2, 3)).unwrap();
        assert_eq!(rect, Rect { x: 228, y: 242, w: 64, h: 64 });
        assert_eq!(
            board.point_to_coord((rect.x + 10, rect.y + 10)),
            Some(Coord::new(2, 3))
        );
        assert_eq!(board.point_to_coord((0, 0)), None);
    }
}
