// src/log.rs
//
// Undo/redo is snapshot-based: after every completed move the game appends a
// full position snapshot. Snapshots store piece codes and per-piece flags,
// never behaviour pointers; restoration rebuilds every piece through the
// variant's factory table.

use serde::{Deserialize, Serialize};

use crate::board::{Aux, Board, BoardError, Coord};
use crate::piece::Piece;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PieceSnap {
    pub code: char,
    pub moved: bool,
    pub en_passantable: bool,
}

impl PieceSnap {
    fn of(piece: &Piece) -> Self {
        PieceSnap {
            code: piece.code,
            moved: piece.moved,
            en_passantable: piece.en_passantable,
        }
    }

    fn rebuild(&self, factory: fn(char) -> Option<Piece>) -> Result<Piece, BoardError> {
        let mut piece = factory(self.code).ok_or(BoardError::UnknownPieceCode(self.code))?;
        piece.moved = self.moved;
        piece.en_passantable = self.en_passantable;
        Ok(piece)
    }
}

/// A full restorable position: occupied squares, pockets, turn counters and
/// the variant scratch state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    tiles: Vec<(Coord, PieceSnap)>,
    pockets: [Vec<PieceSnap>; 2],
    turn_number: u32,
    halfmove_clock: u32,
    aux: Aux,
}

impl Snapshot {
    pub fn capture(board: &Board) -> Snapshot {
        let tiles = board
            .coords()
            .filter_map(|c| board.piece_at(c).map(|p| (c, PieceSnap::of(p))))
            .collect();
        let pockets = [
            board.pockets[0].iter().map(PieceSnap::of).collect(),
            board.pockets[1].iter().map(PieceSnap::of).collect(),
        ];
        Snapshot {
            tiles,
            pockets,
            turn_number: board.turn_number,
            halfmove_clock: board.halfmove_clock,
            aux: board.aux.clone(),
        }
    }

    /// Restores the position onto `board`. Every piece is resolved through
    /// the factory before anything is touched, so a snapshot with an
    /// unknown code leaves the board as it was.
    pub fn restore(
        &self,
        board: &mut Board,
        factory: fn(char) -> Option<Piece>,
    ) -> Result<(), BoardError> {
        let mut placed = Vec::with_capacity(self.tiles.len());
        for (coord, snap) in &self.tiles {
            placed.push((*coord, snap.rebuild(factory)?));
        }
        let mut pockets: [Vec<Piece>; 2] = [Vec::new(), Vec::new()];
        for (i, pocket) in self.pockets.iter().enumerate() {
            for snap in pocket {
                pockets[i].push(snap.rebuild(factory)?);
            }
        }

        let coords: Vec<Coord> = board.coords().collect();
        for c in coords {
            board.take_piece(c);
        }
        for (coord, piece) in placed {
            board.place_piece(coord, piece);
        }
        board.pockets = pockets;
        board.turn_number = self.turn_number;
        board.halfmove_clock = self.halfmove_clock;
        board.aux = self.aux.clone();
        board.scrub();
        Ok(())
    }
}

/// The move log: an append-only snapshot list with a cursor. Entry 0 is the
/// starting position. Recording after an undo discards the abandoned
/// branch.
#[derive(Debug, Serialize, Deserialize)]
pub struct MoveLog {
    entries: Vec<Snapshot>,
    cursor: usize,
}

impl MoveLog {
    pub fn new(initial: Snapshot) -> Self {
        MoveLog {
            entries: vec![initial],
            cursor: 0,
        }
    }

    pub fn record(&mut self, snapshot: Snapshot) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push(snapshot);
        self.cursor = self.entries.len() - 1;
    }

    pub fn undo(&mut self) -> Option<&Snapshot> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        Some(&self.entries[self.cursor])
    }

    pub fn redo(&mut self) -> Option<&Snapshot> {
        if self.cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        Some(&self.entries[self.cursor])
    }

    /// Completed moves up to the cursor.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
