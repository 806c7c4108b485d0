// src/variants/fischer_random.rs
//
// Fischer random (chess960): pawns start as usual, the back ranks are
// shuffled. The arrangement is decoded from a number in 0..960 so that
// the bishops land on opposite shades and the king stands between the
// rooks; Black mirrors White.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::board::{Board, BoardError, Coord};
use crate::game::GameState;
use crate::variant::Variant;
use crate::variants::standard;

const INIT_POS: &[&str] = &[
    "8", "pppppppp", "8", "8", "8", "8", "PPPPPPPP", "8",
];

const KNIGHT_PAIRS: [(usize, usize); 10] = [
    (0, 1), (0, 2), (0, 3), (0, 4), (1, 2),
    (1, 3), (1, 4), (2, 3), (2, 4), (3, 4),
];

fn place_nth_free(codes: &mut [char; 8], nth: usize, code: char) {
    let mut free = 0;
    for slot in codes.iter_mut() {
        if *slot == '.' {
            if free == nth {
                *slot = code;
                return;
            }
            free += 1;
        }
    }
}

/// Decodes arrangement `n` (0..960) into a white back rank, left to right.
fn back_rank_codes(mut n: u32) -> [char; 8] {
    let mut codes = ['.'; 8];
    // One bishop per shade. On the white back rank the odd files are the
    // light squares.
    let light = [1, 3, 5, 7];
    codes[light[(n % 4) as usize]] = 'B';
    n /= 4;
    let dark = [0, 2, 4, 6];
    codes[dark[(n % 4) as usize]] = 'B';
    n /= 4;
    place_nth_free(&mut codes, (n % 6) as usize, 'Q');
    n /= 6;
    // Both knight slots index the same five free squares, so the higher
    // one is filled first.
    let (a, b) = KNIGHT_PAIRS[n as usize];
    place_nth_free(&mut codes, b, 'N');
    place_nth_free(&mut codes, a, 'N');
    for code in ['R', 'K', 'R'] {
        place_nth_free(&mut codes, 0, code);
    }
    codes
}

/// Deals both back ranks from `seed`. Deterministic per seed, so a seed
/// doubles as a shareable game id.
pub fn place_back_ranks(board: &mut Board, seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    let codes = back_rank_codes(rng.random_range(0..960));
    let bottom = board.height - 1;
    for (x, code) in codes.iter().enumerate() {
        let x = x as i32;
        board.take_piece(Coord::new(x, bottom));
        board.take_piece(Coord::new(x, 0));
        if let Some(piece) = standard::piece(*code) {
            board.place_piece(Coord::new(x, bottom), piece);
        }
        if let Some(piece) = standard::piece(code.to_ascii_lowercase()) {
            board.place_piece(Coord::new(x, 0), piece);
        }
    }
}

fn board() -> Result<Board, BoardError> {
    let mut board = Board::construct(8, 8, standard::LAYOUT)?;
    board.populate(INIT_POS, standard::piece)?;
    Ok(board)
}

fn shuffle(state: &mut GameState) {
    place_back_ranks(&mut state.board, rand::random());
}

pub static FISCHER_RANDOM: Variant = Variant {
    name: "fischer",
    title: "Fischer Random",
    blurb: "Standard chess from one of 960 shuffled starting arrays.",
    board,
    pieces: standard::piece,
    game_start: Some(shuffle),
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
    use crate::board::Shade;

    fn dealt(seed: u64) -> Board {
        let mut board = board().unwrap();
        place_back_ranks(&mut board, seed);
        board
    }

    fn white_rank(board: &Board) -> Vec<char> {
        (0..8)
            .map(|x| board.piece_at(Coord::new(x, 7)).unwrap().code)
            .collect()
    }

    #[test]
    fn same_seed_same_deal() {
        assert_eq!(white_rank(&dealt(42)), white_rank(&dealt(42)));
        let first = white_rank(&dealt(0));
        assert!((1..20).any(|seed| white_rank(&dealt(seed)) != first));
    }

    #[test]
    fn every_deal_is_legal() {
        for seed in 0..100 {
            let board = dealt(seed);
            let rank = white_rank(&board);
            let files = |code: char| -> Vec<i32> {
                rank.iter()
                    .enumerate()
                    .filter(|(_, &c)| c == code)
                    .map(|(x, _)| x as i32)
                    .collect()
            };
            let bishops = files('B');
            let shade = |x: i32| board.get(Coord::new(x, 7)).unwrap().shade;
            assert_eq!(bishops.len(), 2);
            assert_ne!(shade(bishops[0]), shade(bishops[1]));
            assert!(shade(bishops[0]) == Some(Shade::Light) || shade(bishops[1]) == Some(Shade::Light));
            let rooks = files('R');
            let king = files('K')[0];
            assert!(rooks[0] < king && king < rooks[1]);
        }
    }

    #[test]
    fn black_mirrors_white() {
        let board = dealt(9);
        for x in 0..8 {
            let white = board.piece_at(Coord::new(x, 7)).unwrap().code;
            let black = board.piece_at(Coord::new(x, 0)).unwrap().code;
            assert_eq!(black, white.to_ascii_lowercase());
        }
    }

    #[test]
    fn shuffled_game_log_starts_after_the_deal() {
        let state = GameState::new(&FISCHER_RANDOM).unwrap();
        assert_eq!(state.log.cursor(), 0);
        assert!(state.board.royal_of(crate::piece::Side::White).is_some());
    }
}
