// src/main.rs

mod board;
mod game;
mod log;
mod movement;
mod notation;
mod piece;
mod rules;
mod variant;
mod variants;

use std::error::Error;
use std::fmt;
use std::io::{self, Write};
use std::time::Duration;

use crate::board::Coord;
use crate::game::{Committed, GameState, SaveLoadError};
use crate::notation::{algebraic_to_coord, coord_to_algebraic};
use crate::piece::Side;
use crate::rules::{DrawReason, Verdict, WinReason};
use crate::variant::Variant;

// --- Constants ---
const INITIAL_TIME_SECONDS: u64 = 15 * 60; // 15 minutes per side
const DEFAULT_RECORD_FILENAME: &str = "chess_plus_record.json";

// --- Input Parsing ---

#[derive(Debug)]
enum UserInput {
    /// A full move, "e2e4" style.
    Move(Coord, Coord),
    /// A single square, "e2": selects a piece (or commits to a previously
    /// shown destination).
    Select(Coord),
    Command(Command),
}

#[derive(Debug)]
enum Command {
    Undo,
    Redo,
    Export,
    Import(String),
    Resign,
    Draw,
    Almanac,
    SaveGame(String),
    Help,
    Quit,
}

#[derive(Debug)]
enum CommandError {
    UnknownInput(String),
    BadSquare(String),
    MissingArgument(&'static str),
    SaveLoad(SaveLoadError),
    Io(io::Error),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::UnknownInput(s) => {
                write!(f, "Unrecognized input: '{}'. Type 'help' for commands.", s)
            }
            CommandError::BadSquare(s) => write!(f, "Not a board square: '{}'", s),
            CommandError::MissingArgument(cmd) => {
                write!(f, "Missing argument for command: '{}'", cmd)
            }
            CommandError::SaveLoad(e) => write!(f, "Save error: {}", e),
            CommandError::Io(e) => write!(f, "Input/Output error: {}", e),
        }
    }
}

impl Error for CommandError {}

impl From<SaveLoadError> for CommandError {
    fn from(e: SaveLoadError) -> Self {
        CommandError::SaveLoad(e)
    }
}
impl From<io::Error> for CommandError {
    fn from(e: io::Error) -> Self {
        CommandError::Io(e)
    }
}

/// Parses one input line against the live board's geometry.
fn parse_user_input(state: &GameState, input: &str) -> Result<UserInput, CommandError> {
    let trimmed = input.trim();
    let mut parts = trimmed.splitn(2, char::is_whitespace);
    let word = parts.next().unwrap_or("").to_lowercase();
    let argument = parts.next().unwrap_or("").trim();

    match word.as_str() {
        "undo" => return Ok(UserInput::Command(Command::Undo)),
        "redo" => return Ok(UserInput::Command(Command::Redo)),
        "export" => return Ok(UserInput::Command(Command::Export)),
        "import" => {
            if argument.is_empty() {
                return Err(CommandError::MissingArgument("import"));
            }
            return Ok(UserInput::Command(Command::Import(argument.to_string())));
        }
        "resign" => return Ok(UserInput::Command(Command::Resign)),
        "draw" => return Ok(UserInput::Command(Command::Draw)),
        "almanac" => return Ok(UserInput::Command(Command::Almanac)),
        "save" => {
            let filename = if argument.is_empty() {
                DEFAULT_RECORD_FILENAME
            } else {
                argument
            };
            return Ok(UserInput::Command(Command::SaveGame(filename.to_string())));
        }
        "help" | "?" => return Ok(UserInput::Command(Command::Help)),
        "quit" | "exit" => return Ok(UserInput::Command(Command::Quit)),
        _ => {}
    }

    // "e2e4" is a move, "e2" a selection. Squares are a file letter plus a
    // rank number, so the string splits where the second letter starts.
    let squares: Vec<&str> = split_squares(trimmed);
    match squares.as_slice() {
        [one] => {
            let c = algebraic_to_coord(&state.board, one)
                .ok_or_else(|| CommandError::BadSquare(one.to_string()))?;
            Ok(UserInput::Select(c))
        }
        [from, to] => {
            let f = algebraic_to_coord(&state.board, from)
                .ok_or_else(|| CommandError::BadSquare(from.to_string()))?;
            let t = algebraic_to_coord(&state.board, to)
                .ok_or_else(|| CommandError::BadSquare(to.to_string()))?;
            Ok(UserInput::Move(f, t))
        }
        _ => Err(CommandError::UnknownInput(trimmed.to_string())),
    }
}

fn split_squares(s: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    for (i, c) in s.char_indices() {
        if c.is_ascii_lowercase() && i > start {
            out.push(&s[start..i]);
            start = i;
        }
    }
    if start < s.len() {
        out.push(&s[start..]);
    }
    out
}

// --- Display helpers ---

fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    let display_millis = duration.as_millis() % 1000;
    format!("{:02}:{:02}.{:03}", minutes, seconds, display_millis)
}

fn print_game(state: &GameState) {
    for side in [Side::White, Side::Black] {
        print!("Captured by {}: ", side);
        let mut pocket = state.board.pockets[side.index()].clone();
        pocket.sort_by_key(|p| p.value);
        for piece in pocket {
            print!("{} ", piece);
        }
        println!();
    }
    println!("---------------------");
    if let Some(clock) = &state.clock {
        println!("Black Time: {}", format_duration(clock.remaining(Side::Black)));
        println!("White Time: {}", format_duration(clock.remaining(Side::White)));
        println!("---------------------");
    }
    print!("{}", state.board);
    println!("Turn: {}", state.board.turn());
    if let Some(last) = state.events.last() {
        println!(
            "Last move: {} {}{}{}",
            last.player,
            last.from,
            last.to,
            if last.is_check { " +" } else { "" }
        );
    }
}

fn describe_verdict(verdict: &Verdict) -> String {
    match verdict {
        Verdict::Ongoing => "Game in progress.".to_string(),
        Verdict::Win(side, WinReason::Checkmate) => format!("{} wins by checkmate.", side),
        Verdict::Win(side, WinReason::Timeout) => format!("{} wins on time.", side),
        Verdict::Win(side, WinReason::Resignation) => format!("{} wins by resignation.", side),
        Verdict::Win(side, WinReason::Elimination) => format!("{} wins by elimination.", side),
        Verdict::Draw(DrawReason::Stalemate) => "Draw by stalemate.".to_string(),
        Verdict::Draw(DrawReason::Agreement) => "Draw by agreement.".to_string(),
    }
}

fn print_help() {
    println!("\nAvailable Commands:");
    println!("  <square>       Select a piece and list its destinations (e.g. e2).");
    println!("  <move>         Play a move (e.g. e2e4). Promotion prompts when needed.");
    println!("  undo / redo    Step backwards or forwards through the move log.");
    println!("  export         Print the current position as a notation string.");
    println!("  import <pos>   Replace the position with a notation string.");
    println!("  draw           End the game as a draw by agreement.");
    println!("  resign         Forfeit the game.");
    println!("  almanac        Describe every playable variant.");
    println!("  save [file]    Save the game record (default: {}).", DEFAULT_RECORD_FILENAME);
    println!("  help           Show this help message.");
    println!("  quit / exit    Leave the game (saves the record first).");
    println!();
}

fn print_almanac() {
    println!("\nThe Variant Almanac:");
    for variant in variant::REGISTRY.iter() {
        println!("  {:<16} {}", variant.name, variant.blurb);
    }
    println!();
}

// --- Variant menu ---

fn choose_variant() -> Result<Option<&'static Variant>, io::Error> {
    println!("Pick a variant:");
    for (i, v) in variant::REGISTRY.iter().enumerate() {
        println!("  {}. {} - {}", i + 1, v.title, v.blurb);
    }
    loop {
        print!("Variant (number or name): ");
        io::stdout().flush()?;
        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let choice = line.trim();
        if choice.is_empty() {
            continue;
        }
        if let Ok(n) = choice.parse::<usize>() {
            if n >= 1 && n <= variant::REGISTRY.len() {
                return Ok(Some(variant::REGISTRY[n - 1]));
            }
        }
        if let Some(v) = variant::find(choice) {
            return Ok(Some(v));
        }
        println!("No variant called '{}'. Try again or see the list above.", choice);
    }
}

// --- Promotion prompt ---

/// Loops until the pending promotion resolves. Returns false on EOF.
fn prompt_promotion(state: &mut GameState) -> Result<bool, io::Error> {
    while state.promotion_pending() {
        let menu = match state.promotion_options() {
            Some(options) => options.iter().map(char::to_string).collect::<Vec<_>>().join(", "),
            None => "q=Queen, r=Rook, b=Bishop, n=Knight".to_string(),
        };
        print!("Promote to? ({}): ", menu);
        io::stdout().flush()?;
        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            println!("\nEnd of input during promotion.");
            return Ok(false);
        }
        match line.trim().to_lowercase().chars().next() {
            Some(kind) => {
                if !state.resolve_promotion(kind) {
                    println!("Invalid choice. Please enter one of: {}.", menu);
                }
            }
            None => println!("Invalid choice. Please enter one of: {}.", menu),
        }
    }
    Ok(true)
}

// --- Move handling ---

fn try_commit(state: &mut GameState, to: Coord) -> Result<(), io::Error> {
    match state.commit(to) {
        Committed::Rejected => {
            println!(
                "That piece cannot reach {}.",
                coord_to_algebraic(&state.board, to)
            );
        }
        Committed::Moved => {}
        Committed::PromotionPending => {
            prompt_promotion(state)?;
        }
    }
    Ok(())
}

fn show_destinations(state: &GameState, at: Coord) {
    let dests = &state.destinations;
    if dests.is_empty() {
        println!(
            "{} has no legal destinations right now.",
            coord_to_algebraic(&state.board, at)
        );
        return;
    }
    if !dests.moves.is_empty() {
        let list: Vec<String> = dests
            .moves
            .iter()
            .map(|&c| coord_to_algebraic(&state.board, c))
            .collect();
        println!("Moves: {}", list.join(" "));
    }
    if !dests.captures.is_empty() {
        let list: Vec<String> = dests
            .captures
            .iter()
            .map(|&c| coord_to_algebraic(&state.board, c))
            .collect();
        println!("Captures: {}", list.join(" "));
    }
}

// --- Main Game Loop ---

fn main() -> Result<(), Box<dyn Error>> {
    println!("==============================");
    println!("|        chess_plus          |");
    println!("==============================");

    let variant = match choose_variant()? {
        Some(v) => v,
        None => {
            println!("\nNo variant chosen. Bye.");
            return Ok(());
        }
    };

    let mut state =
        GameState::new(variant)?.with_clock(Duration::from_secs(INITIAL_TIME_SECONDS));
    println!("\nStarting {}.", variant.title);
    print_help();

    'game_loop: loop {
        // The clock can trip between inputs.
        state.evaluate();
        if state.verdict != Verdict::Ongoing {
            println!("------------------------------------------");
            print_game(&state);
            println!("\n=== GAME OVER: {} ===", describe_verdict(&state.verdict));
            println!("Saving game record to '{}'...", DEFAULT_RECORD_FILENAME);
            match state.save_record(DEFAULT_RECORD_FILENAME) {
                Ok(()) => println!("Record saved."),
                Err(e) => eprintln!("Error: failed to save the record: {}", e),
            }
            break 'game_loop;
        }

        println!("------------------------------------------");
        print_game(&state);
        print!("\n{}'s turn. Enter a square, a move, or a command: ", state.board.turn());
        io::stdout().flush()?;

        let mut line = String::new();
        match io::stdin().read_line(&mut line) {
            Ok(0) => {
                println!("\nEnd of input. Saving and quitting.");
                if let Err(e) = state.save_record(DEFAULT_RECORD_FILENAME) {
                    eprintln!("Warning: failed to save the record: {}", e);
                }
                break 'game_loop;
            }
            Ok(_) => {}
            Err(e) => {
                eprintln!("Error reading input: {}. Try again or use 'quit'.", e);
                continue 'game_loop;
            }
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue 'game_loop;
        }

        match parse_user_input(&state, trimmed) {
            Ok(UserInput::Move(from, to)) => {
                if state.select(from).is_none() {
                    println!(
                        "Nothing selectable on {}.",
                        coord_to_algebraic(&state.board, from)
                    );
                    continue 'game_loop;
                }
                try_commit(&mut state, to)?;
            }
            Ok(UserInput::Select(at)) => {
                // A bare square commits when it names an offered destination
                // of the current selection, otherwise it selects.
                if state.selected.is_some() && state.destinations.contains(at) {
                    try_commit(&mut state, at)?;
                } else if state.select(at).is_some() {
                    show_destinations(&state, at);
                } else {
                    println!(
                        "Nothing selectable on {}.",
                        coord_to_algebraic(&state.board, at)
                    );
                }
            }
            Ok(UserInput::Command(command)) => match command {
                Command::Undo => {
                    if !state.undo() {
                        println!("Nothing to undo.");
                    }
                }
                Command::Redo => {
                    if !state.redo() {
                        println!("Nothing to redo.");
                    }
                }
                Command::Export => println!("{}", state.export_position()),
                Command::Import(text) => match state.import_position(&text) {
                    Ok(()) => println!("Position imported."),
                    Err(e) => println!("Import rejected: {}", e),
                },
                Command::Resign => state.resign(),
                Command::Draw => state.agree_draw(),
                Command::Almanac => print_almanac(),
                Command::SaveGame(filename) => match state.save_record(&filename) {
                    Ok(()) => println!("Game record saved to '{}'.", filename),
                    Err(e) => println!("Error saving game record: {}", e),
                },
                Command::Help => print_help(),
                Command::Quit => {
                    println!("Saving game record to '{}'...", DEFAULT_RECORD_FILENAME);
                    if let Err(e) = state.save_record(DEFAULT_RECORD_FILENAME) {
                        eprintln!("Warning: failed to save the record: {}", e);
                    }
                    println!("Exiting game.");
                    break 'game_loop;
                }
            },
            Err(e) => println!("Input Error: {}", e),
        }
    }

    println!("\nGame session finished.");
    Ok(())
}
