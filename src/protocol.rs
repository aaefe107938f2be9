//! Line-oriented front-end over the collaborator API, driven from stdin the
//! way a UCI engine is. The HTTP layer maps onto the same commands:
//!
//!   status <fen>
//!   moves  <fen> <square>
//!   move   <fen> <from> <to> [promotion]
//!   random <fen>
//!   quit
//!
//! A FEN is always exactly six whitespace-separated fields, so arguments
//! after it are unambiguous. Application-level failures come back as
//! `error ...` lines; the loop itself never falls over on bad input.

use anyhow::Result;
use std::io::{self, BufRead, Write};

use crate::api;
use crate::board::Color;
use crate::game::GameState;

const FEN_FIELDS: usize = 6;

pub fn run() -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut line = String::new();
    let mut reader = stdin.lock();

    while reader.read_line(&mut line)? > 0 {
        let command = line.trim();
        if command == "quit" {
            break;
        }
        if !command.is_empty() {
            writeln!(stdout, "{}", handle_command(command))?;
            stdout.flush()?;
        }
        line.clear();
    }
    Ok(())
}

pub fn handle_command(command: &str) -> String {
    let parts: Vec<&str> = command.split_whitespace().collect();
    let (verb, rest) = match parts.split_first() {
        Some((verb, rest)) => (*verb, rest),
        None => return "error empty command".to_string(),
    };

    if rest.len() < FEN_FIELDS {
        return format!("error {} needs a position", verb);
    }
    let fen = rest[..FEN_FIELDS].join(" ");
    let args = &rest[FEN_FIELDS..];

    match (verb, args) {
        ("status", []) => match api::game_status(&fen) {
            Ok(status) => {
                let state = match status.state() {
                    GameState::Ongoing => "ongoing",
                    GameState::Check => "check",
                    GameState::Checkmate => "checkmate",
                    GameState::Stalemate => "stalemate",
                    GameState::Draw => "draw",
                };
                let side = match status.side_to_move {
                    Color::White => 'w',
                    Color::Black => 'b',
                };
                format!("status {} {}", state, side)
            }
            Err(e) => format!("error {}", e),
        },
        ("moves", [square]) => match api::legal_destinations(&fen, square) {
            Ok(destinations) if destinations.is_empty() => "moves -".to_string(),
            Ok(destinations) => format!("moves {}", destinations.join(" ")),
            Err(e) => format!("error {}", e),
        },
        ("move", [from, to]) => answer_move(api::apply_move(&fen, from, to, None)),
        ("move", [from, to, promotion]) => {
            let piece = promotion.chars().next().filter(|_| promotion.len() == 1);
            match piece {
                Some(c) => answer_move(api::apply_move(&fen, from, to, Some(c))),
                None => format!("error invalid promotion piece '{}'", promotion),
            }
        }
        ("random", []) => answer_move(api::random_move(&fen)),
        _ => format!("error unknown command '{}'", verb),
    }
}

fn answer_move(result: Result<api::MoveOutcome, crate::errors::EngineError>) -> String {
    match result {
        Ok(outcome) => format!("ok {} {}", outcome.notation, outcome.fen),
        Err(e) => format!("error {}", e),
    }
}
