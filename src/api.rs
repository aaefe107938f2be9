//! Serialized-position operations for external collaborators (UI or HTTP
//! layer). Every call takes a FEN string in and hands a FEN string back;
//! nothing here holds state between calls.

use crate::board::{square_from_name, square_name, Piece, Position};
use crate::errors::EngineError;
use crate::game::{self, GameStatus};
use crate::movegen::MoveGenerator;
use crate::policy::{MovePolicy, RandomPolicy};

/// Result of a committed move: the new position and the move that was played.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    pub fen: String,
    pub notation: String,
}

fn parse_square(name: &str) -> Result<u8, EngineError> {
    square_from_name(name)
        .ok_or_else(|| EngineError::IllegalMove(format!("invalid square '{}'", name)))
}

fn parse_promotion(c: char) -> Result<Piece, EngineError> {
    match c.to_ascii_lowercase() {
        'q' => Ok(Piece::Queen),
        'r' => Ok(Piece::Rook),
        'b' => Ok(Piece::Bishop),
        'n' => Ok(Piece::Knight),
        _ => Err(EngineError::IllegalMove(format!(
            "invalid promotion piece '{}'",
            c
        ))),
    }
}

/// Destination squares a piece on `square` can legally reach.
pub fn legal_destinations(fen: &str, square: &str) -> Result<Vec<String>, EngineError> {
    let position = Position::from_fen(fen)?;
    let origin = parse_square(square)?;
    let mut destinations = Vec::new();
    for mv in MoveGenerator::new().legal_moves(&position, Some(origin)) {
        let name = square_name(mv.to);
        if !destinations.contains(&name) {
            destinations.push(name);
        }
    }
    Ok(destinations)
}

/// Validate and apply a move given in square names, e.g. ("e2", "e4").
pub fn apply_move(
    fen: &str,
    from: &str,
    to: &str,
    promotion: Option<char>,
) -> Result<MoveOutcome, EngineError> {
    let position = Position::from_fen(fen)?;
    let promotion = promotion.map(parse_promotion).transpose()?;
    let (next, applied) = game::apply(&position, parse_square(from)?, parse_square(to)?, promotion)?;
    Ok(MoveOutcome {
        fen: next.to_fen(),
        notation: applied.notation(),
    })
}

/// Pick a move with the given policy and apply it.
pub fn policy_move(fen: &str, policy: &mut dyn MovePolicy) -> Result<MoveOutcome, EngineError> {
    let position = Position::from_fen(fen)?;
    if game::status(&position).game_over() {
        return Err(EngineError::GameOver);
    }
    let moves = MoveGenerator::new().legal_moves(&position, None);
    let chosen = policy.choose(&moves)?;
    Ok(MoveOutcome {
        fen: position.make(&chosen).to_fen(),
        notation: chosen.notation(),
    })
}

/// The automated opponent: uniform-random choice over the legal moves.
pub fn random_move(fen: &str) -> Result<MoveOutcome, EngineError> {
    policy_move(fen, &mut RandomPolicy::new())
}

pub fn game_status(fen: &str) -> Result<GameStatus, EngineError> {
    Ok(game::status(&Position::from_fen(fen)?))
}
