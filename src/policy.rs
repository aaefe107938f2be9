use rand::seq::SliceRandom;

use crate::errors::EngineError;
use crate::movegen::Move;

/// Strategy that picks one move out of a non-empty legal-move set. Callers
/// must check the set is non-empty first; an empty slice is a programming
/// error surfaced as `NoLegalMoves`.
///
/// Implementations slot in behind the orchestrator without changing caller
/// code, so a search-based policy can replace the random one later.
pub trait MovePolicy {
    fn choose(&mut self, moves: &[Move]) -> Result<Move, EngineError>;
}

/// Uniform-random selection, the automated opponent's only shipped policy.
pub struct RandomPolicy;

impl RandomPolicy {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RandomPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl MovePolicy for RandomPolicy {
    fn choose(&mut self, moves: &[Move]) -> Result<Move, EngineError> {
        moves
            .choose(&mut rand::thread_rng())
            .copied()
            .ok_or(EngineError::NoLegalMoves)
    }
}
