use thiserror::Error;

/// Every failure the engine can report to a caller. The engine never logs or
/// panics; each variant carries enough context to render a message upstream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The serialized position does not describe a structurally valid board.
    #[error("malformed position: {0}")]
    MalformedPosition(String),
    /// The proposed move is not in the legal move set for the position.
    #[error("illegal move: {0}")]
    IllegalMove(String),
    /// A move was attempted after checkmate, stalemate or a draw.
    #[error("the game is over")]
    GameOver,
    /// A selection policy was invoked on an empty move set. Callers must
    /// check `legal_moves` is non-empty first.
    #[error("no legal moves to choose from")]
    NoLegalMoves,
}
