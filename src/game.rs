use crate::board::{Color, Piece, Position};
use crate::errors::EngineError;
use crate::movegen::{Move, MoveGenerator};

/// The five states a game can be in after any move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Ongoing,
    Check,
    Checkmate,
    Stalemate,
    Draw,
}

/// Derived view of a position, recomputed on demand and never cached across
/// mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameStatus {
    pub in_check: bool,
    pub checkmate: bool,
    pub stalemate: bool,
    pub draw: bool,
    pub side_to_move: Color,
}

impl GameStatus {
    pub fn game_over(&self) -> bool {
        self.checkmate || self.stalemate || self.draw
    }

    pub fn state(&self) -> GameState {
        if self.checkmate {
            GameState::Checkmate
        } else if self.stalemate {
            GameState::Stalemate
        } else if self.draw {
            GameState::Draw
        } else if self.in_check {
            GameState::Check
        } else {
            GameState::Ongoing
        }
    }
}

/// Compute the status of a position. Checkmate and stalemate take precedence
/// over the material/clock draw conditions.
pub fn status(position: &Position) -> GameStatus {
    let generator = MoveGenerator::new();
    let in_check = generator.in_check(position, position.side_to_move);
    let has_moves = !generator.legal_moves(position, None).is_empty();
    let checkmate = in_check && !has_moves;
    let stalemate = !in_check && !has_moves;
    let draw = !checkmate
        && !stalemate
        && (is_insufficient_material(position) || position.halfmove_clock >= 100);
    GameStatus {
        in_check,
        checkmate,
        stalemate,
        draw,
        side_to_move: position.side_to_move,
    }
}

/// Validate and apply a move, returning the resulting position. The proposal
/// must match a generated legal move exactly on origin, destination and
/// promotion piece; the canonical generated move is the one applied, so
/// special-move bookkeeping never depends on caller-supplied flags.
pub fn apply_move(position: &Position, mv: &Move) -> Result<Position, EngineError> {
    apply(position, mv.from, mv.to, mv.promotion).map(|(next, _)| next)
}

/// Like `apply_move`, but addressed by squares; also returns the canonical
/// move that was applied.
pub fn apply(
    position: &Position,
    from: u8,
    to: u8,
    promotion: Option<Piece>,
) -> Result<(Position, Move), EngineError> {
    if status(position).game_over() {
        return Err(EngineError::GameOver);
    }

    let generator = MoveGenerator::new();
    let canonical = generator
        .legal_moves(position, Some(from))
        .into_iter()
        .find(|candidate| candidate.to == to && candidate.promotion == promotion)
        .ok_or_else(|| {
            let mut text = format!(
                "{}{}",
                crate::board::square_name(from),
                crate::board::square_name(to)
            );
            if let Some(piece) = promotion {
                text.push(piece.to_char(Color::Black));
            }
            EngineError::IllegalMove(text)
        })?;

    Ok((position.make(&canonical), canonical))
}

/// Dead-position detection: king vs king, king and one minor piece vs king,
/// and same-colored single bishops.
pub fn is_insufficient_material(position: &Position) -> bool {
    let count = |color: Color| position.occupied_by(color).count_ones();
    let white = count(Color::White);
    let black = count(Color::Black);

    let minors = |color: Color| {
        let pieces = position.pieces(color);
        (pieces[Piece::Knight.index()] | pieces[Piece::Bishop.index()]).count_ones()
    };
    let bishops =
        |color: Color| position.pieces(color)[Piece::Bishop.index()].count_ones();

    // King vs king.
    if white == 1 && black == 1 {
        return true;
    }

    // King and a single minor piece vs bare king.
    if (white == 2 && minors(Color::White) == 1 && black == 1)
        || (black == 2 && minors(Color::Black) == 1 && white == 1)
    {
        return true;
    }

    // One bishop each, standing on same-colored squares.
    if white == 2 && black == 2 && bishops(Color::White) == 1 && bishops(Color::Black) == 1 {
        let shade = |bb: u64| {
            let square = bb.trailing_zeros() as u8;
            (square / 8 + square % 8) % 2
        };
        let white_bishop = position.pieces(Color::White)[Piece::Bishop.index()];
        let black_bishop = position.pieces(Color::Black)[Piece::Bishop.index()];
        if shade(white_bishop) == shade(black_bishop) {
            return true;
        }
    }

    false
}
