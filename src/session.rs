use crate::board::{Piece, Position};
use crate::errors::EngineError;
use crate::game::{self, GameStatus};
use crate::movegen::{Move, MoveGenerator};
use crate::policy::MovePolicy;

/// What a square click or drag resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interaction {
    /// Nothing to do; selection state is unchanged.
    Ignored,
    /// A piece was selected; carries its legal destination squares.
    Selected(Vec<u8>),
    /// The active selection was dropped.
    Deselected,
    /// A move was committed; carries its coordinate notation.
    Committed(String),
    /// The chosen destination is an ambiguous promotion. The session stays
    /// pending until `supply_promotion` resolves it.
    PromotionRequired { from: u8, to: u8 },
}

/// Notified synchronously after every committed state change, never batched.
pub trait Observer {
    fn position_changed(&mut self, position: &Position, status: &GameStatus);
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Selection {
    Idle,
    Selected { origin: u8, destinations: Vec<u8> },
}

/// Thin state machine above the engine that turns clicks and drags into
/// generate, select, apply cycles for one game. It owns the single current
/// position and replaces it atomically on commit, so moves within a session
/// never race.
pub struct GameSession {
    position: Position,
    generator: MoveGenerator,
    selection: Selection,
    pending_promotion: Option<(u8, u8)>,
    observers: Vec<Box<dyn Observer>>,
    generation: u64,
}

impl GameSession {
    pub fn new() -> Self {
        Self::with_position(Position::new())
    }

    pub fn from_fen(fen: &str) -> Result<Self, EngineError> {
        Ok(Self::with_position(Position::from_fen(fen)?))
    }

    fn with_position(position: Position) -> Self {
        Self {
            position,
            generator: MoveGenerator::new(),
            selection: Selection::Idle,
            pending_promotion: None,
            observers: Vec::new(),
            generation: 0,
        }
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn status(&self) -> GameStatus {
        game::status(&self.position)
    }

    pub fn selected_origin(&self) -> Option<u8> {
        match &self.selection {
            Selection::Idle => None,
            Selection::Selected { origin, .. } => Some(*origin),
        }
    }

    /// Tag for in-flight remote validation; bumped on every commit and reset
    /// so late responses can be recognized as stale.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn add_observer(&mut self, observer: Box<dyn Observer>) {
        self.observers.push(observer);
    }

    /// Feed a click or drag on a square into the selection state machine.
    pub fn touch_square(&mut self, square: u8) -> Interaction {
        if self.pending_promotion.is_some() {
            return Interaction::Ignored;
        }

        let own_piece = self
            .position
            .piece_at(square)
            .map_or(false, |(_, color)| color == self.position.side_to_move);

        let selected = match &self.selection {
            Selection::Idle => None,
            Selection::Selected { origin, destinations } => {
                Some((*origin, destinations.contains(&square)))
            }
        };

        match selected {
            None => {
                if own_piece {
                    self.select(square)
                } else {
                    Interaction::Ignored
                }
            }
            Some((origin, is_destination)) => {
                if origin == square {
                    self.selection = Selection::Idle;
                    Interaction::Deselected
                } else if own_piece {
                    self.select(square)
                } else if is_destination {
                    self.commit_selected(square)
                } else {
                    self.selection = Selection::Idle;
                    Interaction::Deselected
                }
            }
        }
    }

    /// Resolve a pending promotion with the chosen piece and commit the move.
    pub fn supply_promotion(&mut self, piece: Piece) -> Result<Interaction, EngineError> {
        let (from, to) = self.pending_promotion.ok_or_else(|| {
            EngineError::IllegalMove("no promotion is pending".to_string())
        })?;
        let (next, applied) = game::apply(&self.position, from, to, Some(piece))?;
        self.pending_promotion = None;
        Ok(self.commit(next, applied))
    }

    /// Automated turn: hand the legal-move set to a policy and commit its
    /// choice.
    pub fn play_policy_move(&mut self, policy: &mut dyn MovePolicy) -> Result<Move, EngineError> {
        if self.status().game_over() {
            return Err(EngineError::GameOver);
        }
        let moves = self.generator.legal_moves(&self.position, None);
        let chosen = policy.choose(&moves)?;
        let next = self.position.make(&chosen);
        self.commit(next, chosen);
        Ok(chosen)
    }

    /// Commit a move confirmed by an external authority (e.g. a server
    /// response). Returns `Ok(None)` without touching state when the tag is
    /// stale, i.e. the session was reset or advanced after the request was
    /// issued.
    pub fn commit_confirmed(
        &mut self,
        generation: u64,
        from: u8,
        to: u8,
        promotion: Option<Piece>,
    ) -> Result<Option<String>, EngineError> {
        if generation != self.generation {
            return Ok(None);
        }
        let (next, applied) = game::apply(&self.position, from, to, promotion)?;
        self.commit(next, applied);
        Ok(Some(applied.notation()))
    }

    /// Back to the standard initial position. Clears the selection and
    /// invalidates outstanding generation tags.
    pub fn reset(&mut self) {
        self.position = Position::new();
        self.selection = Selection::Idle;
        self.pending_promotion = None;
        self.generation += 1;
        self.notify();
    }

    fn select(&mut self, square: u8) -> Interaction {
        let mut destinations: Vec<u8> = Vec::new();
        for mv in self.generator.legal_moves(&self.position, Some(square)) {
            // Promotion variants collapse to one destination for display.
            if !destinations.contains(&mv.to) {
                destinations.push(mv.to);
            }
        }
        self.selection = Selection::Selected {
            origin: square,
            destinations: destinations.clone(),
        };
        Interaction::Selected(destinations)
    }

    fn commit_selected(&mut self, destination: u8) -> Interaction {
        let origin = match &self.selection {
            Selection::Selected { origin, .. } => *origin,
            Selection::Idle => return Interaction::Ignored,
        };

        let candidates = self.generator.legal_moves(&self.position, Some(origin));
        let needs_promotion = candidates
            .iter()
            .any(|mv| mv.to == destination && mv.promotion.is_some());
        if needs_promotion {
            self.pending_promotion = Some((origin, destination));
            return Interaction::PromotionRequired {
                from: origin,
                to: destination,
            };
        }

        match game::apply(&self.position, origin, destination, None) {
            Ok((next, applied)) => Interaction::Committed(self.commit_notation(next, applied)),
            // The destination came from the legal set, so this only happens
            // if the caller races a stale destination list; drop back to Idle.
            Err(_) => {
                self.selection = Selection::Idle;
                Interaction::Ignored
            }
        }
    }

    fn commit_notation(&mut self, next: Position, applied: Move) -> String {
        self.commit(next, applied);
        applied.notation()
    }

    fn commit(&mut self, next: Position, applied: Move) -> Interaction {
        self.position = next;
        self.selection = Selection::Idle;
        self.pending_promotion = None;
        self.generation += 1;
        self.notify();
        Interaction::Committed(applied.notation())
    }

    fn notify(&mut self) {
        let status = game::status(&self.position);
        for observer in &mut self.observers {
            observer.position_changed(&self.position, &status);
        }
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}
