//////////////////////////
// session.rs
//////////////////////////

use crate::board::Board;
use crate::rules;
use crate::types::{Color, GameOutcome, GameSnapshot, MoveError, Role};

/// The per-match state machine. Owns the one live board; every mutation
/// funnels through `request_move` or `reset`, so callers only ever
/// observe fully-committed transitions.
#[derive(Debug, Clone)]
pub struct GameSession {
    board: Board,
    current_turn: Color,
    outcome: Option<GameOutcome>,
}

impl GameSession {
    pub fn new() -> Self {
        GameSession {
            board: Board::standard(),
            current_turn: Color::White,
            outcome: None,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn current_turn(&self) -> Color {
        self.current_turn
    }

    pub fn outcome(&self) -> Option<GameOutcome> {
        self.outcome
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            board: self.board.clone(),
            current_player: self.current_turn,
        }
    }

    /// Validate and commit one move on behalf of `role`. On any error
    /// the session is left exactly as it was.
    pub fn request_move(
        &mut self,
        role: Role,
        from: (usize, usize),
        to: (usize, usize),
    ) -> Result<(), MoveError> {
        if self.outcome.is_some() {
            return Err(MoveError::GameOver);
        }
        let mover = match role.as_color() {
            Some(color) => color,
            None => return Err(MoveError::NotYourTurn),
        };
        if mover != self.current_turn {
            return Err(MoveError::NotYourTurn);
        }
        match self.board.piece_at(from.0, from.1)? {
            Some(piece) if piece.player == mover => {}
            Some(_) => return Err(MoveError::IllegalMove),
            None => return Err(MoveError::NoPieceAtSource),
        }

        self.board = rules::apply_move(&self.board, from, to)?;
        self.current_turn = self.current_turn.opposite();

        // The side now to move may have just been mated or stalemated.
        if rules::is_checkmate(&self.board, self.current_turn) {
            self.outcome = Some(GameOutcome::Checkmate(mover));
        } else if rules::is_stalemate(&self.board, self.current_turn) {
            self.outcome = Some(GameOutcome::Stalemate);
        }
        Ok(())
    }

    /// Unconditional restart: standard opening position, White to move.
    /// Legal from any state, including mid-checkmate.
    pub fn reset(&mut self) {
        *self = GameSession::new();
    }
}

impl Default for GameSession {
    fn default() -> Self {
        GameSession::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spectators_cannot_move() {
        let mut session = GameSession::new();
        let before = session.board().clone();
        assert_eq!(
            session.request_move(Role::Spectator, (6, 4), (4, 4)),
            Err(MoveError::NotYourTurn)
        );
        assert_eq!(session.board(), &before);
    }

    #[test]
    fn moving_the_opponents_piece_is_illegal() {
        let mut session = GameSession::new();
        assert_eq!(
            session.request_move(Role::White, (1, 4), (2, 4)),
            Err(MoveError::IllegalMove)
        );
        assert_eq!(session.current_turn(), Color::White);
    }

    #[test]
    fn rejected_move_leaves_turn_unchanged() {
        let mut session = GameSession::new();
        assert_eq!(
            session.request_move(Role::White, (6, 4), (3, 4)),
            Err(MoveError::IllegalMove)
        );
        assert_eq!(session.current_turn(), Color::White);
        assert_eq!(session.outcome(), None);
    }

    #[test]
    fn malformed_coordinates_do_not_mutate() {
        let mut session = GameSession::new();
        let before = session.board().clone();
        assert_eq!(
            session.request_move(Role::White, (6, 4), (12, 0)),
            Err(MoveError::OutOfBounds)
        );
        assert_eq!(
            session.request_move(Role::White, (9, 9), (4, 4)),
            Err(MoveError::OutOfBounds)
        );
        assert_eq!(session.board(), &before);
    }

    #[test]
    fn snapshot_reflects_committed_state_only() {
        let mut session = GameSession::new();
        session.request_move(Role::White, (6, 4), (4, 4)).unwrap();
        let snapshot = session.snapshot();
        assert_eq!(snapshot.current_player, Color::Black);
        assert_eq!(snapshot.board, *session.board());
    }
}
