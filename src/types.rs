//////////////////////////
// types.rs
//////////////////////////

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::board::Board;

// ----- Basic Chess Types -----

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn opposite(&self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => write!(f, "white"),
            Color::Black => write!(f, "black"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceKind {
    Pawn,
    Rook,
    Knight,
    Bishop,
    Queen,
    King,
}

/// An immutable piece value. Field names match the wire form
/// `{"player": "white", "kind": "pawn"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piece {
    pub player: Color,
    pub kind: PieceKind,
}

impl Piece {
    pub fn new(player: Color, kind: PieceKind) -> Self {
        Piece { player, kind }
    }
}

// ----- Connection Roles -----

/// What a connection is allowed to do: play a side, or only watch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    White,
    Black,
    Spectator,
}

impl Role {
    /// The side this role plays, if any.
    pub fn as_color(&self) -> Option<Color> {
        match self {
            Role::White => Some(Color::White),
            Role::Black => Some(Color::Black),
            Role::Spectator => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::White => write!(f, "white"),
            Role::Black => write!(f, "black"),
            Role::Spectator => write!(f, "spectator"),
        }
    }
}

// ----- Game Outcome -----

/// Terminal result of a game. Stalemate is reported on its own, never
/// folded into checkmate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    Checkmate(Color),
    Stalemate,
}

impl fmt::Display for GameOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameOutcome::Checkmate(winner) => write!(f, "checkmate, {} wins", winner),
            GameOutcome::Stalemate => write!(f, "stalemate"),
        }
    }
}

// ----- Errors -----

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveError {
    OutOfBounds,
    NoPieceAtSource,
    NotYourTurn,
    IllegalMove,
    WouldCauseCheck,
    GameOver,
}

impl fmt::Display for MoveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveError::OutOfBounds => write!(f, "Square is out of bounds"),
            MoveError::NoPieceAtSource => write!(f, "No piece at starting square"),
            MoveError::NotYourTurn => write!(f, "It is not your turn"),
            MoveError::IllegalMove => write!(f, "That piece cannot move there"),
            MoveError::WouldCauseCheck => write!(f, "Move would put or leave king in check"),
            MoveError::GameOver => write!(f, "The game is over"),
        }
    }
}

impl std::error::Error for MoveError {}

/// Both player seats are taken and the seat policy refuses extras.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotUnavailable;

impl fmt::Display for SlotUnavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "No player slot is available")
    }
}

impl std::error::Error for SlotUnavailable {}

// ----- Wire Messages -----

/// The canonical state every broadcast derives from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    pub board: Board,
    pub current_player: Color,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    #[serde(rename = "move", rename_all = "camelCase")]
    Move {
        from_row: usize,
        from_col: usize,
        to_row: usize,
        to_col: usize,
    },
    #[serde(rename = "reset")]
    Reset,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    #[serde(rename = "assigned", rename_all = "camelCase")]
    Assigned { player: Role, game_state: GameSnapshot },
    #[serde(rename = "gameFull")]
    GameFull { message: String },
    #[serde(rename = "gameState", rename_all = "camelCase")]
    GameState { board: Board, current_player: Color },
    #[serde(rename = "gameReset", rename_all = "camelCase")]
    GameReset { game_state: GameSnapshot },
}
