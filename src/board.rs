//////////////////////////
// board.rs
//////////////////////////

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{Color, MoveError, Piece, PieceKind};

/// Row-major 8x8 grid. Row 0 is Black's back rank, row 7 is White's;
/// White pawns start on row 6 and advance toward row 0. The wire format
/// is exactly this grid: 8 rows of `{player, kind} | null`.
pub type Grid = [[Option<Piece>; 8]; 8];

const BACK_RANK: [PieceKind; 8] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board {
    squares: Grid,
}

impl Board {
    pub fn empty() -> Self {
        Board { squares: [[None; 8]; 8] }
    }

    /// The standard opening position.
    pub fn standard() -> Self {
        let mut board = Board::empty();
        for col in 0..8 {
            board.squares[0][col] = Some(Piece::new(Color::Black, BACK_RANK[col]));
            board.squares[1][col] = Some(Piece::new(Color::Black, PieceKind::Pawn));
            board.squares[6][col] = Some(Piece::new(Color::White, PieceKind::Pawn));
            board.squares[7][col] = Some(Piece::new(Color::White, BACK_RANK[col]));
        }
        board
    }

    pub fn in_bounds(row: usize, col: usize) -> bool {
        row < 8 && col < 8
    }

    /// Checked lookup for callers handing in untrusted coordinates.
    pub fn piece_at(&self, row: usize, col: usize) -> Result<Option<Piece>, MoveError> {
        if Self::in_bounds(row, col) {
            Ok(self.squares[row][col])
        } else {
            Err(MoveError::OutOfBounds)
        }
    }

    /// Lookup that treats out-of-bounds as empty.
    pub fn get(&self, row: usize, col: usize) -> Option<Piece> {
        if Self::in_bounds(row, col) {
            self.squares[row][col]
        } else {
            None
        }
    }

    /// Raw placement with no legality check. Only the rules engine and
    /// reset paths write through this.
    pub fn place(
        &mut self,
        row: usize,
        col: usize,
        piece: Option<Piece>,
    ) -> Result<(), MoveError> {
        if !Self::in_bounds(row, col) {
            return Err(MoveError::OutOfBounds);
        }
        self.squares[row][col] = piece;
        Ok(())
    }

    pub fn king_square(&self, color: Color) -> Option<(usize, usize)> {
        for row in 0..8 {
            for col in 0..8 {
                if let Some(piece) = self.squares[row][col] {
                    if piece.kind == PieceKind::King && piece.player == color {
                        return Some((row, col));
                    }
                }
            }
        }
        None
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\n  a b c d e f g h")?;
        writeln!(f, "  ---------------")?;
        for row in 0..8 {
            write!(f, "{} ", 8 - row)?;
            for col in 0..8 {
                let glyph = match &self.squares[row][col] {
                    Some(p) => match (p.kind, p.player) {
                        (PieceKind::Pawn, Color::White) => "♙",
                        (PieceKind::Pawn, Color::Black) => "♟",
                        (PieceKind::Knight, Color::White) => "♘",
                        (PieceKind::Knight, Color::Black) => "♞",
                        (PieceKind::Bishop, Color::White) => "♗",
                        (PieceKind::Bishop, Color::Black) => "♝",
                        (PieceKind::Rook, Color::White) => "♖",
                        (PieceKind::Rook, Color::Black) => "♜",
                        (PieceKind::Queen, Color::White) => "♕",
                        (PieceKind::Queen, Color::Black) => "♛",
                        (PieceKind::King, Color::White) => "♔",
                        (PieceKind::King, Color::Black) => "♚",
                    },
                    None => "·",
                };
                write!(f, "{} ", glyph)?;
            }
            writeln!(f, "{}", 8 - row)?;
        }
        writeln!(f, "  ---------------")?;
        write!(f, "  a b c d e f g h")
    }
}
