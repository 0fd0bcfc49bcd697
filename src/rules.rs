//////////////////////////
// rules.rs
//////////////////////////
//
// Stateless rules engine: every function borrows a board and either
// answers a question about it or returns a fresh board with one move
// applied. Nothing in here mutates caller-owned state.
//
// Scope: standard piece movement, check, checkmate and stalemate.
// En passant, castling and pawn promotion are deliberately not
// implemented; a pawn that reaches the far rank simply has no forward
// moves left.

use crate::board::Board;
use crate::types::{Color, MoveError, PieceKind};

const ROOK_DIRECTIONS: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
const BISHOP_DIRECTIONS: [(i32, i32); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];
const KNIGHT_OFFSETS: [(i32, i32); 8] = [
    (-2, -1), (-2, 1), (-1, -2), (-1, 2),
    (1, -2), (1, 2), (2, -1), (2, 1),
];
const KING_OFFSETS: [(i32, i32); 8] = [
    (-1, -1), (-1, 0), (-1, 1), (0, -1),
    (0, 1), (1, -1), (1, 0), (1, 1),
];

fn shift(row: usize, col: usize, dr: i32, dc: i32) -> Option<(usize, usize)> {
    let row = row as i32 + dr;
    let col = col as i32 + dc;
    if (0..8).contains(&row) && (0..8).contains(&col) {
        Some((row as usize, col as usize))
    } else {
        None
    }
}

/// Squares the piece at `(row, col)` may move to by geometry alone,
/// before self-check filtering. Empty squares produce an empty set.
/// A friendly-occupied destination is never produced.
pub fn pseudo_destinations(board: &Board, row: usize, col: usize) -> Vec<(usize, usize)> {
    let piece = match board.get(row, col) {
        Some(p) => p,
        None => return Vec::new(),
    };

    match piece.kind {
        PieceKind::Pawn => pawn_destinations(board, row, col, piece.player),
        PieceKind::Rook => slide(board, row, col, piece.player, &ROOK_DIRECTIONS),
        PieceKind::Bishop => slide(board, row, col, piece.player, &BISHOP_DIRECTIONS),
        PieceKind::Queen => {
            let mut moves = slide(board, row, col, piece.player, &ROOK_DIRECTIONS);
            moves.extend(slide(board, row, col, piece.player, &BISHOP_DIRECTIONS));
            moves
        }
        PieceKind::Knight => jump(board, row, col, piece.player, &KNIGHT_OFFSETS),
        PieceKind::King => jump(board, row, col, piece.player, &KING_OFFSETS),
    }
}

fn pawn_destinations(board: &Board, row: usize, col: usize, player: Color) -> Vec<(usize, usize)> {
    let (direction, start_row) = match player {
        Color::White => (-1, 6),
        Color::Black => (1, 1),
    };
    let mut moves = Vec::new();

    if let Some(one) = shift(row, col, direction, 0) {
        if board.get(one.0, one.1).is_none() {
            moves.push(one);
            if row == start_row {
                if let Some(two) = shift(row, col, 2 * direction, 0) {
                    if board.get(two.0, two.1).is_none() {
                        moves.push(two);
                    }
                }
            }
        }
    }

    // Diagonal captures only onto enemy-occupied squares.
    for dc in [-1, 1] {
        if let Some(target) = shift(row, col, direction, dc) {
            if let Some(occupant) = board.get(target.0, target.1) {
                if occupant.player != player {
                    moves.push(target);
                }
            }
        }
    }

    moves
}

fn slide(
    board: &Board,
    row: usize,
    col: usize,
    player: Color,
    directions: &[(i32, i32)],
) -> Vec<(usize, usize)> {
    let mut moves = Vec::new();
    for &(dr, dc) in directions {
        let mut step = 1;
        while let Some(target) = shift(row, col, dr * step, dc * step) {
            match board.get(target.0, target.1) {
                None => moves.push(target),
                Some(occupant) => {
                    if occupant.player != player {
                        moves.push(target);
                    }
                    break;
                }
            }
            step += 1;
        }
    }
    moves
}

fn jump(
    board: &Board,
    row: usize,
    col: usize,
    player: Color,
    offsets: &[(i32, i32)],
) -> Vec<(usize, usize)> {
    let mut moves = Vec::new();
    for &(dr, dc) in offsets {
        if let Some(target) = shift(row, col, dr, dc) {
            match board.get(target.0, target.1) {
                Some(occupant) if occupant.player == player => {}
                _ => moves.push(target),
            }
        }
    }
    moves
}

/// Relocate a piece on a copy of the board, no questions asked. Shared
/// by self-check simulation and `apply_move`.
fn perform(board: &Board, from: (usize, usize), to: (usize, usize)) -> Board {
    let mut next = board.clone();
    let piece = next.get(from.0, from.1);
    let _ = next.place(to.0, to.1, piece);
    let _ = next.place(from.0, from.1, None);
    next
}

/// Fully legal destinations: the pseudo-legal set minus every move that
/// would leave the mover's own king attacked.
pub fn legal_destinations(
    board: &Board,
    row: usize,
    col: usize,
) -> Result<Vec<(usize, usize)>, MoveError> {
    let piece = match board.piece_at(row, col)? {
        Some(p) => p,
        None => return Ok(Vec::new()),
    };

    let legal = pseudo_destinations(board, row, col)
        .into_iter()
        .filter(|&target| {
            let probe = perform(board, (row, col), target);
            !is_in_check(&probe, piece.player)
        })
        .collect();
    Ok(legal)
}

pub fn is_square_attacked(board: &Board, target: (usize, usize), by: Color) -> bool {
    for row in 0..8 {
        for col in 0..8 {
            if let Some(piece) = board.get(row, col) {
                if piece.player == by && pseudo_destinations(board, row, col).contains(&target) {
                    return true;
                }
            }
        }
    }
    false
}

pub fn is_in_check(board: &Board, color: Color) -> bool {
    match board.king_square(color) {
        Some(king) => is_square_attacked(board, king, color.opposite()),
        None => false,
    }
}

fn has_legal_move(board: &Board, color: Color) -> bool {
    for row in 0..8 {
        for col in 0..8 {
            if let Some(piece) = board.get(row, col) {
                if piece.player == color {
                    match legal_destinations(board, row, col) {
                        Ok(moves) if !moves.is_empty() => return true,
                        _ => {}
                    }
                }
            }
        }
    }
    false
}

pub fn is_checkmate(board: &Board, color: Color) -> bool {
    is_in_check(board, color) && !has_legal_move(board, color)
}

/// No legal moves while NOT in check. A distinct outcome from checkmate.
pub fn is_stalemate(board: &Board, color: Color) -> bool {
    !is_in_check(board, color) && !has_legal_move(board, color)
}

/// Validate and apply one move, returning the resulting board. The
/// input board is left untouched.
pub fn apply_move(
    board: &Board,
    from: (usize, usize),
    to: (usize, usize),
) -> Result<Board, MoveError> {
    if !Board::in_bounds(to.0, to.1) {
        return Err(MoveError::OutOfBounds);
    }
    if board.piece_at(from.0, from.1)?.is_none() {
        return Err(MoveError::NoPieceAtSource);
    }

    let legal = legal_destinations(board, from.0, from.1)?;
    if legal.contains(&to) {
        return Ok(perform(board, from, to));
    }
    // Tell a geometry failure apart from a self-check failure.
    if pseudo_destinations(board, from.0, from.1).contains(&to) {
        Err(MoveError::WouldCauseCheck)
    } else {
        Err(MoveError::IllegalMove)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Piece;

    fn put(board: &mut Board, row: usize, col: usize, player: Color, kind: PieceKind) {
        board.place(row, col, Some(Piece::new(player, kind))).unwrap();
    }

    fn piece_count(board: &Board) -> usize {
        let mut count = 0;
        for row in 0..8 {
            for col in 0..8 {
                if board.get(row, col).is_some() {
                    count += 1;
                }
            }
        }
        count
    }

    #[test]
    fn destinations_never_include_friendly_squares() {
        let board = Board::standard();
        for row in 0..8 {
            for col in 0..8 {
                let Some(piece) = board.get(row, col) else { continue };
                for (tr, tc) in pseudo_destinations(&board, row, col) {
                    if let Some(occupant) = board.get(tr, tc) {
                        assert_ne!(
                            occupant.player, piece.player,
                            "({},{}) -> ({},{}) lands on a friendly piece",
                            row, col, tr, tc
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn pawn_single_and_double_step_from_start() {
        let board = Board::standard();
        let moves = legal_destinations(&board, 6, 4).unwrap();
        assert!(moves.contains(&(5, 4)));
        assert!(moves.contains(&(4, 4)));
        assert_eq!(moves.len(), 2);
    }

    #[test]
    fn pawn_double_step_blocked_by_intervening_piece() {
        let mut board = Board::standard();
        put(&mut board, 5, 4, Color::Black, PieceKind::Knight);
        let moves = legal_destinations(&board, 6, 4).unwrap();
        assert!(moves.is_empty());
    }

    #[test]
    fn pawn_captures_diagonally_only() {
        let mut board = Board::empty();
        put(&mut board, 7, 4, Color::White, PieceKind::King);
        put(&mut board, 0, 4, Color::Black, PieceKind::King);
        put(&mut board, 4, 4, Color::White, PieceKind::Pawn);
        put(&mut board, 3, 3, Color::Black, PieceKind::Pawn);
        put(&mut board, 3, 4, Color::Black, PieceKind::Pawn);

        let moves = legal_destinations(&board, 4, 4).unwrap();
        // Forward blocked, one enemy on the forward-left diagonal.
        assert_eq!(moves, vec![(3, 3)]);
    }

    #[test]
    fn pawn_on_far_rank_has_no_moves() {
        let mut board = Board::empty();
        put(&mut board, 7, 4, Color::White, PieceKind::King);
        put(&mut board, 0, 0, Color::Black, PieceKind::King);
        put(&mut board, 0, 7, Color::White, PieceKind::Pawn);
        assert!(legal_destinations(&board, 0, 7).unwrap().is_empty());
    }

    #[test]
    fn knight_jumps_over_occupied_squares() {
        let board = Board::standard();
        let moves = legal_destinations(&board, 7, 1).unwrap();
        assert_eq!(moves.len(), 2);
        assert!(moves.contains(&(5, 0)));
        assert!(moves.contains(&(5, 2)));
    }

    #[test]
    fn rook_ray_stops_after_enemy_capture() {
        let mut board = Board::empty();
        put(&mut board, 7, 7, Color::White, PieceKind::King);
        put(&mut board, 0, 0, Color::Black, PieceKind::King);
        put(&mut board, 4, 0, Color::White, PieceKind::Rook);
        put(&mut board, 4, 3, Color::Black, PieceKind::Pawn);
        put(&mut board, 4, 5, Color::Black, PieceKind::Pawn);

        let moves = legal_destinations(&board, 4, 0).unwrap();
        assert!(moves.contains(&(4, 3)));
        assert!(!moves.contains(&(4, 4)));
        assert!(!moves.contains(&(4, 5)));
    }

    #[test]
    fn empty_square_has_no_destinations() {
        let board = Board::standard();
        assert!(legal_destinations(&board, 4, 4).unwrap().is_empty());
    }

    #[test]
    fn out_of_bounds_source_is_rejected() {
        let board = Board::standard();
        assert_eq!(legal_destinations(&board, 8, 0), Err(MoveError::OutOfBounds));
    }

    #[test]
    fn pinned_piece_may_not_expose_king() {
        let mut board = Board::empty();
        put(&mut board, 7, 4, Color::White, PieceKind::King);
        put(&mut board, 0, 4, Color::Black, PieceKind::King);
        put(&mut board, 5, 4, Color::White, PieceKind::Bishop);
        put(&mut board, 2, 4, Color::Black, PieceKind::Rook);

        // The bishop is pinned to the file; every diagonal step exposes
        // the king to the rook.
        assert!(legal_destinations(&board, 5, 4).unwrap().is_empty());
    }

    #[test]
    fn king_must_step_out_of_check() {
        let mut board = Board::empty();
        put(&mut board, 7, 4, Color::White, PieceKind::King);
        put(&mut board, 0, 0, Color::Black, PieceKind::King);
        put(&mut board, 0, 4, Color::Black, PieceKind::Rook);

        assert!(is_in_check(&board, Color::White));
        let moves = legal_destinations(&board, 7, 4).unwrap();
        assert!(!moves.contains(&(6, 4)));
        assert!(moves.contains(&(7, 3)));
        assert!(moves.contains(&(6, 3)));
    }

    #[test]
    fn check_detection_from_standard_position_is_negative() {
        let board = Board::standard();
        assert!(!is_in_check(&board, Color::White));
        assert!(!is_in_check(&board, Color::Black));
    }

    #[test]
    fn cornered_king_with_guarded_queen_is_checkmate() {
        let mut board = Board::empty();
        put(&mut board, 0, 0, Color::Black, PieceKind::King);
        put(&mut board, 1, 1, Color::White, PieceKind::Queen);
        put(&mut board, 2, 1, Color::White, PieceKind::King);

        assert!(is_in_check(&board, Color::Black));
        assert!(is_checkmate(&board, Color::Black));
        assert!(!is_stalemate(&board, Color::Black));
    }

    #[test]
    fn stalemate_is_not_checkmate() {
        let mut board = Board::empty();
        put(&mut board, 0, 0, Color::Black, PieceKind::King);
        put(&mut board, 2, 1, Color::White, PieceKind::Queen);
        put(&mut board, 3, 2, Color::White, PieceKind::King);

        assert!(!is_in_check(&board, Color::Black));
        assert!(is_stalemate(&board, Color::Black));
        assert!(!is_checkmate(&board, Color::Black));
    }

    #[test]
    fn apply_move_keeps_piece_count_without_capture() {
        let board = Board::standard();
        let next = apply_move(&board, (6, 4), (4, 4)).unwrap();
        assert_eq!(piece_count(&next), piece_count(&board));
        assert_eq!(next.get(6, 4), None);
        assert_eq!(
            next.get(4, 4),
            Some(Piece::new(Color::White, PieceKind::Pawn))
        );
    }

    #[test]
    fn apply_move_removes_exactly_one_piece_on_capture() {
        let mut board = Board::empty();
        put(&mut board, 7, 4, Color::White, PieceKind::King);
        put(&mut board, 0, 4, Color::Black, PieceKind::King);
        put(&mut board, 4, 0, Color::White, PieceKind::Rook);
        put(&mut board, 4, 6, Color::Black, PieceKind::Knight);

        let before = piece_count(&board);
        let next = apply_move(&board, (4, 0), (4, 6)).unwrap();
        assert_eq!(piece_count(&next), before - 1);
        assert_eq!(
            next.get(4, 6),
            Some(Piece::new(Color::White, PieceKind::Rook))
        );
    }

    #[test]
    fn apply_move_rejects_illegal_geometry() {
        let board = Board::standard();
        assert_eq!(apply_move(&board, (6, 4), (3, 4)), Err(MoveError::IllegalMove));
        assert_eq!(apply_move(&board, (4, 4), (3, 4)), Err(MoveError::NoPieceAtSource));
        assert_eq!(apply_move(&board, (6, 4), (6, 9)), Err(MoveError::OutOfBounds));
    }

    #[test]
    fn apply_move_rejects_self_check() {
        let mut board = Board::empty();
        put(&mut board, 7, 4, Color::White, PieceKind::King);
        put(&mut board, 0, 4, Color::Black, PieceKind::King);
        put(&mut board, 5, 4, Color::White, PieceKind::Bishop);
        put(&mut board, 2, 4, Color::Black, PieceKind::Rook);

        assert_eq!(
            apply_move(&board, (5, 4), (4, 3)),
            Err(MoveError::WouldCauseCheck)
        );
    }

    #[test]
    fn apply_move_never_mutates_its_input() {
        let board = Board::standard();
        let copy = board.clone();
        let _ = apply_move(&board, (6, 4), (4, 4)).unwrap();
        assert_eq!(board, copy);
    }
}
