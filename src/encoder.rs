//! Board encoding for the move-evaluation oracle.
//!
//! [`SimpleEncoder`] produces 11 planes, each `rows x cols`, stored row-major:
//! - 0-3: stones of the side to move whose string has 1, 2, 3 or 4+ liberties
//! - 4-7: the same for the opponent
//! - 8: all ones if White is to move
//! - 9: all ones if Black is to move
//! - 10: empty points where a play would repeat an earlier position
//!
//! Moves are indexed row-major over the board with one trailing index for pass.

use crate::constants::{NUM_PLANES, PLANE_BLACK_TO_MOVE, PLANE_SUPERKO, PLANE_WHITE_TO_MOVE};
use crate::position::GameState;
use crate::types::{Move, Player, Point};

/// A stack of equally sized board planes.
#[derive(Clone, Debug, PartialEq)]
pub struct Planes {
    pub num_planes: usize,
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<f32>,
}

impl Planes {
    pub fn zeros(num_planes: usize, rows: usize, cols: usize) -> Self {
        Planes {
            num_planes,
            rows,
            cols,
            data: vec![0.0; num_planes * rows * cols],
        }
    }

    #[inline]
    fn offset(&self, plane: usize, point: Point) -> usize {
        debug_assert!(plane < self.num_planes);
        debug_assert!(point.row >= 1 && point.row <= self.rows);
        debug_assert!(point.col >= 1 && point.col <= self.cols);
        (plane * self.rows + point.row - 1) * self.cols + point.col - 1
    }

    #[inline]
    pub fn get(&self, plane: usize, point: Point) -> f32 {
        self.data[self.offset(plane, point)]
    }

    #[inline]
    pub fn set(&mut self, plane: usize, point: Point, value: f32) {
        let offset = self.offset(plane, point);
        self.data[offset] = value;
    }

    /// Set every cell of `plane` to `value`.
    pub fn fill(&mut self, plane: usize, value: f32) {
        let size = self.rows * self.cols;
        self.data[plane * size..(plane + 1) * size].fill(value);
    }
}

/// Liberty-count encoder for a fixed board shape.
#[derive(Clone, Debug)]
pub struct SimpleEncoder {
    rows: usize,
    cols: usize,
}

impl SimpleEncoder {
    pub fn new(rows: usize, cols: usize) -> Self {
        SimpleEncoder { rows, cols }
    }

    /// Encoder for a square `board_size` x `board_size` board.
    pub fn square(board_size: usize) -> Self {
        Self::new(board_size, board_size)
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn num_planes(&self) -> usize {
        NUM_PLANES
    }

    /// Number of move indices: one per point plus pass.
    #[inline]
    pub fn num_moves(&self) -> usize {
        self.rows * self.cols + 1
    }

    pub fn encode(&self, state: &GameState) -> Planes {
        debug_assert_eq!(state.board.num_rows, self.rows);
        debug_assert_eq!(state.board.num_cols, self.cols);

        let mut planes = Planes::zeros(NUM_PLANES, self.rows, self.cols);
        let next_player = state.next_player;
        match next_player {
            Player::White => planes.fill(PLANE_WHITE_TO_MOVE, 1.0),
            Player::Black => planes.fill(PLANE_BLACK_TO_MOVE, 1.0),
        }

        for point in state.board.points() {
            match state.board.get_go_string(point) {
                None => {
                    if state.does_move_violate_ko(next_player, Move::Play(point)) {
                        planes.set(PLANE_SUPERKO, point, 1.0);
                    }
                }
                Some(string) => {
                    let mut plane = string.num_liberties().clamp(1, 4) - 1;
                    if string.color != next_player {
                        plane += 4;
                    }
                    planes.set(plane, point, 1.0);
                }
            }
        }
        planes
    }

    /// Index of `mv`, or `None` for resignation and points off the board.
    pub fn encode_move(&self, mv: Move) -> Option<usize> {
        match mv {
            Move::Play(p) if (1..=self.rows).contains(&p.row) && (1..=self.cols).contains(&p.col) => {
                Some((p.row - 1) * self.cols + p.col - 1)
            }
            Move::Play(_) | Move::Resign => None,
            Move::Pass => Some(self.rows * self.cols),
        }
    }

    /// Inverse of [`SimpleEncoder::encode_move`]. Any index past the last point is pass.
    pub fn decode_move_index(&self, index: usize) -> Move {
        if index >= self.rows * self.cols {
            return Move::Pass;
        }
        Move::play(index / self.cols + 1, index % self.cols + 1)
    }
}
