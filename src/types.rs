//! Shared primitives: players, points, moves and vertex notation.

use std::fmt;

use crate::constants::{COLUMN_LETTERS, MAX_BOARD_SIZE};
use crate::error::ParseError;

/// Side to move. Black moves first.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Player {
    Black,
    White,
}

impl Player {
    #[inline]
    pub fn other(self) -> Player {
        match self {
            Player::Black => Player::White,
            Player::White => Player::Black,
        }
    }

    /// Index into per-player tables (0 for Black, 1 for White).
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Player::Black => 0,
            Player::White => 1,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::Black => write!(f, "black"),
            Player::White => write!(f, "white"),
        }
    }
}

/// A point on the board. Rows and columns are 1-indexed; row 1 is the bottom row.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Point {
    pub row: usize,
    pub col: usize,
}

impl Point {
    #[inline]
    pub const fn new(row: usize, col: usize) -> Self {
        Point { row, col }
    }

    /// The 4 orthogonal neighbors. Some may be off the board.
    #[inline]
    pub fn neighbors(self) -> [Point; 4] {
        [
            Point::new(self.row - 1, self.col),
            Point::new(self.row + 1, self.col),
            Point::new(self.row, self.col - 1),
            Point::new(self.row, self.col + 1),
        ]
    }

    /// The 4 diagonal neighbors. Some may be off the board.
    #[inline]
    pub fn corners(self) -> [Point; 4] {
        [
            Point::new(self.row - 1, self.col - 1),
            Point::new(self.row - 1, self.col + 1),
            Point::new(self.row + 1, self.col - 1),
            Point::new(self.row + 1, self.col + 1),
        ]
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.row, self.col)
    }
}

/// A move: play a stone, pass, or resign.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Move {
    Play(Point),
    Pass,
    Resign,
}

impl Move {
    #[inline]
    pub fn play(row: usize, col: usize) -> Move {
        Move::Play(Point::new(row, col))
    }

    #[inline]
    pub fn is_play(self) -> bool {
        matches!(self, Move::Play(_))
    }

    #[inline]
    pub fn is_pass(self) -> bool {
        self == Move::Pass
    }

    #[inline]
    pub fn is_resign(self) -> bool {
        self == Move::Resign
    }

    #[inline]
    pub fn point(self) -> Option<Point> {
        match self {
            Move::Play(point) => Some(point),
            _ => None,
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_vertex(*self))
    }
}

/// Parse a colour argument (`b`, `black`, `w`, `white`, any case).
pub fn parse_player(s: &str) -> Result<Player, ParseError> {
    match s.to_ascii_lowercase().as_str() {
        "b" | "black" => Ok(Player::Black),
        "w" | "white" => Ok(Player::White),
        _ => Err(ParseError::InvalidColor(s.to_string())),
    }
}

/// Parse vertex notation (e.g. "D4", "pass", "resign") for a board of the given size.
///
/// Columns use letters A-T skipping I; rows count up from 1 at the bottom.
pub fn parse_vertex(s: &str, board_size: usize) -> Result<Move, ParseError> {
    if s.eq_ignore_ascii_case("pass") {
        return Ok(Move::Pass);
    }
    if s.eq_ignore_ascii_case("resign") {
        return Ok(Move::Resign);
    }

    let invalid = || ParseError::InvalidVertex(s.to_string());
    let mut chars = s.chars();
    let col_char = chars.next().ok_or_else(invalid)?.to_ascii_uppercase();
    let col = COLUMN_LETTERS
        .iter()
        .position(|&c| c as char == col_char)
        .ok_or_else(invalid)?
        + 1;
    let row: usize = chars.as_str().parse().map_err(|_| invalid())?;

    let size = board_size.min(MAX_BOARD_SIZE);
    if row == 0 || row > size || col > size {
        return Err(invalid());
    }
    Ok(Move::play(row, col))
}

/// Format a move in vertex notation. Returns "pass" / "resign" for those moves.
pub fn format_vertex(mv: Move) -> String {
    match mv {
        Move::Pass => "pass".into(),
        Move::Resign => "resign".into(),
        Move::Play(point) => {
            let letter = COLUMN_LETTERS
                .get(point.col.wrapping_sub(1))
                .map(|&c| c as char)
                .unwrap_or('?');
            format!("{letter}{}", point.row)
        }
    }
}
