//! Area scoring: stones plus surrounded empty regions.
//!
//! Empty regions bordered by a single colour count as that colour's territory;
//! regions touching both colours (or none) are dame. Komi is kept in
//! half-points so that comparisons are exact.

use std::fmt;

use crate::board::Board;
use crate::types::{Player, Point};

/// Komi as an integer number of half-points.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct Komi(i32);

impl Komi {
    /// Round a komi given in points to the nearest half-point.
    pub fn from_points(komi: f32) -> Komi {
        Komi((komi * 2.0).round() as i32)
    }

    #[inline]
    pub fn half_points(self) -> i32 {
        self.0
    }

    #[inline]
    pub fn as_points(self) -> f32 {
        self.0 as f32 / 2.0
    }
}

impl fmt::Display for Komi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_points())
    }
}

/// Ownership of a single point after scoring.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TerritoryStatus {
    BlackStone,
    WhiteStone,
    BlackTerritory,
    WhiteTerritory,
    Dame,
}

/// Counts of stones, territory and dame for both sides.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Territory {
    pub num_black_stones: usize,
    pub num_white_stones: usize,
    pub num_black_territory: usize,
    pub num_white_territory: usize,
    pub num_dame: usize,
    pub dame_points: Vec<Point>,
}

impl Territory {
    /// Classify every point of the board.
    pub fn evaluate(board: &Board) -> Territory {
        let mut status: Vec<Option<TerritoryStatus>> = vec![None; board.num_rows * board.num_cols];
        let idx = |p: Point| (p.row - 1) * board.num_cols + p.col - 1;

        for point in board.points() {
            if status[idx(point)].is_some() {
                continue;
            }
            match board.get(point) {
                Some(Player::Black) => status[idx(point)] = Some(TerritoryStatus::BlackStone),
                Some(Player::White) => status[idx(point)] = Some(TerritoryStatus::WhiteStone),
                None => {
                    let (region, borders) = collect_region(board, point);
                    let fill_with = match borders {
                        [true, false] => TerritoryStatus::BlackTerritory,
                        [false, true] => TerritoryStatus::WhiteTerritory,
                        _ => TerritoryStatus::Dame,
                    };
                    for p in region {
                        status[idx(p)] = Some(fill_with);
                    }
                }
            }
        }

        let mut territory = Territory::default();
        for (point, s) in board.points().zip(status) {
            match s {
                Some(TerritoryStatus::BlackStone) => territory.num_black_stones += 1,
                Some(TerritoryStatus::WhiteStone) => territory.num_white_stones += 1,
                Some(TerritoryStatus::BlackTerritory) => territory.num_black_territory += 1,
                Some(TerritoryStatus::WhiteTerritory) => territory.num_white_territory += 1,
                Some(TerritoryStatus::Dame) | None => {
                    territory.num_dame += 1;
                    territory.dame_points.push(point);
                }
            }
        }
        territory
    }
}

/// Flood-fill the empty region containing `start`.
///
/// Returns the region's points and which colours border it, indexed by
/// [`Player::index`].
fn collect_region(board: &Board, start: Point) -> (Vec<Point>, [bool; 2]) {
    let mut visited = vec![false; board.num_rows * board.num_cols];
    let idx = |p: Point| (p.row - 1) * board.num_cols + p.col - 1;
    let mut region = Vec::new();
    let mut borders = [false; 2];
    let mut stack = vec![start];
    visited[idx(start)] = true;

    while let Some(point) = stack.pop() {
        region.push(point);
        for &neighbor in board.neighbors(point) {
            match board.get(neighbor) {
                Some(color) => borders[color.index()] = true,
                None if !visited[idx(neighbor)] => {
                    visited[idx(neighbor)] = true;
                    stack.push(neighbor);
                }
                None => {}
            }
        }
    }
    (region, borders)
}

/// Final area score of a board, with komi for White.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GameResult {
    pub black: usize,
    pub white: usize,
    pub komi: Komi,
}

impl GameResult {
    pub fn from_board(board: &Board, komi: Komi) -> GameResult {
        let territory = Territory::evaluate(board);
        GameResult {
            black: territory.num_black_stones + territory.num_black_territory,
            white: territory.num_white_stones + territory.num_white_territory,
            komi,
        }
    }

    /// Black margin in half-points (negative when White leads).
    fn black_margin_half_points(&self) -> i64 {
        2 * self.black as i64 - 2 * self.white as i64 - self.komi.half_points() as i64
    }

    /// Black wins only when strictly ahead after komi; an exact tie goes to White.
    pub fn winner(&self) -> Player {
        if self.black_margin_half_points() > 0 {
            Player::Black
        } else {
            Player::White
        }
    }

    pub fn winning_margin(&self) -> f32 {
        self.black_margin_half_points().unsigned_abs() as f32 / 2.0
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = match self.winner() {
            Player::Black => 'B',
            Player::White => 'W',
        };
        write!(f, "{side}+{}", self.winning_margin())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_komi_half_points() {
        assert_eq!(Komi::from_points(7.5).half_points(), 15);
        assert_eq!(Komi::from_points(0.0).half_points(), 0);
        assert_eq!(Komi::from_points(-2.5).half_points(), -5);
        assert_eq!(Komi::from_points(6.5).as_points(), 6.5);
    }

    #[test]
    fn test_empty_board_is_all_dame() {
        let board = Board::new(5, 5);
        let territory = Territory::evaluate(&board);
        assert_eq!(territory.num_dame, 25);
        assert_eq!(territory.dame_points.len(), 25);
    }

    #[test]
    fn test_lone_stone_owns_board() {
        let mut board = Board::new(5, 5);
        board.place_stone(Player::White, Point::new(3, 3));
        let territory = Territory::evaluate(&board);
        assert_eq!(territory.num_white_stones, 1);
        assert_eq!(territory.num_white_territory, 24);
        assert_eq!(territory.num_dame, 0);
    }

    #[test]
    fn test_exact_tie_goes_to_white() {
        let result = GameResult {
            black: 10,
            white: 10,
            komi: Komi::from_points(0.0),
        };
        assert_eq!(result.winner(), Player::White);
        assert_eq!(result.winning_margin(), 0.0);
    }

    #[test]
    fn test_half_point_komi() {
        let result = GameResult {
            black: 41,
            white: 40,
            komi: Komi::from_points(0.5),
        };
        assert_eq!(result.winner(), Player::Black);
        assert_eq!(result.to_string(), "B+0.5");

        let result = GameResult {
            black: 41,
            white: 40,
            komi: Komi::from_points(1.5),
        };
        assert_eq!(result.winner(), Player::White);
        assert_eq!(result.to_string(), "W+0.5");
    }
}
