//! Board representation with shared immutable stone groups.
//!
//! Each occupied point holds an `Rc` to the [`GoString`] it belongs to. Strings
//! are never mutated: a liberty change builds a new string and rebinds every
//! point of the old one. Cloning a board therefore only copies pointers, and
//! older boards that still reference a string are unaffected by later moves.

use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;

use crate::constants::{COLUMN_LETTERS, MAX_BOARD_SIZE};
use crate::types::{Player, Point};
use crate::zobrist::point_key;

pub type PointSet = BTreeSet<Point>;

/// A maximal group of connected same-colour stones and its liberties.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GoString {
    pub color: Player,
    pub stones: PointSet,
    pub liberties: PointSet,
}

impl GoString {
    pub fn new(color: Player, stones: PointSet, liberties: PointSet) -> Self {
        Self {
            color,
            stones,
            liberties,
        }
    }

    pub fn without_liberty(&self, point: Point) -> GoString {
        let mut liberties = self.liberties.clone();
        liberties.remove(&point);
        GoString::new(self.color, self.stones.clone(), liberties)
    }

    pub fn with_liberty(&self, point: Point) -> GoString {
        let mut liberties = self.liberties.clone();
        liberties.insert(point);
        GoString::new(self.color, self.stones.clone(), liberties)
    }

    pub fn merged_with(&self, other: &GoString) -> GoString {
        debug_assert_eq!(self.color, other.color);
        let stones: PointSet = self.stones.union(&other.stones).copied().collect();
        let liberties = self
            .liberties
            .union(&other.liberties)
            .filter(|p| !stones.contains(p))
            .copied()
            .collect();
        GoString::new(self.color, stones, liberties)
    }

    #[inline]
    pub fn num_liberties(&self) -> usize {
        self.liberties.len()
    }
}

/// Precomputed on-board neighbors for every point of one board shape.
#[derive(Debug)]
struct NeighborTable {
    cols: usize,
    neighbors: Vec<Vec<Point>>,
}

impl NeighborTable {
    fn new(rows: usize, cols: usize) -> Self {
        let mut neighbors = Vec::with_capacity(rows * cols);
        for row in 1..=rows {
            for col in 1..=cols {
                let list = Point::new(row, col)
                    .neighbors()
                    .into_iter()
                    .filter(|n| n.row >= 1 && n.row <= rows && n.col >= 1 && n.col <= cols)
                    .collect();
                neighbors.push(list);
            }
        }
        Self { cols, neighbors }
    }

    #[inline]
    fn get(&self, point: Point) -> &[Point] {
        &self.neighbors[(point.row - 1) * self.cols + point.col - 1]
    }
}

/// A Go board. Cloning is cheap: strings and the neighbor table are shared.
#[derive(Clone, Debug)]
pub struct Board {
    pub num_rows: usize,
    pub num_cols: usize,
    grid: Vec<Option<Rc<GoString>>>,
    hash: u64,
    neighbor_table: Rc<NeighborTable>,
}

impl Board {
    pub fn new(num_rows: usize, num_cols: usize) -> Self {
        assert!(
            (1..=MAX_BOARD_SIZE).contains(&num_rows) && (1..=MAX_BOARD_SIZE).contains(&num_cols),
            "board dimensions must be within 1..={MAX_BOARD_SIZE}"
        );
        Self {
            num_rows,
            num_cols,
            grid: vec![None; num_rows * num_cols],
            hash: 0,
            neighbor_table: Rc::new(NeighborTable::new(num_rows, num_cols)),
        }
    }

    #[inline]
    fn idx(&self, point: Point) -> usize {
        (point.row - 1) * self.num_cols + point.col - 1
    }

    #[inline]
    pub fn is_on_grid(&self, point: Point) -> bool {
        1 <= point.row && point.row <= self.num_rows && 1 <= point.col && point.col <= self.num_cols
    }

    /// On-board orthogonal neighbors of an on-board point.
    #[inline]
    pub fn neighbors(&self, point: Point) -> &[Point] {
        self.neighbor_table.get(point)
    }

    /// All points in row-major order, bottom row first.
    pub fn points(&self) -> impl Iterator<Item = Point> + use<> {
        let cols = self.num_cols;
        (1..=self.num_rows).flat_map(move |row| (1..=cols).map(move |col| Point::new(row, col)))
    }

    /// Colour of the stone at `point`, if any. Off-board points are empty.
    pub fn get(&self, point: Point) -> Option<Player> {
        self.get_go_string(point).map(|s| s.color)
    }

    pub fn get_go_string(&self, point: Point) -> Option<&Rc<GoString>> {
        if !self.is_on_grid(point) {
            return None;
        }
        self.grid[self.idx(point)].as_ref()
    }

    #[inline]
    pub fn zobrist_hash(&self) -> u64 {
        self.hash
    }

    pub fn num_stones(&self) -> usize {
        self.grid.iter().filter(|cell| cell.is_some()).count()
    }

    /// Recompute the hash from scratch. Always equal to [`Board::zobrist_hash`].
    pub fn recompute_hash(&self) -> u64 {
        self.points()
            .filter_map(|p| self.get(p).map(|color| point_key(color, p)))
            .fold(0, |acc, key| acc ^ key)
    }

    /// Place a stone, merging friendly strings and capturing dead enemy strings.
    ///
    /// The point must be on the board and empty. Suicide is not rejected here;
    /// callers check legality first.
    pub fn place_stone(&mut self, player: Player, point: Point) {
        debug_assert!(self.is_on_grid(point), "{point} is off the board");
        debug_assert!(self.get(point).is_none(), "{point} is occupied");

        let mut adjacent_same_color: Vec<Rc<GoString>> = Vec::with_capacity(4);
        let mut adjacent_opposite_color: Vec<Rc<GoString>> = Vec::with_capacity(4);
        let mut liberties = PointSet::new();

        for &neighbor in self.neighbors(point) {
            match &self.grid[self.idx(neighbor)] {
                None => {
                    liberties.insert(neighbor);
                }
                Some(string) => {
                    let bucket = if string.color == player {
                        &mut adjacent_same_color
                    } else {
                        &mut adjacent_opposite_color
                    };
                    if !bucket.iter().any(|s| Rc::ptr_eq(s, string)) {
                        bucket.push(Rc::clone(string));
                    }
                }
            }
        }

        let mut new_string = GoString::new(player, PointSet::from([point]), liberties);
        for same_color_string in &adjacent_same_color {
            new_string = new_string.merged_with(same_color_string);
        }
        self.replace_string(new_string);
        self.hash ^= point_key(player, point);

        for other_color_string in &adjacent_opposite_color {
            let replacement = other_color_string.without_liberty(point);
            if replacement.num_liberties() > 0 {
                self.replace_string(replacement);
            } else {
                self.remove_string(&replacement);
            }
        }
    }

    /// Bind every stone of `string` to a fresh shared copy of it.
    fn replace_string(&mut self, string: GoString) {
        let string = Rc::new(string);
        for &stone in &string.stones {
            let idx = self.idx(stone);
            self.grid[idx] = Some(Rc::clone(&string));
        }
    }

    /// Take a captured string off the board, giving its points back as liberties.
    fn remove_string(&mut self, string: &GoString) {
        let table = Rc::clone(&self.neighbor_table);
        for &stone in &string.stones {
            for &neighbor in table.get(stone) {
                if string.stones.contains(&neighbor) {
                    continue;
                }
                let Some(neighbor_string) = self.grid[self.idx(neighbor)].clone() else {
                    continue;
                };
                if !neighbor_string.liberties.contains(&stone) {
                    self.replace_string(neighbor_string.with_liberty(stone));
                }
            }
            let idx = self.idx(stone);
            self.grid[idx] = None;
            self.hash ^= point_key(string.color, stone);
        }
    }

    /// Would playing at `point` leave `player`'s new string without liberties?
    ///
    /// Checks neighbor liberty counts directly instead of placing the stone.
    /// Off-board points are never self-capture.
    pub fn is_self_capture(&self, player: Player, point: Point) -> bool {
        if !self.is_on_grid(point) {
            return false;
        }
        let mut friendly_strings: Vec<&Rc<GoString>> = Vec::with_capacity(4);
        for &neighbor in self.neighbors(point) {
            match &self.grid[self.idx(neighbor)] {
                None => return false,
                Some(string) if string.color == player => friendly_strings.push(string),
                Some(string) => {
                    // Capturing frees a liberty.
                    if string.num_liberties() == 1 {
                        return false;
                    }
                }
            }
        }
        friendly_strings.iter().all(|s| s.num_liberties() == 1)
    }

    /// Would playing at `point` capture at least one enemy string?
    pub fn will_capture(&self, player: Player, point: Point) -> bool {
        if !self.is_on_grid(point) {
            return false;
        }
        self.neighbors(point).iter().any(|&neighbor| {
            self.grid[self.idx(neighbor)]
                .as_ref()
                .is_some_and(|s| s.color != player && s.num_liberties() == 1)
        })
    }

    /// Is `point` an eye for `color`?
    ///
    /// All on-board orthogonal neighbors must be friendly. In the middle of the
    /// board at least 3 of the 4 diagonals must be friendly; on the edge, every
    /// on-board diagonal must be.
    pub fn is_point_an_eye(&self, point: Point, color: Player) -> bool {
        if !self.is_on_grid(point) || self.get(point).is_some() {
            return false;
        }
        if self.neighbors(point).iter().any(|&n| self.get(n) != Some(color)) {
            return false;
        }

        let mut friendly_corners = 0;
        let mut off_board_corners = 0;
        for corner in point.corners() {
            if self.is_on_grid(corner) {
                if self.get(corner) == Some(color) {
                    friendly_corners += 1;
                }
            } else {
                off_board_corners += 1;
            }
        }
        if off_board_corners > 0 {
            off_board_corners + friendly_corners == 4
        } else {
            friendly_corners >= 3
        }
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in (1..=self.num_rows).rev() {
            write!(f, "{row:>2} ")?;
            for col in 1..=self.num_cols {
                let ch = match self.get(Point::new(row, col)) {
                    Some(Player::Black) => 'x',
                    Some(Player::White) => 'o',
                    None => '.',
                };
                write!(f, " {ch} ")?;
            }
            writeln!(f)?;
        }
        write!(f, "   ")?;
        for &letter in &COLUMN_LETTERS[..self.num_cols] {
            write!(f, " {} ", letter as char)?;
        }
        writeln!(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(row: usize, col: usize) -> Point {
        Point::new(row, col)
    }

    #[test]
    fn test_is_on_grid() {
        let board = Board::new(5, 5);
        assert!(board.is_on_grid(p(2, 2)));
        assert!(board.is_on_grid(p(1, 1)));
        assert!(board.is_on_grid(p(5, 5)));
        assert!(!board.is_on_grid(p(0, 1)));
        assert!(!board.is_on_grid(p(1, 0)));
        assert!(!board.is_on_grid(p(6, 5)));
    }

    #[test]
    fn test_neighbor_table() {
        let board = Board::new(5, 7);
        assert_eq!(board.neighbors(p(1, 1)).len(), 2);
        assert_eq!(board.neighbors(p(1, 4)).len(), 3);
        assert_eq!(board.neighbors(p(3, 4)).len(), 4);
        assert_eq!(board.neighbors(p(5, 7)).len(), 2);
    }

    #[test]
    fn test_single_stone_liberties() {
        let mut board = Board::new(9, 9);
        board.place_stone(Player::Black, p(5, 5));
        let string = board.get_go_string(p(5, 5)).unwrap();
        assert_eq!(string.num_liberties(), 4);
        assert_eq!(board.get(p(5, 5)), Some(Player::Black));
    }

    #[test]
    fn test_merge_strings() {
        let mut board = Board::new(9, 9);
        board.place_stone(Player::Black, p(5, 5));
        board.place_stone(Player::Black, p(5, 7));
        board.place_stone(Player::Black, p(5, 6));
        let string = board.get_go_string(p(5, 5)).unwrap();
        assert_eq!(string.stones.len(), 3);
        assert_eq!(string.num_liberties(), 8);
        assert!(Rc::ptr_eq(string, board.get_go_string(p(5, 7)).unwrap()));
    }

    #[test]
    fn test_capture_single_stone() {
        let mut board = Board::new(5, 5);
        board.place_stone(Player::White, p(1, 1));
        board.place_stone(Player::Black, p(1, 2));
        assert_eq!(board.get_go_string(p(1, 1)).unwrap().num_liberties(), 1);
        board.place_stone(Player::Black, p(2, 1));
        assert_eq!(board.get(p(1, 1)), None);
        assert_eq!(board.get_go_string(p(1, 2)).unwrap().num_liberties(), 3);
        assert_eq!(board.get_go_string(p(2, 1)).unwrap().num_liberties(), 3);
        assert_eq!(board.zobrist_hash(), board.recompute_hash());
    }

    #[test]
    fn test_clone_is_independent() {
        let mut board = Board::new(5, 5);
        board.place_stone(Player::Black, p(3, 3));
        let mut copy = board.clone();
        copy.place_stone(Player::White, p(3, 4));
        assert_eq!(board.get_go_string(p(3, 3)).unwrap().num_liberties(), 4);
        assert_eq!(copy.get_go_string(p(3, 3)).unwrap().num_liberties(), 3);
        assert_eq!(board.get(p(3, 4)), None);
    }

    #[test]
    fn test_self_capture_in_corner() {
        let mut board = Board::new(5, 5);
        board.place_stone(Player::Black, p(1, 2));
        board.place_stone(Player::Black, p(2, 1));
        assert!(board.is_self_capture(Player::White, p(1, 1)));
        assert!(!board.is_self_capture(Player::Black, p(1, 1)));
        assert!(!board.will_capture(Player::White, p(1, 1)));
    }

    #[test]
    fn test_off_board_queries() {
        let mut board = Board::new(5, 5);
        board.place_stone(Player::White, p(1, 1));
        board.place_stone(Player::White, p(3, 1));
        board.place_stone(Player::White, p(2, 2));
        assert!(board.is_self_capture(Player::Black, p(2, 1)));
        // (1,6) would alias (2,1) in the flat grid; (6,1) is past its end.
        for point in [p(1, 6), p(6, 1), p(0, 3)] {
            assert!(!board.is_self_capture(Player::Black, point));
            assert!(!board.will_capture(Player::Black, point));
            assert!(!board.is_point_an_eye(point, Player::White));
        }
    }

    #[test]
    fn test_capture_rescues_self_capture() {
        let mut board = Board::new(5, 5);
        board.place_stone(Player::Black, p(1, 2));
        board.place_stone(Player::White, p(1, 3));
        board.place_stone(Player::White, p(2, 2));
        board.place_stone(Player::Black, p(2, 1));
        // White at (1,1) has no liberty of its own but captures (1,2).
        assert!(board.will_capture(Player::White, p(1, 1)));
        assert!(!board.is_self_capture(Player::White, p(1, 1)));
    }

    #[test]
    fn test_display() {
        let mut board = Board::new(3, 3);
        board.place_stone(Player::Black, p(1, 1));
        board.place_stone(Player::White, p(3, 3));
        let text = board.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with(" 3"));
        assert!(lines[0].ends_with("o "));
        assert!(lines[2].contains('x'));
        assert!(lines[3].contains('C'));
    }
}
