//! Game states: an immutable, linked chain of positions.
//!
//! Each [`GameState`] owns a board snapshot, the side to move and the move that
//! produced it, and shares its predecessor through an `Rc`. Applying a move
//! never touches an existing state; it clones the board (pointer copies only)
//! and plays on the clone.
//!
//! Legality covers:
//! - Points off the board or already occupied
//! - Self-capture (suicide)
//! - Positional superko, checked only for capturing moves since nothing else
//!   can recreate an earlier position

use std::rc::Rc;

use crate::board::Board;
use crate::error::MoveError;
use crate::scoring::{GameResult, Komi};
use crate::types::{Move, Player};

/// A position in a game, linked to the position before it.
#[derive(Debug)]
pub struct GameState {
    pub board: Board,
    pub next_player: Player,
    previous_state: Option<Rc<GameState>>,
    last_move: Option<Move>,
    /// (side to move, board hash) of every earlier position in this game.
    previous_hashes: Vec<(Player, u64)>,
    num_moves: usize,
    komi: Komi,
}

impl GameState {
    /// Start a new game on an empty `board_size` x `board_size` board with Black to move.
    pub fn new_game(board_size: usize, komi: f32) -> Rc<GameState> {
        Self::from_board(Board::new(board_size, board_size), Player::Black, komi)
    }

    /// Start a game from an arbitrary board. The board has no history.
    pub fn from_board(board: Board, next_player: Player, komi: f32) -> Rc<GameState> {
        Rc::new(GameState {
            board,
            next_player,
            previous_state: None,
            last_move: None,
            previous_hashes: Vec::new(),
            num_moves: 0,
            komi: Komi::from_points(komi),
        })
    }

    /// Apply a move without checking legality.
    ///
    /// Callers must check [`GameState::is_valid_move`] first, or use
    /// [`GameState::try_apply_move`].
    pub fn apply_move(self: &Rc<Self>, mv: Move) -> Rc<GameState> {
        let mut board = self.board.clone();
        if let Move::Play(point) = mv {
            board.place_stone(self.next_player, point);
        }

        let mut previous_hashes = Vec::with_capacity(self.previous_hashes.len() + 1);
        previous_hashes.extend_from_slice(&self.previous_hashes);
        previous_hashes.push((self.next_player, self.board.zobrist_hash()));

        Rc::new(GameState {
            board,
            next_player: self.next_player.other(),
            previous_state: Some(Rc::clone(self)),
            last_move: Some(mv),
            previous_hashes,
            num_moves: self.num_moves + 1,
            komi: self.komi,
        })
    }

    /// Apply a move after checking that it is legal.
    pub fn try_apply_move(self: &Rc<Self>, mv: Move) -> Result<Rc<GameState>, MoveError> {
        self.check_move(mv)?;
        Ok(self.apply_move(mv))
    }

    #[inline]
    pub fn last_move(&self) -> Option<Move> {
        self.last_move
    }

    #[inline]
    pub fn previous_state(&self) -> Option<&Rc<GameState>> {
        self.previous_state.as_ref()
    }

    /// Number of moves played since the start of the game.
    #[inline]
    pub fn num_moves(&self) -> usize {
        self.num_moves
    }

    #[inline]
    pub fn komi(&self) -> Komi {
        self.komi
    }

    /// Every earlier (side to move, hash) pair, oldest first.
    pub fn previous_hashes(&self) -> &[(Player, u64)] {
        &self.previous_hashes
    }

    /// Moves played so far, oldest first.
    pub fn move_history(&self) -> Vec<Move> {
        let mut moves = Vec::with_capacity(self.num_moves);
        let mut current = Some(self);
        while let Some(state) = current {
            moves.extend(state.last_move);
            current = state.previous_state.as_deref();
        }
        moves.reverse();
        moves
    }

    /// The game ends on a resignation or on two consecutive passes.
    pub fn is_over(&self) -> bool {
        match self.last_move {
            None => false,
            Some(Move::Resign) => true,
            Some(Move::Pass) => self
                .previous_state
                .as_ref()
                .and_then(|prev| prev.last_move)
                .is_some_and(Move::is_pass),
            Some(Move::Play(_)) => false,
        }
    }

    /// Would `player` playing `mv` leave its own string without liberties?
    pub fn is_move_self_capture(&self, player: Player, mv: Move) -> bool {
        match mv {
            Move::Play(point) => self.board.is_self_capture(player, point),
            _ => false,
        }
    }

    /// Would `player` playing `mv` recreate an earlier (side to move, board) pair?
    pub fn does_move_violate_ko(&self, player: Player, mv: Move) -> bool {
        let Move::Play(point) = mv else {
            return false;
        };
        if !self.board.will_capture(player, point) {
            return false;
        }
        let mut next_board = self.board.clone();
        next_board.place_stone(player, point);
        let next_situation = (player.other(), next_board.zobrist_hash());
        self.previous_hashes.contains(&next_situation)
    }

    /// Check a move for the side to move, reporting why it is illegal.
    pub fn check_move(&self, mv: Move) -> Result<(), MoveError> {
        if self.is_over() {
            return Err(MoveError::GameOver);
        }
        let Move::Play(point) = mv else {
            return Ok(());
        };
        if !self.board.is_on_grid(point) {
            return Err(MoveError::OffBoard(point));
        }
        if self.board.get(point).is_some() {
            return Err(MoveError::Occupied(point));
        }
        if self.is_move_self_capture(self.next_player, mv) {
            return Err(MoveError::SelfCapture(point));
        }
        if self.does_move_violate_ko(self.next_player, mv) {
            return Err(MoveError::Superko(point));
        }
        Ok(())
    }

    #[inline]
    pub fn is_valid_move(&self, mv: Move) -> bool {
        self.check_move(mv).is_ok()
    }

    /// All legal plays plus pass. Resignation is never listed.
    pub fn legal_moves(&self) -> Vec<Move> {
        if self.is_over() {
            return Vec::new();
        }
        let mut moves: Vec<Move> = self
            .board
            .points()
            .map(Move::Play)
            .filter(|&mv| self.is_valid_move(mv))
            .collect();
        moves.push(Move::Pass);
        moves
    }

    /// Area score of the current board.
    pub fn game_result(&self) -> GameResult {
        GameResult::from_board(&self.board, self.komi)
    }

    /// Winner of a finished game; `None` while the game is still running.
    pub fn winner(&self) -> Option<Player> {
        if !self.is_over() {
            return None;
        }
        if self.last_move == Some(Move::Resign) {
            // The resigner moved last, so the side to move won.
            return Some(self.next_player);
        }
        Some(self.game_result().winner())
    }
}
