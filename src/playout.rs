//! Random players and random game simulation.
//!
//! Both bots play uniformly among legal moves that do not fill one of their
//! own eyes, and pass when no such move exists. [`FastRandomBot`] tries points
//! in shuffled order and stops at the first acceptable one, which is what the
//! rollouts use.

use std::rc::Rc;

use crate::agent::Agent;
use crate::constants::MAX_GAME_LEN_FACTOR;
use crate::error::SearchError;
use crate::position::GameState;
use crate::types::{Move, Player, Point};

/// Is `point` a legal play for the side to move that does not fill its own eye?
fn is_candidate(state: &GameState, point: Point) -> bool {
    state.is_valid_move(Move::Play(point)) && !state.board.is_point_an_eye(point, state.next_player)
}

/// Picks uniformly among all candidate moves.
pub struct RandomBot {
    rng: fastrand::Rng,
}

impl RandomBot {
    pub fn new(rng: fastrand::Rng) -> Self {
        Self { rng }
    }

    pub fn choose(&mut self, state: &GameState) -> Move {
        let candidates: Vec<Point> = state.board.points().filter(|&p| is_candidate(state, p)).collect();
        if candidates.is_empty() {
            return Move::Pass;
        }
        Move::Play(candidates[self.rng.usize(..candidates.len())])
    }
}

impl Agent for RandomBot {
    fn select_move(&mut self, state: &Rc<GameState>) -> Result<Move, SearchError> {
        Ok(self.choose(state))
    }

    fn name(&self) -> &str {
        "random"
    }
}

/// Scans points in random order and plays the first candidate.
///
/// The point list is cached per board shape.
pub struct FastRandomBot {
    rng: fastrand::Rng,
    cached_dim: (usize, usize),
    point_cache: Vec<Point>,
}

impl FastRandomBot {
    pub fn new(rng: fastrand::Rng) -> Self {
        Self {
            rng,
            cached_dim: (0, 0),
            point_cache: Vec::new(),
        }
    }

    fn update_cache(&mut self, state: &GameState) {
        let dim = (state.board.num_rows, state.board.num_cols);
        if dim != self.cached_dim {
            self.cached_dim = dim;
            self.point_cache = state.board.points().collect();
        }
    }

    pub fn choose(&mut self, state: &GameState) -> Move {
        self.update_cache(state);
        self.rng.shuffle(&mut self.point_cache);
        self.point_cache
            .iter()
            .copied()
            .find(|&p| is_candidate(state, p))
            .map_or(Move::Pass, Move::Play)
    }
}

impl Agent for FastRandomBot {
    fn select_move(&mut self, state: &Rc<GameState>) -> Result<Move, SearchError> {
        Ok(self.choose(state))
    }

    fn name(&self) -> &str {
        "fast-random"
    }
}

/// Play random moves from `state` until the game ends and return the winner.
///
/// Games that run past 3 x area moves are scored as they stand.
pub fn simulate_random_game(state: &Rc<GameState>, bot: &mut FastRandomBot) -> Player {
    let max_moves = state.num_moves()
        + MAX_GAME_LEN_FACTOR * state.board.num_rows * state.board.num_cols;
    let mut game = Rc::clone(state);
    while !game.is_over() && game.num_moves() < max_moves {
        let mv = bot.choose(&game);
        game = game.apply_move(mv);
    }
    game.winner().unwrap_or_else(|| game.game_result().winner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_bot_plays_legal_moves() {
        let mut bot = RandomBot::new(fastrand::Rng::with_seed(1));
        let mut game = GameState::new_game(5, 7.5);
        for _ in 0..20 {
            let mv = bot.choose(&game);
            assert!(game.is_valid_move(mv), "{mv} should be legal");
            game = game.apply_move(mv);
            if game.is_over() {
                break;
            }
        }
    }

    #[test]
    fn test_fast_random_bot_never_fills_own_eye() {
        // Black owns the corner eye at (1,1).
        let mut board = crate::board::Board::new(5, 5);
        for p in [Point::new(1, 2), Point::new(2, 1), Point::new(2, 2)] {
            board.place_stone(Player::Black, p);
        }
        let state = GameState::from_board(board, Player::Black, 7.5);
        let mut bot = FastRandomBot::new(fastrand::Rng::with_seed(3));
        for _ in 0..50 {
            assert_ne!(bot.choose(&state), Move::play(1, 1));
        }
    }

    #[test]
    fn test_fast_random_bot_passes_without_candidates() {
        let mut board = crate::board::Board::new(2, 2);
        board.place_stone(Player::Black, Point::new(1, 1));
        board.place_stone(Player::Black, Point::new(2, 2));
        // Both empty points are suicide for White.
        let state = GameState::from_board(board, Player::White, 7.5);
        let mut bot = FastRandomBot::new(fastrand::Rng::with_seed(5));
        assert_eq!(bot.choose(&state), Move::Pass);
    }

    #[test]
    fn test_simulate_random_game_finishes() {
        let state = GameState::new_game(5, 7.5);
        let mut bot = FastRandomBot::new(fastrand::Rng::with_seed(11));
        let winner = simulate_random_game(&state, &mut bot);
        assert!(matches!(winner, Player::Black | Player::White));
    }
}
