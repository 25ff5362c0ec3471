//! Play complete games between two agents.

use std::rc::Rc;

use log::{debug, info};

use crate::agent::Agent;
use crate::error::SearchError;
use crate::position::GameState;
use crate::scoring::GameResult;
use crate::types::{Move, Player};

/// Outcome of one simulated game.
#[derive(Clone, Debug)]
pub struct GameRecord {
    pub winner: Player,
    pub num_moves: usize,
    /// Area score of the final board.
    pub result: GameResult,
    pub moves: Vec<Move>,
}

/// Play `black` against `white` on an empty board until the game ends or
/// `max_moves` moves have been played, then score the final position.
///
/// Every move is validated; an agent choosing an illegal move ends the game
/// with [`SearchError::IllegalMove`].
pub fn simulate_game(
    board_size: usize,
    komi: f32,
    black: &mut dyn Agent,
    white: &mut dyn Agent,
    max_moves: usize,
) -> Result<GameRecord, SearchError> {
    let mut game = GameState::new_game(board_size, komi);

    while game.num_moves() < max_moves && !game.is_over() {
        let agent: &mut dyn Agent = match game.next_player {
            Player::Black => &mut *black,
            Player::White => &mut *white,
        };
        let mv = agent.select_move(&game)?;
        debug!("{} ({}) plays {}", game.next_player, agent.name(), mv);
        game = game.try_apply_move(mv)?;
    }

    let record = record_game(&game);
    info!(
        "{} moves, {} wins ({})",
        record.num_moves, record.winner, record.result
    );
    Ok(record)
}

fn record_game(game: &Rc<GameState>) -> GameRecord {
    let result = game.game_result();
    GameRecord {
        winner: game.winner().unwrap_or_else(|| result.winner()),
        num_moves: game.num_moves(),
        result,
        moves: game.move_history(),
    }
}
