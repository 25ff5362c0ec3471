//! GoZero-Rust: a Go engine with rollout-based and oracle-guided tree search.
//!
//! The board is a persistent structure: stone strings are immutable and
//! shared between positions, so applying a move is cheap and never changes an
//! existing [`position::GameState`]. Two searches sit on top of it: plain
//! UCT with random rollouts, and a PUCT search that asks a pluggable
//! move-evaluation oracle for priors and values.
//!
//! ## Modules
//!
//! - [`types`] - Players, points, moves and vertex notation
//! - [`zobrist`] - Hash keys for incremental board hashing
//! - [`board`] - Stone strings, captures and liberties
//! - [`position`] - Game states, legality and superko
//! - [`scoring`] - Area scoring and komi
//! - [`agent`] - The move-selection interface
//! - [`playout`] - Random players and rollouts
//! - [`mcts`] - UCT search
//! - [`encoder`] - Board planes for the oracle
//! - [`dihedral`] - Board symmetries
//! - [`zero`] - PUCT search driven by an oracle
//! - [`simulation`] - Agent-versus-agent games
//! - [`gtp`] - Go Text Protocol front-end
//!
//! ## Example
//!
//! ```
//! use gozero_rust::agent::Agent;
//! use gozero_rust::mcts::{MctsAgent, MctsConfig};
//! use gozero_rust::position::GameState;
//! use gozero_rust::types::{Move, parse_vertex};
//!
//! // Create a new 9x9 game and play a move
//! let game = GameState::new_game(9, 7.5);
//! let game = game.try_apply_move(parse_vertex("E5", 9).unwrap()).unwrap();
//!
//! // Search for White's reply
//! let mut agent = MctsAgent::new(MctsConfig::default().with_rounds(100).with_seed(1));
//! let reply = agent.select_move(&game).unwrap();
//! assert!(game.is_valid_move(reply));
//! assert_ne!(reply, Move::Resign);
//! ```

pub mod agent;
pub mod board;
pub mod constants;
pub mod dihedral;
pub mod encoder;
pub mod error;
pub mod gtp;
pub mod mcts;
pub mod playout;
pub mod position;
pub mod scoring;
pub mod simulation;
pub mod types;
pub mod zero;
pub mod zobrist;
