//! Error types for the engine.

use thiserror::Error;

use crate::types::{Player, Point};

/// Reasons a move cannot be applied to a game state.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveError {
    #[error("illegal move: {0} is off the board")]
    OffBoard(Point),

    #[error("illegal move: {0} is not empty")]
    Occupied(Point),

    #[error("illegal move: {0} is suicide")]
    SelfCapture(Point),

    #[error("illegal move: {0} repeats an earlier position")]
    Superko(Point),

    #[error("illegal move: game is over")]
    GameOver,
}

/// Malformed user input: vertices, colours and command arguments.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid vertex '{0}'")]
    InvalidVertex(String),

    #[error("invalid color '{0}'")]
    InvalidColor(String),

    #[error("unacceptable size '{0}'")]
    InvalidBoardSize(String),

    #[error("invalid komi '{0}'")]
    InvalidKomi(String),

    #[error("missing {0}")]
    MissingArgument(&'static str),

    #[error("{requested} is not to move, {to_move} is")]
    OutOfTurn { requested: Player, to_move: Player },
}

/// Failures of the move-evaluation oracle.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OracleError {
    #[error("oracle unavailable: {0}")]
    Unavailable(String),

    #[error("oracle evaluation failed: {0}")]
    Evaluation(String),

    #[error("oracle returned {got} priors, expected {expected}")]
    BadOutput { expected: usize, got: usize },

    #[error("oracle returned a non-finite value {0}")]
    BadValue(f32),
}

/// Failures of a move-selection call. The game state is never modified.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SearchError {
    #[error(transparent)]
    Oracle(#[from] OracleError),

    #[error("agent chose an illegal move: {0}")]
    IllegalMove(#[from] MoveError),
}
