//! The move-selection interface shared by every player implementation.

use std::rc::Rc;

use crate::error::SearchError;
use crate::position::GameState;
use crate::types::Move;

/// Something that picks a move for the side to move.
///
/// Implementations never modify `state`; the caller applies the returned move.
pub trait Agent {
    fn select_move(&mut self, state: &Rc<GameState>) -> Result<Move, SearchError>;

    /// Short name used in logs and by GTP `name`.
    fn name(&self) -> &str;
}

impl<A: Agent + ?Sized> Agent for Box<A> {
    fn select_move(&mut self, state: &Rc<GameState>) -> Result<Move, SearchError> {
        (**self).select_move(state)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
