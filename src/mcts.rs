//! Monte Carlo Tree Search with UCT selection and random rollouts.
//!
//! Each round:
//! 1. Selection: follow the child with the best UCT score until a node still
//!    has unexplored moves or is terminal.
//! 2. Expansion: pop one unexplored move (moves are shuffled once when the
//!    node is created) and add the child for it.
//! 3. Simulation: play a random game from the new node.
//! 4. Backpropagation: record the winner on every node up to the root.
//!
//! Children are owned by their parent; the child-to-parent link is a `Weak`,
//! so dropping the root frees the whole tree.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use log::debug;

use crate::agent::Agent;
use crate::constants::{DEFAULT_ROUNDS, DEFAULT_TEMPERATURE};
use crate::error::SearchError;
use crate::playout::{FastRandomBot, simulate_random_game};
use crate::position::GameState;
use crate::types::{Move, Player};

pub type MctsNodeRef = Rc<RefCell<MctsNode>>;

/// A node in the UCT search tree.
pub struct MctsNode {
    pub game_state: Rc<GameState>,
    pub parent: Weak<RefCell<MctsNode>>,
    /// The move that led here (`None` at the root).
    pub mv: Option<Move>,
    pub children: Vec<MctsNodeRef>,
    /// Rollouts won, indexed by [`Player::index`].
    win_counts: [u32; 2],
    pub num_rollouts: u32,
    legal_moves: Vec<Move>,
    /// Indices into `legal_moves` not yet expanded, in random order.
    unvisited_moves: Vec<usize>,
}

impl MctsNode {
    pub fn new(
        game_state: Rc<GameState>,
        parent: Weak<RefCell<MctsNode>>,
        mv: Option<Move>,
        rng: &mut fastrand::Rng,
    ) -> MctsNodeRef {
        let legal_moves = game_state.legal_moves();
        let mut unvisited_moves: Vec<usize> = (0..legal_moves.len()).collect();
        rng.shuffle(&mut unvisited_moves);
        Rc::new(RefCell::new(MctsNode {
            game_state,
            parent,
            mv,
            children: Vec::new(),
            win_counts: [0, 0],
            num_rollouts: 0,
            legal_moves,
            unvisited_moves,
        }))
    }

    #[inline]
    pub fn can_add_child(&self) -> bool {
        !self.unvisited_moves.is_empty()
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.game_state.is_over()
    }

    pub fn record_win(&mut self, winner: Player) {
        self.win_counts[winner.index()] += 1;
        self.num_rollouts += 1;
    }

    /// Fraction of rollouts through this node won by `player`, in [0, 1].
    pub fn winning_frac(&self, player: Player) -> f64 {
        if self.num_rollouts == 0 {
            return 0.0;
        }
        self.win_counts[player.index()] as f64 / self.num_rollouts as f64
    }
}

/// Expand one unexplored move of `node` and return the new child.
///
/// Returns `None` if every move has already been expanded.
pub fn add_random_child(node: &MctsNodeRef, rng: &mut fastrand::Rng) -> Option<MctsNodeRef> {
    let (new_move, new_state) = {
        let mut n = node.borrow_mut();
        let move_index = n.unvisited_moves.pop()?;
        let new_move = n.legal_moves[move_index];
        (new_move, n.game_state.apply_move(new_move))
    };
    let child = MctsNode::new(new_state, Rc::downgrade(node), Some(new_move), rng);
    node.borrow_mut().children.push(Rc::clone(&child));
    Some(child)
}

/// UCT score of `child` from the point of view of `player`, the side moving at the parent.
fn uct_score(child: &MctsNode, player: Player, log_rollouts: f64, temperature: f64) -> f64 {
    let exploration = (log_rollouts / child.num_rollouts as f64).sqrt();
    child.winning_frac(player) + temperature * exploration
}

/// Pick the child with the highest UCT score.
fn select_child(node: &MctsNodeRef, temperature: f64) -> Option<MctsNodeRef> {
    let n = node.borrow();
    let player = n.game_state.next_player;
    let total_rollouts: u32 = n.children.iter().map(|c| c.borrow().num_rollouts).sum();
    let log_rollouts = (total_rollouts as f64).ln();

    n.children
        .iter()
        .max_by(|a, b| {
            let a = uct_score(&a.borrow(), player, log_rollouts, temperature);
            let b = uct_score(&b.borrow(), player, log_rollouts, temperature);
            a.partial_cmp(&b).unwrap_or(std::cmp::Ordering::Equal)
        })
        .cloned()
}

/// Settings for [`MctsAgent`].
#[derive(Debug, Clone)]
pub struct MctsConfig {
    /// Search rounds per move.
    pub num_rounds: usize,
    /// Exploration weight in the UCT formula.
    pub temperature: f64,
    /// Random seed for deterministic behavior.
    pub seed: Option<u64>,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            num_rounds: DEFAULT_ROUNDS,
            temperature: DEFAULT_TEMPERATURE,
            seed: None,
        }
    }
}

impl MctsConfig {
    pub fn with_rounds(mut self, num_rounds: usize) -> Self {
        self.num_rounds = num_rounds;
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Plain UCT search agent with random rollouts.
pub struct MctsAgent {
    config: MctsConfig,
    rng: fastrand::Rng,
    rollout_bot: FastRandomBot,
}

impl MctsAgent {
    pub fn new(config: MctsConfig) -> Self {
        let mut rng = match config.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };
        let rollout_bot = FastRandomBot::new(rng.fork());
        Self {
            config,
            rng,
            rollout_bot,
        }
    }

    pub fn config(&self) -> &MctsConfig {
        &self.config
    }

    /// Grow a fresh tree rooted at `state` and return its root.
    pub fn search(&mut self, state: &Rc<GameState>) -> MctsNodeRef {
        let root = MctsNode::new(Rc::clone(state), Weak::new(), None, &mut self.rng);

        for _ in 0..self.config.num_rounds {
            let mut node = Rc::clone(&root);
            loop {
                let descend = {
                    let n = node.borrow();
                    !n.can_add_child() && !n.is_terminal()
                };
                if !descend {
                    break;
                }
                match select_child(&node, self.config.temperature) {
                    Some(child) => node = child,
                    None => break,
                }
            }

            if let Some(child) = add_random_child(&node, &mut self.rng) {
                node = child;
            }

            let game_state = Rc::clone(&node.borrow().game_state);
            let winner = simulate_random_game(&game_state, &mut self.rollout_bot);

            let mut current = Some(node);
            while let Some(n) = current {
                n.borrow_mut().record_win(winner);
                current = n.borrow().parent.upgrade();
            }
        }

        dump_children(&root);
        root
    }

    /// The root child with the best win fraction for the side to move.
    pub fn best_move(root: &MctsNodeRef) -> Move {
        let r = root.borrow();
        let player = r.game_state.next_player;
        let mut best_move = Move::Pass;
        let mut best_pct = -1.0;
        for child in &r.children {
            let c = child.borrow();
            let pct = c.winning_frac(player);
            if pct > best_pct {
                best_pct = pct;
                if let Some(mv) = c.mv {
                    best_move = mv;
                }
            }
        }
        best_move
    }
}

impl Agent for MctsAgent {
    fn select_move(&mut self, state: &Rc<GameState>) -> Result<Move, SearchError> {
        let root = self.search(state);
        Ok(Self::best_move(&root))
    }

    fn name(&self) -> &str {
        "mcts"
    }
}

/// Log the statistics of the root's children.
pub fn dump_children(root: &MctsNodeRef) {
    let r = root.borrow();
    let player = r.game_state.next_player;
    debug!(
        "mcts: {} rollouts, {} children",
        r.num_rollouts,
        r.children.len()
    );
    for child in &r.children {
        let c = child.borrow();
        if let Some(mv) = c.mv {
            debug!(
                "move {} rollouts={} winrate={:.3}",
                mv,
                c.num_rollouts,
                c.winning_frac(player)
            );
        }
    }
}
