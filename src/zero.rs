//! Oracle-guided tree search (PUCT).
//!
//! Every node asks an [`Evaluator`] for a value and move priors the first time
//! its position is reached. Each round walks down existing children by
//! PUCT score, creates exactly one new child, and backs its value up the path
//! with the sign flipped at every level, since values are always from the
//! point of view of the side to move at that node.
//!
//! The root's priors can be blended with Dirichlet noise, and positions are
//! shown to the oracle under a random board symmetry.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use log::{debug, warn};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand_distr::{Distribution, Gamma};

use crate::agent::Agent;
use crate::constants::{
    DEFAULT_C_PUCT, DEFAULT_ROUNDS, DIRICHLET_ALPHA_REF, DIRICHLET_WEIGHT, REFERENCE_AREA,
    SAMPLE_MOVES_FRACTION,
};
use crate::dihedral::Dihedral;
use crate::encoder::{Planes, SimpleEncoder};
use crate::error::{OracleError, SearchError};
use crate::position::GameState;
use crate::types::Move;

/// Oracle output for one position.
#[derive(Clone, Debug, PartialEq)]
pub struct Evaluation {
    /// Expected outcome for the side to move, in [-1, 1].
    pub value: f32,
    /// Prior per move index (see [`SimpleEncoder::encode_move`]).
    pub priors: Vec<f32>,
}

/// A move-evaluation oracle.
pub trait Evaluator {
    fn evaluate(&mut self, planes: &Planes) -> Result<Evaluation, OracleError>;
}

impl<E: Evaluator + ?Sized> Evaluator for Box<E> {
    fn evaluate(&mut self, planes: &Planes) -> Result<Evaluation, OracleError> {
        (**self).evaluate(planes)
    }
}

/// Value 0 and the same prior for every move.
#[derive(Clone, Copy, Debug, Default)]
pub struct UniformEvaluator;

impl Evaluator for UniformEvaluator {
    fn evaluate(&mut self, planes: &Planes) -> Result<Evaluation, OracleError> {
        let num_moves = planes.rows * planes.cols + 1;
        Ok(Evaluation {
            value: 0.0,
            priors: vec![1.0 / num_moves as f32; num_moves],
        })
    }
}

/// Statistics of one candidate move at a node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Branch {
    pub prior: f32,
    pub visit_count: u32,
    pub total_value: f32,
}

impl Branch {
    pub fn new(prior: f32) -> Self {
        Branch {
            prior,
            visit_count: 0,
            total_value: 0.0,
        }
    }
}

pub type ZeroNodeRef = Rc<RefCell<ZeroNode>>;

pub struct ZeroNode {
    pub game_state: Rc<GameState>,
    /// Value for the side to move here; exact (+1 / -1) for finished games.
    pub value: f32,
    pub parent: Weak<RefCell<ZeroNode>>,
    pub last_move: Option<Move>,
    /// Starts at 1 so the exploration term is non-zero on the first visit.
    pub total_visit_count: u32,
    pub branches: BTreeMap<Move, Branch>,
    pub children: BTreeMap<Move, ZeroNodeRef>,
    pub terminal: bool,
}

impl ZeroNode {
    /// Build a node, keeping only priors of legal moves.
    pub fn new(
        game_state: Rc<GameState>,
        value: f32,
        priors: impl IntoIterator<Item = (Move, f32)>,
        parent: Weak<RefCell<ZeroNode>>,
        last_move: Option<Move>,
    ) -> Self {
        let branches = priors
            .into_iter()
            .filter(|&(mv, _)| game_state.is_valid_move(mv))
            .map(|(mv, p)| (mv, Branch::new(p)))
            .collect();

        let terminal = game_state.is_over();
        let value = match game_state.winner() {
            Some(winner) if winner == game_state.next_player => 1.0,
            Some(_) => -1.0,
            None => value,
        };

        ZeroNode {
            game_state,
            value,
            parent,
            last_move,
            total_visit_count: 1,
            branches,
            children: BTreeMap::new(),
            terminal,
        }
    }

    pub fn record_visit(&mut self, mv: Option<Move>, value: f32) {
        self.total_visit_count += 1;
        if let Some(mv) = mv {
            let branch = self.branches.get_mut(&mv);
            debug_assert!(branch.is_some(), "visit recorded for unknown move {mv}");
            if let Some(branch) = branch {
                branch.visit_count += 1;
                branch.total_value += value;
            }
        }
    }

    /// Mean value of the visits through `mv`; 0 for an unvisited branch.
    pub fn expected_value(&self, mv: Move) -> f32 {
        match self.branches.get(&mv) {
            Some(b) if b.visit_count > 0 => b.total_value / b.visit_count as f32,
            _ => 0.0,
        }
    }

    pub fn prior(&self, mv: Move) -> f32 {
        self.branches.get(&mv).map_or(0.0, |b| b.prior)
    }

    pub fn visit_count(&self, mv: Move) -> u32 {
        self.branches.get(&mv).map_or(0, |b| b.visit_count)
    }

    pub fn get_child(&self, mv: Move) -> Option<ZeroNodeRef> {
        self.children.get(&mv).cloned()
    }

    /// The branch with the highest PUCT score, or `None` if there are no branches.
    pub fn select_branch(&self, c_puct: f32) -> Option<Move> {
        let total_sqrt = (self.total_visit_count as f32).sqrt();
        let score = |mv: Move, b: &Branch| {
            self.expected_value(mv) + c_puct * b.prior * total_sqrt / (1 + b.visit_count) as f32
        };
        let mut best: Option<(Move, f32)> = None;
        for (&mv, branch) in &self.branches {
            let s = score(mv, branch);
            if best.is_none_or(|(_, best_score)| s > best_score) {
                best = Some((mv, s));
            }
        }
        best.map(|(mv, _)| mv)
    }
}

/// Settings for [`ZeroAgent`].
#[derive(Debug, Clone)]
pub struct ZeroConfig {
    pub num_rounds: usize,
    /// Exploration weight `c` in the PUCT score.
    pub c_puct: f32,
    /// Dirichlet concentration at the reference board area.
    pub dirichlet_alpha_ref: f64,
    pub dirichlet_weight: f32,
    /// Blend Dirichlet noise into the root priors.
    pub root_noise: bool,
    /// Always play the most visited move.
    pub greedy: bool,
    /// Moves are sampled by visit count while fewer than this fraction of
    /// the board area have been played, unless `greedy` is set.
    pub sample_fraction: f64,
    /// Show positions to the oracle under a random symmetry.
    pub use_symmetries: bool,
    pub seed: Option<u64>,
}

impl Default for ZeroConfig {
    fn default() -> Self {
        Self {
            num_rounds: DEFAULT_ROUNDS,
            c_puct: DEFAULT_C_PUCT,
            dirichlet_alpha_ref: DIRICHLET_ALPHA_REF,
            dirichlet_weight: DIRICHLET_WEIGHT,
            root_noise: true,
            greedy: false,
            sample_fraction: SAMPLE_MOVES_FRACTION,
            use_symmetries: true,
            seed: None,
        }
    }
}

impl ZeroConfig {
    pub fn with_rounds(mut self, num_rounds: usize) -> Self {
        self.num_rounds = num_rounds;
        self
    }

    pub fn with_c_puct(mut self, c_puct: f32) -> Self {
        self.c_puct = c_puct;
        self
    }

    pub fn with_dirichlet(mut self, alpha_ref: f64, weight: f32) -> Self {
        self.dirichlet_alpha_ref = alpha_ref;
        self.dirichlet_weight = weight;
        self
    }

    pub fn with_root_noise(mut self, root_noise: bool) -> Self {
        self.root_noise = root_noise;
        self
    }

    pub fn with_greedy(mut self, greedy: bool) -> Self {
        self.greedy = greedy;
        self
    }

    pub fn with_sample_fraction(mut self, sample_fraction: f64) -> Self {
        self.sample_fraction = sample_fraction;
        self
    }

    pub fn with_symmetries(mut self, use_symmetries: bool) -> Self {
        self.use_symmetries = use_symmetries;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// PUCT search agent driven by an [`Evaluator`].
pub struct ZeroAgent<E: Evaluator> {
    evaluator: E,
    encoder: SimpleEncoder,
    config: ZeroConfig,
    rng: fastrand::Rng,
}

impl<E: Evaluator> ZeroAgent<E> {
    pub fn new(evaluator: E, encoder: SimpleEncoder, config: ZeroConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };
        Self {
            evaluator,
            encoder,
            config,
            rng,
        }
    }

    pub fn config(&self) -> &ZeroConfig {
        &self.config
    }

    pub fn encoder(&self) -> &SimpleEncoder {
        &self.encoder
    }

    /// Switch encoders when the board shape changes between games.
    fn fit_encoder(&mut self, state: &GameState) {
        let (rows, cols) = (state.board.num_rows, state.board.num_cols);
        if (self.encoder.rows(), self.encoder.cols()) != (rows, cols) {
            debug!("zero: resizing encoder to {rows}x{cols}");
            self.encoder = SimpleEncoder::new(rows, cols);
        }
    }

    /// Query the oracle and check its output.
    fn evaluate(&mut self, state: &GameState) -> Result<(f32, Vec<f32>), OracleError> {
        let (rows, cols) = (self.encoder.rows(), self.encoder.cols());
        let symmetry = if self.config.use_symmetries {
            Dihedral::random(&mut self.rng, rows, cols)
        } else {
            Dihedral::IDENTITY
        };
        let planes = symmetry.forward_planes(&self.encoder.encode(state));
        let Evaluation { value, priors } = self.evaluator.evaluate(&planes)?;

        let expected = self.encoder.num_moves();
        if priors.len() != expected {
            return Err(OracleError::BadOutput {
                expected,
                got: priors.len(),
            });
        }
        if !value.is_finite() {
            return Err(OracleError::BadValue(value));
        }
        Ok((value.clamp(-1.0, 1.0), symmetry.inverse_priors(&priors, rows, cols)))
    }

    fn create_node(
        &mut self,
        state: Rc<GameState>,
        parent: Weak<RefCell<ZeroNode>>,
        last_move: Option<Move>,
    ) -> Result<ZeroNodeRef, OracleError> {
        let (value, priors) = self.evaluate(&state)?;
        let encoder = &self.encoder;
        let priors = priors
            .into_iter()
            .enumerate()
            .map(|(index, p)| (encoder.decode_move_index(index), p));
        let node = ZeroNode::new(state, value, priors, parent, last_move);
        Ok(Rc::new(RefCell::new(node)))
    }

    /// Blend Dirichlet noise into the priors of `root`.
    fn add_root_noise(&mut self, root: &mut ZeroNode) {
        let n = root.branches.len();
        if n == 0 {
            return;
        }
        let alpha = self.config.dirichlet_alpha_ref * REFERENCE_AREA as f64 / n as f64;
        let Ok(gamma) = Gamma::new(alpha, 1.0) else {
            warn!("zero: invalid Dirichlet alpha {alpha}, skipping root noise");
            return;
        };
        let mut rng = SmallRng::seed_from_u64(self.rng.u64(..));
        let raw: Vec<f64> = (0..n).map(|_| gamma.sample(&mut rng)).collect();
        let sum: f64 = raw.iter().sum();
        if !(sum > 0.0 && sum.is_finite()) {
            return;
        }

        let weight = self.config.dirichlet_weight;
        for (branch, x) in root.branches.values_mut().zip(raw) {
            branch.prior = (1.0 - weight) * branch.prior + weight * (x / sum) as f32;
        }
    }

    /// Grow a fresh tree rooted at `state` and return its root.
    ///
    /// Oracle failures abort the search; `state` is never modified.
    pub fn search(&mut self, state: &Rc<GameState>) -> Result<ZeroNodeRef, SearchError> {
        self.fit_encoder(state);
        let root = self.create_node(Rc::clone(state), Weak::new(), None)?;
        if self.config.root_noise {
            self.add_root_noise(&mut root.borrow_mut());
        }

        let c_puct = self.config.c_puct;
        for _ in 0..self.config.num_rounds {
            let mut node = Rc::clone(&root);
            let mut next_move = node.borrow().select_branch(c_puct);
            while let Some(child) = next_move.and_then(|mv| node.borrow().get_child(mv)) {
                node = child;
                next_move = node.borrow().select_branch(c_puct);
            }

            // Either expand one new child, or back up the value of a finished game.
            let mut value = match next_move {
                Some(mv) => {
                    let new_state = node.borrow().game_state.apply_move(mv);
                    let child = self.create_node(new_state, Rc::downgrade(&node), Some(mv))?;
                    let value = -child.borrow().value;
                    node.borrow_mut().children.insert(mv, child);
                    value
                }
                None => node.borrow().value,
            };

            let mut mv = next_move;
            let mut current = Some(node);
            while let Some(n) = current {
                current = {
                    let mut n = n.borrow_mut();
                    n.record_visit(mv, value);
                    mv = n.last_move;
                    n.parent.upgrade()
                };
                value = -value;
            }
        }

        dump_root(&root.borrow());
        Ok(root)
    }

    /// Visit count per move index at the root; the training target shape.
    pub fn visit_counts(&self, root: &ZeroNodeRef) -> Vec<u32> {
        let mut counts = vec![0; self.encoder.num_moves()];
        for (&mv, branch) in &root.borrow().branches {
            if let Some(index) = self.encoder.encode_move(mv) {
                counts[index] = branch.visit_count;
            }
        }
        counts
    }

    /// Number of opening moves chosen by sampling rather than greedily.
    fn sampled_moves(&self, state: &GameState) -> usize {
        let area = state.board.num_rows * state.board.num_cols;
        (self.config.sample_fraction * area as f64).round() as usize
    }

    fn choose_move(&mut self, root: &ZeroNode) -> Move {
        let sample = !self.config.greedy && root.game_state.num_moves() < self.sampled_moves(&root.game_state);
        let total: u32 = root.branches.values().map(|b| b.visit_count).sum();
        if sample && total > 0 {
            let mut remaining = self.rng.u32(..total);
            for (&mv, branch) in &root.branches {
                if remaining < branch.visit_count {
                    return mv;
                }
                remaining -= branch.visit_count;
            }
        }

        let mut best: Option<(Move, u32)> = None;
        for (&mv, branch) in &root.branches {
            if best.is_none_or(|(_, visits)| branch.visit_count > visits) {
                best = Some((mv, branch.visit_count));
            }
        }
        best.map_or(Move::Pass, |(mv, _)| mv)
    }
}

impl<E: Evaluator> Agent for ZeroAgent<E> {
    fn select_move(&mut self, state: &Rc<GameState>) -> Result<Move, SearchError> {
        let root = self.search(state)?;
        let mv = self.choose_move(&root.borrow());
        Ok(mv)
    }

    fn name(&self) -> &str {
        "zero"
    }
}

fn dump_root(root: &ZeroNode) {
    debug!(
        "zero: {} visits, {} branches, value {:.3}",
        root.total_visit_count,
        root.branches.len(),
        root.value
    );
    for (mv, branch) in &root.branches {
        if branch.visit_count > 0 {
            debug!(
                "move {} visits={} prior={:.3} q={:.3}",
                mv,
                branch.visit_count,
                branch.prior,
                root.expected_value(*mv)
            );
        }
    }
}
