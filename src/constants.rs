//! Constants for board geometry, search parameters, and scoring.
//!
//! Boards are sized at runtime, but the default size used by the CLI and the
//! GTP front-end is chosen with Cargo features:
//! - `board9x9` (default): 9x9 board
//! - `board13x13`: 13x13 board
//! - `board19x19`: 19x19 board
//!
//! ```sh
//! cargo build                                                # 9x9 (default)
//! cargo build --no-default-features --features board19x19   # 19x19
//! ```

// =============================================================================
// Board Geometry
// =============================================================================

/// Default board size (NxN) for new games.
#[cfg(feature = "board9x9")]
pub const DEFAULT_BOARD_SIZE: usize = 9;

#[cfg(feature = "board13x13")]
pub const DEFAULT_BOARD_SIZE: usize = 13;

#[cfg(feature = "board19x19")]
pub const DEFAULT_BOARD_SIZE: usize = 19;

#[cfg(any(
    all(feature = "board9x9", feature = "board13x13"),
    all(feature = "board9x9", feature = "board19x19"),
    all(feature = "board13x13", feature = "board19x19"),
))]
compile_error!("Enable only one of the 'board9x9', 'board13x13' and 'board19x19' features");

#[cfg(not(any(feature = "board9x9", feature = "board13x13", feature = "board19x19")))]
compile_error!("Must enable exactly one board size feature: 'board9x9', 'board13x13' or 'board19x19'");

/// Largest supported board dimension. The Zobrist table is sized for it.
pub const MAX_BOARD_SIZE: usize = 19;

/// Column letters used by vertex notation ('I' is skipped).
pub const COLUMN_LETTERS: &[u8] = b"ABCDEFGHJKLMNOPQRST";

/// Rollouts stop after this many moves per point of board area.
pub const MAX_GAME_LEN_FACTOR: usize = 3;

// =============================================================================
// Scoring
// =============================================================================

/// Default compensation given to White.
pub const DEFAULT_KOMI: f32 = 7.5;

// =============================================================================
// UCT Search Parameters
// =============================================================================

/// Default number of search rounds per move.
pub const DEFAULT_ROUNDS: usize = 800;

/// Exploration weight in the UCT formula.
pub const DEFAULT_TEMPERATURE: f64 = 1.5;

// =============================================================================
// PUCT Search Parameters
// =============================================================================

/// Exploration weight `c` in the PUCT formula.
pub const DEFAULT_C_PUCT: f32 = 2.0;

/// Area of the board the noise and sampling parameters were tuned on (19x19).
pub const REFERENCE_AREA: usize = 361;

/// Dirichlet concentration at the reference area with one legal move per point.
pub const DIRICHLET_ALPHA_REF: f64 = 0.03;

/// Weight of the Dirichlet noise when blended into the root priors.
pub const DIRICHLET_WEIGHT: f32 = 0.25;

/// Fraction of the board area during which final moves are sampled by visit count.
pub const SAMPLE_MOVES_FRACTION: f64 = 30.0 / REFERENCE_AREA as f64;

// =============================================================================
// Encoder Planes
// =============================================================================

/// Number of input planes produced by the simple encoder.
pub const NUM_PLANES: usize = 11;

/// Plane set when White is to move (the mover receives komi).
pub const PLANE_WHITE_TO_MOVE: usize = 8;

/// Plane set when Black is to move (the opponent receives komi).
pub const PLANE_BLACK_TO_MOVE: usize = 9;

/// Plane marking empty points where a play would repeat an earlier position.
pub const PLANE_SUPERKO: usize = 10;
