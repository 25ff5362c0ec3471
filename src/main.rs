//! GoZero-Rust: a Go engine with UCT and PUCT tree search.
//!
//! ## Usage
//!
//! - `gozero-rust` - Show a demo
//! - `gozero-rust gtp` - Start GTP server for GUI integration
//! - `gozero-rust demo` - Run the search demo
//! - `gozero-rust selfplay` - Play agents against each other
//!
//! Logs go to stderr; set `RUST_LOG` or pass `--verbose` for more detail.

use anyhow::{Result, ensure};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::info;

use gozero_rust::agent::Agent;
use gozero_rust::constants::{
    DEFAULT_BOARD_SIZE, DEFAULT_KOMI, DEFAULT_ROUNDS, DEFAULT_TEMPERATURE, MAX_BOARD_SIZE,
    MAX_GAME_LEN_FACTOR,
};
use gozero_rust::encoder::SimpleEncoder;
use gozero_rust::gtp::GtpEngine;
use gozero_rust::mcts::{MctsAgent, MctsConfig};
use gozero_rust::playout::RandomBot;
use gozero_rust::position::GameState;
use gozero_rust::simulation::simulate_game;
use gozero_rust::types::{Player, parse_vertex};
use gozero_rust::zero::{UniformEvaluator, ZeroAgent, ZeroConfig};

/// GoZero-Rust: a Go engine with UCT and PUCT tree search
#[derive(Parser)]
#[command(name = "gozero-rust")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log search statistics (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the GTP (Go Text Protocol) server for use with GUI applications
    Gtp {
        /// Agent generating the engine's moves
        #[arg(long, value_enum, default_value_t = AgentKind::Mcts)]
        agent: AgentKind,

        #[command(flatten)]
        game: GameArgs,

        #[command(flatten)]
        search: SearchArgs,
    },
    /// Run a simple demo of the engine
    Demo,
    /// Play complete games between two agents
    Selfplay {
        #[arg(long, value_enum, default_value_t = AgentKind::Mcts)]
        black: AgentKind,

        #[arg(long, value_enum, default_value_t = AgentKind::Random)]
        white: AgentKind,

        /// Number of games
        #[arg(short = 'n', long, default_value_t = 1)]
        games: usize,

        /// Move cap per game (default: 3 x board area)
        #[arg(long)]
        max_moves: Option<usize>,

        #[command(flatten)]
        game: GameArgs,

        #[command(flatten)]
        search: SearchArgs,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum AgentKind {
    /// Uniformly random legal moves
    Random,
    /// UCT search with random rollouts
    Mcts,
    /// PUCT search with a uniform stand-in oracle
    Zero,
}

#[derive(Args, Clone, Debug)]
struct GameArgs {
    /// Board size (NxN)
    #[arg(long, default_value_t = DEFAULT_BOARD_SIZE)]
    size: usize,

    /// Compensation for White
    #[arg(long, default_value_t = DEFAULT_KOMI)]
    komi: f32,
}

#[derive(Args, Clone, Debug)]
struct SearchArgs {
    /// Search rounds per move
    #[arg(long, default_value_t = DEFAULT_ROUNDS)]
    rounds: usize,

    /// UCT exploration temperature
    #[arg(long, default_value_t = DEFAULT_TEMPERATURE)]
    temperature: f64,

    /// Always play the most visited move (PUCT agent)
    #[arg(long)]
    greedy: bool,

    /// Random seed for reproducible games
    #[arg(long)]
    seed: Option<u64>,
}

impl GameArgs {
    fn validate(&self) -> Result<()> {
        ensure!(
            (1..=MAX_BOARD_SIZE).contains(&self.size),
            "board size must be between 1 and {MAX_BOARD_SIZE}, got {}",
            self.size
        );
        ensure!(self.komi.is_finite(), "komi must be a finite number");
        Ok(())
    }
}

fn make_agent(kind: AgentKind, board_size: usize, search: &SearchArgs, seed: Option<u64>) -> Box<dyn Agent> {
    let rng = || seed.map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed);
    match kind {
        AgentKind::Random => Box::new(RandomBot::new(rng())),
        AgentKind::Mcts => {
            let mut config = MctsConfig::default()
                .with_rounds(search.rounds)
                .with_temperature(search.temperature);
            if let Some(seed) = seed {
                config = config.with_seed(seed);
            }
            Box::new(MctsAgent::new(config))
        }
        AgentKind::Zero => {
            let mut config = ZeroConfig::default()
                .with_rounds(search.rounds)
                .with_greedy(search.greedy);
            if let Some(seed) = seed {
                config = config.with_seed(seed);
            }
            Box::new(ZeroAgent::new(UniformEvaluator, SimpleEncoder::square(board_size), config))
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .target(env_logger::Target::Stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Some(Commands::Gtp { agent, game, search }) => {
            game.validate()?;
            let agent = make_agent(agent, game.size, &search, search.seed);
            let mut engine = GtpEngine::with_board(agent, game.size, game.komi);
            engine.run()?;
        }
        Some(Commands::Selfplay {
            black,
            white,
            games,
            max_moves,
            game,
            search,
        }) => {
            game.validate()?;
            run_selfplay(black, white, games, max_moves, &game, &search)?;
        }
        Some(Commands::Demo) | None => run_demo()?,
    }
    Ok(())
}

fn run_selfplay(
    black: AgentKind,
    white: AgentKind,
    games: usize,
    max_moves: Option<usize>,
    game: &GameArgs,
    search: &SearchArgs,
) -> Result<()> {
    let max_moves = max_moves.unwrap_or(MAX_GAME_LEN_FACTOR * game.size * game.size);
    let mut black_agent = make_agent(black, game.size, search, search.seed);
    let mut white_agent = make_agent(white, game.size, search, search.seed.map(|s| s.wrapping_add(1)));
    info!(
        "selfplay: {} games, {:?} (black) vs {:?} (white), {}x{}",
        games, black, white, game.size, game.size
    );

    let mut wins = [0usize; 2];
    for i in 1..=games {
        let record = simulate_game(
            game.size,
            game.komi,
            &mut black_agent,
            &mut white_agent,
            max_moves,
        )?;
        wins[record.winner.index()] += 1;
        println!("Game {i}: {} in {} moves", record.result, record.num_moves);
    }
    println!(
        "Black ({black:?}) {} - {} White ({white:?})",
        wins[Player::Black.index()],
        wins[Player::White.index()]
    );
    Ok(())
}

fn run_demo() -> Result<()> {
    println!("GoZero-Rust: Go engine with UCT and PUCT search\n");

    // Demo 1: Board and captures
    println!("=== Board Demo ===");
    let mut game = GameState::new_game(9, DEFAULT_KOMI);
    for vertex in ["D5", "E5", "E4", "F4", "E6", "D4", "F5"] {
        game = game.try_apply_move(parse_vertex(vertex, 9)?)?;
    }
    // White's E5 stone is captured.
    println!("{}", game.board);
    println!("Stones on board: {}\n", game.board.num_stones());

    // Demo 2: UCT search
    println!("=== MCTS Demo ===");
    let mut mcts = MctsAgent::new(MctsConfig::default().with_rounds(200).with_seed(1));
    println!("Running 200 MCTS rounds...");
    let root = mcts.search(&game);
    let best = MctsAgent::best_move(&root);
    println!("Best move: {best}");
    println!("Rollouts: {}\n", root.borrow().num_rollouts);

    // Demo 3: PUCT search with a uniform oracle
    println!("=== Zero Demo ===");
    let config = ZeroConfig::default().with_rounds(200).with_greedy(true).with_seed(1);
    let mut zero = ZeroAgent::new(UniformEvaluator, SimpleEncoder::square(9), config);
    let root = zero.search(&game)?;
    let visits = zero.visit_counts(&root);
    let most_visited = visits.iter().copied().max().unwrap_or(0);
    println!("Best move: {}", zero.select_move(&game)?);
    println!("Most visits on one move: {most_visited}");
    Ok(())
}
