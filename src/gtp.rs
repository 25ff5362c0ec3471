//! Go Text Protocol (GTP) front-end.
//!
//! GTP is a line-based text protocol for talking to Go programs. This module
//! implements enough of GTP version 2 to play games from GUIs like Sabaki or
//! GoGui, with any [`Agent`] generating the engine's moves.
//!
//! ## Supported Commands
//!
//! - `name`, `version`, `protocol_version`
//! - `list_commands`, `known_command <cmd>`
//! - `quit`
//! - `boardsize <size>` - Start a new game on a `size` x `size` board
//! - `clear_board` - Start a new game on the current board size
//! - `komi <value>` - Set komi; applied at once if no move has been played
//! - `play <color> <vertex>` - Play a move (`pass` and `resign` accepted)
//! - `genmove <color>` - Search for a move, play it and report it
//!
//! Colours must alternate: `play` and `genmove` for the side not to move are
//! rejected. Lines that are not valid UTF-8 are decoded lossily, so they fail
//! as ordinary malformed commands instead of ending the session.
//! - `showboard` - Render the board
//!
//! ## Example
//!
//! ```no_run
//! use gozero_rust::gtp::GtpEngine;
//! use gozero_rust::playout::RandomBot;
//!
//! let mut engine = GtpEngine::new(Box::new(RandomBot::new(fastrand::Rng::new())));
//! engine.run().unwrap();
//! ```

use std::borrow::Cow;
use std::io::{self, BufRead, Write};
use std::rc::Rc;

use log::{debug, info, warn};

use crate::agent::Agent;
use crate::constants::{DEFAULT_BOARD_SIZE, DEFAULT_KOMI, MAX_BOARD_SIZE};
use crate::error::ParseError;
use crate::position::GameState;
use crate::types::{Player, format_vertex, parse_player, parse_vertex};

/// The list of known GTP commands.
const KNOWN_COMMANDS: &[&str] = &[
    "boardsize",
    "clear_board",
    "genmove",
    "known_command",
    "komi",
    "list_commands",
    "name",
    "play",
    "protocol_version",
    "quit",
    "showboard",
    "version",
];

/// One parsed command line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Command {
    pub sequence: Option<u32>,
    pub name: String,
    pub args: Vec<String>,
}

/// Parse a command line. Returns `None` for blank and comment-only lines.
///
/// Anything after `#` is a comment. A leading integer is the sequence number.
pub fn parse_command(line: &str) -> Option<Command> {
    let line = line.split('#').next().unwrap_or_default();
    let mut words = line.split_whitespace().peekable();
    words.peek()?;

    let sequence = words.peek().and_then(|w| w.parse::<u32>().ok());
    if sequence.is_some() {
        words.next();
    }
    let name = words.next().map(str::to_lowercase).unwrap_or_default();
    let args = words.map(String::from).collect();
    Some(Command {
        sequence,
        name,
        args,
    })
}

/// A reply to one command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Response {
    pub success: bool,
    pub body: String,
}

impl Response {
    pub fn success(body: impl Into<String>) -> Self {
        Response {
            success: true,
            body: body.into(),
        }
    }

    pub fn error(body: impl Into<String>) -> Self {
        Response {
            success: false,
            body: body.into(),
        }
    }

    fn bool_response(b: bool) -> Self {
        Self::success(if b { "true" } else { "false" })
    }

    /// Wire format: `=<seq> <body>` or `?<seq> <body>`, then a blank line.
    pub fn serialize(&self, command: &Command) -> String {
        let prefix = if self.success { '=' } else { '?' };
        let sequence = command.sequence.map(|s| s.to_string()).unwrap_or_default();
        format!("{prefix}{sequence} {}\n\n", self.body)
    }
}

impl From<ParseError> for Response {
    fn from(e: ParseError) -> Self {
        Response::error(e.to_string())
    }
}

/// GTP session state: the current game and the agent that plays it.
pub struct GtpEngine {
    game_state: Rc<GameState>,
    board_size: usize,
    komi: f32,
    agent: Box<dyn Agent>,
    stopped: bool,
}

impl GtpEngine {
    /// Create an engine with the default board size and komi.
    pub fn new(agent: Box<dyn Agent>) -> Self {
        Self::with_board(agent, DEFAULT_BOARD_SIZE, DEFAULT_KOMI)
    }

    pub fn with_board(agent: Box<dyn Agent>, board_size: usize, komi: f32) -> Self {
        Self {
            game_state: GameState::new_game(board_size, komi),
            board_size,
            komi,
            agent,
            stopped: false,
        }
    }

    pub fn game_state(&self) -> &Rc<GameState> {
        &self.game_state
    }

    pub fn board_size(&self) -> usize {
        self.board_size
    }

    /// Has `quit` been received?
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Run the command loop on stdin and stdout.
    pub fn run(&mut self) -> io::Result<()> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        self.run_with(stdin.lock(), stdout.lock())
    }

    /// Run the command loop until `quit` or end of input.
    ///
    /// Only I/O failures end the loop early.
    pub fn run_with<R: BufRead, W: Write>(&mut self, mut reader: R, mut writer: W) -> io::Result<()> {
        info!("gtp: session started with agent '{}'", self.agent.name());
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            let line = String::from_utf8_lossy(&buf);
            if let Cow::Owned(_) = line {
                warn!("gtp: input line is not valid UTF-8");
            }
            let Some(command) = parse_command(&line) else {
                continue;
            };
            let response = self.process(&command);
            writer.write_all(response.serialize(&command).as_bytes())?;
            writer.flush()?;
            if self.stopped {
                break;
            }
        }
        Ok(())
    }

    /// Execute one command.
    pub fn process(&mut self, command: &Command) -> Response {
        let args: Vec<&str> = command.args.iter().map(String::as_str).collect();
        debug!("gtp: {} {:?}", command.name, args);
        match command.name.as_str() {
            "name" => Response::success(env!("CARGO_PKG_NAME")),

            "version" => Response::success(env!("CARGO_PKG_VERSION")),

            "protocol_version" => Response::success("2"),

            "list_commands" => Response::success(KNOWN_COMMANDS.join("\n")),

            "known_command" => match args.first() {
                Some(name) => Response::bool_response(KNOWN_COMMANDS.contains(&name.to_lowercase().as_str())),
                None => ParseError::MissingArgument("command name").into(),
            },

            "quit" => {
                self.stopped = true;
                Response::success("")
            }

            "boardsize" => self.handle_boardsize(&args),

            "clear_board" => {
                self.new_game();
                Response::success("")
            }

            "komi" => self.handle_komi(&args),

            "play" => self.handle_play(&args),

            "genmove" => self.handle_genmove(&args),

            "showboard" => {
                // The body must not end in a blank line.
                let board = self.game_state.board.to_string();
                Response::success(format!("\n{}", board.trim_end()))
            }

            _ => Response::error("unknown command"),
        }
    }

    fn new_game(&mut self) {
        info!("gtp: new {0}x{0} game, komi {1}", self.board_size, self.komi);
        self.game_state = GameState::new_game(self.board_size, self.komi);
    }

    fn handle_boardsize(&mut self, args: &[&str]) -> Response {
        let Some(&arg) = args.first() else {
            return ParseError::MissingArgument("board size").into();
        };
        match arg.parse::<usize>() {
            Ok(size) if (1..=MAX_BOARD_SIZE).contains(&size) => {
                self.board_size = size;
                self.new_game();
                Response::success("")
            }
            _ => ParseError::InvalidBoardSize(arg.to_string()).into(),
        }
    }

    fn handle_komi(&mut self, args: &[&str]) -> Response {
        let Some(&arg) = args.first() else {
            return ParseError::MissingArgument("komi").into();
        };
        let Ok(komi) = arg.parse::<f32>() else {
            return ParseError::InvalidKomi(arg.to_string()).into();
        };
        if !komi.is_finite() {
            return ParseError::InvalidKomi(arg.to_string()).into();
        }
        self.komi = komi;
        // Komi lives in the game state; only restart a game nobody has played in.
        if self.game_state.num_moves() == 0 {
            self.new_game();
        }
        Response::success("")
    }

    /// Parse the colour argument, which must be the side to move.
    fn parse_color(&self, arg: Option<&&str>) -> Result<Player, ParseError> {
        let arg = arg.ok_or(ParseError::MissingArgument("color"))?;
        let player = parse_player(arg)?;
        let to_move = self.game_state.next_player;
        if player != to_move {
            warn!("gtp: {player} requested but {to_move} is to move");
            return Err(ParseError::OutOfTurn {
                requested: player,
                to_move,
            });
        }
        Ok(player)
    }

    fn handle_play(&mut self, args: &[&str]) -> Response {
        if let Err(e) = self.parse_color(args.first()) {
            return e.into();
        }
        let Some(&vertex) = args.get(1) else {
            return ParseError::MissingArgument("vertex").into();
        };
        let mv = match parse_vertex(vertex, self.board_size) {
            Ok(mv) => mv,
            Err(e) => return e.into(),
        };
        match self.game_state.try_apply_move(mv) {
            Ok(next) => {
                self.game_state = next;
                Response::success("")
            }
            Err(e) => {
                debug!("gtp: rejected {mv}: {e}");
                Response::error("illegal move")
            }
        }
    }

    fn handle_genmove(&mut self, args: &[&str]) -> Response {
        if let Err(e) = self.parse_color(args.first()) {
            return e.into();
        }
        let mv = match self.agent.select_move(&self.game_state) {
            Ok(mv) => mv,
            Err(e) => {
                warn!("gtp: move generation failed: {e}");
                return Response::error(e.to_string());
            }
        };
        match self.game_state.try_apply_move(mv) {
            Ok(next) => {
                info!("gtp: {} plays {}", self.game_state.next_player, mv);
                self.game_state = next;
                if let Some(winner) = self.game_state.winner() {
                    info!("gtp: game over, {winner} wins ({})", self.game_state.game_result());
                }
                Response::success(format_vertex(mv))
            }
            Err(e) => {
                warn!("gtp: agent '{}' chose {mv}: {e}", self.agent.name());
                Response::error(e.to_string())
            }
        }
    }
}
