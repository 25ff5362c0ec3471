//! Rules scenarios: captures, suicide, superko, eyes and scoring.
//!
//! Positions are small hand-built boards with known answers, plus randomised
//! games that check the incremental state against a from-scratch recount.

use std::rc::Rc;

use gozero_rust::board::Board;
use gozero_rust::playout::RandomBot;
use gozero_rust::position::GameState;
use gozero_rust::scoring::{GameResult, Komi, Territory};
use gozero_rust::types::{Move, Player, Point};

// =============================================================================
// Helper functions
// =============================================================================

fn p(row: usize, col: usize) -> Point {
    Point::new(row, col)
}

/// Play `moves` alternately from an empty board. `None` is a pass.
fn play_sequence(size: usize, moves: &[Option<(usize, usize)>]) -> Rc<GameState> {
    let mut game = GameState::new_game(size, 7.5);
    for (i, mv) in moves.iter().enumerate() {
        let mv = mv.map_or(Move::Pass, |(r, c)| Move::play(r, c));
        game = game
            .try_apply_move(mv)
            .unwrap_or_else(|e| panic!("move {i} ({mv}) rejected: {e}"));
    }
    game
}

fn liberties(board: &Board, point: Point) -> usize {
    board.get_go_string(point).unwrap().num_liberties()
}

/// Every string's liberties are exactly its empty neighbours.
fn assert_strings_consistent(board: &Board) {
    for point in board.points() {
        let Some(string) = board.get_go_string(point) else {
            continue;
        };
        assert!(string.stones.contains(&point));
        for &stone in &string.stones {
            assert!(Rc::ptr_eq(string, board.get_go_string(stone).unwrap()));
        }
        let expected: std::collections::BTreeSet<Point> = string
            .stones
            .iter()
            .flat_map(|&s| board.neighbors(s).to_vec())
            .filter(|&n| board.get(n).is_none())
            .collect();
        assert_eq!(string.liberties, expected, "liberties of string at {point}");
    }
}

// =============================================================================
// Captures and liberties
// =============================================================================

#[test]
fn test_capture_liberties() {
    let mut board = Board::new(6, 7);
    for point in [p(3, 2), p(4, 2), p(5, 3), p(5, 4), p(4, 5), p(3, 4)] {
        board.place_stone(Player::White, point);
    }
    assert_eq!(board.num_stones(), 6);
    for point in [p(3, 3), p(4, 3), p(4, 4), p(3, 5), p(3, 6), p(4, 6)] {
        board.place_stone(Player::Black, point);
    }
    assert_eq!(board.num_stones(), 12);

    let string = board.get_go_string(p(3, 2)).unwrap();
    assert_eq!(string.color, Player::White);
    assert_eq!(string.stones.len(), 2);
    assert_eq!(string.num_liberties(), 4);
    assert_eq!(liberties(&board, p(5, 3)), 4);
    assert_eq!(board.get(p(3, 3)), Some(Player::Black));
    assert_eq!(liberties(&board, p(3, 3)), 1);
    assert_eq!(liberties(&board, p(3, 4)), 1);
    assert_eq!(liberties(&board, p(3, 5)), 5);
    assert_strings_consistent(&board);

    // Black captures the white stone at (3,4).
    board.place_stone(Player::Black, p(2, 4));
    assert_eq!(board.get(p(3, 4)), None);
    assert_eq!(liberties(&board, p(3, 3)), 2);
    assert_eq!(liberties(&board, p(4, 6)), 6);
    assert_strings_consistent(&board);

    // Playing on a copy leaves the original untouched.
    let mut copy = board.clone();
    assert_eq!(liberties(&copy, p(4, 6)), 6);
    copy.place_stone(Player::White, p(2, 5));
    assert_eq!(liberties(&copy, p(4, 6)), 5);
    assert_eq!(liberties(&board, p(4, 6)), 6);
    assert_eq!(board.zobrist_hash(), board.recompute_hash());
    assert_eq!(copy.zobrist_hash(), copy.recompute_hash());
}

#[test]
fn test_capture_restores_liberties_to_neighbors() {
    // Black (1,1) is captured by White (1,2) and (2,1); both white stones
    // regain the corner as a liberty.
    let game = play_sequence(5, &[Some((1, 1)), Some((1, 2)), Some((5, 5)), Some((2, 1))]);
    assert_eq!(game.board.get(p(1, 1)), None);
    assert_eq!(liberties(&game.board, p(1, 2)), 3);
    assert_eq!(liberties(&game.board, p(2, 1)), 3);
    assert_strings_consistent(&game.board);
}

// =============================================================================
// Game flow
// =============================================================================

#[test]
fn test_game_over_conditions() {
    let game = GameState::new_game(19, 7.5);
    assert!(!game.is_over());
    assert!(game.apply_move(Move::Resign).is_over());
    assert!(!game.apply_move(Move::Pass).is_over());
    assert!(game.apply_move(Move::Pass).apply_move(Move::Pass).is_over());
    // A play between passes resets the count.
    let game = game
        .apply_move(Move::Pass)
        .apply_move(Move::play(4, 4))
        .apply_move(Move::Pass);
    assert!(!game.is_over());
}

#[test]
fn test_resigner_loses() {
    let game = GameState::new_game(9, 7.5).apply_move(Move::play(5, 5));
    let resigned = game.apply_move(Move::Resign);
    assert_eq!(resigned.winner(), Some(Player::Black));
}

// =============================================================================
// Self-capture
// =============================================================================

#[test]
fn test_self_capture() {
    let game = play_sequence(
        7,
        &[
            Some((1, 3)),
            Some((1, 2)),
            Some((2, 3)),
            Some((2, 2)),
            Some((3, 3)),
            Some((3, 2)),
            None,
            Some((4, 3)),
            None,
            Some((3, 4)),
            None,
            Some((2, 4)),
            None,
            Some((1, 5)),
        ],
    );
    let m = Move::play(1, 4);
    assert!(game.is_move_self_capture(Player::Black, m));
    assert!(!game.is_move_self_capture(Player::White, m));
    // Black is to move, so the point is illegal right now.
    assert_eq!(game.next_player, Player::Black);
    assert!(!game.is_valid_move(m));
}

#[test]
fn test_capture_is_not_self_capture() {
    // White (1,1) fills its last liberty but captures Black (1,2) first.
    let mut board = Board::new(5, 5);
    board.place_stone(Player::Black, p(1, 2));
    board.place_stone(Player::Black, p(2, 1));
    board.place_stone(Player::White, p(1, 3));
    board.place_stone(Player::White, p(2, 2));
    board.place_stone(Player::White, p(3, 1));
    // Black (1,2) and (2,1) each have only the corner left.
    assert_eq!(liberties(&board, p(1, 2)), 1);
    assert_eq!(liberties(&board, p(2, 1)), 1);
    assert!(!board.is_self_capture(Player::White, p(1, 1)));
    assert!(board.will_capture(Player::White, p(1, 1)));
    // For Black the corner connects both stones, which still have no liberty.
    assert!(board.is_self_capture(Player::Black, p(1, 1)));
}

// =============================================================================
// Superko
// =============================================================================

#[test]
fn test_ko() {
    let game = play_sequence(
        7,
        &[
            Some((4, 3)),
            Some((4, 4)),
            Some((3, 4)),
            Some((5, 5)),
            Some((5, 4)),
            Some((3, 5)),
            None,
            Some((4, 6)),
        ],
    );

    // Black captures (legal).
    let m = Move::play(4, 5);
    assert!(!game.does_move_violate_ko(Player::Black, m));
    let game = game.try_apply_move(m).unwrap();
    assert_eq!(game.board.get(p(4, 4)), None);

    // White can't capture back at once.
    assert!(game.does_move_violate_ko(Player::White, Move::play(4, 4)));
    assert!(game.try_apply_move(Move::play(4, 4)).is_err());

    // Other moves still work.
    assert!(!game.does_move_violate_ko(Player::White, Move::play(2, 4)));

    // After an exchange elsewhere the recapture is allowed again.
    let game = game
        .try_apply_move(Move::play(1, 1))
        .and_then(|g| g.try_apply_move(Move::play(7, 7)))
        .unwrap();
    assert!(!game.does_move_violate_ko(Player::White, Move::play(4, 4)));
}

// =============================================================================
// Eyes
// =============================================================================

#[test]
fn test_eyes() {
    let mut game = play_sequence(
        5,
        &[
            Some((1, 1)),
            Some((1, 2)),
            Some((2, 1)),
            Some((2, 2)),
            Some((3, 2)),
            Some((2, 3)),
            Some((3, 3)),
            Some((2, 4)),
            Some((3, 4)),
            Some((2, 5)),
            Some((3, 5)),
        ],
    );

    // Prior to filling in (1,4), there are no eyes.
    for col in 3..=5 {
        assert!(!game.board.is_point_an_eye(p(1, col), Player::White));
    }

    game = game.try_apply_move(Move::play(1, 4)).unwrap();

    // Now there are two.
    assert!(game.board.is_point_an_eye(p(1, 3), Player::White));
    assert!(!game.board.is_point_an_eye(p(1, 4), Player::White));
    assert!(game.board.is_point_an_eye(p(1, 5), Player::White));

    // None of them are eyes for Black.
    for col in 3..=5 {
        assert!(!game.board.is_point_an_eye(p(1, col), Player::Black));
    }
}

#[test]
fn test_centre_eye_needs_three_corners() {
    let mut board = Board::new(5, 5);
    for point in [p(2, 3), p(3, 2), p(3, 4), p(4, 3), p(2, 2), p(2, 4), p(4, 2)] {
        board.place_stone(Player::Black, point);
    }
    assert!(board.is_point_an_eye(p(3, 3), Player::Black));
    board.place_stone(Player::White, p(4, 4));
    assert!(board.is_point_an_eye(p(3, 3), Player::Black));
    // A second enemy corner breaks the eye.
    let mut board = Board::new(5, 5);
    for point in [p(2, 3), p(3, 2), p(3, 4), p(4, 3), p(2, 2)] {
        board.place_stone(Player::Black, point);
    }
    board.place_stone(Player::White, p(4, 4));
    board.place_stone(Player::White, p(2, 4));
    assert!(!board.is_point_an_eye(p(3, 3), Player::Black));
}

// =============================================================================
// Scoring
// =============================================================================

/// ```text
///  5 . o . o o
///  4 o o o o .
///  3 x x x o o
///  2 . x x x x
///  1 . x . x .
/// ```
fn scoring_board() -> Board {
    let mut board = Board::new(5, 5);
    for point in [
        p(1, 2),
        p(1, 4),
        p(2, 2),
        p(2, 3),
        p(2, 4),
        p(2, 5),
        p(3, 1),
        p(3, 2),
        p(3, 3),
    ] {
        board.place_stone(Player::Black, point);
    }
    for point in [
        p(3, 4),
        p(3, 5),
        p(4, 1),
        p(4, 2),
        p(4, 3),
        p(4, 4),
        p(5, 2),
        p(5, 4),
        p(5, 5),
    ] {
        board.place_stone(Player::White, point);
    }
    board
}

#[test]
fn test_scoring() {
    let territory = Territory::evaluate(&scoring_board());
    assert_eq!(territory.num_black_stones, 9);
    assert_eq!(territory.num_black_territory, 4);
    assert_eq!(territory.num_white_stones, 9);
    assert_eq!(territory.num_white_territory, 3);
    assert_eq!(territory.num_dame, 0);
    assert!(territory.dame_points.is_empty());
}

#[test]
fn test_game_result_with_komi() {
    let board = scoring_board();
    // 13 - 12 on the board.
    let result = GameResult::from_board(&board, Komi::from_points(0.5));
    assert_eq!((result.black, result.white), (13, 12));
    assert_eq!(result.winner(), Player::Black);
    assert_eq!(result.to_string(), "B+0.5");

    let result = GameResult::from_board(&board, Komi::from_points(1.0));
    assert_eq!(result.winner(), Player::White);
    assert_eq!(result.to_string(), "W+0");

    let result = GameResult::from_board(&board, Komi::from_points(7.5));
    assert_eq!(result.to_string(), "W+6.5");
}

// =============================================================================
// Randomised games
// =============================================================================

#[test]
fn test_incremental_state_matches_recount() {
    for seed in 0..8 {
        let mut bot = RandomBot::new(fastrand::Rng::with_seed(seed));
        let size = [5, 7, 9][seed as usize % 3];
        let mut game = GameState::new_game(size, 7.5);
        while !game.is_over() && game.num_moves() < 3 * size * size {
            let mv = bot.choose(&game);
            let next = game.try_apply_move(mv).unwrap();
            assert_eq!(next.board.zobrist_hash(), next.board.recompute_hash());
            assert_eq!(next.previous_hashes().len(), game.previous_hashes().len() + 1);
            // The predecessor is never modified.
            assert_eq!(game.board.zobrist_hash(), game.board.recompute_hash());
            game = next;
        }
        assert_strings_consistent(&game.board);
    }
}

#[test]
fn test_captures_never_repeat_a_position() {
    for seed in 0..4 {
        let mut bot = RandomBot::new(fastrand::Rng::with_seed(100 + seed));
        let mut game = GameState::new_game(5, 7.5);
        while !game.is_over() && game.num_moves() < 150 {
            let next = game.try_apply_move(bot.choose(&game)).unwrap();
            let captured = next.last_move().is_some_and(Move::is_play)
                && next.board.num_stones() <= game.board.num_stones();
            if captured {
                let situation = (next.next_player, next.board.zobrist_hash());
                assert!(!next.previous_hashes().contains(&situation));
            }
            game = next;
        }
    }
}
