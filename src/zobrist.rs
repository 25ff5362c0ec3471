//! Zobrist keys for incremental board hashing.
//!
//! Every (player, point) pair has a random 64-bit key. A board's hash is the
//! XOR of the keys of all occupied points, so placing or removing a stone is a
//! single XOR.

use std::sync::OnceLock;

use crate::constants::MAX_BOARD_SIZE;
use crate::types::{Player, Point};

/// Fixed seed so hashes are stable across runs.
const ZOBRIST_SEED: u64 = 0x5eed_0f_60_b0a4d;

type KeyTable = [[[u64; MAX_BOARD_SIZE]; MAX_BOARD_SIZE]; 2];

static POINT_KEYS: OnceLock<Box<KeyTable>> = OnceLock::new();

fn keys() -> &'static KeyTable {
    POINT_KEYS.get_or_init(|| {
        let mut rng = fastrand::Rng::with_seed(ZOBRIST_SEED);
        let mut table = Box::new([[[0u64; MAX_BOARD_SIZE]; MAX_BOARD_SIZE]; 2]);
        for player in table.iter_mut() {
            for row in player.iter_mut() {
                for key in row.iter_mut() {
                    *key = rng.u64(..);
                }
            }
        }
        table
    })
}

/// The key for a stone of `player` at `point`.
#[inline]
pub fn point_key(player: Player, point: Point) -> u64 {
    keys()[player.index()][point.row - 1][point.col - 1]
}
