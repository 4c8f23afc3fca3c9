//! Canonical state keys, legality masks and the rotation tables used for
//! symmetry augmentation.

use crate::board::Mark;
use crate::error::Error;
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

pub const CELLS: usize = 9;

/// `ROTATIONS[k][i]` is where cell `i` ends up after `k` counter-clockwise
/// quarter turns of the board.
pub const ROTATIONS: [[usize; CELLS]; 4] = rotation_table();

const fn rotation_table() -> [[usize; CELLS]; 4] {
    let mut table = [[0; CELLS]; 4];
    let mut turns = 0;
    while turns < 4 {
        let mut pos = 0;
        while pos < CELLS {
            let (mut row, mut col) = (pos / 3, pos % 3);
            let mut k = 0;
            while k < turns {
                let new_row = 2 - col;
                col = row;
                row = new_row;
                k += 1;
            }
            table[turns][pos] = row * 3 + col;
            pos += 1;
        }
        turns += 1;
    }
    table
}

pub fn rotate_action(action: usize, turns: usize) -> usize {
    ROTATIONS[turns % 4][action]
}

/// Board encoding seen from the player about to move: `1` for the mover,
/// `2` for the opponent, `0` for empty cells, in row-major order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StateKey(String);

impl StateKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn legal_mask(&self) -> Array1<f32> {
        legal_mask(self)
    }

    pub fn rotated(&self, turns: usize) -> StateKey {
        let src = self.0.as_bytes();
        let mut dst = [b'0'; CELLS];
        for (pos, &digit) in src.iter().enumerate() {
            dst[rotate_action(pos, turns)] = digit;
        }
        StateKey(dst.iter().map(|&b| b as char).collect())
    }

    pub fn is_full(&self) -> bool {
        !self.0.contains('0')
    }
}

pub fn canonicalize<'a>(cells: impl IntoIterator<Item = &'a Mark>, mover: Mark) -> StateKey {
    let key: String = cells
        .into_iter()
        .map(|&cell| match cell {
            Mark::Empty => '0',
            m if m == mover => '1',
            _ => '2',
        })
        .collect();
    debug_assert_eq!(key.len(), CELLS);
    StateKey(key)
}

/// 1.0 for every empty cell of the key, 0.0 otherwise.
pub fn legal_mask(key: &StateKey) -> Array1<f32> {
    key.0
        .chars()
        .map(|c| if c == '0' { 1.0 } else { 0.0 })
        .collect()
}

impl FromStr for StateKey {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.chars().count() != CELLS {
            return Err(Error::InvalidStateKey {
                key: s.to_owned(),
                reason: "expected 9 cells",
            });
        }
        if !s.chars().all(|c| matches!(c, '0' | '1' | '2')) {
            return Err(Error::InvalidStateKey {
                key: s.to_owned(),
                reason: "cells must be 0, 1 or 2",
            });
        }
        Ok(StateKey(s.to_owned()))
    }
}

impl TryFrom<String> for StateKey {
    type Error = Error;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<StateKey> for String {
    fn from(key: StateKey) -> String {
        key.0
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
