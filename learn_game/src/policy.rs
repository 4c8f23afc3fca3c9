//! Epsilon-greedy action selection over a masked value vector.

use crate::config::AgentConfig;
use crate::q_table::QTable;
use crate::state::{StateKey, CELLS};
use itertools::Itertools;
use ndarray::Array1;
use rand::Rng;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Policy {
    pub exploration_rate: f32,
    /// Play mode never explores.
    pub is_play: bool,
}

impl Policy {
    pub fn new(exploration_rate: f32, is_play: bool) -> Self {
        Policy {
            exploration_rate,
            is_play,
        }
    }

    pub fn from_config(config: &AgentConfig) -> Self {
        Self::new(config.exploration_rate, config.is_play)
    }

    /// Picks a legal cell for the mover of `key`.
    ///
    /// Panics if the board encoded by `key` has no empty cell.
    pub fn act<R: Rng>(&self, q: &mut QTable, key: &StateKey, rng: &mut R) -> usize {
        assert!(!key.is_full(), "no legal action left in state {key}");
        let mask = key.legal_mask();

        let learned = q.get(key);
        let draw: f32 = rng.gen();
        let values = if !self.is_play && draw < self.exploration_rate {
            Array1::from_shape_fn(CELLS, |_| rng.gen::<f32>())
        } else {
            Array1::from(learned.to_vec())
        };
        let choice = pick_max(&ranking(values, &mask), rng);
        log::trace!("state {key}: chose {choice}");
        choice
    }
}

/// Adds twice the magnitude of the minimum when it is negative, so that
/// masked-out zeros never outrank a legal value.
pub(crate) fn shift_non_negative(values: &mut Array1<f32>) {
    let min = values.fold(f32::INFINITY, |acc, &v| acc.min(v));
    if min < 0.0 {
        *values += 2.0 * min.abs();
    }
}

fn ranking(mut values: Array1<f32>, mask: &Array1<f32>) -> Array1<f32> {
    shift_non_negative(&mut values);
    let masked = values * mask;
    if masked.sum() == 0.0 {
        mask.clone()
    } else {
        masked
    }
}

/// Index of the maximum, uniformly random among ties.
fn pick_max<R: Rng>(ranking: &Array1<f32>, rng: &mut R) -> usize {
    let best = ranking
        .iter()
        .enumerate()
        .max_set_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(Ordering::Equal))
        .into_iter()
        .map(|(index, _)| index)
        .collect::<Vec<usize>>();
    match best.as_slice() {
        [only] => *only,
        tied => tied[rng.gen_range(0..tied.len())],
    }
}
