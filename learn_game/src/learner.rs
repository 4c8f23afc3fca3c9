//! Temporal-difference updates, replayed over the four board rotations.

use crate::config::AgentConfig;
use crate::policy::shift_non_negative;
use crate::q_table::QTable;
use crate::state::{rotate_action, StateKey};
use ndarray::Array1;

/// One observed move. Both keys are already seen from the mover's side.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: StateKey,
    pub next_state: StateKey,
    pub action: usize,
    pub reward: f32,
    pub done: bool,
}

impl Transition {
    /// Same move on a board turned `turns` quarter turns. Reward and terminal
    /// flag do not depend on orientation.
    pub fn rotated(&self, turns: usize) -> Transition {
        Transition {
            state: self.state.rotated(turns),
            next_state: self.next_state.rotated(turns),
            action: rotate_action(self.action, turns),
            reward: self.reward,
            done: self.done,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Learner {
    pub learning_rate: f32,
    pub discount: f32,
}

impl Learner {
    pub fn new(learning_rate: f32, discount: f32) -> Self {
        Learner {
            learning_rate,
            discount,
        }
    }

    pub fn from_config(config: &AgentConfig) -> Self {
        Self::new(config.learning_rate, config.discount)
    }

    /// Updates the transition and its three rotations.
    pub fn learn(&self, q: &mut QTable, transition: &Transition) {
        for turns in 0..4 {
            self.update(q, &transition.rotated(turns));
        }
    }

    /// Single TD update of `Q(state, action)`; returns the stored value.
    ///
    /// A terminal transition stores the reward as is.
    pub fn update(&self, q: &mut QTable, t: &Transition) -> f32 {
        let mut values = q.get(&t.state);
        let mask = t.next_state.legal_mask();
        let next = Array1::from(q.get(&t.next_state).to_vec());
        let masked = next * &mask;

        let mut ranking = masked.clone();
        shift_non_negative(&mut ranking);
        let best = first_max(&ranking);

        let old = values[t.action];
        let target = t.reward + self.discount * masked[best];
        values[t.action] = if t.done {
            t.reward
        } else {
            old + self.learning_rate * (target - old)
        };
        log::trace!(
            "Q({}, {}) {old} -> {}",
            t.state,
            t.action,
            values[t.action]
        );
        q.put(t.state.clone(), values);
        values[t.action]
    }
}

fn first_max(values: &Array1<f32>) -> usize {
    values
        .iter()
        .enumerate()
        .fold((0, f32::NEG_INFINITY), |best, (index, &v)| {
            if v > best.1 {
                (index, v)
            } else {
                best
            }
        })
        .0
}
