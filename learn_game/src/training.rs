use crate::board::{Board, Mark, Outcome, DRAW_REWARD, LOSS_REWARD};
use crate::config::{Config, TrainingConfig};
use crate::learner::{Learner, Transition};
use crate::policy::Policy;
use crate::q_table::QTable;
use crate::state::StateKey;
use log::{debug, info};
use rand::Rng;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrainingSummary {
    pub episodes: usize,
    pub cross_wins: usize,
    pub nought_wins: usize,
    pub draws: usize,
    /// Distinct keys in the table after training.
    pub states: usize,
}

impl TrainingSummary {
    fn record(&mut self, outcome: Outcome) {
        self.episodes += 1;
        match outcome {
            Outcome::Win(Mark::Cross) => self.cross_wins += 1,
            Outcome::Win(_) => self.nought_wins += 1,
            Outcome::Drawn => self.draws += 1,
            Outcome::InPlay => {}
        }
    }
}

/// Self-play driver. Both sides act with the same policy and learn into the
/// same table; every key is taken from the side of the player to move.
pub struct Trainer<R: Rng> {
    board: Board,
    policy: Policy,
    learner: Learner,
    config: TrainingConfig,
    rng: R,
}

impl<R: Rng> Trainer<R> {
    pub fn new(config: &Config, rng: R) -> Self {
        Trainer {
            board: Board::new(),
            policy: Policy::from_config(&config.agent),
            learner: Learner::from_config(&config.agent),
            config: config.training.clone(),
            rng,
        }
    }

    pub fn run(&mut self, q: &mut QTable) -> TrainingSummary {
        let mut summary = TrainingSummary::default();
        for episode in 0..self.config.episodes {
            if episode % self.config.log_every == 0 {
                info!("episode: {episode}, states: {}", q.len());
            }
            let outcome = self.run_episode(q);
            summary.record(outcome);
        }
        summary.states = q.len();
        info!(
            "trained {} episodes: X won {}, O won {}, drawn {}, {} states",
            summary.episodes,
            summary.cross_wins,
            summary.nought_wins,
            summary.draws,
            summary.states
        );
        summary
    }

    /// Plays one game against itself.
    ///
    /// A player's move is learned one half-turn late, once the opponent's
    /// reply shows the position it has to answer. When that reply ends the
    /// game, the delayed move is credited with a loss or a draw, and the
    /// final move is learned straight away with its own reward.
    pub fn run_episode(&mut self, q: &mut QTable) -> Outcome {
        self.board.reset();
        let mut previous: Option<(StateKey, usize)> = None;
        loop {
            let mover = self.board.to_move();
            let state = self.board.canonical_key();
            let action = self.policy.act(q, &state, &mut self.rng);
            let step = self.board.step(action);

            if let Some((prev_state, prev_action)) = previous.take() {
                let reward = match step.outcome {
                    Outcome::Win(_) => LOSS_REWARD,
                    Outcome::Drawn => DRAW_REWARD,
                    Outcome::InPlay => 0.0,
                };
                let transition = Transition {
                    state: prev_state,
                    next_state: self.board.canonical_key(),
                    action: prev_action,
                    reward,
                    done: step.done,
                };
                self.learner.learn(q, &transition);
            }

            if step.done {
                let transition = Transition {
                    state,
                    next_state: self.board.key_for(mover),
                    action,
                    reward: step.reward,
                    done: true,
                };
                self.learner.learn(q, &transition);
                debug!("game over: {:?}\n{}", step.outcome, step.next_state);
                return step.outcome;
            }
            previous = Some((state, action));
        }
    }
}
