//! Tabular self-play learning for tic-tac-toe.
//!
//! A single [`QTable`] serves both sides: every position is encoded from the
//! point of view of the player about to move, actions are picked with an
//! epsilon-greedy [`Policy`] and each observed move is learned four times,
//! once per board rotation, by the [`Learner`].

use crate::config::Config;
use rand::Rng;
use std::io::Write;

pub mod board;
pub mod config;
pub mod error;
pub mod learner;
pub mod players;
pub mod policy;
pub mod q_table;
pub mod state;
pub mod training;

pub use board::{Board, GameState, Mark, Outcome, Step};
pub use error::{ConfigError, Error, Result};
pub use learner::{Learner, Transition};
pub use players::{play_match, AgentPlayer, HumanPlayer, Player};
pub use policy::Policy;
pub use q_table::QTable;
pub use state::StateKey;
pub use training::{Trainer, TrainingSummary};

/// Trains a fresh table by self-play.
pub fn train_rl_agent<R: Rng>(config: &Config, rng: R) -> (QTable, TrainingSummary) {
    let mut q = QTable::new();
    let mut trainer = Trainer::new(config, rng);
    let summary = trainer.run(&mut q);
    (q, summary)
}

/// One game between `human` and the trained agent, rendered to `out`.
///
/// Fails with [`Error::Config`] when the agent settings are out of range.
pub fn play_game_human_computer_player<R: Rng, W: Write>(
    q: &mut QTable,
    config: &Config,
    agent_first: bool,
    rng: R,
    human: &mut dyn Player,
    out: &mut W,
) -> Result<Outcome> {
    config.validate()?;
    let mut agent = AgentPlayer::new("RLagent".to_owned(), &config.agent, rng);
    writeln!(out, "--- AI vs {} ---", human.name())?;
    if agent_first {
        play_match(&mut agent, human, q, out)
    } else {
        play_match(human, &mut agent, q, out)
    }
}
