use anyhow::Context;
use clap::{Parser, Subcommand};
use learn_game::config::Config;
use learn_game::players::HumanPlayer;
use learn_game::q_table::{q_table_from_disk, q_table_to_disk, QTable};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(about = "Self-play tic-tac-toe agent")]
struct Cli {
    /// JSON file with agent and training settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Seed for exploration and tie-breaking
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Train by self-play and save the value table
    Train {
        #[arg(long)]
        episodes: Option<usize>,

        #[arg(long, default_value = "./q_table_archive")]
        out: PathBuf,
    },
    /// Play against the agent, training one first when no table is given
    Play {
        /// Saved table (.json or .pickle)
        #[arg(long)]
        table: Option<PathBuf>,

        /// Let the agent take crosses and move first
        #[arg(long)]
        agent_first: bool,
    },
}

fn rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let config = match path {
        Some(path) => Config::load_or_default(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Config::default(),
    };
    Ok(config)
}

fn train(config: &Config, seed: Option<u64>) -> QTable {
    let (q, summary) = learn_game::train_rl_agent(config, rng(seed));
    println!(
        "Trained {} episodes: X won {}, O won {}, {} draws.",
        summary.episodes, summary.cross_wins, summary.nought_wins, summary.draws
    );
    q
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_deref())?;

    match cli.command.unwrap_or(Command::Play {
        table: None,
        agent_first: false,
    }) {
        Command::Train { episodes, out } => {
            if let Some(episodes) = episodes {
                config.training.episodes = episodes;
                config.validate()?;
            }
            let q = train(&config, cli.seed);
            let (json, pickle) = q_table_to_disk(&out, &q)
                .with_context(|| format!("saving table to {}", out.display()))?;
            log::info!("saved {} and {}", json.display(), pickle.display());
        }
        Command::Play { table, agent_first } => {
            let mut q = match table {
                Some(path) => {
                    let q = q_table_from_disk(&path)
                        .with_context(|| format!("loading table {}", path.display()))?;
                    log::info!("loaded {} states from {}", q.len(), path.display());
                    q
                }
                None => train(&config, cli.seed),
            };
            let stdin = io::stdin();
            let mut human = HumanPlayer::new("Player".to_owned(), stdin.lock(), io::stdout());
            learn_game::play_game_human_computer_player(
                &mut q,
                &config,
                agent_first,
                rng(cli.seed),
                &mut human,
                &mut io::stdout(),
            )?;
        }
    }
    Ok(())
}
