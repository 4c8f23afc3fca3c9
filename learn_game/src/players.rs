use crate::board::{Board, Mark, Outcome};
use crate::config::AgentConfig;
use crate::error::{Error, Result};
use crate::policy::Policy;
use crate::q_table::QTable;
use crate::state::CELLS;
use rand::Rng;
use std::io::{BufRead, Write};

pub trait Player {
    fn name(&self) -> &str;
    fn choose_move(&mut self, board: &Board, q: &mut QTable) -> Result<usize>;
}

/// The trained agent. Never explores and never learns.
#[derive(Debug)]
pub struct AgentPlayer<R: Rng> {
    pub name: String,
    policy: Policy,
    rng: R,
}

/// A console player reading cell numbers 0-8, one per line.
#[derive(Debug)]
pub struct HumanPlayer<I: BufRead, O: Write> {
    pub name: String,
    input: I,
    output: O,
}

impl<R: Rng> AgentPlayer<R> {
    pub fn new(name: String, config: &AgentConfig, rng: R) -> Self {
        AgentPlayer {
            name,
            policy: Policy::from_config(&config.for_play()),
            rng,
        }
    }
}

impl<R: Rng> Player for AgentPlayer<R> {
    fn name(&self) -> &str {
        &self.name
    }
    fn choose_move(&mut self, board: &Board, q: &mut QTable) -> Result<usize> {
        let key = board.canonical_key();
        log::debug!("{} thinking on {key}: {:?}", self.name, q.peek(&key));
        Ok(self.policy.act(q, &key, &mut self.rng))
    }
}

impl<I: BufRead, O: Write> HumanPlayer<I, O> {
    pub fn new(name: String, input: I, output: O) -> Self {
        HumanPlayer {
            name,
            input,
            output,
        }
    }
}

impl<I: BufRead, O: Write> Player for HumanPlayer<I, O> {
    fn name(&self) -> &str {
        &self.name
    }
    fn choose_move(&mut self, board: &Board, _q: &mut QTable) -> Result<usize> {
        let mut line = String::new();
        loop {
            write!(self.output, "{}, choose your move (0-8): ", self.name)?;
            self.output.flush()?;
            line.clear();
            if self.input.read_line(&mut line)? == 0 {
                return Err(Error::EndOfInput);
            }
            match parse_move(&line, board) {
                Ok(mv) => return Ok(mv),
                Err(e) => {
                    log::warn!("{e}");
                    writeln!(self.output, "{e}, please try again.")?;
                }
            }
        }
    }
}

/// Validates a typed move against the board.
pub fn parse_move(input: &str, board: &Board) -> Result<usize> {
    let input = input.trim();
    let invalid = |reason| Error::InvalidMove {
        input: input.to_owned(),
        reason,
    };
    let mv: usize = input.parse().map_err(|_| invalid("not a cell number"))?;
    if mv >= CELLS {
        return Err(invalid("cells are numbered 0 to 8"));
    }
    if board.current_state.cell(mv) != Mark::Empty {
        return Err(invalid("the cell is taken"));
    }
    Ok(mv)
}

/// Plays one game, `first` holding crosses, rendering the board to `out`.
pub fn play_match<W: Write>(
    first: &mut dyn Player,
    second: &mut dyn Player,
    q: &mut QTable,
    out: &mut W,
) -> Result<Outcome> {
    let mut board = Board::new();
    loop {
        write!(out, "{}", board.current_state)?;
        let player: &mut dyn Player = if board.current_player_is_first() {
            &mut *first
        } else {
            &mut *second
        };
        let mv = player.choose_move(&board, q)?;
        writeln!(out, "{} plays {mv}", player.name())?;
        let step = board.step(mv);
        if step.done {
            write!(out, "{}", board.current_state)?;
            match step.outcome {
                Outcome::Win(Mark::Cross) => writeln!(out, "{} wins!", first.name())?,
                Outcome::Win(_) => writeln!(out, "{} wins!", second.name())?,
                _ => writeln!(out, "Draw!")?,
            }
            return Ok(step.outcome);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::io::Cursor;

    fn human(script: &str) -> HumanPlayer<Cursor<Vec<u8>>, Vec<u8>> {
        HumanPlayer::new("Oscar".to_owned(), Cursor::new(script.as_bytes().to_vec()), vec![])
    }

    #[test]
    fn human_retries_until_valid() {
        let mut board = Board::new();
        board.step(4);
        let mut q = QTable::new();
        let mut player = human("abc\n9\n4\n 7 \n");
        assert_eq!(player.choose_move(&board, &mut q).unwrap(), 7);
        let shown = String::from_utf8(player.output.clone()).unwrap();
        assert_eq!(shown.matches("please try again").count(), 3);
        assert!(shown.contains("the cell is taken"));
        assert!(q.is_empty());
    }

    #[test]
    fn human_input_closed() {
        let board = Board::new();
        let mut q = QTable::new();
        let mut player = human("x\n");
        assert!(matches!(
            player.choose_move(&board, &mut q),
            Err(Error::EndOfInput)
        ));
    }

    #[test]
    fn parse_move_checks_range() {
        let board = Board::new();
        assert_eq!(parse_move("8\n", &board).unwrap(), 8);
        assert!(matches!(
            parse_move("-1", &board),
            Err(Error::InvalidMove { .. })
        ));
        assert!(parse_move("9", &board).is_err());
    }

    #[test]
    fn agent_prefers_learned_move() {
        let mut q = QTable::new();
        let board = Board::new();
        let mut values = [0.0; CELLS];
        values[4] = 0.8;
        q.put(board.canonical_key(), values);
        let config = AgentConfig {
            exploration_rate: 1.0,
            ..AgentConfig::default()
        };
        let mut agent = AgentPlayer::new("RL".to_owned(), &config, StdRng::seed_from_u64(2));
        assert_eq!(agent.choose_move(&board, &mut q).unwrap(), 4);
    }

    #[test]
    fn scripted_human_beats_blank_agent_or_game_ends() {
        let mut q = QTable::new();
        let config = AgentConfig::default();
        let mut agent = AgentPlayer::new("RL".to_owned(), &config, StdRng::seed_from_u64(8));
        let mut player = human("0\n1\n2\n3\n4\n5\n6\n7\n8\n");
        let mut out = Vec::new();
        // the human skips cells the agent took by retrying with the next number
        let outcome = play_match(&mut player, &mut agent, &mut q, &mut out).unwrap();
        assert_ne!(outcome, Outcome::InPlay);
        let shown = String::from_utf8(out).unwrap();
        assert!(shown.contains("Oscar plays 0"));
        assert!(shown.ends_with("wins!\n") || shown.ends_with("Draw!\n"));
    }
}
