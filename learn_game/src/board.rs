use crate::state::{canonicalize, StateKey, CELLS};
use itertools::Itertools;
use ndarray::prelude::*;
use std::{
    fmt,
    ops::{Deref, DerefMut},
};

pub const WIN_REWARD: f32 = 1.0;
pub const DRAW_REWARD: f32 = 0.5;
pub const LOSS_REWARD: f32 = -1.0;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum Mark {
    #[default]
    Empty,
    Cross,
    Nought,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Outcome {
    InPlay,
    Drawn,
    Win(Mark),
}

#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub state: Array2<Mark>,
}

/// Result of a single move in the environment.
#[derive(Debug, Clone)]
pub struct Step {
    pub next_state: GameState,
    pub reward: f32,
    pub done: bool,
    pub outcome: Outcome,
}

/// The self-play environment. Cross always moves first.
#[derive(Debug, Clone)]
pub struct Board {
    pub current_state: GameState,
    to_move: Mark,
}

impl Mark {
    pub fn other(self) -> Self {
        match self {
            Self::Cross => Mark::Nought,
            Self::Nought => Mark::Cross,
            Self::Empty => Mark::Empty,
        }
    }
    pub fn as_char(self) -> char {
        match self {
            Self::Cross => 'X',
            Self::Nought => 'O',
            Self::Empty => '*',
        }
    }
}

impl Deref for GameState {
    type Target = Array2<Mark>;
    fn deref(&self) -> &Self::Target {
        &self.state
    }
}

impl DerefMut for GameState {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.state
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (a, b, c) in self.iter().tuples::<(_, _, _)>() {
            writeln!(f, "|{}|{}|{}|", a.as_char(), b.as_char(), c.as_char())?;
        }
        Ok(())
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    pub fn new() -> Self {
        GameState {
            state: Array::from_elem((3, 3), Mark::Empty),
        }
    }
    pub fn from_cells(cells: [Mark; CELLS]) -> Self {
        GameState {
            state: Array::from_shape_fn((3, 3), |(r, c)| cells[r * 3 + c]),
        }
    }
    pub fn cell(&self, action: usize) -> Mark {
        self[[action / 3, action % 3]]
    }
    pub fn to_state_key(&self, mover: Mark) -> StateKey {
        canonicalize(self.iter(), mover)
    }
    pub fn available_moves(&self) -> Vec<usize> {
        self.iter()
            .enumerate()
            .filter(|(_, &mark)| mark == Mark::Empty)
            .map(|(index, _)| index)
            .collect()
    }
    pub fn is_full(&self) -> bool {
        self.iter().all(|&mark| mark != Mark::Empty)
    }
    pub fn has_line(&self, mark: Mark) -> bool {
        let full = |line: ArrayView1<Mark>| line.iter().all(|&m| m == mark);
        self.rows().into_iter().any(full)
            || self.columns().into_iter().any(full)
            || full(self.diag())
            || {
                let mirrored = self.slice(s![.., ..;-1]);
                full(mirrored.diag())
            }
    }
    pub fn winner(&self) -> Option<Mark> {
        [Mark::Cross, Mark::Nought]
            .into_iter()
            .find(|&mark| self.has_line(mark))
    }
    pub fn outcome(&self) -> Outcome {
        match self.winner() {
            Some(mark) => Outcome::Win(mark),
            None if self.is_full() => Outcome::Drawn,
            None => Outcome::InPlay,
        }
    }
    /// Counter-clockwise quarter turns.
    pub fn rotated(&self, turns: usize) -> GameState {
        let mut rotated = self.state.clone();
        for _ in 0..turns % 4 {
            let next = rotated.t().slice(s![..;-1, ..]).to_owned();
            rotated = next;
        }
        GameState { state: rotated }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    pub fn new() -> Self {
        Board {
            current_state: GameState::new(),
            to_move: Mark::Cross,
        }
    }

    pub fn reset(&mut self) -> GameState {
        *self = Board::new();
        self.current_state.clone()
    }

    pub fn to_move(&self) -> Mark {
        self.to_move
    }

    pub fn current_player_is_first(&self) -> bool {
        self.to_move == Mark::Cross
    }

    pub fn check_winner(&self) -> Option<Mark> {
        self.current_state.winner()
    }

    pub fn is_draw(&self) -> bool {
        self.current_state.outcome() == Outcome::Drawn
    }

    pub fn is_done(&self) -> bool {
        self.current_state.outcome() != Outcome::InPlay
    }

    pub fn legal_actions(&self) -> Vec<usize> {
        self.current_state.available_moves()
    }

    /// Key of the current position seen from the player about to move.
    pub fn canonical_key(&self) -> StateKey {
        self.current_state.to_state_key(self.to_move)
    }

    pub fn key_for(&self, mark: Mark) -> StateKey {
        self.current_state.to_state_key(mark)
    }

    /// Places the mover's mark on `action` and passes the turn.
    ///
    /// Panics if the action is out of range, the cell is taken or the game
    /// is already over.
    pub fn step(&mut self, action: usize) -> Step {
        assert!(action < CELLS, "action {action} is out of range");
        assert!(!self.is_done(), "step called on a finished board");
        assert_eq!(
            self.current_state.cell(action),
            Mark::Empty,
            "cell {action} is already occupied"
        );
        self.current_state[[action / 3, action % 3]] = self.to_move;
        self.to_move = self.to_move.other();

        let outcome = self.current_state.outcome();
        let reward = match outcome {
            Outcome::Win(_) => WIN_REWARD,
            Outcome::Drawn => DRAW_REWARD,
            Outcome::InPlay => 0.0,
        };
        Step {
            next_state: self.current_state.clone(),
            reward,
            done: outcome != Outcome::InPlay,
            outcome,
        }
    }
}
