use learn_game::board::{Board, Mark, Outcome};
use learn_game::config::Config;
use learn_game::learner::{Learner, Transition};
use learn_game::players::{play_match, AgentPlayer, HumanPlayer};
use learn_game::policy::Policy;
use learn_game::q_table::{q_table_from_disk, q_table_to_disk, QTable};
use learn_game::state::{rotate_action, CELLS};
use learn_game::train_rl_agent;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::Cursor;

fn trained(episodes: usize, seed: u64) -> (Config, QTable) {
    let mut config = Config::default();
    config.training.episodes = episodes;
    let (q, _) = train_rl_agent(&config, StdRng::seed_from_u64(seed));
    (config, q)
}

#[test]
fn fresh_agent_opens_on_a_legal_cell() {
    let mut q = QTable::new();
    let board = Board::new();
    let mut rng = StdRng::seed_from_u64(0);
    let action = Policy::new(0.0, false).act(&mut q, &board.canonical_key(), &mut rng);
    assert!(action < CELLS);
}

#[test]
fn learned_win_is_taken_from_every_orientation() {
    // X on 0 and 1, O on 3 and 4, X to move: cell 2 wins.
    let mut board = Board::new();
    for mv in [0, 3, 1, 4] {
        board.step(mv);
    }
    let state = board.canonical_key();
    let mut after = board.clone();
    after.step(2);

    let mut q = QTable::new();
    Learner::new(0.3, 0.99).learn(
        &mut q,
        &Transition {
            state: state.clone(),
            next_state: after.key_for(Mark::Cross),
            action: 2,
            reward: 1.0,
            done: true,
        },
    );

    let player = Policy::new(0.0, true);
    let mut rng = StdRng::seed_from_u64(3);
    for turns in 0..4 {
        let rotated = state.rotated(turns);
        assert_eq!(player.act(&mut q, &rotated, &mut rng), rotate_action(2, turns));
    }
}

#[test]
fn self_play_game_reaches_an_end() {
    let (config, mut q) = trained(1_000, 12);
    let mut first = AgentPlayer::new("first".to_owned(), &config.agent, StdRng::seed_from_u64(1));
    let mut second = AgentPlayer::new("second".to_owned(), &config.agent, StdRng::seed_from_u64(2));
    let mut out = Vec::new();
    let outcome = play_match(&mut first, &mut second, &mut q, &mut out).unwrap();
    assert_ne!(outcome, Outcome::InPlay);
}

#[test]
fn trained_agent_plays_scripted_human_to_the_end() {
    let (config, mut q) = trained(2_000, 5);
    let states = q.len();
    let mut human = HumanPlayer::new(
        "Oscar".to_owned(),
        Cursor::new(b"0\n1\n2\n3\n4\n5\n6\n7\n8\n".to_vec()),
        Vec::new(),
    );
    let mut out = Vec::new();
    let outcome = learn_game::play_game_human_computer_player(
        &mut q,
        &config,
        false,
        StdRng::seed_from_u64(6),
        &mut human,
        &mut out,
    )
    .unwrap();
    assert_ne!(outcome, Outcome::InPlay);
    let shown = String::from_utf8(out).unwrap();
    assert!(shown.starts_with("--- AI vs Oscar ---"));
    // play mode only reads; unseen positions are added as zero vectors at most
    assert!(q.len() >= states);
}

#[test]
fn saved_table_plays_the_same() {
    let (_, q) = trained(300, 21);
    let dir = tempfile::tempdir().unwrap();
    let (json, pickle) = q_table_to_disk(dir.path(), &q).unwrap();
    assert_eq!(q_table_from_disk(&json).unwrap(), q);
    assert_eq!(q_table_from_disk(&pickle).unwrap(), q);
}
