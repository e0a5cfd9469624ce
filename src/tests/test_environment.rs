use super::common::scenario;
use crate::config::{GameConfig, RewardConfig};
use crate::env::{AgentId, Direction, Environment, EpisodeStatus, Position, Snake, OBSERVATION_SIZE};
use crate::error::SnakeError;

const EPS: f32 = 1e-6;

#[test]
fn test_step_without_food_moves_one_cell() {
    // Food straight below agent 2 and far from agent 1's path
    let mut env = scenario(
        Snake::new(Position::new(100, 100), Direction::Right),
        Snake::new(Position::new(700, 500), Direction::Left),
        Position::new(100, 500),
    );

    let [first, second] = env.step(0, 1).unwrap();

    let snake1 = env.state().snake(AgentId::One);
    assert_eq!(snake1.head(), Position::new(120, 100));
    assert_eq!(snake1.len(), 1);
    // Moving right increases agent 1's distance: step penalty only
    assert!((first.reward - -0.01).abs() < EPS);
    // Moving left brings agent 2 closer: penalty plus shaping bonus
    assert!((second.reward - 0.01).abs() < EPS);
    assert!(!first.done && !second.done);
    assert_eq!(env.state().steps, 1);
}

#[test]
fn test_eating_food_grows_and_relocates() {
    let mut env = scenario(
        Snake::new(Position::new(100, 100), Direction::Right),
        Snake::new(Position::new(700, 500), Direction::Left),
        Position::new(120, 100),
    );

    let [first, _] = env.step(0, 1).unwrap();

    let snake1 = env.state().snake(AgentId::One);
    assert_eq!(snake1.len(), 2);
    assert_eq!(snake1.head(), Position::new(120, 100));
    assert_eq!(snake1.body[1], Position::new(100, 100));
    assert_eq!(env.scores(), [1, 0]);
    assert!((first.reward - 1.0).abs() < EPS);

    let food = env.state().food;
    assert!(env.state().occupied().all(|&segment| segment != food));
}

#[test]
fn test_shared_food_cell_is_a_head_on_collision() {
    // Both heads land on the food cell, which is also a head-on collision
    let mut env = scenario(
        Snake::new(Position::new(100, 100), Direction::Right),
        Snake::new(Position::new(140, 100), Direction::Left),
        Position::new(120, 100),
    );

    let [first, second] = env.step(0, 1).unwrap();

    // Head-on overrides the shared food reward but the growth points stay
    assert!((first.reward - 0.1).abs() < EPS);
    assert!((second.reward - 0.1).abs() < EPS);
    assert_eq!(env.scores(), [2, 2]);
}

#[test]
fn test_head_on_collision_ends_both() {
    let mut env = scenario(
        Snake::new(Position::new(100, 100), Direction::Right),
        Snake::new(Position::new(140, 100), Direction::Left),
        Position::new(400, 400),
    );

    let [first, second] = env.step(0, 1).unwrap();

    assert!(first.done && second.done);
    assert!((first.reward - 0.1).abs() < EPS);
    assert!((second.reward - 0.1).abs() < EPS);
    assert_eq!(env.scores(), [1, 1]);
    assert_eq!(
        env.status(),
        EpisodeStatus::Terminal {
            agent1_done: true,
            agent2_done: true
        }
    );
}

#[test]
fn test_wall_crash_rewards_survivor() {
    let mut env = scenario(
        Snake::new(Position::new(780, 100), Direction::Right),
        Snake::new(Position::new(400, 400), Direction::Left),
        Position::new(0, 0),
    );

    let [first, second] = env.step(0, 1).unwrap();

    assert!((first.reward - -1.0).abs() < EPS);
    assert!((second.reward - 0.3).abs() < EPS);
    assert!(first.done && second.done);
    assert_eq!(env.scores(), [0, 1]);
}

#[test]
fn test_body_crash_into_other_snake() {
    // Agent 2 runs into the second segment of agent 1
    let snake1 = Snake::from_segments(
        vec![Position::new(200, 200), Position::new(200, 220), Position::new(200, 240)],
        Direction::Up,
    );
    let snake2 = Snake::new(Position::new(220, 220), Direction::Left);
    let mut env = scenario(snake1, snake2, Position::new(0, 0));

    // Agent 1 keeps going up, agent 2 moves left onto (200, 220)
    let [first, second] = env.step(2, 1).unwrap();

    assert!((first.reward - 0.3).abs() < EPS);
    assert!((second.reward - -1.0).abs() < EPS);
    assert_eq!(env.scores(), [1, 0]);
}

#[test]
fn test_both_crash_gives_no_points() {
    let mut env = scenario(
        Snake::new(Position::new(780, 100), Direction::Right),
        Snake::new(Position::new(0, 500), Direction::Left),
        Position::new(400, 400),
    );

    let [first, second] = env.step(0, 1).unwrap();

    assert!((first.reward - -1.0).abs() < EPS);
    assert!((second.reward - -1.0).abs() < EPS);
    assert_eq!(env.scores(), [0, 0]);
}

#[test]
fn test_reverse_request_is_ignored() {
    let mut env = Environment::with_seed(GameConfig::default(), RewardConfig::default(), 11).unwrap();

    // Agent 1 moves right and asks for left
    env.step(1, 1).unwrap();

    let snake1 = env.state().snake(AgentId::One);
    assert_eq!(snake1.direction, Direction::Right);
    assert_eq!(snake1.head(), Position::new(120, 100));
}

#[test]
fn test_step_after_terminal_is_rejected() {
    let mut env = scenario(
        Snake::new(Position::new(780, 100), Direction::Right),
        Snake::new(Position::new(400, 400), Direction::Left),
        Position::new(0, 0),
    );
    env.step(0, 1).unwrap();

    assert!(matches!(env.step(0, 1), Err(SnakeError::EpisodeOver)));
}

#[test]
fn test_reset_keeps_scores_until_cleared() {
    let mut env = scenario(
        Snake::new(Position::new(100, 100), Direction::Right),
        Snake::new(Position::new(140, 100), Direction::Left),
        Position::new(400, 400),
    );
    env.step(0, 1).unwrap();

    let observations = env.reset();

    assert_eq!(env.scores(), [1, 1]);
    assert_eq!(env.status(), EpisodeStatus::Running);
    assert_eq!(env.state().steps, 0);
    assert_eq!(env.state().snake(AgentId::One).head(), Position::new(100, 100));
    assert_eq!(env.state().snake(AgentId::Two).head(), Position::new(700, 500));
    assert_eq!(observations[0].len(), OBSERVATION_SIZE);

    env.clear_scores();
    assert_eq!(env.scores(), [0, 0]);
}

#[test]
fn test_food_never_spawns_on_a_snake() {
    for seed in 0..50 {
        let mut env = Environment::with_seed(GameConfig::default(), RewardConfig::default(), seed).unwrap();
        env.reset();
        let food = env.state().food;
        assert!(env.state().occupied().all(|&segment| segment != food));
        assert_eq!(food.x % 20, 0);
        assert_eq!(food.y % 20, 0);
    }
}

#[test]
fn test_observation_layout() {
    let mut env = scenario(
        Snake::new(Position::new(0, 100), Direction::Right),
        Snake::new(Position::new(700, 500), Direction::Left),
        Position::new(400, 100),
    );
    let observation = env.observe(AgentId::One);

    assert!((observation[0] - 0.0).abs() < EPS);
    assert!((observation[1] - 100.0 / 600.0).abs() < EPS);
    assert!((observation[2] - 0.5).abs() < EPS);
    assert!((observation[3] - 100.0 / 600.0).abs() < EPS);
    assert!((observation[4] - 0.4).abs() < EPS);
    // Heading one-hot: right, left, up, down
    assert_eq!(observation.slice(ndarray::s![5..9]).to_vec(), vec![1.0, 0.0, 0.0, 0.0]);
    // Danger flags: up, down, left (wall), right
    assert_eq!(observation.slice(ndarray::s![9..13]).to_vec(), vec![0.0, 0.0, 1.0, 0.0]);

    env.reset();
    let observation = env.observe(AgentId::Two);
    assert_eq!(observation.slice(ndarray::s![5..9]).to_vec(), vec![0.0, 1.0, 0.0, 0.0]);
}

#[test]
fn test_truncation_after_step_cap() {
    let config = GameConfig {
        max_episode_steps: 3,
        ..GameConfig::default()
    };
    let mut env = Environment::with_seed(config, RewardConfig::default(), 5).unwrap();
    for _ in 0..3 {
        assert!(!env.is_truncated());
        let [first, second] = env.step(0, 1).unwrap();
        assert!(!first.done && !second.done);
    }
    assert!(env.is_truncated());
}

#[test]
fn test_board_renders_heads_and_food() {
    let env = scenario(
        Snake::new(Position::new(0, 0), Direction::Right),
        Snake::new(Position::new(20, 0), Direction::Left),
        Position::new(40, 0),
    );
    let board = env.state().to_string();
    let first_line = board.lines().next().unwrap();
    assert!(first_line.starts_with("12*."));
    assert_eq!(first_line.len(), 40);
    assert!(board.contains("score 0 : 0"));
}
