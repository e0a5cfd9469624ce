use crate::config::{GameConfig, RewardConfig, SnakeConfig, TrainingConfig};
use crate::env::{Environment, GameState, Position, Snake};
use crate::replay_buffer::Transition;
use ndarray::Array1;

/// Environment on the default board with a hand-placed layout.
pub fn scenario(snake1: Snake, snake2: Snake, food: Position) -> Environment {
    let config = GameConfig::default();
    let state = GameState {
        snakes: [snake1, snake2],
        food,
        scores: [0, 0],
        done: [false, false],
        steps: 0,
        width: config.width,
        height: config.height,
        cell: config.cell,
    };
    Environment::from_state(config, RewardConfig::default(), state, 3).unwrap()
}

/// Small network and batch so tests train in milliseconds.
pub fn small_training_config() -> TrainingConfig {
    TrainingConfig {
        hidden_layers: vec![16],
        batch_size: 8,
        buffer_capacity: 64,
        train_every: 1,
        target_sync_every: 5,
        log_every: 2,
        reward_window: 10,
        ..TrainingConfig::default()
    }
}

pub fn small_config() -> SnakeConfig {
    SnakeConfig {
        game: GameConfig {
            max_episode_steps: 20,
            ..GameConfig::default()
        },
        rewards: RewardConfig::default(),
        training: small_training_config(),
    }
}

pub fn transition(value: f32, action: usize, done: bool) -> Transition {
    Transition {
        observation: Array1::from_elem(13, value),
        action,
        reward: value,
        next_observation: Array1::from_elem(13, value + 1.0),
        done,
    }
}
