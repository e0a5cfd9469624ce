//! # Configuration
//!
//! All tunable numbers of a training run live here: the board geometry,
//! the reward table and the learning hyper-parameters. The defaults are the
//! canonical configuration the saved models are trained with.
//!
//! ```rust
//! use snake_duel::config::SnakeConfig;
//!
//! let mut config = SnakeConfig::default();
//! config.training.batch_size = 64;
//! assert!(config.validate().is_ok());
//! ```

use crate::env::Direction;
use crate::error::{Result, SnakeError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Board geometry, start layout and episode cap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Board width in pixels
    pub width: i32,
    /// Board height in pixels
    pub height: i32,
    /// Side of one grid cell in pixels; every position is a multiple of it
    pub cell: i32,
    /// Head position and heading of agent 1 after a reset
    pub start1: (i32, i32),
    pub start_direction1: Direction,
    /// Head position and heading of agent 2 after a reset
    pub start2: (i32, i32),
    pub start_direction2: Direction,
    /// Divisor applied to the head-to-food distance in observations
    pub distance_normalization: f32,
    /// Steps after which an episode is truncated
    pub max_episode_steps: usize,
}

impl GameConfig {
    /// Number of cells along the x axis
    pub fn columns(&self) -> i32 {
        self.width / self.cell
    }

    /// Number of cells along the y axis
    pub fn rows(&self) -> i32 {
        self.height / self.cell
    }

    pub fn validate(&self) -> Result<()> {
        if self.cell <= 0 {
            return Err(SnakeError::invalid_parameter(
                "cell",
                format!("must be positive, got {}", self.cell),
            ));
        }
        if self.width < self.cell || self.height < self.cell {
            return Err(SnakeError::invalid_parameter(
                "width/height",
                format!(
                    "board {}x{} cannot hold a single {}px cell",
                    self.width, self.height, self.cell
                ),
            ));
        }
        if self.width % self.cell != 0 || self.height % self.cell != 0 {
            return Err(SnakeError::invalid_parameter(
                "width/height",
                format!("must be multiples of the cell size {}", self.cell),
            ));
        }
        for (name, (x, y)) in [("start1", self.start1), ("start2", self.start2)] {
            let on_board = x >= 0 && y >= 0 && x < self.width && y < self.height;
            if !on_board || x % self.cell != 0 || y % self.cell != 0 {
                return Err(SnakeError::invalid_parameter(
                    name,
                    format!("({}, {}) is not a grid-aligned cell on the board", x, y),
                ));
            }
        }
        if self.start1 == self.start2 {
            return Err(SnakeError::invalid_parameter(
                "start2",
                "must differ from start1",
            ));
        }
        if self.distance_normalization <= 0.0 {
            return Err(SnakeError::invalid_parameter(
                "distance_normalization",
                format!("must be positive, got {}", self.distance_normalization),
            ));
        }
        if self.max_episode_steps == 0 {
            return Err(SnakeError::invalid_parameter(
                "max_episode_steps",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            cell: 20,
            start1: (100, 100),
            start_direction1: Direction::Right,
            start2: (700, 500),
            start_direction2: Direction::Left,
            distance_normalization: 1000.0,
            max_episode_steps: 200,
        }
    }
}

/// Reward table applied by the environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardConfig {
    pub step: f32,
    pub food_individual: f32,
    pub food_shared: f32,
    pub closer_to_food: f32,
    pub head_collision: f32,
    pub death: f32,
    pub win: f32,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            step: -0.01,
            food_individual: 1.0,
            food_shared: 0.5,
            closer_to_food: 0.02,
            head_collision: 0.1,
            death: -1.0,
            win: 0.3,
        }
    }
}

/// Hyper-parameters of the Q-learning loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Widths of the hidden layers between observation and action values
    pub hidden_layers: Vec<usize>,

    /// Adam step size
    ///
    /// Default: 1e-3
    pub learning_rate: f32,

    pub adam_beta1: f32,
    pub adam_beta2: f32,
    pub adam_epsilon: f32,

    /// Discount factor for bootstrapped targets
    ///
    /// Default: 0.99
    pub gamma: f32,

    /// Transitions per gradient step; also the warm-up threshold
    pub batch_size: usize,

    /// Replay buffer capacity per agent
    pub buffer_capacity: usize,

    /// A gradient step is attempted every `train_every` global steps
    pub train_every: u64,

    /// Live parameters are copied to the target every `target_sync_every` global steps
    pub target_sync_every: u64,

    pub epsilon_start: f32,
    /// Multiplicative decay applied to epsilon after every step
    pub epsilon_decay: f32,
    pub epsilon_min: f32,

    /// Global gradient norm ceiling
    pub max_grad_norm: f32,

    /// Episodes between two lines of the training log
    pub log_every: u64,

    /// Episodes averaged for the reward column of the training log
    pub reward_window: usize,
}

impl TrainingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.hidden_layers.iter().any(|&size| size == 0) {
            return Err(SnakeError::invalid_parameter(
                "hidden_layers",
                "every hidden layer needs at least one unit",
            ));
        }
        if self.learning_rate <= 0.0 {
            return Err(SnakeError::invalid_parameter(
                "learning_rate",
                format!("must be positive, got {}", self.learning_rate),
            ));
        }
        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(SnakeError::invalid_parameter(
                "gamma",
                format!("must be in [0, 1], got {}", self.gamma),
            ));
        }
        if self.batch_size == 0 {
            return Err(SnakeError::invalid_parameter("batch_size", "must be at least 1"));
        }
        if self.buffer_capacity < self.batch_size {
            return Err(SnakeError::invalid_parameter(
                "buffer_capacity",
                format!(
                    "({}) cannot be smaller than batch_size ({})",
                    self.buffer_capacity, self.batch_size
                ),
            ));
        }
        if self.train_every == 0 || self.target_sync_every == 0 || self.log_every == 0 {
            return Err(SnakeError::invalid_parameter(
                "train_every/target_sync_every/log_every",
                "cadences must be at least 1",
            ));
        }
        if !(0.0..=1.0).contains(&self.epsilon_start) || !(0.0..=1.0).contains(&self.epsilon_min) {
            return Err(SnakeError::invalid_parameter(
                "epsilon_start/epsilon_min",
                "must be probabilities in [0, 1]",
            ));
        }
        if self.epsilon_min > self.epsilon_start {
            return Err(SnakeError::invalid_parameter(
                "epsilon_min",
                format!(
                    "floor {} is above the starting value {}",
                    self.epsilon_min, self.epsilon_start
                ),
            ));
        }
        if self.epsilon_decay <= 0.0 || self.epsilon_decay > 1.0 {
            return Err(SnakeError::invalid_parameter(
                "epsilon_decay",
                format!("must be in (0, 1], got {}", self.epsilon_decay),
            ));
        }
        if self.max_grad_norm <= 0.0 {
            return Err(SnakeError::invalid_parameter(
                "max_grad_norm",
                format!("must be positive, got {}", self.max_grad_norm),
            ));
        }
        if self.reward_window == 0 {
            return Err(SnakeError::invalid_parameter("reward_window", "must be at least 1"));
        }
        Ok(())
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            hidden_layers: vec![256, 256],
            learning_rate: 1e-3,
            adam_beta1: 0.9,
            adam_beta2: 0.999,
            adam_epsilon: 1e-8,
            gamma: 0.99,
            batch_size: 128,
            buffer_capacity: 10_000,
            train_every: 16,
            target_sync_every: 200,
            epsilon_start: 1.0,
            epsilon_decay: 0.9995,
            epsilon_min: 0.01,
            max_grad_norm: 1.0,
            log_every: 100,
            reward_window: 100,
        }
    }
}

/// Complete configuration of a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnakeConfig {
    #[serde(default)]
    pub game: GameConfig,
    #[serde(default)]
    pub rewards: RewardConfig,
    #[serde(default)]
    pub training: TrainingConfig,
}

impl SnakeConfig {
    pub fn validate(&self) -> Result<()> {
        self.game.validate()?;
        self.training.validate()
    }

    /// Read a JSON configuration file; missing sections fall back to defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }
}
