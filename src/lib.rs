//! # Snake Duel - Two-Agent Deep Q-Learning on a Shared Snake Board
//!
//! Two snakes move simultaneously on one grid and compete for a single food
//! item. Each snake is an independent learner with its own Q-network,
//! target network, replay memory and exploration schedule.
//!
//! ## Key Features
//!
//! - **Environment**: deterministic simultaneous-move rules with pure resolution steps
//! - **Agents**: DQN with target network, global-norm gradient clipping and Adam
//! - **Persistence**: versioned model, memory and training-state files
//! - **Headless**: `step` never blocks; rendering and frame pacing live in the binary
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use snake_duel::config::SnakeConfig;
//! use snake_duel::persistence::CheckpointPaths;
//! use snake_duel::trainer::Trainer;
//!
//! let paths = CheckpointPaths::in_dir("checkpoints");
//! let mut trainer = Trainer::with_seed(SnakeConfig::default(), 7)?
//!     .with_log("training_log.csv")?;
//! trainer.resume(&paths)?;
//! trainer.train(1_000)?;
//! trainer.save_checkpoint(&paths)?;
//! # Ok::<(), snake_duel::error::SnakeError>(())
//! ```
//!
//! ## Module Organization
//!
//! - [`env`] - Board state, rules, observations and the stepping environment
//! - [`agent`] - Epsilon-greedy policy and the DQN agent
//! - [`network`] - Q-network and the `ValueEstimator` trait
//! - [`layers`] - Dense layer with cached forward and backward passes
//! - [`activations`] - ReLU and linear activations
//! - [`optimizer`] - SGD, Adam and gradient clipping
//! - [`replay_buffer`] - Bounded FIFO experience replay
//! - [`metrics`] - Per-agent reward and loss history
//! - [`trainer`] - Training context, tick loop and CSV log
//! - [`persistence`] - Versioned checkpoint files
//! - [`config`] - Game geometry, reward table and hyper-parameters
//! - [`error`] - Error types and result handling

pub mod activations;
pub mod agent;
pub mod config;
pub mod env;
pub mod error;
pub mod layers;
pub mod metrics;
pub mod network;
pub mod optimizer;
pub mod persistence;
pub mod replay_buffer;
pub mod trainer;

#[cfg(test)]
mod tests;
