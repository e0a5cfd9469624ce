//! # Two-Agent Snake Environment
//!
//! A deterministic grid world shared by two snakes and one food item. Both
//! snakes move in the same tick; the environment resolves food, growth and
//! collisions and returns one `(observation, reward, done)` per agent.
//!
//! ```rust
//! use snake_duel::config::{GameConfig, RewardConfig};
//! use snake_duel::env::Environment;
//!
//! let mut env = Environment::with_seed(GameConfig::default(), RewardConfig::default(), 7).unwrap();
//! let [first, second] = env.step(0, 1).unwrap();
//! assert!(!first.done && !second.done);
//! ```

pub mod arena;
pub mod direction;
pub mod observation;
pub mod rules;
pub mod state;

pub use arena::{Environment, StepOutcome};
pub use direction::{Direction, NUM_ACTIONS};
pub use observation::{observe, OBSERVATION_SIZE};
pub use state::{AgentId, EpisodeStatus, GameState, Position, Snake};
