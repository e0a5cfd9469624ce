//! # Learning Agents
//!
//! Each snake is driven by its own [`DqnAgent`]: a live Q-network, a target
//! copy refreshed on demand, an optimizer and a private replay memory.
//! Action selection lives in [`policy`] as free functions so it can be
//! used with any [`ValueEstimator`](crate::network::ValueEstimator).
//!
//! ## Core Concepts
//!
//! - **Epsilon-greedy**: act randomly with probability epsilon, otherwise greedily
//! - **Target network**: frozen between syncs, used only for bootstrapped targets
//! - **Warm-up**: no gradient step until the memory holds a full batch

pub mod dqn;
pub mod policy;

pub use dqn::{bootstrapped_targets, DqnAgent};
pub use policy::{decay_epsilon, greedy_action, select_action};
