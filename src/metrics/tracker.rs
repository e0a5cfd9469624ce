use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Per-agent history of episode rewards and training losses.
///
/// Both histories are bounded; the oldest entry is dropped once
/// `history_size` values are stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardHistory {
    /// Total reward of each finished episode
    pub episode_rewards: VecDeque<f32>,

    /// Loss of each gradient step
    pub losses: VecDeque<f32>,

    history_size: usize,
    current_episode_reward: f32,
    episode_count: usize,
}

impl RewardHistory {
    pub fn new(history_size: usize) -> Self {
        RewardHistory {
            episode_rewards: VecDeque::with_capacity(history_size),
            losses: VecDeque::with_capacity(history_size),
            history_size,
            current_episode_reward: 0.0,
            episode_count: 0,
        }
    }

    /// Start a new episode
    pub fn start_episode(&mut self) {
        self.current_episode_reward = 0.0;
    }

    /// Record the reward of one step within the current episode
    pub fn step(&mut self, reward: f32) {
        self.current_episode_reward += reward;
    }

    /// Close the current episode and return its total reward
    pub fn end_episode(&mut self) -> f32 {
        let total = self.current_episode_reward;
        push_bounded(&mut self.episode_rewards, total, self.history_size);
        self.episode_count += 1;
        self.current_episode_reward = 0.0;
        total
    }

    pub fn record_loss(&mut self, loss: f32) {
        push_bounded(&mut self.losses, loss, self.history_size);
    }

    /// Reward accumulated so far in the running episode
    pub fn current_episode_reward(&self) -> f32 {
        self.current_episode_reward
    }

    pub fn episode_count(&self) -> usize {
        self.episode_count
    }

    /// Mean total reward of the last `window` finished episodes
    pub fn avg_episode_reward(&self, window: usize) -> Option<f32> {
        recent_mean(&self.episode_rewards, window)
    }

    /// Mean of the last `window` losses
    pub fn avg_loss(&self, window: usize) -> Option<f32> {
        recent_mean(&self.losses, window)
    }
}

impl Default for RewardHistory {
    fn default() -> Self {
        Self::new(1000)
    }
}

fn push_bounded(values: &mut VecDeque<f32>, value: f32, limit: usize) {
    if limit == 0 {
        return;
    }
    if values.len() >= limit {
        values.pop_front();
    }
    values.push_back(value);
}

fn recent_mean(values: &VecDeque<f32>, window: usize) -> Option<f32> {
    let n = window.min(values.len());
    if n == 0 {
        return None;
    }
    let sum: f32 = values.iter().rev().take(n).sum();
    Some(sum / n as f32)
}
