use crate::error::{Result, SnakeError};
use crate::persistence;
use ndarray::Array1;
use rand::seq::index;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::path::Path;

/// One step of experience seen by a single agent.
///
/// `done` is true only for real terminal transitions; an episode cut off
/// by the step cap stores `false`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Transition {
    pub observation: Array1<f32>,
    pub action: usize,
    pub reward: f32,
    pub next_observation: Array1<f32>,
    pub done: bool,
}

/// Bounded FIFO store of transitions; the oldest one is evicted first.
#[derive(Clone, Debug)]
pub struct ReplayBuffer {
    buffer: VecDeque<Transition>,
    capacity: usize,
}

impl ReplayBuffer {
    pub fn new(capacity: usize) -> Self {
        ReplayBuffer {
            buffer: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, transition: Transition) {
        if self.capacity == 0 {
            return;
        }
        if self.buffer.len() == self.capacity {
            self.buffer.pop_front();
        }
        self.buffer.push_back(transition);
    }

    /// Draw `batch_size` distinct transitions uniformly at random.
    pub fn sample<R: Rng + ?Sized>(&self, batch_size: usize, rng: &mut R) -> Result<Vec<&Transition>> {
        if batch_size > self.buffer.len() {
            return Err(SnakeError::InsufficientData {
                requested: batch_size,
                available: self.buffer.len(),
            });
        }
        Ok(index::sample(rng, self.buffer.len(), batch_size)
            .into_iter()
            .map(|i| &self.buffer[i])
            .collect())
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest first
    pub fn iter(&self) -> impl Iterator<Item = &Transition> {
        self.buffer.iter()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Replace the contents with the most recent `capacity` of `transitions`.
    pub fn extend_recent(&mut self, transitions: Vec<Transition>) {
        self.buffer.clear();
        let skip = transitions.len().saturating_sub(self.capacity);
        self.buffer.extend(transitions.into_iter().skip(skip));
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let transitions: Vec<&Transition> = self.buffer.iter().collect();
        persistence::write_binary(path, &transitions)
    }

    /// Load a saved buffer into this one. Returns `false` when the file is absent.
    pub fn load(&mut self, path: &Path) -> Result<bool> {
        match persistence::read_binary::<Vec<Transition>>(path)? {
            Some(transitions) => {
                self.extend_recent(transitions);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
