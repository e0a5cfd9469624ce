use super::direction::{Direction, NUM_ACTIONS};
use super::observation::observe;
use super::rules;
use super::state::{AgentId, EpisodeStatus, GameState, Position, Snake};
use crate::config::{GameConfig, RewardConfig};
use crate::error::{Result, SnakeError};
use ndarray::Array1;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;

/// Rejection-sampling attempts before falling back to enumerating free cells
const FOOD_SPAWN_ATTEMPTS: usize = 64;

/// What one agent sees after a tick.
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    pub observation: Array1<f32>,
    pub reward: f32,
    pub done: bool,
}

/// Owns the shared board and steps both agents simultaneously.
pub struct Environment {
    config: GameConfig,
    rewards: RewardConfig,
    state: GameState,
    rng: StdRng,
}

impl Environment {
    /// Create an environment seeded from system entropy.
    pub fn new(config: GameConfig, rewards: RewardConfig) -> Result<Self> {
        Self::with_rng(config, rewards, StdRng::from_entropy())
    }

    /// Create an environment whose food placement is reproducible.
    pub fn with_seed(config: GameConfig, rewards: RewardConfig, seed: u64) -> Result<Self> {
        Self::with_rng(config, rewards, StdRng::seed_from_u64(seed))
    }

    /// Create an environment around an explicit board, e.g. a scripted scenario.
    pub fn from_state(
        config: GameConfig,
        rewards: RewardConfig,
        state: GameState,
        seed: u64,
    ) -> Result<Self> {
        config.validate()?;
        if state.snakes.iter().any(|snake| snake.is_empty()) {
            return Err(SnakeError::invalid_parameter(
                "state",
                "every snake needs at least one segment",
            ));
        }
        Ok(Self {
            config,
            rewards,
            state,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    fn with_rng(config: GameConfig, rewards: RewardConfig, rng: StdRng) -> Result<Self> {
        config.validate()?;
        let state = GameState {
            snakes: [
                Snake::new(config.start1.into(), config.start_direction1),
                Snake::new(config.start2.into(), config.start_direction2),
            ],
            food: Position::new(0, 0),
            scores: [0, 0],
            done: [false, false],
            steps: 0,
            width: config.width,
            height: config.height,
            cell: config.cell,
        };
        let mut env = Self {
            config,
            rewards,
            state,
            rng,
        };
        env.reset();
        Ok(env)
    }

    /// Restore the start layout and re-roll the food. Scores are kept.
    pub fn reset(&mut self) -> [Array1<f32>; 2] {
        self.state.snakes = [
            Snake::new(self.config.start1.into(), self.config.start_direction1),
            Snake::new(self.config.start2.into(), self.config.start_direction2),
        ];
        self.state.done = [false, false];
        self.state.steps = 0;
        if let Some(food) = self.spawn_food() {
            self.state.food = food;
        }
        [self.observe(AgentId::One), self.observe(AgentId::Two)]
    }

    /// Zero the cumulative scores.
    pub fn clear_scores(&mut self) {
        self.state.scores = [0, 0];
    }

    /// Advance both snakes by one tick.
    pub fn step(&mut self, action1: usize, action2: usize) -> Result<[StepOutcome; 2]> {
        if self.state.status() != EpisodeStatus::Running {
            return Err(SnakeError::EpisodeOver);
        }
        let requested = [to_direction(action1)?, to_direction(action2)?];

        let [snake1, snake2] = &self.state.snakes;
        let current = [snake1.direction, snake2.direction];
        let old_heads = [snake1.head(), snake2.head()];

        let directions = rules::resolve_directions(current, requested);
        let new_heads = rules::next_heads(old_heads, directions, self.config.cell);
        let food = rules::resolve_food(old_heads, new_heads, self.state.food, &self.rewards);

        self.state.snakes = rules::insert_heads(self.state.snakes.clone(), new_heads, directions);
        for agent in 0..2 {
            if food.grow[agent] {
                self.state.scores[agent] += 1;
            }
        }
        if food.eaten() {
            // Exclusion set includes the new heads and the tails still to be dropped
            if let Some(position) = self.spawn_food() {
                self.state.food = position;
            }
        }
        self.state.snakes = rules::trim_tails(self.state.snakes.clone(), food.grow);

        let report = rules::detect_collisions(&self.state.snakes, self.config.width, self.config.height);
        let outcome = rules::resolve_collisions(report, food.rewards, &self.rewards);
        for agent in 0..2 {
            self.state.scores[agent] += outcome.points[agent];
        }
        self.state.done = outcome.done;
        self.state.steps += 1;

        Ok([
            StepOutcome {
                observation: self.observe(AgentId::One),
                reward: outcome.rewards[0],
                done: outcome.done[0],
            },
            StepOutcome {
                observation: self.observe(AgentId::Two),
                reward: outcome.rewards[1],
                done: outcome.done[1],
            },
        ])
    }

    pub fn observe(&self, agent: AgentId) -> Array1<f32> {
        observe(&self.state, agent, &self.config)
    }

    pub fn status(&self) -> EpisodeStatus {
        self.state.status()
    }

    /// True once the episode has used up its step budget.
    pub fn is_truncated(&self) -> bool {
        self.state.steps >= self.config.max_episode_steps
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn rewards(&self) -> &RewardConfig {
        &self.rewards
    }

    pub fn scores(&self) -> [u32; 2] {
        self.state.scores
    }

    /// Pick a cell not covered by either snake, or `None` when the board is full.
    fn spawn_food(&mut self) -> Option<Position> {
        let occupied: HashSet<Position> = self.state.occupied().copied().collect();
        let columns = self.config.columns();
        let rows = self.config.rows();
        let cell = self.config.cell;

        for _ in 0..FOOD_SPAWN_ATTEMPTS {
            let candidate = Position::new(
                self.rng.gen_range(0..columns) * cell,
                self.rng.gen_range(0..rows) * cell,
            );
            if !occupied.contains(&candidate) {
                return Some(candidate);
            }
        }

        let free: Vec<Position> = (0..rows)
            .flat_map(|row| (0..columns).map(move |column| Position::new(column * cell, row * cell)))
            .filter(|position| !occupied.contains(position))
            .collect();
        free.choose(&mut self.rng).copied()
    }
}

fn to_direction(action: usize) -> Result<Direction> {
    Direction::from_action(action).ok_or(SnakeError::InvalidAction {
        action,
        max_actions: NUM_ACTIONS,
    })
}
