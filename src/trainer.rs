//! # Training Orchestration
//!
//! The [`Trainer`] owns one environment, one [`DqnAgent`] per snake and the
//! [`TrainingContext`] holding every counter that evolves during a run.
//! One call to [`Trainer::tick`] is one simulation step for both agents:
//!
//! 1. observe, then act with each agent's epsilon
//! 2. step the environment and store one transition per agent
//! 3. every `train_every` global steps, one gradient step per agent
//! 4. every `target_sync_every` global steps, refresh both target networks
//! 5. decay both epsilons

use crate::agent::{decay_epsilon, DqnAgent};
use crate::config::{SnakeConfig, TrainingConfig};
use crate::env::{AgentId, Environment, GameState, StepOutcome, NUM_ACTIONS, OBSERVATION_SIZE};
use crate::error::Result;
use crate::metrics::RewardHistory;
use crate::persistence::{self, CheckpointPaths, TrainingState};
use crate::replay_buffer::Transition;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const LOG_HEADER: &str = "episode,score1,score2,avg_reward1,avg_reward2";

/// Everything that changes over a run apart from parameters and memories.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingContext {
    pub epsilon: [f32; 2],
    /// Ticks taken since the run started, across episodes
    pub global_step: u64,
    /// Episodes finished
    pub episode: u64,
    pub histories: [RewardHistory; 2],
}

impl TrainingContext {
    pub fn new(config: &TrainingConfig) -> Self {
        TrainingContext {
            epsilon: [config.epsilon_start; 2],
            global_step: 0,
            episode: 0,
            histories: [
                RewardHistory::new(config.reward_window),
                RewardHistory::new(config.reward_window),
            ],
        }
    }

    pub fn training_state(&self) -> TrainingState {
        TrainingState {
            epsilon: self.epsilon,
            global_step: self.global_step,
            episode: self.episode,
        }
    }

    pub fn restore(&mut self, state: &TrainingState) {
        self.epsilon = state.epsilon;
        self.global_step = state.global_step;
        self.episode = state.episode;
    }
}

/// Result of one finished episode.
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeSummary {
    /// 1-based episode number over the whole run
    pub episode: u64,
    pub steps: usize,
    /// Points gained by each snake during this episode
    pub score_delta: [u32; 2],
    pub total_reward: [f32; 2],
    /// True when the episode ended at the step cap rather than a collision
    pub truncated: bool,
}

/// Append-only CSV log of training progress.
#[derive(Debug, Clone)]
pub struct TrainingLog {
    path: PathBuf,
}

impl TrainingLog {
    /// Open `path`, writing the header when the file does not exist yet.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, format!("{}\n", LOG_HEADER))?;
        }
        Ok(TrainingLog { path })
    }

    pub fn append(&self, episode: u64, score_delta: [u32; 2], avg_reward: [f32; 2]) -> Result<()> {
        let mut file = OpenOptions::new().append(true).open(&self.path)?;
        writeln!(
            file,
            "{},{},{},{:.2},{:.2}",
            episode, score_delta[0], score_delta[1], avg_reward[0], avg_reward[1]
        )?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

pub struct Trainer {
    config: SnakeConfig,
    env: Environment,
    agents: [DqnAgent; 2],
    context: TrainingContext,
    log: Option<TrainingLog>,
}

impl Trainer {
    /// Create a trainer seeded from system entropy.
    pub fn new(config: SnakeConfig) -> Result<Self> {
        Self::with_seed(config, rand::random())
    }

    /// Create a fully reproducible trainer. The environment and both agents
    /// get distinct seeds derived from `seed`.
    pub fn with_seed(config: SnakeConfig, seed: u64) -> Result<Self> {
        config.validate()?;
        let env = Environment::with_seed(config.game.clone(), config.rewards.clone(), seed)?;
        let agents = [
            DqnAgent::new(&config.training, OBSERVATION_SIZE, NUM_ACTIONS, seed.wrapping_add(1))?,
            DqnAgent::new(&config.training, OBSERVATION_SIZE, NUM_ACTIONS, seed.wrapping_add(2))?,
        ];
        let context = TrainingContext::new(&config.training);
        Ok(Trainer {
            config,
            env,
            agents,
            context,
            log: None,
        })
    }

    /// Append progress lines to the CSV file at `path`.
    pub fn with_log<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        self.log = Some(TrainingLog::create(path)?);
        Ok(self)
    }

    /// One simulation step for both agents, including the train and sync
    /// cadences and epsilon decay.
    pub fn tick(&mut self) -> Result<[StepOutcome; 2]> {
        let observations = [self.env.observe(AgentId::One), self.env.observe(AgentId::Two)];
        let actions = [
            self.agents[0].act(observations[0].view(), self.context.epsilon[0])?,
            self.agents[1].act(observations[1].view(), self.context.epsilon[1])?,
        ];

        let outcomes = self.env.step(actions[0], actions[1])?;

        for (index, (agent, observation)) in self.agents.iter_mut().zip(observations).enumerate() {
            let outcome = &outcomes[index];
            agent.remember(Transition {
                observation,
                action: actions[index],
                reward: outcome.reward,
                next_observation: outcome.observation.clone(),
                done: outcome.done,
            })?;
            self.context.histories[index].step(outcome.reward);
        }

        let training = &self.config.training;
        if self.context.global_step % training.train_every == 0 {
            for (agent, history) in self.agents.iter_mut().zip(self.context.histories.iter_mut()) {
                if let Some(loss) = agent.train_step()? {
                    history.record_loss(loss);
                }
            }
        }

        self.context.global_step += 1;

        if self.context.global_step % training.target_sync_every == 0 {
            for agent in self.agents.iter_mut() {
                agent.sync_target();
            }
            debug!(global_step = self.context.global_step, "target networks synced");
        }

        for epsilon in self.context.epsilon.iter_mut() {
            *epsilon = decay_epsilon(*epsilon, training.epsilon_decay, training.epsilon_min);
        }

        Ok(outcomes)
    }

    /// Run one episode from a fresh reset.
    pub fn run_episode(&mut self) -> Result<EpisodeSummary> {
        self.run_episode_with(|_| {})
    }

    /// Run one episode, handing the board to `observer` after the reset and
    /// after every tick.
    pub fn run_episode_with<F: FnMut(&GameState)>(&mut self, mut observer: F) -> Result<EpisodeSummary> {
        self.env.reset();
        let scores_before = self.env.scores();
        for history in self.context.histories.iter_mut() {
            history.start_episode();
        }
        observer(self.env.state());

        let mut steps = 0;
        let truncated = loop {
            let outcomes = self.tick()?;
            steps += 1;
            observer(self.env.state());
            if outcomes.iter().any(|outcome| outcome.done) {
                break false;
            }
            if self.env.is_truncated() {
                break true;
            }
        };

        self.context.episode += 1;
        let scores_after = self.env.scores();
        let score_delta = [
            scores_after[0] - scores_before[0],
            scores_after[1] - scores_before[1],
        ];
        let total_reward = [
            self.context.histories[0].end_episode(),
            self.context.histories[1].end_episode(),
        ];

        debug!(
            episode = self.context.episode,
            steps,
            truncated,
            score1 = score_delta[0],
            score2 = score_delta[1],
            reward1 = total_reward[0],
            reward2 = total_reward[1],
            "episode finished"
        );

        Ok(EpisodeSummary {
            episode: self.context.episode,
            steps,
            score_delta,
            total_reward,
            truncated,
        })
    }

    /// Run `episodes` episodes, writing a log line every `log_every`
    /// episodes and after the last one.
    pub fn train(&mut self, episodes: usize) -> Result<Vec<EpisodeSummary>> {
        let mut summaries = Vec::with_capacity(episodes);
        for index in 0..episodes {
            let summary = self.run_episode()?;
            let is_last = index + 1 == episodes;
            if summary.episode % self.config.training.log_every == 0 || is_last {
                self.report(&summary)?;
            }
            summaries.push(summary);
        }
        Ok(summaries)
    }

    fn report(&self, summary: &EpisodeSummary) -> Result<()> {
        let window = self.config.training.reward_window;
        let avg_reward = [
            self.context.histories[0].avg_episode_reward(window).unwrap_or(0.0),
            self.context.histories[1].avg_episode_reward(window).unwrap_or(0.0),
        ];
        let avg_loss = [
            self.context.histories[0].avg_loss(window).unwrap_or(0.0),
            self.context.histories[1].avg_loss(window).unwrap_or(0.0),
        ];
        info!(
            episode = summary.episode,
            score1 = summary.score_delta[0],
            score2 = summary.score_delta[1],
            avg_reward1 = avg_reward[0],
            avg_reward2 = avg_reward[1],
            avg_loss1 = avg_loss[0],
            avg_loss2 = avg_loss[1],
            epsilon1 = self.context.epsilon[0],
            epsilon2 = self.context.epsilon[1],
            "training progress"
        );
        if let Some(log) = &self.log {
            log.append(summary.episode, summary.score_delta, avg_reward)?;
        }
        Ok(())
    }

    /// Write both models, both memories and the training state.
    pub fn save_checkpoint(&self, paths: &CheckpointPaths) -> Result<()> {
        for (index, agent) in self.agents.iter().enumerate() {
            agent.save_model(&paths.models[index])?;
            agent.save_memory(&paths.memories[index])?;
        }
        persistence::write_json(&paths.training_state, &self.context.training_state())?;
        info!(
            episode = self.context.episode,
            global_step = self.context.global_step,
            "checkpoint saved"
        );
        Ok(())
    }

    /// Load whatever checkpoint files exist. Absent files leave the fresh
    /// state in place; unreadable ones abort with an error.
    pub fn resume(&mut self, paths: &CheckpointPaths) -> Result<()> {
        for (index, agent) in self.agents.iter_mut().enumerate() {
            let model = &paths.models[index];
            if agent.load_model(model).map_err(|err| warn_unreadable(model, err))? {
                info!(path = %model.display(), "model loaded");
            } else {
                info!(path = %model.display(), "model file not found, starting fresh");
            }

            let memory = &paths.memories[index];
            if agent.load_memory(memory).map_err(|err| warn_unreadable(memory, err))? {
                info!(path = %memory.display(), transitions = agent.memory().len(), "memory loaded");
            } else {
                info!(path = %memory.display(), "memory file not found, starting fresh");
            }
        }

        let state_path = &paths.training_state;
        match persistence::read_json::<TrainingState>(state_path)
            .map_err(|err| warn_unreadable(state_path, err))?
        {
            Some(state) => {
                self.context.restore(&state);
                info!(
                    episode = state.episode,
                    global_step = state.global_step,
                    epsilon1 = state.epsilon[0],
                    epsilon2 = state.epsilon[1],
                    "training state restored"
                );
            }
            None => info!(path = %state_path.display(), "training state not found, starting fresh"),
        }
        Ok(())
    }

    pub fn config(&self) -> &SnakeConfig {
        &self.config
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn env_mut(&mut self) -> &mut Environment {
        &mut self.env
    }

    pub fn agent(&self, agent: AgentId) -> &DqnAgent {
        &self.agents[agent.index()]
    }

    pub fn agent_mut(&mut self, agent: AgentId) -> &mut DqnAgent {
        &mut self.agents[agent.index()]
    }

    pub fn context(&self) -> &TrainingContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut TrainingContext {
        &mut self.context
    }
}

fn warn_unreadable(path: &Path, err: crate::error::SnakeError) -> crate::error::SnakeError {
    warn!(path = %path.display(), error = %err, "checkpoint file unreadable");
    err
}
