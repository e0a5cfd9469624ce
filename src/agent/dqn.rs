use super::policy::select_action;
use crate::config::TrainingConfig;
use crate::error::{Result, SnakeError};
use crate::network::{QNetwork, ValueEstimator};
use crate::optimizer::{Adam, GradientClipper, OptimizerWrapper, SGD};
use crate::persistence;
use crate::replay_buffer::{ReplayBuffer, Transition};
use ndarray::{Array1, Array2, ArrayView1, Axis};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::Path;
use tracing::debug;

/// Deep Q-Network agent with a target network and its own replay memory.
///
/// The agent never decides when to train or sync; the caller drives both
/// cadences and owns the exploration rate.
///
/// # Example
///
/// ```rust
/// use snake_duel::agent::DqnAgent;
/// use snake_duel::config::TrainingConfig;
/// use snake_duel::replay_buffer::Transition;
/// use ndarray::Array1;
///
/// let config = TrainingConfig { hidden_layers: vec![16], batch_size: 2, ..TrainingConfig::default() };
/// let mut agent = DqnAgent::new(&config, 13, 4, 42).unwrap();
///
/// let observation = Array1::<f32>::zeros(13);
/// let action = agent.act(observation.view(), 1.0).unwrap();
/// agent.remember(Transition {
///     observation: observation.clone(),
///     action,
///     reward: -0.01,
///     next_observation: observation,
///     done: false,
/// }).unwrap();
///
/// // Still warming up: one transition is fewer than a batch
/// assert!(agent.train_step().unwrap().is_none());
/// ```
pub struct DqnAgent {
    /// Network being trained and used for action selection
    pub q_network: QNetwork,

    /// Frozen copy used for bootstrapped targets between syncs
    pub target_network: QNetwork,

    optimizer: OptimizerWrapper,
    clipper: GradientClipper,
    memory: ReplayBuffer,

    pub gamma: f32,
    pub batch_size: usize,
    pub learning_rate: f32,

    /// Number of gradient steps performed
    pub train_steps: usize,

    rng: StdRng,
}

impl DqnAgent {
    /// Create an agent for `input_size` observations and `num_actions` actions.
    /// All randomness (weights, exploration, sampling) derives from `seed`.
    pub fn new(config: &TrainingConfig, input_size: usize, num_actions: usize, seed: u64) -> Result<Self> {
        config.validate()?;
        let mut rng = StdRng::seed_from_u64(seed);

        let mut layer_sizes = Vec::with_capacity(config.hidden_layers.len() + 2);
        layer_sizes.push(input_size);
        layer_sizes.extend_from_slice(&config.hidden_layers);
        layer_sizes.push(num_actions);

        let q_network = QNetwork::new(&layer_sizes, &mut rng)?;
        let target_network = q_network.clone();
        let optimizer = OptimizerWrapper::Adam(Adam::new(
            &q_network.layers,
            config.adam_beta1,
            config.adam_beta2,
            config.adam_epsilon,
        ));

        Ok(DqnAgent {
            q_network,
            target_network,
            optimizer,
            clipper: GradientClipper::ClipByGlobalNorm {
                max_norm: config.max_grad_norm,
            },
            memory: ReplayBuffer::new(config.buffer_capacity),
            gamma: config.gamma,
            batch_size: config.batch_size,
            learning_rate: config.learning_rate,
            train_steps: 0,
            rng,
        })
    }

    pub fn with_optimizer(mut self, optimizer: OptimizerWrapper) -> Self {
        self.optimizer = optimizer;
        self
    }

    pub fn with_clipper(mut self, clipper: GradientClipper) -> Self {
        self.clipper = clipper;
        self
    }

    /// Select an action with epsilon-greedy exploration.
    pub fn act(&mut self, observation: ArrayView1<f32>, epsilon: f32) -> Result<usize> {
        self.check_observation(observation)?;
        Ok(select_action(&self.q_network, observation, epsilon, &mut self.rng))
    }

    /// Store a transition in the replay memory.
    pub fn remember(&mut self, transition: Transition) -> Result<()> {
        self.check_transition(&transition)?;
        self.memory.push(transition);
        Ok(())
    }

    pub fn memory(&self) -> &ReplayBuffer {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut ReplayBuffer {
        &mut self.memory
    }

    /// One gradient step on a sampled batch.
    ///
    /// Returns `Ok(None)` while the memory holds fewer than `batch_size`
    /// transitions, otherwise the batch loss before the update.
    pub fn train_step(&mut self) -> Result<Option<f32>> {
        if self.batch_size == 0 || self.memory.len() < self.batch_size {
            return Ok(None);
        }

        let batch = self.memory.sample(self.batch_size, &mut self.rng)?;
        let batch_size = batch.len();
        let input_size = self.q_network.input_size();

        let mut observations = Array2::zeros((batch_size, input_size));
        let mut next_observations = Array2::zeros((batch_size, input_size));
        let mut actions = Vec::with_capacity(batch_size);
        let mut rewards = Array1::zeros(batch_size);
        let mut dones = Vec::with_capacity(batch_size);
        for (i, transition) in batch.iter().enumerate() {
            observations.row_mut(i).assign(&transition.observation);
            next_observations.row_mut(i).assign(&transition.next_observation);
            actions.push(transition.action);
            rewards[i] = transition.reward;
            dones.push(transition.done);
        }

        let next_q_values = self.target_network.evaluate_batch(next_observations.view());
        let next_max = next_q_values.map_axis(Axis(1), |row| {
            row.fold(f32::NEG_INFINITY, |max, &value| max.max(value))
        });
        let targets = bootstrapped_targets(rewards.view(), &dones, next_max.view(), self.gamma);

        // Only the taken action contributes to the loss
        let (predictions, caches) = self.q_network.forward_cached(observations.view());
        let mut output_errors = Array2::zeros(predictions.raw_dim());
        let mut loss = 0.0;
        let scale = batch_size as f32;
        for (i, &action) in actions.iter().enumerate() {
            let error = predictions[[i, action]] - targets[i];
            loss += error * error;
            output_errors[[i, action]] = 2.0 * error / scale;
        }
        loss /= scale;

        let mut gradients = self.q_network.backward(&caches, output_errors.view());
        let grad_norm = self.clipper.clip(&mut gradients);
        self.q_network
            .apply_gradients(&mut self.optimizer, &gradients, self.learning_rate)?;
        self.train_steps += 1;

        debug!(loss, grad_norm, train_steps = self.train_steps, "gradient step");
        Ok(Some(loss))
    }

    /// Copy the live parameters into the target network.
    pub fn sync_target(&mut self) {
        self.target_network.sync_from(&self.q_network);
        debug!(train_steps = self.train_steps, "target network synced");
    }

    pub fn save_model(&self, path: &Path) -> Result<()> {
        persistence::write_binary(path, &self.q_network)
    }

    /// Load saved parameters into both networks. Returns `false` when the
    /// file is absent; the optimizer state restarts from zero.
    pub fn load_model(&mut self, path: &Path) -> Result<bool> {
        let Some(network) = persistence::read_binary::<QNetwork>(path)? else {
            return Ok(false);
        };
        network.validate().map_err(|err| corrupt(path, err))?;
        let expected = self.q_network.layer_sizes();
        let found = network.layer_sizes();
        if expected != found {
            return Err(SnakeError::dimension_mismatch(
                format!("layers {:?}", expected),
                format!("layers {:?} in {}", found, path.display()),
            ));
        }

        self.optimizer = match &self.optimizer {
            OptimizerWrapper::SGD(_) => OptimizerWrapper::SGD(SGD::new()),
            OptimizerWrapper::Adam(adam) => {
                OptimizerWrapper::Adam(Adam::new(&network.layers, adam.beta1, adam.beta2, adam.epsilon))
            }
        };
        self.target_network = network.clone();
        self.q_network = network;
        Ok(true)
    }

    pub fn save_memory(&self, path: &Path) -> Result<()> {
        self.memory.save(path)
    }

    /// Replace the replay memory with a saved one. Returns `false` when the
    /// file is absent. Every transition must fit this agent's network or
    /// the memory is left untouched.
    pub fn load_memory(&mut self, path: &Path) -> Result<bool> {
        let Some(transitions) = persistence::read_binary::<Vec<Transition>>(path)? else {
            return Ok(false);
        };
        for (index, transition) in transitions.iter().enumerate() {
            self.check_transition(transition)
                .map_err(|err| corrupt(path, format!("transition {}: {}", index, err)))?;
        }
        self.memory.extend_recent(transitions);
        Ok(true)
    }

    fn check_transition(&self, transition: &Transition) -> Result<()> {
        self.check_observation(transition.observation.view())?;
        self.check_observation(transition.next_observation.view())?;
        if transition.action >= self.q_network.num_actions() {
            return Err(SnakeError::InvalidAction {
                action: transition.action,
                max_actions: self.q_network.num_actions(),
            });
        }
        Ok(())
    }

    fn check_observation(&self, observation: ArrayView1<f32>) -> Result<()> {
        let expected = self.q_network.input_size();
        if observation.len() != expected {
            return Err(SnakeError::dimension_mismatch(
                format!("observation of length {}", expected),
                format!("length {}", observation.len()),
            ));
        }
        Ok(())
    }
}

fn corrupt<R: ToString>(path: &Path, reason: R) -> SnakeError {
    SnakeError::CorruptFile {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

/// `reward + gamma * next_max` for live transitions and exactly `reward`
/// for terminal ones.
pub fn bootstrapped_targets(
    rewards: ArrayView1<f32>,
    dones: &[bool],
    next_max: ArrayView1<f32>,
    gamma: f32,
) -> Array1<f32> {
    Array1::from_iter(
        rewards
            .iter()
            .zip(dones)
            .zip(next_max.iter())
            .map(|((&reward, &done), &next)| if done { reward } else { reward + gamma * next }),
    )
}
