use crate::activations::Activation;
use crate::error::{Result, SnakeError};
use crate::layers::{DenseLayer, LayerCache, LayerGradients};
use crate::optimizer::Optimizer;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A differentiable mapping from an observation to one score per action.
///
/// Evaluation never mutates the estimator; a single observation is
/// evaluated as a batch of one.
pub trait ValueEstimator {
    /// Length of the observation vector
    fn input_size(&self) -> usize;

    /// Number of discrete actions scored
    fn num_actions(&self) -> usize;

    /// Score every row of `observations`; output shape is (batch, num_actions).
    fn evaluate_batch(&self, observations: ArrayView2<f32>) -> Array2<f32>;

    /// Score a single observation.
    fn evaluate(&self, observation: ArrayView1<f32>) -> Array1<f32> {
        let batch = observation.insert_axis(Axis(0));
        self.evaluate_batch(batch).row(0).to_owned()
    }

    /// Overwrite every parameter with the ones of `source`.
    fn sync_from(&mut self, source: &Self)
    where
        Self: Sized;
}

/// A multi-layer perceptron: ReLU hidden layers and a linear output layer.
///
/// # Example
///
/// ```rust
/// use snake_duel::network::{QNetwork, ValueEstimator};
/// use ndarray::Array1;
/// use rand::SeedableRng;
///
/// let mut rng = rand::rngs::StdRng::seed_from_u64(0);
/// let network = QNetwork::new(&[13, 32, 32, 4], &mut rng).unwrap();
/// let scores = network.evaluate(Array1::zeros(13).view());
/// assert_eq!(scores.len(), 4);
/// ```
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct QNetwork {
    pub layers: Vec<DenseLayer>,
}

impl QNetwork {
    /// Create a new network with the given layer sizes, input first and
    /// action count last.
    pub fn new<R: Rng + ?Sized>(layer_sizes: &[usize], rng: &mut R) -> Result<Self> {
        if layer_sizes.len() < 2 {
            return Err(SnakeError::invalid_parameter(
                "layer_sizes",
                "Network must have at least input and output layers",
            ));
        }
        if layer_sizes.iter().any(|&size| size == 0) {
            return Err(SnakeError::invalid_parameter(
                "layer_sizes",
                "every layer needs at least one unit",
            ));
        }

        let last = layer_sizes.len() - 2;
        let layers = layer_sizes
            .windows(2)
            .enumerate()
            .map(|(index, window)| {
                let activation = if index == last {
                    Activation::Linear
                } else {
                    Activation::Relu
                };
                DenseLayer::new(window[0], window[1], activation, rng)
            })
            .collect();

        Ok(QNetwork { layers })
    }

    /// Check that the layers chain into one network: every bias vector
    /// matches its layer's width and every layer consumes the previous
    /// layer's output.
    pub fn validate(&self) -> Result<()> {
        if self.layers.is_empty() {
            return Err(SnakeError::invalid_parameter("layers", "network has no layers"));
        }
        for (index, layer) in self.layers.iter().enumerate() {
            if layer.biases.len() != layer.output_size() {
                return Err(SnakeError::dimension_mismatch(
                    format!("{} biases in layer {}", layer.output_size(), index),
                    format!("{} biases", layer.biases.len()),
                ));
            }
        }
        for (index, pair) in self.layers.windows(2).enumerate() {
            if pair[1].input_size() != pair[0].output_size() {
                return Err(SnakeError::dimension_mismatch(
                    format!("{} inputs to layer {}", pair[0].output_size(), index + 1),
                    format!("{} inputs", pair[1].input_size()),
                ));
            }
        }
        Ok(())
    }

    /// Forward pass keeping every layer's cache for [`QNetwork::backward`].
    pub fn forward_cached(&self, inputs: ArrayView2<f32>) -> (Array2<f32>, Vec<LayerCache>) {
        let mut caches = Vec::with_capacity(self.layers.len());
        let mut current_output = inputs.to_owned();
        for layer in &self.layers {
            let (output, cache) = layer.forward_cached(current_output.view());
            caches.push(cache);
            current_output = output;
        }
        (current_output, caches)
    }

    /// Backpropagate output errors through the layers of a cached forward pass.
    pub fn backward(&self, caches: &[LayerCache], output_errors: ArrayView2<f32>) -> Vec<LayerGradients> {
        let mut gradients = Vec::with_capacity(self.layers.len());
        let mut current_error = output_errors.to_owned();
        for (layer, cache) in self.layers.iter().zip(caches).rev() {
            let (input_errors, layer_gradients) = layer.backward_batch(cache, current_error.view());
            gradients.push(layer_gradients);
            current_error = input_errors;
        }
        gradients.reverse();
        gradients
    }

    /// Hand one batch of gradients to `optimizer`.
    pub fn apply_gradients<O: Optimizer>(
        &mut self,
        optimizer: &mut O,
        gradients: &[LayerGradients],
        learning_rate: f32,
    ) -> Result<()> {
        if gradients.len() != self.layers.len() {
            return Err(SnakeError::dimension_mismatch(
                format!("{} layer gradients", self.layers.len()),
                format!("{} layer gradients", gradients.len()),
            ));
        }
        optimizer.step(&mut self.layers, gradients, learning_rate);
        Ok(())
    }

    /// Total number of trainable scalars.
    pub fn parameter_count(&self) -> usize {
        self.layers
            .iter()
            .map(|layer| layer.weights.len() + layer.biases.len())
            .sum()
    }

    /// Layer widths, input first.
    pub fn layer_sizes(&self) -> Vec<usize> {
        let mut sizes: Vec<usize> = self.layers.iter().map(DenseLayer::input_size).collect();
        if let Some(last) = self.layers.last() {
            sizes.push(last.output_size());
        }
        sizes
    }
}

impl ValueEstimator for QNetwork {
    fn input_size(&self) -> usize {
        self.layers.first().map_or(0, DenseLayer::input_size)
    }

    fn num_actions(&self) -> usize {
        self.layers.last().map_or(0, DenseLayer::output_size)
    }

    fn evaluate_batch(&self, observations: ArrayView2<f32>) -> Array2<f32> {
        let mut current_output = observations.to_owned();
        for layer in &self.layers {
            current_output = layer.forward_batch(current_output.view());
        }
        current_output
    }

    fn sync_from(&mut self, source: &Self) {
        self.layers.clone_from(&source.layers);
    }
}
