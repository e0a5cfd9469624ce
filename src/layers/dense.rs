use crate::activations::Activation;
use crate::error::{Result, SnakeError};
use ndarray::{Array1, Array2, ArrayView2, Axis};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A fully connected (dense) layer in a neural network
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct DenseLayer {
    /// Shape (input_size, output_size)
    pub weights: Array2<f32>,
    pub biases: Array1<f32>,
    pub activation: Activation,
}

/// Values remembered by a forward pass for the matching backward pass.
#[derive(Clone, Debug)]
pub struct LayerCache {
    inputs: Array2<f32>,
    pre_activation: Array2<f32>,
}

/// Gradients of the loss with respect to one layer's parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct LayerGradients {
    pub weights: Array2<f32>,
    pub biases: Array1<f32>,
}

impl DenseLayer {
    /// Create a new dense layer. Weights and biases are drawn uniformly from
    /// ±1/√input_size.
    pub fn new<R: Rng + ?Sized>(
        input_size: usize,
        output_size: usize,
        activation: Activation,
        rng: &mut R,
    ) -> Self {
        let bound = 1.0 / (input_size as f32).sqrt();
        let weights = Array2::random_using(
            (input_size, output_size),
            Uniform::new_inclusive(-bound, bound),
            rng,
        );
        let biases = Array1::random_using(output_size, Uniform::new_inclusive(-bound, bound), rng);
        DenseLayer {
            weights,
            biases,
            activation,
        }
    }

    pub fn with_weights(mut self, weights: Array2<f32>) -> Result<Self> {
        if weights.dim() != self.weights.dim() {
            return Err(SnakeError::dimension_mismatch(
                format!("weights of shape {:?}", self.weights.dim()),
                format!("{:?}", weights.dim()),
            ));
        }
        self.weights = weights;
        Ok(self)
    }

    pub fn with_biases(mut self, biases: Array1<f32>) -> Result<Self> {
        if biases.len() != self.biases.len() {
            return Err(SnakeError::dimension_mismatch(
                format!("{} biases", self.biases.len()),
                format!("{}", biases.len()),
            ));
        }
        self.biases = biases;
        Ok(self)
    }

    pub fn input_size(&self) -> usize {
        self.weights.shape()[0]
    }

    pub fn output_size(&self) -> usize {
        self.weights.shape()[1]
    }

    fn pre_activation(&self, inputs: ArrayView2<f32>) -> Array2<f32> {
        inputs.dot(&self.weights) + &self.biases.view().insert_axis(Axis(0))
    }

    /// Forward pass for a batch of input rows.
    pub fn forward_batch(&self, inputs: ArrayView2<f32>) -> Array2<f32> {
        let mut outputs = self.pre_activation(inputs);
        self.activation.apply_batch(&mut outputs);
        outputs
    }

    /// Forward pass that also returns what the backward pass needs.
    pub fn forward_cached(&self, inputs: ArrayView2<f32>) -> (Array2<f32>, LayerCache) {
        let pre_activation = self.pre_activation(inputs);
        let mut outputs = pre_activation.clone();
        self.activation.apply_batch(&mut outputs);
        let cache = LayerCache {
            inputs: inputs.to_owned(),
            pre_activation,
        };
        (outputs, cache)
    }

    /// Backward pass for a batch of output errors.
    ///
    /// Returns the error with respect to this layer's inputs and the
    /// parameter gradients.
    pub fn backward_batch(
        &self,
        cache: &LayerCache,
        output_errors: ArrayView2<f32>,
    ) -> (Array2<f32>, LayerGradients) {
        let activation_deriv = self.activation.derivative_batch(cache.pre_activation.view());
        let adjusted_error = &output_errors * &activation_deriv;
        let gradients = LayerGradients {
            weights: cache.inputs.t().dot(&adjusted_error),
            biases: adjusted_error.sum_axis(Axis(0)),
        };
        let input_errors = adjusted_error.dot(&self.weights.t());
        (input_errors, gradients)
    }
}
