//! # Optimizers
//!
//! An optimizer moves parameters to reduce a scalar loss given the
//! gradients of one batch. Gradients are clipped by a
//! [`GradientClipper`] before they reach the optimizer.

pub mod gradient_clipper;

use crate::layers::{DenseLayer, LayerGradients};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

pub use gradient_clipper::GradientClipper;

pub trait Optimizer {
    /// Apply one update to every layer. `gradients[i]` belongs to `layers[i]`.
    fn step(&mut self, layers: &mut [DenseLayer], gradients: &[LayerGradients], learning_rate: f32);
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub enum OptimizerWrapper {
    SGD(SGD),
    Adam(Adam),
}

impl Optimizer for OptimizerWrapper {
    fn step(&mut self, layers: &mut [DenseLayer], gradients: &[LayerGradients], learning_rate: f32) {
        match self {
            OptimizerWrapper::SGD(optimizer) => optimizer.step(layers, gradients, learning_rate),
            OptimizerWrapper::Adam(optimizer) => optimizer.step(layers, gradients, learning_rate),
        }
    }
}

/// Plain stochastic gradient descent.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct SGD;

impl SGD {
    pub fn new() -> SGD {
        SGD
    }
}

impl Optimizer for SGD {
    fn step(&mut self, layers: &mut [DenseLayer], gradients: &[LayerGradients], learning_rate: f32) {
        for (layer, gradient) in layers.iter_mut().zip(gradients) {
            layer.weights.zip_mut_with(&gradient.weights, |w, &g| *w -= learning_rate * g);
            layer.biases.zip_mut_with(&gradient.biases, |b, &g| *b -= learning_rate * g);
        }
    }
}

/// Adam with one pair of moment estimates per layer parameter.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Adam {
    pub beta1: f32,
    pub beta2: f32,
    pub epsilon: f32,
    m_weights: Vec<Array2<f32>>,
    v_weights: Vec<Array2<f32>>,
    m_biases: Vec<Array1<f32>>,
    v_biases: Vec<Array1<f32>>,
    /// Number of updates applied so far
    pub t: i32,
}

impl Adam {
    pub fn new(layers: &[DenseLayer], beta1: f32, beta2: f32, epsilon: f32) -> Self {
        let m_weights = layers
            .iter()
            .map(|layer| Array2::<f32>::zeros(layer.weights.dim()))
            .collect();
        let v_weights = layers
            .iter()
            .map(|layer| Array2::<f32>::zeros(layer.weights.dim()))
            .collect();
        let m_biases = layers
            .iter()
            .map(|layer| Array1::<f32>::zeros(layer.biases.dim()))
            .collect();
        let v_biases = layers
            .iter()
            .map(|layer| Array1::<f32>::zeros(layer.biases.dim()))
            .collect();

        Adam {
            beta1,
            beta2,
            epsilon,
            m_weights,
            v_weights,
            m_biases,
            v_biases,
            t: 0,
        }
    }

    pub fn default(layers: &[DenseLayer]) -> Self {
        Self::new(layers, 0.9, 0.999, 1e-8)
    }
}

impl Optimizer for Adam {
    fn step(&mut self, layers: &mut [DenseLayer], gradients: &[LayerGradients], learning_rate: f32) {
        self.t += 1;
        let (beta1, beta2, epsilon) = (self.beta1, self.beta2, self.epsilon);
        let correction1 = 1.0 - beta1.powi(self.t);
        let correction2 = 1.0 - beta2.powi(self.t);
        let update = |m: f32, v: f32| {
            let m_hat = m / correction1;
            let v_hat = v / correction2;
            learning_rate * m_hat / (v_hat.sqrt() + epsilon)
        };

        for (index, (layer, gradient)) in layers.iter_mut().zip(gradients).enumerate() {
            let m = &mut self.m_weights[index];
            let v = &mut self.v_weights[index];
            m.zip_mut_with(&gradient.weights, |m, &g| *m = beta1 * *m + (1.0 - beta1) * g);
            v.zip_mut_with(&gradient.weights, |v, &g| *v = beta2 * *v + (1.0 - beta2) * g * g);
            ndarray::Zip::from(&mut layer.weights)
                .and(&*m)
                .and(&*v)
                .for_each(|w, &m, &v| *w -= update(m, v));

            let m = &mut self.m_biases[index];
            let v = &mut self.v_biases[index];
            m.zip_mut_with(&gradient.biases, |m, &g| *m = beta1 * *m + (1.0 - beta1) * g);
            v.zip_mut_with(&gradient.biases, |v, &g| *v = beta2 * *v + (1.0 - beta2) * g * g);
            ndarray::Zip::from(&mut layer.biases)
                .and(&*m)
                .and(&*v)
                .for_each(|b, &m, &v| *b -= update(m, v));
        }
    }
}
