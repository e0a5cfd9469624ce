//! # Activation Functions
//!
//! ReLU for hidden layers and the identity for the output layer.

pub mod functions;

pub use functions::Activation;
