use crate::layers::LayerGradients;

/// Gradient clipping methods
#[derive(Clone, Debug, PartialEq)]
pub enum GradientClipper {
    /// Clamp every component into `[min, max]`
    ClipByValue { min: f32, max: f32 },

    /// Rescale all gradients together so their joint L2 norm is at most `max_norm`
    ClipByGlobalNorm { max_norm: f32 },

    /// No clipping
    None,
}

impl GradientClipper {
    /// Clip the gradients of every layer in place and return the global norm
    /// measured before clipping.
    pub fn clip(&self, gradients: &mut [LayerGradients]) -> f32 {
        let norm = Self::global_norm(gradients);
        match self {
            GradientClipper::ClipByValue { min, max } => {
                for gradient in gradients.iter_mut() {
                    gradient.weights.mapv_inplace(|g| g.max(*min).min(*max));
                    gradient.biases.mapv_inplace(|g| g.max(*min).min(*max));
                }
            }

            GradientClipper::ClipByGlobalNorm { max_norm } => {
                if norm > *max_norm {
                    let scale = max_norm / norm;
                    for gradient in gradients.iter_mut() {
                        gradient.weights.mapv_inplace(|g| g * scale);
                        gradient.biases.mapv_inplace(|g| g * scale);
                    }
                }
            }

            GradientClipper::None => {}
        }
        norm
    }

    /// L2 norm of all weight and bias gradients taken together
    pub fn global_norm(gradients: &[LayerGradients]) -> f32 {
        gradients
            .iter()
            .map(|gradient| {
                gradient.weights.iter().map(|&x| x * x).sum::<f32>()
                    + gradient.biases.iter().map(|&x| x * x).sum::<f32>()
            })
            .sum::<f32>()
            .sqrt()
    }
}
