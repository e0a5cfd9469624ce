use crate::network::ValueEstimator;
use ndarray::ArrayView1;
use rand::Rng;

/// Index of the highest score. Ties go to the lowest index.
pub fn greedy_action(scores: ArrayView1<f32>) -> usize {
    let mut best = 0;
    for (index, &score) in scores.iter().enumerate().skip(1) {
        if score > scores[best] {
            best = index;
        }
    }
    best
}

/// Epsilon-greedy selection: a uniformly random action with probability
/// `epsilon`, otherwise the estimator's best-scoring action.
pub fn select_action<E: ValueEstimator, R: Rng + ?Sized>(
    estimator: &E,
    observation: ArrayView1<f32>,
    epsilon: f32,
    rng: &mut R,
) -> usize {
    if rng.gen::<f32>() < epsilon {
        rng.gen_range(0..estimator.num_actions())
    } else {
        greedy_action(estimator.evaluate(observation).view())
    }
}

/// One multiplicative decay step clamped to `floor`. A value already at or
/// below the floor is returned unchanged.
pub fn decay_epsilon(epsilon: f32, decay: f32, floor: f32) -> f32 {
    if epsilon <= floor {
        epsilon
    } else {
        (epsilon * decay).max(floor)
    }
}
