//! The observation vector fed to the value estimator.
//!
//! Layout (13 slots), fixed for every saved model:
//!
//! | slot | content |
//! |---|---|
//! | 0-1 | own head x / width, y / height |
//! | 2-3 | food x / width, y / height |
//! | 4 | head-to-food distance / distance normalisation |
//! | 5-8 | one-hot heading: right, left, up, down |
//! | 9-12 | danger flags: up, down, left, right |
//!
//! A danger flag is set when the neighbouring cell is covered by either
//! snake or lies off the board.

use super::direction::Direction;
use super::state::{AgentId, GameState, Position};
use crate::config::GameConfig;
use ndarray::Array1;

pub const OBSERVATION_SIZE: usize = 13;

/// Build the observation of `agent` for the current state.
pub fn observe(state: &GameState, agent: AgentId, config: &GameConfig) -> Array1<f32> {
    let snake = state.snake(agent);
    let head = snake.head();
    let food = state.food;
    let width = config.width as f32;
    let height = config.height as f32;

    let mut features = Array1::zeros(OBSERVATION_SIZE);
    features[0] = head.x as f32 / width;
    features[1] = head.y as f32 / height;
    features[2] = food.x as f32 / width;
    features[3] = food.y as f32 / height;
    features[4] = head.distance_to(food) / config.distance_normalization;
    features[5 + snake.direction.index()] = 1.0;

    let danger_order = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];
    for (slot, direction) in danger_order.iter().enumerate() {
        let next = head.moved(*direction, config.cell);
        if is_dangerous(state, next, config) {
            features[9 + slot] = 1.0;
        }
    }
    features
}

fn is_dangerous(state: &GameState, position: Position, config: &GameConfig) -> bool {
    !position.in_bounds(config.width, config.height)
        || state.occupied().any(|&segment| segment == position)
}
