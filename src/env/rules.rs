//! Pure resolution steps of a simultaneous two-agent tick.
//!
//! Each function maps old state plus the agents' choices to new state and
//! per-agent reward contributions; the [`Environment`](super::Environment)
//! only sequences them and supplies randomness for food placement.

use super::direction::Direction;
use super::state::{Position, Snake};
use crate::config::RewardConfig;

/// Result of food resolution for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FoodOutcome {
    pub rewards: [f32; 2],
    pub grow: [bool; 2],
}

impl FoodOutcome {
    /// True if the food was consumed and must be re-spawned.
    pub fn eaten(&self) -> bool {
        self.grow[0] || self.grow[1]
    }
}

/// Result of collision detection on the post-move bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionReport {
    pub heads_collide: bool,
    /// Head in the other body, in its own body, or off the board
    pub crashed: [bool; 2],
}

/// Final per-agent outcome of a tick after collision overrides.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionOutcome {
    pub rewards: [f32; 2],
    pub done: [bool; 2],
    /// Score increments awarded by collision rules
    pub points: [u32; 2],
}

/// Apply the no-reverse rule to both agents independently.
pub fn resolve_directions(current: [Direction; 2], requested: [Direction; 2]) -> [Direction; 2] {
    [current[0].resolve(requested[0]), current[1].resolve(requested[1])]
}

/// Both new heads, computed from pre-move positions.
pub fn next_heads(heads: [Position; 2], directions: [Direction; 2], cell: i32) -> [Position; 2] {
    [heads[0].moved(directions[0], cell), heads[1].moved(directions[1], cell)]
}

/// Food rewards and growth flags, including the step penalty and the
/// closer-to-food bonus when nobody eats.
pub fn resolve_food(
    old_heads: [Position; 2],
    new_heads: [Position; 2],
    food: Position,
    rewards: &RewardConfig,
) -> FoodOutcome {
    let on_food = [new_heads[0] == food, new_heads[1] == food];
    match on_food {
        [true, true] => FoodOutcome {
            rewards: [rewards.food_shared; 2],
            grow: [true, true],
        },
        [true, false] => FoodOutcome {
            rewards: [rewards.food_individual, rewards.step],
            grow: [true, false],
        },
        [false, true] => FoodOutcome {
            rewards: [rewards.step, rewards.food_individual],
            grow: [false, true],
        },
        [false, false] => {
            let mut shaped = [rewards.step; 2];
            for agent in 0..2 {
                if new_heads[agent].distance_to(food) < old_heads[agent].distance_to(food) {
                    shaped[agent] += rewards.closer_to_food;
                }
            }
            FoodOutcome {
                rewards: shaped,
                grow: [false, false],
            }
        }
    }
}

/// Put both new heads in front and adopt the resolved headings.
pub fn insert_heads(mut snakes: [Snake; 2], new_heads: [Position; 2], directions: [Direction; 2]) -> [Snake; 2] {
    for (agent, snake) in snakes.iter_mut().enumerate() {
        snake.body.push_front(new_heads[agent]);
        snake.direction = directions[agent];
    }
    snakes
}

/// Drop the tail of every snake that did not grow this tick.
pub fn trim_tails(mut snakes: [Snake; 2], grow: [bool; 2]) -> [Snake; 2] {
    for (agent, snake) in snakes.iter_mut().enumerate() {
        if !grow[agent] && snake.len() > 1 {
            snake.body.pop_back();
        }
    }
    snakes
}

/// Inspect the post-move bodies for head-on, body, self and wall hits.
pub fn detect_collisions(snakes: &[Snake; 2], width: i32, height: i32) -> CollisionReport {
    let heads = [snakes[0].head(), snakes[1].head()];
    let crashed_into = |agent: usize| {
        let head = heads[agent];
        let other = &snakes[1 - agent];
        !head.in_bounds(width, height)
            || other.tail_segments().any(|&segment| segment == head)
            || snakes[agent].tail_segments().any(|&segment| segment == head)
    };
    CollisionReport {
        heads_collide: heads[0] == heads[1],
        crashed: [crashed_into(0), crashed_into(1)],
    }
}

/// Collision rules in priority order; the first that matches decides the tick.
pub fn resolve_collisions(
    report: CollisionReport,
    rewards_so_far: [f32; 2],
    rewards: &RewardConfig,
) -> CollisionOutcome {
    if report.heads_collide {
        return CollisionOutcome {
            rewards: [rewards.head_collision; 2],
            done: [true, true],
            points: [1, 1],
        };
    }

    match report.crashed {
        [false, false] => CollisionOutcome {
            rewards: rewards_so_far,
            done: [false, false],
            points: [0, 0],
        },
        [true, false] => CollisionOutcome {
            rewards: [rewards.death, rewards.win],
            done: [true, true],
            points: [0, 1],
        },
        [false, true] => CollisionOutcome {
            rewards: [rewards.win, rewards.death],
            done: [true, true],
            points: [1, 0],
        },
        [true, true] => CollisionOutcome {
            rewards: [rewards.death; 2],
            done: [true, true],
            points: [0, 0],
        },
    }
}
