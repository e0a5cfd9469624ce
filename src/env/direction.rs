use serde::{Deserialize, Serialize};

/// Number of discrete actions an agent chooses from.
pub const NUM_ACTIONS: usize = 4;

/// Heading of a snake. The discriminant order is the action index order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Right,
    Left,
    Up,
    Down,
}

impl Direction {
    /// All directions, indexed by action.
    pub const ALL: [Direction; NUM_ACTIONS] =
        [Direction::Right, Direction::Left, Direction::Up, Direction::Down];

    /// Map an action index to its direction.
    pub fn from_action(action: usize) -> Option<Direction> {
        Self::ALL.get(action).copied()
    }

    /// Action index of this direction.
    pub fn index(self) -> usize {
        match self {
            Direction::Right => 0,
            Direction::Left => 1,
            Direction::Up => 2,
            Direction::Down => 3,
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Right => Direction::Left,
            Direction::Left => Direction::Right,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }

    /// Returns true if turning from self to other would be a 180-degree turn
    pub fn is_opposite(self, other: Direction) -> bool {
        self.opposite() == other
    }

    /// Unit step (dx, dy) in cells. The y axis grows downwards.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Right => (1, 0),
            Direction::Left => (-1, 0),
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
        }
    }

    /// Heading after a turn request: reversing into the neck is ignored.
    pub fn resolve(self, requested: Direction) -> Direction {
        if self.is_opposite(requested) {
            self
        } else {
            requested
        }
    }
}
