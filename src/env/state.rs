use super::direction::Direction;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

/// A grid-aligned position on the board, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Position one cell away in `direction`.
    pub fn moved(self, direction: Direction, cell: i32) -> Self {
        let (dx, dy) = direction.delta();
        Self {
            x: self.x + dx * cell,
            y: self.y + dy * cell,
        }
    }

    /// Euclidean distance in pixels.
    pub fn distance_to(self, other: Position) -> f32 {
        let dx = (self.x - other.x) as f32;
        let dy = (self.y - other.y) as f32;
        (dx * dx + dy * dy).sqrt()
    }

    /// True if the position lies inside a `width` x `height` board.
    pub fn in_bounds(self, width: i32, height: i32) -> bool {
        self.x >= 0 && self.y >= 0 && self.x < width && self.y < height
    }
}

impl From<(i32, i32)> for Position {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

/// One of the two competing agents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentId {
    One,
    Two,
}

impl AgentId {
    pub const ALL: [AgentId; 2] = [AgentId::One, AgentId::Two];

    pub fn index(self) -> usize {
        match self {
            AgentId::One => 0,
            AgentId::Two => 1,
        }
    }
}

/// A snake: body segments head-first plus its heading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snake {
    /// Body segments, with head at index 0
    pub body: VecDeque<Position>,
    pub direction: Direction,
}

impl Snake {
    /// A single-segment snake.
    pub fn new(head: Position, direction: Direction) -> Self {
        Self {
            body: VecDeque::from(vec![head]),
            direction,
        }
    }

    /// A snake laid out from explicit segments, head first.
    pub fn from_segments(segments: Vec<Position>, direction: Direction) -> Self {
        Self {
            body: VecDeque::from(segments),
            direction,
        }
    }

    pub fn head(&self) -> Position {
        self.body[0]
    }

    /// Segments behind the head.
    pub fn tail_segments(&self) -> impl Iterator<Item = &Position> {
        self.body.iter().skip(1)
    }

    pub fn contains(&self, position: Position) -> bool {
        self.body.contains(&position)
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// True when every consecutive pair of segments is one cell apart on one axis.
    pub fn is_contiguous(&self, cell: i32) -> bool {
        self.body.iter().zip(self.body.iter().skip(1)).all(|(a, b)| {
            let dx = (a.x - b.x).abs();
            let dy = (a.y - b.y).abs();
            (dx == cell && dy == 0) || (dx == 0 && dy == cell)
        })
    }
}

/// Whether the shared episode is still in play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpisodeStatus {
    Running,
    Terminal { agent1_done: bool, agent2_done: bool },
}

/// Complete board state shared by both agents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub snakes: [Snake; 2],
    pub food: Position,
    /// Cumulative scores, preserved across resets
    pub scores: [u32; 2],
    pub done: [bool; 2],
    /// Steps taken in the current episode
    pub steps: usize,
    /// Board size in pixels, kept for rendering
    pub width: i32,
    pub height: i32,
    pub cell: i32,
}

impl GameState {
    pub fn snake(&self, agent: AgentId) -> &Snake {
        &self.snakes[agent.index()]
    }

    /// Every cell covered by either snake.
    pub fn occupied(&self) -> impl Iterator<Item = &Position> {
        self.snakes[0].body.iter().chain(self.snakes[1].body.iter())
    }

    pub fn status(&self) -> EpisodeStatus {
        if self.done[0] || self.done[1] {
            EpisodeStatus::Terminal {
                agent1_done: self.done[0],
                agent2_done: self.done[1],
            }
        } else {
            EpisodeStatus::Running
        }
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let columns = self.width / self.cell;
        let rows = self.height / self.cell;
        for row in 0..rows {
            let line: String = (0..columns)
                .map(|column| {
                    let position = Position::new(column * self.cell, row * self.cell);
                    if self.snakes[0].head() == position {
                        '1'
                    } else if self.snakes[1].head() == position {
                        '2'
                    } else if self.snakes[0].contains(position) {
                        'a'
                    } else if self.snakes[1].contains(position) {
                        'b'
                    } else if self.food == position {
                        '*'
                    } else {
                        '.'
                    }
                })
                .collect();
            writeln!(f, "{}", line)?;
        }
        write!(
            f,
            "score {} : {}  step {}",
            self.scores[0], self.scores[1], self.steps
        )
    }
}
