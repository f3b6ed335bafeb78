//! Core types for the crossroad simulation
//!
//! Plain value types shared by every component of the engine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the four directions traffic enters the intersection from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Approach {
    North,
    West,
    South,
    East,
}

impl Approach {
    /// All approaches, in the order lights are stepped
    pub const ALL: [Approach; 4] = [
        Approach::North,
        Approach::West,
        Approach::South,
        Approach::East,
    ];

    pub fn index(self) -> usize {
        match self {
            Approach::North => 0,
            Approach::West => 1,
            Approach::South => 2,
            Approach::East => 3,
        }
    }

    pub fn opposite(self) -> Approach {
        match self {
            Approach::North => Approach::South,
            Approach::West => Approach::East,
            Approach::South => Approach::North,
            Approach::East => Approach::West,
        }
    }

    /// Heading of a vehicle that entered the grid from this approach
    pub fn entry_heading(self) -> Heading {
        match self {
            Approach::North => Heading::new(0, 1),
            Approach::West => Heading::new(-1, 0),
            Approach::South => Heading::new(0, -1),
            Approach::East => Heading::new(1, 0),
        }
    }

    /// Heading of a vehicle leaving the grid towards this approach
    pub fn exit_heading(self) -> Heading {
        self.opposite().entry_heading()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Approach::North => "North",
            Approach::West => "West",
            Approach::South => "South",
            Approach::East => "East",
        }
    }
}

impl fmt::Display for Approach {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A cell coordinate on the grid
///
/// Signed so that a step off the border is representable and can be
/// rejected by a bounds check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(&self, heading: Heading) -> Position {
        Position {
            x: self.x + heading.dx,
            y: self.y + heading.dy,
        }
    }

    /// Step `count` cells against `heading`
    pub fn behind(&self, heading: Heading, count: i32) -> Position {
        Position {
            x: self.x - heading.dx * count,
            y: self.y - heading.dy * count,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A unit cardinal step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Heading {
    pub dx: i32,
    pub dy: i32,
}

impl Heading {
    pub fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }
}

/// The maneuver a vehicle performs through the intersection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnType {
    Straight,
    Left,
    Right,
}

/// A wrapper type for vehicle IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CarId(pub usize);

impl fmt::Display for CarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Signal color of a stoplight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LightColor {
    Red,
    Yellow,
    Green,
}

/// Number of cells a stoplight watches upstream of its stop line
pub const PREVIEW_DISTANCE: usize = 3;

/// Ticks a light stays yellow once its green ends
pub const YELLOW_TICKS: u32 = 2;

/// Smallest grid side that fits the stop, continue and curb rings
pub const MIN_GRID_SIZE: i32 = 6;

/// Largest grid side accepted
pub const MAX_GRID_SIZE: i32 = 4096;
