//! Static layout of the intersection
//!
//! Everything here is derived once from the grid size and never changes.
//! Coordinates follow the renderer's convention: the North spawn sits on
//! row 0 and the West spawn on the last column.

use super::error::{SimError, SimResult};
use super::types::{
    Approach, Heading, Position, TurnType, MAX_GRID_SIZE, MIN_GRID_SIZE, PREVIEW_DISTANCE,
};

/// The straight line of cells a given approach's traffic drives along
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lane {
    Column(i32),
    Row(i32),
}

impl Lane {
    pub fn contains(&self, position: Position) -> bool {
        match *self {
            Lane::Column(x) => position.x == x,
            Lane::Row(y) => position.y == y,
        }
    }
}

/// Special cells and the turn table of a single four-way crossing
#[derive(Debug, Clone)]
pub struct GridTopology {
    width: i32,
    height: i32,
    /// The two rows of the east-west road
    h_road: [i32; 2],
    /// The two columns of the north-south road
    v_road: [i32; 2],
    cross_points: [Position; 4],
    // Per-approach tables below are indexed by `Approach::index`
    stop_points: [Position; 4],
    continue_points: [Position; 4],
    spawn_points: [Position; 4],
    light_positions: [Position; 4],
}

impl GridTopology {
    pub fn new(width: i32, height: i32) -> SimResult<Self> {
        if width < MIN_GRID_SIZE || height < MIN_GRID_SIZE {
            return Err(SimError::Config(format!(
                "grid {}x{} cannot hold the intersection, minimum is {}x{}",
                width, height, MIN_GRID_SIZE, MIN_GRID_SIZE
            )));
        }
        if width > MAX_GRID_SIZE || height > MAX_GRID_SIZE {
            return Err(SimError::Config(format!(
                "grid {}x{} exceeds the maximum of {}x{}",
                width, height, MAX_GRID_SIZE, MAX_GRID_SIZE
            )));
        }

        let h_road = [height / 2 - 1, height / 2];
        let v_road = [width / 2 - 1, width / 2];
        let [h0, h1] = h_road;
        let [v0, v1] = v_road;

        let cross_points = [
            Position::new(v0, h0),
            Position::new(v0, h1),
            Position::new(v1, h0),
            Position::new(v1, h1),
        ];

        // North, West, South, East
        let stop_points = [
            Position::new(v0, h0 - 1),
            Position::new(v1 + 1, h0),
            Position::new(v1, h1 + 1),
            Position::new(v0 - 1, h1),
        ];
        let continue_points = [
            Position::new(v1, h0 - 1),
            Position::new(v1 + 1, h1),
            Position::new(v0, h1 + 1),
            Position::new(v0 - 1, h0),
        ];
        let spawn_points = [
            Position::new(v0, 0),
            Position::new(width - 1, h0),
            Position::new(v1, height - 1),
            Position::new(0, h1),
        ];
        let light_positions = [
            Position::new(v1 + 1, h0 - 1),
            Position::new(v1 + 1, h1 + 1),
            Position::new(v0 - 1, h1 + 1),
            Position::new(v0 - 1, h0 - 1),
        ];

        Ok(Self {
            width,
            height,
            h_road,
            v_road,
            cross_points,
            stop_points,
            continue_points,
            spawn_points,
            light_positions,
        })
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn h_road(&self) -> [i32; 2] {
        self.h_road
    }

    pub fn v_road(&self) -> [i32; 2] {
        self.v_road
    }

    pub fn in_bounds(&self, position: Position) -> bool {
        (0..self.width).contains(&position.x) && (0..self.height).contains(&position.y)
    }

    pub fn cross_points(&self) -> &[Position; 4] {
        &self.cross_points
    }

    pub fn is_cross_point(&self, position: Position) -> bool {
        self.cross_points.contains(&position)
    }

    pub fn stop_point(&self, approach: Approach) -> Position {
        self.stop_points[approach.index()]
    }

    pub fn is_stop_point(&self, position: Position) -> bool {
        self.stop_points.contains(&position)
    }

    pub fn continue_point(&self, approach: Approach) -> Position {
        self.continue_points[approach.index()]
    }

    pub fn is_continue_point(&self, position: Position) -> bool {
        self.continue_points.contains(&position)
    }

    pub fn spawn_point(&self, approach: Approach) -> Position {
        self.spawn_points[approach.index()]
    }

    pub fn light_position(&self, approach: Approach) -> Position {
        self.light_positions[approach.index()]
    }

    /// Whether a vehicle standing here is turning through the crossing
    pub fn is_turn_cell(&self, position: Position) -> bool {
        self.is_cross_point(position) || self.is_continue_point(position)
    }

    /// The lane traffic entering from `origin` drives along
    pub fn lane(&self, origin: Approach) -> Lane {
        match origin {
            Approach::North => Lane::Column(self.v_road[0]),
            Approach::South => Lane::Column(self.v_road[1]),
            Approach::West => Lane::Row(self.h_road[0]),
            Approach::East => Lane::Row(self.h_road[1]),
        }
    }

    /// Maneuver from `origin` to `destination`, `None` for a U-turn
    pub fn turn_type(&self, origin: Approach, destination: Approach) -> Option<TurnType> {
        use Approach::*;
        let turn = match (origin, destination) {
            (North, South) | (West, East) | (South, North) | (East, West) => TurnType::Straight,
            (North, East) | (West, North) | (South, West) | (East, South) => TurnType::Right,
            (North, West) | (West, South) | (South, East) | (East, North) => TurnType::Left,
            _ => return None,
        };
        Some(turn)
    }

    /// New heading for a vehicle at `position` bound for `destination`
    ///
    /// Returns `Some` only on the cross cell where the vehicle's current
    /// lane meets the outgoing lane towards its destination.
    pub fn turn_heading(
        &self,
        origin: Approach,
        destination: Approach,
        position: Position,
    ) -> Option<Heading> {
        if !self.is_cross_point(position) {
            return None;
        }
        match self.turn_type(origin, destination)? {
            TurnType::Straight => None,
            TurnType::Left | TurnType::Right => self
                .lane(destination.opposite())
                .contains(position)
                .then(|| destination.exit_heading()),
        }
    }

    /// Cells watched by the light that faces traffic from `origin`
    ///
    /// The stop cell and the cells upstream of it, which lie at distances
    /// 3, 4 and 5 from the light post along the lane. Cells past the
    /// border are kept; they simply never hold a vehicle.
    pub fn preview_cells(&self, origin: Approach) -> [Position; PREVIEW_DISTANCE] {
        let stop = self.stop_point(origin);
        let heading = origin.entry_heading();
        std::array::from_fn(|i| stop.behind(heading, i as i32))
    }
}
