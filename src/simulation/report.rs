//! Read-only snapshots handed to the transport and visualization layers
//!
//! Field names follow the wire format the 3D client deserializes.

use serde::Serialize;

use super::car::CarAction;
use super::types::{Approach, CarId, LightColor, TurnType};

/// Board dimensions, sent once at session start
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BoardInfo {
    #[serde(rename = "m")]
    pub width: i32,
    #[serde(rename = "n")]
    pub height: i32,
}

/// A light's placement and initial color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LightInit {
    pub id: Approach,
    pub state: LightColor,
    pub x: i32,
    pub y: i32,
}

/// One vehicle's movement in the last tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CarDelta {
    pub id: CarId,
    #[serde(rename = "x1")]
    pub from_x: i32,
    #[serde(rename = "y1")]
    pub from_y: i32,
    #[serde(rename = "x2")]
    pub to_x: i32,
    #[serde(rename = "y2")]
    pub to_y: i32,
    pub origin: Approach,
    pub action: CarAction,
    pub turn: TurnType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LightState {
    pub id: Approach,
    pub state: LightColor,
}

/// Everything that changed in one tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepDelta {
    pub tick: u64,
    pub cars: Vec<CarDelta>,
    pub lights: Vec<LightState>,
}

/// `{"Items": [...]}` envelope expected by the client's JSON helper
#[derive(Debug, Serialize)]
pub struct Items<'a, T> {
    #[serde(rename = "Items")]
    pub items: &'a [T],
}

impl<'a, T> Items<'a, T> {
    pub fn new(items: &'a [T]) -> Self {
        Self { items }
    }
}

/// Numeric cell classification used for frame dumps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CellCode {
    Car = 0,
    Crash = 1,
    Crossroad = 2,
    Crosswalk = 3,
    Curb = 4,
    Street = 5,
    GreenLight = 6,
    YellowLight = 7,
    RedLight = 8,
    Garden = 9,
}

impl CellCode {
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Glyph used by the terminal map
    pub fn glyph(self) -> char {
        match self {
            CellCode::Car => 'C',
            CellCode::Crash => 'X',
            CellCode::Crossroad => '+',
            CellCode::Crosswalk => '=',
            CellCode::Curb => '#',
            CellCode::Street => '.',
            CellCode::GreenLight => 'G',
            CellCode::YellowLight => 'Y',
            CellCode::RedLight => 'R',
            CellCode::Garden => ' ',
        }
    }
}
