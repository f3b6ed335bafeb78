//! Crossroad simulation engine
//!
//! This module contains the whole simulation: grid layout, vehicles,
//! stoplights and the right-of-way arbiter. It only exposes a synchronous
//! `step()` plus read-only reporting, so transports and renderers can be
//! layered on top without touching the engine.

mod arbiter;
mod car;
mod config;
mod error;
mod grid;
mod report;
mod stoplight;
mod terrain;
mod topology;
mod types;
mod world;

pub use arbiter::ActivationArbiter;
pub use car::{
    CarAction, CarDecision, CarMove, DecisionStep, FrozenView, MovementState, PendingMove, SimCar,
    TickResolver,
};
pub use config::{
    SimConfig, DEFAULT_GRID_SIZE, DEFAULT_MAX_DURATION, DEFAULT_MAX_GREEN_TICKS,
    DEFAULT_SPAWN_RATE,
};
pub use error::{SimError, SimResult};
pub use grid::{CellAgent, SimGrid};
pub use report::{BoardInfo, CarDelta, CellCode, Items, LightInit, LightState, StepDelta};
pub use stoplight::{LightDecision, SimStoplight};
pub use terrain::{layout as terrain_layout, TerrainCell, TerrainKind};
pub use topology::{GridTopology, Lane};
pub use types::{
    Approach, CarId, Heading, LightColor, Position, TurnType, MAX_GRID_SIZE, MIN_GRID_SIZE,
    PREVIEW_DISTANCE, YELLOW_TICKS,
};
pub use world::{SimStats, SimWorld};
