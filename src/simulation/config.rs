//! Construction-time parameters of a simulation run

use std::time::Duration;

use super::error::{SimError, SimResult};
use super::types::{Approach, MAX_GRID_SIZE, MIN_GRID_SIZE, YELLOW_TICKS};

pub const DEFAULT_GRID_SIZE: i32 = 16;
pub const DEFAULT_SPAWN_RATE: f64 = 0.15;
pub const DEFAULT_MAX_GREEN_TICKS: u32 = 8;
pub const DEFAULT_MAX_DURATION: Duration = Duration::from_secs(3600);

/// Everything a [`SimWorld`](super::SimWorld) needs to be built
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Grid width (M)
    pub width: i32,
    /// Grid height (N)
    pub height: i32,
    /// Probability per tick and approach that a vehicle is spawned
    pub spawn_rate: f64,
    /// Ticks a light may stay green or yellow in one cycle
    pub max_green_ticks: u32,
    /// End green early when no vehicles are waiting
    pub smart: bool,
    /// Wall-clock budget of a run, enforced by whoever drives the world
    pub max_duration: Duration,
    /// Seed for reproducible runs
    pub seed: Option<u64>,
    /// Approaches that spawn vehicles
    pub spawn_approaches: Vec<Approach>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_GRID_SIZE,
            height: DEFAULT_GRID_SIZE,
            spawn_rate: DEFAULT_SPAWN_RATE,
            max_green_ticks: DEFAULT_MAX_GREEN_TICKS,
            smart: true,
            max_duration: DEFAULT_MAX_DURATION,
            seed: None,
            spawn_approaches: Approach::ALL.to_vec(),
        }
    }
}

impl SimConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> SimResult<()> {
        if self.width < MIN_GRID_SIZE || self.height < MIN_GRID_SIZE {
            return Err(SimError::Config(format!(
                "grid {}x{} is too small, both sides must be at least {}",
                self.width, self.height, MIN_GRID_SIZE
            )));
        }
        if self.width > MAX_GRID_SIZE || self.height > MAX_GRID_SIZE {
            return Err(SimError::Config(format!(
                "grid {}x{} is too large, both sides must be at most {}",
                self.width, self.height, MAX_GRID_SIZE
            )));
        }
        if !(0.0..=1.0).contains(&self.spawn_rate) {
            return Err(SimError::Config(format!(
                "spawn rate {} is outside [0, 1]",
                self.spawn_rate
            )));
        }
        if self.max_green_ticks <= YELLOW_TICKS {
            return Err(SimError::Config(format!(
                "max green ticks {} must exceed the {}-tick yellow phase",
                self.max_green_ticks, YELLOW_TICKS
            )));
        }
        if self.spawn_approaches.is_empty() {
            return Err(SimError::Config(
                "at least one approach must spawn vehicles".to_string(),
            ));
        }
        Ok(())
    }
}
