//! Stoplight state machine
//!
//! RED asks the arbiter for green, GREEN runs until its tick budget or (in
//! smart mode) until nobody is waiting, and YELLOW always lasts exactly
//! [`YELLOW_TICKS`] before releasing the arbiter and going back to RED.

use log::debug;

use super::arbiter::ActivationArbiter;
use super::error::SimResult;
use super::topology::GridTopology;
use super::types::{Approach, LightColor, Position, PREVIEW_DISTANCE, YELLOW_TICKS};

/// What a light will do at the end of the current tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LightDecision {
    pub next_color: Option<LightColor>,
    /// Replaces the tick counter before it is advanced
    pub ticks_override: Option<u32>,
}

/// A signal for one approach
///
/// The light named after an approach stands on that side of the crossing
/// and therefore faces the traffic coming from the opposite side.
#[derive(Debug, Clone)]
pub struct SimStoplight {
    pub id: Approach,
    pub color: LightColor,
    pub position: Position,
    preview_cells: [Position; PREVIEW_DISTANCE],
    ticks_in_state: u32,
    max_green_ticks: u32,
    smart: bool,
}

impl SimStoplight {
    pub fn new(id: Approach, topology: &GridTopology, max_green_ticks: u32, smart: bool) -> Self {
        Self {
            id,
            color: LightColor::Red,
            position: topology.light_position(id),
            preview_cells: topology.preview_cells(id.opposite()),
            ticks_in_state: 0,
            max_green_ticks,
            smart,
        }
    }

    /// The approach whose vehicles obey this light
    pub fn controlled_origin(&self) -> Approach {
        self.id.opposite()
    }

    pub fn preview_cells(&self) -> &[Position; PREVIEW_DISTANCE] {
        &self.preview_cells
    }

    pub fn ticks_in_state(&self) -> u32 {
        self.ticks_in_state
    }

    pub fn max_green_ticks(&self) -> u32 {
        self.max_green_ticks
    }

    pub fn is_smart(&self) -> bool {
        self.smart
    }

    /// Decide the next color from the committed state
    ///
    /// `cars_waiting` is the number of vehicles in the preview cells. The
    /// arbiter is the only shared state touched here.
    pub fn decide(
        &self,
        cars_waiting: usize,
        arbiter: &mut ActivationArbiter,
    ) -> SimResult<LightDecision> {
        let mut decision = LightDecision::default();

        match self.color {
            LightColor::Red => {
                if (!self.smart || cars_waiting > 0) && arbiter.request_activation(self.id) {
                    decision.next_color = Some(LightColor::Green);
                }
            }
            LightColor::Yellow => {
                if self.ticks_in_state >= self.max_green_ticks {
                    arbiter.release_head(self.id)?;
                    decision.next_color = Some(LightColor::Red);
                    decision.ticks_override = Some(0);
                }
            }
            LightColor::Green => {
                let budget_spent = self.ticks_in_state >= self.max_green_ticks - YELLOW_TICKS;
                if budget_spent || (self.smart && cars_waiting == 0) {
                    // Yellow always gets the last two ticks of the budget
                    decision.next_color = Some(LightColor::Yellow);
                    decision.ticks_override = Some(self.max_green_ticks - YELLOW_TICKS);
                }
            }
        }

        Ok(decision)
    }

    /// Apply a decision: override the counter, count the tick unless red,
    /// then switch color
    ///
    /// A light leaving yellow counts that last tick, so it rests at red
    /// with a counter of 1 and its next green is one tick shorter than
    /// its first.
    pub fn commit(&mut self, decision: LightDecision) {
        if let Some(ticks) = decision.ticks_override {
            self.ticks_in_state = ticks;
        }
        if self.color != LightColor::Red {
            self.ticks_in_state += 1;
        }
        if let Some(color) = decision.next_color {
            debug!("Light {} {:?} -> {:?}", self.id, self.color, color);
            self.color = color;
        }
    }
}
