//! Vehicle movement logic for the crossroad simulation
//!
//! A car advances one cell per tick along its heading, turns once inside
//! the crossing when its maneuver requires it, halts at its stop cell while
//! the light facing it is not green, and halts behind stopped traffic.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

use super::grid::SimGrid;
use super::stoplight::SimStoplight;
use super::topology::GridTopology;
use super::types::{Approach, CarId, Heading, LightColor, Position, TurnType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MovementState {
    Stopped,
    Moving,
    /// Left the grid this tick; kept one more tick so the exit is reported
    ExitPending,
    Removed,
}

/// What the car did in the last tick, as reported to the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CarAction {
    Spawned,
    Moving,
    Turning,
    Stopped,
    Destroyed,
}

/// Read-only view of the state committed at the end of the previous tick
#[derive(Clone, Copy)]
pub struct FrozenView<'a> {
    pub topology: &'a GridTopology,
    pub grid: &'a SimGrid,
    pub cars: &'a BTreeMap<CarId, SimCar>,
    pub stoplights: &'a [SimStoplight],
}

impl FrozenView<'_> {
    pub fn light_color(&self, light: Approach) -> Option<LightColor> {
        self.stoplights
            .iter()
            .find(|s| s.id == light)
            .map(|s| s.color)
    }
}

/// Computes every car's decision for one tick from a frozen view
///
/// A car's decision may depend on what the car ahead of it does this
/// tick. That outcome is itself a pure function of the frozen view, so it
/// is resolved on demand and memoized; nothing committed is ever mutated.
/// Chains of followers are walked with an explicit stack, so a long queue
/// costs heap rather than call depth.
pub struct TickResolver<'a> {
    view: FrozenView<'a>,
    decisions: HashMap<CarId, CarDecision>,
    /// Cars waiting on the outcome of a car further along their lane
    in_progress: HashSet<CarId>,
}

impl<'a> TickResolver<'a> {
    pub fn new(view: FrozenView<'a>) -> Self {
        Self {
            view,
            decisions: HashMap::new(),
            in_progress: HashSet::new(),
        }
    }

    pub fn view(&self) -> FrozenView<'a> {
        self.view
    }

    pub fn resolve(&mut self, car_id: CarId) -> Option<CarDecision> {
        if let Some(decision) = self.decisions.get(&car_id) {
            return Some(*decision);
        }
        let cars = self.view.cars;
        let grid = self.view.grid;
        cars.get(&car_id)?;

        let mut stack = vec![car_id];
        while let Some(&current) = stack.last() {
            let Some(car) = cars.get(&current) else {
                stack.pop();
                continue;
            };
            if self.decisions.contains_key(&current) {
                stack.pop();
                continue;
            }

            let pending = match car.start_decision(&self.view) {
                DecisionStep::Done(decision) => {
                    self.decisions.insert(current, decision);
                    stack.pop();
                    continue;
                }
                DecisionStep::NeedsRoad(pending) => pending,
            };

            let blocker = grid.cars_at(pending.future).find(|id| {
                cars.contains_key(id)
                    && !self.decisions.contains_key(id)
                    && !self.in_progress.contains(id)
            });
            if let Some(blocker) = blocker {
                self.in_progress.insert(current);
                stack.push(blocker);
                continue;
            }

            let free = self.cell_vacated(pending.future);
            self.in_progress.remove(&current);
            self.decisions
                .insert(current, car.finish_decision(pending, free));
            stack.pop();
        }

        self.decisions.get(&car_id).copied()
    }

    /// Whether no car now in `cell` ends the tick stopped in it
    ///
    /// An occupant still waiting on its own lane belongs to a closed loop
    /// of cars each following the next; the loop advances together. An
    /// occupant leaving the board does not block.
    pub fn cell_vacated(&self, cell: Position) -> bool {
        self.view.grid.cars_at(cell).all(|car_id| {
            if self.in_progress.contains(&car_id) {
                return true;
            }
            match self.decisions.get(&car_id) {
                Some(decision) => decision.state != MovementState::Stopped,
                None => true,
            }
        })
    }

    pub fn into_decisions(self) -> HashMap<CarId, CarDecision> {
        self.decisions
    }
}

/// First half of a decision, computed without looking at other cars
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionStep {
    Done(CarDecision),
    /// The outcome hinges on whether the cell ahead clears this tick
    NeedsRoad(PendingMove),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingMove {
    pub decision: CarDecision,
    pub future: Position,
}

/// The pending outcome of a car's decide phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CarDecision {
    pub state: MovementState,
    pub heading: Heading,
    pub has_turned: bool,
    /// Set only when the resulting state is `Moving`
    pub next_position: Option<Position>,
}

/// Cell change applied by a commit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CarMove {
    pub from: Position,
    pub to: Position,
}

/// A car in the crossroad simulation
#[derive(Debug, Clone)]
pub struct SimCar {
    pub id: CarId,
    pub state: MovementState,
    pub origin: Approach,
    pub destination: Approach,
    pub turn: TurnType,
    pub position: Position,
    pub previous_position: Position,
    pub heading: Heading,
    pub action: CarAction,
    /// Turn resolution has already changed the heading
    pub has_turned: bool,
}

impl SimCar {
    pub fn new(
        id: CarId,
        origin: Approach,
        destination: Approach,
        turn: TurnType,
        position: Position,
    ) -> Self {
        Self {
            id,
            state: MovementState::Moving,
            origin,
            destination,
            turn,
            position,
            previous_position: position,
            heading: origin.entry_heading(),
            action: CarAction::Spawned,
            has_turned: false,
        }
    }

    /// Decide the next state against the previous tick's committed state
    pub fn decide(&self, resolver: &mut TickResolver<'_>) -> CarDecision {
        match resolver.resolve(self.id) {
            Some(decision) => decision,
            None => match self.start_decision(&resolver.view()) {
                DecisionStep::Done(decision) => decision,
                DecisionStep::NeedsRoad(pending) => {
                    let free = resolver.cell_vacated(pending.future);
                    self.finish_decision(pending, free)
                }
            },
        }
    }

    /// Everything in a decision that does not depend on other cars
    ///
    /// Turns, exits and red lights are settled here. Only a car that may
    /// advance onto the board still has to learn whether its cell ahead
    /// is free.
    pub fn start_decision(&self, view: &FrozenView) -> DecisionStep {
        let mut decision = CarDecision {
            state: self.state,
            heading: self.heading,
            has_turned: self.has_turned,
            next_position: None,
        };

        match self.state {
            MovementState::ExitPending | MovementState::Removed => {
                decision.state = MovementState::Removed;
                return DecisionStep::Done(decision);
            }
            MovementState::Stopped | MovementState::Moving => {}
        }

        if !self.has_turned {
            if let Some(heading) =
                view.topology
                    .turn_heading(self.origin, self.destination, self.position)
            {
                decision.heading = heading;
                decision.has_turned = true;
            }
        }

        let future = self.position.offset(decision.heading);
        if !view.topology.in_bounds(future) {
            decision.state = MovementState::ExitPending;
            return DecisionStep::Done(decision);
        }

        // Red holds a stopped car and stops a moving one
        if self.sees_red_light(view) {
            decision.state = MovementState::Stopped;
            return DecisionStep::Done(decision);
        }

        DecisionStep::NeedsRoad(PendingMove { decision, future })
    }

    /// Settle a pending decision once the cell ahead is known
    pub fn finish_decision(&self, pending: PendingMove, free: bool) -> CarDecision {
        let mut decision = pending.decision;
        if free {
            decision.state = MovementState::Moving;
            decision.next_position = Some(pending.future);
        } else {
            decision.state = MovementState::Stopped;
        }
        decision
    }

    /// True only at this car's stop cell while the light facing it is not green
    pub fn sees_red_light(&self, view: &FrozenView) -> bool {
        if self.position != view.topology.stop_point(self.origin) {
            return false;
        }
        view.light_color(self.origin.opposite())
            .is_some_and(|color| color != LightColor::Green)
    }

    /// Apply a decision, returning the cell change if the car moved
    pub fn commit(&mut self, decision: CarDecision, topology: &GridTopology) -> Option<CarMove> {
        self.state = decision.state;
        self.heading = decision.heading;
        self.has_turned = decision.has_turned;

        match (decision.state, decision.next_position) {
            (MovementState::Moving, Some(next)) => {
                let from = self.position;
                self.previous_position = from;
                self.position = next;
                self.action = if topology.is_turn_cell(from) || topology.is_turn_cell(next) {
                    CarAction::Turning
                } else {
                    CarAction::Moving
                };
                return Some(CarMove { from, to: next });
            }
            (MovementState::Moving, None) | (MovementState::Stopped, _) => {
                self.previous_position = self.position;
                self.action = CarAction::Stopped;
            }
            (MovementState::ExitPending, _) => {
                self.previous_position = self.position;
                self.action = CarAction::Destroyed;
            }
            (MovementState::Removed, _) => {}
        }
        None
    }
}
