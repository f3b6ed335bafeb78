//! Main simulation world that ties everything together
//!
//! Owns the board, the cars and the lights, and drives the two-phase tick:
//! every light and then every car decides against the state committed by
//! the previous tick, after which all decisions are applied at once and
//! new cars are spawned.

use log::{debug, warn};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::Rng;
use rand::SeedableRng;
use std::collections::BTreeMap;

use super::arbiter::ActivationArbiter;
use super::car::{CarDecision, FrozenView, MovementState, SimCar, TickResolver};
use super::config::SimConfig;
use super::error::{SimError, SimResult};
use super::grid::{CellAgent, SimGrid};
use super::report::{BoardInfo, CarDelta, CellCode, LightInit, LightState, StepDelta};
use super::stoplight::SimStoplight;
use super::terrain::{self, TerrainCell, TerrainKind};
use super::topology::GridTopology;
use super::types::{Approach, CarId, LightColor, Position};

/// Running totals of a simulation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimStats {
    pub ticks: u64,
    pub cars_spawned: usize,
    pub cars_removed: usize,
    /// Cell-ticks in which two or more cars still on the board shared a cell
    pub crash_cells_seen: usize,
}

/// The main simulation world
pub struct SimWorld {
    config: SimConfig,

    topology: GridTopology,

    /// Ground classification, one entry per cell
    terrain: Vec<TerrainCell>,

    grid: SimGrid,

    /// All cars still on the board, in spawn order
    cars: BTreeMap<CarId, SimCar>,

    /// One light per approach, in `Approach::ALL` order
    stoplights: Vec<SimStoplight>,

    arbiter: ActivationArbiter,

    /// Next ID to assign
    next_id: usize,

    /// Optional seeded RNG for reproducible simulations
    rng: Option<StdRng>,

    stats: SimStats,
}

impl SimWorld {
    pub fn new(config: SimConfig) -> SimResult<Self> {
        config.validate()?;

        let topology = GridTopology::new(config.width, config.height)?;
        let terrain = terrain::layout(&topology);
        let mut grid = SimGrid::new(topology.width(), topology.height(), &terrain);

        let stoplights: Vec<SimStoplight> = Approach::ALL
            .iter()
            .map(|&id| SimStoplight::new(id, &topology, config.max_green_ticks, config.smart))
            .collect();
        for light in &stoplights {
            grid.place(light.position, CellAgent::Stoplight(light.id));
        }

        let rng = config.seed.map(StdRng::seed_from_u64);

        Ok(Self {
            config,
            topology,
            terrain,
            grid,
            cars: BTreeMap::new(),
            stoplights,
            arbiter: ActivationArbiter::new(),
            next_id: 0,
            rng,
            stats: SimStats::default(),
        })
    }

    /// Create a world with a seeded RNG for reproducible simulations
    pub fn new_with_seed(config: SimConfig, seed: u64) -> SimResult<Self> {
        Self::new(config.with_seed(seed))
    }

    /// Uniform draw in [0, 1), using seeded RNG if available
    fn random_unit(&mut self) -> f64 {
        match &mut self.rng {
            Some(rng) => rng.random::<f64>(),
            None => rand::rng().random::<f64>(),
        }
    }

    /// Choose a random element from a slice, using seeded RNG if available
    fn choose_random<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        match &mut self.rng {
            Some(rng) => slice.choose(rng),
            None => slice.choose(&mut rand::rng()),
        }
    }

    fn next_car_id(&mut self) -> CarId {
        let id = CarId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Advance the simulation by one tick
    ///
    /// An error means the arbitration invariant was broken; the world must
    /// not be stepped again after that.
    pub fn step(&mut self) -> SimResult<StepDelta> {
        self.stats.ticks += 1;

        // Decide: lights first, then cars, all against the committed state
        let mut light_decisions = Vec::with_capacity(self.stoplights.len());
        for light in &self.stoplights {
            let cars_waiting = light
                .preview_cells()
                .iter()
                .map(|cell| self.grid.car_count(*cell))
                .sum();
            light_decisions.push(light.decide(cars_waiting, &mut self.arbiter)?);
        }

        let car_decisions: Vec<(CarId, CarDecision)> = {
            let mut resolver = TickResolver::new(FrozenView {
                topology: &self.topology,
                grid: &self.grid,
                cars: &self.cars,
                stoplights: &self.stoplights,
            });
            self.cars
                .keys()
                .filter_map(|car_id| resolver.resolve(*car_id).map(|d| (*car_id, d)))
                .collect()
        };

        // Commit
        for (light, decision) in self.stoplights.iter_mut().zip(light_decisions) {
            light.commit(decision);
        }

        let mut removed = Vec::new();
        for (car_id, decision) in car_decisions {
            let Some(car) = self.cars.get_mut(&car_id) else {
                continue;
            };
            if let Some(car_move) = car.commit(decision, &self.topology) {
                self.grid.move_car(car_id, car_move.from, car_move.to);
            }
            if car.state == MovementState::Removed {
                removed.push(car_id);
            }
        }
        for car_id in removed {
            self.remove_vehicle(car_id);
        }

        self.spawn_cars();
        self.record_crashes();

        Ok(self.report_deltas())
    }

    fn spawn_cars(&mut self) {
        let approaches = self.config.spawn_approaches.clone();
        for approach in approaches {
            self.spawn_vehicle(approach);
        }
    }

    /// Spawn a car at `approach`'s border cell with probability `spawn_rate`
    ///
    /// Nothing is spawned while another car still occupies the spawn cell.
    pub fn spawn_vehicle(&mut self, approach: Approach) -> Option<CarId> {
        if self.random_unit() >= self.config.spawn_rate {
            return None;
        }
        let spawn = self.topology.spawn_point(approach);
        if self.occupancy_count(spawn) > 0 {
            return None;
        }

        let others: Vec<Approach> = Approach::ALL
            .into_iter()
            .filter(|a| *a != approach)
            .collect();
        let destination = *self.choose_random(&others)?;
        let turn = self.topology.turn_type(approach, destination)?;

        let id = self.next_car_id();
        let car = SimCar::new(id, approach, destination, turn, spawn);
        self.grid.place(spawn, CellAgent::Car(id));
        self.cars.insert(id, car);
        self.stats.cars_spawned += 1;

        debug!(
            "Spawned car {} at {} from {} to {} ({:?})",
            id, spawn, approach, destination, turn
        );
        Some(id)
    }

    /// Place a car with a chosen route, bypassing the spawn draw
    ///
    /// Used to script scenarios; the car starts `Moving` like a spawned one.
    pub fn insert_vehicle(
        &mut self,
        origin: Approach,
        destination: Approach,
        position: Position,
    ) -> SimResult<CarId> {
        let turn = self.topology.turn_type(origin, destination).ok_or_else(|| {
            SimError::InvalidVehicle(format!("destination {} equals origin", destination))
        })?;
        if !self.topology.in_bounds(position) {
            return Err(SimError::InvalidVehicle(format!(
                "position {} is off the board",
                position
            )));
        }

        let id = self.next_car_id();
        self.grid.place(position, CellAgent::Car(id));
        self.cars
            .insert(id, SimCar::new(id, origin, destination, turn, position));
        self.stats.cars_spawned += 1;
        Ok(id)
    }

    /// Detach a removed car from the board
    pub fn remove_vehicle(&mut self, car_id: CarId) {
        let Some(car) = self.cars.get(&car_id) else {
            return;
        };
        if car.state != MovementState::Removed {
            warn!("Refusing to remove car {} in state {:?}", car_id, car.state);
            return;
        }
        let position = car.position;
        self.grid.remove(position, CellAgent::Car(car_id));
        self.cars.remove(&car_id);
        self.stats.cars_removed += 1;
        debug!("Removed car {} at {}", car_id, position);
    }

    /// Count cells shared by two or more cars staying on the board
    ///
    /// A car that has just left the board still sits on its border cell
    /// for one tick and may be joined there by its follower; that is not
    /// a crash.
    fn record_crashes(&mut self) {
        let mut per_cell: BTreeMap<Position, usize> = BTreeMap::new();
        for car in self.cars.values() {
            if car.state != MovementState::ExitPending {
                *per_cell.entry(car.position).or_default() += 1;
            }
        }

        let mut crashes = 0;
        for (cell, cars) in per_cell.into_iter().filter(|(_, cars)| *cars >= 2) {
            warn!(
                "Crash at {} on tick {}: {} cars in one cell",
                cell, self.stats.ticks, cars
            );
            crashes += 1;
        }
        self.stats.crash_cells_seen += crashes;
    }

    /// Number of cars in a cell
    pub fn occupancy_count(&self, position: Position) -> usize {
        self.grid.car_count(position)
    }

    /// Snapshot of every car's last move and every light's color
    pub fn report_deltas(&self) -> StepDelta {
        let cars = self
            .cars
            .values()
            .map(|car| CarDelta {
                id: car.id,
                from_x: car.previous_position.x,
                from_y: car.previous_position.y,
                to_x: car.position.x,
                to_y: car.position.y,
                origin: car.origin,
                action: car.action,
                turn: car.turn,
            })
            .collect();
        let lights = self
            .stoplights
            .iter()
            .map(|light| LightState {
                id: light.id,
                state: light.color,
            })
            .collect();

        StepDelta {
            tick: self.stats.ticks,
            cars,
            lights,
        }
    }

    pub fn init_board(&self) -> BoardInfo {
        BoardInfo {
            width: self.topology.width(),
            height: self.topology.height(),
        }
    }

    pub fn init_lights(&self) -> Vec<LightInit> {
        self.stoplights
            .iter()
            .map(|light| LightInit {
                id: light.id,
                state: light.color,
                x: light.position.x,
                y: light.position.y,
            })
            .collect()
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn topology(&self) -> &GridTopology {
        &self.topology
    }

    pub fn terrain(&self) -> &[TerrainCell] {
        &self.terrain
    }

    pub fn grid(&self) -> &SimGrid {
        &self.grid
    }

    pub fn cars(&self) -> impl Iterator<Item = &SimCar> {
        self.cars.values()
    }

    pub fn car(&self, car_id: CarId) -> Option<&SimCar> {
        self.cars.get(&car_id)
    }

    pub fn car_count(&self) -> usize {
        self.cars.len()
    }

    pub fn stoplights(&self) -> &[SimStoplight] {
        &self.stoplights
    }

    pub fn stoplight(&self, id: Approach) -> &SimStoplight {
        &self.stoplights[id.index()]
    }

    pub fn arbiter(&self) -> &ActivationArbiter {
        &self.arbiter
    }

    pub fn stats(&self) -> SimStats {
        self.stats
    }

    /// Visual classification of one cell
    pub fn cell_code(&self, position: Position) -> CellCode {
        let contents = self.grid.contents(position);
        match contents.len() {
            0 | 1 => match contents.first() {
                Some(CellAgent::Terrain(kind)) => terrain_code(*kind),
                _ => CellCode::Garden,
            },
            2 => {
                let occupant = contents
                    .iter()
                    .find(|agent| !matches!(agent, CellAgent::Terrain(_)));
                match occupant {
                    Some(CellAgent::Stoplight(id)) => match self.stoplight(*id).color {
                        LightColor::Green => CellCode::GreenLight,
                        LightColor::Yellow => CellCode::YellowLight,
                        LightColor::Red => CellCode::RedLight,
                    },
                    _ => CellCode::Car,
                }
            }
            _ => CellCode::Crash,
        }
    }

    /// Code matrix of the whole board, one row per `y`
    pub fn cell_codes(&self) -> Vec<Vec<u8>> {
        (0..self.topology.height())
            .map(|y| {
                (0..self.topology.width())
                    .map(|x| self.cell_code(Position::new(x, y)).code())
                    .collect()
            })
            .collect()
    }

    /// Print a summary of the world state
    pub fn print_summary(&self) {
        println!("=== Crossroad Simulation Summary ===");
        println!("Tick: {}", self.stats.ticks);
        println!(
            "Cars: {} active, {} spawned, {} removed",
            self.cars.len(),
            self.stats.cars_spawned,
            self.stats.cars_removed
        );

        println!("--- Lights ---");
        for light in &self.stoplights {
            println!(
                "  {:<5} {:?} (ticks={})",
                light.id.as_str(),
                light.color,
                light.ticks_in_state()
            );
        }
        let queue: Vec<&str> = self.arbiter.queued().map(|a| a.as_str()).collect();
        println!("  Queue: [{}]", queue.join(", "));

        if !self.cars.is_empty() {
            println!("--- Active Cars ---");
            for car in self.cars.values() {
                println!(
                    "  Car {}: {} -> {} ({:?}), at {}, {:?}",
                    car.id, car.origin, car.destination, car.turn, car.position, car.state
                );
            }
        }
    }

    /// Draw a visual map of the board in the terminal
    pub fn draw_map(&self) {
        println!("\n=== Crossroad Map ===");
        println!("Legend: C=Car, X=Crash, +=Crossroad, ==Crosswalk, #=Curb, .=Street, G/Y/R=Light");
        println!();
        for y in 0..self.topology.height() {
            let line: String = (0..self.topology.width())
                .map(|x| self.cell_code(Position::new(x, y)).glyph())
                .collect();
            println!("{}", line);
        }
        println!();
    }
}

fn terrain_code(kind: TerrainKind) -> CellCode {
    match kind {
        TerrainKind::Crossroad => CellCode::Crossroad,
        TerrainKind::Crosswalk => CellCode::Crosswalk,
        TerrainKind::Curb => CellCode::Curb,
        TerrainKind::Street => CellCode::Street,
        TerrainKind::Garden => CellCode::Garden,
    }
}

