//! Position-keyed index of every agent on the board
//!
//! A cell always holds its terrain, and may additionally hold a light post
//! or vehicles. The grid only records who is where; the agents' state
//! lives with their owners in [`SimWorld`](super::SimWorld).

use super::terrain::{TerrainCell, TerrainKind};
use super::types::{Approach, CarId, Position};

/// An occupant of a grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellAgent {
    Terrain(TerrainKind),
    Car(CarId),
    Stoplight(Approach),
}

#[derive(Debug, Clone)]
pub struct SimGrid {
    width: i32,
    height: i32,
    /// Row-major cell contents
    cells: Vec<Vec<CellAgent>>,
}

impl SimGrid {
    pub fn new(width: i32, height: i32, terrain: &[TerrainCell]) -> Self {
        let cells = width.max(0) as usize * height.max(0) as usize;
        let mut grid = Self {
            width,
            height,
            cells: vec![Vec::new(); cells],
        };
        for cell in terrain {
            grid.place(cell.position, CellAgent::Terrain(cell.kind));
        }
        grid
    }

    fn index(&self, position: Position) -> Option<usize> {
        if (0..self.width).contains(&position.x) && (0..self.height).contains(&position.y) {
            Some(position.y as usize * self.width as usize + position.x as usize)
        } else {
            None
        }
    }

    /// Agents in a cell; empty for cells off the board
    pub fn contents(&self, position: Position) -> &[CellAgent] {
        match self.index(position) {
            Some(i) => &self.cells[i],
            None => &[],
        }
    }

    pub fn place(&mut self, position: Position, agent: CellAgent) {
        if let Some(i) = self.index(position) {
            self.cells[i].push(agent);
        }
    }

    /// Remove `agent` from a cell, returning whether it was there
    pub fn remove(&mut self, position: Position, agent: CellAgent) -> bool {
        let Some(i) = self.index(position) else {
            return false;
        };
        let cell = &mut self.cells[i];
        match cell.iter().position(|a| *a == agent) {
            Some(slot) => {
                cell.remove(slot);
                true
            }
            None => false,
        }
    }

    pub fn move_car(&mut self, car_id: CarId, from: Position, to: Position) {
        self.remove(from, CellAgent::Car(car_id));
        self.place(to, CellAgent::Car(car_id));
    }

    pub fn cars_at(&self, position: Position) -> impl Iterator<Item = CarId> + '_ {
        self.contents(position).iter().filter_map(|agent| match agent {
            CellAgent::Car(id) => Some(*id),
            _ => None,
        })
    }

    pub fn car_count(&self, position: Position) -> usize {
        self.cars_at(position).count()
    }

    pub fn agent_count(&self, position: Position) -> usize {
        self.contents(position).len()
    }
}
