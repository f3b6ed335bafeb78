//! Static ground classification of every grid cell

use super::topology::GridTopology;
use super::types::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TerrainKind {
    Garden,
    Curb,
    Street,
    Crosswalk,
    Crossroad,
}

/// Ground under one cell, created once with the world
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerrainCell {
    pub position: Position,
    pub kind: TerrainKind,
}

impl TerrainKind {
    pub fn classify(topology: &GridTopology, position: Position) -> TerrainKind {
        let [h0, h1] = topology.h_road();
        let [v0, v1] = topology.v_road();
        let Position { x, y } = position;

        if topology.is_cross_point(position) {
            TerrainKind::Crossroad
        } else if topology.is_stop_point(position) || topology.is_continue_point(position) {
            TerrainKind::Crosswalk
        } else if x == v0 || x == v1 || y == h0 || y == h1 {
            TerrainKind::Street
        } else if x == v0 - 1 || x == v1 + 1 || y == h0 - 1 || y == h1 + 1 {
            TerrainKind::Curb
        } else {
            TerrainKind::Garden
        }
    }
}

/// Classify every cell, row by row
pub fn layout(topology: &GridTopology) -> Vec<TerrainCell> {
    (0..topology.height())
        .flat_map(|y| (0..topology.width()).map(move |x| Position::new(x, y)))
        .map(|position| TerrainCell {
            position,
            kind: TerrainKind::classify(topology, position),
        })
        .collect()
}
