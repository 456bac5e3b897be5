//! Strategic map: a rectangular grid of terrain cells
//!
//! Movement cost and combat strength depend on the (military kind, terrain)
//! pair, looked up in `MilitaryTerrainTable`.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::types::{MilitaryKindId, Point, TerrainId};
use crate::world::index::Identified;

/// A terrain type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Terrain {
    pub id: TerrainId,
    pub name: String,
    /// Units on water switch to the scenario's ship kind
    pub water: bool,
}

impl Identified for Terrain {
    type Id = TerrainId;
    fn id(&self) -> TerrainId {
        self.id
    }
}

/// How a military kind fares on a terrain
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerrainEffect {
    /// Movement points spent entering the cell (INFINITY = impassable)
    pub movement_cost: f32,
    /// Combat multiplier applied to offense and defense
    pub multiple: f32,
}

impl TerrainEffect {
    pub fn is_passable(&self) -> bool {
        self.movement_cost.is_finite()
    }
}

impl Default for TerrainEffect {
    fn default() -> Self {
        Self {
            movement_cost: 1.0,
            multiple: 1.0,
        }
    }
}

/// Per (military kind, terrain) effects; missing pairs use the default effect
#[derive(Debug, Clone, Default)]
pub struct MilitaryTerrainTable {
    entries: AHashMap<(MilitaryKindId, TerrainId), TerrainEffect>,
}

impl MilitaryTerrainTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, kind: MilitaryKindId, terrain: TerrainId, effect: TerrainEffect) {
        self.entries.insert((kind, terrain), effect);
    }

    pub fn get(&self, kind: MilitaryKindId, terrain: TerrainId) -> TerrainEffect {
        self.entries
            .get(&(kind, terrain))
            .copied()
            .unwrap_or_default()
    }

    /// Cheapest cell entry any kind can make, including the default effect
    pub fn min_movement_cost(&self) -> f32 {
        self.entries
            .values()
            .map(|e| e.movement_cost)
            .filter(|c| c.is_finite() && *c >= 0.0)
            .fold(TerrainEffect::default().movement_cost, f32::min)
    }

    /// Entries sorted by (kind, terrain), for stable serialization
    pub fn entries(&self) -> Vec<(MilitaryKindId, TerrainId, TerrainEffect)> {
        let mut entries: Vec<_> = self
            .entries
            .iter()
            .map(|(&(k, t), &e)| (k, t, e))
            .collect();
        entries.sort_by_key(|&(k, t, _)| (k, t));
        entries
    }
}

/// The full strategic map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameMap {
    width: u32,
    height: u32,
    /// Row-major terrain ids
    cells: Vec<TerrainId>,
}

impl GameMap {
    /// Create a map filled with one terrain
    pub fn new(width: u32, height: u32, fill: TerrainId) -> Self {
        Self {
            width,
            height,
            cells: vec![fill; width as usize * height as usize],
        }
    }

    /// Returns None if `cells` does not match the dimensions
    pub fn from_cells(width: u32, height: u32, cells: Vec<TerrainId>) -> Option<Self> {
        let expected = (width as usize).checked_mul(height as usize)?;
        if cells.len() != expected {
            return None;
        }
        Some(Self { width, height, cells })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn cells(&self) -> &[TerrainId] {
        &self.cells
    }

    pub fn in_bounds(&self, p: Point) -> bool {
        p.x >= 0 && p.y >= 0 && p.x < self.width as i32 && p.y < self.height as i32
    }

    fn cell_index(&self, p: Point) -> Option<usize> {
        self.in_bounds(p)
            .then(|| p.y as usize * self.width as usize + p.x as usize)
    }

    /// Terrain at a cell; None outside the map
    pub fn terrain_at(&self, p: Point) -> Option<TerrainId> {
        self.cell_index(p).map(|i| self.cells[i])
    }

    pub fn set_terrain(&mut self, p: Point, terrain: TerrainId) {
        if let Some(i) = self.cell_index(p) {
            self.cells[i] = terrain;
        }
    }
}
