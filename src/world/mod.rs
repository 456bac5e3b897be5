//! World state - entity arenas, the map and scenario persistence

pub mod index;
pub mod loader;
pub mod map;
pub mod scenario;

#[cfg(test)]
pub(crate) mod testing;

pub use index::{EntityIndex, Identified};
pub use loader::ScenarioRows;
pub use map::{GameMap, MilitaryTerrainTable, Terrain, TerrainEffect};
pub use scenario::World;
