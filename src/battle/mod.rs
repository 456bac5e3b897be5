//! Deployed units - orders, movement and combat on the strategic map

pub mod combat;
pub mod deploy;
pub mod orders;
pub mod pathfinding;
pub mod troop;

pub use combat::{CombatStats, DamagePack, Exchange};
pub use orders::{Order, OrderKind, OrderTarget};
pub use pathfinding::find_path;
pub use troop::{MoveStop, Troop, TroopDay};
