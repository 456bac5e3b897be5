//! City layer - settlements, mayors and the daily economy

pub mod economy;
pub mod mayor;
pub mod settlement;

pub use economy::{Development, Income, SettlementDay};
pub use settlement::{DevelopmentStats, Settlement, SettlementKind};
