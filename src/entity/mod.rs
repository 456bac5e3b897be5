//! Persons, rosters and factions

pub mod faction;
pub mod military;
pub mod person;

pub use faction::{Faction, Section};
pub use military::{Military, MilitaryKind, MilitaryLocation};
pub use person::{Abilities, DevelopmentCategory, Person, PersonLocation, PersonState, Work};
