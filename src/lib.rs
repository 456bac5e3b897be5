//! Realm Sim - daily simulation core for a grand-strategy game
//!
//! One call to `simulation::advance_day` moves the world forward a day:
//! settlements develop and collect income, deployed units follow their
//! orders, move and fight.

pub mod battle;
pub mod city;
pub mod command;
pub mod core;
pub mod entity;
pub mod simulation;
pub mod world;
