//! Command pipeline - named commands and queries over the world
//!
//! Callers address the engine by name with JSON arguments:
//! name -> CommandRegistry -> handler -> World method

pub mod handlers;
pub mod registry;

pub use registry::{CommandError, CommandRegistry};
