pub mod calendar;
pub mod config;
pub mod error;
pub mod types;

pub use calendar::{Calendar, GameDate, Season};
pub use config::SimulationConfig;
pub use error::{
    ConfigError, DataIntegrityError, IndexError, Result, SimError, ValidationError,
};
pub use types::Point;
