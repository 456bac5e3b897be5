pub mod clock;

pub use clock::{advance_day, run_days, DayReport};
