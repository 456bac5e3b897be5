//! Calendar system for the daily tick
//!
//! The simulation advances one day per tick. Settlements collect income on
//! the first day of each month, so the calendar has to know real month
//! lengths (proleptic Gregorian).

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::types::Day;

/// Season of the year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Season {
    Spring, // Mar-May
    Summer, // Jun-Aug
    Autumn, // Sep-Nov
    Winter, // Dec-Feb
}

impl Season {
    pub fn from_month(month: u32) -> Self {
        match month {
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            9..=11 => Season::Autumn,
            _ => Season::Winter,
        }
    }
}

/// A calendar date
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GameDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl GameDate {
    /// Returns None for dates that do not exist (month 13, Feb 30, ...)
    pub fn new(year: i32, month: u32, day: u32) -> Option<Self> {
        if !(1..=12).contains(&month) || day == 0 || day > days_in_month(year, month) {
            return None;
        }
        Some(Self { year, month, day })
    }

    pub fn day_of_month(&self) -> u32 {
        self.day
    }

    pub fn season(&self) -> Season {
        Season::from_month(self.month)
    }

    /// The following day
    pub fn succ(&self) -> Self {
        if self.day < days_in_month(self.year, self.month) {
            Self { day: self.day + 1, ..*self }
        } else if self.month < 12 {
            Self { month: self.month + 1, day: 1, ..*self }
        } else {
            Self { year: self.year + 1, month: 1, day: 1 }
        }
    }

    pub fn plus_days(&self, days: Day) -> Self {
        (0..days).fold(*self, |date, _| date.succ())
    }
}

impl Default for GameDate {
    fn default() -> Self {
        Self { year: 190, month: 1, day: 1 }
    }
}

impl fmt::Display for GameDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

/// Calendar tracks the scenario start date and the number of days passed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Calendar {
    start: GameDate,
    days_passed: Day,
    current: GameDate,
}

impl Calendar {
    pub fn new(start: GameDate, days_passed: Day) -> Self {
        Self {
            start,
            days_passed,
            current: start.plus_days(days_passed),
        }
    }

    pub fn advance(&mut self) {
        self.days_passed += 1;
        self.current = self.current.succ();
    }

    pub fn start_date(&self) -> GameDate {
        self.start
    }

    pub fn days_passed(&self) -> Day {
        self.days_passed
    }

    pub fn current_date(&self) -> GameDate {
        self.current
    }

    pub fn season(&self) -> Season {
        self.current.season()
    }
}

impl Default for Calendar {
    fn default() -> Self {
        Self::new(GameDate::default(), 0)
    }
}
