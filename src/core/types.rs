//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl $name {
            pub fn new(id: u32) -> Self {
                Self(id)
            }
        }

        impl From<u32> for $name {
            fn from(id: u32) -> Self {
                Self(id)
            }
        }

        impl From<$name> for u32 {
            fn from(id: $name) -> u32 {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id!(
    /// Unique identifier for persons (officers, mayors, workers)
    PersonId
);
entity_id!(
    /// Unique identifier for factions
    FactionId
);
entity_id!(
    /// Unique identifier for sections (a faction's administrative division)
    SectionId
);
entity_id!(
    /// Unique identifier for settlements
    SettlementId
);
entity_id!(SettlementKindId);
entity_id!(
    /// Unique identifier for military rosters
    MilitaryId
);
entity_id!(MilitaryKindId);
entity_id!(
    /// Unique identifier for deployed units on the map
    TroopId
);
entity_id!(TerrainId);

/// Simulated day counter
pub type Day = u32;

/// Grid cell on the strategic map
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance
    pub fn taxi_distance(&self, other: &Self) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// The four edge-adjacent cells
    pub fn neighbors(&self) -> [Point; 4] {
        [
            Point::new(self.x + 1, self.y),
            Point::new(self.x, self.y - 1),
            Point::new(self.x - 1, self.y),
            Point::new(self.x, self.y + 1),
        ]
    }

    /// Cells spiralling out from this one: the cell itself first, then each
    /// square ring up to `radius` (8 cells at radius 1, 16 at radius 2, ...)
    pub fn spiral_out(&self, radius: u32) -> Vec<Point> {
        let radius = radius as i32;
        let mut cells = vec![*self];
        for r in 1..=radius {
            // Walk the ring clockwise starting at the top-left corner
            for dx in -r..r {
                cells.push(Point::new(self.x + dx, self.y - r));
            }
            for dy in -r..r {
                cells.push(Point::new(self.x + r, self.y + dy));
            }
            for dx in (-r + 1..=r).rev() {
                cells.push(Point::new(self.x + dx, self.y + r));
            }
            for dy in (-r + 1..=r).rev() {
                cells.push(Point::new(self.x - r, self.y + dy));
            }
        }
        cells
    }

    /// Format a list of points as space-separated `x,y` pairs
    pub fn list_to_string(points: &[Point]) -> String {
        points
            .iter()
            .map(|p| p.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Parse a space-separated list of `x,y` pairs
    pub fn parse_list(s: &str) -> Result<Vec<Point>, ParsePointError> {
        s.split_whitespace().map(str::parse).collect()
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

/// A point string was not of the form `x,y`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid point '{0}'")]
pub struct ParsePointError(pub String);

impl FromStr for Point {
    type Err = ParsePointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParsePointError(s.to_string());
        let (x, y) = s.trim().split_once(',').ok_or_else(err)?;
        let x = x.trim().parse().map_err(|_| err())?;
        let y = y.trim().parse().map_err(|_| err())?;
        Ok(Point::new(x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_taxi_distance() {
        let a = Point::new(0, 0);
        assert_eq!(a.taxi_distance(&Point::new(3, -4)), 7);
        assert_eq!(a.taxi_distance(&a), 0);
    }

    #[test]
    fn test_spiral_out_radius_one() {
        let center = Point::new(5, 5);
        let cells = center.spiral_out(1);
        assert_eq!(cells.len(), 9);
        assert_eq!(cells[0], center);
        for cell in &cells[1..] {
            assert!((cell.x - 5).abs() <= 1 && (cell.y - 5).abs() <= 1);
            assert_ne!(*cell, center);
        }
    }

    #[test]
    fn test_spiral_out_cells_are_unique() {
        let cells = Point::new(0, 0).spiral_out(3);
        let unique: std::collections::HashSet<_> = cells.iter().collect();
        assert_eq!(cells.len(), 49);
        assert_eq!(unique.len(), 49);
    }

    #[test]
    fn test_point_parse() {
        assert_eq!("3,4".parse::<Point>(), Ok(Point::new(3, 4)));
        assert_eq!(" -1, 2 ".parse::<Point>(), Ok(Point::new(-1, 2)));
        assert!("3;4".parse::<Point>().is_err());
        assert_eq!(
            "a,4".parse::<Point>().unwrap_err().to_string(),
            "invalid point 'a,4'"
        );
    }

    #[test]
    fn test_point_list() {
        let points = vec![Point::new(1, 2), Point::new(3, 4)];
        let s = Point::list_to_string(&points);
        assert_eq!(s, "1,2 3,4");
        assert_eq!(Point::parse_list(&s).unwrap(), points);
        assert!(Point::parse_list("").unwrap().is_empty());
    }

    #[test]
    fn test_id_ordering() {
        assert!(TroopId(1) < TroopId(2));
        assert_eq!(u32::from(SettlementId::new(7)), 7);
    }
}
