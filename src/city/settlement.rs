//! Settlements - towns and cities with stockpiles and development stats

use serde::{Deserialize, Serialize};

use crate::core::types::{MilitaryKindId, Point, SectionId, SettlementId, SettlementKindId};
use crate::entity::person::DevelopmentCategory;
use crate::world::index::Identified;

/// Caps and limits shared by all settlements of a kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementKind {
    pub id: SettlementKindId,
    pub name: String,
    pub agriculture: f32,
    pub commerce: f32,
    pub technology: f32,
    pub endurance: f32,
    pub morale: f32,
    pub max_fund: i32,
    pub max_food: i32,
    /// Intrinsic defense used by combat resolution
    pub defense: f32,
}

impl SettlementKind {
    /// Development cap for a category
    pub fn cap(&self, category: DevelopmentCategory) -> f32 {
        match category {
            DevelopmentCategory::Agriculture => self.agriculture,
            DevelopmentCategory::Commerce => self.commerce,
            DevelopmentCategory::Technology => self.technology,
            DevelopmentCategory::Endurance => self.endurance,
            DevelopmentCategory::Morale => self.morale,
        }
    }
}

impl Identified for SettlementKind {
    type Id = SettlementKindId;
    fn id(&self) -> SettlementKindId {
        self.id
    }
}

/// The five development stats
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DevelopmentStats {
    pub agriculture: f32,
    pub commerce: f32,
    pub technology: f32,
    pub endurance: f32,
    pub morale: f32,
}

impl DevelopmentStats {
    pub fn get(&self, category: DevelopmentCategory) -> f32 {
        match category {
            DevelopmentCategory::Agriculture => self.agriculture,
            DevelopmentCategory::Commerce => self.commerce,
            DevelopmentCategory::Technology => self.technology,
            DevelopmentCategory::Endurance => self.endurance,
            DevelopmentCategory::Morale => self.morale,
        }
    }

    pub fn get_mut(&mut self, category: DevelopmentCategory) -> &mut f32 {
        match category {
            DevelopmentCategory::Agriculture => &mut self.agriculture,
            DevelopmentCategory::Commerce => &mut self.commerce,
            DevelopmentCategory::Technology => &mut self.technology,
            DevelopmentCategory::Endurance => &mut self.endurance,
            DevelopmentCategory::Morale => &mut self.morale,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settlement {
    pub id: SettlementId,
    pub name: String,
    pub kind: SettlementKindId,
    /// Map footprint; the first cell is the settlement's position
    pub cells: Vec<Point>,
    pub section: Option<SectionId>,
    pub population: i32,
    pub fund: i32,
    pub food: i32,
    pub stats: DevelopmentStats,
    pub creatable_military_kinds: Vec<MilitaryKindId>,
}

impl Settlement {
    pub fn position(&self) -> Option<Point> {
        self.cells.first().copied()
    }

    pub fn occupies(&self, p: Point) -> bool {
        self.cells.contains(&p)
    }

    pub fn endurance(&self) -> f32 {
        self.stats.endurance
    }

    /// A settlement whose endurance reached zero no longer blocks movement
    pub fn is_destroyed(&self) -> bool {
        self.stats.endurance <= 0.0
    }

    /// Returns true if this brought endurance to zero
    pub fn lose_endurance(&mut self, amount: u32) -> bool {
        self.stats.endurance = (self.stats.endurance - amount as f32).max(0.0);
        self.is_destroyed()
    }

    pub fn lose_fund(&mut self, amount: i32) {
        self.fund = (self.fund - amount).max(0);
    }
}

impl Identified for Settlement {
    type Id = SettlementId;
    fn id(&self) -> SettlementId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn town() -> Settlement {
        Settlement {
            id: SettlementId(1),
            name: "Town".into(),
            kind: SettlementKindId(1),
            cells: vec![Point::new(2, 2), Point::new(3, 2)],
            section: None,
            population: 1000,
            fund: 10,
            food: 100,
            stats: DevelopmentStats {
                endurance: 30.0,
                ..Default::default()
            },
            creatable_military_kinds: Vec::new(),
        }
    }

    #[test]
    fn test_footprint() {
        let t = town();
        assert_eq!(t.position(), Some(Point::new(2, 2)));
        assert!(t.occupies(Point::new(3, 2)));
        assert!(!t.occupies(Point::new(4, 2)));
    }

    #[test]
    fn test_lose_endurance_clamps_and_reports_destruction() {
        let mut t = town();
        assert!(!t.lose_endurance(10));
        assert_eq!(t.endurance(), 20.0);
        assert!(t.lose_endurance(50));
        assert_eq!(t.endurance(), 0.0);
    }

    #[test]
    fn test_lose_fund_floors_at_zero() {
        let mut t = town();
        t.lose_fund(25);
        assert_eq!(t.fund, 0);
    }

    #[test]
    fn test_stats_by_category() {
        let mut stats = DevelopmentStats::default();
        *stats.get_mut(DevelopmentCategory::Commerce) = 12.5;
        assert_eq!(stats.get(DevelopmentCategory::Commerce), 12.5);
        assert_eq!(stats.get(DevelopmentCategory::Agriculture), 0.0);
    }
}
