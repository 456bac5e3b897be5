//! Military rosters and their kinds
//!
//! A roster is a group of persons plus a troop count. It sits garrisoned in
//! a settlement until deployed on the map as a troop.

use serde::{Deserialize, Serialize};

use crate::core::types::{MilitaryId, MilitaryKindId, PersonId, SettlementId, TroopId};
use crate::world::index::Identified;

/// Stat and movement template for a roster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MilitaryKind {
    pub id: MilitaryKindId,
    pub name: String,
    pub offense: f32,
    pub offense_per_unit: f32,
    pub defense: f32,
    pub defense_per_unit: f32,
    /// Multiplier on damage dealt to settlement endurance
    pub architecture_offense: f32,
    /// Movement points per day
    pub movability: f32,
    /// Attack range in taxicab distance, inclusive
    pub range_lo: u32,
    pub range_hi: u32,
    /// Soldiers per "unit" when counting unit strength
    pub unit_quantity: u32,
    /// Fund spent to raise a new roster
    pub cost: i32,
    pub max_quantity: u32,
}

impl MilitaryKind {
    pub fn in_range(&self, distance: u32) -> bool {
        self.range_lo <= distance && distance <= self.range_hi
    }
}

impl Identified for MilitaryKind {
    type Id = MilitaryKindId;
    fn id(&self) -> MilitaryKindId {
        self.id
    }
}

/// Where a roster currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MilitaryLocation {
    Settlement(SettlementId),
    Deployed(TroopId),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Military {
    pub id: MilitaryId,
    pub name: String,
    pub kind: MilitaryKindId,
    /// Roster members; the first is the leader
    pub persons: Vec<PersonId>,
    pub quantity: u32,
    pub morale: i32,
    pub combativity: i32,
    pub location: MilitaryLocation,
}

impl Military {
    pub fn leader(&self) -> Option<PersonId> {
        self.persons.first().copied()
    }

    /// Fractional number of units, for per-unit offense/defense bonuses
    pub fn unit_count(&self, kind: &MilitaryKind) -> f32 {
        if kind.unit_quantity == 0 {
            return 0.0;
        }
        self.quantity as f32 / kind.unit_quantity as f32
    }

    /// Remove up to `amount`; quantity never goes below zero
    pub fn decrease_quantity(&mut self, amount: u32) {
        self.quantity = self.quantity.saturating_sub(amount);
    }

    pub fn is_empty(&self) -> bool {
        self.quantity == 0
    }
}

impl Identified for Military {
    type Id = MilitaryId;
    fn id(&self) -> MilitaryId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind() -> MilitaryKind {
        MilitaryKind {
            id: MilitaryKindId(1),
            name: "Infantry".into(),
            offense: 10.0,
            offense_per_unit: 2.0,
            defense: 10.0,
            defense_per_unit: 2.0,
            architecture_offense: 1.0,
            movability: 10.0,
            range_lo: 1,
            range_hi: 1,
            unit_quantity: 100,
            cost: 50,
            max_quantity: 1000,
        }
    }

    fn roster(quantity: u32) -> Military {
        Military {
            id: MilitaryId(1),
            name: "First".into(),
            kind: MilitaryKindId(1),
            persons: vec![PersonId(4), PersonId(2)],
            quantity,
            morale: 80,
            combativity: 50,
            location: MilitaryLocation::Settlement(SettlementId(1)),
        }
    }

    #[test]
    fn test_leader_is_first_member() {
        assert_eq!(roster(100).leader(), Some(PersonId(4)));
    }

    #[test]
    fn test_unit_count() {
        assert_eq!(roster(250).unit_count(&kind()), 2.5);
    }

    #[test]
    fn test_decrease_quantity_floors_at_zero() {
        let mut m = roster(30);
        m.decrease_quantity(50);
        assert_eq!(m.quantity, 0);
        assert!(m.is_empty());
    }

    #[test]
    fn test_range_is_inclusive() {
        let mut k = kind();
        k.range_lo = 2;
        k.range_hi = 3;
        assert!(!k.in_range(1));
        assert!(k.in_range(2));
        assert!(k.in_range(3));
        assert!(!k.in_range(4));
    }
}
