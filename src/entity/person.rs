//! Persons: the officers who lead units, govern and develop settlements

use serde::{Deserialize, Serialize};

use crate::core::types::{MilitaryId, PersonId, SettlementId};
use crate::world::index::Identified;

/// Settlement development categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DevelopmentCategory {
    Agriculture,
    Commerce,
    Technology,
    Endurance,
    Morale,
}

impl DevelopmentCategory {
    pub const ALL: [DevelopmentCategory; 5] = [
        DevelopmentCategory::Agriculture,
        DevelopmentCategory::Commerce,
        DevelopmentCategory::Technology,
        DevelopmentCategory::Endurance,
        DevelopmentCategory::Morale,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DevelopmentCategory::Agriculture => "agriculture",
            DevelopmentCategory::Commerce => "commerce",
            DevelopmentCategory::Technology => "technology",
            DevelopmentCategory::Endurance => "endurance",
            DevelopmentCategory::Morale => "morale",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == s)
    }
}

/// What a person in a settlement is doing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Work {
    #[default]
    Idle,
    Mayor,
    Develop(DevelopmentCategory),
}

impl Work {
    pub fn as_str(&self) -> &'static str {
        match self {
            Work::Idle => "none",
            Work::Mayor => "mayor",
            Work::Develop(c) => c.as_str(),
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "none" | "" => Some(Work::Idle),
            "mayor" => Some(Work::Mayor),
            other => DevelopmentCategory::parse(other).map(Work::Develop),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonState {
    #[default]
    Normal,
    Unemployed,
    Dead,
}

/// Where a person currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PersonLocation {
    #[default]
    Nowhere,
    Settlement(SettlementId),
    Military(MilitaryId),
}

/// Base abilities, each 0-100
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Abilities {
    pub command: i32,
    pub strength: i32,
    pub intelligence: i32,
    pub politics: i32,
    pub glamour: i32,
}

impl Abilities {
    pub fn sum(&self) -> i32 {
        self.command + self.strength + self.intelligence + self.politics + self.glamour
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub name: String,
    pub abilities: Abilities,
    pub state: PersonState,
    pub location: PersonLocation,
    pub work: Work,
}

impl Person {
    pub fn new(id: PersonId, name: impl Into<String>, abilities: Abilities) -> Self {
        Self {
            id,
            name: name.into(),
            abilities,
            state: PersonState::Normal,
            location: PersonLocation::Nowhere,
            work: Work::Idle,
        }
    }

    pub fn at(mut self, location: PersonLocation) -> Self {
        self.location = location;
        self
    }

    pub fn with_work(mut self, work: Work) -> Self {
        self.work = work;
        self
    }

    /// Ability applied when working on a development category
    pub fn work_ability(&self, category: DevelopmentCategory) -> i32 {
        let a = &self.abilities;
        match category {
            DevelopmentCategory::Agriculture => (2 * a.politics + a.glamour) / 3,
            DevelopmentCategory::Commerce => (a.intelligence + 2 * a.politics) / 3,
            DevelopmentCategory::Technology => (2 * a.intelligence + a.politics) / 3,
            DevelopmentCategory::Endurance => (a.command + a.politics) / 2,
            DevelopmentCategory::Morale => (a.command + a.glamour) / 2,
        }
    }

    pub fn ability_sum(&self) -> i32 {
        self.abilities.sum()
    }

    /// Present and serving in the given settlement
    pub fn is_in_settlement(&self, settlement: SettlementId) -> bool {
        self.state == PersonState::Normal
            && self.location == PersonLocation::Settlement(settlement)
    }

    /// Relocate into a settlement, dropping any work assignment
    pub fn move_to_settlement(&mut self, settlement: SettlementId) {
        self.location = PersonLocation::Settlement(settlement);
        self.work = Work::Idle;
    }
}

impl Identified for Person {
    type Id = PersonId;
    fn id(&self) -> PersonId {
        self.id
    }
}
