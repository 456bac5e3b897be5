//! Factions and their sections

use serde::{Deserialize, Serialize};

use crate::core::types::{FactionId, PersonId, SectionId};
use crate::world::index::Identified;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Faction {
    pub id: FactionId,
    pub name: String,
    pub leader: PersonId,
}

impl Identified for Faction {
    type Id = FactionId;
    fn id(&self) -> FactionId {
        self.id
    }
}

/// Administrative division of a faction; settlements and troops belong to one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: SectionId,
    pub name: String,
    pub faction: FactionId,
}

impl Identified for Section {
    type Id = SectionId;
    fn id(&self) -> SectionId {
        self.id
    }
}
