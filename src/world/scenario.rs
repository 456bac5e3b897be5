//! World - the scenario state container
//!
//! Every entity kind lives in its own `EntityIndex` and entities refer to
//! each other by id. The world owns the tunables and the seeded RNG, so a
//! scenario plus a seed fully determines every simulated day.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::battle::troop::Troop;
use crate::city::settlement::{Settlement, SettlementKind};
use crate::core::calendar::Calendar;
use crate::core::config::SimulationConfig;
use crate::core::types::{FactionId, MilitaryKindId, Point, SectionId, SettlementId, TroopId};
use crate::entity::faction::{Faction, Section};
use crate::entity::military::{Military, MilitaryKind};
use crate::entity::person::Person;
use crate::world::index::EntityIndex;
use crate::world::map::{GameMap, MilitaryTerrainTable, Terrain, TerrainEffect};

#[derive(Debug, Clone)]
pub struct World {
    pub config: SimulationConfig,
    pub calendar: Calendar,
    pub map: GameMap,
    pub terrains: EntityIndex<Terrain>,
    pub military_terrain: MilitaryTerrainTable,
    pub settlement_kinds: EntityIndex<SettlementKind>,
    pub military_kinds: EntityIndex<MilitaryKind>,
    /// Kind any unit uses while standing on water
    pub ship_kind: Option<MilitaryKindId>,
    pub factions: EntityIndex<Faction>,
    pub sections: EntityIndex<Section>,
    pub persons: EntityIndex<Person>,
    pub settlements: EntityIndex<Settlement>,
    pub militaries: EntityIndex<Military>,
    pub troops: EntityIndex<Troop>,
    /// Random number generator (deterministic)
    pub rng: ChaCha8Rng,
}

impl World {
    /// Empty world on the given map; the RNG is seeded from the config
    pub fn new(config: SimulationConfig, map: GameMap) -> Self {
        let threshold = config.parallel_threshold;
        let rng = ChaCha8Rng::seed_from_u64(config.rng_seed);
        Self {
            calendar: Calendar::default(),
            map,
            terrains: EntityIndex::new().with_parallel_threshold(threshold),
            military_terrain: MilitaryTerrainTable::new(),
            settlement_kinds: EntityIndex::new().with_parallel_threshold(threshold),
            military_kinds: EntityIndex::new().with_parallel_threshold(threshold),
            ship_kind: None,
            factions: EntityIndex::new().with_parallel_threshold(threshold),
            sections: EntityIndex::new().with_parallel_threshold(threshold),
            persons: EntityIndex::new().with_parallel_threshold(threshold),
            settlements: EntityIndex::new().with_parallel_threshold(threshold),
            militaries: EntityIndex::new().with_parallel_threshold(threshold),
            troops: EntityIndex::new().with_parallel_threshold(threshold),
            rng,
            config,
        }
    }

    /// Read-only copy for consumers outside the tick
    ///
    /// Entities are shared with the live world until the tick mutates them.
    pub fn snapshot(&self) -> Self {
        Self {
            config: self.config.clone(),
            calendar: self.calendar.clone(),
            map: self.map.clone(),
            terrains: self.terrains.snapshot(),
            military_terrain: self.military_terrain.clone(),
            settlement_kinds: self.settlement_kinds.snapshot(),
            military_kinds: self.military_kinds.snapshot(),
            ship_kind: self.ship_kind,
            factions: self.factions.snapshot(),
            sections: self.sections.snapshot(),
            persons: self.persons.snapshot(),
            settlements: self.settlements.snapshot(),
            militaries: self.militaries.snapshot(),
            troops: self.troops.snapshot(),
            rng: self.rng.clone(),
        }
    }

    pub fn faction_of_section(&self, section: Option<SectionId>) -> Option<FactionId> {
        section
            .and_then(|s| self.sections.get(s))
            .map(|s| s.faction)
    }

    pub fn settlement_faction(&self, id: SettlementId) -> Option<FactionId> {
        self.settlements
            .get(id)
            .and_then(|s| self.faction_of_section(s.section))
    }

    pub fn troop_faction(&self, id: TroopId) -> Option<FactionId> {
        self.troops
            .get(id)
            .and_then(|t| self.faction_of_section(t.section))
    }

    /// Settlement whose footprint covers the cell
    pub fn settlement_at(&self, p: Point) -> Option<&Settlement> {
        self.settlements.iter().find(|s| s.occupies(p))
    }

    pub fn troop_at(&self, p: Point) -> Option<&Troop> {
        self.troops.iter().find(|t| t.position == p)
    }

    /// Persons currently serving in a settlement, in id order
    pub fn persons_in_settlement(&self, id: SettlementId) -> Vec<&Person> {
        self.persons
            .iter()
            .filter(|p| p.is_in_settlement(id))
            .collect()
    }

    pub fn is_water(&self, p: Point) -> bool {
        self.map
            .terrain_at(p)
            .and_then(|t| self.terrains.get(t))
            .map_or(false, |t| t.water)
    }

    /// Terrain effect for a kind at a cell; off-map cells are impassable
    pub fn terrain_effect(&self, kind: MilitaryKindId, p: Point) -> TerrainEffect {
        match self.map.terrain_at(p) {
            Some(terrain) => self.military_terrain.get(kind, terrain),
            None => TerrainEffect {
                movement_cost: f32::INFINITY,
                multiple: 1.0,
            },
        }
    }
}
