//! Small hand-built worlds for unit tests

use crate::battle::troop::Troop;
use crate::city::settlement::{DevelopmentStats, Settlement, SettlementKind};
use crate::core::config::SimulationConfig;
use crate::core::types::*;
use crate::entity::faction::{Faction, Section};
use crate::entity::military::{Military, MilitaryKind, MilitaryLocation};
use crate::entity::person::{Abilities, Person, PersonLocation, Work};
use crate::world::map::{GameMap, Terrain, TerrainEffect};
use crate::world::scenario::World;

pub const TEST_MAX_FUND: i32 = 1000;
pub const TEST_MAX_FOOD: i32 = 1000;

pub const PLAIN: TerrainId = TerrainId(1);
pub const WATER: TerrainId = TerrainId(2);
pub const MOUNTAIN: TerrainId = TerrainId(3);

pub const INFANTRY: MilitaryKindId = MilitaryKindId(1);
pub const ARCHER: MilitaryKindId = MilitaryKindId(2);
pub const SHIP: MilitaryKindId = MilitaryKindId(3);

/// Leaders of factions 1 and 2; not placed anywhere unless a test does so
pub const LEADER_1: PersonId = PersonId(900);
pub const LEADER_2: PersonId = PersonId(901);

fn military_kind(id: MilitaryKindId, name: &str, range: (u32, u32)) -> MilitaryKind {
    MilitaryKind {
        id,
        name: name.into(),
        offense: 100.0,
        offense_per_unit: 0.0,
        defense: 100.0,
        defense_per_unit: 0.0,
        architecture_offense: 1.0,
        movability: 10.0,
        range_lo: range.0,
        range_hi: range.1,
        unit_quantity: 100,
        cost: 50,
        max_quantity: 10000,
    }
}

/// 12x12 plain map; two factions with one section each
pub fn test_world() -> World {
    let mut world = World::new(SimulationConfig::default(), GameMap::new(12, 12, PLAIN));

    for (id, name, water) in [(PLAIN, "Plain", false), (WATER, "River", true), (MOUNTAIN, "Peak", false)] {
        world
            .terrains
            .insert(Terrain { id, name: name.into(), water })
            .unwrap();
    }
    for kind in [INFANTRY, ARCHER] {
        world.military_terrain.set(
            kind,
            MOUNTAIN,
            TerrainEffect { movement_cost: f32::INFINITY, multiple: 1.0 },
        );
        world.military_terrain.set(
            kind,
            WATER,
            TerrainEffect { movement_cost: f32::INFINITY, multiple: 1.0 },
        );
    }

    world
        .settlement_kinds
        .insert(SettlementKind {
            id: SettlementKindId(1),
            name: "City".into(),
            agriculture: 200.0,
            commerce: 200.0,
            technology: 200.0,
            endurance: 200.0,
            morale: 200.0,
            max_fund: TEST_MAX_FUND,
            max_food: TEST_MAX_FOOD,
            defense: 100.0,
        })
        .unwrap();
    world.military_kinds.insert(military_kind(INFANTRY, "Infantry", (1, 1))).unwrap();
    world.military_kinds.insert(military_kind(ARCHER, "Archer", (2, 3))).unwrap();
    world.military_kinds.insert(military_kind(SHIP, "Ship", (1, 1))).unwrap();

    for (faction, leader) in [(1, LEADER_1), (2, LEADER_2)] {
        world
            .factions
            .insert(Faction { id: FactionId(faction), name: format!("Faction {}", faction), leader })
            .unwrap();
        world
            .sections
            .insert(Section {
                id: SectionId(faction),
                name: format!("Section {}", faction),
                faction: FactionId(faction),
            })
            .unwrap();
        world
            .persons
            .insert(Person::new(leader, "Leader", abilities(90)))
            .unwrap();
    }
    world
}

pub fn abilities(value: i32) -> Abilities {
    Abilities {
        command: value,
        strength: value,
        intelligence: value,
        politics: value,
        glamour: value,
    }
}

/// Settlement with endurance 50, no fund and no food
pub fn add_settlement(
    world: &mut World,
    id: u32,
    cells: &[(i32, i32)],
    section: Option<u32>,
) -> SettlementId {
    let id = SettlementId(id);
    world
        .settlements
        .insert(Settlement {
            id,
            name: format!("Town {}", id),
            kind: SettlementKindId(1),
            cells: cells.iter().map(|&(x, y)| Point::new(x, y)).collect(),
            section: section.map(SectionId),
            population: 0,
            fund: 0,
            food: 0,
            stats: DevelopmentStats {
                endurance: 50.0,
                ..Default::default()
            },
            creatable_military_kinds: vec![INFANTRY],
        })
        .unwrap();
    id
}

/// Person with all abilities at 50, serving in a settlement
pub fn add_person(world: &mut World, id: u32, settlement: SettlementId, work: Work) -> PersonId {
    let id = PersonId(id);
    world
        .persons
        .insert(
            Person::new(id, format!("Officer {}", id), abilities(50))
                .at(PersonLocation::Settlement(settlement))
                .with_work(work),
        )
        .unwrap();
    id
}

/// Deployed troop led by a person with 100 in every ability
///
/// The troop and its roster share the id; the leader is person 1000 + id.
pub fn add_troop(
    world: &mut World,
    id: u32,
    at: (i32, i32),
    section: u32,
    kind: MilitaryKindId,
    quantity: u32,
) -> TroopId {
    let troop = TroopId(id);
    let military = MilitaryId(id);
    let leader = PersonId(1000 + id);
    world
        .persons
        .insert(
            Person::new(leader, format!("General {}", id), abilities(100))
                .at(PersonLocation::Military(military)),
        )
        .unwrap();
    world
        .militaries
        .insert(Military {
            id: military,
            name: format!("Army {}", id),
            kind,
            persons: vec![leader],
            quantity,
            morale: 100,
            combativity: 100,
            location: MilitaryLocation::Deployed(troop),
        })
        .unwrap();
    world
        .troops
        .insert(Troop::new(troop, military, Point::new(at.0, at.1)).with_section(SectionId(section)))
        .unwrap();
    troop
}
