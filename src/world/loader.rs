//! Scenario persistence - flat rows in, world out
//!
//! A scenario is stored as one row table per entity kind, bundled in
//! `ScenarioRows`. Lists, points and orders use the compact string forms of
//! the save files (`"3 7 12"`, `"4,5"`, `("moveEnter", "2")`).
//!
//! Loading is two-phase: rows are first turned into domain objects, then
//! every cross-reference is checked against the complete row set. Nothing is
//! inserted into a `World` until both phases pass.

use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::battle::orders::Order;
use crate::battle::troop::Troop;
use crate::city::settlement::{DevelopmentStats, Settlement, SettlementKind};
use crate::core::calendar::{Calendar, GameDate};
use crate::core::config::SimulationConfig;
use crate::core::error::{DataIntegrityError, Result};
use crate::core::types::{
    MilitaryId, MilitaryKindId, PersonId, Point, SectionId, SettlementId, SettlementKindId,
    TerrainId, TroopId,
};
use crate::entity::faction::{Faction, Section};
use crate::entity::military::{Military, MilitaryKind, MilitaryLocation};
use crate::entity::person::{Abilities, Person, PersonLocation, PersonState, Work};
use crate::world::index::{ids_from_list, to_id_list};
use crate::world::map::{GameMap, Terrain, TerrainEffect};
use crate::world::scenario::World;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarRow {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    #[serde(default)]
    pub days_passed: u32,
}

impl Default for CalendarRow {
    fn default() -> Self {
        let start = GameDate::default();
        Self {
            year: start.year,
            month: start.month,
            day: start.day,
            days_passed: 0,
        }
    }
}

/// Terrain ids in row-major order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapRow {
    pub width: u32,
    pub height: u32,
    pub cells: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MilitaryTerrainRow {
    pub military_kind: u32,
    pub terrain: u32,
    /// None means impassable
    #[serde(default)]
    pub movement_cost: Option<f32>,
    #[serde(default = "default_multiple")]
    pub multiple: f32,
}

fn default_multiple() -> f32 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonRow {
    pub id: u32,
    pub name: String,
    #[serde(flatten)]
    pub abilities: Abilities,
    #[serde(default)]
    pub state: PersonState,
    #[serde(default)]
    pub settlement: Option<u32>,
    #[serde(default)]
    pub military: Option<u32>,
    #[serde(default)]
    pub work: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementRow {
    pub id: u32,
    pub name: String,
    pub kind: u32,
    pub cells: String,
    #[serde(default)]
    pub section: Option<u32>,
    #[serde(default)]
    pub population: i32,
    #[serde(default)]
    pub fund: i32,
    #[serde(default)]
    pub food: i32,
    #[serde(flatten)]
    pub stats: DevelopmentStats,
    #[serde(default)]
    pub creatable_military_kinds: String,
}

/// A roster is either garrisoned (`settlement`) or deployed (`troop`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MilitaryRow {
    pub id: u32,
    pub name: String,
    pub kind: u32,
    pub persons: String,
    pub quantity: u32,
    pub morale: i32,
    pub combativity: i32,
    #[serde(default)]
    pub settlement: Option<u32>,
    #[serde(default)]
    pub troop: Option<u32>,
}

/// The troop's roster is the military row whose `troop` is this row's id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TroopRow {
    pub id: u32,
    pub position: String,
    #[serde(default)]
    pub section: Option<u32>,
    #[serde(default)]
    pub start_settlement: Option<u32>,
    #[serde(default = "default_order_kind")]
    pub order_kind: String,
    #[serde(default)]
    pub order_target: String,
    #[serde(default)]
    pub ai_tags: String,
}

fn default_order_kind() -> String {
    "idle".to_string()
}

/// A whole scenario as flat rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioRows {
    #[serde(default)]
    pub calendar: CalendarRow,
    pub map: MapRow,
    #[serde(default)]
    pub ship_kind: Option<u32>,
    #[serde(default)]
    pub terrains: Vec<Terrain>,
    #[serde(default)]
    pub military_terrain: Vec<MilitaryTerrainRow>,
    #[serde(default)]
    pub settlement_kinds: Vec<SettlementKind>,
    #[serde(default)]
    pub military_kinds: Vec<MilitaryKind>,
    #[serde(default)]
    pub factions: Vec<Faction>,
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default)]
    pub persons: Vec<PersonRow>,
    #[serde(default)]
    pub settlements: Vec<SettlementRow>,
    #[serde(default)]
    pub militaries: Vec<MilitaryRow>,
    #[serde(default)]
    pub troops: Vec<TroopRow>,
}

fn malformed(
    table: &'static str,
    row: u32,
    field: &'static str,
    value: impl Into<String>,
) -> DataIntegrityError {
    DataIntegrityError::Malformed {
        table,
        row,
        field,
        value: value.into(),
    }
}

fn parse_id_list<I: From<u32>>(
    table: &'static str,
    row: u32,
    field: &'static str,
    value: &str,
) -> std::result::Result<Vec<I>, DataIntegrityError> {
    ids_from_list(value).map_err(|_| malformed(table, row, field, value))
}

impl PersonRow {
    fn parse(&self) -> std::result::Result<Person, DataIntegrityError> {
        let location = match (self.settlement, self.military) {
            (None, None) => PersonLocation::Nowhere,
            (Some(s), None) => PersonLocation::Settlement(SettlementId(s)),
            (None, Some(m)) => PersonLocation::Military(MilitaryId(m)),
            (Some(s), Some(m)) => {
                return Err(malformed(
                    "persons",
                    self.id,
                    "military",
                    format!("{} while in settlement {}", m, s),
                ))
            }
        };
        let work = Work::parse(&self.work)
            .ok_or_else(|| malformed("persons", self.id, "work", self.work.as_str()))?;
        Ok(Person {
            id: PersonId(self.id),
            name: self.name.clone(),
            abilities: self.abilities,
            state: self.state,
            location,
            work,
        })
    }

    fn from_person(person: &Person) -> Self {
        let (settlement, military) = match person.location {
            PersonLocation::Nowhere => (None, None),
            PersonLocation::Settlement(s) => (Some(s.0), None),
            PersonLocation::Military(m) => (None, Some(m.0)),
        };
        Self {
            id: person.id.0,
            name: person.name.clone(),
            abilities: person.abilities,
            state: person.state,
            settlement,
            military,
            work: person.work.as_str().to_string(),
        }
    }
}

impl SettlementRow {
    fn parse(&self) -> std::result::Result<Settlement, DataIntegrityError> {
        let cells = Point::parse_list(&self.cells)
            .map_err(|_| malformed("settlements", self.id, "cells", self.cells.as_str()))?;
        if cells.is_empty() {
            return Err(malformed("settlements", self.id, "cells", ""));
        }
        Ok(Settlement {
            id: SettlementId(self.id),
            name: self.name.clone(),
            kind: SettlementKindId(self.kind),
            cells,
            section: self.section.map(SectionId),
            population: self.population,
            fund: self.fund,
            food: self.food,
            stats: self.stats,
            creatable_military_kinds: parse_id_list(
                "settlements",
                self.id,
                "creatable_military_kinds",
                &self.creatable_military_kinds,
            )?,
        })
    }

    fn from_settlement(settlement: &Settlement) -> Self {
        Self {
            id: settlement.id.0,
            name: settlement.name.clone(),
            kind: settlement.kind.0,
            cells: Point::list_to_string(&settlement.cells),
            section: settlement.section.map(|s| s.0),
            population: settlement.population,
            fund: settlement.fund,
            food: settlement.food,
            stats: settlement.stats,
            creatable_military_kinds: to_id_list(&settlement.creatable_military_kinds),
        }
    }
}

impl MilitaryRow {
    fn parse(&self) -> std::result::Result<Military, DataIntegrityError> {
        let location = match (self.settlement, self.troop) {
            (Some(s), None) => MilitaryLocation::Settlement(SettlementId(s)),
            (None, Some(t)) => MilitaryLocation::Deployed(TroopId(t)),
            _ => {
                return Err(malformed(
                    "militaries",
                    self.id,
                    "location",
                    format!("settlement {:?}, troop {:?}", self.settlement, self.troop),
                ))
            }
        };
        Ok(Military {
            id: MilitaryId(self.id),
            name: self.name.clone(),
            kind: MilitaryKindId(self.kind),
            persons: parse_id_list("militaries", self.id, "persons", &self.persons)?,
            quantity: self.quantity,
            morale: self.morale,
            combativity: self.combativity,
            location,
        })
    }

    fn from_military(military: &Military) -> Self {
        let (settlement, troop) = match military.location {
            MilitaryLocation::Settlement(s) => (Some(s.0), None),
            MilitaryLocation::Deployed(t) => (None, Some(t.0)),
        };
        Self {
            id: military.id.0,
            name: military.name.clone(),
            kind: military.kind.0,
            persons: to_id_list(&military.persons),
            quantity: military.quantity,
            morale: military.morale,
            combativity: military.combativity,
            settlement,
            troop,
        }
    }
}

impl TroopRow {
    fn parse(
        &self,
        deployed: &AHashMap<u32, MilitaryId>,
    ) -> std::result::Result<Troop, DataIntegrityError> {
        let position = self
            .position
            .parse::<Point>()
            .map_err(|_| malformed("troops", self.id, "position", self.position.as_str()))?;
        let order = Order::from_row(&self.order_kind, &self.order_target).map_err(|e| {
            malformed("troops", self.id, "order", format!("{} {}", e.kind, e.target))
        })?;
        let military = deployed
            .get(&self.id)
            .copied()
            .ok_or(DataIntegrityError::UnmannedTroop(self.id))?;

        let mut troop = Troop::new(TroopId(self.id), military, position).with_order(order);
        troop.section = self.section.map(SectionId);
        troop.start_settlement = self.start_settlement.map(SettlementId);
        troop.ai_tags = self.ai_tags.clone();
        Ok(troop)
    }

    fn from_troop(troop: &Troop) -> Self {
        let (order_kind, order_target) = troop.order.to_row();
        Self {
            id: troop.id.0,
            position: troop.position.to_string(),
            section: troop.section.map(|s| s.0),
            start_settlement: troop.start_settlement.map(|s| s.0),
            order_kind,
            order_target,
            ai_tags: troop.ai_tags.clone(),
        }
    }
}

/// Ids present in each table
struct IdSets {
    terrains: AHashSet<u32>,
    settlement_kinds: AHashSet<u32>,
    military_kinds: AHashSet<u32>,
    factions: AHashSet<u32>,
    sections: AHashSet<u32>,
    persons: AHashSet<u32>,
    settlements: AHashSet<u32>,
    militaries: AHashSet<u32>,
    troops: AHashSet<u32>,
}

fn unique_ids(
    table: &'static str,
    ids: impl IntoIterator<Item = u32>,
) -> std::result::Result<AHashSet<u32>, DataIntegrityError> {
    let mut set = AHashSet::new();
    for id in ids {
        if !set.insert(id) {
            return Err(DataIntegrityError::DuplicateId { table, id });
        }
    }
    Ok(set)
}

fn require(
    set: &AHashSet<u32>,
    table: &'static str,
    row: u32,
    field: &'static str,
    target: u32,
) -> std::result::Result<(), DataIntegrityError> {
    if set.contains(&target) {
        Ok(())
    } else {
        Err(DataIntegrityError::MissingReference {
            table,
            row,
            field,
            target,
        })
    }
}

/// Rows after the first phase
struct Parsed {
    calendar: Calendar,
    map: GameMap,
    persons: Vec<Person>,
    settlements: Vec<Settlement>,
    militaries: Vec<Military>,
    troops: Vec<Troop>,
}

impl ScenarioRows {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Validate every row and build a world from them
    ///
    /// Mayors are refreshed after loading so every settlement satisfies the
    /// one-mayor rule from the first day.
    pub fn into_world(self, config: SimulationConfig) -> Result<World> {
        let ids = self.unique_ids()?;
        let parsed = self.parse()?;
        self.check_references(&ids, &parsed)?;
        self.assemble(parsed, config)
    }

    fn unique_ids(&self) -> std::result::Result<IdSets, DataIntegrityError> {
        Ok(IdSets {
            terrains: unique_ids("terrains", self.terrains.iter().map(|t| t.id.0))?,
            settlement_kinds: unique_ids(
                "settlement_kinds",
                self.settlement_kinds.iter().map(|k| k.id.0),
            )?,
            military_kinds: unique_ids(
                "military_kinds",
                self.military_kinds.iter().map(|k| k.id.0),
            )?,
            factions: unique_ids("factions", self.factions.iter().map(|f| f.id.0))?,
            sections: unique_ids("sections", self.sections.iter().map(|s| s.id.0))?,
            persons: unique_ids("persons", self.persons.iter().map(|p| p.id))?,
            settlements: unique_ids("settlements", self.settlements.iter().map(|s| s.id))?,
            militaries: unique_ids("militaries", self.militaries.iter().map(|m| m.id))?,
            troops: unique_ids("troops", self.troops.iter().map(|t| t.id))?,
        })
    }

    fn parse(&self) -> std::result::Result<Parsed, DataIntegrityError> {
        let c = &self.calendar;
        let start = GameDate::new(c.year, c.month, c.day).ok_or_else(|| {
            malformed("calendar", 0, "date", format!("{}-{}-{}", c.year, c.month, c.day))
        })?;

        let expected = self.map.width as usize * self.map.height as usize;
        let cells = self.map.cells.iter().map(|&t| TerrainId(t)).collect();
        let map = GameMap::from_cells(self.map.width, self.map.height, cells).ok_or(
            DataIntegrityError::MapSize {
                expected,
                actual: self.map.cells.len(),
            },
        )?;

        let persons = self
            .persons
            .iter()
            .map(PersonRow::parse)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let settlements = self
            .settlements
            .iter()
            .map(SettlementRow::parse)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let militaries = self
            .militaries
            .iter()
            .map(MilitaryRow::parse)
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let deployed: AHashMap<u32, MilitaryId> = militaries
            .iter()
            .filter_map(|m| match m.location {
                MilitaryLocation::Deployed(t) => Some((t.0, m.id)),
                MilitaryLocation::Settlement(_) => None,
            })
            .collect();
        let troops = self
            .troops
            .iter()
            .map(|row| row.parse(&deployed))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Parsed {
            calendar: Calendar::new(start, c.days_passed),
            map,
            persons,
            settlements,
            militaries,
            troops,
        })
    }

    fn check_references(
        &self,
        ids: &IdSets,
        parsed: &Parsed,
    ) -> std::result::Result<(), DataIntegrityError> {
        for (i, &terrain) in self.map.cells.iter().enumerate() {
            require(&ids.terrains, "map", i as u32, "cells", terrain)?;
        }
        if let Some(kind) = self.ship_kind {
            require(&ids.military_kinds, "scenario", 0, "ship_kind", kind)?;
        }
        for (i, row) in self.military_terrain.iter().enumerate() {
            let i = i as u32;
            require(&ids.military_kinds, "military_terrain", i, "military_kind", row.military_kind)?;
            require(&ids.terrains, "military_terrain", i, "terrain", row.terrain)?;
            if let Some(cost) = row.movement_cost {
                if cost.is_nan() || cost < 0.0 {
                    return Err(malformed("military_terrain", i, "movement_cost", cost.to_string()));
                }
            }
        }
        for faction in &self.factions {
            require(&ids.persons, "factions", faction.id.0, "leader", faction.leader.0)?;
        }
        for section in &self.sections {
            require(&ids.factions, "sections", section.id.0, "faction", section.faction.0)?;
        }

        for person in &parsed.persons {
            match person.location {
                PersonLocation::Nowhere => {}
                PersonLocation::Settlement(s) => {
                    require(&ids.settlements, "persons", person.id.0, "settlement", s.0)?
                }
                PersonLocation::Military(m) => {
                    require(&ids.militaries, "persons", person.id.0, "military", m.0)?
                }
            }
        }

        for settlement in &parsed.settlements {
            let row = settlement.id.0;
            require(&ids.settlement_kinds, "settlements", row, "kind", settlement.kind.0)?;
            if let Some(section) = settlement.section {
                require(&ids.sections, "settlements", row, "section", section.0)?;
            }
            for kind in &settlement.creatable_military_kinds {
                require(
                    &ids.military_kinds,
                    "settlements",
                    row,
                    "creatable_military_kinds",
                    kind.0,
                )?;
            }
        }

        for military in &parsed.militaries {
            let row = military.id.0;
            require(&ids.military_kinds, "militaries", row, "kind", military.kind.0)?;
            for person in &military.persons {
                require(&ids.persons, "militaries", row, "persons", person.0)?;
            }
            match military.location {
                MilitaryLocation::Settlement(s) => {
                    require(&ids.settlements, "militaries", row, "settlement", s.0)?
                }
                MilitaryLocation::Deployed(t) => {
                    require(&ids.troops, "militaries", row, "troop", t.0)?
                }
            }
        }

        for troop in &parsed.troops {
            let row = troop.id.0;
            if let Some(section) = troop.section {
                require(&ids.sections, "troops", row, "section", section.0)?;
            }
            if let Some(start) = troop.start_settlement {
                require(&ids.settlements, "troops", row, "start_settlement", start.0)?;
            }
            match troop.order {
                Order::MoveEnter(s) | Order::AttackSettlement(s) => {
                    require(&ids.settlements, "troops", row, "order_target", s.0)?
                }
                Order::AttackTroop(t) => require(&ids.troops, "troops", row, "order_target", t.0)?,
                Order::Idle | Order::MoveTo(_) | Order::AttackLocation(_) => {}
            }
        }
        Ok(())
    }

    fn assemble(self, parsed: Parsed, config: SimulationConfig) -> Result<World> {
        let mut world = World::new(config, parsed.map);
        world.calendar = parsed.calendar;
        world.ship_kind = self.ship_kind.map(MilitaryKindId);
        for row in &self.military_terrain {
            world.military_terrain.set(
                MilitaryKindId(row.military_kind),
                TerrainId(row.terrain),
                TerrainEffect {
                    movement_cost: row.movement_cost.unwrap_or(f32::INFINITY),
                    multiple: row.multiple,
                },
            );
        }

        for terrain in self.terrains {
            world.terrains.insert(terrain)?;
        }
        for kind in self.settlement_kinds {
            world.settlement_kinds.insert(kind)?;
        }
        for kind in self.military_kinds {
            world.military_kinds.insert(kind)?;
        }
        for faction in self.factions {
            world.factions.insert(faction)?;
        }
        for section in self.sections {
            world.sections.insert(section)?;
        }
        for person in parsed.persons {
            world.persons.insert(person)?;
        }
        for settlement in parsed.settlements {
            world.settlements.insert(settlement)?;
        }
        for military in parsed.militaries {
            world.militaries.insert(military)?;
        }
        for troop in parsed.troops {
            world.troops.insert(troop)?;
        }

        for id in world.settlements.ids() {
            world.refresh_mayor(id);
        }

        tracing::info!(
            "Loaded scenario: {} settlements, {} persons, {} troops",
            world.settlements.len(),
            world.persons.len(),
            world.troops.len()
        );
        Ok(world)
    }
}

impl World {
    pub fn from_rows(rows: ScenarioRows, config: SimulationConfig) -> Result<Self> {
        rows.into_world(config)
    }

    /// Serialize the world back to rows
    ///
    /// Day state (planned paths, movement points, attack flags) is rebuilt at
    /// the start of every day and is not stored.
    pub fn to_rows(&self) -> ScenarioRows {
        let start = self.calendar.start_date();
        ScenarioRows {
            calendar: CalendarRow {
                year: start.year,
                month: start.month,
                day: start.day,
                days_passed: self.calendar.days_passed(),
            },
            map: MapRow {
                width: self.map.width(),
                height: self.map.height(),
                cells: self.map.cells().iter().map(|t| t.0).collect(),
            },
            ship_kind: self.ship_kind.map(|k| k.0),
            terrains: self.terrains.iter().cloned().collect(),
            military_terrain: self
                .military_terrain
                .entries()
                .into_iter()
                .map(|(kind, terrain, effect)| MilitaryTerrainRow {
                    military_kind: kind.0,
                    terrain: terrain.0,
                    movement_cost: effect.is_passable().then_some(effect.movement_cost),
                    multiple: effect.multiple,
                })
                .collect(),
            settlement_kinds: self.settlement_kinds.iter().cloned().collect(),
            military_kinds: self.military_kinds.iter().cloned().collect(),
            factions: self.factions.iter().cloned().collect(),
            sections: self.sections.iter().cloned().collect(),
            persons: self.persons.iter().map(PersonRow::from_person).collect(),
            settlements: self
                .settlements
                .iter()
                .map(SettlementRow::from_settlement)
                .collect(),
            militaries: self
                .militaries
                .iter()
                .map(MilitaryRow::from_military)
                .collect(),
            troops: self.troops.iter().map(TroopRow::from_troop).collect(),
        }
    }
}
