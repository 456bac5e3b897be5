//! Shared scenario fixture for integration tests
//!
//! A 16x10 plain map with a river column at x = 14. Faction 1 holds Ayton
//! (west), faction 2 holds Brill (east). Each faction has one infantry troop
//! in the field, four cells apart.

#![allow(dead_code)]

use realm_sim::core::config::SimulationConfig;
use realm_sim::world::{ScenarioRows, World};
use serde_json::{json, Value};

pub const AYTON: u32 = 1;
pub const BRILL: u32 = 2;
pub const WEST_TROOP: u32 = 1;
pub const EAST_TROOP: u32 = 2;

fn person(id: u32, name: &str, ability: i32, settlement: Option<u32>, military: Option<u32>, work: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "command": ability,
        "strength": ability,
        "intelligence": ability,
        "politics": ability,
        "glamour": ability,
        "settlement": settlement,
        "military": military,
        "work": work,
    })
}

fn military_kind(id: u32, name: &str, range: (u32, u32)) -> Value {
    json!({
        "id": id,
        "name": name,
        "offense": 100.0,
        "offense_per_unit": 0.0,
        "defense": 100.0,
        "defense_per_unit": 0.0,
        "architecture_offense": 1.0,
        "movability": 10.0,
        "range_lo": range.0,
        "range_hi": range.1,
        "unit_quantity": 100,
        "cost": 50,
        "max_quantity": 10000,
    })
}

pub fn scenario() -> Value {
    let mut cells = Vec::new();
    for _y in 0..10 {
        for x in 0..16 {
            cells.push(if x == 14 { 2 } else { 1 });
        }
    }

    json!({
        "calendar": { "year": 190, "month": 1, "day": 1 },
        "map": { "width": 16, "height": 10, "cells": cells },
        "ship_kind": 3,
        "terrains": [
            { "id": 1, "name": "Plain", "water": false },
            { "id": 2, "name": "River", "water": true },
        ],
        "military_terrain": [
            { "military_kind": 1, "terrain": 2, "movement_cost": null },
            { "military_kind": 2, "terrain": 2, "movement_cost": null },
        ],
        "settlement_kinds": [{
            "id": 1,
            "name": "City",
            "agriculture": 200.0,
            "commerce": 200.0,
            "technology": 200.0,
            "endurance": 200.0,
            "morale": 200.0,
            "max_fund": 1000,
            "max_food": 1000,
            "defense": 100.0,
        }],
        "military_kinds": [
            military_kind(1, "Infantry", (1, 1)),
            military_kind(2, "Archer", (2, 3)),
            military_kind(3, "Ship", (1, 1)),
        ],
        "factions": [
            { "id": 1, "name": "West", "leader": 100 },
            { "id": 2, "name": "East", "leader": 200 },
        ],
        "sections": [
            { "id": 1, "name": "West March", "faction": 1 },
            { "id": 2, "name": "East March", "faction": 2 },
        ],
        "persons": [
            person(100, "Aldric", 90, None, None, "none"),
            person(200, "Berengar", 90, None, None, "none"),
            person(1, "Cedric", 60, Some(AYTON), None, "mayor"),
            person(2, "Dunstan", 50, Some(AYTON), None, "commerce"),
            person(3, "Edwin", 50, Some(AYTON), None, "commerce"),
            person(4, "Godric", 60, Some(BRILL), None, "mayor"),
            person(11, "Harold", 80, None, Some(1), "none"),
            person(12, "Ivo", 80, None, Some(2), "none"),
        ],
        "settlements": [
            {
                "id": AYTON,
                "name": "Ayton",
                "kind": 1,
                "cells": "2,2 3,2",
                "section": 1,
                "population": 10000,
                "fund": 9,
                "food": 0,
                "agriculture": 50.0,
                "commerce": 50.0,
                "technology": 50.0,
                "endurance": 50.0,
                "morale": 50.0,
                "creatable_military_kinds": "1 2",
            },
            {
                "id": BRILL,
                "name": "Brill",
                "kind": 1,
                "cells": "12,2",
                "section": 2,
                "population": 10000,
                "fund": 0,
                "food": 0,
                "agriculture": 50.0,
                "commerce": 100.0,
                "technology": 50.0,
                "endurance": 50.0,
                "morale": 50.0,
                "creatable_military_kinds": "1",
            },
        ],
        "militaries": [
            {
                "id": 1, "name": "West Guard", "kind": 1, "persons": "11",
                "quantity": 1000, "morale": 100, "combativity": 100, "troop": WEST_TROOP,
            },
            {
                "id": 2, "name": "East Guard", "kind": 1, "persons": "12",
                "quantity": 1000, "morale": 100, "combativity": 100, "troop": EAST_TROOP,
            },
        ],
        "troops": [
            { "id": WEST_TROOP, "position": "5,5", "section": 1, "start_settlement": AYTON },
            { "id": EAST_TROOP, "position": "9,5", "section": 2, "start_settlement": BRILL },
        ],
    })
}

pub fn rows(value: Value) -> ScenarioRows {
    serde_json::from_value(value).expect("scenario rows")
}

pub fn load(value: Value) -> World {
    rows(value)
        .into_world(SimulationConfig::default())
        .expect("scenario loads")
}

pub fn world() -> World {
    load(scenario())
}
