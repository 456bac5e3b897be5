//! Scenario persistence: load, save and integrity checks

mod common;

use common::*;
use realm_sim::core::config::SimulationConfig;
use realm_sim::core::error::{DataIntegrityError, SimError};
use realm_sim::core::types::{MilitaryId, PersonId, SettlementId, TroopId};
use realm_sim::simulation::run_days;
use realm_sim::world::ScenarioRows;
use serde_json::json;

#[test]
fn test_loaded_world_matches_rows() {
    let world = world();

    assert_eq!(world.settlements.len(), 2);
    assert_eq!(world.troops.len(), 2);
    assert_eq!(world.troops.get(TroopId(WEST_TROOP)).unwrap().military, MilitaryId(1));
    assert_eq!(world.mayor_of(SettlementId(AYTON)), Some(PersonId(1)));
    assert_eq!(world.settlements.get(SettlementId(AYTON)).unwrap().cells.len(), 2);
    assert!(!world
        .military_terrain
        .get(realm_sim::core::types::MilitaryKindId(1), realm_sim::core::types::TerrainId(2))
        .is_passable());
}

#[test]
fn test_save_and_reload_mid_campaign() {
    let mut world = world();
    world
        .give_attack_troop_order(TroopId(WEST_TROOP), TroopId(EAST_TROOP))
        .unwrap();
    run_days(&mut world, 3);

    let path = std::env::temp_dir().join(format!("realm_sim_scenario_{}.json", std::process::id()));
    world.to_rows().save_to_file(&path).unwrap();
    let reloaded = ScenarioRows::load_from_file(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(reloaded, world.to_rows());
    assert_eq!(reloaded.calendar.days_passed, 3);

    let restored = reloaded.into_world(SimulationConfig::default()).unwrap();
    assert_eq!(restored.calendar.current_date(), world.calendar.current_date());
    assert_eq!(
        restored.troop_quantity(TroopId(EAST_TROOP)),
        world.troop_quantity(TroopId(EAST_TROOP))
    );
}

#[test]
fn test_missing_person_in_roster() {
    let mut value = scenario();
    value["militaries"][1]["persons"] = json!("12 99");

    let err = rows(value).into_world(SimulationConfig::default()).unwrap_err();
    match err {
        SimError::DataIntegrity(e) => assert_eq!(
            e,
            DataIntegrityError::MissingReference {
                table: "militaries",
                row: 2,
                field: "persons",
                target: 99,
            }
        ),
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_missing_section_faction() {
    let mut value = scenario();
    value["sections"][1]["faction"] = json!(5);

    let err = rows(value).into_world(SimulationConfig::default()).unwrap_err();
    assert!(matches!(
        err,
        SimError::DataIntegrity(DataIntegrityError::MissingReference {
            table: "sections",
            field: "faction",
            target: 5,
            ..
        })
    ));
}

#[test]
fn test_malformed_cells() {
    let mut value = scenario();
    value["settlements"][0]["cells"] = json!("2;2");

    let err = rows(value).into_world(SimulationConfig::default()).unwrap_err();
    assert!(matches!(
        err,
        SimError::DataIntegrity(DataIntegrityError::Malformed {
            table: "settlements",
            row: 1,
            field: "cells",
            ..
        })
    ));
}

#[test]
fn test_invalid_json_is_a_serde_error() {
    let err = ScenarioRows::from_json("{ \"map\": 3 }").unwrap_err();
    assert!(matches!(err, SimError::SerdeError(_)));
}
