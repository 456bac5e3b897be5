//! Built-in commands and queries
//!
//! Commands return the id of anything they create, otherwise null. Queries
//! about a missing troop or settlement return null.

use serde_json::{json, Value};

use crate::command::registry::{Args, CommandError, CommandRegistry};
use crate::core::types::{SettlementId, TroopId};
use crate::world::scenario::World;

pub(crate) fn register_all(registry: &mut CommandRegistry) {
    registry.register_command("give_move_order", give_move_order);
    registry.register_command("give_move_to_settlement_order", give_move_to_settlement_order);
    registry.register_command("give_move_enter_order", give_move_enter_order);
    registry.register_command("give_attack_location_order", give_attack_location_order);
    registry.register_command("give_attack_troop_order", give_attack_troop_order);
    registry.register_command("give_attack_settlement_order", give_attack_settlement_order);
    registry.register_command("change_mayor", change_mayor);
    registry.register_command("create_military", create_military);
    registry.register_command("create_unit", create_unit);
    registry.register_command("enter", enter);
    registry.register_command("occupy", occupy);
    registry.register_command("set_ai_tags", set_ai_tags);

    registry.register_query("unit_position", unit_position);
    registry.register_query("unit_order", unit_order);
    registry.register_query("unit_offense", unit_offense);
    registry.register_query("unit_defense", unit_defense);
    registry.register_query("unit_command", unit_command);
    registry.register_query("unit_strength", unit_strength);
    registry.register_query("unit_intelligence", unit_intelligence);
    registry.register_query("unit_quantity", unit_quantity);
    registry.register_query("settlement_stats", settlement_stats);
    registry.register_query("can_change_mayor", can_change_mayor);
    registry.register_query("friendly_units_in_view", friendly_units_in_view);
    registry.register_query("hostile_units_in_view", hostile_units_in_view);
    registry.register_query("is_settlement_in_view", is_settlement_in_view);
}

// Commands

fn give_move_order(world: &mut World, args: &[Value]) -> Result<Value, CommandError> {
    let args = Args::new("give_move_order", args, 2)?;
    world.give_move_order(args.id(0)?, args.point(1)?)?;
    Ok(Value::Null)
}

fn give_move_to_settlement_order(world: &mut World, args: &[Value]) -> Result<Value, CommandError> {
    let args = Args::new("give_move_to_settlement_order", args, 2)?;
    world.give_move_to_settlement_order(args.id(0)?, args.id(1)?)?;
    Ok(Value::Null)
}

fn give_move_enter_order(world: &mut World, args: &[Value]) -> Result<Value, CommandError> {
    let args = Args::new("give_move_enter_order", args, 2)?;
    world.give_move_enter_order(args.id(0)?, args.id(1)?)?;
    Ok(Value::Null)
}

fn give_attack_location_order(world: &mut World, args: &[Value]) -> Result<Value, CommandError> {
    let args = Args::new("give_attack_location_order", args, 2)?;
    world.give_attack_location_order(args.id(0)?, args.point(1)?)?;
    Ok(Value::Null)
}

fn give_attack_troop_order(world: &mut World, args: &[Value]) -> Result<Value, CommandError> {
    let args = Args::new("give_attack_troop_order", args, 2)?;
    world.give_attack_troop_order(args.id(0)?, args.id(1)?)?;
    Ok(Value::Null)
}

fn give_attack_settlement_order(world: &mut World, args: &[Value]) -> Result<Value, CommandError> {
    let args = Args::new("give_attack_settlement_order", args, 2)?;
    world.give_attack_settlement_order(args.id(0)?, args.id(1)?)?;
    Ok(Value::Null)
}

/// (settlement, person)
fn change_mayor(world: &mut World, args: &[Value]) -> Result<Value, CommandError> {
    let args = Args::new("change_mayor", args, 2)?;
    world.change_mayor(args.id(0)?, args.id(1)?)?;
    Ok(Value::Null)
}

/// (settlement, military kind) -> new military id
fn create_military(world: &mut World, args: &[Value]) -> Result<Value, CommandError> {
    let args = Args::new("create_military", args, 2)?;
    let id = world.create_military(args.id(0)?, args.id(1)?)?;
    Ok(json!(id))
}

/// (military, [persons], cell) -> new troop id; the first person leads
fn create_unit(world: &mut World, args: &[Value]) -> Result<Value, CommandError> {
    let args = Args::new("create_unit", args, 3)?;
    let persons = args.ids(1)?;
    let id = world.create_unit(args.id(0)?, &persons, args.point(2)?)?;
    Ok(json!(id))
}

fn enter(world: &mut World, args: &[Value]) -> Result<Value, CommandError> {
    let args = Args::new("enter", args, 1)?;
    let settlement = world.enter(args.id(0)?)?;
    Ok(json!(settlement))
}

fn occupy(world: &mut World, args: &[Value]) -> Result<Value, CommandError> {
    let args = Args::new("occupy", args, 1)?;
    let settlement = world.occupy(args.id(0)?)?;
    Ok(json!(settlement))
}

fn set_ai_tags(world: &mut World, args: &[Value]) -> Result<Value, CommandError> {
    let args = Args::new("set_ai_tags", args, 2)?;
    world.set_ai_tags(args.id(0)?, args.str(1)?)?;
    Ok(Value::Null)
}

// Queries

fn troop_arg(name: &'static str, args: &[Value]) -> Result<TroopId, CommandError> {
    Args::new(name, args, 1)?.id(0)
}

fn unit_position(world: &World, args: &[Value]) -> Result<Value, CommandError> {
    let id = troop_arg("unit_position", args)?;
    Ok(world
        .troops
        .get(id)
        .map_or(Value::Null, |t| json!([t.position.x, t.position.y])))
}

fn unit_order(world: &World, args: &[Value]) -> Result<Value, CommandError> {
    let id = troop_arg("unit_order", args)?;
    Ok(world.troops.get(id).map_or(Value::Null, |t| {
        let (kind, target) = t.order.to_row();
        json!({
            "kind": kind,
            "target": target,
            "description": t.order.describe(world),
        })
    }))
}

fn unit_offense(world: &World, args: &[Value]) -> Result<Value, CommandError> {
    Ok(json!(world.troop_offense(troop_arg("unit_offense", args)?)))
}

fn unit_defense(world: &World, args: &[Value]) -> Result<Value, CommandError> {
    Ok(json!(world.troop_defense(troop_arg("unit_defense", args)?)))
}

fn unit_command(world: &World, args: &[Value]) -> Result<Value, CommandError> {
    Ok(json!(world.troop_command(troop_arg("unit_command", args)?)))
}

fn unit_strength(world: &World, args: &[Value]) -> Result<Value, CommandError> {
    Ok(json!(world.troop_strength(troop_arg("unit_strength", args)?)))
}

fn unit_intelligence(world: &World, args: &[Value]) -> Result<Value, CommandError> {
    Ok(json!(world.troop_intelligence(troop_arg("unit_intelligence", args)?)))
}

fn unit_quantity(world: &World, args: &[Value]) -> Result<Value, CommandError> {
    Ok(json!(world.troop_quantity(troop_arg("unit_quantity", args)?)))
}

fn settlement_stats(world: &World, args: &[Value]) -> Result<Value, CommandError> {
    let id: SettlementId = Args::new("settlement_stats", args, 1)?.id(0)?;
    Ok(world.settlements.get(id).map_or(Value::Null, |s| {
        json!({
            "name": s.name,
            "fund": s.fund,
            "food": s.food,
            "population": s.population,
            "agriculture": s.stats.agriculture,
            "commerce": s.stats.commerce,
            "technology": s.stats.technology,
            "endurance": s.stats.endurance,
            "morale": s.stats.morale,
            "mayor": world.mayor_of(id),
        })
    }))
}

fn can_change_mayor(world: &World, args: &[Value]) -> Result<Value, CommandError> {
    let id: SettlementId = Args::new("can_change_mayor", args, 1)?.id(0)?;
    Ok(json!(world.can_change_mayor(id)))
}

fn friendly_units_in_view(world: &World, args: &[Value]) -> Result<Value, CommandError> {
    let id = troop_arg("friendly_units_in_view", args)?;
    Ok(json!(world.friendly_units_in_view(id)))
}

fn hostile_units_in_view(world: &World, args: &[Value]) -> Result<Value, CommandError> {
    let id = troop_arg("hostile_units_in_view", args)?;
    Ok(json!(world.hostile_units_in_view(id)))
}

/// (troop, settlement)
fn is_settlement_in_view(world: &World, args: &[Value]) -> Result<Value, CommandError> {
    let args = Args::new("is_settlement_in_view", args, 2)?;
    Ok(json!(world.is_settlement_in_view(args.id(0)?, args.id(1)?)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::orders::Order;
    use crate::core::error::ValidationError;
    use crate::core::types::{MilitaryId, Point};
    use crate::entity::person::Work;
    use crate::world::testing::*;

    #[test]
    fn test_every_name_registered() {
        let registry = CommandRegistry::with_defaults();
        assert_eq!(registry.command_names().len(), 12);
        assert_eq!(registry.query_names().len(), 13);
        assert!(registry.is_command("create_unit"));
        assert!(registry.is_query("unit_order"));
        assert!(!registry.is_query("create_unit"));
    }

    #[test]
    fn test_move_order_through_registry() {
        let registry = CommandRegistry::with_defaults();
        let mut world = test_world();
        let troop = add_troop(&mut world, 1, (1, 1), 1, INFANTRY, 500);

        let result = registry.execute("give_move_order", &mut world, &[json!(1), json!([5, 1])]);
        assert_eq!(result, Ok(Value::Null));
        assert_eq!(world.troops.get(troop).unwrap().order, Order::MoveTo(Point::new(5, 1)));

        let order = registry.query("unit_order", &world, &[json!(1)]).unwrap();
        assert_eq!(order["kind"], "move");
        assert_eq!(order["target"], "5,1");
        assert_eq!(order["description"], "Move to (5, 1)");
    }

    #[test]
    fn test_validation_error_passes_through() {
        let registry = CommandRegistry::with_defaults();
        let mut world = test_world();
        add_troop(&mut world, 1, (1, 1), 1, INFANTRY, 500);

        let result = registry.execute("give_attack_troop_order", &mut world, &[json!(1), json!(9)]);
        assert_eq!(
            result,
            Err(CommandError::Validation(ValidationError::TroopNotFound(TroopId(9))))
        );
    }

    #[test]
    fn test_bad_arguments_leave_world_unchanged() {
        let registry = CommandRegistry::with_defaults();
        let mut world = test_world();
        let troop = add_troop(&mut world, 1, (1, 1), 1, INFANTRY, 500);

        let result = registry.execute("give_move_order", &mut world, &[json!(1), json!("east")]);
        assert!(matches!(result, Err(CommandError::BadArguments { name: "give_move_order", .. })));
        assert_eq!(world.troops.get(troop).unwrap().order, Order::Idle);
    }

    #[test]
    fn test_create_military_and_unit() {
        let registry = CommandRegistry::with_defaults();
        let mut world = test_world();
        let town = add_settlement(&mut world, 1, &[(4, 4)], Some(1));
        world.settlements.get_mut(town).unwrap().fund = 500;
        add_person(&mut world, 1, town, Work::Mayor);
        add_person(&mut world, 2, town, Work::Idle);

        let military = registry
            .execute("create_military", &mut world, &[json!(1), json!(INFANTRY.0)])
            .unwrap();
        let military = MilitaryId(military.as_u64().unwrap() as u32);
        world.militaries.get_mut(military).unwrap().quantity = 300;

        let troop = registry
            .execute(
                "create_unit",
                &mut world,
                &[json!(military.0), json!([2]), json!([5, 4])],
            )
            .unwrap();
        let troop = TroopId(troop.as_u64().unwrap() as u32);

        assert_eq!(
            registry.query("unit_position", &world, &[json!(troop.0)]).unwrap(),
            json!([5, 4])
        );
        assert_eq!(
            registry.query("unit_quantity", &world, &[json!(troop.0)]).unwrap(),
            json!(300)
        );
    }

    #[test]
    fn test_queries_on_missing_troop_return_null() {
        let registry = CommandRegistry::with_defaults();
        let world = test_world();

        for name in ["unit_position", "unit_order", "unit_offense", "unit_quantity"] {
            assert_eq!(registry.query(name, &world, &[json!(77)]).unwrap(), Value::Null);
        }
    }

    #[test]
    fn test_settlement_stats_reports_mayor() {
        let registry = CommandRegistry::with_defaults();
        let mut world = test_world();
        let town = add_settlement(&mut world, 1, &[(4, 4)], Some(1));
        add_person(&mut world, 3, town, Work::Mayor);

        let stats = registry.query("settlement_stats", &world, &[json!(1)]).unwrap();
        assert_eq!(stats["mayor"], json!(3));
        assert_eq!(stats["endurance"], json!(50.0));
        assert_eq!(
            registry.query("can_change_mayor", &world, &[json!(1)]).unwrap(),
            json!(true)
        );
    }
}
