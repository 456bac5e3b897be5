//! Combat arithmetic
//!
//! Pure functions: offense and defense from roster stats, and the damage
//! exchanged between an attacker and a settlement or another unit. Applying
//! the damage and running destruction cascades is done by the caller.

use serde::{Deserialize, Serialize};

use crate::battle::orders::OrderTarget;
use crate::core::config::SimulationConfig;
use crate::core::types::Point;
use crate::entity::military::MilitaryKind;

/// What one side of an exchange suffered
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DamagePack {
    pub target: OrderTarget,
    pub location: Point,
    /// Quantity or endurance change (negative for damage)
    pub delta: i32,
    pub destroyed: bool,
}

impl DamagePack {
    pub fn new(target: OrderTarget, location: Point, damage: u32, destroyed: bool) -> Self {
        Self {
            target,
            location,
            delta: -(damage.min(i32::MAX as u32) as i32),
            destroyed,
        }
    }
}

/// Inputs shared by the offense and defense formulas
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CombatStats {
    pub command: i32,
    pub strength: i32,
    pub morale: i32,
    /// Terrain multiplier for (kind, terrain under the unit)
    pub multiple: f32,
    pub unit_count: f32,
}

/// Damage computed for one exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exchange {
    /// Damage to the defender
    pub forward: u32,
    /// Counter damage to the attacker, if the defender could strike back
    pub react: Option<u32>,
}

/// Leader's ability plus a share of the best member's excess over it
pub fn effective_ability(leader: i32, best: i32, factor: f32) -> i32 {
    let excess = (best - leader).max(0);
    (leader as f32 + excess as f32 * factor) as i32
}

pub fn offense(stats: &CombatStats, kind: &MilitaryKind) -> f32 {
    let ability = (stats.command as f32 * 0.7 + stats.strength as f32 * 0.3) / 100.0;
    ability
        * (stats.morale as f32 / 100.0)
        * stats.multiple
        * (kind.offense + kind.offense_per_unit * stats.unit_count)
}

pub fn defense(stats: &CombatStats, kind: &MilitaryKind) -> f32 {
    (stats.command as f32 / 100.0)
        * (stats.morale as f32 / 100.0)
        * stats.multiple
        * (kind.defense + kind.defense_per_unit * stats.unit_count)
}

/// Offense over defense; a defenseless side gives the largest finite ratio
fn ratio(offense: f32, defense: f32) -> f32 {
    if defense > 0.0 {
        offense / defense
    } else {
        f32::MAX
    }
}

fn inverse(ratio: f32) -> f32 {
    if ratio > 0.0 {
        1.0 / ratio
    } else {
        f32::MAX
    }
}

/// Round half away from zero; negative and NaN amounts become 0
pub fn to_damage(amount: f32) -> u32 {
    amount.round().max(0.0) as u32
}

/// Unit against settlement: the settlement always strikes back
pub fn against_settlement(
    offense: f32,
    defense: f32,
    architecture_offense: f32,
    config: &SimulationConfig,
) -> Exchange {
    let ratio = ratio(offense, defense);
    Exchange {
        forward: to_damage(config.base_architecture_damage * ratio * architecture_offense),
        react: Some(to_damage(
            config.base_damage * inverse(ratio) * config.react_damage_factor,
        )),
    }
}

/// Unit against unit; the target counters only if the attacker is within its range
pub fn against_troop(
    offense: f32,
    defense: f32,
    target_reaches_attacker: bool,
    config: &SimulationConfig,
) -> Exchange {
    let ratio = ratio(offense, defense);
    Exchange {
        forward: to_damage(config.base_damage * ratio),
        react: target_reaches_attacker
            .then(|| to_damage(config.base_damage * inverse(ratio) * config.react_damage_factor)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{MilitaryKindId, SettlementId};

    fn kind() -> MilitaryKind {
        MilitaryKind {
            id: MilitaryKindId(1),
            name: "Infantry".into(),
            offense: 20.0,
            offense_per_unit: 4.0,
            defense: 10.0,
            defense_per_unit: 2.0,
            architecture_offense: 1.0,
            movability: 10.0,
            range_lo: 1,
            range_hi: 1,
            unit_quantity: 1000,
            cost: 100,
            max_quantity: 10000,
        }
    }

    #[test]
    fn test_effective_ability() {
        assert_eq!(effective_ability(60, 90, 0.3), 69);
        // Best member weaker than the leader adds nothing
        assert_eq!(effective_ability(80, 50, 0.3), 80);
        assert_eq!(effective_ability(50, 55, 0.5), 52);
    }

    #[test]
    fn test_offense_formula() {
        let stats = CombatStats {
            command: 100,
            strength: 100,
            morale: 100,
            multiple: 1.0,
            unit_count: 5.0,
        };
        // 1.0 * 1.0 * 1.0 * (20 + 4 * 5)
        assert_eq!(offense(&stats, &kind()), 40.0);

        let halved = CombatStats {
            morale: 50,
            ..stats
        };
        assert_eq!(offense(&halved, &kind()), 20.0);
    }

    #[test]
    fn test_defense_formula() {
        let stats = CombatStats {
            command: 50,
            strength: 0,
            morale: 100,
            multiple: 2.0,
            unit_count: 5.0,
        };
        // 0.5 * 1.0 * 2.0 * (10 + 2 * 5)
        assert_eq!(defense(&stats, &kind()), 20.0);
    }

    #[test]
    fn test_settlement_exchange_at_even_odds() {
        let config = SimulationConfig::default();
        let exchange = against_settlement(100.0, 100.0, 1.0, &config);

        assert_eq!(exchange.forward, 50);
        assert_eq!(
            exchange.react,
            Some(to_damage(config.base_damage * config.react_damage_factor))
        );
    }

    #[test]
    fn test_troop_exchange_respects_counter_range() {
        let config = SimulationConfig::default();

        let both = against_troop(200.0, 100.0, true, &config);
        assert_eq!(both.forward, 200);
        assert_eq!(both.react, Some(25));

        let one_sided = against_troop(200.0, 100.0, false, &config);
        assert_eq!(one_sided.forward, 200);
        assert_eq!(one_sided.react, None);
    }

    #[test]
    fn test_zero_defense_stays_finite() {
        let config = SimulationConfig::default();
        let exchange = against_troop(10.0, 0.0, true, &config);
        assert_eq!(exchange.forward, u32::MAX);
        assert_eq!(exchange.react, Some(0));

        let toothless = against_troop(0.0, 10.0, true, &config);
        assert_eq!(toothless.forward, 0);
        assert_eq!(toothless.react, Some(u32::MAX));
    }

    #[test]
    fn test_damage_rounding() {
        assert_eq!(to_damage(2.5), 3);
        assert_eq!(to_damage(2.49), 2);
        assert_eq!(to_damage(-4.0), 0);
        assert_eq!(to_damage(f32::NAN), 0);
    }

    #[test]
    fn test_damage_pack_delta_is_negative() {
        let pack = DamagePack::new(
            OrderTarget::Settlement(SettlementId(1)),
            Point::new(0, 0),
            50,
            true,
        );
        assert_eq!(pack.delta, -50);

        let huge = DamagePack::new(OrderTarget::Settlement(SettlementId(1)), Point::new(0, 0), u32::MAX, false);
        assert_eq!(huge.delta, -i32::MAX);
    }
}
