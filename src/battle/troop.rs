//! Deployed units and their daily order protocol
//!
//! A troop carries one military roster onto the map. Each day it runs its
//! order in four steps, always in this sequence:
//! 1. Begin: resolve the target, plan a path, refill movement points
//! 2. Move: walk the path until blocked or out of movement points
//! 3. Enter: a MoveEnter order next to its settlement disbands into it
//! 4. Attack: at most once per day, if the target is within range
//!
//! A target that no longer exists makes the move and attack steps no-ops.

use serde::Serialize;
use std::collections::VecDeque;
use tracing::{debug, info, trace};

use crate::battle::combat::{self, CombatStats, DamagePack};
use crate::battle::orders::{Order, OrderTarget};
use crate::battle::pathfinding::find_path;
use crate::core::error::ValidationError;
use crate::core::types::{MilitaryId, MilitaryKindId, Point, SectionId, SettlementId, TroopId};
use crate::entity::military::MilitaryKind;
use crate::entity::person::{Abilities, PersonLocation};
use crate::world::index::Identified;
use crate::world::scenario::World;

#[derive(Debug, Clone, PartialEq)]
pub struct Troop {
    pub id: TroopId,
    pub position: Point,
    pub section: Option<SectionId>,
    pub military: MilitaryId,
    /// Where the roster's persons go if the troop is wiped out
    pub start_settlement: Option<SettlementId>,
    pub order: Order,
    /// Free-form tags for automated players
    pub ai_tags: String,

    // Day state, rebuilt by begin_order
    path: Option<VecDeque<Point>>,
    movability: f32,
    attacked: bool,
}

impl Troop {
    pub fn new(id: TroopId, military: MilitaryId, position: Point) -> Self {
        Self {
            id,
            position,
            section: None,
            military,
            start_settlement: None,
            order: Order::Idle,
            ai_tags: String::new(),
            path: None,
            movability: 0.0,
            attacked: false,
        }
    }

    pub fn with_section(mut self, section: SectionId) -> Self {
        self.section = Some(section);
        self
    }

    pub fn with_start_settlement(mut self, settlement: SettlementId) -> Self {
        self.start_settlement = Some(settlement);
        self
    }

    pub fn with_order(mut self, order: Order) -> Self {
        self.order = order;
        self
    }

    pub fn has_attacked(&self) -> bool {
        self.attacked
    }

    /// Movement points left today
    pub fn movability(&self) -> f32 {
        self.movability
    }

    /// Cells still to walk on the current plan
    pub fn planned_path(&self) -> Option<&VecDeque<Point>> {
        self.path.as_ref()
    }

    fn set_order(&mut self, order: Order) {
        self.order = order;
        self.path = None;
    }
}

impl Identified for Troop {
    type Id = TroopId;
    fn id(&self) -> TroopId {
        self.id
    }
}

/// Why a troop stopped moving
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MoveStop {
    /// No target, or no route to it
    NoPlan,
    Arrived,
    /// Next cell is occupied, hostile or impassable
    Blocked,
    /// Next cell costs more than the remaining movement points
    Exhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Moved,
    Stopped(MoveStop),
}

/// What one troop did in a day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TroopDay {
    pub troop: TroopId,
    pub steps: u32,
    pub stop: MoveStop,
    pub entered: Option<SettlementId>,
    pub damage: Vec<DamagePack>,
}

impl World {
    /// Kind a troop fights and moves as at a cell: the ship kind on water
    fn kind_at(&self, troop: &Troop, p: Point) -> Option<MilitaryKindId> {
        if self.is_water(p) {
            if let Some(ship) = self.ship_kind {
                return Some(ship);
            }
        }
        self.militaries.get(troop.military).map(|m| m.kind)
    }

    /// Current kind of a troop, taking the terrain under it into account
    pub fn troop_kind(&self, id: TroopId) -> Option<&MilitaryKind> {
        let troop = self.troops.get(id)?;
        let kind = self.kind_at(troop, troop.position)?;
        self.military_kinds.get(kind)
    }

    fn step_cost(&self, troop: &Troop, p: Point) -> f32 {
        match self.kind_at(troop, p) {
            Some(kind) => self.terrain_effect(kind, p).movement_cost,
            None => f32::INFINITY,
        }
    }

    fn roster_ability<F>(&self, id: TroopId, ability: F, factor: f32) -> Option<i32>
    where
        F: Fn(&Abilities) -> i32,
    {
        let troop = self.troops.get(id)?;
        let military = self.militaries.get(troop.military)?;
        let leader = self.persons.get(military.leader()?)?;
        let best = military
            .persons
            .iter()
            .filter_map(|&p| self.persons.get(p))
            .map(|p| ability(&p.abilities))
            .max()?;
        Some(combat::effective_ability(ability(&leader.abilities), best, factor))
    }

    pub fn troop_command(&self, id: TroopId) -> Option<i32> {
        self.roster_ability(id, |a| a.command, self.config.troop_command_person_factor)
    }

    pub fn troop_strength(&self, id: TroopId) -> Option<i32> {
        self.roster_ability(id, |a| a.strength, self.config.troop_strength_person_factor)
    }

    pub fn troop_intelligence(&self, id: TroopId) -> Option<i32> {
        self.roster_ability(
            id,
            |a| a.intelligence,
            self.config.troop_intelligence_person_factor,
        )
    }

    pub fn troop_quantity(&self, id: TroopId) -> Option<u32> {
        let troop = self.troops.get(id)?;
        self.militaries.get(troop.military).map(|m| m.quantity)
    }

    /// Display name: the roster's name
    pub fn troop_name(&self, id: TroopId) -> Option<&str> {
        let troop = self.troops.get(id)?;
        self.militaries.get(troop.military).map(|m| m.name.as_str())
    }

    fn combat_stats(&self, id: TroopId) -> Option<(CombatStats, &MilitaryKind)> {
        let troop = self.troops.get(id)?;
        let military = self.militaries.get(troop.military)?;
        let kind = self.troop_kind(id)?;
        let roster_kind = self.military_kinds.get(military.kind).unwrap_or(kind);
        let stats = CombatStats {
            command: self.troop_command(id).unwrap_or(0),
            strength: self.troop_strength(id).unwrap_or(0),
            morale: military.morale,
            multiple: self.terrain_effect(kind.id, troop.position).multiple,
            unit_count: military.unit_count(roster_kind),
        };
        Some((stats, kind))
    }

    pub fn troop_offense(&self, id: TroopId) -> Option<f32> {
        self.combat_stats(id)
            .map(|(stats, kind)| combat::offense(&stats, kind))
    }

    pub fn troop_defense(&self, id: TroopId) -> Option<f32> {
        self.combat_stats(id)
            .map(|(stats, kind)| combat::defense(&stats, kind))
    }

    pub fn settlement_defense(&self, id: SettlementId) -> Option<f32> {
        let settlement = self.settlements.get(id)?;
        self.settlement_kinds.get(settlement.kind).map(|k| k.defense)
    }

    fn troop_in_range(&self, id: TroopId, p: Point) -> bool {
        match (self.troops.get(id), self.troop_kind(id)) {
            (Some(troop), Some(kind)) => kind.in_range(troop.position.taxi_distance(&p)),
            _ => false,
        }
    }

    /// Whether a troop may step onto a cell right now
    pub fn can_move_into(&self, id: TroopId, p: Point) -> bool {
        self.troops
            .get(id)
            .map_or(false, |troop| self.can_troop_move_into(troop, p))
    }

    pub(crate) fn can_troop_move_into(&self, troop: &Troop, p: Point) -> bool {
        if let Some(settlement) = self.settlement_at(p) {
            let hostile =
                self.faction_of_section(settlement.section) != self.faction_of_section(troop.section);
            if hostile && !settlement.is_destroyed() {
                return false;
            }
        }
        if self.troop_at(p).map_or(false, |t| t.id != troop.id) {
            return false;
        }
        self.step_cost(troop, p).is_finite()
    }

    /// Point the order leads to, looked up live for entity targets
    fn order_destination(&self, order: &Order) -> Option<Point> {
        match *order {
            Order::Idle => None,
            Order::MoveTo(p) | Order::AttackLocation(p) => Some(p),
            Order::MoveEnter(s) | Order::AttackSettlement(s) => {
                self.settlements.get(s).and_then(|s| s.position())
            }
            Order::AttackTroop(t) => self.troops.get(t).map(|t| t.position),
        }
    }

    /// Live entity the order attacks, if any
    pub fn attack_target(&self, order: &Order) -> Option<OrderTarget> {
        match *order {
            Order::AttackSettlement(s) => self
                .settlements
                .get(s)
                .filter(|s| !s.is_destroyed())
                .map(|_| OrderTarget::Settlement(s)),
            Order::AttackTroop(t) => self.troops.contains(t).then_some(OrderTarget::Troop(t)),
            Order::AttackLocation(p) => self.troop_at(p).map(|t| OrderTarget::Troop(t.id)),
            Order::Idle | Order::MoveTo(_) | Order::MoveEnter(_) => None,
        }
    }

    fn order_targets(&self, order: &Order, target: OrderTarget) -> bool {
        match (*order, target) {
            (Order::AttackSettlement(s), OrderTarget::Settlement(t)) => s == t,
            (Order::AttackTroop(a), OrderTarget::Troop(b)) => a == b,
            (Order::AttackLocation(p), OrderTarget::Troop(b)) => {
                self.troop_at(p).map_or(false, |t| t.id == b)
            }
            _ => false,
        }
    }

    /// Every troop attacking `target` falls back to Idle
    pub fn reset_orders_targeting(&mut self, target: OrderTarget) {
        let attackers: Vec<TroopId> = self
            .troops
            .iter()
            .filter(|t| self.order_targets(&t.order, target))
            .map(|t| t.id)
            .collect();
        for id in attackers {
            if let Some(troop) = self.troops.get_mut(id) {
                trace!(troop = %id, ?target, "Target gone, order reset");
                troop.set_order(Order::Idle);
            }
        }
    }

    /// Step 1: resolve the target, plan a path and refill movement points
    pub fn begin_order(&mut self, id: TroopId) {
        let Some(troop) = self.troops.get(id) else {
            return;
        };
        let destination = self.order_destination(&troop.order);
        let min_step = self.military_terrain.min_movement_cost();
        let path = destination.and_then(|goal| {
            find_path(troop.position, goal, min_step, |p| self.step_cost(troop, p)).map(|cells| {
                let mut cells = VecDeque::from(cells);
                cells.pop_front();
                cells
            })
        });
        if destination.is_some() && path.is_none() {
            debug!(troop = %id, ?destination, "No route to destination");
        }
        let movability = self.troop_kind(id).map_or(0.0, |k| k.movability);

        if let Some(troop) = self.troops.get_mut(id) {
            troop.path = path;
            troop.movability = movability;
            troop.attacked = false;
        }
    }

    fn step_forward(&mut self, id: TroopId) -> Step {
        let Some(troop) = self.troops.get(id) else {
            return Step::Stopped(MoveStop::NoPlan);
        };
        let Some(path) = &troop.path else {
            return Step::Stopped(MoveStop::NoPlan);
        };
        let Some(&next) = path.front() else {
            return Step::Stopped(MoveStop::Arrived);
        };
        if !self.can_troop_move_into(troop, next) {
            return Step::Stopped(MoveStop::Blocked);
        }
        let cost = self.step_cost(troop, next);
        if cost > troop.movability {
            return Step::Stopped(MoveStop::Exhausted);
        }

        match self.troops.get_mut(id) {
            Some(troop) => {
                if let Some(path) = troop.path.as_mut() {
                    path.pop_front();
                }
                troop.movability -= cost;
                troop.position = next;
                Step::Moved
            }
            None => Step::Stopped(MoveStop::NoPlan),
        }
    }

    /// Step 2: walk the planned path as far as possible today
    pub fn advance_movement(&mut self, id: TroopId) -> (u32, MoveStop) {
        let mut steps = 0;
        loop {
            match self.step_forward(id) {
                Step::Moved => steps += 1,
                Step::Stopped(stop) => {
                    if stop == MoveStop::Blocked {
                        debug!(troop = %id, steps, "Movement blocked");
                    }
                    return (steps, stop);
                }
            }
        }
    }

    /// Step 3: a MoveEnter order within one ring of its settlement disbands into it
    pub fn try_enter(&mut self, id: TroopId) -> Option<SettlementId> {
        let troop = self.troops.get(id)?;
        let Order::MoveEnter(target) = troop.order else {
            return None;
        };
        let settlement = self.settlements.get(target)?;
        let reachable = troop
            .position
            .spiral_out(1)
            .into_iter()
            .any(|p| settlement.occupies(p));
        if !reachable {
            return None;
        }
        self.enter_settlement(id, target);
        Some(target)
    }

    /// The roster goes into the settlement's garrison and the troop leaves the map
    pub(crate) fn enter_settlement(&mut self, id: TroopId, settlement: SettlementId) {
        let Some(military) = self.troops.get(id).map(|t| t.military) else {
            return;
        };
        if let Some(m) = self.militaries.get_mut(military) {
            m.location = crate::entity::military::MilitaryLocation::Settlement(settlement);
        }
        self.reset_orders_targeting(OrderTarget::Troop(id));
        // Removal only fails on a read-only index, which the live world never is
        let _ = self.troops.remove(id);
        info!(troop = %id, settlement = %settlement, "Troop entered settlement");
    }

    /// Step 4: strike the order's target once, if it is within range
    ///
    /// Calling this again on the same day does nothing.
    pub fn attack(&mut self, id: TroopId) -> Vec<DamagePack> {
        let Some(troop) = self.troops.get(id) else {
            return Vec::new();
        };
        if troop.attacked {
            return Vec::new();
        }
        match self.attack_target(&troop.order) {
            Some(OrderTarget::Settlement(s)) => self.attack_settlement(id, s),
            Some(OrderTarget::Troop(t)) => self.attack_troop(id, t),
            None => Vec::new(),
        }
    }

    fn mark_attacked(&mut self, id: TroopId) {
        if let Some(troop) = self.troops.get_mut(id) {
            troop.attacked = true;
        }
    }

    fn attack_settlement(&mut self, id: TroopId, target: SettlementId) -> Vec<DamagePack> {
        let Some(point) = self.settlements.get(target).and_then(|s| {
            s.cells
                .iter()
                .copied()
                .find(|&c| self.troop_in_range(id, c))
        }) else {
            return Vec::new();
        };
        let (Some(offense), Some(defense), Some(kind)) = (
            self.troop_offense(id),
            self.settlement_defense(target),
            self.troop_kind(id),
        ) else {
            return Vec::new();
        };
        let exchange =
            combat::against_settlement(offense, defense, kind.architecture_offense, &self.config);
        self.mark_attacked(id);

        let mut packs = Vec::with_capacity(2);
        debug!(troop = %id, settlement = %target, damage = exchange.forward, "Settlement attacked");
        if exchange.forward > 0 {
            let destroyed = self
                .settlements
                .get_mut(target)
                .map_or(false, |s| s.lose_endurance(exchange.forward));
            packs.push(DamagePack::new(
                OrderTarget::Settlement(target),
                point,
                exchange.forward,
                destroyed,
            ));
            if destroyed {
                info!(settlement = %target, "Settlement destroyed");
                self.reset_orders_targeting(OrderTarget::Settlement(target));
            }
        }

        if let Some(react) = exchange.react {
            packs.extend(self.damage_troop(id, react));
        }
        packs
    }

    fn attack_troop(&mut self, id: TroopId, target: TroopId) -> Vec<DamagePack> {
        let (Some(attacker), Some(defender)) = (self.troops.get(id), self.troops.get(target))
        else {
            return Vec::new();
        };
        let (from, to) = (attacker.position, defender.position);
        if !self.troop_in_range(id, to) {
            return Vec::new();
        }
        let (Some(offense), Some(defense)) = (self.troop_offense(id), self.troop_defense(target))
        else {
            return Vec::new();
        };
        let reaches = self.troop_in_range(target, from);
        let exchange = combat::against_troop(offense, defense, reaches, &self.config);
        self.mark_attacked(id);
        debug!(troop = %id, target = %target, damage = exchange.forward, "Troop attacked");

        let mut packs = Vec::with_capacity(2);
        packs.extend(self.damage_troop(target, exchange.forward));
        if let Some(react) = exchange.react {
            packs.extend(self.damage_troop(id, react));
        }
        packs
    }

    /// One pack per side actually damaged; a zero amount leaves the troop alone
    fn damage_troop(&mut self, id: TroopId, amount: u32) -> Option<DamagePack> {
        if amount == 0 {
            return None;
        }
        let position = self.troops.get(id)?.position;
        let destroyed = self.troop_lose_quantity(id, amount);
        Some(DamagePack::new(OrderTarget::Troop(id), position, amount, destroyed))
    }

    /// Remove quantity; at zero the troop is destroyed
    ///
    /// Returns true only on the call that destroys the troop.
    pub fn troop_lose_quantity(&mut self, id: TroopId, amount: u32) -> bool {
        let Some(military) = self.troops.get(id).map(|t| t.military) else {
            return false;
        };
        let Some(m) = self.militaries.get_mut(military) else {
            return false;
        };
        m.decrease_quantity(amount);
        if !m.is_empty() {
            return false;
        }
        self.destroy_troop(id);
        true
    }

    /// Attackers go idle, persons return to the start settlement, and the
    /// troop leaves the map together with its roster
    fn destroy_troop(&mut self, id: TroopId) {
        let Some(troop) = self.troops.get(id) else {
            return;
        };
        let (military, start) = (troop.military, troop.start_settlement);

        self.reset_orders_targeting(OrderTarget::Troop(id));

        let persons = self
            .militaries
            .get(military)
            .map(|m| m.persons.clone())
            .unwrap_or_default();
        for person in persons {
            if let Some(p) = self.persons.get_mut(person) {
                match start {
                    Some(settlement) => p.move_to_settlement(settlement),
                    None => p.location = PersonLocation::Nowhere,
                }
            }
        }

        // Removal only fails on a read-only index, which the live world never is
        let _ = self.militaries.remove(military);
        let _ = self.troops.remove(id);
        if let Some(settlement) = start {
            self.refresh_mayor(settlement);
        }
        info!(troop = %id, "Troop destroyed");
    }

    /// Run one troop's full day
    pub fn advance_troop(&mut self, id: TroopId) -> Option<TroopDay> {
        if !self.troops.contains(id) {
            return None;
        }
        self.begin_order(id);
        let (steps, stop) = self.advance_movement(id);
        let entered = self.try_enter(id);
        let damage = if entered.is_some() {
            Vec::new()
        } else {
            self.attack(id)
        };
        Some(TroopDay {
            troop: id,
            steps,
            stop,
            entered,
            damage,
        })
    }

    fn troop_mut(&mut self, id: TroopId) -> Result<&mut Troop, ValidationError> {
        self.troops
            .get_mut(id)
            .ok_or(ValidationError::TroopNotFound(id))
    }

    fn require_settlement(&self, id: SettlementId) -> Result<Point, ValidationError> {
        self.settlements
            .get(id)
            .and_then(|s| s.position())
            .ok_or(ValidationError::SettlementNotFound(id))
    }

    fn require_in_bounds(&self, p: Point) -> Result<(), ValidationError> {
        if self.map.in_bounds(p) {
            Ok(())
        } else {
            Err(ValidationError::CellNotPlaceable(p))
        }
    }

    pub fn give_move_order(&mut self, id: TroopId, p: Point) -> Result<(), ValidationError> {
        self.require_in_bounds(p)?;
        self.troop_mut(id)?.set_order(Order::MoveTo(p));
        Ok(())
    }

    /// Move to the settlement's first cell, without entering
    pub fn give_move_to_settlement_order(
        &mut self,
        id: TroopId,
        settlement: SettlementId,
    ) -> Result<(), ValidationError> {
        let p = self.require_settlement(settlement)?;
        self.troop_mut(id)?.set_order(Order::MoveTo(p));
        Ok(())
    }

    pub fn give_move_enter_order(
        &mut self,
        id: TroopId,
        settlement: SettlementId,
    ) -> Result<(), ValidationError> {
        self.require_settlement(settlement)?;
        self.troop_mut(id)?.set_order(Order::MoveEnter(settlement));
        Ok(())
    }

    pub fn give_attack_location_order(
        &mut self,
        id: TroopId,
        p: Point,
    ) -> Result<(), ValidationError> {
        self.require_in_bounds(p)?;
        self.troop_mut(id)?.set_order(Order::AttackLocation(p));
        Ok(())
    }

    pub fn give_attack_troop_order(
        &mut self,
        id: TroopId,
        target: TroopId,
    ) -> Result<(), ValidationError> {
        if !self.troops.contains(target) {
            return Err(ValidationError::TroopNotFound(target));
        }
        self.troop_mut(id)?.set_order(Order::AttackTroop(target));
        Ok(())
    }

    pub fn give_attack_settlement_order(
        &mut self,
        id: TroopId,
        settlement: SettlementId,
    ) -> Result<(), ValidationError> {
        self.require_settlement(settlement)?;
        self.troop_mut(id)?.set_order(Order::AttackSettlement(settlement));
        Ok(())
    }

    pub fn set_ai_tags(&mut self, id: TroopId, tags: &str) -> Result<(), ValidationError> {
        self.troop_mut(id)?.ai_tags = tags.to_string();
        Ok(())
    }

    fn troops_in_view(&self, id: TroopId, friendly: bool) -> Vec<TroopId> {
        let Some(troop) = self.troops.get(id) else {
            return Vec::new();
        };
        let faction = self.faction_of_section(troop.section);
        let range = self.config.view_range;
        self.troops
            .filter(|t| {
                t.position.taxi_distance(&troop.position) <= range
                    && (self.faction_of_section(t.section) == faction) == friendly
            })
            .ids()
    }

    /// Same-faction troops within view range, the troop itself included
    pub fn friendly_units_in_view(&self, id: TroopId) -> Vec<TroopId> {
        self.troops_in_view(id, true)
    }

    pub fn hostile_units_in_view(&self, id: TroopId) -> Vec<TroopId> {
        self.troops_in_view(id, false)
    }

    pub fn is_settlement_in_view(&self, id: TroopId, settlement: SettlementId) -> bool {
        match (
            self.troops.get(id),
            self.settlements.get(settlement).and_then(|s| s.position()),
        ) {
            (Some(troop), Some(p)) => troop.position.taxi_distance(&p) <= self.config.view_range,
            _ => false,
        }
    }
}
