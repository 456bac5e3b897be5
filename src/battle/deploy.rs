//! Commands linking troops and settlements: raising and deploying rosters,
//! entering a friendly settlement, and occupying a hostile one

use tracing::info;

use crate::battle::troop::Troop;
use crate::core::error::ValidationError;
use crate::core::types::{MilitaryId, MilitaryKindId, PersonId, Point, SettlementId, TroopId};
use crate::entity::military::{Military, MilitaryLocation};
use crate::entity::person::{PersonLocation, Work};
use crate::world::scenario::World;

/// Morale and combativity of a freshly raised roster
const NEW_MILITARY_MORALE: i32 = 100;
const NEW_MILITARY_COMBATIVITY: i32 = 100;

impl World {
    /// Raise an empty roster of a kind the settlement can create, paying its cost
    pub fn create_military(
        &mut self,
        settlement: SettlementId,
        kind: MilitaryKindId,
    ) -> Result<MilitaryId, ValidationError> {
        let s = self
            .settlements
            .get(settlement)
            .ok_or(ValidationError::SettlementNotFound(settlement))?;
        if self.faction_of_section(s.section).is_none() {
            return Err(ValidationError::NoFaction(settlement));
        }
        let k = self
            .military_kinds
            .get(kind)
            .ok_or(ValidationError::MilitaryKindNotFound(kind))?;
        if !s.creatable_military_kinds.contains(&kind) {
            return Err(ValidationError::KindNotCreatable { settlement, kind });
        }
        if s.fund < k.cost {
            return Err(ValidationError::InsufficientFund {
                needed: k.cost,
                available: s.fund,
            });
        }

        let id = self.militaries.free_id();
        let military = Military {
            id,
            name: k.name.clone(),
            kind,
            persons: Vec::new(),
            quantity: 0,
            morale: NEW_MILITARY_MORALE,
            combativity: NEW_MILITARY_COMBATIVITY,
            location: MilitaryLocation::Settlement(settlement),
        };
        let cost = k.cost;

        self.militaries.insert(military)?;
        if let Some(s) = self.settlements.get_mut(settlement) {
            s.lose_fund(cost);
        }
        info!(settlement = %settlement, military = %id, kind = %kind, "Military created");
        Ok(id)
    }

    /// Deploy a garrisoned, non-empty roster onto a cell next to its settlement
    ///
    /// `persons` become the roster, the first one leading it. They must all
    /// be present in the settlement.
    pub fn create_unit(
        &mut self,
        military: MilitaryId,
        persons: &[PersonId],
        cell: Point,
    ) -> Result<TroopId, ValidationError> {
        let m = self
            .militaries
            .get(military)
            .ok_or(ValidationError::MilitaryNotFound(military))?;
        let MilitaryLocation::Settlement(settlement) = m.location else {
            return Err(ValidationError::NotGarrisoned(military));
        };
        if m.is_empty() {
            return Err(ValidationError::EmptyRoster(military));
        }
        if persons.is_empty() {
            return Err(ValidationError::NoLeader(military));
        }
        for &person in persons {
            let p = self
                .persons
                .get(person)
                .ok_or(ValidationError::PersonNotFound(person))?;
            if !p.is_in_settlement(settlement) {
                return Err(ValidationError::PersonNotPresent { person, settlement });
            }
        }
        let s = self
            .settlements
            .get(settlement)
            .ok_or(ValidationError::SettlementNotFound(settlement))?;
        let adjacent = !s.occupies(cell) && s.cells.iter().any(|c| c.spiral_out(1).contains(&cell));
        if !adjacent {
            return Err(ValidationError::OutOfDeployRange { cell, settlement });
        }
        let section = s.section;

        let id = self.troops.free_id();
        let mut troop = Troop::new(id, military, cell).with_start_settlement(settlement);
        troop.section = section;
        if !self.map.in_bounds(cell) || !self.can_troop_move_into(&troop, cell) {
            return Err(ValidationError::CellNotPlaceable(cell));
        }

        self.troops.insert(troop)?;
        for &person in persons {
            if let Some(p) = self.persons.get_mut(person) {
                p.location = PersonLocation::Military(military);
                p.work = Work::Idle;
            }
        }
        if let Some(m) = self.militaries.get_mut(military) {
            m.persons = persons.to_vec();
            m.location = MilitaryLocation::Deployed(id);
        }
        self.refresh_mayor(settlement);
        info!(troop = %id, military = %military, cell = %cell, "Unit deployed");
        Ok(id)
    }

    /// Friendly settlement within one ring of the troop, nearest cells first
    pub fn enterable_settlement(&self, id: TroopId) -> Option<SettlementId> {
        let troop = self.troops.get(id)?;
        let faction = self.faction_of_section(troop.section);
        troop.position.spiral_out(1).into_iter().find_map(|p| {
            self.settlement_at(p)
                .filter(|s| self.faction_of_section(s.section) == faction)
                .map(|s| s.id)
        })
    }

    /// Disband into the nearest friendly settlement
    pub fn enter(&mut self, id: TroopId) -> Result<SettlementId, ValidationError> {
        if !self.troops.contains(id) {
            return Err(ValidationError::TroopNotFound(id));
        }
        let settlement = self
            .enterable_settlement(id)
            .ok_or(ValidationError::NothingToEnter(id))?;
        self.enter_settlement(id, settlement);
        Ok(settlement)
    }

    /// Hostile settlement under the troop, if any
    pub fn occupiable_settlement(&self, id: TroopId) -> Option<SettlementId> {
        let troop = self.troops.get(id)?;
        let faction = self.faction_of_section(troop.section);
        self.settlement_at(troop.position)
            .filter(|s| self.faction_of_section(s.section) != faction)
            .map(|s| s.id)
    }

    /// Take the settlement under the troop for the troop's section
    pub fn occupy(&mut self, id: TroopId) -> Result<SettlementId, ValidationError> {
        let section = self
            .troops
            .get(id)
            .ok_or(ValidationError::TroopNotFound(id))?
            .section;
        let settlement = self
            .occupiable_settlement(id)
            .ok_or(ValidationError::NothingToOccupy(id))?;
        if let Some(s) = self.settlements.get_mut(settlement) {
            s.section = section;
        }
        self.refresh_mayor(settlement);
        info!(troop = %id, settlement = %settlement, "Settlement occupied");
        Ok(settlement)
    }
}
