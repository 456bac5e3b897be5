//! Mayor assignment
//!
//! A settlement that belongs to a faction and has persons present has
//! exactly one mayor. Commands here validate first and mutate only when
//! every precondition holds.

use tracing::debug;

use crate::core::error::ValidationError;
use crate::core::types::{PersonId, SettlementId};
use crate::entity::person::{PersonLocation, Work};
use crate::world::scenario::World;

impl World {
    /// Present person holding the mayor post (lowest id if the data is inconsistent)
    pub fn mayor_of(&self, settlement: SettlementId) -> Option<PersonId> {
        self.persons
            .iter()
            .find(|p| p.is_in_settlement(settlement) && p.work == Work::Mayor)
            .map(|p| p.id)
    }

    fn faction_leader_present(&self, settlement: SettlementId) -> bool {
        self.settlement_faction(settlement)
            .and_then(|f| self.factions.get(f))
            .and_then(|f| self.persons.get(f.leader))
            .map_or(false, |leader| {
                leader.location == PersonLocation::Settlement(settlement)
            })
    }

    /// The mayor may be replaced only in a staffed faction settlement
    /// where the faction leader is not present
    pub fn can_change_mayor(&self, settlement: SettlementId) -> bool {
        !self.persons_in_settlement(settlement).is_empty()
            && self.settlement_faction(settlement).is_some()
            && !self.faction_leader_present(settlement)
    }

    /// Replace the mayor with a person present in the settlement
    pub fn change_mayor(
        &mut self,
        settlement: SettlementId,
        person: PersonId,
    ) -> Result<(), ValidationError> {
        if !self.settlements.contains(settlement) {
            return Err(ValidationError::SettlementNotFound(settlement));
        }
        let candidate = self
            .persons
            .get(person)
            .ok_or(ValidationError::PersonNotFound(person))?;
        if !candidate.is_in_settlement(settlement) {
            return Err(ValidationError::MayorNotPresent { person, settlement });
        }
        if self.settlement_faction(settlement).is_none() {
            return Err(ValidationError::NoFaction(settlement));
        }
        if self.faction_leader_present(settlement) {
            return Err(ValidationError::FactionLeaderPresent(settlement));
        }

        self.assign_mayor(settlement, person);
        Ok(())
    }

    /// Appoint a mayor where there is none at all
    pub fn add_mayor(
        &mut self,
        settlement: SettlementId,
        person: PersonId,
    ) -> Result<(), ValidationError> {
        if !self.settlements.contains(settlement) {
            return Err(ValidationError::SettlementNotFound(settlement));
        }
        if self.mayor_of(settlement).is_some() {
            return Err(ValidationError::MayorAlreadyAssigned(settlement));
        }
        let candidate = self
            .persons
            .get(person)
            .ok_or(ValidationError::PersonNotFound(person))?;
        if !candidate.is_in_settlement(settlement) {
            return Err(ValidationError::MayorNotPresent { person, settlement });
        }

        self.assign_mayor(settlement, person);
        Ok(())
    }

    /// Default choice: the faction leader if present, else the person with
    /// the highest ability sum (lowest id on ties)
    pub fn pick_mayor(&self, settlement: SettlementId) -> Option<PersonId> {
        let present = self.persons_in_settlement(settlement);
        let leader = self
            .settlement_faction(settlement)
            .and_then(|f| self.factions.get(f))
            .map(|f| f.leader);

        if let Some(leader) = leader.filter(|l| present.iter().any(|p| p.id == *l)) {
            return Some(leader);
        }
        present
            .iter()
            .fold(None, |best: Option<(PersonId, i32)>, p| match best {
                Some((_, sum)) if sum >= p.ability_sum() => best,
                _ => Some((p.id, p.ability_sum())),
            })
            .map(|(id, _)| id)
    }

    /// Restore the one-mayor rule after persons arrive, leave, or the
    /// settlement changes hands
    pub fn refresh_mayor(&mut self, settlement: SettlementId) {
        let mayors: Vec<PersonId> = self
            .persons
            .iter()
            .filter(|p| p.is_in_settlement(settlement) && p.work == Work::Mayor)
            .map(|p| p.id)
            .collect();

        if self.settlement_faction(settlement).is_none() {
            for id in mayors {
                self.set_work(id, Work::Idle);
            }
            return;
        }

        match mayors.split_first() {
            Some((_, extra)) => {
                for &id in extra {
                    self.set_work(id, Work::Idle);
                }
            }
            None => {
                if let Some(id) = self.pick_mayor(settlement) {
                    debug!(settlement = %settlement, person = %id, "Mayor appointed");
                    self.set_work(id, Work::Mayor);
                }
            }
        }
    }

    fn assign_mayor(&mut self, settlement: SettlementId, person: PersonId) {
        if let Some(previous) = self.mayor_of(settlement) {
            self.set_work(previous, Work::Idle);
        }
        self.set_work(person, Work::Mayor);
    }

    fn set_work(&mut self, person: PersonId, work: Work) {
        if let Some(p) = self.persons.get_mut(person) {
            p.work = work;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::person::PersonLocation;
    use crate::world::testing::*;

    fn staffed_town(world: &mut World) -> SettlementId {
        let town = add_settlement(world, 1, &[(3, 3)], Some(1));
        add_person(world, 1, town, Work::Mayor);
        add_person(world, 2, town, Work::Idle);
        town
    }

    #[test]
    fn test_change_mayor() {
        let mut world = test_world();
        let town = staffed_town(&mut world);

        assert!(world.can_change_mayor(town));
        world.change_mayor(town, PersonId(2)).unwrap();

        assert_eq!(world.mayor_of(town), Some(PersonId(2)));
        assert_eq!(world.persons.get(PersonId(1)).unwrap().work, Work::Idle);
    }

    #[test]
    fn test_new_mayor_must_be_present() {
        let mut world = test_world();
        let town = staffed_town(&mut world);
        let elsewhere = add_settlement(&mut world, 2, &[(8, 8)], Some(1));
        let stranger = add_person(&mut world, 3, elsewhere, Work::Idle);

        assert_eq!(
            world.change_mayor(town, stranger),
            Err(ValidationError::MayorNotPresent { person: stranger, settlement: town })
        );
        assert_eq!(world.mayor_of(town), Some(PersonId(1)));
    }

    #[test]
    fn test_leader_presence_blocks_change() {
        let mut world = test_world();
        let town = staffed_town(&mut world);
        world.persons.get_mut(LEADER_1).unwrap().location = PersonLocation::Settlement(town);

        assert!(!world.can_change_mayor(town));
        assert_eq!(
            world.change_mayor(town, PersonId(2)),
            Err(ValidationError::FactionLeaderPresent(town))
        );
        assert_eq!(world.mayor_of(town), Some(PersonId(1)));
    }

    #[test]
    fn test_unowned_settlement_has_no_mayor() {
        let mut world = test_world();
        let town = add_settlement(&mut world, 1, &[(3, 3)], None);
        add_person(&mut world, 1, town, Work::Mayor);
        add_person(&mut world, 2, town, Work::Idle);

        assert!(!world.can_change_mayor(town));
        assert_eq!(
            world.change_mayor(town, PersonId(2)),
            Err(ValidationError::NoFaction(town))
        );

        world.refresh_mayor(town);
        assert_eq!(world.mayor_of(town), None);
    }

    #[test]
    fn test_add_mayor_only_when_vacant() {
        let mut world = test_world();
        let town = staffed_town(&mut world);
        assert_eq!(
            world.add_mayor(town, PersonId(2)),
            Err(ValidationError::MayorAlreadyAssigned(town))
        );

        world.persons.get_mut(PersonId(1)).unwrap().work = Work::Idle;
        world.add_mayor(town, PersonId(2)).unwrap();
        assert_eq!(world.mayor_of(town), Some(PersonId(2)));
    }

    #[test]
    fn test_pick_mayor_prefers_leader_then_ability() {
        let mut world = test_world();
        let town = add_settlement(&mut world, 1, &[(3, 3)], Some(1));
        add_person(&mut world, 1, town, Work::Idle);
        let able = add_person(&mut world, 2, town, Work::Idle);
        world.persons.get_mut(able).unwrap().abilities = abilities(70);

        assert_eq!(world.pick_mayor(town), Some(able));

        world.persons.get_mut(LEADER_1).unwrap().location = PersonLocation::Settlement(town);
        assert_eq!(world.pick_mayor(town), Some(LEADER_1));
    }

    #[test]
    fn test_refresh_keeps_exactly_one_mayor() {
        let mut world = test_world();
        let town = add_settlement(&mut world, 1, &[(3, 3)], Some(1));
        add_person(&mut world, 1, town, Work::Mayor);
        add_person(&mut world, 2, town, Work::Mayor);

        world.refresh_mayor(town);

        let mayors = world
            .persons_in_settlement(town)
            .iter()
            .filter(|p| p.work == Work::Mayor)
            .count();
        assert_eq!(mayors, 1);
        assert_eq!(world.mayor_of(town), Some(PersonId(1)));
    }
}
