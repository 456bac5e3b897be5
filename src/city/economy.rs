//! Settlement economy - advances one settlement by one day
//!
//! Each day a settlement:
//! 1. Loses a fixed amount of every development stat (floored at 0)
//! 2. Develops, if it has a mayor and can pay at least the mayor:
//!    - workers it cannot pay are sent back to idle, chosen with the world RNG
//!    - each category grows by the mayor's and workers' combined ability
//! 3. Collects fund and food income on the first day of each month

use rand::seq::SliceRandom;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, trace};

use crate::core::config::SimulationConfig;
use crate::core::types::{PersonId, SettlementId};
use crate::entity::person::{DevelopmentCategory, Person, Work};
use crate::world::scenario::World;

/// What the development step did
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Development {
    /// Nobody to direct the work
    NoMayor,
    /// Fund cannot pay even the mayor; nothing charged
    Unaffordable,
    Developed {
        charged: i32,
        /// Workers sent back to idle for lack of fund
        released: Vec<PersonId>,
    },
}

/// Fund and food added by monthly income
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Income {
    pub fund: i32,
    pub food: i32,
}

/// One settlement's day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SettlementDay {
    pub settlement: SettlementId,
    pub development: Development,
    pub income: Option<Income>,
}

/// Weighted sum where the k-th largest value counts `factor^(k-1)`
///
/// Values are sorted first, so the result does not depend on input order.
pub fn diminishing_sum(values: &[f32], factor: f32) -> f32 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| b.total_cmp(a));

    let mut weight = 1.0;
    let mut total = 0.0;
    for v in sorted {
        total += v * weight;
        weight *= factor;
    }
    total
}

/// Move `current` toward `ceiling` by `growth`, scaled by the remaining gap
///
/// The result stays within [0, ceiling].
pub fn diminishing_growth(current: f32, growth: f32, ceiling: f32) -> f32 {
    if ceiling <= 0.0 {
        return 0.0;
    }
    let next = current + growth * (ceiling - current) / ceiling;
    next.clamp(0.0, ceiling)
}

/// Number of workers (mayor included) the fund can pay for
fn affordable_workers(fund: i32, cost: i32) -> i32 {
    if cost <= 0 {
        return i32::MAX;
    }
    fund.max(0) / cost
}

/// Per-category ability: mayor's share plus the workers' diminishing sum
fn category_abilities(
    mayor: &Person,
    workers: &[Person],
    config: &SimulationConfig,
) -> Vec<(DevelopmentCategory, f32)> {
    DevelopmentCategory::ALL
        .par_iter()
        .map(|&category| {
            let values: Vec<f32> = workers
                .iter()
                .filter(|w| w.work == Work::Develop(category))
                .map(|w| w.work_ability(category) as f32)
                .collect();
            let ability = mayor.work_ability(category) as f32
                * config.mayor_internal_work_efficiency
                + diminishing_sum(&values, config.internal_person_diminishing_factor);
            (category, ability)
        })
        .collect()
}

impl World {
    /// Advance one settlement by one day; None if it does not exist
    pub fn advance_settlement(&mut self, id: SettlementId) -> Option<SettlementDay> {
        let drop = self.config.internal_drop;
        let settlement = self.settlements.get_mut(id)?;
        for category in DevelopmentCategory::ALL {
            let stat = settlement.stats.get_mut(category);
            *stat = (*stat - drop).max(0.0);
        }

        let development = self.develop(id);

        let income = if self.calendar.current_date().day_of_month() == 1 {
            self.collect_income(id)
        } else {
            None
        };

        Some(SettlementDay {
            settlement: id,
            development,
            income,
        })
    }

    fn develop(&mut self, id: SettlementId) -> Development {
        let Some(mayor_id) = self.mayor_of(id) else {
            return Development::NoMayor;
        };
        let Some(fund) = self.settlements.get(id).map(|s| s.fund) else {
            return Development::NoMayor;
        };

        let cost = self.config.internal_cost;
        let mut workers: Vec<PersonId> = self
            .persons_in_settlement(id)
            .into_iter()
            .filter(|p| matches!(p.work, Work::Develop(_)))
            .map(|p| p.id)
            .collect();

        let working = workers.len() as i32 + 1;
        let mut charged = cost.saturating_mul(working);
        let mut released = Vec::new();

        if charged > fund {
            let affordable = affordable_workers(fund, cost);
            if affordable < 1 {
                trace!(settlement = %id, fund, "Fund too low to pay the mayor, development skipped");
                return Development::Unaffordable;
            }

            let excess = (workers.len() as i32 - affordable).max(0) as usize;
            workers.shuffle(&mut self.rng);
            released = workers.split_off(workers.len() - excess);
            released.sort();
            for &person in &released {
                if let Some(p) = self.persons.get_mut(person) {
                    p.work = Work::Idle;
                }
            }
            charged = cost * affordable;
            debug!(settlement = %id, fund, released = released.len(), "Workers released for lack of fund");
        }

        let config = &self.config;
        let Some(mayor) = self.persons.get(mayor_id) else {
            return Development::NoMayor;
        };
        let staff: Vec<Person> = workers
            .iter()
            .filter_map(|&w| self.persons.get(w).cloned())
            .collect();
        let abilities = category_abilities(mayor, &staff, config);

        let growth_factor = config.internal_growth_factor;
        let max_factor = config.diminishing_growth_max_factor;
        let Some(kind) = self
            .settlements
            .get(id)
            .and_then(|s| self.settlement_kinds.get(s.kind))
            .cloned()
        else {
            return Development::NoMayor;
        };

        if let Some(settlement) = self.settlements.get_mut(id) {
            settlement.lose_fund(charged);
            for (category, ability) in abilities {
                let stat = settlement.stats.get_mut(category);
                *stat = diminishing_growth(
                    *stat,
                    ability * growth_factor,
                    kind.cap(category) * max_factor,
                );
            }
        }

        Development::Developed { charged, released }
    }

    fn collect_income(&mut self, id: SettlementId) -> Option<Income> {
        let config = &self.config;
        let settlement = self.settlements.get(id)?;
        let kind = self.settlement_kinds.get(settlement.kind)?;

        let population = settlement.population as f32;
        let fund = (settlement.fund as f32
            + config.gain_fund
                * (settlement.stats.commerce + population * config.gain_fund_per_population))
            .clamp(0.0, kind.max_fund.max(0) as f32) as i32;
        let food = (settlement.food as f32
            + config.gain_food
                * (settlement.stats.agriculture + population * config.gain_food_per_population))
            .clamp(0.0, kind.max_food.max(0) as f32) as i32;

        let income = Income {
            fund: fund - settlement.fund,
            food: food - settlement.food,
        };

        let settlement = self.settlements.get_mut(id)?;
        settlement.fund = fund;
        settlement.food = food;
        debug!(settlement = %id, fund = income.fund, food = income.food, "Monthly income");
        Some(income)
    }
}
