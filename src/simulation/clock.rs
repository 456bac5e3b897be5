//! Simulation clock - advances the whole world by one day
//!
//! A day runs in a fixed order:
//! 1. The calendar moves to the next date
//! 2. Every settlement runs its economy, in id order
//! 3. Every troop on the map at the start of the day runs its order, in id
//!    order; troops destroyed earlier in the day are skipped
//!
//! Expected conditions (stale targets, fund shortfall, blocked paths) are
//! part of the report, never errors.

use serde::Serialize;

use crate::battle::combat::DamagePack;
use crate::battle::troop::TroopDay;
use crate::city::economy::SettlementDay;
use crate::core::calendar::GameDate;
use crate::world::scenario::World;

/// Everything that happened on one day
#[derive(Debug, Clone, Serialize)]
pub struct DayReport {
    pub date: GameDate,
    pub settlements: Vec<SettlementDay>,
    pub troops: Vec<TroopDay>,
}

impl DayReport {
    /// All damage dealt during the day, in resolution order
    pub fn damage(&self) -> impl Iterator<Item = &DamagePack> {
        self.troops.iter().flat_map(|t| t.damage.iter())
    }

    pub fn destroyed_count(&self) -> usize {
        self.damage().filter(|d| d.destroyed).count()
    }
}

/// Advance the world by one day
pub fn advance_day(world: &mut World) -> DayReport {
    world.calendar.advance();
    let date = world.calendar.current_date();

    let settlements: Vec<SettlementDay> = world
        .settlements
        .ids()
        .into_iter()
        .filter_map(|id| world.advance_settlement(id))
        .collect();

    let troops: Vec<TroopDay> = world
        .troops
        .ids()
        .into_iter()
        .filter_map(|id| world.advance_troop(id))
        .collect();

    let report = DayReport {
        date,
        settlements,
        troops,
    };
    tracing::info!(
        "Day {} ({}): {} settlements, {} troops, {} destroyed",
        world.calendar.days_passed(),
        date,
        report.settlements.len(),
        report.troops.len(),
        report.destroyed_count()
    );
    report
}

/// Advance several days, collecting each day's report
pub fn run_days(world: &mut World, days: u32) -> Vec<DayReport> {
    (0..days).map(|_| advance_day(world)).collect()
}
