//! Realm Sim - headless scenario runner
//!
//! Loads a scenario, advances it a number of days and prints a JSON summary.

use std::path::PathBuf;

use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use realm_sim::core::config::SimulationConfig;
use realm_sim::core::error::Result;
use realm_sim::simulation::{advance_day, DayReport};
use realm_sim::world::ScenarioRows;

/// Run a scenario for a number of days
#[derive(Parser, Debug)]
#[command(name = "realm-sim")]
#[command(about = "Advance a scenario day by day and report what happened")]
struct Args {
    /// Scenario JSON file
    scenario: PathBuf,

    /// Tunables TOML file; defaults apply when absent
    #[arg(long)]
    config: Option<PathBuf>,

    /// Days to simulate
    #[arg(long, default_value_t = 30)]
    days: u32,

    /// Random seed, overriding the config
    #[arg(long)]
    seed: Option<u64>,

    /// Write the final state back out as scenario JSON
    #[arg(long)]
    save: Option<PathBuf>,

    /// Print every day report instead of the summary
    #[arg(long)]
    full: bool,
}

#[derive(Serialize)]
struct RunSummary {
    start: String,
    end: String,
    days: u32,
    seed: u64,
    settlements: usize,
    troops_remaining: usize,
    troops_entered: usize,
    units_destroyed: usize,
    damage_dealt: i64,
    fund_collected: i64,
    food_collected: i64,
    workers_released: usize,
}

impl RunSummary {
    fn add_day(&mut self, report: &DayReport) {
        self.troops_entered += report.troops.iter().filter(|t| t.entered.is_some()).count();
        self.units_destroyed += report.destroyed_count();
        self.damage_dealt += report.damage().map(|d| -(d.delta as i64)).sum::<i64>();
        for day in &report.settlements {
            if let Some(income) = &day.income {
                self.fund_collected += income.fund as i64;
                self.food_collected += income.food as i64;
            }
            if let realm_sim::city::Development::Developed { released, .. } = &day.development {
                self.workers_released += released.len();
            }
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("realm_sim=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.rng_seed = seed;
    }
    config.validate()?;
    let seed = config.rng_seed;

    let rows = ScenarioRows::load_from_file(&args.scenario)?;
    let mut world = rows.into_world(config)?;
    tracing::info!("Scenario {} loaded", args.scenario.display());

    let mut summary = RunSummary {
        start: world.calendar.current_date().to_string(),
        end: String::new(),
        days: args.days,
        seed,
        settlements: world.settlements.len(),
        troops_remaining: 0,
        troops_entered: 0,
        units_destroyed: 0,
        damage_dealt: 0,
        fund_collected: 0,
        food_collected: 0,
        workers_released: 0,
    };

    let mut reports = Vec::new();
    for _ in 0..args.days {
        let report = advance_day(&mut world);
        summary.add_day(&report);
        if args.full {
            reports.push(report);
        }
    }
    summary.end = world.calendar.current_date().to_string();
    summary.troops_remaining = world.troops.len();

    if args.full {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    if let Some(path) = &args.save {
        world.to_rows().save_to_file(path)?;
        tracing::info!("Saved to {}", path.display());
    }
    Ok(())
}
