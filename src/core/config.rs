//! Simulation tunables
//!
//! Every constant that shapes the daily tick lives here. A config value is
//! built once (defaults or a TOML file) and handed to the world; nothing in
//! the engine reads tunables from global state.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::error::ConfigError;

/// Configuration for the simulation systems
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    // === SETTLEMENT ECONOMY ===
    /// Amount every development stat loses each day before development
    pub internal_drop: f32,

    /// Fund charged per working person (mayor included) per day
    pub internal_cost: i32,

    /// Multiplier on the mayor's own ability when developing a category
    pub mayor_internal_work_efficiency: f32,

    /// Weight decay for the k-th best worker in a category
    ///
    /// At 0.8 the second worker counts 80%, the third 64%, and so on. Adding
    /// workers helps, but each one helps less.
    pub internal_person_diminishing_factor: f32,

    /// Converts category ability into stat growth per day
    pub internal_growth_factor: f32,

    /// Development stats approach `kind cap * diminishing_growth_max_factor`
    /// asymptotically and never exceed it
    pub diminishing_growth_max_factor: f32,

    /// Monthly fund income per point of commerce (plus population term)
    pub gain_fund: f32,
    pub gain_fund_per_population: f32,

    /// Monthly food income per point of agriculture (plus population term)
    pub gain_food: f32,
    pub gain_food_per_population: f32,

    // === COMBAT ===
    /// Damage dealt to a unit's quantity at an offense/defense ratio of 1
    pub base_damage: f32,

    /// Endurance damage dealt to a settlement at a ratio of 1
    pub base_architecture_damage: f32,

    /// Scale applied to counter-attack damage
    pub react_damage_factor: f32,

    /// Share of the best roster member's excess command over the leader's
    /// that counts toward the unit's effective command
    pub troop_command_person_factor: f32,
    pub troop_strength_person_factor: f32,
    pub troop_intelligence_person_factor: f32,

    /// Taxicab radius used by the "in view" queries
    pub view_range: u32,

    // === DETERMINISM & PARALLELIZATION ===
    /// Seed for the world RNG (worker release on fund shortfall)
    pub rng_seed: u64,

    /// Minimum collection size before filtering goes parallel
    ///
    /// Below this, thread overhead exceeds the benefit.
    pub parallel_threshold: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            internal_drop: 0.5,
            internal_cost: 5,
            mayor_internal_work_efficiency: 1.5,
            internal_person_diminishing_factor: 0.8,
            internal_growth_factor: 0.01,
            diminishing_growth_max_factor: 2.0,
            gain_fund: 0.1,
            gain_fund_per_population: 0.0005,
            gain_food: 0.5,
            gain_food_per_population: 0.001,

            base_damage: 100.0,
            base_architecture_damage: 50.0,
            react_damage_factor: 0.5,
            troop_command_person_factor: 0.3,
            troop_strength_person_factor: 0.3,
            troop_intelligence_person_factor: 0.3,
            view_range: 5,

            rng_seed: 0,
            parallel_threshold: 1000,
        }
    }
}

impl SimulationConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a (possibly partial) TOML document; missing keys keep defaults
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: SimulationConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Parse(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.internal_cost <= 0 {
            return Err(ConfigError::Invalid(format!(
                "internal_cost ({}) must be positive",
                self.internal_cost
            )));
        }

        if self.internal_drop < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "internal_drop ({}) must not be negative",
                self.internal_drop
            )));
        }

        if !(0.0..=1.0).contains(&self.internal_person_diminishing_factor) {
            return Err(ConfigError::Invalid(format!(
                "internal_person_diminishing_factor ({}) must be within [0, 1]",
                self.internal_person_diminishing_factor
            )));
        }

        if self.diminishing_growth_max_factor <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "diminishing_growth_max_factor ({}) must be positive",
                self.diminishing_growth_max_factor
            )));
        }

        if self.base_damage < 0.0
            || self.base_architecture_damage < 0.0
            || self.react_damage_factor < 0.0
        {
            return Err(ConfigError::Invalid("Damage tunables must not be negative".into()));
        }

        Ok(())
    }
}
