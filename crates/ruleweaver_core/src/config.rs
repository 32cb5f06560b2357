//! Configuration management for simulation parameters.
//!
//! Every section has defaults, so a partial `ruleweaver.toml` only needs the
//! values it overrides.
//!
//! ## Example `ruleweaver.toml`
//!
//! ```toml
//! [world]
//! width = 800.0
//! height = 600.0
//! seed = 42
//!
//! [population]
//! herbivores = 15
//! carnivores = 5
//!
//! [rules]
//! energy_decay = 0.002
//! enable_weather = true
//! ```

use crate::events::DEFAULT_LOG_CAPACITY;
use crate::rules::RuleSet;
use anyhow::Context;
use ruleweaver_data::{EntityKind, WorldBounds};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// World dimensions, seeding and pacing.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct WorldConfig {
    pub width: f64,
    pub height: f64,
    /// Fixed RNG seed. `None` seeds from entropy.
    pub seed: Option<u64>,
    /// Wall-clock pacing for the CLI driver; 0 runs as fast as possible.
    pub tick_millis: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            seed: None,
            tick_millis: 1000,
        }
    }
}

impl WorldConfig {
    #[must_use]
    pub fn bounds(&self) -> WorldBounds {
        WorldBounds::new(self.width, self.height)
    }
}

/// Starting population per kind.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct PopulationConfig {
    pub herbivores: usize,
    pub carnivores: usize,
    pub traders: usize,
    pub resources: usize,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            herbivores: 15,
            carnivores: 5,
            traders: 3,
            resources: 20,
        }
    }
}

impl PopulationConfig {
    #[must_use]
    pub fn count(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Herbivore => self.herbivores,
            EntityKind::Carnivore => self.carnivores,
            EntityKind::Trader => self.traders,
            EntityKind::Resource => self.resources,
        }
    }

    /// Number of living (non-resource) entities in the starting population.
    #[must_use]
    pub fn living(&self) -> usize {
        self.herbivores + self.carnivores + self.traders
    }
}

/// Periodic resource respawning.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ResourceConfig {
    pub respawn_interval: u64,
    /// No respawn happens while this many resources are alive.
    pub max_resources: usize,
    /// Resources per respawn before the abundance multiplier.
    pub respawn_batch: usize,
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            respawn_interval: 30,
            max_resources: 30,
            respawn_batch: 5,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ObjectivesConfig {
    /// Dynamic objectives are generated while fewer than this many are active.
    pub active_floor: usize,
}

impl Default for ObjectivesConfig {
    fn default() -> Self {
        Self { active_floor: 5 }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct LogConfig {
    pub capacity: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_LOG_CAPACITY,
        }
    }
}

/// Top-level configuration, one field per `[section]`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct SimConfig {
    pub world: WorldConfig,
    pub population: PopulationConfig,
    pub resources: ResourceConfig,
    pub rules: RuleSet,
    pub objectives: ObjectivesConfig,
    pub log: LogConfig,
}

impl SimConfig {
    /// Validates all configuration parameters, reporting the first failure.
    pub fn validate(&self) -> anyhow::Result<()> {
        // World
        anyhow::ensure!(
            self.world.width.is_finite() && self.world.width > 0.0,
            "World width must be positive"
        );
        anyhow::ensure!(
            self.world.height.is_finite() && self.world.height > 0.0,
            "World height must be positive"
        );
        anyhow::ensure!(
            self.world.width <= 10_000.0 && self.world.height <= 10_000.0,
            "World too large (max 10000 per side)"
        );

        // Population
        anyhow::ensure!(
            self.population.living() > 0,
            "Starting population must contain at least one living entity"
        );
        anyhow::ensure!(
            self.population.living() + self.population.resources <= 10_000,
            "Starting population too large (max 10000)"
        );

        // Resources
        anyhow::ensure!(
            self.resources.respawn_interval > 0,
            "Resource respawn interval must be positive"
        );

        // Rules
        self.rules
            .validate()
            .context("Initial rules are out of range")?;

        // Objectives and log
        anyhow::ensure!(
            self.objectives.active_floor > 0,
            "Objective active floor must be positive"
        );
        anyhow::ensure!(self.log.capacity > 0, "Event log capacity must be positive");

        Ok(())
    }

    /// Parses and validates a TOML document.
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config = toml::from_str::<Self>(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `path`, falling back to defaults when the file does not exist.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::info!(path = %path.display(), "config file not found; using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("Invalid config {}", path.display()))
    }

    #[must_use]
    pub fn fingerprint(&self) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(format!("{:?}", self.world).as_bytes());
        hasher.update(format!("{:?}", self.population).as_bytes());
        hasher.update(format!("{:?}", self.resources).as_bytes());
        hasher.update(format!("{:?}", self.rules).as_bytes());
        hasher.update(format!("{:?}", self.objectives).as_bytes());
        hex::encode(hasher.finalize())
    }
}
