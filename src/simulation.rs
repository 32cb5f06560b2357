//! The tick driver.
//!
//! [`Simulation`] owns every component and threads them through each tick in
//! a fixed order:
//!
//! 1. statistics are computed fresh from the live entities
//! 2. the rules engine recomputes its derived values for this tick
//! 3. the entity manager updates every entity, sweeps the dead and respawns
//!    resources
//! 4. rule modifiers are applied to every live entity
//! 5. objectives are evaluated against fresh statistics
//!
//! A tick is atomic from the caller's point of view. When the population
//! reaches zero the loop stops in [`RunState::Extinct`] until
//! [`Simulation::reseed`] is called.

use anyhow::Result;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use ruleweaver_core::config::SimConfig;
use ruleweaver_core::events::{EventLog, EventSink};
use ruleweaver_core::manager::{EntityManager, TickSummary};
use ruleweaver_core::metrics::TickMetrics;
use ruleweaver_core::objectives::ObjectiveManager;
use ruleweaver_core::rules::{RuleError, RuleKey, RulePreset, RuleValue, RulesEngine};
use ruleweaver_core::world::WorldContext;
use ruleweaver_data::PopulationStats;
use ruleweaver_io::save::{load_from, save_to, SaveState};
use ruleweaver_io::store::SaveStore;
use ruleweaver_io::IoError;
use serde::Serialize;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    Running,
    Paused,
    /// Population reached zero; only [`Simulation::reseed`] resumes the loop.
    Extinct,
}

/// Outcome of one [`Simulation::step`].
#[derive(Debug, Clone, Serialize)]
pub struct TickReport {
    pub tick: u64,
    #[serde(skip)]
    pub summary: TickSummary,
    pub stats: PopulationStats,
    pub completed_objectives: Vec<String>,
    pub state: RunState,
}

pub struct Simulation {
    config: SimConfig,
    manager: EntityManager,
    rules: RulesEngine,
    objectives: ObjectiveManager,
    events: EventLog,
    metrics: TickMetrics,
    tick: u64,
    state: RunState,
    rng: ChaCha8Rng,
}

impl Simulation {
    /// Validates `config`, seeds the RNG and spawns the starting world.
    pub fn new(config: SimConfig) -> Result<Self> {
        config.validate()?;
        let rng = match config.world.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Ok(Self::with_rng(config, rng))
    }

    fn with_rng(config: SimConfig, mut rng: ChaCha8Rng) -> Self {
        let mut manager = EntityManager::new(
            config.world.bounds(),
            config.population.clone(),
            config.resources.clone(),
        );
        manager.initialize_world(&mut rng);

        let mut events = EventLog::with_capacity(config.log.capacity);
        events.normal(
            0,
            format!(
                "World created: {} creatures and {} resources",
                config.population.living(),
                config.population.resources
            ),
        );
        tracing::info!(
            fingerprint = %config.fingerprint(),
            seed = ?config.world.seed,
            "simulation created"
        );

        Self {
            rules: RulesEngine::new(config.rules.clone()),
            objectives: ObjectiveManager::new(config.objectives.active_floor),
            metrics: TickMetrics::new(),
            manager,
            events,
            tick: 0,
            state: RunState::Running,
            rng,
            config,
        }
    }

    /// Runs one tick. Returns `None` without touching any state when the
    /// simulation is paused or extinct.
    pub fn step(&mut self) -> Option<TickReport> {
        if self.state != RunState::Running {
            return None;
        }
        let started = Instant::now();
        let tick = self.tick;

        let stats = self.manager.statistics();
        self.rules.update_derived_rules(&stats, tick);

        let world = WorldContext::new(self.manager.bounds(), tick);
        let summary = self
            .manager
            .update(&self.rules, &world, &mut self.rng, &mut self.events);

        for entity in self.manager.live_mut() {
            self.rules.apply_rule_modifications(entity, &world);
        }

        let stats = self.manager.statistics();
        let completed_objectives = self.objectives.update(&stats, tick, &mut self.events);
        self.tick += 1;

        if stats.is_extinct() {
            self.state = RunState::Extinct;
            self.events
                .critical(tick, "All life has gone extinct. Reseed the world to continue.");
            tracing::warn!(tick, "population extinct; loop paused");
            self.metrics.increment_counter("extinctions");
        }

        self.metrics.record_tick(self.tick, started.elapsed(), &stats);
        for (name, count) in [
            ("births", summary.births),
            ("deaths", summary.deaths),
            ("hunts", summary.hunts),
            ("trades", summary.trades),
        ] {
            self.metrics.add_to_counter(name, count as u64);
        }

        Some(TickReport {
            tick,
            summary,
            stats,
            completed_objectives,
            state: self.state,
        })
    }

    /// Steps up to `ticks` times, stopping early when the loop halts.
    /// Returns the number of ticks executed.
    pub fn run(&mut self, ticks: u64) -> u64 {
        let mut executed = 0;
        while executed < ticks && self.step().is_some() {
            executed += 1;
        }
        executed
    }

    pub fn pause(&mut self) {
        if self.state == RunState::Running {
            self.state = RunState::Paused;
            self.events.normal(self.tick, "Simulation paused");
        }
    }

    /// Resumes a paused loop. Extinct worlds need [`Self::reseed`].
    pub fn resume(&mut self) -> bool {
        match self.state {
            RunState::Paused => {
                self.state = RunState::Running;
                self.events.normal(self.tick, "Simulation resumed");
                true
            }
            RunState::Running => true,
            RunState::Extinct => false,
        }
    }

    /// Recovery action: spawns the starting population and restarts the loop.
    pub fn reseed(&mut self) -> usize {
        let spawned = self.manager.reseed(&mut self.rng);
        self.state = RunState::Running;
        self.metrics.increment_counter("reseeds");
        self.events.important(
            self.tick,
            format!("World reseeded with {spawned} new creatures"),
        );
        spawned
    }

    /// The write path for rule controls.
    pub fn update_rule(&mut self, key: RuleKey, value: impl Into<RuleValue>) -> Result<(), RuleError> {
        self.rules.update_rule(key, value, self.tick, &mut self.events)
    }

    /// Like [`Self::update_rule`] but with the rule given by name.
    pub fn update_rule_by_name(&mut self, name: &str, value: impl Into<RuleValue>) -> Result<(), RuleError> {
        let key = name.parse::<RuleKey>()?;
        self.update_rule(key, value)
    }

    pub fn apply_preset(&mut self, preset: RulePreset) -> Result<usize, RuleError> {
        let changed = self.rules.apply_preset(preset, self.tick, &mut self.events)?;
        tracing::info!(?preset, changed, "preset applied");
        Ok(changed)
    }

    /// Captures the whole simulation into a save document.
    #[must_use]
    pub fn snapshot(&self) -> SaveState {
        SaveState::capture(
            self.tick,
            &self.manager,
            &self.rules,
            &self.objectives,
            &self.events,
        )
        .with_fingerprint(self.config.fingerprint())
    }

    /// Writes the current state to `slot`. Failures are logged as critical
    /// events and leave the simulation untouched.
    pub fn save<S: SaveStore + ?Sized>(&mut self, store: &mut S, slot: &str) -> Result<(), IoError> {
        let state = self.snapshot();
        match save_to(store, slot, &state) {
            Ok(()) => {
                self.events.normal(self.tick, format!("Game saved to slot {slot}"));
                Ok(())
            }
            Err(e) => {
                tracing::error!(slot, error = %e, "save failed");
                self.events.critical(self.tick, format!("Save failed: {e}"));
                Err(e)
            }
        }
    }

    /// Replaces all state with the save in `slot`. Nothing is modified
    /// unless the whole save decodes and validates.
    pub fn load<S: SaveStore + ?Sized>(&mut self, store: &S, slot: &str) -> Result<(), IoError> {
        let restored = load_from(store, slot).and_then(|state| {
            let rules = state.rules.restore()?;
            Ok((state, rules))
        });
        let (state, rules) = match restored {
            Ok(parts) => parts,
            Err(e) => {
                tracing::error!(slot, error = %e, "load failed");
                self.events.critical(self.tick, format!("Load failed: {e}"));
                return Err(e);
            }
        };

        let mut manager = EntityManager::new(
            state.world.bounds(),
            self.config.population.clone(),
            self.config.resources.clone(),
        );
        manager.restore(
            state.world.restore_entities(),
            state.world.lifetime,
            state
                .world
                .respawn_countdown
                .unwrap_or(self.config.resources.respawn_interval),
        );

        self.manager = manager;
        self.rules = rules;
        self.events = state.event_log(self.config.log.capacity);
        self.tick = state.tick;
        self.state = if self.manager.live_count() == 0 {
            RunState::Extinct
        } else {
            RunState::Running
        };

        let saved_at = chrono::DateTime::from_timestamp_millis(state.timestamp)
            .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| "an unknown time".to_string());
        self.events.important(
            self.tick,
            format!("Loaded slot {slot} (saved {saved_at})"),
        );
        self.objectives = state.objectives;
        Ok(())
    }

    #[must_use]
    pub fn statistics(&self) -> PopulationStats {
        self.manager.statistics()
    }

    #[must_use]
    pub fn tick(&self) -> u64 {
        self.tick
    }

    #[must_use]
    pub fn state(&self) -> RunState {
        self.state
    }

    #[must_use]
    pub fn entities(&self) -> &EntityManager {
        &self.manager
    }

    /// Direct access for scenario setup; bypasses the tick order.
    pub fn entities_mut(&mut self) -> &mut EntityManager {
        &mut self.manager
    }

    #[must_use]
    pub fn rules(&self) -> &RulesEngine {
        &self.rules
    }

    #[must_use]
    pub fn objectives(&self) -> &ObjectiveManager {
        &self.objectives
    }

    #[must_use]
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    #[must_use]
    pub fn metrics(&self) -> &TickMetrics {
        &self.metrics
    }

    #[must_use]
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    #[must_use]
    pub fn score(&self) -> u64 {
        self.objectives.score()
    }
}
