//! Global tunable rules and the per-entity effects derived from them.
//!
//! The rule set is a flat, typed map of numbers and toggles. Every write goes
//! through [`RulesEngine::update_rule`], which validates the value, appends an
//! entry to the change history and notifies the event sink. Two further values,
//! population pressure and extinction threat, are recomputed from live
//! statistics at the start of every tick and can never be written directly.

use crate::events::EventSink;
use crate::world::WorldContext;
use ruleweaver_data::{Entity, EntityKind, PopulationStats};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const IDEAL_POPULATION: f64 = 30.0;
pub const EXTINCTION_FLOOR: f64 = 5.0;
pub const DEFAULT_ENERGY_DECAY: f64 = 0.001;
/// Length of one full weather cycle in ticks.
pub const WEATHER_PERIOD: u64 = 200;

const GRAVITY_NUDGE: f64 = 0.01;
const DECAY_NUDGE: f64 = 0.01;
const CROWDING_AGGRESSION_BONUS: f64 = 0.1;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuleError {
    #[error("unknown rule: {0}")]
    UnknownRule(String),

    #[error("{0} is derived from live statistics and cannot be set")]
    Derived(String),

    #[error("{rule} expects a {expected} value")]
    TypeMismatch { rule: RuleKey, expected: &'static str },

    #[error("{rule} = {value} is outside [{min}, {max}]")]
    OutOfRange {
        rule: RuleKey,
        value: f64,
        min: f64,
        max: f64,
    },
}

/// Names of the user-settable rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKey {
    Gravity,
    EnergyDecay,
    ReproductionCost,
    MutationChance,
    TradeEfficiency,
    ResourceAbundance,
    EnablePredators,
    EnableWeather,
}

impl RuleKey {
    pub const ALL: [RuleKey; 8] = [
        RuleKey::Gravity,
        RuleKey::EnergyDecay,
        RuleKey::ReproductionCost,
        RuleKey::MutationChance,
        RuleKey::TradeEfficiency,
        RuleKey::ResourceAbundance,
        RuleKey::EnablePredators,
        RuleKey::EnableWeather,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            RuleKey::Gravity => "gravity",
            RuleKey::EnergyDecay => "energy_decay",
            RuleKey::ReproductionCost => "reproduction_cost",
            RuleKey::MutationChance => "mutation_chance",
            RuleKey::TradeEfficiency => "trade_efficiency",
            RuleKey::ResourceAbundance => "resource_abundance",
            RuleKey::EnablePredators => "enable_predators",
            RuleKey::EnableWeather => "enable_weather",
        }
    }

    /// Legal range for numeric rules; `None` for toggles.
    #[must_use]
    pub fn range(self) -> Option<(f64, f64)> {
        match self {
            RuleKey::Gravity => Some((0.0, 1.0)),
            RuleKey::EnergyDecay => Some((0.0, 0.01)),
            RuleKey::ReproductionCost => Some((0.0, 200.0)),
            RuleKey::MutationChance => Some((0.0, 1.0)),
            RuleKey::TradeEfficiency => Some((0.0, 5.0)),
            RuleKey::ResourceAbundance => Some((0.0, 5.0)),
            RuleKey::EnablePredators | RuleKey::EnableWeather => None,
        }
    }

    #[must_use]
    pub fn is_toggle(self) -> bool {
        self.range().is_none()
    }
}

impl fmt::Display for RuleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RuleKey {
    type Err = RuleError;

    /// Accepts snake_case and camelCase spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .flat_map(char::to_lowercase)
            .collect();
        match normalized.as_str() {
            "gravity" => Ok(RuleKey::Gravity),
            "energydecay" => Ok(RuleKey::EnergyDecay),
            "reproductioncost" => Ok(RuleKey::ReproductionCost),
            "mutationchance" => Ok(RuleKey::MutationChance),
            "tradeefficiency" => Ok(RuleKey::TradeEfficiency),
            "resourceabundance" => Ok(RuleKey::ResourceAbundance),
            "enablepredators" => Ok(RuleKey::EnablePredators),
            "enableweather" => Ok(RuleKey::EnableWeather),
            "populationpressure" | "extinctionthreat" => Err(RuleError::Derived(s.to_string())),
            _ => Err(RuleError::UnknownRule(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleValue {
    Number(f64),
    Toggle(bool),
}

impl fmt::Display for RuleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleValue::Number(v) => write!(f, "{v}"),
            RuleValue::Toggle(v) => write!(f, "{}", if *v { "on" } else { "off" }),
        }
    }
}

impl From<f64> for RuleValue {
    fn from(v: f64) -> Self {
        RuleValue::Number(v)
    }
}

impl From<bool> for RuleValue {
    fn from(v: bool) -> Self {
        RuleValue::Toggle(v)
    }
}

/// The user-settable rule values.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct RuleSet {
    pub gravity: f64,
    pub energy_decay: f64,
    pub reproduction_cost: f64,
    pub mutation_chance: f64,
    pub trade_efficiency: f64,
    pub resource_abundance: f64,
    pub enable_predators: bool,
    pub enable_weather: bool,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            gravity: 0.1,
            energy_decay: DEFAULT_ENERGY_DECAY,
            reproduction_cost: 50.0,
            mutation_chance: 0.1,
            trade_efficiency: 1.0,
            resource_abundance: 1.0,
            enable_predators: true,
            enable_weather: false,
        }
    }
}

impl RuleSet {
    #[must_use]
    pub fn get(&self, key: RuleKey) -> RuleValue {
        match key {
            RuleKey::Gravity => RuleValue::Number(self.gravity),
            RuleKey::EnergyDecay => RuleValue::Number(self.energy_decay),
            RuleKey::ReproductionCost => RuleValue::Number(self.reproduction_cost),
            RuleKey::MutationChance => RuleValue::Number(self.mutation_chance),
            RuleKey::TradeEfficiency => RuleValue::Number(self.trade_efficiency),
            RuleKey::ResourceAbundance => RuleValue::Number(self.resource_abundance),
            RuleKey::EnablePredators => RuleValue::Toggle(self.enable_predators),
            RuleKey::EnableWeather => RuleValue::Toggle(self.enable_weather),
        }
    }

    /// Checks that `value` has the right shape and range for `key`.
    pub fn check(key: RuleKey, value: RuleValue) -> Result<(), RuleError> {
        match (key.range(), value) {
            (Some((min, max)), RuleValue::Number(v)) => {
                if v.is_finite() && (min..=max).contains(&v) {
                    Ok(())
                } else {
                    Err(RuleError::OutOfRange {
                        rule: key,
                        value: v,
                        min,
                        max,
                    })
                }
            }
            (Some(_), RuleValue::Toggle(_)) => Err(RuleError::TypeMismatch {
                rule: key,
                expected: "numeric",
            }),
            (None, RuleValue::Toggle(_)) => Ok(()),
            (None, RuleValue::Number(_)) => Err(RuleError::TypeMismatch {
                rule: key,
                expected: "boolean",
            }),
        }
    }

    /// Writes a value and returns the previous one.
    pub fn set(&mut self, key: RuleKey, value: RuleValue) -> Result<RuleValue, RuleError> {
        Self::check(key, value)?;
        let old = self.get(key);
        // Shape already checked, so mismatched pairs cannot reach the fallthrough arms.
        match value {
            RuleValue::Number(v) => match key {
                RuleKey::Gravity => self.gravity = v,
                RuleKey::EnergyDecay => self.energy_decay = v,
                RuleKey::ReproductionCost => self.reproduction_cost = v,
                RuleKey::MutationChance => self.mutation_chance = v,
                RuleKey::TradeEfficiency => self.trade_efficiency = v,
                RuleKey::ResourceAbundance => self.resource_abundance = v,
                RuleKey::EnablePredators | RuleKey::EnableWeather => {}
            },
            RuleValue::Toggle(v) => match key {
                RuleKey::EnablePredators => self.enable_predators = v,
                RuleKey::EnableWeather => self.enable_weather = v,
                _ => {}
            },
        }
        Ok(old)
    }

    /// Validates every rule, e.g. after loading from a file.
    pub fn validate(&self) -> Result<(), RuleError> {
        RuleKey::ALL
            .iter()
            .try_for_each(|key| Self::check(*key, self.get(*key)))
    }
}

/// Named bundles of rule values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RulePreset {
    Balanced,
    Harsh,
    Abundant,
    Chaos,
}

impl RulePreset {
    #[must_use]
    pub fn rules(self) -> RuleSet {
        let base = RuleSet::default();
        match self {
            RulePreset::Balanced => base,
            RulePreset::Harsh => RuleSet {
                energy_decay: 0.002,
                reproduction_cost: 70.0,
                mutation_chance: 0.15,
                resource_abundance: 0.6,
                ..base
            },
            RulePreset::Abundant => RuleSet {
                energy_decay: 0.0007,
                reproduction_cost: 40.0,
                trade_efficiency: 1.5,
                resource_abundance: 2.0,
                ..base
            },
            RulePreset::Chaos => RuleSet {
                gravity: 0.5,
                mutation_chance: 0.4,
                trade_efficiency: 2.5,
                enable_weather: true,
                ..base
            },
        }
    }
}

impl FromStr for RulePreset {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "balanced" => Ok(RulePreset::Balanced),
            "harsh" => Ok(RulePreset::Harsh),
            "abundant" => Ok(RulePreset::Abundant),
            "chaos" => Ok(RulePreset::Chaos),
            _ => Err(RuleError::UnknownRule(format!("preset {s}"))),
        }
    }
}

/// One entry of the append-only change history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleChange {
    pub key: RuleKey,
    pub old: RuleValue,
    pub new: RuleValue,
    pub tick: u64,
}

/// Values recomputed from statistics at the start of each tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedRules {
    pub population_pressure: f64,
    pub extinction_threat: f64,
    /// Multiplier on energy decay from the weather cycle.
    pub weather_factor: f64,
    /// Tick the values were computed for; `None` until the first update.
    #[serde(skip)]
    pub computed_at: Option<u64>,
}

impl Default for DerivedRules {
    fn default() -> Self {
        Self {
            population_pressure: 1.0,
            extinction_threat: 0.0,
            weather_factor: 1.0,
            computed_at: None,
        }
    }
}

impl DerivedRules {
    #[must_use]
    pub fn from_population(population: usize) -> Self {
        let pop = population as f64;
        Self {
            population_pressure: (pop / IDEAL_POPULATION).clamp(0.5, 2.0),
            extinction_threat: ((EXTINCTION_FLOOR - pop) / EXTINCTION_FLOOR).max(0.0),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_fresh(&self, tick: u64) -> bool {
        self.computed_at == Some(tick)
    }
}

/// Tick-driven weather oscillator. Returns the decay multiplier for `tick`.
#[must_use]
pub fn weather_factor(tick: u64) -> f64 {
    let phase = (std::f64::consts::TAU * (tick % WEATHER_PERIOD) as f64 / WEATHER_PERIOD as f64).sin();
    if phase > 0.5 {
        1.2
    } else if phase < -0.5 {
        0.9
    } else {
        1.0
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RulesEngine {
    rules: RuleSet,
    #[serde(skip)]
    derived: DerivedRules,
    history: Vec<RuleChange>,
}

impl RulesEngine {
    #[must_use]
    pub fn new(rules: RuleSet) -> Self {
        Self {
            rules,
            derived: DerivedRules::default(),
            history: Vec::new(),
        }
    }

    /// Rebuilds an engine from persisted rules and history.
    #[must_use]
    pub fn restore(rules: RuleSet, history: Vec<RuleChange>) -> Self {
        Self {
            rules,
            derived: DerivedRules::default(),
            history,
        }
    }

    #[must_use]
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    #[must_use]
    pub fn derived(&self) -> &DerivedRules {
        &self.derived
    }

    #[must_use]
    pub fn history(&self) -> &[RuleChange] {
        &self.history
    }

    /// The single write path for rule values.
    pub fn update_rule<E: EventSink>(
        &mut self,
        key: RuleKey,
        value: impl Into<RuleValue>,
        tick: u64,
        events: &mut E,
    ) -> Result<(), RuleError> {
        let new = value.into();
        let old = self.rules.set(key, new)?;
        if old == new {
            return Ok(());
        }
        self.history.push(RuleChange { key, old, new, tick });
        events.important(tick, format!("Rule {key} changed from {old} to {new}"));
        Ok(())
    }

    /// Applies every value of a preset through [`Self::update_rule`].
    /// Returns the number of rules that actually changed.
    pub fn apply_preset<E: EventSink>(
        &mut self,
        preset: RulePreset,
        tick: u64,
        events: &mut E,
    ) -> Result<usize, RuleError> {
        let target = preset.rules();
        let before = self.history.len();
        for key in RuleKey::ALL {
            self.update_rule(key, target.get(key), tick, events)?;
        }
        Ok(self.history.len() - before)
    }

    /// Recomputes population pressure, extinction threat and weather for `tick`.
    pub fn update_derived_rules(&mut self, stats: &PopulationStats, tick: u64) {
        let mut derived = DerivedRules::from_population(stats.population);
        derived.weather_factor = if self.rules.enable_weather {
            weather_factor(tick)
        } else {
            1.0
        };
        derived.computed_at = Some(tick);
        self.derived = derived;
    }

    /// Energy decay after the weather multiplier.
    #[must_use]
    pub fn effective_energy_decay(&self) -> f64 {
        self.rules.energy_decay * self.derived.weather_factor
    }

    /// Applies the global rules to one entity. Derived modifiers are skipped
    /// when they were not computed for `world.tick`.
    pub fn apply_rule_modifications(&self, entity: &mut Entity, world: &WorldContext) {
        if entity.is_dead || entity.kind.is_resource() {
            return;
        }

        entity.velocity.vy += self.rules.gravity * GRAVITY_NUDGE;

        let decay_ratio = self.effective_energy_decay() / DEFAULT_ENERGY_DECAY;
        entity.vitals.energy = (entity.vitals.energy - DECAY_NUDGE * decay_ratio).max(0.0);

        let mut aggression = entity.traits.aggression;
        let mut threshold = entity.vitals.base_reproduction_threshold;
        let mut max_speed = entity.drive.base_max_speed;

        if self.derived.is_fresh(world.tick) {
            let pressure = self.derived.population_pressure;
            if pressure > 1.5 {
                aggression = (aggression + CROWDING_AGGRESSION_BONUS).min(1.0);
                threshold *= 1.2;
            } else if pressure < 0.7 {
                threshold *= 0.9;
            }
            if self.derived.extinction_threat > 0.5 {
                threshold *= 0.7;
                max_speed *= 1.1;
            }
        } else {
            tracing::warn!(
                tick = world.tick,
                computed_at = ?self.derived.computed_at,
                "derived rules are stale; skipping population modifiers"
            );
        }

        if !self.rules.enable_predators && entity.kind == EntityKind::Carnivore {
            aggression *= 0.5;
        }

        entity.drive.aggression = aggression;
        entity.drive.max_speed = max_speed;
        entity.vitals.reproduction_threshold = threshold;
    }

    /// Number of recorded changes per rule.
    #[must_use]
    pub fn history_summary(&self) -> BTreeMap<RuleKey, usize> {
        let mut summary = BTreeMap::new();
        for change in &self.history {
            *summary.entry(change.key).or_insert(0) += 1;
        }
        summary
    }
}
