//! Player-facing goals scored from live statistics.
//!
//! Objectives move one way, from active to completed. A completed objective is
//! frozen: its progress is never recomputed and its points are counted once.
//! Whenever fewer than `active_floor` objectives remain active, new ones are
//! synthesised from the current statistics, at most one per kind.

use crate::events::EventSink;
use ruleweaver_data::PopulationStats;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_ACTIVE_FLOOR: usize = 5;
/// Ticks per difficulty step in dynamic point scaling.
pub const DIFFICULTY_STEP: u64 = 1000;

/// Lifetime counter an objective of kind `Special` tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialMetric {
    Trades,
    Hunts,
    Births,
}

impl SpecialMetric {
    fn label(self) -> &'static str {
        match self {
            SpecialMetric::Trades => "trades",
            SpecialMetric::Hunts => "successful hunts",
            SpecialMetric::Births => "births",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectiveKind {
    Population,
    Energy,
    Survival,
    Evolution,
    Balance,
    Special(SpecialMetric),
}

impl ObjectiveKind {
    /// Order in which dynamic objectives are synthesised.
    /// Each special metric counts as its own kind.
    pub const GENERATION_ORDER: [ObjectiveKind; 8] = [
        ObjectiveKind::Population,
        ObjectiveKind::Energy,
        ObjectiveKind::Evolution,
        ObjectiveKind::Survival,
        ObjectiveKind::Balance,
        ObjectiveKind::Special(SpecialMetric::Trades),
        ObjectiveKind::Special(SpecialMetric::Hunts),
        ObjectiveKind::Special(SpecialMetric::Births),
    ];

    /// Points before difficulty scaling.
    #[must_use]
    pub fn base_points(self) -> u64 {
        match self {
            ObjectiveKind::Population => 100,
            ObjectiveKind::Energy => 150,
            ObjectiveKind::Survival => 200,
            ObjectiveKind::Evolution => 250,
            ObjectiveKind::Balance => 300,
            ObjectiveKind::Special(_) => 120,
        }
    }
}

impl fmt::Display for ObjectiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectiveKind::Population => f.write_str("population"),
            ObjectiveKind::Energy => f.write_str("energy"),
            ObjectiveKind::Survival => f.write_str("survival"),
            ObjectiveKind::Evolution => f.write_str("evolution"),
            ObjectiveKind::Balance => f.write_str("balance"),
            ObjectiveKind::Special(metric) => write!(f, "special ({})", metric.label()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    AtLeast,
    AtMost,
}

impl Condition {
    #[must_use]
    pub fn is_met(self, current: f64, target: f64) -> bool {
        match self {
            Condition::AtLeast => current >= target,
            Condition::AtMost => current <= target,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Objective {
    pub id: String,
    pub kind: ObjectiveKind,
    pub title: String,
    pub target: f64,
    pub current: f64,
    pub condition: Condition,
    /// Ticks the condition must hold without interruption.
    pub duration: Option<u64>,
    pub held_ticks: u64,
    pub completed: bool,
    pub completed_at: Option<u64>,
    pub points: u64,
    pub dynamic: bool,
}

impl Objective {
    fn new(id: impl Into<String>, kind: ObjectiveKind, title: impl Into<String>, target: f64, points: u64) -> Self {
        Self {
            id: id.into(),
            kind,
            title: title.into(),
            target,
            current: 0.0,
            condition: Condition::AtLeast,
            duration: None,
            held_ticks: 0,
            completed: false,
            completed_at: None,
            points,
            dynamic: false,
        }
    }

    fn held_for(mut self, ticks: u64) -> Self {
        self.duration = Some(ticks);
        self
    }

    /// Progress towards the target in `[0, 1]`.
    #[must_use]
    pub fn progress(&self) -> f64 {
        if self.completed {
            return 1.0;
        }
        let value = match self.condition {
            Condition::AtLeast if self.target > 0.0 => self.current / self.target,
            Condition::AtLeast => 1.0,
            Condition::AtMost if self.current > 0.0 => self.target / self.current,
            Condition::AtMost => 1.0,
        };
        let value = value.clamp(0.0, 1.0);
        match self.duration {
            Some(d) if d > 0 && value >= 1.0 => self.held_ticks as f64 / d as f64,
            _ => value,
        }
        .clamp(0.0, 1.0)
    }
}

/// Entry of the completion history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRecord {
    pub objective_id: String,
    pub title: String,
    pub tick: u64,
    pub points: u64,
}

/// The five objectives every new world starts with.
#[must_use]
pub fn default_objectives() -> Vec<Objective> {
    vec![
        Objective::new(
            "thriving_population",
            ObjectiveKind::Population,
            "Sustain a population of 100 for 50 ticks",
            100.0,
            100,
        )
        .held_for(50),
        Objective::new(
            "energy_reserve",
            ObjectiveKind::Energy,
            "Accumulate 10000 total energy",
            10_000.0,
            150,
        ),
        Objective::new(
            "long_survival",
            ObjectiveKind::Survival,
            "Survive 500 ticks without extinction",
            500.0,
            200,
        ),
        Objective::new(
            "tenth_generation",
            ObjectiveKind::Evolution,
            "Reach generation 10",
            10.0,
            250,
        ),
        Objective::new(
            "balanced_ecosystem",
            ObjectiveKind::Balance,
            "Keep all four entity types alive for 100 ticks",
            100.0,
            300,
        ),
    ]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectiveManager {
    objectives: Vec<Objective>,
    score: u64,
    history: Vec<CompletionRecord>,
    /// Consecutive ticks with a live population.
    survival_ticks: u64,
    /// Consecutive ticks with every entity type present.
    balance_ticks: u64,
    active_floor: usize,
    next_dynamic_id: u64,
}

impl Default for ObjectiveManager {
    fn default() -> Self {
        Self::new(DEFAULT_ACTIVE_FLOOR)
    }
}

impl ObjectiveManager {
    #[must_use]
    pub fn new(active_floor: usize) -> Self {
        Self {
            objectives: default_objectives(),
            score: 0,
            history: Vec::new(),
            survival_ticks: 0,
            balance_ticks: 0,
            active_floor,
            next_dynamic_id: 1,
        }
    }

    fn measure(&self, kind: ObjectiveKind, stats: &PopulationStats) -> f64 {
        match kind {
            ObjectiveKind::Population => stats.population as f64,
            ObjectiveKind::Energy => stats.total_energy,
            ObjectiveKind::Survival => self.survival_ticks as f64,
            ObjectiveKind::Evolution => f64::from(stats.max_generation),
            ObjectiveKind::Balance => self.balance_ticks as f64,
            ObjectiveKind::Special(SpecialMetric::Trades) => stats.lifetime.trades as f64,
            ObjectiveKind::Special(SpecialMetric::Hunts) => stats.lifetime.hunts as f64,
            ObjectiveKind::Special(SpecialMetric::Births) => stats.lifetime.births as f64,
        }
    }

    /// Advances counters, evaluates every active objective and tops the
    /// active set back up. Returns the ids completed this tick.
    pub fn update<E: EventSink>(&mut self, stats: &PopulationStats, tick: u64, events: &mut E) -> Vec<String> {
        if stats.population > 0 {
            self.survival_ticks += 1;
        } else {
            self.survival_ticks = 0;
        }
        if stats.counts.all_present() {
            self.balance_ticks += 1;
        } else {
            self.balance_ticks = 0;
        }

        let mut completed_now = Vec::new();
        for i in 0..self.objectives.len() {
            if self.objectives[i].completed {
                continue;
            }
            let current = self.measure(self.objectives[i].kind, stats);
            let objective = &mut self.objectives[i];
            objective.current = current;

            let met = objective.condition.is_met(current, objective.target);
            let done = match objective.duration {
                Some(duration) => {
                    if met {
                        objective.held_ticks += 1;
                    } else {
                        objective.held_ticks = 0;
                    }
                    objective.held_ticks >= duration
                }
                None => met,
            };
            if !done {
                continue;
            }

            objective.completed = true;
            objective.completed_at = Some(tick);
            self.score += objective.points;
            self.history.push(CompletionRecord {
                objective_id: objective.id.clone(),
                title: objective.title.clone(),
                tick,
                points: objective.points,
            });
            events.success(
                tick,
                format!("Objective complete: {} (+{} points)", objective.title, objective.points),
            );
            tracing::info!(tick, id = %objective.id, points = objective.points, "objective completed");
            completed_now.push(objective.id.clone());
        }

        self.generate_objectives(stats, tick, events);
        completed_now
    }

    fn generate_objectives<E: EventSink>(&mut self, stats: &PopulationStats, tick: u64, events: &mut E) {
        let multiplier = tick / DIFFICULTY_STEP + 1;
        for kind in ObjectiveKind::GENERATION_ORDER {
            if self.active().count() >= self.active_floor {
                break;
            }
            if self.active().any(|o| o.kind == kind) {
                continue;
            }
            let objective = self.synthesize(kind, stats, multiplier);
            events.normal(tick, format!("New objective: {}", objective.title));
            tracing::debug!(tick, id = %objective.id, target = objective.target, "objective generated");
            self.objectives.push(objective);
        }
    }

    fn synthesize(&mut self, kind: ObjectiveKind, stats: &PopulationStats, multiplier: u64) -> Objective {
        let (target, title) = match kind {
            ObjectiveKind::Population => {
                let target = stats.population as f64 + 50.0;
                (target, format!("Reach a population of {target}"))
            }
            ObjectiveKind::Energy => {
                let target = ((stats.total_energy * 1.5 / 1000.0).round() * 1000.0).max(1000.0);
                (target, format!("Accumulate {target} total energy"))
            }
            ObjectiveKind::Evolution => {
                let target = f64::from(stats.max_generation) + 5.0;
                (target, format!("Reach generation {target}"))
            }
            ObjectiveKind::Survival => {
                let target = self.survival_ticks as f64 + 500.0;
                (target, format!("Survive until {target} consecutive ticks"))
            }
            ObjectiveKind::Balance => {
                let target = self.balance_ticks as f64 + 200.0;
                (target, format!("Keep all four types alive for {target} ticks"))
            }
            ObjectiveKind::Special(metric) => {
                let target = self.measure(kind, stats) + 25.0;
                (target, format!("Reach {target} {}", metric.label()))
            }
        };
        let id = format!("dynamic-{}", self.next_dynamic_id);
        self.next_dynamic_id += 1;
        let mut objective = Objective::new(id, kind, title, target, kind.base_points() * multiplier);
        objective.dynamic = true;
        objective
    }

    #[must_use]
    pub fn score(&self) -> u64 {
        self.score
    }

    #[must_use]
    pub fn objectives(&self) -> &[Objective] {
        &self.objectives
    }

    pub fn active(&self) -> impl Iterator<Item = &Objective> {
        self.objectives.iter().filter(|o| !o.completed)
    }

    pub fn completed(&self) -> impl Iterator<Item = &Objective> {
        self.objectives.iter().filter(|o| o.completed)
    }

    #[must_use]
    pub fn history(&self) -> &[CompletionRecord] {
        &self.history
    }

    #[must_use]
    pub fn survival_ticks(&self) -> u64 {
        self.survival_ticks
    }

    #[must_use]
    pub fn balance_ticks(&self) -> u64 {
        self.balance_ticks
    }

    #[must_use]
    pub fn active_floor(&self) -> usize {
        self.active_floor
    }
}
