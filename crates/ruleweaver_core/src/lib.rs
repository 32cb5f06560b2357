//! # Ruleweaver Core
//!
//! The deterministic simulation logic for Ruleweaver, a tick-based ecosystem
//! of herbivores, carnivores, traders and resources shaped by tunable rules.
//!
//! This crate contains:
//! - Entity lifecycle (spawning, inheritance, restoration from saves)
//! - Per-entity behaviour: targeting, steering and interactions
//! - The [`manager::EntityManager`] owning the world's entity list
//! - The [`rules::RulesEngine`] with its validated rule set and derived values
//! - The [`objectives::ObjectiveManager`] scoring player-facing goals
//! - Configuration, event logging and metrics
//!
//! ## Example
//!
//! ```
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//! use ruleweaver_core::config::SimConfig;
//! use ruleweaver_core::events::NullSink;
//! use ruleweaver_core::manager::EntityManager;
//! use ruleweaver_core::rules::RulesEngine;
//! use ruleweaver_core::world::WorldContext;
//!
//! let config = SimConfig::default();
//! let mut rng = ChaCha8Rng::seed_from_u64(42);
//! let mut manager = EntityManager::new(
//!     config.world.bounds(),
//!     config.population.clone(),
//!     config.resources.clone(),
//! );
//! manager.initialize_world(&mut rng);
//!
//! let mut rules = RulesEngine::new(config.rules.clone());
//! rules.update_derived_rules(&manager.statistics(), 0);
//! let world = WorldContext::new(manager.bounds(), 0);
//! manager.update(&rules, &world, &mut rng, &mut NullSink);
//! assert!(manager.statistics().population > 0);
//! ```

/// Configuration management for simulation parameters
pub mod config;
/// Per-entity state transitions (decay, mood, survival)
pub mod entity;
/// Event sink and bounded event log
pub mod events;
/// Entity creation, inheritance and restoration
pub mod lifecycle;
/// Owner of the entity list
pub mod manager;
/// Tick timing metrics and structured logging setup
pub mod metrics;
/// Player-facing objectives and score
pub mod objectives;
/// Tunable rules, presets and derived values
pub mod rules;
/// Behaviour, interaction and statistics systems
pub mod systems;
/// Read-only world context handed to per-entity logic
pub mod world;

pub use entity::EntityLogic;
pub use events::{EventLog, EventSink, LoggedEvent, NullSink, Severity};
pub use manager::{EntityManager, TickSummary};
pub use metrics::{init_logging, TickMetrics};
pub use objectives::{ObjectiveManager, ObjectiveKind};
pub use rules::{RuleError, RuleKey, RulePreset, RuleSet, RuleValue, RulesEngine};
