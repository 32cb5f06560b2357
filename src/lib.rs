//! # Ruleweaver
//!
//! A small artificial-life sandbox: herbivores, carnivores and traders roam a
//! bounded world, eat resources, hunt, trade and reproduce with inherited,
//! mutated traits. A set of global rules can be tuned at runtime and a
//! scoring layer tracks player objectives.
//!
//! The building blocks live in the workspace crates:
//!
//! - `ruleweaver_data`: plain serialisable types
//! - `ruleweaver_core`: entity behaviour, rules, objectives and the manager
//! - `ruleweaver_io`: save slots and the save-file format
//!
//! This crate ties them together in [`Simulation`].
//!
//! ```no_run
//! use ruleweaver_lib::{SimConfig, Simulation};
//!
//! let mut sim = Simulation::new(SimConfig::default())?;
//! sim.run(100);
//! println!("score after 100 ticks: {}", sim.score());
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod simulation;

pub use ruleweaver_core::config::SimConfig;
pub use simulation::{RunState, Simulation, TickReport};
