//! # Ruleweaver Data
//!
//! Plain, serialisable data types shared by the simulation and persistence
//! crates. No behaviour lives here beyond small accessors; simulation logic is
//! attached through extension traits in `ruleweaver_core`.

pub mod data;

pub use data::entity::{
    Appearance, DeathCause, Drive, Entity, EntityId, EntityKind, EntityRecord, Mood, Position,
    Traits, Velocity, Vitals,
};
pub use data::stats::{LifetimeCounters, PopulationStats, TypeCounts};
pub use data::world::WorldBounds;
