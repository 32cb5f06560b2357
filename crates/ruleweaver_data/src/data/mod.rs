//! Core data structures for the Ruleweaver simulation.

pub mod entity;
pub mod stats;
pub mod world;
