pub mod behavior;
pub mod interaction;
pub mod stats;
