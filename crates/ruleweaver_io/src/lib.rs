//! # Ruleweaver IO
//!
//! Persistence layer for the Ruleweaver simulation.
//!
//! This crate provides:
//! - Structured error handling with [`IoError`]
//! - JSON serialization helpers
//! - The versioned save-file format
//! - Save-slot stores backed by files (plain or gzip) or memory

/// Error types and result aliases for I/O operations
pub mod error;
/// Versioned save-file format and capture/restore helpers
pub mod save;
/// Validated JSON serialization helpers
pub mod serialization;
/// Save-slot stores
pub mod store;

pub use error::{IoError, Result};
pub use save::{load_from, save_to, SaveState, SAVE_VERSION};
pub use serialization::{from_json, to_json, to_json_pretty};
pub use store::{FileStore, MemoryStore, SaveStore};
