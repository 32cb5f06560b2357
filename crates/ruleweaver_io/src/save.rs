//! The versioned save-file format.
//!
//! A save is a single JSON document:
//!
//! ```json
//! { "version": 1, "timestamp": 1700000000000, "tick": 420,
//!   "world": { "width": 800.0, "height": 600.0, "entities": [ ... ] },
//!   "rules": { "gravity": 0.1, ..., "history": [ ... ] },
//!   "objectives": { ... }, "eventLog": [ ... ] }
//! ```
//!
//! Entities are stored as [`EntityRecord`]s; appearance, speeds and
//! thresholds are recomputed from kind and traits on load.

use crate::error::{IoError, Result};
use crate::serialization::{from_json, to_json};
use crate::store::SaveStore;
use ruleweaver_core::events::{EventLog, LoggedEvent};
use ruleweaver_core::lifecycle::restore_entity;
use ruleweaver_core::manager::EntityManager;
use ruleweaver_core::objectives::ObjectiveManager;
use ruleweaver_core::rules::{RuleChange, RuleSet, RulesEngine};
use ruleweaver_data::{Entity, EntityRecord, LifetimeCounters, WorldBounds};
use serde::{Deserialize, Serialize};

pub const SAVE_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldState {
    pub width: f64,
    pub height: f64,
    pub entities: Vec<EntityRecord>,
    #[serde(default)]
    pub lifetime: LifetimeCounters,
    #[serde(default)]
    pub respawn_countdown: Option<u64>,
}

impl WorldState {
    /// Captures the live entities of `manager`.
    #[must_use]
    pub fn capture(manager: &EntityManager) -> Self {
        let bounds = manager.bounds();
        Self {
            width: bounds.width,
            height: bounds.height,
            entities: manager.live().map(EntityRecord::from).collect(),
            lifetime: manager.lifetime(),
            respawn_countdown: Some(manager.respawn_countdown()),
        }
    }

    #[must_use]
    pub fn bounds(&self) -> WorldBounds {
        WorldBounds::new(self.width, self.height)
    }

    /// Rebuilds live entities, clamped into the saved bounds.
    #[must_use]
    pub fn restore_entities(&self) -> Vec<Entity> {
        let bounds = self.bounds();
        self.entities
            .iter()
            .map(|record| {
                let mut entity = restore_entity(record);
                entity.position = bounds.clamp(entity.position);
                entity
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RulesState {
    #[serde(flatten)]
    pub values: RuleSet,
    #[serde(default)]
    pub history: Vec<RuleChange>,
}

impl RulesState {
    #[must_use]
    pub fn capture(engine: &RulesEngine) -> Self {
        Self {
            values: engine.rules().clone(),
            history: engine.history().to_vec(),
        }
    }

    /// Rebuilds the engine after checking every value is in range.
    pub fn restore(&self) -> Result<RulesEngine> {
        self.values
            .validate()
            .map_err(|e| IoError::validation(format!("saved rules rejected: {e}")))?;
        Ok(RulesEngine::restore(self.values.clone(), self.history.clone()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveState {
    pub version: u32,
    /// Unix milliseconds at capture time.
    pub timestamp: i64,
    pub tick: u64,
    pub world: WorldState,
    pub rules: RulesState,
    pub objectives: ObjectiveManager,
    pub event_log: Vec<LoggedEvent>,
    /// Fingerprint of the configuration the run was started with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_fingerprint: Option<String>,
}

#[derive(Deserialize)]
struct VersionProbe {
    version: u32,
}

impl SaveState {
    #[must_use]
    pub fn capture(
        tick: u64,
        manager: &EntityManager,
        rules: &RulesEngine,
        objectives: &ObjectiveManager,
        events: &EventLog,
    ) -> Self {
        Self {
            version: SAVE_VERSION,
            timestamp: chrono::Utc::now().timestamp_millis(),
            tick,
            world: WorldState::capture(manager),
            rules: RulesState::capture(rules),
            objectives: objectives.clone(),
            event_log: events.to_vec(),
            config_fingerprint: None,
        }
    }

    #[must_use]
    pub fn with_fingerprint(mut self, fingerprint: impl Into<String>) -> Self {
        self.config_fingerprint = Some(fingerprint.into());
        self
    }

    pub fn encode(&self) -> Result<String> {
        to_json(self)
    }

    /// Parses and validates a save document.
    pub fn decode(json: &str) -> Result<Self> {
        let probe: VersionProbe = from_json(json)?;
        if probe.version != SAVE_VERSION {
            return Err(IoError::validation(format!(
                "unsupported save version {} (expected {})",
                probe.version, SAVE_VERSION
            )));
        }
        let state: SaveState = from_json(json)?;
        state.validate()?;
        Ok(state)
    }

    fn validate(&self) -> Result<()> {
        let w = &self.world;
        if !(w.width.is_finite() && w.width > 0.0 && w.height.is_finite() && w.height > 0.0) {
            return Err(IoError::validation(format!(
                "invalid world size {}x{}",
                w.width, w.height
            )));
        }
        if let Some(record) = w
            .entities
            .iter()
            .find(|r| !(r.x.is_finite() && r.y.is_finite() && r.energy.is_finite()))
        {
            return Err(IoError::validation(format!(
                "entity {} has non-finite state",
                record.id
            )));
        }
        self.rules
            .values
            .validate()
            .map_err(|e| IoError::validation(format!("saved rules rejected: {e}")))?;
        Ok(())
    }

    /// Rebuilds the event log, keeping the newest `capacity` entries.
    #[must_use]
    pub fn event_log(&self, capacity: usize) -> EventLog {
        EventLog::from_entries(self.event_log.clone(), capacity)
    }
}

/// Encodes `state` and writes it to `slot`.
pub fn save_to<S: SaveStore + ?Sized>(store: &mut S, slot: &str, state: &SaveState) -> Result<()> {
    let json = state.encode()?;
    store.write(slot, &json)?;
    tracing::info!(slot, tick = state.tick, entities = state.world.entities.len(), "game saved");
    Ok(())
}

/// Reads and decodes the save in `slot`.
pub fn load_from<S: SaveStore + ?Sized>(store: &S, slot: &str) -> Result<SaveState> {
    let json = store
        .read(slot)?
        .ok_or_else(|| IoError::not_found(format!("save slot {slot}")))?;
    let state = SaveState::decode(&json).map_err(|e| e.with_context(format!("loading slot {slot}")))?;
    tracing::info!(slot, tick = state.tick, entities = state.world.entities.len(), "game loaded");
    Ok(state)
}
