use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of an entity. Targets hold ids, never references.
pub type EntityId = Uuid;

/// The closed set of entity kinds living in the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Herbivore,
    Carnivore,
    Trader,
    Resource,
}

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Herbivore,
        EntityKind::Carnivore,
        EntityKind::Trader,
        EntityKind::Resource,
    ];

    /// Kinds that move, eat and reproduce.
    pub const LIVING: [EntityKind; 3] = [
        EntityKind::Herbivore,
        EntityKind::Carnivore,
        EntityKind::Trader,
    ];

    #[must_use]
    pub fn is_resource(self) -> bool {
        matches!(self, EntityKind::Resource)
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            EntityKind::Herbivore => "herbivore",
            EntityKind::Carnivore => "carnivore",
            EntityKind::Trader => "trader",
            EntityKind::Resource => "resource",
        }
    }

    /// Energy a freshly spawned entity of this kind starts with.
    #[must_use]
    pub fn initial_energy(self) -> f64 {
        match self {
            EntityKind::Herbivore => 100.0,
            EntityKind::Carnivore => 150.0,
            EntityKind::Trader => 120.0,
            EntityKind::Resource => 0.0,
        }
    }

    /// Ticks an entity of this kind may live.
    #[must_use]
    pub fn max_age(self) -> u64 {
        match self {
            EntityKind::Herbivore => 800,
            EntityKind::Carnivore => 1000,
            EntityKind::Trader => 900,
            EntityKind::Resource => 1500,
        }
    }

    #[must_use]
    pub fn base_speed(self) -> f64 {
        match self {
            EntityKind::Herbivore => 2.0,
            EntityKind::Carnivore => 2.5,
            EntityKind::Trader => 1.5,
            EntityKind::Resource => 0.0,
        }
    }

    #[must_use]
    pub fn render_size(self) -> f64 {
        match self {
            EntityKind::Herbivore => 6.0,
            EntityKind::Carnivore => 8.0,
            EntityKind::Trader => 7.0,
            EntityKind::Resource => 4.0,
        }
    }

    /// Base energy needed before an entity looks for a mate.
    #[must_use]
    pub fn base_reproduction_threshold(self) -> f64 {
        match self {
            EntityKind::Herbivore => 80.0,
            EntityKind::Carnivore => 120.0,
            EntityKind::Trader => 100.0,
            EntityKind::Resource => f64::MAX,
        }
    }

    #[must_use]
    pub fn base_color(self) -> (u8, u8, u8) {
        match self {
            EntityKind::Herbivore => (76, 175, 80),
            EntityKind::Carnivore => (229, 57, 53),
            EntityKind::Trader => (30, 136, 229),
            EntityKind::Resource => (205, 220, 57),
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// World position of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    #[must_use]
    pub fn distance_to(&self, other: &Position) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    #[must_use]
    pub fn midpoint(&self, other: &Position) -> Position {
        Position {
            x: (self.x + other.x) / 2.0,
            y: (self.y + other.y) / 2.0,
        }
    }
}

/// Velocity of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Velocity {
    pub vx: f64,
    pub vy: f64,
}

/// Heritable genetic traits, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Traits {
    pub efficiency: f64,
    pub aggression: f64,
    pub sociability: f64,
    pub adaptability: f64,
    pub size: f64,
}

impl Default for Traits {
    fn default() -> Self {
        Self {
            efficiency: 0.5,
            aggression: 0.5,
            sociability: 0.5,
            adaptability: 0.5,
            size: 0.5,
        }
    }
}

impl Traits {
    #[must_use]
    pub fn as_array(&self) -> [f64; 5] {
        [
            self.efficiency,
            self.aggression,
            self.sociability,
            self.adaptability,
            self.size,
        ]
    }

    #[must_use]
    pub fn from_array(values: [f64; 5]) -> Self {
        Self {
            efficiency: values[0],
            aggression: values[1],
            sociability: values[2],
            adaptability: values[3],
            size: values[4],
        }
    }

    /// Returns a copy with every trait clamped into `[0, 1]`.
    #[must_use]
    pub fn clamped(&self) -> Self {
        Self::from_array(self.as_array().map(|v| v.clamp(0.0, 1.0)))
    }

    #[must_use]
    pub fn in_bounds(&self) -> bool {
        self.as_array().iter().all(|v| (0.0..=1.0).contains(v))
    }
}

/// Energy, age and reproduction bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vitals {
    pub energy: f64,
    pub max_energy: f64,
    pub age: u64,
    pub max_age: u64,
    pub base_reproduction_threshold: f64,
    /// Effective threshold after rule modifiers for the current tick.
    pub reproduction_threshold: f64,
    /// Age at which the entity last reproduced.
    pub last_reproduction: u64,
}

/// Behaviour values derived from traits and rewritten by the rules engine every tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Drive {
    pub aggression: f64,
    pub base_max_speed: f64,
    pub max_speed: f64,
}

/// Display colour and rendered radius.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Appearance {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub size: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Hungry,
    Content,
    Aggressive,
    #[default]
    Neutral,
}

/// A single agent (or stationary resource) in the world.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    pub generation: u32,
    pub position: Position,
    pub velocity: Velocity,
    pub traits: Traits,
    pub vitals: Vitals,
    pub drive: Drive,
    pub appearance: Appearance,
    pub mood: Mood,
    pub target: Option<EntityId>,
    /// Remaining ticks of the post-mating window.
    pub reproducing_ticks: u32,
    pub is_dead: bool,
}

impl Entity {
    #[must_use]
    pub fn is_reproducing(&self) -> bool {
        self.reproducing_ticks > 0
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        !self.is_dead
    }

    #[must_use]
    pub fn radius(&self) -> f64 {
        self.appearance.size
    }
}

/// Reasons an entity leaves the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    Starvation,
    OldAge,
    Predation,
    Consumed,
}

/// The persisted subset of an entity. Display and rule-derived fields are
/// recomputed from `kind` and `traits` when the record is restored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityRecord {
    pub id: EntityId,
    pub x: f64,
    pub y: f64,
    #[serde(rename = "type")]
    pub kind: EntityKind,
    pub generation: u32,
    pub energy: f64,
    pub age: u64,
    pub traits: Traits,
    pub last_reproduction: u64,
}

impl From<&Entity> for EntityRecord {
    fn from(entity: &Entity) -> Self {
        Self {
            id: entity.id,
            x: entity.position.x,
            y: entity.position.y,
            kind: entity.kind,
            generation: entity.generation,
            energy: entity.vitals.energy,
            age: entity.vitals.age,
            traits: entity.traits,
            last_reproduction: entity.vitals.last_reproduction,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_uses_wire_names() {
        let record = EntityRecord {
            id: Uuid::nil(),
            x: 1.0,
            y: 2.0,
            kind: EntityKind::Carnivore,
            generation: 3,
            energy: 40.0,
            age: 12,
            traits: Traits::default(),
            last_reproduction: 5,
        };
        let json = serde_json::to_value(&record).expect("serialize record");
        assert_eq!(json["type"], "carnivore");
        assert_eq!(json["lastReproduction"], 5);
        let back: EntityRecord = serde_json::from_value(json).expect("deserialize record");
        assert_eq!(back, record);
    }

    #[test]
    fn test_traits_clamped() {
        let traits = Traits::from_array([1.4, -0.2, 0.5, 0.0, 1.0]).clamped();
        assert!(traits.in_bounds());
        assert_eq!(traits.efficiency, 1.0);
        assert_eq!(traits.aggression, 0.0);
    }
}
