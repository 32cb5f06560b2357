use ruleweaver_data::{
    Appearance, Drive, Entity, EntityId, EntityKind, EntityRecord, Mood, Position, Traits,
    Velocity, Vitals, WorldBounds,
};
use rand::Rng;
use uuid::Uuid;

/// Ticks that must pass between two reproductions of the same entity.
pub const MATE_COOLDOWN: u64 = 50;
/// Ticks an entity stays flagged as reproducing after mating.
pub const REPRODUCING_WINDOW: u32 = 3;
/// Maximum offset of a newborn from its parents' midpoint.
pub const OFFSPRING_JITTER: f64 = 20.0;
pub const BASE_SIGHT_RANGE: f64 = 150.0;

#[must_use]
pub fn new_id<R: Rng>(rng: &mut R) -> EntityId {
    Uuid::from_u128(rng.gen::<u128>())
}

#[must_use]
pub fn random_traits<R: Rng>(rng: &mut R) -> Traits {
    Traits {
        efficiency: rng.gen_range(0.0..=1.0),
        aggression: rng.gen_range(0.0..=1.0),
        sociability: rng.gen_range(0.0..=1.0),
        adaptability: rng.gen_range(0.0..=1.0),
        size: rng.gen_range(0.0..=1.0),
    }
}

#[must_use]
pub fn max_speed_for(kind: EntityKind, traits: &Traits) -> f64 {
    kind.base_speed() * (0.5 + traits.efficiency)
}

#[must_use]
pub fn reproduction_threshold_for(kind: EntityKind, traits: &Traits) -> f64 {
    match kind {
        EntityKind::Resource => kind.base_reproduction_threshold(),
        _ => kind.base_reproduction_threshold() * (1.2 - 0.4 * traits.efficiency),
    }
}

#[must_use]
pub fn sight_range_for(traits: &Traits) -> f64 {
    BASE_SIGHT_RANGE * (0.75 + 0.5 * traits.adaptability)
}

fn shade(channel: u8, factor: f64) -> u8 {
    (f64::from(channel) * factor).round().clamp(0.0, 255.0) as u8
}

/// Colour and rendered radius from kind and traits.
#[must_use]
pub fn derive_appearance(kind: EntityKind, traits: &Traits) -> Appearance {
    let (r, g, b) = kind.base_color();
    let brightness = 0.7 + 0.6 * traits.efficiency;
    let (r, g, b) = match kind {
        EntityKind::Carnivore => (
            shade(r, 0.8 + 0.4 * traits.aggression),
            shade(g, brightness),
            shade(b, brightness),
        ),
        EntityKind::Trader => (
            shade(r, brightness),
            shade(g, brightness),
            shade(b, 0.8 + 0.4 * traits.sociability),
        ),
        EntityKind::Herbivore | EntityKind::Resource => {
            (shade(r, brightness), shade(g, brightness), shade(b, brightness))
        }
    };
    Appearance {
        r,
        g,
        b,
        size: kind.render_size() * (0.7 + 0.6 * traits.size),
    }
}

/// Builds a generation-1 entity with the kind's starting energy.
#[must_use]
pub fn create_entity_with_traits(
    kind: EntityKind,
    position: Position,
    traits: Traits,
    id: EntityId,
) -> Entity {
    let traits = traits.clamped();
    let initial_energy = kind.initial_energy();
    let threshold = reproduction_threshold_for(kind, &traits);
    let max_speed = max_speed_for(kind, &traits);
    Entity {
        id,
        kind,
        generation: 1,
        position,
        velocity: Velocity::default(),
        traits,
        vitals: Vitals {
            energy: initial_energy,
            max_energy: initial_energy * 2.0,
            age: 0,
            max_age: kind.max_age(),
            base_reproduction_threshold: threshold,
            reproduction_threshold: threshold,
            last_reproduction: 0,
        },
        drive: Drive {
            aggression: traits.aggression,
            base_max_speed: max_speed,
            max_speed,
        },
        appearance: derive_appearance(kind, &traits),
        mood: Mood::Neutral,
        target: None,
        reproducing_ticks: 0,
        is_dead: false,
    }
}

/// Spawns an entity with random traits at a random position inside `bounds`.
#[must_use]
pub fn create_entity_with_rng<R: Rng>(kind: EntityKind, bounds: &WorldBounds, rng: &mut R) -> Entity {
    let position = Position {
        x: rng.gen_range(0.0..=bounds.width),
        y: rng.gen_range(0.0..=bounds.height),
    };
    let traits = random_traits(rng);
    let id = new_id(rng);
    create_entity_with_traits(kind, position, traits, id)
}

/// Averages the parents' traits and perturbs each by up to `±mutation_chance`.
#[must_use]
pub fn inherit_traits<R: Rng>(a: &Traits, b: &Traits, mutation_chance: f64, rng: &mut R) -> Traits {
    let spread = mutation_chance.abs();
    let (a, b) = (a.as_array(), b.as_array());
    let mut child = [0.0; 5];
    for (i, value) in child.iter_mut().enumerate() {
        let mutation = rng.gen_range(-spread..=spread);
        *value = ((a[i] + b[i]) / 2.0 + mutation).clamp(0.0, 1.0);
    }
    Traits::from_array(child)
}

/// Creates the offspring of two parents near their midpoint.
#[must_use]
pub fn create_offspring<R: Rng>(
    a: &Entity,
    b: &Entity,
    mutation_chance: f64,
    bounds: &WorldBounds,
    rng: &mut R,
) -> Entity {
    let mid = a.position.midpoint(&b.position);
    let position = bounds.clamp(Position {
        x: mid.x + rng.gen_range(-OFFSPRING_JITTER..=OFFSPRING_JITTER),
        y: mid.y + rng.gen_range(-OFFSPRING_JITTER..=OFFSPRING_JITTER),
    });
    let traits = inherit_traits(&a.traits, &b.traits, mutation_chance, rng);
    let id = new_id(rng);
    let mut child = create_entity_with_traits(a.kind, position, traits, id);
    child.generation = a.generation.max(b.generation) + 1;
    child
}

/// Rebuilds a live entity from its persisted record, recomputing every
/// derived field from kind and traits.
#[must_use]
pub fn restore_entity(record: &EntityRecord) -> Entity {
    let mut entity = create_entity_with_traits(
        record.kind,
        Position {
            x: record.x,
            y: record.y,
        },
        record.traits,
        record.id,
    );
    entity.generation = record.generation.max(1);
    entity.vitals.energy = record.energy.clamp(0.0, entity.vitals.max_energy);
    entity.vitals.age = record.age.min(entity.vitals.max_age);
    entity.vitals.last_reproduction = record.last_reproduction.min(entity.vitals.age);
    entity
}
