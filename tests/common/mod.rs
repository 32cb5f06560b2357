pub mod macros;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use ruleweaver_core::config::SimConfig;
use ruleweaver_core::lifecycle::{create_entity_with_rng, create_entity_with_traits};
use ruleweaver_core::rules::{RuleKey, RuleValue};
use ruleweaver_data::{Entity, EntityKind, LifetimeCounters, Position, Traits};
use ruleweaver_lib::Simulation;
use uuid::Uuid;

/// Builds a [`Simulation`] whose world holds only the entities the test
/// adds. The configured starting population is still used by `reseed`.
#[allow(dead_code)]
pub struct WorldBuilder {
    config: SimConfig,
    keep_population: bool,
    entities: Vec<Entity>,
    rules: Vec<(RuleKey, RuleValue)>,
    rng: ChaCha8Rng,
}

#[allow(dead_code)]
impl WorldBuilder {
    pub fn new() -> Self {
        let mut config = SimConfig::default();
        config.world.seed = Some(0);
        config.world.tick_millis = 0;
        Self {
            config,
            keep_population: false,
            entities: Vec::new(),
            rules: Vec::new(),
            rng: ChaCha8Rng::seed_from_u64(0),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.world.seed = Some(seed);
        self.rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(1));
        self
    }

    pub fn with_config<F>(mut self, modifier: F) -> Self
    where
        F: FnOnce(&mut SimConfig),
    {
        modifier(&mut self.config);
        self
    }

    /// Uses the stock starting population instead of an empty world.
    pub fn with_default_population(mut self) -> Self {
        self.keep_population = true;
        self
    }

    pub fn with_rule(mut self, key: RuleKey, value: impl Into<RuleValue>) -> Self {
        self.rules.push((key, value.into()));
        self
    }

    pub fn with_entity(mut self, entity: Entity) -> Self {
        self.entities.push(entity);
        self
    }

    /// Adds `count` entities of `kind` with random traits and positions.
    pub fn with_random(mut self, kind: EntityKind, count: usize) -> Self {
        let bounds = self.config.world.bounds();
        for _ in 0..count {
            let entity = create_entity_with_rng(kind, &bounds, &mut self.rng);
            self.entities.push(entity);
        }
        self
    }

    pub fn build(self) -> Simulation {
        let respawn_interval = self.config.resources.respawn_interval;
        let mut sim = Simulation::new(self.config).expect("Failed to create simulation");
        if !self.keep_population {
            sim.entities_mut()
                .restore(Vec::new(), LifetimeCounters::default(), respawn_interval);
        }
        for (key, value) in self.rules {
            sim.update_rule(key, value).expect("Failed to set rule");
        }
        for entity in self.entities {
            sim.entities_mut().insert(entity);
        }
        sim
    }
}

impl Default for WorldBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// An entity with uniform traits placed at `(x, y)`.
#[allow(dead_code)]
pub fn entity_at(kind: EntityKind, x: f64, y: f64, trait_value: f64) -> Entity {
    let traits = Traits {
        efficiency: trait_value,
        aggression: trait_value,
        sociability: trait_value,
        adaptability: trait_value,
        size: trait_value,
    };
    create_entity_with_traits(kind, Position { x, y }, traits, Uuid::new_v4())
}
