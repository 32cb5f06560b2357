//! Owner of the entity list.
//!
//! The manager is the only component that adds or removes entities. Within a
//! tick, entities are updated in list order and interactions take effect
//! immediately; newborns are appended and dead entities swept once every
//! entity has had its turn.

use crate::config::{PopulationConfig, ResourceConfig};
use crate::entity::EntityLogic;
use crate::events::EventSink;
use crate::lifecycle::create_entity_with_rng;
use crate::rules::RulesEngine;
use crate::systems::behavior::update_entity;
use crate::systems::interaction::InteractionOutcome;
use crate::systems::stats::compute_statistics;
use crate::world::WorldContext;
use rand::Rng;
use ruleweaver_data::{
    DeathCause, Entity, EntityId, EntityKind, LifetimeCounters, PopulationStats, TypeCounts,
    WorldBounds,
};

/// What happened during one [`EntityManager::update`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickSummary {
    pub births: usize,
    pub deaths: usize,
    pub hunts: usize,
    pub trades: usize,
    pub resources_consumed: usize,
    pub resources_spawned: usize,
    /// Living kinds whose last member died this tick.
    pub extinct_kinds: Vec<EntityKind>,
}

#[derive(Debug, Clone)]
pub struct EntityManager {
    entities: Vec<Entity>,
    bounds: WorldBounds,
    population: PopulationConfig,
    resources: ResourceConfig,
    respawn_countdown: u64,
    lifetime: LifetimeCounters,
    last_counts: TypeCounts,
}

impl EntityManager {
    #[must_use]
    pub fn new(bounds: WorldBounds, population: PopulationConfig, resources: ResourceConfig) -> Self {
        let respawn_countdown = resources.respawn_interval;
        Self {
            entities: Vec::new(),
            bounds,
            population,
            resources,
            respawn_countdown,
            lifetime: LifetimeCounters::default(),
            last_counts: TypeCounts::default(),
        }
    }

    /// Replaces the world with a freshly spawned starting population.
    pub fn initialize_world<R: Rng>(&mut self, rng: &mut R) {
        self.entities.clear();
        self.lifetime = LifetimeCounters::default();
        self.respawn_countdown = self.resources.respawn_interval;
        for kind in EntityKind::ALL {
            for _ in 0..self.population.count(kind) {
                self.spawn(kind, rng);
            }
        }
        self.last_counts = self.counts();
        tracing::info!(
            entities = self.entities.len(),
            width = self.bounds.width,
            height = self.bounds.height,
            "world initialized"
        );
    }

    /// Spawns the starting living population again without touching
    /// resources or lifetime counters. Used to recover from extinction.
    pub fn reseed<R: Rng>(&mut self, rng: &mut R) -> usize {
        let mut spawned = 0;
        for kind in EntityKind::LIVING {
            for _ in 0..self.population.count(kind) {
                self.spawn(kind, rng);
                spawned += 1;
            }
        }
        self.last_counts = self.counts();
        tracing::info!(spawned, "world reseeded");
        spawned
    }

    /// Spawns one entity of `kind` at a random position.
    pub fn spawn<R: Rng>(&mut self, kind: EntityKind, rng: &mut R) -> EntityId {
        let entity = create_entity_with_rng(kind, &self.bounds, rng);
        self.insert(entity)
    }

    /// Adds an already built entity, clamping it into the world.
    pub fn insert(&mut self, mut entity: Entity) -> EntityId {
        entity.position = self.bounds.clamp(entity.position);
        if entity.is_alive() {
            self.last_counts.increment(entity.kind);
        }
        let id = entity.id;
        self.entities.push(entity);
        id
    }

    /// Replaces all state with restored entities and counters.
    pub fn restore(&mut self, entities: Vec<Entity>, lifetime: LifetimeCounters, respawn_countdown: u64) {
        self.entities = entities;
        self.lifetime = lifetime;
        self.respawn_countdown = respawn_countdown.clamp(1, self.resources.respawn_interval.max(1));
        self.last_counts = self.counts();
    }

    /// Runs one tick over every entity, then sweeps, adds newborns and
    /// respawns resources.
    pub fn update<R: Rng, E: EventSink>(
        &mut self,
        rules: &RulesEngine,
        world: &WorldContext,
        rng: &mut R,
        events: &mut E,
    ) -> TickSummary {
        let mut summary = TickSummary::default();
        let mut newborns = Vec::new();

        for idx in 0..self.entities.len() {
            if self.entities[idx].is_dead {
                continue;
            }
            let update = update_entity(&mut self.entities, idx, rules, world, rng);
            match update.interaction {
                Some(InteractionOutcome::Reproduced(child)) => newborns.push(*child),
                Some(InteractionOutcome::HuntSucceeded { gained }) => {
                    summary.hunts += 1;
                    tracing::debug!(tick = world.tick, gained, "hunt succeeded");
                }
                Some(InteractionOutcome::Traded { given, received }) => {
                    summary.trades += 1;
                    tracing::debug!(tick = world.tick, given, received, "trade");
                }
                Some(InteractionOutcome::Consumed { .. }) => summary.resources_consumed += 1,
                _ => {}
            }
            for (id, kind, cause) in update.deaths {
                if kind.is_resource() {
                    continue;
                }
                summary.deaths += 1;
                tracing::debug!(tick = world.tick, %id, %kind, ?cause, "entity died");
                if cause == DeathCause::Predation {
                    events.normal(world.tick, format!("A {kind} was hunted down"));
                }
            }
        }

        self.sweep_dead();
        // Windows close at the end of the tick, whatever the list order.
        for entity in &mut self.entities {
            entity.wind_down_reproduction();
        }

        for child in newborns {
            events.normal(
                world.tick,
                format!("A {} was born (generation {})", child.kind, child.generation),
            );
            self.insert(child);
            summary.births += 1;
        }

        summary.resources_spawned = self.respawn_resources(rules, rng);

        self.lifetime.births += summary.births as u64;
        self.lifetime.deaths += summary.deaths as u64;
        self.lifetime.hunts += summary.hunts as u64;
        self.lifetime.trades += summary.trades as u64;

        let counts = self.counts();
        for kind in EntityKind::LIVING {
            if self.last_counts.get(kind) > 0 && counts.get(kind) == 0 {
                events.important(world.tick, format!("The last {kind} has died out"));
                summary.extinct_kinds.push(kind);
            }
        }
        self.last_counts = counts;

        summary
    }

    fn respawn_resources<R: Rng>(&mut self, rules: &RulesEngine, rng: &mut R) -> usize {
        self.respawn_countdown = self.respawn_countdown.saturating_sub(1);
        if self.respawn_countdown > 0 {
            return 0;
        }
        self.respawn_countdown = self.resources.respawn_interval;

        let live_resources = self.live().filter(|e| e.kind.is_resource()).count();
        if live_resources >= self.resources.max_resources {
            return 0;
        }
        let batch = (self.resources.respawn_batch as f64 * rules.rules().resource_abundance).floor() as usize;
        for _ in 0..batch {
            self.spawn(EntityKind::Resource, rng);
        }
        batch
    }

    /// Removes every dead entity in one pass. Returns how many were removed.
    pub fn sweep_dead(&mut self) -> usize {
        let before = self.entities.len();
        self.entities.retain(|e| !e.is_dead);
        before - self.entities.len()
    }

    /// Fresh statistics over the live entities.
    #[must_use]
    pub fn statistics(&self) -> PopulationStats {
        compute_statistics(&self.entities, self.lifetime)
    }

    fn counts(&self) -> TypeCounts {
        let mut counts = TypeCounts::default();
        for e in self.live() {
            counts.increment(e.kind);
        }
        counts
    }

    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id == id)
    }

    pub fn live(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(|e| !e.is_dead)
    }

    pub fn live_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.iter_mut().filter(|e| !e.is_dead)
    }

    #[must_use]
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Live non-resource entities.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.live().filter(|e| !e.kind.is_resource()).count()
    }

    #[must_use]
    pub fn bounds(&self) -> WorldBounds {
        self.bounds
    }

    #[must_use]
    pub fn lifetime(&self) -> LifetimeCounters {
        self.lifetime
    }

    #[must_use]
    pub fn respawn_countdown(&self) -> u64 {
        self.respawn_countdown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{EventLog, NullSink, Severity};
    use crate::lifecycle::{create_entity_with_traits, REPRODUCING_WINDOW};
    use crate::rules::RuleSet;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use ruleweaver_data::{Position, Traits};
    use uuid::Uuid;

    fn empty_population() -> PopulationConfig {
        PopulationConfig {
            herbivores: 0,
            carnivores: 0,
            traders: 0,
            resources: 0,
        }
    }

    fn manager(population: PopulationConfig) -> EntityManager {
        EntityManager::new(WorldBounds::default(), population, ResourceConfig::default())
    }

    fn tick(
        manager: &mut EntityManager,
        rules: &mut RulesEngine,
        tick: u64,
        rng: &mut ChaCha8Rng,
        events: &mut impl EventSink,
    ) -> TickSummary {
        rules.update_derived_rules(&manager.statistics(), tick);
        let world = WorldContext::new(manager.bounds(), tick);
        manager.update(rules, &world, rng, events)
    }

    #[test]
    fn test_initialize_world_counts() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut m = manager(PopulationConfig::default());
        m.initialize_world(&mut rng);
        let stats = m.statistics();
        assert_eq!(stats.counts.herbivores, 15);
        assert_eq!(stats.counts.carnivores, 5);
        assert_eq!(stats.counts.traders, 3);
        assert_eq!(stats.counts.resources, 20);
        assert_eq!(stats.population, 23);
        assert!(m.live().all(|e| m.bounds().contains(&e.position)));
    }

    #[test]
    fn test_resources_respawn_on_interval() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut rules = RulesEngine::new(RuleSet {
            resource_abundance: 2.0,
            ..Default::default()
        });
        let mut m = manager(empty_population());
        for t in 0..29 {
            assert_eq!(tick(&mut m, &mut rules, t, &mut rng, &mut NullSink).resources_spawned, 0);
        }
        let summary = tick(&mut m, &mut rules, 29, &mut rng, &mut NullSink);
        assert_eq!(summary.resources_spawned, 10);
        assert_eq!(m.statistics().resources, 10);
    }

    #[test]
    fn test_no_respawn_when_resources_plentiful() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut rules = RulesEngine::default();
        let mut m = manager(PopulationConfig {
            resources: 30,
            ..empty_population()
        });
        m.initialize_world(&mut rng);
        for t in 0..30 {
            tick(&mut m, &mut rules, t, &mut rng, &mut NullSink);
        }
        assert_eq!(m.statistics().resources, 30);
    }

    #[test]
    fn test_dead_entities_swept_and_extinction_reported() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut rules = RulesEngine::default();
        let mut m = manager(empty_population());
        let mut starving = create_entity_with_traits(
            EntityKind::Carnivore,
            Position { x: 10.0, y: 10.0 },
            Traits::default(),
            Uuid::new_v4(),
        );
        starving.vitals.energy = 0.0;
        m.restore(vec![starving], LifetimeCounters::default(), 30);

        let mut log = EventLog::default();
        let summary = tick(&mut m, &mut rules, 0, &mut rng, &mut log);
        assert_eq!(summary.deaths, 1);
        assert_eq!(summary.extinct_kinds, vec![EntityKind::Carnivore]);
        assert!(m.is_empty());
        assert_eq!(m.lifetime().deaths, 1);
        assert!(log
            .entries()
            .any(|e| e.severity == Severity::Important && e.message.contains("carnivore")));
    }

    #[test]
    fn test_births_are_appended_after_the_pass() {
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let mut rules = RulesEngine::default();
        let mut m = manager(empty_population());
        for x in [100.0, 104.0] {
            let mut parent = create_entity_with_traits(
                EntityKind::Herbivore,
                Position { x, y: 100.0 },
                Traits::default(),
                Uuid::new_v4(),
            );
            parent.vitals.energy = 150.0;
            parent.vitals.age = 60;
            m.insert(parent);
        }
        let mut log = EventLog::default();
        let summary = tick(&mut m, &mut rules, 0, &mut rng, &mut log);
        assert_eq!(summary.births, 1);
        assert_eq!(m.len(), 3);
        assert_eq!(m.entities()[2].generation, 2);
        assert_eq!(m.lifetime().births, 1);
        assert!(log.entries().any(|e| e.message.contains("born")));
    }

    #[test]
    fn test_mating_partners_share_the_same_window() {
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let mut rules = RulesEngine::default();
        let mut m = manager(empty_population());
        for x in [100.0, 104.0] {
            let mut parent = create_entity_with_traits(
                EntityKind::Herbivore,
                Position { x, y: 100.0 },
                Traits::default(),
                Uuid::new_v4(),
            );
            parent.vitals.energy = 150.0;
            parent.vitals.age = 60;
            m.insert(parent);
        }
        let summary = tick(&mut m, &mut rules, 0, &mut rng, &mut NullSink);
        assert_eq!(summary.births, 1);
        let windows: Vec<u32> = m.entities()[..2].iter().map(|e| e.reproducing_ticks).collect();
        assert_eq!(windows, vec![REPRODUCING_WINDOW - 1; 2]);
        // Newborns start outside the window.
        assert_eq!(m.entities()[2].reproducing_ticks, 0);
    }

    #[test]
    fn test_reseed_restores_living_population() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut m = manager(PopulationConfig::default());
        assert_eq!(m.reseed(&mut rng), 23);
        assert_eq!(m.live_count(), 23);
        assert_eq!(m.statistics().resources, 0);
    }

    #[test]
    fn test_lookup_by_id() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut m = manager(empty_population());
        let id = m.spawn(EntityKind::Trader, &mut rng);
        assert_eq!(m.get(id).map(|e| e.kind), Some(EntityKind::Trader));
        if let Some(e) = m.get_mut(id) {
            e.is_dead = true;
        }
        assert_eq!(m.live().count(), 0);
        assert_eq!(m.sweep_dead(), 1);
        assert!(m.get(id).is_none());
    }
}
