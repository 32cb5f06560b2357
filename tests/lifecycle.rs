mod common;

use common::{entity_at, WorldBuilder};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use ruleweaver_core::config::{PopulationConfig, ResourceConfig};
use ruleweaver_core::rules::{RuleKey, RuleSet, RulesEngine};
use ruleweaver_core::systems::interaction::{consume_resource, reproduce, InteractionOutcome};
use ruleweaver_core::{EntityLogic, EntityManager};
use ruleweaver_data::{EntityKind, LifetimeCounters, PopulationStats, WorldBounds};

#[test]
fn test_herbivore_eats_adjacent_resource() {
    let mut manager = EntityManager::new(
        WorldBounds::default(),
        PopulationConfig::default(),
        ResourceConfig::default(),
    );
    let mut herbivore = entity_at(EntityKind::Herbivore, 100.0, 100.0, 0.8);
    herbivore.vitals.energy = 80.0;
    let herbivore_id = manager.insert(herbivore);
    let resource_id = manager.insert(entity_at(EntityKind::Resource, 100.0, 100.0, 0.5));
    assert_eq!(manager.len(), 2);

    let rules = RuleSet::default();
    let mut resource = manager.get(resource_id).cloned().expect("resource");
    let eater = manager.get_mut(herbivore_id).expect("herbivore");
    assert!(eater.in_contact(&resource));
    let outcome = consume_resource(eater, &mut resource, &rules);

    assert!(matches!(outcome, InteractionOutcome::Consumed { .. }));
    assert!((eater.vitals.energy - 104.0).abs() < 1e-9);
    assert!(resource.is_dead);

    *manager.get_mut(resource_id).expect("resource") = resource;
    assert_eq!(manager.sweep_dead(), 1);
    assert_eq!(manager.len(), 1);
    assert!(manager.get(resource_id).is_none());
}

#[test]
fn test_small_population_derives_pressure_and_threat() {
    let mut engine = RulesEngine::new(RuleSet::default());
    let stats = PopulationStats {
        population: 3,
        ..PopulationStats::default()
    };
    engine.update_derived_rules(&stats, 0);
    assert!((engine.derived().population_pressure - 0.5).abs() < 1e-12);
    assert!((engine.derived().extinction_threat - 0.4).abs() < 1e-12);
}

#[test]
fn test_carnivore_pair_reproduction() {
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let rules = RuleSet {
        reproduction_cost: 50.0,
        ..RuleSet::default()
    };
    let bounds = WorldBounds::default();
    let mut a = entity_at(EntityKind::Carnivore, 200.0, 200.0, 0.5);
    let mut b = entity_at(EntityKind::Carnivore, 205.0, 200.0, 0.5);
    a.vitals.energy = 90.0;
    b.vitals.energy = 95.0;
    a.generation = 2;
    b.generation = 4;
    a.vitals.age = 100;
    b.vitals.age = 100;

    let outcome = reproduce(&mut a, &mut b, &rules, &bounds, &mut rng);
    let InteractionOutcome::Reproduced(child) = outcome else {
        panic!("reproduction should succeed");
    };
    assert_eq!(a.vitals.energy, 40.0);
    assert_eq!(b.vitals.energy, 45.0);
    assert_eq!(child.generation, 5);
    assert_eq!(child.kind, EntityKind::Carnivore);

    // Even with energy restored, the cooldown blocks mating again.
    a.vitals.energy = a.vitals.max_energy;
    a.reproducing_ticks = 0;
    assert!(!a.can_mate());
    a.vitals.age += 50;
    a.vitals.reproduction_threshold = 0.0;
    assert!(a.can_mate());

    // Still inside the reproducing window.
    b.vitals.energy = 95.0;
    assert!(matches!(
        reproduce(&mut a, &mut b, &rules, &bounds, &mut rng),
        InteractionOutcome::ReproductionDeclined
    ));
}

#[test]
fn test_starving_creature_dies_and_is_removed() {
    let mut starving = entity_at(EntityKind::Herbivore, 50.0, 50.0, 0.5);
    starving.vitals.energy = 0.001;
    let id = starving.id;
    let survivor = entity_at(EntityKind::Trader, 700.0, 500.0, 0.5);
    let mut sim = WorldBuilder::new()
        .with_entity(starving)
        .with_entity(survivor)
        .build();

    assert_population!(sim, 2);
    let report = sim.step().expect("running");
    assert_eq!(report.summary.deaths, 1);
    assert_entity_dead!(sim, id);
    assert_population!(sim, EntityKind::Herbivore, 0);
    assert_population!(sim, EntityKind::Trader, 1);
    assert_eq!(report.summary.extinct_kinds, vec![EntityKind::Herbivore]);
    assert_eq!(sim.entities().lifetime().deaths, 1);
}

#[test]
fn test_hungry_carnivore_hunts_weaker_prey() {
    let mut hunter = entity_at(EntityKind::Carnivore, 300.0, 300.0, 0.9);
    hunter.vitals.energy = 20.0;
    let hunter_id = hunter.id;
    let prey = entity_at(EntityKind::Herbivore, 302.0, 300.0, 0.2);
    let prey_id = prey.id;
    let mut sim = WorldBuilder::new()
        .with_entity(hunter)
        .with_entity(prey)
        .build();

    let report = sim.step().expect("running");
    assert_eq!(report.summary.hunts, 1);
    assert_entity_dead!(sim, prey_id);
    assert_energy_above!(sim, hunter_id, 20.0);
    assert!(sim
        .events()
        .entries()
        .any(|e| e.message.contains("hunted down")));
}

#[test]
fn test_resources_respawn_on_interval() {
    let mut sim = WorldBuilder::new()
        .with_rule(RuleKey::ResourceAbundance, 1.0)
        .with_entity(entity_at(EntityKind::Trader, 10.0, 10.0, 0.5))
        .build();
    let interval = sim.config().resources.respawn_interval;
    let batch = sim.config().resources.respawn_batch;

    sim.run(interval - 1);
    assert_eq!(sim.statistics().resources, 0);
    sim.step();
    assert_eq!(sim.statistics().resources, batch);
}

#[test]
fn test_lifetime_counters_survive_restore() {
    let mut manager = EntityManager::new(
        WorldBounds::default(),
        PopulationConfig::default(),
        ResourceConfig::default(),
    );
    let lifetime = LifetimeCounters {
        births: 4,
        deaths: 2,
        hunts: 1,
        trades: 7,
    };
    manager.restore(Vec::new(), lifetime, 10);
    assert_eq!(manager.statistics().lifetime, lifetime);
    assert_eq!(manager.respawn_countdown(), 10);
}
