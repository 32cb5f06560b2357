use ruleweaver_data::{Entity, LifetimeCounters, PopulationStats};

/// Aggregates the live entities into a fresh [`PopulationStats`].
///
/// Population, energy, age and generation cover live non-resource entities
/// only; per-kind counts include resources.
#[must_use]
pub fn compute_statistics(entities: &[Entity], lifetime: LifetimeCounters) -> PopulationStats {
    let mut stats = PopulationStats {
        lifetime,
        ..Default::default()
    };
    let mut age_sum = 0u64;

    for e in entities.iter().filter(|e| !e.is_dead) {
        stats.counts.increment(e.kind);
        if e.kind.is_resource() {
            stats.resources += 1;
            continue;
        }
        stats.population += 1;
        stats.total_energy += e.vitals.energy;
        age_sum += e.vitals.age;
        stats.max_generation = stats.max_generation.max(e.generation);
    }

    if stats.population > 0 {
        stats.average_age = age_sum as f64 / stats.population as f64;
    }
    stats
}
