/// Asserts that an entity with the given ID has more than the specified amount of energy.
#[macro_export]
macro_rules! assert_energy_above {
    ($sim:expr, $id:expr, $min_energy:expr) => {
        let entity = $sim
            .entities()
            .get($id)
            .expect("Entity not found in world");
        assert!(
            entity.vitals.energy > $min_energy,
            "Entity {} energy {} is not above {}",
            $id,
            entity.vitals.energy,
            $min_energy
        );
    };
}

/// Asserts that an entity with the given ID is no longer alive in the world.
#[macro_export]
macro_rules! assert_entity_dead {
    ($sim:expr, $id:expr) => {
        let alive = $sim.entities().live().any(|e| e.id == $id);
        assert!(!alive, "Entity {} should be dead but was found alive", $id);
    };
}

/// Asserts the live non-resource population, optionally for a single kind.
#[macro_export]
macro_rules! assert_population {
    ($sim:expr, $count:expr) => {
        assert_eq!(
            $sim.statistics().population,
            $count,
            "Population count mismatch"
        );
    };
    ($sim:expr, $kind:expr, $count:expr) => {
        assert_eq!(
            $sim.statistics().counts.get($kind),
            $count,
            "Population count mismatch for {}",
            $kind
        );
    };
}
