use super::entity::EntityKind;
use serde::{Deserialize, Serialize};

/// Live entity counts per kind.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TypeCounts {
    pub herbivores: usize,
    pub carnivores: usize,
    pub traders: usize,
    pub resources: usize,
}

impl TypeCounts {
    #[must_use]
    pub fn get(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Herbivore => self.herbivores,
            EntityKind::Carnivore => self.carnivores,
            EntityKind::Trader => self.traders,
            EntityKind::Resource => self.resources,
        }
    }

    pub fn increment(&mut self, kind: EntityKind) {
        match kind {
            EntityKind::Herbivore => self.herbivores += 1,
            EntityKind::Carnivore => self.carnivores += 1,
            EntityKind::Trader => self.traders += 1,
            EntityKind::Resource => self.resources += 1,
        }
    }

    /// True when every kind, resources included, has at least one live member.
    #[must_use]
    pub fn all_present(&self) -> bool {
        EntityKind::ALL.iter().all(|k| self.get(*k) > 0)
    }
}

/// Cumulative event counters kept across the whole run.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LifetimeCounters {
    pub births: u64,
    pub deaths: u64,
    pub hunts: u64,
    pub trades: u64,
}

/// Aggregated statistics of the live world, computed fresh on demand.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct PopulationStats {
    /// Live non-resource entities.
    pub population: usize,
    pub resources: usize,
    pub total_energy: f64,
    pub average_age: f64,
    pub max_generation: u32,
    pub counts: TypeCounts,
    pub lifetime: LifetimeCounters,
}

impl PopulationStats {
    #[must_use]
    pub fn is_extinct(&self) -> bool {
        self.population == 0
    }
}
