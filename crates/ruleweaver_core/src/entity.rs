//! Per-entity state transitions attached to the plain data type.

use crate::lifecycle::{sight_range_for, MATE_COOLDOWN};
use ruleweaver_data::{DeathCause, Entity, EntityKind, Mood};

/// Contact distance added on top of both radii.
pub const INTERACTION_MARGIN: f64 = 2.0;
const DECAY_SCALE: f64 = 100.0;

pub trait EntityLogic {
    fn energy_ratio(&self) -> f64;
    fn advance_age(&mut self);
    /// Shortens the reproducing window by one tick.
    fn wind_down_reproduction(&mut self);
    /// Applies metabolic decay for one tick. Resources are exempt.
    fn apply_energy_decay(&mut self, decay: f64);
    fn refresh_mood(&mut self);
    fn gain_energy(&mut self, amount: f64);
    fn drain_energy(&mut self, amount: f64);
    fn sight_range(&self) -> f64;
    /// True when `other` is close enough to interact with.
    fn in_contact(&self, other: &Entity) -> bool;
    /// Eligible to mate: live, not a resource, enough energy, cooled down.
    fn can_mate(&self) -> bool;
    /// Marks the entity dead if it starved or aged out.
    fn check_survival(&mut self) -> Option<DeathCause>;
    fn kill(&mut self);
}

impl EntityLogic for Entity {
    fn energy_ratio(&self) -> f64 {
        if self.vitals.max_energy <= 0.0 {
            0.0
        } else {
            self.vitals.energy / self.vitals.max_energy
        }
    }

    fn advance_age(&mut self) {
        self.vitals.age = (self.vitals.age + 1).min(self.vitals.max_age);
    }

    fn wind_down_reproduction(&mut self) {
        self.reproducing_ticks = self.reproducing_ticks.saturating_sub(1);
    }

    fn apply_energy_decay(&mut self, decay: f64) {
        if self.kind.is_resource() {
            return;
        }
        let age_modifier = 1.0 + (self.vitals.age as f64 / self.vitals.max_age as f64) * 0.5;
        let loss = decay * self.traits.size * age_modifier * DECAY_SCALE;
        self.drain_energy(loss);
    }

    fn refresh_mood(&mut self) {
        if self.kind.is_resource() {
            self.mood = Mood::Neutral;
            return;
        }
        let ratio = self.energy_ratio();
        self.mood = if ratio < 0.3 {
            Mood::Hungry
        } else if self.kind == EntityKind::Carnivore && self.traits.aggression > 0.7 {
            Mood::Aggressive
        } else if ratio > 0.7 {
            Mood::Content
        } else {
            Mood::Neutral
        };
    }

    fn gain_energy(&mut self, amount: f64) {
        self.vitals.energy = (self.vitals.energy + amount).min(self.vitals.max_energy);
    }

    fn drain_energy(&mut self, amount: f64) {
        self.vitals.energy = (self.vitals.energy - amount).max(0.0);
    }

    fn sight_range(&self) -> f64 {
        sight_range_for(&self.traits)
    }

    fn in_contact(&self, other: &Entity) -> bool {
        self.position.distance_to(&other.position)
            <= self.radius() + other.radius() + INTERACTION_MARGIN
    }

    fn can_mate(&self) -> bool {
        !self.is_dead
            && !self.kind.is_resource()
            && !self.is_reproducing()
            && self.vitals.energy >= self.vitals.reproduction_threshold
            && self.vitals.age.saturating_sub(self.vitals.last_reproduction) >= MATE_COOLDOWN
    }

    fn check_survival(&mut self) -> Option<DeathCause> {
        if self.is_dead {
            return None;
        }
        let cause = if self.vitals.age >= self.vitals.max_age {
            Some(DeathCause::OldAge)
        } else if !self.kind.is_resource() && self.vitals.energy <= 0.0 {
            Some(DeathCause::Starvation)
        } else {
            None
        };
        if cause.is_some() {
            self.kill();
        }
        cause
    }

    fn kill(&mut self) {
        self.is_dead = true;
        self.target = None;
    }
}
