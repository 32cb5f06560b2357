use crate::entity::EntityLogic;
use crate::lifecycle::{create_offspring, REPRODUCING_WINDOW};
use crate::rules::RuleSet;
use rand::Rng;
use ruleweaver_data::{Entity, EntityKind, WorldBounds};

pub const RESOURCE_ENERGY: f64 = 30.0;
pub const PREDATION_GAIN: f64 = 0.6;
pub const HUNT_FAIL_PREDATOR_COST: f64 = 10.0;
pub const HUNT_FAIL_PREY_COST: f64 = 5.0;
pub const TRADE_BASE: f64 = 15.0;
pub const TRADE_ENERGY_SHARE: f64 = 0.1;
pub const TRADE_MINIMUM: f64 = 5.0;
pub const TRADE_RETURN: f64 = 1.2;
pub const SOCIABILITY_FLOOR: f64 = 0.3;

/// Result of an interaction between two entities in contact.
#[derive(Debug, Clone)]
pub enum InteractionOutcome {
    Consumed { gained: f64 },
    HuntSucceeded { gained: f64 },
    HuntFailed,
    Traded { given: f64, received: f64 },
    TradeDeclined,
    Reproduced(Box<Entity>),
    ReproductionDeclined,
}

/// A herbivore eats a resource, which is then removed from the world.
pub fn consume_resource(eater: &mut Entity, resource: &mut Entity, rules: &RuleSet) -> InteractionOutcome {
    let before = eater.vitals.energy;
    eater.gain_energy(RESOURCE_ENERGY * eater.traits.efficiency * rules.resource_abundance);
    resource.kill();
    InteractionOutcome::Consumed {
        gained: eater.vitals.energy - before,
    }
}

/// Pure hunt resolution: no randomness beyond the inputs.
#[must_use]
pub fn hunt_succeeds(
    predator_aggression: f64,
    predator_size: f64,
    prey_size: f64,
    prey_adaptability: f64,
) -> bool {
    predator_aggression * predator_size > prey_size * prey_adaptability
}

pub fn hunt(predator: &mut Entity, prey: &mut Entity) -> InteractionOutcome {
    if hunt_succeeds(
        predator.drive.aggression,
        predator.traits.size,
        prey.traits.size,
        prey.traits.adaptability,
    ) {
        let before = predator.vitals.energy;
        predator.gain_energy(PREDATION_GAIN * predator.traits.efficiency * prey.vitals.energy);
        prey.kill();
        InteractionOutcome::HuntSucceeded {
            gained: predator.vitals.energy - before,
        }
    } else {
        predator.drain_energy(HUNT_FAIL_PREDATOR_COST);
        prey.drain_energy(HUNT_FAIL_PREY_COST);
        InteractionOutcome::HuntFailed
    }
}

/// The trader gives part of its energy; the partner receives 1.2x the amount.
pub fn trade(trader: &mut Entity, partner: &mut Entity, rules: &RuleSet) -> InteractionOutcome {
    if partner.traits.sociability <= SOCIABILITY_FLOOR {
        return InteractionOutcome::TradeDeclined;
    }
    let amount = (TRADE_BASE * rules.trade_efficiency).min(TRADE_ENERGY_SHARE * trader.vitals.energy);
    if amount <= TRADE_MINIMUM {
        return InteractionOutcome::TradeDeclined;
    }
    trader.drain_energy(amount);
    let before = partner.vitals.energy;
    partner.gain_energy(amount * TRADE_RETURN);
    InteractionOutcome::Traded {
        given: amount,
        received: partner.vitals.energy - before,
    }
}

/// Both parents pay `reproduction_cost` and enter the cooldown.
pub fn reproduce<R: Rng>(
    a: &mut Entity,
    b: &mut Entity,
    rules: &RuleSet,
    bounds: &WorldBounds,
    rng: &mut R,
) -> InteractionOutcome {
    let cost = rules.reproduction_cost;
    let eligible = a.kind == b.kind
        && !a.kind.is_resource()
        && !a.is_dead
        && !b.is_dead
        && !a.is_reproducing()
        && !b.is_reproducing()
        && a.vitals.energy >= cost
        && b.vitals.energy >= cost;
    if !eligible {
        return InteractionOutcome::ReproductionDeclined;
    }

    let child = create_offspring(a, b, rules.mutation_chance, bounds, rng);
    for parent in [a, b] {
        parent.vitals.energy -= cost;
        parent.vitals.last_reproduction = parent.vitals.age;
        parent.reproducing_ticks = REPRODUCING_WINDOW;
        parent.target = None;
    }
    InteractionOutcome::Reproduced(Box::new(child))
}

/// Dispatches the action `actor` performs on the entity it reached.
pub fn interact<R: Rng>(
    actor: &mut Entity,
    other: &mut Entity,
    rules: &RuleSet,
    bounds: &WorldBounds,
    rng: &mut R,
) -> Option<InteractionOutcome> {
    if actor.is_dead || other.is_dead {
        return None;
    }
    let outcome = match (actor.kind, other.kind) {
        (EntityKind::Herbivore, EntityKind::Resource) => consume_resource(actor, other, rules),
        (EntityKind::Carnivore, EntityKind::Herbivore | EntityKind::Trader) => hunt(actor, other),
        (a, b) if a == b && !a.is_resource() => reproduce(actor, other, rules, bounds, rng),
        (EntityKind::Trader, b) if !b.is_resource() => trade(actor, other, rules),
        _ => return None,
    };
    Some(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::create_entity_with_traits;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use ruleweaver_data::{Position, Traits};
    use uuid::Uuid;

    fn make(kind: EntityKind, traits: Traits) -> Entity {
        create_entity_with_traits(kind, Position { x: 50.0, y: 50.0 }, traits, Uuid::new_v4())
    }

    #[test]
    fn test_consume_resource_scenario() {
        let mut herbivore = make(
            EntityKind::Herbivore,
            Traits {
                efficiency: 0.8,
                ..Traits::default()
            },
        );
        herbivore.vitals.energy = 80.0;
        let mut resource = make(EntityKind::Resource, Traits::default());
        let outcome = consume_resource(&mut herbivore, &mut resource, &RuleSet::default());
        assert!((herbivore.vitals.energy - 104.0).abs() < 1e-9);
        assert!(resource.is_dead);
        assert!(matches!(outcome, InteractionOutcome::Consumed { gained } if (gained - 24.0).abs() < 1e-9));
    }

    #[test]
    fn test_consume_is_capped() {
        let mut herbivore = make(
            EntityKind::Herbivore,
            Traits {
                efficiency: 1.0,
                ..Traits::default()
            },
        );
        herbivore.vitals.energy = 195.0;
        let mut resource = make(EntityKind::Resource, Traits::default());
        consume_resource(&mut herbivore, &mut resource, &RuleSet::default());
        assert_eq!(herbivore.vitals.energy, herbivore.vitals.max_energy);
    }

    #[test]
    fn test_hunt_success() {
        let mut predator = make(
            EntityKind::Carnivore,
            Traits {
                aggression: 0.9,
                size: 0.8,
                efficiency: 0.5,
                ..Traits::default()
            },
        );
        predator.vitals.energy = 100.0;
        let mut prey = make(
            EntityKind::Herbivore,
            Traits {
                size: 0.5,
                adaptability: 0.5,
                ..Traits::default()
            },
        );
        prey.vitals.energy = 60.0;
        let outcome = hunt(&mut predator, &mut prey);
        assert!(matches!(outcome, InteractionOutcome::HuntSucceeded { .. }));
        assert!(prey.is_dead);
        assert!((predator.vitals.energy - (100.0 + 0.6 * 0.5 * 60.0)).abs() < 1e-9);
    }

    #[test]
    fn test_hunt_failure_penalties() {
        let mut predator = make(
            EntityKind::Carnivore,
            Traits {
                aggression: 0.1,
                size: 0.2,
                ..Traits::default()
            },
        );
        let mut prey = make(
            EntityKind::Trader,
            Traits {
                size: 0.9,
                adaptability: 0.9,
                ..Traits::default()
            },
        );
        let (p0, q0) = (predator.vitals.energy, prey.vitals.energy);
        let outcome = hunt(&mut predator, &mut prey);
        assert!(matches!(outcome, InteractionOutcome::HuntFailed));
        assert!(!prey.is_dead);
        assert_eq!(predator.vitals.energy, p0 - 10.0);
        assert_eq!(prey.vitals.energy, q0 - 5.0);
    }

    #[test]
    fn test_trade_is_non_conservative() {
        let mut trader = make(EntityKind::Trader, Traits::default());
        trader.vitals.energy = 200.0;
        let mut partner = make(
            EntityKind::Herbivore,
            Traits {
                sociability: 0.8,
                ..Traits::default()
            },
        );
        partner.vitals.energy = 50.0;
        let outcome = trade(&mut trader, &mut partner, &RuleSet::default());
        assert!(matches!(outcome, InteractionOutcome::Traded { given, .. } if given == 15.0));
        assert_eq!(trader.vitals.energy, 185.0);
        assert!((partner.vitals.energy - 68.0).abs() < 1e-9);
    }

    #[test]
    fn test_trade_declined_when_small_or_unsociable() {
        let mut trader = make(EntityKind::Trader, Traits::default());
        trader.vitals.energy = 40.0; // 10% is 4, below the minimum
        let mut partner = make(
            EntityKind::Herbivore,
            Traits {
                sociability: 0.9,
                ..Traits::default()
            },
        );
        assert!(matches!(
            trade(&mut trader, &mut partner, &RuleSet::default()),
            InteractionOutcome::TradeDeclined
        ));
        assert_eq!(trader.vitals.energy, 40.0);

        trader.vitals.energy = 200.0;
        partner.traits.sociability = 0.2;
        assert!(matches!(
            trade(&mut trader, &mut partner, &RuleSet::default()),
            InteractionOutcome::TradeDeclined
        ));
    }

    #[test]
    fn test_reproduction_scenario() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let bounds = WorldBounds::default();
        let mut a = make(EntityKind::Carnivore, Traits::default());
        let mut b = make(EntityKind::Carnivore, Traits::default());
        a.vitals.energy = 90.0;
        b.vitals.energy = 95.0;
        a.generation = 2;
        b.generation = 5;
        a.vitals.age = 120;
        b.vitals.age = 130;

        let outcome = reproduce(&mut a, &mut b, &RuleSet::default(), &bounds, &mut rng);
        let InteractionOutcome::Reproduced(child) = outcome else {
            panic!("expected offspring");
        };
        assert_eq!(a.vitals.energy, 40.0);
        assert_eq!(b.vitals.energy, 45.0);
        assert_eq!(child.generation, 6);
        assert!(a.is_reproducing() && b.is_reproducing());
        assert_eq!(a.vitals.last_reproduction, 120);
        assert!(!a.can_mate() && !b.can_mate());

        // Still inside the reproducing window.
        a.vitals.energy = 200.0;
        b.vitals.energy = 200.0;
        assert!(matches!(
            reproduce(&mut a, &mut b, &RuleSet::default(), &bounds, &mut rng),
            InteractionOutcome::ReproductionDeclined
        ));
    }

    #[test]
    fn test_reproduction_needs_energy() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut a = make(EntityKind::Herbivore, Traits::default());
        let mut b = make(EntityKind::Herbivore, Traits::default());
        a.vitals.energy = 49.0;
        let outcome = reproduce(&mut a, &mut b, &RuleSet::default(), &WorldBounds::default(), &mut rng);
        assert!(matches!(outcome, InteractionOutcome::ReproductionDeclined));
        assert_eq!(a.vitals.energy, 49.0);
        assert_eq!(b.vitals.energy, 100.0);
    }

    #[test]
    fn test_interact_dispatch() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let bounds = WorldBounds::default();
        let rules = RuleSet::default();
        let mut resource = make(EntityKind::Resource, Traits::default());
        let mut carnivore = make(EntityKind::Carnivore, Traits::default());
        assert!(interact(&mut carnivore, &mut resource, &rules, &bounds, &mut rng).is_none());
        let mut herbivore = make(EntityKind::Herbivore, Traits::default());
        assert!(matches!(
            interact(&mut herbivore, &mut resource, &rules, &bounds, &mut rng),
            Some(InteractionOutcome::Consumed { .. })
        ));
        // Dead entities are inert.
        assert!(interact(&mut herbivore, &mut resource, &rules, &bounds, &mut rng).is_none());
    }
}
