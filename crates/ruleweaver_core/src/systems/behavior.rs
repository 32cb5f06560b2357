use crate::entity::EntityLogic;
use crate::rules::RulesEngine;
use crate::systems::interaction::{interact, InteractionOutcome, SOCIABILITY_FLOOR};
use crate::world::WorldContext;
use rand::Rng;
use ruleweaver_data::{DeathCause, Entity, EntityId, EntityKind, Mood, Position, WorldBounds};

const GRAVITY_PERTURBATION: f64 = 0.1;
const WANDER_JITTER: f64 = 0.5;
const WANDER_DAMPING: f64 = 0.95;
/// Prey may be at most this much larger than the predator.
const PREY_SIZE_RATIO: f64 = 1.2;

/// Everything the manager needs to know about one entity's tick.
#[derive(Debug, Default)]
pub struct EntityUpdate {
    pub interaction: Option<InteractionOutcome>,
    pub deaths: Vec<(EntityId, EntityKind, DeathCause)>,
}

fn nearest<F>(entities: &[Entity], idx: usize, range: f64, accept: F) -> Option<usize>
where
    F: Fn(&Entity) -> bool,
{
    let me = &entities[idx];
    entities
        .iter()
        .enumerate()
        .filter(|(i, other)| *i != idx && !other.is_dead && accept(other))
        .map(|(i, other)| (i, me.position.distance_to(&other.position)))
        .filter(|(_, d)| *d <= range)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(i, _)| i)
}

fn is_claimed(entities: &[Entity], idx: usize, resource: &Entity) -> bool {
    entities
        .iter()
        .enumerate()
        .any(|(i, other)| i != idx && !other.is_dead && other.target == Some(resource.id))
}

fn find_mate(entities: &[Entity], idx: usize) -> Option<usize> {
    let me = &entities[idx];
    if !me.can_mate() {
        return None;
    }
    nearest(entities, idx, me.sight_range(), |other| {
        other.kind == me.kind && other.can_mate()
    })
}

/// Picks the index of the entity `idx` should move toward this tick.
#[must_use]
pub fn select_target(entities: &[Entity], idx: usize) -> Option<usize> {
    let me = &entities[idx];
    if me.is_dead {
        return None;
    }
    let range = me.sight_range();
    match me.kind {
        EntityKind::Resource => None,
        EntityKind::Herbivore => nearest(entities, idx, range, |other| {
            other.kind.is_resource() && !is_claimed(entities, idx, other)
        })
        .or_else(|| find_mate(entities, idx)),
        EntityKind::Carnivore => {
            if me.mood == Mood::Hungry {
                let max_prey_size = me.traits.size * PREY_SIZE_RATIO;
                let prey = nearest(entities, idx, range, |other| {
                    matches!(other.kind, EntityKind::Herbivore | EntityKind::Trader)
                        && other.traits.size <= max_prey_size
                });
                if prey.is_some() {
                    return prey;
                }
            }
            find_mate(entities, idx)
        }
        EntityKind::Trader => nearest(entities, idx, range, |other| {
            other.kind != me.kind
                && !other.kind.is_resource()
                && other.traits.sociability > SOCIABILITY_FLOOR
        })
        .or_else(|| find_mate(entities, idx)),
    }
}

/// Moves toward `target` at full speed, or wanders when there is none.
pub fn steer<R: Rng>(
    entity: &mut Entity,
    target: Option<Position>,
    gravity: f64,
    bounds: &WorldBounds,
    rng: &mut R,
) {
    if entity.kind.is_resource() {
        return;
    }
    let speed = entity.drive.max_speed;
    match target {
        Some(goal) => {
            let dx = goal.x - entity.position.x;
            let dy = goal.y - entity.position.y;
            let distance = dx.hypot(dy);
            if distance > f64::EPSILON {
                let step = speed.min(distance);
                entity.velocity.vx = dx / distance * step;
                entity.velocity.vy = dy / distance * step;
            } else {
                entity.velocity.vx = 0.0;
                entity.velocity.vy = 0.0;
            }
        }
        None => {
            entity.velocity.vx =
                (entity.velocity.vx + rng.gen_range(-WANDER_JITTER..=WANDER_JITTER)) * WANDER_DAMPING;
            entity.velocity.vy =
                (entity.velocity.vy + rng.gen_range(-WANDER_JITTER..=WANDER_JITTER)) * WANDER_DAMPING;
            let magnitude = entity.velocity.vx.hypot(entity.velocity.vy);
            if magnitude > speed && magnitude > 0.0 {
                entity.velocity.vx *= speed / magnitude;
                entity.velocity.vy *= speed / magnitude;
            }
        }
    }
    entity.velocity.vy += gravity * GRAVITY_PERTURBATION;

    let next = Position {
        x: entity.position.x + entity.velocity.vx,
        y: entity.position.y + entity.velocity.vy,
    };
    let clamped = bounds.clamp(next);
    if clamped.x != next.x {
        entity.velocity.vx = -entity.velocity.vx;
    }
    if clamped.y != next.y {
        entity.velocity.vy = -entity.velocity.vy;
    }
    entity.position = clamped;
}

fn pair_mut(entities: &mut [Entity], a: usize, b: usize) -> (&mut Entity, &mut Entity) {
    debug_assert_ne!(a, b);
    if a < b {
        let (left, right) = entities.split_at_mut(b);
        (&mut left[a], &mut right[0])
    } else {
        let (left, right) = entities.split_at_mut(a);
        (&mut right[0], &mut left[b])
    }
}

/// Runs one tick of the entity at `idx`: age, decay, mood, targeting,
/// movement, interaction and the survival check.
pub fn update_entity<R: Rng>(
    entities: &mut [Entity],
    idx: usize,
    rules: &RulesEngine,
    world: &WorldContext,
    rng: &mut R,
) -> EntityUpdate {
    let mut update = EntityUpdate::default();
    if entities[idx].is_dead {
        return update;
    }

    {
        let me = &mut entities[idx];
        me.advance_age();
        me.apply_energy_decay(rules.effective_energy_decay());
        me.refresh_mood();
    }

    if !entities[idx].kind.is_resource() {
        let target = select_target(entities, idx);
        let goal = target.map(|t| entities[t].position);
        let target_id = target.map(|t| entities[t].id);
        let me = &mut entities[idx];
        me.target = target_id;
        steer(me, goal, rules.rules().gravity, &world.bounds, rng);

        if let Some(t) = target {
            let (me, other) = pair_mut(entities, idx, t);
            if me.in_contact(other) {
                update.interaction = interact(me, other, rules.rules(), &world.bounds, rng);
                if let Some(cause) = match &update.interaction {
                    Some(InteractionOutcome::HuntSucceeded { .. }) => Some(DeathCause::Predation),
                    Some(InteractionOutcome::Consumed { .. }) => Some(DeathCause::Consumed),
                    _ => other.check_survival(),
                } {
                    update.deaths.push((other.id, other.kind, cause));
                }
                if other.is_dead {
                    me.target = None;
                }
            }
        }
    }

    let me = &mut entities[idx];
    if let Some(cause) = me.check_survival() {
        update.deaths.push((me.id, me.kind, cause));
    }
    update
}
