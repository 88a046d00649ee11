//! Melee hit sweep + damage events
//!
//! Sphere sweep вокруг атакующего: каждая цель получает урон максимум
//! один раз за sweep, сам атакующий исключён.

use bevy::prelude::*;

use super::interfaces::DamageSink;

/// Событие: урон нанесен
///
/// Генерируется только если applied damage > 0.
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct DamageDealt {
    pub attacker: Entity,
    pub target: Entity,
    pub damage: u32,
    pub target_died: bool,
}

/// Событие: entity умер (health <= 0)
#[derive(Event, Debug, Clone)]
pub struct EntityDied {
    pub entity: Entity,
    pub killer: Option<Entity>,
}

/// Компонент-маркер: entity мертв (Health <= 0)
///
/// Трупы остаются на месте и исключаются из hit sweep.
#[derive(Component, Debug)]
pub struct Dead;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepHit {
    pub target: Entity,
    pub applied: u32,
}

/// Apply `amount` to every candidate within `radius` of `origin`.
///
/// Duplicate candidates are hit once. Returns hits with applied damage > 0.
pub fn perform_damage_sweep(
    origin: Vec3,
    radius: f32,
    source: Entity,
    amount: u32,
    candidates: impl IntoIterator<Item = (Entity, Vec3)>,
    sink: &mut dyn DamageSink,
) -> Vec<SweepHit> {
    let mut hit_targets: Vec<Entity> = Vec::new();
    let mut hits = Vec::new();

    for (target, position) in candidates {
        if target == source || hit_targets.contains(&target) {
            continue;
        }
        if position.distance_squared(origin) > radius * radius {
            continue;
        }

        hit_targets.push(target);
        let applied = sink.apply_point_damage(target, amount, source);
        if applied > 0 {
            hits.push(SweepHit { target, applied });
        }
    }

    hits
}
