//! Attack camera stabilization system.
//!
//! Единственный writer Transform.translation / CameraBoom.rotation атакующего,
//! пока lock активен.

use bevy::prelude::*;

use crate::combat::camera_stabilizer::{is_near_other_actor, StabilizationFrame};
use crate::combat::combatant::MeleeCombatant;
use crate::components::{Actor, CameraBoom, MovementKeys};
use crate::logger;

pub fn stabilize_attack_cameras(
    time: Res<Time<Fixed>>,
    mut queries: ParamSet<(
        Query<(Entity, &Transform), With<Actor>>,
        Query<(
            Entity,
            &mut MeleeCombatant,
            &mut Transform,
            &mut CameraBoom,
            Option<&MovementKeys>,
        )>,
    )>,
) {
    let now = time.elapsed_secs();
    let delta = time.delta_secs();

    let actor_positions: Vec<(Entity, Vec3)> = queries
        .p0()
        .iter()
        .map(|(entity, transform)| (entity, transform.translation))
        .collect();

    for (entity, mut combatant, mut transform, mut boom, keys) in queries.p1().iter_mut() {
        if !combatant.camera().is_locked() {
            continue;
        }

        let proximity = combatant.camera().config().proximity_distance;
        let others = actor_positions
            .iter()
            .filter(|(other, _)| *other != entity)
            .map(|(_, position)| *position);

        let frame = StabilizationFrame {
            now,
            delta,
            is_attacking: combatant.is_attacking(),
            movement_pressed: keys.is_some_and(|k| k.any_pressed()),
            near_other_actor: is_near_other_actor(transform.translation, others, proximity),
        };

        let step = combatant
            .camera_mut()
            .tick(frame, &mut transform.translation, &mut boom.rotation);

        if step.released {
            logger::log(&format!("🎥 ECS: camera lock released (entity: {:?})", entity));
        }
    }
}
