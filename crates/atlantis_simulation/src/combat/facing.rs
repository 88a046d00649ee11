//! Face nearest enemy on attack start (yaw only, XZ plane).

use bevy::prelude::*;

/// Enemies further than this are ignored.
pub const FACE_ENEMY_RADIUS: f32 = 500.0;

/// Nearest candidate within `radius` (XZ distance). Ties keep the first one.
pub fn nearest_enemy(
    origin: Vec3,
    radius: f32,
    candidates: impl IntoIterator<Item = (Entity, Vec3)>,
) -> Option<(Entity, Vec3)> {
    let flat_origin = origin.xz();
    let mut best: Option<(Entity, Vec3, f32)> = None;

    for (entity, position) in candidates {
        let distance_sq = position.xz().distance_squared(flat_origin);
        if distance_sq > radius * radius {
            continue;
        }
        if best.is_none_or(|(_, _, best_sq)| distance_sq < best_sq) {
            best = Some((entity, position, distance_sq));
        }
    }

    best.map(|(entity, position, _)| (entity, position))
}

/// Upright rotation whose forward (-Z) points from `from` to `to`.
///
/// `None` when the targets overlap on the XZ plane.
pub fn yaw_towards(from: Vec3, to: Vec3) -> Option<Quat> {
    let direction = (to - from).xz();
    if direction.length_squared() < 1e-6 {
        return None;
    }
    Some(Quat::from_rotation_y(f32::atan2(-direction.x, -direction.y)))
}
