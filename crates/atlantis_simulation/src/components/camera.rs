//! Camera control rotation

use bevy::prelude::*;

/// Control rotation камеры актора (spring arm / boom).
///
/// Позицию камеры задаёт Transform актора, поворот - этот компонент.
/// Во время атаки пишет только `stabilize_attack_cameras`.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct CameraBoom {
    pub rotation: Quat,
}

impl Default for CameraBoom {
    fn default() -> Self {
        Self {
            rotation: Quat::IDENTITY,
        }
    }
}
