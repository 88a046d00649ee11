//! Collaborator interfaces consumed by the combo controller.
//!
//! ECS реализует их адаптером над компонентами (см. `systems::combo`),
//! тесты - простыми fakes.

use bevy::prelude::*;

use super::clips::AttackClip;

pub trait MontagePlayer {
    /// Play the attack montage; returns its length in seconds (<= 0 on failure).
    fn play_montage(&mut self, clip: AttackClip) -> f32;
}

pub trait MovementInputQuery {
    fn is_any_movement_or_dash_key_pressed(&self) -> bool;
}

pub trait ComboVisuals {
    fn set_weapon_effect_active(&mut self, active: bool);
    fn set_reveal_mesh_visible(&mut self, visible: bool);
}

pub trait ManaPool {
    fn has_enough_mana(&self, cost: f32) -> bool;
    fn consume_mana(&mut self, cost: f32);
}

pub trait DamageSink {
    /// Apply damage to `target`; returns the amount actually applied.
    fn apply_point_damage(&mut self, target: Entity, amount: u32, source: Entity) -> u32;
}

/// Read-only view of the attacking actor.
pub trait ActorView {
    fn is_alive(&self) -> bool;
    fn position(&self) -> Vec3;
    fn camera_rotation(&self) -> Quat;
}

/// Everything the controller needs from its owner.
pub trait CombatHost: ActorView + MontagePlayer + MovementInputQuery + ComboVisuals + ManaPool {}

impl<T> CombatHost for T where
    T: ActorView + MontagePlayer + MovementInputQuery + ComboVisuals + ManaPool
{
}
