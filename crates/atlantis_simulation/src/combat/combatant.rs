//! MeleeCombatant - ECS обёртка над `ComboController`.
//!
//! Один компонент на актора; окно, камера, эффекты и scheduler принадлежат
//! контроллеру внутри. Соседние компоненты (AttackClips, MovementKeys,
//! ComboVisualState, Mana, Health) - источники для collaborator adapter.

use bevy::prelude::*;

use super::attacker::Attacker;
use super::clips::AttackClips;
use super::controller::ComboController;
use crate::components::{Actor, CameraBoom, ComboVisualState, MovementKeys};
use crate::config::CombatConfig;

#[derive(Component, Debug, Clone, Default, Deref, DerefMut)]
#[require(Actor, Attacker, AttackClips, MovementKeys, ComboVisualState, CameraBoom)]
pub struct MeleeCombatant(pub ComboController);

impl MeleeCombatant {
    pub fn from_config(config: &CombatConfig) -> Self {
        Self(ComboController::new(
            config.combo.clone(),
            config.window.clone(),
            config.camera.clone(),
        ))
    }
}

/// Spawn bundle for a combo-capable actor.
pub fn combatant_bundle(
    config: &CombatConfig,
    position: Vec3,
    faction_id: u64,
    clip_lengths: Vec<f32>,
) -> impl Bundle {
    (
        MeleeCombatant::from_config(config),
        Actor { faction_id },
        Transform::from_translation(position),
        AttackClips::new(clip_lengths),
    )
}
