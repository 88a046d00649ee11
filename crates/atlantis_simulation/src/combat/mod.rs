//! Combat system module (melee combo + timing window)
//!
//! ECS ответственность:
//! - Combo state machine (ComboController внутри MeleeCombatant)
//! - Timing window countdown, spark detection
//! - Attack camera stabilization
//! - Hit sweep → Health, DamageDealt / EntityDied
//!
//! Presentation (renderer, UI, animation) вне симуляции: читает
//! `ComboVisualState` и события, присылает `AttackNotify` / `BloomWindowClosed`.

use bevy::prelude::*;

pub mod attacker;
pub mod camera_stabilizer;
pub mod clips;
pub mod combatant;
pub mod controller;
pub mod damage;
pub mod effects;
pub mod error;
pub mod events;
pub mod facing;
pub mod interfaces;
pub mod scheduler;
pub mod systems;
pub mod timing_window;


// Re-export основных типов
pub use attacker::Attacker;
pub use camera_stabilizer::{CameraStabilizer, StabilizationConfig, UnlockDecision};
pub use clips::{AttackClip, AttackClips};
pub use combatant::{combatant_bundle, MeleeCombatant};
pub use controller::{AttackOutcome, CombatSignal, ComboConfig, ComboController, RejectReason};
pub use damage::{DamageDealt, Dead, EntityDied};
pub use effects::{ComboIndexEffectMap, EffectsCoordinator};
pub use error::{ComboError, ConfigError};
pub use events::{
    AttackInput, AttackNotify, AttackStarted, BloomWindowClosed, ComboEnded, ComboStateChanged,
    MeleeSweepRequested, SparkTriggered,
};
pub use timing_window::{SparkAttempt, TimingWindowConfig, TimingWindowEngine};

/// Combat Plugin
///
/// Регистрирует combat системы в FixedUpdate (60Hz).
///
/// Порядок выполнения:
/// 1. process_attack_inputs - attempt_attack (spark раньше window tick)
/// 2. process_attack_notifies - animation notify (primary path)
/// 3. tick_combo_controllers - window countdown + scheduled callbacks
/// 4. face_nearest_enemy_on_attack_start - поворот к цели для стартовавших атак
/// 5. resolve_melee_sweeps - hit sweep → Health → DamageDealt
/// 6. stabilize_attack_cameras - camera lock correction
/// 7. forward_external_window_closes - BloomWindowClosed (informational)
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        // Регистрация событий
        app.add_event::<AttackInput>()
            .add_event::<AttackNotify>()
            .add_event::<BloomWindowClosed>()
            .add_event::<AttackStarted>()
            .add_event::<SparkTriggered>()
            .add_event::<ComboStateChanged>()
            .add_event::<ComboEnded>()
            .add_event::<MeleeSweepRequested>()
            .add_event::<DamageDealt>()
            .add_event::<EntityDied>();

        app.add_systems(
            FixedUpdate,
            (
                systems::process_attack_inputs,
                systems::process_attack_notifies,
                systems::tick_combo_controllers,
                systems::face_nearest_enemy_on_attack_start,
                systems::resolve_melee_sweeps,
                systems::stabilize_attack_cameras,
                systems::forward_external_window_closes,
            )
                .chain(), // Последовательное выполнение
        );
    }
}
