//! Combo systems: input → controller → events.
//!
//! Порядок внутри FixedUpdate (см. `CombatPlugin`):
//! input (spark attempt) → notify → tick (window + scheduler) → facing → hit sweep.
//! Spark проверяется раньше window tick того же шага.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use crate::combat::attacker::Attacker;
use crate::combat::clips::{AttackClip, AttackClips};
use crate::combat::combatant::MeleeCombatant;
use crate::combat::controller::{AttackOutcome, CombatSignal, ComboController};
use crate::combat::damage::{perform_damage_sweep, DamageDealt, Dead, EntityDied};
use crate::combat::events::{
    AttackInput, AttackNotify, AttackStarted, BloomWindowClosed, ComboEnded, ComboStateChanged,
    MeleeSweepRequested, SparkTriggered,
};
use crate::combat::facing::{nearest_enemy, yaw_towards, FACE_ENEMY_RADIUS};
use crate::combat::interfaces::{
    ActorView, ComboVisuals, DamageSink, ManaPool, MontagePlayer, MovementInputQuery,
};
use crate::components::{Actor, CameraBoom, ComboVisualState, Health, Mana, MovementKeys};
use crate::logger;

/// Collaborator adapter over one combatant's sibling components.
struct CombatantHost<'a> {
    alive: bool,
    position: Vec3,
    camera_rotation: Quat,
    movement_pressed: bool,
    clips: &'a AttackClips,
    visuals: &'a mut ComboVisualState,
    mana: Option<&'a mut Mana>,
}

impl ActorView for CombatantHost<'_> {
    fn is_alive(&self) -> bool {
        self.alive
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn camera_rotation(&self) -> Quat {
        self.camera_rotation
    }
}

impl MontagePlayer for CombatantHost<'_> {
    fn play_montage(&mut self, clip: AttackClip) -> f32 {
        self.clips.length_of(clip)
    }
}

impl MovementInputQuery for CombatantHost<'_> {
    fn is_any_movement_or_dash_key_pressed(&self) -> bool {
        self.movement_pressed
    }
}

impl ComboVisuals for CombatantHost<'_> {
    fn set_weapon_effect_active(&mut self, active: bool) {
        self.visuals.set_weapon_effect_active(active);
    }

    fn set_reveal_mesh_visible(&mut self, visible: bool) {
        self.visuals.set_reveal_mesh_visible(visible);
    }
}

impl ManaPool for CombatantHost<'_> {
    fn has_enough_mana(&self, cost: f32) -> bool {
        // без Mana компонента gating выключен
        self.mana.as_ref().is_none_or(|mana| mana.can_afford(cost))
    }

    fn consume_mana(&mut self, cost: f32) {
        if let Some(mana) = self.mana.as_mut() {
            mana.consume(cost);
        }
    }
}

/// Bloom/spark presentation follows the window engine.
fn sync_window_visuals(controller: &ComboController, visuals: &mut ComboVisualState) {
    let window = controller.window();
    visuals.bloom_visible = window.is_bloom_visible();
    visuals.bloom_scale = window.scale();
    visuals.spark_visible = window.is_spark_visible();
}

/// All outbound combo events, published from controller signals.
#[derive(SystemParam)]
pub struct ComboEventWriters<'w> {
    attack_started: EventWriter<'w, AttackStarted>,
    spark_triggered: EventWriter<'w, SparkTriggered>,
    state_changed: EventWriter<'w, ComboStateChanged>,
    combo_ended: EventWriter<'w, ComboEnded>,
    sweeps: EventWriter<'w, MeleeSweepRequested>,
}

impl ComboEventWriters<'_> {
    fn publish(&mut self, entity: Entity, signals: Vec<CombatSignal>) {
        for signal in signals {
            match signal {
                CombatSignal::AttackStarted {
                    stage,
                    clip,
                    duration,
                } => {
                    self.attack_started.write(AttackStarted {
                        attacker: entity,
                        stage,
                        clip: clip.0,
                        duration,
                    });
                }
                CombatSignal::SparkTriggered { stage } => {
                    logger::log_info(&format!(
                        "✨ ECS: spark at stage {} (entity: {:?})",
                        stage, entity
                    ));
                    self.spark_triggered.write(SparkTriggered {
                        attacker: entity,
                        stage,
                    });
                }
                CombatSignal::ComboStateChanged { in_combat } => {
                    self.state_changed.write(ComboStateChanged { entity, in_combat });
                }
                CombatSignal::MeleeSweep { stage } => {
                    self.sweeps.write(MeleeSweepRequested {
                        attacker: entity,
                        stage,
                    });
                }
                CombatSignal::ComboReset => {
                    self.combo_ended.write(ComboEnded { entity });
                }
            }
        }
    }
}

type CombatantItems = (
    &'static mut MeleeCombatant,
    &'static Transform,
    &'static Health,
    &'static AttackClips,
    &'static mut ComboVisualState,
    Option<&'static MovementKeys>,
    Option<&'static CameraBoom>,
    Option<&'static mut Mana>,
);

/// System: повернуть атакующего к ближайшему врагу
///
/// Реагирует на `AttackStarted` (input и auto-chain), так что отклонённый
/// input никого не поворачивает.
pub fn face_nearest_enemy_on_attack_start(
    mut started: EventReader<AttackStarted>,
    mut actors: Query<(Entity, &mut Transform, &Actor, &Health), Without<Dead>>,
) {
    for event in started.read() {
        let Ok((_, transform, actor, _)) = actors.get(event.attacker) else {
            continue;
        };
        let origin = transform.translation;
        let faction = actor.faction_id;

        let enemies: Vec<(Entity, Vec3)> = actors
            .iter()
            .filter(|(entity, _, other, health)| {
                *entity != event.attacker && other.faction_id != faction && health.is_alive()
            })
            .map(|(entity, transform, _, _)| (entity, transform.translation))
            .collect();

        let Some((target, target_position)) = nearest_enemy(origin, FACE_ENEMY_RADIUS, enemies)
        else {
            continue;
        };
        let Some(rotation) = yaw_towards(origin, target_position) else {
            continue;
        };

        if let Ok((_, mut transform, _, _)) = actors.get_mut(event.attacker) {
            transform.rotation = rotation;
            logger::log(&format!(
                "🎯 ECS: {:?} faces nearest enemy {:?}",
                event.attacker, target
            ));
        }
    }
}

/// System: attack input → `attempt_attack`
pub fn process_attack_inputs(
    time: Res<Time<Fixed>>,
    mut inputs: EventReader<AttackInput>,
    mut combatants: Query<CombatantItems>,
    mut writers: ComboEventWriters,
) {
    let now = time.elapsed_secs();

    for input in inputs.read() {
        let Ok((mut combatant, transform, health, clips, mut visuals, keys, boom, mut mana)) =
            combatants.get_mut(input.attacker)
        else {
            logger::log_warning(&format!(
                "⚔️ ECS: attack input for non-combatant {:?}",
                input.attacker
            ));
            continue;
        };

        let outcome = {
            let mut host = CombatantHost {
                alive: health.is_alive(),
                position: transform.translation,
                camera_rotation: boom.map(|b| b.rotation).unwrap_or(Quat::IDENTITY),
                movement_pressed: keys.is_some_and(|k| k.any_pressed()),
                clips,
                visuals: &mut visuals,
                mana: mana.as_deref_mut(),
            };
            combatant.attempt_attack(now, &mut host)
        };

        match &outcome {
            AttackOutcome::Started {
                stage,
                clip,
                duration,
                continued,
            } => {
                logger::log(&format!(
                    "⚔️ ECS: attack stage {} (clip #{}, {:.2}s, continued: {}) (entity: {:?})",
                    stage, clip.0, duration, continued, input.attacker
                ));
            }
            AttackOutcome::SparkAttempt { success } => {
                logger::log(&format!(
                    "✨ ECS: input absorbed as spark attempt (success: {}) (entity: {:?})",
                    success, input.attacker
                ));
            }
            AttackOutcome::Rejected(reason) => {
                logger::log(&format!(
                    "⚔️ ECS: attack rejected: {:?} (entity: {:?})",
                    reason, input.attacker
                ));
            }
            AttackOutcome::Failed(err) => {
                logger::log_warning(&format!(
                    "⚔️ ECS: attack failed: {} (entity: {:?})",
                    err, input.attacker
                ));
            }
        }

        sync_window_visuals(&combatant, &mut visuals);
        let signals = combatant.drain_signals();
        writers.publish(input.attacker, signals);
    }
}

/// System: animation attack-notify (primary path; backup timer в контроллере)
pub fn process_attack_notifies(
    mut notifies: EventReader<AttackNotify>,
    mut combatants: Query<&mut MeleeCombatant>,
    mut writers: ComboEventWriters,
) {
    for notify in notifies.read() {
        let Ok(mut combatant) = combatants.get_mut(notify.attacker) else {
            continue;
        };

        combatant.on_attack_notify();
        let signals = combatant.drain_signals();
        writers.publish(notify.attacker, signals);
    }
}

/// System: window countdown + scheduled callbacks
pub fn tick_combo_controllers(
    time: Res<Time<Fixed>>,
    mut combatants: Query<(Entity, CombatantItems)>,
    mut writers: ComboEventWriters,
) {
    let now = time.elapsed_secs();
    let delta = time.delta_secs();

    for (entity, (mut combatant, transform, health, clips, mut visuals, keys, boom, mut mana)) in
        combatants.iter_mut()
    {
        {
            let mut host = CombatantHost {
                alive: health.is_alive(),
                position: transform.translation,
                camera_rotation: boom.map(|b| b.rotation).unwrap_or(Quat::IDENTITY),
                movement_pressed: keys.is_some_and(|k| k.any_pressed()),
                clips,
                visuals: &mut visuals,
                mana: mana.as_deref_mut(),
            };
            combatant.tick(now, delta, &mut host);
        }

        sync_window_visuals(&combatant, &mut visuals);
        let signals = combatant.drain_signals();
        if !signals.is_empty() {
            writers.publish(entity, signals);
        }
    }
}

type SweepTargets<'w, 's> =
    Query<'w, 's, (Entity, &'static Transform, &'static mut Health), Without<Dead>>;

/// Applies sweep damage straight to `Health`.
struct HealthSink<'a, 'w, 's> {
    targets: &'a mut SweepTargets<'w, 's>,
}

impl DamageSink for HealthSink<'_, '_, '_> {
    fn apply_point_damage(&mut self, target: Entity, amount: u32, _source: Entity) -> u32 {
        let Ok((_, _, mut health)) = self.targets.get_mut(target) else {
            return 0;
        };
        health.take_damage(amount)
    }
}

/// System: hit sweep → Health → DamageDealt / EntityDied
pub fn resolve_melee_sweeps(
    mut commands: Commands,
    mut sweeps: EventReader<MeleeSweepRequested>,
    attackers: Query<(&Transform, &Attacker)>,
    mut targets: SweepTargets,
    mut damage_dealt_events: EventWriter<DamageDealt>,
    mut entity_died_events: EventWriter<EntityDied>,
) {
    for sweep in sweeps.read() {
        let Ok((transform, attacker)) = attackers.get(sweep.attacker) else {
            continue;
        };
        let origin = transform.translation;
        let radius = attacker.attack_radius;
        let amount = attacker.total_damage();

        let candidates: Vec<(Entity, Vec3)> = targets
            .iter()
            .filter(|(_, _, health)| health.is_alive())
            .map(|(entity, transform, _)| (entity, transform.translation))
            .collect();

        let mut sink = HealthSink {
            targets: &mut targets,
        };
        let hits = perform_damage_sweep(origin, radius, sweep.attacker, amount, candidates, &mut sink);

        for hit in hits {
            let target_died = targets
                .get(hit.target)
                .map(|(_, _, health)| !health.is_alive())
                .unwrap_or(false);

            damage_dealt_events.write(DamageDealt {
                attacker: sweep.attacker,
                target: hit.target,
                damage: hit.applied,
                target_died,
            });
            logger::log(&format!(
                "💥 ECS: {:?} hit {:?} for {} (stage {})",
                sweep.attacker, hit.target, hit.applied, sweep.stage
            ));

            if target_died {
                commands.entity(hit.target).insert(Dead);
                entity_died_events.write(EntityDied {
                    entity: hit.target,
                    killer: Some(sweep.attacker),
                });
                logger::log_info(&format!(
                    "💀 ECS: {:?} killed by {:?}",
                    hit.target, sweep.attacker
                ));
            }
        }
    }
}

/// System: BloomWindowClosed от presentation layer (informational)
pub fn forward_external_window_closes(
    mut closes: EventReader<BloomWindowClosed>,
    mut combatants: Query<(&mut MeleeCombatant, &mut ComboVisualState)>,
) {
    for close in closes.read() {
        let Ok((mut combatant, mut visuals)) = combatants.get_mut(close.entity) else {
            continue;
        };

        if !combatant.on_timing_window_closed_externally() && combatant.is_timing_window_active() {
            logger::log(&format!(
                "⏱️ ECS: external bloom close ignored, window still open (entity: {:?})",
                close.entity
            ));
        }
        sync_window_visuals(&combatant, &mut visuals);
    }
}
