//! Combo controller - state machine комбо-атак.
//!
//! Состояния:
//! - Idle → Attacking(0) по input
//! - Attacking(i) → WindowOpen(i) (окно открывается вместе с montage)
//! - WindowOpen(0) + spark → ждём следующий input (continue → Attacking(1))
//! - WindowOpen(i>0) + spark → auto-chain Attacking(i+1) через `chain_delay`
//! - WindowOpen → Idle по timeout или spark на последней стадии
//! - любое → Idle по `reset()`
//!
//! Пока окно открыто, input никогда не стартует атаку, только spark attempt.
//! Все отложенные действия живут в `ComboScheduler` и отменяются в `reset()`.

use serde::{Deserialize, Serialize};

use super::camera_stabilizer::{CameraStabilizer, StabilizationConfig};
use super::clips::{clip_for_stage, AttackClip, DEFAULT_STAGE_CLIPS};
use super::effects::{ComboIndexEffectMap, EffectsCoordinator};
use super::error::ComboError;
use super::interfaces::CombatHost;
use super::scheduler::{ComboScheduler, ScheduledAction};
use super::timing_window::{SparkAttempt, TimingWindowConfig, TimingWindowEngine, WindowEvent};
use crate::logger;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComboConfig {
    pub max_combo_attacks: usize,
    /// Minimum spacing between attack starts (seconds)
    pub attack_cooldown: f32,
    /// Chain resets this long after the last attack start
    pub combo_window_duration: f32,
    /// Delay before an auto-chained stage starts
    pub chain_delay: f32,
    /// Backup attack-notify at this fraction of the clip
    pub notify_fraction: f32,
    pub notify_guard_duration: f32,
    pub bloom_hide_lead: f32,
    pub bloom_hide_min: f32,
    /// Stage → authored clip index
    pub stage_clips: Vec<usize>,
    /// 0 = no mana gating
    pub mana_cost: f32,
    pub effects: ComboIndexEffectMap,
}

impl Default for ComboConfig {
    fn default() -> Self {
        Self {
            max_combo_attacks: 4,
            attack_cooldown: 0.5,
            combo_window_duration: 2.0,
            chain_delay: 0.05,
            notify_fraction: 0.6,
            notify_guard_duration: 0.5,
            bloom_hide_lead: 0.2,
            bloom_hide_min: 0.5,
            stage_clips: DEFAULT_STAGE_CLIPS.to_vec(),
            mana_cost: 0.0,
            effects: ComboIndexEffectMap::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    CooldownActive,
    /// Auto-chained stage already scheduled
    ChainPending,
    InsufficientMana,
    ActorUnavailable,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttackOutcome {
    Started {
        stage: usize,
        clip: AttackClip,
        duration: f32,
        /// Continued an existing chain (vs. fresh start)
        continued: bool,
    },
    /// Input absorbed by an open timing window
    SparkAttempt { success: bool },
    Rejected(RejectReason),
    Failed(ComboError),
}

impl AttackOutcome {
    pub fn started(&self) -> bool {
        matches!(self, AttackOutcome::Started { .. })
    }
}

/// Outbox entries, drained by the ECS layer into events.
#[derive(Debug, Clone, PartialEq)]
pub enum CombatSignal {
    AttackStarted {
        stage: usize,
        clip: AttackClip,
        duration: f32,
    },
    SparkTriggered {
        stage: usize,
    },
    ComboStateChanged {
        in_combat: bool,
    },
    /// Attack notify reached: run the hit sweep
    MeleeSweep {
        stage: usize,
    },
    ComboReset,
}

#[derive(Debug, Clone)]
pub struct ComboController {
    config: ComboConfig,
    window: TimingWindowEngine,
    camera: CameraStabilizer,
    effects: EffectsCoordinator,
    scheduler: ComboScheduler,

    current_attack_index: usize,
    in_combo: bool,
    hit_critical_window: bool,
    can_attack: bool,
    is_attacking: bool,
    attack_notify_in_progress: bool,
    current_clip_length: f32,
    now: f32,

    signals: Vec<CombatSignal>,
}

impl Default for ComboController {
    fn default() -> Self {
        Self::new(
            ComboConfig::default(),
            TimingWindowConfig::default(),
            StabilizationConfig::default(),
        )
    }
}

impl ComboController {
    pub fn new(
        config: ComboConfig,
        window: TimingWindowConfig,
        camera: StabilizationConfig,
    ) -> Self {
        let effects = EffectsCoordinator::new(config.effects);
        Self {
            config,
            window: TimingWindowEngine::new(window),
            camera: CameraStabilizer::new(camera),
            effects,
            scheduler: ComboScheduler::new(),
            current_attack_index: 0,
            in_combo: false,
            hit_critical_window: false,
            can_attack: true,
            is_attacking: false,
            attack_notify_in_progress: false,
            current_clip_length: 0.0,
            now: 0.0,
            signals: Vec::new(),
        }
    }

    /// Attack input entry point.
    pub fn attempt_attack<H: CombatHost>(&mut self, now: f32, host: &mut H) -> AttackOutcome {
        self.now = now;

        if !host.is_alive() {
            logger::log_warning("⚔️ Combo: attack input from dead actor ignored");
            return AttackOutcome::Rejected(RejectReason::ActorUnavailable);
        }

        // открытое окно поглощает input
        if self.window.is_open() {
            let attempt = self.window.try_trigger_spark();
            if let SparkAttempt::Triggered { .. } = attempt {
                self.on_spark_success(host);
            }
            return AttackOutcome::SparkAttempt {
                success: attempt.is_success(),
            };
        }

        if !self.can_attack {
            return AttackOutcome::Rejected(RejectReason::CooldownActive);
        }

        if self.scheduler.is_pending(ScheduledAction::AutoChain) {
            return AttackOutcome::Rejected(RejectReason::ChainPending);
        }

        let cost = self.config.mana_cost;
        if cost > 0.0 && !host.has_enough_mana(cost) {
            logger::log(&format!("⚔️ Combo: not enough mana ({:.1})", cost));
            return AttackOutcome::Rejected(RejectReason::InsufficientMana);
        }

        let last_stage = self.config.max_combo_attacks.saturating_sub(1);
        let continued =
            self.in_combo && self.hit_critical_window && self.current_attack_index < last_stage;

        if continued {
            self.advance(host);
        } else {
            if self.in_combo {
                self.reset(host);
            }
            self.current_attack_index = 0;
        }

        self.hit_critical_window = false;

        match self.start_stage(host) {
            Ok((clip, duration)) => {
                if cost > 0.0 {
                    host.consume_mana(cost);
                }
                self.can_attack = false;
                self.scheduler
                    .schedule_unique(self.config.attack_cooldown, ScheduledAction::CooldownReset);

                AttackOutcome::Started {
                    stage: self.current_attack_index,
                    clip,
                    duration,
                    continued,
                }
            }
            Err(err) => {
                logger::log_warning(&format!("⚔️ Combo: attack start failed: {}", err));
                self.reset_attack_state(host);
                AttackOutcome::Failed(err)
            }
        }
    }

    fn start_stage<H: CombatHost>(&mut self, host: &mut H) -> Result<(AttackClip, f32), ComboError> {
        let stage = self.current_attack_index;
        let clip = clip_for_stage(&self.config.stage_clips, stage);

        let duration = host.play_montage(clip);
        if !(duration > 0.0) {
            return Err(ComboError::AnimationFailed {
                clip: clip.0,
                duration,
            });
        }

        self.window.open(duration)?;

        self.current_clip_length = duration;
        self.is_attacking = true;
        // новая стадия, новый notify
        self.attack_notify_in_progress = false;
        self.scheduler.cancel_action(ScheduledAction::NotifyGuardReset);
        self.scheduler.cancel_action(ScheduledAction::BloomHide);
        self.camera.enable(self.now, host.position(), host.camera_rotation());
        self.start_combo_window();
        self.scheduler.schedule_unique(
            duration * self.config.notify_fraction,
            ScheduledAction::AttackNotify,
        );

        self.signals.push(CombatSignal::AttackStarted {
            stage,
            clip,
            duration,
        });
        logger::log(&format!(
            "⚔️ Combo: stage {} started (clip #{}, {:.2}s)",
            stage, clip.0, duration
        ));

        Ok((clip, duration))
    }

    fn start_combo_window(&mut self) {
        self.set_in_combo(true);
        self.scheduler.schedule_unique(
            self.config.combo_window_duration,
            ScheduledAction::ComboWindowExpired,
        );
    }

    /// Move to the next stage, or end the chain after the last one.
    ///
    /// A backup notify still pending for the stage being left fires first,
    /// so an early spark never skips that stage's hit sweep.
    pub fn advance<H: CombatHost>(&mut self, host: &mut H) {
        if self.scheduler.is_pending(ScheduledAction::AttackNotify) {
            self.on_attack_notify();
        }

        if self.current_attack_index + 1 < self.config.max_combo_attacks {
            self.current_attack_index += 1;
            logger::log(&format!("⚔️ Combo: advanced to stage {}", self.current_attack_index));
            self.effects
                .on_combo_index_changed(self.current_attack_index, host);
        } else {
            logger::log("⚔️ Combo: chain completed");
            self.reset(host);
        }
    }

    /// Back to Idle. Cancels every pending callback; safe to call repeatedly.
    pub fn reset<H: CombatHost>(&mut self, host: &mut H) {
        let changed = self.in_combo
            || self.current_attack_index != 0
            || self.hit_critical_window
            || self.is_attacking
            || self.window.is_open()
            || !self.scheduler.is_empty();

        self.current_attack_index = 0;
        self.set_in_combo(false);
        self.hit_critical_window = false;
        self.window.close();
        self.scheduler.cancel_all();
        self.attack_notify_in_progress = false;
        self.can_attack = true;
        self.is_attacking = false;

        self.camera
            .disable(self.now, host.is_any_movement_or_dash_key_pressed());
        self.effects.revert(host);

        if changed {
            self.signals.push(CombatSignal::ComboReset);
            logger::log("⚔️ Combo: reset to idle");
        }
    }

    /// Attack finished (cooldown elapsed or start failed).
    pub fn reset_attack_state<H: CombatHost>(&mut self, host: &mut H) {
        self.can_attack = true;
        self.is_attacking = false;
        self.camera
            .disable(self.now, host.is_any_movement_or_dash_key_pressed());

        if !self.hit_critical_window && !self.window.is_open() {
            self.reset(host);
        }
    }

    fn on_spark_success<H: CombatHost>(&mut self, host: &mut H) {
        self.hit_critical_window = true;
        self.signals.push(CombatSignal::SparkTriggered {
            stage: self.current_attack_index,
        });

        // первый удар цепочки: следующий input продолжит
        if !self.in_combo || self.current_attack_index == 0 {
            self.set_in_combo(true);
            self.effects
                .on_combo_index_changed(self.current_attack_index, host);
            return;
        }

        self.advance(host);
        if self.in_combo {
            self.scheduler
                .schedule_unique(self.config.chain_delay, ScheduledAction::AutoChain);
        }
    }

    fn on_window_timeout<H: CombatHost>(&mut self, host: &mut H) {
        if self.hit_critical_window {
            return;
        }
        logger::log(&format!(
            "⚔️ Combo: window timed out at stage {}",
            self.current_attack_index
        ));
        self.reset(host);
    }

    /// Fixed-step update: window countdown first, then due callbacks.
    pub fn tick<H: CombatHost>(&mut self, now: f32, delta: f32, host: &mut H) {
        self.now = now;

        if !host.is_alive() {
            if self.is_active() {
                logger::log_warning("⚔️ Combo: owner died mid-chain, resetting");
                self.reset(host);
            }
            // bloom / spark только доигрывают
            self.window.tick(delta);
            return;
        }

        if let Some(WindowEvent::TimedOut) = self.window.tick(delta) {
            self.on_window_timeout(host);
        }

        self.scheduler.advance(delta);
        while let Some((_, action)) = self.scheduler.pop_due() {
            self.run_scheduled(action, host);
        }
    }

    fn run_scheduled<H: CombatHost>(&mut self, action: ScheduledAction, host: &mut H) {
        match action {
            ScheduledAction::CooldownReset => self.reset_attack_state(host),
            ScheduledAction::ComboWindowExpired => {
                logger::log("⚔️ Combo: combo window expired");
                self.reset(host);
            }
            ScheduledAction::AutoChain => {
                self.hit_critical_window = false;
                if let Err(err) = self.start_stage(host) {
                    logger::log_warning(&format!("⚔️ Combo: auto-chain failed: {}", err));
                    self.reset_attack_state(host);
                }
            }
            ScheduledAction::AttackNotify => {
                self.on_attack_notify();
            }
            ScheduledAction::NotifyGuardReset => {
                self.attack_notify_in_progress = false;
            }
            ScheduledAction::BloomHide => {
                self.window.hide_bloom_if_closed();
            }
        }
    }

    /// Attack-notify (animation event or backup timer). Returns `false` for
    /// a duplicate inside the guard interval.
    pub fn on_attack_notify(&mut self) -> bool {
        if !self.in_combo {
            logger::log("⚔️ Combo: attack notify outside of a chain ignored");
            return false;
        }

        if self.attack_notify_in_progress {
            logger::log("⚔️ Combo: duplicate attack notify ignored");
            return false;
        }

        self.attack_notify_in_progress = true;
        self.scheduler.schedule_unique(
            self.config.notify_guard_duration,
            ScheduledAction::NotifyGuardReset,
        );
        self.scheduler.cancel_action(ScheduledAction::AttackNotify);

        self.signals.push(CombatSignal::MeleeSweep {
            stage: self.current_attack_index,
        });

        let hide_after = (self.current_clip_length - self.config.bloom_hide_lead)
            .max(self.config.bloom_hide_min);
        self.scheduler
            .schedule_unique(hide_after, ScheduledAction::BloomHide);

        true
    }

    /// Presentation layer reports the bloom widget closed. Informational only.
    pub fn on_timing_window_closed_externally(&mut self) -> bool {
        self.window.notify_closed_externally()
    }

    fn set_in_combo(&mut self, value: bool) {
        if self.in_combo != value {
            self.in_combo = value;
            self.signals
                .push(CombatSignal::ComboStateChanged { in_combat: value });
        }
    }

    fn is_active(&self) -> bool {
        self.in_combo || self.is_attacking || self.window.is_open() || !self.scheduler.is_empty()
    }

    pub fn drain_signals(&mut self) -> Vec<CombatSignal> {
        std::mem::take(&mut self.signals)
    }

    pub fn is_in_combo(&self) -> bool {
        self.in_combo
    }

    pub fn current_attack_index(&self) -> usize {
        self.current_attack_index
    }

    pub fn is_timing_window_active(&self) -> bool {
        self.window.is_open()
    }

    pub fn has_hit_critical_window(&self) -> bool {
        self.hit_critical_window
    }

    pub fn can_attack(&self) -> bool {
        self.can_attack
    }

    pub fn is_attacking(&self) -> bool {
        self.is_attacking
    }

    pub fn is_attack_notify_in_progress(&self) -> bool {
        self.attack_notify_in_progress
    }

    pub fn config(&self) -> &ComboConfig {
        &self.config
    }

    pub fn window(&self) -> &TimingWindowEngine {
        &self.window
    }

    pub fn camera(&self) -> &CameraStabilizer {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut CameraStabilizer {
        &mut self.camera
    }

    pub fn effects(&self) -> &EffectsCoordinator {
        &self.effects
    }

    pub fn scheduler(&self) -> &ComboScheduler {
        &self.scheduler
    }
}
