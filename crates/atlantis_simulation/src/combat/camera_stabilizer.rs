//! Attack camera stabilization.
//!
//! Во время атаки камера "залочена" на позицию/поворот в момент enable().
//! Коррекция только через lerp/slerp (никогда прямое присваивание), поэтому
//! за один tick смещение ограничено `alpha * |actual - locked|`, alpha < 1.
//!
//! Правила override:
//! - движение/dash при breakable stabilization → skip (или слабый pull)
//! - disable() отклоняется до `minimum_lock_duration`, если нет movement input

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::logger;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StabilizationConfig {
    pub stabilization_strength: f32,
    /// Distance below which normal correction is not applied
    pub stabilization_threshold: f32,
    pub lerp_speed: f32,
    pub rotation_stabilization_strength: f32,
    /// Strength used past `ultra_threshold`
    pub extended_stabilization_strength: f32,
    /// Ignore the vertical axis when measuring drift
    pub allow_vertical_movement: bool,
    pub allow_rotation_during_attacks: bool,
    /// Movement input may weaken or suspend stabilization
    pub breakable_stabilization: bool,
    pub movement_input_strength: f32,
    pub disable_on_movement_input: bool,
    pub position_tolerance: f32,
    pub rotation_tolerance_degrees: f32,
    pub ultra_stabilization: bool,
    pub ultra_threshold: f32,
    pub proximity_stabilization: bool,
    pub proximity_distance: f32,
    pub proximity_strength: f32,
    pub minimum_lock_duration: f32,
    pub persistent_stabilization: bool,
    pub combat_mode: bool,
    pub combat_mode_duration: f32,
    pub strength_multiplier: f32,
    pub ultra_multiplier: f32,
    /// Weak pull starts at `stabilization_threshold * weak_threshold_factor`
    pub weak_threshold_factor: f32,
    /// Upper bound for the per-tick interpolation factor
    pub max_step_fraction: f32,
}

impl Default for StabilizationConfig {
    fn default() -> Self {
        Self {
            stabilization_strength: 0.99,
            stabilization_threshold: 0.1,
            lerp_speed: 100.0,
            rotation_stabilization_strength: 0.999,
            extended_stabilization_strength: 0.999,
            allow_vertical_movement: true,
            allow_rotation_during_attacks: false,
            breakable_stabilization: true,
            movement_input_strength: 0.1,
            disable_on_movement_input: true,
            position_tolerance: 0.01,
            rotation_tolerance_degrees: 0.01,
            ultra_stabilization: true,
            ultra_threshold: 0.8,
            proximity_stabilization: false,
            proximity_distance: 200.0,
            proximity_strength: 0.95,
            minimum_lock_duration: 3.0,
            persistent_stabilization: true,
            combat_mode: true,
            combat_mode_duration: 15.0,
            strength_multiplier: 2.0,
            ultra_multiplier: 5.0,
            weak_threshold_factor: 3.0,
            max_step_fraction: 0.95,
        }
    }
}

impl StabilizationConfig {
    /// Largest multiplier any correction path may use.
    pub fn max_strength_multiplier(&self) -> f32 {
        self.strength_multiplier.max(self.ultra_multiplier)
    }
}

/// Per-tick inputs from the owning actor.
#[derive(Debug, Clone, Copy, Default)]
pub struct StabilizationFrame {
    pub now: f32,
    pub delta: f32,
    pub is_attacking: bool,
    pub movement_pressed: bool,
    pub near_other_actor: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UnlockDecision {
    Released { held_for: f32 },
    /// Movement input overrode the minimum lock duration
    Forced { held_for: f32 },
    /// Lock kept; released later by `tick` once the minimum has elapsed
    Refused { held_for: f32 },
    AlreadyUnlocked,
}

impl UnlockDecision {
    pub fn is_unlocked(&self) -> bool {
        !matches!(self, UnlockDecision::Refused { .. })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StabilizationStep {
    pub stabilizing: bool,
    pub position_corrected: bool,
    pub rotation_corrected: bool,
    pub skipped_for_input: bool,
    /// Deferred unlock completed this tick
    pub released: bool,
}

#[derive(Debug, Clone)]
pub struct CameraStabilizer {
    config: StabilizationConfig,
    locked_position: Vec3,
    locked_rotation: Quat,
    position_locked: bool,
    rotation_locked: bool,
    lock_start_time: f32,
    in_combat_mode: bool,
    last_combat_activity_time: f32,
    pending_unlock: bool,
}

impl Default for CameraStabilizer {
    fn default() -> Self {
        Self::new(StabilizationConfig::default())
    }
}

impl CameraStabilizer {
    pub fn new(config: StabilizationConfig) -> Self {
        Self {
            config,
            locked_position: Vec3::ZERO,
            locked_rotation: Quat::IDENTITY,
            position_locked: false,
            rotation_locked: false,
            lock_start_time: 0.0,
            in_combat_mode: false,
            last_combat_activity_time: 0.0,
            pending_unlock: false,
        }
    }

    /// Lock onto the current transform. Re-enabling supersedes any previous lock.
    pub fn enable(&mut self, now: f32, position: Vec3, rotation: Quat) {
        self.locked_position = position;
        self.locked_rotation = rotation;
        self.position_locked = true;
        self.rotation_locked = !self.config.allow_rotation_during_attacks;
        self.lock_start_time = now;
        self.in_combat_mode = self.config.combat_mode;
        self.last_combat_activity_time = now;
        self.pending_unlock = false;

        logger::log(&format!(
            "🎥 Camera: stabilization enabled at {:?} (rotation locked: {})",
            position, self.rotation_locked
        ));
    }

    pub fn disable(&mut self, now: f32, movement_pressed: bool) -> UnlockDecision {
        if !self.is_locked() {
            return UnlockDecision::AlreadyUnlocked;
        }

        let held_for = now - self.lock_start_time;
        let too_early =
            self.config.persistent_stabilization && held_for < self.config.minimum_lock_duration;

        if too_early && !movement_pressed {
            self.pending_unlock = true;
            logger::log(&format!(
                "🎥 Camera: unlock refused ({:.2}s < {:.2}s minimum)",
                held_for, self.config.minimum_lock_duration
            ));
            return UnlockDecision::Refused { held_for };
        }

        self.clear_lock();

        if too_early {
            logger::log(&format!(
                "🎥 Camera: unlock forced by movement input after {:.2}s",
                held_for
            ));
            UnlockDecision::Forced { held_for }
        } else {
            logger::log(&format!("🎥 Camera: stabilization released after {:.2}s", held_for));
            UnlockDecision::Released { held_for }
        }
    }

    pub fn should_stabilize(&self, frame: &StabilizationFrame) -> bool {
        if !self.is_locked() {
            return false;
        }

        if frame.is_attacking {
            return true;
        }

        if self.config.combat_mode
            && self.in_combat_mode
            && frame.now - self.last_combat_activity_time < self.config.combat_mode_duration
        {
            return true;
        }

        self.config.proximity_stabilization && frame.near_other_actor
    }

    /// Correct `position`/`rotation` toward the lock. Only writer of the
    /// camera transform while a lock is active.
    pub fn tick(
        &mut self,
        frame: StabilizationFrame,
        position: &mut Vec3,
        rotation: &mut Quat,
    ) -> StabilizationStep {
        let mut step = StabilizationStep::default();

        if self.pending_unlock {
            let held_for = frame.now - self.lock_start_time;
            if held_for >= self.config.minimum_lock_duration || frame.movement_pressed {
                self.clear_lock();
                logger::log(&format!("🎥 Camera: deferred unlock after {:.2}s", held_for));
                step.released = true;
                return step;
            }
        }

        if frame.is_attacking && self.is_locked() {
            self.last_combat_activity_time = frame.now;
        }

        if !self.should_stabilize(&frame) {
            return step;
        }
        step.stabilizing = true;

        let input_override = frame.movement_pressed && self.config.breakable_stabilization;
        if input_override && self.config.disable_on_movement_input {
            step.skipped_for_input = true;
            return step;
        }

        if self.position_locked {
            step.position_corrected = self.correct_position(&frame, input_override, position);
        }
        if self.rotation_locked {
            step.rotation_corrected = self.correct_rotation(&frame, input_override, rotation);
        }

        step
    }

    fn correct_position(
        &self,
        frame: &StabilizationFrame,
        input_override: bool,
        position: &mut Vec3,
    ) -> bool {
        let mut target = self.locked_position;
        if self.config.allow_vertical_movement {
            target.y = position.y;
        }

        let distance = position.distance(target);
        if distance <= self.config.position_tolerance {
            return false;
        }

        let cfg = &self.config;
        let speed = if input_override {
            if distance <= cfg.stabilization_threshold * cfg.weak_threshold_factor {
                return false;
            }
            cfg.lerp_speed * cfg.movement_input_strength
        } else if cfg.ultra_stabilization && distance > cfg.ultra_threshold {
            cfg.lerp_speed * cfg.extended_stabilization_strength * cfg.ultra_multiplier
        } else if distance > cfg.stabilization_threshold {
            cfg.lerp_speed * self.effective_strength(frame) * cfg.strength_multiplier
        } else {
            return false;
        };

        let alpha = self.step_alpha(frame.delta, speed);
        *position = position.lerp(target, alpha);
        true
    }

    fn correct_rotation(
        &self,
        frame: &StabilizationFrame,
        input_override: bool,
        rotation: &mut Quat,
    ) -> bool {
        let angle = rotation.angle_between(self.locked_rotation).to_degrees();
        if angle <= self.config.rotation_tolerance_degrees {
            return false;
        }

        let cfg = &self.config;
        let speed = if input_override {
            cfg.lerp_speed * cfg.movement_input_strength
        } else {
            cfg.lerp_speed * cfg.rotation_stabilization_strength * cfg.strength_multiplier
        };

        let alpha = self.step_alpha(frame.delta, speed);
        *rotation = rotation.slerp(self.locked_rotation, alpha).normalize();
        true
    }

    fn effective_strength(&self, frame: &StabilizationFrame) -> f32 {
        if self.config.proximity_stabilization && frame.near_other_actor {
            self.config
                .stabilization_strength
                .max(self.config.proximity_strength)
        } else {
            self.config.stabilization_strength
        }
    }

    fn step_alpha(&self, delta: f32, speed: f32) -> f32 {
        (delta * speed).clamp(0.0, self.config.max_step_fraction)
    }

    fn clear_lock(&mut self) {
        self.position_locked = false;
        self.rotation_locked = false;
        self.in_combat_mode = false;
        self.pending_unlock = false;
    }

    pub fn is_locked(&self) -> bool {
        self.position_locked || self.rotation_locked
    }

    pub fn is_position_locked(&self) -> bool {
        self.position_locked
    }

    pub fn is_rotation_locked(&self) -> bool {
        self.rotation_locked
    }

    pub fn is_unlock_pending(&self) -> bool {
        self.pending_unlock
    }

    pub fn in_combat_mode(&self) -> bool {
        self.in_combat_mode
    }

    pub fn locked_position(&self) -> Vec3 {
        self.locked_position
    }

    pub fn locked_rotation(&self) -> Quat {
        self.locked_rotation
    }

    pub fn lock_start_time(&self) -> f32 {
        self.lock_start_time
    }

    pub fn config(&self) -> &StabilizationConfig {
        &self.config
    }
}

/// Any of `others` within `radius` of `position`?
pub fn is_near_other_actor(
    position: Vec3,
    others: impl IntoIterator<Item = Vec3>,
    radius: f32,
) -> bool {
    others
        .into_iter()
        .any(|other| other.distance_squared(position) <= radius * radius)
}
