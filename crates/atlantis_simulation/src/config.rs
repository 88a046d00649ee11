//! Combat tunables (RON).
//!
//! Все поля имеют reference defaults, в RON можно указывать только то,
//! что отличается:
//!
//! ```ron
//! (
//!     combo: (attack_cooldown: 0.4),
//!     window: (critical_threshold: 0.35),
//! )
//! ```

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::combat::camera_stabilizer::StabilizationConfig;
use crate::combat::controller::ComboConfig;
use crate::combat::error::ConfigError;
use crate::combat::timing_window::TimingWindowConfig;

#[derive(Resource, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    pub combo: ComboConfig,
    pub window: TimingWindowConfig,
    pub camera: StabilizationConfig,
}

impl CombatConfig {
    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        let config: CombatConfig = ron::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        let pretty = ron::ser::PrettyConfig::default();
        Ok(ron::ser::to_string_pretty(self, pretty)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let combo = &self.combo;
        if combo.max_combo_attacks == 0 {
            return Err(ConfigError::invalid("combo.max_combo_attacks", "must be at least 1"));
        }
        if combo.stage_clips.len() < combo.max_combo_attacks {
            return Err(ConfigError::invalid(
                "combo.stage_clips",
                format!(
                    "{} entries for {} stages",
                    combo.stage_clips.len(),
                    combo.max_combo_attacks
                ),
            ));
        }
        positive("combo.attack_cooldown", combo.attack_cooldown)?;
        positive("combo.combo_window_duration", combo.combo_window_duration)?;
        non_negative("combo.chain_delay", combo.chain_delay)?;
        unit_interval("combo.notify_fraction", combo.notify_fraction)?;
        positive("combo.notify_guard_duration", combo.notify_guard_duration)?;
        non_negative("combo.mana_cost", combo.mana_cost)?;

        let window = &self.window;
        if !(window.critical_threshold > 0.0 && window.critical_threshold < 1.0) {
            return Err(ConfigError::invalid(
                "window.critical_threshold",
                format!("{} is outside (0, 1)", window.critical_threshold),
            ));
        }
        positive("window.default_duration", window.default_duration)?;
        positive("window.min_duration", window.min_duration)?;
        if window.max_duration < window.min_duration {
            return Err(ConfigError::invalid(
                "window.max_duration",
                format!("{} < min_duration {}", window.max_duration, window.min_duration),
            ));
        }
        positive("window.spark_visible_duration", window.spark_visible_duration)?;

        let camera = &self.camera;
        unit_interval("camera.stabilization_strength", camera.stabilization_strength)?;
        unit_interval(
            "camera.rotation_stabilization_strength",
            camera.rotation_stabilization_strength,
        )?;
        unit_interval(
            "camera.extended_stabilization_strength",
            camera.extended_stabilization_strength,
        )?;
        unit_interval("camera.movement_input_strength", camera.movement_input_strength)?;
        unit_interval("camera.proximity_strength", camera.proximity_strength)?;
        positive("camera.lerp_speed", camera.lerp_speed)?;
        non_negative("camera.minimum_lock_duration", camera.minimum_lock_duration)?;
        positive("camera.combat_mode_duration", camera.combat_mode_duration)?;
        if !(camera.max_step_fraction > 0.0 && camera.max_step_fraction < 1.0) {
            return Err(ConfigError::invalid(
                "camera.max_step_fraction",
                format!("{} is outside (0, 1)", camera.max_step_fraction),
            ));
        }

        Ok(())
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("{} must be > 0", value)))
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("{} must be >= 0", value)))
    }
}

fn unit_interval(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("{} is outside [0, 1]", value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(CombatConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_ron_uses_defaults() {
        let config = CombatConfig::from_ron_str(
            "(combo: (attack_cooldown: 0.4), window: (critical_threshold: 0.35))",
        )
        .unwrap();

        assert_eq!(config.combo.attack_cooldown, 0.4);
        assert_eq!(config.combo.max_combo_attacks, 4);
        assert_eq!(config.window.critical_threshold, 0.35);
        assert_eq!(config.window.default_duration, 0.8);
        assert_eq!(config.camera, StabilizationConfig::default());
    }

    #[test]
    fn test_ron_export_reloads() {
        let mut config = CombatConfig::default();
        config.combo.mana_cost = 12.5;

        let text = config.to_ron_string().unwrap();
        assert_eq!(CombatConfig::from_ron_str(&text).unwrap(), config);
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        let err = CombatConfig::from_ron_str("(window: (critical_threshold: 1.5))").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "window.critical_threshold",
                ..
            }
        ));
    }

    #[test]
    fn test_short_clip_table_rejected() {
        let err = CombatConfig::from_ron_str("(combo: (stage_clips: [0, 1]))").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "combo.stage_clips",
                ..
            }
        ));
    }

    #[test]
    fn test_malformed_ron_is_parse_error() {
        let err = CombatConfig::from_ron_str("(combo: ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
