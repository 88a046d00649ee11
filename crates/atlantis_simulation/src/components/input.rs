//! Player input state (movement axis + dash)

use bevy::prelude::*;

/// Axis magnitude above which movement counts as pressed.
pub const MOVEMENT_AXIS_DEADZONE: f32 = 0.1;

/// Текущее состояние movement/dash клавиш.
///
/// Пишется input layer'ом (или тестом), читается combat системами:
/// movement/dash ломает camera lock.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct MovementKeys {
    pub axis: Vec2,
    pub dash_pressed: bool,
}

impl MovementKeys {
    pub fn any_pressed(&self) -> bool {
        self.dash_pressed || self.axis.length() > MOVEMENT_AXIS_DEADZONE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deadzone() {
        let mut keys = MovementKeys::default();
        assert!(!keys.any_pressed());

        keys.axis = Vec2::new(0.05, 0.05);
        assert!(!keys.any_pressed());

        keys.axis = Vec2::new(0.0, 1.0);
        assert!(keys.any_pressed());
    }

    #[test]
    fn test_dash_counts_as_movement() {
        let keys = MovementKeys {
            axis: Vec2::ZERO,
            dash_pressed: true,
        };
        assert!(keys.any_pressed());
    }
}
