//! Presentation state for combo feedback (weapon trail, reveal mesh, bloom).
//!
//! Рендера нет: renderer/UI читают этот компонент.

use bevy::prelude::*;

use crate::combat::interfaces::ComboVisuals;

#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct ComboVisualState {
    pub weapon_effect_active: bool,
    pub reveal_mesh_visible: bool,
    pub bloom_visible: bool,
    /// 1.0 → 0.2 while the timing window counts down
    pub bloom_scale: f32,
    pub spark_visible: bool,
}

impl ComboVisuals for ComboVisualState {
    fn set_weapon_effect_active(&mut self, active: bool) {
        self.weapon_effect_active = active;
    }

    fn set_reveal_mesh_visible(&mut self, visible: bool) {
        self.reveal_mesh_visible = visible;
    }
}
