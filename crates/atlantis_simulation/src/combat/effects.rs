//! Combo index → secondary visual state (weapon trail, reveal meshes).

use serde::{Deserialize, Serialize};

use super::interfaces::ComboVisuals;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComboIndexEffectMap {
    pub weapon_effect_from: usize,
    pub reveal_mesh_from: usize,
}

impl Default for ComboIndexEffectMap {
    fn default() -> Self {
        Self {
            weapon_effect_from: 2,
            reveal_mesh_from: 3,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EffectState {
    pub weapon_effect: bool,
    pub reveal_mesh_visible: bool,
}

impl ComboIndexEffectMap {
    pub fn state_for(&self, combo_index: usize) -> EffectState {
        EffectState {
            weapon_effect: combo_index >= self.weapon_effect_from,
            reveal_mesh_visible: combo_index >= self.reveal_mesh_from,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EffectsCoordinator {
    map: ComboIndexEffectMap,
    state: EffectState,
}

impl EffectsCoordinator {
    pub fn new(map: ComboIndexEffectMap) -> Self {
        Self {
            map,
            state: EffectState::default(),
        }
    }

    /// Diff against the last applied state; collaborator is called only on change.
    pub fn on_combo_index_changed(&mut self, combo_index: usize, visuals: &mut dyn ComboVisuals) {
        let next = self.map.state_for(combo_index);

        if next.weapon_effect != self.state.weapon_effect {
            visuals.set_weapon_effect_active(next.weapon_effect);
        }
        if next.reveal_mesh_visible != self.state.reveal_mesh_visible {
            visuals.set_reveal_mesh_visible(next.reveal_mesh_visible);
        }

        self.state = next;
    }

    pub fn revert(&mut self, visuals: &mut dyn ComboVisuals) {
        self.on_combo_index_changed(0, visuals);
    }

    pub fn state(&self) -> EffectState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingVisuals {
        calls: Vec<(&'static str, bool)>,
    }

    impl ComboVisuals for RecordingVisuals {
        fn set_weapon_effect_active(&mut self, active: bool) {
            self.calls.push(("weapon", active));
        }

        fn set_reveal_mesh_visible(&mut self, visible: bool) {
            self.calls.push(("reveal", visible));
        }
    }

    #[test]
    fn test_effects_follow_index_thresholds() {
        let mut effects = EffectsCoordinator::default();
        let mut visuals = RecordingVisuals::default();

        effects.on_combo_index_changed(1, &mut visuals);
        assert!(visuals.calls.is_empty());

        effects.on_combo_index_changed(2, &mut visuals);
        assert_eq!(visuals.calls, vec![("weapon", true)]);

        effects.on_combo_index_changed(3, &mut visuals);
        assert_eq!(visuals.calls, vec![("weapon", true), ("reveal", true)]);
    }

    #[test]
    fn test_effects_only_call_on_change() {
        let mut effects = EffectsCoordinator::default();
        let mut visuals = RecordingVisuals::default();

        effects.on_combo_index_changed(3, &mut visuals);
        effects.on_combo_index_changed(3, &mut visuals);
        assert_eq!(visuals.calls.len(), 2);
    }

    #[test]
    fn test_revert_turns_everything_off() {
        let mut effects = EffectsCoordinator::default();
        let mut visuals = RecordingVisuals::default();

        effects.on_combo_index_changed(3, &mut visuals);
        visuals.calls.clear();

        effects.revert(&mut visuals);
        assert_eq!(visuals.calls, vec![("weapon", false), ("reveal", false)]);
        assert_eq!(effects.state(), EffectState::default());

        // повторный revert - без вызовов
        effects.revert(&mut visuals);
        assert_eq!(visuals.calls.len(), 2);
    }
}
