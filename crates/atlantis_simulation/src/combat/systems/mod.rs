//! Combat systems (FixedUpdate)

pub mod camera;
pub mod combo;

pub use camera::stabilize_attack_cameras;
pub use combo::{
    face_nearest_enemy_on_attack_start, forward_external_window_closes, process_attack_inputs,
    process_attack_notifies, resolve_melee_sweeps, tick_combo_controllers, ComboEventWriters,
};
