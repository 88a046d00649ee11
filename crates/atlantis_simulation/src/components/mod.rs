//! ECS Components для игровых entity
//!
//! Организация по доменам:
//! - actor: базовые характеристики (faction, health, mana, player marker)
//! - input: movement/dash state
//! - camera: control rotation (CameraBoom)
//! - visuals: combo feedback для renderer/UI

pub mod actor;
pub mod camera;
pub mod input;
pub mod visuals;

// Re-exports для удобного импорта
pub use actor::*;
pub use camera::*;
pub use input::*;
pub use visuals::*;
