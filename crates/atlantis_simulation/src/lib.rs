//! Atlantis Simulation Core
//!
//! Headless ECS-симуляция melee combo на Bevy 0.16:
//! - combo state machine + critical timing window ("bloom" / spark)
//! - attack camera stabilization (без телепортов)
//! - combo-gated visual effects, hit sweep → damage
//!
//! Rendering, animation assets, UI - вне crate: presentation читает
//! компоненты/события и присылает input/notify события.

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod combat;
pub mod components;
pub mod config;
pub mod logger;

// Re-export базовых типов для удобства
pub use combat::{
    combatant_bundle, AttackInput, AttackNotify, AttackOutcome, AttackStarted, Attacker,
    BloomWindowClosed, CombatPlugin, ComboEnded, ComboStateChanged, DamageDealt, Dead,
    EntityDied, MeleeCombatant, MeleeSweepRequested, SparkTriggered,
};
pub use components::*;
pub use config::CombatConfig;
pub use logger::init_logger;

/// Главный plugin симуляции
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        // seed из create_headless_app не перезаписываем
        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(42));
        }

        app
            // Fixed timestep 60Hz для simulation tick
            .insert_resource(Time::<Fixed>::from_hz(60.0))
            .init_resource::<CombatConfig>()
            .add_plugins(CombatPlugin);
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(Time::<Fixed>::from_hz(60.0)); // 60Hz FixedUpdate

    app
}

/// Snapshot мира для сравнения детерминизма
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
