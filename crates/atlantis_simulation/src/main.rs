//! Headless симуляция Atlantis combo
//!
//! Scripted игрок бьёт тренировочные манекены: жмёт attack в середине
//! timing window и продолжает цепочку после spark. Печатает combo state.

use std::time::Duration;

use atlantis_simulation::*;
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use rand::Rng;

const TICKS: usize = 600;
const DUMMY_COUNT: usize = 3;

fn main() {
    let seed = 42;
    println!("Starting Atlantis headless combo simulation (seed: {})", seed);

    let mut app = create_headless_app(seed);
    app.add_plugins(SimulationPlugin)
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(
            1.0 / 60.0,
        )));

    let config = app.world().resource::<CombatConfig>().clone();
    let player = app
        .world_mut()
        .spawn((
            combatant_bundle(&config, Vec3::ZERO, 1, vec![0.9, 0.8, 1.0, 1.1, 1.3]),
            Player,
            Mana::default(),
        ))
        .id();

    let dummy_positions: Vec<Vec3> = {
        let mut rng = app.world_mut().resource_mut::<DeterministicRng>();
        (0..DUMMY_COUNT)
            .map(|_| {
                Vec3::new(
                    rng.rng.gen_range(-150.0..150.0),
                    0.0,
                    rng.rng.gen_range(-150.0..150.0),
                )
            })
            .collect()
    };
    let dummies: Vec<Entity> = dummy_positions
        .into_iter()
        .map(|position| {
            app.world_mut()
                .spawn((
                    Actor { faction_id: 2 },
                    Transform::from_translation(position),
                    Health::new(300),
                ))
                .id()
        })
        .collect();

    let mut damage_cursor = app.world().resource::<Events<DamageDealt>>().get_cursor();

    for tick in 0..TICKS {
        if scripted_press(app.world(), player) {
            app.world_mut().send_event(AttackInput { attacker: player });
        }

        app.update();

        let events = app.world().resource::<Events<DamageDealt>>();
        for hit in damage_cursor.read(events) {
            println!(
                "Tick {}: {:?} hit {:?} for {} (died: {})",
                tick, hit.attacker, hit.target, hit.damage, hit.target_died
            );
        }

        if tick % 10 == 0 {
            if let Some(combatant) = app.world().get::<MeleeCombatant>(player) {
                let window = combatant.window();
                println!(
                    "Tick {}: stage {} in_combo {} window {} (progress {:.2}, bloom {:.2}) camera locked {}",
                    tick,
                    combatant.current_attack_index(),
                    combatant.is_in_combo(),
                    window.is_open(),
                    window.progress(),
                    window.scale(),
                    combatant.camera().is_locked()
                );
            }
        }
    }

    for dummy in dummies {
        if let Some(health) = app.world().get::<Health>(dummy) {
            println!("Dummy {:?}: {}/{} HP", dummy, health.current, health.max);
        }
    }

    println!("Simulation complete!");
}

/// "Skilled player": spark в середине окна, continue сразу после cooldown.
fn scripted_press(world: &World, player: Entity) -> bool {
    let Some(combatant) = world.get::<MeleeCombatant>(player) else {
        return false;
    };

    if combatant.is_timing_window_active() {
        return combatant.window().progress() >= 0.5;
    }

    combatant.can_attack() && (!combatant.is_in_combo() || combatant.has_hit_critical_window())
}
