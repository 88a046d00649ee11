//! Combo integration tests
//!
//! Полный CombatPlugin в headless App, шаг за шагом через FixedUpdate.
//!
//! Проверяем:
//! - input → attack → timing window → spark → chain (clips [0, 1, 3, 4])
//! - timeout сбрасывает цепочку
//! - hit sweep → Health / DamageDealt / Dead
//! - camera lock корректирует drift без телепорта

use atlantis_simulation::*;
use bevy::prelude::*;

/// Helper: полный combat App
fn create_combat_app(seed: u64) -> App {
    let mut app = create_headless_app(seed);
    app.add_plugins(SimulationPlugin);
    app
}

/// Helper: один fixed tick (1/60s)
fn step(app: &mut App) {
    let timestep = app.world().resource::<Time<Fixed>>().timestep();
    app.world_mut()
        .resource_mut::<Time<Fixed>>()
        .advance_by(timestep);
    app.world_mut().run_schedule(FixedUpdate);
}

fn steps(app: &mut App, count: usize) {
    for _ in 0..count {
        step(app);
    }
}

fn press_attack(app: &mut App, attacker: Entity) {
    app.world_mut().send_event(AttackInput { attacker });
}

fn spawn_player(app: &mut App, clip_lengths: Vec<f32>) -> Entity {
    let config = app.world().resource::<CombatConfig>().clone();
    app.world_mut()
        .spawn((
            combatant_bundle(&config, Vec3::ZERO, 1, clip_lengths),
            Player,
        ))
        .id()
}

fn spawn_dummy(app: &mut App, position: Vec3, hp: u32) -> Entity {
    app.world_mut()
        .spawn((
            Actor { faction_id: 2 },
            Transform::from_translation(position),
            Health::new(hp),
        ))
        .id()
}

/// Все события типа E с начала теста (Events не обновляются при ручном шаге)
fn collect_events<E: Event + Clone>(app: &App) -> Vec<E> {
    let events = app.world().resource::<Events<E>>();
    let mut cursor = events.get_cursor();
    cursor.read(events).cloned().collect()
}

fn combatant(app: &App, entity: Entity) -> &MeleeCombatant {
    app.world()
        .get::<MeleeCombatant>(entity)
        .expect("player должен иметь MeleeCombatant")
}

#[test]
fn test_attack_input_starts_combo() {
    let mut app = create_combat_app(42);
    let player = spawn_player(&mut app, vec![0.9, 0.8, 1.0, 1.1, 1.3]);
    spawn_dummy(&mut app, Vec3::new(100.0, 0.0, 0.0), 100);

    press_attack(&mut app, player);
    step(&mut app);

    let combo = combatant(&app, player);
    assert!(combo.is_in_combo());
    assert!(combo.is_timing_window_active());
    assert_eq!(combo.current_attack_index(), 0);

    let started = collect_events::<AttackStarted>(&app);
    assert_eq!(started.len(), 1);
    assert_eq!(started[0].clip, 0);
    assert!((started[0].duration - 0.9).abs() < 1e-6);

    let changed = collect_events::<ComboStateChanged>(&app);
    assert_eq!(
        changed,
        vec![ComboStateChanged {
            entity: player,
            in_combat: true
        }]
    );

    let visuals = app.world().get::<ComboVisualState>(player).unwrap();
    assert!(visuals.bloom_visible);
    assert!(visuals.bloom_scale < 1.0 && visuals.bloom_scale > 0.9);

    // повернулся к манекену
    let transform = app.world().get::<Transform>(player).unwrap();
    let forward = transform.rotation * Vec3::NEG_Z;
    assert!((forward - Vec3::X).length() < 1e-4);
}

#[test]
fn test_input_during_window_is_spark_attempt() {
    let mut app = create_combat_app(42);
    let player = spawn_player(&mut app, vec![1.0; 5]);

    press_attack(&mut app, player);
    step(&mut app);
    steps(&mut app, 5);

    press_attack(&mut app, player);
    press_attack(&mut app, player);
    step(&mut app);

    assert_eq!(collect_events::<AttackStarted>(&app).len(), 1);
    assert!(collect_events::<SparkTriggered>(&app).is_empty());
    assert!(combatant(&app, player).is_timing_window_active());
}

#[test]
fn test_four_stage_combo_clip_sequence() {
    let mut app = create_combat_app(42);
    let player = spawn_player(&mut app, vec![1.0; 5]);

    // stage 0 + spark
    press_attack(&mut app, player);
    step(&mut app);
    steps(&mut app, 31);
    press_attack(&mut app, player);
    step(&mut app);
    assert!(combatant(&app, player).has_hit_critical_window());

    // continue → stage 1, spark → auto-chain
    press_attack(&mut app, player);
    step(&mut app);
    steps(&mut app, 29);
    press_attack(&mut app, player);
    step(&mut app);
    steps(&mut app, 4);

    // stage 2 spark → auto-chain
    steps(&mut app, 30);
    press_attack(&mut app, player);
    step(&mut app);
    steps(&mut app, 4);

    let visuals = app.world().get::<ComboVisualState>(player).unwrap();
    assert!(visuals.weapon_effect_active);
    assert!(visuals.reveal_mesh_visible);
    assert_eq!(combatant(&app, player).current_attack_index(), 3);

    // stage 3 spark → chain complete
    steps(&mut app, 30);
    press_attack(&mut app, player);
    step(&mut app);

    let clips: Vec<usize> = collect_events::<AttackStarted>(&app)
        .iter()
        .map(|e| e.clip)
        .collect();
    assert_eq!(clips, vec![0, 1, 3, 4]);
    assert_eq!(collect_events::<SparkTriggered>(&app).len(), 4);

    let combo = combatant(&app, player);
    assert!(!combo.is_in_combo());
    assert_eq!(combo.current_attack_index(), 0);
    assert!(!collect_events::<ComboEnded>(&app).is_empty());

    let visuals = app.world().get::<ComboVisualState>(player).unwrap();
    assert!(!visuals.weapon_effect_active);
    assert!(!visuals.reveal_mesh_visible);
}

#[test]
fn test_window_timeout_ends_combo() {
    let mut app = create_combat_app(42);
    let player = spawn_player(&mut app, vec![1.0; 5]);

    press_attack(&mut app, player);
    step(&mut app);
    steps(&mut app, 70);

    let combo = combatant(&app, player);
    assert!(!combo.is_in_combo());
    assert!(!combo.is_timing_window_active());
    assert_eq!(collect_events::<ComboEnded>(&app).len(), 1);
    assert!(collect_events::<ComboStateChanged>(&app)
        .iter()
        .any(|e| !e.in_combat));
}

#[test]
fn test_backup_notify_damages_nearby_enemy() {
    let mut app = create_combat_app(42);
    let player = spawn_player(&mut app, vec![1.0; 5]);
    app.world_mut().entity_mut(player).insert(Attacker {
        weapon_bonus: 15,
        ..default()
    });
    let near = spawn_dummy(&mut app, Vec3::new(100.0, 0.0, 0.0), 100);
    let far = spawn_dummy(&mut app, Vec3::new(400.0, 0.0, 0.0), 100);

    press_attack(&mut app, player);
    step(&mut app);
    steps(&mut app, 40);

    let hits = collect_events::<DamageDealt>(&app);
    assert_eq!(
        hits,
        vec![DamageDealt {
            attacker: player,
            target: near,
            damage: 40,
            target_died: false,
        }]
    );
    assert_eq!(app.world().get::<Health>(near).unwrap().current, 60);
    assert_eq!(app.world().get::<Health>(far).unwrap().current, 100);
    assert_eq!(app.world().get::<Health>(player).unwrap().current, 100);
}

#[test]
fn test_duplicate_attack_notify_sweeps_once() {
    let mut app = create_combat_app(42);
    let player = spawn_player(&mut app, vec![1.0; 5]);
    spawn_dummy(&mut app, Vec3::new(50.0, 0.0, 50.0), 100);

    press_attack(&mut app, player);
    step(&mut app);
    steps(&mut app, 10);

    app.world_mut().send_event(AttackNotify { attacker: player });
    app.world_mut().send_event(AttackNotify { attacker: player });
    step(&mut app);
    steps(&mut app, 40);

    assert_eq!(collect_events::<DamageDealt>(&app).len(), 1);
}

#[test]
fn test_lethal_sweep_marks_dead() {
    let mut app = create_combat_app(42);
    let player = spawn_player(&mut app, vec![1.0; 5]);
    let dummy = spawn_dummy(&mut app, Vec3::new(0.0, 0.0, 120.0), 20);

    press_attack(&mut app, player);
    step(&mut app);
    app.world_mut().send_event(AttackNotify { attacker: player });
    step(&mut app);

    let hits = collect_events::<DamageDealt>(&app);
    assert_eq!(hits.len(), 1);
    assert!(hits[0].target_died);
    assert_eq!(hits[0].damage, 20, "урон ограничен оставшимся HP");

    let died = collect_events::<EntityDied>(&app);
    assert_eq!(died.len(), 1);
    assert_eq!(died[0].entity, dummy);
    assert_eq!(died[0].killer, Some(player));
    assert!(app.world().get::<Dead>(dummy).is_some());
}

#[test]
fn test_external_bloom_close_is_informational() {
    let mut app = create_combat_app(42);
    let player = spawn_player(&mut app, vec![1.0; 5]);

    press_attack(&mut app, player);
    step(&mut app);
    app.world_mut()
        .send_event(BloomWindowClosed { entity: player });
    step(&mut app);

    assert!(combatant(&app, player).is_timing_window_active());
    assert!(app.world().get::<ComboVisualState>(player).unwrap().bloom_visible);
}

#[test]
fn test_camera_corrects_drift_without_teleport() {
    let mut app = create_combat_app(42);
    let player = spawn_player(&mut app, vec![1.0; 5]);

    press_attack(&mut app, player);
    step(&mut app);

    // root motion сдвинул актора
    app.world_mut()
        .get_mut::<Transform>(player)
        .unwrap()
        .translation = Vec3::new(30.0, 0.0, 0.0);
    step(&mut app);

    let x = app.world().get::<Transform>(player).unwrap().translation.x;
    assert!(x < 30.0, "drift должен уменьшиться");
    assert!(x > 0.0, "без мгновенного возврата в lock");
}

#[test]
fn test_movement_input_suspends_camera_correction() {
    let mut app = create_combat_app(42);
    let player = spawn_player(&mut app, vec![1.0; 5]);

    press_attack(&mut app, player);
    step(&mut app);

    {
        let mut entity = app.world_mut().entity_mut(player);
        entity.get_mut::<MovementKeys>().unwrap().axis = Vec2::new(0.0, 1.0);
        entity.get_mut::<Transform>().unwrap().translation = Vec3::new(30.0, 0.0, 0.0);
    }
    step(&mut app);

    let translation = app.world().get::<Transform>(player).unwrap().translation;
    assert_eq!(translation, Vec3::new(30.0, 0.0, 0.0));
}

#[test]
fn test_dead_attacker_cannot_attack() {
    let mut app = create_combat_app(42);
    let player = spawn_player(&mut app, vec![1.0; 5]);
    app.world_mut().get_mut::<Health>(player).unwrap().current = 0;

    press_attack(&mut app, player);
    step(&mut app);

    assert!(collect_events::<AttackStarted>(&app).is_empty());
    assert!(!combatant(&app, player).is_in_combo());
}

#[test]
fn test_mana_cost_gates_attacks() {
    let mut app = create_combat_app(42);
    app.world_mut()
        .resource_mut::<CombatConfig>()
        .combo
        .mana_cost = 30.0;

    let poor = spawn_player(&mut app, vec![1.0; 5]);
    app.world_mut().entity_mut(poor).insert(Mana::new(10.0));
    let rich = spawn_player(&mut app, vec![1.0; 5]);
    app.world_mut().entity_mut(rich).insert(Mana::new(50.0));

    press_attack(&mut app, poor);
    press_attack(&mut app, rich);
    step(&mut app);

    let started: Vec<Entity> = collect_events::<AttackStarted>(&app)
        .iter()
        .map(|e| e.attacker)
        .collect();
    assert_eq!(started, vec![rich]);
    assert_eq!(app.world().get::<Mana>(rich).unwrap().current, 20.0);
    assert_eq!(app.world().get::<Mana>(poor).unwrap().current, 10.0);
}

/// Шагает до нужного progress окна и жмёт attack (spark)
fn spark_when(app: &mut App, player: Entity, progress: f32) {
    while combatant(app, player).window().progress() < progress {
        step(app);
    }
    press_attack(app, player);
    step(app);
}

#[test]
fn test_early_sparks_keep_every_stage_damage() {
    let mut app = create_combat_app(42);
    let player = spawn_player(&mut app, vec![1.0; 5]);
    let dummy = spawn_dummy(&mut app, Vec3::new(100.0, 0.0, 0.0), 10_000);

    press_attack(&mut app, player);
    step(&mut app);
    spark_when(&mut app, player, 0.45);
    steps(&mut app, 4);
    press_attack(&mut app, player);
    step(&mut app);

    for _ in 1..4 {
        spark_when(&mut app, player, 0.45);
        steps(&mut app, 4);
    }
    steps(&mut app, 200);

    let clips: Vec<usize> = collect_events::<AttackStarted>(&app)
        .iter()
        .map(|e| e.clip)
        .collect();
    assert_eq!(clips, vec![0, 1, 3, 4]);
    assert_eq!(collect_events::<SparkTriggered>(&app).len(), 4);

    let hits = collect_events::<DamageDealt>(&app);
    assert_eq!(hits.len(), 4, "по одному sweep на каждую стадию");
    assert!(hits.iter().all(|hit| hit.target == dummy && hit.damage == 25));
    assert_eq!(app.world().get::<Health>(dummy).unwrap().current, 9_900);
}

#[test]
fn test_spark_on_timeout_step_is_not_a_reset() {
    let mut app = create_combat_app(42);
    let player = spawn_player(&mut app, vec![1.0; 5]);

    press_attack(&mut app, player);
    step(&mut app);
    steps(&mut app, 58);
    assert!(combatant(&app, player).is_timing_window_active());

    // этот шаг закрыл бы окно по timeout, но input обрабатывается раньше
    press_attack(&mut app, player);
    step(&mut app);

    assert_eq!(collect_events::<SparkTriggered>(&app).len(), 1);
    assert!(collect_events::<ComboEnded>(&app).is_empty());
    let combo = combatant(&app, player);
    assert!(combo.has_hit_critical_window());
    assert!(combo.is_in_combo());
}

#[test]
fn test_rejected_input_does_not_turn_attacker() {
    let mut app = create_combat_app(42);
    app.world_mut()
        .resource_mut::<CombatConfig>()
        .combo
        .mana_cost = 30.0;

    let poor = spawn_player(&mut app, vec![1.0; 5]);
    app.world_mut().entity_mut(poor).insert(Mana::new(10.0));
    spawn_dummy(&mut app, Vec3::new(100.0, 0.0, 0.0), 100);

    press_attack(&mut app, poor);
    step(&mut app);

    assert!(collect_events::<AttackStarted>(&app).is_empty());
    let transform = app.world().get::<Transform>(poor).unwrap();
    assert_eq!(transform.rotation, Quat::IDENTITY);
}
