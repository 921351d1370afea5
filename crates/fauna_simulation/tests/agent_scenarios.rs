//! Интеграционные сценарии: сенсор → решение → эффекты в headless App

mod common;

use bevy::ecs::event::Events;
use bevy::prelude::*;
use fauna_simulation::controller::{AgentDespawned, TongueFired};
use fauna_simulation::{
    run_fixed_ticks, AgentDied, AmbushState, ArchetypeDefinition, ArchetypeKind, DamageRequested, DamageTarget, Dead,
    FlyerState, GroundState, Health, PlayerDamaged, PlayerId,
};

use common::{create_scene, events, ground_definition, spawn, spawn_player, state_of};

fn scenario_definition() -> ArchetypeDefinition {
    let mut definition = ground_definition();
    definition.agent.fov_range = 10.0;
    definition.agent.fov_angle = 120.0;
    definition
}

#[test]
fn test_player_in_front_triggers_trace() {
    let mut app = create_scene(1);
    spawn_player(&mut app, 1, Vec3::new(0.0, 0.0, 5.0));
    let agent = spawn(&mut app, scenario_definition(), Vec3::ZERO);

    run_fixed_ticks(&mut app, 2);

    assert_eq!(state_of::<GroundState>(&app, agent), Some(GroundState::Trace));
}

#[test]
fn test_heard_player_routes_patrol() {
    let mut app = create_scene(2);
    let heard_at = Vec3::new(8.0, 0.0, 0.0);
    spawn_player(&mut app, 1, heard_at);
    let agent = spawn(&mut app, scenario_definition(), Vec3::ZERO);

    run_fixed_ticks(&mut app, 1);
    assert!(matches!(state_of::<GroundState>(&app, agent), Some(GroundState::Idle { .. })));

    // Idle не прерывается слухом; ждём конца idle таймера (≤ idle_max)
    let mut patrol = None;
    for _ in 0..300 {
        run_fixed_ticks(&mut app, 1);
        if let Some(GroundState::Patrol { destination, .. }) = state_of::<GroundState>(&app, agent) {
            patrol = Some(destination);
            break;
        }
    }

    assert_eq!(patrol, Some(heard_at));
}

#[test]
fn test_ground_agent_attacks_player_through_session() {
    let mut app = create_scene(3);
    spawn_player(&mut app, 7, Vec3::new(0.0, 0.0, 1.5));
    let agent = spawn(&mut app, ground_definition(), Vec3::ZERO);

    run_fixed_ticks(&mut app, 120);

    let damaged = events::<PlayerDamaged>(&app);
    assert!(!damaged.is_empty(), "player never damaged");
    assert_eq!(damaged[0].player, PlayerId(7));
    assert_eq!(damaged[0].attacker, Some(agent));
    assert_eq!(damaged[0].amount, ground_definition().agent.attack_damage);
}

#[test]
fn test_event_buffers_do_not_grow_across_ticks() {
    let mut app = create_scene(9);
    spawn_player(&mut app, 7, Vec3::new(0.0, 0.0, 1.5));
    spawn(&mut app, ground_definition(), Vec3::ZERO);

    run_fixed_ticks(&mut app, 600);

    // Атак было много, но в буфере только события последних двух тиков
    assert!(events::<PlayerDamaged>(&app).len() > 2);
    assert!(app.world().resource::<Events<PlayerDamaged>>().len() <= 2);
    assert!(app.world().resource::<Events<DamageRequested>>().len() <= 2);
}

#[test]
fn test_hit_then_death_then_despawn() {
    let mut app = create_scene(4);
    let player = spawn_player(&mut app, 1, Vec3::new(0.0, 0.0, -6.0));
    let agent = spawn(&mut app, ground_definition(), Vec3::ZERO);
    run_fixed_ticks(&mut app, 1);

    app.world_mut().send_event(DamageRequested {
        target: DamageTarget::Entity(agent),
        attacker: Some(player),
        amount: 10.0,
    });
    run_fixed_ticks(&mut app, 1);

    assert!(state_of::<GroundState>(&app, agent).is_some_and(|state| matches!(state, GroundState::Hit { .. })));
    assert_eq!(app.world().get::<Health>(agent).map(|h| h.current), Some(90.0));

    // Удар в спину → forced detection атакующего
    let report = app
        .world()
        .get::<fauna_simulation::perception::PerceptionSensor>(agent)
        .map(|sensor| sensor.report())
        .expect("sensor");
    assert_eq!(report.target, Some(player));

    app.world_mut().send_event(DamageRequested {
        target: DamageTarget::Entity(agent),
        attacker: Some(player),
        amount: 1000.0,
    });
    run_fixed_ticks(&mut app, 1);

    assert_eq!(state_of::<GroundState>(&app, agent), Some(GroundState::Die));
    assert!(app.world().get::<Dead>(agent).is_some());
    assert_eq!(events::<AgentDied>(&app).len(), 1);

    run_fixed_ticks(&mut app, 280);
    assert!(app.world().get_entity(agent).is_ok(), "despawned too early");

    run_fixed_ticks(&mut app, 30);
    assert!(app.world().get_entity(agent).is_err(), "corpse never despawned");
}

#[test]
fn test_toad_catches_and_bites_player() {
    let mut app = create_scene(5);
    let start = Vec3::new(0.0, 0.0, 5.0);
    let player = spawn_player(&mut app, 1, start);
    let toad = spawn(&mut app, ArchetypeDefinition::new("toad", ArchetypeKind::Ambush), Vec3::ZERO);
    let bite_damage = ArchetypeDefinition::new("toad", ArchetypeKind::Ambush)
        .ambush
        .map(|ambush| ambush.bite_damage)
        .expect("ambush config");

    let mut bitten = false;
    for _ in 0..600 {
        run_fixed_ticks(&mut app, 1);
        if matches!(state_of::<AmbushState>(&app, toad), Some(AmbushState::Bite { .. })) {
            bitten = true;
            break;
        }
    }
    assert!(bitten, "toad never reached Bite");

    assert_eq!(events::<TongueFired>(&app).len(), 1);
    let pulled_to = app.world().get::<Transform>(player).map(|t| t.translation).expect("player");
    assert!(pulled_to.distance(Vec3::ZERO) < start.distance(Vec3::ZERO) - 2.0);

    // Урон укуса доходит до игрока на следующем Damage шаге
    run_fixed_ticks(&mut app, 2);
    let damaged = events::<PlayerDamaged>(&app);
    assert_eq!(damaged.len(), 1);
    assert_eq!(damaged[0].amount, bite_damage);
}

#[test]
fn test_wounded_flyer_retreats_and_despawns() {
    let mut app = create_scene(6);
    let player = spawn_player(&mut app, 1, Vec3::new(0.0, 0.0, 5.0));
    let flyer = spawn(
        &mut app,
        ArchetypeDefinition::new("vulture", ArchetypeKind::Flyer),
        Vec3::new(0.0, 30.0, 0.0),
    );
    run_fixed_ticks(&mut app, 1);

    // 80 урона из 100 → ниже порога отступления
    app.world_mut().send_event(DamageRequested {
        target: DamageTarget::Entity(flyer),
        attacker: Some(player),
        amount: 80.0,
    });
    run_fixed_ticks(&mut app, 1);
    assert!(state_of::<FlyerState>(&app, flyer).is_some_and(|state| matches!(state, FlyerState::Hit { .. })));

    let mut retreated = false;
    for _ in 0..3600 {
        run_fixed_ticks(&mut app, 1);
        if app.world().get_entity(flyer).is_err() {
            break;
        }
        if matches!(state_of::<FlyerState>(&app, flyer), Some(FlyerState::Retreat { .. })) {
            retreated = true;
        }
    }

    assert!(retreated);
    assert!(app.world().get_entity(flyer).is_err(), "flyer never left");
    assert_eq!(events::<AgentDespawned>(&app).len(), 1);
}

#[test]
fn test_friendly_agent_never_attacks() {
    let mut app = create_scene(8);
    spawn_player(&mut app, 1, Vec3::new(0.0, 0.0, 1.5));
    let mut definition = ground_definition();
    definition.agent.friendly = true;
    spawn(&mut app, definition, Vec3::ZERO);

    run_fixed_ticks(&mut app, 300);

    assert!(events::<PlayerDamaged>(&app).is_empty());
}
