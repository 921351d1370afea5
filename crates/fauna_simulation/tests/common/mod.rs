//! Общие helpers для интеграционных тестов (headless App)

#![allow(dead_code)]

use std::sync::Arc;

use bevy::prelude::*;
use fauna_simulation::controller::{AgentDespawned, TongueFired, TongueRetracted};
use fauna_simulation::physics::HeadlessGeometry;
use fauna_simulation::{
    create_headless_app, spawn_agent, AgentDied, AgentSet, ArchetypeDefinition, ArchetypeKind, Authority,
    BehaviorState, PlayerDamaged, PlayerId, Session, StateMachine, Targetable,
};

/// Все события типа `E` за тест (буферы самой симуляции живут два тика)
#[derive(Resource)]
pub struct Recorded<E: Event>(pub Vec<E>);

fn record<E: Event + Clone>(mut reader: EventReader<E>, mut recorded: ResMut<Recorded<E>>) {
    recorded.0.extend(reader.read().cloned());
}

fn record_events<E: Event + Clone>(app: &mut App) {
    app.insert_resource(Recorded::<E>(Vec::new()))
        .add_systems(FixedUpdate, record::<E>.after(AgentSet::Cleanup));
}

/// Headless App на плоской земле (y = 0)
pub fn create_scene(seed: u64) -> App {
    fauna_simulation::logger::set_log_level(fauna_simulation::logger::LogLevel::Warning);
    let mut app = create_headless_app(seed);
    app.insert_resource(HeadlessGeometry::flat_ground(0.0));

    record_events::<PlayerDamaged>(&mut app);
    record_events::<AgentDied>(&mut app);
    record_events::<TongueFired>(&mut app);
    record_events::<TongueRetracted>(&mut app);
    record_events::<AgentDespawned>(&mut app);
    app
}

pub fn spawn_player(app: &mut App, id: u64, position: Vec3) -> Entity {
    let world = app.world_mut();
    let player = world
        .spawn((Transform::from_translation(position), Targetable::player(PlayerId(id))))
        .id();
    world.resource_mut::<Session>().register_player(PlayerId(id), player);
    player
}

/// Агент смотрит в +Z
pub fn spawn(app: &mut App, definition: ArchetypeDefinition, position: Vec3) -> Entity {
    let transform = Transform::from_translation(position).looking_to(Vec3::Z, Vec3::Y);
    spawn_agent(app.world_mut(), Arc::new(definition), transform, Authority::Host)
}

pub fn state_of<S: BehaviorState>(app: &App, entity: Entity) -> Option<S> {
    app.world()
        .get::<StateMachine<S>>(entity)
        .and_then(|machine| machine.current().cloned())
}

pub fn events<E: Event + Clone>(app: &App) -> Vec<E> {
    app.world()
        .get_resource::<Recorded<E>>()
        .map(|recorded| recorded.0.clone())
        .unwrap_or_default()
}

pub fn ground_definition() -> ArchetypeDefinition {
    ArchetypeDefinition::new("dung_beetle", ArchetypeKind::Ground)
}
