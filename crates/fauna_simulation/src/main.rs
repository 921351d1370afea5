//! Headless симуляция FAUNA
//!
//! Один игрок стоит на месте, вокруг жук, летун и жаба.
//! Печатает текущие состояния агентов раз в секунду симуляции.

use bevy::prelude::*;
use fauna_simulation::{
    create_headless_app, run_fixed_ticks, spawn_agent, AmbushState, ArchetypeLibrary, Authority, ConfigError,
    FlyerState, GroundState, PlayerId, Session, StateMachine, Targetable,
};

const ARCHETYPES: &str = r#"[
    { "name": "dung_beetle", "kind": "ground", "agent": { "friendly": false } },
    { "name": "vulture", "kind": "flyer", "agent": { "flight": { "min_altitude": 20.0, "max_altitude": 40.0 } } },
    { "name": "toad", "kind": "ambush", "ambush": { "aiming_time": 1.0 } }
]"#;

fn main() -> Result<(), ConfigError> {
    let seed = 42;
    println!("Starting FAUNA headless simulation (seed: {})", seed);

    let mut app = create_headless_app(seed);
    let library = ArchetypeLibrary::from_json(ARCHETYPES)?;

    let world = app.world_mut();
    let player = world
        .spawn((Transform::from_xyz(0.0, 0.0, 0.0), Targetable::player(PlayerId(1))))
        .id();
    world.resource_mut::<Session>().register_player(PlayerId(1), player);

    let spawns = [
        ("dung_beetle", Vec3::new(0.0, 0.0, 8.0)),
        ("vulture", Vec3::new(10.0, 30.0, 0.0)),
        ("toad", Vec3::new(-4.0, 0.0, 0.0)),
    ];
    let mut agents = Vec::new();
    for (name, position) in spawns {
        let Some(definition) = library.get(name) else {
            continue;
        };
        let transform = Transform::from_translation(position).looking_at(Vec3::ZERO, Vec3::Y);
        agents.push((name, spawn_agent(world, definition, transform, Authority::Host)));
    }
    world.insert_resource(library);

    // 20 секунд симуляции
    for second in 1..=20 {
        run_fixed_ticks(&mut app, 60);

        let world = app.world();
        let states: Vec<String> = agents
            .iter()
            .map(|(name, entity)| format!("{}={}", name, current_state(world, *entity)))
            .collect();
        println!("t={:>2}s: {}", second, states.join(", "));
    }

    println!("Simulation complete!");
    Ok(())
}

fn current_state(world: &World, entity: Entity) -> String {
    if let Some(machine) = world.get::<StateMachine<GroundState>>(entity) {
        return format!("{:?}", machine.current());
    }
    if let Some(machine) = world.get::<StateMachine<FlyerState>>(entity) {
        return format!("{:?}", machine.current());
    }
    if let Some(machine) = world.get::<StateMachine<AmbushState>>(entity) {
        return format!("{:?}", machine.current());
    }
    "despawned".to_string()
}
