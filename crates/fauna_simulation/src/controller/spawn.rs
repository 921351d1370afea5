//! Спавн агента по ArchetypeDefinition

use std::sync::Arc;

use bevy::prelude::*;

use crate::ai::{AmbushState, Camouflage, FlyerState, GroundState, StateMachine};
use crate::animation::AnimationDriver;
use crate::components::{AgentCommands, AgentRng, Archetype, Authority};
use crate::config::{ArchetypeDefinition, ArchetypeKind};
use crate::health::Health;
use crate::navigation::{NavAgent, Navigator};
use crate::perception::PerceptionSensor;
use crate::DeterministicRng;

/// Спавнит агента со всеми компонентами вида
///
/// - Ground: `StateMachine<GroundState>` + `NavAgent` (выключен, LOD включит)
/// - Flyer: `StateMachine<FlyerState>`, без NavAgent (летает напрямую)
/// - Ambush: `StateMachine<AmbushState>` + `Camouflage`
///
/// Seed per-agent RNG берётся из `DeterministicRng` (порядок спавна = порядок seed'ов).
/// Машина состояний инициализируется на первом тике контроллера.
pub fn spawn_agent(
    world: &mut World,
    definition: Arc<ArchetypeDefinition>,
    transform: Transform,
    authority: Authority,
) -> Entity {
    let seed = match world.get_resource_mut::<DeterministicRng>() {
        Some(mut rng) => rng.next_seed(),
        None => {
            crate::logger::log_warning("⚠️ spawn_agent: no DeterministicRng resource, agent seeded with 0");
            0
        }
    };

    let config = &definition.agent;
    let position = transform.translation;

    let mut agent = world.spawn((
        transform,
        Archetype(definition.clone()),
        authority,
        Health::from_config(config),
        PerceptionSensor::new(definition.sensor),
        Navigator::new(position, config.stopping_distance, config.ground_layers),
        AnimationDriver::new(&definition.animation),
        AgentRng::from_seed(seed),
        AgentCommands::default(),
    ));

    match definition.kind {
        ArchetypeKind::Ground => {
            agent.insert((
                StateMachine::<GroundState>::new(),
                NavAgent::new(position, config.stopping_distance),
            ));
        }
        ArchetypeKind::Flyer => {
            agent.insert(StateMachine::<FlyerState>::new());
        }
        ArchetypeKind::Ambush => {
            let fade_time = definition
                .ambush
                .as_ref()
                .map_or(0.0, |ambush| ambush.camouflage_fade_time);
            agent.insert((StateMachine::<AmbushState>::new(), Camouflage::new(fade_time)));
        }
    }

    let entity = agent.id();
    crate::logger::log_info(&format!(
        "🐾 Spawned {} ({:?}, {:?}) at {:?} as {:?}",
        definition.name, definition.kind, authority, position, entity
    ));
    entity
}
