//! Agent controller
//!
//! Связывает сенсор, навигатор и машину состояний в ECS:
//! - `update_agents::<S>` (Decision set) — по системе на архетип
//! - `apply_agent_commands` + `fade_camouflage` (Effects set)
//! - `spawn_agent` — сборка агента из ArchetypeDefinition

use bevy::prelude::*;

pub mod events;
pub mod spawn;
pub mod systems;

pub use events::{AgentDespawned, TongueFired, TongueRetracted};
pub use spawn::spawn_agent;
pub use systems::{apply_agent_commands, fade_camouflage, update_agents};

use crate::ai::{AmbushState, FlyerState, GroundState};
use crate::AgentSet;

/// Agent Plugin
///
/// Порядок:
/// 1. Decision: update_agents для каждого архетипа (реакции на урон + update)
/// 2. Effects: apply_agent_commands → fade_camouflage
pub struct AgentPlugin;

impl Plugin for AgentPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<TongueFired>()
            .add_event::<TongueRetracted>()
            .add_event::<AgentDespawned>()
            .add_systems(
                FixedUpdate,
                (
                    update_agents::<GroundState>,
                    update_agents::<FlyerState>,
                    update_agents::<AmbushState>,
                )
                    .chain()
                    .in_set(AgentSet::Decision),
            )
            .add_systems(
                FixedUpdate,
                (apply_agent_commands, fade_camouflage)
                    .chain()
                    .in_set(AgentSet::Effects),
            );
    }
}
