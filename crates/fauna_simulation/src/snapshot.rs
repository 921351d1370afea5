//! Agent snapshots (serde)
//!
//! Persisted поля агента: transform, health, сенсор, навигатор, машина состояний, RNG.
//! Restore + те же входы → те же решения (детерминизм round-trip).
//! LOD tier (`any_near`) живёт внутри сенсора и попадает сюда же.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::ai::{BehaviorState, Camouflage, StateMachine};
use crate::components::AgentRng;
use crate::health::Health;
use crate::navigation::{NavAgent, Navigator};
use crate::perception::PerceptionSensor;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound = "S: BehaviorState")]
pub struct AgentSnapshot<S: BehaviorState> {
    pub transform: Transform,
    pub health: Health,
    pub sensor: PerceptionSensor,
    pub navigator: Navigator,
    pub nav_agent: Option<NavAgent>,
    pub camouflage: Option<Camouflage>,
    pub machine: StateMachine<S>,
    pub rng: AgentRng,
}

impl<S: BehaviorState> AgentSnapshot<S> {
    /// Снимок агента; None если entity нет или это агент другого архетипа
    pub fn capture(world: &World, entity: Entity) -> Option<Self> {
        Some(Self {
            transform: *world.get::<Transform>(entity)?,
            health: *world.get::<Health>(entity)?,
            sensor: world.get::<PerceptionSensor>(entity)?.clone(),
            navigator: world.get::<Navigator>(entity)?.clone(),
            nav_agent: world.get::<NavAgent>(entity).cloned(),
            camouflage: world.get::<Camouflage>(entity).cloned(),
            machine: world.get::<StateMachine<S>>(entity)?.clone(),
            rng: world.get::<AgentRng>(entity)?.clone(),
        })
    }

    /// Перезаписывает компоненты существующего агента. false если entity нет.
    pub fn restore(&self, world: &mut World, entity: Entity) -> bool {
        let Ok(mut agent) = world.get_entity_mut(entity) else {
            crate::logger::log_warning(&format!("⚠️ Snapshot restore: {:?} does not exist", entity));
            return false;
        };

        agent.insert((
            self.transform,
            self.health,
            self.sensor.clone(),
            self.navigator.clone(),
            self.machine.clone(),
            self.rng.clone(),
        ));
        if let Some(nav_agent) = &self.nav_agent {
            agent.insert(nav_agent.clone());
        }
        if let Some(camouflage) = &self.camouflage {
            agent.insert(camouflage.clone());
        }

        true
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
