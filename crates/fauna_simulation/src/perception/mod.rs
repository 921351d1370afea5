//! Perception module
//!
//! Per-agent сенсор (FOV / LOS / звук / память) + LOD сигнал `any_near`.
//! Системы в `AgentSet::Perception`, до решений состояний.

use bevy::prelude::*;

pub mod sensor;
pub mod systems;


pub use sensor::{
    detect, in_field_of_view, Candidate, Detection, PerceptionSensor, SensorPose, SensorReport, SensorSettings,
    TARGET_AIM_HEIGHT,
};

use crate::AgentSet;

/// Perception Plugin
///
/// Порядок (chain):
/// 1. tick_sensor_memory — память тикает каждый тик
/// 2. refresh_sensors — throttled refresh + LOD навигации
/// 3. force_detection_on_hit — после refresh, чтобы forced цель дожила до решения
pub struct PerceptionPlugin;

impl Plugin for PerceptionPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            (
                systems::tick_sensor_memory,
                systems::refresh_sensors,
                systems::force_detection_on_hit,
            )
                .chain()
                .in_set(AgentSet::Perception),
        );
    }
}
