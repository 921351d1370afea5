//! Navigation module
//!
//! Navigator adapter (Active/Dormant), NavigationService trait + встроенный `NavAgent`.
//! Архитектура: решения принимают состояния (`move_to`/`stop`), исполнение — здесь,
//! в `AgentSet::Locomotion` после всех решений тика.

use bevy::prelude::*;

pub mod navigator;
pub mod service;
pub mod systems;


pub use navigator::{face_towards, planar_distance, NavMode, Navigator};
pub use service::{NavAgent, NavigationService};

use crate::AgentSet;

/// Navigation Plugin
///
/// Система: drive_navigators (Locomotion set) — исполняет движение за тик.
pub struct NavigationPlugin;

impl Plugin for NavigationPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(FixedUpdate, systems::drive_navigators.in_set(AgentSet::Locomotion));
    }
}
