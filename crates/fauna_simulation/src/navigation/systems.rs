//! Navigation systems

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use super::{NavAgent, Navigator};
use crate::components::Authority;
use crate::health::Dead;
use crate::physics::{HeadlessGeometry, WorldRays};

/// Система: исполнение движения (Active → NavigationService, Dormant → прямое)
///
/// Replica агенты не двигаются сами (transform приходит с хоста).
pub fn drive_navigators(
    time: Res<Time<Fixed>>,
    rapier: ReadRapierContext,
    headless: Option<Res<HeadlessGeometry>>,
    mut agents: Query<(&mut Transform, &mut Navigator, Option<&mut NavAgent>, &Authority), Without<Dead>>,
) {
    // Фиксированный шаг (= delta внутри FixedUpdate)
    let delta = time.timestep().as_secs_f32();
    let context = rapier.single().ok();
    let rays = WorldRays::select(context.as_ref(), headless.as_deref());

    for (mut transform, mut navigator, mut nav_agent, authority) in agents.iter_mut() {
        if !authority.is_host() {
            continue;
        }

        navigator.tick(nav_agent.as_deref_mut(), &mut transform, &rays, delta);
    }
}
