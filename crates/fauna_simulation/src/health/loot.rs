//! Loot roll при смерти

use bevy::prelude::*;
use rand::Rng;

use crate::physics::{GroundProbe, LayerMask};

/// Шанс выпадения лута
pub const LOOT_DROP_RATE: f32 = 0.2;
/// Радиус разброса вокруг трупа
pub const LOOT_SCATTER_DISTANCE: f32 = 1.0;
/// Высота над землёй
pub const LOOT_SPAWN_HEIGHT: f32 = 0.5;

const GROUND_CHECK_HEIGHT: f32 = 0.5;
const GROUND_CHECK_DISTANCE: f32 = 100.0;

pub fn roll_loot(rng: &mut impl Rng) -> bool {
    rng.gen::<f32>() <= LOOT_DROP_RATE
}

/// Случайная точка в круге LOOT_SCATTER_DISTANCE, на LOOT_SPAWN_HEIGHT над землёй
///
/// Земля не найдена → высота трупа.
pub fn loot_position(origin: Vec3, rng: &mut impl Rng, probe: &dyn GroundProbe, ground_layers: LayerMask) -> Vec3 {
    let ground_y = probe
        .probe_ground(origin + Vec3::Y * GROUND_CHECK_HEIGHT, GROUND_CHECK_DISTANCE, ground_layers)
        .map_or(origin.y, |hit| hit.y);

    let angle = rng.gen_range(0.0..std::f32::consts::TAU);
    let radius = LOOT_SCATTER_DISTANCE * rng.gen::<f32>().sqrt();

    Vec3::new(
        origin.x + angle.cos() * radius,
        ground_y + LOOT_SPAWN_HEIGHT,
        origin.z + angle.sin() * radius,
    )
}
