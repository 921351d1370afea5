//! Raycast probes: line of sight + ground
//!
//! Архитектура:
//! - `LineOfSight` / `GroundProbe` — traits, сенсор и состояния знают только их
//! - `RapierProbe` — bevy_rapier3d raycasts с collision group mask
//! - `HeadlessGeometry` — resource с плоскостью земли и AABB препятствиями
//!   (headless сцены без rapier, тесты)
//! - `OpenField` — ничего не загораживает, земли нет (нет physics context)
//!
//! `WorldRays` выбирает backend на тик: rapier → headless → open field.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use super::layers::LayerMask;

/// Результат raycast
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub point: Vec3,
    pub distance: f32,
}

/// Есть ли геометрия из `mask` на отрезке from → to
pub trait LineOfSight {
    fn is_obstructed(&self, from: Vec3, to: Vec3, mask: LayerMask) -> bool;
}

/// Лучевые запросы к земле и препятствиям по направлению
pub trait GroundProbe {
    fn cast_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<RayHit>;

    /// Точка земли под `origin` (луч вниз на `max_distance`)
    fn probe_ground(&self, origin: Vec3, max_distance: f32, mask: LayerMask) -> Option<Vec3> {
        self.cast_ray(origin, Vec3::NEG_Y, max_distance, mask)
            .map(|hit| hit.point)
    }
}

/// Оба запроса сразу (то, что получает AgentContext)
pub trait WorldProbe: LineOfSight + GroundProbe {}

impl<T: LineOfSight + GroundProbe + ?Sized> WorldProbe for T {}

/// Пустой мир: нет препятствий, нет земли
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenField;

impl LineOfSight for OpenField {
    fn is_obstructed(&self, _from: Vec3, _to: Vec3, _mask: LayerMask) -> bool {
        false
    }
}

impl GroundProbe for OpenField {
    fn cast_ray(&self, _origin: Vec3, _direction: Vec3, _max_distance: f32, _mask: LayerMask) -> Option<RayHit> {
        None
    }
}

// ============================================================================
// Headless geometry
// ============================================================================

/// Axis-aligned препятствие (стена, скала)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObstacleBox {
    pub min: Vec3,
    pub max: Vec3,
    pub layers: LayerMask,
}

impl ObstacleBox {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            min,
            max,
            layers: LayerMask::ENVIRONMENT,
        }
    }

    /// Slab test: расстояние вдоль нормализованного луча до входа в box
    fn ray_entry(&self, origin: Vec3, direction: Vec3) -> Option<f32> {
        let mut t_min = 0.0_f32;
        let mut t_max = f32::INFINITY;

        for axis in 0..3 {
            let o = origin[axis];
            let d = direction[axis];

            if d.abs() < 1e-8 {
                if o < self.min[axis] || o > self.max[axis] {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / d;
            let mut t0 = (self.min[axis] - o) * inv;
            let mut t1 = (self.max[axis] - o) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }

            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_min > t_max {
                return None;
            }
        }

        Some(t_min)
    }
}

/// Resource: упрощённая геометрия для headless сцен без rapier
///
/// Земля — горизонтальная плоскость на `ground_height` (слой Environment).
#[derive(Resource, Debug, Clone, Default)]
pub struct HeadlessGeometry {
    pub ground_height: Option<f32>,
    pub obstacles: Vec<ObstacleBox>,
}

impl HeadlessGeometry {
    pub fn flat_ground(height: f32) -> Self {
        Self {
            ground_height: Some(height),
            obstacles: Vec::new(),
        }
    }

    pub fn with_obstacle(mut self, obstacle: ObstacleBox) -> Self {
        self.obstacles.push(obstacle);
        self
    }
}

impl GroundProbe for HeadlessGeometry {
    fn cast_ray(&self, origin: Vec3, direction: Vec3, max_distance: f32, mask: LayerMask) -> Option<RayHit> {
        let direction = direction.normalize_or_zero();
        if direction == Vec3::ZERO {
            return None;
        }

        let mut nearest: Option<f32> = None;

        if let Some(height) = self.ground_height {
            if mask.intersects(LayerMask::ENVIRONMENT) && direction.y.abs() > 1e-6 {
                let t = (height - origin.y) / direction.y;
                if t >= 0.0 && t <= max_distance {
                    nearest = Some(t);
                }
            }
        }

        for obstacle in self.obstacles.iter().filter(|o| o.layers.intersects(mask)) {
            if let Some(t) = obstacle.ray_entry(origin, direction) {
                if t <= max_distance && nearest.map_or(true, |best| t < best) {
                    nearest = Some(t);
                }
            }
        }

        nearest.map(|distance| RayHit {
            point: origin + direction * distance,
            distance,
        })
    }
}

impl LineOfSight for HeadlessGeometry {
    fn is_obstructed(&self, from: Vec3, to: Vec3, mask: LayerMask) -> bool {
        let offset = to - from;
        let distance = offset.length();
        if distance <= f32::EPSILON {
            return false;
        }

        // Плоскость земли не считаем препятствием для взгляда (глаза выше неё)
        self.obstacles
            .iter()
            .filter(|o| o.layers.intersects(mask))
            .any(|o| o.ray_entry(from, offset / distance).is_some_and(|t| t <= distance))
    }
}

// ============================================================================
// Rapier backend
// ============================================================================

/// bevy_rapier3d raycasts (collision groups = `LayerMask` bits)
pub struct RapierProbe<'a, 'w> {
    context: &'a RapierContext<'w>,
}

impl<'a, 'w> RapierProbe<'a, 'w> {
    pub fn new(context: &'a RapierContext<'w>) -> Self {
        Self { context }
    }

    fn filter(mask: LayerMask) -> QueryFilter<'static> {
        QueryFilter::default().groups(CollisionGroups::new(
            Group::ALL,
            Group::from_bits_truncate(mask.bits()),
        ))
    }
}

impl GroundProbe for RapierProbe<'_, '_> {
    fn cast_ray(&self, origin: Vec3, direction: Vec3, max_distance: f32, mask: LayerMask) -> Option<RayHit> {
        let direction = direction.normalize_or_zero();
        if direction == Vec3::ZERO {
            return None;
        }

        self.context
            .cast_ray(origin, direction, max_distance, true, Self::filter(mask))
            .map(|(_, distance)| RayHit {
                point: origin + direction * distance,
                distance,
            })
    }
}

impl LineOfSight for RapierProbe<'_, '_> {
    fn is_obstructed(&self, from: Vec3, to: Vec3, mask: LayerMask) -> bool {
        let offset = to - from;
        let distance = offset.length();
        if distance <= f32::EPSILON {
            return false;
        }

        self.context
            .cast_ray(from, offset / distance, distance, true, Self::filter(mask))
            .is_some()
    }
}

/// Backend на текущий тик
pub enum WorldRays<'a, 'w> {
    Rapier(RapierProbe<'a, 'w>),
    Headless(&'a HeadlessGeometry),
    Open(OpenField),
}

impl<'a, 'w> WorldRays<'a, 'w> {
    /// rapier context → headless geometry → open field
    pub fn select(
        rapier: Option<&'a RapierContext<'w>>,
        headless: Option<&'a HeadlessGeometry>,
    ) -> Self {
        match (rapier, headless) {
            (Some(context), _) => WorldRays::Rapier(RapierProbe::new(context)),
            (None, Some(geometry)) => WorldRays::Headless(geometry),
            (None, None) => WorldRays::Open(OpenField),
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, WorldRays::Open(_))
    }
}

impl LineOfSight for WorldRays<'_, '_> {
    fn is_obstructed(&self, from: Vec3, to: Vec3, mask: LayerMask) -> bool {
        match self {
            WorldRays::Rapier(probe) => probe.is_obstructed(from, to, mask),
            WorldRays::Headless(geometry) => geometry.is_obstructed(from, to, mask),
            WorldRays::Open(open) => open.is_obstructed(from, to, mask),
        }
    }
}

impl GroundProbe for WorldRays<'_, '_> {
    fn cast_ray(&self, origin: Vec3, direction: Vec3, max_distance: f32, mask: LayerMask) -> Option<RayHit> {
        match self {
            WorldRays::Rapier(probe) => probe.cast_ray(origin, direction, max_distance, mask),
            WorldRays::Headless(geometry) => geometry.cast_ray(origin, direction, max_distance, mask),
            WorldRays::Open(open) => open.cast_ray(origin, direction, max_distance, mask),
        }
    }
}
