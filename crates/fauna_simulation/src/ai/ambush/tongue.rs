//! Язык — простой projectile, который симулируется внутри Snap состояния
//!
//! Летит от рта к точке прицела с `tongue_speed`. Каждый шаг:
//! - сфера вокруг цели (player → Caught, world object → Stuck)
//! - луч по PROPS (навозный шар) → Stuck
//! - луч по obstruction слоям (стена) → Missed
//! - достиг точки прицела / истёк lifetime → Missed
//!
//! Побеждает ближайшее пересечение вдоль шага.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::ai::helpers::move_towards;
use crate::components::TargetKind;
use crate::physics::{GroundProbe, LayerMask};

/// Радиус попадания вокруг центра цели
pub const TONGUE_HIT_RADIUS: f32 = 0.6;
/// Центр цели над её позицией
pub const TONGUE_AIM_HEIGHT: f32 = 0.5;
/// Ближе этого к точке прицела без попадания — промах
pub const TONGUE_MISS_DISTANCE: f32 = 0.1;
/// Страховка: язык не живёт дольше
pub const TONGUE_LIFETIME: f32 = 3.0;

/// Цель глазами языка (live позиция на этот шаг)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TongueTarget {
    pub position: Vec3,
    pub kind: TargetKind,
}

impl TongueTarget {
    fn center(&self) -> Vec3 {
        self.position + Vec3::Y * TONGUE_AIM_HEIGHT
    }
}

/// Результат шага
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TongueOutcome {
    Flying,
    /// Попал в игрока — тянем
    Caught,
    /// Прилип к объекту мира (навозный шар)
    Stuck,
    Missed,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TongueShot {
    pub origin: Vec3,
    pub tip: Vec3,
    pub aim: Vec3,
    pub elapsed: f32,
}

enum Contact {
    Target(TargetKind),
    Prop,
    Wall,
}

impl TongueShot {
    /// Выстрел ко `aim`, дальность зажата `max_range`
    pub fn launch(origin: Vec3, aim: Vec3, max_range: f32) -> Self {
        let offset = aim - origin;
        let aim = if offset.length() > max_range {
            origin + offset.normalize_or_zero() * max_range
        } else {
            aim
        };

        Self {
            origin,
            tip: origin,
            aim,
            elapsed: 0.0,
        }
    }

    /// Длина высунутого языка
    pub fn extension(&self) -> f32 {
        self.origin.distance(self.tip)
    }

    pub fn advance<P: GroundProbe + ?Sized>(
        &mut self,
        delta: f32,
        speed: f32,
        target: Option<TongueTarget>,
        probe: &P,
        obstruction: LayerMask,
    ) -> TongueOutcome {
        self.elapsed += delta;
        if self.elapsed >= TONGUE_LIFETIME {
            return TongueOutcome::Missed;
        }

        let next = move_towards(self.tip, self.aim, speed * delta);
        let step = next - self.tip;
        let length = step.length();

        if length > f32::EPSILON {
            let direction = step / length;
            let mut nearest: Option<(f32, Contact)> = None;
            let mut consider = |distance: f32, contact: Contact| {
                if nearest.as_ref().map_or(true, |(best, _)| distance < *best) {
                    nearest = Some((distance, contact));
                }
            };

            if let Some(target) = target {
                if let Some(distance) = segment_sphere(self.tip, direction, length, target.center()) {
                    consider(distance, Contact::Target(target.kind));
                }
            }
            if let Some(hit) = probe.cast_ray(self.tip, direction, length, LayerMask::PROPS) {
                consider(hit.distance, Contact::Prop);
            }
            if let Some(hit) = probe.cast_ray(self.tip, direction, length, obstruction) {
                consider(hit.distance, Contact::Wall);
            }

            if let Some((distance, contact)) = nearest {
                self.tip += direction * distance;
                return match contact {
                    Contact::Target(TargetKind::Player(_)) => TongueOutcome::Caught,
                    Contact::Target(TargetKind::Object { .. }) | Contact::Prop => TongueOutcome::Stuck,
                    Contact::Wall => TongueOutcome::Missed,
                };
            }
        }

        self.tip = next;
        if self.tip.distance(self.aim) < TONGUE_MISS_DISTANCE {
            return TongueOutcome::Missed;
        }

        TongueOutcome::Flying
    }
}

/// Расстояние вдоль шага до ближайшей к центру точки, если она в радиусе
fn segment_sphere(start: Vec3, direction: Vec3, length: f32, center: Vec3) -> Option<f32> {
    let along = (center - start).dot(direction).clamp(0.0, length);
    let closest = start + direction * along;
    (closest.distance(center) <= TONGUE_HIT_RADIUS).then_some(along)
}
