//! Navigator — единый API движения поверх двух режимов
//!
//! Архитектура:
//! - Active: всё делегируется `NavigationService` (navmesh агент хоста или `NavAgent`).
//!   Скорость плавно подводится к target (accel 5 / decel 10 m/s²).
//! - Dormant: дешёвое прямолинейное движение без pathfinding,
//!   поворот slerp к направлению, коррекция высоты земли каждый 30-й тик.
//!
//! Режим = включён ли сервис. Переключает LOD (`set_active`), не состояния.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::service::NavigationService;
use crate::physics::{GroundProbe, LayerMask};

/// Ускорение navmesh агента (m/s²)
pub const ACCELERATION: f32 = 5.0;
/// Торможение navmesh агента (m/s²)
pub const DECELERATION: f32 = 10.0;
/// Slerp factor поворота (в секунду)
pub const MANUAL_ROTATION_SPEED: f32 = 5.0;
/// Dormant: проверка земли раз в N тиков
pub const GROUND_CHECK_INTERVAL: u32 = 30;
/// Dormant: длина луча вниз (от pivot + up)
pub const GROUND_CHECK_DISTANCE: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavMode {
    Active,
    Dormant,
}

/// Per-agent адаптер движения
#[derive(Component, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Navigator {
    destination: Vec3,
    moving: bool,
    target_speed: f32,
    speed_multiplier: f32,
    stopping_distance: f32,
    ground_layers: LayerMask,
    tick_counter: u32,
}

impl Navigator {
    pub fn new(position: Vec3, stopping_distance: f32, ground_layers: LayerMask) -> Self {
        Self {
            destination: position,
            moving: false,
            target_speed: 0.0,
            speed_multiplier: 1.0,
            stopping_distance,
            ground_layers,
            tick_counter: 0,
        }
    }

    pub fn mode<S: NavigationService + ?Sized>(service: Option<&S>) -> NavMode {
        match service {
            Some(service) if service.is_enabled() => NavMode::Active,
            _ => NavMode::Dormant,
        }
    }

    pub fn destination(&self) -> Vec3 {
        self.destination
    }

    pub fn is_moving(&self) -> bool {
        self.moving
    }

    pub fn target_speed(&self) -> f32 {
        self.target_speed
    }

    /// Эффективная скорость с учётом временного замедления
    pub fn effective_speed(&self) -> f32 {
        if self.moving {
            self.target_speed * self.speed_multiplier
        } else {
            0.0
        }
    }

    pub fn move_to<S: NavigationService + ?Sized>(
        &mut self,
        service: Option<&mut S>,
        destination: Vec3,
        speed: f32,
    ) {
        // Тот же пункт назначения — путь не пересчитываем
        let changed = !self.moving || self.destination.distance_squared(destination) > 1e-4;

        self.destination = destination;
        self.moving = true;
        self.target_speed = speed;

        if let Some(service) = service {
            if service.is_enabled() && (changed || !service.has_path()) {
                service.set_destination(destination);
            }
        }
    }

    /// Стоим там, где остановились: `has_arrived` сразу true
    pub fn stop<S: NavigationService + ?Sized>(&mut self, service: Option<&mut S>, position: Vec3) {
        self.destination = position;
        self.moving = false;
        self.target_speed = 0.0;

        if let Some(service) = service {
            if service.is_enabled() && service.has_path() {
                service.reset_path();
            }
        }
    }

    /// Остановиться на месте и развернуться к точке (только yaw)
    pub fn turn_towards<S: NavigationService + ?Sized>(
        &mut self,
        service: Option<&mut S>,
        transform: &mut Transform,
        point: Vec3,
        turn_speed: f32,
        delta: f32,
    ) {
        self.destination = transform.translation;
        self.moving = false;
        self.target_speed = 0.0;

        if let Some(service) = service {
            if service.is_enabled() {
                service.set_destination(transform.translation);
            }
        }

        face_towards(transform, point, turn_speed * delta);
    }

    /// Active: путь посчитан и остаток ≤ stopping. Dormant: planar distance < stopping.
    pub fn has_arrived<S: NavigationService + ?Sized>(&self, service: Option<&S>, position: Vec3) -> bool {
        match service {
            Some(service) if service.is_enabled() => {
                !service.path_pending() && service.remaining_distance() <= self.stopping_distance
            }
            _ => planar_distance(position, self.destination) < self.stopping_distance,
        }
    }

    /// Временное замедление (Hit stun)
    pub fn slow_down(&mut self, multiplier: f32) {
        self.speed_multiplier = multiplier.clamp(0.0, 1.0);
    }

    pub fn restore_speed(&mut self) {
        self.speed_multiplier = 1.0;
    }

    /// LOD рычаг: включить/выключить navmesh агента
    ///
    /// Dormant → Active: сервис warp'ается в текущую позицию, текущий маршрут переиздаётся.
    pub fn set_active<S: NavigationService + ?Sized>(
        &mut self,
        service: Option<&mut S>,
        active: bool,
        position: Vec3,
    ) {
        let Some(service) = service else {
            return;
        };

        if active && !service.is_enabled() {
            service.enable();
            service.warp(position);
            if self.moving {
                service.set_destination(self.destination);
            }
        } else if !active && service.is_enabled() {
            service.disable();
        }
    }

    /// Выключить навигацию совсем (смерть)
    pub fn disable<S: NavigationService + ?Sized>(&mut self, service: Option<&mut S>) {
        self.moving = false;
        self.target_speed = 0.0;
        if let Some(service) = service {
            service.reset_path();
            service.disable();
        }
    }

    /// Locomotion тик (после решений состояний)
    pub fn tick<S: NavigationService + ?Sized>(
        &mut self,
        service: Option<&mut S>,
        transform: &mut Transform,
        probe: &dyn GroundProbe,
        delta: f32,
    ) {
        match service {
            Some(service) if service.is_enabled() => self.active_step(service, transform, delta),
            _ => self.dormant_step(transform, probe, delta),
        }
    }

    fn active_step<S: NavigationService + ?Sized>(&mut self, service: &mut S, transform: &mut Transform, delta: f32) {
        let target = self.effective_speed();
        let current = service.speed();
        let rate = if target > current { ACCELERATION } else { DECELERATION };
        service.set_speed(approach(current, target, rate * delta));

        transform.translation = service.step(delta);

        let velocity = service.velocity();
        if velocity.length_squared() > 1e-4 {
            face_towards(transform, transform.translation + velocity, MANUAL_ROTATION_SPEED * delta);
        }
    }

    fn dormant_step(&mut self, transform: &mut Transform, probe: &dyn GroundProbe, delta: f32) {
        if !self.moving {
            return;
        }

        let offset = self.destination - transform.translation;
        let flat = Vec3::new(offset.x, 0.0, offset.z);
        let distance = flat.length();
        if distance < self.stopping_distance || distance <= f32::EPSILON {
            return;
        }

        let direction = flat / distance;
        let travel = (self.effective_speed() * delta).min(distance);
        transform.translation += direction * travel;
        face_towards(transform, self.destination, MANUAL_ROTATION_SPEED * delta);

        self.tick_counter = self.tick_counter.wrapping_add(1);
        if self.tick_counter % GROUND_CHECK_INTERVAL == 0 {
            let origin = transform.translation + Vec3::Y;
            if let Some(ground) = probe.probe_ground(origin, GROUND_CHECK_DISTANCE, self.ground_layers) {
                transform.translation.y = ground.y;
            }
        }
    }
}

/// Slerp поворот к точке только по yaw (factor clamp 0..1)
pub fn face_towards(transform: &mut Transform, point: Vec3, factor: f32) {
    let flat = Vec3::new(point.x, transform.translation.y, point.z);
    if flat.distance_squared(transform.translation) <= 1e-6 {
        return;
    }

    let target = Transform::from_translation(transform.translation)
        .looking_at(flat, Vec3::Y)
        .rotation;
    transform.rotation = transform.rotation.slerp(target, factor.clamp(0.0, 1.0));
}

pub fn planar_distance(a: Vec3, b: Vec3) -> f32 {
    Vec2::new(a.x - b.x, a.z - b.z).length()
}

/// Скаляр к цели с ограничением шага
pub fn approach(current: f32, target: f32, max_delta: f32) -> f32 {
    if (target - current).abs() <= max_delta {
        target
    } else {
        current + (target - current).signum() * max_delta
    }
}
