//! NavigationService — внешний pathfinding агент
//!
//! Хост (движок с navmesh) реализует trait на своём компоненте.
//! `NavAgent` — встроенная реализация: прямолинейный steering без navmesh,
//! используется headless и в тестах.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Контракт navmesh агента
pub trait NavigationService {
    fn is_enabled(&self) -> bool;
    fn enable(&mut self);
    fn disable(&mut self);

    /// Телепорт внутренней позиции (re-anchor после dormant)
    fn warp(&mut self, position: Vec3);

    fn set_destination(&mut self, destination: Vec3);
    fn reset_path(&mut self);
    fn has_path(&self) -> bool;
    /// Путь ещё считается (arrival проверять рано)
    fn path_pending(&self) -> bool;
    fn remaining_distance(&self) -> f32;

    fn speed(&self) -> f32;
    fn set_speed(&mut self, speed: f32);
    fn velocity(&self) -> Vec3;

    /// Продвигает агента на тик, возвращает новую позицию
    fn step(&mut self, delta: f32) -> Vec3;
}

/// Встроенный steering агент (straight line)
///
/// Путь "считается" один тик: `path_pending` true до следующего `step`.
#[derive(Component, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavAgent {
    enabled: bool,
    position: Vec3,
    destination: Option<Vec3>,
    pending: bool,
    speed: f32,
    velocity: Vec3,
    /// Агент останавливается на этом расстоянии от точки
    pub stopping_distance: f32,
}

impl NavAgent {
    pub fn new(position: Vec3, stopping_distance: f32) -> Self {
        Self {
            enabled: false,
            position,
            destination: None,
            pending: false,
            speed: 0.0,
            velocity: Vec3::ZERO,
            stopping_distance,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn destination(&self) -> Option<Vec3> {
        self.destination
    }
}

impl NavigationService for NavAgent {
    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn enable(&mut self) {
        self.enabled = true;
    }

    fn disable(&mut self) {
        self.enabled = false;
        self.velocity = Vec3::ZERO;
    }

    fn warp(&mut self, position: Vec3) {
        self.position = position;
        self.velocity = Vec3::ZERO;
    }

    fn set_destination(&mut self, destination: Vec3) {
        if !self.enabled {
            return;
        }
        self.destination = Some(destination);
        self.pending = true;
    }

    fn reset_path(&mut self) {
        self.destination = None;
        self.pending = false;
        self.velocity = Vec3::ZERO;
    }

    fn has_path(&self) -> bool {
        self.destination.is_some()
    }

    fn path_pending(&self) -> bool {
        self.pending
    }

    fn remaining_distance(&self) -> f32 {
        self.destination
            .map_or(0.0, |destination| self.position.distance(destination))
    }

    fn speed(&self) -> f32 {
        self.speed
    }

    fn set_speed(&mut self, speed: f32) {
        self.speed = speed.max(0.0);
    }

    fn velocity(&self) -> Vec3 {
        self.velocity
    }

    fn step(&mut self, delta: f32) -> Vec3 {
        self.pending = false;

        let Some(destination) = self.destination.filter(|_| self.enabled) else {
            self.velocity = Vec3::ZERO;
            return self.position;
        };

        let offset = destination - self.position;
        let distance = offset.length();
        if distance <= self.stopping_distance || distance <= f32::EPSILON {
            self.velocity = Vec3::ZERO;
            return self.position;
        }

        let travel = (self.speed * delta).min(distance - self.stopping_distance);
        let direction = offset / distance;
        self.position += direction * travel;
        self.velocity = if delta > 0.0 { direction * travel / delta } else { Vec3::ZERO };
        self.position
    }
}
