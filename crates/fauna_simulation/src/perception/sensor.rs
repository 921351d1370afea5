//! PerceptionSensor — выбор цели (FOV + LOS + звук + память)
//!
//! Архитектура (один refresh):
//! 1. Coarse LOD pass: distance² до каждого кандидата, без тригонометрии и лучей.
//!    Кандидат внутри `activation_radius_sq` → `any_near = true`.
//!    За радиусом fine pass не запускается вообще.
//! 2. Fine pass: heard (distance ≤ sound_range) OR in sight
//!    (distance ≤ fov_range, горизонтальный угол ≤ fov_angle / 2, луч от глаз не загорожен).
//! 3. Выбор: ближайший acquired кандидат; при равенстве — первый по порядку итерации.
//!    Никого нет → держим прежнюю цель пока не истекла память и цель валидна
//!    (преследование к last known position), иначе полный сброс.
//!
//! Сенсор — чистый Rust (без ECS queries), системы в `systems.rs` только собирают кандидатов.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::{AgentConfig, ConfigError};
use crate::config::agent::{non_negative, positive};
use crate::physics::LineOfSight;

/// Высота "груди" цели над pivot — точка, в которую смотрит LOS луч
pub const TARGET_AIM_HEIGHT: f32 = 0.8;

/// Тюнинг сенсора (общий для вида)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorSettings {
    /// Множитель fov_range для forced detection ("меня ударили")
    pub range_multiplier: f32,
    /// Сколько помним потерянную цель (секунды)
    pub memory_duration: f32,
    /// Интервал refresh когда кто-то рядом
    pub sensor_interval: f32,
    /// Интервал refresh в dormant (никого рядом)
    pub dormant_interval: f32,
    /// Радиус LOD активации (квадрат, чтобы не брать sqrt)
    pub activation_radius_sq: f32,
}

impl Default for SensorSettings {
    fn default() -> Self {
        Self {
            range_multiplier: 1.5,
            memory_duration: 3.0,
            sensor_interval: 0.2,
            dormant_interval: 0.5,
            activation_radius_sq: 3000.0, // ~55m
        }
    }
}

impl SensorSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("range_multiplier", self.range_multiplier)?;
        non_negative("memory_duration", self.memory_duration)?;
        positive("sensor_interval", self.sensor_interval)?;
        positive("dormant_interval", self.dormant_interval)?;
        positive("activation_radius_sq", self.activation_radius_sq)?;
        Ok(())
    }
}

/// Кандидат в цели (собирается системой из `Targetable` entities)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub entity: Entity,
    pub position: Vec3,
    pub active: bool,
}

/// Положение сенсора: позиция + forward (Y у forward игнорируется)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorPose {
    pub position: Vec3,
    pub forward: Vec3,
}

impl SensorPose {
    pub fn new(position: Vec3, forward: Vec3) -> Self {
        Self { position, forward }
    }

    pub fn from_transform(transform: &Transform) -> Self {
        Self {
            position: transform.translation,
            forward: *transform.forward(),
        }
    }

    /// Точка глаз (pivot + up * fov_height)
    pub fn eye(&self, fov_height: f32) -> Vec3 {
        self.position + Vec3::Y * fov_height
    }
}

/// Результат fine pass для одного кандидата
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Detection {
    pub in_sight: bool,
    pub heard: bool,
}

impl Detection {
    /// Зрение и слух независимы (OR)
    pub fn acquired(&self) -> bool {
        self.in_sight || self.heard
    }
}

/// Снимок сенсора для состояний (read-only факты)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SensorReport {
    /// Текущая цель (держится пока жива память)
    pub target: Option<Entity>,
    /// Позиция цели на момент последнего обнаружения
    pub last_known_position: Vec3,
    pub in_sight: bool,
    pub heard: bool,
    /// LOD сигнал: кто-то внутри activation radius
    pub any_near: bool,
    /// Цель обнаружена последним refresh (false = только память)
    pub acquired: bool,
}

impl SensorReport {
    pub fn has_target(&self) -> bool {
        self.target.is_some()
    }

    /// Цель потеряна, но ещё помнится
    pub fn is_remembering(&self) -> bool {
        self.target.is_some() && !self.acquired
    }
}

/// Per-agent сенсор
#[derive(Component, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerceptionSensor {
    settings: SensorSettings,
    report: SensorReport,
    memory: f32,
    refresh_timer: f32,
    /// Сколько раз запускался fine pass (диагностика LOD)
    fine_checks: u64,
}

impl PerceptionSensor {
    pub fn new(settings: SensorSettings) -> Self {
        Self {
            settings,
            report: SensorReport::default(),
            memory: 0.0,
            refresh_timer: 0.0,
            fine_checks: 0,
        }
    }

    pub fn settings(&self) -> &SensorSettings {
        &self.settings
    }

    pub fn report(&self) -> SensorReport {
        self.report
    }

    pub fn memory_remaining(&self) -> f32 {
        self.memory
    }

    pub fn fine_checks(&self) -> u64 {
        self.fine_checks
    }

    /// Throttle: true если пора делать refresh (таймер перезапускается)
    ///
    /// Интервал: `sensor_interval` когда кто-то рядом, `dormant_interval` иначе.
    pub fn is_due(&mut self, delta: f32) -> bool {
        self.refresh_timer -= delta;
        if self.refresh_timer > 0.0 {
            return false;
        }

        self.refresh_timer = if self.report.any_near {
            self.settings.sensor_interval
        } else {
            self.settings.dormant_interval
        };
        true
    }

    /// Память тикает каждый тик; истекла и цель не видна → сброс
    pub fn tick_memory(&mut self, delta: f32) {
        if self.memory > 0.0 {
            self.memory = (self.memory - delta).max(0.0);
        }

        if self.memory <= 0.0 && self.report.is_remembering() {
            self.forget_target();
        }
    }

    /// Полный refresh (coarse + fine + selection)
    pub fn refresh<I>(
        &mut self,
        config: &AgentConfig,
        pose: SensorPose,
        candidates: I,
        line_of_sight: &dyn LineOfSight,
    ) -> SensorReport
    where
        I: IntoIterator<Item = Candidate>,
    {
        let held = self.report.target;
        let mut held_valid = false;
        let mut any_near = false;
        let mut best: Option<(Candidate, f32, Detection)> = None;

        for candidate in candidates {
            if Some(candidate.entity) == held {
                held_valid = candidate.active;
            }

            if !candidate.active {
                continue;
            }

            // Coarse LOD pass
            let distance_sq = pose.position.distance_squared(candidate.position);
            if distance_sq > self.settings.activation_radius_sq {
                continue;
            }
            any_near = true;

            // Не ближе уже выбранного — fine pass не нужен (ties keep first)
            if best.as_ref().is_some_and(|(_, best_sq, _)| distance_sq >= *best_sq) {
                continue;
            }

            self.fine_checks += 1;
            let detection = detect(config, pose, candidate.position, distance_sq.sqrt(), line_of_sight);
            if detection.acquired() {
                best = Some((candidate, distance_sq, detection));
            }
        }

        self.report.any_near = any_near;

        match best {
            Some((candidate, _, detection)) => {
                self.acquire(candidate.entity, candidate.position, detection);
            }
            None => self.handle_lost_target(held_valid),
        }

        self.report
    }

    /// Forced detection: "меня ударил X"
    ///
    /// X захватывается если targetable и в пределах `fov_range × range_multiplier`.
    pub fn force_detection(&mut self, config: &AgentConfig, pose: SensorPose, attacker: Candidate) -> bool {
        if !attacker.active {
            return false;
        }

        let distance = pose.position.distance(attacker.position);
        if distance > config.fov_range * self.settings.range_multiplier {
            return false;
        }

        self.acquire(
            attacker.entity,
            attacker.position,
            Detection {
                in_sight: true,
                heard: distance <= config.sound_range,
            },
        );
        true
    }

    /// Мёртвый агент ничего не видит
    pub fn clear(&mut self) {
        self.report = SensorReport::default();
        self.memory = 0.0;
    }

    fn acquire(&mut self, entity: Entity, position: Vec3, detection: Detection) {
        self.report.target = Some(entity);
        self.report.last_known_position = position;
        self.report.in_sight = detection.in_sight;
        self.report.heard = detection.heard;
        self.report.acquired = true;
        self.memory = self.settings.memory_duration;
    }

    fn handle_lost_target(&mut self, held_valid: bool) {
        self.report.in_sight = false;
        self.report.heard = false;
        self.report.acquired = false;

        if !(self.report.target.is_some() && held_valid && self.memory > 0.0) {
            self.forget_target();
        }
    }

    fn forget_target(&mut self) {
        self.report.target = None;
        self.report.last_known_position = Vec3::ZERO;
        self.report.in_sight = false;
        self.report.heard = false;
        self.report.acquired = false;
        self.memory = 0.0;
    }
}

/// Fine pass для одного кандидата
pub fn detect(
    config: &AgentConfig,
    pose: SensorPose,
    target: Vec3,
    distance: f32,
    line_of_sight: &dyn LineOfSight,
) -> Detection {
    let heard = distance <= config.sound_range;

    // Порядок важен: дешёвые проверки до raycast
    let in_sight = distance <= config.fov_range
        && in_field_of_view(pose.forward, pose.position, target, config.fov_angle)
        && !line_of_sight.is_obstructed(
            pose.eye(config.fov_height),
            target + Vec3::Y * TARGET_AIM_HEIGHT,
            config.obstruction_layers,
        );

    Detection { in_sight, heard }
}

/// Горизонтальный угол между forward и направлением на цель ≤ fov_angle / 2
///
/// Y игнорируется у обоих векторов. Цель строго над/под агентом считается в конусе.
pub fn in_field_of_view(forward: Vec3, from: Vec3, to: Vec3, fov_angle: f32) -> bool {
    let flat_forward = Vec3::new(forward.x, 0.0, forward.z).normalize_or_zero();
    let flat_direction = Vec3::new(to.x - from.x, 0.0, to.z - from.z).normalize_or_zero();

    if flat_direction == Vec3::ZERO || flat_forward == Vec3::ZERO {
        return true;
    }

    let cos = flat_forward.dot(flat_direction).clamp(-1.0, 1.0);
    cos.acos().to_degrees() <= fov_angle * 0.5 + 1e-4
}
