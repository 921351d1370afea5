//! Камуфляж: плавный fade прозрачности (shader float `_CamouflageAmount`)

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Почти невидим
pub const CAMOUFLAGED_ALPHA: f32 = 0.1;
pub const VISIBLE_ALPHA: f32 = 1.0;

/// Component: текущая прозрачность + активный fade
#[derive(Component, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camouflage {
    alpha: f32,
    start: f32,
    goal: f32,
    elapsed: f32,
    fade_time: f32,
}

impl Camouflage {
    pub fn new(fade_time: f32) -> Self {
        Self {
            alpha: VISIBLE_ALPHA,
            start: VISIBLE_ALPHA,
            goal: VISIBLE_ALPHA,
            elapsed: 0.0,
            fade_time,
        }
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn is_fading(&self) -> bool {
        self.alpha != self.goal
    }

    /// Новый fade от текущего значения (прерывает предыдущий)
    pub fn set(&mut self, active: bool) {
        self.start = self.alpha;
        self.goal = if active { CAMOUFLAGED_ALPHA } else { VISIBLE_ALPHA };
        self.elapsed = 0.0;
    }

    /// Шаг fade. Возвращает Some(alpha) если значение изменилось.
    pub fn tick(&mut self, delta: f32) -> Option<f32> {
        if !self.is_fading() {
            return None;
        }

        self.elapsed += delta;
        let t = if self.fade_time > 0.0 {
            (self.elapsed / self.fade_time).min(1.0)
        } else {
            1.0
        };

        self.alpha = self.start + (self.goal - self.start) * t;
        if t >= 1.0 {
            self.alpha = self.goal;
        }
        Some(self.alpha)
    }
}
