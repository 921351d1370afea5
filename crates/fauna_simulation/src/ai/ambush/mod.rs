//! Ambush archetype (жаба): сидит в камуфляже, стреляет языком
//!
//! Camouflage → Aim → Snap → { Pull → Bite | Stuck → Recover | промах } → Cooldown → Camouflage

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::context::{AgentCommand, AgentContext};
use super::helpers::{move_towards, tick_timer};
use super::state::{BehaviorError, BehaviorState, Transition};
use crate::config::AmbushConfig;
use crate::navigation::face_towards;

pub mod camouflage;
pub mod tongue;

pub use camouflage::{Camouflage, CAMOUFLAGED_ALPHA, VISIBLE_ALPHA};
pub use tongue::{TongueOutcome, TongueShot, TongueTarget};

/// Рот относительно позиции агента
pub const MOUTH_FORWARD_OFFSET: f32 = 0.4;
pub const MOUTH_HEIGHT: f32 = 0.3;
/// Pull завершён когда цель ближе к рту
pub const PULL_COMPLETE_DISTANCE: f32 = 1.0;
pub const BITE_DURATION: f32 = 1.0;
pub const RECOVER_DURATION: f32 = 1.0;
pub const HIT_STUN_DURATION: f32 = 0.5;
/// Поворот к цели при прицеливании (slerp factor / s)
pub const AIM_TURN_RATE: f32 = 5.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AmbushState {
    Camouflage,
    Aim { elapsed: f32 },
    /// `tongue = None` после выстрела: язык передан в Pull / Stuck
    Snap { tongue: Option<TongueShot> },
    /// `reeled_in`: цель у рта, язык переходит к Bite
    Pull { reeled_in: bool },
    Bite { elapsed: f32 },
    Stuck { elapsed: f32 },
    Recover { elapsed: f32 },
    Cooldown { elapsed: f32 },
    Hit { elapsed: f32 },
    Die,
}

impl AmbushState {
    pub fn aim() -> Self {
        Self::Aim { elapsed: 0.0 }
    }

    pub fn snap() -> Self {
        Self::Snap { tongue: None }
    }

    pub fn pull() -> Self {
        Self::Pull { reeled_in: false }
    }

    pub fn bite() -> Self {
        Self::Bite { elapsed: 0.0 }
    }

    pub fn stuck() -> Self {
        Self::Stuck { elapsed: 0.0 }
    }

    pub fn recover() -> Self {
        Self::Recover { elapsed: 0.0 }
    }

    pub fn cooldown() -> Self {
        Self::Cooldown { elapsed: 0.0 }
    }
}

/// Точка рта в мире
pub fn mouth_point(transform: &Transform) -> Vec3 {
    transform.translation + *transform.forward() * MOUTH_FORWARD_OFFSET + Vec3::Y * MOUTH_HEIGHT
}

fn ambush_config<'a>(ctx: &AgentContext<'a>, state: &'static str) -> Result<&'a AmbushConfig, BehaviorError> {
    ctx.ambush.ok_or(BehaviorError::MissingConfig {
        state,
        section: "ambush",
    })
}

impl BehaviorState for AmbushState {
    fn name(&self) -> &'static str {
        match self {
            Self::Camouflage => "Camouflage",
            Self::Aim { .. } => "Aim",
            Self::Snap { .. } => "Snap",
            Self::Pull { .. } => "Pull",
            Self::Bite { .. } => "Bite",
            Self::Stuck { .. } => "Stuck",
            Self::Recover { .. } => "Recover",
            Self::Cooldown { .. } => "Cooldown",
            Self::Hit { .. } => "Hit",
            Self::Die => "Die",
        }
    }

    fn enter(&mut self, ctx: &mut AgentContext<'_>) {
        match self {
            Self::Camouflage => {
                ctx.stop_moving();
                ctx.push(AgentCommand::SetCamouflage(true));
                ctx.animate(|a| a.trigger(a.keys.idle));
            }
            Self::Aim { elapsed } => {
                *elapsed = 0.0;
                ctx.push(AgentCommand::SetCamouflage(false));
                ctx.animate(|a| a.trigger(a.keys.aim));
            }
            Self::Snap { tongue } => {
                ctx.animate(|a| a.trigger(a.keys.snap));

                *tongue = match (ctx.target, ctx.ambush) {
                    (Some(target), Some(config)) => {
                        let from = mouth_point(ctx.transform);
                        let aim = target.position + Vec3::Y * tongue::TONGUE_AIM_HEIGHT;
                        let shot = TongueShot::launch(from, aim, config.max_tongue_range);
                        ctx.push(AgentCommand::FireTongue {
                            from,
                            towards: shot.aim,
                        });
                        Some(shot)
                    }
                    _ => None,
                };
            }
            Self::Pull { reeled_in } => {
                *reeled_in = false;
                ctx.animate(|a| a.trigger(a.keys.pull));
            }
            Self::Bite { elapsed } => {
                *elapsed = 0.0;
                ctx.animate(|a| a.trigger(a.keys.bite));

                if let (Some(target), Some(config)) = (ctx.target, ctx.ambush) {
                    ctx.deal_damage(target, config.bite_damage);
                }
            }
            Self::Stuck { elapsed } => {
                *elapsed = 0.0;
                ctx.animate(|a| a.trigger(a.keys.stuck));
            }
            Self::Recover { elapsed } => {
                *elapsed = 0.0;
                ctx.animate(|a| a.trigger(a.keys.recover));
            }
            Self::Cooldown { elapsed } => {
                *elapsed = 0.0;
                ctx.animate(|a| a.trigger(a.keys.idle));
            }
            Self::Hit { elapsed } => {
                *elapsed = 0.0;
                ctx.push(AgentCommand::SetCamouflage(false));
                ctx.animate(|a| a.trigger(a.keys.hit));
            }
            Self::Die => {
                ctx.disable_navigation();
                ctx.push(AgentCommand::SetCamouflage(false));
                ctx.push(AgentCommand::DisableCollision);
                ctx.push(AgentCommand::RollLoot);
                ctx.animate(|a| a.trigger(a.keys.die));
            }
        }
    }

    fn update(&mut self, ctx: &mut AgentContext<'_>) -> Result<Transition<Self>, BehaviorError> {
        let delta = ctx.delta;

        match self {
            Self::Camouflage => {
                if ctx.sight_alert() {
                    return Ok(Transition::To(Self::aim()));
                }
            }
            Self::Aim { elapsed } => {
                let config = ambush_config(ctx, "Aim")?;

                if let Some(target) = ctx.target {
                    face_towards(ctx.transform, target.position, (AIM_TURN_RATE * delta).min(1.0));
                }

                if !ctx.sensor.in_sight {
                    return Ok(Transition::To(Self::Camouflage));
                }

                if tick_timer(elapsed, delta, config.aiming_time) {
                    return Ok(Transition::To(Self::snap()));
                }
            }
            Self::Snap { tongue } => {
                let config = ambush_config(ctx, "Snap")?;
                let Some(shot) = tongue.as_mut() else {
                    return Ok(Transition::To(Self::cooldown()));
                };

                let target = ctx.target.map(|target| TongueTarget {
                    position: target.position,
                    kind: target.kind,
                });
                let outcome = shot.advance(
                    delta,
                    config.tongue_speed,
                    target,
                    ctx.probe,
                    ctx.config.obstruction_layers,
                );

                match outcome {
                    TongueOutcome::Flying => {}
                    TongueOutcome::Caught => {
                        crate::logger::log(&format!("🐸 {:?} tongue caught target", ctx.entity));
                        *tongue = None;
                        return Ok(Transition::To(Self::pull()));
                    }
                    TongueOutcome::Stuck => {
                        crate::logger::log(&format!("🐸 {:?} tongue stuck", ctx.entity));
                        *tongue = None;
                        return Ok(Transition::To(Self::stuck()));
                    }
                    // Язык ещё в Snap: втянется на exit
                    TongueOutcome::Missed => return Ok(Transition::To(Self::cooldown())),
                }
            }
            Self::Pull { reeled_in } => {
                let config = ambush_config(ctx, "Pull")?;
                let target = ctx.target.ok_or(BehaviorError::MissingTarget { state: "Pull" })?;

                let mouth = mouth_point(ctx.transform);
                let max_step = config.pull_speed * delta;
                ctx.push(AgentCommand::PullTarget {
                    target: target.entity,
                    towards: mouth,
                    max_step,
                });

                // Позиция после применения pull в этом тике
                let pulled = move_towards(target.position, mouth, max_step);
                if pulled.distance(mouth) < PULL_COMPLETE_DISTANCE {
                    *reeled_in = true;
                    return Ok(Transition::To(Self::bite()));
                }
            }
            Self::Bite { elapsed } => {
                if tick_timer(elapsed, delta, BITE_DURATION) {
                    return Ok(Transition::To(Self::cooldown()));
                }
            }
            Self::Stuck { elapsed } => {
                let config = ambush_config(ctx, "Stuck")?;
                if tick_timer(elapsed, delta, config.stun_duration) {
                    return Ok(Transition::To(Self::recover()));
                }
            }
            Self::Recover { elapsed } => {
                if tick_timer(elapsed, delta, RECOVER_DURATION) {
                    return Ok(Transition::To(Self::cooldown()));
                }
            }
            Self::Cooldown { elapsed } => {
                let config = ambush_config(ctx, "Cooldown")?;
                if tick_timer(elapsed, delta, config.cooldown_time) {
                    return Ok(Transition::To(Self::Camouflage));
                }
            }
            Self::Hit { elapsed } => {
                if tick_timer(elapsed, delta, HIT_STUN_DURATION) {
                    return Ok(Transition::To(if ctx.sight_alert() {
                        Self::aim()
                    } else {
                        Self::Camouflage
                    }));
                }
            }
            Self::Die => {}
        }

        Ok(Transition::Stay)
    }

    /// Один RetractTongue на выстрел: втягивает то состояние, которое держит язык последним
    /// (в том числе при Hit / Die / recover посреди Snap или Pull)
    fn exit(&mut self, ctx: &mut AgentContext<'_>) {
        let holds_tongue = match self {
            Self::Snap { tongue } => tongue.is_some(),
            Self::Pull { reeled_in } => !*reeled_in,
            Self::Bite { .. } | Self::Stuck { .. } => true,
            _ => false,
        };
        if holds_tongue {
            ctx.push(AgentCommand::RetractTongue);
        }
    }

    fn initial() -> Self {
        Self::Camouflage
    }

    fn hit() -> Self {
        Self::Hit { elapsed: 0.0 }
    }

    fn die() -> Self {
        Self::Die
    }

    fn is_terminal(&self) -> bool {
        matches!(self, Self::Die)
    }

    fn is_hit(&self) -> bool {
        matches!(self, Self::Hit { .. })
    }
}
