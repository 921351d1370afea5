//! Ground archetype states (кабан, жук, волк)
//!
//! Переходы:
//! - Idle → Trace (видит, не friendly) | Patrol (таймер)
//! - Patrol → Trace (видит) | Idle (дошёл, после 0.1с grace)
//! - Trace → Attack (в attack range, Idle если friendly) | Idle (потерял и дошёл)
//! - Attack → Trace (attack_timeout)
//! - Hit → Trace (stun)
//! - Die — terminal

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::context::{AgentCommand, AgentContext, Pace};
use super::helpers::tick_timer;
use super::state::{BehaviorError, BehaviorState, Transition};

/// Patrol: arrival не проверяется первые 0.1с (путь ещё считается)
pub const PATROL_ARRIVAL_GRACE: f32 = 0.1;
/// Hit stun
pub const HIT_STUN_DURATION: f32 = 0.5;
/// Скорость во время stun (доля)
pub const HIT_SPEED_MULTIPLIER: f32 = 0.3;

/// Re-route в Patrol если услышанная точка сместилась больше чем на это
const HEARD_REROUTE_DISTANCE_SQ: f32 = 0.25;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GroundState {
    Idle { duration: f32, elapsed: f32 },
    Patrol { destination: Vec3, elapsed: f32 },
    Trace,
    Attack { elapsed: f32, damage_applied: bool },
    Hit { elapsed: f32 },
    Die,
}

impl GroundState {
    pub fn idle() -> Self {
        Self::Idle {
            duration: 0.0,
            elapsed: 0.0,
        }
    }

    pub fn patrol() -> Self {
        Self::Patrol {
            destination: Vec3::ZERO,
            elapsed: 0.0,
        }
    }

    pub fn attack() -> Self {
        Self::Attack {
            elapsed: 0.0,
            damage_applied: false,
        }
    }
}

/// Только слышит (не видит) — идём на звук. Дружелюбные на звук не реагируют.
fn heard_only(ctx: &AgentContext<'_>) -> bool {
    !ctx.config.friendly && ctx.sensor.heard && !ctx.sensor.in_sight && ctx.sensor.has_target()
}

impl BehaviorState for GroundState {
    fn name(&self) -> &'static str {
        match self {
            Self::Idle { .. } => "Idle",
            Self::Patrol { .. } => "Patrol",
            Self::Trace => "Trace",
            Self::Attack { .. } => "Attack",
            Self::Hit { .. } => "Hit",
            Self::Die => "Die",
        }
    }

    fn enter(&mut self, ctx: &mut AgentContext<'_>) {
        match self {
            Self::Idle { duration, elapsed } => {
                ctx.stop_moving();
                *elapsed = 0.0;
                *duration = ctx.random_range(ctx.config.idle_min_time, ctx.config.idle_max_time);
                ctx.animate(|a| {
                    a.set_bool(a.keys.walking, false);
                    a.set_bool(a.keys.running, false);
                    a.set_float(a.keys.move_speed, 0.0);
                });
            }
            Self::Patrol { destination, elapsed } => {
                *elapsed = 0.0;
                *destination = if heard_only(ctx) {
                    ctx.sensor.last_known_position
                } else {
                    ctx.patrol_destination()
                };
                ctx.move_to(*destination, Pace::Walk);
                ctx.animate(|a| {
                    a.set_bool(a.keys.walking, true);
                    a.set_float(a.keys.move_speed, 1.0);
                });
            }
            Self::Trace => {
                ctx.animate(|a| {
                    a.set_bool(a.keys.running, true);
                    a.set_float(a.keys.move_speed, 2.0);
                });
            }
            Self::Attack { elapsed, damage_applied } => {
                *elapsed = 0.0;
                *damage_applied = false;
                ctx.stop_moving();
                if let Some(target) = ctx.target {
                    ctx.look_at(target.position);
                }
                ctx.animate(|a| a.trigger(a.keys.attack));
            }
            Self::Hit { elapsed } => {
                *elapsed = 0.0;
                ctx.slow_down(HIT_SPEED_MULTIPLIER);
                ctx.animate(|a| a.trigger(a.keys.hit));
            }
            Self::Die => {
                ctx.disable_navigation();
                ctx.push(AgentCommand::DisableCollision);
                ctx.push(AgentCommand::RollLoot);
                ctx.animate(|a| {
                    a.set_bool(a.keys.walking, false);
                    a.set_bool(a.keys.running, false);
                    a.trigger(a.keys.die);
                });
            }
        }
    }

    fn update(&mut self, ctx: &mut AgentContext<'_>) -> Result<Transition<Self>, BehaviorError> {
        let delta = ctx.delta;

        match self {
            Self::Idle { duration, elapsed } => {
                if ctx.sight_alert() {
                    return Ok(Transition::To(Self::Trace));
                }
                if tick_timer(elapsed, delta, *duration) {
                    return Ok(Transition::To(Self::patrol()));
                }
            }
            Self::Patrol { destination, elapsed } => {
                if ctx.sight_alert() {
                    return Ok(Transition::To(Self::Trace));
                }

                // Новый звук — меняем маршрут
                if heard_only(ctx)
                    && ctx.sensor.last_known_position.distance_squared(*destination) > HEARD_REROUTE_DISTANCE_SQ
                {
                    *destination = ctx.sensor.last_known_position;
                }

                ctx.move_to(*destination, Pace::Walk);

                *elapsed += delta;
                if *elapsed > PATROL_ARRIVAL_GRACE && ctx.arrived_at_destination() {
                    return Ok(Transition::To(Self::idle()));
                }
            }
            Self::Trace => {
                // Цель забыта (или её не было, например Hit во время патруля)
                let Some(point) = ctx.pursuit_point() else {
                    return Ok(Transition::To(Self::idle()));
                };
                ctx.move_to(point, Pace::Run);

                if ctx.sensor.has_target() && ctx.distance_to_target() <= ctx.config.attack_range {
                    return Ok(Transition::To(if ctx.config.friendly {
                        Self::idle()
                    } else {
                        Self::attack()
                    }));
                }

                if !ctx.sensor.in_sight && ctx.arrived_at_destination() {
                    return Ok(Transition::To(Self::idle()));
                }
            }
            Self::Attack { elapsed, damage_applied } => {
                if let Some(target) = ctx.target {
                    ctx.look_at(target.position);
                }

                *elapsed += delta;

                if !*damage_applied && *elapsed >= ctx.config.attack_delay {
                    *damage_applied = true;
                    if ctx.apply_damage_to_target(ctx.config.attack_damage) {
                        crate::logger::log(&format!("🐗 {:?} attack landed", ctx.entity));
                    }
                }

                if *elapsed >= ctx.config.attack_timeout {
                    return Ok(Transition::To(Self::Trace));
                }
            }
            Self::Hit { elapsed } => {
                if tick_timer(elapsed, delta, HIT_STUN_DURATION) {
                    return Ok(Transition::To(Self::Trace));
                }
            }
            Self::Die => {}
        }

        Ok(Transition::Stay)
    }

    fn exit(&mut self, ctx: &mut AgentContext<'_>) {
        match self {
            Self::Patrol { .. } => {
                ctx.stop_moving();
                ctx.animate(|a| {
                    a.set_bool(a.keys.walking, false);
                    a.set_float(a.keys.move_speed, 0.0);
                });
            }
            Self::Trace => {
                ctx.animate(|a| {
                    a.set_bool(a.keys.running, false);
                    a.set_float(a.keys.move_speed, 0.0);
                });
            }
            Self::Hit { .. } => ctx.restore_speed(),
            Self::Idle { .. } | Self::Attack { .. } | Self::Die => {}
        }
    }

    fn initial() -> Self {
        Self::idle()
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
