//! Flyer archetype states (ворона)
//!
//! Летает без NavAgent: движение прямое (`fly_towards`), высота зажата в
//! [min_altitude, max_altitude].
//!
//! Цикл атаки: Stalk (кружит над целью) → Dive (пикирует) → Ascend (набор высоты) → Stalk/Patrol.
//! После удара при низком health — Retreat (улетает и despawn).

use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::context::{AgentCommand, AgentContext};
use super::helpers::{banking_angle, fly_towards, level_out, move_towards, steer_towards, tick_timer};
use super::state::{BehaviorError, BehaviorState, Transition};
use crate::config::{AgentConfig, FlightConfig};
use crate::navigation::planar_distance;

/// Высота круга над целью
pub const STALK_HEIGHT: f32 = 25.0;
/// Угловая скорость круга (рад/с)
pub const STALK_ANGLE_SPEED: f32 = 2.0;
pub const STALK_MIN_DURATION: f32 = 5.0;
pub const STALK_MAX_DURATION: f32 = 10.0;

/// Точка пике над целью (не втыкаемся в землю)
pub const DIVE_TARGET_OFFSET: f32 = 0.5;
/// Луч вперёд при пике
pub const DIVE_PROBE_DISTANCE: f32 = 3.0;
/// Пике завершено ближе этого
pub const DIVE_REACH: f32 = 1.0;
/// Аварийный выход из пике по абсолютной высоте
pub const DIVE_MIN_ALTITUDE: f32 = 0.5;
/// Множитель поворота при пике
pub const DIVE_TURN_MULTIPLIER: f32 = 2.0;

/// Подъём: вертикаль к горизонтали 2:1
pub const ASCEND_CLIMB_RATIO: f32 = 2.0;
pub const ASCEND_TURN_RATE: f32 = 5.0;
/// Ascend завершается на max_altitude - margin
pub const ASCEND_ALTITUDE_MARGIN: f32 = 1.0;

/// Retreat: подъём при отлёте
pub const RETREAT_CLIMB: f32 = 0.2;
pub const RETREAT_TURN_RATE: f32 = 2.0;
/// Planar distance от цели, после которой агент удаляется
pub const RETREAT_DESPAWN_DISTANCE: f32 = 50.0;

/// Выравнивание в hover
pub const LEVEL_OUT_RATE: f32 = 2.0;
pub const HIT_STUN_DURATION: f32 = 0.5;

/// Patrol над max_altitude — цель опускается ниже на столько
const PATROL_CEILING_DROP: f32 = 2.0;
const PATROL_ARRIVAL_GRACE: f32 = 0.1;
const SPHERE_SAMPLE_ATTEMPTS: usize = 16;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FlyerState {
    Idle { duration: f32, elapsed: f32 },
    Patrol { destination: Vec3, elapsed: f32 },
    Stalk { duration: f32, elapsed: f32, angle: f32 },
    Dive { target_point: Vec3, damage_applied: bool },
    Ascend,
    Retreat { from: Vec3, despawn_requested: bool },
    Hit { elapsed: f32 },
    Die,
}

impl FlyerState {
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

    pub fn stalk() -> Self {
        Self::Stalk {
            duration: 0.0,
            elapsed: 0.0,
            angle: 0.0,
        }
    }

    pub fn dive() -> Self {
        Self::Dive {
            target_point: Vec3::ZERO,
            damage_applied: false,
        }
    }

    pub fn retreat() -> Self {
        Self::Retreat {
            from: Vec3::ZERO,
            despawn_requested: false,
        }
    }
}

fn flight<'a>(config: &'a AgentConfig, state: &'static str) -> Result<&'a FlightConfig, BehaviorError> {
    config.flight.as_ref().ok_or(BehaviorError::MissingConfig {
        state,
        section: "agent.flight",
    })
}

fn clamp_altitude(point: Vec3, flight: &FlightConfig) -> Vec3 {
    Vec3::new(
        point.x,
        point.y.clamp(flight.min_altitude, flight.max_altitude),
        point.z,
    )
}

/// Точка в шаре радиуса max_altitude вокруг агента, высота зажата
fn random_flight_point(ctx: &mut AgentContext<'_>, flight: &FlightConfig) -> Vec3 {
    let mut offset = Vec3::ZERO;
    for _ in 0..SPHERE_SAMPLE_ATTEMPTS {
        let sample = Vec3::new(
            ctx.rng.gen_range(-1.0..=1.0),
            ctx.rng.gen_range(-1.0..=1.0),
            ctx.rng.gen_range(-1.0..=1.0),
        );
        if sample.length_squared() <= 1.0 {
            offset = sample;
            break;
        }
    }

    clamp_altitude(ctx.position() + offset * flight.max_altitude, flight)
}

fn heard_only(ctx: &AgentContext<'_>) -> bool {
    !ctx.config.friendly && ctx.sensor.heard && !ctx.sensor.in_sight && ctx.sensor.has_target()
}

fn set_flying(ctx: &mut AgentContext<'_>, flying: bool, landing: bool) {
    ctx.animate(|a| {
        a.set_bool(a.keys.flying, flying);
        a.set_bool(a.keys.landing, landing);
    });
}

impl BehaviorState for FlyerState {
    fn name(&self) -> &'static str {
        match self {
            Self::Idle { .. } => "FlyIdle",
            Self::Patrol { .. } => "FlyPatrol",
            Self::Stalk { .. } => "Stalk",
            Self::Dive { .. } => "Dive",
            Self::Ascend => "Ascend",
            Self::Retreat { .. } => "Retreat",
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
                set_flying(ctx, true, false);
            }
            Self::Patrol { destination, elapsed } => {
                *elapsed = 0.0;
                *destination = ctx.position();

                let config = ctx.config;
                if let Some(flight) = config.flight.as_ref() {
                    *destination = if heard_only(ctx) {
                        clamp_altitude(ctx.sensor.last_known_position, flight)
                    } else {
                        random_flight_point(ctx, flight)
                    };
                }
                set_flying(ctx, true, false);
            }
            Self::Stalk { duration, elapsed, angle } => {
                *elapsed = 0.0;
                // Длительность бросается один раз на вход
                *duration = ctx.random_range(STALK_MIN_DURATION, STALK_MAX_DURATION);

                // Стартовый угол — текущее положение относительно цели (без рывка)
                let center = ctx.pursuit_point().unwrap_or_else(|| ctx.position());
                let to_me = ctx.position() - center;
                *angle = to_me.z.atan2(to_me.x);
                set_flying(ctx, true, false);
            }
            Self::Dive { target_point, damage_applied } => {
                *damage_applied = false;
                *target_point = match ctx.pursuit_point() {
                    Some(point) => point + Vec3::Y * DIVE_TARGET_OFFSET,
                    None => ctx.position() + (ctx.forward() + Vec3::NEG_Y) * 10.0,
                };
                set_flying(ctx, false, true);
            }
            Self::Ascend => set_flying(ctx, true, false),
            Self::Retreat { from, despawn_requested } => {
                *despawn_requested = false;
                *from = ctx.target.map_or(ctx.position(), |target| target.position);
                set_flying(ctx, true, false);
            }
            Self::Hit { elapsed } => {
                *elapsed = 0.0;
                ctx.animate(|a| a.trigger(a.keys.hit));
            }
            Self::Die => {
                ctx.disable_navigation();
                ctx.push(AgentCommand::DisableCollision);
                ctx.push(AgentCommand::RollLoot);
                ctx.animate(|a| {
                    a.set_bool(a.keys.flying, false);
                    a.trigger(a.keys.die);
                });
            }
        }
    }

    fn update(&mut self, ctx: &mut AgentContext<'_>) -> Result<Transition<Self>, BehaviorError> {
        let delta = ctx.delta;
        let config = ctx.config;

        match self {
            Self::Idle { duration, elapsed } => {
                level_out(ctx, LEVEL_OUT_RATE);

                if ctx.sight_alert() {
                    return Ok(Transition::To(Self::stalk()));
                }
                if tick_timer(elapsed, delta, *duration) {
                    return Ok(Transition::To(Self::patrol()));
                }
            }
            Self::Patrol { destination, elapsed } => {
                let flight = flight(config, "FlyPatrol")?;

                if ctx.sight_alert() {
                    return Ok(Transition::To(Self::stalk()));
                }

                if heard_only(ctx) {
                    *destination = clamp_altitude(ctx.sensor.last_known_position, flight);
                }

                if ctx.position().y > flight.max_altitude {
                    destination.y = flight.max_altitude - PATROL_CEILING_DROP;
                }

                fly_towards(ctx, *destination, config.walk_speed, config.rotate_speed);

                *elapsed += delta;
                if *elapsed > PATROL_ARRIVAL_GRACE
                    && ctx.position().distance(*destination) <= config.stopping_distance
                {
                    return Ok(Transition::To(Self::idle()));
                }
            }
            Self::Stalk { duration, elapsed, angle } => {
                let Some(center) = ctx.pursuit_point() else {
                    return Ok(Transition::To(Self::patrol()));
                };

                if tick_timer(elapsed, delta, *duration) {
                    return Ok(Transition::To(Self::dive()));
                }

                *angle += STALK_ANGLE_SPEED * delta;
                let radius = config.fov_range / 2.0;
                let orbit = center + Vec3::new(angle.cos() * radius, STALK_HEIGHT, angle.sin() * radius);

                let bank = banking_angle(ctx.forward(), orbit - ctx.position());
                fly_towards(ctx, orbit, config.walk_speed, config.rotate_speed);
                ctx.animate(|a| a.set_float(a.keys.flying_direction, bank));
            }
            Self::Dive { target_point, damage_applied } => {
                let position = ctx.position();
                let remaining = position.distance(*target_point);

                // Земля впереди ближе цели — выходим из пике
                let ahead = ctx
                    .probe
                    .cast_ray(position, ctx.forward(), DIVE_PROBE_DISTANCE, config.ground_layers);
                if let Some(hit) = ahead {
                    if hit.distance + DIVE_REACH < remaining {
                        crate::logger::log(&format!("🐦 {:?} dive aborted: ground ahead", ctx.entity));
                        return Ok(Transition::To(Self::Ascend));
                    }
                }

                ctx.transform.translation = move_towards(position, *target_point, config.run_speed * delta);
                steer_towards(ctx, *target_point, config.rotate_speed * DIVE_TURN_MULTIPLIER);

                if !*damage_applied {
                    if let Some(target) = ctx.target {
                        if ctx.position().distance(target.position) <= config.attack_range {
                            *damage_applied = true;
                            ctx.deal_damage(target, config.attack_damage);
                            ctx.animate(|a| a.trigger(a.keys.attack));
                        }
                    }
                }

                if ctx.position().distance(*target_point) < DIVE_REACH {
                    return Ok(Transition::To(Self::Ascend));
                }

                if ctx.position().y < DIVE_MIN_ALTITUDE {
                    return Ok(Transition::To(Self::Ascend));
                }
            }
            Self::Ascend => {
                let flight = flight(config, "Ascend")?;

                // Двигаемся вверх + по горизонтальному курсу, даже если клюв ещё смотрит вниз
                let forward = ctx.forward();
                let horizontal = Vec3::new(forward.x, 0.0, forward.z).normalize_or_zero();
                let climb = (horizontal + Vec3::Y * ASCEND_CLIMB_RATIO).normalize_or(Vec3::Y);

                ctx.transform.translation += climb * config.run_speed * delta;
                let heading = ctx.position() + climb;
                steer_towards(ctx, heading, ASCEND_TURN_RATE);

                if ctx.position().y >= flight.max_altitude - ASCEND_ALTITUDE_MARGIN {
                    let sensed = ctx.sensor.in_sight || ctx.sensor.heard;
                    return Ok(Transition::To(if sensed { Self::stalk() } else { Self::patrol() }));
                }
            }
            Self::Retreat { from, despawn_requested } => {
                if let Some(target) = ctx.target {
                    *from = target.position;
                }

                let position = ctx.position();
                let mut away = (position - *from).normalize_or(ctx.forward());
                away.y = RETREAT_CLIMB;
                fly_towards(ctx, position + away, config.walk_speed, RETREAT_TURN_RATE);

                if !*despawn_requested && planar_distance(ctx.position(), *from) > RETREAT_DESPAWN_DISTANCE {
                    *despawn_requested = true;
                    crate::logger::log(&format!("🐦 {:?} retreated out of range", ctx.entity));
                    ctx.push(AgentCommand::Despawn);
                }
            }
            Self::Hit { elapsed } => {
                level_out(ctx, LEVEL_OUT_RATE);

                if tick_timer(elapsed, delta, HIT_STUN_DURATION) {
                    let flight = flight(config, "Hit")?;
                    if ctx.health_fraction < flight.retreat_health_fraction {
                        return Ok(Transition::To(Self::retreat()));
                    }
                    return Ok(Transition::To(if ctx.sensor.has_target() {
                        Self::stalk()
                    } else {
                        Self::patrol()
                    }));
                }
            }
            Self::Die => {}
        }

        Ok(Transition::Stay)
    }

    fn exit(&mut self, ctx: &mut AgentContext<'_>) {
        match self {
            Self::Stalk { .. } => ctx.animate(|a| a.set_float(a.keys.flying_direction, 0.0)),
            Self::Dive { .. } => set_flying(ctx, true, false),
            _ => {}
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
