//! Общие куски поведения (free functions вместо базовых классов)

use bevy::prelude::*;

use super::context::AgentContext;

/// Таймер состояния: накапливает delta, true когда достиг duration
pub fn tick_timer(elapsed: &mut f32, delta: f32, duration: f32) -> bool {
    *elapsed += delta;
    *elapsed >= duration
}

/// Точка к цели с ограничением шага (не проскакивает)
pub fn move_towards(from: Vec3, to: Vec3, max_step: f32) -> Vec3 {
    let offset = to - from;
    let distance = offset.length();
    if distance <= max_step || distance <= f32::EPSILON {
        to
    } else {
        from + offset / distance * max_step
    }
}

/// Slerp поворот к точке (с pitch), без перемещения
pub fn steer_towards(ctx: &mut AgentContext<'_>, point: Vec3, turn_rate: f32) -> bool {
    let direction = (point - ctx.position()).normalize_or_zero();
    if direction == Vec3::ZERO {
        return false;
    }

    let target_rotation = Transform::IDENTITY.looking_to(direction, Vec3::Y).rotation;
    let factor = (turn_rate * ctx.delta).clamp(0.0, 1.0);
    ctx.transform.rotation = ctx.transform.rotation.slerp(target_rotation, factor);
    true
}

/// Полёт: поворот к точке + шаг вперёд по forward
pub fn fly_towards(ctx: &mut AgentContext<'_>, point: Vec3, speed: f32, turn_rate: f32) {
    let position = ctx.position();
    if !steer_towards(ctx, point, turn_rate) {
        return;
    }

    let forward = ctx.forward();
    let step = (speed * ctx.delta).min(position.distance(point));
    ctx.transform.translation += forward * step;
}

/// Выровнять pitch/roll, сохранив yaw (hover)
pub fn level_out(ctx: &mut AgentContext<'_>, turn_rate: f32) {
    let forward = ctx.forward();
    let flat = Vec3::new(forward.x, 0.0, forward.z).normalize_or(Vec3::NEG_Z);
    let level = Transform::IDENTITY.looking_to(flat, Vec3::Y).rotation;
    let factor = (turn_rate * ctx.delta).clamp(0.0, 1.0);
    ctx.transform.rotation = ctx.transform.rotation.slerp(level, factor);
}

/// Угол крена для аниматора: знак поворота к цели в горизонтальной плоскости
pub fn banking_angle(forward: Vec3, to_target: Vec3) -> f32 {
    let flat_forward = Vec3::new(forward.x, 0.0, forward.z).normalize_or_zero();
    let flat_target = Vec3::new(to_target.x, 0.0, to_target.z).normalize_or_zero();
    if flat_forward == Vec3::ZERO || flat_target == Vec3::ZERO {
        return 0.0;
    }

    let cross = flat_forward.cross(flat_target).y;
    let angle = flat_forward.dot(flat_target).clamp(-1.0, 1.0).acos();
    angle.copysign(cross)
}
