//! AnimationConfig — имена параметров аниматора хоста
//!
//! Строки живут только в конфиге; в runtime используются `AnimHash` ключи
//! (см. `crate::animation::AnimKeys::resolve`).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    // Locomotion
    pub move_speed_float: String,
    pub walking_bool: String,
    pub running_bool: String,

    // Flyer
    pub flying_bool: String,
    pub landing_bool: String,
    /// Угол крена (banking) при поворотах в полёте
    pub flying_direction_float: String,

    // Combat
    pub attack_trigger: String,
    pub hit_trigger: String,
    pub die_trigger: String,

    // Ambush
    pub idle_trigger: String,
    pub aim_trigger: String,
    pub snap_trigger: String,
    pub pull_trigger: String,
    pub bite_trigger: String,
    pub stuck_trigger: String,
    pub recover_trigger: String,
    pub camouflage_float: String,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            move_speed_float: "MoveSpeed".into(),
            walking_bool: "IsWalking".into(),
            running_bool: "IsRunning".into(),
            flying_bool: "IsFlying".into(),
            landing_bool: "IsLanding".into(),
            flying_direction_float: "FlyingDirection".into(),
            attack_trigger: "Attack".into(),
            hit_trigger: "Hit".into(),
            die_trigger: "Die".into(),
            idle_trigger: "Idle".into(),
            aim_trigger: "Aim".into(),
            snap_trigger: "Snap".into(),
            pull_trigger: "Pull".into(),
            bite_trigger: "Bite".into(),
            stuck_trigger: "Stuck".into(),
            recover_trigger: "Recover".into(),
            camouflage_float: "_CamouflageAmount".into(),
        }
    }
}
