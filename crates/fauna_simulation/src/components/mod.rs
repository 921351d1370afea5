//! ECS Components, общие для нескольких доменов
//!
//! Организация:
//! - agent: вид агента, authority, per-agent RNG, исходящие команды
//! - target: Targetable capability (игроки, world objects), PlayerId

pub mod agent;
pub mod target;

pub use agent::*;
pub use target::*;
