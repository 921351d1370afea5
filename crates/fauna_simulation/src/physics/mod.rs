//! Physics queries module
//!
//! Агенты не симулируют физику сами — только спрашивают мир:
//! - Line of sight (есть ли препятствие между глазами и целью)
//! - Ground probe (высота земли под точкой, луч вперёд при пикировании)
//!
//! Архитектура: `probe.rs` (traits + rapier/headless backends), `layers.rs` (битовые маски)

pub mod layers;
pub mod probe;

#[cfg(test)]
mod probe_tests;

pub use layers::LayerMask;
pub use probe::{
    GroundProbe, HeadlessGeometry, LineOfSight, ObstacleBox, OpenField, RapierProbe, RayHit,
    WorldProbe, WorldRays,
};
