//! AI decision-making module
//!
//! Behavior state machine агентов:
//! - `state` — контракт BehaviorState (Enter/Update/Exit) + типизированный Transition
//! - `machine` — StateMachine component (ровно одно текущее состояние)
//! - `context` — AgentContext (read-only факты + свои компоненты + исходящие команды)
//! - `ground` / `flyer` / `ambush` — закрытые наборы состояний по архетипам
//!
//! Тикается контроллером (`crate::controller`) в `AgentSet::Decision`.

pub mod ambush;
pub mod context;
pub mod flyer;
pub mod ground;
pub mod helpers;
pub mod machine;
pub mod state;

#[cfg(test)]
pub(crate) mod test_support;

#[cfg(test)]
mod ambush_tests;
#[cfg(test)]
mod ground_tests;

// Re-export основных типов
pub use ambush::{AmbushState, Camouflage};
pub use context::{AgentCommand, AgentContext, Pace, TargetInfo};
pub use flyer::FlyerState;
pub use ground::GroundState;
pub use machine::{AgentError, StateMachine, StateMachineError};
pub use state::{BehaviorError, BehaviorState, Transition};
