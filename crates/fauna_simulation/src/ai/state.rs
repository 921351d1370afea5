//! BehaviorState — контракт состояния (Enter / Update / Exit)
//!
//! Каждый архетип — закрытый enum состояний (`GroundState`, `FlyerState`, `AmbushState`).
//! Таймеры живут в данных варианта, общие куски — free helpers в `helpers.rs`.

use std::fmt;
use std::mem::discriminant;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use super::context::AgentContext;

/// Результат update
#[derive(Debug, Clone, PartialEq)]
pub enum Transition<S> {
    /// Остаёмся в текущем состоянии
    Stay,
    /// Переход (Exit текущего → Enter нового)
    To(S),
}

/// Ошибки состояний (agent-local, recovery = fallback в idle)
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BehaviorError {
    #[error("state `{state}` requires a target but none is tracked")]
    MissingTarget { state: &'static str },

    #[error("state `{state}` requires the `{section}` config section")]
    MissingConfig {
        state: &'static str,
        section: &'static str,
    },
}

/// Контракт состояния архетипа
pub trait BehaviorState:
    Clone + fmt::Debug + PartialEq + Send + Sync + Serialize + DeserializeOwned + 'static
{
    fn name(&self) -> &'static str;

    fn enter(&mut self, ctx: &mut AgentContext<'_>);

    fn update(&mut self, ctx: &mut AgentContext<'_>) -> Result<Transition<Self>, BehaviorError>;

    fn exit(&mut self, ctx: &mut AgentContext<'_>);

    /// Стартовое состояние после спавна
    fn initial() -> Self;

    /// Куда откатываемся после ошибки
    fn fallback() -> Self {
        Self::initial()
    }

    /// Реакция на не-летальный урон
    fn hit() -> Self;

    /// Смерть (terminal)
    fn die() -> Self;

    fn is_terminal(&self) -> bool;

    fn is_hit(&self) -> bool;

    /// Тот же вариант enum (данные не сравниваются)
    fn same_kind(&self, other: &Self) -> bool {
        discriminant(self) == discriminant(other)
    }
}
