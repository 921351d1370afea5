//! StateMachine — владеет текущим состоянием агента
//!
//! Инварианты:
//! - ровно одно текущее состояние после `initialize`
//! - Exit старого всегда перед Enter нового
//! - переход в тот же вид состояния отклоняется
//! - из terminal состояния (Die) выхода нет

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::context::AgentContext;
use super::state::{BehaviorError, BehaviorState, Transition};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StateMachineError {
    #[error("state machine is not initialized")]
    NotInitialized,

    #[error("state machine is already initialized")]
    AlreadyInitialized,

    #[error("transition to the current state kind `{state}` rejected")]
    SelfTransition { state: &'static str },

    #[error("terminal state `{from}` rejects transition to `{to}`")]
    Terminal {
        from: &'static str,
        to: &'static str,
    },
}

/// Любая ошибка тика агента
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AgentError {
    #[error(transparent)]
    Behavior(#[from] BehaviorError),

    #[error(transparent)]
    Machine(#[from] StateMachineError),
}

/// Per-agent машина состояний (brain)
#[derive(Component, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateMachine<S: BehaviorState> {
    current: Option<S>,
    enter_count: u64,
    exit_count: u64,
}

impl<S: BehaviorState> Default for StateMachine<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: BehaviorState> StateMachine<S> {
    pub fn new() -> Self {
        Self {
            current: None,
            enter_count: 0,
            exit_count: 0,
        }
    }

    pub fn current(&self) -> Option<&S> {
        self.current.as_ref()
    }

    pub fn is_initialized(&self) -> bool {
        self.current.is_some()
    }

    pub fn is_terminal(&self) -> bool {
        self.current.as_ref().is_some_and(|state| state.is_terminal())
    }

    pub fn enter_count(&self) -> u64 {
        self.enter_count
    }

    pub fn exit_count(&self) -> u64 {
        self.exit_count
    }

    /// Enter стартового состояния (один раз)
    pub fn initialize(&mut self, start: S, ctx: &mut AgentContext<'_>) -> Result<(), StateMachineError> {
        if self.current.is_some() {
            return Err(StateMachineError::AlreadyInitialized);
        }

        let mut start = start;
        start.enter(ctx);
        self.enter_count += 1;

        crate::logger::log(&format!("🧠 {:?}: start in {}", ctx.entity, start.name()));
        self.current = Some(start);
        Ok(())
    }

    /// Exit текущего → Enter нового
    pub fn change_state(&mut self, next: S, ctx: &mut AgentContext<'_>) -> Result<(), StateMachineError> {
        let current = self.current.as_mut().ok_or(StateMachineError::NotInitialized)?;

        if current.is_terminal() {
            return Err(StateMachineError::Terminal {
                from: current.name(),
                to: next.name(),
            });
        }

        if current.same_kind(&next) {
            return Err(StateMachineError::SelfTransition { state: next.name() });
        }

        let from = current.name();
        current.exit(ctx);
        self.exit_count += 1;

        let mut next = next;
        next.enter(ctx);
        self.enter_count += 1;

        crate::logger::log(&format!("🔄 {:?}: {} → {}", ctx.entity, from, next.name()));
        self.current = Some(next);
        Ok(())
    }

    /// Update текущего + применение перехода. true если состояние сменилось.
    pub fn step(&mut self, ctx: &mut AgentContext<'_>) -> Result<bool, AgentError> {
        let current = self.current.as_mut().ok_or(StateMachineError::NotInitialized)?;

        match current.update(ctx)? {
            Transition::Stay => Ok(false),
            Transition::To(next) => {
                self.change_state(next, ctx)?;
                Ok(true)
            }
        }
    }

    /// Recovery после ошибки: Exit текущего, Enter fallback (даже того же вида)
    ///
    /// Terminal состояние не трогаем.
    pub fn recover(&mut self, ctx: &mut AgentContext<'_>) {
        if self.is_terminal() {
            return;
        }

        if let Some(current) = self.current.as_mut() {
            current.exit(ctx);
            self.exit_count += 1;
        }

        let mut fallback = S::fallback();
        fallback.enter(ctx);
        self.enter_count += 1;

        crate::logger::log_warning(&format!("🩹 {:?}: recovered into {}", ctx.entity, fallback.name()));
        self.current = Some(fallback);
    }
}
