//! Activation state register shared by the orchestrator and its observers.
//!
//! The allowed set is closed, so typed transitions can never be invalid. Named
//! transitions (coming from hosts or scripts) are parsed first and rejected
//! with a warning when the name is not part of the set.

use crate::error::ExpansionError;
use std::fmt;
use std::str::FromStr;

/// Phase of the activation sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum ActivationState {
    #[default]
    Intro,
    Idle,
    Charging,
    Active,
    Control,
}

impl ActivationState {
    pub const ALL: [ActivationState; 5] = [
        ActivationState::Intro,
        ActivationState::Idle,
        ActivationState::Charging,
        ActivationState::Active,
        ActivationState::Control,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ActivationState::Intro => "intro",
            ActivationState::Idle => "idle",
            ActivationState::Charging => "charging",
            ActivationState::Active => "active",
            ActivationState::Control => "control",
        }
    }

    /// States in which a domain is bound.
    #[inline]
    pub fn has_domain(self) -> bool {
        matches!(
            self,
            ActivationState::Charging | ActivationState::Active | ActivationState::Control
        )
    }
}

impl fmt::Display for ActivationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ActivationState {
    type Err = ExpansionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActivationState::ALL
            .into_iter()
            .find(|state| state.name() == s)
            .ok_or_else(|| ExpansionError::InvalidState(s.to_owned()))
    }
}

/// Callback receiving `(new_state, prev_state)`.
pub type StateListener = Box<dyn FnMut(ActivationState, ActivationState)>;

/// A completed transition, returned to the caller that requested it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition {
    pub prev: ActivationState,
    pub next: ActivationState,
}

pub struct StateMachine {
    current: ActivationState,
    listeners: Vec<StateListener>,
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl StateMachine {
    pub fn new() -> Self {
        Self {
            current: ActivationState::Intro,
            listeners: Vec::new(),
        }
    }

    #[inline]
    pub fn state(&self) -> ActivationState {
        self.current
    }

    /// Register a listener. Registration is append-only; listeners run in the
    /// order they were added.
    pub fn on_state_change<F>(&mut self, listener: F)
    where
        F: FnMut(ActivationState, ActivationState) + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Move to `next`. Setting the current state again is a no-op and notifies
    /// nobody. Listeners have all run by the time this returns.
    pub fn set_state(&mut self, next: ActivationState) -> Option<Transition> {
        if next == self.current {
            return None;
        }
        let prev = self.current;
        self.current = next;
        log::info!("[state] {} -> {}", prev, next);
        for listener in &mut self.listeners {
            listener(next, prev);
        }
        Some(Transition { prev, next })
    }

    /// Named variant of [`StateMachine::set_state`]. Unknown names are logged
    /// and leave the state untouched.
    pub fn set_state_named(&mut self, name: &str) -> Option<Transition> {
        match name.parse::<ActivationState>() {
            Ok(next) => self.set_state(next),
            Err(e) => {
                log::warn!("[state] {}", e);
                None
            }
        }
    }
}
