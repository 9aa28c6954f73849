use std::time::{Duration, Instant};

use crate::{Action, KeyToken, Keymap, DEFAULT_SEQUENCE_TIMEOUT};

/// Outcome of feeding one key token to the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The token (or the sequence it completed) is bound to an action.
    Action(Action),
    /// The token started a sequence and must not propagate any further.
    Pending,
    /// Nothing is bound to the token in the active mode.
    Unbound,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum RouterState {
    Idle,
    PendingPrefix { key: KeyToken, since: Instant },
}

/// Resolves key presses to actions for the active mode, including timed
/// two-key sequences such as `g g`.
///
/// Time is supplied by the caller so the same input always resolves the same
/// way; callers pass `Instant::now()`, which is monotonic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEventRouter {
    keymap: Keymap,
    timeout: Duration,
    state: RouterState,
}

impl KeyEventRouter {
    pub fn new(keymap: Keymap, timeout: Duration) -> Self {
        Self {
            keymap,
            timeout,
            state: RouterState::Idle,
        }
    }

    pub fn keymap(&self) -> &Keymap {
        &self.keymap
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Swaps the active mode. Any pending prefix is dropped.
    pub fn set_keymap(&mut self, keymap: Keymap) {
        self.keymap = keymap;
        self.state = RouterState::Idle;
    }

    pub fn pending_prefix(&self) -> Option<&KeyToken> {
        match &self.state {
            RouterState::Idle => None,
            RouterState::PendingPrefix { key, .. } => Some(key),
        }
    }

    /// Drops a pending prefix without emitting anything.
    pub fn reset(&mut self) {
        self.state = RouterState::Idle;
    }

    /// Clears a prefix whose window has passed by `now`. Returns whether
    /// one was cleared.
    pub fn expire(&mut self, now: Instant) -> bool {
        match &self.state {
            RouterState::PendingPrefix { since, .. }
                if now.saturating_duration_since(*since) >= self.timeout =>
            {
                self.state = RouterState::Idle;
                true
            }
            _ => false,
        }
    }

    pub fn handle(&mut self, token: &KeyToken, now: Instant) -> Resolution {
        let previous = std::mem::replace(&mut self.state, RouterState::Idle);
        if let RouterState::PendingPrefix { key, since } = previous {
            if now.saturating_duration_since(since) < self.timeout {
                if let Some(action) = self.keymap.sequence(&key, token) {
                    return Resolution::Action(action);
                }
            }
            // Expired or mismatched: the prefix is forgotten and the token is
            // evaluated as a fresh press.
        }
        self.resolve_idle(token, now)
    }

    fn resolve_idle(&mut self, token: &KeyToken, now: Instant) -> Resolution {
        if self.keymap.is_prefix(token) {
            self.state = RouterState::PendingPrefix {
                key: token.clone(),
                since: now,
            };
            return Resolution::Pending;
        }
        match self.keymap.single(token) {
            Some(action) => Resolution::Action(action),
            None => Resolution::Unbound,
        }
    }
}

impl Default for KeyEventRouter {
    fn default() -> Self {
        Self::new(Keymap::builtin(), DEFAULT_SEQUENCE_TIMEOUT)
    }
}
