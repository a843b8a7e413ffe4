//! Application workflows built on the [`Backend`](crate::client::Backend) facade.
//!
//! Each flow is a plain state machine: the caller asks it to `begin` a step,
//! runs the returned effect against a backend, and hands the outcome back to
//! `complete`. That keeps the flows synchronous and testable while the
//! controller runs effects concurrently with input handling.

pub mod ats;
pub mod progress;
pub mod results;
pub mod skill_gap;
pub mod wizard;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared flag saying whether the view that started an async effect still wants its result.
#[derive(Debug, Clone)]
pub struct Liveness(Arc<AtomicBool>);

impl Liveness {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    pub fn is_live(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub fn revoke(&self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Default for Liveness {
    fn default() -> Self {
        Self::new()
    }
}

/// Hands out one live token per view visit; renewing revokes the previous one.
#[derive(Debug, Default)]
pub struct ViewScope {
    current: Liveness,
}

impl ViewScope {
    pub fn renew(&mut self) -> Liveness {
        self.current.revoke();
        self.current = Liveness::new();
        self.current.clone()
    }

    pub fn token(&self) -> Liveness {
        self.current.clone()
    }

    pub fn revoke(&self) {
        self.current.revoke();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renewing_scope_revokes_earlier_tokens() {
        let mut scope = ViewScope::default();
        let first = scope.renew();
        assert!(first.is_live());

        let second = scope.renew();
        assert!(!first.is_live());
        assert!(second.is_live());

        scope.revoke();
        assert!(!second.is_live());
    }
}
