//! Reentrancy guard
//!
//! Each collection carries an [`IterationGuard`] counting the enumerations
//! currently running over it. Enumerations hold an [`IterationScope`] for
//! their whole duration; structural mutators call [`IterationGuard::check`]
//! first and fail while any scope is open.

use crate::error::{CollectionError, Result};
use std::cell::Cell;
use tracing::{debug, trace};

#[derive(Debug, Default)]
pub struct IterationGuard {
    level: Cell<usize>,
}

impl IterationGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of enumerations currently open on this instance
    pub fn level(&self) -> usize {
        self.level.get()
    }

    pub fn is_active(&self) -> bool {
        self.level.get() > 0
    }

    /// Open an enumeration; the level drops again when the scope is dropped
    pub fn enter(&self, operation: &'static str) -> IterationScope<'_> {
        let level = self.level.get() + 1;
        self.level.set(level);
        trace!(operation, level, "enter iteration");
        IterationScope {
            guard: self,
            operation,
        }
    }

    /// Fail with `IterationInProgress` while any enumeration is open
    pub fn check(&self, operation: &'static str) -> Result<()> {
        if self.is_active() {
            debug!(operation, level = self.level.get(), "mutation rejected during iteration");
            return Err(CollectionError::IterationInProgress { operation });
        }
        Ok(())
    }
}

/// An open enumeration
#[must_use = "the enumeration ends when the scope is dropped"]
#[derive(Debug)]
pub struct IterationScope<'a> {
    guard: &'a IterationGuard,
    operation: &'static str,
}

impl Drop for IterationScope<'_> {
    fn drop(&mut self) {
        let level = self.guard.level.get().saturating_sub(1);
        self.guard.level.set(level);
        trace!(operation = self.operation, level, "exit iteration");
    }
}
