//! Cooperative per-validator time budget.

use std::time::{Duration, Instant};
use thiserror::Error;

/// Returned by long-running primitives once their budget is spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("time budget exceeded")]
pub struct DeadlineExceeded;

/// A point in time after which work should stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Deadline {
    expires_at: Option<Instant>,
}

impl Deadline {
    /// A deadline that never expires.
    pub fn none() -> Self {
        Deadline { expires_at: None }
    }

    pub fn after(budget: Duration) -> Self {
        Deadline {
            expires_at: Instant::now().checked_add(budget),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at
            .map(|at| Instant::now() >= at)
            .unwrap_or(false)
    }

    pub fn check(&self) -> Result<(), DeadlineExceeded> {
        if self.is_expired() {
            Err(DeadlineExceeded)
        } else {
            Ok(())
        }
    }
}
