//! Injected clock abstraction.
//!
//! Each flow attempt reads the clock exactly once and threads that single
//! value through validation, mutation, and history recording, so a flow's
//! outcome is a deterministic function of (resource state, command, now).

use chrono::{DateTime, Utc};

/// Clock trait; implemented by `SystemClock` and the test `FakeClock`.
pub trait Clock: Send + Sync {
    /// Current UTC instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
