//! Blocking waits
//!
//! For hosts where another thread settles the pledge. Waiters park on the
//! cell's own condition variable, which settlement signals; a wait never
//! queues a continuation and never changes how or when the pledge settles.
//!
//! Waiting on the thread that is expected to settle the pledge deadlocks
//! (`wait`) or times out (`wait_timeout`).

use crate::cell::Pledge;
use pledge_core::{Error, Outcome, Payload, Result};
use std::time::{Duration, Instant};

impl<T: Payload, E: Payload> Pledge<T, E> {
    /// Block until the pledge settles
    pub fn wait(&self) -> Outcome<T, E> {
        loop {
            if let Some(outcome) = self.block_until(None) {
                return outcome;
            }
        }
    }

    /// Block until the pledge settles or `timeout` elapses
    ///
    /// Returns [`Error::TimedOut`] if the deadline passes first. The pledge
    /// itself is unaffected and may still settle later.
    pub fn wait_timeout(&self, timeout: Duration) -> Result<Outcome<T, E>> {
        let deadline = Instant::now() + timeout;
        self.block_until(Some(deadline))
            .ok_or(Error::TimedOut { after: timeout })
    }
}
