//! Pledge configuration.
//!
//! This module provides `PledgeBuilder`, the configurable entry point for
//! creating pledges.

use pledge_cell::{Pledge, Resolver};
use pledge_core::Payload;
use std::sync::Arc;

/// Builder for pledge configuration.
///
/// # Example
///
/// ```ignore
/// // Labelled pledge settled by a producer
/// let p: Pledge<u32, String> = PledgeBuilder::new()
///     .label("fetch-user")
///     .build(|resolver| {
///         resolver.fulfill(7);
///         Ok(())
///     });
///
/// // Pending pledge settled later by an external scheduler
/// let (timer, resolver) = PledgeBuilder::new().label("timer").pending::<(), String>();
/// ```
#[derive(Debug, Clone, Default)]
pub struct PledgeBuilder {
    label: Option<Arc<str>>,
}

impl PledgeBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a label to the pledge.
    ///
    /// The label appears in the pledge's tracing events and is inherited by
    /// every pledge derived from it with `then`, `catch` and friends.
    pub fn label(mut self, label: impl Into<Arc<str>>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Remove any label set so far.
    pub fn unlabelled(mut self) -> Self {
        self.label = None;
        self
    }

    /// Create a pledge and run `producer` with its triggers.
    pub fn build<T, E, P>(self, producer: P) -> Pledge<T, E>
    where
        T: Payload,
        E: Payload,
        P: FnOnce(Resolver<T, E>) -> Result<(), E>,
    {
        Pledge::new_labelled(self.label, producer)
    }

    /// Create a pending pledge and return its triggers.
    pub fn pending<T: Payload, E: Payload>(self) -> (Pledge<T, E>, Resolver<T, E>) {
        Pledge::pending_labelled(self.label)
    }

    /// Create an already-fulfilled pledge.
    pub fn fulfilled<T: Payload, E: Payload>(self, value: T) -> Pledge<T, E> {
        let (pledge, resolver) = self.pending();
        resolver.fulfill(value);
        pledge
    }

    /// Create an already-rejected pledge.
    pub fn rejected<T: Payload, E: Payload>(self, reason: E) -> Pledge<T, E> {
        let (pledge, resolver) = self.pending();
        resolver.reject(reason);
        pledge
    }
}
