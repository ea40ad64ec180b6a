//! Continuation combinators
//!
//! Each combinator returns a new downstream pledge whose producer registers
//! one continuation pair on the source. Handlers return `Result`: `Ok` feeds
//! the downstream fulfill-trigger (so a returned deferred value is
//! flattened), `Err` is a handler fault and rejects the downstream pledge.
//!
//! | Method | Fulfilled branch | Rejected branch |
//! |--------|------------------|-----------------|
//! | [`Pledge::then`] | handler, plain value | pass through |
//! | [`Pledge::and_then`] | handler, [`Resolution`] | pass through |
//! | [`Pledge::then_else`] | handler, [`Resolution`] | handler, [`Resolution`] |
//! | [`Pledge::catch`] | pass through | handler, plain value |
//! | [`Pledge::or_else`] | pass through | handler, [`Resolution`] |
//!
//! A rejected-branch handler that returns `Ok` fulfills the downstream pledge:
//! a handled rejection becomes a fulfillment, even if the handler returns
//! something that looks like an error value.

use crate::cell::{Pledge, Resolver};
use pledge_core::{Payload, Resolution};

/// What a continuation handler produces for the downstream pledge
pub type Step<U, E> = Result<Resolution<U, E>, E>;

impl<T: Payload, E: Payload> Pledge<T, E> {
    /// Transform the success value; rejections pass through unchanged
    pub fn then<U, F>(&self, on_fulfilled: F) -> Pledge<U, E>
    where
        U: Payload,
        F: FnOnce(T) -> Result<U, E> + Send + 'static,
    {
        self.chain(
            move |value, downstream| {
                downstream.settle_with(on_fulfilled(value).map(Resolution::Value))
            },
            forward_rejection::<U, E>,
        )
    }

    /// Continue with a handler that may return another deferred value
    pub fn and_then<U, F>(&self, on_fulfilled: F) -> Pledge<U, E>
    where
        U: Payload,
        F: FnOnce(T) -> Step<U, E> + Send + 'static,
    {
        self.chain(
            move |value, downstream| downstream.settle_with(on_fulfilled(value)),
            forward_rejection::<U, E>,
        )
    }

    /// Register both branches at once
    pub fn then_else<U, F, R>(&self, on_fulfilled: F, on_rejected: R) -> Pledge<U, E>
    where
        U: Payload,
        F: FnOnce(T) -> Step<U, E> + Send + 'static,
        R: FnOnce(E) -> Step<U, E> + Send + 'static,
    {
        self.chain(
            move |value, downstream| downstream.settle_with(on_fulfilled(value)),
            move |reason, downstream| downstream.settle_with(on_rejected(reason)),
        )
    }

    /// Recover from a rejection; success values pass through unchanged
    pub fn catch<R>(&self, on_rejected: R) -> Pledge<T, E>
    where
        R: FnOnce(E) -> Result<T, E> + Send + 'static,
    {
        self.chain(forward_value::<T, E>, move |reason, downstream| {
            downstream.settle_with(on_rejected(reason).map(Resolution::Value))
        })
    }

    /// Recover from a rejection with a handler that may return another
    /// deferred value
    pub fn or_else<R>(&self, on_rejected: R) -> Pledge<T, E>
    where
        R: FnOnce(E) -> Step<T, E> + Send + 'static,
    {
        self.chain(forward_value::<T, E>, move |reason, downstream| {
            downstream.settle_with(on_rejected(reason))
        })
    }

    fn chain<U, F, R>(&self, on_fulfilled: F, on_rejected: R) -> Pledge<U, E>
    where
        U: Payload,
        F: FnOnce(T, Resolver<U, E>) + Send + 'static,
        R: FnOnce(E, Resolver<U, E>) + Send + 'static,
    {
        let label = self.label().map(Into::into);
        Pledge::new_labelled(label, |downstream| {
            let on_reject = downstream.clone();
            self.register(
                move |value| on_fulfilled(value, downstream),
                move |reason| on_rejected(reason, on_reject),
            );
            Ok(())
        })
    }
}

fn forward_value<T: Payload, E: Payload>(value: T, downstream: Resolver<T, E>) {
    downstream.fulfill(value);
}

fn forward_rejection<U: Payload, E: Payload>(reason: E, downstream: Resolver<U, E>) {
    downstream.reject(reason);
}
