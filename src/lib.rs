//! # Pledge
//!
//! Single-assignment deferred values with a small combinator algebra.
//!
//! A [`Pledge`] starts pending and settles exactly once: fulfilled with a
//! value or rejected with a reason. Continuations registered before
//! settlement are queued and run in order when it happens; continuations
//! registered afterwards run immediately with the stored outcome.
//!
//! ## Quick Start
//!
//! ```ignore
//! use pledge::prelude::*;
//!
//! let p: Pledge<i32, String> = Pledge::new(|resolver| {
//!     resolver.fulfill(3);
//!     Ok(())
//! });
//!
//! // Sequential continuation
//! let q = p.then(|v| Ok(v + 1)).then(|v| Ok(v * 2));
//! assert_eq!(q.outcome(), Some(Outcome::Fulfilled(8)));
//!
//! // Recovery
//! let r = Pledge::<i32, String>::rejected("boom".into()).catch(|_| Ok(0));
//!
//! // Aggregates
//! let both = all([q, r]);
//! let first = race([Pledge::fulfilled(1), Pledge::pending().0]);
//! ```
//!
//! ## Flattening
//!
//! Fulfilling with a deferred value (anything implementing [`Thenable`],
//! including another [`Pledge`]) adopts that value's eventual outcome instead
//! of storing it. Handlers opt into this by returning a [`Resolution`] via
//! `and_then`, `then_else` or `or_else`.
//!
//! ## Errors
//!
//! Rejection reasons are the caller's `E` and are never wrapped. [`Error`]
//! covers the library's own failures, such as a timed-out wait.

#![warn(missing_docs)]

mod builder;

pub mod prelude;

// Re-export main entry points
pub use builder::PledgeBuilder;
pub use pledge_cell::{all, race, Pledge, Resolver, Step};

// Re-export core types
pub use pledge_core::{
    Error, OnFulfilled, OnRejected, Outcome, Payload, Resolution, Result, State, ThenFn, Thenable,
};
