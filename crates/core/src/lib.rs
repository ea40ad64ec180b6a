//! Core types for pledge
//!
//! This crate defines the vocabulary shared by every pledge crate:
//! - [`State`]: the three settlement states of a cell
//! - [`Outcome`]: the payload of a settled cell
//! - [`Resolution`] and [`Thenable`]: what a fulfill-trigger accepts, and the
//!   capability a deferred value must expose to be flattened
//! - [`Error`]: the library's own runtime failures
//!
//! ## Design Principle
//!
//! - **pledge-core** defines the shared semantic types (this crate)
//! - **pledge-cell** implements the settlement state machine and combinators
//! - **pledge** is the facade users depend on

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod state;
pub mod thenable;

pub use error::{Error, Result};
pub use state::{Outcome, Payload, State};
pub use thenable::{OnFulfilled, OnRejected, Resolution, ThenFn, Thenable};
