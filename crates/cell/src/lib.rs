//! Settlement cell for pledge
//!
//! This crate implements the deferred-computation state machine:
//! - [`Pledge`]: single-assignment cell with a queue of continuations
//! - [`Resolver`]: the fulfill- and reject-triggers, including the resolution
//!   procedure that flattens deferred values
//! - Continuation combinators: `then`, `and_then`, `then_else`, `catch`,
//!   `or_else`
//! - Aggregate combinators: [`all`], [`race`]
//! - Blocking waits for multi-threaded hosts
//!
//! No part of this crate spawns work. Producers run synchronously on
//! construction; anything asynchronous belongs to whoever holds a
//! [`Resolver`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod aggregate;
pub mod cell;
pub mod chain;
pub mod wait;

pub use aggregate::{all, race};
pub use cell::{Pledge, Resolver};
pub use chain::Step;
