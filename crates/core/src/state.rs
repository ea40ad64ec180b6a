//! Settlement states and outcomes
//!
//! A cell starts [`State::Pending`] and moves to [`State::Fulfilled`] or
//! [`State::Rejected`] at most once. The settled payload is an [`Outcome`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Bound shared by success values and failure reasons
///
/// A settled payload is cloned once per continuation, and continuations may
/// run on whichever thread settles the cell.
pub trait Payload: Clone + Send + 'static {}

impl<X: Clone + Send + 'static> Payload for X {}

/// Settlement state of a cell
///
/// Write-once after `Pending`: the only legal transitions are
/// `Pending -> Fulfilled` and `Pending -> Rejected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum State {
    /// Not settled yet; continuations accumulate
    Pending,
    /// Settled with a success value
    Fulfilled,
    /// Settled with a failure reason
    Rejected,
}

impl State {
    /// Whether the cell has left `Pending`
    pub fn is_settled(&self) -> bool {
        !matches!(self, State::Pending)
    }

    /// Stable lowercase name, used in log fields
    pub fn as_str(&self) -> &'static str {
        match self {
            State::Pending => "pending",
            State::Fulfilled => "fulfilled",
            State::Rejected => "rejected",
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload of a settled cell
///
/// Immutable once stored: every continuation receives a clone of the same
/// outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T, E> {
    /// Success value
    Fulfilled(T),
    /// Failure reason
    Rejected(E),
}

impl<T, E> Outcome<T, E> {
    /// The state this outcome corresponds to
    pub fn state(&self) -> State {
        match self {
            Outcome::Fulfilled(_) => State::Fulfilled,
            Outcome::Rejected(_) => State::Rejected,
        }
    }

    /// Check if this is a success
    pub fn is_fulfilled(&self) -> bool {
        matches!(self, Outcome::Fulfilled(_))
    }

    /// Check if this is a failure
    pub fn is_rejected(&self) -> bool {
        matches!(self, Outcome::Rejected(_))
    }

    /// Convert into a standard `Result`
    pub fn into_result(self) -> Result<T, E> {
        match self {
            Outcome::Fulfilled(value) => Ok(value),
            Outcome::Rejected(reason) => Err(reason),
        }
    }

    /// Borrow the payload as a `Result`
    pub fn as_result(&self) -> Result<&T, &E> {
        match self {
            Outcome::Fulfilled(value) => Ok(value),
            Outcome::Rejected(reason) => Err(reason),
        }
    }
}

impl<T, E> From<Result<T, E>> for Outcome<T, E> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Outcome::Fulfilled(value),
            Err(reason) => Outcome::Rejected(reason),
        }
    }
}
