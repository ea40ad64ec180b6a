//! The settlement cell
//!
//! A [`Pledge`] is a single-assignment container: it starts pending and is
//! settled at most once, either fulfilled with a value or rejected with a
//! reason. Its two triggers live on a [`Resolver`].
//!
//! ## Settlement
//!
//! 1. A trigger locks the slot and checks that the cell still accepts a
//!    settlement. If not, the call is a no-op.
//! 2. The outcome is stored and the continuation queue is drained, both
//!    under the lock.
//! 3. The lock is released, then the drained continuations run in
//!    registration order.
//!
//! A continuation registered while step 3 is running sees a settled slot and
//! runs immediately, so the queue is never mutated while it is iterated.
//!
//! ## Resolution procedure
//!
//! [`Resolver::resolve`] is the fulfill-trigger. A [`Resolution::Value`]
//! settles the cell directly. A [`Resolution::Deferred`] subscribes the
//! cell's own triggers to the deferred value. The cell stays pending and open
//! while it adopts: whichever settlement arrives first, from the adopted
//! value or from a direct trigger call, wins.
//!
//! A cell that adopts itself, directly or through a cycle of deferred values,
//! never settles. That case is not detected.

use parking_lot::{Condvar, Mutex};
use pledge_core::{
    Error, OnFulfilled, OnRejected, Outcome, Payload, Resolution, Result, State, Thenable,
};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, trace};

/// A registered `(on_fulfilled, on_rejected)` pair
pub(crate) struct Continuation<T, E> {
    on_fulfilled: OnFulfilled<T>,
    on_rejected: OnRejected<E>,
}

impl<T, E> Continuation<T, E> {
    fn fire(self, outcome: Outcome<T, E>) {
        match outcome {
            Outcome::Fulfilled(value) => (self.on_fulfilled)(value),
            Outcome::Rejected(reason) => (self.on_rejected)(reason),
        }
    }
}

struct Slot<T, E> {
    outcome: Option<Outcome<T, E>>,
    continuations: Vec<Continuation<T, E>>,
}

impl<T, E> Slot<T, E> {
    fn new() -> Self {
        Slot {
            outcome: None,
            continuations: Vec::new(),
        }
    }

    fn accepts(&self) -> bool {
        self.outcome.is_none()
    }

    fn state(&self) -> State {
        self.outcome
            .as_ref()
            .map_or(State::Pending, |outcome| outcome.state())
    }
}

struct Shared<T, E> {
    label: Option<Arc<str>>,
    slot: Mutex<Slot<T, E>>,
    /// Signalled once, when the slot settles
    settled: Condvar,
}

impl<T: Payload, E: Payload> Shared<T, E> {
    fn label_field(&self) -> &str {
        self.label.as_deref().unwrap_or("-")
    }

    fn resolve(self: &Arc<Self>, resolution: Resolution<T, E>) {
        let thenable = match resolution {
            Resolution::Value(value) => return self.settle(Outcome::Fulfilled(value)),
            Resolution::Deferred(thenable) => thenable,
        };

        if !self.slot.lock().accepts() {
            trace!(label = self.label_field(), "adoption ignored; pledge already settled");
            return;
        }

        trace!(label = self.label_field(), "adopting deferred value");
        let on_fulfilled = Arc::clone(self);
        let on_rejected = Arc::clone(self);
        thenable.subscribe(
            Box::new(move |value: T| on_fulfilled.settle(Outcome::Fulfilled(value))),
            Box::new(move |reason: E| on_rejected.settle(Outcome::Rejected(reason))),
        );
    }

    fn settle(&self, outcome: Outcome<T, E>) {
        let drained = {
            let mut slot = self.slot.lock();
            if !slot.accepts() {
                trace!(
                    label = self.label_field(),
                    attempted = outcome.state().as_str(),
                    current = slot.state().as_str(),
                    "settlement ignored"
                );
                return;
            }
            slot.outcome = Some(outcome.clone());
            std::mem::take(&mut slot.continuations)
        };
        self.settled.notify_all();

        trace!(
            label = self.label_field(),
            state = outcome.state().as_str(),
            continuations = drained.len(),
            "pledge settled"
        );
        for continuation in drained {
            continuation.fire(outcome.clone());
        }
    }

    fn push(&self, continuation: Continuation<T, E>) {
        let outcome = {
            let mut slot = self.slot.lock();
            match slot.outcome.clone() {
                Some(outcome) => outcome,
                None => {
                    slot.continuations.push(continuation);
                    return;
                }
            }
        };
        continuation.fire(outcome);
    }

    /// Park until the slot settles or `deadline` passes
    ///
    /// Returns `None` only when the deadline passed first.
    fn block_until(&self, deadline: Option<Instant>) -> Option<Outcome<T, E>> {
        let mut slot = self.slot.lock();
        loop {
            if let Some(outcome) = &slot.outcome {
                return Some(outcome.clone());
            }
            match deadline {
                Some(deadline) => {
                    if self.settled.wait_until(&mut slot, deadline).timed_out() {
                        return slot.outcome.clone();
                    }
                }
                None => self.settled.wait(&mut slot),
            }
        }
    }
}

/// A deferred computation: a single-assignment cell holding a success value
/// `T` or a failure reason `E`
///
/// Cloning a `Pledge` clones the handle; all clones observe the same cell.
///
/// # Example
///
/// ```ignore
/// let p: Pledge<i32, String> = Pledge::new(|resolver| {
///     resolver.fulfill(3);
///     Ok(())
/// });
/// let q = p.then(|v| Ok(v + 1)).then(|v| Ok(v * 2));
/// assert_eq!(q.outcome(), Some(Outcome::Fulfilled(8)));
/// ```
pub struct Pledge<T, E> {
    shared: Arc<Shared<T, E>>,
}

/// The settlement triggers of one [`Pledge`]
///
/// Every method is a no-op once the cell has settled.
pub struct Resolver<T, E> {
    shared: Arc<Shared<T, E>>,
}

impl<T, E> Clone for Pledge<T, E> {
    fn clone(&self) -> Self {
        Pledge {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T, E> Clone for Resolver<T, E> {
    fn clone(&self) -> Self {
        Resolver {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: Payload, E: Payload> Pledge<T, E> {
    /// Create a pledge and run `producer` synchronously with its triggers
    ///
    /// If `producer` returns `Err(reason)`, the pledge is rejected with
    /// `reason` (unless the producer already settled it).
    pub fn new<P>(producer: P) -> Self
    where
        P: FnOnce(Resolver<T, E>) -> std::result::Result<(), E>,
    {
        Self::new_labelled(None, producer)
    }

    /// Like [`Pledge::new`], attaching a label to the pledge's log events
    pub fn new_labelled<P>(label: Option<Arc<str>>, producer: P) -> Self
    where
        P: FnOnce(Resolver<T, E>) -> std::result::Result<(), E>,
    {
        let (pledge, resolver) = Self::pending_labelled(label);
        if let Err(reason) = producer(resolver.clone()) {
            debug!(
                label = pledge.shared.label_field(),
                "producer failed; rejecting pledge"
            );
            resolver.reject(reason);
        }
        pledge
    }

    /// Create a pending pledge and hand its triggers to the caller
    ///
    /// This is how an external scheduler settles a cell later.
    pub fn pending() -> (Self, Resolver<T, E>) {
        Self::pending_labelled(None)
    }

    /// Like [`Pledge::pending`], with a label
    pub fn pending_labelled(label: Option<Arc<str>>) -> (Self, Resolver<T, E>) {
        let shared = Arc::new(Shared {
            label,
            slot: Mutex::new(Slot::new()),
            settled: Condvar::new(),
        });
        let resolver = Resolver {
            shared: Arc::clone(&shared),
        };
        (Pledge { shared }, resolver)
    }

    /// An already-fulfilled pledge
    pub fn fulfilled(value: T) -> Self {
        let (pledge, resolver) = Self::pending();
        resolver.fulfill(value);
        pledge
    }

    /// An already-rejected pledge
    pub fn rejected(reason: E) -> Self {
        let (pledge, resolver) = Self::pending();
        resolver.reject(reason);
        pledge
    }

    /// Current settlement state
    pub fn state(&self) -> State {
        self.shared.slot.lock().state()
    }

    /// Check if the pledge has not settled yet
    pub fn is_pending(&self) -> bool {
        self.state() == State::Pending
    }

    /// The settled outcome, or `None` while pending
    pub fn outcome(&self) -> Option<Outcome<T, E>> {
        self.shared.slot.lock().outcome.clone()
    }

    /// The settled outcome, or [`Error::Pending`]
    pub fn try_outcome(&self) -> Result<Outcome<T, E>> {
        self.outcome().ok_or(Error::Pending)
    }

    /// Label attached at construction, if any
    pub fn label(&self) -> Option<&str> {
        self.shared.label.as_deref()
    }

    /// Park the calling thread until the pledge settles or `deadline` passes
    pub(crate) fn block_until(&self, deadline: Option<Instant>) -> Option<Outcome<T, E>> {
        self.shared.block_until(deadline)
    }

    /// Number of continuations still queued
    #[cfg(test)]
    pub(crate) fn queued(&self) -> usize {
        self.shared.slot.lock().continuations.len()
    }

    /// Register a continuation pair without deriving a new pledge
    ///
    /// While pending, the pair is queued and runs at settlement, in
    /// registration order. Once settled, the matching handler runs
    /// immediately, before this call returns.
    pub fn register<F, R>(&self, on_fulfilled: F, on_rejected: R)
    where
        F: FnOnce(T) + Send + 'static,
        R: FnOnce(E) + Send + 'static,
    {
        self.shared.push(Continuation {
            on_fulfilled: Box::new(on_fulfilled),
            on_rejected: Box::new(on_rejected),
        });
    }
}

impl<T: Payload, E: Payload> Resolver<T, E> {
    /// The fulfill-trigger: settle with a value or adopt a deferred value
    pub fn resolve(&self, resolution: Resolution<T, E>) {
        self.shared.resolve(resolution);
    }

    /// Fulfill with a terminal value
    pub fn fulfill(&self, value: T) {
        self.shared.settle(Outcome::Fulfilled(value));
    }

    /// Adopt the eventual settlement of another deferred value
    pub fn adopt(&self, thenable: impl Thenable<T, E> + 'static) {
        self.resolve(Resolution::deferred(thenable));
    }

    /// The reject-trigger. Reasons are stored as given, never flattened.
    pub fn reject(&self, reason: E) {
        self.shared.settle(Outcome::Rejected(reason));
    }

    /// Check if the cell has settled
    pub fn is_settled(&self) -> bool {
        self.shared.slot.lock().outcome.is_some()
    }

    /// A handle to the pledge these triggers settle
    pub fn pledge(&self) -> Pledge<T, E> {
        Pledge {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Feed a handler's result into this cell
    ///
    /// `Err` is a fault raised by the handler and becomes a rejection.
    pub(crate) fn settle_with(&self, step: std::result::Result<Resolution<T, E>, E>) {
        match step {
            Ok(resolution) => self.resolve(resolution),
            Err(reason) => {
                debug!(
                    label = self.shared.label_field(),
                    "continuation handler failed; rejecting downstream pledge"
                );
                self.reject(reason);
            }
        }
    }
}

impl<T: Payload, E: Payload> Thenable<T, E> for Pledge<T, E> {
    fn subscribe(self: Box<Self>, on_fulfilled: OnFulfilled<T>, on_rejected: OnRejected<E>) {
        self.shared.push(Continuation {
            on_fulfilled,
            on_rejected,
        });
    }
}

impl<T: Payload, E: Payload> From<Pledge<T, E>> for Resolution<T, E> {
    fn from(pledge: Pledge<T, E>) -> Self {
        Resolution::Deferred(Box::new(pledge))
    }
}

impl<T, E> fmt::Debug for Pledge<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slot = self.shared.slot.lock();
        let state = match &slot.outcome {
            None => "pending",
            Some(Outcome::Fulfilled(_)) => "fulfilled",
            Some(Outcome::Rejected(_)) => "rejected",
        };
        f.debug_struct("Pledge")
            .field("label", &self.shared.label)
            .field("state", &state)
            .field("continuations", &slot.continuations.len())
            .finish()
    }
}

impl<T, E> fmt::Debug for Resolver<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("label", &self.shared.label)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pledge_core::{ThenFn, Thenable};

    type Cell = Pledge<i32, String>;

    fn recorder() -> (Arc<Mutex<Vec<String>>>, impl Fn(&str) + Clone) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        (log, move |entry: &str| sink.lock().push(entry.to_string()))
    }

    // ========================================================================
    // Construction
    // ========================================================================

    #[test]
    fn test_producer_runs_synchronously() {
        let p: Cell = Pledge::new(|resolver| {
            resolver.fulfill(1);
            Ok(())
        });
        assert_eq!(p.state(), State::Fulfilled);
        assert_eq!(p.outcome(), Some(Outcome::Fulfilled(1)));
    }

    #[test]
    fn test_producer_error_rejects() {
        let p: Cell = Pledge::new(|_resolver| Err("producer blew up".to_string()));
        assert_eq!(
            p.outcome(),
            Some(Outcome::Rejected("producer blew up".to_string()))
        );
    }

    #[test]
    fn test_producer_error_after_settling_is_ignored() {
        let p: Cell = Pledge::new(|resolver| {
            resolver.fulfill(5);
            Err("late".to_string())
        });
        assert_eq!(p.outcome(), Some(Outcome::Fulfilled(5)));
    }

    #[test]
    fn test_pending_until_triggered() {
        let (p, resolver): (Cell, _) = Pledge::pending();
        assert!(p.is_pending());
        assert_eq!(p.try_outcome(), Err(Error::Pending));

        resolver.reject("later".to_string());
        assert_eq!(p.state(), State::Rejected);
        assert!(resolver.is_settled());
    }

    // ========================================================================
    // Write-once
    // ========================================================================

    #[test]
    fn test_second_settlement_is_noop() {
        let (p, resolver): (Cell, _) = Pledge::pending();
        resolver.fulfill(1);
        resolver.fulfill(2);
        resolver.reject("nope".to_string());
        assert_eq!(p.outcome(), Some(Outcome::Fulfilled(1)));

        let (q, resolver): (Cell, _) = Pledge::pending();
        resolver.reject("first".to_string());
        resolver.fulfill(9);
        assert_eq!(q.outcome(), Some(Outcome::Rejected("first".to_string())));
    }

    // ========================================================================
    // Continuations
    // ========================================================================

    #[test]
    fn test_queued_continuations_fire_in_order() {
        let (p, resolver): (Cell, _) = Pledge::pending();
        let (log, record) = recorder();

        for name in ["a", "b", "c"] {
            let on_ok = record.clone();
            let on_err = record.clone();
            p.register(
                move |v| on_ok(&format!("{name}:{v}")),
                move |e| on_err(&format!("{name}!{e}")),
            );
        }
        assert!(log.lock().is_empty());

        resolver.fulfill(4);
        assert_eq!(*log.lock(), vec!["a:4", "b:4", "c:4"]);

        // Settling again must not re-run anything.
        resolver.fulfill(5);
        assert_eq!(log.lock().len(), 3);
    }

    #[test]
    fn test_late_registration_fires_immediately() {
        let p: Cell = Pledge::rejected("boom".to_string());
        let (log, record) = recorder();
        let on_ok = record.clone();
        p.register(move |v| on_ok(&v.to_string()), move |e| record(e.as_str()));
        assert_eq!(*log.lock(), vec!["boom"]);
    }

    #[test]
    fn test_registration_during_settlement_runs_immediately() {
        let (p, resolver): (Cell, _) = Pledge::pending();
        let (log, record) = recorder();

        let inner = p.clone();
        let first = record.clone();
        let nested = record.clone();
        p.register(
            move |v| {
                first(&format!("first:{v}"));
                let nested_ok = nested.clone();
                inner.register(move |v| nested_ok(&format!("nested:{v}")), |_| {});
            },
            |_| {},
        );
        let second = record.clone();
        p.register(move |v| second(&format!("second:{v}")), |_| {});

        resolver.fulfill(1);
        assert_eq!(*log.lock(), vec!["first:1", "nested:1", "second:1"]);
    }

    // ========================================================================
    // Resolution procedure
    // ========================================================================

    #[test]
    fn test_resolve_with_pending_pledge_flattens() {
        let (inner, inner_resolver): (Cell, _) = Pledge::pending();
        let outer: Cell = Pledge::new(|resolver| {
            resolver.resolve(inner.clone().into());
            Ok(())
        });
        assert!(outer.is_pending());

        inner_resolver.fulfill(42);
        assert_eq!(outer.outcome(), Some(Outcome::Fulfilled(42)));
    }

    #[test]
    fn test_adoption_carries_rejection() {
        let inner: Cell = Pledge::rejected("inner failed".to_string());
        let outer: Cell = Pledge::new(|resolver| {
            resolver.adopt(inner);
            Ok(())
        });
        assert_eq!(
            outer.outcome(),
            Some(Outcome::Rejected("inner failed".to_string()))
        );
    }

    #[test]
    fn test_direct_trigger_settles_adopting_cell() {
        let (inner, inner_resolver): (Cell, _) = Pledge::pending();
        let (outer, resolver): (Cell, _) = Pledge::pending();

        resolver.adopt(inner);
        assert!(outer.is_pending());
        resolver.reject("direct".to_string());
        assert_eq!(outer.outcome(), Some(Outcome::Rejected("direct".to_string())));

        // The adopted value settles later and loses.
        inner_resolver.fulfill(2);
        assert_eq!(outer.outcome(), Some(Outcome::Rejected("direct".to_string())));
    }

    #[test]
    fn test_adopted_value_settling_first_wins() {
        let (inner, inner_resolver): (Cell, _) = Pledge::pending();
        let (outer, resolver): (Cell, _) = Pledge::pending();

        resolver.adopt(inner);
        inner_resolver.fulfill(2);
        resolver.fulfill(1);
        assert_eq!(outer.outcome(), Some(Outcome::Fulfilled(2)));
    }

    #[test]
    fn test_nested_adoption_unwraps_fully() {
        let (innermost, innermost_resolver): (Cell, _) = Pledge::pending();
        let middle: Cell = Pledge::new(|r| {
            r.adopt(innermost);
            Ok(())
        });
        let outer: Cell = Pledge::new(|r| {
            r.adopt(middle);
            Ok(())
        });

        innermost_resolver.fulfill(7);
        assert_eq!(outer.outcome(), Some(Outcome::Fulfilled(7)));
    }

    #[test]
    fn test_foreign_thenable_is_adopted() {
        let foreign = ThenFn::new(|_on_ok: OnFulfilled<i32>, on_err: OnRejected<String>| {
            on_err("foreign".to_string());
        });
        let p: Cell = Pledge::new(|r| {
            r.adopt(foreign);
            Ok(())
        });
        assert_eq!(p.outcome(), Some(Outcome::Rejected("foreign".to_string())));
    }

    #[test]
    fn test_pledge_is_a_thenable() {
        let (log, record) = recorder();
        let p: Box<dyn Thenable<i32, String>> = Box::new(Pledge::fulfilled(3));
        let on_ok = record.clone();
        p.subscribe(
            Box::new(move |v: i32| on_ok(&v.to_string())),
            Box::new(move |e: String| record(e.as_str())),
        );
        assert_eq!(*log.lock(), vec!["3"]);
    }

    #[test]
    fn test_debug_shows_state_and_label() {
        let (p, _resolver): (Cell, _) = Pledge::pending_labelled(Some(Arc::from("fetch")));
        let rendered = format!("{:?}", p);
        assert!(rendered.contains("fetch"));
        assert!(rendered.contains("pending"));
        assert_eq!(p.label(), Some("fetch"));
    }
}
