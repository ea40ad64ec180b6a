//! Aggregate combinators
//!
//! - [`all`]: fulfills with every input's value, in input order, once all
//!   inputs have fulfilled; rejects with the first rejection.
//! - [`race`]: adopts whichever input settles first, by either outcome.
//!
//! Inputs are taken as any ordered iterable of pledges. Later settlements of
//! other inputs still run their continuations, but the aggregate is already
//! settled so they change nothing.

use crate::cell::Pledge;
use parking_lot::Mutex;
use pledge_core::Payload;
use std::sync::Arc;

/// Wait for every input to fulfill, or fail fast on the first rejection
///
/// The result keeps input order regardless of settlement order. An empty
/// input fulfills immediately with an empty `Vec`.
pub fn all<T, E, I>(inputs: I) -> Pledge<Vec<T>, E>
where
    T: Payload,
    E: Payload,
    I: IntoIterator<Item = Pledge<T, E>>,
{
    let inputs: Vec<Pledge<T, E>> = inputs.into_iter().collect();
    Pledge::new_labelled(Some(Arc::from("all")), move |resolver| {
        if inputs.is_empty() {
            resolver.fulfill(Vec::new());
            return Ok(());
        }

        let tally = Arc::new(Mutex::new(Tally::new(inputs.len())));
        for (index, input) in inputs.into_iter().enumerate() {
            let tally = Arc::clone(&tally);
            let on_fulfilled = resolver.clone();
            let on_rejected = resolver.clone();
            input.register(
                move |value| {
                    let complete = tally.lock().record(index, value);
                    if let Some(values) = complete {
                        on_fulfilled.fulfill(values);
                    }
                },
                move |reason| on_rejected.reject(reason),
            );
        }
        Ok(())
    })
}

/// Adopt the outcome of whichever input settles first
///
/// An empty input never settles.
pub fn race<T, E, I>(inputs: I) -> Pledge<T, E>
where
    T: Payload,
    E: Payload,
    I: IntoIterator<Item = Pledge<T, E>>,
{
    let inputs: Vec<Pledge<T, E>> = inputs.into_iter().collect();
    Pledge::new_labelled(Some(Arc::from("race")), move |resolver| {
        for input in inputs {
            let on_fulfilled = resolver.clone();
            let on_rejected = resolver.clone();
            input.register(
                move |value| on_fulfilled.fulfill(value),
                move |reason| on_rejected.reject(reason),
            );
        }
        Ok(())
    })
}

/// Result slots for `all`, filled by input position
struct Tally<T> {
    slots: Vec<Option<T>>,
    remaining: usize,
}

impl<T> Tally<T> {
    fn new(len: usize) -> Self {
        Tally {
            slots: (0..len).map(|_| None).collect(),
            remaining: len,
        }
    }

    /// Store one value; returns the full ordered result once the last slot fills
    fn record(&mut self, index: usize, value: T) -> Option<Vec<T>> {
        let slot = self.slots.get_mut(index)?;
        if slot.replace(value).is_some() {
            return None;
        }
        self.remaining -= 1;
        if self.remaining > 0 {
            return None;
        }
        Some(self.slots.drain(..).flatten().collect())
    }
}
