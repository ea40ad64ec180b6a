//! The "then-capable" capability
//!
//! A deferred value interoperates with pledge by implementing [`Thenable`]:
//! one operation taking a fulfilled-handler and a rejected-handler. The
//! implementor must invoke at most one of them, at most once, eventually.
//!
//! A fulfill-trigger receives a [`Resolution`]. A [`Resolution::Value`] is a
//! terminal success value; a [`Resolution::Deferred`] is flattened by
//! subscribing the cell's own triggers to it.
//!
//! Foreign deferred types that only offer a registration function can be
//! wrapped with [`ThenFn`].

use std::fmt;

/// Boxed fulfilled-handler handed to [`Thenable::subscribe`]
pub type OnFulfilled<T> = Box<dyn FnOnce(T) + Send + 'static>;

/// Boxed rejected-handler handed to [`Thenable::subscribe`]
pub type OnRejected<E> = Box<dyn FnOnce(E) + Send + 'static>;

/// A value that will eventually succeed with `T` or fail with `E`
///
/// # Contract
///
/// `subscribe` must call at most one of the two handlers, at most once. It
/// may call it synchronously (for an already-settled value) or later.
pub trait Thenable<T, E>: Send {
    /// Register a continuation pair
    fn subscribe(self: Box<Self>, on_fulfilled: OnFulfilled<T>, on_rejected: OnRejected<E>);
}

/// What a fulfill-trigger is handed
pub enum Resolution<T, E> {
    /// A terminal success value
    Value(T),
    /// A deferred value whose own settlement is adopted
    Deferred(Box<dyn Thenable<T, E>>),
}

impl<T, E> Resolution<T, E> {
    /// Wrap any thenable for adoption
    pub fn deferred(thenable: impl Thenable<T, E> + 'static) -> Self {
        Resolution::Deferred(Box::new(thenable))
    }

    /// Check if this resolution must be flattened
    pub fn is_deferred(&self) -> bool {
        matches!(self, Resolution::Deferred(_))
    }
}

impl<T: fmt::Debug, E> fmt::Debug for Resolution<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Resolution::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

/// Adapter turning a registration closure into a [`Thenable`]
///
/// ```ignore
/// let foreign = ThenFn::new(|on_ok: OnFulfilled<u32>, _on_err: OnRejected<String>| {
///     legacy_api.when_done(move |n| on_ok(n));
/// });
/// resolver.adopt(foreign);
/// ```
pub struct ThenFn<F>(F);

impl<F> ThenFn<F> {
    /// Wrap a registration closure
    pub fn new(register: F) -> Self {
        ThenFn(register)
    }
}

impl<T, E, F> Thenable<T, E> for ThenFn<F>
where
    F: FnOnce(OnFulfilled<T>, OnRejected<E>) + Send,
{
    fn subscribe(self: Box<Self>, on_fulfilled: OnFulfilled<T>, on_rejected: OnRejected<E>) {
        (self.0)(on_fulfilled, on_rejected)
    }
}
