//! Suspension on callback-driven events.
//!
//! A [`Bridge`] turns any "call me back later with a value" API into a
//! suspension point. On first poll it hands a one-shot [`Resolver`] to the
//! registration function; whoever holds the resolver later delivers the
//! value, which resumes the suspended computation on the delivering stack.

use crate::error::{Error, Result};

use parking_lot::Mutex;

use std::fmt;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, Waker};

/// Creates a suspension point fed by a callback registration.
///
/// `register` is called once, on first poll, with the [`Resolver`] the
/// external event source must eventually resolve. If it resolves before
/// `register` returns, the computation does not suspend at all.
///
/// # Examples
///
/// ```rust
/// let mut task = sequel::launch(async {
///     let value = sequel::bridge(|resolver| resolver.resolve(7)).await?;
///     Ok(value + 1)
/// });
///
/// assert_eq!(task.drive(|| false).unwrap(), 8);
/// ```
pub fn bridge<T, R>(register: R) -> Bridge<T, R>
where
    R: FnOnce(Resolver<T>),
{
    Bridge::new(register)
}

/// Delivery state shared between a bridge and its resolver.
struct Shared<T> {
    /// The delivered value, owned here until the bridge reads it.
    value: Option<T>,

    /// Set when the resolver was dropped without delivering.
    abandoned: bool,

    /// Waker of the computation suspended on the bridge.
    waker: Option<Waker>,
}

/// A future that completes with the value delivered to its [`Resolver`].
///
/// Created by [`bridge`].
pub struct Bridge<T, R> {
    /// Registration function, taken on first poll.
    register: Option<R>,

    /// Delivery state, created on first poll.
    shared: Option<Arc<Mutex<Shared<T>>>>,
}

// The bridge never pins its fields.
impl<T, R> Unpin for Bridge<T, R> {}

impl<T, R> Bridge<T, R> {
    fn new(register: R) -> Self {
        Self {
            register: Some(register),
            shared: None,
        }
    }
}

impl<T, R> Future for Bridge<T, R>
where
    R: FnOnce(Resolver<T>),
{
    /// The delivered value, or [`Error::Abandoned`].
    type Output = Result<T>;

    /// Polls the bridge.
    ///
    /// On the first poll the registration function receives the resolver.
    /// The waker is stored under the same lock the resolver delivers
    /// under, so a delivery racing with suspension is never lost.
    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();

        let shared = match &this.shared {
            Some(shared) => shared.clone(),
            None => {
                let shared = Arc::new(Mutex::new(Shared {
                    value: None,
                    abandoned: false,
                    waker: None,
                }));

                this.shared = Some(shared.clone());

                if let Some(register) = this.register.take() {
                    register(Resolver {
                        shared: Some(shared.clone()),
                    });
                }

                shared
            }
        };

        let mut state = shared.lock();

        if let Some(value) = state.value.take() {
            drop(state);
            this.shared = None;
            return Poll::Ready(Ok(value));
        }

        if state.abandoned {
            drop(state);
            this.shared = None;
            return Poll::Ready(Err(Error::Abandoned));
        }

        match state.waker.as_ref() {
            Some(current) if current.will_wake(cx.waker()) => {}
            _ => state.waker = Some(cx.waker().clone()),
        }

        Poll::Pending
    }
}

impl<T, R> fmt::Debug for Bridge<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bridge")
            .field("registered", &self.register.is_none())
            .finish()
    }
}

/// The one-shot delivery end of a [`Bridge`].
///
/// Resolving consumes the resolver, so a value can be delivered at most
/// once. Dropping it unresolved resumes the bridge with
/// [`Error::Abandoned`].
pub struct Resolver<T> {
    /// `None` once the value has been delivered.
    shared: Option<Arc<Mutex<Shared<T>>>>,
}

impl<T> Resolver<T> {
    /// Delivers the value and resumes the suspended computation on the
    /// calling stack.
    ///
    /// If the computation was discarded and its frame already destroyed,
    /// the value is simply dropped.
    pub fn resolve(mut self, value: T) {
        if let Some(shared) = self.shared.take() {
            deliver(&shared, |state| state.value = Some(value));
        }
    }
}

impl<T> Drop for Resolver<T> {
    fn drop(&mut self) {
        if let Some(shared) = self.shared.take() {
            log::debug!("resolver dropped without a value");
            deliver(&shared, |state| state.abandoned = true);
        }
    }
}

impl<T> fmt::Debug for Resolver<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("pending", &self.shared.is_some())
            .finish()
    }
}

/// Updates the shared state, then wakes the bridge outside the lock.
fn deliver<T>(shared: &Mutex<Shared<T>>, update: impl FnOnce(&mut Shared<T>)) {
    let waker = {
        let mut state = shared.lock();
        update(&mut state);
        state.waker.take()
    };

    if let Some(waker) = waker {
        waker.wake();
    }
}
