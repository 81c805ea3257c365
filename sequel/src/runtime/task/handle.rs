use super::core::{Frame, TaskId};
use crate::error::{Error, Result};
use crate::runtime::orphans;

use std::fmt;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::task::{Context, Poll};

/// The owning handle of a launched computation.
///
/// A `Task` is move-only: it is the single owner of its frame and the
/// single party allowed to await it. The result is consumed exactly once,
/// either by awaiting the task from inside another computation or by
/// [`drive`](Self::drive) from top-level code.
///
/// Dropping a `Task` does **not** cancel the computation. An unfinished
/// frame is handed to the orphan registry and keeps running whenever its
/// events fire; it is only reclaimed when the [`Runtime`](crate::Runtime)
/// shuts down.
pub struct Task<T: Send + 'static> {
    /// Owned frame. `None` once the result has been extracted.
    frame: Option<Arc<Frame<T>>>,
}

impl<T: Send + 'static> Task<T> {
    pub(crate) fn new(frame: Arc<Frame<T>>) -> Self {
        Self { frame: Some(frame) }
    }

    /// Returns the identifier of the computation, or `None` once its
    /// result has been consumed.
    pub fn id(&self) -> Option<TaskId> {
        self.frame.as_ref().map(|frame| frame.id)
    }

    /// Returns `true` if the computation has completed and its result has
    /// not been consumed yet.
    pub fn is_done(&self) -> bool {
        self.frame.as_ref().is_some_and(|frame| frame.is_done())
    }

    /// Pumps external event sources until the computation completes, then
    /// returns its result.
    ///
    /// `poll` is called repeatedly while the task is unfinished; it is
    /// expected to fire whatever resolvers feed the task. Completion is
    /// checked before every call, so a task that is already done never
    /// invokes `poll`.
    ///
    /// # Errors
    ///
    /// - [`Error::Stopped`] if `poll` returns `false` before completion.
    ///   The task is left intact and may be driven again.
    /// - [`Error::Consumed`] if the result was already extracted.
    /// - Any error captured from the computation itself.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::sync::{Arc, Mutex};
    ///
    /// let pending = Arc::new(Mutex::new(None));
    /// let slot = pending.clone();
    ///
    /// let mut task = sequel::launch(async move {
    ///     let value = sequel::bridge(move |resolver| {
    ///         *slot.lock().unwrap() = Some(resolver);
    ///     })
    ///     .await?;
    ///
    ///     Ok(value * 2)
    /// });
    ///
    /// let result = task.drive(|| {
    ///     if let Some(resolver) = pending.lock().unwrap().take() {
    ///         resolver.resolve(21);
    ///     }
    ///     true
    /// });
    ///
    /// assert_eq!(result.unwrap(), 42);
    /// ```
    pub fn drive<P>(&mut self, mut poll: P) -> Result<T>
    where
        P: FnMut() -> bool,
    {
        let frame = self.frame.as_ref().ok_or(Error::Consumed)?;

        while !frame.is_done() {
            if !poll() {
                log::debug!("{} driver stopped before completion", frame.id);
                return Err(Error::Stopped);
            }
        }

        self.consume()
    }

    /// Extracts the result of a completed frame and destroys the frame.
    fn consume(&mut self) -> Result<T> {
        let frame = self.frame.take().ok_or(Error::Consumed)?;
        let outcome = frame.extract();

        log::debug!("{} consumed", frame.id);

        destroy(frame);
        outcome
    }
}

impl<T: Send + 'static> Future for Task<T> {
    /// The value returned by the computation, or the error it raised.
    type Output = Result<T>;

    /// Awaits the computation from inside another one.
    ///
    /// The awaiting waker is registered **before** re-checking completion
    /// so a completion racing with registration is never missed. Polling
    /// again after the result was produced yields [`Error::Consumed`].
    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();

        let Some(frame) = this.frame.as_ref() else {
            return Poll::Ready(Err(Error::Consumed));
        };

        if frame.is_done() {
            return Poll::Ready(this.consume());
        }

        frame.register(cx.waker());

        if frame.is_done() {
            return Poll::Ready(this.consume());
        }

        Poll::Pending
    }
}

impl<T: Send + 'static> Drop for Task<T> {
    /// Destroys a finished frame, or retains an unfinished one in the
    /// orphan registry so its pending resolvers stay harmless.
    fn drop(&mut self) {
        let Some(frame) = self.frame.take() else {
            return;
        };

        if frame.is_done() {
            destroy(frame);
            return;
        }

        frame.continuation.lock().take();
        frame.orphaned.store(true, Ordering::Release);

        log::debug!("{} discarded before completion, retaining", frame.id);

        orphans::retain(frame);
    }
}

impl<T: Send + 'static> fmt::Debug for Task<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("id", &self.id())
            .field("done", &self.is_done())
            .finish()
    }
}

/// Normal destruction path of a frame.
fn destroy<T: Send + 'static>(frame: Arc<Frame<T>>) {
    if frame.orphaned.load(Ordering::Acquire) {
        orphans::release(frame.id);
    }

    drop(frame);
}
