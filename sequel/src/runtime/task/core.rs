use super::Task;
use super::slot::ResultSlot;
use super::state::{COMPLETED, NOTIFIED, RUNNING, SUSPENDED};
use super::waker::make_waker;
use crate::error::{Error, Result};
use crate::runtime::orphans::Orphan;

use parking_lot::Mutex;

use std::cell::UnsafeCell;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::task::{Context, Poll, Waker};

type Body<T> = Pin<Box<dyn Future<Output = Result<T>> + Send>>;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Unique identifier of a launched computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(u64);

impl TaskId {
    fn next() -> Self {
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[cfg(test)]
    pub(crate) fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task-{}", self.0)
    }
}

/// The control block of one suspendable computation.
///
/// A `Frame` owns the computation, its result slot and the continuation
/// of whoever awaits it. It is owned by exactly one party at a time: its
/// [`Task`] handle, or the orphan registry once the handle is discarded.
/// Wakers only hold weak references to it.
pub(crate) struct Frame<T> {
    pub(crate) id: TaskId,

    /// The computation itself.
    ///
    /// Wrapped in `UnsafeCell` because it is only ever touched by the
    /// context that moved `state` into `RUNNING`. Cleared on completion.
    body: UnsafeCell<Option<Body<T>>>,

    /// Outcome of the computation, filled exactly once.
    pub(crate) slot: Mutex<ResultSlot<T>>,

    /// Lifecycle state (RUNNING, SUSPENDED, NOTIFIED, COMPLETED).
    pub(crate) state: AtomicUsize,

    /// Waker of the single party awaiting this frame.
    pub(crate) continuation: Mutex<Option<Waker>>,

    /// Set once the frame has been handed to the orphan registry.
    pub(crate) orphaned: AtomicBool,
}

unsafe impl<T: Send> Send for Frame<T> {}
unsafe impl<T: Send> Sync for Frame<T> {}

impl<T: Send + 'static> Frame<T> {
    fn new<F>(body: F) -> Self
    where
        F: Future<Output = Result<T>> + Send + 'static,
    {
        Self {
            id: TaskId::next(),
            body: UnsafeCell::new(Some(Box::pin(body))),
            slot: Mutex::new(ResultSlot::Empty),
            state: AtomicUsize::new(RUNNING),
            continuation: Mutex::new(None),
            orphaned: AtomicBool::new(false),
        }
    }

    /// Returns `true` once the result slot is filled.
    pub(crate) fn is_done(&self) -> bool {
        self.state.load(Ordering::Acquire) == COMPLETED
    }

    /// Polls the computation until it suspends or completes.
    ///
    /// The caller must have moved the frame into `RUNNING`. A wake that
    /// arrives during the poll (`NOTIFIED`) makes the frame poll again
    /// right away on the same stack rather than suspend.
    fn run(self: &Arc<Self>) {
        loop {
            let waker = make_waker(Arc::downgrade(self));
            let mut cx = Context::from_waker(&waker);

            // Safety: the RUNNING state guarantees exclusive access to the body.
            let polled = panic::catch_unwind(AssertUnwindSafe(|| unsafe {
                match (*self.body.get()).as_mut() {
                    Some(body) => body.as_mut().poll(&mut cx),
                    None => Poll::Pending,
                }
            }));

            let outcome = match polled {
                Ok(Poll::Pending) => {
                    if self
                        .state
                        .compare_exchange(RUNNING, SUSPENDED, Ordering::AcqRel, Ordering::Acquire)
                        .is_ok()
                    {
                        log::trace!("{} suspended", self.id);
                        return;
                    }

                    // Woken while running; resume immediately.
                    self.state.store(RUNNING, Ordering::Release);
                    continue;
                }
                Ok(Poll::Ready(outcome)) => outcome,
                Err(payload) => Err(Error::panicked(payload)),
            };

            self.complete(outcome);
            return;
        }
    }

    /// Stores the outcome and resumes the awaiting party, in that order.
    fn complete(&self, outcome: Result<T>) {
        // Safety: still RUNNING, nobody else touches the body.
        drop(unsafe { (*self.body.get()).take() });

        match &outcome {
            Ok(_) => log::trace!("{} completed", self.id),
            Err(error) => log::trace!("{} failed: {}", self.id, error),
        }

        self.slot.lock().set(outcome);
        self.state.store(COMPLETED, Ordering::Release);

        let continuation = self.continuation.lock().take();

        if let Some(waker) = continuation {
            waker.wake();
        }
    }

    /// Resumes the frame on the caller's stack.
    ///
    /// A `SUSPENDED` frame runs immediately; a `RUNNING` one is marked
    /// `NOTIFIED` so its runner polls again. Wakes after completion are
    /// ignored.
    pub(crate) fn wake(self: Arc<Self>) {
        loop {
            match self.state.load(Ordering::Acquire) {
                SUSPENDED => {
                    if self
                        .state
                        .compare_exchange(SUSPENDED, RUNNING, Ordering::AcqRel, Ordering::Acquire)
                        .is_ok()
                    {
                        log::trace!("{} resumed", self.id);
                        self.run();
                        return;
                    }
                }
                RUNNING => {
                    if self
                        .state
                        .compare_exchange(RUNNING, NOTIFIED, Ordering::AcqRel, Ordering::Acquire)
                        .is_ok()
                    {
                        return;
                    }
                }
                NOTIFIED | COMPLETED => return,
                _ => return,
            }
        }
    }

    /// Registers the single party awaiting this frame.
    ///
    /// Replaces a previous registration, which can only come from the same
    /// owner polling again.
    pub(crate) fn register(&self, waker: &Waker) {
        let mut continuation = self.continuation.lock();

        match continuation.as_ref() {
            Some(current) if current.will_wake(waker) => {}
            _ => *continuation = Some(waker.clone()),
        }
    }

    /// Moves the outcome out of a completed frame.
    pub(crate) fn extract(&self) -> Result<T> {
        debug_assert!(self.is_done());
        self.slot.lock().take()
    }
}

impl<T: Send + 'static> Orphan for Frame<T> {
    fn id(&self) -> TaskId {
        self.id
    }

    fn is_done(&self) -> bool {
        Frame::is_done(self)
    }
}

/// Launches a computation and returns the handle that owns it.
///
/// The computation runs eagerly on the calling stack until it reaches its
/// first suspension point or completes; only then does `launch` return.
/// It is resumed later, synchronously, by whatever fires the event it is
/// waiting on.
///
/// # Examples
///
/// ```rust
/// let mut task = sequel::launch(async { Ok(1) });
///
/// assert!(task.is_done());
/// assert_eq!(task.drive(|| true).unwrap(), 1);
/// ```
pub fn launch<F, T>(body: F) -> Task<T>
where
    F: Future<Output = Result<T>> + Send + 'static,
    T: Send + 'static,
{
    let frame = Arc::new(Frame::new(body));

    log::debug!("{} launched", frame.id);

    frame.run();

    Task::new(frame)
}
