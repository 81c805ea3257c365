/// Frame is polling its computation.
///
/// Entered at launch and on every resumption. Only the context that
/// moved the frame into this state may touch the computation.
pub(crate) const RUNNING: usize = 0;

/// Frame is parked at a suspension point.
///
/// The computation returned `Poll::Pending` and waits for a bridge
/// resolver or a nested task to resume it.
pub(crate) const SUSPENDED: usize = 1;

/// Frame was woken while it was still running.
///
/// The runner re-polls immediately on the same call stack instead of
/// suspending.
pub(crate) const NOTIFIED: usize = 2;

/// Frame has stored its result.
///
/// Terminal. Wakes observed in this state are ignored.
pub(crate) const COMPLETED: usize = 3;
