//! Retention of frames whose handle was discarded before completion.
//!
//! An orphaned computation keeps running whenever its pending events fire,
//! so its frame cannot be freed with the handle. The registry owns such
//! frames until the process-wide teardown performed by
//! [`Runtime`](crate::Runtime).
//!
//! Orphans are never reclaimed individually, even after they complete.
//! Memory therefore grows with every discarded-but-unfinished task until
//! shutdown; [`RuntimeBuilder::orphan_warning`](crate::RuntimeBuilder::orphan_warning)
//! makes that growth visible in the logs.

use crate::runtime::task::TaskId;

use parking_lot::Mutex;

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, LazyLock};

/// A type-erased frame held by the registry.
pub(crate) trait Orphan: Send + Sync {
    fn id(&self) -> TaskId;

    fn is_done(&self) -> bool;
}

/// A set of retained frames, keyed by task id.
pub(crate) struct OrphanRegistry {
    /// Retained frames. `None` once the registry has been torn down.
    frames: Mutex<Option<HashMap<TaskId, Arc<dyn Orphan>>>>,

    /// Log a warning every time the count reaches a multiple of this.
    /// Zero disables the warning.
    warn_every: AtomicUsize,
}

static REGISTRY: LazyLock<OrphanRegistry> = LazyLock::new(OrphanRegistry::new);

/// Returns the process-wide registry.
pub(crate) fn registry() -> &'static OrphanRegistry {
    &REGISTRY
}

impl OrphanRegistry {
    pub(crate) fn new() -> Self {
        Self {
            frames: Mutex::new(Some(HashMap::new())),
            warn_every: AtomicUsize::new(0),
        }
    }

    pub(crate) fn set_warning(&self, every: usize) {
        self.warn_every.store(every, Ordering::Relaxed);
    }

    /// Retains a frame until teardown.
    ///
    /// Retaining the same frame twice keeps a single entry. Returns `false`
    /// if the registry was already torn down; the frame is then dropped
    /// right away.
    pub(crate) fn retain(&self, frame: Arc<dyn Orphan>) -> bool {
        let id = frame.id();
        let mut guard = self.frames.lock();

        let Some(frames) = guard.as_mut() else {
            drop(guard);
            log::warn!("{id} orphaned after teardown, destroying it now");
            drop(frame);
            return false;
        };

        frames.entry(id).or_insert(frame);

        let len = frames.len();
        let every = self.warn_every.load(Ordering::Relaxed);

        if every != 0 && len % every == 0 {
            log::warn!("{len} orphaned tasks retained until shutdown");
        }

        true
    }

    /// Drops the registry's reference to a frame, if it holds one.
    ///
    /// The entry is dropped outside the lock.
    pub(crate) fn release(&self, id: TaskId) {
        let removed = self.frames.lock().as_mut().and_then(|frames| frames.remove(&id));
        drop(removed);
    }

    pub(crate) fn contains(&self, id: TaskId) -> bool {
        self.frames
            .lock()
            .as_ref()
            .is_some_and(|frames| frames.contains_key(&id))
    }

    pub(crate) fn len(&self) -> usize {
        self.frames.lock().as_ref().map_or(0, HashMap::len)
    }

    /// Destroys every retained frame, finished or not.
    ///
    /// Runs at most once; later calls return `0`. Frames are dropped after
    /// the lock is released because a frame's computation may own nested
    /// tasks whose own drop re-enters the registry.
    pub(crate) fn teardown(&self) -> usize {
        let Some(frames) = self.frames.lock().take() else {
            return 0;
        };

        let count = frames.len();
        let pending = frames.values().filter(|frame| !frame.is_done()).count();

        log::debug!("tearing down {count} orphaned tasks ({pending} unfinished)");

        drop(frames);
        count
    }
}

/// Hands an unfinished frame to the process-wide registry.
pub(crate) fn retain(frame: Arc<dyn Orphan>) -> bool {
    registry().retain(frame)
}

pub(crate) fn release(id: TaskId) {
    registry().release(id);
}

/// Returns the number of frames currently retained by the process-wide
/// registry.
pub fn orphan_count() -> usize {
    registry().len()
}

/// Returns `true` if the task with this id was discarded unfinished and is
/// still retained.
pub fn is_orphaned(id: TaskId) -> bool {
    registry().contains(id)
}
