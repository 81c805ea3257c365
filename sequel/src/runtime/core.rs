use crate::runtime::orphans::registry;

/// The process-scoped state of the task engine.
///
/// `Runtime` does not schedule anything: computations run on whatever stack
/// launches or resumes them. It owns the lifecycle of the process-wide
/// orphan registry instead:
/// - building it configures the registry,
/// - dropping it (or calling [`shutdown`](Self::shutdown)) force-destroys
///   every retained orphan, finished or not.
///
/// Create one near the start of the process and keep it alive until
/// exit. Teardown happens once; orphans discarded afterwards are destroyed
/// on the spot, and resolvers that fire for destroyed frames do nothing.
pub struct Runtime {
    /// Whether teardown already ran through [`shutdown`](Self::shutdown).
    closed: bool,
}

impl Runtime {
    /// Creates the runtime scope.
    ///
    /// # Arguments
    ///
    /// * `orphan_warning` - Warn each time the orphan count reaches a
    ///   multiple of this value; zero disables the warning.
    pub(crate) fn new(orphan_warning: usize) -> Self {
        registry().set_warning(orphan_warning);

        log::debug!("runtime started");

        Self { closed: false }
    }

    /// Returns the number of orphaned tasks currently retained.
    pub fn orphans(&self) -> usize {
        registry().len()
    }

    /// Tears the runtime down and returns how many orphans were destroyed.
    pub fn shutdown(mut self) -> usize {
        self.closed = true;
        teardown()
    }
}

impl Drop for Runtime {
    /// Force-destroys every retained orphan.
    fn drop(&mut self) {
        if !self.closed {
            teardown();
        }
    }
}

fn teardown() -> usize {
    let destroyed = registry().teardown();

    log::debug!("runtime shut down, {destroyed} orphans destroyed");

    destroyed
}
