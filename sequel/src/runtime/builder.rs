use super::Runtime;

/// Builder for configuring and creating the process-wide runtime scope.
///
/// `RuntimeBuilder` allows customizing runtime parameters before
/// constructing the [`Runtime`]. Currently, it supports configuring
/// when the growth of retained orphan tasks is reported.
///
/// # Examples
///
/// ```rust
/// let runtime = sequel::RuntimeBuilder::new()
///     .orphan_warning(128)
///     .build();
///
/// assert_eq!(runtime.shutdown(), 0);
/// ```
pub struct RuntimeBuilder {
    /// Warn each time the orphan count reaches a multiple of this value.
    orphan_warning: Option<usize>,
}

impl RuntimeBuilder {
    /// Creates a new `RuntimeBuilder` with default configuration.
    ///
    /// By default, no orphan warning is emitted.
    pub fn new() -> Self {
        Self {
            orphan_warning: None,
        }
    }

    /// Logs a warning every time the number of retained orphan tasks
    /// reaches a multiple of `n`.
    ///
    /// # Panics
    ///
    /// Panics if `n == 0`.
    pub fn orphan_warning(mut self, n: usize) -> Self {
        assert!(n > 0, "orphan_warning must be > 0");

        self.orphan_warning = Some(n);
        self
    }

    /// Builds the runtime with the configured options.
    ///
    /// This configures the process-wide orphan registry. Dropping the
    /// returned [`Runtime`] tears it down.
    pub fn build(self) -> Runtime {
        Runtime::new(self.orphan_warning.unwrap_or(0))
    }
}

impl Default for RuntimeBuilder {
    /// Creates a default `RuntimeBuilder`.
    fn default() -> Self {
        Self::new()
    }
}
