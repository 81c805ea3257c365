use std::any::Any;

use thiserror::Error;

/// Boxed error type carried by a failed computation.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type produced by computations and by every consumption of a task.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced when consuming a task or a bridge.
#[derive(Debug, Error)]
pub enum Error {
    /// The computation returned an error instead of a value.
    #[error("computation failed: {0}")]
    Failed(#[source] BoxError),

    /// The computation panicked while it was being polled.
    #[error("computation panicked: {0}")]
    Panicked(String),

    /// The frame reported completion but its result slot was never filled.
    #[error("task completed without storing a result")]
    EmptyResult,

    /// The driver predicate stopped the pump before the task completed.
    #[error("driver stopped before the task completed")]
    Stopped,

    /// The result of this task has already been extracted.
    #[error("task result already consumed")]
    Consumed,

    /// The resolver of a bridge was dropped without delivering a value.
    #[error("resolver dropped without delivering a value")]
    Abandoned,
}

impl Error {
    /// Wraps an arbitrary error as a computation failure.
    ///
    /// A `sequel::Error` passed through here is returned unchanged, so an
    /// error re-raised from a nested task keeps its original variant.
    pub fn failed<E>(error: E) -> Self
    where
        E: Into<BoxError>,
    {
        match error.into().downcast::<Error>() {
            Ok(inner) => *inner,
            Err(other) => Error::Failed(other),
        }
    }

    /// Builds a [`Error::Panicked`] from a panic payload.
    pub(crate) fn panicked(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };

        Error::Panicked(message)
    }

    /// Returns the underlying failure if this is [`Error::Failed`] and its
    /// source is of type `E`.
    pub fn failure<E>(&self) -> Option<&E>
    where
        E: std::error::Error + 'static,
    {
        match self {
            Error::Failed(source) => source.downcast_ref::<E>(),
            _ => None,
        }
    }
}
