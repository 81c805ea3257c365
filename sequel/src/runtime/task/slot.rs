use crate::error::{Error, Result};

use std::mem;

/// Storage for the outcome of a computation.
///
/// A slot starts `Empty` and is filled at most once, when its frame
/// completes. It is dropped together with the frame, along with whatever
/// it still holds.
pub(crate) enum ResultSlot<T> {
    /// No outcome has been stored.
    Empty,

    /// The computation returned a value.
    Value(T),

    /// The computation failed or panicked.
    Error(Error),
}

impl<T> ResultSlot<T> {
    /// Stores the outcome of the computation.
    ///
    /// A filled slot is never overwritten; a second outcome is dropped.
    pub(crate) fn set(&mut self, result: Result<T>) {
        if !self.is_empty() {
            log::warn!("result slot already filled, dropping second outcome");
            return;
        }

        *self = match result {
            Ok(value) => ResultSlot::Value(value),
            Err(error) => ResultSlot::Error(error),
        };
    }

    /// Moves the outcome out of the slot, leaving it `Empty`.
    ///
    /// An empty slot yields [`Error::EmptyResult`].
    pub(crate) fn take(&mut self) -> Result<T> {
        match mem::replace(self, ResultSlot::Empty) {
            ResultSlot::Value(value) => Ok(value),
            ResultSlot::Error(error) => Err(error),
            ResultSlot::Empty => Err(Error::EmptyResult),
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        matches!(self, ResultSlot::Empty)
    }
}
