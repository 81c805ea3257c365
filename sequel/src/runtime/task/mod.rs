//! Suspendable computations and their owning handles.
//!
//! This module defines the frame that carries a computation across its
//! suspension points and the [`Task`] handle that owns it.
//!
//! It includes:
//! - the frame state machine and its result slot,
//! - continuation wakers that resume a frame synchronously,
//! - the move-only handle used to await or drive a computation.
//!
//! Most users only need [`launch`] and [`Task`].

pub(crate) mod handle;
pub(crate) mod slot;
pub(crate) mod state;
pub(crate) mod waker;

pub(crate) use self::core::Frame;

pub(crate) mod core;

pub use self::core::{TaskId, launch};
pub use handle::Task;
