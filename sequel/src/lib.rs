//! # Sequel
//!
//! **Sequel** lets code that waits on callback-driven events read as plain
//! sequential code. A computation is an `async` block that runs eagerly on
//! the calling stack until it has to wait, suspends, and is resumed in
//! place, synchronously, by whatever fires the event it waits on.
//!
//! There is no scheduler, no thread pool and no cancellation:
//!
//! - [`launch`] starts a computation and returns its owning [`Task`]
//! - [`bridge`] turns any "call me back with a value" API into a
//!   suspension point fed by a one-shot [`Resolver`]
//! - awaiting a [`Task`] from inside another computation chains the two;
//!   the inner completion resumes the outer one on the same stack
//! - [`Task::drive`] waits for a task from top-level code by pumping the
//!   event sources through a caller-supplied predicate
//! - a [`Task`] dropped before completion is retained as an orphan until
//!   the [`Runtime`] shuts down, so late events never touch freed memory
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::{Arc, Mutex};
//!
//! let pending = Arc::new(Mutex::new(None));
//! let register = pending.clone();
//!
//! let runtime = sequel::RuntimeBuilder::new().build();
//!
//! let inner = async move {
//!     sequel::bridge(move |resolver| *register.lock().unwrap() = Some(resolver)).await
//! };
//!
//! let mut task = sequel::launch(async move {
//!     let id = sequel::launch(async { Ok(1) }).await?;
//!     let w = sequel::launch(inner).await?;
//!
//!     Ok(id * 10 + w)
//! });
//!
//! let result = task.drive(|| {
//!     if let Some(resolver) = pending.lock().unwrap().take() {
//!         resolver.resolve(2);
//!     }
//!     true
//! });
//!
//! assert_eq!(result.unwrap(), 12);
//! runtime.shutdown();
//! ```
//!
//! ## Modules
//!
//! - [`task`] — Frames, task handles and their identifiers
//!
//! ## Getting Started
//!
//! Add Sequel to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! sequel = { git = "https://github.com/Nebula-ecosystem/Sequel", package = "sequel" }
//! ```

mod bridge;
mod error;
mod runtime;

pub use bridge::{Bridge, Resolver, bridge};
pub use error::{BoxError, Error, Result};
pub use runtime::Runtime;
pub use runtime::builder::RuntimeBuilder;
pub use runtime::orphans::{is_orphaned, orphan_count};
pub use runtime::task;
pub use runtime::task::{Task, TaskId, launch};
