//! Core runtime components.
//!
//! This module contains the task engine and the process-scoped state
//! around it.
//!
//! It is responsible for:
//! - running computations until they suspend or complete,
//! - resuming them when an awaited task or bridge fires,
//! - retaining discarded, unfinished computations until shutdown.
//!
//! Most users will interact with [`task::launch`], [`task::Task`] and
//! [`crate::bridge`] rather than with this module directly.

mod core;

pub(crate) mod builder;
pub(crate) mod orphans;

pub mod task;

pub use self::core::Runtime;
