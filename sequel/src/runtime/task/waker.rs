use crate::runtime::task::Frame;

use std::mem;
use std::sync::Weak;
use std::task::{RawWaker, RawWakerVTable, Waker};

/// Returns the `RawWakerVTable` for a frame of type `T`.
///
/// # Safety
///
/// All functions in the vtable must uphold the invariants required
/// by [`RawWaker`]: the data pointer always comes from `Weak::into_raw`
/// and every clone owns exactly one weak count.
fn vtable<T: Send + 'static>() -> &'static RawWakerVTable {
    &RawWakerVTable::new(
        clone_raw::<T>,
        wake_raw::<T>,
        wake_by_ref_raw::<T>,
        drop_raw::<T>,
    )
}

/// Creates the continuation [`Waker`] of a frame.
///
/// The waker holds a **weak** reference: it never keeps the frame
/// alive. Waking after the frame was destroyed does nothing, which is
/// what makes late resolvers of discarded tasks harmless.
pub(crate) fn make_waker<T: Send + 'static>(frame: Weak<Frame<T>>) -> Waker {
    unsafe {
        Waker::from_raw(RawWaker::new(
            Weak::into_raw(frame) as *const (),
            vtable::<T>(),
        ))
    }
}

/// Clones the raw waker, adding one weak count.
fn clone_raw<T: Send + 'static>(ptr: *const ()) -> RawWaker {
    let weak = unsafe { Weak::<Frame<T>>::from_raw(ptr as *const Frame<T>) };
    let cloned = weak.clone();
    mem::forget(weak);

    RawWaker::new(Weak::into_raw(cloned) as *const (), vtable::<T>())
}

/// Wakes the frame and consumes the waker.
fn wake_raw<T: Send + 'static>(ptr: *const ()) {
    let weak = unsafe { Weak::<Frame<T>>::from_raw(ptr as *const Frame<T>) };

    if let Some(frame) = weak.upgrade() {
        frame.wake();
    }
}

/// Wakes the frame without consuming the waker.
fn wake_by_ref_raw<T: Send + 'static>(ptr: *const ()) {
    let weak = unsafe { Weak::<Frame<T>>::from_raw(ptr as *const Frame<T>) };

    if let Some(frame) = weak.upgrade() {
        frame.wake();
    }

    mem::forget(weak);
}

/// Drops the raw waker, releasing its weak count.
fn drop_raw<T: Send + 'static>(ptr: *const ()) {
    unsafe { Weak::<Frame<T>>::from_raw(ptr as *const Frame<T>) };
}
