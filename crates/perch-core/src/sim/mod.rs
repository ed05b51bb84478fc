//! Scripted in-memory host.
//!
//! Stand-ins for the host's content surface and windows that behave like a
//! real host from the popup's point of view: loading emits `ContentReady`
//! (and a preferred size, if configured), scripts answer from a described
//! document, and every call is recorded for inspection. Used by the `perch`
//! CLI and by tests.

pub mod surface;
pub mod window;

pub use surface::{ScriptedSurface, SimContent};
pub use window::StaticWindow;

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lock a sim mutex. A panic while holding it cannot leave the recorded
/// state half-written, so poisoning is ignored.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
