//! Collaborator traits the popup is built on.
//!
//! The host implements these over its real window and web-content
//! primitives. Calls are infallible by contract: a collaborator that has
//! been torn down reports it through `is_destroyed` and ignores the call.

use futures::future::BoxFuture;
use serde_json::Value;

use crate::geometry::Rect;
use crate::surface::errors::SurfaceError;
use crate::surface::types::{EventSink, SubscriptionId, SurfaceEvent, SurfaceEventKind, WindowEvent};

/// The embeddable rendering surface a popup owns.
///
/// Surfaces are handed to the popup hidden and isolated from the parent
/// page; the popup decides when to show them.
pub trait ContentSurface: Send + Sync {
    /// Navigate to `url`. Resolves once loading finished or failed.
    fn load_url(&self, url: &str) -> BoxFuture<'static, Result<(), SurfaceError>>;

    /// Evaluate `script` in the loaded document and return its value.
    fn evaluate_script(&self, script: &str) -> BoxFuture<'static, Result<Value, SurfaceError>>;

    fn bounds(&self) -> Rect;

    fn set_bounds(&self, bounds: Rect);

    fn show(&self);

    fn is_visible(&self) -> bool;

    fn is_devtools_opened(&self) -> bool;

    fn close_devtools(&self);

    fn is_destroyed(&self) -> bool;

    /// Release the surface. Called at most once by the popup.
    fn destroy(&self);

    fn subscribe(&self, kind: SurfaceEventKind, sink: EventSink<SurfaceEvent>) -> SubscriptionId;

    fn unsubscribe(&self, id: SubscriptionId);
}

/// A parent or anchor window.
pub trait HostWindow: Send + Sync {
    fn bounds(&self) -> Rect;

    fn is_destroyed(&self) -> bool;

    fn subscribe_closed(&self, sink: EventSink<WindowEvent>) -> SubscriptionId;

    fn unsubscribe(&self, id: SubscriptionId);
}

/// Opens URLs the popup content wants in a new top-level window.
pub trait WindowOpener: Send + Sync {
    fn open_window(&self, url: &str);
}

impl<F> WindowOpener for F
where
    F: Fn(&str) + Send + Sync,
{
    fn open_window(&self, url: &str) {
        self(url)
    }
}

/// Host-wide focus query.
pub trait FocusQuery: Send + Sync {
    /// Whether any window of the application currently holds focus.
    fn focused_window_exists(&self) -> bool;
}

impl<F> FocusQuery for F
where
    F: Fn() -> bool + Send + Sync,
{
    fn focused_window_exists(&self) -> bool {
        self()
    }
}
