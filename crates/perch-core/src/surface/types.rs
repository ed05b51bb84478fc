use std::fmt;
use std::marker::PhantomData;

use serde::Serialize;
use tokio::sync::mpsc;

use crate::geometry::Size;

/// Token returned by a subscription, used to release it later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SubscriptionId(pub u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// The event kinds a content surface can be subscribed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceEventKind {
    PreferredSizeChanged,
    ContentReady,
    DevToolsClosed,
    Closed,
    LostFocus,
    NewWindowRequested,
}

impl SurfaceEventKind {
    /// Every kind the popup listens to, in subscription order.
    pub const ALL: [SurfaceEventKind; 6] = [
        SurfaceEventKind::PreferredSizeChanged,
        SurfaceEventKind::ContentReady,
        SurfaceEventKind::DevToolsClosed,
        SurfaceEventKind::Closed,
        SurfaceEventKind::LostFocus,
        SurfaceEventKind::NewWindowRequested,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SurfaceEventKind::PreferredSizeChanged => "preferred_size_changed",
            SurfaceEventKind::ContentReady => "content_ready",
            SurfaceEventKind::DevToolsClosed => "devtools_closed",
            SurfaceEventKind::Closed => "closed",
            SurfaceEventKind::LostFocus => "lost_focus",
            SurfaceEventKind::NewWindowRequested => "new_window_requested",
        }
    }
}

impl fmt::Display for SurfaceEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Notifications emitted by a content surface.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    /// Authoritative content size from the host. Hosts may never send this.
    PreferredSizeChanged(Size),
    /// The document finished its initial layout. May repeat across navigations.
    ContentReady,
    DevToolsClosed,
    Closed,
    /// The window hosting the surface lost focus.
    LostFocus,
    /// The content asked to open a new top-level window. Subscribing to this
    /// kind suppresses the host's default handling.
    NewWindowRequested { url: String },
}

impl SurfaceEvent {
    pub fn kind(&self) -> SurfaceEventKind {
        match self {
            SurfaceEvent::PreferredSizeChanged(_) => SurfaceEventKind::PreferredSizeChanged,
            SurfaceEvent::ContentReady => SurfaceEventKind::ContentReady,
            SurfaceEvent::DevToolsClosed => SurfaceEventKind::DevToolsClosed,
            SurfaceEvent::Closed => SurfaceEventKind::Closed,
            SurfaceEvent::LostFocus => SurfaceEventKind::LostFocus,
            SurfaceEvent::NewWindowRequested { .. } => SurfaceEventKind::NewWindowRequested,
        }
    }
}

/// Notifications emitted by a parent or anchor window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowEvent {
    Closed,
}

/// Everything the popup task reacts to, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum PopupEvent {
    Surface(SurfaceEvent),
    Parent(WindowEvent),
    /// Explicit teardown requested by the popup's owner.
    DestroyRequested,
}

impl From<SurfaceEvent> for PopupEvent {
    fn from(event: SurfaceEvent) -> Self {
        PopupEvent::Surface(event)
    }
}

impl From<WindowEvent> for PopupEvent {
    fn from(event: WindowEvent) -> Self {
        PopupEvent::Parent(event)
    }
}

/// Delivery end handed to a collaborator when the popup subscribes.
///
/// The collaborator keeps the sink for as long as the subscription lives and
/// calls [`EventSink::emit`] whenever the event fires.
pub struct EventSink<E> {
    tx: mpsc::UnboundedSender<PopupEvent>,
    _event: PhantomData<fn(E)>,
}

impl<E: Into<PopupEvent>> EventSink<E> {
    pub(crate) fn new(tx: mpsc::UnboundedSender<PopupEvent>) -> Self {
        Self {
            tx,
            _event: PhantomData,
        }
    }

    /// Deliver an event. Returns false once the popup task has exited.
    pub fn emit(&self, event: E) -> bool {
        self.tx.send(event.into()).is_ok()
    }

    /// Whether the popup task is still receiving.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl<E> Clone for EventSink<E> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            _event: PhantomData,
        }
    }
}

impl<E> fmt::Debug for EventSink<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSink")
            .field("closed", &self.tx.is_closed())
            .finish()
    }
}
