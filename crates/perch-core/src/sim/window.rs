use std::sync::{Arc, Mutex};

use crate::geometry::Rect;
use crate::sim::lock;
use crate::surface::{EventSink, HostWindow, SubscriptionId, WindowEvent};

struct WindowState {
    bounds: Rect,
    closed: bool,
    next_subscription: u64,
    subscribers: Vec<(SubscriptionId, EventSink<WindowEvent>)>,
    unsubscribed: Vec<SubscriptionId>,
}

/// In-memory [`HostWindow`] with fixed bounds until moved. Clones share state.
#[derive(Clone)]
pub struct StaticWindow {
    state: Arc<Mutex<WindowState>>,
}

impl StaticWindow {
    pub fn new(bounds: Rect) -> Self {
        Self {
            state: Arc::new(Mutex::new(WindowState {
                bounds,
                closed: false,
                next_subscription: 1,
                subscribers: Vec::new(),
                unsubscribed: Vec::new(),
            })),
        }
    }

    /// Move or resize the window.
    pub fn set_bounds(&self, bounds: Rect) {
        lock(&self.state).bounds = bounds;
    }

    /// Close the window, notifying every subscriber once.
    pub fn close(&self) {
        let mut guard = lock(&self.state);
        if guard.closed {
            return;
        }
        guard.closed = true;
        for (_, sink) in guard.subscribers.drain(..) {
            sink.emit(WindowEvent::Closed);
        }
    }

    pub fn subscription_count(&self) -> usize {
        lock(&self.state).subscribers.len()
    }

    pub fn unsubscribed(&self) -> Vec<SubscriptionId> {
        lock(&self.state).unsubscribed.clone()
    }
}

impl HostWindow for StaticWindow {
    fn bounds(&self) -> Rect {
        lock(&self.state).bounds
    }

    fn is_destroyed(&self) -> bool {
        lock(&self.state).closed
    }

    fn subscribe_closed(&self, sink: EventSink<WindowEvent>) -> SubscriptionId {
        let mut guard = lock(&self.state);
        let id = SubscriptionId(guard.next_subscription);
        guard.next_subscription += 1;
        if !guard.closed {
            guard.subscribers.push((id, sink));
        }
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        let mut guard = lock(&self.state);
        let before = guard.subscribers.len();
        guard.subscribers.retain(|(sub, _)| *sub != id);
        if guard.subscribers.len() < before {
            guard.unsubscribed.push(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::PopupEvent;
    use tokio::sync::mpsc;

    #[test]
    fn test_close_notifies_once() {
        let window = StaticWindow::new(Rect::new(0, 0, 800, 600));
        let (tx, mut rx) = mpsc::unbounded_channel();
        window.subscribe_closed(EventSink::new(tx));

        window.close();
        window.close();

        assert_eq!(rx.try_recv().unwrap(), PopupEvent::Parent(WindowEvent::Closed));
        assert!(rx.try_recv().is_err());
        assert!(window.is_destroyed());
    }

    #[test]
    fn test_unsubscribe_stops_notifications() {
        let window = StaticWindow::new(Rect::new(0, 0, 800, 600));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let id = window.subscribe_closed(EventSink::new(tx));

        window.unsubscribe(id);
        window.close();

        assert!(rx.try_recv().is_err());
        assert_eq!(window.unsubscribed(), vec![id]);
    }
}
