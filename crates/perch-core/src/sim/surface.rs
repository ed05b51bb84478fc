use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::future::{self, BoxFuture};
use serde_json::{Value, json};

use crate::geometry::{Rect, Size};
use crate::popup::sizing::{CONTENT_CHECK_SCRIPT, LAYOUT_MAXIMA_SCRIPT, ROOT_BOUNDING_BOX_SCRIPT};
use crate::sim::lock;
use crate::surface::{
    ContentSurface, EventSink, SubscriptionId, SurfaceError, SurfaceEvent, SurfaceEventKind,
};

/// The document a [`ScriptedSurface`] pretends to have loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct SimContent {
    /// Box reported for the root element.
    pub root: Size,
    /// Offset boxes of the body's direct children.
    pub children: Vec<Size>,
}

impl SimContent {
    pub fn sized(width: f64, height: f64) -> Self {
        Self {
            root: Size::new(width, height),
            children: vec![Size::new(width, height)],
        }
    }

    /// A document whose body has no child nodes.
    pub fn empty() -> Self {
        Self {
            root: Size::new(0.0, 0.0),
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<Size>) -> Self {
        self.children = children;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

struct SurfaceState {
    bounds: Rect,
    visible: bool,
    show_calls: u32,
    devtools_open: bool,
    destroyed: bool,
    destroy_calls: u32,
    content: SimContent,
    live_size: Option<Size>,
    load_error: Option<String>,
    load_delay: Duration,
    script_delay: Duration,
    next_subscription: u64,
    subscriptions: Vec<(SubscriptionId, SurfaceEventKind, EventSink<SurfaceEvent>)>,
    unsubscribed: Vec<SubscriptionId>,
    loaded_urls: Vec<String>,
    scripts: Vec<String>,
}

impl SurfaceState {
    fn deliver(&self, event: &SurfaceEvent) -> usize {
        let kind = event.kind();
        self.subscriptions
            .iter()
            .filter(|(_, k, _)| *k == kind)
            .filter(|(_, _, sink)| sink.emit(event.clone()))
            .count()
    }

    fn answer(&self, script: &str) -> Result<Value, SurfaceError> {
        let content = &self.content;
        if script == CONTENT_CHECK_SCRIPT {
            Ok(Value::Bool(!content.is_empty()))
        } else if script == LAYOUT_MAXIMA_SCRIPT {
            let width = content
                .children
                .iter()
                .map(|c| c.width)
                .fold(content.root.width, f64::max);
            let height = content
                .children
                .iter()
                .map(|c| c.height)
                .fold(content.root.height, f64::max);
            Ok(json!({ "width": width, "height": height }))
        } else if script == ROOT_BOUNDING_BOX_SCRIPT {
            Ok(json!({
                "width": content.root.width,
                "height": content.root.height,
                "childWidths": content.children.iter().map(|c| c.width).collect::<Vec<_>>(),
                "childHeights": content.children.iter().map(|c| c.height).collect::<Vec<_>>(),
            }))
        } else {
            Err(SurfaceError::ScriptFailed {
                message: "unknown script".to_string(),
            })
        }
    }
}

/// In-memory [`ContentSurface`]. Clones share state.
#[derive(Clone)]
pub struct ScriptedSurface {
    state: Arc<Mutex<SurfaceState>>,
}

impl ScriptedSurface {
    pub fn new(content: SimContent) -> Self {
        Self {
            state: Arc::new(Mutex::new(SurfaceState {
                bounds: Rect::default(),
                visible: false,
                show_calls: 0,
                devtools_open: false,
                destroyed: false,
                destroy_calls: 0,
                content,
                live_size: None,
                load_error: None,
                load_delay: Duration::ZERO,
                script_delay: Duration::ZERO,
                next_subscription: 1,
                subscriptions: Vec::new(),
                unsubscribed: Vec::new(),
                loaded_urls: Vec::new(),
                scripts: Vec::new(),
            })),
        }
    }

    /// Emit a preferred size right after content becomes ready.
    pub fn with_live_size(self, size: Size) -> Self {
        lock(&self.state).live_size = Some(size);
        self
    }

    /// Make loading fail with `message` (content still becomes ready).
    pub fn with_load_error(self, message: impl Into<String>) -> Self {
        lock(&self.state).load_error = Some(message.into());
        self
    }

    pub fn with_load_delay(self, delay: Duration) -> Self {
        lock(&self.state).load_delay = delay;
        self
    }

    /// Delay every script result, leaving measurements in flight for a while.
    pub fn with_script_delay(self, delay: Duration) -> Self {
        lock(&self.state).script_delay = delay;
        self
    }

    /// Swap the document, as after an in-popup navigation.
    pub fn set_content(&self, content: SimContent) {
        lock(&self.state).content = content;
    }

    /// Deliver `event` to its subscribers. Returns how many received it.
    pub fn emit(&self, event: SurfaceEvent) -> usize {
        lock(&self.state).deliver(&event)
    }

    pub fn open_devtools(&self) {
        lock(&self.state).devtools_open = true;
    }

    pub fn subscription_count(&self) -> usize {
        lock(&self.state).subscriptions.len()
    }

    pub fn subscription_for(&self, kind: SurfaceEventKind) -> Option<SubscriptionId> {
        lock(&self.state)
            .subscriptions
            .iter()
            .find(|(_, k, _)| *k == kind)
            .map(|(id, _, _)| *id)
    }

    pub fn unsubscribed(&self) -> Vec<SubscriptionId> {
        lock(&self.state).unsubscribed.clone()
    }

    pub fn destroy_calls(&self) -> u32 {
        lock(&self.state).destroy_calls
    }

    pub fn show_calls(&self) -> u32 {
        lock(&self.state).show_calls
    }

    pub fn loaded_urls(&self) -> Vec<String> {
        lock(&self.state).loaded_urls.clone()
    }

    pub fn scripts(&self) -> Vec<String> {
        lock(&self.state).scripts.clone()
    }
}

impl ContentSurface for ScriptedSurface {
    fn load_url(&self, url: &str) -> BoxFuture<'static, Result<(), SurfaceError>> {
        let state = Arc::clone(&self.state);
        let url = url.to_string();
        Box::pin(async move {
            let delay = lock(&state).load_delay;
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            let mut guard = lock(&state);
            if guard.destroyed {
                return Err(SurfaceError::Destroyed);
            }
            guard.loaded_urls.push(url.clone());
            guard.deliver(&SurfaceEvent::ContentReady);
            if let Some(size) = guard.live_size {
                guard.deliver(&SurfaceEvent::PreferredSizeChanged(size));
            }
            match guard.load_error.clone() {
                Some(message) => Err(SurfaceError::LoadFailed { url, message }),
                None => Ok(()),
            }
        })
    }

    fn evaluate_script(&self, script: &str) -> BoxFuture<'static, Result<Value, SurfaceError>> {
        let mut guard = lock(&self.state);
        guard.scripts.push(script.to_string());
        let result = if guard.destroyed {
            Err(SurfaceError::Destroyed)
        } else {
            guard.answer(script)
        };
        let delay = guard.script_delay;
        if delay.is_zero() {
            return Box::pin(future::ready(result));
        }
        Box::pin(async move {
            tokio::time::sleep(delay).await;
            result
        })
    }

    fn bounds(&self) -> Rect {
        lock(&self.state).bounds
    }

    fn set_bounds(&self, bounds: Rect) {
        lock(&self.state).bounds = bounds;
    }

    fn show(&self) {
        let mut guard = lock(&self.state);
        guard.visible = true;
        guard.show_calls += 1;
    }

    fn is_visible(&self) -> bool {
        lock(&self.state).visible
    }

    fn is_devtools_opened(&self) -> bool {
        lock(&self.state).devtools_open
    }

    fn close_devtools(&self) {
        lock(&self.state).devtools_open = false;
    }

    fn is_destroyed(&self) -> bool {
        lock(&self.state).destroyed
    }

    fn destroy(&self) {
        let mut guard = lock(&self.state);
        guard.destroyed = true;
        guard.visible = false;
        guard.destroy_calls += 1;
        guard.subscriptions.clear();
    }

    fn subscribe(&self, kind: SurfaceEventKind, sink: EventSink<SurfaceEvent>) -> SubscriptionId {
        let mut guard = lock(&self.state);
        let id = SubscriptionId(guard.next_subscription);
        guard.next_subscription += 1;
        guard.subscriptions.push((id, kind, sink));
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        let mut guard = lock(&self.state);
        let before = guard.subscriptions.len();
        guard.subscriptions.retain(|(sub, _, _)| *sub != id);
        if guard.subscriptions.len() < before {
            guard.unsubscribed.push(id);
        }
    }
}
