use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

use crate::geometry::{MIN_SIZE, OffsetRect, PixelSize, Rect, Size, clamp_size, popup_origin};
use crate::popup::types::{CloseDecision, Collaborators, ExtensionId, PopupStatus};
use crate::surface::{
    ContentSurface, EventSink, FocusQuery, HostWindow, PopupEvent, SubscriptionId,
    SurfaceEventKind, WindowOpener,
};

/// Lifecycle, sizing and placement state of one popup.
///
/// Every operation is synchronous; the asynchronous parts of the protocol
/// (loading, settling, measuring) live in [`super::PopupView`], which calls
/// back in here after each suspend point. Once destroyed, all operations are
/// no-ops.
pub struct PopupController {
    identity: ExtensionId,
    surface: Option<Arc<dyn ContentSurface>>,
    parent: Option<Arc<dyn HostWindow>>,
    opener: Arc<dyn WindowOpener>,
    focus: Arc<dyn FocusQuery>,
    anchor_bounds: Option<Rect>,
    anchor_offset: OffsetRect,
    surface_subscriptions: Vec<(SurfaceEventKind, SubscriptionId)>,
    parent_subscription: Option<SubscriptionId>,
    using_live_sizing: bool,
    shown: bool,
    destroyed: bool,
    status: watch::Sender<PopupStatus>,
}

impl PopupController {
    /// Take ownership of the surface and subscribe to every event the popup
    /// reacts to. Events are delivered through `events`.
    pub(crate) fn new(
        identity: ExtensionId,
        anchor_offset: OffsetRect,
        collaborators: Collaborators,
        events: &mpsc::UnboundedSender<PopupEvent>,
        status: watch::Sender<PopupStatus>,
    ) -> Self {
        let Collaborators {
            surface,
            parent,
            anchor,
            opener,
            focus,
        } = collaborators;

        // Snapshot only; the anchor is not tracked after this.
        let anchor_bounds = anchor.as_ref().or(parent.as_ref()).map(|w| w.bounds());

        let surface_subscriptions = SurfaceEventKind::ALL
            .iter()
            .map(|&kind| (kind, surface.subscribe(kind, EventSink::new(events.clone()))))
            .collect::<Vec<_>>();
        let parent_subscription = parent
            .as_ref()
            .map(|p| p.subscribe_closed(EventSink::new(events.clone())));

        info!(
            event = "core.popup.create_completed",
            extension_id = %identity,
            anchor_bounds = ?anchor_bounds,
            offset_x = anchor_offset.x,
            offset_y = anchor_offset.y,
            subscriptions = surface_subscriptions.len() + usize::from(parent_subscription.is_some())
        );

        let controller = Self {
            identity,
            surface: Some(surface),
            parent,
            opener,
            focus,
            anchor_bounds,
            anchor_offset,
            surface_subscriptions,
            parent_subscription,
            using_live_sizing: false,
            shown: false,
            destroyed: false,
            status,
        };
        controller.publish_status();
        controller
    }

    pub fn identity(&self) -> &ExtensionId {
        &self.identity
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn is_shown(&self) -> bool {
        self.shown
    }

    pub fn is_live_sizing(&self) -> bool {
        self.using_live_sizing
    }

    pub fn anchor_bounds(&self) -> Option<Rect> {
        self.anchor_bounds
    }

    /// The owned surface, if the popup is alive and the surface not torn down.
    pub fn live_surface(&self) -> Option<&Arc<dyn ContentSurface>> {
        if self.destroyed {
            return None;
        }
        self.surface.as_ref().filter(|s| !s.is_destroyed())
    }

    pub fn status(&self) -> PopupStatus {
        PopupStatus {
            bounds: self.surface.as_ref().map(|s| s.bounds()).unwrap_or_default(),
            shown: self.shown,
            live_sizing: self.using_live_sizing,
            destroyed: self.destroyed,
        }
    }

    fn publish_status(&self) {
        let status = self.status();
        self.status.send_replace(status);
    }

    /// Handle an authoritative size from the host.
    ///
    /// Latches live sizing for the rest of the popup's life, so later
    /// measurements are discarded.
    pub fn on_preferred_size(&mut self, size: Size) {
        if self.destroyed {
            debug!(
                event = "core.popup.stale_preferred_size",
                extension_id = %self.identity
            );
            return;
        }

        if !self.using_live_sizing {
            info!(
                event = "core.popup.live_sizing_latched",
                extension_id = %self.identity
            );
        }
        self.using_live_sizing = true;
        self.apply_size(size);
        self.show_if_hidden();
    }

    /// Start a polling run: shrink to the placeholder so the content reflows.
    ///
    /// Returns false when polling does not apply (destroyed or live-sized).
    pub fn begin_sizing(&mut self) -> bool {
        if self.destroyed || self.using_live_sizing {
            return false;
        }
        let Some(surface) = self.live_surface() else {
            return false;
        };

        let bounds = self.placed(surface.bounds().with_size(MIN_SIZE));
        surface.set_bounds(bounds);
        debug!(
            event = "core.popup.sizing_started",
            extension_id = %self.identity,
            bounds = ?bounds
        );
        self.publish_status();
        true
    }

    /// Apply a polled measurement and show the popup.
    ///
    /// Returns false if the measurement was discarded because the popup is
    /// destroyed or a live size arrived first.
    pub fn apply_measurement(&mut self, size: Size) -> bool {
        if self.destroyed || self.using_live_sizing {
            debug!(
                event = "core.popup.measurement_discarded",
                extension_id = %self.identity,
                destroyed = self.destroyed,
                live_sizing = self.using_live_sizing
            );
            return false;
        }

        self.apply_size(size);
        self.show_if_hidden();
        true
    }

    fn apply_size(&mut self, size: Size) {
        let clamped = clamp_size(size);
        let Some(surface) = self.live_surface() else {
            return;
        };

        let bounds = self.placed(surface.bounds().with_size(clamped));
        surface.set_bounds(bounds);
        debug!(
            event = "core.popup.size_applied",
            extension_id = %self.identity,
            requested_width = size.width,
            requested_height = size.height,
            width = clamped.width,
            height = clamped.height
        );
        self.publish_status();
    }

    /// Move `bounds` to the anchored origin when an anchor snapshot exists.
    fn placed(&self, bounds: Rect) -> Rect {
        match self.anchor_bounds {
            Some(anchor) => bounds.with_origin(popup_origin(anchor, self.anchor_offset)),
            None => bounds,
        }
    }

    /// Reposition the popup from the anchor snapshot, keeping its size.
    pub fn update_position(&mut self) {
        let Some(surface) = self.live_surface() else {
            return;
        };
        let Some(anchor) = self.anchor_bounds else {
            debug!(
                event = "core.popup.position_skipped",
                extension_id = %self.identity,
                reason = "no_anchor"
            );
            return;
        };

        let current = surface.bounds();
        surface.set_bounds(current.with_origin(popup_origin(anchor, self.anchor_offset)));
        self.publish_status();
    }

    /// Make the popup visible once. Later calls do nothing.
    pub fn show_if_hidden(&mut self) {
        if self.shown {
            return;
        }
        let Some(surface) = self.live_surface().cloned() else {
            return;
        };

        surface.show();
        self.shown = true;
        let PixelSize { width, height } = surface.bounds().size();
        info!(
            event = "core.popup.shown",
            extension_id = %self.identity,
            width = width,
            height = height
        );
        self.publish_status();
    }

    /// Close-on-blur policy, run on focus loss and devtools close.
    pub fn maybe_close(&mut self) -> CloseDecision {
        if self.destroyed {
            return CloseDecision::AlreadyDestroyed;
        }

        if self
            .live_surface()
            .is_some_and(|surface| surface.is_devtools_opened())
        {
            debug!(
                event = "core.popup.close_skipped",
                extension_id = %self.identity,
                reason = "devtools_open"
            );
            return CloseDecision::KeepDevToolsOpen;
        }

        // Focus went to something outside the app, e.g. a login dialog.
        if !self.focus.focused_window_exists() {
            debug!(
                event = "core.popup.close_skipped",
                extension_id = %self.identity,
                reason = "focus_outside_app"
            );
            return CloseDecision::KeepFocusOutsideApp;
        }

        self.destroy();
        CloseDecision::Closed
    }

    /// Forward a new-window request to the host opener.
    pub fn open_window(&self, url: &str) {
        if self.destroyed {
            return;
        }
        info!(
            event = "core.popup.new_window_forwarded",
            extension_id = %self.identity,
            url = url
        );
        self.opener.open_window(url);
    }

    /// Tear the popup down. Idempotent; returns true only for the call that
    /// actually released resources.
    pub fn destroy(&mut self) -> bool {
        if self.destroyed {
            return false;
        }
        self.destroyed = true;

        info!(
            event = "core.popup.destroy_started",
            extension_id = %self.identity
        );

        if let Some(parent) = self.parent.take() {
            if let Some(id) = self.parent_subscription.take() {
                if parent.is_destroyed() {
                    debug!(
                        event = "core.popup.parent_already_closed",
                        extension_id = %self.identity
                    );
                } else {
                    parent.unsubscribe(id);
                }
            }
        }

        if let Some(surface) = self.surface.take() {
            let subscriptions = std::mem::take(&mut self.surface_subscriptions);
            if surface.is_destroyed() {
                debug!(
                    event = "core.popup.surface_already_destroyed",
                    extension_id = %self.identity
                );
            } else {
                if surface.is_devtools_opened() {
                    surface.close_devtools();
                }
                // Drop Closed first so destroying the surface cannot re-enter.
                for (kind, id) in subscriptions
                    .iter()
                    .filter(|(kind, _)| *kind == SurfaceEventKind::Closed)
                    .chain(
                        subscriptions
                            .iter()
                            .filter(|(kind, _)| *kind != SurfaceEventKind::Closed),
                    )
                {
                    debug!(
                        event = "core.popup.unsubscribed",
                        extension_id = %self.identity,
                        kind = %kind,
                        subscription = %id
                    );
                    surface.unsubscribe(*id);
                }
                surface.destroy();
            }
        }

        self.status.send_modify(|status| {
            status.destroyed = true;
        });

        info!(
            event = "core.popup.destroy_completed",
            extension_id = %self.identity,
            was_shown = self.shown
        );
        true
    }
}
