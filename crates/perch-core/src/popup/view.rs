//! The per-popup task.
//!
//! A popup runs as one cooperative task: a `select!` loop over incoming
//! events, the content load, and the current step of the sizing protocol.
//! The loop exits as soon as the controller is destroyed, which drops any
//! in-flight load or measurement. Destruction is the only cancellation.

use std::time::Duration;

use futures::future::BoxFuture;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::config::{ContentTrigger, SizingConfig};
use crate::popup::controller::PopupController;
use crate::popup::errors::SizingError;
use crate::popup::sizing::{self, CONTENT_CHECK_SCRIPT, PhaseOutput, SizingPhase};
use crate::popup::types::{Collaborators, ExtensionId, PopupOptions, PopupStatus};
use crate::surface::{PopupEvent, SurfaceError, SurfaceEvent, WindowEvent};

type LoadFuture = BoxFuture<'static, Result<(), SurfaceError>>;

/// A popup that has been constructed but whose task is not running yet.
///
/// Call [`PopupView::run`] on the host's runtime, or use
/// [`PopupView::spawn`] to do both at once.
pub struct PopupView {
    controller: PopupController,
    events: mpsc::UnboundedReceiver<PopupEvent>,
    url: String,
    sizing: SizingConfig,
    trigger: ContentTrigger,
    load: Option<LoadFuture>,
    phase: SizingPhase,
}

impl PopupView {
    /// Build a popup: snapshot the anchor and subscribe to all events.
    ///
    /// Never fails. Loading starts when the task runs.
    pub fn new(options: PopupOptions, collaborators: Collaborators) -> (Self, PopupHandle) {
        let PopupOptions {
            extension_id,
            url,
            anchor_offset,
            sizing,
            trigger,
        } = options;

        info!(
            event = "core.popup.create_started",
            extension_id = %extension_id,
            url = %url,
            trigger = %trigger,
            strategy = %sizing.strategy,
            settle_delay_ms = sizing.settle_delay_ms
        );

        let (tx, rx) = mpsc::unbounded_channel();
        let (status_tx, status_rx) = watch::channel(PopupStatus::default());
        let controller = PopupController::new(
            extension_id.clone(),
            anchor_offset,
            collaborators,
            &tx,
            status_tx,
        );

        let view = Self {
            controller,
            events: rx,
            url,
            sizing,
            trigger,
            load: None,
            phase: SizingPhase::Idle,
        };
        let handle = PopupHandle {
            identity: extension_id,
            events: tx,
            status: status_rx,
        };
        (view, handle)
    }

    /// Build a popup and run it on the current tokio runtime.
    pub fn spawn(options: PopupOptions, collaborators: Collaborators) -> PopupHandle {
        let (view, handle) = Self::new(options, collaborators);
        // Detached: the task ends on its own once the popup is destroyed.
        tokio::spawn(view.run());
        debug!(
            event = "core.popup.task_spawned",
            extension_id = %handle.identity
        );
        handle
    }

    pub fn controller(&self) -> &PopupController {
        &self.controller
    }

    /// Drive the popup until it is destroyed.
    pub async fn run(mut self) {
        self.load = self
            .controller
            .live_surface()
            .map(|surface| surface.load_url(&self.url));

        while !self.controller.is_destroyed() {
            tokio::select! {
                event = self.events.recv() => match event {
                    Some(event) => self.dispatch(event),
                    None => {
                        debug!(
                            event = "core.popup.event_channel_closed",
                            extension_id = %self.controller.identity()
                        );
                        self.controller.destroy();
                    }
                },
                result = wait_load(&mut self.load) => {
                    self.load = None;
                    self.on_load_finished(result);
                }
                output = self.phase.advance() => {
                    self.phase = SizingPhase::Idle;
                    self.on_phase_output(output);
                }
            }
        }

        if !self.phase.is_idle() || self.load.is_some() {
            debug!(
                event = "core.popup.pending_work_dropped",
                extension_id = %self.controller.identity(),
                phase = self.phase.name(),
                loading = self.load.is_some()
            );
        }
        info!(
            event = "core.popup.run_completed",
            extension_id = %self.controller.identity()
        );
    }

    fn dispatch(&mut self, event: PopupEvent) {
        match event {
            PopupEvent::Surface(SurfaceEvent::PreferredSizeChanged(size)) => {
                self.controller.on_preferred_size(size);
                // Live sizing supersedes any poll in flight. An empty-content
                // check still runs to completion.
                if matches!(
                    self.phase,
                    SizingPhase::Settling(_) | SizingPhase::Measuring(_)
                ) {
                    self.phase = SizingPhase::Idle;
                }
            }
            PopupEvent::Surface(SurfaceEvent::ContentReady) => {
                if self.trigger == ContentTrigger::ReadySignal {
                    self.begin_sizing();
                }
            }
            PopupEvent::Surface(SurfaceEvent::DevToolsClosed)
            | PopupEvent::Surface(SurfaceEvent::LostFocus) => {
                let decision = self.controller.maybe_close();
                debug!(
                    event = "core.popup.close_policy_evaluated",
                    extension_id = %self.controller.identity(),
                    decision = ?decision
                );
            }
            PopupEvent::Surface(SurfaceEvent::Closed) => {
                self.controller.destroy();
            }
            PopupEvent::Surface(SurfaceEvent::NewWindowRequested { url }) => {
                self.controller.open_window(&url);
            }
            PopupEvent::Parent(WindowEvent::Closed) => {
                info!(
                    event = "core.popup.parent_closed",
                    extension_id = %self.controller.identity()
                );
                self.controller.destroy();
            }
            PopupEvent::DestroyRequested => {
                self.controller.destroy();
            }
        }
    }

    fn on_load_finished(&mut self, result: Result<(), SurfaceError>) {
        if self.controller.is_destroyed() {
            return;
        }

        match &result {
            Ok(()) => debug!(
                event = "core.popup.load_completed",
                extension_id = %self.controller.identity(),
                url = %self.url
            ),
            // The surface may be showing an error page; keep going.
            Err(e) => warn!(
                event = "core.popup.load_failed",
                extension_id = %self.controller.identity(),
                url = %self.url,
                error = %e
            ),
        }

        if self.trigger != ContentTrigger::LoadCheck {
            return;
        }
        if let Some(surface) = self.controller.live_surface() {
            self.phase =
                SizingPhase::CheckingContent(surface.evaluate_script(CONTENT_CHECK_SCRIPT));
        }
    }

    fn begin_sizing(&mut self) {
        if !self.phase.is_idle() {
            debug!(
                event = "core.popup.sizing_restarted",
                extension_id = %self.controller.identity(),
                phase = self.phase.name()
            );
        }
        self.phase = if self.controller.begin_sizing() {
            let delay = Duration::from_millis(self.sizing.settle_delay_ms);
            SizingPhase::Settling(Box::pin(tokio::time::sleep(delay)))
        } else {
            SizingPhase::Idle
        };
    }

    fn on_phase_output(&mut self, output: PhaseOutput) {
        if self.controller.is_destroyed() {
            return;
        }

        match output {
            PhaseOutput::ContentChecked(Ok(value)) => {
                if sizing::parse_content_check(&value) {
                    self.begin_sizing();
                } else {
                    info!(
                        event = "core.popup.empty_content",
                        extension_id = %self.controller.identity(),
                        url = %self.url
                    );
                    self.controller.destroy();
                }
            }
            PhaseOutput::ContentChecked(Err(e)) => {
                warn!(
                    event = "core.popup.content_check_failed",
                    extension_id = %self.controller.identity(),
                    error = %e
                );
                self.begin_sizing();
            }
            PhaseOutput::Settled => {
                if self.controller.is_live_sizing() {
                    return;
                }
                if let Some(surface) = self.controller.live_surface() {
                    let script = self.sizing.strategy.script();
                    self.phase = SizingPhase::Measuring(surface.evaluate_script(script));
                }
            }
            PhaseOutput::Measured(result) => {
                let measured = result
                    .map_err(SizingError::from)
                    .and_then(|value| sizing::parse_measurement(self.sizing.strategy, value));
                match measured {
                    Ok(size) => {
                        self.controller.apply_measurement(size);
                    }
                    // Stay hidden at the placeholder; the next ready signal
                    // or live size resolves it.
                    Err(e) => warn!(
                        event = "core.popup.measurement_failed",
                        extension_id = %self.controller.identity(),
                        shown = self.controller.is_shown(),
                        error = %e
                    ),
                }
            }
        }
    }
}

async fn wait_load(load: &mut Option<LoadFuture>) -> Result<(), SurfaceError> {
    match load {
        Some(fut) => fut.await,
        None => std::future::pending().await,
    }
}

/// Owner-side handle to a running popup.
#[derive(Debug, Clone)]
pub struct PopupHandle {
    identity: ExtensionId,
    events: mpsc::UnboundedSender<PopupEvent>,
    status: watch::Receiver<PopupStatus>,
}

impl PopupHandle {
    pub fn identity(&self) -> &ExtensionId {
        &self.identity
    }

    /// Latest published status.
    pub fn status(&self) -> PopupStatus {
        *self.status.borrow()
    }

    pub fn is_destroyed(&self) -> bool {
        self.status.borrow().destroyed
    }

    /// Ask the popup to tear itself down. Safe to call repeatedly.
    pub fn destroy(&self) {
        if self.events.send(PopupEvent::DestroyRequested).is_err() {
            debug!(
                event = "core.popup.destroy_after_exit",
                extension_id = %self.identity
            );
        }
    }

    /// Resolve once the popup is destroyed or its task is gone.
    pub async fn wait_destroyed(&mut self) -> PopupStatus {
        let waited = self
            .status
            .wait_for(|status| status.destroyed)
            .await
            .map(|status| *status);
        waited.unwrap_or_else(|_| *self.status.borrow())
    }

    /// A receiver that sees every status change.
    pub fn subscribe(&self) -> watch::Receiver<PopupStatus> {
        self.status.clone()
    }
}
