use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::config::{ContentTrigger, PerchConfig, SizingConfig};
use crate::geometry::{OffsetRect, Rect};
use crate::surface::{ContentSurface, FocusQuery, HostWindow, WindowOpener};

/// Opaque id of the extension that owns a popup. Used for diagnostics only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ExtensionId(String);

impl ExtensionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExtensionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ExtensionId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// What to show and where.
#[derive(Debug, Clone)]
pub struct PopupOptions {
    pub extension_id: ExtensionId,
    pub url: String,
    /// Trigger element position relative to the anchor window.
    pub anchor_offset: OffsetRect,
    pub sizing: SizingConfig,
    pub trigger: ContentTrigger,
}

impl PopupOptions {
    pub fn new(
        extension_id: impl Into<ExtensionId>,
        url: impl Into<String>,
        anchor_offset: OffsetRect,
    ) -> Self {
        Self {
            extension_id: extension_id.into(),
            url: url.into(),
            anchor_offset,
            sizing: SizingConfig::default(),
            trigger: ContentTrigger::default(),
        }
    }

    /// Take sizing and trigger settings from a loaded configuration.
    pub fn with_config(mut self, config: &PerchConfig) -> Self {
        self.sizing = config.sizing.clone();
        self.trigger = config.content.trigger;
        self
    }
}

/// The host-side objects a popup works with.
pub struct Collaborators {
    /// Hidden, isolated surface; the popup takes exclusive ownership.
    pub surface: Arc<dyn ContentSurface>,
    /// Window that spawned the popup. Closing it closes the popup.
    pub parent: Option<Arc<dyn HostWindow>>,
    /// Window whose bounds position the popup. Defaults to `parent`.
    pub anchor: Option<Arc<dyn HostWindow>>,
    pub opener: Arc<dyn WindowOpener>,
    pub focus: Arc<dyn FocusQuery>,
}

/// Snapshot of a popup's observable state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PopupStatus {
    pub bounds: Rect,
    pub shown: bool,
    pub live_sizing: bool,
    pub destroyed: bool,
}

/// Outcome of the close-on-blur policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseDecision {
    /// The popup's own devtools are open; the user is inspecting it.
    KeepDevToolsOpen,
    /// Focus left the application entirely (OS dialog, another program).
    KeepFocusOutsideApp,
    Closed,
    AlreadyDestroyed,
}
