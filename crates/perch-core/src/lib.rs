//! perch-core: Core library for anchored extension popups
//!
//! This library owns the lifecycle of a single transient popup surface that
//! is anchored to a parent window: content-size negotiation, placement,
//! the close-on-blur policy and idempotent teardown. Rendering, navigation
//! and window primitives belong to the host and are reached through the
//! traits in [`surface`].
//!
//! # Main Entry Points
//!
//! - [`popup`] - Create, run and destroy a popup
//! - [`surface`] - Collaborator traits and typed events
//! - [`geometry`] - Rectangles, size clamping and placement math
//! - [`config`] - Configuration management
//! - [`sim`] - Scripted in-memory host for tooling and tests

pub mod config;
pub mod errors;
pub mod geometry;
pub mod logging;
pub mod popup;
pub mod sim;
pub mod surface;

// Re-export commonly used types at crate root for convenience
pub use config::{ContentTrigger, MeasureStrategy, PerchConfig};
pub use errors::{PerchError, PerchResult};
pub use geometry::{OffsetRect, PixelSize, Point, Rect, Size};
pub use popup::{
    CloseDecision, Collaborators, ExtensionId, PopupController, PopupHandle, PopupOptions,
    PopupStatus, PopupView,
};
pub use surface::{
    ContentSurface, EventSink, FocusQuery, HostWindow, PopupEvent, SubscriptionId, SurfaceError,
    SurfaceEvent, SurfaceEventKind, WindowEvent, WindowOpener,
};

// Re-export logging initialization
pub use logging::{init_logging, log_app_error, log_app_shutdown, log_app_startup};
