//! Popup lifecycle: construction, size negotiation, placement, the
//! close-on-blur policy and teardown.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use perch_core::geometry::{OffsetRect, Rect};
//! use perch_core::popup::{Collaborators, PopupOptions, PopupView};
//! use perch_core::sim::{ScriptedSurface, SimContent, StaticWindow};
//!
//! # async fn example() {
//! let collaborators = Collaborators {
//!     surface: Arc::new(ScriptedSurface::new(SimContent::sized(320.0, 240.0))),
//!     parent: Some(Arc::new(StaticWindow::new(Rect::new(100, 50, 1280, 800)))),
//!     anchor: None,
//!     opener: Arc::new(|url: &str| println!("open {url}")),
//!     focus: Arc::new(|| true),
//! };
//! let options = PopupOptions::new("ext-id", "popup.html", OffsetRect::new(10.0, 20.0, 30.0, 20.0));
//! let mut handle = PopupView::spawn(options, collaborators);
//! handle.destroy();
//! handle.wait_destroyed().await;
//! # }
//! ```

pub mod controller;
pub mod errors;
pub mod sizing;
pub mod types;
pub mod view;

pub use controller::PopupController;
pub use errors::SizingError;
pub use types::{CloseDecision, Collaborators, ExtensionId, PopupOptions, PopupStatus};
pub use view::{PopupHandle, PopupView};
