//! Content measurement for the polling side of size negotiation.
//!
//! Hosts that never send a preferred size get sized by resizing the popup to
//! the placeholder, waiting for layout to settle and then asking the document
//! how large its content is. The scripts below are that question.

use std::future::pending;
use std::pin::Pin;

use futures::future::BoxFuture;
use serde::Deserialize;
use serde_json::Value;
use tokio::time::Sleep;

use crate::config::MeasureStrategy;
use crate::geometry::{MIN_HEIGHT, MIN_WIDTH, Size};
use crate::popup::errors::SizingError;
use crate::surface::SurfaceError;

/// True when the document body has at least one child node.
pub const CONTENT_CHECK_SCRIPT: &str =
    "document.body !== null && document.body.hasChildNodes()";

/// Largest extent across body and root, per axis.
///
/// The body alone can report a smaller box than its visible children.
pub const LAYOUT_MAXIMA_SCRIPT: &str = "(() => {
  const body = document.body;
  const root = document.documentElement;
  return {
    width: Math.max(body.scrollWidth, body.offsetWidth, root.clientWidth, root.scrollWidth, root.offsetWidth),
    height: Math.max(body.scrollHeight, body.offsetHeight, root.clientHeight, root.scrollHeight, root.offsetHeight)
  };
})()";

/// Root bounding box plus the offset extents of the body's direct children.
pub const ROOT_BOUNDING_BOX_SCRIPT: &str = "(() => {
  const rect = document.documentElement.getBoundingClientRect();
  const children = Array.from(document.body ? document.body.children : []);
  return {
    width: rect.width,
    height: rect.height,
    childWidths: children.map((child) => child.offsetWidth),
    childHeights: children.map((child) => child.offsetHeight)
  };
})()";

impl MeasureStrategy {
    pub fn script(&self) -> &'static str {
        match self {
            MeasureStrategy::LayoutMaxima => LAYOUT_MAXIMA_SCRIPT,
            MeasureStrategy::RootBoundingBox => ROOT_BOUNDING_BOX_SCRIPT,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContentBox {
    width: f64,
    height: f64,
    #[serde(default)]
    child_widths: Vec<f64>,
    #[serde(default)]
    child_heights: Vec<f64>,
}

/// Turn a measurement script result into a content size.
pub fn parse_measurement(strategy: MeasureStrategy, value: Value) -> Result<Size, SizingError> {
    let content: ContentBox = serde_json::from_value(value)?;
    if !content.width.is_finite() || !content.height.is_finite() {
        return Err(SizingError::InvalidMeasurement {
            message: format!("non-finite box {}x{}", content.width, content.height),
        });
    }

    let size = match strategy {
        MeasureStrategy::LayoutMaxima => Size::new(content.width, content.height),
        MeasureStrategy::RootBoundingBox => {
            // The root collapses to the placeholder when content overflows it.
            let width = if content.width.floor() == f64::from(MIN_WIDTH) {
                content.child_widths.iter().sum()
            } else {
                content.width
            };
            let height = if content.height.floor() == f64::from(MIN_HEIGHT) {
                content.child_heights.iter().sum()
            } else {
                content.height
            };
            Size::new(width, height)
        }
    };
    Ok(size)
}

/// Interpret the content-check script result. Anything but `true` is empty.
pub fn parse_content_check(value: &Value) -> bool {
    matches!(value, Value::Bool(true))
}

/// Where the polling protocol currently is. Owned by the popup task.
pub(crate) enum SizingPhase {
    Idle,
    CheckingContent(BoxFuture<'static, Result<Value, SurfaceError>>),
    Settling(Pin<Box<Sleep>>),
    Measuring(BoxFuture<'static, Result<Value, SurfaceError>>),
}

/// A completed suspend point of the sizing protocol.
pub(crate) enum PhaseOutput {
    ContentChecked(Result<Value, SurfaceError>),
    Settled,
    Measured(Result<Value, SurfaceError>),
}

impl SizingPhase {
    pub(crate) fn is_idle(&self) -> bool {
        matches!(self, SizingPhase::Idle)
    }

    pub(crate) fn name(&self) -> &'static str {
        match self {
            SizingPhase::Idle => "idle",
            SizingPhase::CheckingContent(_) => "checking_content",
            SizingPhase::Settling(_) => "settling",
            SizingPhase::Measuring(_) => "measuring",
        }
    }

    /// Wait for the current step to finish. Never resolves while idle.
    ///
    /// Cancel safe: the in-flight future stays in `self` when this is dropped.
    /// The caller must replace the phase after a step completes.
    pub(crate) async fn advance(&mut self) -> PhaseOutput {
        match self {
            SizingPhase::Idle => pending().await,
            SizingPhase::CheckingContent(check) => PhaseOutput::ContentChecked(check.await),
            SizingPhase::Settling(sleep) => {
                sleep.await;
                PhaseOutput::Settled
            }
            SizingPhase::Measuring(measure) => PhaseOutput::Measured(measure.await),
        }
    }
}
