//! Integration tests driving popups through the public API against the
//! scripted in-memory host.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use perch_core::config::{MeasureStrategy, PerchConfig};
use perch_core::sim::{ScriptedSurface, SimContent, StaticWindow};
use perch_core::{
    Collaborators, ContentSurface, ContentTrigger, HostWindow, OffsetRect, PopupOptions,
    PopupView, Rect, Size, SurfaceEvent,
};

fn collaborators(
    surface: &ScriptedSurface,
    parent: Option<&StaticWindow>,
    anchor: Option<&StaticWindow>,
) -> Collaborators {
    Collaborators {
        surface: Arc::new(surface.clone()),
        parent: parent.map(|w| Arc::new(w.clone()) as Arc<dyn HostWindow>),
        anchor: anchor.map(|w| Arc::new(w.clone()) as Arc<dyn HostWindow>),
        opener: Arc::new(|_: &str| {}),
        focus: Arc::new(|| true),
    }
}

#[tokio::test(start_paused = true)]
async fn test_root_bounding_box_rebuilds_collapsed_axes() {
    let surface = ScriptedSurface::new(
        SimContent::sized(25.0, 25.0)
            .with_children(vec![Size::new(120.0, 40.0), Size::new(80.0, 60.0)]),
    );
    let parent = StaticWindow::new(Rect::new(0, 0, 1280, 800));

    let mut config = PerchConfig::default();
    config.sizing.strategy = MeasureStrategy::RootBoundingBox;
    let options = PopupOptions::new("ext", "popup.html", OffsetRect::default()).with_config(&config);

    let handle = PopupView::spawn(options, collaborators(&surface, Some(&parent), None));
    tokio::time::sleep(Duration::from_millis(300)).await;

    let status = handle.status();
    assert!(status.shown);
    assert_eq!(status.bounds, Rect::new(0, 0, 200, 100));
}

#[tokio::test(start_paused = true)]
async fn test_anchor_window_takes_precedence_over_parent() {
    let surface = ScriptedSurface::new(SimContent::sized(100.0, 100.0));
    let parent = StaticWindow::new(Rect::new(0, 0, 1280, 800));
    let anchor = StaticWindow::new(Rect::new(300, 200, 640, 480));
    let options = PopupOptions::new("ext", "popup.html", OffsetRect::new(5.9, 7.2, 16.0, 16.0));

    let handle = PopupView::spawn(options, collaborators(&surface, Some(&parent), Some(&anchor)));
    tokio::time::sleep(Duration::from_millis(300)).await;

    assert_eq!(handle.status().bounds, Rect::new(305, 207, 100, 100));
}

#[tokio::test(start_paused = true)]
async fn test_anchor_is_snapshotted_at_construction() {
    let surface = ScriptedSurface::new(SimContent::sized(100.0, 100.0));
    let parent = StaticWindow::new(Rect::new(100, 50, 1280, 800));
    let options = PopupOptions::new("ext", "popup.html", OffsetRect::new(10.0, 20.0, 30.0, 20.0));

    let handle = PopupView::spawn(options, collaborators(&surface, Some(&parent), None));
    parent.set_bounds(Rect::new(900, 900, 1280, 800));
    tokio::time::sleep(Duration::from_millis(300)).await;

    assert_eq!(handle.status().bounds, Rect::new(110, 70, 100, 100));
}

#[tokio::test(start_paused = true)]
async fn test_unanchored_popup_keeps_host_position() {
    let surface = ScriptedSurface::new(SimContent::sized(100.0, 80.0));
    surface.set_bounds(Rect::new(40, 30, 0, 0));
    let options = PopupOptions::new("ext", "popup.html", OffsetRect::new(10.0, 20.0, 30.0, 20.0));

    let handle = PopupView::spawn(options, collaborators(&surface, None, None));
    tokio::time::sleep(Duration::from_millis(300)).await;

    let status = handle.status();
    assert!(status.shown);
    assert_eq!(status.bounds, Rect::new(40, 30, 100, 80));
}

#[tokio::test(start_paused = true)]
async fn test_destroy_releases_every_subscription_once() {
    let surface = ScriptedSurface::new(SimContent::sized(100.0, 100.0));
    let parent = StaticWindow::new(Rect::new(0, 0, 1280, 800));
    let options = PopupOptions::new("ext", "popup.html", OffsetRect::default());

    let mut handle = PopupView::spawn(options, collaborators(&surface, Some(&parent), None));
    tokio::time::sleep(Duration::from_millis(300)).await;

    handle.destroy();
    handle.destroy();
    let status = handle.wait_destroyed().await;
    handle.destroy();

    assert!(status.destroyed);
    assert_eq!(surface.subscription_count(), 0);
    assert_eq!(surface.unsubscribed().len(), 6);
    assert_eq!(parent.subscription_count(), 0);
    assert_eq!(parent.unsubscribed().len(), 1);
    assert_eq!(surface.destroy_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_devtools_closed_after_blur_closes_popup() {
    let surface = ScriptedSurface::new(SimContent::sized(100.0, 100.0));
    let parent = StaticWindow::new(Rect::new(0, 0, 1280, 800));
    let options = PopupOptions::new("ext", "popup.html", OffsetRect::default());

    let mut handle = PopupView::spawn(options, collaborators(&surface, Some(&parent), None));
    tokio::time::sleep(Duration::from_millis(300)).await;

    surface.open_devtools();
    surface.emit(SurfaceEvent::LostFocus);
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(!handle.is_destroyed());

    surface.close_devtools();
    surface.emit(SurfaceEvent::DevToolsClosed);
    assert!(handle.wait_destroyed().await.destroyed);
}

#[tokio::test(start_paused = true)]
async fn test_opened_windows_reach_the_opener() {
    let surface = ScriptedSurface::new(SimContent::sized(100.0, 100.0));
    let opened = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&opened);

    let mut collaborators = collaborators(&surface, None, None);
    collaborators.opener = Arc::new(move |url: &str| {
        sink.lock().unwrap().push(url.to_string());
    });
    let options = PopupOptions::new("ext", "popup.html", OffsetRect::default());
    let _handle = PopupView::spawn(options, collaborators);

    surface.emit(SurfaceEvent::NewWindowRequested {
        url: "https://example.com/help".to_string(),
    });
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert_eq!(
        *opened.lock().unwrap(),
        vec!["https://example.com/help".to_string()]
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_popup_runs_on_multi_thread_runtime() {
    let surface = ScriptedSurface::new(SimContent::empty());
    let parent = StaticWindow::new(Rect::new(0, 0, 1280, 800));
    let mut config = PerchConfig::default();
    config.content.trigger = ContentTrigger::LoadCheck;
    config.sizing.settle_delay_ms = 10;
    let options = PopupOptions::new("ext", "popup.html", OffsetRect::default()).with_config(&config);

    let mut handle = PopupView::spawn(options, collaborators(&surface, Some(&parent), None));
    let status = tokio::time::timeout(Duration::from_secs(3), handle.wait_destroyed())
        .await
        .expect("empty popup should destroy itself");

    assert!(status.destroyed);
    assert!(!status.shown);
    assert!(!surface.is_visible());
}
