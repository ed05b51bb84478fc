pub mod errors;
pub mod traits;
pub mod types;

pub use errors::SurfaceError;
pub use traits::{ContentSurface, FocusQuery, HostWindow, WindowOpener};
pub use types::{
    EventSink, PopupEvent, SubscriptionId, SurfaceEvent, SurfaceEventKind, WindowEvent,
};
