pub mod controller;
pub mod messages;
pub mod state;
pub mod window;

pub use controller::OverlayController;
pub use window::{NativeWindow, ScreenRect, WindowBackend};
