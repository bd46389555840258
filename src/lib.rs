pub mod app;
pub mod command;
pub mod error;
pub mod global_hotkey;
pub mod hotkey;
pub mod logging;
pub mod overlay;
pub mod settings;
pub mod surface;
pub mod tray;
