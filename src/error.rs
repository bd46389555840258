use crate::hotkey::KeyCombo;
use thiserror::Error;

/// The overlay surface could not be created. Fatal for the process.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to create overlay window: {reason}")]
pub struct WindowCreationError {
    pub reason: String,
}

impl WindowCreationError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Per-binding failure. Recoverable: the remaining bindings are still attempted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HotkeyRegistrationError {
    #[error("hotkey {combo} is already claimed: {reason}")]
    AlreadyClaimed { combo: KeyCombo, reason: String },
    #[error("hotkey {combo} has no platform key code")]
    UnsupportedKey { combo: KeyCombo },
    #[error("failed to release hotkey {combo}: {reason}")]
    Unregister { combo: KeyCombo, reason: String },
    #[error("global hotkeys are not available on this platform")]
    PlatformUnsupported,
}

/// The drawing surface failed to initialise; the window stays hidden.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("drawing surface failed to load: {reason}")]
pub struct ContentLoadError {
    pub reason: String,
}

impl ContentLoadError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("key combination {combo} is bound more than once")]
pub struct DuplicateBindingError {
    pub combo: KeyCombo,
}
