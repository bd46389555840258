use std::fmt;
use std::sync::mpsc::{channel, Receiver, Sender};

/// One-way notifications from the overlay controller to the drawing surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceMessage {
    ClearCanvas,
    /// `#rrggbb`
    SetColor(String),
    /// Brush diameter in pixels.
    SetSize(u32),
    ToggleClickThrough,
    /// The input mode the window is in after a transition. `true` is click-through.
    SetClickThrough(bool),
    Undo,
    Redo,
}

impl SurfaceMessage {
    pub fn tag(&self) -> &'static str {
        match self {
            Self::ClearCanvas => "clear-canvas",
            Self::SetColor(_) => "set-color",
            Self::SetSize(_) => "set-size",
            Self::ToggleClickThrough => "toggle-clickthrough",
            Self::SetClickThrough(_) => "set-clickthrough",
            Self::Undo => "undo",
            Self::Redo => "redo",
        }
    }
}

impl fmt::Display for SurfaceMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SetColor(hex) => write!(f, "{}({hex:?})", self.tag()),
            Self::SetSize(px) => write!(f, "{}({px})", self.tag()),
            Self::SetClickThrough(on) => write!(f, "{}({on})", self.tag()),
            other => write!(f, "{}", other.tag()),
        }
    }
}

/// Requests from the drawing surface back to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceRequest {
    SetClickThrough(bool),
}

pub struct SurfaceChannels {
    pub message_tx: Sender<SurfaceMessage>,
    pub message_rx: Receiver<SurfaceMessage>,
    pub request_tx: Sender<SurfaceRequest>,
    pub request_rx: Receiver<SurfaceRequest>,
}

pub fn surface_channels() -> SurfaceChannels {
    let (message_tx, message_rx) = channel::<SurfaceMessage>();
    let (request_tx, request_rx) = channel::<SurfaceRequest>();
    SurfaceChannels {
        message_tx,
        message_rx,
        request_tx,
        request_rx,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_wire_tags() {
        assert_eq!(
            SurfaceMessage::SetColor("#ff0000".into()).to_string(),
            "set-color(\"#ff0000\")"
        );
        assert_eq!(SurfaceMessage::SetSize(4).to_string(), "set-size(4)");
        assert_eq!(SurfaceMessage::ClearCanvas.to_string(), "clear-canvas");
        assert_eq!(
            SurfaceMessage::ToggleClickThrough.to_string(),
            "toggle-clickthrough"
        );
        assert_eq!(
            SurfaceMessage::SetClickThrough(true).to_string(),
            "set-clickthrough(true)"
        );
    }
}
