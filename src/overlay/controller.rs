use crate::command::Command;
use crate::error::{ContentLoadError, WindowCreationError};
use crate::overlay::messages::{SurfaceMessage, SurfaceRequest};
use crate::overlay::state::{can_transition, InputMode, Readiness, Visibility};
use crate::overlay::window::{PointerSample, ScreenRect, WindowBackend};
use crate::tray::TrayMenuState;
use std::sync::mpsc::{Receiver, Sender, TryRecvError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowState {
    pub visibility: Visibility,
    pub input_mode: InputMode,
    pub readiness: Readiness,
    /// Visibility requested before content was ready. `None` keeps the
    /// automatic reveal; `Some(Hidden)` cancels it.
    pub pending_visibility: Option<Visibility>,
}

impl WindowState {
    fn new() -> Self {
        Self {
            visibility: Visibility::Hidden,
            input_mode: InputMode::Paint,
            readiness: Readiness::NotReady,
            pending_visibility: None,
        }
    }
}

/// Owns the single overlay window and routes commands to it and to the drawing surface.
///
/// Every operation on a window that does not exist (never created, or already
/// destroyed) is a silent no-op.
pub struct OverlayController<W: WindowBackend> {
    backend: W,
    rect: ScreenRect,
    window: Option<WindowState>,
    surface_tx: Sender<SurfaceMessage>,
    request_rx: Receiver<SurfaceRequest>,
}

impl<W: WindowBackend> OverlayController<W> {
    pub fn new(
        backend: W,
        rect: ScreenRect,
        surface_tx: Sender<SurfaceMessage>,
        request_rx: Receiver<SurfaceRequest>,
    ) -> Self {
        Self {
            backend,
            rect,
            window: None,
            surface_tx,
            request_rx,
        }
    }

    pub fn backend(&self) -> &W {
        &self.backend
    }

    pub fn rect(&self) -> ScreenRect {
        self.rect
    }

    pub fn window_state(&self) -> Option<WindowState> {
        self.window
    }

    pub fn is_created(&self) -> bool {
        self.window.is_some()
    }

    pub fn visibility(&self) -> Option<Visibility> {
        self.window.map(|w| w.visibility)
    }

    pub fn input_mode(&self) -> Option<InputMode> {
        self.window.map(|w| w.input_mode)
    }

    pub fn readiness(&self) -> Option<Readiness> {
        self.window.map(|w| w.readiness)
    }

    pub fn tray_state(&self) -> TrayMenuState {
        TrayMenuState {
            overlay_visible: self
                .visibility()
                .map(Visibility::is_shown)
                .unwrap_or(false),
        }
    }

    /// Creates the window hidden and in paint mode. A second call while the window exists does nothing.
    pub fn create(&mut self) -> Result<(), WindowCreationError> {
        if self.window.is_some() {
            tracing::debug!("overlay window already exists");
            return Ok(());
        }

        if let Err(err) = self.backend.create(self.rect) {
            tracing::error!(%err, "overlay window creation refused");
            return Err(err);
        }
        self.backend.set_ignore_mouse_events(false);
        self.window = Some(WindowState::new());
        tracing::info!(rect = ?self.rect, "overlay window created");
        Ok(())
    }

    /// Content finished loading. Performs the first reveal unless a hide was queued meanwhile.
    pub fn on_content_ready(&mut self) {
        let Some(state) = self.window.as_mut() else {
            tracing::debug!("content ready without a window");
            return;
        };
        if !can_transition(state.readiness, Readiness::Ready) {
            tracing::debug!(readiness = ?state.readiness, "ignoring repeated content-ready");
            return;
        }
        state.readiness = Readiness::Ready;
        let reveal = state.pending_visibility != Some(Visibility::Hidden);
        tracing::info!(reveal, "overlay content ready");
        if reveal {
            self.show();
        }
    }

    /// Content failed to load. The window stays hidden for the rest of the run.
    pub fn on_content_failed(&mut self, err: &ContentLoadError) {
        let Some(state) = self.window.as_mut() else {
            return;
        };
        if !can_transition(state.readiness, Readiness::Failed) {
            return;
        }
        tracing::error!(%err, "overlay content failed to load; keeping window hidden");
        state.readiness = Readiness::Failed;
        state.pending_visibility = None;
    }

    /// Reveals the window without taking focus. Before content is ready this only queues the reveal.
    pub fn show(&mut self) {
        self.set_visibility(Visibility::Shown);
    }

    pub fn hide(&mut self) {
        self.set_visibility(Visibility::Hidden);
    }

    pub fn toggle(&mut self) {
        let Some(state) = self.window else {
            tracing::debug!("toggle ignored: no overlay window");
            return;
        };
        // Before content is ready the window is still hidden, so only an
        // explicitly queued show counts as shown.
        let shown = match state.readiness {
            Readiness::NotReady => state.pending_visibility == Some(Visibility::Shown),
            _ => state.visibility.is_shown(),
        };
        if shown {
            self.hide();
        } else {
            self.show();
        }
    }

    fn set_visibility(&mut self, target: Visibility) {
        let Some(state) = self.window.as_mut() else {
            tracing::debug!(?target, "visibility change ignored: no overlay window");
            return;
        };
        match state.readiness {
            Readiness::NotReady => {
                state.pending_visibility = Some(target);
                tracing::debug!(?target, "visibility queued until content is ready");
            }
            Readiness::Failed => {
                tracing::debug!(?target, "visibility change ignored: content failed to load");
            }
            Readiness::Ready => {
                if state.visibility == target {
                    return;
                }
                state.visibility = target;
                match target {
                    Visibility::Shown => self.backend.show_inactive(),
                    Visibility::Hidden => self.backend.hide(),
                }
                tracing::debug!(?target, "overlay visibility changed");
            }
        }
    }

    pub fn toggle_click_through(&mut self) {
        if let Some(mode) = self.input_mode() {
            self.apply_input_mode(mode.toggled());
        }
    }

    /// Sets the mouse-ignoring flag directly. Setting the current mode again is a no-op.
    /// Every actual change is followed by `set-clickthrough` carrying the new mode.
    pub fn set_click_through(&mut self, ignore: bool) {
        self.apply_input_mode(InputMode::from_ignore_mouse(ignore));
    }

    fn apply_input_mode(&mut self, mode: InputMode) {
        let Some(state) = self.window.as_mut() else {
            tracing::debug!(?mode, "input mode change ignored: no overlay window");
            return;
        };
        if state.input_mode == mode {
            return;
        }
        state.input_mode = mode;
        self.backend.set_ignore_mouse_events(mode.ignores_mouse());
        tracing::info!(?mode, "overlay input mode changed");
        self.forward(SurfaceMessage::SetClickThrough(mode.ignores_mouse()));
    }

    /// Routes one command. Drawing commands are forwarded to the surface unchanged.
    pub fn dispatch(&mut self, command: Command) {
        if self.window.is_none() {
            tracing::debug!(?command, "command dropped: no overlay window");
            return;
        }

        match command {
            Command::ToggleOverlay => self.toggle(),
            Command::ToggleClickThrough => {
                self.forward(SurfaceMessage::ToggleClickThrough);
                self.toggle_click_through();
            }
            Command::ClearCanvas => self.forward(SurfaceMessage::ClearCanvas),
            Command::SetColor(color) => self.forward(SurfaceMessage::SetColor(color.to_hex())),
            Command::SetBrushSize(size) => self.forward(SurfaceMessage::SetSize(size)),
            Command::Undo => self.forward(SurfaceMessage::Undo),
            Command::Redo => self.forward(SurfaceMessage::Redo),
        }
    }

    fn forward(&self, message: SurfaceMessage) {
        tracing::trace!(%message, "forwarding to drawing surface");
        if self.surface_tx.send(message).is_err() {
            tracing::debug!("drawing surface channel closed");
        }
    }

    /// Applies every pending request from the drawing surface, in order.
    pub fn pump_requests(&mut self) -> usize {
        let mut applied = 0;
        loop {
            match self.request_rx.try_recv() {
                Ok(SurfaceRequest::SetClickThrough(ignore)) => {
                    self.set_click_through(ignore);
                    applied += 1;
                }
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
        applied
    }

    pub fn drain_pointer_events(&mut self) -> Vec<PointerSample> {
        if self.window.is_none() {
            return Vec::new();
        }
        self.backend.drain_pointer_events()
    }

    /// Lets `render` draw into the window bitmap and schedules a repaint.
    pub fn present(&mut self, render: &mut dyn FnMut(&mut [u8], u32, u32)) -> bool {
        if self.window.is_none() {
            return false;
        }
        let drawn = self.backend.with_bitmap_mut(render);
        if drawn {
            self.backend.request_paint();
        }
        drawn
    }

    /// Releases the window. Safe to call repeatedly, and before `create`.
    pub fn destroy(&mut self) {
        if self.window.take().is_none() {
            return;
        }
        self.backend.destroy();
        tracing::info!("overlay window destroyed");
    }
}

impl<W: WindowBackend> Drop for OverlayController<W> {
    fn drop(&mut self) {
        self.destroy();
    }
}
