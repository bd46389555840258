use crate::command::Command;
use crate::error::{ContentLoadError, WindowCreationError};
use crate::global_hotkey::{HotkeyBackend, HotkeyDispatcher, RegistrationReport};
use crate::hotkey::{HotkeyId, HotkeyTable};
use crate::overlay::messages::surface_channels;
use crate::overlay::window::PointerSample;
use crate::overlay::{OverlayController, WindowBackend};
use crate::settings::Settings;
use crate::surface::DrawingSurface;
use crate::tray::{hotkey_list_text, TrayAction};
use std::sync::mpsc::{channel, Receiver, Sender};

/// Everything the runtime reacts to. All of it flows through one queue and is
/// handled in arrival order on the thread that owns the window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    Hotkey(HotkeyId),
    Pointer(PointerSample),
    ContentReady,
    ContentFailed(ContentLoadError),
    Tray(TrayAction),
    Quit,
}

pub struct App<H: HotkeyBackend, W: WindowBackend> {
    dispatcher: HotkeyDispatcher<H>,
    controller: OverlayController<W>,
    surface: DrawingSurface,
    events_tx: Sender<AppEvent>,
    events_rx: Receiver<AppEvent>,
    show_hotkey_list: Box<dyn FnMut(String)>,
    running: bool,
}

impl<H: HotkeyBackend, W: WindowBackend> App<H, W> {
    pub fn new(hotkeys: H, window: W, settings: &Settings) -> Self {
        let channels = surface_channels();
        let controller = OverlayController::new(
            window,
            settings.overlay_rect,
            channels.message_tx,
            channels.request_rx,
        );
        let surface = DrawingSurface::new(
            channels.message_rx,
            channels.request_tx,
            settings.initial_style(),
            settings.max_undo,
        );
        let (events_tx, events_rx) = channel();
        Self {
            dispatcher: HotkeyDispatcher::new(hotkeys, HotkeyTable::fixed()),
            controller,
            surface,
            events_tx,
            events_rx,
            show_hotkey_list: Box::new(|text| tracing::info!("hotkeys:\n{text}")),
            running: true,
        }
    }

    pub fn with_hotkey_list(mut self, show: impl FnMut(String) + 'static) -> Self {
        self.show_hotkey_list = Box::new(show);
        self
    }

    pub fn dispatcher(&self) -> &HotkeyDispatcher<H> {
        &self.dispatcher
    }

    pub fn controller(&self) -> &OverlayController<W> {
        &self.controller
    }

    pub fn surface(&self) -> &DrawingSurface {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut DrawingSurface {
        &mut self.surface
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Sender for posting events from other sources (OS message loop, signal handler).
    pub fn events(&self) -> Sender<AppEvent> {
        self.events_tx.clone()
    }

    /// Queues `event` behind any pointer input the window has already seen.
    pub fn post(&mut self, event: AppEvent) {
        for sample in self.controller.drain_pointer_events() {
            self.enqueue(AppEvent::Pointer(sample));
        }
        self.enqueue(event);
    }

    fn enqueue(&self, event: AppEvent) {
        // The receiver lives in `self`, so this cannot fail while `self` exists.
        let _ = self.events_tx.send(event);
    }

    /// Creates the overlay window, claims the global hotkeys and loads the
    /// initial frame. Only a window creation failure is fatal; refused
    /// hotkeys are reported and the rest keep working.
    pub fn start(&mut self) -> Result<RegistrationReport, WindowCreationError> {
        self.controller.create()?;
        let report = self.dispatcher.register_all();
        self.load_content();
        Ok(report)
    }

    fn load_content(&mut self) {
        let surface = &mut self.surface;
        let drawn = self
            .controller
            .present(&mut |pixels, width, height| surface.render_damage(pixels, width, height));
        if drawn {
            self.post(AppEvent::ContentReady);
        } else {
            self.post(AppEvent::ContentFailed(ContentLoadError::new(
                "overlay window has no drawing bitmap",
            )));
        }
    }

    pub fn handle_event(&mut self, event: AppEvent) {
        tracing::trace!(?event, "app event");
        match event {
            AppEvent::Hotkey(id) => {
                if let Some(command) = self.dispatcher.resolve(id) {
                    tracing::debug!(id, ?command, "hotkey fired");
                    self.controller.dispatch(command);
                }
            }
            AppEvent::Pointer(sample) => self.surface.pointer(sample),
            AppEvent::ContentReady => self.controller.on_content_ready(),
            AppEvent::ContentFailed(err) => self.controller.on_content_failed(&err),
            AppEvent::Tray(action) => self.handle_tray(action),
            AppEvent::Quit => {
                tracing::info!("quit requested");
                self.running = false;
            }
        }
    }

    fn handle_tray(&mut self, action: TrayAction) {
        match action {
            TrayAction::ToggleOverlay => self.controller.dispatch(Command::ToggleOverlay),
            TrayAction::ClearCanvas => self.controller.dispatch(Command::ClearCanvas),
            TrayAction::ShowHotkeys => {
                let text = hotkey_list_text(self.dispatcher.table());
                (self.show_hotkey_list)(text);
            }
            TrayAction::Quit => self.handle_event(AppEvent::Quit),
        }
    }

    /// Runs one turn of the loop and returns the number of events handled.
    /// Each queued event is followed by the surface notifications it caused,
    /// so pointer input and commands reach the canvas in arrival order.
    /// Pointer input that arrived after the last queued event comes next, and
    /// a repaint closes the turn if the canvas changed.
    pub fn process_pending(&mut self) -> usize {
        self.sync_surface();
        let mut handled = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_event(event);
            self.sync_surface();
            handled += 1;
        }

        for sample in self.controller.drain_pointer_events() {
            self.surface.pointer(sample);
        }
        self.sync_surface();

        if self.surface.has_damage() {
            let surface = &mut self.surface;
            self.controller
                .present(&mut |pixels, width, height| surface.render_damage(pixels, width, height));
        }
        handled
    }

    /// Applies surface requests to the controller, then delivers everything
    /// the controller forwarded.
    fn sync_surface(&mut self) {
        self.controller.pump_requests();
        self.surface.pump();
    }

    /// Releases the hotkeys and the window. Safe to call more than once.
    pub fn shutdown(&mut self) {
        let released = self.dispatcher.unregister_all();
        self.controller.destroy();
        self.running = false;
        tracing::info!(released, "overlay shut down");
    }
}

fn install_quit_handler(events: Sender<AppEvent>) {
    if let Err(err) = ctrlc::set_handler(move || {
        let _ = events.send(AppEvent::Quit);
    }) {
        tracing::warn!(%err, "could not install termination handler");
    }
}

#[cfg(windows)]
pub fn run(settings: &Settings) -> anyhow::Result<()> {
    use crate::global_hotkey::NativeHotkeys;
    use crate::overlay::NativeWindow;
    use crate::tray::{show_hotkey_list, NativeTray};
    use std::time::Duration;
    use windows::Win32::Foundation::HWND;
    use windows::Win32::UI::WindowsAndMessaging::{
        DispatchMessageW, PeekMessageW, TranslateMessage, MSG, PM_REMOVE, WM_HOTKEY, WM_QUIT,
    };

    let mut app = App::new(NativeHotkeys, NativeWindow::default(), settings)
        .with_hotkey_list(show_hotkey_list);
    install_quit_handler(app.events());

    let report = app.start()?;
    if !report.is_complete() {
        tracing::warn!(
            failed = report.failed.len(),
            "some global hotkeys are unavailable"
        );
    }

    let mut tray = match NativeTray::new(app.controller().tray_state()) {
        Ok(tray) => Some(tray),
        Err(err) => {
            tracing::warn!(?err, "tray icon unavailable");
            None
        }
    };

    let mut msg = MSG::default();
    while app.is_running() {
        unsafe {
            while PeekMessageW(&mut msg, HWND::default(), 0, 0, PM_REMOVE).as_bool() {
                match msg.message {
                    WM_QUIT => app.post(AppEvent::Quit),
                    WM_HOTKEY => app.post(AppEvent::Hotkey(msg.wParam.0 as HotkeyId)),
                    _ => {
                        let _ = TranslateMessage(&msg);
                        DispatchMessageW(&msg);
                    }
                }
            }
        }

        if let Some(tray) = tray.as_ref() {
            for action in tray.poll() {
                app.post(AppEvent::Tray(action));
            }
        }

        app.process_pending();

        if let Some(tray) = tray.as_mut() {
            tray.refresh(app.controller().tray_state());
        }
        std::thread::sleep(Duration::from_millis(16));
    }

    app.shutdown();
    Ok(())
}

/// Without a native window backend `start` fails, so this only reports the error.
#[cfg(not(windows))]
pub fn run(settings: &Settings) -> anyhow::Result<()> {
    use crate::global_hotkey::NativeHotkeys;
    use crate::overlay::NativeWindow;
    use std::time::Duration;

    let mut app = App::new(NativeHotkeys, NativeWindow, settings);
    install_quit_handler(app.events());
    app.start()?;
    while app.is_running() {
        app.process_pending();
        std::thread::sleep(Duration::from_millis(16));
    }
    app.shutdown();
    Ok(())
}
