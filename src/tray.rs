use crate::hotkey::HotkeyTable;

/// What the tray menu shows, derived from the overlay controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TrayMenuState {
    pub overlay_visible: bool,
}

impl TrayMenuState {
    pub fn toggle_label(&self) -> &'static str {
        if self.overlay_visible {
            "Hide Overlay"
        } else {
            "Show Overlay"
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrayAction {
    ToggleOverlay,
    ClearCanvas,
    ShowHotkeys,
    Quit,
}

impl TrayAction {
    pub const ALL: [TrayAction; 4] = [
        TrayAction::ToggleOverlay,
        TrayAction::ClearCanvas,
        TrayAction::ShowHotkeys,
        TrayAction::Quit,
    ];

    pub fn menu_id(&self) -> &'static str {
        match self {
            TrayAction::ToggleOverlay => "toggle",
            TrayAction::ClearCanvas => "clear",
            TrayAction::ShowHotkeys => "hotkeys",
            TrayAction::Quit => "quit",
        }
    }

    pub fn from_menu_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|action| action.menu_id() == id)
    }

    pub fn label(&self, state: TrayMenuState) -> &'static str {
        match self {
            TrayAction::ToggleOverlay => state.toggle_label(),
            TrayAction::ClearCanvas => "Clear Canvas",
            TrayAction::ShowHotkeys => "Hotkeys...",
            TrayAction::Quit => "Quit",
        }
    }
}

pub fn hotkey_list_text(table: &HotkeyTable) -> String {
    format!("Ink Overlay hotkeys\n\n{}", table.describe())
}

#[cfg(windows)]
mod platform {
    use super::{TrayAction, TrayMenuState};
    use anyhow::Context;
    use tray_icon::menu::{Menu, MenuEvent, MenuItem, PredefinedMenuItem};
    use tray_icon::{Icon, TrayIcon, TrayIconBuilder};

    const ICON_SIZE: u32 = 32;

    /// Notification-area icon. Menu events are polled from the thread that
    /// owns the message loop.
    pub struct NativeTray {
        _icon: TrayIcon,
        toggle_item: MenuItem,
        state: TrayMenuState,
    }

    impl NativeTray {
        pub fn new(state: TrayMenuState) -> anyhow::Result<Self> {
            let menu = Menu::new();
            let toggle_item = MenuItem::with_id(
                TrayAction::ToggleOverlay.menu_id(),
                TrayAction::ToggleOverlay.label(state),
                true,
                None,
            );
            menu.append(&toggle_item)?;
            for action in [TrayAction::ClearCanvas, TrayAction::ShowHotkeys] {
                let item = MenuItem::with_id(action.menu_id(), action.label(state), true, None);
                menu.append(&item)?;
            }
            menu.append(&PredefinedMenuItem::separator())?;
            let quit = MenuItem::with_id(
                TrayAction::Quit.menu_id(),
                TrayAction::Quit.label(state),
                true,
                None,
            );
            menu.append(&quit)?;

            let icon = TrayIconBuilder::new()
                .with_tooltip("Ink Overlay")
                .with_icon(pen_icon()?)
                .with_menu(Box::new(menu))
                .build()
                .context("creating tray icon")?;

            Ok(Self {
                _icon: icon,
                toggle_item,
                state,
            })
        }

        pub fn poll(&self) -> Vec<TrayAction> {
            let mut actions = Vec::new();
            while let Ok(event) = MenuEvent::receiver().try_recv() {
                match TrayAction::from_menu_id(&event.id.0) {
                    Some(action) => actions.push(action),
                    None => tracing::debug!(id = %event.id.0, "unknown tray menu id"),
                }
            }
            actions
        }

        pub fn refresh(&mut self, state: TrayMenuState) {
            if state == self.state {
                return;
            }
            self.state = state;
            self.toggle_item.set_text(state.toggle_label());
        }
    }

    /// A red dot on a transparent background.
    fn pen_icon() -> anyhow::Result<Icon> {
        let center = (ICON_SIZE as f32 - 1.0) / 2.0;
        let radius = ICON_SIZE as f32 * 0.4;
        let mut rgba = Vec::with_capacity((ICON_SIZE * ICON_SIZE * 4) as usize);
        for y in 0..ICON_SIZE {
            for x in 0..ICON_SIZE {
                let dx = x as f32 - center;
                let dy = y as f32 - center;
                if dx * dx + dy * dy <= radius * radius {
                    rgba.extend_from_slice(&[0xff, 0x00, 0x00, 0xff]);
                } else {
                    rgba.extend_from_slice(&[0, 0, 0, 0]);
                }
            }
        }
        Icon::from_rgba(rgba, ICON_SIZE, ICON_SIZE).context("building tray icon image")
    }

    /// Shows the list on its own thread so the message loop keeps running.
    pub fn show_hotkey_list(text: String) {
        std::thread::spawn(move || {
            rfd::MessageDialog::new()
                .set_level(rfd::MessageLevel::Info)
                .set_title("Ink Overlay hotkeys")
                .set_description(text)
                .set_buttons(rfd::MessageButtons::Ok)
                .show();
        });
    }
}

#[cfg(windows)]
pub use platform::{show_hotkey_list, NativeTray};
