use crate::command::{Rgb, SMALL_BRUSH};
use crate::overlay::window::ScreenRect;
use crate::surface::history::DEFAULT_MAX_UNDO;
use crate::surface::model::StrokeStyle;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const SETTINGS_FILE_NAME: &str = "ink_overlay.json";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Settings {
    /// When enabled the application initialises the logger at debug level.
    #[serde(default)]
    pub debug_logging: bool,
    /// Write logs to this file instead of stderr.
    #[serde(default)]
    pub log_file: Option<PathBuf>,
    /// Screen area covered by the overlay. Defaults to a 3840x2160 rectangle at the origin.
    #[serde(default)]
    pub overlay_rect: ScreenRect,
    /// Pen colour as `#rrggbb`.
    #[serde(default = "default_initial_color")]
    pub initial_color: String,
    #[serde(default = "default_initial_brush_size")]
    pub initial_brush_size: u32,
    /// Maximum number of undoable edits.
    #[serde(default = "default_max_undo")]
    pub max_undo: usize,
}

fn default_initial_color() -> String {
    Rgb::RED.to_hex()
}

fn default_initial_brush_size() -> u32 {
    SMALL_BRUSH
}

fn default_max_undo() -> usize {
    DEFAULT_MAX_UNDO
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug_logging: false,
            log_file: None,
            overlay_rect: ScreenRect::default(),
            initial_color: default_initial_color(),
            initial_brush_size: default_initial_brush_size(),
            max_undo: default_max_undo(),
        }
    }
}

impl Settings {
    /// Missing or empty files yield the defaults.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).unwrap_or_default();
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(&content)
            .with_context(|| format!("parsing settings file {}", path.display()))
    }

    pub fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating settings folder {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("writing settings file {}", path.display()))?;
        Ok(())
    }

    /// Starting pen style. Invalid values fall back to red and 4px.
    pub fn initial_style(&self) -> StrokeStyle {
        let mut style = StrokeStyle::default();
        match Rgb::from_hex(&self.initial_color) {
            Some(color) => style.color = color,
            None => tracing::warn!(
                color = %self.initial_color,
                "invalid initial colour in settings; using {}",
                style.color
            ),
        }
        if self.initial_brush_size > 0 {
            style.width = self.initial_brush_size;
        } else {
            tracing::warn!("brush size 0 in settings; using {}px", style.width);
        }
        style
    }
}

/// `ink_overlay.json` next to the executable, or in the working directory if
/// the executable path is unavailable.
pub fn resolve_settings_path() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(SETTINGS_FILE_NAME)))
        .unwrap_or_else(|| PathBuf::from(SETTINGS_FILE_NAME))
}
