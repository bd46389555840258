#![cfg_attr(all(windows, feature = "windows_gui"), windows_subsystem = "windows")]

use anyhow::Context;
use ink_overlay::settings::{resolve_settings_path, Settings};

fn main() -> anyhow::Result<()> {
    let settings_path = resolve_settings_path();
    let settings = Settings::load(&settings_path)
        .with_context(|| format!("loading {}", settings_path.display()))?;
    ink_overlay::logging::init(settings.debug_logging, settings.log_file.clone());
    tracing::debug!(path = %settings_path.display(), ?settings, "settings loaded");

    ink_overlay::app::run(&settings)
}
