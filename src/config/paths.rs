//! Cross-platform application paths using the `dirs` crate.
//!
//! Layout (config dir holds settings and the menu index files):
//!   Windows: %APPDATA%\kiosk-voice-macro\
//!   macOS:   ~/Library/Application Support/kiosk-voice-macro/
//!   Linux:   ~/.config/kiosk-voice-macro/

use std::path::PathBuf;

/// Holds all resolved application directory/file paths.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Directory for `settings.toml` and the menu index JSON files.
    pub config_dir: PathBuf,
    /// Full path to `settings.toml`.
    pub settings_file: PathBuf,
    /// Default location of the layout description (categories + nav buttons).
    pub ui_coords_file: PathBuf,
    /// Default location of the menu-card list.
    pub menu_cards_file: PathBuf,
}

impl AppPaths {
    const APP_NAME: &'static str = "kiosk-voice-macro";

    /// Resolves all paths using the `dirs` crate.
    ///
    /// Falls back to the current directory if the platform cannot provide a
    /// standard path.
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let settings_file = config_dir.join("settings.toml");
        let ui_coords_file = config_dir.join("kiosk_ui_coords.json");
        let menu_cards_file = config_dir.join("menu_cards.json");

        Self {
            config_dir,
            settings_file,
            ui_coords_file,
            menu_cards_file,
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_non_empty() {
        let paths = AppPaths::new();
        assert!(paths.config_dir.to_str().is_some_and(|s| !s.is_empty()));
        assert!(paths
            .settings_file
            .file_name()
            .is_some_and(|n| n == "settings.toml"));
        assert!(paths
            .menu_cards_file
            .file_name()
            .is_some_and(|n| n == "menu_cards.json"));
        assert!(paths.ui_coords_file.starts_with(&paths.config_dir));
    }
}
