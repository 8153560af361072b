// =============================================================================
// CONFIGURATION - Load settings from config.toml
// =============================================================================
//
// This module handles loading and parsing configuration from config.toml.
// Provides sensible defaults if config file is missing or has errors.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::platform::Backend;

/// Root configuration structure
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    pub probe: ProbeConfig,
    pub debug: DebugConfig,
}

/// Probe window settings. The window is never shown or rendered to; it
/// only exists so a real surface can be created against it.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "vk-platform probe".to_string(),
            width: 320,
            height: 240,
        }
    }
}

/// Probe behaviour
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Also create (and destroy) a real surface against a hidden window,
    /// beyond the headless extension check.
    pub create_surface: bool,
    /// Expected windowing backend: "auto", "win32", "xcb" or "wayland".
    /// On POSIX both backends are compiled in; this only controls which
    /// one the probe warns about not getting.
    pub preferred_backend: String,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            create_surface: false,
            preferred_backend: "auto".to_string(),
        }
    }
}

/// Debug settings
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    pub log_to_file: bool,
    pub log_file: String,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_to_file: false,
            log_file: "vk_platform_probe.log".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from file, falling back to defaults if not found
    pub fn load() -> Self {
        Self::load_from_path("config.toml").unwrap_or_else(|e| {
            log::warn!("Failed to load config.toml: {}. Using defaults.", e);
            Config::default()
        })
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            log::info!("Config file not found at {:?}, using defaults", path);
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        log::info!("Loaded configuration from {:?}", path);
        log::debug!("Config: {:?}", config);

        Ok(config)
    }

    /// Preferred backend as an enum; `None` means "auto" (take whatever
    /// the window system hands out).
    pub fn get_preferred_backend(&self) -> Option<Backend> {
        match self.probe.preferred_backend.to_lowercase().as_str() {
            "auto" => None,
            "win32" => Some(Backend::Win32),
            "xcb" => Some(Backend::Xcb),
            "wayland" => Some(Backend::Wayland),
            other => {
                log::warn!("Unknown preferred backend '{}', treating as auto", other);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(!config.probe.create_surface);
        assert_eq!(config.probe.preferred_backend, "auto");
        assert!(config.get_preferred_backend().is_none());
    }

    #[test]
    fn test_parse_full_config() {
        let config: Config = toml::from_str(
            r#"
            [window]
            title = "probe"
            width = 64
            height = 64

            [probe]
            create_surface = true
            preferred_backend = "wayland"

            [debug]
            log_to_file = true
            log_file = "probe.log"
            "#,
        )
        .unwrap();
        assert!(config.probe.create_surface);
        assert_eq!(config.get_preferred_backend(), Some(Backend::Wayland));
        assert_eq!(config.window.width, 64);
        assert!(config.debug.log_to_file);
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config: Config = toml::from_str("[probe]\ncreate_surface = true\n").unwrap();
        assert!(config.probe.create_surface);
        assert_eq!(config.window.title, "vk-platform probe");
    }

    #[test]
    fn test_unknown_backend_falls_back_to_auto() {
        let config: Config =
            toml::from_str("[probe]\npreferred_backend = \"x11-but-wrong\"\n").unwrap();
        assert!(config.get_preferred_backend().is_none());
    }

    #[test]
    fn test_backend_name_is_case_insensitive() {
        let config: Config = toml::from_str("[probe]\npreferred_backend = \"XCB\"\n").unwrap();
        assert_eq!(config.get_preferred_backend(), Some(Backend::Xcb));
    }
}
