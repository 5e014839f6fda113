//! Application Configuration
//!
//! User settings and preferences stored in TOML format. The analysis backend
//! base URL can additionally be overridden through the `LABEL_LENS_BACKEND_URL`
//! environment variable at startup.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding the configured backend base URL.
pub const BACKEND_URL_ENV: &str = "LABEL_LENS_BACKEND_URL";

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// General settings
    pub general: GeneralConfig,
    /// Analysis backend settings
    pub backend: BackendSettings,
    /// Camera settings
    pub camera: CameraSettings,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Remember window size between sessions
    pub remember_window_size: bool,
    /// Enable debug-level logging
    pub verbose_logging: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            remember_window_size: true,
            verbose_logging: false,
        }
    }
}

/// Analysis backend settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendSettings {
    /// Base URL of the analysis service
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Camera settings
///
/// Desktops have no facing-mode hint, so the device index selects which
/// camera plays the role of the label-facing one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraSettings {
    /// Index of the capture device to open
    pub device_index: u32,
    /// Preferred frame width
    pub width: u32,
    /// Preferred frame height
    pub height: u32,
    /// JPEG quality for captured stills (0-100)
    pub jpeg_quality: u8,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            device_index: 0,
            width: 1280,
            height: 720,
            jpeg_quality: 80,
        }
    }
}

impl AppConfig {
    /// Apply environment overrides on top of file-loaded settings.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var(BACKEND_URL_ENV) {
            if !url.trim().is_empty() {
                self.backend.base_url = url;
            }
        }
    }
}

/// Get the configuration directory
pub fn get_config_dir() -> Result<PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("com", "labellens", "LabelLens")
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

    let config_dir = proj_dirs.config_dir().to_path_buf();
    std::fs::create_dir_all(&config_dir)?;

    Ok(config_dir)
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: AppConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Save configuration to file
pub fn save_config(config: &AppConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Load configuration from the default location, falling back to defaults,
/// then apply environment overrides.
pub fn load_or_default() -> AppConfig {
    let mut config = get_config_dir()
        .ok()
        .map(|dir| dir.join("config.toml"))
        .filter(|path| path.exists())
        .and_then(|path| match load_config(&path) {
            Ok(config) => {
                tracing::info!("Loaded configuration from {:?}", path);
                Some(config)
            }
            Err(e) => {
                tracing::warn!("Failed to load configuration: {}", e);
                None
            }
        })
        .unwrap_or_default();

    config.apply_env_overrides();
    config
}
