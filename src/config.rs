//! Configuration for the transition controller and the frame loop.
//!
//! Settings are read from TOML with one table per concern:
//!
//! ```toml
//! [controller]
//! default_scene = "Title"   # `defaultScene` is accepted too
//! load_timeout = 10.0       # seconds; omit the key to keep the default
//!
//! [app]
//! frame_rate = 60.0
//! max_frames = 600
//! ```
//!
//! Missing keys fall back to their defaults.

use crate::error::ConfigError;
use serde::Deserialize;
use std::path::Path;

/// Settings for [`SceneTransitionController`](crate::scene::SceneTransitionController).
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Scene requested when the controller starts. `None` makes start a no-op.
    #[serde(alias = "defaultScene")]
    pub default_scene: Option<String>,
    /// Seconds to wait for a loaded scene's root node before giving up.
    /// `None` waits indefinitely.
    #[serde(alias = "loadTimeout")]
    pub load_timeout: Option<f32>,
    /// Name of the node that parents the active scene.
    #[serde(alias = "nodeName")]
    pub node_name: String,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            default_scene: None,
            load_timeout: Some(10.0),
            node_name: "SceneManager".to_string(),
        }
    }
}

impl ControllerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn default_scene(mut self, scene: impl Into<String>) -> Self {
        self.default_scene = Some(scene.into());
        self
    }

    pub fn load_timeout(mut self, seconds: Option<f32>) -> Self {
        self.load_timeout = seconds;
        self
    }

    pub fn node_name(mut self, name: impl Into<String>) -> Self {
        self.node_name = name.into();
        self
    }
}

/// Settings for the headless frame loop.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Simulated frames per second; each step advances the clock by `1 / frame_rate`.
    pub frame_rate: f32,
    /// Upper bound on frames for [`App::run_until`](crate::App::run_until) callers that
    /// use the configured limit.
    pub max_frames: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            frame_rate: 60.0,
            max_frames: 600,
        }
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frame_rate(mut self, frame_rate: f32) -> Self {
        self.frame_rate = frame_rate;
        self
    }

    pub fn max_frames(mut self, max_frames: u64) -> Self {
        self.max_frames = max_frames;
        self
    }

    /// Seconds per frame.
    pub fn frame_time(&self) -> f32 {
        if self.frame_rate > 0.0 {
            1.0 / self.frame_rate
        } else {
            0.0
        }
    }
}

/// Complete configuration file.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub controller: ControllerConfig,
    pub app: AppConfig,
}

impl Config {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Read a configuration file, using defaults when it does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            log::warn!("Config file not found at {:?}, using defaults.", path);
            return Ok(Self::default());
        }

        log::info!("Loading config from {:?}", path);
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.controller.load_timeout, Some(10.0));
        assert_eq!(config.controller.node_name, "SceneManager");
    }

    #[test]
    fn accepts_camel_case_default_scene() {
        let config = Config::from_toml_str(
            r#"
            [controller]
            defaultScene = "Title"

            [app]
            frame_rate = 30.0
            "#,
        )
        .unwrap();

        assert_eq!(config.controller.default_scene.as_deref(), Some("Title"));
        assert_eq!(config.app.frame_rate, 30.0);
        assert_eq!(config.app.max_frames, 600);
    }

    #[test]
    fn syntax_error_is_reported() {
        assert!(matches!(
            Config::from_toml_str("[controller"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = Config::load("definitely/not/here.toml").unwrap();
        assert_eq!(config, Config::default());
    }
}
