// App settings: window, pacing, where designs live, what to show first.
// Read from a TOML file; anything missing falls back to the defaults below.

use crate::error::{GlassError, Result};
use crate::params::ParameterSet;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub title: String,
    pub width: usize,
    pub height: usize,
    /// Frames per second the loop aims for
    pub fps: u32,
    /// JSON file holding the design library
    pub library: PathBuf,
    /// Where `E` writes exported shaders
    pub export_dir: PathBuf,
    /// Path, file:// URL or data: URI of the first background
    pub background: Option<String>,
    /// tracing EnvFilter directive, e.g. "glass_lens=debug"
    pub log_filter: String,
    /// Look to start with (pointer position is overwritten every frame)
    pub params: ParameterSet,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Glass Lens".into(),
            width: 960,
            height: 640,
            fps: 60,
            library: PathBuf::from("designs.json"),
            export_dir: PathBuf::from("exports"),
            background: None,
            log_filter: "info".into(),
            params: ParameterSet::default(),
        }
    }
}

impl AppConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| GlassError::Config(e.to_string()))
    }

    /// Load `path`, or defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .map_err(|e| GlassError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&text)
    }

    /// Window sizes of zero would give minifb nothing to draw into.
    pub fn validated(mut self) -> Result<Self> {
        if self.width == 0 || self.height == 0 {
            return Err(GlassError::Config(format!(
                "window size must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        self.params = self.params.sanitized();
        Ok(self)
    }
}
