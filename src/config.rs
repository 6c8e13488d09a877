use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::render::DEFAULT_MAX_DISPLAY_WIDTH;

pub const DEFAULT_DETECTION_ENDPOINT: &str = "http://localhost:5000";
pub const DEFAULT_STREAM_ENDPOINT: &str = "http://localhost:8000";

/// Settings shared by the CLI and the GUI.
///
/// Every field has a default, so a settings file only needs the keys it
/// overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the still-image detection service.
    pub detection_endpoint: String,
    /// Base URL of the live stream service.
    pub stream_endpoint: String,
    pub max_display_width: u32,
    /// TrueType font for box labels. System fonts are tried when unset.
    pub font_path: Option<PathBuf>,
    /// Directory the annotated PNG is exported to.
    pub export_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            detection_endpoint: DEFAULT_DETECTION_ENDPOINT.to_string(),
            stream_endpoint: DEFAULT_STREAM_ENDPOINT.to_string(),
            max_display_width: DEFAULT_MAX_DISPLAY_WIDTH,
            font_path: None,
            export_dir: PathBuf::from("."),
        }
    }
}

impl Settings {
    pub fn from_toml_str(input: &str) -> anyhow::Result<Self> {
        let settings: Settings = toml::from_str(input)?;
        if settings.max_display_width == 0 {
            anyhow::bail!("max_display_width must be greater than zero");
        }
        Ok(settings)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {:?}", path))?;
        Self::from_toml_str(&raw).with_context(|| format!("Invalid settings file {:?}", path))
    }

    /// Load `path` if given, otherwise use defaults.
    pub fn load_or_default(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}
