use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Optional workspace configuration (`config.toml`).
///
/// Appearance values here sit below the `CLARITY_TUI_*` environment
/// variables in precedence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// Project to open straight into an outline view on startup
    #[serde(default)]
    pub default_project: Option<String>,
    #[serde(default)]
    pub appearance: AppearanceConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppearanceConfig {
    /// Style profile name: default, neon, pills, mono
    #[serde(default)]
    pub profile: Option<String>,
    /// Glyph set name: unicode, utf8, ascii
    #[serde(default)]
    pub glyphs: Option<String>,
    /// Background assumption: light, dark, auto
    #[serde(default)]
    pub theme: Option<String>,
}

/// Read config.toml; absent or unparseable files yield the defaults.
/// A broken config never blocks startup.
pub fn read_config(dir: &Path) -> WorkspaceConfig {
    let path = dir.join("config.toml");
    let Ok(text) = fs::read_to_string(&path) else {
        return WorkspaceConfig::default();
    };
    toml::from_str(&text).unwrap_or_default()
}

/// Write config.toml
pub fn write_config(dir: &Path, config: &WorkspaceConfig) -> Result<(), std::io::Error> {
    let text = toml::to_string_pretty(config)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    fs::write(dir.join("config.toml"), text)
}
