//! Per-editor configuration.
//!
//! Configuration is an explicit value handed to [`RichEditor::with_config`](crate::RichEditor::with_config);
//! nothing is process-wide. It can be built in code or parsed from TOML:
//!
//! ```toml
//! max_length = 200
//! max_undo = 500
//!
//! [auto_scroll]
//! density = 2.0
//! ```
//!
//! Every field is optional. Unknown fields are ignored.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::EditorError;
use crate::style::TextStyle;

/// Edge-detection and speed settings for auto-scroll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoScrollConfig {
    /// Edge band for handle and mouse scrolling, in vp.
    #[serde(default = "AutoScrollConfig::default_edge_distance")]
    pub edge_distance_vp: f32,
    /// Edge band for drag scrolling, in vp.
    #[serde(default = "AutoScrollConfig::default_drag_edge_distance")]
    pub drag_edge_distance_vp: f32,
    /// Timer period of repeated scroll steps.
    #[serde(default = "AutoScrollConfig::default_interval_ms")]
    pub interval_ms: u32,
    /// Drag scroll speed at full intrusion, px per second.
    #[serde(default = "AutoScrollConfig::default_max_drag_speed")]
    pub max_drag_speed: f32,
    /// Pixels per vp.
    #[serde(default = "AutoScrollConfig::default_density")]
    pub density: f32,
}

impl Default for AutoScrollConfig {
    fn default() -> Self {
        Self {
            edge_distance_vp: Self::default_edge_distance(),
            drag_edge_distance_vp: Self::default_drag_edge_distance(),
            interval_ms: Self::default_interval_ms(),
            max_drag_speed: Self::default_max_drag_speed(),
            density: Self::default_density(),
        }
    }
}

impl AutoScrollConfig {
    const fn default_edge_distance() -> f32 {
        15.0
    }
    const fn default_drag_edge_distance() -> f32 {
        58.0
    }
    const fn default_interval_ms() -> u32 {
        15
    }
    const fn default_max_drag_speed() -> f32 {
        2400.0
    }
    const fn default_density() -> f32 {
        1.0
    }

    /// Handle/mouse edge band in px.
    pub fn edge_distance_px(&self) -> f32 {
        self.edge_distance_vp * self.density
    }

    /// Drag edge band in px.
    pub fn drag_edge_distance_px(&self) -> f32 {
        self.drag_edge_distance_vp * self.density
    }
}

/// Editor configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Maximum content length in offsets; `None` is unlimited.
    #[serde(default)]
    pub max_length: Option<usize>,
    /// Maximum number of undo steps.
    #[serde(default = "EditorConfig::default_max_undo")]
    pub max_undo: usize,
    /// Fold consecutive typed characters into one undo step.
    #[serde(default = "EditorConfig::default_coalesce_typing")]
    pub coalesce_typing: bool,
    /// Initial typing style.
    #[serde(default)]
    pub typing_style: Option<TextStyle>,
    /// Auto-scroll settings.
    #[serde(default)]
    pub auto_scroll: AutoScrollConfig,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            max_length: None,
            max_undo: Self::default_max_undo(),
            coalesce_typing: Self::default_coalesce_typing(),
            typing_style: None,
            auto_scroll: AutoScrollConfig::default(),
        }
    }
}

impl EditorConfig {
    const fn default_max_undo() -> usize {
        1000
    }
    const fn default_coalesce_typing() -> bool {
        true
    }

    /// Parse TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, EditorError> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EditorError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| EditorError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        info!(target: "rich_editor.config", path = %path.display(), "config_loaded");
        Ok(config)
    }

    /// Like [`load`](Self::load), falling back to defaults on any error.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        Self::load(path).unwrap_or_else(|err| {
            warn!(target: "rich_editor.config", path = %path.display(), error = %err, "config_fallback_default");
            Self::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::TextAttr;

    #[test]
    fn test_empty_toml_gives_defaults() {
        let config = EditorConfig::from_toml_str("").unwrap();
        assert_eq!(config, EditorConfig::default());
        assert_eq!(config.auto_scroll.edge_distance_px(), 15.0);
    }

    #[test]
    fn test_partial_toml_overrides() {
        let config = EditorConfig::from_toml_str(
            "max_length = 10\ncoalesce_typing = false\n[auto_scroll]\ndensity = 2.0\n",
        )
        .unwrap();
        assert_eq!(config.max_length, Some(10));
        assert!(!config.coalesce_typing);
        assert_eq!(config.max_undo, 1000);
        assert_eq!(config.auto_scroll.drag_edge_distance_px(), 116.0);
    }

    #[test]
    fn test_typing_style_from_toml() {
        let config = EditorConfig::from_toml_str("typing_style = [{ FontSize = 18.0 }]\n").unwrap();
        let expected = TextStyle::new().with(TextAttr::FontSize(18.0));
        assert_eq!(config.typing_style, Some(expected));
    }

    #[test]
    fn test_bad_toml_is_error() {
        let err = EditorConfig::from_toml_str("max_undo = \"lots\"").unwrap_err();
        assert!(matches!(err, EditorError::ConfigParse(_)));
    }

    #[test]
    fn test_missing_file_falls_back() {
        let config = EditorConfig::load_or_default("/nonexistent/rich-editor.toml");
        assert_eq!(config, EditorConfig::default());
        let err = EditorConfig::load("/nonexistent/rich-editor.toml").unwrap_err();
        assert!(matches!(err, EditorError::ConfigIo { .. }));
    }
}
