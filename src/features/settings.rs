//! Lyric view settings persistence
//!
//! Handles saving and loading user preferences for the lyric view.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::lyrics::engine::{LyricViewConfig, SpringParams};

/// Lyric view settings
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Text sizes and translation display
    #[serde(default)]
    pub text: TextSettings,
    /// Spacing around lines
    #[serde(default)]
    pub layout: LayoutSettings,
    /// Spring tuning
    #[serde(default)]
    pub animation: AnimationSettings,
    /// Drag, fling and preview behavior
    #[serde(default)]
    pub interaction: InteractionSettings,
}

/// Text-related settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSettings {
    /// Size of regular lines
    pub normal_size: f32,
    /// Size of the highlighted line
    pub current_size: f32,
    /// Translation size relative to the line (0.0 to 1.0+)
    #[serde(default = "default_translate_scale")]
    pub translate_scale: f32,
    /// Show translations under lines
    #[serde(default = "default_true")]
    pub show_translation: bool,
    /// Shown when a song has no lyrics
    #[serde(default = "default_label")]
    pub empty_label: String,
}

/// Layout-related settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutSettings {
    /// Gap between lines
    pub sentence_divider: f32,
    /// Gap between a line and its translation
    pub translate_divider: f32,
    /// Vertical shift of the highlighted line from the view center
    #[serde(default)]
    pub horizontal_offset: f32,
    /// Padding left and right of the text
    #[serde(default)]
    pub padding: f32,
}

/// Spring settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationSettings {
    /// Spring moving the highlight to the next line
    pub lyric_spring: SpringParams,
    /// Spring moving the view after the highlight
    pub viewport_spring: SpringParams,
}

/// Interaction settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionSettings {
    /// Seconds the seek preview stays up after scrolling stops
    pub preview_keep_time: f32,
    /// Pixels of drag before the preview shows
    #[serde(default = "default_preview_threshold")]
    pub preview_threshold: f32,
    /// Velocity kept per frame while flinging (0.0 to 1.0)
    #[serde(default = "default_fling_friction")]
    pub fling_friction: f32,
}

fn default_translate_scale() -> f32 {
    1.0
}

fn default_true() -> bool {
    true
}

fn default_label() -> String {
    LyricViewConfig::default().label
}

fn default_preview_threshold() -> f32 {
    8.0
}

fn default_fling_friction() -> f32 {
    0.95
}

impl Default for TextSettings {
    fn default() -> Self {
        Self {
            normal_size: 16.0,
            current_size: 18.0,
            translate_scale: 1.0,
            show_translation: true,
            empty_label: default_label(),
        }
    }
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            sentence_divider: 20.0,
            translate_divider: 4.0,
            horizontal_offset: 0.0,
            padding: 0.0,
        }
    }
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self {
            lyric_spring: SpringParams::PROGRESS,
            viewport_spring: SpringParams::VIEWPORT,
        }
    }
}

impl Default for InteractionSettings {
    fn default() -> Self {
        Self {
            preview_keep_time: 3.0,
            preview_threshold: 8.0,
            fling_friction: 0.95,
        }
    }
}

impl Settings {
    /// Get the settings file path
    pub fn file_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "lyricview", "LyricView")
            .map(|dirs| dirs.config_dir().join("settings.json"))
    }

    /// Load settings from file, or return defaults if not found
    pub fn load() -> Self {
        Self::file_path()
            .and_then(|path| Self::load_from_file(&path).ok())
            .unwrap_or_default()
    }

    /// Load settings from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self, SettingsError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| SettingsError::Io(e.to_string()))?;
        serde_json::from_str(&content).map_err(|e| SettingsError::Parse(e.to_string()))
    }

    /// Save settings to the default file
    pub fn save(&self) -> Result<(), SettingsError> {
        if let Some(path) = Self::file_path() {
            self.save_to_file(&path)
        } else {
            Err(SettingsError::Io(
                "Could not determine config directory".to_string(),
            ))
        }
    }

    /// Save settings to a specific file
    pub fn save_to_file(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| SettingsError::Io(e.to_string()))?;
        }

        let content =
            serde_json::to_string_pretty(self).map_err(|e| SettingsError::Parse(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| SettingsError::Io(e.to_string()))?;
        Ok(())
    }

    /// Engine configuration for these preferences
    pub fn to_view_config(&self) -> LyricViewConfig {
        LyricViewConfig {
            normal_text_size: self.text.normal_size,
            current_text_size: self.text.current_size,
            translate_text_scale: self.text.translate_scale,
            draw_translation: self.text.show_translation,
            label: self.text.empty_label.clone(),
            sentence_divider: self.layout.sentence_divider,
            translate_divider: self.layout.translate_divider,
            horizontal_offset: self.layout.horizontal_offset,
            padding: self.layout.padding,
            progress_spring: self.animation.lyric_spring,
            viewport_spring: self.animation.viewport_spring,
            preview_keep_time: self.interaction.preview_keep_time,
            preview_threshold: self.interaction.preview_threshold,
            fling_friction: self.interaction.fling_friction,
            ..LyricViewConfig::default()
        }
    }
}

/// Errors that can occur with settings
#[derive(Debug, Clone)]
pub enum SettingsError {
    Io(String),
    Parse(String),
}

impl std::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingsError::Io(e) => write!(f, "IO error: {}", e),
            SettingsError::Parse(e) => write!(f, "Parse error: {}", e),
        }
    }
}

impl std::error::Error for SettingsError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_engine_defaults() {
        assert_eq!(Settings::default().to_view_config(), LyricViewConfig::default());
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"layout":{"sentence_divider":32.0,"translate_divider":6.0}}"#)
                .unwrap();
        assert_eq!(settings.layout.sentence_divider, 32.0);
        assert_eq!(settings.layout.padding, 0.0);
        assert_eq!(settings.text, TextSettings::default());

        let config = settings.to_view_config();
        assert_eq!(config.sentence_divider, 32.0);
        assert_eq!(config.translate_divider, 6.0);
    }

    #[test]
    fn test_save_and_load_file() {
        let path = std::env::temp_dir()
            .join(format!("lyricview-settings-{}", std::process::id()))
            .join("settings.json");
        let mut settings = Settings::default();
        settings.animation.lyric_spring = SpringParams::new(300.0, 0.5);
        settings.text.show_translation = false;

        settings.save_to_file(&path).unwrap();
        let loaded = Settings::load_from_file(&path).unwrap();
        assert_eq!(loaded, settings);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_load_errors() {
        let missing = std::env::temp_dir().join("lyricview-does-not-exist.json");
        assert!(matches!(
            Settings::load_from_file(&missing),
            Err(SettingsError::Io(_))
        ));

        let path = std::env::temp_dir().join(format!("lyricview-bad-{}.json", std::process::id()));
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            Settings::load_from_file(&path),
            Err(SettingsError::Parse(_))
        ));
        let _ = std::fs::remove_file(&path);
    }
}
