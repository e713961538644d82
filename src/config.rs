//! Site configuration.
//!
//! Handles loading, validating, and merging `parallax.toml`. Stock defaults
//! are the base layer; a user file overrides only the keys it names.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [scroll]
//! start_viewport_position = 1.0  # viewport fraction where animation starts
//! trigger_start_position = 0.0   # trigger-region fraction that must reach it
//! scroll_distance = 1000.0       # scroll pixels the animation spans
//!
//! [animation]
//! scrub = 1.0                    # seconds the animation lags behind the scrollbar
//! markers = false                # ask the engine to draw debug markers
//!
//! [markup]
//! module_class = "parallax-module"
//! wrapper_class = "parallax-wrapper"
//! background_class = "parallax-bg"
//! image_class = "parallax-img"
//! ```
//!
//! Module manifests may override the `[scroll]` values per module; see
//! [`crate::types::ScrollOverrides`].
//!
//! Unknown keys are rejected to catch typos early.

use crate::types::ScrollConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Name of the config file looked up in the config directory.
pub const CONFIG_FILENAME: &str = "parallax.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParallaxConfig {
    /// Default scroll geometry for modules that don't override it.
    pub scroll: ScrollConfig,
    /// Engine settings shared by every trigger.
    pub animation: AnimationConfig,
    /// Class and attribute names used in page markup.
    pub markup: ClassNames,
}

impl ParallaxConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.scroll
            .validate()
            .map_err(|e| ConfigError::Validation(format!("scroll.{e}")))?;
        if !(self.animation.scrub.is_finite() && self.animation.scrub >= 0.0) {
            return Err(ConfigError::Validation(
                "animation.scrub must not be negative".into(),
            ));
        }
        for (key, value) in self.markup.entries() {
            if value.trim().is_empty() || value.contains(char::is_whitespace) {
                return Err(ConfigError::Validation(format!(
                    "markup.{key} must be a single non-empty name"
                )));
            }
        }
        Ok(())
    }
}

/// Engine settings shared by every trigger of every module.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnimationConfig {
    /// Smoothing: seconds for the animation to catch up with the scroll
    /// position. `0` follows the scrollbar exactly.
    pub scrub: f64,
    /// Ask the engine to draw start/end debug markers.
    pub markers: bool,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            scrub: 1.0,
            markers: false,
        }
    }
}

/// Names shared between page markup and the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClassNames {
    /// Structural class of every module container.
    pub module_class: String,
    /// Class of the element inside a module that receives the images.
    pub wrapper_class: String,
    pub background_class: String,
    pub image_class: String,
}

impl Default for ClassNames {
    fn default() -> Self {
        Self {
            module_class: "parallax-module".to_string(),
            wrapper_class: "parallax-wrapper".to_string(),
            background_class: "parallax-bg".to_string(),
            image_class: "parallax-img".to_string(),
        }
    }
}

impl ClassNames {
    fn entries(&self) -> [(&'static str, &str); 4] {
        [
            ("module_class", self.module_class.as_str()),
            ("wrapper_class", self.wrapper_class.as_str()),
            ("background_class", self.background_class.as_str()),
            ("image_class", self.image_class.as_str()),
        ]
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(ParallaxConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// Tables merge key-by-key; any other overlay value replaces the base value.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `parallax.toml` from a directory as a raw TOML value.
///
/// `Ok(None)` when the file doesn't exist.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto the stock defaults, then deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<ParallaxConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: ParallaxConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `parallax.toml` in `dir`, falling back to stock defaults.
pub fn load_config(dir: &Path) -> Result<ParallaxConfig, ConfigError> {
    resolve_config(load_raw_config(dir)?)
}

/// Returns a fully-commented stock `parallax.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Parallax Kit Configuration
# ==========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Scroll geometry (module manifests can override per module)
# ---------------------------------------------------------------------------
[scroll]
# Where in the viewport the animation starts: 0 = top edge, 1 = bottom edge.
start_viewport_position = 1.0

# Which point of the module must reach that viewport position:
# 0 = module top, 1 = module bottom.
trigger_start_position = 0.0

# How many pixels of scrolling the animation spans once started.
scroll_distance = 1000.0

# ---------------------------------------------------------------------------
# Animation engine
# ---------------------------------------------------------------------------
[animation]
# Seconds the animation takes to catch up with the scrollbar.
# 0 follows the scrollbar exactly.
scrub = 1.0

# Draw start/end debug markers.
markers = false

# ---------------------------------------------------------------------------
# Markup names
# ---------------------------------------------------------------------------
[markup]
module_class = "parallax-module"
wrapper_class = "parallax-wrapper"
background_class = "parallax-bg"
image_class = "parallax-img"
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_values() {
        let config = ParallaxConfig::default();
        assert_eq!(config.scroll.start_viewport_position, 1.0);
        assert_eq!(config.scroll.trigger_start_position, 0.0);
        assert_eq!(config.scroll.scroll_distance, 1000.0);
        assert_eq!(config.animation.scrub, 1.0);
        assert!(!config.animation.markers);
        assert_eq!(config.markup.module_class, "parallax-module");
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
[scroll]
scroll_distance = 1500.0
"#;
        let config: ParallaxConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.scroll.scroll_distance, 1500.0);
        assert_eq!(config.scroll.start_viewport_position, 1.0);
        assert_eq!(config.animation.scrub, 1.0);
    }

    #[test]
    fn stock_config_matches_defaults() {
        let config: ParallaxConfig = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(config, ParallaxConfig::default());
    }

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config, ParallaxConfig::default());
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILENAME),
            r#"
[animation]
scrub = 0.5

[markup]
image_class = "layer"
"#,
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.animation.scrub, 0.5);
        assert_eq!(config.markup.image_class, "layer");
        assert_eq!(config.markup.background_class, "parallax-bg");
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILENAME), "[scroll\nbroken").unwrap();
        assert!(matches!(
            load_config(tmp.path()),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn unknown_key_rejected() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILENAME),
            "[scroll]\nscroll_distanse = 10.0\n",
        )
        .unwrap();
        assert!(load_config(tmp.path()).is_err());
    }

    #[test]
    fn marker_attribute_is_not_configurable() {
        let result: Result<ParallaxConfig, _> =
            toml::from_str("[markup]\nmarker_attribute = \"data-parallax-id\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn unknown_section_rejected() {
        let result: Result<ParallaxConfig, _> = toml::from_str("[timeline]\nfoo = 1\n");
        assert!(result.is_err());
    }

    #[test]
    fn merge_toml_preserves_base_keys() {
        let base: toml::Value = toml::from_str("[a]\nx = 1\ny = 2\n").unwrap();
        let overlay: toml::Value = toml::from_str("[a]\ny = 3\n").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["a"]["x"].as_integer(), Some(1));
        assert_eq!(merged["a"]["y"].as_integer(), Some(3));
    }

    #[test]
    fn validate_fraction_out_of_range() {
        let mut config = ParallaxConfig::default();
        config.scroll.start_viewport_position = 1.5;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_fraction_boundaries_ok() {
        let mut config = ParallaxConfig::default();
        config.scroll.start_viewport_position = 0.0;
        config.scroll.trigger_start_position = 1.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_scroll_distance_positive() {
        let mut config = ParallaxConfig::default();
        config.scroll.scroll_distance = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_negative_scrub() {
        let mut config = ParallaxConfig::default();
        config.animation.scrub = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_class_name_with_space() {
        let mut config = ParallaxConfig::default();
        config.markup.wrapper_class = "two words".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_config_validates_values() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILENAME),
            "[scroll]\ntrigger_start_position = -0.1\n",
        )
        .unwrap();
        assert!(matches!(
            load_config(tmp.path()),
            Err(ConfigError::Validation(_))
        ));
    }
}
