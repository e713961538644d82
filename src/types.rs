//! Module manifest types.
//!
//! A manifest is the JSON a content-management layer publishes for one
//! parallax module: optional scroll overrides plus the ordered image list.
//! Field names follow the CMS wire format (camelCase).
//!
//! ```json
//! {
//!   "moduleId": "parallax-harbor",
//!   "scrollConfig": { "startViewportPosition": 0.8, "scrollDistance": 1200 },
//!   "images": [
//!     { "id": 1, "url": "https://site/img/sky-desktop.jpg", "isBackground": true, "zIndex": 0 },
//!     { "id": 2, "url": "https://site/img/boat-tablet.png", "zIndex": 2,
//!       "fromParams": "{ y: 200 }", "toParams": "{ y: -100 }" }
//!   ]
//! }
//! ```

use crate::literal::{self, LiteralError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid manifest JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// One image entry of a module.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageDescriptor {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub is_background: bool,
    /// Stacking order. Kept raw: only numeric values are applied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z_index: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_params: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_params: Option<String>,
}

impl ImageDescriptor {
    /// The image URL, treating an empty string as absent.
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref().filter(|u| !u.is_empty())
    }

    /// Element id: explicit `uniqueId`, else `{module_id}_img_{id}`.
    ///
    /// The loader and the binder both derive ids through this, so an
    /// element created at load time is found again at bind time.
    pub fn element_id(&self, module_id: &str) -> String {
        match self.unique_id.as_deref().filter(|u| !u.is_empty()) {
            Some(unique) => unique.to_string(),
            None => format!("{module_id}_img_{}", self.id),
        }
    }

    /// `z-index` value when `zIndex` is a JSON number.
    pub fn z_index_css(&self) -> Option<String> {
        let Some(Value::Number(n)) = &self.z_index else {
            return None;
        };
        Some(match n.as_i64() {
            Some(i) => i.to_string(),
            None => n.as_f64()?.to_string(),
        })
    }

    /// Display label for diagnostics: name, else `#id`.
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => format!("#{}", self.id),
        }
    }
}

/// Scroll-trigger geometry for one module.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScrollConfig {
    /// Fraction of the viewport height (0 = top, 1 = bottom) where the
    /// animation starts.
    pub start_viewport_position: f64,
    /// Fraction of the trigger region that must reach the viewport position.
    pub trigger_start_position: f64,
    /// Scroll pixels the animation spans.
    pub scroll_distance: f64,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            start_viewport_position: 1.0,
            trigger_start_position: 0.0,
            scroll_distance: 1000.0,
        }
    }
}

/// A [`ScrollConfig`] value outside its allowed range.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{field} {requirement}, got {value}")]
pub struct InvalidScroll {
    pub field: &'static str,
    pub requirement: &'static str,
    pub value: f64,
}

impl ScrollConfig {
    /// Fractions must lie in `0..=1`; the distance must be positive.
    pub fn validate(&self) -> Result<(), InvalidScroll> {
        let fractions = [
            ("start_viewport_position", self.start_viewport_position),
            ("trigger_start_position", self.trigger_start_position),
        ];
        for (field, value) in fractions {
            if !(0.0..=1.0).contains(&value) {
                return Err(InvalidScroll {
                    field,
                    requirement: "must be 0-1",
                    value,
                });
            }
        }
        if !(self.scroll_distance.is_finite() && self.scroll_distance > 0.0) {
            return Err(InvalidScroll {
                field: "scroll_distance",
                requirement: "must be positive",
                value: self.scroll_distance,
            });
        }
        Ok(())
    }
}

/// Per-module overrides of the site-wide [`ScrollConfig`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_viewport_position: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_start_position: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scroll_distance: Option<f64>,
}

impl ScrollOverrides {
    pub fn apply(&self, base: &ScrollConfig) -> ScrollConfig {
        ScrollConfig {
            start_viewport_position: self
                .start_viewport_position
                .unwrap_or(base.start_viewport_position),
            trigger_start_position: self
                .trigger_start_position
                .unwrap_or(base.trigger_start_position),
            scroll_distance: self.scroll_distance.unwrap_or(base.scroll_distance),
        }
    }
}

/// Everything the page needs to initialize one module.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleManifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_id: Option<String>,
    #[serde(default)]
    pub scroll_config: ScrollOverrides,
    #[serde(default)]
    pub images: Vec<ImageDescriptor>,
}

/// A content problem found by [`ModuleManifest::problems`].
#[derive(Debug, Clone, PartialEq)]
pub enum ManifestProblem {
    /// More than one image is flagged as background; only the first renders.
    ExtraBackground { id: i64 },
    /// Image has no URL and will be skipped entirely.
    MissingUrl { id: i64 },
    /// `fromParams` or `toParams` does not parse.
    MalformedParams {
        id: i64,
        field: &'static str,
        error: LiteralError,
    },
    /// Only one side of the animation is set.
    OneSidedParams { id: i64 },
    /// A `scrollConfig` override is out of range.
    InvalidScroll(InvalidScroll),
}

impl ManifestProblem {
    /// Problems that make the manifest unusable as written.
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            ManifestProblem::MalformedParams { .. } | ManifestProblem::InvalidScroll(_)
        )
    }
}

impl fmt::Display for ManifestProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ManifestProblem::ExtraBackground { id } => {
                write!(f, "image {id}: additional background image is ignored")
            }
            ManifestProblem::MissingUrl { id } => write!(f, "image {id}: no url, skipped"),
            ManifestProblem::MalformedParams { id, field, error } => {
                write!(f, "image {id}: {field} is malformed: {error}")
            }
            ManifestProblem::OneSidedParams { id } => {
                write!(f, "image {id}: only one of fromParams/toParams is set, not animated")
            }
            ManifestProblem::InvalidScroll(error) => write!(f, "scrollConfig: {error}"),
        }
    }
}

impl ModuleManifest {
    /// Read a manifest from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// The manifest's own id, else the file stem of `path`.
    pub fn module_id_or_stem(&self, path: &Path) -> String {
        self.module_id
            .clone()
            .filter(|id| !id.is_empty())
            .or_else(|| {
                path.file_stem()
                    .map(|stem| stem.to_string_lossy().into_owned())
            })
            .unwrap_or_else(|| "parallax".to_string())
    }

    /// Static content checks, without touching a page.
    pub fn problems(&self) -> Vec<ManifestProblem> {
        let mut problems = Vec::new();
        if let Err(error) = self.scroll_config.apply(&ScrollConfig::default()).validate() {
            problems.push(ManifestProblem::InvalidScroll(error));
        }
        let mut seen_background = false;

        for image in &self.images {
            if image.url().is_none() {
                problems.push(ManifestProblem::MissingUrl { id: image.id });
                continue;
            }
            if image.is_background {
                if seen_background {
                    problems.push(ManifestProblem::ExtraBackground { id: image.id });
                }
                seen_background = true;
                continue;
            }

            let from = image.from_params.as_deref().filter(|p| !literal::is_blank_literal(p));
            let to = image.to_params.as_deref().filter(|p| !literal::is_blank_literal(p));
            for (field, text) in [("fromParams", from), ("toParams", to)] {
                if let Some(Err(error)) = text.map(literal::parse_property_map) {
                    problems.push(ManifestProblem::MalformedParams {
                        id: image.id,
                        field,
                        error,
                    });
                }
            }
            if from.is_some() != to.is_some() {
                problems.push(ManifestProblem::OneSidedParams { id: image.id });
            }
        }
        problems
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_cms_descriptor() {
        let json = r#"{
            "id": 3,
            "uniqueId": "hero-boat",
            "url": "https://site/img/boat-tablet.png",
            "name": "Boat",
            "isBackground": false,
            "zIndex": 4,
            "fromParams": "{ y: 200 }",
            "toParams": "{ y: -100 }"
        }"#;
        let d: ImageDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(d.id, 3);
        assert_eq!(d.unique_id.as_deref(), Some("hero-boat"));
        assert_eq!(d.url(), Some("https://site/img/boat-tablet.png"));
        assert_eq!(d.z_index_css().as_deref(), Some("4"));
        assert_eq!(d.from_params.as_deref(), Some("{ y: 200 }"));
    }

    #[test]
    fn minimal_descriptor_uses_defaults() {
        let d: ImageDescriptor = serde_json::from_str(r#"{ "id": 7 }"#).unwrap();
        assert_eq!(d.url(), None);
        assert!(!d.is_background);
        assert_eq!(d.z_index, None);
    }

    #[test]
    fn empty_url_counts_as_missing() {
        let d = ImageDescriptor {
            url: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(d.url(), None);
    }

    #[test]
    fn element_id_prefers_unique_id() {
        let mut d = ImageDescriptor {
            id: 5,
            ..Default::default()
        };
        assert_eq!(d.element_id("mod-a"), "mod-a_img_5");
        d.unique_id = Some("custom".into());
        assert_eq!(d.element_id("mod-a"), "custom");
        d.unique_id = Some(String::new());
        assert_eq!(d.element_id("mod-a"), "mod-a_img_5");
    }

    #[test]
    fn non_numeric_z_index_is_ignored() {
        let mut d = ImageDescriptor {
            z_index: Some(json!("3")),
            ..Default::default()
        };
        assert_eq!(d.z_index_css(), None);
        d.z_index = Some(json!(2.5));
        assert_eq!(d.z_index_css().as_deref(), Some("2.5"));
        d.z_index = Some(json!(-1));
        assert_eq!(d.z_index_css().as_deref(), Some("-1"));
    }

    #[test]
    fn label_falls_back_to_id() {
        let mut d = ImageDescriptor {
            id: 9,
            ..Default::default()
        };
        assert_eq!(d.label(), "#9");
        d.name = Some("Sky".into());
        assert_eq!(d.label(), "Sky");
    }

    #[test]
    fn scroll_overrides_apply_over_base() {
        let base = ScrollConfig::default();
        let overrides: ScrollOverrides =
            serde_json::from_str(r#"{ "scrollDistance": 1500, "triggerStartPosition": 0.25 }"#)
                .unwrap();
        let merged = overrides.apply(&base);
        assert_eq!(merged.scroll_distance, 1500.0);
        assert_eq!(merged.trigger_start_position, 0.25);
        assert_eq!(merged.start_viewport_position, base.start_viewport_position);
    }

    #[test]
    fn manifest_without_scroll_config_parses() {
        let m: ModuleManifest = serde_json::from_str(r#"{ "images": [] }"#).unwrap();
        assert_eq!(m.module_id, None);
        assert_eq!(m.scroll_config, ScrollOverrides::default());
    }

    #[test]
    fn problems_report_content_issues() {
        let manifest = ModuleManifest {
            images: vec![
                ImageDescriptor {
                    id: 1,
                    url: Some("a-desktop.jpg".into()),
                    is_background: true,
                    ..Default::default()
                },
                ImageDescriptor {
                    id: 2,
                    url: Some("b-desktop.jpg".into()),
                    is_background: true,
                    ..Default::default()
                },
                ImageDescriptor {
                    id: 3,
                    ..Default::default()
                },
                ImageDescriptor {
                    id: 4,
                    url: Some("c-desktop.jpg".into()),
                    from_params: Some("{ y: oops }".into()),
                    to_params: Some("{ y: 0 }".into()),
                    ..Default::default()
                },
                ImageDescriptor {
                    id: 5,
                    url: Some("d-desktop.jpg".into()),
                    from_params: Some("{ y: 10 }".into()),
                    to_params: Some("{}".into()),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };

        let problems = manifest.problems();
        assert_eq!(problems.len(), 4);
        assert_eq!(problems[0], ManifestProblem::ExtraBackground { id: 2 });
        assert_eq!(problems[1], ManifestProblem::MissingUrl { id: 3 });
        assert!(matches!(
            problems[2],
            ManifestProblem::MalformedParams {
                id: 4,
                field: "fromParams",
                ..
            }
        ));
        assert_eq!(problems[3], ManifestProblem::OneSidedParams { id: 5 });
    }

    #[test]
    fn clean_manifest_has_no_problems() {
        let manifest = ModuleManifest {
            images: vec![ImageDescriptor {
                id: 1,
                url: Some("a-desktop.jpg".into()),
                from_params: Some("{ y: 100 }".into()),
                to_params: Some("{ y: 0 }".into()),
                ..Default::default()
            }],
            ..Default::default()
        };
        assert!(manifest.problems().is_empty());
    }

    #[test]
    fn load_manifest_from_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("harbor.json");
        std::fs::write(&path, r#"{ "images": [{ "id": 1, "url": "a-desktop.jpg" }] }"#).unwrap();

        let manifest = ModuleManifest::load(&path).unwrap();
        assert_eq!(manifest.images.len(), 1);
        assert_eq!(manifest.module_id_or_stem(&path), "harbor");
    }

    #[test]
    fn explicit_module_id_wins_over_file_stem() {
        let manifest = ModuleManifest {
            module_id: Some("p-7".into()),
            ..Default::default()
        };
        assert_eq!(manifest.module_id_or_stem(Path::new("x/harbor.json")), "p-7");
    }

    #[test]
    fn invalid_json_is_reported() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("bad.json");
        std::fs::write(&path, "{ images: ").unwrap();
        assert!(matches!(
            ModuleManifest::load(&path),
            Err(ManifestError::Json(_))
        ));
    }

    #[test]
    fn out_of_range_scroll_overrides_are_problems() {
        let manifest: ModuleManifest = serde_json::from_str(
            r#"{ "scrollConfig": { "startViewportPosition": 2.5, "triggerStartPosition": -1 } }"#,
        )
        .unwrap();
        let problems = manifest.problems();
        assert_eq!(problems.len(), 1);
        assert!(problems[0].is_error());
        assert!(matches!(
            &problems[0],
            ManifestProblem::InvalidScroll(InvalidScroll {
                field: "start_viewport_position",
                ..
            })
        ));

        let manifest: ModuleManifest =
            serde_json::from_str(r#"{ "scrollConfig": { "scrollDistance": -5 } }"#).unwrap();
        assert_eq!(
            manifest.problems(),
            vec![ManifestProblem::InvalidScroll(InvalidScroll {
                field: "scroll_distance",
                requirement: "must be positive",
                value: -5.0,
            })]
        );
    }

    #[test]
    fn scroll_validate_accepts_boundaries() {
        let config = ScrollConfig {
            start_viewport_position: 0.0,
            trigger_start_position: 1.0,
            scroll_distance: 0.5,
        };
        assert!(config.validate().is_ok());
        let zero = ScrollConfig {
            scroll_distance: 0.0,
            ..Default::default()
        };
        assert!(zero.validate().is_err());
    }
}
