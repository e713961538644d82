//! Responsive variant derivation for CMS image URLs.
//!
//! Uploaded images are published under a fixed naming convention: one base
//! name with a size suffix per rendition.
//!
//! ```text
//! https://site/images/20250409-4ec8-mobile.jpg    800w
//! https://site/images/20250409-4ec8-tablet.jpg   1200w
//! https://site/images/20250409-4ec8-desktop.jpg  2000w
//! https://site/images/20250409-4ec8-tiny.jpg      150w
//! ```
//!
//! Given any one rendition, [`resolve`] recovers the base name and lists all
//! four. URLs that don't carry a known suffix (e.g. `-original.png`) pass
//! through untouched with no candidates.
//!
//! ## Extension Handling
//!
//! Only two output extensions exist: `.png` for PNG sources and `.jpg` for
//! everything else, including `.jpeg` and extensionless URLs.

use serde::Serialize;

/// Size suffixes, in match priority order.
///
/// The first entry found anywhere in the URL wins, even if a later entry
/// appears earlier in the string.
pub const SIZE_MARKERS: [&str; 5] = ["-tiny", "-w400", "-tablet", "-mobile", "-desktop"];

/// Display-width policy attached to every image that has candidates.
pub const DISPLAY_SIZES: &str = "(max-width: 800px) 800px, (max-width: 1200px) 1200px, 2000px";

/// Renditions emitted for a conforming URL, in output order.
const RENDITIONS: [(&str, u32); 4] = [
    ("-mobile", 800),
    ("-tablet", 1200),
    ("-desktop", 2000),
    ("-tiny", 150),
];

/// One `srcset` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    pub url: String,
    pub width: u32,
}

/// Default display URL plus the responsive candidate list.
///
/// Recomputed on every render; never cached.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct VariantSet {
    /// `None` only when the input URL was absent.
    pub default_src: Option<String>,
    pub candidates: Vec<Candidate>,
}

impl VariantSet {
    fn passthrough(url: Option<&str>) -> Self {
        Self {
            default_src: url.map(str::to_string),
            candidates: Vec::new(),
        }
    }

    /// Whether responsive attributes should be emitted.
    pub fn is_responsive(&self) -> bool {
        !self.candidates.is_empty()
    }

    /// Render candidates as an HTML `srcset` value. Empty when non-responsive.
    pub fn srcset(&self) -> String {
        self.candidates
            .iter()
            .map(|c| format!("{} {}w", c.url, c.width))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Output extension for a URL: `.png` or `.jpg`.
fn output_extension(url: &str) -> &'static str {
    if url.to_ascii_lowercase().ends_with(".png") {
        ".png"
    } else {
        ".jpg"
    }
}

/// Everything before the last occurrence of the highest-priority marker.
fn base_url(url: &str) -> Option<&str> {
    SIZE_MARKERS
        .iter()
        .find_map(|marker| url.rfind(marker).map(|pos| &url[..pos]))
}

/// Derive the default source and responsive candidates for `url`.
///
/// - absent or empty → pass-through, no candidates
/// - no known size marker → pass-through, no candidates
/// - marker found → `{base}-mobile{ext}` plus four fixed candidates
///
/// Pure string manipulation; same input always yields the same output.
pub fn resolve(url: Option<&str>) -> VariantSet {
    let Some(url) = url.filter(|u| !u.is_empty()) else {
        return VariantSet::passthrough(url);
    };

    let ext = output_extension(url);
    let Some(base) = base_url(url) else {
        return VariantSet::passthrough(Some(url));
    };

    let candidates = RENDITIONS
        .iter()
        .map(|(suffix, width)| Candidate {
            url: format!("{base}{suffix}{ext}"),
            width: *width,
        })
        .collect();

    VariantSet {
        default_src: Some(format!("{base}-mobile{ext}")),
        candidates,
    }
}
