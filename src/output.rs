//! CLI output formatting.
//!
//! Every display has a `format_*` function returning `Vec<String>` and,
//! where the binary prints it directly, a `print_*` wrapper that writes to
//! stdout. Format functions are pure: no I/O, no side effects.
//!
//! # Output Format
//!
//! ## Events
//!
//! ```text
//! [harbor] claimed module (origin)
//! [harbor] background harbor_img_1 ← https://s/sky-desktop.jpg
//! [harbor] image harbor_img_2 ← https://s/boat-tablet.png
//! [harbor] loaded 2 of 3 images
//! [harbor] cleared 0 triggers
//! [harbor] animate harbor_img_2 (harbor_trigger_1)
//! [harbor] skip Rock: no animation params
//! ```
//!
//! ## Variants
//!
//! ```text
//! src: https://s/boat-mobile.png
//!     800w  https://s/boat-mobile.png
//!     1200w https://s/boat-tablet.png
//! ```
//!
//! ## Scrub
//!
//! ```text
//! harbor_img_2 (harbor_trigger_1) 50%
//!     y: 50
//! ```

use crate::events::{Event, SkipReason};
use crate::literal::PropertyMap;
use crate::srcset::VariantSet;
use crate::types::ManifestProblem;
use serde_json::Value;

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn describe_skip(reason: &SkipReason) -> String {
    match reason {
        SkipReason::NoUrl => "no url".to_string(),
        SkipReason::Background => "background image".to_string(),
        SkipReason::NoParams => "no animation params".to_string(),
        SkipReason::MalformedParams { field, error } => format!("{field} malformed: {error}"),
        SkipReason::MissingElement { element_id } => format!("element #{element_id} not found"),
        SkipReason::EngineRejected { error } => format!("engine rejected tween: {error}"),
    }
}

// ============================================================================
// Events
// ============================================================================

pub fn format_event(event: &Event) -> Vec<String> {
    let line = match event {
        Event::ModuleMarked { module_id, by_scan } => {
            let how = if *by_scan { "scan" } else { "origin" };
            format!("[{module_id}] claimed module ({how})")
        }
        Event::ModuleUnavailable { module_id } => {
            format!("[{module_id}] no unclaimed module container")
        }
        Event::ContainerUnavailable { module_id } => {
            format!("[{module_id}] image container unavailable")
        }
        Event::BackgroundLoaded {
            module_id,
            element_id,
            url,
        } => format!("[{module_id}] background {element_id} ← {url}"),
        Event::ImageLoaded {
            module_id,
            element_id,
            url,
        } => format!("[{module_id}] image {element_id} ← {url}"),
        Event::ImagesLoaded {
            module_id,
            rendered,
            total,
        } => format!("[{module_id}] loaded {rendered} of {total} images"),
        Event::TriggersCleared { module_id, count } => {
            format!("[{module_id}] cleared {count} triggers")
        }
        Event::AnimationCreated {
            module_id,
            element_id,
            trigger_id,
        } => format!("[{module_id}] animate {element_id} ({trigger_id})"),
        Event::AnimationSkipped {
            module_id,
            image,
            reason,
        } => format!("[{module_id}] skip {image}: {}", describe_skip(reason)),
    };
    vec![line]
}

// ============================================================================
// Variants
// ============================================================================

pub fn format_variants(variants: &VariantSet) -> Vec<String> {
    let mut lines = vec![format!(
        "src: {}",
        variants.default_src.as_deref().unwrap_or("(none)")
    )];
    if !variants.is_responsive() {
        lines.push(format!("{}(not responsive)", indent(1)));
    }
    for c in &variants.candidates {
        lines.push(format!("{}{:<5} {}", indent(1), format!("{}w", c.width), c.url));
    }
    lines
}

pub fn print_variants(variants: &VariantSet) {
    for line in format_variants(variants) {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

/// Problems of one manifest under a header naming it.
pub fn format_problems(source: &str, problems: &[ManifestProblem]) -> Vec<String> {
    let mut lines = vec![source.to_string()];
    if problems.is_empty() {
        lines.push(format!("{}ok", indent(1)));
    }
    for p in problems {
        lines.push(format!("{}{}", indent(1), p));
    }
    lines
}

pub fn print_problems(source: &str, problems: &[ManifestProblem]) {
    for line in format_problems(source, problems) {
        println!("{}", line);
    }
}

// ============================================================================
// Scrub
// ============================================================================

/// One animated element's state at a scroll position.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub element_id: String,
    pub trigger_id: String,
    pub progress: f64,
    pub properties: PropertyMap,
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub fn format_samples(samples: &[Sample]) -> Vec<String> {
    let mut lines = Vec::new();
    for s in samples {
        lines.push(format!(
            "{} ({}) {:.0}%",
            s.element_id,
            s.trigger_id,
            s.progress * 100.0
        ));
        for (key, value) in &s.properties {
            lines.push(format!("{}{}: {}", indent(1), key, format_value(value)));
        }
    }
    lines
}

pub fn print_samples(samples: &[Sample]) {
    for line in format_samples(samples) {
        println!("{}", line);
    }
}
