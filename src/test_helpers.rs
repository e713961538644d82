//! Shared test utilities for the parallax-kit test suite.
//!
//! Provides a skeleton page builder, descriptor constructors, and lookup
//! helpers that work with the in-memory [`Document`].
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let mut page = TestPage::with_modules(2);
//! let wrapper = page.modules[0].wrapper;
//! // ... load images into `wrapper` ...
//! assert_eq!(child_ids(&page.doc, wrapper), vec!["m_img_1", "m_img_2"]);
//! ```

use crate::dom::{Document, NodeId};
use crate::page::{ModuleSkeleton, append_module_skeleton};
use crate::types::ImageDescriptor;

// =========================================================================
// Page setup
// =========================================================================

/// A document holding `n` empty module skeletons under `<body>`.
pub struct TestPage {
    pub doc: Document,
    pub modules: Vec<ModuleSkeleton>,
}

impl TestPage {
    pub fn with_modules(n: usize) -> Self {
        let mut doc = Document::new();
        let body = doc.body();
        let modules = (0..n)
            .map(|_| append_module_skeleton(&mut doc, body, &Default::default()))
            .collect();
        Self { doc, modules }
    }
}

// =========================================================================
// Descriptor constructors
// =========================================================================

/// A foreground image with no animation.
pub fn image(id: i64, url: &str) -> ImageDescriptor {
    ImageDescriptor {
        id,
        url: Some(url.to_string()),
        ..Default::default()
    }
}

/// A background image.
pub fn background(id: i64, url: &str) -> ImageDescriptor {
    ImageDescriptor {
        is_background: true,
        ..image(id, url)
    }
}

/// A foreground image animated from `from` to `to`.
pub fn animated(id: i64, url: &str, from: &str, to: &str) -> ImageDescriptor {
    ImageDescriptor {
        from_params: Some(from.to_string()),
        to_params: Some(to.to_string()),
        ..image(id, url)
    }
}

// =========================================================================
// Document lookups
// =========================================================================

/// The module marker attribute of `node`, if set.
pub fn marker(doc: &Document, node: NodeId) -> Option<&str> {
    doc.get(node)
        .unwrap_or_else(|| panic!("node {node:?} not in document"))
        .attribute(crate::identity::MARKER_ATTRIBUTE)
}

/// Element ids of the direct children of `node`, in order.
pub fn child_ids(doc: &Document, node: NodeId) -> Vec<&str> {
    let el = doc
        .get(node)
        .unwrap_or_else(|| panic!("node {node:?} not in document"));
    el.children()
        .iter()
        .map(|c| doc.get(*c).and_then(|e| e.id()).unwrap_or(""))
        .collect()
}

pub fn has_class(doc: &Document, node: NodeId, class: &str) -> bool {
    doc.get(node).is_some_and(|el| el.has_class(class))
}
