//! Image set loading.
//!
//! Fills a module's wrapper element with `<img>` elements built from the
//! module's descriptors:
//!
//! ```text
//! div.parallax-wrapper
//! ├── img.parallax-bg   id=m_img_1  (first background with a url)
//! ├── img.parallax-img  id=m_img_2
//! └── img.parallax-img  id=hero     (explicit uniqueId)
//! ```
//!
//! The wrapper is cleared first, so loading the same module twice leaves
//! only the second set. Every element gets its default source from
//! [`srcset::resolve`]; when that yields candidates, the element also gets
//! `srcset` and the fixed [`DISPLAY_SIZES`] policy.

use crate::config::ClassNames;
use crate::dom::{Document, NodeId, Tag};
use crate::events::{Event, emit};
use crate::srcset::{self, DISPLAY_SIZES};
use crate::types::ImageDescriptor;
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoadError {
    #[error("[{module_id}] no usable image container")]
    ContainerUnavailable { module_id: String },
}

/// Elements created by one [`load_images`] call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub background: Option<NodeId>,
    pub foreground: Vec<NodeId>,
    /// Children removed from the container before loading.
    pub cleared: usize,
}

impl LoadReport {
    pub fn rendered(&self) -> usize {
        self.foreground.len() + usize::from(self.background.is_some())
    }
}

/// Replace the children of `container` with the module's images.
///
/// Fails only when `container` is absent or no longer part of the page.
pub fn load_images(
    doc: &mut Document,
    classes: &ClassNames,
    module_id: &str,
    container: Option<NodeId>,
    descriptors: &[ImageDescriptor],
    events: Option<&Sender<Event>>,
) -> Result<LoadReport, LoadError> {
    let Some(container) = container.filter(|c| doc.is_connected(*c)) else {
        tracing::warn!(module_id, "image container unavailable");
        emit(
            events,
            Event::ContainerUnavailable {
                module_id: module_id.to_string(),
            },
        );
        return Err(LoadError::ContainerUnavailable {
            module_id: module_id.to_string(),
        });
    };

    let mut report = LoadReport {
        cleared: doc.clear_children(container),
        ..Default::default()
    };

    let background = descriptors
        .iter()
        .find(|d| d.is_background && d.url().is_some());
    if let Some(bg) = background {
        let alt = bg.name.clone().unwrap_or_else(|| "Background image".to_string());
        let node = append_image(doc, container, module_id, bg, &classes.background_class, &alt);
        emit(
            events,
            Event::BackgroundLoaded {
                module_id: module_id.to_string(),
                element_id: bg.element_id(module_id),
                url: bg.url().unwrap_or_default().to_string(),
            },
        );
        report.background = Some(node);
    }

    for image in descriptors.iter().filter(|d| !d.is_background) {
        let Some(url) = image.url() else {
            continue;
        };
        let alt = image
            .name
            .clone()
            .unwrap_or_else(|| format!("Image {}", image.id));
        let node = append_image(doc, container, module_id, image, &classes.image_class, &alt);
        emit(
            events,
            Event::ImageLoaded {
                module_id: module_id.to_string(),
                element_id: image.element_id(module_id),
                url: url.to_string(),
            },
        );
        report.foreground.push(node);
    }

    tracing::debug!(
        module_id,
        rendered = report.rendered(),
        total = descriptors.len(),
        "images loaded"
    );
    emit(
        events,
        Event::ImagesLoaded {
            module_id: module_id.to_string(),
            rendered: report.rendered(),
            total: descriptors.len(),
        },
    );
    Ok(report)
}

fn append_image(
    doc: &mut Document,
    container: NodeId,
    module_id: &str,
    image: &ImageDescriptor,
    class: &str,
    alt: &str,
) -> NodeId {
    let variants = srcset::resolve(image.url());
    let node = doc.append_new(container, Tag::Img);
    doc.add_class(node, class);
    doc.set_id(node, &image.element_id(module_id));
    doc.set_attribute(node, "alt", alt);
    if let Some(src) = &variants.default_src {
        doc.set_attribute(node, "src", src);
    }
    if variants.is_responsive() {
        doc.set_attribute(node, "srcset", &variants.srcset());
        doc.set_attribute(node, "sizes", DISPLAY_SIZES);
    }
    if let Some(z) = image.z_index_css() {
        doc.set_style(node, "z-index", &z);
    }
    node
}
