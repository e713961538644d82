//! HTML serialization of the in-memory page.
//!
//! Rendering uses [Maud](https://maud.lambda.xyz/), so every text and
//! attribute value is escaped. Elements are written with a fixed attribute
//! vocabulary: `id`, `class`, `src`, `srcset`, `sizes`, `alt`, `style`, and
//! the module marker ([`MARKER_ATTRIBUTE`]). Other attributes stay in the
//! model but are not written.

use crate::config::ClassNames;
use crate::dom::{Document, Element, NodeId, Tag};
use crate::identity::MARKER_ATTRIBUTE;
use maud::{DOCTYPE, Markup, PreEscaped, html};

/// Render `node` and its subtree. Unknown nodes render as nothing.
pub fn render_node(doc: &Document, node: NodeId) -> Markup {
    let Some(el) = doc.get(node) else {
        return html! {};
    };
    let children = html! {
        @for child in el.children() {
            (render_node(doc, *child))
        }
    };
    let class = class_list(el);
    let style = el.style_text();
    let id = el.id();
    let marker = el.attribute(MARKER_ATTRIBUTE);

    match el.tag() {
        Tag::Body => html! {
            body id=[id] class=[class] { (children) }
        },
        Tag::Section => html! {
            section id=[id] class=[class] style=[style] data-module-id=[marker] { (children) }
        },
        Tag::Div => html! {
            div id=[id] class=[class] style=[style] data-module-id=[marker] { (children) }
        },
        Tag::Img => html! {
            img id=[id] class=[class]
                src=[el.attribute("src")]
                srcset=[el.attribute("srcset")]
                sizes=[el.attribute("sizes")]
                alt=[el.attribute("alt")]
                style=[style];
        },
        Tag::Script => html! {
            script id=[id] {}
        },
    }
}

fn class_list(el: &Element) -> Option<String> {
    (!el.classes().is_empty()).then(|| el.classes().join(" "))
}

/// Layering rules for module images, scoped by the configured class names.
pub fn module_css(classes: &ClassNames) -> String {
    format!(
        ".{wrapper} {{ position: relative; overflow: hidden; min-height: 100vh; }}\n\
         .{bg} {{ position: absolute; inset: 0; width: 100%; height: 100%; object-fit: cover; }}\n\
         .{img} {{ position: absolute; max-width: 100%; will-change: transform; }}\n",
        wrapper = classes.wrapper_class,
        bg = classes.background_class,
        img = classes.image_class,
    )
}

/// Render a complete HTML document around the page body.
pub fn render_page(doc: &Document, classes: &ClassNames, title: &str) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                style { (PreEscaped(module_css(classes))) }
            }
            (render_node(doc, doc.body()))
        }
    }
}
