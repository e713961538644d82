//! Module identity assignment.
//!
//! A page can carry several instances of the parallax module, each with its
//! own initialization script. Before a script touches anything it claims
//! exactly one module container by writing its identifier into the
//! [`MARKER_ATTRIBUTE`]:
//!
//! 1. **Origin walk**: from the element that triggered initialization
//!    (typically the module's own `<script>`), take the nearest enclosing
//!    module container.
//! 2. **Scan**: otherwise, claim the first module container in document
//!    order that doesn't carry a marker yet.
//!
//! Marked containers are skipped by later scans, so each container is
//! claimed by at most one scan-based initialization.

use crate::config::ClassNames;
use crate::dom::{Document, NodeId};
use crate::events::{Event, emit};
use std::sync::mpsc::Sender;
use thiserror::Error;

/// Attribute carrying a claimed module's identifier.
pub const MARKER_ATTRIBUTE: &str = "data-module-id";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum IdentityError {
    #[error("[{module_id}] no unclaimed module container available")]
    NoAvailableModule { module_id: String },
}

/// How a container was chosen by [`select_module`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Nearest module enclosing the origin element.
    Origin(NodeId),
    /// First module in document order without a marker.
    Scan(NodeId),
}

impl Selection {
    pub fn node(self) -> NodeId {
        match self {
            Selection::Origin(node) | Selection::Scan(node) => node,
        }
    }
}

/// The container [`assign_identity`] would claim, without marking it.
pub fn select_module(
    doc: &Document,
    classes: &ClassNames,
    origin: Option<NodeId>,
) -> Option<Selection> {
    if let Some(module) = origin.and_then(|node| doc.closest(node, &classes.module_class)) {
        return Some(Selection::Origin(module));
    }
    doc.query_class(doc.body(), &classes.module_class)
        .into_iter()
        .find(|node| {
            doc.get(*node)
                .is_some_and(|el| el.attribute(MARKER_ATTRIBUTE).is_none())
        })
        .map(Selection::Scan)
}

/// Attach `module_id` to one module container and return it.
pub fn assign_identity(
    doc: &mut Document,
    classes: &ClassNames,
    origin: Option<NodeId>,
    module_id: &str,
    events: Option<&Sender<Event>>,
) -> Result<NodeId, IdentityError> {
    let Some(selection) = select_module(doc, classes, origin) else {
        tracing::warn!(module_id, "no unclaimed module container");
        emit(
            events,
            Event::ModuleUnavailable {
                module_id: module_id.to_string(),
            },
        );
        return Err(IdentityError::NoAvailableModule {
            module_id: module_id.to_string(),
        });
    };

    let module = selection.node();
    let by_scan = matches!(selection, Selection::Scan(_));
    doc.set_attribute(module, MARKER_ATTRIBUTE, module_id);
    tracing::debug!(module_id, by_scan, "marked module");
    emit(
        events,
        Event::ModuleMarked {
            module_id: module_id.to_string(),
            by_scan,
        },
    );
    Ok(module)
}

/// Find the container already claimed by `module_id`.
pub fn find_module(doc: &Document, classes: &ClassNames, module_id: &str) -> Option<NodeId> {
    doc.query_class(doc.body(), &classes.module_class)
        .into_iter()
        .find(|node| doc.get(*node).and_then(|el| el.attribute(MARKER_ATTRIBUTE)) == Some(module_id))
}
