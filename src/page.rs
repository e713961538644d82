//! Per-module initialization on a page.
//!
//! A [`Page`] owns the document, the scroll engine, and the binder registry
//! shared by every module on it. Each module's script runs
//! [`Page::initialize_module`], which performs:
//!
//! ```text
//! assign identity  →  find wrapper  →  load images  →  bind animations
//! ```
//!
//! Out-of-range scroll geometry or a module id already bound to another
//! container stops before the page is touched. An identity failure stops
//! everything. A missing wrapper stops before any element is created.
//! Per-image problems surface in the [`InitReport`].

use crate::binder::{BindError, BindReport, BindRequest, Binder};
use crate::config::{ClassNames, ParallaxConfig};
use crate::dom::{Document, NodeId, Tag};
use crate::engine::ScrollEngine;
use crate::events::Event;
use crate::identity::{IdentityError, assign_identity, select_module};
use crate::loader::{LoadError, LoadReport, load_images};
use crate::types::{InvalidScroll, ModuleManifest, ScrollConfig};
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum InitError {
    #[error(transparent)]
    Identity(#[from] IdentityError),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Bind(#[from] BindError),
    #[error("[{module_id}] invalid scroll config: {error}")]
    InvalidScroll {
        module_id: String,
        error: InvalidScroll,
    },
}

/// Elements of an empty module as a page template emits it:
///
/// ```text
/// section.parallax-module
/// ├── div.parallax-wrapper
/// └── script
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuleSkeleton {
    pub module: NodeId,
    pub wrapper: NodeId,
    pub script: NodeId,
}

pub fn append_module_skeleton(
    doc: &mut Document,
    parent: NodeId,
    classes: &ClassNames,
) -> ModuleSkeleton {
    let module = doc.append_new(parent, Tag::Section);
    doc.add_class(module, &classes.module_class);
    let wrapper = doc.append_new(module, Tag::Div);
    doc.add_class(wrapper, &classes.wrapper_class);
    let script = doc.append_new(module, Tag::Script);
    ModuleSkeleton {
        module,
        wrapper,
        script,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InitReport {
    pub module: NodeId,
    pub wrapper: NodeId,
    /// Site scroll geometry with the manifest's overrides applied.
    pub scroll: ScrollConfig,
    pub load: LoadReport,
    pub bind: BindReport,
}

pub struct Page<E> {
    document: Document,
    engine: E,
    binder: Binder,
    config: ParallaxConfig,
    events: Option<Sender<Event>>,
}

impl<E: ScrollEngine> Page<E> {
    pub fn new(engine: E, config: ParallaxConfig) -> Self {
        Self::with_document(Document::new(), engine, config)
    }

    pub fn with_document(document: Document, engine: E, config: ParallaxConfig) -> Self {
        Self {
            document,
            engine,
            binder: Binder::new(config.animation),
            config,
            events: None,
        }
    }

    /// Report progress on `tx` for every subsequent call.
    pub fn with_events(mut self, tx: Sender<Event>) -> Self {
        self.events = Some(tx);
        self
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn binder(&self) -> &Binder {
        &self.binder
    }

    pub fn config(&self) -> &ParallaxConfig {
        &self.config
    }

    /// Append an empty module skeleton to `<body>`.
    pub fn add_module(&mut self) -> ModuleSkeleton {
        let body = self.document.body();
        append_module_skeleton(&mut self.document, body, &self.config.markup)
    }

    /// Initialize one module from its manifest.
    ///
    /// `origin` is the element the initialization came from, usually the
    /// module's own script. Calling this again for the same module replaces
    /// its images and triggers.
    pub fn initialize_module(
        &mut self,
        origin: Option<NodeId>,
        module_id: &str,
        manifest: &ModuleManifest,
    ) -> Result<InitReport, InitError> {
        let classes = &self.config.markup;
        let events = self.events.as_ref();

        let scroll = manifest.scroll_config.apply(&self.config.scroll);
        scroll.validate().map_err(|error| InitError::InvalidScroll {
            module_id: module_id.to_string(),
            error,
        })?;
        if let Some(selection) = select_module(&self.document, classes, origin) {
            self.binder
                .check_owner(&self.document, module_id, selection.node())?;
        }

        let module = assign_identity(&mut self.document, classes, origin, module_id, events)?;
        let wrapper = self
            .document
            .query_class(module, &classes.wrapper_class)
            .into_iter()
            .next();
        let load = load_images(
            &mut self.document,
            classes,
            module_id,
            wrapper,
            &manifest.images,
            events,
        )?;
        // load_images only succeeds with a container
        let wrapper = wrapper.ok_or_else(|| LoadError::ContainerUnavailable {
            module_id: module_id.to_string(),
        })?;

        let request = BindRequest {
            module_id,
            scroll: &scroll,
            descriptors: &manifest.images,
            container: wrapper,
            module_element: module,
        };
        let bind = self
            .binder
            .bind_animations(&mut self.engine, &self.document, &request, events)?;

        tracing::debug!(
            module_id,
            images = load.rendered(),
            animations = bind.animations.len(),
            "module initialized"
        );
        Ok(InitReport {
            module,
            wrapper,
            scroll,
            load,
            bind,
        })
    }

    pub fn into_parts(self) -> (Document, E) {
        (self.document, self.engine)
    }
}
