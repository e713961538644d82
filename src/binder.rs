//! Scroll animation binding.
//!
//! For one module, registers a scrubbed from→to tween per animated image.
//! Each module moves through two states:
//!
//! ```text
//! Unbound ──bind──▶ Bound ──bind──▶ Bound ...
//! ```
//!
//! Every bind first kills the triggers the module already owns, then
//! registers the new set, so re-initializing a module never leaves duplicate
//! or orphaned triggers behind.
//!
//! ## Ownership
//!
//! The [`Binder`] keeps a registry from module id to the engine handles it
//! registered. Cleanup kills those handles, then sweeps any remaining
//! trigger whose id has this module's exact `{module_id}_trigger_{n}` shape,
//! which covers triggers registered before this binder existed. A module
//! never kills a trigger whose id merely shares a prefix (`a` vs `a_b`).
//!
//! ## Isolation
//!
//! Image elements are looked up only inside the module's own element, so two
//! modules whose images share an element id each animate their own copy.

use crate::config::AnimationConfig;
use crate::dom::{Document, NodeId};
use crate::engine::{
    EndCondition, ScrollEngine, StartCondition, TriggerHandle, TriggerSpec, TweenSpec,
};
use crate::events::{Event, SkipReason, emit};
use crate::literal::{self, PropertyMap};
use crate::types::{ImageDescriptor, ScrollConfig};
use std::collections::HashMap;
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BindError {
    #[error("[{module_id}] module element or image container is not on the page")]
    ContainerUnavailable { module_id: String },
    #[error("[{module_id}] id is already bound to another module on the page")]
    DuplicateModuleId { module_id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingState {
    Unbound,
    Bound,
}

/// What a module owns after a successful bind.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleBinding {
    pub container: NodeId,
    pub module_element: NodeId,
    pub triggers: Vec<TriggerHandle>,
}

/// Inputs of one bind call.
#[derive(Debug, Clone, Copy)]
pub struct BindRequest<'a> {
    pub module_id: &'a str,
    pub scroll: &'a ScrollConfig,
    pub descriptors: &'a [ImageDescriptor],
    /// Element whose scroll position drives every trigger of the module.
    pub container: NodeId,
    /// Scope for image lookups.
    pub module_element: NodeId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoundAnimation {
    pub descriptor_id: i64,
    pub element: NodeId,
    pub element_id: String,
    pub trigger_id: String,
    pub handle: TriggerHandle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedImage {
    pub descriptor_id: i64,
    pub label: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BindReport {
    /// Triggers killed before registering the new set.
    pub cleared: usize,
    pub animations: Vec<BoundAnimation>,
    pub skipped: Vec<SkippedImage>,
}

impl BindReport {
    /// Skips caused by malformed content or missing elements.
    pub fn errors(&self) -> impl Iterator<Item = &SkippedImage> {
        self.skipped.iter().filter(|s| s.reason.is_error())
    }
}

/// Trigger id for the `index`-th descriptor of a module.
pub fn trigger_id(module_id: &str, index: usize) -> String {
    format!("{module_id}_trigger_{index}")
}

/// Whether `id` was produced by [`trigger_id`] for `module_id`.
pub fn is_owned_trigger(module_id: &str, id: &str) -> bool {
    id.strip_prefix(module_id)
        .and_then(|rest| rest.strip_prefix("_trigger_"))
        .is_some_and(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
}

/// Per-page registry of module bindings.
#[derive(Debug, Default)]
pub struct Binder {
    animation: AnimationConfig,
    registry: HashMap<String, ModuleBinding>,
}

impl Binder {
    pub fn new(animation: AnimationConfig) -> Self {
        Self {
            animation,
            registry: HashMap::new(),
        }
    }

    pub fn state(&self, module_id: &str) -> BindingState {
        if self.registry.contains_key(module_id) {
            BindingState::Bound
        } else {
            BindingState::Unbound
        }
    }

    pub fn binding(&self, module_id: &str) -> Option<&ModuleBinding> {
        self.registry.get(module_id)
    }

    /// Fails when `module_id` is bound to a connected element other than
    /// `module_element`.
    pub fn check_owner(
        &self,
        doc: &Document,
        module_id: &str,
        module_element: NodeId,
    ) -> Result<(), BindError> {
        match self.registry.get(module_id) {
            Some(binding)
                if binding.module_element != module_element
                    && doc.is_connected(binding.module_element) =>
            {
                Err(BindError::DuplicateModuleId {
                    module_id: module_id.to_string(),
                })
            }
            _ => Ok(()),
        }
    }

    /// Kill every trigger owned by `module_id`. Returns how many were killed.
    fn clear_module<E: ScrollEngine>(&mut self, engine: &mut E, module_id: &str) -> usize {
        let mut killed = 0;
        if let Some(binding) = self.registry.get_mut(module_id) {
            for handle in binding.triggers.drain(..) {
                if engine.kill(handle) {
                    killed += 1;
                }
            }
        }
        for trigger in engine.active_triggers() {
            if is_owned_trigger(module_id, &trigger.id) && engine.kill(trigger.handle) {
                killed += 1;
            }
        }
        killed
    }

    /// Replace the module's triggers with one tween per animated image.
    ///
    /// Per-image problems are reported in the [`BindReport`] and as events;
    /// they never stop the remaining images from binding.
    pub fn bind_animations<E: ScrollEngine>(
        &mut self,
        engine: &mut E,
        doc: &Document,
        request: &BindRequest<'_>,
        events: Option<&Sender<Event>>,
    ) -> Result<BindReport, BindError> {
        let module_id = request.module_id;
        if let Err(e) = self.check_owner(doc, module_id, request.module_element) {
            tracing::warn!(module_id, "module id already bound elsewhere");
            return Err(e);
        }
        let mut report = BindReport {
            cleared: self.clear_module(engine, module_id),
            ..Default::default()
        };
        tracing::debug!(module_id, cleared = report.cleared, "cleared module triggers");
        emit(
            events,
            Event::TriggersCleared {
                module_id: module_id.to_string(),
                count: report.cleared,
            },
        );

        if !doc.is_connected(request.container) || !doc.is_connected(request.module_element) {
            self.registry.remove(module_id);
            tracing::warn!(module_id, "cannot bind: elements not on the page");
            return Err(BindError::ContainerUnavailable {
                module_id: module_id.to_string(),
            });
        }

        let start = StartCondition::from_fractions(
            request.scroll.trigger_start_position,
            request.scroll.start_viewport_position,
        );
        let end = EndCondition {
            distance: request.scroll.scroll_distance,
        };

        let mut handles = Vec::new();
        for (index, image) in request.descriptors.iter().enumerate() {
            let outcome = self.bind_one(engine, doc, request, index, image, start, end);
            match outcome {
                Ok(bound) => {
                    emit(
                        events,
                        Event::AnimationCreated {
                            module_id: module_id.to_string(),
                            element_id: bound.element_id.clone(),
                            trigger_id: bound.trigger_id.clone(),
                        },
                    );
                    handles.push(bound.handle);
                    report.animations.push(bound);
                }
                Err(reason) => {
                    if reason.is_error() {
                        tracing::warn!(module_id, image = %image.label(), ?reason, "animation skipped");
                    }
                    emit(
                        events,
                        Event::AnimationSkipped {
                            module_id: module_id.to_string(),
                            image: image.label(),
                            reason: reason.clone(),
                        },
                    );
                    report.skipped.push(SkippedImage {
                        descriptor_id: image.id,
                        label: image.label(),
                        reason,
                    });
                }
            }
        }

        self.registry.insert(
            module_id.to_string(),
            ModuleBinding {
                container: request.container,
                module_element: request.module_element,
                triggers: handles,
            },
        );
        Ok(report)
    }

    #[allow(clippy::too_many_arguments)]
    fn bind_one<E: ScrollEngine>(
        &self,
        engine: &mut E,
        doc: &Document,
        request: &BindRequest<'_>,
        index: usize,
        image: &ImageDescriptor,
        start: StartCondition,
        end: EndCondition,
    ) -> Result<BoundAnimation, SkipReason> {
        if image.url().is_none() {
            return Err(SkipReason::NoUrl);
        }
        if image.is_background {
            return Err(SkipReason::Background);
        }
        let from = parse_params("fromParams", image.from_params.as_deref())?;
        let to = parse_params("toParams", image.to_params.as_deref())?;

        let element_id = image.element_id(request.module_id);
        let element = doc
            .find_by_id_within(request.module_element, &element_id)
            .ok_or_else(|| SkipReason::MissingElement {
                element_id: element_id.clone(),
            })?;

        let trigger_id = trigger_id(request.module_id, index);
        let tween = TweenSpec {
            target: element,
            from,
            to,
            scroll_trigger: TriggerSpec {
                id: trigger_id.clone(),
                trigger: request.container,
                start,
                end,
                scrub: self.animation.scrub,
                markers: self.animation.markers,
            },
        };
        let handle = engine
            .from_to(tween)
            .map_err(|e| SkipReason::EngineRejected {
                error: e.to_string(),
            })?;

        Ok(BoundAnimation {
            descriptor_id: image.id,
            element,
            element_id,
            trigger_id,
            handle,
        })
    }
}

/// Parse one side of an animation; blank or empty maps mean "not animated".
fn parse_params(field: &str, text: Option<&str>) -> Result<PropertyMap, SkipReason> {
    let Some(text) = text.filter(|t| !literal::is_blank_literal(t)) else {
        return Err(SkipReason::NoParams);
    };
    let map = literal::parse_property_map(text).map_err(|e| SkipReason::MalformedParams {
        field: field.to_string(),
        error: e.to_string(),
    })?;
    if map.is_empty() {
        return Err(SkipReason::NoParams);
    }
    Ok(map)
}
