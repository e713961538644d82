//! Progress and diagnostic events.
//!
//! Core functions never print. They accept an optional
//! `&Sender<Event>` and report what they did; the caller decides whether
//! to display, collect, or drop the stream. [`crate::output::format_event`]
//! turns an event into display lines.

use serde::Serialize;
use std::sync::mpsc::Sender;

/// Why an image got no animation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    NoUrl,
    Background,
    /// `fromParams`/`toParams` missing, blank, or parsed to an empty map.
    NoParams,
    MalformedParams { field: String, error: String },
    MissingElement { element_id: String },
    EngineRejected { error: String },
}

impl SkipReason {
    /// Skips that indicate broken content or page state rather than an
    /// image that simply isn't animated.
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            SkipReason::MalformedParams { .. }
                | SkipReason::MissingElement { .. }
                | SkipReason::EngineRejected { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    ModuleMarked {
        module_id: String,
        /// True when claimed by scanning for an unmarked module.
        by_scan: bool,
    },
    ModuleUnavailable {
        module_id: String,
    },
    ContainerUnavailable {
        module_id: String,
    },
    BackgroundLoaded {
        module_id: String,
        element_id: String,
        url: String,
    },
    ImageLoaded {
        module_id: String,
        element_id: String,
        url: String,
    },
    ImagesLoaded {
        module_id: String,
        rendered: usize,
        total: usize,
    },
    TriggersCleared {
        module_id: String,
        count: usize,
    },
    AnimationCreated {
        module_id: String,
        element_id: String,
        trigger_id: String,
    },
    AnimationSkipped {
        module_id: String,
        image: String,
        reason: SkipReason,
    },
}

/// Send `event` if a listener is attached. A dropped receiver is not an error.
pub(crate) fn emit(events: Option<&Sender<Event>>, event: Event) {
    if let Some(tx) = events {
        let _ = tx.send(event);
    }
}
