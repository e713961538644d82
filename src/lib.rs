//! # Parallax Kit
//!
//! Scroll-linked parallax image modules. A page carries any number of
//! parallax modules; each is a container holding a background image and a
//! stack of foreground images, and each foreground image can move between
//! two property states as the visitor scrolls past the module.
//!
//! # Architecture: One Pipeline Per Module
//!
//! Every module's initialization script runs the same four steps against a
//! shared page:
//!
//! ```text
//! 1. Identity  origin element  →  claimed module container   (data-module-id)
//! 2. Locate    module          →  wrapper element            (.parallax-wrapper)
//! 3. Load      descriptors     →  <img> elements             (src, srcset, sizes)
//! 4. Bind      descriptors     →  scroll-scrubbed tweens     ({id}_trigger_{n})
//! ```
//!
//! [`page::Page::initialize_module`] runs them in order. Modules never share
//! state: element ids, trigger ids, and element lookups are all scoped by the
//! module identifier.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`srcset`] | Responsive variant URLs derived from a size-marked image URL |
//! | [`literal`] | Safe parser for the relaxed object literals in animation params |
//! | [`dom`] | In-memory page model the pipeline mutates |
//! | [`types`] | Manifest wire types: image descriptors and scroll geometry |
//! | [`identity`] | Step 1: claim one module container per initialization |
//! | [`loader`] | Step 3: replace the wrapper's children with the module's images |
//! | [`engine`] | The scroll-animation engine seam plus an in-memory engine |
//! | [`binder`] | Step 4: per-module trigger registry and tween registration |
//! | [`page`] | Runs the pipeline for one module on a shared page |
//! | [`events`] | Structured progress events core functions report through |
//! | [`config`] | `parallax.toml` loading, merging with stock defaults, validation |
//! | [`render`] | HTML serialization of the page with Maud |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## No Code Evaluation
//!
//! Animation params arrive as object-literal text authored in a CMS
//! (`{ y: 200, opacity: 0.5 }`). They are parsed by a small grammar in
//! [`literal`], never evaluated. A malformed literal disables that one
//! image's animation and is reported; nothing else is affected.
//!
//! ## Explicit Engine and Registry
//!
//! The animation engine is a value passed to the binder, not a global. The
//! binder remembers which triggers each module registered, so
//! re-initializing a module kills exactly its own triggers before
//! registering new ones.
//!
//! ## Events Instead of Printing
//!
//! Core functions take an optional `Sender<Event>` and report what they did.
//! The CLI drains the channel on a printer thread through
//! [`output::format_event`]; tests collect it into a `Vec`.

pub mod binder;
pub mod config;
pub mod dom;
pub mod engine;
pub mod events;
pub mod identity;
pub mod literal;
pub mod loader;
pub mod output;
pub mod page;
pub mod render;
pub mod srcset;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
