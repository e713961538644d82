//! Scroll-driven animation engine seam.
//!
//! The [`ScrollEngine`] trait is the capability set the binder consumes:
//! list active triggers, kill one, and register a from→to tween driven by a
//! scroll trigger. A browser host implements it over its animation library;
//! [`TimelineEngine`] is the in-memory implementation used by the CLI and
//! the tests.
//!
//! The engine is an explicit value. The host constructs it once and passes
//! it to every binder call; nothing here registers global state.
//!
//! ## Trigger Geometry
//!
//! ```text
//! start  = "{trigger}% {viewport}%"   trigger point meets viewport point
//! end    = "+={distance}"             `distance` scroll pixels after start
//! ```
//!
//! For a trigger region at `top` with `height`, in a viewport of height `vh`:
//!
//! ```text
//! start_scroll = top + height * trigger% - vh * viewport%
//! progress     = clamp((scroll - start_scroll) / distance, 0, 1)
//! ```

use crate::dom::NodeId;
use crate::literal::PropertyMap;
use serde::Serialize;
use serde_json::{Number, Value};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("tween has no properties to animate")]
    EmptyTween,
    #[error("invalid trigger geometry: {0}")]
    InvalidGeometry(String),
}

/// Engine-assigned identity of one registered trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TriggerHandle(u64);

impl TriggerHandle {
    /// Wrap an engine-specific trigger key.
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

/// `"{trigger}% {viewport}%"`: when the trigger point meets the viewport point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StartCondition {
    pub trigger_percent: i64,
    pub viewport_percent: i64,
}

impl StartCondition {
    /// Convert fractions to whole percentages, rounding half up.
    pub fn from_fractions(trigger: f64, viewport: f64) -> Self {
        Self {
            trigger_percent: to_percent(trigger),
            viewport_percent: to_percent(viewport),
        }
    }
}

fn to_percent(fraction: f64) -> i64 {
    (fraction * 100.0 + 0.5).floor() as i64
}

impl fmt::Display for StartCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}% {}%", self.trigger_percent, self.viewport_percent)
    }
}

/// `"+={distance}"`: end `distance` scroll pixels after the start.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EndCondition {
    pub distance: f64,
}

impl fmt::Display for EndCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "+={}", self.distance)
    }
}

/// Scroll trigger options shared by every tween of a module.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TriggerSpec {
    /// Namespaced identifier, `{module_id}_trigger_{n}`.
    pub id: String,
    /// Element whose position drives the trigger.
    pub trigger: NodeId,
    pub start: StartCondition,
    pub end: EndCondition,
    pub scrub: f64,
    pub markers: bool,
}

/// A from→to interpolation of one element, driven by a scroll trigger.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TweenSpec {
    pub target: NodeId,
    pub from: PropertyMap,
    pub to: PropertyMap,
    pub scroll_trigger: TriggerSpec,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveTrigger {
    pub handle: TriggerHandle,
    pub id: String,
}

pub trait ScrollEngine {
    /// Active triggers in registration order.
    fn active_triggers(&self) -> Vec<ActiveTrigger>;

    /// Kill a trigger and its tween. Returns false if it was not active.
    fn kill(&mut self, handle: TriggerHandle) -> bool;

    /// Register a tween and its trigger.
    fn from_to(&mut self, tween: TweenSpec) -> Result<TriggerHandle, EngineError>;
}

/// Position of a trigger element in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriggerLayout {
    pub top: f64,
    pub height: f64,
}

#[derive(Debug, Clone)]
struct Registered {
    handle: TriggerHandle,
    tween: TweenSpec,
    /// Progress implied by the current scroll position.
    target: f64,
    /// Smoothed progress actually rendered.
    progress: f64,
}

/// In-memory [`ScrollEngine`] that evaluates scrubbed progress.
#[derive(Debug, Default)]
pub struct TimelineEngine {
    next_handle: u64,
    triggers: Vec<Registered>,
}

impl TimelineEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tween(&self, handle: TriggerHandle) -> Option<&TweenSpec> {
        self.find(handle).map(|r| &r.tween)
    }

    fn find(&self, handle: TriggerHandle) -> Option<&Registered> {
        self.triggers.iter().find(|r| r.handle == handle)
    }

    /// Recompute each trigger's target progress for a scroll position.
    ///
    /// Triggers with `scrub = 0` jump straight to the target; others move
    /// on [`tick`](Self::tick). Triggers whose element has no layout keep
    /// their previous target.
    pub fn scroll_to<F>(&mut self, scroll_y: f64, viewport_height: f64, layout: F)
    where
        F: Fn(NodeId) -> Option<TriggerLayout>,
    {
        for reg in &mut self.triggers {
            let st = &reg.tween.scroll_trigger;
            let Some(region) = layout(st.trigger) else {
                continue;
            };
            reg.target = raw_progress(scroll_y, viewport_height, region, st.start, st.end);
            if st.scrub <= 0.0 {
                reg.progress = reg.target;
            }
        }
    }

    /// Advance smoothed progress by `dt` seconds.
    pub fn tick(&mut self, dt: f64) {
        for reg in &mut self.triggers {
            let scrub = reg.tween.scroll_trigger.scrub;
            let alpha = if scrub <= 0.0 {
                1.0
            } else {
                (dt / scrub).clamp(0.0, 1.0)
            };
            reg.progress += (reg.target - reg.progress) * alpha;
        }
    }

    /// Let every trigger catch up with its target.
    pub fn settle(&mut self) {
        for reg in &mut self.triggers {
            reg.progress = reg.target;
        }
    }

    pub fn progress(&self, handle: TriggerHandle) -> Option<f64> {
        self.find(handle).map(|r| r.progress)
    }

    /// Interpolated properties of a tween at its current progress.
    pub fn sample(&self, handle: TriggerHandle) -> Option<PropertyMap> {
        let reg = self.find(handle)?;
        Some(interpolate_map(&reg.tween.from, &reg.tween.to, reg.progress))
    }
}

impl ScrollEngine for TimelineEngine {
    fn active_triggers(&self) -> Vec<ActiveTrigger> {
        self.triggers
            .iter()
            .map(|r| ActiveTrigger {
                handle: r.handle,
                id: r.tween.scroll_trigger.id.clone(),
            })
            .collect()
    }

    fn kill(&mut self, handle: TriggerHandle) -> bool {
        let before = self.triggers.len();
        self.triggers.retain(|r| r.handle != handle);
        self.triggers.len() != before
    }

    fn from_to(&mut self, tween: TweenSpec) -> Result<TriggerHandle, EngineError> {
        if tween.from.is_empty() && tween.to.is_empty() {
            return Err(EngineError::EmptyTween);
        }
        let st = &tween.scroll_trigger;
        if !(st.end.distance.is_finite() && st.end.distance > 0.0) {
            return Err(EngineError::InvalidGeometry(format!(
                "end distance {} must be positive",
                st.end.distance
            )));
        }
        if !(st.scrub.is_finite() && st.scrub >= 0.0) {
            return Err(EngineError::InvalidGeometry(format!(
                "scrub {} must not be negative",
                st.scrub
            )));
        }
        let handle = TriggerHandle(self.next_handle);
        self.next_handle += 1;
        self.triggers.push(Registered {
            handle,
            tween,
            target: 0.0,
            progress: 0.0,
        });
        Ok(handle)
    }
}

/// Scroll position at which a trigger starts.
pub fn start_scroll(viewport_height: f64, region: TriggerLayout, start: StartCondition) -> f64 {
    region.top + region.height * start.trigger_percent as f64 / 100.0
        - viewport_height * start.viewport_percent as f64 / 100.0
}

fn raw_progress(
    scroll_y: f64,
    viewport_height: f64,
    region: TriggerLayout,
    start: StartCondition,
    end: EndCondition,
) -> f64 {
    let begin = start_scroll(viewport_height, region, start);
    ((scroll_y - begin) / end.distance).clamp(0.0, 1.0)
}

/// Interpolate every property of a tween at progress `t`.
///
/// A property present on one side only holds that side's value.
pub fn interpolate_map(from: &PropertyMap, to: &PropertyMap, t: f64) -> PropertyMap {
    let mut out = from.clone();
    for (key, end) in to {
        let value = match from.get(key) {
            Some(start) => interpolate(start, end, t),
            None => end.clone(),
        };
        out.insert(key.clone(), value);
    }
    out
}

/// Numbers and same-unit `"12.5px"` strings interpolate linearly; anything
/// else switches to the end value at `t = 1`.
pub fn interpolate(from: &Value, to: &Value, t: f64) -> Value {
    match (from, to) {
        (Value::Number(a), Value::Number(b)) => {
            let (Some(a), Some(b)) = (a.as_f64(), b.as_f64()) else {
                return step(from, to, t);
            };
            Number::from_f64(round(lerp(a, b, t)))
                .map(Value::Number)
                .unwrap_or_else(|| step(from, to, t))
        }
        (Value::String(a), Value::String(b)) => match (split_unit(a), split_unit(b)) {
            (Some((x, unit_a)), Some((y, unit_b))) if unit_a == unit_b => {
                Value::String(format!("{}{}", round(lerp(x, y, t)), unit_a))
            }
            _ => step(from, to, t),
        },
        _ => step(from, to, t),
    }
}

fn step(from: &Value, to: &Value, t: f64) -> Value {
    if t >= 1.0 { to.clone() } else { from.clone() }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

fn round(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

/// Split `"-12.5px"` into `(-12.5, "px")`. Bare numbers have an empty unit.
fn split_unit(s: &str) -> Option<(f64, &str)> {
    let s = s.trim();
    let end = s
        .char_indices()
        .find(|(i, c)| !(c.is_ascii_digit() || *c == '.' || (*i == 0 && (*c == '-' || *c == '+'))))
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    let value = s[..end].parse().ok()?;
    Some((value, &s[end..]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Document;
    use crate::literal::parse_property_map;
    use serde_json::json;

    fn spec(id: &str, node: NodeId, from: &str, to: &str, scrub: f64) -> TweenSpec {
        TweenSpec {
            target: node,
            from: parse_property_map(from).unwrap(),
            to: parse_property_map(to).unwrap(),
            scroll_trigger: TriggerSpec {
                id: id.to_string(),
                trigger: node,
                start: StartCondition::from_fractions(0.0, 1.0),
                end: EndCondition { distance: 1000.0 },
                scrub,
                markers: false,
            },
        }
    }

    fn node() -> NodeId {
        Document::new().body()
    }

    fn at(top: f64, height: f64) -> impl Fn(NodeId) -> Option<TriggerLayout> {
        move |_| Some(TriggerLayout { top, height })
    }

    #[test]
    fn start_condition_formats_percentages() {
        let start = StartCondition::from_fractions(0.25, 0.8);
        assert_eq!(start.to_string(), "25% 80%");
        assert_eq!(StartCondition::from_fractions(0.005, 1.0).to_string(), "1% 100%");
        assert_eq!(EndCondition { distance: 1200.0 }.to_string(), "+=1200");
        assert_eq!(EndCondition { distance: 750.5 }.to_string(), "+=750.5");
    }

    #[test]
    fn handles_are_unique_and_kill_is_exact() {
        let mut engine = TimelineEngine::new();
        let a = engine.from_to(spec("m_trigger_0", node(), "{y:0}", "{y:1}", 1.0)).unwrap();
        let b = engine.from_to(spec("m_trigger_0", node(), "{y:0}", "{y:1}", 1.0)).unwrap();
        assert_ne!(a, b);

        assert!(engine.kill(a));
        assert!(!engine.kill(a));
        let active = engine.active_triggers();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].handle, b);
    }

    #[test]
    fn rejects_empty_tween_and_bad_geometry() {
        let mut engine = TimelineEngine::new();
        assert_eq!(
            engine.from_to(spec("x", node(), "{}", "{}", 1.0)).unwrap_err(),
            EngineError::EmptyTween
        );
        let mut bad = spec("x", node(), "{y:0}", "{y:1}", 1.0);
        bad.scroll_trigger.end.distance = 0.0;
        assert!(matches!(
            engine.from_to(bad).unwrap_err(),
            EngineError::InvalidGeometry(_)
        ));
        assert!(engine.active_triggers().is_empty());
    }

    #[test]
    fn progress_follows_scroll_without_scrub() {
        let mut engine = TimelineEngine::new();
        let h = engine.from_to(spec("x", node(), "{y:0}", "{y:100}", 0.0)).unwrap();

        // start = 2000 + 0 - 800 = 1200
        engine.scroll_to(1000.0, 800.0, at(2000.0, 600.0));
        assert_eq!(engine.progress(h), Some(0.0));
        engine.scroll_to(1700.0, 800.0, at(2000.0, 600.0));
        assert_eq!(engine.progress(h), Some(0.5));
        engine.scroll_to(5000.0, 800.0, at(2000.0, 600.0));
        assert_eq!(engine.progress(h), Some(1.0));
    }

    #[test]
    fn scrub_smooths_toward_target() {
        let mut engine = TimelineEngine::new();
        let h = engine.from_to(spec("x", node(), "{y:0}", "{y:100}", 1.0)).unwrap();

        engine.scroll_to(2200.0, 800.0, at(2000.0, 600.0));
        assert_eq!(engine.progress(h), Some(0.0));
        engine.tick(0.5);
        assert_eq!(engine.progress(h), Some(0.5));
        engine.tick(0.5);
        assert_eq!(engine.progress(h), Some(0.75));
        engine.settle();
        assert_eq!(engine.progress(h), Some(1.0));
    }

    #[test]
    fn sample_interpolates_numbers_and_units() {
        let mut engine = TimelineEngine::new();
        let h = engine
            .from_to(spec(
                "x",
                node(),
                "{ y: 200, x: '-10%', opacity: 0, ease: 'none' }",
                "{ y: -100, x: '10%', opacity: 1, ease: 'power2' }",
                0.0,
            ))
            .unwrap();
        engine.scroll_to(1700.0, 800.0, at(2000.0, 600.0));

        let props = engine.sample(h).unwrap();
        assert_eq!(props["y"], json!(50.0));
        assert_eq!(props["x"], json!("0%"));
        assert_eq!(props["opacity"], json!(0.5));
        assert_eq!(props["ease"], json!("none"));
    }

    #[test]
    fn mismatched_units_step_at_end() {
        assert_eq!(interpolate(&json!("10px"), &json!("5rem"), 0.5), json!("10px"));
        assert_eq!(interpolate(&json!("10px"), &json!("5rem"), 1.0), json!("5rem"));
    }

    #[test]
    fn one_sided_property_holds_its_value() {
        let from = parse_property_map("{ y: 10 }").unwrap();
        let to = parse_property_map("{ y: 20, rotation: 45 }").unwrap();
        let out = interpolate_map(&from, &to, 0.5);
        assert_eq!(out["y"], json!(15.0));
        assert_eq!(out["rotation"], json!(45));
    }

    #[test]
    fn split_unit_parses_signed_values() {
        assert_eq!(split_unit("-12.5px"), Some((-12.5, "px")));
        assert_eq!(split_unit("30"), Some((30.0, "")));
        assert_eq!(split_unit("deg"), None);
    }

    #[test]
    fn start_scroll_uses_both_fractions() {
        let region = TriggerLayout {
            top: 1000.0,
            height: 400.0,
        };
        let start = StartCondition::from_fractions(0.5, 0.25);
        assert_eq!(start_scroll(800.0, region, start), 1000.0);
    }
}
