//! Purpose: Filter stages applying per-event enrichment inside a host pipeline.
//! Exports: `FilterOutcome`, `Decorations`, and the `json` stage.
//! Role: Shared surface between the host pipeline's bookkeeping and each stage.
//! Invariants: Outcomes are plain data inspected by the caller; stages raise nothing.
//! Invariants: Decorations run only after a stage reports a match.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::core::event::Event;

pub mod json;

pub use json::{DEFAULT_FAILURE_TAG, JsonFilter, JsonFilterConfig};

/// Per-event result a stage reports back to the pipeline's match bookkeeping.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FilterOutcome {
    /// The stage processed the event and mutated it.
    Matched,
    /// The stage had nothing to do; the event is untouched and unmarked.
    Skipped,
    /// The stage failed; the event is untouched apart from failure tags.
    Failed,
}

impl FilterOutcome {
    pub fn is_match(self) -> bool {
        self == FilterOutcome::Matched
    }
}

/// Event mutations applied after every successful match, in declaration
/// order: add fields, remove fields, add tags, remove tags.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Decorations {
    pub add_field: Map<String, Value>,
    pub remove_field: Vec<String>,
    pub add_tag: Vec<String>,
    pub remove_tag: Vec<String>,
}

impl Decorations {
    pub fn is_empty(&self) -> bool {
        self.add_field.is_empty()
            && self.remove_field.is_empty()
            && self.add_tag.is_empty()
            && self.remove_tag.is_empty()
    }

    pub fn apply(&self, event: &mut Event) {
        for (field, value) in &self.add_field {
            event.set(field.clone(), value.clone());
        }
        for field in &self.remove_field {
            event.remove(field);
        }
        for tag in &self.add_tag {
            event.tag(tag.clone());
        }
        for tag in &self.remove_tag {
            event.remove_tag(tag);
        }
    }
}
