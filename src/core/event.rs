//! Purpose: Ordered field-to-value event mapping with reserved timestamp/tags keys.
//! Exports: `Event`, `TIMESTAMP_FIELD`, `TAGS_FIELD`, `TIMESTAMP_FAILURE_TAG`, `TIMESTAMP_FAILURE_FIELD`.
//! Role: The record enriched by filter stages; supplied and owned by the host pipeline.
//! Invariants: One insertion-ordered map holds every field, reserved keys included.
//! Invariants: Reserved keys are special-cased only by their dedicated accessors;
//! the uniform get/set surface treats them like any other field.
//! Invariants: `tag` appends in call order, never dedups, never reorders.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::timestamp::Timestamp;

pub const TIMESTAMP_FIELD: &str = "@timestamp";
pub const TAGS_FIELD: &str = "tags";
pub const TIMESTAMP_FAILURE_TAG: &str = "_timestampparsefailure";
pub const TIMESTAMP_FAILURE_FIELD: &str = "_@timestamp";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Event {
    fields: Map<String, Value>,
}

impl Event {
    pub fn new() -> Self {
        Self { fields: Map::new() }
    }

    pub fn from_fields(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn set(&mut self, field: impl Into<String>, value: Value) {
        self.fields.insert(field.into(), value);
    }

    /// Remove a field, preserving the relative order of the remaining fields.
    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.fields.shift_remove(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Append a tag. A pre-existing non-sequence `tags` value is converted to
    /// a sequence retaining the old value first.
    pub fn tag(&mut self, tag: impl Into<String>) {
        let tag = Value::String(tag.into());
        match self.fields.get_mut(TAGS_FIELD) {
            Some(Value::Array(tags)) => tags.push(tag),
            Some(existing) => {
                let previous = existing.take();
                *existing = Value::Array(vec![previous, tag]);
            }
            None => {
                self.fields
                    .insert(TAGS_FIELD.to_string(), Value::Array(vec![tag]));
            }
        }
    }

    /// Remove every occurrence of a tag. No-op when `tags` is not a sequence.
    pub fn remove_tag(&mut self, tag: &str) {
        if let Some(Value::Array(tags)) = self.fields.get_mut(TAGS_FIELD) {
            tags.retain(|existing| existing.as_str() != Some(tag));
        }
    }

    pub fn tags(&self) -> Option<&Vec<Value>> {
        self.fields.get(TAGS_FIELD).and_then(Value::as_array)
    }

    pub fn timestamp(&self) -> Option<Timestamp> {
        self.fields
            .get(TIMESTAMP_FIELD)
            .and_then(Value::as_str)
            .and_then(|text| Timestamp::parse(text).ok())
    }

    pub fn set_timestamp(&mut self, timestamp: Timestamp) {
        self.fields
            .insert(TIMESTAMP_FIELD.to_string(), Value::String(timestamp.to_string()));
    }

    /// Render the full event for diagnostics and serialization.
    pub fn to_value(&self) -> Value {
        Value::Object(self.fields.clone())
    }
}

impl From<Map<String, Value>> for Event {
    fn from(fields: Map<String, Value>) -> Self {
        Self::from_fields(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::{Event, TAGS_FIELD, TIMESTAMP_FIELD};
    use crate::core::timestamp::Timestamp;
    use serde_json::{Value, json};

    #[test]
    fn tag_appends_in_order_without_dedup() {
        let mut event = Event::new();
        event.tag("_first");
        event.tag("_second");
        event.tag("_first");
        assert_eq!(
            event.get(TAGS_FIELD),
            Some(&json!(["_first", "_second", "_first"]))
        );
    }

    #[test]
    fn tag_converts_scalar_tags_to_sequence() {
        let mut event = Event::new();
        event.set(TAGS_FIELD, json!("legacy"));
        event.tag("_jsonparsefailure");
        assert_eq!(
            event.get(TAGS_FIELD),
            Some(&json!(["legacy", "_jsonparsefailure"]))
        );
    }

    #[test]
    fn remove_tag_drops_every_occurrence() {
        let mut event = Event::new();
        event.tag("_keep");
        event.tag("_drop");
        event.tag("_drop");
        event.remove_tag("_drop");
        assert_eq!(event.get(TAGS_FIELD), Some(&json!(["_keep"])));
    }

    #[test]
    fn remove_preserves_field_order() {
        let mut event = Event::new();
        event.set("a", json!(1));
        event.set("b", json!(2));
        event.set("c", json!(3));
        event.remove("b");
        let names: Vec<&str> = event.field_names().collect();
        assert_eq!(names, vec!["a", "c"]);
    }

    #[test]
    fn timestamp_accessors_round_trip_through_the_map() {
        let mut event = Event::new();
        let ts = Timestamp::parse("2013-10-19T00:14:32.996Z").expect("parse");
        event.set_timestamp(ts);
        assert_eq!(
            event.get(TIMESTAMP_FIELD),
            Some(&Value::String("2013-10-19T00:14:32.996Z".to_string()))
        );
        assert_eq!(event.timestamp(), Some(ts));
    }

    #[test]
    fn timestamp_is_none_for_missing_or_unparsable_text() {
        let mut event = Event::new();
        assert!(event.timestamp().is_none());
        event.set(TIMESTAMP_FIELD, json!("not a timestamp"));
        assert!(event.timestamp().is_none());
    }

    #[test]
    fn event_serializes_as_its_field_map() {
        let mut event = Event::new();
        event.set("hello", json!("world"));
        event.tag("_seen");
        let rendered = serde_json::to_value(&event).expect("serialize");
        assert_eq!(rendered, json!({"hello": "world", "tags": ["_seen"]}));
    }
}
