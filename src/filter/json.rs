//! Purpose: Decode a JSON-bearing event field and merge the result into the event.
//! Exports: `JsonFilter`, `JsonFilterConfig`, `DEFAULT_FAILURE_TAG`.
//! Role: Enrichment stage applying the decode-and-merge policy for host pipelines.
//! Invariants: On failure the event keeps every field untouched except appended tags.
//! Invariants: Expected failures never escape `process`; only construction validates.
//! Invariants: A decoded `@timestamp` key is reconciled separately, never merged as
//! a plain field; every other decoded key overwrites last-writer-wins.

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{Level, debug, enabled, warn};

use crate::core::error::{Error, ErrorKind};
use crate::core::event::{Event, TIMESTAMP_FAILURE_FIELD, TIMESTAMP_FAILURE_TAG, TIMESTAMP_FIELD};
use crate::core::timestamp::Timestamp;
use crate::filter::{Decorations, FilterOutcome};

pub const DEFAULT_FAILURE_TAG: &str = "_jsonparsefailure";

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct JsonFilterConfig {
    /// Field whose string value is decoded as JSON.
    pub source: String,
    /// Destination for the decoded value; `None` merges object roots into the
    /// event root.
    pub target: Option<String>,
    /// Tags appended, in order, on every decode or shape failure.
    pub tag_on_failure: Vec<String>,
    /// Silence decode failures entirely: no tags, no diagnostics, no mutation.
    pub skip_on_invalid_json: bool,
    /// Applied after every successful match.
    pub decorations: Decorations,
}

impl JsonFilterConfig {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ..Self::default()
        }
    }
}

impl Default for JsonFilterConfig {
    fn default() -> Self {
        Self {
            source: String::new(),
            target: None,
            tag_on_failure: vec![DEFAULT_FAILURE_TAG.to_string()],
            skip_on_invalid_json: false,
            decorations: Decorations::default(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct JsonFilter {
    config: JsonFilterConfig,
}

impl JsonFilter {
    /// Validate the configuration once; a filter that constructs never fails
    /// again past this point.
    pub fn new(config: JsonFilterConfig) -> Result<Self, Error> {
        if config.source.is_empty() {
            return Err(Error::new(ErrorKind::Usage)
                .with_message("source field is required")
                .with_field("source"));
        }
        if let Some(target) = &config.target {
            if target.is_empty() {
                return Err(Error::new(ErrorKind::Usage)
                    .with_message("target field must not be empty")
                    .with_field("target"));
            }
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &JsonFilterConfig {
        &self.config
    }

    /// Process one event in place. Expected failures surface as tags on the
    /// event and a `Failed` outcome, never as an error or panic.
    pub fn process(&self, event: &mut Event) -> FilterOutcome {
        if enabled!(Level::DEBUG) {
            debug!(event = %event.to_value(), "running json filter");
        }

        let raw = match event.get(&self.config.source) {
            None | Some(Value::Null) => return FilterOutcome::Skipped,
            Some(value) => value.clone(),
        };

        let decoded = match raw.as_str() {
            Some(text) => match serde_json::from_str::<Value>(text) {
                Ok(value) => value,
                Err(err) => return self.decode_failed(event, &raw, &err.to_string()),
            },
            None => return self.decode_failed(event, &raw, "source field is not a string"),
        };

        match &self.config.target {
            Some(target) => {
                event.set(target.clone(), decoded);
            }
            None => {
                let Value::Object(decoded) = decoded else {
                    self.tag_failure(event);
                    warn!(
                        source = %self.config.source,
                        raw = %raw,
                        "parsed json lacks an object root and no target is configured"
                    );
                    return FilterOutcome::Failed;
                };
                self.merge_root(event, decoded);
            }
        }

        self.config.decorations.apply(event);

        if enabled!(Level::DEBUG) {
            debug!(event = %event.to_value(), "event after json filter");
        }
        FilterOutcome::Matched
    }

    /// Merge a decoded object into the event root. The `@timestamp` key is
    /// pulled out before the merge and re-injected through coercion; a
    /// coercion failure stamps the current time and preserves the original.
    fn merge_root(&self, event: &mut Event, mut decoded: Map<String, Value>) {
        let raw_timestamp = match decoded.shift_remove(TIMESTAMP_FIELD) {
            None | Some(Value::Null) => None,
            Some(value) => Some(value),
        };
        let coerced = raw_timestamp.as_ref().map(Timestamp::coerce);

        for (field, value) in decoded {
            event.set(field, value);
        }

        if let (Some(raw), Some(result)) = (raw_timestamp, coerced) {
            match result {
                Ok(timestamp) => event.set_timestamp(timestamp),
                Err(err) => {
                    event.set_timestamp(Timestamp::now());
                    event.tag(TIMESTAMP_FAILURE_TAG);
                    event.set(TIMESTAMP_FAILURE_FIELD, Value::String(raw_text(&raw)));
                    warn!(
                        field = TIMESTAMP_FIELD,
                        value = %raw,
                        error = %err,
                        "unrecognized timestamp value, setting current time and preserving the original"
                    );
                }
            }
        }
    }

    fn decode_failed(&self, event: &mut Event, raw: &Value, error: &str) -> FilterOutcome {
        if self.config.skip_on_invalid_json {
            return FilterOutcome::Skipped;
        }
        self.tag_failure(event);
        warn!(
            source = %self.config.source,
            raw = %raw,
            error,
            "error parsing json"
        );
        FilterOutcome::Failed
    }

    fn tag_failure(&self, event: &mut Event) {
        for tag in &self.config.tag_on_failure {
            event.tag(tag.clone());
        }
    }
}

fn raw_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
