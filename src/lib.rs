//! Purpose: Per-event JSON enrichment library embedded in host pipelines.
//! Exports: `core` (event model, timestamps, errors) and `filter` (enrichment stages).
//! Role: Library backing pipeline filter stages; no CLI or transport of its own.
//! Invariants: Filters never panic on malformed input; failures surface as event tags.
//! Invariants: Events are mutated in place and never retained after a call returns.
pub mod core;
pub mod filter;

pub use crate::core::error::{Error, ErrorKind};
pub use crate::core::event::Event;
pub use crate::core::timestamp::Timestamp;
pub use crate::filter::{Decorations, FilterOutcome, JsonFilter, JsonFilterConfig};
