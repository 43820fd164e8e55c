//! Outbound ports (driven side): interfaces implemented by outbound adapters.
//!
//! These contracts describe the event feed, the target registry, and the
//! stream cursor persistence the pipeline depends on.

pub mod cursor;
pub mod registry;
pub mod source;
