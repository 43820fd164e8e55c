//! Nomad orchestrator adapter.
//!
//! - [`source`] - Reconnecting event stream client ([`NomadSource`])
//! - [`decoder`] - Incremental decoding of the concatenated-JSON body
//! - [`translate`] - Raw events to deployment events
//! - [`dto`] - Wire types

pub mod decoder;
pub mod dto;
pub mod source;
pub mod translate;

pub use source::{NomadSource, StreamState};
