//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`nomad`]: Builders for Nomad events, tasks and stream frames.
//! - [`registry`]: In-memory [`TargetRegistry`](crate::port::outbound::registry::TargetRegistry)
//!   that records registrations.
//! - [`source`]: Scripted [`EventSource`](crate::port::outbound::source::EventSource).
//! - [`config`]: Canonical test configurations (reconnection, nomad).
//! - [`cursor`]: In-memory stream cursor store.

pub mod config;
pub mod cursor;
pub mod nomad;
pub mod registry;
pub mod source;
