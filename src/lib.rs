//! Overseer - software version tracking from orchestrator events.
//!
//! Follows the Nomad event stream, extracts the image version of every
//! docker task in each registered job, and records it against the matching
//! deployment target.
//!
//! # Architecture
//!
//! ```text
//! Nomad /v1/event/stream ─▶ NomadSource (decode + translate) ─▶ bounded queue
//!                                                                   │
//!                        TargetRegistry ◀─ Correlator ◀─ VersionStream
//! ```
//!
//! # Modules
//!
//! - [`domain`] - Deployment events, versions, targets
//! - [`port`] - Event source, target registry and cursor store traits
//! - [`adapter`] - Nomad stream client, SQLite storage, CLI
//! - [`application`] - Correlation and the pipeline driver
//! - [`infrastructure`] - Configuration, wiring, shutdown
//! - [`error`] - Error types for the crate

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
