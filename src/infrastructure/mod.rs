//! Infrastructure layer.
//!
//! Technical concerns that support the pipeline without containing business
//! logic: configuration, process wiring, and shutdown signalling.
//!
//! # Submodules
//!
//! - [`bootstrap`] - Composition root for runtime wiring
//! - [`config`] - Configuration loading and validation
//! - [`shutdown`] - Cooperative shutdown helpers

pub mod bootstrap;
pub mod config;
pub mod shutdown;
