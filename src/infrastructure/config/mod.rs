//! Infrastructure configuration modules.

pub mod logging;
pub mod nomad;
pub mod reconnection;
pub mod settings;
