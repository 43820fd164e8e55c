//! Outbound adapters (driven side).

pub mod idle;
pub mod nomad;
pub mod reconnect;
pub mod sqlite;
