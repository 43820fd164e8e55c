//! Implementations of ports (hexagonal adapters).
//!
//! - [`inbound`] - Driving side: the command line
//! - [`outbound`] - Driven side: Nomad, SQLite, reconnection policy

pub mod inbound;
pub mod outbound;
