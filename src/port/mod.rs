//! Ports: the contracts between the ingestion core and the outside world.
//!
//! Only driven (outbound) ports exist; the pipeline has no synchronous
//! caller to expose an inbound contract to.

pub mod outbound;
