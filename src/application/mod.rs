//! Application services.
//!
//! - [`correlator`]: binds deployment events to registry targets
//! - [`pipeline`]: drives an event source through the correlator

pub mod correlator;
pub mod pipeline;

pub use correlator::{CorrelationOutcome, Correlator};
pub use pipeline::{PipelineSummary, VersionStream};
