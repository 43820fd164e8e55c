//! Target registry port.

use std::future::Future;

use crate::domain::{DeploymentName, DeploymentTarget, Registration};
use crate::error::Result;

/// Lookup and registration operations the correlator needs.
///
/// The registry owns storage semantics and its own concurrency safety; the
/// pipeline issues one call at a time per event.
pub trait TargetRegistry: Send + Sync {
    /// All targets whose deployment name equals `name` exactly.
    fn find_targets_by_deployment_name(
        &self,
        name: &DeploymentName,
    ) -> impl Future<Output = Result<Vec<DeploymentTarget>>> + Send;

    /// Append a version registration for a target.
    fn register(&self, registration: &Registration) -> impl Future<Output = Result<()>> + Send;
}
