//! Deployment correlation.
//!
//! Resolves each deployment event to exactly one deployment target and
//! records the version against it. Misses and registry failures are logged
//! and dropped; more than one matching target is an invariant violation that
//! is returned to the caller.

use tracing::{error, info, warn};

use crate::domain::{DeploymentEvent, Registration, TargetId};
use crate::error::{Error, Result};
use crate::port::outbound::registry::TargetRegistry;

/// What happened to a single deployment event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorrelationOutcome {
    /// The version was registered against the target.
    Registered { target_id: TargetId },
    /// No target carries the deployment name.
    Unmatched,
    /// The registry failed; the event was dropped.
    Failed,
}

/// Correlates deployment events against a [`TargetRegistry`].
pub struct Correlator<R> {
    registry: R,
}

impl<R: TargetRegistry> Correlator<R> {
    pub fn new(registry: R) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    /// Look up the event's target and register its version.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AmbiguousTarget`] when more than one target matches
    /// the deployment name. Nothing is registered in that case.
    pub async fn handle(&self, event: &DeploymentEvent) -> Result<CorrelationOutcome> {
        let targets = match self
            .registry
            .find_targets_by_deployment_name(&event.deployment_name)
            .await
        {
            Ok(targets) => targets,
            Err(e) => {
                error!(
                    error = %e,
                    event_id = %event.id,
                    deployment_name = %event.deployment_name,
                    "Failed to look up deployment target"
                );
                return Ok(CorrelationOutcome::Failed);
            }
        };

        let target = match targets.as_slice() {
            [] => {
                warn!(
                    event_id = %event.id,
                    deployment_name = %event.deployment_name,
                    version = %event.version,
                    "No target found for deployment"
                );
                return Ok(CorrelationOutcome::Unmatched);
            }
            [target] => target,
            _ => {
                return Err(Error::AmbiguousTarget {
                    deployment_name: event.deployment_name.to_string(),
                    matches: targets.len(),
                })
            }
        };

        let registration = Registration {
            target_id: target.id,
            version: event.version.clone(),
            deployed_at: event.deployed_at,
        };

        match self.registry.register(&registration).await {
            Ok(()) => {
                info!(
                    event_id = %event.id,
                    deployment_name = %event.deployment_name,
                    target_id = %target.id,
                    version = %event.version,
                    "Registered deployment"
                );
                Ok(CorrelationOutcome::Registered {
                    target_id: target.id,
                })
            }
            Err(e) => {
                error!(
                    error = %e,
                    event_id = %event.id,
                    target_id = %target.id,
                    version = %event.version,
                    "Failed to register deployment"
                );
                Ok(CorrelationOutcome::Failed)
            }
        }
    }
}
