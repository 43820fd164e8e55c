//! In-memory [`TargetRegistry`] for pipeline tests.
//!
//! Targets are seeded up front; every registration call is recorded in order
//! whether it succeeds or not, so tests can assert on exactly what the
//! correlator asked for.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::domain::{DeploymentName, DeploymentTarget, Registration, TargetId};
use crate::error::{Error, Result};
use crate::port::outbound::registry::TargetRegistry;

#[derive(Default)]
struct Inner {
    targets: Vec<DeploymentTarget>,
    registrations: Vec<Registration>,
    lookups: Vec<DeploymentName>,
    failing: HashMap<TargetId, String>,
}

/// Recording registry with optional failure injection.
#[derive(Clone, Default)]
pub struct RecordingRegistry {
    inner: Arc<Mutex<Inner>>,
}

impl RecordingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a target with the given id and deployment name.
    pub fn with_target(self, id: i32, deployment_name: &str) -> Self {
        self.inner.lock().targets.push(DeploymentTarget {
            id: TargetId::new(id),
            deployment_name: DeploymentName::from(deployment_name),
        });
        self
    }

    /// Make every registration against `id` fail with `reason`.
    pub fn failing_for(self, id: i32, reason: &str) -> Self {
        self.inner
            .lock()
            .failing
            .insert(TargetId::new(id), reason.to_string());
        self
    }

    /// Every registration attempted, in call order.
    pub fn registrations(&self) -> Vec<Registration> {
        self.inner.lock().registrations.clone()
    }

    /// Every deployment name looked up, in call order.
    pub fn lookups(&self) -> Vec<DeploymentName> {
        self.inner.lock().lookups.clone()
    }
}

impl TargetRegistry for RecordingRegistry {
    async fn find_targets_by_deployment_name(
        &self,
        name: &DeploymentName,
    ) -> Result<Vec<DeploymentTarget>> {
        let mut inner = self.inner.lock();
        inner.lookups.push(name.clone());
        Ok(inner
            .targets
            .iter()
            .filter(|t| &t.deployment_name == name)
            .cloned()
            .collect())
    }

    async fn register(&self, registration: &Registration) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.registrations.push(registration.clone());
        match inner.failing.get(&registration.target_id) {
            Some(reason) => Err(Error::Database(reason.clone())),
            None => Ok(()),
        }
    }
}
