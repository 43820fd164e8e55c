//! Deployment targets and the registrations written against them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::deployment::Version;
use super::id::{DeploymentName, TargetId};

/// A known instance of an application in an environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentTarget {
    /// Registry identifier.
    pub id: TargetId,
    /// Name used to correlate orchestrator events with this target.
    pub deployment_name: DeploymentName,
}

/// Request to record that a target runs a version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub target_id: TargetId,
    pub version: Version,
    /// `None` lets the registry stamp the current time.
    pub deployed_at: Option<DateTime<Utc>>,
}

/// A deployment environment (production, staging, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    pub id: i32,
    pub name: String,
    pub order: i32,
}

/// An application deployed into environments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: i32,
    pub name: String,
    pub order: i32,
}

/// A deployment target with the names of its environment and application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    pub id: TargetId,
    pub environment_id: i32,
    pub environment: String,
    pub application_id: i32,
    pub application: String,
    pub name: String,
    /// Correlation name; `None` until the instance is linked to a workload.
    pub deployment_name: Option<DeploymentName>,
}

/// Parameters for creating an instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewInstance {
    pub environment_id: i32,
    pub application_id: i32,
    pub name: String,
    pub deployment_name: Option<DeploymentName>,
}

/// A stored version registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentRecord {
    pub id: String,
    pub target_id: TargetId,
    pub version: String,
    pub deployed_at: DateTime<Utc>,
}
