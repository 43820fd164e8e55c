//! Domain identifier types with proper encapsulation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identifier of the orchestrator event a deployment was derived from.
///
/// Propagated from the raw event key for tracing; several deployment events
/// can share the same id when one job registration fans out to many tasks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(String);

impl EventId {
    /// Create a new `EventId` from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the event ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for EventId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for EventId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Name used to correlate an orchestrator workload with a deployment target.
///
/// For Nomad this is `namespace.job.group.task`. Comparison is exact and
/// case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeploymentName(String);

impl DeploymentName {
    /// Create a new `DeploymentName` from a string.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Build the dotted name of a task inside a job.
    #[must_use]
    pub fn from_parts(namespace: &str, job: &str, group: &str, task: &str) -> Self {
        Self(format!("{namespace}.{job}.{group}.{task}"))
    }

    /// Get the deployment name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeploymentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for DeploymentName {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for DeploymentName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Stable registry identifier of a deployment target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TargetId(i32);

impl TargetId {
    /// Wrap a raw registry id.
    #[must_use]
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    /// Raw integer value.
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for TargetId {
    fn from(id: i32) -> Self {
        Self::new(id)
    }
}
