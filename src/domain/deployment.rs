//! Normalized deployment events.

use std::fmt;

use chrono::{DateTime, Utc};

use super::id::{DeploymentName, EventId};

/// Placeholder tag that does not identify a concrete build.
const UNVERSIONED_TAG: &str = "latest";

/// A concrete, trackable software version.
///
/// Never empty and never the literal `latest`; construction goes through
/// [`Version::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Version(String);

impl Version {
    /// Accept a tag as a version, or `None` when it does not pin a build.
    #[must_use]
    pub fn parse(tag: &str) -> Option<Self> {
        if tag.is_empty() || tag == UNVERSIONED_TAG {
            return None;
        }
        Some(Self(tag.to_string()))
    }

    /// Get the version as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// "This deployment now runs version V as of time T."
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentEvent {
    /// Key of the orchestrator event this was derived from.
    pub id: EventId,
    /// Name used to find the deployment target.
    pub deployment_name: DeploymentName,
    /// Version extracted from the image tag.
    pub version: Version,
    /// Submission time of the job. `None` when the orchestrator did not
    /// report one; the registry substitutes the current time.
    pub deployed_at: Option<DateTime<Utc>>,
    /// Stream index that is fully handled once this event is.
    ///
    /// Set on the last event derived from a stream frame, `None` elsewhere.
    pub checkpoint: Option<u64>,
}

impl DeploymentEvent {
    /// Create a new deployment event.
    pub fn new(
        id: impl Into<EventId>,
        deployment_name: impl Into<DeploymentName>,
        version: Version,
        deployed_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id: id.into(),
            deployment_name: deployment_name.into(),
            version,
            deployed_at,
            checkpoint: None,
        }
    }

    /// Mark this event as completing stream index `index`.
    #[must_use]
    pub fn with_checkpoint(mut self, index: u64) -> Self {
        self.checkpoint = Some(index);
        self
    }
}
