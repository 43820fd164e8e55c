//! Nomad event stream wire types.
//!
//! The event stream body is a sequence of concatenated JSON objects:
//!
//! ```json
//! {"Index":42,"Events":[{"Topic":"Job","Type":"JobRegistered","Key":"checkout","Namespace":"prod","FilterKeys":[],"Index":42,"Payload":{"Job":{...}}}]}
//! {}
//! ```
//!
//! Empty objects are heartbeats. Payloads are schema-on-read: their shape
//! depends on the event type, and a task's `Config` depends on its driver.
//! [`RawEvent::classify`] and [`Task::driver`] turn those into tagged unions.

use serde::{Deserialize, Deserializer};

/// Event type emitted when a job is registered or updated.
pub const JOB_REGISTERED: &str = "JobRegistered";

/// Driver whose configuration carries a container image.
pub const DOCKER_DRIVER: &str = "docker";

/// Treat an explicit `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One decoded object from the stream body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StreamFrame {
    /// Raft index of the newest event in the frame. Absent on heartbeats.
    #[serde(default)]
    pub index: Option<u64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub events: Vec<RawEvent>,
}

impl StreamFrame {
    /// Heartbeat frames carry no events and no index.
    #[must_use]
    pub fn is_heartbeat(&self) -> bool {
        self.events.is_empty() && self.index.is_none()
    }
}

/// One orchestrator event, with its payload left undecoded.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct RawEvent {
    #[serde(deserialize_with = "null_as_default")]
    pub topic: String,
    #[serde(rename = "Type", deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(deserialize_with = "null_as_default")]
    pub key: String,
    #[serde(deserialize_with = "null_as_default")]
    pub namespace: String,
    #[serde(deserialize_with = "null_as_default")]
    pub filter_keys: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub index: u64,
    pub payload: serde_json::Value,
}

/// Events the translator knows how to interpret.
#[derive(Debug, Clone)]
pub enum OrchestratorEvent {
    /// A job was registered; carries the decoded job.
    JobRegistered(Job),
    /// Any other event type.
    Other,
}

impl RawEvent {
    /// Decode the payload according to the event type.
    ///
    /// # Errors
    ///
    /// Returns the decode error when a job registration payload does not
    /// have the expected shape.
    pub fn classify(&self) -> Result<OrchestratorEvent, serde_json::Error> {
        if self.kind != JOB_REGISTERED {
            return Ok(OrchestratorEvent::Other);
        }
        let payload = JobPayload::deserialize(&self.payload)?;
        Ok(OrchestratorEvent::JobRegistered(payload.job))
    }
}

/// Payload of a `JobRegistered` event.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct JobPayload {
    pub job: Job,
}

/// The subset of a Nomad job the translator needs.
///
/// Every field reads an explicit `null` as its zero value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Job {
    #[serde(deserialize_with = "null_as_default")]
    pub namespace: String,
    #[serde(rename = "ID", deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    /// Submission time, nanoseconds since the Unix epoch.
    #[serde(deserialize_with = "null_as_default")]
    pub submit_time: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub task_groups: Vec<TaskGroup>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct TaskGroup {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub tasks: Vec<Task>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Task {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub driver: String,
    /// Driver-specific configuration.
    pub config: serde_json::Value,
}

/// Task configuration interpreted by driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskDriver {
    Docker(DockerConfig),
    /// A driver without a container image (exec, java, raw_exec, ...).
    Other(String),
}

impl Task {
    /// Decode the configuration according to the driver.
    ///
    /// # Errors
    ///
    /// Returns the decode error when a docker task's configuration has no
    /// usable image reference.
    pub fn driver(&self) -> Result<TaskDriver, serde_json::Error> {
        if self.driver != DOCKER_DRIVER {
            return Ok(TaskDriver::Other(self.driver.clone()));
        }
        DockerConfig::deserialize(&self.config).map(TaskDriver::Docker)
    }
}

/// Docker driver configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DockerConfig {
    /// Image reference, `registry/name:tag`.
    #[serde(rename = "image", alias = "Image")]
    pub image: String,
}
