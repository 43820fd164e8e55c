//! Translation of raw Nomad events into deployment events.

use chrono::{DateTime, Utc};
use tracing::{error, warn};

use super::dto::{OrchestratorEvent, RawEvent, TaskDriver};
use crate::domain::{image_tag, DeploymentEvent, DeploymentName, EventId, Version};
use crate::error::{Error, Result};

/// Extract every trackable deployment from one raw event.
///
/// Non job-registration events and non-docker tasks produce nothing. Tasks
/// whose docker config cannot be decoded, or whose image has no concrete
/// tag, are skipped with a log line. Events come out in task order.
///
/// # Errors
///
/// Returns [`Error::Schema`] when a job registration payload cannot be
/// decoded at all.
pub fn translate(event: &RawEvent) -> Result<Vec<DeploymentEvent>> {
    let job = match event.classify() {
        Ok(OrchestratorEvent::JobRegistered(job)) => job,
        Ok(OrchestratorEvent::Other) => return Ok(Vec::new()),
        Err(source) => {
            return Err(Error::Schema {
                event_key: event.key.clone(),
                source,
            })
        }
    };

    let deployed_at = submit_time(job.submit_time);
    let mut deployments = Vec::new();

    for group in &job.task_groups {
        for task in &group.tasks {
            let docker = match task.driver() {
                Ok(TaskDriver::Docker(docker)) => docker,
                Ok(TaskDriver::Other(_)) => continue,
                Err(e) => {
                    error!(
                        error = %e,
                        job = %job.name,
                        group = %group.name,
                        task = %task.name,
                        "Failed to parse docker config"
                    );
                    continue;
                }
            };

            let Some(version) = Version::parse(image_tag(&docker.image)) else {
                warn!(
                    image = %docker.image,
                    job = %job.name,
                    task = %task.name,
                    "Could not determine image version"
                );
                continue;
            };

            deployments.push(DeploymentEvent {
                id: EventId::new(event.key.clone()),
                deployment_name: DeploymentName::from_parts(
                    &job.namespace,
                    &job.name,
                    &group.name,
                    &task.name,
                ),
                version,
                deployed_at,
                checkpoint: None,
            });
        }
    }

    Ok(deployments)
}

/// Convert a nanosecond epoch to a timestamp; zero means "not reported".
fn submit_time(nanos: i64) -> Option<DateTime<Utc>> {
    (nanos != 0).then(|| DateTime::from_timestamp_nanos(nanos))
}
