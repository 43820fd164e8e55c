//! Builders for Nomad events and event stream bodies.
//!
//! Events are built as JSON first so the same fixtures can be decoded into
//! [`RawEvent`]s for unit tests or written to a fake HTTP server as frames.

use serde_json::{json, Value};

use crate::adapter::outbound::nomad::dto::{RawEvent, Task, DOCKER_DRIVER, JOB_REGISTERED};

/// A task with an arbitrary driver and configuration.
pub fn task(name: &str, driver: &str, config: Value) -> Task {
    Task {
        name: name.to_string(),
        driver: driver.to_string(),
        config,
    }
}

/// A docker task running `image`.
pub fn docker_task(name: &str, image: &str) -> Task {
    task(name, DOCKER_DRIVER, json!({ "image": image }))
}

/// JSON for a `JobRegistered` event in the shape Nomad sends.
pub fn job_registered_json(
    namespace: &str,
    job: &str,
    submit_time_ns: i64,
    groups: &[(&str, Vec<Task>)],
) -> Value {
    let task_groups: Vec<Value> = groups
        .iter()
        .map(|(group, tasks)| {
            let tasks: Vec<Value> = tasks
                .iter()
                .map(|t| json!({ "Name": t.name, "Driver": t.driver, "Config": t.config }))
                .collect();
            json!({ "Name": group, "Tasks": tasks })
        })
        .collect();

    json!({
        "Topic": "Job",
        "Type": JOB_REGISTERED,
        "Key": job,
        "Namespace": namespace,
        "FilterKeys": [job],
        "Index": 0,
        "Payload": {
            "Job": {
                "Namespace": namespace,
                "ID": job,
                "Name": job,
                "SubmitTime": submit_time_ns,
                "TaskGroups": task_groups,
            }
        }
    })
}

/// A decoded `JobRegistered` event.
pub fn job_registered(
    namespace: &str,
    job: &str,
    submit_time_ns: i64,
    groups: &[(&str, Vec<Task>)],
) -> RawEvent {
    serde_json::from_value(job_registered_json(namespace, job, submit_time_ns, groups))
        .expect("fixture event decodes")
}

/// One stream frame, newline terminated.
pub fn frame(index: u64, events: Vec<Value>) -> String {
    format!("{}\n", json!({ "Index": index, "Events": events }))
}

/// A heartbeat frame.
pub fn heartbeat() -> String {
    "{}\n".to_string()
}

/// Frame carrying a single docker deployment.
pub fn deployment_frame(index: u64, namespace: &str, job: &str, group: &str, image: &str) -> String {
    frame(
        index,
        vec![job_registered_json(
            namespace,
            job,
            1_700_000_000_000_000_000,
            &[(group, vec![docker_task(job, image)])],
        )],
    )
}
