//! Orchestrator-agnostic domain types.
//!
//! Everything in here is plain data: deployment events produced by an event
//! source, the deployment targets they are correlated against, and the
//! registrations written back to the registry.

pub mod deployment;
pub mod id;
pub mod image;
pub mod target;

pub use deployment::{DeploymentEvent, Version};
pub use id::{DeploymentName, EventId, TargetId};
pub use image::image_tag;
pub use target::{
    Application, DeploymentRecord, DeploymentTarget, Environment, Instance, NewInstance,
    Registration,
};
