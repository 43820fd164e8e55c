//! Event source port.

use async_trait::async_trait;
use tokio::sync::{mpsc, watch};

use crate::domain::DeploymentEvent;
use crate::error::Result;

/// A feed of normalized deployment events.
///
/// Implementations own their background work. The returned receiver yields
/// events in the order the orchestrator reported them and closes once the
/// shutdown flag flips to `true` (or its sender is dropped). Dropping the
/// receiver also stops the background work.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Start streaming events.
    async fn stream_events(
        &self,
        shutdown: watch::Receiver<bool>,
    ) -> Result<mpsc::Receiver<DeploymentEvent>>;

    /// Short name used in logs.
    fn source_name(&self) -> &'static str;
}
