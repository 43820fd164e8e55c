//! Event source that never produces events.
//!
//! Used when no orchestrator is configured so the rest of the process can run
//! unchanged. The queue closes when shutdown is requested.

use async_trait::async_trait;
use tokio::sync::{mpsc, watch};
use tracing::info;

use crate::domain::DeploymentEvent;
use crate::error::Result;
use crate::infrastructure::shutdown::wait_for_shutdown;
use crate::port::outbound::source::EventSource;

/// Source with no upstream.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdleSource;

#[async_trait]
impl EventSource for IdleSource {
    async fn stream_events(
        &self,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<mpsc::Receiver<DeploymentEvent>> {
        let (tx, rx) = mpsc::channel(1);
        info!("No event source configured, idling until shutdown");
        tokio::spawn(async move {
            tokio::select! {
                _ = wait_for_shutdown(&mut shutdown) => {}
                _ = tx.closed() => {}
            }
        });
        Ok(rx)
    }

    fn source_name(&self) -> &'static str {
        "idle"
    }
}
