//! Scripted [`EventSource`] for pipeline tests.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::{mpsc, watch};

use crate::domain::{DeploymentEvent, Version};
use crate::error::Result;
use crate::infrastructure::shutdown::wait_for_shutdown;
use crate::port::outbound::source::EventSource;

/// A source that replays a fixed list of events.
///
/// After the script is exhausted the queue closes, unless the source was
/// built with [`ScriptedSource::hold_open`], in which case it stays open
/// until shutdown.
pub struct ScriptedSource {
    events: Mutex<Vec<DeploymentEvent>>,
    hold_open: bool,
    calls: Arc<AtomicU32>,
}

impl ScriptedSource {
    pub fn new(events: Vec<DeploymentEvent>) -> Self {
        Self {
            events: Mutex::new(events),
            hold_open: false,
            calls: Arc::new(AtomicU32::new(0)),
        }
    }

    /// Keep the queue open after the last event until shutdown.
    pub fn hold_open(mut self) -> Self {
        self.hold_open = true;
        self
    }

    /// Number of times `stream_events` was called.
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EventSource for ScriptedSource {
    async fn stream_events(
        &self,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<mpsc::Receiver<DeploymentEvent>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let events = std::mem::take(&mut *self.events.lock());
        let hold_open = self.hold_open;
        let (tx, rx) = mpsc::channel(10);

        tokio::spawn(async move {
            for event in events {
                tokio::select! {
                    _ = wait_for_shutdown(&mut shutdown) => return,
                    sent = tx.send(event) => {
                        if sent.is_err() {
                            return;
                        }
                    }
                }
            }
            if hold_open {
                tokio::select! {
                    _ = wait_for_shutdown(&mut shutdown) => {}
                    _ = tx.closed() => {}
                }
            }
        });

        Ok(rx)
    }

    fn source_name(&self) -> &'static str {
        "scripted"
    }
}

/// A deployment event for `deployment_name` running `version`.
pub fn deployment(deployment_name: &str, version: &str) -> DeploymentEvent {
    DeploymentEvent::new(
        deployment_name,
        deployment_name,
        Version::parse(version).expect("fixture version is concrete"),
        None,
    )
}
