//! Reconnecting client for the Nomad event stream.
//!
//! # Connection Lifecycle
//!
//! 1. **Connecting**: `GET <address>/v1/event/stream?topic=<topic>[&index=<n>]`
//!    with the ACL token in `X-Nomad-Token`.
//! 2. **Streaming**: the body is decoded frame by frame; every event is
//!    translated inline and the resulting deployment events are pushed onto a
//!    bounded queue. A full queue stalls reading, it never drops events.
//! 3. **Disconnected**: on a non-200 status, a transport error, a schema
//!    error, or the peer closing the body, the connection is dropped and the
//!    client waits out the backoff delay before reconnecting.
//! 4. **Stopped**: reached only through shutdown (or the consumer dropping
//!    the queue). The open connection is closed and the queue is closed.
//!
//! Reconnects resume after the last frame pushed onto the queue. The cursor
//! store is only read here, at start-up; the last event of each frame carries
//! the frame index as its checkpoint, and the consumer saves it once the
//! event has been handled.
//!
//! The connection handle lives inside a single attempt, so every exit path,
//! cancellation included, closes it.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;
use tokio::sync::{mpsc, watch};
use tokio::time::sleep;
use tracing::{debug, error, info, warn};
use url::Url;

use super::decoder::FrameDecoder;
use super::dto::StreamFrame;
use super::translate::translate;
use crate::adapter::outbound::reconnect::Backoff;
use crate::domain::DeploymentEvent;
use crate::error::{Error, Result};
use crate::infrastructure::config::nomad::NomadConfig;
use crate::infrastructure::config::reconnection::ReconnectionConfig;
use crate::infrastructure::shutdown::{is_shutdown, wait_for_shutdown};
use crate::port::outbound::cursor::CursorStore;
use crate::port::outbound::source::EventSource;

/// Header carrying the Nomad ACL token.
pub const TOKEN_HEADER: &str = "X-Nomad-Token";

/// Name under which the stream cursor is stored.
pub const SOURCE_NAME: &str = "nomad";

const STREAM_PATH: &str = "/v1/event/stream";

/// Observable connection state of the stream client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Disconnected,
    Connecting,
    Streaming,
    Stopped,
}

/// How a single connection attempt ended without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttemptEnd {
    /// Shutdown was requested.
    Cancelled,
    /// The consumer dropped the queue.
    ReceiverClosed,
    /// Nomad ended the response body.
    PeerClosed,
}

/// Nomad implementation of [`EventSource`].
pub struct NomadSource {
    client: reqwest::Client,
    endpoint: Url,
    token: Option<String>,
    channel_capacity: usize,
    reconnection: ReconnectionConfig,
    cursor: Option<Arc<dyn CursorStore>>,
    state: Arc<watch::Sender<StreamState>>,
}

impl NomadSource {
    /// Create a source from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured address is not a valid URL.
    pub fn new(config: &NomadConfig, reconnection: ReconnectionConfig) -> Result<Self> {
        let mut endpoint = Url::parse(&format!(
            "{}{STREAM_PATH}",
            config.address.trim_end_matches('/')
        ))?;
        endpoint
            .query_pairs_mut()
            .append_pair("topic", &config.topic);

        let (state, _) = watch::channel(StreamState::Disconnected);

        Ok(Self {
            client: reqwest::Client::new(),
            endpoint,
            token: config.token().map(str::to_string),
            channel_capacity: config.channel_capacity,
            reconnection,
            cursor: None,
            state: Arc::new(state),
        })
    }

    /// Start from the position recorded in `cursor`, if any.
    #[must_use]
    pub fn with_cursor(mut self, cursor: Arc<dyn CursorStore>) -> Self {
        self.cursor = Some(cursor);
        self
    }

    /// Endpoint without the resume index.
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Watch connection state changes.
    #[must_use]
    pub fn state(&self) -> watch::Receiver<StreamState> {
        self.state.subscribe()
    }

    /// Issue one request to the event endpoint and return its status.
    ///
    /// Used by diagnostics; the response body is not read.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure.
    pub async fn check_reachable(&self) -> Result<StatusCode> {
        let mut request = self.client.get(self.endpoint.clone());
        if let Some(token) = &self.token {
            request = request.header(TOKEN_HEADER, token);
        }
        let response = request.send().await?;
        Ok(response.status())
    }
}

#[async_trait]
impl EventSource for NomadSource {
    async fn stream_events(
        &self,
        shutdown: watch::Receiver<bool>,
    ) -> Result<mpsc::Receiver<DeploymentEvent>> {
        let last_index = match &self.cursor {
            Some(cursor) => match cursor.load(SOURCE_NAME).await {
                Ok(index) => index,
                Err(e) => {
                    warn!(error = %e, "Failed to load stream cursor, starting from now");
                    None
                }
            },
            None => None,
        };
        if let Some(index) = last_index {
            info!(index, "Resuming Nomad event stream");
        }

        let (tx, rx) = mpsc::channel(self.channel_capacity);
        let worker = StreamWorker {
            client: self.client.clone(),
            endpoint: self.endpoint.clone(),
            token: self.token.clone(),
            backoff: Backoff::new(self.reconnection.clone()),
            state: Arc::clone(&self.state),
            last_index,
        };
        tokio::spawn(worker.run(tx, shutdown));

        Ok(rx)
    }

    fn source_name(&self) -> &'static str {
        SOURCE_NAME
    }
}

/// Owns the reconnect loop for one subscription.
struct StreamWorker {
    client: reqwest::Client,
    endpoint: Url,
    token: Option<String>,
    backoff: Backoff,
    state: Arc<watch::Sender<StreamState>>,
    /// Highest frame index fully pushed onto the queue (or skipped).
    last_index: Option<u64>,
}

impl StreamWorker {
    async fn run(mut self, tx: mpsc::Sender<DeploymentEvent>, mut shutdown: watch::Receiver<bool>) {
        loop {
            if is_shutdown(&shutdown) || tx.is_closed() {
                break;
            }

            self.set_state(StreamState::Connecting);
            match self.stream_once(&tx, &mut shutdown).await {
                Ok(AttemptEnd::Cancelled) => break,
                Ok(AttemptEnd::ReceiverClosed) => {
                    debug!("Deployment event queue closed by consumer");
                    break;
                }
                Ok(AttemptEnd::PeerClosed) => {
                    warn!("Nomad closed the event stream");
                }
                Err(e) => {
                    error!(error = %e, "Event stream error");
                }
            }
            self.set_state(StreamState::Disconnected);

            let delay = self.backoff.next_delay();
            info!(
                delay_ms = delay.as_millis() as u64,
                attempt = self.backoff.attempts(),
                "Reconnecting to Nomad event stream after delay"
            );
            tokio::select! {
                _ = wait_for_shutdown(&mut shutdown) => break,
                _ = sleep(delay) => {}
            }
        }

        self.set_state(StreamState::Stopped);
        info!("Nomad event stream stopped");
    }

    fn set_state(&self, state: StreamState) {
        let previous = self.state.send_replace(state);
        if previous != state {
            debug!(from = ?previous, to = ?state, "Stream state changed");
        }
    }

    fn request_url(&self) -> Url {
        let mut url = self.endpoint.clone();
        if let Some(index) = self.last_index {
            url.query_pairs_mut()
                .append_pair("index", &(index + 1).to_string());
        }
        url
    }

    /// One connection: connect, then decode until something ends it.
    async fn stream_once(
        &mut self,
        tx: &mpsc::Sender<DeploymentEvent>,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Result<AttemptEnd> {
        let url = self.request_url();
        info!(url = %url, "Connecting to Nomad event stream");

        let mut request = self.client.get(url);
        if let Some(token) = &self.token {
            request = request.header(TOKEN_HEADER, token);
        }

        let mut response = tokio::select! {
            _ = wait_for_shutdown(shutdown) => return Ok(AttemptEnd::Cancelled),
            response = request.send() => response?,
        };

        let status = response.status();
        if status != StatusCode::OK {
            return Err(Error::Status { status });
        }

        self.set_state(StreamState::Streaming);
        info!("Connected to Nomad event stream");

        let mut decoder = FrameDecoder::new();
        loop {
            let chunk = tokio::select! {
                _ = wait_for_shutdown(shutdown) => return Ok(AttemptEnd::Cancelled),
                chunk = response.chunk() => chunk?,
            };
            let Some(chunk) = chunk else {
                if decoder.pending() > 0 {
                    debug!(bytes = decoder.pending(), "Discarding partial frame at end of stream");
                }
                return Ok(AttemptEnd::PeerClosed);
            };

            decoder.push(&chunk);
            while let Some(frame) = decoder.next_frame() {
                match frame {
                    Ok(frame) => {
                        if let Some(end) = self.deliver(frame, tx, shutdown).await? {
                            return Ok(end);
                        }
                    }
                    Err(e) => {
                        error!(error = %e, "Failed to decode event stream frame");
                    }
                }
            }
        }
    }

    /// Translate a frame and push its deployments onto the queue.
    ///
    /// The last deployment of the frame carries the frame index as its
    /// checkpoint. Returns `Some` when the attempt must end without error.
    async fn deliver(
        &mut self,
        frame: StreamFrame,
        tx: &mpsc::Sender<DeploymentEvent>,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Result<Option<AttemptEnd>> {
        // A decoded frame proves the connection healthy.
        self.backoff.reset();

        let mut deployments = Vec::new();
        let mut failure = None;
        for raw in &frame.events {
            debug!(
                topic = %raw.topic,
                kind = %raw.kind,
                key = %raw.key,
                index = raw.index,
                "Received Nomad event"
            );

            match translate(raw) {
                Ok(translated) => deployments.extend(translated),
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
        }

        let checkpoint = frame.index.filter(|&index| index > 0);
        if let (Some(index), Some(last)) = (checkpoint, deployments.pop()) {
            deployments.push(last.with_checkpoint(index));
        }

        for deployment in deployments {
            tokio::select! {
                _ = wait_for_shutdown(shutdown) => return Ok(Some(AttemptEnd::Cancelled)),
                sent = tx.send(deployment) => {
                    if sent.is_err() {
                        return Ok(Some(AttemptEnd::ReceiverClosed));
                    }
                }
            }
        }

        // A poisoned frame is skipped on reconnect instead of replayed forever.
        self.advance(checkpoint);
        match failure {
            Some(e) => Err(e),
            None => Ok(None),
        }
    }

    fn advance(&mut self, index: Option<u64>) {
        let Some(index) = index else {
            return;
        };
        if self.last_index.is_some_and(|last| index <= last) {
            return;
        }
        self.last_index = Some(index);
    }
}
