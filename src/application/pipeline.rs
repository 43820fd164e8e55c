//! Version stream pipeline.
//!
//! Pulls deployment events from an [`EventSource`] one at a time and hands
//! them to the [`Correlator`] in arrival order. The loop ends when the source
//! closes its queue (shutdown) or when correlation hits an ambiguous target.
//!
//! With a [`CursorStore`], an event's checkpoint is saved only after the
//! correlator has handled it, so a halted or crashed run resumes at the
//! first event it did not finish.

use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use super::correlator::{CorrelationOutcome, Correlator};
use crate::error::Result;
use crate::port::outbound::cursor::CursorStore;
use crate::port::outbound::registry::TargetRegistry;
use crate::port::outbound::source::EventSource;

/// Counters for one pipeline run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineSummary {
    pub received: u64,
    pub registered: u64,
    pub unmatched: u64,
    pub failed: u64,
}

impl PipelineSummary {
    fn record(&mut self, outcome: CorrelationOutcome) {
        match outcome {
            CorrelationOutcome::Registered { .. } => self.registered += 1,
            CorrelationOutcome::Unmatched => self.unmatched += 1,
            CorrelationOutcome::Failed => self.failed += 1,
        }
    }
}

/// Sequential driver connecting a source to a correlator.
pub struct VersionStream;

impl VersionStream {
    /// Run until the source's queue closes, without saving checkpoints.
    ///
    /// # Errors
    ///
    /// See [`VersionStream::run_with_cursor`].
    pub async fn run<S, R>(
        source: &S,
        correlator: &Correlator<R>,
        shutdown: watch::Receiver<bool>,
    ) -> Result<PipelineSummary>
    where
        S: EventSource + ?Sized,
        R: TargetRegistry,
    {
        Self::run_with_cursor(source, correlator, None, shutdown).await
    }

    /// Run until the source's queue closes, saving each handled checkpoint
    /// to `cursor` under the source's name.
    ///
    /// Returning drops the queue receiver, which stops the source's
    /// background task.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be started, or
    /// [`Error::AmbiguousTarget`](crate::error::Error::AmbiguousTarget) when
    /// a deployment name resolves to more than one target. The checkpoint of
    /// the event that caused the error is not saved.
    pub async fn run_with_cursor<S, R>(
        source: &S,
        correlator: &Correlator<R>,
        cursor: Option<&dyn CursorStore>,
        shutdown: watch::Receiver<bool>,
    ) -> Result<PipelineSummary>
    where
        S: EventSource + ?Sized,
        R: TargetRegistry,
    {
        let mut events = source.stream_events(shutdown).await?;
        let mut summary = PipelineSummary::default();
        info!(source = source.source_name(), "Version stream started");

        while let Some(event) = events.recv().await {
            summary.received += 1;
            debug!(
                event_id = %event.id,
                deployment_name = %event.deployment_name,
                version = %event.version,
                "Deployment event received"
            );

            match correlator.handle(&event).await {
                Ok(outcome) => summary.record(outcome),
                Err(e) => {
                    error!(error = %e, "Version stream halted");
                    return Err(e);
                }
            }

            if let (Some(cursor), Some(index)) = (cursor, event.checkpoint) {
                if let Err(e) = cursor.save(source.source_name(), index).await {
                    warn!(error = %e, index, "Failed to persist stream cursor");
                }
            }
        }

        info!(
            received = summary.received,
            registered = summary.registered,
            unmatched = summary.unmatched,
            failed = summary.failed,
            "Version stream stopped"
        );
        Ok(summary)
    }
}
