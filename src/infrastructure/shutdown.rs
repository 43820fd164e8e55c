//! Cooperative shutdown over a `watch::Receiver<bool>`.
//!
//! The flag flipping to `true` requests shutdown. A dropped sender counts as
//! a shutdown request too, so orphaned tasks never outlive their owner.

use tokio::sync::watch;

/// Resolve once shutdown has been requested.
pub async fn wait_for_shutdown(shutdown: &mut watch::Receiver<bool>) {
    let _ = shutdown.wait_for(|stop| *stop).await;
}

/// Whether shutdown has already been requested.
#[must_use]
pub fn is_shutdown(shutdown: &watch::Receiver<bool>) -> bool {
    *shutdown.borrow() || shutdown.has_changed().is_err()
}
