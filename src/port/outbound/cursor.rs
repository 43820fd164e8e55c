//! Stream position persistence port.

use async_trait::async_trait;

use crate::error::Result;

/// Remembers how far an event stream has been consumed.
#[async_trait]
pub trait CursorStore: Send + Sync {
    /// Last fully handled index for `source`, if any.
    async fn load(&self, source: &str) -> Result<Option<u64>>;

    /// Record that everything up to and including `index` was handled.
    async fn save(&self, source: &str, index: u64) -> Result<()>;
}
