//! In-memory [`CursorStore`] that remembers every save.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::Result;
use crate::port::outbound::cursor::CursorStore;

#[derive(Default)]
struct Inner {
    positions: HashMap<String, u64>,
    saves: Vec<(String, u64)>,
}

/// Cursor store kept in memory, shared between clones.
#[derive(Clone, Default)]
pub struct MemoryCursor {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current position for `source`.
    pub fn position(&self, source: &str) -> Option<u64> {
        self.inner.lock().positions.get(source).copied()
    }

    /// Every `save` call, in order.
    pub fn saves(&self) -> Vec<(String, u64)> {
        self.inner.lock().saves.clone()
    }
}

#[async_trait]
impl CursorStore for MemoryCursor {
    async fn load(&self, source: &str) -> Result<Option<u64>> {
        Ok(self.position(source))
    }

    async fn save(&self, source: &str, index: u64) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.positions.insert(source.to_string(), index);
        inner.saves.push((source.to_string(), index));
        Ok(())
    }
}
