//! SQLite stream cursor persistence.

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use diesel::prelude::*;

use crate::adapter::outbound::sqlite::database::connection::DbPool;
use crate::adapter::outbound::sqlite::database::model::CursorRow;
use crate::adapter::outbound::sqlite::database::schema::stream_cursors;
use crate::error::{Error, Result};
use crate::port::outbound::cursor::CursorStore;

/// Stores the last delivered stream index per source.
#[derive(Clone)]
pub struct SqliteCursorStore {
    pool: DbPool,
}

impl SqliteCursorStore {
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CursorStore for SqliteCursorStore {
    async fn load(&self, source: &str) -> Result<Option<u64>> {
        let mut conn = self.pool.get()?;
        let stored: Option<i64> = stream_cursors::table
            .find(source)
            .select(stream_cursors::last_index)
            .first(&mut conn)
            .optional()?;

        stored
            .map(|index| {
                u64::try_from(index)
                    .map_err(|_| Error::Database(format!("negative stream index {index}")))
            })
            .transpose()
    }

    async fn save(&self, source: &str, index: u64) -> Result<()> {
        let last_index = i64::try_from(index)
            .map_err(|_| Error::Validation(format!("stream index {index} out of range")))?;
        let row = CursorRow {
            source: source.to_string(),
            last_index,
            updated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        };

        let mut conn = self.pool.get()?;
        diesel::replace_into(stream_cursors::table)
            .values(&row)
            .execute(&mut conn)?;
        Ok(())
    }
}
