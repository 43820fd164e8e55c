//! Infrastructure bootstrap helpers for runtime wiring.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;

use crate::adapter::outbound::idle::IdleSource;
use crate::adapter::outbound::nomad::NomadSource;
use crate::adapter::outbound::sqlite::database::connection::{open, DbPool};
use crate::adapter::outbound::sqlite::{SqliteCursorStore, SqliteTargetRegistry};
use crate::application::{Correlator, PipelineSummary, VersionStream};
use crate::error::Result;
use crate::infrastructure::config::settings::Config;
use crate::port::outbound::cursor::CursorStore;
use crate::port::outbound::source::EventSource;

/// Open the configured database and apply pending migrations.
///
/// # Errors
///
/// Returns an error if the database cannot be opened or migrated.
pub fn open_database(config: &Config) -> Result<DbPool> {
    let pool = open(&config.database)?;
    info!(path = %config.database, "Database ready");
    Ok(pool)
}

/// Build the stream cursor store when resuming is enabled.
#[must_use]
pub fn build_cursor(config: &Config, pool: &DbPool) -> Option<Arc<dyn CursorStore>> {
    if !config.nomad.enabled || !config.nomad.resume {
        return None;
    }
    Some(Arc::new(SqliteCursorStore::new(pool.clone())))
}

/// Build the Nomad stream client, resuming from `cursor` when given.
///
/// # Errors
///
/// Returns an error if the Nomad address is not a valid URL.
pub fn build_nomad_source(
    config: &Config,
    cursor: Option<Arc<dyn CursorStore>>,
) -> Result<NomadSource> {
    let source = NomadSource::new(&config.nomad, config.reconnection.clone())?;
    Ok(match cursor {
        Some(cursor) => source.with_cursor(cursor),
        None => source,
    })
}

/// Build the configured event source.
///
/// # Errors
///
/// Returns an error if the Nomad source cannot be constructed.
pub fn build_source(
    config: &Config,
    cursor: Option<Arc<dyn CursorStore>>,
) -> Result<Box<dyn EventSource>> {
    if !config.nomad.enabled {
        return Ok(Box::new(IdleSource));
    }
    Ok(Box::new(build_nomad_source(config, cursor)?))
}

/// Wire everything from configuration and run until shutdown.
///
/// # Errors
///
/// Returns an error if wiring fails or the pipeline halts on an ambiguous
/// deployment target.
pub async fn run(config: &Config, shutdown: watch::Receiver<bool>) -> Result<PipelineSummary> {
    let pool = open_database(config)?;
    let cursor = build_cursor(config, &pool);
    let source = build_source(config, cursor.clone())?;
    let correlator = Correlator::new(SqliteTargetRegistry::new(pool));

    info!(
        source = source.source_name(),
        address = %config.nomad.address,
        resume = cursor.is_some(),
        "Starting version stream"
    );
    VersionStream::run_with_cursor(source.as_ref(), &correlator, cursor.as_deref(), shutdown)
        .await
}
