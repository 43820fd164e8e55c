use overseer::adapter::outbound::sqlite::database::connection::{open, DbPool};
use tempfile::TempDir;

/// Temporary SQLite database for integration tests.
pub struct TempDb {
    dir: TempDir,
    pool: DbPool,
}

impl TempDb {
    pub fn create() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let pool = open(&Self::path_in(&dir)).expect("open sqlite database");
        Self { dir, pool }
    }

    fn path_in(dir: &TempDir) -> String {
        dir.path().join("overseer.db").to_string_lossy().into_owned()
    }

    pub fn path(&self) -> String {
        Self::path_in(&self.dir)
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}
