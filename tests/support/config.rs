use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

/// Write `contents` to a config file inside a fresh temp directory.
pub fn write_temp_config(contents: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("config.toml");
    fs::write(&path, contents).expect("write temp config");
    (dir, path)
}

/// Config pointing the database into `dir` with Nomad disabled.
pub fn offline_config(dir: &TempDir) -> String {
    format!(
        "database = \"{}\"\n\n[nomad]\nenabled = false\n",
        dir.path().join("overseer.db").display()
    )
}
