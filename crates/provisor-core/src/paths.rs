use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const PROVISOR_DIR: &str = ".provisor";
pub const CONFIG_FILE: &str = ".provisor/config.yaml";
pub const DB_FILE: &str = ".provisor/lifecycle.db";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn provisor_dir(root: &Path) -> PathBuf {
    root.join(PROVISOR_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn db_path(root: &Path) -> PathBuf {
    root.join(DB_FILE)
}
