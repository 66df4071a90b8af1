use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// File constants
// ---------------------------------------------------------------------------

pub const STATE_FILE: &str = "data/state.json";
pub const CONFIG_FILE: &str = "mnemono.yaml";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn default_state_path() -> PathBuf {
    PathBuf::from(STATE_FILE)
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from(CONFIG_FILE)
}

/// Resolve `path` against `base` unless it is already absolute.
pub fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
