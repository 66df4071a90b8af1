use mnemono_core::store::JsonFileStore;
use std::path::PathBuf;

/// Shared application state passed to all route handlers. Holds only the
/// state file location; each request loads the document fresh.
#[derive(Clone)]
pub struct AppState {
    pub state_file: PathBuf,
}

impl AppState {
    pub fn new(state_file: PathBuf) -> Self {
        Self { state_file }
    }

    pub fn store(&self) -> JsonFileStore {
        JsonFileStore::new(self.state_file.clone())
    }
}
