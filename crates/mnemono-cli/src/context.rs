use anyhow::Context as _;
use mnemono_core::commands::{Assistant, CommandPolicy};
use mnemono_core::config::Config;
use mnemono_core::paths;
use mnemono_core::store::JsonFileStore;
use std::path::{Path, PathBuf};

/// Everything a subcommand needs: the merged config and where it came from.
pub struct Context {
    pub config: Config,
    pub config_path: PathBuf,
}

impl Context {
    /// Load the config file (defaults if absent), then apply overrides.
    ///
    /// Priority for the state file:
    /// 1. `--state` flag / `MNEMONO_STATE` env var
    /// 2. `state_file` in the config file
    /// 3. `data/state.json`
    pub fn resolve(config_path: Option<&Path>, state_file: Option<&Path>) -> anyhow::Result<Self> {
        let config_path = config_path
            .map(Path::to_path_buf)
            .unwrap_or_else(paths::default_config_path);
        let mut config = Config::load(&config_path)
            .with_context(|| format!("failed to load config {}", config_path.display()))?;
        if let Some(p) = state_file {
            config.state_file = p.to_path_buf();
        }
        Ok(Self {
            config,
            config_path,
        })
    }

    pub fn store(&self) -> JsonFileStore {
        JsonFileStore::new(self.config.state_file.clone())
    }

    pub fn assistant(&self) -> Assistant<JsonFileStore> {
        Assistant::new(self.store(), CommandPolicy::from(&self.config))
    }
}
