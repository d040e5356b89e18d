use crate::error::{ProvisorError, Result};
use crate::io;
use crate::jobs::ExecutionMode;
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// How jobs run: `inline` on the caller's thread, or `queued` on a
    /// background worker.
    #[serde(default)]
    pub execution_mode: ExecutionMode,

    /// Bound on one broker HTTP round trip.
    #[serde(default = "default_broker_timeout_secs")]
    pub broker_timeout_secs: u64,

    /// Actor recorded in mutation events when the caller names none.
    #[serde(default = "default_actor")]
    pub actor: String,
}

fn default_broker_timeout_secs() -> u64 {
    60
}

fn default_actor() -> String {
    "operator".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            execution_mode: ExecutionMode::default(),
            broker_timeout_secs: default_broker_timeout_secs(),
            actor: default_actor(),
        }
    }
}

impl Config {
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(ProvisorError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let config: Config = serde_yaml::from_str(&data)?;
        Ok(config)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        io::atomic_write(&path, data.as_bytes())
    }

    pub fn broker_timeout(&self) -> Duration {
        Duration::from_secs(self.broker_timeout_secs)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn config_roundtrip() {
        let dir = TempDir::new().unwrap();
        let config = Config {
            execution_mode: ExecutionMode::Queued,
            broker_timeout_secs: 15,
            actor: "ci".to_string(),
        };
        config.save(dir.path()).unwrap();

        let loaded = Config::load(dir.path()).unwrap();
        assert_eq!(loaded.execution_mode, ExecutionMode::Queued);
        assert_eq!(loaded.broker_timeout_secs, 15);
        assert_eq!(loaded.actor, "ci");
    }

    #[test]
    fn missing_config_is_not_initialized() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            Config::load(dir.path()),
            Err(ProvisorError::NotInitialized)
        ));
    }

    #[test]
    fn defaults_fill_missing_fields() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".provisor")).unwrap();
        std::fs::write(dir.path().join(".provisor/config.yaml"), "actor: alice\n").unwrap();

        let loaded = Config::load(dir.path()).unwrap();
        assert_eq!(loaded.execution_mode, ExecutionMode::Inline);
        assert_eq!(loaded.broker_timeout_secs, 60);
        assert_eq!(loaded.actor, "alice");
    }
}
