//! JSON file configuration adapter.
//!
//! Implements [`ConfigPort`] on a single JSON document.  Loading parses
//! and validates; saving creates the file and never replaces an existing
//! one.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use log::info;

use crate::app::ports::ConfigPort;
use crate::config::NotifierConfig;
use crate::error::ConfigError;

pub struct JsonFileConfig {
    path: PathBuf,
}

impl JsonFileConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigPort for JsonFileConfig {
    fn load(&self) -> Result<NotifierConfig, ConfigError> {
        let text = fs::read_to_string(&self.path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", self.path.display(), e)))?;
        let config = NotifierConfig::from_json(&text)?;
        config.validate()?;
        info!(
            "Config: loaded {} ({} checker(s))",
            self.path.display(),
            config.checkers.len()
        );
        Ok(config)
    }

    fn exists(&self) -> bool {
        self.path.exists()
    }

    fn save(&self, config: &NotifierConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let text = serde_json::to_string_pretty(config).map_err(|e| ConfigError::Parse(e.to_string()))?;

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.path)
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::AlreadyExists => ConfigError::AlreadyExists(self.path.display().to_string()),
                _ => ConfigError::Io(format!("{}: {}", self.path.display(), e)),
            })?;
        file.write_all(text.as_bytes())
            .and_then(|()| file.write_all(b"\n"))
            .map_err(|e| ConfigError::Io(format!("{}: {}", self.path.display(), e)))?;

        info!("Config: wrote {}", self.path.display());
        Ok(())
    }
}
