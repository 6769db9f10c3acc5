use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::check::Options;
use crate::logs::LogLevel;

/// File configuration for the `deepcheck` binary.
///
/// ```toml
/// [check]
/// allowExtraKeys = false
///
/// [log]
/// level = "debug"
/// ```
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub check: Options,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct LogConfig {
    #[serde(default)]
    pub level: LogLevel,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let cfg = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&cfg)?)
    }
}
