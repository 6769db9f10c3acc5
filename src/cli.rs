//! Command line front end of the `deepcheck` binary.
//!
//! Parsing and the check itself live here so they can be driven without
//! spawning the process; `main` only installs logging and maps the result to
//! an exit code.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use tracing::debug;

use crate::check::deep_check;
use crate::config::Config;
use crate::logs::LogLevel;
use crate::value::Value;

/// Check a JSON document against a deepcheck schema.
///
/// Both files are read as Extended JSON, so `{"$date": ...}` and
/// `{"$regularExpression": ...}` wrappers become dates and patterns.
#[derive(Parser, Debug)]
#[command(name = "deepcheck", version, about, long_about = None)]
pub struct Cli {
    /// Document to check.
    #[arg(long)]
    pub data: PathBuf,

    /// Schema to check the document against.
    #[arg(long)]
    pub schema: PathBuf,

    /// Path to a TOML configuration file.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Reject object keys the schema does not declare, unless a schema node
    /// says otherwise. Overrides the configuration file.
    #[arg(long)]
    pub allow_extra_keys: Option<bool>,

    /// Log level (trace, debug, info, warn, error). Overrides the
    /// configuration file; `RUST_LOG` wins over both.
    #[arg(long)]
    pub log_level: Option<LogLevel>,
}

impl Cli {
    /// Loads the configuration file, if any, and applies the flags on top.
    pub fn config(&self) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)
                .with_context(|| format!("failed to load config: {}", path.display()))?,
            None => Config::default(),
        };

        if let Some(allow) = self.allow_extra_keys {
            config.check.allow_extra_keys = Some(allow);
        }
        if let Some(level) = self.log_level {
            config.log.level = level;
        }
        Ok(config)
    }
}

/// Reads both documents and checks one against the other.
pub fn run(cli: &Cli, config: &Config) -> anyhow::Result<()> {
    debug!("config: {:?}", config);

    let data = read_document(&cli.data)?;
    let schema = read_document(&cli.schema)?;

    deep_check(&data, &schema, &config.check)?;
    Ok(())
}

fn read_document(path: &Path) -> anyhow::Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let json = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    Value::from_extended_json(json).with_context(|| format!("failed to decode {}", path.display()))
}
