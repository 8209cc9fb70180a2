use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

mod general;
mod log;

pub use general::General;
pub use log::Log;

fn prometheus() -> String {
    "http://localhost:9090".into()
}

fn duration() -> String {
    "1h".into()
}

fn enabled() -> bool {
    true
}

fn log_level() -> String {
    "warn".into()
}

fn parse_duration(field: &str, value: &str) -> Result<Duration> {
    value
        .parse::<humantime::Duration>()
        .map(Into::into)
        .map_err(|e| Error::Config(format!("{field} couldn't be parsed: {e}")))
}

/// Defaults loaded from an optional TOML file. Command line flags take
/// precedence over anything set here.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    general: General,
    #[serde(default)]
    log: Log,
}

impl Config {
    pub fn load(path: &dyn AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("unable to open {}: {e}", path.display())))?;

        Self::parse(&content).map_err(|e| Error::Config(format!("{}: {e}", path.display())))
    }

    /// Loads `path` when given, otherwise uses the built-in defaults.
    pub fn load_optional(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    fn parse(content: &str) -> std::result::Result<Self, String> {
        let config: Config = toml::from_str(content).map_err(|e| e.to_string())?;

        config.general.check().map_err(|e| e.to_string())?;
        config.log.check().map_err(|e| e.to_string())?;

        Ok(config)
    }

    pub fn general(&self) -> &General {
        &self.general
    }

    pub fn log(&self) -> &Log {
        &self.log
    }
}
