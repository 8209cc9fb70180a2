use super::*;
use tracing::Level;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Log {
    #[serde(default = "log_level")]
    level: String,
}

impl Default for Log {
    fn default() -> Self {
        Self { level: log_level() }
    }
}

impl Log {
    pub fn check(&self) -> Result<()> {
        self.level
            .parse::<Level>()
            .map(|_| ())
            .map_err(|_| Error::Config(format!("unknown log level: {}", self.level)))
    }

    pub fn level(&self) -> Level {
        self.level.parse().unwrap_or(Level::WARN)
    }
}
