use super::*;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct General {
    // base url of the prometheus server
    #[serde(default = "prometheus")]
    prometheus: String,

    // lookback window when no explicit range is given
    #[serde(default = "duration")]
    duration: String,

    // whether csv output starts with a header line
    #[serde(default = "enabled")]
    header: bool,

    // fixed query step, sized to the window when unset
    #[serde(default)]
    step: Option<String>,

    // http request timeout, the client default when unset
    #[serde(default)]
    timeout: Option<String>,
}

impl Default for General {
    fn default() -> Self {
        Self {
            prometheus: prometheus(),
            duration: duration(),
            header: enabled(),
            step: None,
            timeout: None,
        }
    }
}

impl General {
    pub fn check(&self) -> Result<()> {
        parse_duration("duration", &self.duration)?;

        if let Some(step) = &self.step {
            parse_duration("step", step)?;
        }

        if let Some(timeout) = &self.timeout {
            parse_duration("timeout", timeout)?;
        }

        Ok(())
    }

    pub fn prometheus(&self) -> &str {
        &self.prometheus
    }

    // the accessors below rely on `check()` having passed

    pub fn duration(&self) -> Duration {
        parse_duration("duration", &self.duration).unwrap_or(Duration::from_secs(3600))
    }

    pub fn header(&self) -> bool {
        self.header
    }

    pub fn step(&self) -> Option<Duration> {
        self.step
            .as_deref()
            .and_then(|s| parse_duration("step", s).ok())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
            .as_deref()
            .and_then(|s| parse_duration("timeout", s).ok())
    }
}
