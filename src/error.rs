use std::process::ExitStatus;

pub type Result<T> = std::result::Result<T, Error>;

/// Every failure `styx` can report. All of them are terminal: the process
/// prints the message and exits non-zero.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("need a query to run")]
    MissingQueryArgument,

    #[error("invalid time window: start ({start}) must be before end ({end})")]
    InvalidTimeWindow { start: i64, end: i64 },

    #[error("invalid step: {0}")]
    InvalidStep(String),

    #[error("invalid backend url `{url}`: {reason}")]
    InvalidBackendUrl { url: String, reason: String },

    #[error("prometheus is unreachable: {0}")]
    BackendUnreachable(#[source] reqwest::Error),

    #[error("prometheus: {error_type}: {message}")]
    BackendError { error_type: String, message: String },

    #[error("malformed response from prometheus: {0}")]
    MalformedResponse(#[source] serde_json::Error),

    #[error("malformed sample value `{value}` in series {{{series}}}")]
    MalformedSample { series: String, value: String },

    #[error("failed to write output: {0}")]
    OutputWriteError(#[from] std::io::Error),

    #[error("config: {0}")]
    Config(String),

    #[error("query returned no series to plot")]
    NoSeries,

    #[error("gnuplot failed: {0}")]
    PlotterFailed(String),
}

impl Error {
    pub(crate) fn plotter_exited(status: ExitStatus) -> Self {
        Error::PlotterFailed(format!("exited with {status}"))
    }
}
