use crate::client::{self, RangeQuery};
use crate::config;
use crate::error::{Error, Result};
use crate::table;
use crate::window::{self, TimeWindow};
use clap::{value_parser, ArgMatches, Command};
use std::io::{BufWriter, Write};
use std::time::Duration;
use tracing::{debug, warn};

/// Lookback used for `--start` when a range is requested without one.
const DEFAULT_RANGE: i64 = 3600;

/// The top-level command: export a range query as CSV on stdout.
pub fn command() -> Command {
    Command::new(env!("CARGO_BIN_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .about("Export metrics from prometheus")
        .long_about(
            "Export metrics from prometheus.\n\n\
             Runs a range query and writes the result as CSV on stdout: one row \
             per timestamp and one column per series.",
        )
        .arg(
            clap::Arg::new("QUERY")
                .help("PromQL expression, sent to prometheus as-is")
                .action(clap::ArgAction::Set)
                .index(1),
        )
        .arg(
            clap::Arg::new("DURATION")
                .long("duration")
                .short('d')
                .help("The duration to get timeseries from [default: 1h]")
                .action(clap::ArgAction::Set)
                .value_parser(value_parser!(humantime::Duration)),
        )
        .arg(
            clap::Arg::new("START")
                .long("start")
                .short('s')
                .help("Start of query range, in unix seconds [default: now - 1h]")
                .action(clap::ArgAction::Set)
                .value_parser(value_parser!(i64)),
        )
        .arg(
            clap::Arg::new("END")
                .long("end")
                .short('e')
                .help("End of query range, in unix seconds [default: now]")
                .action(clap::ArgAction::Set)
                .value_parser(value_parser!(i64)),
        )
        .arg(
            clap::Arg::new("RANGE")
                .long("range")
                .short('r')
                .help("Query by --start and --end instead of --duration")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            clap::Arg::new("HEADER")
                .long("header")
                .help("Include a header line in the csv output [default: true]")
                .action(clap::ArgAction::Set)
                .num_args(0..=1)
                .require_equals(true)
                .default_missing_value("true")
                .value_parser(value_parser!(bool)),
        )
        .arg(
            clap::Arg::new("PROMETHEUS")
                .long("prometheus")
                .help("Prometheus base url [default: http://localhost:9090]")
                .action(clap::ArgAction::Set),
        )
        .arg(
            clap::Arg::new("STEP")
                .long("step")
                .help("Query resolution step, sized to the window when unset")
                .action(clap::ArgAction::Set)
                .value_parser(value_parser!(humantime::Duration)),
        )
}

pub struct Config {
    query: String,
    prometheus: String,
    window: TimeWindow,
    step: Option<Duration>,
    timeout: Option<Duration>,
    header: bool,
}

impl Config {
    /// Resolves the command line against the defaults from the config file.
    pub fn new(args: &ArgMatches, defaults: &config::Config) -> Result<Self> {
        let general = defaults.general();

        let window = if args.get_flag("RANGE") {
            let now = window::now();
            let end = args.get_one::<i64>("END").copied().unwrap_or(now);
            let start = args
                .get_one::<i64>("START")
                .copied()
                .unwrap_or(now - DEFAULT_RANGE);
            TimeWindow::range(start, end)?
        } else {
            if args.contains_id("START") || args.contains_id("END") {
                warn!("--start and --end are ignored without --range");
            }

            let duration = args
                .get_one::<humantime::Duration>("DURATION")
                .map(|d| (*d).into())
                .unwrap_or_else(|| general.duration());
            TimeWindow::lookback_from_now(duration)?
        };

        Ok(Config {
            query: query(args)?,
            prometheus: args
                .get_one::<String>("PROMETHEUS")
                .cloned()
                .unwrap_or_else(|| general.prometheus().to_string()),
            window,
            step: args
                .get_one::<humantime::Duration>("STEP")
                .map(|d| (*d).into())
                .or_else(|| general.step()),
            timeout: general.timeout(),
            header: args
                .get_one::<bool>("HEADER")
                .copied()
                .unwrap_or_else(|| general.header()),
        })
    }
}

/// The query positional, required by every command that talks to prometheus.
pub fn query(args: &ArgMatches) -> Result<String> {
    args.get_one::<String>("QUERY")
        .filter(|q| !q.trim().is_empty())
        .cloned()
        .ok_or(Error::MissingQueryArgument)
}

/// Runs the query and writes the CSV table to stdout. Nothing is written
/// unless the backend returned a complete result.
pub fn run(config: Config) -> Result<()> {
    let query = RangeQuery::new(&config.query, config.window, config.step)?;
    let results = client::query(&config.prometheus, config.timeout, &query)?;

    debug!("writing {} series as csv", results.len());

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    if config.header {
        table::write_header(&mut out, &results)?;
    }
    table::write_rows(&mut out, &results)?;
    out.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(argv: &[&str]) -> Result<Config> {
        let args = command().try_get_matches_from(argv).unwrap();
        Config::new(&args, &config::Config::default())
    }

    #[test]
    fn defaults() {
        let config = config(&["styx", "up"]).unwrap();
        assert_eq!(config.query, "up");
        assert_eq!(config.prometheus, "http://localhost:9090");
        assert_eq!(config.window.span(), Duration::from_secs(3600));
        assert!(config.header);
        assert_eq!(config.step, None);
    }

    #[test]
    fn missing_query() {
        assert!(matches!(
            config(&["styx"]),
            Err(Error::MissingQueryArgument)
        ));
        assert!(matches!(
            config(&["styx", "  "]),
            Err(Error::MissingQueryArgument)
        ));
    }

    #[test]
    fn duration_flag() {
        let config = config(&["styx", "-d", "15m", "up"]).unwrap();
        assert_eq!(config.window.span(), Duration::from_secs(900));
        assert!(config.window.start() < config.window.end());
    }

    #[test]
    fn explicit_range() {
        let config = config(&["styx", "-r", "-s", "1000", "-e", "2000", "up"]).unwrap();
        assert_eq!(config.window, TimeWindow::range(1000, 2000).unwrap());
    }

    #[test]
    fn range_is_ignored_without_flag() {
        let config = config(&["styx", "-s", "1000", "-e", "2000", "up"]).unwrap();
        assert_eq!(config.window.span(), Duration::from_secs(3600));
        assert_ne!(config.window.end(), 2000);
    }

    #[test]
    fn inverted_range() {
        assert!(matches!(
            config(&["styx", "-r", "-s", "2000", "-e", "1000", "up"]),
            Err(Error::InvalidTimeWindow {
                start: 2000,
                end: 1000
            })
        ));
    }

    #[test]
    fn header_flag() {
        assert!(config(&["styx", "--header", "up"]).unwrap().header);
        assert!(config(&["styx", "--header=true", "up"]).unwrap().header);
        assert!(!config(&["styx", "--header=false", "up"]).unwrap().header);
    }

    #[test]
    fn prometheus_and_step() {
        let config = config(&[
            "styx",
            "--prometheus",
            "http://prom:9090",
            "--step",
            "30s",
            "up",
        ])
        .unwrap();
        assert_eq!(config.prometheus, "http://prom:9090");
        assert_eq!(config.step, Some(Duration::from_secs(30)));
    }
}
