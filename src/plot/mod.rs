//! Commands that turn a range query into a plot instead of CSV.

use crate::client::{self, RangeQuery};
use crate::config;
use crate::error::{Error, Result};
use crate::export;
use crate::table::Table;
use crate::window::TimeWindow;
use clap::{value_parser, Arg, ArgMatches};
use std::time::Duration;

pub mod gnuplot;
pub mod matplotlib;

/// Arguments shared by every plot command.
fn args() -> [Arg; 5] {
    [
        clap::Arg::new("QUERY")
            .help("PromQL expression, sent to prometheus as-is")
            .action(clap::ArgAction::Set)
            .index(1),
        clap::Arg::new("PROMETHEUS")
            .long("prometheus")
            .help("Prometheus base url [default: http://localhost:9090]")
            .action(clap::ArgAction::Set),
        clap::Arg::new("DURATION")
            .long("duration")
            .short('d')
            .help("The duration to get timeseries from [default: 1h]")
            .action(clap::ArgAction::Set)
            .value_parser(value_parser!(humantime::Duration)),
        clap::Arg::new("TITLE")
            .long("title")
            .help("Title of the graph [default: the query]")
            .action(clap::ArgAction::Set),
        clap::Arg::new("STEP")
            .long("step")
            .help("Query resolution step, sized to the window when unset")
            .action(clap::ArgAction::Set)
            .value_parser(value_parser!(humantime::Duration)),
    ]
}

/// What to plot and where to get it from.
pub struct Options {
    query: String,
    prometheus: String,
    window: TimeWindow,
    step: Option<Duration>,
    timeout: Option<Duration>,
    title: String,
}

impl Options {
    fn new(args: &ArgMatches, defaults: &config::Config) -> Result<Self> {
        let general = defaults.general();
        let query = export::query(args)?;

        let duration = args
            .get_one::<humantime::Duration>("DURATION")
            .map(|d| (*d).into())
            .unwrap_or_else(|| general.duration());

        Ok(Options {
            title: args
                .get_one::<String>("TITLE")
                .cloned()
                .unwrap_or_else(|| query.clone()),
            query,
            prometheus: args
                .get_one::<String>("PROMETHEUS")
                .cloned()
                .unwrap_or_else(|| general.prometheus().to_string()),
            window: TimeWindow::lookback_from_now(duration)?,
            step: args
                .get_one::<humantime::Duration>("STEP")
                .map(|d| (*d).into())
                .or_else(|| general.step()),
            timeout: general.timeout(),
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Runs the query and aligns the result. An empty result is an error
    /// since there is nothing to draw.
    fn fetch(&self) -> Result<Table> {
        let query = RangeQuery::new(&self.query, self.window, self.step)?;
        let results = client::query(&self.prometheus, self.timeout, &query)?;
        if results.is_empty() {
            return Err(Error::NoSeries);
        }

        Ok(Table::new(&results))
    }
}
