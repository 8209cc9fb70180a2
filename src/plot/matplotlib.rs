use super::*;
use crate::tsdb::Value;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::info;

pub fn command() -> clap::Command {
    clap::Command::new("matplotlib")
        .about("Generate a file that uses matplotlib")
        .args(args())
        .arg(
            clap::Arg::new("OUTPUT")
                .long("output")
                .short('o')
                .help("Write the python script to this file instead of stdout")
                .action(clap::ArgAction::Set)
                .value_parser(value_parser!(PathBuf)),
        )
}

pub struct Config {
    options: Options,
    output: Option<PathBuf>,
}

impl Config {
    pub fn new(args: &ArgMatches, defaults: &config::Config) -> Result<Self> {
        Ok(Config {
            options: Options::new(args, defaults)?,
            output: args.get_one::<PathBuf>("OUTPUT").cloned(),
        })
    }
}

pub fn run(config: Config) -> Result<()> {
    let table = config.options.fetch()?;
    let script = script(&table, config.options.title());

    match config.output {
        Some(path) => {
            let mut out = BufWriter::new(File::create(&path)?);
            out.write_all(script.as_bytes())?;
            out.flush()?;
            info!("wrote {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(script.as_bytes())?;
            stdout.flush()?;
        }
    }

    Ok(())
}

/// Renders a standalone python 3 script that draws one line per column.
/// Samples with no data are left out of their series.
pub fn script(table: &Table, title: &str) -> String {
    let mut series = String::new();

    for (i, column) in table.columns().iter().enumerate() {
        let mut timestamps = Vec::new();
        let mut values = Vec::new();

        for row in table.rows() {
            if let Some(Value::Float(v)) = row.values[i] {
                timestamps.push(row.timestamp.to_string());
                values.push(float(v));
            }
        }

        series.push_str(&format!(
            "    ({}, [{}], [{}]),\n",
            string(column),
            timestamps.join(", "),
            values.join(", ")
        ));
    }

    format!(
        r#"#!/usr/bin/env python3
from datetime import datetime, timezone

import matplotlib.dates as mdates
import matplotlib.pyplot as plt

title = {title}

series = [
{series}]

fig, ax = plt.subplots()
for label, timestamps, values in series:
    times = [datetime.fromtimestamp(t, tz=timezone.utc) for t in timestamps]
    ax.plot(times, values, label=label)

ax.set_title(title)
ax.set_xlabel("time (UTC)")
ax.xaxis.set_major_formatter(mdates.DateFormatter("%H:%M:%S"))
ax.grid(True)
ax.legend()
fig.autofmt_xdate()
plt.show()
"#,
        title = string(title),
    )
}

/// JSON string literals are valid python string literals.
fn string(s: &str) -> String {
    serde_json::Value::from(s).to_string()
}

fn float(v: f64) -> String {
    if v.is_infinite() {
        if v > 0.0 {
            "float(\"inf\")".to_string()
        } else {
            "float(\"-inf\")".to_string()
        }
    } else {
        Value::Float(v).to_string()
    }
}
