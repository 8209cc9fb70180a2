use super::*;
use std::io::Write;
use std::process::{Child, ExitStatus, Stdio};
use tracing::{debug, info};

pub fn command() -> clap::Command {
    clap::Command::new("gnuplot")
        .about("Directly plot a graph with gnuplot")
        .args(args())
        .arg(
            clap::Arg::new("PRINT")
                .long("print")
                .help("Write the gnuplot script to stdout instead of running gnuplot")
                .action(clap::ArgAction::SetTrue),
        )
}

pub struct Config {
    options: Options,
    print: bool,
}

impl Config {
    pub fn new(args: &ArgMatches, defaults: &config::Config) -> Result<Self> {
        Ok(Config {
            options: Options::new(args, defaults)?,
            print: args.get_flag("PRINT"),
        })
    }
}

/// Queries prometheus and either pipes the resulting script into
/// `gnuplot --persist` or prints it.
pub fn run(config: Config) -> Result<()> {
    let table = config.options.fetch()?;
    let script = script(&table, config.options.title())?;

    if config.print {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(script.as_bytes())?;
        stdout.flush()?;
        return Ok(());
    }

    info!("launching gnuplot");

    let child = std::process::Command::new("gnuplot")
        .arg("--persist")
        .stdin(Stdio::piped())
        .spawn()
        .map_err(|e| Error::PlotterFailed(format!("could not launch gnuplot: {e}")))?;

    let status = feed(child, &script)?;

    debug!("gnuplot exited with {status}");

    if !status.success() {
        return Err(Error::plotter_exited(status));
    }

    Ok(())
}

/// Writes `script` to the child's stdin, closes it and waits for the child
/// to exit. The child is always reaped, even when the write fails.
fn feed(mut child: Child, script: &str) -> Result<ExitStatus> {
    // stdin is dropped at the end of this block so the child sees EOF
    if let Some(mut stdin) = child.stdin.take() {
        if let Err(e) = stdin.write_all(script.as_bytes()) {
            drop(stdin);
            reap(&mut child);
            return Err(Error::PlotterFailed(format!("could not send script: {e}")));
        }
    }

    child
        .wait()
        .map_err(|e| Error::PlotterFailed(e.to_string()))
}

/// Stops a child that is no longer needed and collects its exit status.
fn reap(child: &mut Child) {
    if let Err(e) = child.kill() {
        debug!("failed to kill gnuplot: {e}");
    }
    if let Err(e) = child.wait() {
        debug!("failed to wait on gnuplot: {e}");
    }
}

/// Renders a self-contained gnuplot script. The aligned table is embedded
/// as a datablock so the script needs no other input.
pub fn script(table: &Table, title: &str) -> Result<String> {
    let mut data = Vec::new();
    table.write_rows(&mut data)?;

    let mut script = String::new();
    script.push_str(&format!("set title {} noenhanced\n", quote(title)));
    script.push_str("set datafile separator \",\"\n");
    script.push_str("set xdata time\n");
    script.push_str("set timefmt \"%s\"\n");
    script.push_str("set format x \"%H:%M:%S\"\n");
    script.push_str("set xlabel \"time (UTC)\"\n");
    script.push_str("set key outside right\n");
    script.push_str("set grid\n");
    script.push_str("$data << EOD\n");
    script.push_str(&String::from_utf8_lossy(&data));
    script.push_str("EOD\n");

    let plots: Vec<String> = table
        .columns()
        .iter()
        .enumerate()
        .map(|(i, column)| {
            format!(
                "$data using 1:{} with lines title {} noenhanced",
                i + 2,
                quote(column)
            )
        })
        .collect();

    script.push_str("plot ");
    script.push_str(&plots.join(", \\\n     "));
    script.push('\n');

    Ok(script)
}

/// A double-quoted gnuplot string literal.
fn quote(s: &str) -> String {
    let escaped = s
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n");
    format!("\"{escaped}\"")
}
