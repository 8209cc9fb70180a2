use backtrace::Backtrace;
use clap::{value_parser, ArgMatches};
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

mod client;
mod config;
mod error;
mod export;
mod plot;
mod table;
mod tsdb;
mod window;

use error::Result;
use plot::{gnuplot, matplotlib};

fn main() {
    // custom panic hook to terminate whole process after unwinding
    std::panic::set_hook(Box::new(|s| {
        eprintln!("{s}");
        eprintln!("{:?}", Backtrace::new());
        std::process::exit(101);
    }));

    // parse command line options
    let matches = export::command()
        .arg(
            clap::Arg::new("CONFIG")
                .long("config")
                .short('c')
                .help("TOML file with default settings")
                .action(clap::ArgAction::Set)
                .value_parser(value_parser!(PathBuf))
                .global(true),
        )
        .arg(
            clap::Arg::new("VERBOSE")
                .long("verbose")
                .short('v')
                .help("Increase the verbosity")
                .action(clap::ArgAction::Count)
                .global(true),
        )
        .subcommand(gnuplot::command())
        .subcommand(matplotlib::command())
        .get_matches();

    if let Err(e) = run(&matches) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(matches: &ArgMatches) -> Result<()> {
    let args = match matches.subcommand() {
        Some((_, args)) => args,
        None => matches,
    };

    let path = args.get_one::<PathBuf>("CONFIG");
    let defaults = config::Config::load_optional(path.map(|p| p.as_path()))?;

    configure_logging(defaults.log().level(), args.get_count("VERBOSE"));

    match matches.subcommand() {
        Some(("gnuplot", args)) => gnuplot::run(gnuplot::Config::new(args, &defaults)?),
        Some(("matplotlib", args)) => matplotlib::run(matplotlib::Config::new(args, &defaults)?),
        Some((name, _)) => unreachable!("unhandled subcommand: {name}"),
        None => export::run(export::Config::new(matches, &defaults)?),
    }
}

/// Logs go to stderr; stdout is reserved for output. Each `-v` raises the
/// configured level by one step.
fn configure_logging(base: Level, verbose: u8) {
    const LEVELS: [Level; 5] = [
        Level::ERROR,
        Level::WARN,
        Level::INFO,
        Level::DEBUG,
        Level::TRACE,
    ];

    let base = LEVELS.iter().position(|l| *l == base).unwrap_or(1);
    let level = LEVELS[(base + verbose as usize).min(LEVELS.len() - 1)];

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("failed to initialize logging");
    }
}
