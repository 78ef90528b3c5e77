//! put/get/copy command-line tools.
//!
//! Each binary is a thin wrapper: parse arguments, build a backend from a
//! URI, perform one operation. Errors are printed as `Error: <message>` on
//! stderr with exit code 1.

use std::io::Write;

use clap::{Args, Parser};
use tracing_subscriber::EnvFilter;

use configuration::{get_configuration, BoxedConfiguration, ConfigurationInterface};

/// Environment variable read for the log filter, in `EnvFilter` syntax.
pub const LOG_ENV: &str = "CONFIGURATION_LOG";

#[derive(thiserror::Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Configuration(#[from] configuration::Error),

    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

/// Options shared by every tool.
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Path separator used for paths given on the command line
    #[arg(long, env = "CONFIGURATION_SEPARATOR", default_value_t = '/')]
    pub separator: char,

    /// Log backend activity to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

/// Exit status of `configuration-get` when nothing is stored at the path.
pub const EXIT_NOT_FOUND: i32 = 2;

const GET_EXIT_STATUS: &str = "Exit status: 0 when a value was printed, 1 on error, \
2 when nothing is stored at the path (or the subtree is empty with --recursive).";

/// Store a value in a configuration backend
#[derive(Parser, Debug)]
#[command(name = "configuration-put")]
#[command(author, version, about, long_about = None)]
pub struct PutArgs {
    /// Backend URI, e.g. file:/etc/app.ini or consul://localhost:8500/prefix
    pub uri: String,

    /// Path of the value
    pub path: String,

    /// Value to store
    pub value: String,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Read a value from a configuration backend
#[derive(Parser, Debug)]
#[command(name = "configuration-get")]
#[command(author, version, about, long_about = None)]
#[command(after_help = GET_EXIT_STATUS)]
pub struct GetArgs {
    /// Backend URI
    pub uri: String,

    /// Path of the value
    pub path: String,

    /// Print every key=value at and below the path
    #[arg(short, long)]
    pub recursive: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Copy every value from one configuration backend to another
#[derive(Parser, Debug)]
#[command(name = "configuration-copy")]
#[command(author, version, about, long_about = None)]
pub struct CopyArgs {
    /// Source backend URI
    pub source: String,

    /// Destination backend URI
    pub destination: String,

    /// Only copy the subtree at this path
    #[arg(long, default_value = "")]
    pub path: String,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Install the stderr log subscriber.
///
/// `CONFIGURATION_LOG` wins when set; otherwise `warn`, or `debug` with `--verbose`.
pub fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn open(uri: &str, common: &CommonArgs) -> Result<BoxedConfiguration, CliError> {
    let mut configuration = get_configuration(uri)?;
    configuration.set_path_separator(common.separator);
    Ok(configuration)
}

pub fn put(args: &PutArgs) -> Result<(), CliError> {
    let mut configuration = open(&args.uri, &args.common)?;
    configuration.put_string(&args.path, &args.value)?;
    tracing::info!(uri = %args.uri, path = %args.path, "stored");
    Ok(())
}

/// Print the value (or subtree) at the path. Returns whether anything was found.
pub fn get(args: &GetArgs, out: &mut dyn Write) -> Result<bool, CliError> {
    let mut configuration = open(&args.uri, &args.common)?;

    if args.recursive {
        let map = configuration.get_recursive_map(&args.path)?;
        for (key, value) in &map {
            writeln!(out, "{}={}", key, value)?;
        }
        return Ok(!map.is_empty());
    }

    match configuration.get_string(&args.path)? {
        Some(value) => {
            writeln!(out, "{}", value)?;
            Ok(true)
        }
        None => Ok(false),
    }
}

/// Copy the source subtree into the destination. Returns the number of values copied.
pub fn copy(args: &CopyArgs) -> Result<usize, CliError> {
    let mut source = open(&args.source, &args.common)?;
    let mut destination = open(&args.destination, &args.common)?;

    let map = source.get_recursive_map(&args.path)?;
    for (key, value) in &map {
        destination.put_string(key, value)?;
    }
    tracing::info!(count = map.len(), "copied");
    Ok(map.len())
}
