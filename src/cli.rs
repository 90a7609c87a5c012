//! Command-line interface for proc-harness.
//!
//! Uses lexopt for minimal binary size overhead.

use std::ffi::OsString;
use std::path::PathBuf;

/// Command-line arguments.
#[derive(Debug, Clone, Default)]
pub struct Args {
    /// Command line to run (positional tokens, re-split by the engine).
    pub command: Vec<String>,
    /// Command name for logging and the PID environment key.
    pub name: Option<String>,
    /// Timeout string; empty means no deadline.
    pub timeout: String,
    /// Capture stdout and print it instead of reporting a status.
    pub output: bool,
    /// Path to a configuration file (JSON).
    pub config: Option<PathBuf>,
    /// Run a named command block from the configuration file.
    pub job: Option<String>,
    /// Log level (error, warn, info, debug, trace).
    pub log_level: Option<String>,
    /// Show version and exit.
    pub version: bool,
    /// Show help and exit.
    pub help: bool,
}

/// Parse command-line arguments.
pub fn parse_args() -> Result<Args, ArgsError> {
    parse_args_from(std::env::args_os())
}

/// Parse arguments from an iterator (for testing).
pub fn parse_args_from<I>(args: I) -> Result<Args, ArgsError>
where
    I: IntoIterator<Item = OsString>,
{
    use lexopt::prelude::*;

    let mut result = Args::default();
    let mut parser = lexopt::Parser::from_iter(args);

    while let Some(arg) = parser.next()? {
        match arg {
            Short('h') | Long("help") => {
                result.help = true;
            }
            Short('V') | Long("version") => {
                result.version = true;
            }
            Short('t') | Long("timeout") => {
                result.timeout = parser.value()?.parse()?;
            }
            Short('n') | Long("name") => {
                result.name = Some(parser.value()?.parse()?);
            }
            Short('o') | Long("output") => {
                result.output = true;
            }
            Short('c') | Long("config") => {
                result.config = Some(parser.value()?.parse()?);
            }
            Short('j') | Long("job") => {
                result.job = Some(parser.value()?.parse()?);
            }
            Short('l') | Long("log-level") => {
                result.log_level = Some(parser.value()?.parse()?);
            }
            Value(val) => {
                // First positional starts the command line; everything after
                // belongs to it.
                result.command.push(val.to_string_lossy().into_owned());
                for rest in parser.raw_args()? {
                    result.command.push(rest.to_string_lossy().into_owned());
                }
            }
            _ => return Err(arg.unexpected().into()),
        }
    }

    if result.help || result.version {
        return Ok(result);
    }
    if result.command.is_empty() && result.job.is_none() {
        return Err(ArgsError::MissingCommand);
    }
    if result.job.is_some() && result.config.is_none() {
        return Err(ArgsError::JobWithoutConfig);
    }

    Ok(result)
}

impl Args {
    /// The positional tokens joined back into one command line.
    pub fn command_line(&self) -> String {
        self.command.join(" ")
    }
}

/// Print help message.
pub fn print_help() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        r#"proc-harness {version}
Process supervision primitive for container lifecycle managers

USAGE:
    proc-harness [OPTIONS] [--] <COMMAND>...
    proc-harness -c <FILE> -j <NAME>

OPTIONS:
    -t, --timeout <DUR>     Kill the command after this duration (e.g. 200ms, 1s, 1h)
    -n, --name <NAME>       Command name for logging and the PID variable
    -o, --output            Print the command's stdout instead of just its status
    -c, --config <FILE>     Path to configuration file (JSON)
    -j, --job <NAME>        Run a named command block from the config file
    -l, --log-level <LVL>   Log level (error, warn, info, debug, trace)
    -h, --help              Print help
    -V, --version           Print version

ENVIRONMENT VARIABLES:
    RUST_LOG                Log filter (overridden by --log-level)
    PROCHARNESS_<NAME>_PID  Set to the child PID of each launched command

EXAMPLES:
    # Run a lifecycle hook to completion, propagating its exit status
    proc-harness -n prestart -- sh hooks/prestart.sh

    # Bound a health check to 200ms
    proc-harness -n health -t 200ms -- sh checks/health.sh

    # Capture a script's stdout
    proc-harness -o -- cat /etc/hostname

    # Run the "health" block from a supervisor config
    proc-harness -c /etc/harness.json -j health
"#
    );
}

/// Print version.
pub fn print_version() {
    println!("proc-harness {}", env!("CARGO_PKG_VERSION"));
}

/// Argument parsing errors.
#[derive(Debug)]
pub enum ArgsError {
    /// Lexopt parsing error.
    Lexopt(lexopt::Error),
    /// No command line and no --job given.
    MissingCommand,
    /// --job requires --config.
    JobWithoutConfig,
}

impl std::fmt::Display for ArgsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lexopt(e) => write!(f, "{}", e),
            Self::MissingCommand => write!(f, "no command given"),
            Self::JobWithoutConfig => write!(f, "--job requires --config"),
        }
    }
}

impl std::error::Error for ArgsError {}

impl From<lexopt::Error> for ArgsError {
    fn from(e: lexopt::Error) -> Self {
        Self::Lexopt(e)
    }
}
