//! proc-harness binary entry point.

use std::collections::HashMap;
use std::process::ExitCode;

use proc_harness::config::Config;
use proc_harness::{cli, logging, Command, Executor, RunOutcome};
use tracing::info;

#[tokio::main]
async fn main() -> ExitCode {
    let args = match cli::parse_args() {
        Ok(args) => args,
        Err(err) => {
            eprintln!("proc-harness: {}", err);
            return ExitCode::from(2);
        }
    };

    if args.help {
        cli::print_help();
        return ExitCode::SUCCESS;
    }
    if args.version {
        cli::print_version();
        return ExitCode::SUCCESS;
    }

    let config = match &args.config {
        Some(path) => match Config::from_file(path) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("proc-harness: {}", err);
                return ExitCode::from(2);
            }
        },
        None => Config::default(),
    };

    logging::init();
    let level = args
        .log_level
        .clone()
        .unwrap_or_else(|| config.logging.level.clone());
    logging::set_level(&level);

    let cmd = match build_command(&args, &config) {
        Ok(cmd) => cmd,
        Err(err) => {
            eprintln!("proc-harness: {}", err);
            return ExitCode::from(2);
        }
    };

    info!("proc-harness v{}", env!("CARGO_PKG_VERSION"));

    let executor = Executor::new();
    let code = run(&executor, &cmd, args.output).await;
    ExitCode::from(code.clamp(0, 255) as u8)
}

fn build_command(args: &cli::Args, config: &Config) -> proc_harness::Result<Command> {
    if let Some(job) = &args.job {
        let block = config.command(job).cloned().ok_or_else(|| {
            proc_harness::ProcHarnessError::InvalidCommand(format!("no command block named {}", job))
        })?;
        return block.into_command();
    }

    let cmd = Command::parse(&args.command_line(), &args.timeout, HashMap::new())?;
    Ok(match &args.name {
        Some(name) => cmd.with_name(name.clone()),
        None => cmd,
    })
}

async fn run(executor: &Executor, cmd: &Command, output: bool) -> i32 {
    if output {
        return match executor.run_and_wait_for_output(cmd).await {
            Ok(out) => {
                print!("{}", out);
                0
            }
            Err(err) => {
                eprintln!("proc-harness: {}", err);
                err.status_code()
            }
        };
    }

    if cmd.timeout().is_unbounded() {
        return match executor.run_and_wait(cmd).await {
            Ok(code) => code,
            Err(err) => {
                eprintln!("proc-harness: {}", err);
                err.status_code()
            }
        };
    }

    match executor.run_with_timeout(cmd).await {
        Ok(mut handle) => match handle.wait().await {
            RunOutcome::Exited(code) => code,
            RunOutcome::TimedOut => 124,
            RunOutcome::Killed => 137,
        },
        Err(err) => {
            eprintln!("proc-harness: {}", err);
            err.status_code()
        }
    }
}
