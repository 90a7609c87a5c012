//! Command execution engine.
//!
//! This module provides the process-supervision core:
//! - Command descriptors built from whitespace-split command lines
//! - Synchronous run-to-completion and stdout-capturing runs
//! - Timeout-bounded runs with race-safe cancellation and process-group kill
//! - PID export so sibling commands can reference a running child
//!
//! # Example
//!
//! ```no_run
//! use std::collections::HashMap;
//! use proc_harness::{Command, Executor};
//!
//! # async fn run() -> proc_harness::Result<()> {
//! let executor = Executor::new();
//!
//! // Run a lifecycle hook to completion.
//! let cmd = Command::parse("sh hooks/prestart.sh", "0", HashMap::new())?;
//! let code = executor.run_and_wait(&cmd).await?;
//!
//! // Bound a health check to 200ms.
//! let check = Command::parse("sh checks/health.sh", "200ms", HashMap::new())?
//!     .with_name("health");
//! let handle = executor.run_with_timeout(&check).await?;
//! # Ok(())
//! # }
//! ```

mod command;
mod env;
mod executor;

pub use command::Command;
pub use env::{pid_env_key, EnvRegistry, MemoryEnv, ProcessEnv, PID_ENV_PREFIX};
pub use executor::{Executor, RunHandle, RunOutcome};
