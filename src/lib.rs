//! # proc-harness
//!
//! Process supervision primitive for container lifecycle managers.
//!
//! This crate launches external commands (health checks, lifecycle hooks,
//! the main containerized process), optionally bounds their execution with
//! a timeout, captures output or exit status, and publishes each child's
//! PID to the environment so sibling commands can reference it.
//!
//! ## Features
//!
//! - **Descriptors**: immutable launch specs built from command-line strings
//! - **Run modes**: wait-for-status, capture-stdout, and timeout-bounded
//! - **Race-safe timeouts**: one coordinator per run, exactly one terminal action
//! - **Process-group kill**: forced termination reaps the child's whole tree
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::collections::HashMap;
//! use proc_harness::{Command, Executor};
//!
//! #[tokio::main]
//! async fn main() -> proc_harness::Result<()> {
//!     // Initialize logging
//!     proc_harness::logging::try_init().ok();
//!
//!     let executor = Executor::new();
//!
//!     // Run a health check with a 200ms deadline.
//!     let check = Command::parse("sh checks/health.sh", "200ms", HashMap::new())?
//!         .with_name("health");
//!     let mut handle = executor.run_with_timeout(&check).await?;
//!
//!     println!("health check finished: {:?}", handle.wait().await);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod duration;
pub mod error;
pub mod execution;
pub mod logging;

// Re-export commonly used types
pub use duration::{parse_timeout, Timeout};
pub use error::{ProcHarnessError, Result};
pub use execution::{
    pid_env_key, Command, EnvRegistry, Executor, MemoryEnv, ProcessEnv, RunHandle, RunOutcome,
    PID_ENV_PREFIX,
};
