//! Command execution engine.

use std::process::Stdio;
use std::sync::Arc;

use tokio::process::{Child, Command as TokioCommand};
use tokio::sync::{watch, Notify};
use tracing::{debug, info, warn};

use super::command::Command;
use super::env::{pid_env_key, EnvRegistry, ProcessEnv};
use crate::duration::Timeout;
use crate::error::{ProcHarnessError, Result};

#[cfg(unix)]
use std::os::unix::process::ExitStatusExt;

/// Runs command descriptors as child processes.
///
/// The engine itself is stateless; all per-run state lives in the fresh
/// [`RunHandle`] each timeout-bounded run returns. The PID of every launched
/// child is published through the injected [`EnvRegistry`] under the key
/// derived from the descriptor name.
pub struct Executor {
    env: Arc<dyn EnvRegistry>,
}

impl Executor {
    /// Create an executor exporting PIDs to the real process environment.
    pub fn new() -> Self {
        Self::with_env(Arc::new(ProcessEnv))
    }

    /// Create an executor with a custom PID registry.
    pub fn with_env(env: Arc<dyn EnvRegistry>) -> Self {
        Self { env }
    }

    /// Spawn the child in its own process group and export its PID.
    fn spawn(&self, cmd: &Command, stdout: Stdio) -> Result<Child> {
        let mut builder = TokioCommand::new(cmd.executable());
        builder
            .args(cmd.args())
            .stdin(Stdio::null())
            .stdout(stdout)
            .stderr(Stdio::inherit());
        #[cfg(unix)]
        builder.process_group(0);

        let child = builder.spawn().map_err(ProcHarnessError::Launch)?;
        if let Some(pid) = child.id() {
            self.env.export(&pid_env_key(cmd.name()), &pid.to_string());
            debug!(
                command = %cmd.name(),
                pid,
                context = %cmd.log_context(),
                "process started"
            );
        }
        Ok(child)
    }

    /// Run the command and block until it exits.
    ///
    /// Returns the child's real exit code on normal exit, or `128 + signal`
    /// if it was terminated by a signal. A failure to launch is an error;
    /// [`ProcHarnessError::status_code`] maps it to the conventional 127.
    /// No timeout is enforced in this mode.
    pub async fn run_and_wait(&self, cmd: &Command) -> Result<i32> {
        info!(command = %cmd.name(), context = %cmd.log_context(), "run");
        let mut child = self.spawn(cmd, Stdio::inherit())?;
        let status = child.wait().await.map_err(ProcHarnessError::Launch)?;
        let code = exit_code(status);
        debug!(command = %cmd.name(), code, "process exited");
        Ok(code)
    }

    /// Run the command and return everything it wrote to stdout.
    ///
    /// Only a failure to launch is an error here, with the OS detail
    /// preserved. A non-zero exit still returns the captured output; this
    /// mode exists for scripted inspection, so the caller decides what a
    /// non-zero exit means. Use [`Executor::run_and_wait`] to branch on
    /// exit codes.
    pub async fn run_and_wait_for_output(&self, cmd: &Command) -> Result<String> {
        info!(command = %cmd.name(), context = %cmd.log_context(), "run for output");
        let child = self.spawn(cmd, Stdio::piped())?;
        let output = child
            .wait_with_output()
            .await
            .map_err(ProcHarnessError::Launch)?;
        if !output.status.success() {
            debug!(
                command = %cmd.name(),
                code = ?output.status.code(),
                "process exited non-zero"
            );
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Run the command under its descriptor's timeout.
    ///
    /// Returns as soon as the launch outcome is known; completion is
    /// monitored by a background task. With an unbounded timeout this is
    /// fire-and-monitor: only the launch error surfaces here, everything
    /// after goes to logs and the returned handle. With a bounded timeout
    /// the monitor races the child against the deadline and kills the whole
    /// process group if the deadline wins, logging a timeout notification.
    ///
    /// A single `select!` owns the child, the timer, and the kill trigger,
    /// so exactly one terminal action happens per run: the losing branches
    /// are dropped, never acted on.
    pub async fn run_with_timeout(&self, cmd: &Command) -> Result<RunHandle> {
        let mut child = self.spawn(cmd, Stdio::inherit())?;
        let pid = child.id();

        let (outcome_tx, outcome_rx) = watch::channel(None);
        let kill = Arc::new(Notify::new());
        let handle = RunHandle {
            pid,
            kill: kill.clone(),
            outcome: outcome_rx,
        };

        let name = cmd.name().to_string();
        let context = cmd.log_context();
        let timeout = cmd.timeout();

        tokio::spawn(async move {
            let outcome = match timeout {
                Timeout::Bounded(limit) => {
                    tokio::select! {
                        status = child.wait() => natural_exit(&name, &context, status),
                        _ = tokio::time::sleep(limit) => {
                            terminate_group(&mut child, pid);
                            let _ = child.wait().await;
                            warn!(
                                command = %name,
                                context = %context,
                                "timeout after {:?}", limit
                            );
                            RunOutcome::TimedOut
                        }
                        _ = kill.notified() => {
                            terminate_group(&mut child, pid);
                            let _ = child.wait().await;
                            info!(command = %name, context = %context, "killed");
                            RunOutcome::Killed
                        }
                    }
                }
                Timeout::Unbounded => {
                    tokio::select! {
                        status = child.wait() => natural_exit(&name, &context, status),
                        _ = kill.notified() => {
                            terminate_group(&mut child, pid);
                            let _ = child.wait().await;
                            info!(command = %name, context = %context, "killed");
                            RunOutcome::Killed
                        }
                    }
                }
            };
            let _ = outcome_tx.send(Some(outcome));
        });

        Ok(handle)
    }
}

impl Default for Executor {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of a monitored run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The child exited on its own with this status.
    Exited(i32),
    /// The deadline fired first; the process group was killed.
    TimedOut,
    /// [`RunHandle::kill`] fired first; the process group was killed.
    Killed,
}

impl RunOutcome {
    /// Whether the child exited on its own with status 0.
    pub fn success(&self) -> bool {
        matches!(self, RunOutcome::Exited(0))
    }
}

/// Handle to one monitored run.
///
/// Each call to [`Executor::run_with_timeout`] yields a fresh handle; the
/// descriptor holds no process state, so re-running a descriptor can never
/// signal the wrong child.
#[derive(Debug, Clone)]
pub struct RunHandle {
    pid: Option<u32>,
    kill: Arc<Notify>,
    outcome: watch::Receiver<Option<RunOutcome>>,
}

impl RunHandle {
    /// OS process id of the child, if it has not already been reaped.
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Forcefully terminate the run's process group.
    ///
    /// Cancels the deadline timer; no timeout notification is logged. Safe
    /// to call at any point: once the run has finished this is a no-op.
    pub fn kill(&self) {
        self.kill.notify_one();
    }

    /// Outcome of the run, if it has finished.
    pub fn outcome(&self) -> Option<RunOutcome> {
        *self.outcome.borrow()
    }

    /// Wait for the run to finish and return its outcome.
    pub async fn wait(&mut self) -> RunOutcome {
        // The monitor publishes an outcome in every branch before exiting,
        // so a closed channel still carries the final value.
        let _ = self.outcome.wait_for(|o| o.is_some()).await;
        let outcome = *self.outcome.borrow();
        outcome.unwrap_or(RunOutcome::Killed)
    }
}

/// Map an exit status to a single code: the real code for a normal exit,
/// `128 + signal` for signal termination.
fn exit_code(status: std::process::ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    if let Some(sig) = status.signal() {
        return 128 + sig;
    }
    1
}

fn natural_exit(
    name: &str,
    context: &str,
    status: std::io::Result<std::process::ExitStatus>,
) -> RunOutcome {
    match status {
        Ok(status) => {
            let code = exit_code(status);
            if code == 0 {
                debug!(command = %name, context = %context, "process exited");
            } else {
                info!(command = %name, context = %context, code, "process exited non-zero");
            }
            RunOutcome::Exited(code)
        }
        Err(err) => {
            warn!(command = %name, context = %context, error = %err, "wait failed");
            RunOutcome::Exited(1)
        }
    }
}

/// Signal the child's whole process group, not the bare PID. The group id
/// is the child's own PID because every child is spawned with
/// `process_group(0)`; a group that already exited yields ESRCH, which is
/// not an error here.
#[cfg(unix)]
fn terminate_group(_child: &mut Child, pid: Option<u32>) {
    use nix::errno::Errno;
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    if let Some(pid) = pid {
        match killpg(Pid::from_raw(pid as i32), Signal::SIGKILL) {
            Ok(()) | Err(Errno::ESRCH) => {}
            Err(err) => warn!(pid, error = %err, "killpg failed"),
        }
    }
}

#[cfg(not(unix))]
fn terminate_group(child: &mut Child, _pid: Option<u32>) {
    let _ = child.start_kill();
}
