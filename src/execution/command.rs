//! Command descriptors.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::duration::{parse_timeout, Timeout};
use crate::error::{ProcHarnessError, Result};

/// Global counter for generated command names.
static COUNTER: AtomicU64 = AtomicU64::new(1);

fn generated_name() -> String {
    format!("cmd-{:08x}", COUNTER.fetch_add(1, Ordering::Relaxed))
}

/// Immutable launch specification for an external command.
///
/// A descriptor is built once from a command line and may be run any number
/// of times; each run spawns a fresh child process. The descriptor itself
/// holds no process state.
#[derive(Debug, Clone)]
pub struct Command {
    name: String,
    executable: String,
    args: Vec<String>,
    timeout: Timeout,
    log_fields: HashMap<String, String>,
}

impl Command {
    /// Build a descriptor from a whitespace-split command line and a timeout
    /// string.
    ///
    /// The first token is the executable, the rest are positional arguments.
    /// Whether the executable actually exists is not checked here; that
    /// surfaces when the command is run. `log_fields` are opaque key/value
    /// pairs attached to every log line the engine emits for this command.
    pub fn parse(
        command_line: &str,
        timeout_text: &str,
        log_fields: HashMap<String, String>,
    ) -> Result<Self> {
        let mut tokens = command_line.split_whitespace();
        let executable = tokens
            .next()
            .ok_or_else(|| ProcHarnessError::InvalidCommand("empty command line".to_string()))?
            .to_string();
        let args = tokens.map(str::to_string).collect();
        let timeout = parse_timeout(timeout_text)?;

        Ok(Self {
            name: generated_name(),
            executable,
            args,
            timeout,
            log_fields,
        })
    }

    /// Override the generated name.
    ///
    /// The name feeds logging and the derived PID environment key.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Command name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Executable token.
    pub fn executable(&self) -> &str {
        &self.executable
    }

    /// Positional arguments.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Resolved timeout.
    pub fn timeout(&self) -> Timeout {
        self.timeout
    }

    /// Opaque logging context.
    pub fn log_fields(&self) -> &HashMap<String, String> {
        &self.log_fields
    }

    /// Log context rendered as `k=v` pairs, sorted for stable output.
    pub(crate) fn log_context(&self) -> String {
        let mut pairs: Vec<_> = self
            .log_fields
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        pairs.sort();
        pairs.join(" ")
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn fields(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_parse_splits_on_whitespace() {
        let cmd = Command::parse("sh script.sh doStuff --debug", "0", HashMap::new()).unwrap();
        assert_eq!(cmd.executable(), "sh");
        assert_eq!(cmd.args(), ["script.sh", "doStuff", "--debug"]);
    }

    #[test]
    fn test_parse_empty_fails() {
        let err = Command::parse("", "0", HashMap::new()).unwrap_err();
        assert!(matches!(err, ProcHarnessError::InvalidCommand(_)));
    }

    #[test]
    fn test_parse_whitespace_only_fails() {
        assert!(Command::parse("   \t ", "0", HashMap::new()).is_err());
    }

    #[test]
    fn test_bad_timeout_propagates() {
        let err = Command::parse("true", "x", HashMap::new()).unwrap_err();
        assert!(matches!(err, ProcHarnessError::DurationParse(_)));
    }

    #[test]
    fn test_timeout_resolution() {
        let cmd = Command::parse("true", "200ms", HashMap::new()).unwrap();
        assert_eq!(cmd.timeout().duration(), Some(Duration::from_millis(200)));

        let cmd = Command::parse("true", "", HashMap::new()).unwrap();
        assert!(cmd.timeout().is_unbounded());
    }

    #[test]
    fn test_generated_names_are_unique() {
        let a = Command::parse("true", "0", HashMap::new()).unwrap();
        let b = Command::parse("true", "0", HashMap::new()).unwrap();
        assert_ne!(a.name(), b.name());
        assert!(a.name().starts_with("cmd-"));
    }

    #[test]
    fn test_with_name() {
        let cmd = Command::parse("true", "0", HashMap::new())
            .unwrap()
            .with_name("app");
        assert_eq!(cmd.name(), "app");
        assert_eq!(cmd.to_string(), "app");
    }

    #[test]
    fn test_log_context_is_sorted() {
        let cmd = Command::parse("true", "0", fields(&[("b", "2"), ("a", "1")])).unwrap();
        assert_eq!(cmd.log_context(), "a=1 b=2");
    }
}
