//! PID environment registry.
//!
//! Every launched command publishes its child PID under a derived key so
//! sibling commands in the same process tree can reference it (a health
//! check signaling the main process, for example). The write is modeled as
//! an injectable capability so the engine can be exercised without touching
//! the real process environment.

use std::collections::HashMap;
use std::sync::Mutex;

/// Namespace prefix for all exported keys.
pub const PID_ENV_PREFIX: &str = "PROCHARNESS";

/// Destination for PID exports.
pub trait EnvRegistry: Send + Sync {
    /// Record `key = value`. A later export under the same key overwrites.
    fn export(&self, key: &str, value: &str);
}

/// Production registry writing the real process environment.
#[derive(Debug, Default)]
pub struct ProcessEnv;

impl EnvRegistry for ProcessEnv {
    fn export(&self, key: &str, value: &str) {
        std::env::set_var(key, value);
    }
}

/// In-memory registry for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryEnv {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryEnv {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a previously exported value.
    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).get(key).cloned()
    }

    /// Number of exported entries.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Whether nothing has been exported yet.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).is_empty()
    }
}

impl EnvRegistry for MemoryEnv {
    fn export(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), value.to_string());
    }
}

/// Derive the environment key for a command name.
///
/// The name is uppercased and every non-alphanumeric byte becomes `_`, so
/// `"app-1"` maps to `PROCHARNESS_APP_1_PID`.
pub fn pid_env_key(name: &str) -> String {
    let mut key = String::with_capacity(PID_ENV_PREFIX.len() + name.len() + 5);
    key.push_str(PID_ENV_PREFIX);
    key.push('_');
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            key.push(c.to_ascii_uppercase());
        } else {
            key.push('_');
        }
    }
    key.push_str("_PID");
    key
}
