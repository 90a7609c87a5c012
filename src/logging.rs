//! Logging initialization and configuration.
//!
//! Built on `tracing`. The active filter is wrapped in a reload layer so a
//! supervisor can raise the level to `debug` at runtime for diagnostic
//! capture and drop it back afterwards, without reinitializing.

use std::sync::OnceLock;

use tracing_subscriber::{
    layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter, Registry,
};

type FilterHandle = reload::Handle<EnvFilter, Registry>;

/// Handle to the active filter, set on first successful init.
static RELOAD_HANDLE: OnceLock<FilterHandle> = OnceLock::new();

fn default_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("proc_harness=info"))
}

/// Initialize the logging system.
///
/// Uses the `RUST_LOG` environment variable for filtering. If not set,
/// defaults to `proc_harness=info`.
///
/// # Panics
///
/// Panics if called more than once, or if another tracing subscriber
/// has already been set.
pub fn init() {
    let (filter, handle) = reload::Layer::new(default_filter());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().compact())
        .init();

    let _ = RELOAD_HANDLE.set(handle);
}

/// Try to initialize the logging system.
///
/// Returns `Ok(())` if successful, or `Err` if logging has already been
/// initialized.
pub fn try_init() -> Result<(), tracing_subscriber::util::TryInitError> {
    let (filter, handle) = reload::Layer::new(default_filter());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().compact())
        .try_init()?;

    let _ = RELOAD_HANDLE.set(handle);
    Ok(())
}

/// Swap the active filter for a new directive string.
///
/// Returns `false` if logging was never initialized through this module or
/// the directive could not be applied.
pub fn set_level(directive: &str) -> bool {
    match RELOAD_HANDLE.get() {
        Some(handle) => handle.reload(EnvFilter::new(directive)).is_ok(),
        None => false,
    }
}

/// Toggle debug-level capture for this crate at runtime.
pub fn set_debug(enabled: bool) -> bool {
    if enabled {
        set_level("proc_harness=debug")
    } else {
        set_level("proc_harness=info")
    }
}
