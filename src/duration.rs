//! Timeout string resolution.
//!
//! Supervisor configs describe deadlines as human-readable strings such as
//! `"200ms"`, `"1s"`, or `"1h30m"`. An empty string or `"0"` means no
//! deadline is enforced at all, which is different from a short deadline and
//! must never be conflated with a parse failure.

use std::time::Duration;

use crate::error::{ProcHarnessError, Result};

/// Resolved timeout for a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeout {
    /// No deadline is enforced; the command may run arbitrarily long.
    Unbounded,
    /// The command is killed if it outlives this duration.
    Bounded(Duration),
}

impl Timeout {
    /// Whether no deadline is enforced.
    pub fn is_unbounded(&self) -> bool {
        matches!(self, Timeout::Unbounded)
    }

    /// The bounded duration, if any.
    pub fn duration(&self) -> Option<Duration> {
        match self {
            Timeout::Unbounded => None,
            Timeout::Bounded(d) => Some(*d),
        }
    }
}

/// Parse a timeout string into a [`Timeout`].
///
/// Empty input and `"0"` resolve to [`Timeout::Unbounded`] without error.
/// Everything else must be a valid duration expression; a zero duration
/// (e.g. `"0s"`) also normalizes to unbounded.
pub fn parse_timeout(text: &str) -> Result<Timeout> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed == "0" {
        return Ok(Timeout::Unbounded);
    }
    let dur = parse_duration(trimmed)
        .ok_or_else(|| ProcHarnessError::DurationParse(trimmed.to_string()))?;
    if dur.is_zero() {
        Ok(Timeout::Unbounded)
    } else {
        Ok(Timeout::Bounded(dur))
    }
}

/// Parse a duration expression: one or more `<number><unit>` segments,
/// summed. Units are `ns`, `us`/`µs`, `ms`, `s`, `m`, `h`; the number part
/// may carry a decimal point (`"1.5s"`).
fn parse_duration(s: &str) -> Option<Duration> {
    let mut total = Duration::ZERO;
    let mut rest = s;
    while !rest.is_empty() {
        let num_len = rest
            .bytes()
            .take_while(|b| b.is_ascii_digit() || *b == b'.')
            .count();
        if num_len == 0 {
            return None;
        }
        let (num, after) = rest.split_at(num_len);
        let value: f64 = num.parse().ok()?;

        let unit_len = after
            .char_indices()
            .take_while(|(_, c)| !c.is_ascii_digit())
            .map(|(i, c)| i + c.len_utf8())
            .last()
            .unwrap_or(0);
        if unit_len == 0 {
            return None;
        }
        let (unit, next) = after.split_at(unit_len);

        let unit_secs = match unit {
            "ns" => 1e-9,
            "us" | "µs" => 1e-6,
            "ms" => 1e-3,
            "s" => 1.0,
            "m" => 60.0,
            "h" => 3600.0,
            _ => return None,
        };
        total += Duration::try_from_secs_f64(value * unit_secs).ok()?;
        rest = next;
    }
    Some(total)
}
