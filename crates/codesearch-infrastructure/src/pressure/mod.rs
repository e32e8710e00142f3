//! Memory pressure sampling and per-workspace circuit breaking (spec.md
//! §4.11): protects the host process from runaway indexing by tracking
//! resident memory and tripping a breaker after repeated failures.

use codesearch_domain::constants::{BREAKER_FAILURE_THRESHOLD, BREAKER_INITIAL_COOLDOWN_SECS};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use sysinfo::{Pid, System};

/// Samples this process's resident memory via `sysinfo`.
pub struct MemoryPressure {
    system: Mutex<System>,
    pid: Pid,
}

impl MemoryPressure {
    /// Build a sampler bound to the current process.
    #[must_use]
    pub fn new() -> Self {
        let mut system = System::new();
        let pid = Pid::from_u32(std::process::id());
        system.refresh_processes(sysinfo::ProcessesToUpdate::Some(&[pid]), true);
        Self { system: Mutex::new(system), pid }
    }

    /// Resident set size in bytes, refreshed on every call.
    #[must_use]
    pub fn resident_bytes(&self) -> u64 {
        let mut system = self.system.lock();
        system.refresh_processes(sysinfo::ProcessesToUpdate::Some(&[self.pid]), true);
        system.process(self.pid).map(sysinfo::Process::memory).unwrap_or(0)
    }

    /// Whether resident memory has crossed `limit_bytes`.
    #[must_use]
    pub fn is_over(&self, limit_bytes: u64) -> bool {
        self.resident_bytes() >= limit_bytes
    }
}

impl Default for MemoryPressure {
    fn default() -> Self {
        Self::new()
    }
}

/// Breaker state for one protected workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BreakerState {
    Closed,
    Open,
    HalfOpen,
}

struct BreakerEntry {
    state: BreakerState,
    consecutive_failures: u32,
    opened_at: Option<Instant>,
    cooldown: Duration,
}

impl Default for BreakerEntry {
    fn default() -> Self {
        Self {
            state: BreakerState::Closed,
            consecutive_failures: 0,
            opened_at: None,
            cooldown: Duration::from_secs(BREAKER_INITIAL_COOLDOWN_SECS),
        }
    }
}

/// Per-workspace circuit breaker: opens after
/// [`BREAKER_FAILURE_THRESHOLD`] consecutive failures, cools down with
/// exponential backoff, and allows a single half-open probe per cooldown.
pub struct CircuitBreaker {
    entries: Mutex<HashMap<String, BreakerEntry>>,
}

impl CircuitBreaker {
    /// Build an empty breaker registry.
    #[must_use]
    pub fn new() -> Self {
        Self { entries: Mutex::new(HashMap::new()) }
    }

    /// Whether `workspace` may currently attempt an operation. Transitions
    /// `Open` to `HalfOpen` once the cooldown has elapsed.
    #[must_use]
    pub fn allow(&self, workspace: &str) -> bool {
        let mut entries = self.entries.lock();
        let entry = entries.entry(workspace.to_owned()).or_default();
        match entry.state {
            BreakerState::Closed => true,
            BreakerState::HalfOpen => true,
            BreakerState::Open => {
                let elapsed = entry.opened_at.map(|t| t.elapsed()).unwrap_or_default();
                if elapsed >= entry.cooldown {
                    entry.state = BreakerState::HalfOpen;
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Seconds remaining before a half-open probe is allowed, if open.
    #[must_use]
    pub fn retry_after_secs(&self, workspace: &str) -> u64 {
        let entries = self.entries.lock();
        entries
            .get(workspace)
            .filter(|e| e.state == BreakerState::Open)
            .map(|e| {
                let elapsed = e.opened_at.map(|t| t.elapsed()).unwrap_or_default();
                e.cooldown.saturating_sub(elapsed).as_secs()
            })
            .unwrap_or(0)
    }

    /// Record a success, closing the breaker and resetting its cooldown.
    pub fn record_success(&self, workspace: &str) {
        let mut entries = self.entries.lock();
        let entry = entries.entry(workspace.to_owned()).or_default();
        entry.state = BreakerState::Closed;
        entry.consecutive_failures = 0;
        entry.opened_at = None;
        entry.cooldown = Duration::from_secs(BREAKER_INITIAL_COOLDOWN_SECS);
    }

    /// Record a failure. Opens the breaker once
    /// [`BREAKER_FAILURE_THRESHOLD`] consecutive failures accumulate,
    /// doubling the cooldown each time a half-open probe also fails.
    pub fn record_failure(&self, workspace: &str) {
        let mut entries = self.entries.lock();
        let entry = entries.entry(workspace.to_owned()).or_default();
        entry.consecutive_failures += 1;

        if entry.state == BreakerState::HalfOpen {
            entry.cooldown *= 2;
            entry.state = BreakerState::Open;
            entry.opened_at = Some(Instant::now());
            return;
        }

        if entry.consecutive_failures >= BREAKER_FAILURE_THRESHOLD {
            entry.state = BreakerState::Open;
            entry.opened_at = Some(Instant::now());
        }
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opens_after_threshold_failures() {
        let breaker = CircuitBreaker::new();
        for _ in 0..BREAKER_FAILURE_THRESHOLD {
            breaker.record_failure("ws");
        }
        assert!(!breaker.allow("ws"));
    }

    #[test]
    fn success_resets_failure_count() {
        let breaker = CircuitBreaker::new();
        breaker.record_failure("ws");
        breaker.record_success("ws");
        breaker.record_failure("ws");
        assert!(breaker.allow("ws"));
    }

    #[test]
    fn closed_breaker_always_allows() {
        let breaker = CircuitBreaker::new();
        assert!(breaker.allow("fresh-workspace"));
    }
}
