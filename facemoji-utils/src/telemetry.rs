//! Scoped timing logs for optional performance tracing.
//!
//! A [`TimingGuard`] records when a scope starts and logs the elapsed time on drop. Guards
//! only log when telemetry was switched on via [`configure`] and the logger accepts the
//! requested level for the `facemoji::telemetry` target.

use std::{
    borrow::Cow,
    sync::atomic::{AtomicBool, AtomicU8, Ordering},
    time::{Duration, Instant},
};

use log::{Level, LevelFilter, log, log_enabled};

const TARGET: &str = "facemoji::telemetry";

static TELEMETRY_ENABLED: AtomicBool = AtomicBool::new(false);
static TELEMETRY_LEVEL: AtomicU8 = AtomicU8::new(0);

/// RAII helper that logs how long an operation took when dropped.
pub struct TimingGuard {
    label: Cow<'static, str>,
    level: Level,
    start: Instant,
    active: bool,
}

impl TimingGuard {
    /// Returns `true` when the guard will emit a log entry on drop.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Returns the elapsed duration since the guard was created.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Consume the guard and return the elapsed duration without logging.
    pub fn finish(mut self) -> Duration {
        self.active = false;
        self.start.elapsed()
    }
}

impl Drop for TimingGuard {
    fn drop(&mut self) {
        if self.active {
            log!(
                target: TARGET,
                self.level,
                "{} completed in {:.2?}",
                self.label,
                self.start.elapsed()
            );
        }
    }
}

/// Create a timing guard for `label` that logs at `level` when telemetry allows it.
pub fn timing_guard(label: impl Into<Cow<'static, str>>, level: Level) -> TimingGuard {
    let active = telemetry_allows(level) && log_enabled!(target: TARGET, level);
    TimingGuard {
        label: label.into(),
        level,
        start: Instant::now(),
        active,
    }
}

/// Configure the global telemetry state.
pub fn configure(enabled: bool, level: LevelFilter) {
    TELEMETRY_ENABLED.store(enabled, Ordering::Relaxed);
    TELEMETRY_LEVEL.store(level as u8, Ordering::Relaxed);
}

/// Returns whether telemetry logging is currently enabled.
pub fn telemetry_enabled() -> bool {
    TELEMETRY_ENABLED.load(Ordering::Relaxed)
}

/// Returns `true` when telemetry is enabled and `level` is within the configured threshold.
pub fn telemetry_allows(level: Level) -> bool {
    telemetry_enabled() && (level as u8) <= TELEMETRY_LEVEL.load(Ordering::Relaxed)
}
