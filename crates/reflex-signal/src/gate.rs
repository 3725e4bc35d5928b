#![forbid(unsafe_code)]

//! Poll-driven call gates: [`Throttle`] and [`Debounce`].
//!
//! # Design
//!
//! Both gates are pure state machines over caller-supplied [`Instant`]s.
//! Nothing here sleeps, spawns, or schedules: the caller ticks the gate and
//! decides what an open gate means. This keeps behavior deterministic and
//! directly testable with synthetic clocks.
//!
//! [`Throttle`] is leading-edge: the first poll passes, then the gate stays
//! closed for the configured interval. [`Debounce`] is trailing-edge:
//! activity is recorded with [`signal`](Debounce::signal), and
//! [`fire`](Debounce::fire) reports readiness once the activity has been
//! quiet for the configured duration.
//!
//! # Invariants
//!
//! 1. `Throttle` never accepts two polls less than `min_interval` apart.
//! 2. `Debounce::fire` returns true at most once per burst of signals.
//! 3. `Instant`s passed to a gate must be monotonically non-decreasing;
//!    earlier instants read as zero elapsed time.

use std::time::Duration;

use web_time::Instant;

/// Leading-edge rate gate: passes a call, then closes for a minimum
/// interval.
#[derive(Debug, Clone)]
pub struct Throttle {
    min_interval: Duration,
    last_accept: Option<Instant>,
}

impl Throttle {
    /// Gate that accepts at most one poll per `min_interval`.
    ///
    /// A zero interval is always open.
    #[must_use]
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_accept: None,
        }
    }

    /// Whether the gate is open at `now`.
    ///
    /// The first poll ever is accepted; an accepted poll closes the gate
    /// for `min_interval`.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.last_accept {
            Some(last) if now.saturating_duration_since(last) < self.min_interval => false,
            _ => {
                self.last_accept = Some(now);
                true
            }
        }
    }

    /// The configured minimum interval between accepted polls.
    #[must_use]
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }
}

/// Trailing-edge quiet-period gate.
///
/// Call [`signal`](Debounce::signal) on every activity burst member; call
/// [`fire`](Debounce::fire) on a tick to ask whether the burst has settled.
#[derive(Debug, Clone)]
pub struct Debounce {
    quiet: Duration,
    last_signal: Option<Instant>,
}

impl Debounce {
    /// Gate that fires once activity has been quiet for `quiet`.
    #[must_use]
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            last_signal: None,
        }
    }

    /// Record activity at `now`, restarting the quiet period.
    pub fn signal(&mut self, now: Instant) {
        self.last_signal = Some(now);
    }

    /// Whether the pending burst has settled by `now`.
    ///
    /// Returns true iff a signal is pending and at least the quiet period
    /// has elapsed since the most recent one; firing clears the pending
    /// signal, so a burst fires at most once.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.last_signal {
            Some(last) if now.saturating_duration_since(last) >= self.quiet => {
                self.last_signal = None;
                true
            }
            _ => false,
        }
    }

    /// Whether a signal is recorded and not yet fired.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.last_signal.is_some()
    }

    /// The configured quiet period.
    #[must_use]
    pub fn quiet(&self) -> Duration {
        self.quiet
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
