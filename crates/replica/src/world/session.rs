use std::time::Instant;

use crate::config::ReplicationConfig;

/// Monotonic wall clock in seconds.
pub trait Clock {
    fn now(&self) -> f64;
}

#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    start: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ManualClock {
    now: f64,
}

impl ManualClock {
    pub fn new(now: f64) -> Self {
        Self { now }
    }

    pub fn set(&mut self, now: f64) {
        self.now = self.now.max(now);
    }

    pub fn advance(&mut self, delta: f64) {
        self.now += delta.max(0.0);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        self.now
    }
}

/// Per-peer context handed to every world call.
#[derive(Debug, Clone)]
pub struct Session<C> {
    clock: C,
    config: ReplicationConfig,
}

impl<C: Clock> Session<C> {
    pub fn new(clock: C, config: ReplicationConfig) -> Self {
        Self { clock, config }
    }

    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    /// Current time as a snapshot stamp in milliseconds.
    pub fn stamp_ms(&self) -> u64 {
        (self.clock.now() * 1000.0).max(0.0) as u64
    }

    pub fn config(&self) -> &ReplicationConfig {
        &self.config
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_never_goes_back() {
        let mut clock = ManualClock::new(2.0);
        clock.set(1.0);
        assert_eq!(clock.now(), 2.0);
        clock.advance(-1.0);
        assert_eq!(clock.now(), 2.0);
        clock.advance(0.5);
        assert_eq!(clock.now(), 2.5);
    }

    #[test]
    fn stamp_in_milliseconds() {
        let session = Session::new(ManualClock::new(1.25), ReplicationConfig::default());
        assert_eq!(session.stamp_ms(), 1250);
        assert_eq!(session.config().send_rate, 16);
    }

    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}
