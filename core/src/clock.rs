use chrono::{DateTime, TimeDelta, Utc};
use core::fmt::Debug;
use core::time::Duration;
use web_time::Instant;

/// Time source driven by the engine: started on the first reveal and stopped when the game ends.
pub trait Clock: Debug {
    fn start(&mut self);
    fn stop(&mut self);
    fn elapsed(&self) -> Duration;

    /// Wall-clock time used to stamp completed games.
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Monotonic stopwatch backed by the system clock.
#[derive(Clone, Debug, Default)]
pub struct Stopwatch {
    started_at: Option<Instant>,
    stopped_at: Option<Instant>,
}

impl Clock for Stopwatch {
    fn start(&mut self) {
        if self.started_at.is_none() {
            self.started_at = Some(Instant::now());
        }
    }

    fn stop(&mut self) {
        if self.started_at.is_some() && self.stopped_at.is_none() {
            self.stopped_at = Some(Instant::now());
        }
    }

    fn elapsed(&self) -> Duration {
        match (self.started_at, self.stopped_at) {
            (Some(started_at), Some(stopped_at)) => stopped_at - started_at,
            (Some(started_at), None) => started_at.elapsed(),
            (None, _) => Duration::ZERO,
        }
    }
}

/// Clock advanced by hand, for tests and replays.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    elapsed: Duration,
    running: bool,
    now: DateTime<Utc>,
}

impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            elapsed: Duration::ZERO,
            running: false,
            now,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Moves wall time forward; elapsed time only accrues while running.
    pub fn advance(&mut self, by: Duration) {
        if self.running {
            self.elapsed += by;
        }
        if let Some(now) = TimeDelta::from_std(by)
            .ok()
            .and_then(|delta| self.now.checked_add_signed(delta))
        {
            self.now = now;
        }
    }
}

impl Clock for ManualClock {
    fn start(&mut self) {
        self.running = true;
    }

    fn stop(&mut self) {
        self.running = false;
    }

    fn elapsed(&self) -> Duration {
        self.elapsed
    }

    fn now(&self) -> DateTime<Utc> {
        self.now
    }
}
