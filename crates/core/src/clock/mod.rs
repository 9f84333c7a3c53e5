use std::{
    cell::Cell,
    rc::Rc,
    time::{Duration, Instant},
};

/// Source of local monotonic timestamps used to anchor incoming updates.
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Real clock backed by [`Instant::now`].
#[derive(Debug, Default, Clone, Copy)]
pub struct MonotonicClock;

impl Clock for MonotonicClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to. Clones share the same time, so a host
/// can keep one handle and give another to the engine.
#[derive(Debug, Clone)]
pub struct ManualClock {
    origin: Instant,
    now: Rc<Cell<Instant>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(origin: Instant) -> Self {
        Self {
            origin,
            now: Rc::new(Cell::new(origin)),
        }
    }

    pub fn advance(&self, delta: Duration) {
        self.now.set(self.now.get() + delta);
    }

    /// Moves the clock to `origin + offset`. Offsets behind the current time
    /// are ignored so the clock stays monotonic.
    pub fn set_elapsed(&self, offset: Duration) {
        let target = self.origin + offset;
        if target > self.now.get() {
            self.now.set(target);
        }
    }

    /// Time elapsed since the clock was created.
    pub fn elapsed(&self) -> Duration {
        self.now.get().saturating_duration_since(self.origin)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_time() {
        let clock = ManualClock::new();
        let handle = clock.clone();

        handle.advance(Duration::from_millis(250));

        assert_eq!(clock.now(), handle.now());
        assert_eq!(clock.elapsed(), Duration::from_millis(250));
    }

    #[test]
    fn never_moves_backwards() {
        let clock = ManualClock::new();
        clock.set_elapsed(Duration::from_secs(2));
        clock.set_elapsed(Duration::from_secs(1));

        assert_eq!(clock.elapsed(), Duration::from_secs(2));
    }
}
