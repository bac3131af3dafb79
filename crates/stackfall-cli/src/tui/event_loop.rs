use std::time::{Duration, Instant};

use crossterm::event;

use crate::tui::event::TuiEvent;

/// Handle of a timer registered with the event loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(usize);

#[derive(Debug)]
struct Timer {
    interval: Duration,
    last_fired: Instant,
}

impl Timer {
    fn deadline(&self) -> Instant {
        self.last_fired + self.interval
    }
}

/// Event loop state management.
///
/// Each registered timer fires at its own interval. When several timers are
/// due at once, the one with the earliest deadline fires first. A render is
/// requested after any timer or crossterm event.
#[derive(Debug)]
pub(super) struct EventLoop {
    timers: Vec<Timer>,
    dirty: bool,
}

impl Default for EventLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl EventLoop {
    /// Creates a new `EventLoop` with no timers, rendering on dirty.
    pub(super) fn new() -> Self {
        Self {
            timers: vec![],
            dirty: true, // Initial render is required on startup
        }
    }

    /// Registers a timer that first fires one `interval` from now.
    pub(super) fn add_timer(&mut self, interval: Duration) -> TimerId {
        self.timers.push(Timer {
            interval,
            last_fired: Instant::now(),
        });
        TimerId(self.timers.len() - 1)
    }

    fn due_timer(&self, now: Instant) -> Option<usize> {
        self.timers
            .iter()
            .enumerate()
            .filter(|(_, timer)| timer.deadline() <= now)
            .min_by_key(|(_, timer)| timer.deadline())
            .map(|(index, _)| index)
    }

    /// Returns the next event.
    ///
    /// Blocks until a timer or render time is reached or a crossterm event occurs.
    /// Without timers, only waits for crossterm events.
    pub(super) fn next(&mut self) -> anyhow::Result<TuiEvent> {
        loop {
            let now = Instant::now();
            if let Some(index) = self.due_timer(now) {
                self.timers[index].last_fired = now;
                self.dirty = true;
                return Ok(TuiEvent::Timer(TimerId(index)));
            }

            if self.dirty {
                self.dirty = false;
                return Ok(TuiEvent::Render);
            }

            if let Some(timeout) = self.compute_timeout(now)
                && !event::poll(timeout)?
            {
                continue;
            }

            self.dirty = true;
            return Ok(event::read()?.into());
        }
    }

    fn compute_timeout(&self, now: Instant) -> Option<Duration> {
        let next_timer_at = self.timers.iter().map(Timer::deadline).min()?;
        Some(next_timer_at.saturating_duration_since(now))
    }
}
