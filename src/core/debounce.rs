//! Single-slot debounce timer

use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant};

/// State of the debounce slot
#[derive(Debug)]
enum DebounceState {
    Idle,
    Armed {
        ticket: u64,
        armed_at: Instant,
        delay: Duration,
        timer: JoinHandle<()>,
    },
}

/// A timer with exactly one slot. Arming replaces whatever was pending, so a
/// burst of `arm` calls produces at most one fire, for the last arm.
///
/// The fire callback only receives the ticket of the arm that produced it.
/// The owner must confirm the fire with [`take_if_due`](Self::take_if_due)
/// before acting, which rejects fires from superseded or cancelled arms.
#[derive(Debug)]
pub struct DebounceScheduler {
    state: DebounceState,
    last_ticket: u64,
}

impl DebounceScheduler {
    pub fn new() -> Self {
        Self {
            state: DebounceState::Idle,
            last_ticket: 0,
        }
    }

    /// Cancel any pending timer and start a new one that calls `on_fire`
    /// with the returned ticket once `delay` has elapsed.
    ///
    /// Must be called from within a tokio runtime.
    pub fn arm<F>(&mut self, delay: Duration, on_fire: F) -> u64
    where
        F: FnOnce(u64) + Send + 'static,
    {
        self.cancel();

        self.last_ticket += 1;
        let ticket = self.last_ticket;
        let armed_at = Instant::now();
        let timer = tokio::spawn(async move {
            tokio::time::sleep_until(armed_at + delay).await;
            on_fire(ticket);
        });

        self.state = DebounceState::Armed {
            ticket,
            armed_at,
            delay,
            timer,
        };
        ticket
    }

    /// Drop the pending timer, if any. Returns whether something was pending.
    pub fn cancel(&mut self) -> bool {
        match std::mem::replace(&mut self.state, DebounceState::Idle) {
            DebounceState::Armed { timer, .. } => {
                timer.abort();
                true
            }
            DebounceState::Idle => false,
        }
    }

    /// Confirm a fire. True only for the currently armed ticket once its full
    /// delay has elapsed; the scheduler then returns to idle.
    pub fn take_if_due(&mut self, ticket: u64) -> bool {
        let due = match &self.state {
            DebounceState::Armed {
                ticket: armed,
                armed_at,
                delay,
                ..
            } => *armed == ticket && armed_at.elapsed() >= *delay,
            DebounceState::Idle => false,
        };

        if due {
            self.state = DebounceState::Idle;
        }
        due
    }

    pub fn is_armed(&self) -> bool {
        matches!(self.state, DebounceState::Armed { .. })
    }

    /// When the pending timer was armed
    pub fn armed_at(&self) -> Option<Instant> {
        match &self.state {
            DebounceState::Armed { armed_at, .. } => Some(*armed_at),
            DebounceState::Idle => None,
        }
    }
}

impl Default for DebounceScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for DebounceScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}
