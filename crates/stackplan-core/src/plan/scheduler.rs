//! Save scheduling state for the plan store.
//!
//! Tracks the debounce timer and the single in-flight write. The scheduler
//! owns no tasks itself; the store spawns the timer and consults this state
//! before and after each write.

use tokio_util::sync::CancellationToken;

/// Coarse save sub-state, derived from the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SavePhase {
    Idle,
    /// A debounced write is armed and has not fired yet.
    Pending,
    /// A write is in flight.
    Saving,
}

#[derive(Debug)]
struct Timer {
    ticket: u64,
    token: CancellationToken,
}

/// Timer handle plus in-flight bookkeeping.
///
/// At most one timer is armed at a time; re-arming cancels the previous
/// one. At most one write is in flight; a write requested meanwhile sets
/// a single follow-up flag instead of running concurrently.
#[derive(Debug, Default)]
pub struct SaveScheduler {
    timer: Option<Timer>,
    next_ticket: u64,
    in_flight: bool,
    follow_up: bool,
}

impl SaveScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a fresh debounce timer, cancelling any previous one.
    ///
    /// The returned token is a child of `parent`, so cancelling the parent
    /// stops every timer. The ticket identifies this timer in [`Self::fire`].
    pub fn arm(&mut self, parent: &CancellationToken) -> (u64, CancellationToken) {
        self.disarm();
        self.next_ticket += 1;
        let token = parent.child_token();
        self.timer = Some(Timer {
            ticket: self.next_ticket,
            token: token.clone(),
        });
        (self.next_ticket, token)
    }

    /// Cancel the armed timer, if any.
    pub fn disarm(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.token.cancel();
        }
    }

    /// Consume the timer identified by `ticket` when it elapses.
    ///
    /// Returns false when that timer was superseded or cancelled meanwhile.
    pub fn fire(&mut self, ticket: u64) -> bool {
        match &self.timer {
            Some(timer) if timer.ticket == ticket => {
                self.timer = None;
                true
            }
            _ => false,
        }
    }

    /// Try to start a write. Supersedes an armed timer.
    ///
    /// Returns false and records a follow-up when a write is already in
    /// flight.
    pub fn begin(&mut self) -> bool {
        self.disarm();
        if self.in_flight {
            self.follow_up = true;
            return false;
        }
        self.in_flight = true;
        true
    }

    /// Mark the in-flight write finished. Returns whether a follow-up write
    /// was requested while it ran.
    pub fn finish(&mut self) -> bool {
        self.in_flight = false;
        std::mem::take(&mut self.follow_up)
    }

    /// Forget everything, cancelling the armed timer. Used on account change.
    pub fn reset(&mut self) {
        self.disarm();
        self.in_flight = false;
        self.follow_up = false;
    }

    pub fn is_pending(&self) -> bool {
        self.timer.is_some()
    }

    pub fn is_saving(&self) -> bool {
        self.in_flight
    }

    pub fn phase(&self) -> SavePhase {
        if self.in_flight {
            SavePhase::Saving
        } else if self.timer.is_some() {
            SavePhase::Pending
        } else {
            SavePhase::Idle
        }
    }
}
