#![forbid(unsafe_code)]

//! Single-slot cancellable deadline.
//!
//! A [`TimerSlot`] stands in for a host scheduler's `setTimeout` handle: it
//! holds at most one pending payload together with the instant it becomes
//! due. Scheduling replaces (cancels) whatever was pending. Nothing sleeps;
//! the host asks for [`deadline`](TimerSlot::deadline), wakes up at that
//! instant, and calls [`poll`](TimerSlot::poll).
//!
//! Timer ids increase monotonically per slot, so a host that keeps its own
//! wake-up handle can tell a stale wake-up from the current one.

use std::time::{Duration, Instant};

/// Identifier of one scheduled deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

impl TimerId {
    /// Raw sequence number.
    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone)]
struct Armed<T> {
    id: TimerId,
    deadline: Instant,
    payload: T,
}

/// At most one pending deadline carrying a payload.
#[derive(Debug, Clone)]
pub struct TimerSlot<T> {
    next_id: u64,
    armed: Option<Armed<T>>,
}

impl<T> Default for TimerSlot<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            armed: None,
        }
    }
}

impl<T> TimerSlot<T> {
    /// Create an empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the slot to fire `payload` at `now + delay`.
    ///
    /// Any previously armed payload is dropped without firing.
    pub fn schedule(&mut self, now: Instant, delay: Duration, payload: T) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        self.armed = Some(Armed {
            id,
            deadline: now + delay,
            payload,
        });
        id
    }

    /// Disarm the slot, returning the payload that will no longer fire.
    pub fn cancel(&mut self) -> Option<T> {
        self.armed.take().map(|a| a.payload)
    }

    /// Disarm the slot only if the pending payload satisfies `pred`.
    pub fn cancel_if(&mut self, pred: impl FnOnce(&T) -> bool) -> Option<T> {
        if self.armed.as_ref().is_some_and(|a| pred(&a.payload)) {
            self.cancel()
        } else {
            None
        }
    }

    /// Take the payload if its deadline has been reached.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        if self.armed.as_ref().is_some_and(|a| now >= a.deadline) {
            self.cancel()
        } else {
            None
        }
    }

    /// When the armed payload becomes due.
    #[inline]
    pub fn deadline(&self) -> Option<Instant> {
        self.armed.as_ref().map(|a| a.deadline)
    }

    /// Id of the armed deadline.
    #[inline]
    pub fn id(&self) -> Option<TimerId> {
        self.armed.as_ref().map(|a| a.id)
    }

    /// The armed payload, if any.
    #[inline]
    pub fn payload(&self) -> Option<&T> {
        self.armed.as_ref().map(|a| &a.payload)
    }

    /// Whether a payload is pending.
    #[inline]
    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }
}
