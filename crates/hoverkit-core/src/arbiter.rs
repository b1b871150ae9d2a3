#![forbid(unsafe_code)]

//! Activation arbitration for nested hoverable regions.
//!
//! Diagram shapes nest: a statement box sits inside a compound block, which
//! sits inside a function body. Pointer enter/leave events fire for every
//! boundary crossed, so moving within a child produces a stream of
//! enter/leave pairs on its parents. [`ActiveArbiter`] turns that stream into
//! one settled answer to "which region shows its action box?".
//!
//! # Protocol
//!
//! - [`ready_to_activate`](ActiveArbiter::ready_to_activate): activate now.
//! - [`ready_to_delayed_activate`](ActiveArbiter::ready_to_delayed_activate):
//!   activate after the configured delay. Used when the pointer moves from a
//!   nested child back into its parent, so the parent does not flash active
//!   while the child's own leave settles.
//! - [`ready_to_deactivate`](ActiveArbiter::ready_to_deactivate): hide after
//!   the delay, unless something else becomes active first.
//! - [`deregister`](ActiveArbiter::deregister): forget a region that was
//!   unmounted.
//!
//! Every request first cancels whatever is pending (last request wins), so
//! at most one deadline is outstanding. A cancelled `PendingActive` falls
//! back to `Hidden`; a cancelled `PendingHidden` falls back to `Active`.
//!
//! # Invariants
//!
//! 1. At most one region is [`ActiveState::Active`] at any observation point.
//! 2. A `PendingActive` region is the payload of the armed deadline.
//! 3. A deadline never fires for a deregistered region.
//! 4. A deactivation that fires for a region that is no longer active is a
//!    no-op.
//!
//! # Driving time
//!
//! Nothing here sleeps. The host reads
//! [`next_deadline`](ActiveArbiter::next_deadline), arranges to wake at that
//! instant, and calls [`tick`](ActiveArbiter::tick). All instants are passed
//! in, so identical call sequences yield identical states.
//!
//! # Usage
//!
//! ```
//! use std::time::{Duration, Instant};
//! use hoverkit_core::arbiter::{ActiveArbiter, ActiveState};
//! use hoverkit_core::geometry::Rect;
//! use hoverkit_core::region::{RegionKind, RegionTree};
//!
//! let mut tree = RegionTree::new();
//! let parent = tree.insert(None, RegionKind::Focusable, Rect::default()).unwrap();
//! let child = tree.insert(Some(parent), RegionKind::Focusable, Rect::default()).unwrap();
//!
//! let mut arbiter = ActiveArbiter::default();
//! arbiter.register(parent);
//! arbiter.register(child);
//!
//! let t0 = Instant::now();
//! arbiter.ready_to_activate(child);
//! arbiter.ready_to_delayed_activate(parent, t0);
//! assert_eq!(arbiter.active_state(parent), ActiveState::PendingActive);
//!
//! // Pointer went back into the child before the delay elapsed.
//! arbiter.ready_to_activate(child);
//! arbiter.tick(t0 + Duration::from_secs(1));
//! assert_eq!(arbiter.active(), Some(child));
//! assert_eq!(arbiter.active_state(parent), ActiveState::Hidden);
//! ```

use std::time::{Duration, Instant};

use slotmap::SecondaryMap;

use crate::config::{ConfigError, ENV_ACTIVATION_DELAY_MS, env_override_u64};
use crate::region::RegionId;
use crate::timer::{TimerId, TimerSlot};

/// Delay before a delayed activation or a deactivation takes effect.
pub const DEFAULT_ACTIVATION_DELAY: Duration = Duration::from_millis(100);

/// Longest delay [`ArbiterConfig::validate`] accepts.
pub const MAX_ACTIVATION_DELAY: Duration = Duration::from_secs(5);

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for [`ActiveArbiter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArbiterConfig {
    /// How long delayed activations and deactivations wait before applying.
    /// Default: 100ms
    pub activation_delay: Duration,
}

impl Default for ArbiterConfig {
    fn default() -> Self {
        Self {
            activation_delay: DEFAULT_ACTIVATION_DELAY,
        }
    }
}

impl ArbiterConfig {
    /// Set the activation delay.
    #[must_use]
    pub fn with_activation_delay(mut self, delay: Duration) -> Self {
        self.activation_delay = delay;
        self
    }

    /// Reject delays longer than [`MAX_ACTIVATION_DELAY`].
    ///
    /// A zero delay is allowed: pending work then fires on the next tick.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.activation_delay > MAX_ACTIVATION_DELAY {
            return Err(ConfigError::DelayTooLong {
                field: "activation_delay",
                millis: self.activation_delay.as_millis(),
                max_millis: MAX_ACTIVATION_DELAY.as_millis(),
            });
        }
        Ok(())
    }

    /// Defaults with overrides from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Defaults with overrides from a custom environment lookup (for tests).
    pub fn from_env_with<F>(get_env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(ms) = env_override_u64(&get_env, ENV_ACTIVATION_DELAY_MS)? {
            config.activation_delay = Duration::from_millis(ms);
        }
        config.validate()?;
        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Highlight state of one region, as the view layer reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ActiveState {
    #[default]
    Hidden,
    /// Queued to become active when the armed deadline fires.
    PendingActive,
    Active,
    /// Still shown, queued to hide when the armed deadline fires.
    PendingHidden,
}

impl ActiveState {
    /// Whether the region is currently shown active (including while a
    /// deactivation is pending).
    #[inline]
    pub const fn is_shown(self) -> bool {
        matches!(self, Self::Active | Self::PendingHidden)
    }

    /// Whether a deadline is pending for the region.
    #[inline]
    pub const fn is_pending(self) -> bool {
        matches!(self, Self::PendingActive | Self::PendingHidden)
    }

    /// Stable lowercase name, for logs and diagnostics.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hidden => "hidden",
            Self::PendingActive => "pending-active",
            Self::Active => "active",
            Self::PendingHidden => "pending-hidden",
        }
    }
}

/// Work waiting on the arbiter's deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pending {
    Activate(RegionId),
    Deactivate(RegionId),
}

impl Pending {
    /// Region the pending work refers to.
    #[inline]
    pub const fn region(self) -> RegionId {
        match self {
            Self::Activate(r) | Self::Deactivate(r) => r,
        }
    }
}

/// Outcome of an arbiter call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Nothing changed.
    None,
    /// `region` became active; `previous` (if any) was hidden.
    Activated {
        region: RegionId,
        previous: Option<RegionId>,
    },
    /// `region` was hidden.
    Deactivated(RegionId),
    /// Work was queued behind a deadline.
    Scheduled { pending: Pending, timer: TimerId },
}

// ---------------------------------------------------------------------------
// ActiveArbiter
// ---------------------------------------------------------------------------

/// Decides which single region is active, with flicker-avoiding delays.
///
/// One arbiter serves one diagram view and is handed explicitly to every
/// view that owns a region.
#[derive(Debug)]
pub struct ActiveArbiter {
    config: ArbiterConfig,

    /// Registered regions and their highlight state.
    states: SecondaryMap<RegionId, ActiveState>,

    /// The region currently shown active.
    current_active: Option<RegionId>,

    /// The single outstanding deadline (activation or deactivation).
    pending: TimerSlot<Pending>,

    /// Diagnostic: total activations applied.
    activations: u64,
}

impl Default for ActiveArbiter {
    fn default() -> Self {
        Self::new(ArbiterConfig::default())
    }
}

impl ActiveArbiter {
    /// Create an arbiter with the given configuration.
    #[must_use]
    pub fn new(config: ArbiterConfig) -> Self {
        Self {
            config,
            states: SecondaryMap::new(),
            current_active: None,
            pending: TimerSlot::new(),
            activations: 0,
        }
    }

    /// Current configuration.
    #[inline]
    pub fn config(&self) -> &ArbiterConfig {
        &self.config
    }

    /// Replace the configuration. An already armed deadline keeps its instant.
    pub fn set_config(&mut self, config: ArbiterConfig) {
        self.config = config;
    }

    /// Make `region` known to the arbiter, initially hidden. Idempotent.
    pub fn register(&mut self, region: RegionId) {
        if !self.states.contains_key(region) {
            self.states.insert(region, ActiveState::Hidden);
            crate::trace!(region = ?region, "region registered");
        }
    }

    /// Whether `region` is registered.
    #[inline]
    pub fn is_registered(&self, region: RegionId) -> bool {
        self.states.contains_key(region)
    }

    /// Number of registered regions.
    #[inline]
    pub fn registered_count(&self) -> usize {
        self.states.len()
    }

    /// Activate `region` immediately.
    ///
    /// Cancels pending work, hides the previously active region, and keeps
    /// `region` active if it was pending deactivation.
    pub fn ready_to_activate(&mut self, region: RegionId) -> Transition {
        if !self.accepts(region) {
            return Transition::None;
        }
        self.cancel_pending();
        self.activate_now(region)
    }

    /// Activate `region` once the configured delay elapses unopposed.
    ///
    /// A region that is already active stays active and nothing is queued.
    pub fn ready_to_delayed_activate(&mut self, region: RegionId, now: Instant) -> Transition {
        if !self.accepts(region) {
            return Transition::None;
        }
        self.cancel_pending();
        if self.current_active == Some(region) {
            return Transition::None;
        }
        self.set_state(region, ActiveState::PendingActive);
        self.schedule(Pending::Activate(region), now)
    }

    /// Hide `region` once the configured delay elapses unopposed.
    ///
    /// If `region` is no longer the active one when the deadline fires, the
    /// firing does nothing.
    pub fn ready_to_deactivate(&mut self, region: RegionId, now: Instant) -> Transition {
        if !self.accepts(region) {
            return Transition::None;
        }
        self.cancel_pending();
        if self.current_active == Some(region) {
            self.set_state(region, ActiveState::PendingHidden);
        }
        self.schedule(Pending::Deactivate(region), now)
    }

    /// Forget `region`: cancel its deadline and clear it if active.
    ///
    /// Unknown regions are ignored.
    pub fn deregister(&mut self, region: RegionId) {
        if self
            .pending
            .cancel_if(|p| p.region() == region)
            .is_some()
        {
            crate::trace!(region = ?region, "pending deadline dropped on deregister");
        }
        if self.current_active == Some(region) {
            self.current_active = None;
        }
        if self.states.remove(region).is_some() {
            crate::trace!(region = ?region, "region deregistered");
        }
    }

    /// Apply the pending work if its deadline has been reached.
    pub fn tick(&mut self, now: Instant) -> Transition {
        let Some(fired) = self.pending.poll(now) else {
            return Transition::None;
        };
        crate::trace!(pending = ?fired, "deadline fired");

        match fired {
            Pending::Activate(region) if self.is_registered(region) => self.activate_now(region),
            Pending::Deactivate(region) if self.current_active == Some(region) => {
                self.current_active = None;
                self.set_state(region, ActiveState::Hidden);
                crate::debug!(region = ?region, "region deactivated");
                Transition::Deactivated(region)
            }
            _ => {
                crate::trace!("stale deadline ignored");
                Transition::None
            }
        }
    }

    /// Hide everything and drop pending work.
    pub fn reset(&mut self) {
        self.pending.cancel();
        self.current_active = None;
        for state in self.states.values_mut() {
            *state = ActiveState::Hidden;
        }
    }

    /// State the view binds to. Unknown regions read as hidden.
    #[inline]
    pub fn active_state(&self, region: RegionId) -> ActiveState {
        self.states.get(region).copied().unwrap_or_default()
    }

    /// The region currently shown active.
    #[inline]
    pub fn active(&self) -> Option<RegionId> {
        self.current_active
    }

    /// Pending work, if a deadline is armed.
    #[inline]
    pub fn pending(&self) -> Option<Pending> {
        self.pending.payload().copied()
    }

    /// Region queued for delayed activation.
    pub fn pending_activation(&self) -> Option<RegionId> {
        match self.pending() {
            Some(Pending::Activate(r)) => Some(r),
            _ => None,
        }
    }

    /// Region queued for delayed deactivation.
    pub fn pending_deactivation(&self) -> Option<RegionId> {
        match self.pending() {
            Some(Pending::Deactivate(r)) => Some(r),
            _ => None,
        }
    }

    /// When the host should call [`tick`](Self::tick) next.
    #[inline]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.deadline()
    }

    /// Id of the armed deadline.
    #[inline]
    pub fn pending_timer(&self) -> Option<TimerId> {
        self.pending.id()
    }

    /// Registered regions with their states.
    pub fn iter(&self) -> impl Iterator<Item = (RegionId, ActiveState)> + '_ {
        self.states.iter().map(|(id, &state)| (id, state))
    }

    /// Total activations applied (diagnostic).
    #[inline]
    pub fn activation_count(&self) -> u64 {
        self.activations
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    fn accepts(&self, region: RegionId) -> bool {
        let known = self.is_registered(region);
        if !known {
            crate::warn!(region = ?region, "arbiter request for unregistered region ignored");
        }
        known
    }

    fn set_state(&mut self, region: RegionId, state: ActiveState) {
        if let Some(slot) = self.states.get_mut(region) {
            *slot = state;
        }
    }

    /// Cancel the armed deadline and restore its region's settled state.
    fn cancel_pending(&mut self) {
        match self.pending.cancel() {
            Some(Pending::Activate(region)) => {
                if self.active_state(region) == ActiveState::PendingActive {
                    self.set_state(region, ActiveState::Hidden);
                }
                crate::trace!(region = ?region, "pending activation cancelled");
            }
            Some(Pending::Deactivate(region)) => {
                if self.active_state(region) == ActiveState::PendingHidden {
                    self.set_state(region, ActiveState::Active);
                }
                crate::trace!(region = ?region, "pending deactivation cancelled");
            }
            None => {}
        }
    }

    fn schedule(&mut self, pending: Pending, now: Instant) -> Transition {
        let timer = self
            .pending
            .schedule(now, self.config.activation_delay, pending);
        crate::trace!(pending = ?pending, timer = timer.get(), "deadline armed");
        Transition::Scheduled { pending, timer }
    }

    fn activate_now(&mut self, region: RegionId) -> Transition {
        if self.current_active == Some(region) {
            self.set_state(region, ActiveState::Active);
            return Transition::None;
        }

        let previous = self.current_active.replace(region);
        if let Some(prev) = previous {
            self.set_state(prev, ActiveState::Hidden);
        }
        self.set_state(region, ActiveState::Active);
        self.activations += 1;
        crate::debug!(region = ?region, previous = ?previous, "region activated");
        Transition::Activated { region, previous }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::region::{RegionKind, RegionTree};

    const DELAY: Duration = DEFAULT_ACTIVATION_DELAY;

    fn setup(n: usize) -> (ActiveArbiter, Vec<RegionId>) {
        let mut tree = RegionTree::new();
        let mut arbiter = ActiveArbiter::default();
        let ids = (0..n)
            .map(|_| {
                let id = tree
                    .insert(None, RegionKind::Focusable, Rect::default())
                    .unwrap();
                arbiter.register(id);
                id
            })
            .collect();
        (arbiter, ids)
    }

    fn active_count(arbiter: &ActiveArbiter) -> usize {
        arbiter.iter().filter(|(_, s)| *s == ActiveState::Active).count()
    }

    // --- Immediate activation ---

    #[test]
    fn initial_state_is_hidden() {
        let (arbiter, ids) = setup(2);
        assert_eq!(arbiter.active(), None);
        assert_eq!(arbiter.active_state(ids[0]), ActiveState::Hidden);
        assert_eq!(arbiter.next_deadline(), None);
        assert_eq!(arbiter.activation_count(), 0);
    }

    #[test]
    fn activate_demotes_previous() {
        let (mut arbiter, ids) = setup(2);
        let (a, b) = (ids[0], ids[1]);

        assert_eq!(
            arbiter.ready_to_activate(b),
            Transition::Activated {
                region: b,
                previous: None
            }
        );
        assert_eq!(
            arbiter.ready_to_activate(a),
            Transition::Activated {
                region: a,
                previous: Some(b)
            }
        );
        assert_eq!(arbiter.active_state(a), ActiveState::Active);
        assert_eq!(arbiter.active_state(b), ActiveState::Hidden);
        assert_eq!(arbiter.activation_count(), 2);
    }

    #[test]
    fn activating_active_region_is_noop() {
        let (mut arbiter, ids) = setup(1);
        arbiter.ready_to_activate(ids[0]);
        assert_eq!(arbiter.ready_to_activate(ids[0]), Transition::None);
        assert_eq!(arbiter.activation_count(), 1);
    }

    // --- Delayed activation ---

    #[test]
    fn delayed_activation_waits_for_deadline() {
        let (mut arbiter, ids) = setup(1);
        let a = ids[0];
        let t0 = Instant::now();

        let tr = arbiter.ready_to_delayed_activate(a, t0);
        assert!(matches!(
            tr,
            Transition::Scheduled {
                pending: Pending::Activate(r),
                ..
            } if r == a
        ));
        assert_eq!(arbiter.active_state(a), ActiveState::PendingActive);
        assert_eq!(arbiter.pending_activation(), Some(a));
        assert_eq!(arbiter.next_deadline(), Some(t0 + DELAY));

        assert_eq!(arbiter.tick(t0 + DELAY / 2), Transition::None);
        assert_eq!(arbiter.active_state(a), ActiveState::PendingActive);

        assert_eq!(
            arbiter.tick(t0 + DELAY),
            Transition::Activated {
                region: a,
                previous: None
            }
        );
        assert_eq!(arbiter.active_state(a), ActiveState::Active);
        assert_eq!(arbiter.next_deadline(), None);
    }

    #[test]
    fn immediate_activation_cancels_delayed() {
        let (mut arbiter, ids) = setup(2);
        let (a, b) = (ids[0], ids[1]);
        let t0 = Instant::now();

        arbiter.ready_to_delayed_activate(a, t0);
        arbiter.ready_to_activate(b);

        assert_eq!(arbiter.active_state(a), ActiveState::Hidden);
        assert_eq!(arbiter.active_state(b), ActiveState::Active);
        assert_eq!(arbiter.tick(t0 + DELAY * 10), Transition::None);
        assert_eq!(arbiter.active(), Some(b));
    }

    #[test]
    fn newer_delayed_request_replaces_older() {
        let (mut arbiter, ids) = setup(2);
        let (a, b) = (ids[0], ids[1]);
        let t0 = Instant::now();
        let t1 = t0 + DELAY / 2;

        arbiter.ready_to_delayed_activate(a, t0);
        arbiter.ready_to_delayed_activate(b, t1);

        assert_eq!(arbiter.active_state(a), ActiveState::Hidden);
        assert_eq!(arbiter.active_state(b), ActiveState::PendingActive);
        assert_eq!(arbiter.tick(t0 + DELAY), Transition::None);
        arbiter.tick(t1 + DELAY);
        assert_eq!(arbiter.active(), Some(b));
        assert_eq!(arbiter.active_state(a), ActiveState::Hidden);
    }

    #[test]
    fn delayed_activation_of_active_region_queues_nothing() {
        let (mut arbiter, ids) = setup(1);
        let t0 = Instant::now();
        arbiter.ready_to_activate(ids[0]);
        assert_eq!(arbiter.ready_to_delayed_activate(ids[0], t0), Transition::None);
        assert_eq!(arbiter.next_deadline(), None);
        assert_eq!(arbiter.active_state(ids[0]), ActiveState::Active);
    }

    // --- Deactivation ---

    #[test]
    fn unopposed_deactivation_hides() {
        let (mut arbiter, ids) = setup(1);
        let a = ids[0];
        let t0 = Instant::now();

        arbiter.ready_to_activate(a);
        arbiter.ready_to_deactivate(a, t0);
        assert_eq!(arbiter.active_state(a), ActiveState::PendingHidden);
        assert_eq!(arbiter.pending_deactivation(), Some(a));

        assert_eq!(arbiter.tick(t0 + DELAY), Transition::Deactivated(a));
        assert_eq!(arbiter.active_state(a), ActiveState::Hidden);
        assert_eq!(arbiter.active(), None);
    }

    #[test]
    fn reactivation_cancels_deactivation() {
        let (mut arbiter, ids) = setup(1);
        let a = ids[0];
        let t0 = Instant::now();

        arbiter.ready_to_activate(a);
        arbiter.ready_to_deactivate(a, t0);
        arbiter.ready_to_activate(a);

        assert_eq!(arbiter.active_state(a), ActiveState::Active);
        assert_eq!(arbiter.tick(t0 + DELAY * 2), Transition::None);
        assert_eq!(arbiter.active_state(a), ActiveState::Active);
    }

    #[test]
    fn delayed_activation_of_other_region_cancels_deactivation() {
        let (mut arbiter, ids) = setup(2);
        let (child, parent) = (ids[0], ids[1]);
        let t0 = Instant::now();

        arbiter.ready_to_activate(child);
        arbiter.ready_to_deactivate(child, t0);
        arbiter.ready_to_delayed_activate(parent, t0);

        // Child is shown again until the parent's delay elapses.
        assert_eq!(arbiter.active_state(child), ActiveState::Active);
        assert_eq!(arbiter.active_state(parent), ActiveState::PendingActive);

        arbiter.tick(t0 + DELAY);
        assert_eq!(arbiter.active_state(child), ActiveState::Hidden);
        assert_eq!(arbiter.active_state(parent), ActiveState::Active);
    }

    #[test]
    fn stale_deactivation_is_noop() {
        let (mut arbiter, ids) = setup(2);
        let (a, b) = (ids[0], ids[1]);
        let t0 = Instant::now();

        // `a` never became active; its deactivation fires against `b`.
        arbiter.ready_to_activate(b);
        arbiter.ready_to_deactivate(a, t0);
        assert_eq!(arbiter.active_state(a), ActiveState::Hidden);
        assert_eq!(arbiter.tick(t0 + DELAY), Transition::None);
        assert_eq!(arbiter.active(), Some(b));
    }

    // --- Deregistration ---

    #[test]
    fn deregister_cancels_pending_activation() {
        let (mut arbiter, ids) = setup(1);
        let a = ids[0];
        let t0 = Instant::now();

        arbiter.ready_to_delayed_activate(a, t0);
        arbiter.deregister(a);

        assert_eq!(arbiter.next_deadline(), None);
        assert_eq!(arbiter.tick(t0 + DELAY), Transition::None);
        assert_eq!(arbiter.active(), None);
        assert!(!arbiter.is_registered(a));
    }

    #[test]
    fn deregister_clears_active() {
        let (mut arbiter, ids) = setup(2);
        let (a, b) = (ids[0], ids[1]);
        let t0 = Instant::now();

        arbiter.ready_to_activate(a);
        arbiter.ready_to_deactivate(a, t0);
        arbiter.deregister(a);

        assert_eq!(arbiter.active(), None);
        assert_eq!(arbiter.tick(t0 + DELAY), Transition::None);
        // Others are unaffected.
        assert_eq!(arbiter.ready_to_activate(b), Transition::Activated {
            region: b,
            previous: None
        });
    }

    #[test]
    fn deregister_keeps_unrelated_deadline() {
        let (mut arbiter, ids) = setup(2);
        let (a, b) = (ids[0], ids[1]);
        let t0 = Instant::now();

        arbiter.ready_to_delayed_activate(a, t0);
        arbiter.deregister(b);
        assert_eq!(arbiter.pending_activation(), Some(a));
    }

    #[test]
    fn deregistered_region_requests_are_ignored() {
        let (mut arbiter, ids) = setup(1);
        let a = ids[0];
        let t0 = Instant::now();

        arbiter.deregister(a);
        assert_eq!(arbiter.ready_to_activate(a), Transition::None);
        assert_eq!(arbiter.ready_to_delayed_activate(a, t0), Transition::None);
        assert_eq!(arbiter.ready_to_deactivate(a, t0), Transition::None);
        assert_eq!(arbiter.active(), None);
        assert_eq!(arbiter.next_deadline(), None);
        // Deregistering twice is fine too.
        arbiter.deregister(a);
    }

    // --- Scenario ---

    #[test]
    fn child_reentry_prevents_parent_flicker() {
        let (mut arbiter, ids) = setup(2);
        let (parent, child) = (ids[0], ids[1]);
        let t0 = Instant::now();

        arbiter.ready_to_activate(child);
        arbiter.ready_to_deactivate(child, t0);
        arbiter.ready_to_delayed_activate(parent, t0);
        arbiter.ready_to_activate(child);

        for step in 0..5 {
            arbiter.tick(t0 + DELAY * step);
            assert_eq!(arbiter.active(), Some(child));
            assert_eq!(arbiter.active_state(parent), ActiveState::Hidden);
        }
        assert_eq!(arbiter.activation_count(), 1);
    }

    #[test]
    fn reset_hides_everything() {
        let (mut arbiter, ids) = setup(2);
        let t0 = Instant::now();
        arbiter.ready_to_activate(ids[0]);
        arbiter.ready_to_delayed_activate(ids[1], t0);
        arbiter.reset();

        assert_eq!(active_count(&arbiter), 0);
        assert_eq!(arbiter.next_deadline(), None);
        assert!(arbiter.iter().all(|(_, s)| s == ActiveState::Hidden));
    }

    #[test]
    fn single_active_through_mixed_sequence() {
        let (mut arbiter, ids) = setup(3);
        let t0 = Instant::now();
        let mut now = t0;
        for round in 0..30usize {
            let r = ids[round % 3];
            match round % 4 {
                0 => {
                    arbiter.ready_to_activate(r);
                }
                1 => {
                    arbiter.ready_to_delayed_activate(r, now);
                }
                2 => {
                    arbiter.ready_to_deactivate(r, now);
                }
                _ => now += DELAY,
            }
            arbiter.tick(now);
            assert!(active_count(&arbiter) <= 1);
        }
    }

    // --- Config ---

    #[test]
    fn custom_delay_is_used() {
        let mut tree = RegionTree::new();
        let a = tree.insert(None, RegionKind::Focusable, Rect::default()).unwrap();
        let config = ArbiterConfig::default().with_activation_delay(Duration::from_millis(250));
        let mut arbiter = ActiveArbiter::new(config);
        arbiter.register(a);
        let t0 = Instant::now();

        arbiter.ready_to_delayed_activate(a, t0);
        assert_eq!(arbiter.next_deadline(), Some(t0 + Duration::from_millis(250)));
        assert_eq!(arbiter.config().activation_delay, Duration::from_millis(250));
    }

    #[test]
    fn config_from_env() {
        let config = ArbiterConfig::from_env_with(|key| {
            (key == ENV_ACTIVATION_DELAY_MS).then(|| "40".to_string())
        })
        .unwrap();
        assert_eq!(config.activation_delay, Duration::from_millis(40));

        let default = ArbiterConfig::from_env_with(|_| None).unwrap();
        assert_eq!(default, ArbiterConfig::default());
    }

    #[test]
    fn config_rejects_long_delay() {
        let err = ArbiterConfig::from_env_with(|_| Some("60000".to_string())).unwrap_err();
        assert!(matches!(err, ConfigError::DelayTooLong { millis: 60000, .. }));
    }

    #[test]
    fn state_names() {
        assert_eq!(ActiveState::PendingActive.as_str(), "pending-active");
        assert!(ActiveState::PendingHidden.is_shown());
        assert!(!ActiveState::PendingActive.is_shown());
        assert!(ActiveState::PendingActive.is_pending());
        assert!(!ActiveState::Hidden.is_pending());
    }
}
