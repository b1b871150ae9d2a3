#![forbid(unsafe_code)]

//! Routing pointer boundary events to the arbiter.
//!
//! Each focusable region handles the over/out events of its own subtree.
//! The event goes to the nearest focusable ancestor of its target (the
//! *owner*) and stops there, so an outer block never reacts to crossings
//! that happen inside a nested statement.
//!
//! # Decision rule
//!
//! For an `Over` event handled by `owner`:
//!
//! 1. If the target sits inside a focusable child of `owner`, ignore it; the
//!    child handles its own highlight.
//! 2. If the pointer came from inside a focusable child of `owner`, request a
//!    *delayed* activation, giving the child's leave time to settle.
//! 3. Otherwise request an immediate activation.
//!
//! For an `Out` event handled by `owner`:
//!
//! 1. If the pointer is still within `owner`'s subtree, ignore it.
//! 2. Otherwise request a delayed deactivation.

use std::time::Instant;

use crate::arbiter::ActiveArbiter;
use crate::event::{PointerEvent, PointerEventKind, PointerTracker};
use crate::geometry::Point;
use crate::region::{RegionId, RegionTree};

/// What the router asked the arbiter to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    /// No request was made.
    Ignored,
    Activate(RegionId),
    DelayedActivate(RegionId),
    Deactivate(RegionId),
}

/// Feeds pointer events into an [`ActiveArbiter`].
#[derive(Debug, Default)]
pub struct HoverRouter {
    tracker: PointerTracker,
}

impl HoverRouter {
    /// Create a router with nothing hovered.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decide how `owner` should react to `event`, without side effects.
    pub fn decide(tree: &RegionTree, owner: RegionId, event: &PointerEvent) -> RouteDecision {
        match event.kind {
            PointerEventKind::Over => {
                if tree.is_in_focusable_child(event.target, owner) {
                    RouteDecision::Ignored
                } else if tree.is_in_focusable_child(event.related, owner) {
                    RouteDecision::DelayedActivate(owner)
                } else {
                    RouteDecision::Activate(owner)
                }
            }
            PointerEventKind::Out => {
                let still_inside = event.related.is_some_and(|r| tree.is_within(r, owner));
                if still_inside {
                    RouteDecision::Ignored
                } else {
                    RouteDecision::Deactivate(owner)
                }
            }
        }
    }

    /// Let `owner` handle `event` and forward the decision to the arbiter.
    pub fn handle(
        tree: &RegionTree,
        arbiter: &mut ActiveArbiter,
        owner: RegionId,
        event: &PointerEvent,
        now: Instant,
    ) -> RouteDecision {
        let decision = Self::decide(tree, owner, event);
        match decision {
            RouteDecision::Ignored => {}
            RouteDecision::Activate(r) => {
                arbiter.ready_to_activate(r);
            }
            RouteDecision::DelayedActivate(r) => {
                arbiter.ready_to_delayed_activate(r, now);
            }
            RouteDecision::Deactivate(r) => {
                arbiter.ready_to_deactivate(r, now);
            }
        }
        crate::trace!(event = ?event, decision = ?decision, "pointer event routed");
        decision
    }

    /// Deliver `event` to the nearest focusable ancestor of its target.
    pub fn dispatch(
        tree: &RegionTree,
        arbiter: &mut ActiveArbiter,
        event: &PointerEvent,
        now: Instant,
    ) -> RouteDecision {
        match event.target.and_then(|t| tree.focusable_owner(t)) {
            Some(owner) => Self::handle(tree, arbiter, owner, event, now),
            None => RouteDecision::Ignored,
        }
    }

    /// Hit-test `point` and dispatch the boundary events the move implies.
    ///
    /// `None` means the pointer left the diagram.
    pub fn pointer_moved(
        &mut self,
        tree: &RegionTree,
        arbiter: &mut ActiveArbiter,
        point: Option<Point>,
        now: Instant,
    ) -> Vec<RouteDecision> {
        let span = crate::debug_span!("pointer_moved", has_point = point.is_some());
        let _guard = span.enter();

        let hit = point.and_then(|p| tree.hit_test(p));
        self.tracker
            .move_to(hit)
            .iter()
            .map(|event| Self::dispatch(tree, arbiter, event, now))
            .collect()
    }

    /// Shape currently under the pointer.
    #[inline]
    pub fn hovered(&self) -> Option<RegionId> {
        self.tracker.hovered()
    }

    /// Forget a removed shape so no event is synthesized for it.
    pub fn forget(&mut self, id: RegionId) {
        self.tracker.forget(id);
    }
}
