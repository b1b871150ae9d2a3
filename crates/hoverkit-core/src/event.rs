#![forbid(unsafe_code)]

//! Pointer boundary events.
//!
//! The arbiter only cares about boundary crossings: the pointer moved over a
//! shape, or moved out of one. Each event carries the shape it concerns
//! (`target`) and the shape on the other side of the boundary (`related`),
//! which is what makes child-to-parent moves distinguishable from moves
//! that come from outside.
//!
//! Hosts that deliver over/out events natively (a DOM, a toolkit with enter
//! and leave callbacks) construct [`PointerEvent`]s directly. Hosts that only
//! know the pointer position hit-test the [`RegionTree`](crate::region::RegionTree)
//! and feed the result to a [`PointerTracker`], which synthesizes the pair
//! of events for every change of hit target.

use crate::region::RegionId;

/// Which side of the boundary the pointer ended up on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerEventKind {
    /// Pointer moved onto `target`, coming from `related`.
    Over,
    /// Pointer moved off `target`, going to `related`.
    Out,
}

/// A pointer boundary crossing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerEvent {
    pub kind: PointerEventKind,
    /// Shape the event is about (`None` only for synthetic events).
    pub target: Option<RegionId>,
    /// Shape on the other side of the boundary (`None` = outside the diagram).
    pub related: Option<RegionId>,
}

impl PointerEvent {
    /// Pointer moved onto `target` from `related`.
    #[must_use]
    pub const fn over(target: RegionId, related: Option<RegionId>) -> Self {
        Self {
            kind: PointerEventKind::Over,
            target: Some(target),
            related,
        }
    }

    /// Pointer moved off `target` to `related`.
    #[must_use]
    pub const fn out(target: RegionId, related: Option<RegionId>) -> Self {
        Self {
            kind: PointerEventKind::Out,
            target: Some(target),
            related,
        }
    }

    /// Whether this is an over event.
    #[inline]
    pub const fn is_over(&self) -> bool {
        matches!(self.kind, PointerEventKind::Over)
    }
}

/// Turns a stream of hit-test results into over/out event pairs.
///
/// Like the browser, an `Out` for the old target is emitted before the
/// `Over` for the new one. Repeated hits on the same target emit nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct PointerTracker {
    hovered: Option<RegionId>,
}

impl PointerTracker {
    /// Create a tracker with nothing hovered.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Shape currently under the pointer.
    #[inline]
    pub fn hovered(&self) -> Option<RegionId> {
        self.hovered
    }

    /// Record the latest hit-test result and return the boundary events it implies.
    pub fn move_to(&mut self, hit: Option<RegionId>) -> Vec<PointerEvent> {
        if hit == self.hovered {
            return Vec::new();
        }
        let previous = std::mem::replace(&mut self.hovered, hit);

        let mut events = Vec::with_capacity(2);
        if let Some(old) = previous {
            events.push(PointerEvent::out(old, hit));
        }
        if let Some(new) = hit {
            events.push(PointerEvent::over(new, previous));
        }
        events
    }

    /// Pointer left the diagram entirely.
    pub fn leave(&mut self) -> Vec<PointerEvent> {
        self.move_to(None)
    }

    /// Forget the hovered shape without emitting events (it was removed).
    pub fn forget(&mut self, id: RegionId) {
        if self.hovered == Some(id) {
            self.hovered = None;
        }
    }
}
