#![forbid(unsafe_code)]

//! Action box overlay.
//!
//! A strip of buttons (delete, toggle breakpoint, jump to source) shown under
//! the heading of the statement that currently owns the highlight. The box
//! is visible while its region is shown by the arbiter, including the short
//! window in which a deactivation is pending.

use bitflags::bitflags;
use hoverkit_core::arbiter::ActiveState;
use hoverkit_core::geometry::{Point, Rect};

bitflags! {
    /// Buttons that are switched off for a particular statement.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DisabledButtons: u8 {
        /// Delete button.
        const DELETE = 0b001;
        /// Breakpoint toggle.
        const DEBUG  = 0b010;
        /// Jump-to-source button.
        const JUMP   = 0b100;
    }
}

/// A button in the action box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Delete,
    ToggleBreakpoint,
    JumpToSource,
}

impl Action {
    /// Buttons in left-to-right order.
    pub const ALL: [Action; 3] = [Action::Delete, Action::ToggleBreakpoint, Action::JumpToSource];

    /// Flag that disables this action.
    #[inline]
    pub const fn disabled_flag(self) -> DisabledButtons {
        match self {
            Self::Delete => DisabledButtons::DELETE,
            Self::ToggleBreakpoint => DisabledButtons::DEBUG,
            Self::JumpToSource => DisabledButtons::JUMP,
        }
    }
}

/// Placement and enablement of the action box for one statement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActionBox {
    bounds: Rect,
    disabled: DisabledButtons,
    is_breakpoint: bool,
}

impl ActionBox {
    /// Create an action box occupying `bounds`, all buttons enabled.
    #[must_use]
    pub fn new(bounds: Rect) -> Self {
        Self {
            bounds,
            disabled: DisabledButtons::empty(),
            is_breakpoint: false,
        }
    }

    /// Switch off some buttons.
    #[must_use]
    pub fn with_disabled(mut self, disabled: DisabledButtons) -> Self {
        self.disabled = disabled;
        self
    }

    /// Whether the statement currently has a breakpoint (changes the toggle label).
    #[must_use]
    pub fn with_breakpoint(mut self, is_breakpoint: bool) -> Self {
        self.is_breakpoint = is_breakpoint;
        self
    }

    #[inline]
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    #[inline]
    pub fn disabled(&self) -> DisabledButtons {
        self.disabled
    }

    /// Whether the box is drawn for a region in `state`.
    #[inline]
    pub fn is_visible(state: ActiveState) -> bool {
        state.is_shown()
    }

    /// Whether `action` can be triggered.
    #[inline]
    pub fn is_enabled(&self, action: Action) -> bool {
        !self.disabled.contains(action.disabled_flag())
    }

    /// Tooltip text for a button.
    pub fn label(&self, action: Action) -> &'static str {
        match action {
            Action::Delete => "Delete",
            Action::ToggleBreakpoint if self.is_breakpoint => "Remove Breakpoint",
            Action::ToggleBreakpoint => "Add Breakpoint",
            Action::JumpToSource => "Jump to Source",
        }
    }

    /// Button rectangles, left to right.
    pub fn buttons(&self) -> Vec<(Action, Rect)> {
        Action::ALL
            .into_iter()
            .zip(self.bounds.columns(Action::ALL.len()))
            .collect()
    }

    /// Enabled button under `point`, if the box is visible for `state`.
    pub fn hit(&self, state: ActiveState, point: Point) -> Option<Action> {
        if !Self::is_visible(state) || !self.bounds.contains(point) {
            return None;
        }
        let action = self
            .buttons()
            .into_iter()
            .find(|(_, rect)| rect.contains(point))
            .map(|(action, _)| action)?;

        #[cfg(feature = "tracing")]
        tracing::trace!(action = ?action, enabled = self.is_enabled(action), "action box hit");

        self.is_enabled(action).then_some(action)
    }
}
