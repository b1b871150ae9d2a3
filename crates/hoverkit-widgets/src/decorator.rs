#![forbid(unsafe_code)]

//! Compound statement decorator.
//!
//! Wraps a compound statement (a `finally` block, for instance) with a
//! heading, an outline, a drop zone for its body, a breakpoint marker, and an
//! action box. The decorator owns one focusable region in the
//! [`RegionTree`] and takes its highlight state from the [`ActiveArbiter`]
//! it was mounted with; it never decides on its own whether it is active.
//!
//! The program model, source navigation, and the expression editor are
//! collaborators reached through the [`StatementModel`],
//! [`SourceNavigator`], and [`ExpressionEditorHost`] traits.
//!
//! # Geometry
//!
//! ```text
//! (P1)        (P2)|---------|(P3)      (P4)
//!       |---------| heading |----------|
//! (P11) |         |____ ____|__________|  statement box
//!       |              |(P8)           |
//!       |              |               |
//!       |_____________(P6)_____________| (P5)
//! ```
//!
//! The action box hangs centred under P8; the breakpoint marker sits on the
//! right edge of the decorator box at the statement box's top edge.

use std::fmt;

use hoverkit_core::arbiter::{ActiveArbiter, ActiveState};
use hoverkit_core::config::{ConfigError, check_dimension};
use hoverkit_core::geometry::{Point, Rect};
use hoverkit_core::region::{RegionId, RegionKind, RegionTree};

use crate::action_box::{Action, ActionBox, DisabledButtons};
use crate::breakpoint::BreakpointIndicator;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Layout constants shared by every compound decorator in a diagram.
#[derive(Debug, Clone, PartialEq)]
pub struct DecoratorConfig {
    /// Heading (title tab) width.
    pub heading_width: f32,
    /// Heading (title tab) height.
    pub heading_height: f32,
    /// Space between the heading and the first body statement.
    pub heading_gap: f32,
    pub padding_left: f32,
    pub padding_top: f32,
    /// Height of a simple statement; sizes the condition box.
    pub statement_height: f32,
    /// Full action box width; a compound decorator uses three quarters of it.
    pub action_box_width: f32,
    pub action_box_height: f32,
}

impl Default for DecoratorConfig {
    fn default() -> Self {
        Self {
            heading_width: 40.0,
            heading_height: 25.0,
            heading_gap: 0.0,
            padding_left: 0.0,
            padding_top: 0.0,
            statement_height: 30.0,
            action_box_width: 120.0,
            action_box_height: 18.0,
        }
    }
}

impl DecoratorConfig {
    /// Reject negative or non-finite dimensions.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_dimension("heading_width", self.heading_width)?;
        check_dimension("heading_height", self.heading_height)?;
        check_dimension("heading_gap", self.heading_gap)?;
        check_dimension("padding_left", self.padding_left)?;
        check_dimension("padding_top", self.padding_top)?;
        check_dimension("statement_height", self.statement_height)?;
        check_dimension("action_box_width", self.action_box_width)?;
        check_dimension("action_box_height", self.action_box_height)
    }
}

// ---------------------------------------------------------------------------
// Collaborators
// ---------------------------------------------------------------------------

/// Failure reported by a collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelError {
    message: String,
}

impl ModelError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ModelError {}

/// The program-tree node a decorator draws.
pub trait StatementModel {
    fn is_breakpoint(&self) -> bool;
    fn add_breakpoint(&mut self) -> Result<(), ModelError>;
    fn remove_breakpoint(&mut self) -> Result<(), ModelError>;
    /// Delete the statement from its parent.
    fn remove(&mut self) -> Result<(), ModelError>;
}

/// Moves the source view to a model node.
pub trait SourceNavigator<M: ?Sized> {
    fn go_to_source(&mut self, model: &M) -> Result<(), ModelError>;
}

/// Descriptor handed to the expression editor.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EditorOptions {
    pub property_type: String,
    pub key: String,
}

/// Parameter editor descriptor: the options plus the value being edited.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParameterEditorOptions {
    pub value: String,
    pub options: EditorOptions,
}

/// Opens the inline expression editor overlay.
pub trait ExpressionEditorHost {
    fn open(&mut self, anchor: Rect, value: &str, options: &EditorOptions);
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a decorator interaction was refused or failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecoratorError {
    /// The action box is not shown, so its buttons cannot be used.
    ActionBoxHidden,
    /// The button is switched off for this statement.
    ActionDisabled(Action),
    /// No layout has been computed yet.
    NotLaidOut,
    /// A collaborator failed.
    Model(ModelError),
}

impl fmt::Display for DecoratorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ActionBoxHidden => f.write_str("action box is not visible"),
            Self::ActionDisabled(action) => write!(f, "action {action:?} is disabled"),
            Self::NotLaidOut => f.write_str("decorator has not been laid out"),
            Self::Model(err) => write!(f, "model operation failed: {err}"),
        }
    }
}

impl std::error::Error for DecoratorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        if let Self::Model(err) = self {
            return Some(err);
        }
        None
    }
}

impl From<ModelError> for DecoratorError {
    fn from(err: ModelError) -> Self {
        Self::Model(err)
    }
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

/// Positions of every part of a decorator, in diagram units.
#[derive(Debug, Clone, PartialEq)]
pub struct DecoratorLayout {
    /// Title tab.
    pub heading: Rect,
    /// Baseline anchor of the title text.
    pub title_anchor: Point,
    /// Open outline from the heading's right edge around the body (P3, P4, P5, P6).
    pub outline: [Point; 4],
    /// Where body statements can be dropped.
    pub drop_zone: Rect,
    /// Anchor for the inline expression editor.
    pub condition_box: Rect,
    /// Where the action box is drawn when shown.
    pub action_box: Rect,
    /// Breakpoint marker, present only when the statement has a breakpoint.
    pub breakpoint: Option<BreakpointIndicator>,
    /// Marks the heading as the current debugger stop.
    pub debug_hit: bool,
}

impl DecoratorLayout {
    /// Compute the layout for a decorator box `bbox` around `statement_box`.
    pub fn compute(
        config: &DecoratorConfig,
        bbox: Rect,
        statement_box: Rect,
        is_breakpoint: bool,
    ) -> Self {
        let title_w = config.heading_width;
        let title_h = config.heading_height;

        let p1 = Point::new(bbox.x - config.padding_left, bbox.y + config.padding_top);
        let p2 = Point::new(bbox.x - title_w / 2.0, p1.y + title_h / 2.0);
        let p3 = Point::new(bbox.x + title_w / 2.0, p2.y);
        let p4 = Point::new(p1.x + config.padding_left + statement_box.width, p2.y);
        let p5 = Point::new(p4.x, bbox.bottom());
        let p6 = Point::new(bbox.x, p5.y);
        let p8 = Point::new(bbox.x, p2.y + title_h / 2.0);
        let p11 = Point::new(p1.x, p1.y + title_h / 2.0);

        let action_w = 3.0 * config.action_box_width / 4.0;

        Self {
            heading: Rect::new(p2.x, p1.y, title_w, title_h),
            title_anchor: Point::new(p8.x, p2.y),
            outline: [p3, p4, p5, p6],
            drop_zone: Rect::new(p11.x, p11.y, statement_box.width, statement_box.height),
            condition_box: Rect::new(
                p2.x,
                p2.y - config.statement_height / 2.0,
                statement_box.width,
                config.statement_height,
            ),
            action_box: Rect::centered_below(p8, action_w, config.action_box_height),
            breakpoint: is_breakpoint.then(|| BreakpointIndicator::place(bbox, statement_box)),
            debug_hit: false,
        }
    }

    /// Smallest rectangle covering every hoverable part.
    ///
    /// Includes the action box, so moving onto its buttons does not count
    /// as leaving the decorator.
    pub fn hover_bounds(&self, bbox: Rect) -> Rect {
        let mut bounds = bbox
            .union(&self.heading)
            .union(&self.drop_zone)
            .union(&self.action_box);
        if let Some(marker) = &self.breakpoint {
            bounds = bounds.union(&marker.bounds());
        }
        bounds
    }
}

// ---------------------------------------------------------------------------
// CompoundDecorator
// ---------------------------------------------------------------------------

/// View model of one compound statement decorator.
#[derive(Debug)]
pub struct CompoundDecorator {
    region: RegionId,
    heading_region: RegionId,
    title: String,
    config: DecoratorConfig,
    disabled: DisabledButtons,
    expression: Option<String>,
    editor_options: Option<EditorOptions>,
    parameter_editor: Option<ParameterEditorOptions>,
    debug_hit: bool,
    layout: Option<DecoratorLayout>,
}

impl CompoundDecorator {
    /// Insert the decorator's regions under `parent` and register with `arbiter`.
    ///
    /// Returns `None` if `parent` no longer exists.
    pub fn mount(
        tree: &mut RegionTree,
        arbiter: &mut ActiveArbiter,
        parent: Option<RegionId>,
        config: DecoratorConfig,
    ) -> Option<Self> {
        let region = tree.insert(parent, RegionKind::Focusable, Rect::default())?;
        let heading_region = tree.insert(Some(region), RegionKind::Decoration, Rect::default())?;
        arbiter.register(region);

        #[cfg(feature = "tracing")]
        tracing::debug!(region = ?region, "decorator mounted");

        Some(Self {
            region,
            heading_region,
            title: "finally".to_string(),
            config,
            disabled: DisabledButtons::empty(),
            expression: None,
            editor_options: None,
            parameter_editor: None,
            debug_hit: false,
            layout: None,
        })
    }

    /// Remove the decorator's subtree and deregister everything in it.
    ///
    /// Returns the removed ids so the host can drop any hover tracking for them.
    pub fn unmount(self, tree: &mut RegionTree, arbiter: &mut ActiveArbiter) -> Vec<RegionId> {
        let removed = tree.remove(self.region);
        for &id in &removed {
            arbiter.deregister(id);
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(region = ?self.region, removed = removed.len(), "decorator unmounted");

        removed
    }

    /// Heading text.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    #[must_use]
    pub fn with_disabled(mut self, disabled: DisabledButtons) -> Self {
        self.disabled = disabled;
        self
    }

    /// Expression shown in (and edited from) the condition box.
    #[must_use]
    pub fn with_expression(mut self, expression: impl Into<String>) -> Self {
        self.expression = Some(expression.into());
        self
    }

    #[must_use]
    pub fn with_editor_options(mut self, options: EditorOptions) -> Self {
        self.editor_options = Some(options);
        self
    }

    /// Parameter (catch clause, loop variable) edited from the heading.
    #[must_use]
    pub fn with_parameter_editor_options(mut self, parameter: ParameterEditorOptions) -> Self {
        self.parameter_editor = Some(parameter);
        self
    }

    /// Flag the statement as the current debugger stop.
    pub fn set_debug_hit(&mut self, debug_hit: bool) {
        self.debug_hit = debug_hit;
        if let Some(layout) = &mut self.layout {
            layout.debug_hit = debug_hit;
        }
    }

    /// The decorator's focusable region.
    #[inline]
    pub fn region(&self) -> RegionId {
        self.region
    }

    #[inline]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[inline]
    pub fn config(&self) -> &DecoratorConfig {
        &self.config
    }

    /// Last computed layout.
    #[inline]
    pub fn current_layout(&self) -> Option<&DecoratorLayout> {
        self.layout.as_ref()
    }

    /// Recompute the layout and update the hover bounds in `tree`.
    pub fn layout(
        &mut self,
        tree: &mut RegionTree,
        bbox: Rect,
        statement_box: Rect,
        is_breakpoint: bool,
    ) -> &DecoratorLayout {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!(
            "decorator_layout",
            title = %self.title,
            x = bbox.x,
            y = bbox.y,
            w = bbox.width,
            h = bbox.height
        )
        .entered();

        let mut layout = DecoratorLayout::compute(&self.config, bbox, statement_box, is_breakpoint);
        layout.debug_hit = self.debug_hit;

        tree.set_bounds(self.region, layout.hover_bounds(bbox));
        tree.set_bounds(self.heading_region, layout.heading);

        self.layout.insert(layout)
    }

    /// Highlight state bound from the arbiter.
    #[inline]
    pub fn active_state(&self, arbiter: &ActiveArbiter) -> ActiveState {
        arbiter.active_state(self.region)
    }

    /// Whether the action box should be drawn.
    #[inline]
    pub fn is_action_box_visible(&self, arbiter: &ActiveArbiter) -> bool {
        ActionBox::is_visible(self.active_state(arbiter))
    }

    /// Action box for the current layout.
    pub fn action_box(&self, is_breakpoint: bool) -> Option<ActionBox> {
        self.layout.as_ref().map(|layout| {
            ActionBox::new(layout.action_box)
                .with_disabled(self.disabled)
                .with_breakpoint(is_breakpoint)
        })
    }

    /// Toggle the breakpoint. Returns whether the statement now has one.
    pub fn on_breakpoint_click<M>(&self, model: &mut M) -> Result<bool, DecoratorError>
    where
        M: StatementModel + ?Sized,
    {
        if model.is_breakpoint() {
            model.remove_breakpoint()?;
            Ok(false)
        } else {
            model.add_breakpoint()?;
            Ok(true)
        }
    }

    /// Delete the statement.
    pub fn on_delete<M>(&self, model: &mut M) -> Result<(), DecoratorError>
    where
        M: StatementModel + ?Sized,
    {
        model.remove()?;
        Ok(())
    }

    /// Show the statement in the source view.
    pub fn on_jump_to_source<M, N>(&self, navigator: &mut N, model: &M) -> Result<(), DecoratorError>
    where
        M: StatementModel + ?Sized,
        N: SourceNavigator<M> + ?Sized,
    {
        navigator.go_to_source(model)?;
        Ok(())
    }

    /// Open the expression editor over the condition box.
    ///
    /// Does nothing (and returns `false`) unless an expression, editor
    /// options, and a layout are all present.
    pub fn open_expression_editor<H>(&self, host: &mut H) -> bool
    where
        H: ExpressionEditorHost + ?Sized,
    {
        self.open_editor(host, self.expression.as_deref(), self.editor_options.as_ref())
    }

    /// Open the editor for the parameter set with
    /// [`with_parameter_editor_options`](Self::with_parameter_editor_options).
    ///
    /// Same anchor and preconditions as the expression editor; the value
    /// comes from the parameter options.
    pub fn open_parameter_editor<H>(&self, host: &mut H) -> bool
    where
        H: ExpressionEditorHost + ?Sized,
    {
        let parameter = self.parameter_editor.as_ref();
        self.open_editor(
            host,
            parameter.map(|p| p.value.as_str()),
            parameter.map(|p| &p.options),
        )
    }

    // An empty value counts as absent.
    fn open_editor<H>(&self, host: &mut H, value: Option<&str>, options: Option<&EditorOptions>) -> bool
    where
        H: ExpressionEditorHost + ?Sized,
    {
        let (Some(value), Some(options), Some(layout)) =
            (value.filter(|v| !v.is_empty()), options, &self.layout)
        else {
            return false;
        };
        host.open(layout.condition_box, value, options);
        true
    }

    /// Run an action-box button.
    pub fn handle_action<M, N>(
        &self,
        arbiter: &ActiveArbiter,
        action: Action,
        model: &mut M,
        navigator: &mut N,
    ) -> Result<(), DecoratorError>
    where
        M: StatementModel + ?Sized,
        N: SourceNavigator<M> + ?Sized,
    {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("decorator_action", action = ?action).entered();

        if !self.is_action_box_visible(arbiter) {
            return Err(DecoratorError::ActionBoxHidden);
        }
        if self.disabled.contains(action.disabled_flag()) {
            return Err(DecoratorError::ActionDisabled(action));
        }

        match action {
            Action::Delete => self.on_delete(model),
            Action::ToggleBreakpoint => self.on_breakpoint_click(model).map(|_| ()),
            Action::JumpToSource => self.on_jump_to_source(navigator, model),
        }
    }

    /// Route a click at `point` to the breakpoint marker or the action box.
    ///
    /// Returns the action that ran, or `None` if the click hit neither.
    pub fn click<M, N>(
        &self,
        arbiter: &ActiveArbiter,
        point: Point,
        model: &mut M,
        navigator: &mut N,
    ) -> Result<Option<Action>, DecoratorError>
    where
        M: StatementModel + ?Sized,
        N: SourceNavigator<M> + ?Sized,
    {
        let layout = self.layout.as_ref().ok_or(DecoratorError::NotLaidOut)?;

        if layout.breakpoint.is_some_and(|marker| marker.contains(point)) {
            self.on_breakpoint_click(model)?;
            return Ok(Some(Action::ToggleBreakpoint));
        }

        let Some(action_box) = self.action_box(model.is_breakpoint()) else {
            return Ok(None);
        };
        match action_box.hit(self.active_state(arbiter), point) {
            Some(action) => {
                self.handle_action(arbiter, action, model, navigator)?;
                Ok(Some(action))
            }
            None => Ok(None),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
