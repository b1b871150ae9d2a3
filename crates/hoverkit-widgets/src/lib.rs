#![forbid(unsafe_code)]

//! Statement decorators for visual program diagrams.
//!
//! Everything here reads its highlight state from a
//! [`hoverkit_core::arbiter::ActiveArbiter`] and never owns it.

pub mod action_box;
pub mod breakpoint;
pub mod decorator;

pub use action_box::{Action, ActionBox, DisabledButtons};
pub use breakpoint::{BREAKPOINT_SIZE, BreakpointIndicator};
pub use decorator::{
    CompoundDecorator, DecoratorConfig, DecoratorError, DecoratorLayout, EditorOptions,
    ExpressionEditorHost, ModelError, ParameterEditorOptions, SourceNavigator, StatementModel,
};
