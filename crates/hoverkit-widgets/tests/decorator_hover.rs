//! End-to-end hover behaviour of nested compound decorators.
//!
//! Pointer positions go through the router, the arbiter decides, and the
//! decorators read the result back.

use std::time::{Duration, Instant};

use hoverkit_core::arbiter::{ActiveArbiter, ActiveState};
use hoverkit_core::geometry::{Point, Rect};
use hoverkit_core::hover_router::{HoverRouter, RouteDecision};
use hoverkit_core::region::RegionTree;
use hoverkit_widgets::{
    Action, CompoundDecorator, DecoratorConfig, ModelError, SourceNavigator, StatementModel,
};

const OUTER_BOX: Rect = Rect::new(100.0, 100.0, 400.0, 300.0);
const INNER_BOX: Rect = Rect::new(150.0, 200.0, 200.0, 100.0);

const ON_OUTER: Point = Point::new(400.0, 150.0);
const ON_INNER: Point = Point::new(200.0, 250.0);

// Outer action box is (55, 125, 90, 18); its Delete button starts left of the outer box.
const ON_OUTER_DELETE: Point = Point::new(60.0, 130.0);
// Inner action box is (105, 225, 90, 18).
const ON_INNER_DELETE: Point = Point::new(110.0, 230.0);

#[derive(Debug, Default)]
struct Statement {
    breakpoint: bool,
    removed: bool,
}

impl StatementModel for Statement {
    fn is_breakpoint(&self) -> bool {
        self.breakpoint
    }

    fn add_breakpoint(&mut self) -> Result<(), ModelError> {
        self.breakpoint = true;
        Ok(())
    }

    fn remove_breakpoint(&mut self) -> Result<(), ModelError> {
        self.breakpoint = false;
        Ok(())
    }

    fn remove(&mut self) -> Result<(), ModelError> {
        self.removed = true;
        Ok(())
    }
}

struct NoNavigation;

impl SourceNavigator<Statement> for NoNavigation {
    fn go_to_source(&mut self, _model: &Statement) -> Result<(), ModelError> {
        Ok(())
    }
}

struct Diagram {
    tree: RegionTree,
    arbiter: ActiveArbiter,
    router: HoverRouter,
    outer: CompoundDecorator,
    inner: CompoundDecorator,
}

fn diagram() -> Diagram {
    let mut tree = RegionTree::new();
    let mut arbiter = ActiveArbiter::default();
    let mut outer =
        CompoundDecorator::mount(&mut tree, &mut arbiter, None, DecoratorConfig::default())
            .expect("mount outer");
    let mut inner = CompoundDecorator::mount(
        &mut tree,
        &mut arbiter,
        Some(outer.region()),
        DecoratorConfig::default(),
    )
    .expect("mount inner");
    outer.layout(&mut tree, OUTER_BOX, OUTER_BOX, false);
    inner.layout(&mut tree, INNER_BOX, INNER_BOX, false);
    Diagram {
        tree,
        arbiter,
        router: HoverRouter::new(),
        outer,
        inner,
    }
}

impl Diagram {
    fn move_to(&mut self, point: Option<Point>, now: Instant) -> Vec<RouteDecision> {
        self.router
            .pointer_moved(&self.tree, &mut self.arbiter, point, now)
    }
}

#[test]
fn entering_outer_activates_immediately() {
    let mut d = diagram();
    let t0 = Instant::now();

    let decisions = d.move_to(Some(ON_OUTER), t0);
    assert_eq!(decisions, vec![RouteDecision::Activate(d.outer.region())]);
    assert!(d.outer.is_action_box_visible(&d.arbiter));
    assert!(!d.inner.is_action_box_visible(&d.arbiter));
}

#[test]
fn parent_to_child_switches_immediately() {
    let mut d = diagram();
    let t0 = Instant::now();

    d.move_to(Some(ON_OUTER), t0);
    let decisions = d.move_to(Some(ON_INNER), t0);
    assert_eq!(
        decisions,
        vec![
            RouteDecision::Ignored,
            RouteDecision::Activate(d.inner.region()),
        ]
    );
    assert_eq!(d.arbiter.active(), Some(d.inner.region()));
    assert_eq!(d.outer.active_state(&d.arbiter), ActiveState::Hidden);
}

#[test]
fn child_to_parent_is_delayed() {
    let mut d = diagram();
    let t0 = Instant::now();
    let delay = d.arbiter.config().activation_delay;

    d.move_to(Some(ON_INNER), t0);
    let decisions = d.move_to(Some(ON_OUTER), t0);
    assert_eq!(
        decisions,
        vec![
            RouteDecision::Deactivate(d.inner.region()),
            RouteDecision::DelayedActivate(d.outer.region()),
        ]
    );

    // The child keeps the highlight until the delay runs out.
    assert_eq!(d.inner.active_state(&d.arbiter), ActiveState::Active);
    assert_eq!(d.outer.active_state(&d.arbiter), ActiveState::PendingActive);
    assert!(!d.outer.is_action_box_visible(&d.arbiter));

    d.arbiter.tick(t0 + delay);
    assert_eq!(d.arbiter.active(), Some(d.outer.region()));
    assert!(!d.inner.is_action_box_visible(&d.arbiter));
}

#[test]
fn brief_excursion_to_parent_does_not_flicker() {
    let mut d = diagram();
    let t0 = Instant::now();
    let delay = d.arbiter.config().activation_delay;

    d.move_to(Some(ON_INNER), t0);
    let activations = d.arbiter.activation_count();

    d.move_to(Some(ON_OUTER), t0);
    d.arbiter.tick(t0 + delay / 2);
    d.move_to(Some(ON_INNER), t0 + delay / 2);

    assert_eq!(d.arbiter.active(), Some(d.inner.region()));
    assert_eq!(d.outer.active_state(&d.arbiter), ActiveState::Hidden);
    assert!(d.arbiter.pending().is_none());

    d.arbiter.tick(t0 + delay * 3);
    assert_eq!(d.arbiter.active(), Some(d.inner.region()));
    // The outer block never took the highlight in between.
    assert_eq!(d.arbiter.activation_count(), activations);
}

#[test]
fn leaving_the_diagram_hides_after_delay() {
    let mut d = diagram();
    let t0 = Instant::now();
    let delay = d.arbiter.config().activation_delay;

    d.move_to(Some(ON_INNER), t0);
    let decisions = d.move_to(None, t0);
    assert_eq!(decisions, vec![RouteDecision::Deactivate(d.inner.region())]);
    assert!(d.inner.is_action_box_visible(&d.arbiter));

    d.arbiter.tick(t0 + delay - Duration::from_millis(1));
    assert_eq!(d.inner.active_state(&d.arbiter), ActiveState::PendingHidden);

    d.arbiter.tick(t0 + delay);
    assert_eq!(d.arbiter.active(), None);
    assert!(!d.inner.is_action_box_visible(&d.arbiter));
}

#[test]
fn unmounting_active_child_clears_highlight() {
    let mut d = diagram();
    let t0 = Instant::now();

    d.move_to(Some(ON_INNER), t0);
    let inner_region = d.inner.region();
    let removed = d.inner.unmount(&mut d.tree, &mut d.arbiter);
    for id in removed {
        d.router.forget(id);
    }

    assert_eq!(d.arbiter.active(), None);
    assert!(!d.arbiter.is_registered(inner_region));
    assert_eq!(d.router.hovered(), None);

    // The old child area now belongs to the outer block.
    let decisions = d
        .router
        .pointer_moved(&d.tree, &mut d.arbiter, Some(ON_INNER), t0);
    assert_eq!(decisions, vec![RouteDecision::Activate(d.outer.region())]);
}

#[test]
fn pointer_can_reach_action_box_buttons() {
    let mut d = diagram();
    let t0 = Instant::now();
    let delay = d.arbiter.config().activation_delay;

    d.move_to(Some(ON_OUTER), t0);
    // Moving onto the Delete button stays inside the decorator.
    assert_eq!(d.move_to(Some(ON_OUTER_DELETE), t0), vec![]);
    d.arbiter.tick(t0 + delay * 2);
    assert!(d.outer.is_action_box_visible(&d.arbiter));

    let mut statement = Statement::default();
    assert_eq!(
        d.outer
            .click(&d.arbiter, ON_OUTER_DELETE, &mut statement, &mut NoNavigation),
        Ok(Some(Action::Delete))
    );
    assert!(statement.removed);
}

#[test]
fn nested_action_box_stays_with_child() {
    let mut d = diagram();
    let t0 = Instant::now();
    let delay = d.arbiter.config().activation_delay;

    d.move_to(Some(ON_INNER), t0);
    assert_eq!(d.move_to(Some(ON_INNER_DELETE), t0), vec![]);
    d.arbiter.tick(t0 + delay * 2);
    assert_eq!(d.arbiter.active(), Some(d.inner.region()));

    let mut statement = Statement::default();
    assert_eq!(
        d.inner
            .click(&d.arbiter, ON_INNER_DELETE, &mut statement, &mut NoNavigation),
        Ok(Some(Action::Delete))
    );
    assert!(statement.removed);
}
