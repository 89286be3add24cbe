//! End-to-end behavior of the conditional controller pair, driven through
//! the harness DOM.
//!
//! The fixtures render `yes`/`no` scope keys in the truthy/falsy branch so
//! the host's text content is a direct readout of which branch is mounted.

use std::rc::Rc;

use trellis_harness::{hydrate_if, hydrate_if_else, item_scope, IfFixture, TestNodeSequence};
use trellis_runtime::{Bindable, BoundValue, LifecycleFlags, Scope, State};

fn bound_attached(fixture: &IfFixture, scope: &Rc<Scope>) {
    fixture.if_attr.bind(LifecycleFlags::FROM_BIND, scope);
    fixture.run_attach();
}

#[test]
fn renders_truthy_branch_when_bound_and_attached() {
    let (fixture, _else_attr) = hydrate_if_else("yes", "no");
    let scope = item_scope([("yes", "if-content"), ("no", "else-content")]);

    fixture.if_attr.set_value(true, LifecycleFlags::empty());
    bound_attached(&fixture, &scope);

    assert_eq!(fixture.host_text(), "if-content");
    let view = fixture.if_attr.current_view().expect("truthy branch view");
    assert!(view.state().contains(State::IS_BOUND | State::IS_ATTACHED | State::IS_MOUNTED));

    let nodes = view
        .nodes()
        .as_any()
        .downcast_ref::<TestNodeSequence>()
        .expect("harness node sequence");
    let last = nodes.last_child().expect("rendered nodes");
    assert!(
        fixture
            .location
            .marker()
            .previous_sibling()
            .is_some_and(|sibling| Rc::ptr_eq(&sibling, last)),
        "view nodes sit immediately before the render location"
    );
}

#[test]
fn renders_falsy_branch_when_bound_falsy() {
    let (fixture, _else_attr) = hydrate_if_else("yes", "no");
    let scope = item_scope([("yes", "if-content"), ("no", "else-content")]);

    fixture.if_attr.set_value(false, LifecycleFlags::empty());
    bound_attached(&fixture, &scope);

    assert_eq!(fixture.host_text(), "else-content");
    assert!(fixture.if_attr.if_view().is_none(), "truthy branch stays uninstantiated");
}

#[test]
fn falsy_without_linked_else_empties_host() {
    let fixture = hydrate_if("yes");
    let scope = item_scope([("yes", "if-content")]);

    fixture.if_attr.set_value(true, LifecycleFlags::empty());
    bound_attached(&fixture, &scope);
    assert_eq!(fixture.host_text(), "if-content");

    fixture.if_attr.set_value(false, LifecycleFlags::empty());
    fixture.change_set.flush_changes();

    assert_eq!(fixture.host_text(), "");
    assert!(fixture.if_attr.current_view().is_none());
}

#[test]
fn value_change_is_deferred_until_flush() {
    let (fixture, _else_attr) = hydrate_if_else("yes", "no");
    let scope = item_scope([("yes", "Y"), ("no", "N")]);

    fixture.if_attr.set_value(true, LifecycleFlags::empty());
    bound_attached(&fixture, &scope);

    fixture.if_attr.set_value(false, LifecycleFlags::empty());
    assert_eq!(fixture.host_text(), "Y", "no synchronous DOM mutation");
    assert_eq!(fixture.change_set.size(), 1);

    fixture.change_set.flush_changes();
    assert_eq!(fixture.host_text(), "N");
    assert_eq!(fixture.change_set.size(), 0);
}

#[test]
fn toggles_between_flushes_coalesce_into_one_swap() {
    let (fixture, _else_attr) = hydrate_if_else("yes", "no");
    let scope = item_scope([("yes", "Y"), ("no", "N")]);

    fixture.if_attr.set_value(true, LifecycleFlags::empty());
    bound_attached(&fixture, &scope);
    let original = fixture.if_attr.if_view().expect("truthy branch view");

    fixture.if_attr.set_value(false, LifecycleFlags::empty());
    fixture.if_attr.set_value(true, LifecycleFlags::empty());
    assert_eq!(fixture.change_set.size(), 1, "coalesced by controller identity");

    fixture.change_set.flush_changes();
    assert_eq!(fixture.host_text(), "Y");
    let after = fixture.if_attr.if_view().expect("truthy branch view");
    assert!(Rc::ptr_eq(&original, &after), "branch view identity is stable");
}

#[test]
fn write_during_flush_applies_immediately() {
    let (fixture, _else_attr) = hydrate_if_else("yes", "no");
    let scope = item_scope([("yes", "Y"), ("no", "N")]);

    fixture.if_attr.set_value(true, LifecycleFlags::empty());
    bound_attached(&fixture, &scope);

    fixture
        .if_attr
        .set_value(false, LifecycleFlags::FROM_FLUSH_CHANGES);
    assert_eq!(fixture.host_text(), "N", "in-flush writes swap synchronously");
    assert_eq!(fixture.change_set.size(), 0);
}

#[test]
fn writes_before_bind_only_store_the_value() {
    let fixture = hydrate_if("yes");

    fixture.if_attr.set_value(true, LifecycleFlags::empty());

    assert_eq!(fixture.change_set.size(), 0, "no reaction queued while unbound");
    assert!(fixture.if_attr.if_view().is_none());
    assert_eq!(fixture.if_attr.value(), BoundValue::Bool(true));
}

#[test]
fn detach_with_unbind_chain_tears_the_view_down() {
    let (fixture, _else_attr) = hydrate_if_else("yes", "no");
    let scope = item_scope([("yes", "Y"), ("no", "N")]);

    fixture.if_attr.set_value(true, LifecycleFlags::empty());
    bound_attached(&fixture, &scope);
    let view = fixture.if_attr.current_view().expect("current view");

    fixture.run_detach(LifecycleFlags::UNBIND_AFTER_DETACHED);

    assert_eq!(fixture.host_text(), "");
    assert!(!fixture.if_attr.state().contains(State::IS_ATTACHED));
    assert!(!fixture.if_attr.state().contains(State::IS_BOUND));
    assert!(!view.state().contains(State::IS_MOUNTED));
    assert!(!view.state().contains(State::IS_BOUND));

    // A redundant unbind after the chain is a safe no-op.
    fixture.if_attr.unbind(LifecycleFlags::FROM_UNBIND);
    assert!(!fixture.if_attr.state().contains(State::IS_BOUND));
}

#[test]
fn plain_detach_keeps_the_controller_bound() {
    let (fixture, _else_attr) = hydrate_if_else("yes", "no");
    let scope = item_scope([("yes", "Y"), ("no", "N")]);

    fixture.if_attr.set_value(true, LifecycleFlags::empty());
    bound_attached(&fixture, &scope);

    fixture.run_detach(LifecycleFlags::empty());

    assert_eq!(fixture.host_text(), "");
    assert!(fixture.if_attr.state().contains(State::IS_BOUND));
    let view = fixture.if_attr.current_view().expect("current view");
    assert!(view.state().contains(State::IS_BOUND), "bind survives a plain detach");
}

#[test]
fn reattach_after_detach_restores_the_view() {
    let (fixture, _else_attr) = hydrate_if_else("yes", "no");
    let scope = item_scope([("yes", "Y"), ("no", "N")]);

    fixture.if_attr.set_value(true, LifecycleFlags::empty());
    bound_attached(&fixture, &scope);
    fixture.run_detach(LifecycleFlags::empty());
    assert_eq!(fixture.host_text(), "");

    fixture.run_attach();
    assert_eq!(fixture.host_text(), "Y");
}

#[test]
fn rebinding_the_same_scope_is_a_noop() {
    let (fixture, _else_attr) = hydrate_if_else("yes", "no");
    let scope = item_scope([("yes", "Y"), ("no", "N")]);

    fixture.if_attr.set_value(true, LifecycleFlags::empty());
    bound_attached(&fixture, &scope);
    let view = fixture.if_attr.current_view().expect("current view");

    fixture.if_attr.bind(LifecycleFlags::FROM_BIND, &scope);

    assert_eq!(fixture.host_text(), "Y");
    let after = fixture.if_attr.current_view().expect("current view");
    assert!(Rc::ptr_eq(&view, &after));
}

#[test]
fn rebinding_a_new_scope_refreshes_rendered_content() {
    let (fixture, _else_attr) = hydrate_if_else("yes", "no");
    let first = item_scope([("yes", "first"), ("no", "N")]);
    let second = item_scope([("yes", "second"), ("no", "N")]);

    fixture.if_attr.set_value(true, LifecycleFlags::empty());
    bound_attached(&fixture, &first);
    assert_eq!(fixture.host_text(), "first");

    fixture.if_attr.bind(LifecycleFlags::FROM_BIND, &second);
    assert_eq!(fixture.host_text(), "second");
}

#[test]
fn unbinding_a_never_bound_controller_is_a_noop() {
    let fixture = hydrate_if("yes");
    fixture.if_attr.unbind(LifecycleFlags::FROM_UNBIND);
    assert_eq!(fixture.if_attr.state(), State::empty());
}

#[test]
fn else_link_records_the_primary() {
    let (fixture, else_attr) = hydrate_if_else("yes", "no");
    let primary = else_attr.primary().expect("linked primary");
    assert!(Rc::ptr_eq(&primary, &fixture.if_attr));
}

#[test]
fn truthiness_selects_the_branch_for_every_value_kind() {
    let cases: Vec<(BoundValue, bool)> = vec![
        (BoundValue::Bool(true), true),
        (BoundValue::Bool(false), false),
        (BoundValue::Num(1.0), true),
        (BoundValue::Num(-1.0), true),
        (BoundValue::Num(0.0), false),
        (BoundValue::Num(f64::NAN), false),
        (BoundValue::from("text"), true),
        (BoundValue::from("0"), true),
        (BoundValue::from("false"), true),
        (BoundValue::from(""), false),
        (BoundValue::obj(Rc::new(())), true),
        (BoundValue::Sym(7), true),
        (BoundValue::Null, false),
        (BoundValue::Undefined, false),
    ];

    for (value, truthy) in cases {
        let (fixture, _else_attr) = hydrate_if_else("yes", "no");
        let scope = item_scope([("yes", "Y"), ("no", "N")]);

        fixture.if_attr.set_value(value.clone(), LifecycleFlags::empty());
        bound_attached(&fixture, &scope);

        let expected = if truthy { "Y" } else { "N" };
        assert_eq!(fixture.host_text(), expected, "value {value:?}");
    }
}
