#![forbid(unsafe_code)]

//! Controller fixtures.
//!
//! [`hydrate_if`] and [`hydrate_if_else`] wire up a conditional controller
//! the way a compiled template would: one change set, one lifecycle, a host
//! element carrying a render-location marker, and a text-template factory
//! per branch. Tests drive the fixture through `bind` / [`IfFixture::run_attach`] /
//! value writes / `flush_changes` and read the result back from
//! [`IfFixture::host_text`].

use std::rc::Rc;

use trellis_runtime::changeset::ChangeSet;
use trellis_runtime::dom::RenderLocation;
use trellis_runtime::flags::LifecycleFlags;
use trellis_runtime::lifecycle::{Attachable, Lifecycle};
use trellis_runtime::scope::{BindingContext, Scope};
use trellis_runtime::templating::{Else, If};
use trellis_runtime::value::BoundValue;
use trellis_runtime::view::ViewFactory;

use crate::dom::{TestNode, TestRenderLocation};
use crate::template::TextTemplate;

/// A fully wired conditional controller and its collaborators.
pub struct IfFixture {
    /// The change set value writes queue on.
    pub change_set: Rc<ChangeSet>,
    /// The lifecycle coordinator behind every pass.
    pub lifecycle: Rc<Lifecycle>,
    /// The host element views mount into.
    pub host: Rc<TestNode>,
    /// The render location inside `host`.
    pub location: Rc<TestRenderLocation>,
    /// The controller under test.
    pub if_attr: Rc<If>,
}

impl IfFixture {
    /// Run one attach pass over the controller.
    pub fn run_attach(&self) {
        let pass =
            self.lifecycle
                .begin_attach(&self.change_set, None, LifecycleFlags::empty());
        pass.add(&(Rc::clone(&self.if_attr) as Rc<dyn Attachable>));
        pass.end();
    }

    /// Run one detach pass over the controller with `flags`.
    pub fn run_detach(&self, flags: LifecycleFlags) {
        let pass = self.lifecycle.begin_detach(&self.change_set, flags);
        pass.add(&(Rc::clone(&self.if_attr) as Rc<dyn Attachable>));
        pass.end();
    }

    /// Everything currently rendered in the host.
    #[must_use]
    pub fn host_text(&self) -> String {
        self.host.text_content()
    }
}

/// Wire up an [`If`] whose truthy branch renders the scope value at
/// `if_key`.
#[must_use]
pub fn hydrate_if(if_key: &str) -> IfFixture {
    let change_set = ChangeSet::new();
    let lifecycle = Lifecycle::new();
    let host = TestNode::element("div");
    let location = TestRenderLocation::in_host(&host);
    let if_factory = ViewFactory::new("if-view", TextTemplate::new(if_key), &lifecycle);
    let if_attr = If::new(
        &change_set,
        &if_factory,
        Rc::clone(&location) as Rc<dyn RenderLocation>,
    );
    IfFixture {
        change_set,
        lifecycle,
        host,
        location,
        if_attr,
    }
}

/// Wire up a linked [`If`]/[`Else`] pair; the falsy branch renders the
/// scope value at `else_key`.
#[must_use]
pub fn hydrate_if_else(if_key: &str, else_key: &str) -> (IfFixture, Rc<Else>) {
    let fixture = hydrate_if(if_key);
    let else_factory = ViewFactory::new(
        "else-view",
        TextTemplate::new(else_key),
        &fixture.lifecycle,
    );
    let else_attr = Else::new(&else_factory);
    else_attr.link(&fixture.if_attr);
    (fixture, else_attr)
}

/// A root scope over the given key/value pairs.
#[must_use]
pub fn item_scope<K, V>(values: impl IntoIterator<Item = (K, V)>) -> Rc<Scope>
where
    K: Into<String>,
    V: Into<BoundValue>,
{
    Scope::new(BindingContext::with_values(values))
}
