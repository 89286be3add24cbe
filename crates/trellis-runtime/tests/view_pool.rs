//! View pooling exercised through the full mount path: real node sequences,
//! real passes, real DOM removal.

use std::rc::Rc;

use trellis_harness::{item_scope, TestNode, TestRenderLocation, TextTemplate};
use trellis_runtime::{
    Attachable, Bindable, CacheSize, ChangeSet, Lifecycle, LifecycleFlags, RenderLocation, State,
    ViewFactory,
};

struct PoolFixture {
    change_set: Rc<ChangeSet>,
    lifecycle: Rc<Lifecycle>,
    host: Rc<TestNode>,
    location: Rc<TestRenderLocation>,
    factory: Rc<ViewFactory>,
}

fn pool_fixture() -> PoolFixture {
    let change_set = ChangeSet::new();
    let lifecycle = Lifecycle::new();
    let host = TestNode::element("div");
    let location = TestRenderLocation::in_host(&host);
    let factory = ViewFactory::new("item", TextTemplate::new("msg"), &lifecycle);
    PoolFixture {
        change_set,
        lifecycle,
        host,
        location,
        factory,
    }
}

impl PoolFixture {
    fn show(&self, text: &str) -> Rc<trellis_runtime::View> {
        let view = self.factory.create();
        view.hold(Rc::clone(&self.location) as Rc<dyn RenderLocation>);
        view.bind(LifecycleFlags::FROM_BIND, &item_scope([("msg", text)]));
        let pass = self
            .lifecycle
            .begin_attach(&self.change_set, None, LifecycleFlags::empty());
        pass.add(&(Rc::clone(&view) as Rc<dyn Attachable>));
        pass.end();
        view
    }

    fn hide(&self, view: &Rc<trellis_runtime::View>) {
        let pass = self
            .lifecycle
            .begin_detach(&self.change_set, LifecycleFlags::empty());
        pass.add(&(Rc::clone(view) as Rc<dyn Attachable>));
        pass.end();
    }
}

#[test]
fn attached_release_returns_to_pool_at_unmount() {
    let f = pool_fixture();
    f.factory.set_cache_size(CacheSize::Unbounded, false);

    let view = f.show("hello");
    assert_eq!(f.host.text_content(), "hello");

    assert!(view.release(), "pool has room");
    assert_eq!(f.host.text_content(), "hello", "return waits for unmount");
    assert_eq!(f.factory.pooled(), 0);

    f.hide(&view);
    assert_eq!(f.host.text_content(), "");
    assert_eq!(f.factory.pooled(), 1);
    assert_eq!(view.state(), State::IS_CACHED);
    assert!(view.scope().is_none());
}

#[test]
fn reused_view_renders_its_new_scope() {
    let f = pool_fixture();
    f.factory.set_cache_size(CacheSize::Unbounded, false);

    let view = f.show("first");
    assert!(view.release());
    f.hide(&view);

    let reused = f.show("second");
    assert!(Rc::ptr_eq(&reused, &view), "pooled view is handed back out");
    assert_eq!(f.host.text_content(), "second");
}

#[test]
fn unpooled_factory_abandons_released_views() {
    let f = pool_fixture();
    // CacheSize::None is the default.

    let view = f.show("hello");
    assert!(!view.release());
    f.hide(&view);

    assert_eq!(f.factory.pooled(), 0);
    let fresh = f.show("again");
    assert!(!Rc::ptr_eq(&fresh, &view));
}

#[test]
fn markup_configured_capacity_bounds_the_pool() {
    let f = pool_fixture();
    let size: CacheSize = "1".parse().expect("valid cache size");
    f.factory.set_cache_size(size, true);

    let first = f.factory.create();
    let second = f.factory.create();
    assert!(first.release());
    assert!(!second.release(), "pool at capacity");
    assert_eq!(f.factory.pooled(), 1);
}
