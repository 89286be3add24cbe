#![forbid(unsafe_code)]

//! Test templates.
//!
//! [`TextTemplate`] is the fixture template used throughout the integration
//! suite: a single text node whose content is looked up from the bound scope
//! by key, cleared again on unbind. What the host's `text_content` shows is
//! therefore a direct readout of which branch is mounted and bound.

use std::rc::Rc;

use trellis_runtime::dom::NodeSequence;
use trellis_runtime::flags::LifecycleFlags;
use trellis_runtime::scope::Scope;
use trellis_runtime::view::ViewTemplate;

use crate::dom::{TestNode, TestNodeSequence};

/// Renders one text node from a scope key.
pub struct TextTemplate {
    key: String,
}

impl TextTemplate {
    /// Create a template reading `key` from the bound scope.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Rc<Self> {
        Rc::new(Self { key: key.into() })
    }

    fn text_node(nodes: &Rc<dyn NodeSequence>) -> Rc<TestNode> {
        let seq = nodes
            .as_any()
            .downcast_ref::<TestNodeSequence>()
            .expect("TextTemplate binds only TestNodeSequence nodes");
        Rc::clone(seq.first_child().expect("sequence holds one text node"))
    }
}

impl ViewTemplate for TextTemplate {
    fn create_nodes(&self) -> Rc<dyn NodeSequence> {
        Rc::new(TestNodeSequence::new(vec![TestNode::text("")]))
    }

    fn bind_nodes(&self, nodes: &Rc<dyn NodeSequence>, scope: &Rc<Scope>, _flags: LifecycleFlags) {
        let text = scope
            .lookup(&self.key)
            .map(|value| value.to_string())
            .unwrap_or_default();
        Self::text_node(nodes).set_text(&text);
    }

    fn unbind_nodes(&self, nodes: &Rc<dyn NodeSequence>, _flags: LifecycleFlags) {
        Self::text_node(nodes).set_text("");
    }
}
