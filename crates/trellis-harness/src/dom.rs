#![forbid(unsafe_code)]

//! In-memory node tree standing in for the DOM.
//!
//! [`TestNode`] is a minimal tree node with parent/child links and text
//! content; [`TestNodeSequence`] and [`TestRenderLocation`] implement the
//! runtime's external collaborator traits on top of it. Assertions in
//! tests go through [`TestNode::text_content`], which mirrors how the DOM
//! flattens descendant text.
//!
//! # Invariants
//!
//! 1. A node has at most one parent; appending or inserting re-parents.
//! 2. `TestNodeSequence::remove` detaches its nodes but keeps them reusable
//!    for a later `insert_before` (the runtime contract).

use std::any::Any;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use trellis_runtime::dom::{NodeSequence, RenderLocation};

/// A node in the in-memory test tree.
pub struct TestNode {
    name: &'static str,
    text: RefCell<String>,
    children: RefCell<Vec<Rc<TestNode>>>,
    parent: RefCell<Weak<TestNode>>,
    weak_self: Weak<TestNode>,
}

impl TestNode {
    fn new(name: &'static str, text: &str) -> Rc<Self> {
        Rc::new_cyclic(|weak_self| Self {
            name,
            text: RefCell::new(text.to_owned()),
            children: RefCell::new(Vec::new()),
            parent: RefCell::new(Weak::new()),
            weak_self: weak_self.clone(),
        })
    }

    /// Create an element node.
    #[must_use]
    pub fn element(name: &'static str) -> Rc<Self> {
        Self::new(name, "")
    }

    /// Create a text node.
    #[must_use]
    pub fn text(content: &str) -> Rc<Self> {
        Self::new("#text", content)
    }

    /// Create a comment/marker node, the usual render-location anchor.
    #[must_use]
    pub fn marker() -> Rc<Self> {
        Self::new("#comment", "")
    }

    /// The node's tag name (`#text` / `#comment` for non-elements).
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The parent node, if attached.
    #[must_use]
    pub fn parent(&self) -> Option<Rc<TestNode>> {
        self.parent.borrow().upgrade()
    }

    /// Snapshot of the child list.
    #[must_use]
    pub fn children(&self) -> Vec<Rc<TestNode>> {
        self.children.borrow().clone()
    }

    /// Append `child` as the last child, re-parenting if necessary.
    pub fn append_child(&self, child: &Rc<TestNode>) {
        detach(child);
        self.children.borrow_mut().push(Rc::clone(child));
        *child.parent.borrow_mut() = self.weak_self.clone();
    }

    /// Insert `child` immediately before `reference` (appends when
    /// `reference` is not a child of this node).
    pub fn insert_before(&self, child: &Rc<TestNode>, reference: &Rc<TestNode>) {
        detach(child);
        let mut children = self.children.borrow_mut();
        let index = children
            .iter()
            .position(|c| Rc::ptr_eq(c, reference))
            .unwrap_or(children.len());
        children.insert(index, Rc::clone(child));
        drop(children);
        *child.parent.borrow_mut() = self.weak_self.clone();
    }

    /// Remove `child` from this node's child list.
    pub fn remove_child(&self, child: &Rc<TestNode>) {
        self.children.borrow_mut().retain(|c| !Rc::ptr_eq(c, child));
        *child.parent.borrow_mut() = Weak::new();
    }

    /// Replace this node's own text.
    pub fn set_text(&self, text: &str) {
        *self.text.borrow_mut() = text.to_owned();
    }

    /// Own text plus all descendant text, in tree order.
    #[must_use]
    pub fn text_content(&self) -> String {
        let mut out = self.text.borrow().clone();
        for child in self.children.borrow().iter() {
            out.push_str(&child.text_content());
        }
        out
    }

    /// The sibling immediately before this node, if any.
    #[must_use]
    pub fn previous_sibling(&self) -> Option<Rc<TestNode>> {
        let me = self.weak_self.upgrade()?;
        let parent = self.parent()?;
        let children = parent.children.borrow();
        let index = children.iter().position(|c| Rc::ptr_eq(c, &me))?;
        index.checked_sub(1).map(|i| Rc::clone(&children[i]))
    }
}

fn detach(node: &Rc<TestNode>) {
    if let Some(parent) = node.parent() {
        parent.remove_child(node);
    }
}

/// A marker node serving as the runtime's opaque insertion anchor.
pub struct TestRenderLocation {
    marker: Rc<TestNode>,
}

impl TestRenderLocation {
    /// Append a fresh marker to `host` and wrap it as a render location.
    #[must_use]
    pub fn in_host(host: &Rc<TestNode>) -> Rc<Self> {
        let marker = TestNode::marker();
        host.append_child(&marker);
        Rc::new(Self { marker })
    }

    /// The underlying marker node.
    #[must_use]
    pub fn marker(&self) -> &Rc<TestNode> {
        &self.marker
    }
}

impl RenderLocation for TestRenderLocation {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A movable fragment of [`TestNode`]s implementing the runtime's
/// [`NodeSequence`] contract.
pub struct TestNodeSequence {
    children: Vec<Rc<TestNode>>,
}

impl TestNodeSequence {
    /// Wrap `children` as a sequence.
    #[must_use]
    pub fn new(children: Vec<Rc<TestNode>>) -> Self {
        Self { children }
    }

    /// The sequence's nodes.
    #[must_use]
    pub fn children(&self) -> &[Rc<TestNode>] {
        &self.children
    }

    /// The first node, if the sequence is non-empty.
    #[must_use]
    pub fn first_child(&self) -> Option<&Rc<TestNode>> {
        self.children.first()
    }

    /// The last node, if the sequence is non-empty.
    #[must_use]
    pub fn last_child(&self) -> Option<&Rc<TestNode>> {
        self.children.last()
    }
}

impl NodeSequence for TestNodeSequence {
    fn insert_before(&self, location: &dyn RenderLocation) {
        let location = location
            .as_any()
            .downcast_ref::<TestRenderLocation>()
            .expect("TestNodeSequence mounts only at a TestRenderLocation");
        let parent = location
            .marker()
            .parent()
            .expect("render location marker must sit in a tree");
        for child in &self.children {
            parent.insert_before(child, location.marker());
        }
    }

    fn remove(&self) {
        for child in &self.children {
            if let Some(parent) = child.parent() {
                parent.remove_child(child);
            }
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
