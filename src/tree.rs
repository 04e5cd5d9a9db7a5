//! The retained node tree that views are attached into.
//!
//! Nodes are named and form a single document rooted at [`NodeTree::root`]. Detached subtrees
//! may exist alongside the document (e.g. a freshly instantiated template) until they are either
//! attached or discarded.
//!
//! Structural changes take effect immediately, but observers are not called back directly:
//! when an observed node becomes connected to (or disconnected from) the document root, a
//! [`Notification`] is queued and handed out later by [`NodeTree::notifications`].

use crossbeam::channel::{self, Receiver, Sender};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// A unique identifier for a node.
///
/// (this is just a UUID)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(Uuid);

impl NodeId {
    pub(crate) fn new() -> NodeId {
        NodeId(Uuid::new_v4())
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single element in a template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Element {
    /// The element name. Unnamed elements can’t be looked up.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Element {
        Element {
            name: name.into(),
            children: Vec::new(),
        }
    }

    /// Appends a child element.
    pub fn child(mut self, child: Element) -> Element {
        self.children.push(child);
        self
    }
}

/// Content that can be cloned into the tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Template {
    /// Top-level elements, in order.
    #[serde(default)]
    pub elements: Vec<Element>,
}

impl Template {
    pub fn new() -> Template {
        Template::default()
    }

    /// Appends a top-level element.
    pub fn element(mut self, element: Element) -> Template {
        self.elements.push(element);
        self
    }

    /// Returns the names of all named elements, in pre-order.
    pub fn named_elements(&self) -> Vec<String> {
        fn collect(element: &Element, names: &mut Vec<String>) {
            if !element.name.is_empty() {
                names.push(element.name.clone());
            }
            for child in &element.children {
                collect(child, names);
            }
        }

        let mut names = Vec::new();
        for element in &self.elements {
            collect(element, &mut names);
        }
        names
    }
}

/// Opaque value handed back with every notification for an observed node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverToken(pub usize);

/// A deferred attach/detach notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notification {
    /// The node was connected to the document root.
    Attached { node: NodeId, token: ObserverToken },
    /// The node was disconnected from the document root.
    Detached { node: NodeId, token: ObserverToken },
}

impl Notification {
    pub fn node(&self) -> NodeId {
        match *self {
            Notification::Attached { node, .. } | Notification::Detached { node, .. } => node,
        }
    }
}

/// Errors that may occur when mutating the tree.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TreeError {
    #[error("no such node: {0}")]
    NoSuchNode(NodeId),
    #[error("node {0} already has a parent")]
    AlreadyAttached(NodeId),
    #[error("node {child} is not a child of {parent}")]
    NotAChild { parent: NodeId, child: NodeId },
    #[error("attaching node {0} would create a cycle")]
    Cycle(NodeId),
}

#[derive(Debug)]
struct Node {
    name: String,
    parent: Option<NodeId>,
    /// An ordered list of all children.
    children: Vec<NodeId>,
    observer: Option<ObserverToken>,
}

impl Node {
    fn new(name: String) -> Node {
        Node {
            name,
            parent: None,
            children: Vec::new(),
            observer: None,
        }
    }
}

/// A tree of named nodes.
#[derive(Debug)]
pub struct NodeTree {
    nodes: HashMap<NodeId, Node>,
    root: NodeId,
    notify_send: Sender<Notification>,
    notify_recv: Receiver<Notification>,
    /// Nodes detached by `clear_children`, freed by `collect_garbage`.
    garbage: Vec<NodeId>,
}

impl NodeTree {
    /// Creates a tree whose document root holds a clone of the given template.
    ///
    /// The root node itself is unnamed.
    pub fn new(document: &Template) -> NodeTree {
        let (notify_send, notify_recv) = channel::unbounded();
        let root = NodeId::new();
        let mut nodes = HashMap::new();
        nodes.insert(root, Node::new(String::new()));

        let mut tree = NodeTree {
            nodes,
            root,
            notify_send,
            notify_recv,
            garbage: Vec::new(),
        };
        for element in &document.elements {
            tree.clone_element(element, root);
        }
        tree
    }

    /// The document root.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes, including detached ones.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: the root node can’t be removed.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.nodes.get(&id).map(|node| node.name.as_str())
    }

    pub fn set_name(&mut self, id: NodeId, name: impl Into<String>) -> Result<(), TreeError> {
        let node = self.nodes.get_mut(&id).ok_or(TreeError::NoSuchNode(id))?;
        node.name = name.into();
        Ok(())
    }

    /// Returns the parent; `None` for the root, detached nodes and nonexistent nodes.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id).and_then(|node| node.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(&id)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    /// Returns true if the node is the root or a descendant of it.
    pub fn is_connected(&self, id: NodeId) -> bool {
        self.is_ancestor_or_self(self.root, id)
    }

    /// Clones a template into a new detached, unnamed wrapper node and returns the wrapper.
    pub fn instantiate(&mut self, template: &Template) -> NodeId {
        let wrapper = NodeId::new();
        self.nodes.insert(wrapper, Node::new(String::new()));
        for element in &template.elements {
            self.clone_element(element, wrapper);
        }
        wrapper
    }

    /// Finds the first node with the given name, searching `from` and its descendants in
    /// pre-order.
    pub fn query_by_name(&self, from: NodeId, name: &str) -> Option<NodeId> {
        if name.is_empty() {
            return None;
        }
        let node = self.nodes.get(&from)?;
        if node.name == name {
            return Some(from);
        }
        node.children
            .iter()
            .find_map(|child| self.query_by_name(*child, name))
    }

    /// Registers an observer on a node, replacing any previous one.
    pub fn observe(&mut self, id: NodeId, token: ObserverToken) -> Result<(), TreeError> {
        let node = self.nodes.get_mut(&id).ok_or(TreeError::NoSuchNode(id))?;
        node.observer = Some(token);
        Ok(())
    }

    /// Appends a detached node to a parent’s children.
    ///
    /// If the parent is connected, attach notifications are queued for every observed node in
    /// the attached subtree.
    pub fn attach(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        if !self.nodes.contains_key(&parent) {
            return Err(TreeError::NoSuchNode(parent));
        }
        match self.nodes.get(&child) {
            None => return Err(TreeError::NoSuchNode(child)),
            Some(node) if node.parent.is_some() || child == self.root => {
                return Err(TreeError::AlreadyAttached(child));
            }
            Some(_) => (),
        }
        if self.is_ancestor_or_self(child, parent) {
            return Err(TreeError::Cycle(child));
        }

        if let Some(node) = self.nodes.get_mut(&child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.nodes.get_mut(&parent) {
            node.children.push(child);
        }

        if self.is_connected(parent) {
            self.notify_subtree(child, true);
        }
        Ok(())
    }

    /// Removes a node from its parent’s children. The node stays in the tree, detached.
    ///
    /// If the parent was connected, detach notifications are queued for every observed node in
    /// the detached subtree.
    pub fn detach(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        let was_connected = self.is_connected(parent);
        let parent_node = self
            .nodes
            .get_mut(&parent)
            .ok_or(TreeError::NoSuchNode(parent))?;
        let pos = parent_node
            .children
            .iter()
            .position(|id| *id == child)
            .ok_or(TreeError::NotAChild { parent, child })?;
        parent_node.children.remove(pos);

        if let Some(node) = self.nodes.get_mut(&child) {
            node.parent = None;
        }

        if was_connected {
            self.notify_subtree(child, false);
        }
        Ok(())
    }

    /// Detaches all children of a node.
    ///
    /// The children stay readable until the next [`collect_garbage`](NodeTree::collect_garbage),
    /// so observers can still look at them when their detach notifications are handled.
    pub fn clear_children(&mut self, id: NodeId) -> Result<(), TreeError> {
        let children = self
            .nodes
            .get(&id)
            .ok_or(TreeError::NoSuchNode(id))?
            .children
            .clone();
        for child in children {
            self.detach(id, child)?;
            self.garbage.push(child);
        }
        Ok(())
    }

    /// Discards the nodes detached by `clear_children` that haven’t been attached again.
    ///
    /// Returns the number of subtrees removed.
    pub fn collect_garbage(&mut self) -> usize {
        let garbage = std::mem::take(&mut self.garbage);
        garbage.into_iter().filter(|id| self.discard(*id)).count()
    }

    /// Removes a detached node and all of its descendants from the tree.
    ///
    /// Returns false if the node doesn’t exist or is still attached.
    pub fn discard(&mut self, id: NodeId) -> bool {
        match self.nodes.get(&id) {
            Some(node) if node.parent.is_none() && id != self.root => (),
            _ => return false,
        }
        self.remove_subtree(id);
        true
    }

    /// Returns all pending notifications, in the order they were queued.
    ///
    /// Does not drain the queue immediately.
    /// Calling `next` will always remove a notification from the queue.
    pub fn notifications(&mut self) -> impl Iterator<Item = Notification> + '_ {
        self.notify_recv.try_iter()
    }

    pub fn has_pending_notifications(&self) -> bool {
        !self.notify_recv.is_empty()
    }

    fn clone_element(&mut self, element: &Element, parent: NodeId) -> NodeId {
        let id = NodeId::new();
        let mut node = Node::new(element.name.clone());
        node.parent = Some(parent);
        self.nodes.insert(id, node);
        if let Some(parent_node) = self.nodes.get_mut(&parent) {
            parent_node.children.push(id);
        }
        for child in &element.children {
            self.clone_element(child, id);
        }
        id
    }

    fn is_ancestor_or_self(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    fn remove_subtree(&mut self, id: NodeId) {
        if let Some(node) = self.nodes.remove(&id) {
            for child in node.children {
                self.remove_subtree(child);
            }
        }
    }

    fn notify_subtree(&self, id: NodeId, attached: bool) {
        let node = match self.nodes.get(&id) {
            Some(node) => node,
            None => return,
        };
        if let Some(token) = node.observer {
            let notification = if attached {
                Notification::Attached { node: id, token }
            } else {
                Notification::Detached { node: id, token }
            };
            // the receiving end is owned by the tree, so this can’t be disconnected
            let _ = self.notify_send.send(notification);
        }
        for child in &node.children {
            self.notify_subtree(*child, attached);
        }
    }
}

#[cfg(test)]
fn document() -> Template {
    Template::new().element(
        Element::new("root")
            .child(Element::new("header"))
            .child(Element::new("body").child(Element::new("panel"))),
    )
}

#[test]
fn test_query_by_name() {
    let tree = NodeTree::new(&document());
    let root = tree.root();

    let panel = tree.query_by_name(root, "panel").expect("panel should exist");
    assert_eq!(tree.name(panel), Some("panel"));
    let body = tree.parent(panel).expect("panel should have a parent");
    assert_eq!(tree.name(body), Some("body"));

    let named_root = tree.query_by_name(root, "root").expect("root element should exist");
    assert_eq!(tree.query_by_name(named_root, "root"), Some(named_root), "includes itself");
    assert_eq!(tree.query_by_name(root, "missing"), None);
    assert_eq!(tree.query_by_name(root, ""), None, "unnamed nodes can’t be queried");
    assert_eq!(tree.len(), 5);
}

#[test]
fn test_instantiate_is_detached() {
    let mut tree = NodeTree::new(&document());
    let template = Template::new().element(Element::new("content"));
    let wrapper = tree.instantiate(&template);

    assert_eq!(tree.parent(wrapper), None);
    assert!(!tree.is_connected(wrapper));
    assert_eq!(tree.children(wrapper).len(), 1);
    assert_eq!(
        tree.query_by_name(tree.root(), "content"),
        None,
        "detached content shouldn’t be found from the root"
    );
    assert!(!tree.has_pending_notifications());
}

#[test]
fn test_attach_detach_notifications() {
    let mut tree = NodeTree::new(&document());
    let panel = tree.query_by_name(tree.root(), "panel").unwrap();

    let template = Template::new().element(Element::new("content"));
    let wrapper = tree.instantiate(&template);
    tree.observe(wrapper, ObserverToken(7)).unwrap();
    tree.attach(panel, wrapper).unwrap();

    assert!(tree.is_connected(wrapper));
    let notifications: Vec<_> = tree.notifications().collect();
    assert_eq!(
        notifications,
        vec![Notification::Attached {
            node: wrapper,
            token: ObserverToken(7)
        }]
    );

    tree.detach(panel, wrapper).unwrap();
    assert!(tree.contains(wrapper), "detached nodes stay until discarded");
    let notifications: Vec<_> = tree.notifications().collect();
    assert_eq!(
        notifications,
        vec![Notification::Detached {
            node: wrapper,
            token: ObserverToken(7)
        }]
    );

    assert!(tree.discard(wrapper));
    assert!(!tree.contains(wrapper));
    assert_eq!(tree.len(), 5);
}

#[test]
fn test_attach_under_detached_parent_defers_notification() {
    let mut tree = NodeTree::new(&document());
    let outer = tree.instantiate(&Template::new());
    let inner = tree.instantiate(&Template::new());
    tree.observe(inner, ObserverToken(1)).unwrap();

    tree.attach(outer, inner).unwrap();
    assert!(!tree.has_pending_notifications(), "outer isn’t connected yet");

    tree.attach(tree.root(), outer).unwrap();
    let notifications: Vec<_> = tree.notifications().collect();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].node(), inner);
}

#[test]
fn test_clear_children_defers_discard() {
    let mut tree = NodeTree::new(&document());
    let header = tree.query_by_name(tree.root(), "header").unwrap();
    let body = tree.query_by_name(tree.root(), "body").unwrap();
    let panel = tree.query_by_name(tree.root(), "panel").unwrap();
    tree.observe(panel, ObserverToken(3)).unwrap();

    tree.clear_children(body).unwrap();
    assert!(tree.children(body).is_empty());
    assert!(!tree.is_connected(panel));
    assert_eq!(tree.name(panel), Some("panel"), "readable until collected");
    let notifications: Vec<_> = tree.notifications().collect();
    assert_eq!(
        notifications,
        vec![Notification::Detached {
            node: panel,
            token: ObserverToken(3)
        }]
    );

    assert_eq!(tree.collect_garbage(), 1);
    assert!(!tree.contains(panel));
    assert_eq!(tree.len(), 4);

    // children moved elsewhere before collection are kept
    let named_root = tree.parent(body).unwrap();
    tree.clear_children(named_root).unwrap();
    tree.attach(tree.root(), header).unwrap();
    assert_eq!(tree.collect_garbage(), 1);
    assert!(tree.contains(header));
    assert!(!tree.contains(body));
    assert_eq!(tree.collect_garbage(), 0);
}

#[test]
fn test_structural_errors() {
    let mut tree = NodeTree::new(&document());
    let root = tree.root();
    let body = tree.query_by_name(root, "body").unwrap();
    let panel = tree.query_by_name(root, "panel").unwrap();

    assert_eq!(tree.attach(root, panel), Err(TreeError::AlreadyAttached(panel)));
    assert_eq!(
        tree.detach(root, panel),
        Err(TreeError::NotAChild {
            parent: root,
            child: panel
        })
    );

    let detached = tree.instantiate(&Template::new());
    let inner = tree.instantiate(&Template::new());
    tree.attach(detached, inner).unwrap();
    assert_eq!(tree.attach(inner, detached), Err(TreeError::Cycle(detached)));

    assert!(!tree.discard(body), "attached nodes can’t be discarded");
    assert!(!tree.discard(root));
}
