//! Minimal element tree used as the message substrate.
//!
//! Nodes live in an arena owned by a [`Document`] and are addressed by
//! [`NodeId`] handles. Detached content is built as owned [`Element`] values
//! and grafted into a document with [`Document::import`].

use std::borrow::Cow;

use crate::namespaces;

/// Namespace-qualified name. An empty namespace means "no namespace".
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    namespace: Cow<'static, str>,
    local: Cow<'static, str>,
}

impl QName {
    /// Create a qualified name.
    pub fn new(namespace: impl Into<Cow<'static, str>>, local: impl Into<Cow<'static, str>>) -> Self {
        Self {
            namespace: namespace.into(),
            local: local.into(),
        }
    }

    /// Create a qualified name from static strings, usable in `const` items.
    pub const fn from_static(namespace: &'static str, local: &'static str) -> Self {
        Self {
            namespace: Cow::Borrowed(namespace),
            local: Cow::Borrowed(local),
        }
    }

    /// Name without a namespace.
    pub fn unqualified(local: impl Into<Cow<'static, str>>) -> Self {
        Self::new("", local)
    }

    /// Namespace URI (empty when unqualified).
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Local part.
    pub fn local(&self) -> &str {
        &self.local
    }

    /// Whether the name carries a namespace.
    pub fn is_qualified(&self) -> bool {
        !self.namespace.is_empty()
    }
}

impl std::fmt::Display for QName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.namespace.is_empty() {
            f.write_str(&self.local)
        } else {
            write!(f, "{{{}}}{}", self.namespace, self.local)
        }
    }
}

/// Prefix to URI binding. The empty prefix is the default namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Namespace {
    prefix: Cow<'static, str>,
    uri: Cow<'static, str>,
}

impl Namespace {
    /// Create a binding.
    pub fn new(prefix: impl Into<Cow<'static, str>>, uri: impl Into<Cow<'static, str>>) -> Self {
        Self {
            prefix: prefix.into(),
            uri: uri.into(),
        }
    }

    /// Create a binding from static strings, usable in `const` items.
    pub const fn from_static(prefix: &'static str, uri: &'static str) -> Self {
        Self {
            prefix: Cow::Borrowed(prefix),
            uri: Cow::Borrowed(uri),
        }
    }

    /// Bound prefix; empty for the default namespace.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Namespace URI.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Qualified name in this namespace.
    pub fn name(&self, local: impl Into<Cow<'static, str>>) -> QName {
        QName::new(self.uri.clone(), local)
    }
}

/// Attribute with a qualified name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: QName,
    pub value: String,
}

/// Handle to a node inside a [`Document`].
///
/// Handles are only meaningful for the document that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Fields shared by attached nodes and detached elements.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Data {
    name: QName,
    attributes: Vec<Attribute>,
    text: Option<String>,
    namespaces: Vec<Namespace>,
}

impl Data {
    fn new(name: QName) -> Self {
        Self {
            name,
            attributes: Vec::new(),
            text: None,
            namespaces: Vec::new(),
        }
    }

    fn attr(&self, name: &QName) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| &a.name == name)
            .map(|a| a.value.as_str())
    }

    fn set_attr(&mut self, name: QName, value: String) {
        match self.attributes.iter_mut().find(|a| a.name == name) {
            Some(existing) => existing.value = value,
            None => self.attributes.push(Attribute { name, value }),
        }
    }

    fn remove_attr(&mut self, name: &QName) -> Option<String> {
        let pos = self.attributes.iter().position(|a| &a.name == name)?;
        Some(self.attributes.remove(pos).value)
    }

    fn declare_namespace(&mut self, ns: Namespace) {
        match self.namespaces.iter_mut().find(|n| n.prefix == ns.prefix) {
            Some(existing) => *existing = ns,
            None => self.namespaces.push(ns),
        }
    }

    fn must_understand(&self) -> bool {
        matches!(
            self.attr(&namespaces::MUST_UNDERSTAND),
            Some("true") | Some("1")
        )
    }
}

/// Detached, owned element tree.
///
/// Used to build new content and as a search template: a template matches a
/// node when the names are equal and every template attribute is present on
/// the node with the same value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    data: Data,
    children: Vec<Element>,
}

impl Element {
    /// Empty element with the given name.
    pub fn new(name: QName) -> Self {
        Self {
            data: Data::new(name),
            children: Vec::new(),
        }
    }

    /// Element in `ns` with the given local name.
    pub fn in_ns(ns: &Namespace, local: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ns.name(local))
    }

    /// Set an attribute, replacing any previous value.
    pub fn with_attr(mut self, name: QName, value: impl Into<String>) -> Self {
        self.data.set_attr(name, value.into());
        self
    }

    /// Set the text content.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.data.text = Some(text.into());
        self
    }

    /// Append a child element.
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Declare a prefix binding on this element.
    pub fn with_namespace(mut self, ns: Namespace) -> Self {
        self.data.declare_namespace(ns);
        self
    }

    /// Set the SOAP `mustUnderstand` attribute.
    pub fn must_understand(self, value: bool) -> Self {
        let value = if value { "true" } else { "false" };
        self.with_attr(namespaces::MUST_UNDERSTAND, value)
    }

    /// Qualified name.
    pub fn name(&self) -> &QName {
        &self.data.name
    }

    /// Value of the attribute called `name`.
    pub fn attr(&self, name: &QName) -> Option<&str> {
        self.data.attr(name)
    }

    /// Attributes in insertion order.
    pub fn attributes(&self) -> &[Attribute] {
        &self.data.attributes
    }

    /// Set an attribute, replacing any previous value.
    pub fn set_attr(&mut self, name: QName, value: impl Into<String>) {
        self.data.set_attr(name, value.into());
    }

    /// Text content, if any.
    pub fn text(&self) -> Option<&str> {
        self.data.text.as_deref()
    }

    /// Replace the text content.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.data.text = Some(text.into());
    }

    /// Prefix bindings declared on this element.
    pub fn namespaces(&self) -> &[Namespace] {
        &self.data.namespaces
    }

    /// Child elements in order.
    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// Append a child element.
    pub fn push_child(&mut self, child: Element) {
        self.children.push(child);
    }

    /// Whether `node` satisfies this element used as a template.
    pub fn matches(&self, node: &Node) -> bool {
        node.data.name == self.data.name
            && self
                .data
                .attributes
                .iter()
                .all(|a| node.data.attr(&a.name) == Some(a.value.as_str()))
    }
}

/// Node attached to a [`Document`].
#[derive(Debug, Clone)]
pub struct Node {
    data: Data,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    pub fn name(&self) -> &QName {
        &self.data.name
    }

    pub fn set_name(&mut self, name: QName) {
        self.data.name = name;
    }

    pub fn attr(&self, name: &QName) -> Option<&str> {
        self.data.attr(name)
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.data.attributes
    }

    pub fn set_attr(&mut self, name: QName, value: impl Into<String>) {
        self.data.set_attr(name, value.into());
    }

    pub fn remove_attr(&mut self, name: &QName) -> Option<String> {
        self.data.remove_attr(name)
    }

    pub fn text(&self) -> Option<&str> {
        self.data.text.as_deref()
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.data.text = Some(text.into());
    }

    pub fn namespaces(&self) -> &[Namespace] {
        &self.data.namespaces
    }

    /// Bind a prefix on this node, replacing an earlier binding of the same prefix.
    pub fn declare_namespace(&mut self, ns: Namespace) {
        self.data.declare_namespace(ns);
    }

    /// Whether `mustUnderstand` is set to `true` or `1`.
    pub fn must_understand(&self) -> bool {
        self.data.must_understand()
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Arena-backed XML document with zero or one root element.
///
/// Removing or replacing a node only unlinks it; it stays readable through
/// its handle for the lifetime of the document.
#[derive(Debug, Clone, Default)]
pub struct Document {
    nodes: Vec<Node>,
    root: Option<NodeId>,
}

impl Document {
    /// Create an empty document (no root).
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Import `element` and make it the root. A previous root is detached.
    pub fn set_root(&mut self, element: Element) -> NodeId {
        let id = self.import(element);
        self.root = Some(id);
        id
    }

    /// Make an existing detached node the root.
    pub fn set_root_node(&mut self, id: NodeId) {
        self.detach(id);
        self.root = Some(id);
    }

    /// Create a detached, empty node.
    pub fn create_element(&mut self, name: QName) -> NodeId {
        self.push_node(Data::new(name))
    }

    /// Graft an owned element tree into the arena as a detached subtree.
    pub fn import(&mut self, element: Element) -> NodeId {
        let Element { data, children } = element;
        let root = self.push_node(data);

        let mut pending = vec![(root, children.into_iter())];
        while let Some((parent, rest)) = pending.last_mut() {
            let parent = *parent;
            match rest.next() {
                Some(Element { data, children }) => {
                    let id = self.push_node(data);
                    self.nodes[id.0].parent = Some(parent);
                    self.nodes[parent.0].children.push(id);
                    pending.push((id, children.into_iter()));
                }
                None => {
                    pending.pop();
                }
            }
        }
        root
    }

    /// Deep-copy a subtree out of the arena.
    pub fn to_element(&self, id: NodeId) -> Element {
        // (node, index of the next child to visit, finished children)
        let mut stack: Vec<(NodeId, usize, Vec<Element>)> = vec![(id, 0, Vec::new())];
        loop {
            let top = stack.len() - 1;
            let (node, next, _) = &mut stack[top];
            if let Some(&child) = self.nodes[node.0].children.get(*next) {
                *next += 1;
                stack.push((child, 0, Vec::new()));
                continue;
            }

            let (node, _, children) = stack.swap_remove(top);
            let element = Element {
                data: self.nodes[node.0].data.clone(),
                children,
            };
            match stack.last_mut() {
                Some((_, _, siblings)) => siblings.push(element),
                None => return element,
            }
        }
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// URI bound to `prefix` at `id`, searching outward through its
    /// ancestors. The `xml` prefix is always bound.
    pub fn lookup_namespace(&self, id: NodeId, prefix: &str) -> Option<&str> {
        if prefix == namespaces::XML.prefix() {
            return Some(namespaces::XML_URI);
        }
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let node = &self.nodes[current.0];
            if let Some(ns) = node.data.namespaces.iter().find(|ns| ns.prefix() == prefix) {
                return Some(ns.uri());
            }
            cursor = node.parent;
        }
        None
    }

    /// Number of elements on the path from `id` down to its deepest
    /// descendant, counting `id` itself.
    pub fn depth(&self, id: NodeId) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(id, 1)];
        while let Some((current, level)) = stack.pop() {
            deepest = deepest.max(level);
            stack.extend(self.children(current).iter().map(|&c| (c, level + 1)));
        }
        deepest
    }

    /// All descendants of `id` in document order, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    /// Append `child` as the last child of `parent`, detaching it first.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Unlink `child` from `parent`. Returns `None` when `child` is not a
    /// direct child of `parent`.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Option<NodeId> {
        let children = &mut self.nodes[parent.0].children;
        let pos = children.iter().position(|&c| c == child)?;
        children.remove(pos);
        self.nodes[child.0].parent = None;
        Some(child)
    }

    /// Put `new` in the sibling position of `old`, which becomes detached,
    /// and return `old`. Returns `None` and changes nothing when `old` has
    /// no parent.
    pub fn replace_child(&mut self, old: NodeId, new: NodeId) -> Option<NodeId> {
        let parent = self.nodes[old.0].parent?;
        self.nodes[parent.0].children.iter().position(|&c| c == old)?;

        self.detach(new);
        let children = &mut self.nodes[parent.0].children;
        let pos = children.iter().position(|&c| c == old)?;
        children[pos] = new;
        self.nodes[new.0].parent = Some(parent);
        self.nodes[old.0].parent = None;
        Some(old)
    }

    /// First direct child of `parent` satisfying `pred`.
    pub fn find_child<F>(&self, parent: NodeId, pred: F) -> Option<NodeId>
    where
        F: Fn(&Node) -> bool,
    {
        self.children(parent)
            .iter()
            .copied()
            .find(|&c| pred(self.node(c)))
    }

    fn push_node(&mut self, data: Data) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            data,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent {
            self.remove_child(parent, id);
        }
        if self.root == Some(id) {
            self.root = None;
        }
    }
}
