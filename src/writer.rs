//! Serialization of a [`Document`] back to XML text.
//!
//! The arena is converted into an `xmltree::Element` and written with
//! xmltree's emitter. Prefixes are picked from declarations already in
//! scope, then from the well-known namespace table, then generated.
//! Declarations are only added where an element or attribute needs one.

use xmltree::{EmitterConfig, XMLNode};

use crate::dom::{Document, Namespace, NodeId, QName};
use crate::error::WriteError;
use crate::namespaces;
use crate::parser::DEFAULT_MAX_DEPTH;

/// Output options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOptions {
    /// Emit the `<?xml ...?>` declaration
    pub write_declaration: bool,
    /// Spaces per nesting level; 0 writes everything on one line
    pub indent: usize,
    /// Deepest element nesting that will be written
    pub max_depth: usize,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            write_declaration: true,
            indent: 0,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Serialize `doc` to a string. A document without a root yields an empty
/// string.
pub fn write_document(doc: &Document, options: &WriteOptions) -> Result<String, WriteError> {
    let Some(root) = doc.root() else {
        return Ok(String::new());
    };

    if doc.depth(root) > options.max_depth {
        return Err(WriteError::TooDeep(options.max_depth));
    }

    let mut scopes = Scopes::default();
    let tree = build_element(doc, root, &mut scopes);

    let config = EmitterConfig::new()
        .write_document_declaration(options.write_declaration)
        .perform_indent(options.indent > 0)
        .indent_string(" ".repeat(options.indent));

    let mut buf = Vec::new();
    tree.write_with_config(&mut buf, config)?;
    Ok(String::from_utf8(buf)?)
}

/// Convert one node and its subtree. Depth is bounded by the caller.
fn build_element(doc: &Document, id: NodeId, scopes: &mut Scopes) -> xmltree::Element {
    let node = doc.node(id);
    scopes.push(node.namespaces());

    let name = node.name();
    let prefix = scopes.element_prefix(name);
    let attributes: Vec<(String, String)> = node
        .attributes()
        .iter()
        .map(|attr| (scopes.attribute_name(&attr.name), attr.value.clone()))
        .collect();

    let mut element = xmltree::Element::new(name.local());
    element.prefix = prefix.filter(|p| !p.is_empty());
    if name.is_qualified() {
        element.namespace = Some(name.namespace().to_string());
    }

    for ns in scopes.declared() {
        let key = if ns.prefix().is_empty() {
            "xmlns".to_string()
        } else {
            format!("xmlns:{}", ns.prefix())
        };
        element.attributes.insert(key, ns.uri().to_string());
    }
    for (key, value) in attributes {
        element.attributes.insert(key, value);
    }

    if let Some(text) = node.text().filter(|t| !t.is_empty()) {
        element.children.push(XMLNode::Text(text.to_string()));
    }
    for &child in node.children() {
        element
            .children
            .push(XMLNode::Element(build_element(doc, child, scopes)));
    }

    scopes.pop();
    element
}

/// Stack of in-scope prefix bindings, one frame per open element.
#[derive(Default)]
struct Scopes {
    frames: Vec<Vec<Namespace>>,
    generated: usize,
}

impl Scopes {
    fn push(&mut self, declared: &[Namespace]) {
        self.frames.push(declared.to_vec());
    }

    fn pop(&mut self) {
        self.frames.pop();
    }

    /// Bindings declared on the current element.
    fn declared(&self) -> &[Namespace] {
        self.frames.last().map(Vec::as_slice).unwrap_or(&[])
    }

    /// URI currently bound to `prefix`.
    fn resolve(&self, prefix: &str) -> Option<&str> {
        self.frames
            .iter()
            .rev()
            .flat_map(|frame| frame.iter())
            .find(|ns| ns.prefix() == prefix)
            .map(|ns| ns.uri())
    }

    /// A prefix currently bound to `uri` and not shadowed by an inner frame.
    fn bound_prefix(&self, uri: &str, allow_default: bool) -> Option<String> {
        self.frames
            .iter()
            .rev()
            .flat_map(|frame| frame.iter())
            .filter(|ns| ns.uri() == uri)
            .filter(|ns| allow_default || !ns.prefix().is_empty())
            .find(|ns| self.resolve(ns.prefix()) == Some(uri))
            .map(|ns| ns.prefix().to_string())
    }

    /// Bind `ns` on the current element, replacing a binding of the same
    /// prefix made there.
    fn declare(&mut self, ns: Namespace) {
        if let Some(frame) = self.frames.last_mut() {
            match frame.iter_mut().find(|n| n.prefix() == ns.prefix()) {
                Some(existing) => *existing = ns,
                None => frame.push(ns),
            }
        }
    }

    /// Find or declare a non-empty prefix for `uri`.
    fn prefix_for(&mut self, uri: &str) -> String {
        if let Some(prefix) = self.bound_prefix(uri, false) {
            return prefix;
        }
        let prefix = match namespaces::by_uri(uri) {
            Some(ns) if self.resolve(ns.prefix()).is_none() => ns.prefix().to_string(),
            _ => loop {
                let candidate = format!("ns{}", self.generated);
                self.generated += 1;
                if self.resolve(&candidate).is_none() {
                    break candidate;
                }
            },
        };
        self.declare(Namespace::new(prefix.clone(), uri.to_string()));
        prefix
    }

    /// Prefix for an element name; `Some("")` means the default namespace
    /// and `None` means no namespace.
    fn element_prefix(&mut self, name: &QName) -> Option<String> {
        if !name.is_qualified() {
            if self.resolve("").is_some_and(|uri| !uri.is_empty()) {
                self.declare(Namespace::new("", ""));
            }
            return None;
        }
        match self.bound_prefix(name.namespace(), true) {
            Some(prefix) => Some(prefix),
            None => Some(self.prefix_for(name.namespace())),
        }
    }

    fn attribute_name(&mut self, name: &QName) -> String {
        if !name.is_qualified() {
            return name.local().to_string();
        }
        if name.namespace() == namespaces::XML_URI {
            return format!("xml:{}", name.local());
        }
        format!("{}:{}", self.prefix_for(name.namespace()), name.local())
    }
}
