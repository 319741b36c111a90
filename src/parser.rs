//! XML parsing into a [`Document`].
//!
//! Uses quick-xml's namespace-resolving reader. quick-xml never expands
//! external entities, and DOCTYPE declarations are rejected outright since
//! SOAP 1.2 messages must not carry them. Nesting is capped so that no
//! later tree walk has to cope with pathological depth.
//!
//! Text is kept exactly as written. Whitespace-only runs between tags are
//! dropped.

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{PrefixDeclaration, ResolveResult};
use quick_xml::NsReader;

use crate::dom::{Document, Namespace, NodeId, QName};
use crate::error::ParseError;

/// Default cap on element nesting, counting the root as level one.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Parser limits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Deepest element nesting accepted
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Parse raw bytes into a document with the default limits.
///
/// A document with no root element (for example a bare XML declaration)
/// parses successfully; deciding whether that is acceptable is left to the
/// caller.
pub fn parse_document(data: &[u8]) -> Result<Document, ParseError> {
    parse_document_with(data, &ParseOptions::default())
}

/// Parse raw bytes into a document.
pub fn parse_document_with(data: &[u8], options: &ParseOptions) -> Result<Document, ParseError> {
    let mut reader = NsReader::from_reader(data);
    reader.config_mut().trim_text(false);

    let mut doc = Document::new();
    let mut stack: Vec<NodeId> = Vec::new();
    let mut buf = Vec::new();

    loop {
        let (resolved, event) = reader.read_resolved_event_into(&mut buf)?;
        let namespace = namespace_uri(resolved)?;

        match event {
            Event::Start(_) | Event::Empty(_) if stack.len() >= options.max_depth => {
                return Err(ParseError::TooDeep(options.max_depth));
            }

            Event::Start(ref e) => {
                let id = open_element(&reader, &mut doc, &stack, namespace, e)?;
                stack.push(id);
            }

            Event::Empty(ref e) => {
                open_element(&reader, &mut doc, &stack, namespace, e)?;
            }

            Event::End(_) => {
                stack.pop();
            }

            Event::Text(ref e) => {
                if let Some(&current) = stack.last() {
                    if !e.iter().all(u8::is_ascii_whitespace) {
                        append_text(&mut doc, current, &e.unescape()?);
                    }
                }
            }

            Event::CData(ref e) => {
                if let Some(&current) = stack.last() {
                    append_text(&mut doc, current, std::str::from_utf8(e)?);
                }
            }

            Event::DocType(_) => return Err(ParseError::DoctypeForbidden),

            Event::PI(_) => return Err(ParseError::ProcessingInstructionForbidden),

            Event::Eof => break,

            _ => {}
        }

        buf.clear();
    }

    if let Some(&open) = stack.last() {
        return Err(ParseError::UnclosedElement(doc.node(open).name().to_string()));
    }

    Ok(doc)
}

/// Create the node for a start or empty tag and link it into the tree.
fn open_element(
    reader: &NsReader<&[u8]>,
    doc: &mut Document,
    stack: &[NodeId],
    namespace: String,
    e: &BytesStart,
) -> Result<NodeId, ParseError> {
    let local = std::str::from_utf8(e.local_name().as_ref())?.to_string();
    let id = doc.create_element(QName::new(namespace, local));

    for attr in e.attributes() {
        let attr = attr?;
        let value = attr.unescape_value()?.into_owned();

        if let Some(binding) = attr.key.as_namespace_binding() {
            let prefix = match binding {
                PrefixDeclaration::Default => String::new(),
                PrefixDeclaration::Named(p) => std::str::from_utf8(p)?.to_string(),
            };
            doc.node_mut(id).declare_namespace(Namespace::new(prefix, value));
            continue;
        }

        let (resolved, local) = reader.resolve_attribute(attr.key);
        let namespace = namespace_uri(resolved)?;
        let local = std::str::from_utf8(local.as_ref())?.to_string();
        doc.node_mut(id).set_attr(QName::new(namespace, local), value);
    }

    match stack.last() {
        Some(&parent) => doc.add_child(parent, id),
        None if doc.root().is_none() => doc.set_root_node(id),
        None => {
            let name = doc.node(id).name().to_string();
            return Err(ParseError::MultipleRoots(name));
        }
    }

    Ok(id)
}

/// Turn a resolution result into an owned URI; unbound names get "".
fn namespace_uri(resolved: ResolveResult) -> Result<String, ParseError> {
    match resolved {
        ResolveResult::Unbound => Ok(String::new()),
        ResolveResult::Bound(ns) => Ok(std::str::from_utf8(ns.as_ref())?.to_string()),
        ResolveResult::Unknown(prefix) => Err(ParseError::UnboundPrefix(
            String::from_utf8_lossy(&prefix).into_owned(),
        )),
    }
}

fn append_text(doc: &mut Document, id: NodeId, text: &str) {
    let node = doc.node_mut(id);
    let combined = match node.text() {
        Some(existing) => format!("{existing}{text}"),
        None => text.to_string(),
    };
    node.set_text(combined);
}
