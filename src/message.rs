//! SOAP message wrapper with Header and Body accessors.

use std::io::Read;

use tracing::debug;

use crate::dom::{Document, Element, Node, NodeId};
use crate::error::SoapError;
use crate::namespaces::{self, BODY_NAME, ENVELOPE_NAME, FAULT_NAME, HEADER_NAME};
use crate::parser::{parse_document_with, ParseOptions};
use crate::validator::is_soap;
use crate::writer::{write_document, WriteOptions};

/// A validated SOAP 1.2 message.
///
/// Owns its document and keeps handles to the envelope's Header and Body,
/// both of which always exist.
#[derive(Debug, Clone)]
pub struct Message {
    doc: Document,
    header: NodeId,
    body: NodeId,
}

impl Message {
    /// Create the skeleton of a new message: an Envelope holding an empty
    /// Header and an empty Body, with the common WS-Management prefixes
    /// declared on the Envelope.
    pub fn new() -> Self {
        let mut doc = Document::new();
        let envelope = doc.set_root(Element::new(ENVELOPE_NAME));
        namespaces::declare_most_used(doc.node_mut(envelope));

        let header = doc.import(Element::new(HEADER_NAME));
        let body = doc.import(Element::new(BODY_NAME));
        doc.add_child(envelope, header);
        doc.add_child(envelope, body);

        Self { doc, header, body }
    }

    /// Parse and validate a message from raw bytes.
    pub fn parse(data: &[u8]) -> Result<Self, SoapError> {
        Self::parse_with(data, &ParseOptions::default())
    }

    /// Parse and validate with explicit parser limits.
    pub fn parse_with(data: &[u8], options: &ParseOptions) -> Result<Self, SoapError> {
        let doc = parse_document_with(data, options)?;
        let msg = is_soap(doc)?;
        debug!(
            headers = msg.headers().len(),
            body = msg.body().len(),
            fault = msg.fault().is_some(),
            "Parsed SOAP message"
        );
        Ok(msg)
    }

    /// Read everything from `reader` and parse it as a message.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self, SoapError> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::parse(&data)
    }

    pub(crate) fn from_parts(doc: Document, header: NodeId, body: NodeId) -> Self {
        Self { doc, header, body }
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Give up the typed view and return the underlying document.
    pub fn into_document(self) -> Document {
        self.doc
    }

    /// Look up a node returned by one of the accessors.
    pub fn node(&self, id: NodeId) -> &Node {
        self.doc.node(id)
    }

    /// Text content of a node, if any.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.doc.node(id).text()
    }

    /// Deep copy of a node and its subtree.
    pub fn to_element(&self, id: NodeId) -> Element {
        self.doc.to_element(id)
    }

    /// The Header element itself.
    pub fn header_node(&self) -> NodeId {
        self.header
    }

    /// The Body element itself.
    pub fn body_node(&self) -> NodeId {
        self.body
    }

    /// Children of the Header, in document order.
    pub fn headers(&self) -> &[NodeId] {
        self.doc.children(self.header)
    }

    /// Every element below the Header, depth first.
    pub fn all_header_elements(&self) -> Vec<NodeId> {
        self.doc.descendants(self.header)
    }

    /// Children of the Body, in document order.
    pub fn body(&self) -> &[NodeId] {
        self.doc.children(self.body)
    }

    /// Every element below the Body, depth first.
    pub fn all_body_elements(&self) -> Vec<NodeId> {
        self.doc.descendants(self.body)
    }

    /// First Header child matching the name and attributes of `template`.
    pub fn get_header(&self, template: &Element) -> Option<NodeId> {
        get(&self.doc, self.header, template)
    }

    /// Add or update Header children.
    ///
    /// An element whose name is already present in the Header replaces the
    /// first such child in place; otherwise it is appended.
    pub fn set_header<I>(&mut self, elements: I) -> &mut Self
    where
        I: IntoIterator<Item = Element>,
    {
        set(&mut self.doc, self.header, elements);
        self
    }

    /// Remove a child of the Header. Returns `None` if `id` is not one.
    pub fn remove_header(&mut self, id: NodeId) -> Option<NodeId> {
        self.doc.remove_child(self.header, id)
    }

    /// First Body child matching the name and attributes of `template`.
    pub fn get_body(&self, template: &Element) -> Option<NodeId> {
        get(&self.doc, self.body, template)
    }

    /// Add or update Body children, with the same policy as [`set_header`](Self::set_header).
    pub fn set_body<I>(&mut self, elements: I) -> &mut Self
    where
        I: IntoIterator<Item = Element>,
    {
        set(&mut self.doc, self.body, elements);
        self
    }

    /// Remove a child of the Body. Returns `None` if `id` is not one.
    pub fn remove_body(&mut self, id: NodeId) -> Option<NodeId> {
        self.doc.remove_child(self.body, id)
    }

    /// The Fault element, if the Body carries one.
    pub fn fault(&self) -> Option<NodeId> {
        self.get_body(&Element::new(FAULT_NAME))
    }

    /// Serialize with default options.
    pub fn to_xml(&self) -> Result<String, SoapError> {
        self.to_xml_with(&WriteOptions::default())
    }

    pub fn to_xml_with(&self, options: &WriteOptions) -> Result<String, SoapError> {
        Ok(write_document(&self.doc, options)?)
    }
}

impl Default for Message {
    fn default() -> Self {
        Self::new()
    }
}

fn get(doc: &Document, container: NodeId, template: &Element) -> Option<NodeId> {
    doc.find_child(container, |node| template.matches(node))
}

fn set<I>(doc: &mut Document, container: NodeId, elements: I)
where
    I: IntoIterator<Item = Element>,
{
    for element in elements {
        let existing = doc.find_child(container, |node| node.name() == element.name());
        let id = doc.import(element);
        let replaced = existing.and_then(|old| doc.replace_child(old, id));
        if replaced.is_none() {
            doc.add_child(container, id);
        }
    }
}
