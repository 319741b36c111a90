//! Typed view of a SOAP 1.2 Fault.

use tracing::debug;

use crate::dom::{Document, Element, Namespace, NodeId, QName};
use crate::message::Message;
use crate::namespaces::{self, ENVELOPE, XML_LANG};

/// Fault code for errors caused by the request.
pub const SENDER: &str = "Sender";
/// Fault code for errors on the receiving side.
pub const RECEIVER: &str = "Receiver";

/// Contents of an `s:Fault` element.
///
/// `code` is the local part of the top-level Code value (`Sender`,
/// `Receiver`, ...). Subcodes are resolved names, from outermost to
/// innermost, so they survive a move between documents that bind
/// different prefixes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    pub code: String,
    pub subcodes: Vec<QName>,
    pub reason: String,
    pub lang: String,
    pub detail: Vec<Element>,
}

impl Fault {
    pub fn new(code: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            subcodes: Vec::new(),
            reason: reason.into(),
            lang: "en-US".to_string(),
            detail: Vec::new(),
        }
    }

    pub fn sender(reason: impl Into<String>) -> Self {
        Self::new(SENDER, reason)
    }

    pub fn receiver(reason: impl Into<String>) -> Self {
        Self::new(RECEIVER, reason)
    }

    /// Append a subcode below the innermost one, e.g.
    /// `WSMAN.name("InvalidSelectors")`.
    pub fn with_subcode(mut self, subcode: QName) -> Self {
        self.subcodes.push(subcode);
        self
    }

    pub fn with_detail(mut self, detail: Element) -> Self {
        self.detail.push(detail);
        self
    }

    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = lang.into();
        self
    }

    /// Read the Fault carried by `message`, if there is one.
    ///
    /// A Fault without a Code value is not considered readable.
    pub fn from_message(message: &Message) -> Option<Self> {
        let doc = message.document();
        let fault = message.fault()?;

        let code = child(doc, fault, "Code")?;
        let value = child(doc, code, "Value").and_then(|id| doc.node(id).text())?;
        let code_value = value.rsplit(':').next().unwrap_or(value).to_string();

        let mut subcodes = Vec::new();
        let mut cursor = code;
        while let Some(sub) = child(doc, cursor, "Subcode") {
            if let Some(value) = child(doc, sub, "Value") {
                if let Some(name) = resolve_value(doc, value) {
                    subcodes.push(name);
                }
            }
            cursor = sub;
        }

        let text = child(doc, fault, "Reason").and_then(|reason| child(doc, reason, "Text"));
        let (reason, lang) = match text {
            Some(id) => {
                let node = doc.node(id);
                (
                    node.text().unwrap_or_default().to_string(),
                    node.attr(&XML_LANG).unwrap_or_default().to_string(),
                )
            }
            None => (String::new(), String::new()),
        };

        let detail = child(doc, fault, "Detail")
            .map(|id| doc.children(id).iter().map(|&c| doc.to_element(c)).collect())
            .unwrap_or_default();

        Some(Self {
            code: code_value,
            subcodes,
            reason,
            lang,
            detail,
        })
    }

    /// Build the `s:Fault` element.
    ///
    /// Code values are QNames in element text, so every prefix they use is
    /// declared on the Fault itself.
    pub fn to_element(&self) -> Element {
        let mut declared = vec![ENVELOPE];
        let subcode_values: Vec<String> = self
            .subcodes
            .iter()
            .map(|name| {
                let prefix = subcode_prefix(&mut declared, name.namespace());
                if prefix.is_empty() {
                    name.local().to_string()
                } else {
                    format!("{}:{}", prefix, name.local())
                }
            })
            .collect();

        let mut fault = Element::new(namespaces::FAULT_NAME);
        for ns in declared {
            fault = fault.with_namespace(ns);
        }

        let mut code = envelope("Code").with_child(
            envelope("Value").with_text(format!("{}:{}", ENVELOPE.prefix(), self.code)),
        );
        if let Some(nested) = subcode_values
            .iter()
            .rev()
            .fold(None, |inner: Option<Element>, value| {
                let mut sub = envelope("Subcode").with_child(envelope("Value").with_text(value.clone()));
                if let Some(inner) = inner {
                    sub.push_child(inner);
                }
                Some(sub)
            })
        {
            code.push_child(nested);
        }

        let mut text = envelope("Text").with_text(self.reason.clone());
        if !self.lang.is_empty() {
            text.set_attr(XML_LANG, self.lang.clone());
        }

        fault = fault.with_child(code).with_child(envelope("Reason").with_child(text));

        if !self.detail.is_empty() {
            let mut detail = envelope("Detail");
            for element in &self.detail {
                detail.push_child(element.clone());
            }
            fault.push_child(detail);
        }

        fault
    }
}

impl Message {
    /// Put `fault` into the Body, replacing an existing Fault.
    pub fn set_fault(&mut self, fault: &Fault) -> &mut Self {
        self.set_body([fault.to_element()])
    }
}

/// Prefix to write a subcode in `uri` with, declaring one when needed.
/// Unqualified subcodes get an empty default namespace.
fn subcode_prefix(declared: &mut Vec<Namespace>, uri: &str) -> String {
    if let Some(ns) = declared.iter().find(|ns| ns.uri() == uri) {
        return ns.prefix().to_string();
    }
    let ns = if uri.is_empty() {
        Namespace::new("", "")
    } else {
        match namespaces::by_uri(uri) {
            Some(ns) if declared.iter().all(|d| d.prefix() != ns.prefix()) => ns,
            _ => Namespace::new(format!("sc{}", declared.len()), uri.to_string()),
        }
    };
    let prefix = ns.prefix().to_string();
    declared.push(ns);
    prefix
}

/// Resolve the QName held in the text of `value` against the namespaces in
/// scope there.
fn resolve_value(doc: &Document, value: NodeId) -> Option<QName> {
    let text = doc.node(value).text()?.trim();
    let (prefix, local) = text.split_once(':').unwrap_or(("", text));
    match doc.lookup_namespace(value, prefix) {
        Some(uri) => Some(QName::new(uri.to_string(), local.to_string())),
        None if prefix.is_empty() => Some(QName::unqualified(local.to_string())),
        None => {
            debug!(value = text, "Fault subcode uses an unbound prefix");
            None
        }
    }
}

fn envelope(local: &'static str) -> Element {
    Element::in_ns(&ENVELOPE, local)
}

fn child(doc: &Document, parent: NodeId, local: &'static str) -> Option<NodeId> {
    let name = QName::new(ENVELOPE.uri().to_string(), local);
    doc.find_child(parent, |node| node.name() == &name)
}
