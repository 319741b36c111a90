//! Well-known namespaces for WS-Management over SOAP 1.2.
//!
//! Taken from the namespace table of DMTF DSP0226 (WS-Management).

use crate::dom::{Namespace, Node, QName};

/// SOAP 1.2 envelope.
pub const ENVELOPE: Namespace = Namespace::from_static("s", "http://www.w3.org/2003/05/soap-envelope");

/// SOAP 1.2 encoding.
pub const ENCODING: Namespace = Namespace::from_static("enc", "http://www.w3.org/2003/05/soap-encoding");

/// WS-Addressing.
pub const ADDRESSING: Namespace =
    Namespace::from_static("wsa", "http://schemas.xmlsoap.org/ws/2004/08/addressing");

/// WS-Management.
pub const WSMAN: Namespace =
    Namespace::from_static("wsman", "http://schemas.dmtf.org/wbem/wsman/1/wsman.xsd");

/// WS-Eventing.
pub const EVENTING: Namespace =
    Namespace::from_static("wse", "http://schemas.xmlsoap.org/ws/2004/08/eventing");

/// WS-Enumeration.
pub const ENUMERATION: Namespace =
    Namespace::from_static("wsen", "http://schemas.xmlsoap.org/ws/2004/09/enumeration");

/// WS-Transfer.
pub const TRANSFER: Namespace =
    Namespace::from_static("wxf", "http://schemas.xmlsoap.org/ws/2004/09/transfer");

/// WS-Policy.
pub const POLICY: Namespace = Namespace::from_static("wsp", "http://schemas.xmlsoap.org/ws/2004/09/policy");

/// XML Schema.
pub const SCHEMA: Namespace = Namespace::from_static("xs", "http://www.w3.org/2001/XMLSchema");

/// XML Schema instance.
pub const SCHEMA_INSTANCE: Namespace =
    Namespace::from_static("xsi", "http://www.w3.org/2001/XMLSchema-instance");

/// URI of the predefined `xml` prefix.
pub const XML_URI: &str = "http://www.w3.org/XML/1998/namespace";

/// The predefined `xml` prefix. Never declared explicitly.
pub const XML: Namespace = Namespace::from_static("xml", XML_URI);

/// Every registered namespace, in table order.
pub const ALL: [Namespace; 10] = [
    ENVELOPE,
    ENCODING,
    ADDRESSING,
    WSMAN,
    EVENTING,
    ENUMERATION,
    TRANSFER,
    POLICY,
    SCHEMA,
    SCHEMA_INSTANCE,
];

/// Namespaces nearly every WS-Management request touches.
pub const MOST_USED: [Namespace; 3] = [ENVELOPE, ADDRESSING, WSMAN];

// Envelope element and attribute names

pub const ENVELOPE_NAME: QName = QName::from_static("http://www.w3.org/2003/05/soap-envelope", "Envelope");
pub const HEADER_NAME: QName = QName::from_static("http://www.w3.org/2003/05/soap-envelope", "Header");
pub const BODY_NAME: QName = QName::from_static("http://www.w3.org/2003/05/soap-envelope", "Body");
pub const FAULT_NAME: QName = QName::from_static("http://www.w3.org/2003/05/soap-envelope", "Fault");
pub const MUST_UNDERSTAND: QName =
    QName::from_static("http://www.w3.org/2003/05/soap-envelope", "mustUnderstand");
pub const XML_LANG: QName = QName::from_static(XML_URI, "lang");

/// Registered namespace (including `xml`) for a URI.
pub fn by_uri(uri: &str) -> Option<Namespace> {
    if uri == XML.uri() {
        return Some(XML);
    }
    ALL.into_iter().find(|ns| ns.uri() == uri)
}

/// Registered namespace bound to `prefix`.
pub fn lookup(prefix: &str) -> Option<Namespace> {
    ALL.into_iter().find(|ns| ns.prefix() == prefix)
}

/// Declare [`MOST_USED`] on `node`.
pub fn declare_most_used(node: &mut Node) {
    for ns in MOST_USED {
        node.declare_namespace(ns);
    }
}
