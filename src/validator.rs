//! SOAP 1.2 envelope shape validation.

use tracing::{debug, warn};

use crate::dom::{Document, Element, NodeId};
use crate::error::SoapError;
use crate::message::Message;
use crate::namespaces::{BODY_NAME, ENVELOPE_NAME, HEADER_NAME};

/// Validate that `doc` holds a SOAP 1.2 envelope and wrap it in a [`Message`].
///
/// The envelope may contain at most one Header and one Body and nothing
/// else. A missing Header or Body is created and appended to the envelope,
/// so every returned message has both. Checks run in a fixed order and the
/// first failure is returned.
pub fn is_soap(doc: Document) -> Result<Message, SoapError> {
    let (header, body, doc) = check_envelope(doc).inspect_err(|err| {
        warn!(code = err.kind().as_str(), error = %err, "Rejected SOAP envelope");
    })?;
    Ok(Message::from_parts(doc, header, body))
}

fn check_envelope(mut doc: Document) -> Result<(NodeId, NodeId, Document), SoapError> {
    let envelope = doc.root().ok_or(SoapError::NoEnvelope)?;

    if doc.node(envelope).name() != &ENVELOPE_NAME {
        return Err(SoapError::BadEnvelope);
    }

    let children = doc.children(envelope);
    if children.len() > 2 {
        return Err(SoapError::EnvelopeOverstuffed);
    }

    let mut header = None;
    let mut body = None;
    for &child in children {
        let name = doc.node(child).name();
        if name == &HEADER_NAME {
            if header.is_some() {
                return Err(SoapError::TooManyHeader);
            }
            header = Some(child);
        } else if name == &BODY_NAME {
            if body.is_some() {
                return Err(SoapError::TooManyBody);
            }
            body = Some(child);
        } else {
            return Err(SoapError::BadTag);
        }
    }

    let header = match header {
        Some(id) => id,
        None => {
            debug!("SOAP envelope has no Header, adding one");
            append_section(&mut doc, envelope, Element::new(HEADER_NAME))
        }
    };
    let body = match body {
        Some(id) => id,
        None => {
            debug!("SOAP envelope has no Body, adding one");
            append_section(&mut doc, envelope, Element::new(BODY_NAME))
        }
    };

    Ok((header, body, doc))
}

fn append_section(doc: &mut Document, envelope: NodeId, section: Element) -> NodeId {
    let id = doc.import(section);
    doc.add_child(envelope, id);
    id
}

impl TryFrom<Document> for Message {
    type Error = SoapError;

    fn try_from(doc: Document) -> Result<Self, Self::Error> {
        is_soap(doc)
    }
}
