//! Error types for SOAP envelope handling.

use quick_xml::events::attributes::AttrError;
use thiserror::Error;

/// SOAP envelope errors.
///
/// The six validation variants carry the canonical messages peers and
/// callers match on. Parse failures from the tree adapter pass through
/// untouched.
#[derive(Error, Debug)]
pub enum SoapError {
    #[error("Invalid SOAP: Document does not have a root element")]
    NoEnvelope,

    #[error("Invalid SOAP: Root should be an Envelope")]
    BadEnvelope,

    #[error("Invalid SOAP: Envelope must have at most 2 children")]
    EnvelopeOverstuffed,

    #[error("Invalid SOAP: More than one Header")]
    TooManyHeader,

    #[error("Invalid SOAP: More than one Body")]
    TooManyBody,

    #[error("Invalid SOAP: Unexpected tag in Envelope")]
    BadTag,

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Write(#[from] WriteError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SoapError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoEnvelope => ErrorKind::NoEnvelope,
            Self::BadEnvelope => ErrorKind::BadEnvelope,
            Self::EnvelopeOverstuffed => ErrorKind::EnvelopeOverstuffed,
            Self::TooManyHeader => ErrorKind::TooManyHeader,
            Self::TooManyBody => ErrorKind::TooManyBody,
            Self::BadTag => ErrorKind::BadTag,
            Self::Parse(_) => ErrorKind::InvalidXml,
            Self::Write(_) | Self::Io(_) => ErrorKind::Io,
        }
    }

    /// Whether this error came from envelope shape validation rather than
    /// from reading or writing XML.
    pub fn is_validation(&self) -> bool {
        !matches!(self, Self::Parse(_) | Self::Write(_) | Self::Io(_))
    }
}

/// Error classes, usable as stable codes in logs and fault details.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Document has no root element
    NoEnvelope,
    /// Root element is not a SOAP 1.2 Envelope
    BadEnvelope,
    /// Envelope has more than two children
    EnvelopeOverstuffed,
    /// More than one Header
    TooManyHeader,
    /// More than one Body
    TooManyBody,
    /// Envelope child that is neither Header nor Body
    BadTag,
    /// Malformed or forbidden XML
    InvalidXml,
    /// Reading or writing failed
    Io,
}

impl ErrorKind {
    /// Get the string code for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoEnvelope => "NO_ENVELOPE",
            Self::BadEnvelope => "BAD_ENVELOPE",
            Self::EnvelopeOverstuffed => "ENVELOPE_OVERSTUFFED",
            Self::TooManyHeader => "TOO_MANY_HEADER",
            Self::TooManyBody => "TOO_MANY_BODY",
            Self::BadTag => "BAD_TAG",
            Self::InvalidXml => "INVALID_XML",
            Self::Io => "IO",
        }
    }
}

/// Errors raised while building a [`Document`](crate::dom::Document) from bytes.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("XML attribute error: {0}")]
    Attribute(#[from] AttrError),

    #[error("Invalid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("Unbound namespace prefix: {0}")]
    UnboundPrefix(String),

    #[error("More than one root element: {0}")]
    MultipleRoots(String),

    #[error("Unclosed element at end of input: {0}")]
    UnclosedElement(String),

    #[error("DOCTYPE declarations are not allowed")]
    DoctypeForbidden,

    #[error("Processing instructions are not allowed")]
    ProcessingInstructionForbidden,

    #[error("Element nesting exceeds {0} levels")]
    TooDeep(usize),
}

/// Errors raised while serializing a document.
#[derive(Error, Debug)]
pub enum WriteError {
    #[error("XML write error: {0}")]
    Xml(#[from] xmltree::Error),

    #[error("Element nesting exceeds {0} levels")]
    TooDeep(usize),

    #[error("Serialized XML is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}
