//! SOAP 1.2 envelopes for WS-Management clients.
//!
//! Validates that an XML document is a well-formed SOAP 1.2 envelope, gives
//! structured access to the Header and Body of a message, and assembles the
//! standard WS-Management request headers.
//!
//! # Features
//!
//! - Envelope validation with synthesis of a missing Header or Body
//! - Header and Body get/set/remove by name and attribute template
//! - WS-Management header builder (addressing, selectors, options)
//! - Typed SOAP Fault reading and construction
//! - Namespace-aware parsing with quick-xml, serialization through xmltree
//! - Nesting limits on both paths
//!
//! # Example
//!
//! ```
//! use zentinel_wsman_soap::{HeaderBuilder, Message};
//!
//! let msg = HeaderBuilder::new(Message::new())
//!     .to("http://host:5985/wsman")
//!     .action("http://schemas.xmlsoap.org/ws/2004/09/transfer/Get")
//!     .build();
//!
//! let xml = msg.to_xml().unwrap();
//! let parsed = Message::parse(xml.as_bytes()).unwrap();
//! assert_eq!(parsed.headers().len(), 2);
//! ```

pub mod config;
pub mod dom;
pub mod error;
pub mod fault;
pub mod header;
pub mod message;
pub mod namespaces;
pub mod parser;
pub mod validator;
pub mod writer;

pub use config::SoapConfig;
pub use dom::{Document, Element, Namespace, NodeId, QName};
pub use error::{ErrorKind, SoapError};
pub use fault::Fault;
pub use header::{HeaderBuilder, HeaderOption};
pub use message::Message;
pub use validator::is_soap;

/// HTTP Content-Type for SOAP 1.2 messages.
pub const CONTENT_TYPE: &str = "application/soap+xml; charset=utf-8";
