//! WS-Management request header assembly.
//!
//! [`HeaderBuilder`] collects the addressing and management fields of a
//! request and writes them into a message's Header in the order
//! WS-Management peers expect:
//!
//! To, ReplyTo, MaxEnvelopeSize, OperationTimeout, MessageID, Locale,
//! Action, SelectorSet, ResourceURI, OptionSet.
//!
//! Which elements carry `mustUnderstand` is fixed by the profile and not
//! configurable.

use std::time::Duration;

use tracing::trace;
use uuid::Uuid;

use crate::config::HeaderDefaults;
use crate::dom::{Element, QName};
use crate::message::Message;
use crate::namespaces::{ADDRESSING, WSMAN, XML_LANG};

/// One `<wsman:Option Name="key">value</wsman:Option>` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderOption {
    key: String,
    value: String,
}

impl HeaderOption {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

/// Accumulates header fields for one message, then writes them with
/// [`build`](Self::build).
///
/// Fields left empty are not emitted. No value is validated.
#[derive(Debug)]
pub struct HeaderBuilder {
    to: String,
    reply_to: String,
    max_envelope_size: String,
    timeout: String,
    locale: String,
    id: String,
    action: String,
    shell_id: String,
    resource_uri: String,
    options: Vec<HeaderOption>,
    message: Message,
}

impl HeaderBuilder {
    /// Start a builder targeting `message`.
    pub fn new(message: Message) -> Self {
        Self {
            to: String::new(),
            reply_to: String::new(),
            max_envelope_size: String::new(),
            timeout: String::new(),
            locale: String::new(),
            id: String::new(),
            action: String::new(),
            shell_id: String::new(),
            resource_uri: String::new(),
            options: Vec::new(),
            message,
        }
    }

    /// Seed envelope size, timeout and locale from configuration.
    pub fn with_defaults(mut self, defaults: &HeaderDefaults) -> Self {
        if let Some(size) = defaults.max_envelope_size {
            self = self.max_envelope_size(size);
        }
        if let Some(timeout) = &defaults.operation_timeout {
            self.timeout = timeout.clone();
        }
        if let Some(locale) = &defaults.locale {
            self.locale = locale.clone();
        }
        self
    }

    pub fn to(mut self, uri: impl Into<String>) -> Self {
        self.to = uri.into();
        self
    }

    pub fn reply_to(mut self, uri: impl Into<String>) -> Self {
        self.reply_to = uri.into();
        self
    }

    pub fn max_envelope_size(mut self, size: u32) -> Self {
        self.max_envelope_size = size.to_string();
        self
    }

    /// Raw `xs:duration` value for OperationTimeout.
    pub fn timeout(mut self, timeout: impl Into<String>) -> Self {
        self.timeout = timeout.into();
        self
    }

    /// OperationTimeout from a [`Duration`], written as `PT<secs>.<millis>S`.
    pub fn operation_timeout(self, timeout: Duration) -> Self {
        self.timeout(format_duration(timeout))
    }

    pub fn locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    /// MessageID, usually `uuid:<uuid>`.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Fresh `uuid:` MessageID.
    pub fn random_message_id(self) -> Self {
        self.id(format!("uuid:{}", Uuid::new_v4().hyphenated()))
    }

    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.action = action.into();
        self
    }

    /// Adds `SelectorSet/Selector[@Name="ShellId"]`.
    pub fn shell_id(mut self, shell_id: impl Into<String>) -> Self {
        self.shell_id = shell_id.into();
        self
    }

    pub fn resource_uri(mut self, uri: impl Into<String>) -> Self {
        self.resource_uri = uri.into();
        self
    }

    pub fn add_option(mut self, option: HeaderOption) -> Self {
        self.options.push(option);
        self
    }

    /// Replace every accumulated option.
    pub fn options(mut self, options: Vec<HeaderOption>) -> Self {
        self.options = options;
        self
    }

    /// Write the collected fields into the message Header and return the
    /// message. Each element goes through [`Message::set_header`], so an
    /// existing header of the same name is replaced rather than duplicated.
    ///
    /// Emission order holds only for headers new to the message. A replaced
    /// header keeps the position the old one had, so building To and Action
    /// into a message that already carries an Action yields Action, To.
    pub fn build(self) -> Message {
        let Self {
            to,
            reply_to,
            max_envelope_size,
            timeout,
            locale,
            id,
            action,
            shell_id,
            resource_uri,
            options,
            mut message,
        } = self;

        let mut elements = Vec::new();

        if !to.is_empty() {
            elements.push(Element::in_ns(&ADDRESSING, "To").with_text(to));
        }

        if !reply_to.is_empty() {
            elements.push(
                Element::in_ns(&ADDRESSING, "ReplyTo").with_child(
                    Element::in_ns(&ADDRESSING, "Address")
                        .must_understand(true)
                        .with_text(reply_to),
                ),
            );
        }

        if !max_envelope_size.is_empty() {
            elements.push(
                Element::in_ns(&WSMAN, "MaxEnvelopeSize")
                    .must_understand(true)
                    .with_text(max_envelope_size),
            );
        }

        if !timeout.is_empty() {
            elements.push(Element::in_ns(&WSMAN, "OperationTimeout").with_text(timeout));
        }

        if !id.is_empty() {
            elements.push(Element::in_ns(&ADDRESSING, "MessageID").with_text(id));
        }

        if !locale.is_empty() {
            elements.push(
                Element::in_ns(&WSMAN, "Locale")
                    .must_understand(false)
                    .with_attr(XML_LANG, locale),
            );
        }

        if !action.is_empty() {
            elements.push(
                Element::in_ns(&ADDRESSING, "Action")
                    .must_understand(true)
                    .with_text(action),
            );
        }

        if !shell_id.is_empty() {
            elements.push(
                Element::in_ns(&WSMAN, "SelectorSet").with_child(
                    Element::in_ns(&WSMAN, "Selector")
                        .with_attr(QName::unqualified("Name"), "ShellId")
                        .with_text(shell_id),
                ),
            );
        }

        if !resource_uri.is_empty() {
            elements.push(
                Element::in_ns(&WSMAN, "ResourceURI")
                    .must_understand(true)
                    .with_text(resource_uri),
            );
        }

        if !options.is_empty() {
            let mut set = Element::in_ns(&WSMAN, "OptionSet");
            for option in options {
                set.push_child(
                    Element::in_ns(&WSMAN, "Option")
                        .with_attr(QName::unqualified("Name"), option.key)
                        .with_text(option.value),
                );
            }
            elements.push(set);
        }

        trace!(
            headers = ?elements.iter().map(|e| e.name().local()).collect::<Vec<_>>(),
            "Writing WS-Management headers"
        );

        message.set_header(elements);
        message
    }
}

/// Format a duration as an `xs:duration` with millisecond precision.
pub fn format_duration(duration: Duration) -> String {
    format!("PT{}.{:03}S", duration.as_secs(), duration.subsec_millis())
}
