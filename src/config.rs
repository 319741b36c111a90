//! Configuration types for message assembly and output.

use serde::{Deserialize, Serialize};

use crate::parser::{ParseOptions, DEFAULT_MAX_DEPTH};
use crate::writer::WriteOptions;

/// Main configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SoapConfig {
    /// Config version
    pub version: String,

    /// XML input limits
    pub parsing: ParsingConfig,

    /// XML output settings
    pub serialization: SerializationConfig,

    /// Values seeded into every request header
    pub headers: HeaderDefaults,
}

impl Default for SoapConfig {
    fn default() -> Self {
        Self {
            version: "1".to_string(),
            parsing: ParsingConfig::default(),
            serialization: SerializationConfig::default(),
            headers: HeaderDefaults::default(),
        }
    }
}

/// XML input limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsingConfig {
    /// Deepest element nesting accepted
    pub max_depth: usize,
}

impl Default for ParsingConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl From<&ParsingConfig> for ParseOptions {
    fn from(config: &ParsingConfig) -> Self {
        Self {
            max_depth: config.max_depth,
        }
    }
}

/// XML output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SerializationConfig {
    /// Emit the XML declaration
    pub write_declaration: bool,

    /// Spaces per nesting level (0 = single line)
    pub indent: usize,

    /// Deepest element nesting written
    pub max_depth: usize,
}

impl Default for SerializationConfig {
    fn default() -> Self {
        Self {
            write_declaration: true,
            indent: 0,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl From<&SerializationConfig> for WriteOptions {
    fn from(config: &SerializationConfig) -> Self {
        Self {
            write_declaration: config.write_declaration,
            indent: config.indent,
            max_depth: config.max_depth,
        }
    }
}

/// Default WS-Management header values.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderDefaults {
    /// wsman:MaxEnvelopeSize in bytes
    pub max_envelope_size: Option<u32>,

    /// wsman:OperationTimeout as an xs:duration
    pub operation_timeout: Option<String>,

    /// wsman:Locale language tag
    pub locale: Option<String>,
}

impl Default for HeaderDefaults {
    fn default() -> Self {
        Self {
            max_envelope_size: Some(153_600),
            operation_timeout: Some("PT60.000S".to_string()),
            locale: Some("en-US".to_string()),
        }
    }
}
