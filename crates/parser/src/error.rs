//! Error types for the parser crate

use thiserror::Error;

/// The only hard failure of the parser: the payload is not well-formed XML.
///
/// Missing elements or attributes are never errors; they become absent
/// fields or empty collections.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Malformed XML: {0}")]
    Malformed(String),
}

impl ParseError {
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        ParseError::Malformed(msg.into())
    }
}

impl From<quick_xml::Error> for ParseError {
    fn from(e: quick_xml::Error) -> Self {
        ParseError::Malformed(e.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for ParseError {
    fn from(e: quick_xml::events::attributes::AttrError) -> Self {
        ParseError::Malformed(e.to_string())
    }
}

pub type ParseResult<T> = std::result::Result<T, ParseError>;
