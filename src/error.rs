use std::fmt;

use crate::event_type::EventType;

/// Errors raised while reading, replaying or writing XML events.
#[derive(Debug)]
pub enum Error {
    /// The text-only replay was asked for an event kind that doesn't carry
    /// a single text payload.
    UnsupportedReplay(EventType),
    /// A prefix was used that has no binding in scope.
    UnknownPrefix(String),
    /// An element carries two attributes with the same namespace and local
    /// name. The payload is the attribute as written in the source.
    DuplicateAttribute(String),
    /// The source closes an element with a name that doesn't match the open
    /// element.
    UnexpectedEndTag { expected: String, found: String },
    /// An end tag (namespace, local name) doesn't match the innermost open
    /// start tag.
    UnbalancedEndTag { expected: String, found: String },
    /// The stream ended while elements were still open.
    UnclosedElements(usize),
    /// The input has no document element.
    NoDocumentElement,
    /// An attribute or namespace declaration was written while no start tag
    /// was open.
    NoOpenStartTag,
    /// A prefix was declared twice on the same element with different
    /// namespaces.
    ConflictingNamespace {
        prefix: String,
        existing: String,
        declared: String,
    },
    /// An `&` without a closing `;`.
    UnclosedEntity(String),
    /// An entity reference that can't be expanded where it occurs.
    InvalidEntity(String),
    /// A character reference that doesn't denote a valid character.
    InvalidCharacterReference(String),
    /// Input bytes couldn't be decoded.
    Encoding(String),
    /// The underlying tokenizer rejected the input.
    Parser(xmlparser::Error),
    /// Writing to the output failed.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnsupportedReplay(event_type) => write!(
                f,
                "{:?} events cannot be replayed from a text event, only text kinds can",
                event_type
            ),
            Error::UnknownPrefix(prefix) => write!(f, "unknown prefix: {}", prefix),
            Error::DuplicateAttribute(name) => write!(f, "duplicate attribute: {}", name),
            Error::UnexpectedEndTag { expected, found } => {
                write!(f, "expected end tag </{}>, found </{}>", expected, found)
            }
            Error::UnbalancedEndTag { expected, found } => write!(
                f,
                "end element {} does not match open element {}",
                found, expected
            ),
            Error::UnclosedElements(count) => write!(f, "{} element(s) left open", count),
            Error::NoDocumentElement => write!(f, "no document element"),
            Error::NoOpenStartTag => write!(f, "no start tag is open"),
            Error::ConflictingNamespace {
                prefix,
                existing,
                declared,
            } => write!(
                f,
                "prefix {:?} is already bound to {:?} on this element, cannot bind it to {:?}",
                prefix, existing, declared
            ),
            Error::UnclosedEntity(entity) => write!(f, "unclosed entity: &{}", entity),
            Error::InvalidEntity(entity) => write!(f, "invalid entity: &{};", entity),
            Error::InvalidCharacterReference(reference) => {
                write!(f, "invalid character reference: &{};", reference)
            }
            Error::Encoding(message) => write!(f, "encoding error: {}", message),
            Error::Parser(e) => write!(f, "{}", e),
            Error::Io(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Parser(e) => Some(e),
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<xmlparser::Error> for Error {
    #[inline]
    fn from(e: xmlparser::Error) -> Self {
        Error::Parser(e)
    }
}

impl From<std::io::Error> for Error {
    #[inline]
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}
