use crate::error::Error;
use crate::event_type::{prefix_hint, EventType};
use crate::location::Location;
use crate::namespace::SimpleNamespaceContext;
use crate::writer::XmlWriter;

/// An immutable snapshot of a single event.
///
/// Create it with [`EventType::create_event`] or
/// [`XmlReader::to_event`](crate::XmlReader::to_event). It stays valid after
/// the reader moves on.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum XmlEvent {
    /// Start of the document.
    StartDocument(StartDocumentEvent),
    /// Start tag.
    StartElement(StartElementEvent),
    /// End tag.
    EndElement(EndElementEvent),
    /// Any event whose payload is a single text: comment, text, CDATA,
    /// doctype, entity reference, ignorable whitespace or processing
    /// instruction.
    Text(TextEvent),
    /// End of the document.
    EndDocument(EndDocumentEvent),
    /// A single attribute.
    Attribute(Attribute),
}

impl XmlEvent {
    /// The kind of this event.
    pub fn event_type(&self) -> EventType {
        match self {
            XmlEvent::StartDocument(_) => EventType::StartDocument,
            XmlEvent::StartElement(_) => EventType::StartElement,
            XmlEvent::EndElement(_) => EventType::EndElement,
            XmlEvent::Text(text_event) => text_event.event_type,
            XmlEvent::EndDocument(_) => EventType::EndDocument,
            XmlEvent::Attribute(_) => EventType::Attribute,
        }
    }

    /// Where the event started in its source.
    pub fn location(&self) -> Location {
        match self {
            XmlEvent::StartDocument(e) => e.location,
            XmlEvent::StartElement(e) => e.location,
            XmlEvent::EndElement(e) => e.location,
            XmlEvent::Text(e) => e.location,
            XmlEvent::EndDocument(e) => e.location,
            XmlEvent::Attribute(e) => e.location,
        }
    }

    /// See [`EventType::is_ignorable`].
    pub fn is_ignorable(&self) -> bool {
        self.event_type().is_ignorable()
    }

    /// Replay this snapshot onto `writer`.
    ///
    /// This makes the same writer calls as [`EventType::write_event`] does
    /// for the reader position the snapshot was taken from.
    pub fn write_to<W: XmlWriter + ?Sized>(&self, writer: &mut W) -> Result<(), Error> {
        match self {
            XmlEvent::StartDocument(e) => writer.start_document(
                e.version.as_deref(),
                e.encoding.as_deref(),
                e.standalone,
            ),
            XmlEvent::StartElement(e) => {
                writer.start_tag(&e.namespace_uri, &e.local_name, &e.prefix)?;
                for namespace in &e.namespace_decls {
                    writer.namespace_attr(&namespace.prefix, &namespace.namespace_uri)?;
                }
                for attribute in &e.attributes {
                    writer.attribute(
                        &attribute.namespace_uri,
                        &attribute.local_name,
                        None,
                        &attribute.value,
                    )?;
                }
                Ok(())
            }
            XmlEvent::EndElement(e) => writer.end_tag(&e.namespace_uri, &e.local_name, &e.prefix),
            XmlEvent::Text(e) => e.write_to(writer),
            XmlEvent::EndDocument(_) => writer.end_document(),
            XmlEvent::Attribute(e) => writer.attribute(
                &e.namespace_uri,
                &e.local_name,
                prefix_hint(&e.prefix),
                &e.value,
            ),
        }
    }
}

/// Start of a document.
///
/// All fields are `None` if the document has no XML declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StartDocumentEvent {
    pub location: Location,
    pub version: Option<String>,
    pub encoding: Option<String>,
    pub standalone: Option<bool>,
}

/// Start tag.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StartElementEvent {
    pub location: Location,
    pub namespace_uri: String,
    pub local_name: String,
    pub prefix: String,
    /// Attributes in source order. Namespace declarations are not included.
    pub attributes: Vec<Attribute>,
    /// Namespace declarations made on this element, in declaration order.
    pub namespace_decls: Vec<Namespace>,
}

impl StartElementEvent {
    /// The value of the attribute with the given name, if present.
    pub fn attribute(&self, namespace_uri: &str, local_name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.namespace_uri == namespace_uri && a.local_name == local_name)
            .map(|a| a.value.as_str())
    }

    /// The namespace declarations of this element as a context.
    ///
    /// Use [`FragmentNamespaceContext`](crate::FragmentNamespaceContext) to
    /// nest it in the context of the enclosing elements.
    pub fn declared_namespaces(&self) -> SimpleNamespaceContext {
        self.namespace_decls
            .iter()
            .map(|n| (n.prefix.as_str(), n.namespace_uri.as_str()))
            .collect()
    }
}

/// End tag.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EndElementEvent {
    pub location: Location,
    pub namespace_uri: String,
    pub local_name: String,
    pub prefix: String,
}

/// An event that consists of a single text.
///
/// Which kind of text it is (comment, CDATA, ...) is in `event_type`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TextEvent {
    pub location: Location,
    pub event_type: EventType,
    pub text: String,
}

impl TextEvent {
    /// Create a text event.
    pub fn new<S: Into<String>>(location: Location, event_type: EventType, text: S) -> Self {
        TextEvent {
            location,
            event_type,
            text: text.into(),
        }
    }

    /// Replay this event onto `writer` as its own kind.
    ///
    /// Fails with [`Error::UnsupportedReplay`] if `event_type` is not a text
    /// kind.
    pub fn write_to<W: XmlWriter + ?Sized>(&self, writer: &mut W) -> Result<(), Error> {
        self.event_type.write_text_event(writer, self)
    }
}

/// End of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EndDocumentEvent {
    pub location: Location,
}

/// An attribute, either inside a start tag or as an event on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Attribute {
    pub location: Location,
    pub namespace_uri: String,
    pub local_name: String,
    pub prefix: String,
    pub value: String,
}

/// A namespace declaration, i.e. `xmlns:prefix="namespace_uri"`.
///
/// The default namespace has the empty prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Namespace {
    pub prefix: String,
    pub namespace_uri: String,
}

impl Namespace {
    /// Create a namespace declaration.
    pub fn new<P: Into<String>, U: Into<String>>(prefix: P, namespace_uri: U) -> Self {
        Namespace {
            prefix: prefix.into(),
            namespace_uri: namespace_uri.into(),
        }
    }
}
