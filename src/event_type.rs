use crate::error::Error;
use crate::event::{
    Attribute, EndDocumentEvent, EndElementEvent, StartDocumentEvent, StartElementEvent,
    TextEvent, XmlEvent,
};
use crate::reader::XmlReader;
use crate::writer::XmlWriter;

/// The kind of event a reader is positioned at.
///
/// Each kind knows how to take a snapshot of the reader's current event
/// ([`EventType::create_event`]) and how to replay it onto a writer straight
/// from the reader ([`EventType::write_event`]), without building an
/// [`XmlEvent`] first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EventType {
    /// Start of the document, with the XML declaration if there is one.
    StartDocument,
    /// Start tag, with attributes and namespace declarations.
    StartElement,
    /// End tag.
    EndElement,
    /// Comment, i.e. `<!--text-->`.
    Comment,
    /// Character data.
    Text,
    /// CDATA section, i.e. `<![CDATA[text]]>`.
    CData,
    /// Document type declaration, i.e. `<!DOCTYPE text>`.
    DocDecl,
    /// End of the document.
    EndDocument,
    /// Entity reference, i.e. `&text;`.
    EntityRef,
    /// Whitespace that isn't content.
    IgnorableWhitespace,
    /// A single attribute, outside of a start tag.
    Attribute,
    /// Processing instruction, i.e. `<?text?>`.
    ProcessingInstruction,
}

impl EventType {
    /// Every event kind.
    pub const ALL: [EventType; 12] = [
        EventType::StartDocument,
        EventType::StartElement,
        EventType::EndElement,
        EventType::Comment,
        EventType::Text,
        EventType::CData,
        EventType::DocDecl,
        EventType::EndDocument,
        EventType::EntityRef,
        EventType::IgnorableWhitespace,
        EventType::Attribute,
        EventType::ProcessingInstruction,
    ];

    /// Whether events of this kind carry no document content, and can be
    /// skipped when comparing or pretty printing documents.
    pub fn is_ignorable(self) -> bool {
        use EventType::*;
        match self {
            StartDocument | Comment | DocDecl | EndDocument | IgnorableWhitespace
            | ProcessingInstruction => true,
            StartElement | EndElement | Text | CData | EntityRef | Attribute => false,
        }
    }

    /// Whether the payload of this kind is a single text, so that it is
    /// represented as a [`TextEvent`] and can be replayed with
    /// [`EventType::write_text_event`].
    pub fn is_text(self) -> bool {
        use EventType::*;
        match self {
            Comment | Text | CData | DocDecl | EntityRef | IgnorableWhitespace
            | ProcessingInstruction => true,
            StartDocument | StartElement | EndElement | EndDocument | Attribute => false,
        }
    }

    /// Take a snapshot of the event the reader is positioned at.
    ///
    /// The reader is not advanced. The reader must be positioned at an event
    /// of this kind; otherwise the result is meaningless.
    pub fn create_event<R: XmlReader + ?Sized>(self, reader: &R) -> XmlEvent {
        let location = reader.location();
        match self {
            EventType::StartDocument => XmlEvent::StartDocument(StartDocumentEvent {
                location,
                version: reader.version().map(str::to_string),
                encoding: reader.encoding().map(str::to_string),
                standalone: reader.standalone(),
            }),
            EventType::StartElement => XmlEvent::StartElement(StartElementEvent {
                location,
                namespace_uri: reader.namespace_uri().to_string(),
                local_name: reader.local_name().to_string(),
                prefix: reader.prefix().to_string(),
                attributes: reader.attributes(),
                namespace_decls: reader.namespace_decls(),
            }),
            EventType::EndElement => XmlEvent::EndElement(EndElementEvent {
                location,
                namespace_uri: reader.namespace_uri().to_string(),
                local_name: reader.local_name().to_string(),
                prefix: reader.prefix().to_string(),
            }),
            EventType::EndDocument => XmlEvent::EndDocument(EndDocumentEvent { location }),
            EventType::Attribute => XmlEvent::Attribute(Attribute {
                location,
                namespace_uri: reader.namespace_uri().to_string(),
                local_name: reader.local_name().to_string(),
                prefix: reader.prefix().to_string(),
                value: reader.text().to_string(),
            }),
            EventType::Comment
            | EventType::Text
            | EventType::CData
            | EventType::DocDecl
            | EventType::EntityRef
            | EventType::IgnorableWhitespace
            | EventType::ProcessingInstruction => XmlEvent::Text(TextEvent {
                location,
                event_type: self,
                text: reader.text().to_string(),
            }),
        }
    }

    /// Replay the event the reader is positioned at onto `writer`, reading
    /// straight from the reader.
    ///
    /// Attributes of a start tag are written without their source prefix;
    /// the writer picks a prefix that fits the bindings in scope where the
    /// element ends up.
    pub fn write_event<W, R>(self, writer: &mut W, reader: &R) -> Result<(), Error>
    where
        W: XmlWriter + ?Sized,
        R: XmlReader + ?Sized,
    {
        match self {
            EventType::StartDocument => {
                writer.start_document(reader.version(), reader.encoding(), reader.standalone())
            }
            EventType::StartElement => {
                writer.start_tag(reader.namespace_uri(), reader.local_name(), reader.prefix())?;
                for i in reader.namespace_start()..reader.namespace_end() {
                    writer.namespace_attr(reader.namespace_prefix(i), reader.namespace_uri_at(i))?;
                }
                for i in 0..reader.attribute_count() {
                    writer.attribute(
                        reader.attribute_namespace(i),
                        reader.attribute_local_name(i),
                        None,
                        reader.attribute_value(i),
                    )?;
                }
                Ok(())
            }
            EventType::EndElement => {
                writer.end_tag(reader.namespace_uri(), reader.local_name(), reader.prefix())
            }
            EventType::EndDocument => writer.end_document(),
            EventType::Attribute => writer.attribute(
                reader.namespace_uri(),
                reader.local_name(),
                prefix_hint(reader.prefix()),
                reader.text(),
            ),
            EventType::Comment => writer.comment(reader.text()),
            EventType::Text => writer.text(reader.text()),
            EventType::CData => writer.cdsect(reader.text()),
            EventType::DocDecl => writer.docdecl(reader.text()),
            EventType::EntityRef => writer.entity_ref(reader.text()),
            EventType::IgnorableWhitespace => writer.ignorable_whitespace(reader.text()),
            EventType::ProcessingInstruction => writer.processing_instruction(reader.text()),
        }
    }

    /// Replay a text event snapshot as an event of this kind.
    ///
    /// Fails with [`Error::UnsupportedReplay`] for kinds that aren't text
    /// kinds (see [`EventType::is_text`]); nothing is written in that case.
    pub fn write_text_event<W: XmlWriter + ?Sized>(
        self,
        writer: &mut W,
        text_event: &TextEvent,
    ) -> Result<(), Error> {
        let text = text_event.text.as_str();
        match self {
            EventType::Comment => writer.comment(text),
            EventType::Text => writer.text(text),
            EventType::CData => writer.cdsect(text),
            EventType::DocDecl => writer.docdecl(text),
            EventType::EntityRef => writer.entity_ref(text),
            EventType::IgnorableWhitespace => writer.ignorable_whitespace(text),
            EventType::ProcessingInstruction => writer.processing_instruction(text),
            EventType::StartDocument
            | EventType::StartElement
            | EventType::EndElement
            | EventType::EndDocument
            | EventType::Attribute => Err(Error::UnsupportedReplay(self)),
        }
    }
}

// an empty prefix is no preference at all
pub(crate) fn prefix_hint(prefix: &str) -> Option<&str> {
    if prefix.is_empty() {
        None
    } else {
        Some(prefix)
    }
}
