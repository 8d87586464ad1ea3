use std::ops::Range;

use log::trace;

use crate::error::Error;
use crate::event::{Attribute, XmlEvent};
use crate::event_type::EventType;
use crate::location::Location;
use crate::namespace::{NamespaceContext, NamespaceStack};
use crate::reader::XmlReader;

/// An [`XmlReader`] that reads back a sequence of event snapshots.
///
/// Namespace declarations of start element snapshots are tracked, so the
/// reader's namespace context is the same as that of the reader the
/// snapshots were taken from. Unlike [`StrReader`](crate::StrReader) this
/// reader can also be positioned at stand-alone `Attribute` events.
///
/// ```rust
/// use xmlreplay::{events, EventReader, EventType, StrReader, XmlReader};
///
/// let snapshots = events(StrReader::new("<doc>text</doc>"))
///     .collect::<Result<Vec<_>, _>>()?;
/// let mut reader = EventReader::new(snapshots);
/// assert_eq!(reader.next_event()?, Some(EventType::StartDocument));
/// assert_eq!(reader.next_event()?, Some(EventType::StartElement));
/// assert_eq!(reader.local_name(), "doc");
/// # Ok::<(), xmlreplay::Error>(())
/// ```
pub struct EventReader<I: Iterator<Item = XmlEvent>> {
    events: I,
    current: Option<XmlEvent>,
    namespaces: NamespaceStack,
    namespace_range: Range<usize>,
    pop_scope: bool,
}

impl<I: Iterator<Item = XmlEvent>> EventReader<I> {
    /// Create a reader positioned before the first of `events`.
    pub fn new<T>(events: T) -> Self
    where
        T: IntoIterator<Item = XmlEvent, IntoIter = I>,
    {
        EventReader {
            events: events.into_iter(),
            current: None,
            namespaces: NamespaceStack::new(),
            namespace_range: 0..0,
            pop_scope: false,
        }
    }

    /// The snapshot the reader is positioned at.
    pub fn current(&self) -> Option<&XmlEvent> {
        self.current.as_ref()
    }

    fn attribute(&self, index: usize) -> &Attribute {
        match &self.current {
            Some(XmlEvent::StartElement(e)) => &e.attributes[index],
            _ => panic!("attribute index {} out of range", index),
        }
    }
}

impl<I: Iterator<Item = XmlEvent>> XmlReader for EventReader<I> {
    fn next_event(&mut self) -> Result<Option<EventType>, Error> {
        if self.pop_scope {
            self.namespaces.pop_scope();
            self.pop_scope = false;
        }
        self.current = self.events.next();
        let len = self.namespaces.len();
        self.namespace_range = len..len;
        match &self.current {
            Some(XmlEvent::StartElement(e)) => {
                self.namespaces.push_scope();
                for namespace in &e.namespace_decls {
                    self.namespaces
                        .declare(&namespace.prefix, &namespace.namespace_uri)?;
                }
                self.namespace_range = self.namespaces.frame_range();
            }
            Some(XmlEvent::EndElement(_)) => {
                self.namespace_range = self.namespaces.frame_range();
                self.pop_scope = true;
            }
            _ => {}
        }
        let event_type = self.current.as_ref().map(XmlEvent::event_type);
        if let Some(event_type) = event_type {
            trace!("replaying snapshot {:?}", event_type);
        }
        Ok(event_type)
    }

    fn event_type(&self) -> Option<EventType> {
        self.current.as_ref().map(XmlEvent::event_type)
    }

    fn location(&self) -> Location {
        self.current
            .as_ref()
            .map(XmlEvent::location)
            .unwrap_or_default()
    }

    fn version(&self) -> Option<&str> {
        match &self.current {
            Some(XmlEvent::StartDocument(e)) => e.version.as_deref(),
            _ => None,
        }
    }

    fn encoding(&self) -> Option<&str> {
        match &self.current {
            Some(XmlEvent::StartDocument(e)) => e.encoding.as_deref(),
            _ => None,
        }
    }

    fn standalone(&self) -> Option<bool> {
        match &self.current {
            Some(XmlEvent::StartDocument(e)) => e.standalone,
            _ => None,
        }
    }

    fn namespace_uri(&self) -> &str {
        match &self.current {
            Some(XmlEvent::StartElement(e)) => &e.namespace_uri,
            Some(XmlEvent::EndElement(e)) => &e.namespace_uri,
            Some(XmlEvent::Attribute(e)) => &e.namespace_uri,
            _ => "",
        }
    }

    fn local_name(&self) -> &str {
        match &self.current {
            Some(XmlEvent::StartElement(e)) => &e.local_name,
            Some(XmlEvent::EndElement(e)) => &e.local_name,
            Some(XmlEvent::Attribute(e)) => &e.local_name,
            _ => "",
        }
    }

    fn prefix(&self) -> &str {
        match &self.current {
            Some(XmlEvent::StartElement(e)) => &e.prefix,
            Some(XmlEvent::EndElement(e)) => &e.prefix,
            Some(XmlEvent::Attribute(e)) => &e.prefix,
            _ => "",
        }
    }

    fn text(&self) -> &str {
        match &self.current {
            Some(XmlEvent::Text(e)) => &e.text,
            Some(XmlEvent::Attribute(e)) => &e.value,
            _ => "",
        }
    }

    fn attribute_count(&self) -> usize {
        match &self.current {
            Some(XmlEvent::StartElement(e)) => e.attributes.len(),
            _ => 0,
        }
    }

    fn attribute_namespace(&self, index: usize) -> &str {
        &self.attribute(index).namespace_uri
    }

    fn attribute_local_name(&self, index: usize) -> &str {
        &self.attribute(index).local_name
    }

    fn attribute_prefix(&self, index: usize) -> &str {
        &self.attribute(index).prefix
    }

    fn attribute_value(&self, index: usize) -> &str {
        &self.attribute(index).value
    }

    fn namespace_start(&self) -> usize {
        self.namespace_range.start
    }

    fn namespace_end(&self) -> usize {
        self.namespace_range.end
    }

    fn namespace_prefix(&self, index: usize) -> &str {
        self.namespaces.binding(index).0
    }

    fn namespace_uri_at(&self, index: usize) -> &str {
        self.namespaces.binding(index).1
    }

    fn namespace_context(&self) -> &dyn NamespaceContext {
        &self.namespaces
    }
}
