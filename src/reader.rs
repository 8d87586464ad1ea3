use crate::error::Error;
use crate::event::{Attribute, Namespace, XmlEvent};
use crate::event_type::EventType;
use crate::location::Location;
use crate::namespace::NamespaceContext;

/// A pull reader positioned at one event at a time.
///
/// Call [`XmlReader::next_event`] to advance; the accessors then describe the
/// current event. Which accessors are meaningful depends on the event kind:
///
/// - `StartDocument`: [`version`](XmlReader::version),
///   [`encoding`](XmlReader::encoding), [`standalone`](XmlReader::standalone).
/// - `StartElement`, `EndElement`: the qualified name accessors; for a
///   start tag also the attribute accessors and the namespace declaration
///   range.
/// - `Attribute`: the qualified name accessors, with the value in
///   [`text`](XmlReader::text).
/// - text kinds: [`text`](XmlReader::text).
///
/// Indexed accessors panic when the index is out of range.
pub trait XmlReader {
    /// Move to the next event and return its kind, or `None` once the end
    /// document event has been passed.
    fn next_event(&mut self) -> Result<Option<EventType>, Error>;

    /// The kind of the current event; `None` before the first call to
    /// [`next_event`](XmlReader::next_event) and after the end.
    fn event_type(&self) -> Option<EventType>;

    /// Where the current event starts.
    fn location(&self) -> Location;

    /// The version from the XML declaration.
    fn version(&self) -> Option<&str>;

    /// The encoding from the XML declaration.
    fn encoding(&self) -> Option<&str>;

    /// The standalone flag from the XML declaration.
    fn standalone(&self) -> Option<bool>;

    /// The namespace URI of the current element or attribute.
    fn namespace_uri(&self) -> &str;

    /// The local name of the current element or attribute.
    fn local_name(&self) -> &str;

    /// The prefix of the current element or attribute; empty if there is
    /// none.
    fn prefix(&self) -> &str;

    /// The text of the current event.
    fn text(&self) -> &str;

    /// The number of attributes on the current start tag.
    fn attribute_count(&self) -> usize;

    fn attribute_namespace(&self, index: usize) -> &str;

    fn attribute_local_name(&self, index: usize) -> &str;

    fn attribute_prefix(&self, index: usize) -> &str;

    fn attribute_value(&self, index: usize) -> &str;

    /// Start of the index range of namespace declarations made on the
    /// current element.
    fn namespace_start(&self) -> usize;

    /// End (exclusive) of the index range of namespace declarations made on
    /// the current element.
    fn namespace_end(&self) -> usize;

    fn namespace_prefix(&self, index: usize) -> &str;

    fn namespace_uri_at(&self, index: usize) -> &str;

    /// The namespace bindings in scope at the current event.
    fn namespace_context(&self) -> &dyn NamespaceContext;

    /// All attributes of the current start tag.
    fn attributes(&self) -> Vec<Attribute> {
        let location = self.location();
        (0..self.attribute_count())
            .map(|i| Attribute {
                location,
                namespace_uri: self.attribute_namespace(i).to_string(),
                local_name: self.attribute_local_name(i).to_string(),
                prefix: self.attribute_prefix(i).to_string(),
                value: self.attribute_value(i).to_string(),
            })
            .collect()
    }

    /// The namespace declarations made on the current element.
    fn namespace_decls(&self) -> Vec<Namespace> {
        (self.namespace_start()..self.namespace_end())
            .map(|i| Namespace::new(self.namespace_prefix(i), self.namespace_uri_at(i)))
            .collect()
    }

    /// A snapshot of the current event.
    fn to_event(&self) -> Option<XmlEvent> {
        self.event_type()
            .map(|event_type| event_type.create_event(self))
    }
}
