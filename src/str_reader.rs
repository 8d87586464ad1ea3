use std::borrow::Cow;
use std::collections::VecDeque;
use std::ops::Range;

use ahash::HashSet;
use log::trace;
use xmlparser::{ElementEnd, StrSpan, Token, Tokenizer};

use crate::entity::{parse_attribute_value, split_references, TextPart};
use crate::error::Error;
use crate::event_type::EventType;
use crate::location::{Location, LocationTracker};
use crate::namespace::{NamespaceContext, NamespaceStack, XMLNS_ATTRIBUTE};
use crate::reader::XmlReader;

const DOCTYPE_OPEN: &str = "<!DOCTYPE";

#[derive(Debug)]
struct ReadAttribute<'a> {
    namespace_uri: String,
    local_name: &'a str,
    prefix: &'a str,
    value: Cow<'a, str>,
}

#[derive(Debug, Default)]
struct ReadEvent<'a> {
    event_type: Option<EventType>,
    location: Location,
    namespace_uri: String,
    local_name: &'a str,
    prefix: &'a str,
    text: Cow<'a, str>,
    attributes: Vec<ReadAttribute<'a>>,
    namespace_range: Range<usize>,
}

#[derive(Debug, Default)]
struct Declaration<'a> {
    version: Option<&'a str>,
    encoding: Option<&'a str>,
    standalone: Option<bool>,
}

// a start tag whose attributes are still being tokenized
#[derive(Debug)]
struct StartTag<'a> {
    location: Location,
    prefix: &'a str,
    local: &'a str,
    attributes: Vec<(&'a str, &'a str, Cow<'a, str>)>,
    declarations: Vec<(&'a str, Cow<'a, str>)>,
}

#[derive(Debug)]
struct OpenTag<'a> {
    prefix: &'a str,
    local: &'a str,
}

fn qualified_name(prefix: &str, local: &str) -> String {
    if prefix.is_empty() {
        local.to_string()
    } else {
        format!("{}:{}", prefix, local)
    }
}

fn is_xml_whitespace(text: &str) -> bool {
    text.chars()
        .all(|c| matches!(c, ' ' | '\t' | '\r' | '\n'))
}

fn token_range(token: &Token) -> Range<usize> {
    let span = match token {
        Token::Declaration { span, .. }
        | Token::ProcessingInstruction { span, .. }
        | Token::Comment { span, .. }
        | Token::DtdStart { span, .. }
        | Token::EmptyDtd { span, .. }
        | Token::EntityDeclaration { span, .. }
        | Token::DtdEnd { span }
        | Token::ElementStart { span, .. }
        | Token::Attribute { span, .. }
        | Token::ElementEnd { span, .. }
        | Token::Cdata { span, .. } => span,
        Token::Text { text } => text,
    };
    span.start()..span.end()
}

/// An [`XmlReader`] over XML text in memory.
///
/// The reader reports a `StartDocument` event first and an `EndDocument`
/// event last, whether or not the text has an XML declaration. Element and
/// attribute names are resolved against the namespace declarations in
/// scope. Predefined entities and character references are expanded into
/// the text; any other entity reference is reported as an `EntityRef`
/// event. Whitespace between markup outside the document element is
/// reported as `IgnorableWhitespace`.
///
/// Input without a document element is rejected with
/// [`Error::NoDocumentElement`].
///
/// ```rust
/// use xmlreplay::{EventType, StrReader, XmlReader};
///
/// let mut reader = StrReader::new(r#"<a:doc xmlns:a="urn:a">text</a:doc>"#);
/// assert_eq!(reader.next_event()?, Some(EventType::StartDocument));
/// assert_eq!(reader.next_event()?, Some(EventType::StartElement));
/// assert_eq!(reader.namespace_uri(), "urn:a");
/// assert_eq!(reader.local_name(), "doc");
/// assert_eq!(reader.next_event()?, Some(EventType::Text));
/// assert_eq!(reader.text(), "text");
/// # Ok::<(), xmlreplay::Error>(())
/// ```
pub struct StrReader<'a> {
    text: &'a str,
    tokenizer: Tokenizer<'a>,
    locations: LocationTracker<'a>,
    namespaces: NamespaceStack,
    declaration: Declaration<'a>,
    start_tag: Option<StartTag<'a>>,
    open: Vec<OpenTag<'a>>,
    doctype_start: Option<(usize, Location)>,
    // end of the last token, where the next whitespace gap starts
    token_end: usize,
    root_seen: bool,
    pending: VecDeque<ReadEvent<'a>>,
    current: ReadEvent<'a>,
    started: bool,
    finished: bool,
    pop_scope: bool,
}

impl<'a> StrReader<'a> {
    /// Create a reader positioned before the first event of `text`.
    pub fn new(text: &'a str) -> Self {
        StrReader {
            text,
            tokenizer: Tokenizer::from(text),
            locations: LocationTracker::new(text),
            namespaces: NamespaceStack::new(),
            declaration: Declaration::default(),
            start_tag: None,
            open: Vec::new(),
            doctype_start: None,
            token_end: 0,
            root_seen: false,
            pending: VecDeque::new(),
            current: ReadEvent::default(),
            started: false,
            finished: false,
            pop_scope: false,
        }
    }

    /// The number of elements open at the current event.
    pub fn depth(&self) -> usize {
        self.namespaces.depth()
    }

    fn event(&mut self, event_type: EventType, offset: usize) -> ReadEvent<'a> {
        ReadEvent {
            event_type: Some(event_type),
            location: self.locations.locate(offset),
            ..Default::default()
        }
    }

    fn push_text(&mut self, event_type: EventType, offset: usize, text: Cow<'a, str>) {
        let mut event = self.event(event_type, offset);
        event.text = text;
        self.pending.push_back(event);
    }

    fn fill(&mut self) -> Result<(), Error> {
        while self.pending.is_empty() && !self.finished {
            let token = match self.tokenizer.next() {
                Some(token) => Some(token?),
                None => None,
            };
            if !self.started {
                self.started = true;
                let start_document = self.event(EventType::StartDocument, 0);
                self.pending.push_back(start_document);
                if let Some(Token::Declaration {
                    version,
                    encoding,
                    standalone,
                    span,
                }) = &token
                {
                    self.declaration = Declaration {
                        version: Some(version.as_str()),
                        encoding: encoding.as_ref().map(|e| e.as_str()),
                        standalone: *standalone,
                    };
                    self.token_end = span.end();
                    continue;
                }
            }
            match token {
                Some(token) => {
                    let range = token_range(&token);
                    self.push_whitespace_gap(range.start);
                    self.token_end = range.end;
                    self.handle_token(token)?
                }
                None => self.finish()?,
            }
        }
        Ok(())
    }

    fn handle_token(&mut self, token: Token<'a>) -> Result<(), Error> {
        match token {
            // only allowed first, and handled there
            Token::Declaration { .. } => {}
            Token::ProcessingInstruction {
                target,
                content,
                span,
            } => {
                let text = match content {
                    Some(content) => {
                        Cow::Owned(format!("{} {}", target.as_str(), content.as_str()))
                    }
                    None => Cow::Borrowed(target.as_str()),
                };
                self.push_text(EventType::ProcessingInstruction, span.start(), text);
            }
            Token::Comment { text, span } => {
                self.push_text(EventType::Comment, span.start(), Cow::Borrowed(text.as_str()))
            }
            Token::DtdStart { span, .. } => {
                let location = self.locations.locate(span.start());
                self.doctype_start = Some((span.start(), location));
            }
            Token::EmptyDtd { span, .. } => {
                let location = self.locations.locate(span.start());
                self.push_doctype(span.start(), span.end(), location);
            }
            Token::EntityDeclaration { .. } => {}
            Token::DtdEnd { span } => {
                if let Some((start, location)) = self.doctype_start.take() {
                    self.push_doctype(start, span.end(), location);
                }
            }
            Token::ElementStart {
                prefix,
                local,
                span,
            } => {
                self.start_tag = Some(StartTag {
                    location: self.locations.locate(span.start()),
                    prefix: prefix.as_str(),
                    local: local.as_str(),
                    attributes: Vec::new(),
                    declarations: Vec::new(),
                });
            }
            Token::Attribute {
                prefix,
                local,
                value,
                ..
            } => {
                let tag = self.start_tag.as_mut().ok_or(Error::NoOpenStartTag)?;
                let value = parse_attribute_value(value.as_str())?;
                match (prefix.as_str(), local.as_str()) {
                    (XMLNS_ATTRIBUTE, prefix) => tag.declarations.push((prefix, value)),
                    ("", XMLNS_ATTRIBUTE) => tag.declarations.push(("", value)),
                    (prefix, local) => tag.attributes.push((prefix, local, value)),
                }
            }
            Token::ElementEnd { end, span } => match end {
                ElementEnd::Open => self.open_start_tag(false, span.start())?,
                ElementEnd::Empty => self.open_start_tag(true, span.start())?,
                ElementEnd::Close(prefix, local) => {
                    self.close_tag(prefix.as_str(), local.as_str(), span.start())?
                }
            },
            Token::Text { text } => self.push_character_data(text)?,
            Token::Cdata { text, span } => {
                self.push_text(EventType::CData, span.start(), Cow::Borrowed(text.as_str()))
            }
        }
        Ok(())
    }

    fn push_doctype(&mut self, start: usize, end: usize, location: Location) {
        let text: &'a str = self.text;
        let source = &text[start..end];
        let inner = source
            .strip_prefix(DOCTYPE_OPEN)
            .and_then(|s| s.strip_suffix('>'))
            .unwrap_or(source)
            .trim();
        self.pending.push_back(ReadEvent {
            event_type: Some(EventType::DocDecl),
            location,
            text: Cow::Borrowed(inner),
            ..Default::default()
        });
    }

    // the tokenizer skips whitespace between markup in the prolog and epilog
    fn push_whitespace_gap(&mut self, end: usize) {
        if !self.open.is_empty()
            || self.start_tag.is_some()
            || self.doctype_start.is_some()
            || end <= self.token_end
        {
            return;
        }
        let text: &'a str = self.text;
        let gap = &text[self.token_end..end];
        if is_xml_whitespace(gap) {
            let offset = self.token_end;
            self.push_text(EventType::IgnorableWhitespace, offset, Cow::Borrowed(gap));
        }
    }

    fn resolve(&self, prefix: &str) -> Result<String, Error> {
        match self.namespaces.namespace_uri(prefix) {
            Some(namespace_uri) => Ok(namespace_uri.to_string()),
            // no default namespace declared
            None if prefix.is_empty() => Ok(String::new()),
            None => Err(Error::UnknownPrefix(prefix.to_string())),
        }
    }

    fn open_start_tag(&mut self, empty: bool, end_offset: usize) -> Result<(), Error> {
        let tag = self.start_tag.take().ok_or(Error::NoOpenStartTag)?;
        self.root_seen = true;
        self.namespaces.push_scope();
        trace!(
            "enter namespace scope {} at {}",
            self.namespaces.depth(),
            tag.location
        );
        let mut declared = HashSet::default();
        for (prefix, namespace_uri) in &tag.declarations {
            if !declared.insert(*prefix) {
                let name = if prefix.is_empty() {
                    XMLNS_ATTRIBUTE.to_string()
                } else {
                    qualified_name(XMLNS_ATTRIBUTE, prefix)
                };
                return Err(Error::DuplicateAttribute(name));
            }
            self.namespaces.declare(prefix, namespace_uri)?;
        }
        let namespace_range = self.namespaces.frame_range();
        let namespace_uri = self.resolve(tag.prefix)?;

        let mut seen = HashSet::default();
        let mut attributes = Vec::with_capacity(tag.attributes.len());
        for (prefix, local, value) in tag.attributes {
            // unprefixed attributes are never in the default namespace
            let attribute_namespace = if prefix.is_empty() {
                String::new()
            } else {
                self.resolve(prefix)?
            };
            if !seen.insert((attribute_namespace.clone(), local)) {
                return Err(Error::DuplicateAttribute(qualified_name(prefix, local)));
            }
            attributes.push(ReadAttribute {
                namespace_uri: attribute_namespace,
                local_name: local,
                prefix,
                value,
            });
        }

        self.pending.push_back(ReadEvent {
            event_type: Some(EventType::StartElement),
            location: tag.location,
            namespace_uri: namespace_uri.clone(),
            local_name: tag.local,
            prefix: tag.prefix,
            attributes,
            namespace_range: namespace_range.clone(),
            ..Default::default()
        });
        if empty {
            let location = self.locations.locate(end_offset);
            self.pending.push_back(ReadEvent {
                event_type: Some(EventType::EndElement),
                location,
                namespace_uri,
                local_name: tag.local,
                prefix: tag.prefix,
                namespace_range,
                ..Default::default()
            });
        } else {
            self.open.push(OpenTag {
                prefix: tag.prefix,
                local: tag.local,
            });
        }
        Ok(())
    }

    fn close_tag(&mut self, prefix: &'a str, local: &'a str, offset: usize) -> Result<(), Error> {
        let open = self.open.pop().ok_or_else(|| Error::UnexpectedEndTag {
            expected: String::new(),
            found: qualified_name(prefix, local),
        })?;
        if open.prefix != prefix || open.local != local {
            return Err(Error::UnexpectedEndTag {
                expected: qualified_name(open.prefix, open.local),
                found: qualified_name(prefix, local),
            });
        }
        let namespace_uri = self.resolve(prefix)?;
        let location = self.locations.locate(offset);
        self.pending.push_back(ReadEvent {
            event_type: Some(EventType::EndElement),
            location,
            namespace_uri,
            local_name: local,
            prefix,
            namespace_range: self.namespaces.frame_range(),
            ..Default::default()
        });
        Ok(())
    }

    fn push_character_data(&mut self, text: StrSpan<'a>) -> Result<(), Error> {
        let start = text.start();
        for (offset, part) in split_references(text.as_str())? {
            match part {
                TextPart::Text(run) => self.push_text(EventType::Text, start + offset, run),
                TextPart::EntityRef(name) => {
                    self.push_text(EventType::EntityRef, start + offset, Cow::Borrowed(name))
                }
            }
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<(), Error> {
        if !self.open.is_empty() {
            return Err(Error::UnclosedElements(self.open.len()));
        }
        if !self.root_seen {
            return Err(Error::NoDocumentElement);
        }
        self.push_whitespace_gap(self.text.len());
        let end_document = self.event(EventType::EndDocument, self.text.len());
        self.pending.push_back(end_document);
        self.finished = true;
        Ok(())
    }
}

impl<'a> XmlReader for StrReader<'a> {
    fn next_event(&mut self) -> Result<Option<EventType>, Error> {
        // declarations of an element stay in scope up to and including its
        // end element
        if self.pop_scope {
            self.namespaces.pop_scope();
            self.pop_scope = false;
            trace!("leave namespace scope {}", self.namespaces.depth() + 1);
        }
        self.fill()?;
        self.current = self.pending.pop_front().unwrap_or_default();
        if self.current.event_type == Some(EventType::EndElement) {
            self.pop_scope = true;
        }
        Ok(self.current.event_type)
    }

    fn event_type(&self) -> Option<EventType> {
        self.current.event_type
    }

    fn location(&self) -> Location {
        self.current.location
    }

    fn version(&self) -> Option<&str> {
        self.declaration.version
    }

    fn encoding(&self) -> Option<&str> {
        self.declaration.encoding
    }

    fn standalone(&self) -> Option<bool> {
        self.declaration.standalone
    }

    fn namespace_uri(&self) -> &str {
        &self.current.namespace_uri
    }

    fn local_name(&self) -> &str {
        self.current.local_name
    }

    fn prefix(&self) -> &str {
        self.current.prefix
    }

    fn text(&self) -> &str {
        &self.current.text
    }

    fn attribute_count(&self) -> usize {
        self.current.attributes.len()
    }

    fn attribute_namespace(&self, index: usize) -> &str {
        &self.current.attributes[index].namespace_uri
    }

    fn attribute_local_name(&self, index: usize) -> &str {
        self.current.attributes[index].local_name
    }

    fn attribute_prefix(&self, index: usize) -> &str {
        self.current.attributes[index].prefix
    }

    fn attribute_value(&self, index: usize) -> &str {
        &self.current.attributes[index].value
    }

    fn namespace_start(&self) -> usize {
        self.current.namespace_range.start
    }

    fn namespace_end(&self) -> usize {
        self.current.namespace_range.end
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
