//! A fixed representation of an XML document.
//!
//! It is useful to have a plain value for a document that you can create
//! and store separately, and then write out as events to any
//! [`XmlWriter`]. Generated documents for property tests use it too.
//!
//! Example:
//!
//! ```rust
//! use xmlreplay::fixed;
//! use xmlreplay::{StreamWriter, WriterParameters};
//!
//! let fixed_element = fixed::Element {
//!   name: fixed::Name {
//!     namespace: "".to_string(),
//!     localname: "foo".to_string(),
//!   },
//!   attributes: vec![],
//!   prefixes: vec![],
//!   children: vec![fixed::Content::Text("Example".to_string())],
//! };
//!
//! let mut writer = StreamWriter::new(Vec::new(), WriterParameters::default());
//! fixed_element.write_to(&mut writer)?;
//! assert_eq!(writer.into_string()?, "<foo>Example</foo>");
//! # Ok::<(), xmlreplay::Error>(())
//! ```

use crate::error::Error;
use crate::namespace::{DEFAULT_NS_PREFIX, NULL_NS_URI};
use crate::writer::XmlWriter;

/// A fixed representation of an XML document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Document {
    /// Comments and processing instructions before the document element
    pub before: Vec<DocumentContent>,
    /// The document element
    pub document_element: Element,
    /// Comments and processing instructions after the document element
    pub after: Vec<DocumentContent>,
}

/// A fixed representation of an XML name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Name {
    /// Namespace URI. Empty string means no namespace
    pub namespace: String,
    /// Localname.
    pub localname: String,
}

/// A fixed representation of an XML namespace prefix declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Prefix {
    /// Name of prefix. Empty string means default namespace
    pub name: String,
    /// Namespace URI.
    pub namespace: String,
}

/// A fixed representation of an XML element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Element {
    /// Name of element
    pub name: Name,
    /// Namespace prefix declarations
    pub prefixes: Vec<Prefix>,
    /// Attributes
    pub attributes: Vec<(Name, String)>,
    /// Children
    pub children: Vec<Content>,
}

/// A fixed representation of element content
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Content {
    /// A text node
    Text(String),
    /// A comment node
    Comment(String),
    /// A processing instruction node
    ProcessingInstruction(ProcessingInstruction),
    /// An element node
    Element(Element),
}

/// Content that is allowed next to the document element (the root element)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DocumentContent {
    /// A comment node
    Comment(String),
    /// A processing instruction node
    ProcessingInstruction(ProcessingInstruction),
}

/// A fixed representation of a processing instruction
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProcessingInstruction {
    /// Target of processing instruction
    pub target: String,
    /// Content of processing instruction
    pub content: Option<String>,
}

impl Document {
    /// Write the document as events, from start document to end document.
    pub fn write_to<W: XmlWriter + ?Sized>(&self, writer: &mut W) -> Result<(), Error> {
        writer.start_document(None, None, None)?;
        for content in &self.before {
            content.write_to(writer)?;
        }
        self.document_element.write_to(writer)?;
        for content in &self.after {
            content.write_to(writer)?;
        }
        writer.end_document()
    }
}

impl Element {
    /// The prefix the element name is written with.
    ///
    /// This is a prefix declared on the element for its namespace if there
    /// is one, otherwise the default prefix unless the element declares a
    /// default namespace itself. Failing that a fresh prefix is made up.
    pub fn prefix(&self) -> String {
        if self.name.namespace == NULL_NS_URI {
            return DEFAULT_NS_PREFIX.to_string();
        }
        if let Some(prefix) = self
            .prefixes
            .iter()
            .find(|p| p.namespace == self.name.namespace)
        {
            return prefix.name.clone();
        }
        if !self.prefixes.iter().any(|p| p.name == DEFAULT_NS_PREFIX) {
            return DEFAULT_NS_PREFIX.to_string();
        }
        let mut i = 0;
        loop {
            let candidate = format!("e{}", i);
            if !self.prefixes.iter().any(|p| p.name == candidate) {
                return candidate;
            }
            i += 1;
        }
    }

    /// Write the element and its content as events.
    pub fn write_to<W: XmlWriter + ?Sized>(&self, writer: &mut W) -> Result<(), Error> {
        let prefix = self.prefix();
        writer.start_tag(&self.name.namespace, &self.name.localname, &prefix)?;
        for p in &self.prefixes {
            writer.namespace_attr(&p.name, &p.namespace)?;
        }
        for (name, value) in &self.attributes {
            writer.attribute(&name.namespace, &name.localname, None, value)?;
        }
        for child in &self.children {
            child.write_to(writer)?;
        }
        writer.end_tag(&self.name.namespace, &self.name.localname, &prefix)
    }
}

impl ProcessingInstruction {
    /// The text of the processing instruction event, target and content
    /// separated by a space.
    pub fn text(&self) -> String {
        match &self.content {
            Some(content) => format!("{} {}", self.target, content),
            None => self.target.clone(),
        }
    }
}

impl Content {
    fn write_to<W: XmlWriter + ?Sized>(&self, writer: &mut W) -> Result<(), Error> {
        match self {
            Content::Text(text) => writer.text(text),
            Content::Comment(comment) => writer.comment(comment),
            Content::ProcessingInstruction(pi) => writer.processing_instruction(&pi.text()),
            Content::Element(element) => element.write_to(writer),
        }
    }
}

impl DocumentContent {
    fn write_to<W: XmlWriter + ?Sized>(&self, writer: &mut W) -> Result<(), Error> {
        match self {
            DocumentContent::Comment(comment) => writer.comment(comment),
            DocumentContent::ProcessingInstruction(pi) => {
                writer.processing_instruction(&pi.text())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::{StreamWriter, WriterParameters};

    fn name(namespace: &str, localname: &str) -> Name {
        Name {
            namespace: namespace.to_string(),
            localname: localname.to_string(),
        }
    }

    fn write(document: &Document) -> String {
        let mut writer = StreamWriter::new(Vec::new(), WriterParameters::default());
        document.write_to(&mut writer).unwrap();
        writer.into_string().unwrap()
    }

    #[test]
    fn test_write_document() {
        let document = Document {
            before: vec![DocumentContent::Comment("before".to_string())],
            document_element: Element {
                name: name("", "foo"),
                attributes: vec![(name("", "a"), "1".to_string())],
                prefixes: vec![],
                children: vec![
                    Content::Text("Example".to_string()),
                    Content::ProcessingInstruction(ProcessingInstruction {
                        target: "pi".to_string(),
                        content: Some("data".to_string()),
                    }),
                ],
            },
            after: vec![],
        };
        assert_eq!(
            write(&document),
            r#"<!--before--><foo a="1">Example<?pi data?></foo>"#
        );
    }

    #[test]
    fn test_prefix_from_declaration() {
        let element = Element {
            name: name("urn:x", "foo"),
            attributes: vec![],
            prefixes: vec![Prefix {
                name: "x".to_string(),
                namespace: "urn:x".to_string(),
            }],
            children: vec![],
        };
        assert_eq!(element.prefix(), "x");
    }

    #[test]
    fn test_prefix_avoids_declared_default() {
        let element = Element {
            name: name("urn:x", "foo"),
            attributes: vec![],
            prefixes: vec![Prefix {
                name: "".to_string(),
                namespace: "urn:y".to_string(),
            }],
            children: vec![],
        };
        assert_eq!(element.prefix(), "e0");
        let document = Document {
            before: vec![],
            document_element: element,
            after: vec![],
        };
        assert_eq!(
            write(&document),
            r#"<e0:foo xmlns:e0="urn:x" xmlns="urn:y"/>"#
        );
    }
}
