use std::io;

use log::debug;

use crate::entity::{serialize_attribute, serialize_text};
use crate::error::Error;
use crate::namespace::{
    NamespaceContext, NamespaceStack, DEFAULT_NS_PREFIX, NULL_NS_URI, XMLNS_ATTRIBUTE,
    XML_NS_PREFIX, XML_NS_URI,
};

/// A push writer that receives events one call at a time.
///
/// Writers are append only: everything written stays written, so a caller
/// can stop after any call.
pub trait XmlWriter {
    fn start_document(
        &mut self,
        version: Option<&str>,
        encoding: Option<&str>,
        standalone: Option<bool>,
    ) -> Result<(), Error>;

    /// Open an element. An empty prefix means the default namespace.
    fn start_tag(&mut self, namespace_uri: &str, local_name: &str, prefix: &str)
        -> Result<(), Error>;

    /// Declare a namespace on the element just opened.
    fn namespace_attr(&mut self, prefix: &str, namespace_uri: &str) -> Result<(), Error>;

    /// Add an attribute to the element just opened.
    ///
    /// With no `prefix` the writer chooses one that is bound to
    /// `namespace_uri` where the element is written.
    fn attribute(
        &mut self,
        namespace_uri: &str,
        local_name: &str,
        prefix: Option<&str>,
        value: &str,
    ) -> Result<(), Error>;

    fn end_tag(&mut self, namespace_uri: &str, local_name: &str, prefix: &str)
        -> Result<(), Error>;

    fn comment(&mut self, text: &str) -> Result<(), Error>;

    fn text(&mut self, text: &str) -> Result<(), Error>;

    fn cdsect(&mut self, text: &str) -> Result<(), Error>;

    fn docdecl(&mut self, text: &str) -> Result<(), Error>;

    fn end_document(&mut self) -> Result<(), Error>;

    fn entity_ref(&mut self, text: &str) -> Result<(), Error>;

    fn ignorable_whitespace(&mut self, text: &str) -> Result<(), Error>;

    fn processing_instruction(&mut self, text: &str) -> Result<(), Error>;

    /// Push buffered output to its destination.
    fn flush(&mut self) -> Result<(), Error> {
        Ok(())
    }
}

impl<T: XmlWriter + ?Sized> XmlWriter for &mut T {
    fn start_document(
        &mut self,
        version: Option<&str>,
        encoding: Option<&str>,
        standalone: Option<bool>,
    ) -> Result<(), Error> {
        (**self).start_document(version, encoding, standalone)
    }

    fn start_tag(
        &mut self,
        namespace_uri: &str,
        local_name: &str,
        prefix: &str,
    ) -> Result<(), Error> {
        (**self).start_tag(namespace_uri, local_name, prefix)
    }

    fn namespace_attr(&mut self, prefix: &str, namespace_uri: &str) -> Result<(), Error> {
        (**self).namespace_attr(prefix, namespace_uri)
    }

    fn attribute(
        &mut self,
        namespace_uri: &str,
        local_name: &str,
        prefix: Option<&str>,
        value: &str,
    ) -> Result<(), Error> {
        (**self).attribute(namespace_uri, local_name, prefix, value)
    }

    fn end_tag(
        &mut self,
        namespace_uri: &str,
        local_name: &str,
        prefix: &str,
    ) -> Result<(), Error> {
        (**self).end_tag(namespace_uri, local_name, prefix)
    }

    fn comment(&mut self, text: &str) -> Result<(), Error> {
        (**self).comment(text)
    }

    fn text(&mut self, text: &str) -> Result<(), Error> {
        (**self).text(text)
    }

    fn cdsect(&mut self, text: &str) -> Result<(), Error> {
        (**self).cdsect(text)
    }

    fn docdecl(&mut self, text: &str) -> Result<(), Error> {
        (**self).docdecl(text)
    }

    fn end_document(&mut self) -> Result<(), Error> {
        (**self).end_document()
    }

    fn entity_ref(&mut self, text: &str) -> Result<(), Error> {
        (**self).entity_ref(text)
    }

    fn ignorable_whitespace(&mut self, text: &str) -> Result<(), Error> {
        (**self).ignorable_whitespace(text)
    }

    fn processing_instruction(&mut self, text: &str) -> Result<(), Error> {
        (**self).processing_instruction(text)
    }

    fn flush(&mut self) -> Result<(), Error> {
        (**self).flush()
    }
}

/// Parameters for [`StreamWriter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriterParameters {
    /// Write elements without content as `<a/>` instead of `<a></a>`.
    /// Defaults to `true`.
    pub self_closing: bool,
    /// Prefixes the writer has to invent are this followed by a number.
    /// Defaults to `"n"`, giving `n0`, `n1` and so on.
    pub auto_prefix: String,
}

impl Default for WriterParameters {
    fn default() -> Self {
        WriterParameters {
            self_closing: true,
            auto_prefix: "n".to_string(),
        }
    }
}

#[derive(Debug)]
struct OpenElement {
    namespace_uri: String,
    local_name: String,
    prefix: String,
    qname: String,
}

/// Writes events as XML text to an [`io::Write`].
///
/// The writer repairs namespaces: it declares the prefix of an element
/// name when it isn't bound to the element's namespace yet, skips
/// declarations that repeat a binding made on the same element, and
/// picks a bound prefix for namespaced attributes, declaring a new one if
/// none is usable.
///
/// ```rust
/// use xmlreplay::{StreamWriter, WriterParameters, XmlWriter};
///
/// let mut writer = StreamWriter::new(Vec::new(), WriterParameters::default());
/// writer.start_tag("urn:x", "doc", "x")?;
/// writer.attribute("urn:x", "id", None, "1")?;
/// writer.text("a < b")?;
/// writer.end_tag("urn:x", "doc", "x")?;
/// assert_eq!(
///     writer.into_string()?,
///     r#"<x:doc xmlns:x="urn:x" x:id="1">a &lt; b</x:doc>"#
/// );
/// # Ok::<(), xmlreplay::Error>(())
/// ```
pub struct StreamWriter<W: io::Write> {
    out: W,
    parameters: WriterParameters,
    namespaces: NamespaceStack,
    open: Vec<OpenElement>,
    start_tag_open: bool,
    generated_prefixes: usize,
}

impl<W: io::Write> StreamWriter<W> {
    /// Create a writer writing to `out`.
    pub fn new(out: W, parameters: WriterParameters) -> Self {
        StreamWriter {
            out,
            parameters,
            namespaces: NamespaceStack::new(),
            open: Vec::new(),
            start_tag_open: false,
            generated_prefixes: 0,
        }
    }

    /// The number of elements currently open.
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    /// The namespace bindings in scope for what is written next.
    pub fn namespace_context(&self) -> &NamespaceStack {
        &self.namespaces
    }

    /// Flush and return the underlying output.
    pub fn into_inner(mut self) -> Result<W, Error> {
        self.close_start_tag()?;
        self.out.flush()?;
        Ok(self.out)
    }

    fn close_start_tag(&mut self) -> Result<(), Error> {
        if self.start_tag_open {
            self.out.write_all(b">")?;
            self.start_tag_open = false;
        }
        Ok(())
    }

    fn write_declaration(&mut self, prefix: &str, namespace_uri: &str) -> Result<(), Error> {
        if prefix == DEFAULT_NS_PREFIX {
            write!(
                self.out,
                " xmlns=\"{}\"",
                serialize_attribute(namespace_uri)
            )?;
        } else {
            write!(
                self.out,
                " xmlns:{}=\"{}\"",
                prefix,
                serialize_attribute(namespace_uri)
            )?;
        }
        Ok(())
    }

    fn generate_prefix(&mut self) -> String {
        loop {
            let candidate = format!(
                "{}{}",
                self.parameters.auto_prefix, self.generated_prefixes
            );
            self.generated_prefixes += 1;
            if self.namespaces.namespace_uri(&candidate).is_none() {
                return candidate;
            }
        }
    }

    // an attribute can't use the default namespace, so the prefix must be
    // explicit
    fn attribute_prefix(
        &mut self,
        namespace_uri: &str,
        hint: Option<&str>,
    ) -> Result<String, Error> {
        if let Some(prefix) = hint.filter(|p| !p.is_empty() && *p != XMLNS_ATTRIBUTE) {
            match self.namespaces.namespace_uri(prefix) {
                Some(bound) if bound == namespace_uri => return Ok(prefix.to_string()),
                None => {
                    self.namespaces.declare(prefix, namespace_uri)?;
                    self.write_declaration(prefix, namespace_uri)?;
                    return Ok(prefix.to_string());
                }
                Some(_) => {}
            }
        }
        let existing = self
            .namespaces
            .prefixes(namespace_uri)
            .into_iter()
            .find(|p| !p.is_empty())
            .map(str::to_string);
        if let Some(prefix) = existing {
            return Ok(prefix);
        }
        let prefix = self.generate_prefix();
        debug!("declaring generated prefix {} for {}", prefix, namespace_uri);
        self.namespaces.declare(&prefix, namespace_uri)?;
        self.write_declaration(&prefix, namespace_uri)?;
        Ok(prefix)
    }

    fn text_content(&mut self, before: &str, text: &str, after: &str) -> Result<(), Error> {
        self.close_start_tag()?;
        self.out.write_all(before.as_bytes())?;
        self.out.write_all(text.as_bytes())?;
        self.out.write_all(after.as_bytes())?;
        Ok(())
    }
}

impl StreamWriter<Vec<u8>> {
    /// Finish writing and return the output as a string.
    pub fn into_string(self) -> Result<String, Error> {
        let bytes = self.into_inner()?;
        String::from_utf8(bytes).map_err(|e| Error::Encoding(e.to_string()))
    }
}

pub(crate) fn clark_name(namespace_uri: &str, local_name: &str) -> String {
    if namespace_uri.is_empty() {
        local_name.to_string()
    } else {
        format!("{{{}}}{}", namespace_uri, local_name)
    }
}

impl<W: io::Write> XmlWriter for StreamWriter<W> {
    fn start_document(
        &mut self,
        version: Option<&str>,
        encoding: Option<&str>,
        standalone: Option<bool>,
    ) -> Result<(), Error> {
        if version.is_none() && encoding.is_none() && standalone.is_none() {
            return Ok(());
        }
        self.close_start_tag()?;
        write!(self.out, "<?xml version=\"{}\"", version.unwrap_or("1.0"))?;
        if let Some(encoding) = encoding {
            write!(self.out, " encoding=\"{}\"", encoding)?;
        }
        if let Some(standalone) = standalone {
            let standalone = if standalone { "yes" } else { "no" };
            write!(self.out, " standalone=\"{}\"", standalone)?;
        }
        self.out.write_all(b"?>")?;
        Ok(())
    }

    fn start_tag(
        &mut self,
        namespace_uri: &str,
        local_name: &str,
        prefix: &str,
    ) -> Result<(), Error> {
        self.close_start_tag()?;
        self.namespaces.push_scope();
        // a prefix can't be bound to no namespace
        let prefix = if namespace_uri == NULL_NS_URI {
            DEFAULT_NS_PREFIX
        } else {
            prefix
        };
        let qname = if prefix.is_empty() {
            local_name.to_string()
        } else {
            format!("{}:{}", prefix, local_name)
        };
        write!(self.out, "<{}", qname)?;
        self.start_tag_open = true;
        if prefix != XML_NS_PREFIX
            && self.namespaces.namespace_uri(prefix).unwrap_or(NULL_NS_URI) != namespace_uri
        {
            self.namespaces.declare(prefix, namespace_uri)?;
            self.write_declaration(prefix, namespace_uri)?;
        }
        self.open.push(OpenElement {
            namespace_uri: namespace_uri.to_string(),
            local_name: local_name.to_string(),
            prefix: prefix.to_string(),
            qname,
        });
        Ok(())
    }

    fn namespace_attr(&mut self, prefix: &str, namespace_uri: &str) -> Result<(), Error> {
        if !self.start_tag_open {
            return Err(Error::NoOpenStartTag);
        }
        if prefix == XML_NS_PREFIX || prefix == XMLNS_ATTRIBUTE {
            return Ok(());
        }
        // undeclaring a prefix isn't possible in XML 1.0
        if !prefix.is_empty() && namespace_uri.is_empty() {
            return Ok(());
        }
        // the element name was already written with this prefix
        if let Some(open) = self.open.last() {
            if open.prefix == prefix && open.namespace_uri != namespace_uri {
                return Err(Error::ConflictingNamespace {
                    prefix: prefix.to_string(),
                    existing: open.namespace_uri.clone(),
                    declared: namespace_uri.to_string(),
                });
            }
        }
        if self.namespaces.declare(prefix, namespace_uri)? {
            self.write_declaration(prefix, namespace_uri)?;
        }
        Ok(())
    }

    fn attribute(
        &mut self,
        namespace_uri: &str,
        local_name: &str,
        prefix: Option<&str>,
        value: &str,
    ) -> Result<(), Error> {
        if !self.start_tag_open {
            return Err(Error::NoOpenStartTag);
        }
        let qname = if namespace_uri == NULL_NS_URI {
            local_name.to_string()
        } else if namespace_uri == XML_NS_URI {
            format!("{}:{}", XML_NS_PREFIX, local_name)
        } else {
            let prefix = self.attribute_prefix(namespace_uri, prefix)?;
            format!("{}:{}", prefix, local_name)
        };
        write!(self.out, " {}=\"{}\"", qname, serialize_attribute(value))?;
        Ok(())
    }

    fn end_tag(
        &mut self,
        namespace_uri: &str,
        local_name: &str,
        _prefix: &str,
    ) -> Result<(), Error> {
        let open = match self.open.pop() {
            Some(open) => open,
            None => {
                return Err(Error::UnbalancedEndTag {
                    expected: String::new(),
                    found: clark_name(namespace_uri, local_name),
                })
            }
        };
        if open.namespace_uri != namespace_uri || open.local_name != local_name {
            let expected = clark_name(&open.namespace_uri, &open.local_name);
            self.open.push(open);
            return Err(Error::UnbalancedEndTag {
                expected,
                found: clark_name(namespace_uri, local_name),
            });
        }
        if self.start_tag_open && self.parameters.self_closing {
            self.out.write_all(b"/>")?;
            self.start_tag_open = false;
        } else {
            self.close_start_tag()?;
            write!(self.out, "</{}>", open.qname)?;
        }
        self.namespaces.pop_scope();
        Ok(())
    }

    fn comment(&mut self, text: &str) -> Result<(), Error> {
        self.text_content("<!--", text, "-->")
    }

    fn text(&mut self, text: &str) -> Result<(), Error> {
        self.close_start_tag()?;
        self.out.write_all(serialize_text(text).as_bytes())?;
        Ok(())
    }

    fn cdsect(&mut self, text: &str) -> Result<(), Error> {
        self.text_content("<![CDATA[", text, "]]>")
    }

    fn docdecl(&mut self, text: &str) -> Result<(), Error> {
        self.text_content("<!DOCTYPE ", text, ">")
    }

    fn end_document(&mut self) -> Result<(), Error> {
        self.close_start_tag()?;
        if !self.open.is_empty() {
            return Err(Error::UnclosedElements(self.open.len()));
        }
        self.out.flush()?;
        Ok(())
    }

    fn entity_ref(&mut self, text: &str) -> Result<(), Error> {
        self.text_content("&", text, ";")
    }

    fn ignorable_whitespace(&mut self, text: &str) -> Result<(), Error> {
        self.text_content("", text, "")
    }

    fn processing_instruction(&mut self, text: &str) -> Result<(), Error> {
        self.text_content("<?", text, "?>")
    }

    fn flush(&mut self) -> Result<(), Error> {
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn writer() -> StreamWriter<Vec<u8>> {
        StreamWriter::new(Vec::new(), WriterParameters::default())
    }

    #[test]
    fn test_declares_element_prefix() {
        let mut w = writer();
        w.start_tag("urn:a", "doc", "a").unwrap();
        w.namespace_attr("a", "urn:a").unwrap();
        w.end_tag("urn:a", "doc", "a").unwrap();
        assert_eq!(w.into_string().unwrap(), r#"<a:doc xmlns:a="urn:a"/>"#);
    }

    #[test]
    fn test_default_namespace_reset() {
        let mut w = writer();
        w.start_tag("urn:d", "doc", "").unwrap();
        w.start_tag("", "inner", "").unwrap();
        w.end_tag("", "inner", "").unwrap();
        w.end_tag("urn:d", "doc", "").unwrap();
        assert_eq!(
            w.into_string().unwrap(),
            r#"<doc xmlns="urn:d"><inner xmlns=""/></doc>"#
        );
    }

    #[test]
    fn test_attribute_uses_bound_prefix_not_default() {
        let mut w = writer();
        w.start_tag("urn:x", "doc", "").unwrap();
        w.namespace_attr("p", "urn:x").unwrap();
        w.attribute("urn:x", "a", None, "1").unwrap();
        w.end_tag("urn:x", "doc", "").unwrap();
        assert_eq!(
            w.into_string().unwrap(),
            r#"<doc xmlns="urn:x" xmlns:p="urn:x" p:a="1"/>"#
        );
    }

    #[test]
    fn test_attribute_generates_prefix() {
        let mut w = writer();
        w.start_tag("", "doc", "").unwrap();
        w.attribute("urn:x", "a", None, "1").unwrap();
        w.attribute("urn:x", "b", None, "2").unwrap();
        w.end_tag("", "doc", "").unwrap();
        assert_eq!(
            w.into_string().unwrap(),
            r#"<doc xmlns:n0="urn:x" n0:a="1" n0:b="2"/>"#
        );
    }

    #[test]
    fn test_attribute_prefix_shadowed_in_scope() {
        let mut w = writer();
        w.start_tag("", "doc", "").unwrap();
        w.namespace_attr("x", "urn:x").unwrap();
        w.start_tag("", "a", "").unwrap();
        w.namespace_attr("x", "urn:y").unwrap();
        w.attribute("urn:x", "b", None, "X").unwrap();
        w.attribute("urn:y", "b", None, "Y").unwrap();
        w.end_tag("", "a", "").unwrap();
        w.end_tag("", "doc", "").unwrap();
        assert_eq!(
            w.into_string().unwrap(),
            r#"<doc xmlns:x="urn:x"><a xmlns:x="urn:y" xmlns:n0="urn:x" n0:b="X" x:b="Y"/></doc>"#
        );
    }

    #[test]
    fn test_attribute_prefix_hint_used_when_free() {
        let mut w = writer();
        w.start_tag("", "doc", "").unwrap();
        w.attribute("urn:x", "a", Some("q"), "1").unwrap();
        w.end_tag("", "doc", "").unwrap();
        assert_eq!(
            w.into_string().unwrap(),
            r#"<doc xmlns:q="urn:x" q:a="1"/>"#
        );
    }

    #[test]
    fn test_xml_attribute() {
        let mut w = writer();
        w.start_tag("", "doc", "").unwrap();
        w.attribute(XML_NS_URI, "lang", None, "en").unwrap();
        w.end_tag("", "doc", "").unwrap();
        assert_eq!(w.into_string().unwrap(), r#"<doc xml:lang="en"/>"#);
    }

    #[test]
    fn test_not_self_closing() {
        let mut w = StreamWriter::new(
            Vec::new(),
            WriterParameters {
                self_closing: false,
                ..Default::default()
            },
        );
        w.start_tag("", "doc", "").unwrap();
        w.end_tag("", "doc", "").unwrap();
        assert_eq!(w.into_string().unwrap(), "<doc></doc>");
    }

    #[test]
    fn test_text_kinds() {
        let mut w = writer();
        w.start_document(Some("1.0"), Some("UTF-8"), Some(true))
            .unwrap();
        w.docdecl("doc").unwrap();
        w.start_tag("", "doc", "").unwrap();
        w.text("a & b").unwrap();
        w.cdsect("<raw>").unwrap();
        w.entity_ref("ent").unwrap();
        w.comment("c").unwrap();
        w.processing_instruction("pi data").unwrap();
        w.end_tag("", "doc", "").unwrap();
        w.ignorable_whitespace("\n").unwrap();
        w.end_document().unwrap();
        assert_eq!(
            w.into_string().unwrap(),
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?><!DOCTYPE doc><doc>a &amp; b<![CDATA[<raw>]]>&ent;<!--c--><?pi data?></doc>\n"
        );
    }

    #[test]
    fn test_no_declaration_without_fields() {
        let mut w = writer();
        w.start_document(None, None, None).unwrap();
        w.start_tag("", "doc", "").unwrap();
        w.end_tag("", "doc", "").unwrap();
        assert_eq!(w.into_string().unwrap(), "<doc/>");
    }

    #[test]
    fn test_mismatched_end_tag() {
        let mut w = writer();
        w.start_tag("urn:a", "doc", "a").unwrap();
        let err = w.end_tag("urn:b", "doc", "a");
        assert!(matches!(
            err,
            Err(Error::UnbalancedEndTag { expected, found })
                if expected == "{urn:a}doc" && found == "{urn:b}doc"
        ));
        assert_eq!(w.depth(), 1);
    }

    #[test]
    fn test_attribute_without_start_tag() {
        let mut w = writer();
        w.start_tag("", "doc", "").unwrap();
        w.text("t").unwrap();
        assert!(matches!(
            w.attribute("", "a", None, "1"),
            Err(Error::NoOpenStartTag)
        ));
    }

    #[test]
    fn test_unclosed_elements() {
        let mut w = writer();
        w.start_tag("", "doc", "").unwrap();
        assert!(matches!(w.end_document(), Err(Error::UnclosedElements(1))));
    }

    #[test]
    fn test_conflicting_declaration() {
        let mut w = writer();
        w.start_tag("urn:a", "doc", "a").unwrap();
        assert!(matches!(
            w.namespace_attr("a", "urn:b"),
            Err(Error::ConflictingNamespace { .. })
        ));
    }

    #[test]
    fn test_rebinding_inherited_element_prefix() {
        let mut w = writer();
        w.start_tag("urn:a", "doc", "a").unwrap();
        w.start_tag("urn:a", "item", "a").unwrap();
        assert!(matches!(
            w.namespace_attr("a", "urn:b"),
            Err(Error::ConflictingNamespace { prefix, .. }) if prefix == "a"
        ));
    }
}
