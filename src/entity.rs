use std::borrow::Cow;

use crate::error::Error;

/// A run of character data, split at entity references that can't be
/// expanded.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum TextPart<'a> {
    Text(Cow<'a, str>),
    EntityRef(&'a str),
}

fn predefined_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "apos" => Some('\''),
        "gt" => Some('>'),
        "lt" => Some('<'),
        "quot" => Some('"'),
        _ => None,
    }
}

fn character_reference(reference: &str) -> Result<char, Error> {
    let code = if let Some(hex) = reference
        .strip_prefix("#x")
        .or_else(|| reference.strip_prefix("#X"))
    {
        u32::from_str_radix(hex, 16).ok()
    } else if let Some(decimal) = reference.strip_prefix('#') {
        decimal.parse::<u32>().ok()
    } else {
        None
    };
    code.and_then(char::from_u32)
        .ok_or_else(|| Error::InvalidCharacterReference(reference.to_string()))
}

fn expand(name: &str) -> Result<Option<char>, Error> {
    if name.starts_with('#') {
        character_reference(name).map(Some)
    } else {
        Ok(predefined_entity(name))
    }
}

/// Expand predefined entities and character references in text content.
///
/// Any other entity reference ends the current text run and becomes a part
/// of its own, so that it can be reported as an entity reference event.
/// Each part comes with its byte offset in `content`.
pub(crate) fn split_references(content: &str) -> Result<Vec<(usize, TextPart)>, Error> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut run_start = 0;
    let mut reference_seen = false;
    let mut rest = content;
    let mut offset = 0;

    while let Some(amp) = rest.find('&') {
        let after = &rest[amp + 1..];
        let semicolon = after
            .find(';')
            .ok_or_else(|| Error::UnclosedEntity(after.to_string()))?;
        let name = &after[..semicolon];
        current.push_str(&rest[..amp]);
        match expand(name)? {
            Some(c) => {
                current.push(c);
                reference_seen = true;
            }
            None => {
                if !current.is_empty() {
                    parts.push((
                        run_start,
                        text_part(content, run_start, offset + amp, current, reference_seen),
                    ));
                }
                parts.push((offset + amp, TextPart::EntityRef(name)));
                current = String::new();
                reference_seen = false;
                run_start = offset + amp + semicolon + 2;
            }
        }
        let consumed = amp + semicolon + 2;
        offset += consumed;
        rest = &rest[consumed..];
    }
    current.push_str(rest);
    if !current.is_empty() {
        parts.push((
            run_start,
            text_part(content, run_start, content.len(), current, reference_seen),
        ));
    }
    Ok(parts)
}

// keep a borrowed slice when nothing in the run was expanded
fn text_part(content: &str, start: usize, end: usize, run: String, expanded: bool) -> TextPart {
    if expanded {
        TextPart::Text(Cow::Owned(run))
    } else {
        TextPart::Text(Cow::Borrowed(&content[start..end]))
    }
}

/// Expand predefined entities and character references in an attribute
/// value. Other entity references are rejected.
pub(crate) fn parse_attribute_value(content: &str) -> Result<Cow<str>, Error> {
    if !content.contains('&') {
        return Ok(Cow::Borrowed(content));
    }
    let mut result = String::with_capacity(content.len());
    for (_, part) in split_references(content)? {
        match part {
            TextPart::Text(text) => result.push_str(&text),
            TextPart::EntityRef(name) => return Err(Error::InvalidEntity(name.to_string())),
        }
    }
    Ok(Cow::Owned(result))
}

fn serialize_entities<'a>(content: &'a str, escape: impl Fn(char) -> Option<&'static str>) -> Cow<'a, str> {
    let mut result = String::new();
    let mut entity_seen = false;
    for c in content.chars() {
        match escape(c) {
            Some(entity) => {
                entity_seen = true;
                result.push_str(entity)
            }
            None => result.push(c),
        }
    }

    if !entity_seen {
        Cow::Borrowed(content)
    } else {
        result.into()
    }
}

/// Escape character data for use as text content.
pub(crate) fn serialize_text(content: &str) -> Cow<str> {
    serialize_entities(content, |c| match c {
        '&' => Some("&amp;"),
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        _ => None,
    })
}

/// Escape an attribute value for use between double quotes.
pub(crate) fn serialize_attribute(content: &str) -> Cow<str> {
    serialize_entities(content, |c| match c {
        '&' => Some("&amp;"),
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        '"' => Some("&quot;"),
        '\'' => Some("&apos;"),
        '\n' => Some("&#10;"),
        '\r' => Some("&#13;"),
        '\t' => Some("&#9;"),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(content: &str) -> Vec<TextPart> {
        split_references(content)
            .unwrap()
            .into_iter()
            .map(|(_, part)| part)
            .collect()
    }

    #[test]
    fn test_split_no_references() {
        let text = "hello";
        let parts = split(text);
        assert_eq!(parts, vec![TextPart::Text(Cow::Borrowed("hello"))]);
        // this is the same slice
        if let TextPart::Text(Cow::Borrowed(s)) = &parts[0] {
            assert!(std::ptr::eq(text, *s));
        } else {
            unreachable!();
        }
    }

    #[test]
    fn test_split_predefined() {
        let parts = split("A &amp; B &#65;&#x42;");
        assert_eq!(parts, vec![TextPart::Text("A & B AB".into())]);
    }

    #[test]
    fn test_split_unknown_entity() {
        let parts = split("a &lt; &foo;b&bar;");
        assert_eq!(
            parts,
            vec![
                TextPart::Text("a < ".into()),
                TextPart::EntityRef("foo"),
                TextPart::Text("b".into()),
                TextPart::EntityRef("bar"),
            ]
        );
    }

    #[test]
    fn test_split_borrowed_after_entity() {
        let parts = split("&foo;tail");
        assert_eq!(
            parts,
            vec![TextPart::EntityRef("foo"), TextPart::Text(Cow::Borrowed("tail"))]
        );
    }

    #[test]
    fn test_split_offsets() {
        let offsets = split_references("ab&x;c&amp;d&y;")
            .unwrap()
            .into_iter()
            .map(|(offset, _)| offset)
            .collect::<Vec<_>>();
        assert_eq!(offsets, vec![0, 2, 5, 12]);
    }

    #[test]
    fn test_split_unclosed() {
        let err = split_references("&amp");
        if let Err(Error::UnclosedEntity(entity)) = err {
            assert_eq!(entity, "amp");
        } else {
            unreachable!();
        }
    }

    #[test]
    fn test_invalid_character_reference() {
        let err = split_references("&#xD800;");
        assert!(matches!(err, Err(Error::InvalidCharacterReference(_))));
    }

    #[test]
    fn test_attribute_value() {
        assert_eq!(parse_attribute_value("a &quot;b&quot;").unwrap(), "a \"b\"");
        assert!(matches!(
            parse_attribute_value("&foo;"),
            Err(Error::InvalidEntity(name)) if name == "foo"
        ));
    }

    #[test]
    fn test_serialize_text() {
        assert_eq!(serialize_text("A & B <c> \"d\""), "A &amp; B &lt;c&gt; \"d\"");
    }

    #[test]
    fn test_serialize_attribute() {
        assert_eq!(
            serialize_attribute("&'><\"\n"),
            "&amp;&apos;&gt;&lt;&quot;&#10;"
        );
    }

    #[test]
    fn test_serialize_no_entities() {
        let text = "hello";
        let result = serialize_text(text);
        // this is the same slice
        assert!(std::ptr::eq(text, result.as_ref()));
    }
}
