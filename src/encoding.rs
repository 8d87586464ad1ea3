use std::borrow::Cow;

use encoding_rs::Encoding;
use xhtmlchardet::detect;

use crate::error::Error;

pub(crate) fn encoding(data: &[u8], hint: Option<String>) -> Option<&'static Encoding> {
    let mut cursor = std::io::Cursor::new(data);
    let charsets = detect(&mut cursor, hint).ok()?;
    // no encoding detected
    let label = if charsets.is_empty() {
        "UTF-8"
    } else {
        &charsets[0]
    };
    Encoding::for_label(label.as_bytes())
}

/// Decode XML bytes into text a [`StrReader`](crate::StrReader) can read.
///
/// The encoding is detected from a byte order mark or the XML declaration,
/// falling back to UTF-8. A byte order mark is removed.
///
/// ```rust
/// use xmlreplay::{decode, EventType, StrReader, XmlReader};
///
/// let bytes = b"<?xml version=\"1.0\" encoding=\"iso-8859-1\"?><doc>caf\xe9</doc>";
/// let text = decode(bytes)?;
/// let mut reader = StrReader::new(&text);
/// reader.next_event()?;
/// reader.next_event()?;
/// reader.next_event()?;
/// assert_eq!(reader.text(), "café");
/// # Ok::<(), xmlreplay::Error>(())
/// ```
pub fn decode(data: &[u8]) -> Result<Cow<str>, Error> {
    let encoding = encoding(data, None)
        .ok_or_else(|| Error::Encoding("cannot detect encoding".to_string()))?;
    let (text, used, had_errors) = encoding.decode(data);
    if had_errors {
        return Err(Error::Encoding(format!(
            "input is not valid {}",
            used.name()
        )));
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8() {
        let data = b"<?xml version=\"1.0\" encoding=\"UTF-8\"?><a/>";
        let enc = encoding(data, None).unwrap();
        assert_eq!(enc.name(), "UTF-8");
    }

    #[test]
    fn test_utf8_without_declaration() {
        let data = b"<a/>";
        let enc = encoding(data, None).unwrap();
        assert_eq!(enc.name(), "UTF-8");
    }

    #[test]
    fn test_iso8859_1() {
        let data = b"<?xml version=\"1.0\" encoding=\"iso-8859-1\"?><a/>";
        let enc = encoding(data, None).unwrap();
        // windows-1252 is a superset of 8859-1
        assert_eq!(enc.name(), "windows-1252");
    }

    #[test]
    fn test_decode_borrows_utf8() {
        let data = "<a>é</a>".as_bytes();
        let text = decode(data).unwrap();
        assert!(matches!(text, Cow::Borrowed(_)));
        assert_eq!(text, "<a>é</a>");
    }

    #[test]
    fn test_decode_strips_bom() {
        let data = b"\xEF\xBB\xBF<a/>";
        assert_eq!(decode(data).unwrap(), "<a/>");
    }
}
