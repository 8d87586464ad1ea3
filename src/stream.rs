//! Driving events from a reader to a writer.
//!
//! [`copy`] replays every event of a reader onto a writer straight from the
//! reader. [`events`] turns a reader into an iterator of snapshots, which
//! can be stored and replayed later with [`replay`].

use log::{debug, trace};

use crate::error::Error;
use crate::event::XmlEvent;
use crate::event_type::EventType;
use crate::reader::XmlReader;
use crate::writer::{clark_name, XmlWriter};

/// Options for [`copy_with`] and [`replay_with`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyOptions {
    /// Leave out ignorable events (see [`EventType::is_ignorable`]).
    /// Defaults to `false`.
    pub skip_ignorable: bool,
    /// Fail with [`Error::UnbalancedEndTag`] or [`Error::UnclosedElements`]
    /// if end elements don't match start elements. Defaults to `true`.
    pub check_nesting: bool,
}

impl Default for CopyOptions {
    fn default() -> Self {
        CopyOptions {
            skip_ignorable: false,
            check_nesting: true,
        }
    }
}

/// Checks that end elements match start elements.
///
/// ```rust
/// use xmlreplay::{NestingChecker, Error};
///
/// let mut checker = NestingChecker::new();
/// checker.start("urn:x", "doc");
/// assert!(matches!(
///     checker.end("urn:y", "doc"),
///     Err(Error::UnbalancedEndTag { .. })
/// ));
/// ```
#[derive(Debug, Default)]
pub struct NestingChecker {
    open: Vec<(String, String)>,
}

impl NestingChecker {
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of elements currently open.
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    pub fn start(&mut self, namespace_uri: &str, local_name: &str) {
        self.open
            .push((namespace_uri.to_string(), local_name.to_string()));
    }

    pub fn end(&mut self, namespace_uri: &str, local_name: &str) -> Result<(), Error> {
        match self.open.pop() {
            Some((open_namespace, open_local)) => {
                if open_namespace != namespace_uri || open_local != local_name {
                    return Err(Error::UnbalancedEndTag {
                        expected: clark_name(&open_namespace, &open_local),
                        found: clark_name(namespace_uri, local_name),
                    });
                }
                Ok(())
            }
            None => Err(Error::UnbalancedEndTag {
                expected: String::new(),
                found: clark_name(namespace_uri, local_name),
            }),
        }
    }

    /// Check the event a reader is positioned at.
    pub fn check<R: XmlReader + ?Sized>(&mut self, reader: &R) -> Result<(), Error> {
        match reader.event_type() {
            Some(EventType::StartElement) => {
                self.start(reader.namespace_uri(), reader.local_name());
                Ok(())
            }
            Some(EventType::EndElement) => self.end(reader.namespace_uri(), reader.local_name()),
            _ => Ok(()),
        }
    }

    /// Check an event snapshot.
    pub fn check_event(&mut self, event: &XmlEvent) -> Result<(), Error> {
        match event {
            XmlEvent::StartElement(e) => {
                self.start(&e.namespace_uri, &e.local_name);
                Ok(())
            }
            XmlEvent::EndElement(e) => self.end(&e.namespace_uri, &e.local_name),
            _ => Ok(()),
        }
    }

    /// Fail if elements are still open.
    pub fn finish(&self) -> Result<(), Error> {
        if self.open.is_empty() {
            Ok(())
        } else {
            Err(Error::UnclosedElements(self.open.len()))
        }
    }
}

/// Replay all events of `reader` onto `writer` with default options.
///
/// Returns the number of events written.
///
/// ```rust
/// use xmlreplay::{copy, StrReader, StreamWriter, WriterParameters};
///
/// let mut reader = StrReader::new(r#"<a:item a:id="1" xmlns:a="urn:ns"><!--c-->text</a:item>"#);
/// let mut writer = StreamWriter::new(Vec::new(), WriterParameters::default());
/// copy(&mut reader, &mut writer)?;
/// assert_eq!(
///     writer.into_string()?,
///     r#"<a:item xmlns:a="urn:ns" a:id="1"><!--c-->text</a:item>"#
/// );
/// # Ok::<(), xmlreplay::Error>(())
/// ```
pub fn copy<R, W>(reader: &mut R, writer: &mut W) -> Result<usize, Error>
where
    R: XmlReader + ?Sized,
    W: XmlWriter + ?Sized,
{
    copy_with(reader, writer, &CopyOptions::default())
}

/// Replay all events of `reader` onto `writer`.
pub fn copy_with<R, W>(reader: &mut R, writer: &mut W, options: &CopyOptions) -> Result<usize, Error>
where
    R: XmlReader + ?Sized,
    W: XmlWriter + ?Sized,
{
    let mut checker = NestingChecker::new();
    let mut written = 0;
    while let Some(event_type) = reader.next_event()? {
        if options.check_nesting {
            checker.check(reader)?;
        }
        if options.skip_ignorable && event_type.is_ignorable() {
            trace!("skipping {:?} at {}", event_type, reader.location());
            continue;
        }
        trace!("copying {:?} at {}", event_type, reader.location());
        event_type.write_event(writer, reader)?;
        written += 1;
    }
    if options.check_nesting {
        checker.finish()?;
    }
    writer.flush()?;
    debug!("copied {} events", written);
    Ok(written)
}

/// Iterator over snapshots of the events of a reader; see [`events`].
pub struct Events<R> {
    reader: R,
    done: bool,
}

impl<R> Events<R> {
    /// Give back the reader.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: XmlReader> Iterator for Events<R> {
    type Item = Result<XmlEvent, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.reader.next_event() {
            Ok(Some(event_type)) => Some(Ok(event_type.create_event(&self.reader))),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Snapshot every event of `reader`.
///
/// The iterator stops after the first error.
pub fn events<R: XmlReader>(reader: R) -> Events<R> {
    Events {
        reader,
        done: false,
    }
}

/// Write event snapshots onto `writer` with default options.
///
/// Returns the number of events written.
pub fn replay<'e, I, W>(events: I, writer: &mut W) -> Result<usize, Error>
where
    I: IntoIterator<Item = &'e XmlEvent>,
    W: XmlWriter + ?Sized,
{
    replay_with(events, writer, &CopyOptions::default())
}

/// Write event snapshots onto `writer`.
pub fn replay_with<'e, I, W>(events: I, writer: &mut W, options: &CopyOptions) -> Result<usize, Error>
where
    I: IntoIterator<Item = &'e XmlEvent>,
    W: XmlWriter + ?Sized,
{
    let mut checker = NestingChecker::new();
    let mut written = 0;
    for event in events {
        if options.check_nesting {
            checker.check_event(event)?;
        }
        if options.skip_ignorable && event.is_ignorable() {
            continue;
        }
        event.write_to(writer)?;
        written += 1;
    }
    if options.check_nesting {
        checker.finish()?;
    }
    writer.flush()?;
    debug!("replayed {} events", written);
    Ok(written)
}
