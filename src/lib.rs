#![forbid(unsafe_code)]

//! Streaming XML events that can be replayed onto a writer, and namespace
//! contexts to resolve prefixes with.
//!
//! An [`XmlReader`] is positioned at one event at a time. The kind of that
//! event is an [`EventType`], which can either take a snapshot of it as an
//! [`XmlEvent`] or replay it onto an [`XmlWriter`] straight from the
//! reader. Both routes make the same writer calls, so a document copied
//! directly and a document stored as snapshots and replayed later come
//! out the same.
//!
//! ```rust
//! use xmlreplay::{copy, events, replay, StrReader, StreamWriter, WriterParameters};
//!
//! let xml = r#"<a:item a:id="1" xmlns:a="urn:ns"><!--c-->text</a:item>"#;
//!
//! let mut direct = StreamWriter::new(Vec::new(), WriterParameters::default());
//! copy(&mut StrReader::new(xml), &mut direct)?;
//!
//! let snapshots = events(StrReader::new(xml)).collect::<Result<Vec<_>, _>>()?;
//! let mut replayed = StreamWriter::new(Vec::new(), WriterParameters::default());
//! replay(&snapshots, &mut replayed)?;
//!
//! assert_eq!(direct.into_string()?, replayed.into_string()?);
//! # Ok::<(), xmlreplay::Error>(())
//! ```
//!
//! Namespace bindings are available through the [`NamespaceContext`]
//! trait. Besides the context a reader reports there are
//! [`SimpleNamespaceContext`] for a fixed set of bindings,
//! [`FragmentNamespaceContext`] for nested scopes and
//! [`CombiningNamespaceContext`] to consult two contexts as one.

mod encoding;
mod entity;
mod error;
mod event;
mod event_reader;
mod event_type;
pub mod fixed;
mod location;
pub mod namespace;
#[cfg(any(test, feature = "proptest"))]
pub mod proptest;
mod reader;
mod str_reader;
mod stream;
mod writer;

pub use encoding::decode;
pub use error::Error;
pub use event::{
    Attribute, EndDocumentEvent, EndElementEvent, Namespace, StartDocumentEvent,
    StartElementEvent, TextEvent, XmlEvent,
};
pub use event_reader::EventReader;
pub use event_type::EventType;
pub use location::Location;
pub use namespace::{
    CombiningNamespaceContext, FragmentNamespaceContext, NamespaceContext, NamespaceStack,
    SimpleNamespaceContext,
};
pub use reader::XmlReader;
pub use str_reader::StrReader;
pub use stream::{copy, copy_with, events, replay, replay_with, CopyOptions, Events, NestingChecker};
pub use writer::{StreamWriter, WriterParameters, XmlWriter};
