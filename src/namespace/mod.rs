//! Namespace contexts: read-only views over prefix to namespace URI
//! bindings.
//!
//! A [`NamespaceContext`] answers three questions: which namespace a prefix
//! is bound to, which prefix to prefer for a namespace, and which prefixes
//! are valid for a namespace at all. A lookup that finds nothing returns
//! `None` (or an empty list); that is a normal outcome, not an error.
//!
//! Contexts nest and combine:
//!
//! - [`SimpleNamespaceContext`] holds a flat set of bindings.
//! - [`FragmentNamespaceContext`] is a scope that borrows its parent scope,
//!   with local bindings shadowing the parent's.
//! - [`CombiningNamespaceContext`] unions two independent contexts, the
//!   primary one taking precedence.
//! - [`NamespaceStack`] keeps all scopes of a traversal in one vector, pushed
//!   and popped in step with start and end tags.
//!
//! The `xml` and `xmlns` prefixes are bound in every context.
mod combining;
mod fragment;
mod simple;
mod stack;

pub use combining::CombiningNamespaceContext;
pub use fragment::FragmentNamespaceContext;
pub use simple::SimpleNamespaceContext;
pub use stack::NamespaceStack;

/// The namespace URI of names that are in no namespace.
pub const NULL_NS_URI: &str = "";
/// The prefix of the default namespace.
pub const DEFAULT_NS_PREFIX: &str = "";
/// The reserved `xml` prefix.
pub const XML_NS_PREFIX: &str = "xml";
/// The namespace the `xml` prefix is bound to.
pub const XML_NS_URI: &str = "http://www.w3.org/XML/1998/namespace";
/// The reserved `xmlns` prefix used for namespace declarations.
pub const XMLNS_ATTRIBUTE: &str = "xmlns";
/// The namespace the `xmlns` prefix is bound to.
pub const XMLNS_ATTRIBUTE_NS_URI: &str = "http://www.w3.org/2000/xmlns/";

/// A read-only mapping between prefixes and namespace URIs.
pub trait NamespaceContext {
    /// The namespace URI bound to `prefix`, or `None` if there is no
    /// binding.
    ///
    /// A prefix explicitly bound to [`NULL_NS_URI`] yields `Some("")`.
    fn namespace_uri(&self, prefix: &str) -> Option<&str>;

    /// The preferred prefix for `namespace_uri`, or `None` if no prefix is
    /// bound to it.
    fn prefix(&self, namespace_uri: &str) -> Option<&str>;

    /// All prefixes bound to `namespace_uri`, without duplicates.
    fn prefixes(&self, namespace_uri: &str) -> Vec<&str>;
}

impl<T: NamespaceContext + ?Sized> NamespaceContext for &T {
    fn namespace_uri(&self, prefix: &str) -> Option<&str> {
        (**self).namespace_uri(prefix)
    }

    fn prefix(&self, namespace_uri: &str) -> Option<&str> {
        (**self).prefix(namespace_uri)
    }

    fn prefixes(&self, namespace_uri: &str) -> Vec<&str> {
        (**self).prefixes(namespace_uri)
    }
}

// the reserved prefixes can't be rebound, so every context answers for them
pub(crate) fn builtin_namespace_uri(prefix: &str) -> Option<&'static str> {
    match prefix {
        XML_NS_PREFIX => Some(XML_NS_URI),
        XMLNS_ATTRIBUTE => Some(XMLNS_ATTRIBUTE_NS_URI),
        _ => None,
    }
}

pub(crate) fn builtin_prefix(namespace_uri: &str) -> Option<&'static str> {
    match namespace_uri {
        XML_NS_URI => Some(XML_NS_PREFIX),
        XMLNS_ATTRIBUTE_NS_URI => Some(XMLNS_ATTRIBUTE),
        _ => None,
    }
}

pub(crate) fn push_unique<'a>(prefixes: &mut Vec<&'a str>, prefix: &'a str) {
    if !prefixes.contains(&prefix) {
        prefixes.push(prefix);
    }
}
