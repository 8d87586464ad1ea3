use super::{push_unique, NamespaceContext, DEFAULT_NS_PREFIX, NULL_NS_URI};

/// The union of two independent namespace contexts.
///
/// The primary context is asked first. A primary answer of the empty
/// namespace counts as no answer, so a primary context that doesn't mention a
/// prefix behaves the same as one that maps it to no namespace.
///
/// Either side may be a reference, as `&T` implements [`NamespaceContext`]:
///
/// ```rust
/// use xmlreplay::{CombiningNamespaceContext, NamespaceContext, SimpleNamespaceContext};
///
/// let primary = SimpleNamespaceContext::from_bindings([("a", "urn:a")]);
/// let secondary = SimpleNamespaceContext::from_bindings([("p", "urn:x")]);
/// let combined = CombiningNamespaceContext::new(&primary, &secondary);
///
/// assert_eq!(combined.namespace_uri("p"), Some("urn:x"));
/// assert_eq!(combined.namespace_uri("a"), Some("urn:a"));
/// ```
#[derive(Debug, Clone)]
pub struct CombiningNamespaceContext<P, S> {
    primary: P,
    secondary: S,
}

impl<P: NamespaceContext, S: NamespaceContext> CombiningNamespaceContext<P, S> {
    /// Combine `primary` with `secondary`, `primary` taking precedence.
    pub fn new(primary: P, secondary: S) -> Self {
        Self { primary, secondary }
    }

    /// The context consulted first.
    pub fn primary(&self) -> &P {
        &self.primary
    }

    /// The fallback context.
    pub fn secondary(&self) -> &S {
        &self.secondary
    }

    // the primary's default prefix only counts when it is actually bound to
    // a namespace
    fn is_unbound_default(&self, prefix: &str, namespace_uri: &str) -> bool {
        prefix == DEFAULT_NS_PREFIX
            && namespace_uri != NULL_NS_URI
            && self
                .primary
                .namespace_uri(DEFAULT_NS_PREFIX)
                .map_or(true, |ns| ns == NULL_NS_URI)
    }
}

impl<P: NamespaceContext, S: NamespaceContext> NamespaceContext
    for CombiningNamespaceContext<P, S>
{
    fn namespace_uri(&self, prefix: &str) -> Option<&str> {
        match self.primary.namespace_uri(prefix) {
            Some(namespace_uri) if namespace_uri != NULL_NS_URI => Some(namespace_uri),
            _ => self.secondary.namespace_uri(prefix),
        }
    }

    fn prefix(&self, namespace_uri: &str) -> Option<&str> {
        match self.primary.prefix(namespace_uri) {
            Some(prefix) if !self.is_unbound_default(prefix, namespace_uri) => Some(prefix),
            _ => self.secondary.prefix(namespace_uri),
        }
    }

    fn prefixes(&self, namespace_uri: &str) -> Vec<&str> {
        let mut prefixes = self.primary.prefixes(namespace_uri);
        for prefix in self.secondary.prefixes(namespace_uri) {
            push_unique(&mut prefixes, prefix);
        }
        prefixes
    }
}
