use super::{builtin_namespace_uri, builtin_prefix, push_unique, NamespaceContext};

/// A flat, immutable set of prefix to namespace bindings.
///
/// A prefix is bound to at most one namespace; a namespace may be bound to
/// several prefixes. Bindings keep their declaration order.
///
/// ```rust
/// use xmlreplay::{NamespaceContext, SimpleNamespaceContext};
///
/// let context = SimpleNamespaceContext::from_bindings([("a", "urn:x"), ("b", "urn:x")]);
/// assert_eq!(context.namespace_uri("a"), Some("urn:x"));
/// assert_eq!(context.prefix("urn:x"), Some("a"));
/// assert_eq!(context.prefixes("urn:x"), vec!["a", "b"]);
/// assert_eq!(context.namespace_uri("c"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimpleNamespaceContext {
    bindings: Vec<(String, String)>,
}

impl SimpleNamespaceContext {
    /// An empty context. Only the reserved prefixes are bound.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context from `(prefix, namespace)` pairs.
    ///
    /// A later pair for a prefix replaces an earlier one, in place.
    pub fn from_bindings<I, P, U>(bindings: I) -> Self
    where
        I: IntoIterator<Item = (P, U)>,
        P: Into<String>,
        U: Into<String>,
    {
        let mut result: Vec<(String, String)> = Vec::new();
        for (prefix, namespace_uri) in bindings {
            let prefix = prefix.into();
            let namespace_uri = namespace_uri.into();
            if let Some(existing) = result.iter_mut().find(|(p, _)| *p == prefix) {
                existing.1 = namespace_uri;
            } else {
                result.push((prefix, namespace_uri));
            }
        }
        Self { bindings: result }
    }

    /// The namespace declared for `prefix` in this context itself, ignoring
    /// the reserved prefixes.
    pub fn local_namespace_uri(&self, prefix: &str) -> Option<&str> {
        self.bindings
            .iter()
            .find(|(p, _)| p == prefix)
            .map(|(_, ns)| ns.as_str())
    }

    /// Iterate over the declared `(prefix, namespace)` bindings in
    /// declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.bindings
            .iter()
            .map(|(prefix, ns)| (prefix.as_str(), ns.as_str()))
    }

    /// The number of declared bindings.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether nothing is declared.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl<P: Into<String>, U: Into<String>> FromIterator<(P, U)> for SimpleNamespaceContext {
    fn from_iter<T: IntoIterator<Item = (P, U)>>(iter: T) -> Self {
        Self::from_bindings(iter)
    }
}

impl NamespaceContext for SimpleNamespaceContext {
    fn namespace_uri(&self, prefix: &str) -> Option<&str> {
        self.local_namespace_uri(prefix)
            .or_else(|| builtin_namespace_uri(prefix))
    }

    fn prefix(&self, namespace_uri: &str) -> Option<&str> {
        self.bindings
            .iter()
            .find(|(_, ns)| ns == namespace_uri)
            .map(|(prefix, _)| prefix.as_str())
            .or_else(|| builtin_prefix(namespace_uri))
    }

    fn prefixes(&self, namespace_uri: &str) -> Vec<&str> {
        let mut prefixes = Vec::new();
        for (prefix, ns) in &self.bindings {
            if ns == namespace_uri {
                push_unique(&mut prefixes, prefix.as_str());
            }
        }
        if let Some(prefix) = builtin_prefix(namespace_uri) {
            push_unique(&mut prefixes, prefix);
        }
        prefixes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespace::{XML_NS_PREFIX, XML_NS_URI};

    #[test]
    fn test_later_binding_replaces_earlier() {
        let context = SimpleNamespaceContext::from_bindings([("p", "urn:a"), ("p", "urn:b")]);
        assert_eq!(context.len(), 1);
        assert_eq!(context.namespace_uri("p"), Some("urn:b"));
        assert!(context.prefixes("urn:a").is_empty());
    }

    #[test]
    fn test_builtin_prefixes() {
        let context = SimpleNamespaceContext::new();
        assert!(context.is_empty());
        assert_eq!(context.namespace_uri(XML_NS_PREFIX), Some(XML_NS_URI));
        assert_eq!(context.prefix(XML_NS_URI), Some(XML_NS_PREFIX));
        assert_eq!(context.local_namespace_uri(XML_NS_PREFIX), None);
    }

    #[test]
    fn test_explicit_empty_binding() {
        let context: SimpleNamespaceContext = [("", "")].into_iter().collect();
        assert_eq!(context.namespace_uri(""), Some(""));
        assert_eq!(context.prefix(""), Some(""));
    }

    #[test]
    fn test_iter_in_declaration_order() {
        let context = SimpleNamespaceContext::from_bindings([("b", "urn:b"), ("a", "urn:a")]);
        assert_eq!(
            context.iter().collect::<Vec<_>>(),
            vec![("b", "urn:b"), ("a", "urn:a")]
        );
    }
}
