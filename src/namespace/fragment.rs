use super::{builtin_namespace_uri, builtin_prefix, push_unique, NamespaceContext, SimpleNamespaceContext};

/// A lexical namespace scope nested in a parent scope.
///
/// Each scope holds the bindings declared at its own level and borrows the
/// scope it is nested in, so a child can never outlive its parent. Local
/// bindings shadow the parent's bindings for the same prefix, including a
/// local binding to the empty namespace.
///
/// ```rust
/// use xmlreplay::{FragmentNamespaceContext, NamespaceContext};
///
/// let outer = FragmentNamespaceContext::root([("p", "urn:a"), ("q", "urn:a")]);
/// let inner = outer.child([("p", "urn:b")]);
///
/// assert_eq!(inner.namespace_uri("p"), Some("urn:b"));
/// assert_eq!(inner.namespace_uri("q"), Some("urn:a"));
/// assert_eq!(inner.prefixes("urn:a"), vec!["q"]);
/// ```
#[derive(Debug, Clone)]
pub struct FragmentNamespaceContext<'p> {
    parent: Option<&'p FragmentNamespaceContext<'p>>,
    local: SimpleNamespaceContext,
}

impl<'p> FragmentNamespaceContext<'p> {
    /// Create a scope with the given parent and local bindings.
    pub fn new<I, P, U>(parent: Option<&'p FragmentNamespaceContext<'p>>, bindings: I) -> Self
    where
        I: IntoIterator<Item = (P, U)>,
        P: Into<String>,
        U: Into<String>,
    {
        Self {
            parent,
            local: SimpleNamespaceContext::from_bindings(bindings),
        }
    }

    /// Create an outermost scope.
    pub fn root<I, P, U>(bindings: I) -> Self
    where
        I: IntoIterator<Item = (P, U)>,
        P: Into<String>,
        U: Into<String>,
    {
        Self::new(None, bindings)
    }

    /// Create a scope nested in this one.
    pub fn child<I, P, U>(&self, bindings: I) -> FragmentNamespaceContext<'_>
    where
        I: IntoIterator<Item = (P, U)>,
        P: Into<String>,
        U: Into<String>,
    {
        FragmentNamespaceContext::new(Some(self), bindings)
    }

    /// The enclosing scope, if any.
    pub fn parent(&self) -> Option<&FragmentNamespaceContext<'p>> {
        self.parent
    }

    /// The bindings declared at this level.
    pub fn local(&self) -> &SimpleNamespaceContext {
        &self.local
    }

    /// How many scopes enclose this one.
    pub fn depth(&self) -> usize {
        self.parent.map_or(0, |parent| parent.depth() + 1)
    }

    fn is_locally_bound(&self, prefix: &str) -> bool {
        self.local.local_namespace_uri(prefix).is_some()
    }
}

impl<'p> NamespaceContext for FragmentNamespaceContext<'p> {
    fn namespace_uri(&self, prefix: &str) -> Option<&str> {
        if let Some(namespace_uri) = self.local.local_namespace_uri(prefix) {
            return Some(namespace_uri);
        }
        match self.parent {
            Some(parent) => parent.namespace_uri(prefix),
            None => builtin_namespace_uri(prefix),
        }
    }

    fn prefix(&self, namespace_uri: &str) -> Option<&str> {
        if let Some((prefix, _)) = self.local.iter().find(|(_, ns)| *ns == namespace_uri) {
            return Some(prefix);
        }
        match self.parent {
            Some(parent) => parent.prefix(namespace_uri),
            None => builtin_prefix(namespace_uri),
        }
    }

    fn prefixes(&self, namespace_uri: &str) -> Vec<&str> {
        let mut prefixes = self.local.prefixes(namespace_uri);
        if let Some(parent) = self.parent {
            for prefix in parent.prefixes(namespace_uri) {
                if !self.is_locally_bound(prefix) {
                    push_unique(&mut prefixes, prefix);
                }
            }
        }
        prefixes
    }
}
