use std::ops::Range;

use super::{builtin_namespace_uri, builtin_prefix, push_unique, NamespaceContext, SimpleNamespaceContext};
use crate::error::Error;

/// All namespace scopes of a traversal, kept in a single vector.
///
/// Every start tag pushes a scope frame and every end tag pops one; the
/// bindings of a frame live in a contiguous range of the vector. Lookups see
/// the innermost binding of a prefix only.
#[derive(Debug, Clone, Default)]
pub struct NamespaceStack {
    bindings: Vec<(String, String)>,
    frames: Vec<usize>,
}

impl NamespaceStack {
    /// An empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter a new scope.
    pub fn push_scope(&mut self) {
        self.frames.push(self.bindings.len());
    }

    /// Leave the innermost scope, dropping its bindings.
    ///
    /// Popping with no scope open drops nothing.
    pub fn pop_scope(&mut self) {
        if let Some(start) = self.frames.pop() {
            self.bindings.truncate(start);
        }
    }

    /// The number of open scopes.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// The total number of bindings on the stack, shadowed ones included.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether there are no bindings at all.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Bind `prefix` in the innermost scope.
    ///
    /// Returns `false` if the scope already has exactly this binding, so it
    /// need not be declared again. Binding a prefix twice in one scope to
    /// different namespaces is an error.
    pub fn declare(&mut self, prefix: &str, namespace_uri: &str) -> Result<bool, Error> {
        if let Some(existing) = self.declared_in_scope(prefix) {
            if existing == namespace_uri {
                return Ok(false);
            }
            return Err(Error::ConflictingNamespace {
                prefix: prefix.to_string(),
                existing: existing.to_string(),
                declared: namespace_uri.to_string(),
            });
        }
        self.bindings
            .push((prefix.to_string(), namespace_uri.to_string()));
        Ok(true)
    }

    /// The namespace `prefix` is bound to in the innermost scope itself.
    pub fn declared_in_scope(&self, prefix: &str) -> Option<&str> {
        self.bindings[self.frame_range()]
            .iter()
            .find(|(p, _)| p == prefix)
            .map(|(_, ns)| ns.as_str())
    }

    /// The index range of the bindings declared in the innermost scope.
    pub fn frame_range(&self) -> Range<usize> {
        self.frames.last().copied().unwrap_or(0)..self.bindings.len()
    }

    /// The `(prefix, namespace)` binding at `index`.
    ///
    /// Panics if `index` is out of range.
    pub fn binding(&self, index: usize) -> (&str, &str) {
        let (prefix, ns) = &self.bindings[index];
        (prefix, ns)
    }

    /// The bindings currently in effect, outermost first.
    pub fn in_scope(&self) -> SimpleNamespaceContext {
        self.bindings
            .iter()
            .filter(|(prefix, ns)| self.namespace_uri(prefix) == Some(ns.as_str()))
            .map(|(prefix, ns)| (prefix.as_str(), ns.as_str()))
            .collect()
    }

    fn innermost_first(&self) -> impl Iterator<Item = &(String, String)> + '_ {
        let ends = self
            .frames
            .iter()
            .skip(1)
            .copied()
            .chain(std::iter::once(self.bindings.len()));
        let starts = std::iter::once(0).chain(self.frames.iter().skip(1).copied());
        let ranges: Vec<Range<usize>> = starts.zip(ends).map(|(s, e)| s..e).collect();
        ranges
            .into_iter()
            .rev()
            .flat_map(move |range| self.bindings[range].iter())
    }

    fn is_effective(&self, prefix: &str, namespace_uri: &str) -> bool {
        self.namespace_uri(prefix) == Some(namespace_uri)
    }
}

impl NamespaceContext for NamespaceStack {
    fn namespace_uri(&self, prefix: &str) -> Option<&str> {
        self.bindings
            .iter()
            .rev()
            .find(|(p, _)| p == prefix)
            .map(|(_, ns)| ns.as_str())
            .or_else(|| builtin_namespace_uri(prefix))
    }

    fn prefix(&self, namespace_uri: &str) -> Option<&str> {
        self.innermost_first()
            .find(|(prefix, ns)| ns == namespace_uri && self.is_effective(prefix, ns))
            .map(|(prefix, _)| prefix.as_str())
            .or_else(|| builtin_prefix(namespace_uri))
    }

    fn prefixes(&self, namespace_uri: &str) -> Vec<&str> {
        let mut prefixes = Vec::new();
        for (prefix, ns) in self.innermost_first() {
            if ns == namespace_uri && self.is_effective(prefix, ns) {
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

    #[test]
    fn test_scopes_shadow_and_pop() {
        let mut stack = NamespaceStack::new();
        stack.push_scope();
        stack.declare("p", "urn:a").unwrap();
        stack.declare("q", "urn:a").unwrap();
        stack.push_scope();
        stack.declare("p", "urn:b").unwrap();

        assert_eq!(stack.depth(), 2);
        assert_eq!(stack.namespace_uri("p"), Some("urn:b"));
        assert_eq!(stack.prefixes("urn:a"), vec!["q"]);
        assert_eq!(stack.prefix("urn:a"), Some("q"));
        assert_eq!(stack.frame_range(), 2..3);

        stack.pop_scope();
        assert_eq!(stack.namespace_uri("p"), Some("urn:a"));
        assert_eq!(stack.prefixes("urn:a"), vec!["p", "q"]);
        assert_eq!(stack.frame_range(), 0..2);
    }

    #[test]
    fn test_redeclare_same_binding() {
        let mut stack = NamespaceStack::new();
        stack.push_scope();
        assert!(stack.declare("p", "urn:a").unwrap());
        assert!(!stack.declare("p", "urn:a").unwrap());
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn test_conflicting_declaration() {
        let mut stack = NamespaceStack::new();
        stack.push_scope();
        stack.declare("p", "urn:a").unwrap();
        let err = stack.declare("p", "urn:b");
        assert!(matches!(err, Err(Error::ConflictingNamespace { .. })));
    }

    #[test]
    fn test_innermost_prefix_preferred() {
        let mut stack = NamespaceStack::new();
        stack.push_scope();
        stack.declare("outer", "urn:a").unwrap();
        stack.push_scope();
        stack.declare("inner", "urn:a").unwrap();
        assert_eq!(stack.prefix("urn:a"), Some("inner"));
        assert_eq!(stack.prefixes("urn:a"), vec!["inner", "outer"]);
    }

    #[test]
    fn test_in_scope_skips_shadowed() {
        let mut stack = NamespaceStack::new();
        stack.push_scope();
        stack.declare("p", "urn:a").unwrap();
        stack.declare("q", "urn:q").unwrap();
        stack.push_scope();
        stack.declare("p", "urn:b").unwrap();
        let context = stack.in_scope();
        assert_eq!(
            context.iter().collect::<Vec<_>>(),
            vec![("q", "urn:q"), ("p", "urn:b")]
        );
    }

    #[test]
    fn test_pop_without_scope() {
        let mut stack = NamespaceStack::new();
        stack.pop_scope();
        assert_eq!(stack.depth(), 0);
        assert!(stack.is_empty());
        assert_eq!(stack.namespace_uri("p"), None);
    }
}
