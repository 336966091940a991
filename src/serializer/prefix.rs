//! Namespace URI to prefix resolution
//!
//! Lookup scans the visible bindings innermost first and skips any binding
//! whose prefix was later rebound to a different URI. When nothing usable is
//! in scope a synthetic `n<counter>` prefix can be registered on the current
//! segment.

use super::scope::ScopeStack;
use crate::types::NamespaceBinding;
use log::trace;

/// Source of synthetic prefixes, owned by one writer
#[derive(Debug, Clone, Default)]
pub struct PrefixGenerator {
    counter: u64,
}

impl PrefixGenerator {
    pub fn new() -> Self {
        PrefixGenerator { counter: 0 }
    }

    /// Next candidate; never repeats within one document
    fn next_candidate(&mut self) -> String {
        let mut digits = itoa::Buffer::new();
        let candidate = format!("n{}", digits.format(self.counter));
        self.counter += 1;
        candidate
    }

    /// Next candidate not bound to any URI among `bindings`
    pub fn fresh(&mut self, bindings: &[NamespaceBinding]) -> String {
        loop {
            let candidate = self.next_candidate();
            if !bindings.iter().any(|b| b.prefix == candidate) {
                return candidate;
            }
        }
    }
}

/// Whether the binding at `index` is hidden by a later rebinding of its prefix
fn is_shadowed(bindings: &[NamespaceBinding], index: usize) -> bool {
    let candidate = &bindings[index];
    bindings[index + 1..]
        .iter()
        .any(|later| later.prefix == candidate.prefix && later.uri != candidate.uri)
}

/// Prefix in effect for `uri`, if any
///
/// With `include_default` unset, the empty (default) prefix never qualifies.
pub fn lookup<'a>(scope: &'a ScopeStack, uri: &str, include_default: bool) -> Option<&'a str> {
    let bindings = scope.bindings();
    bindings
        .iter()
        .enumerate()
        .rev()
        .filter(|(_, b)| b.uri == uri && (include_default || !b.prefix.is_empty()))
        .find(|&(index, _)| !is_shadowed(bindings, index))
        .map(|(_, b)| b.prefix.as_str())
}

/// URI currently bound to `prefix`, innermost binding wins
pub fn uri_for_prefix<'a>(scope: &'a ScopeStack, prefix: &str) -> Option<&'a str> {
    scope
        .bindings()
        .iter()
        .rev()
        .find(|b| b.prefix == prefix)
        .map(|b| b.uri.as_str())
}

/// Find a usable prefix for `uri`, creating one when allowed
///
/// A created binding lands in the current segment, not yet written.
pub fn resolve(
    scope: &mut ScopeStack,
    generator: &mut PrefixGenerator,
    uri: &str,
    include_default: bool,
    allow_create: bool,
) -> Option<String> {
    if let Some(prefix) = lookup(scope, uri, include_default) {
        return Some(prefix.to_string());
    }
    if !allow_create {
        return None;
    }

    let prefix = if uri.is_empty() {
        if uri_for_prefix(scope, "") == Some("") {
            return Some(String::new());
        }
        String::new()
    } else {
        generator.fresh(scope.bindings())
    };
    trace!("binding generated prefix '{}' to {}", prefix, uri);
    scope.declare(NamespaceBinding::new(&prefix, uri, false));
    Some(prefix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ElementFrame, XML_NS_URI};

    fn open(scope: &mut ScopeStack, name: &str) {
        scope.push_frame(ElementFrame::new(None, "", name));
        scope.open();
    }

    #[test]
    fn test_reserved_prefixes_resolve() {
        let scope = ScopeStack::new(false);
        assert_eq!(lookup(&scope, XML_NS_URI, false), Some("xml"));
        assert_eq!(lookup(&scope, "", true), Some(""));
        assert_eq!(lookup(&scope, "", false), None);
    }

    #[test]
    fn test_ancestor_binding_is_reused() {
        let mut scope = ScopeStack::new(false);
        let mut generator = PrefixGenerator::new();
        scope.declare(NamespaceBinding::new("a", "urn:a", true));
        open(&mut scope, "root");
        open(&mut scope, "child");

        let prefix = resolve(&mut scope, &mut generator, "urn:a", false, true);
        assert_eq!(prefix.as_deref(), Some("a"));
        assert!(scope.current_segment().is_empty());
    }

    #[test]
    fn test_shadowed_binding_is_skipped() {
        let mut scope = ScopeStack::new(false);
        scope.declare(NamespaceBinding::new("p", "urn:outer", true));
        open(&mut scope, "root");
        scope.declare(NamespaceBinding::new("p", "urn:inner", true));
        open(&mut scope, "child");

        assert_eq!(lookup(&scope, "urn:outer", false), None);
        assert_eq!(lookup(&scope, "urn:inner", false), Some("p"));

        scope.close(None, "child").unwrap();
        assert_eq!(lookup(&scope, "urn:outer", false), Some("p"));
    }

    #[test]
    fn test_generated_prefix_avoids_user_prefixes() {
        let mut scope = ScopeStack::new(false);
        let mut generator = PrefixGenerator::new();
        scope.declare(NamespaceBinding::new("n0", "urn:user", true));

        let prefix = resolve(&mut scope, &mut generator, "urn:new", false, true).unwrap();
        assert_eq!(prefix, "n1");
        let binding = scope.current_segment().last().unwrap();
        assert_eq!(binding.uri, "urn:new");
        assert!(!binding.written);
    }

    #[test]
    fn test_counter_is_never_reset() {
        let mut scope = ScopeStack::new(false);
        let mut generator = PrefixGenerator::new();

        scope.push_frame(ElementFrame::new(None, "", "a"));
        let first = resolve(&mut scope, &mut generator, "urn:a", false, true).unwrap();
        scope.open();
        scope.close(None, "a").unwrap();

        let second = resolve(&mut scope, &mut generator, "urn:b", false, true).unwrap();
        assert_eq!(first, "n0");
        assert_eq!(second, "n1");
    }

    #[test]
    fn test_no_create_returns_none() {
        let mut scope = ScopeStack::new(false);
        let mut generator = PrefixGenerator::new();
        assert_eq!(resolve(&mut scope, &mut generator, "urn:x", false, false), None);
        assert_eq!(scope.bindings().len(), 3);
    }

    #[test]
    fn test_empty_uri_creates_default_prefix() {
        let mut scope = ScopeStack::new(false);
        let mut generator = PrefixGenerator::new();
        let prefix = resolve(&mut scope, &mut generator, "", false, true);
        assert_eq!(prefix.as_deref(), Some(""));
    }

    #[test]
    fn test_uri_for_prefix_prefers_innermost() {
        let mut scope = ScopeStack::new(false);
        scope.declare(NamespaceBinding::new("", "urn:outer", true));
        open(&mut scope, "root");
        scope.declare(NamespaceBinding::new("", "urn:inner", true));
        assert_eq!(uri_for_prefix(&scope, ""), Some("urn:inner"));
        assert_eq!(uri_for_prefix(&scope, "missing"), None);
    }
}
