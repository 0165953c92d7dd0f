//! Core type definitions for element hiding
//!
//! Filters and exceptions are produced by the filter list parser and shared
//! with the engine as `Arc`s. Identity is the filter text, so two values
//! parsed from the same line are the same filter.

use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::domain::{domain_suffixes, normalize_hostname};

// =============================================================================
// Domain Restrictions
// =============================================================================

/// Per-domain include flags of a filter or exception.
///
/// The empty key `""` is the generic entry: it answers for every domain that
/// has no more specific entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Domains {
    entries: BTreeMap<String, bool>,
}

impl Domains {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the include flag for a domain.
    pub fn insert(&mut self, domain: impl Into<String>, include: bool) {
        self.entries.insert(domain.into(), include);
    }

    /// Include flag for an exact domain key.
    #[inline]
    pub fn get(&self, domain: &str) -> Option<bool> {
        self.entries.get(domain).copied()
    }

    /// Iterate over `(domain, include)` pairs, including the generic entry.
    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.entries.iter().map(|(domain, include)| (domain.as_str(), *include))
    }

    /// Iterate over the domain keys.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check whether the mapping makes a rule active on a document domain.
    ///
    /// The most specific suffix with an entry decides. Without one the
    /// generic entry decides, and without that the rule is inactive.
    pub fn is_active_on(&self, doc_domain: Option<&str>) -> bool {
        let doc_domain = match doc_domain {
            Some(domain) if !domain.is_empty() => normalize_hostname(domain),
            _ => return self.get("").unwrap_or(false),
        };

        for suffix in domain_suffixes(&doc_domain, false) {
            if let Some(include) = self.get(suffix) {
                return include;
            }
        }

        self.get("").unwrap_or(false)
    }
}

impl<S: Into<String>> FromIterator<(S, bool)> for Domains {
    fn from_iter<I: IntoIterator<Item = (S, bool)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(domain, include)| (domain.into(), include)).collect(),
        }
    }
}

// =============================================================================
// Filters and Exceptions
// =============================================================================

/// An element hiding filter (`example.com##.ad`).
#[derive(Debug, Clone)]
pub struct ElemHideFilter {
    /// Original filter text, used as identity
    pub text: String,
    /// CSS selector of the elements to hide
    pub selector: String,
    /// Domain restrictions, `None` when the filter applies everywhere
    pub domains: Option<Domains>,
}

impl ElemHideFilter {
    pub fn new(text: impl Into<String>, selector: impl Into<String>, domains: Option<Domains>) -> Self {
        Self {
            text: text.into(),
            selector: selector.into(),
            domains,
        }
    }

    /// A filter without domain restrictions, with text `##selector`.
    pub fn generic(selector: &str) -> Arc<Self> {
        Arc::new(Self::new(format!("##{selector}"), selector, None))
    }

    /// Whether the filter applies on domains it does not name.
    pub fn is_generic(&self) -> bool {
        self.domains.as_ref().map_or(true, |domains| domains.get("").unwrap_or(false))
    }
}

impl PartialEq for ElemHideFilter {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl Eq for ElemHideFilter {}

impl Hash for ElemHideFilter {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.text.hash(state);
    }
}

/// An element hiding exception (`example.com#@#.ad`).
#[derive(Debug, Clone)]
pub struct ElemHideException {
    /// Original exception text, used as identity
    pub text: String,
    /// Selector whose filters this exception suppresses
    pub selector: String,
    /// Domain restrictions, `None` when the exception applies everywhere
    pub domains: Option<Domains>,
}

impl ElemHideException {
    pub fn new(text: impl Into<String>, selector: impl Into<String>, domains: Option<Domains>) -> Self {
        Self {
            text: text.into(),
            selector: selector.into(),
            domains,
        }
    }

    /// Check whether this exception is in effect on a document domain.
    ///
    /// An exception without domain restrictions is active everywhere.
    pub fn is_active_on_domain(&self, doc_domain: Option<&str>) -> bool {
        self.domains.as_ref().map_or(true, |domains| domains.is_active_on(doc_domain))
    }
}

impl PartialEq for ElemHideException {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl Eq for ElemHideException {}

impl Hash for ElemHideException {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.text.hash(state);
    }
}

// =============================================================================
// Style Sheet Requests and Results
// =============================================================================

bitflags::bitflags! {
    /// Options for style sheet generation.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct StyleSheetOptions: u8 {
        /// Leave out selectors from generic filters
        const SPECIFIC_ONLY = 1 << 0;
        /// Return the list of selectors alongside the CSS code
        const INCLUDE_SELECTORS = 1 << 1;
        /// Return the exceptions that suppressed selectors
        const INCLUDE_EXCEPTIONS = 1 << 2;
    }
}

/// Result of style sheet generation for a domain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElemHideStyleSheet {
    /// CSS code
    pub code: String,
    /// Selectors, when requested with `INCLUDE_SELECTORS`
    pub selectors: Option<Vec<String>>,
    /// Matched exceptions, when requested with `INCLUDE_EXCEPTIONS`
    pub exceptions: Option<Vec<Arc<ElemHideException>>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn domains(entries: &[(&str, bool)]) -> Domains {
        entries.iter().map(|&(domain, include)| (domain, include)).collect()
    }

    #[test]
    fn test_unrestricted_exception_is_active_everywhere() {
        let exception = ElemHideException::new("#@#.ad", ".ad", None);
        assert!(exception.is_active_on_domain(Some("example.com")));
        assert!(exception.is_active_on_domain(None));
    }

    #[test]
    fn test_domains_suffix_match() {
        let map = domains(&[("", false), ("example.com", true)]);
        assert!(map.is_active_on(Some("example.com")));
        assert!(map.is_active_on(Some("www.example.com")));
        assert!(!map.is_active_on(Some("example.org")));
        assert!(!map.is_active_on(None));
    }

    #[test]
    fn test_domains_exclusion_shadows_ancestor() {
        let map = domains(&[("", false), ("example.com", true), ("ads.example.com", false)]);
        assert!(map.is_active_on(Some("x.example.com")));
        assert!(!map.is_active_on(Some("ads.example.com")));
        assert!(!map.is_active_on(Some("a.ads.example.com")));
    }

    #[test]
    fn test_domains_generic_with_exclusion() {
        let map = domains(&[("", true), ("example.com", false)]);
        assert!(map.is_active_on(Some("other.org")));
        assert!(map.is_active_on(None));
        assert!(!map.is_active_on(Some("www.example.com")));
    }

    #[test]
    fn test_domains_case_and_trailing_dot() {
        let map = domains(&[("", false), ("example.com", true)]);
        assert!(map.is_active_on(Some("WWW.Example.COM.")));
    }

    #[test]
    fn test_filter_identity_is_text() {
        let a = ElemHideFilter::new("##.ad", ".ad", None);
        let b = ElemHideFilter::new("##.ad", ".ad", None);
        let c = ElemHideFilter::new("example.com##.ad", ".ad", Some(domains(&[("example.com", true)])));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_filter_is_generic() {
        assert!(ElemHideFilter::generic(".ad").is_generic());
        let specific = ElemHideFilter::new(
            "example.com##.ad",
            ".ad",
            Some(domains(&[("", false), ("example.com", true)])),
        );
        assert!(!specific.is_generic());
        let negated = ElemHideFilter::new("~example.com##.ad", ".ad", Some(domains(&[("", true), ("example.com", false)])));
        assert!(negated.is_generic());
    }

    #[test]
    fn test_options_default_empty() {
        assert!(StyleSheetOptions::default().is_empty());
    }
}
