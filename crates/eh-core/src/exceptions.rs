//! Element hiding exception store
//!
//! Exceptions are kept in per-selector lists so that the engine can ask, for
//! a selector it is about to emit, whether any exception suppresses it on
//! the current domain.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::types::ElemHideException;

/// Change produced by a successful mutation of the store.
///
/// The owner of the store is expected to dispatch it; the store itself has
/// no subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExceptionEvent {
    Added(Arc<ElemHideException>),
    Removed(Arc<ElemHideException>),
}

/// Lookup table of element hiding exceptions by selector.
#[derive(Debug, Default)]
pub struct ElemHideExceptions {
    by_selector: HashMap<String, Vec<Arc<ElemHideException>>>,
    exceptions: HashSet<Arc<ElemHideException>>,
}

impl ElemHideExceptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an exception. Returns `None` if it was already known.
    pub fn add(&mut self, exception: Arc<ElemHideException>) -> Option<ExceptionEvent> {
        if self.exceptions.contains(&exception) {
            return None;
        }

        self.by_selector
            .entry(exception.selector.clone())
            .or_default()
            .push(Arc::clone(&exception));
        self.exceptions.insert(Arc::clone(&exception));

        Some(ExceptionEvent::Added(exception))
    }

    /// Remove an exception. Returns `None` if it was not known.
    pub fn remove(&mut self, exception: &ElemHideException) -> Option<ExceptionEvent> {
        let removed = self.exceptions.take(exception)?;

        if let Some(list) = self.by_selector.get_mut(&removed.selector) {
            list.retain(|e| **e != *removed);
            if list.is_empty() {
                self.by_selector.remove(&removed.selector);
            }
        }

        Some(ExceptionEvent::Removed(removed))
    }

    /// Remove all exceptions.
    pub fn clear(&mut self) {
        self.by_selector.clear();
        self.exceptions.clear();
    }

    /// Check whether any exception is registered for a selector.
    #[inline]
    pub fn has_exceptions(&self, selector: &str) -> bool {
        self.by_selector.contains_key(selector)
    }

    /// First exception for `selector`, in insertion order, that is active on
    /// `domain`.
    pub fn get_exception(&self, selector: &str, domain: Option<&str>) -> Option<&Arc<ElemHideException>> {
        self.by_selector
            .get(selector)?
            .iter()
            .find(|exception| exception.is_active_on_domain(domain))
    }

    /// Iterate over all exceptions in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<ElemHideException>> {
        self.exceptions.iter()
    }

    pub fn contains(&self, exception: &ElemHideException) -> bool {
        self.exceptions.contains(exception)
    }

    pub fn len(&self) -> usize {
        self.exceptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exceptions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Domains;

    fn exception(text: &str, selector: &str, entries: Option<&[(&str, bool)]>) -> Arc<ElemHideException> {
        let domains = entries.map(|entries| entries.iter().map(|&(d, i)| (d, i)).collect::<Domains>());
        Arc::new(ElemHideException::new(text, selector, domains))
    }

    #[test]
    fn test_add_is_idempotent() {
        let mut store = ElemHideExceptions::new();
        let e = exception("#@#.ad", ".ad", None);

        assert_eq!(store.add(Arc::clone(&e)), Some(ExceptionEvent::Added(Arc::clone(&e))));
        assert_eq!(store.add(Arc::clone(&e)), None);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_remove_unknown_is_noop() {
        let mut store = ElemHideExceptions::new();
        let e = exception("#@#.ad", ".ad", None);
        assert_eq!(store.remove(&e), None);
    }

    #[test]
    fn test_has_exceptions_tracks_last_removal() {
        let mut store = ElemHideExceptions::new();
        let a = exception("a.com#@#.ad", ".ad", Some(&[("", false), ("a.com", true)]));
        let b = exception("b.com#@#.ad", ".ad", Some(&[("", false), ("b.com", true)]));
        store.add(Arc::clone(&a));
        store.add(Arc::clone(&b));

        store.remove(&a);
        assert!(store.has_exceptions(".ad"));
        store.remove(&b);
        assert!(!store.has_exceptions(".ad"));
    }

    #[test]
    fn test_get_exception_by_domain() {
        let mut store = ElemHideExceptions::new();
        let e = exception("good.com#@#.ad", ".ad", Some(&[("", false), ("good.com", true)]));
        store.add(Arc::clone(&e));

        assert_eq!(store.get_exception(".ad", Some("good.com")), Some(&e));
        assert_eq!(store.get_exception(".ad", Some("www.good.com")), Some(&e));
        assert_eq!(store.get_exception(".ad", Some("other.com")), None);
        assert_eq!(store.get_exception(".banner", Some("good.com")), None);
    }

    #[test]
    fn test_get_exception_insertion_order() {
        let mut store = ElemHideExceptions::new();
        let first = exception("#@#.ad", ".ad", None);
        let second = exception("good.com#@#.ad", ".ad", Some(&[("", false), ("good.com", true)]));
        store.add(Arc::clone(&first));
        store.add(Arc::clone(&second));

        assert_eq!(store.get_exception(".ad", Some("good.com")), Some(&first));
    }

    #[test]
    fn test_clear() {
        let mut store = ElemHideExceptions::new();
        let e = exception("#@#.ad", ".ad", None);
        store.add(Arc::clone(&e));
        store.clear();
        assert!(store.is_empty());
        assert!(!store.has_exceptions(".ad"));
        assert!(!store.contains(&e));
    }
}
