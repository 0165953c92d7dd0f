//! Element Hiding Engine
//!
//! Classifies filters as unconditional (apply everywhere, no exception for
//! their selector) or conditional (indexed by domain), and generates style
//! sheets for domains with four cache tiers:
//!
//! 1. the list of unconditional selectors,
//! 2. the default style sheet built from that list,
//! 3. the common style sheet for unknown domains (default plus generic
//!    conditional selectors),
//! 4. an LRU cache of conditional style sheets per known domain suffix.
//!
//! Queries fill caches, so they take `&mut self`. Hosts sharing an engine
//! between threads wrap it in a single lock.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use crossbeam_channel::Receiver;
use log::{debug, trace};

use crate::cache::{StyleSheetCache, Tier, STYLE_SHEET_CACHE_CAPACITY};
use crate::domain::{domain_suffixes, get_parent_domain, normalize_hostname};
use crate::exceptions::{ElemHideExceptions, ExceptionEvent};
use crate::filters_by_domain::FiltersByDomain;
use crate::notifier::{ElemHideEvent, FilterNotifier};
use crate::stylesheet::create_style_sheet;
use crate::types::{ElemHideException, ElemHideFilter, ElemHideStyleSheet, StyleSheetOptions};

// =============================================================================
// Unconditional Selectors
// =============================================================================

/// Filters that apply on all domains, by selector, in insertion order.
///
/// Several filters may share a selector (`##.ad` and `##  .ad` parse to the
/// same one). The selector stays listed until its last filter is gone.
#[derive(Debug, Default)]
struct UnconditionalFilters {
    by_selector: HashMap<String, (u64, Vec<Arc<ElemHideFilter>>)>,
    order: BTreeMap<u64, String>,
    next_seq: u64,
}

impl UnconditionalFilters {
    fn contains(&self, filter: &ElemHideFilter) -> bool {
        self.by_selector
            .get(&filter.selector)
            .is_some_and(|(_, filters)| filters.iter().any(|current| **current == *filter))
    }

    fn insert(&mut self, filter: Arc<ElemHideFilter>) {
        if let Some((_, filters)) = self.by_selector.get_mut(&filter.selector) {
            if !filters.contains(&filter) {
                filters.push(filter);
            }
            return;
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        self.order.insert(seq, filter.selector.clone());
        self.by_selector.insert(filter.selector.clone(), (seq, vec![filter]));
    }

    /// Remove one filter. Returns `false` if it is not in this index.
    fn remove(&mut self, filter: &ElemHideFilter) -> bool {
        let Some((seq, filters)) = self.by_selector.get_mut(&filter.selector) else {
            return false;
        };
        let Some(index) = filters.iter().position(|current| **current == *filter) else {
            return false;
        };

        filters.remove(index);
        if filters.is_empty() {
            let seq = *seq;
            self.by_selector.remove(&filter.selector);
            self.order.remove(&seq);
        }
        true
    }

    /// Remove every filter with `selector`.
    fn take(&mut self, selector: &str) -> Vec<Arc<ElemHideFilter>> {
        match self.by_selector.remove(selector) {
            Some((seq, filters)) => {
                self.order.remove(&seq);
                filters
            }
            None => Vec::new(),
        }
    }

    fn selectors(&self) -> Vec<String> {
        self.order.values().cloned().collect()
    }

    fn len(&self) -> usize {
        self.by_selector.len()
    }

    fn clear(&mut self) {
        self.by_selector.clear();
        self.order.clear();
    }
}

// =============================================================================
// Engine
// =============================================================================

/// Container for element hiding filters and exceptions.
pub struct ElemHide {
    /// Conditional filters by domain
    filters_by_domain: FiltersByDomain,
    /// Unconditional filters by selector
    unconditional: UnconditionalFilters,
    /// Tier 1: selectors of `unconditional`
    unconditional_selectors: Tier<Vec<String>>,
    /// Tier 2: style sheet for `unconditional_selectors`
    default_style_sheet: Tier<String>,
    /// Tier 3: style sheet for domains with no known suffix
    common_style_sheet: Tier<String>,
    /// Tier 4: conditional style sheets by known suffix
    style_sheet_cache: StyleSheetCache,
    /// All known filters
    filters: HashSet<Arc<ElemHideFilter>>,
    /// Every domain ever named by an exception. Never shrinks on removal.
    exception_domains: HashSet<String>,
    exceptions: ElemHideExceptions,
    notifier: FilterNotifier,
}

impl Default for ElemHide {
    fn default() -> Self {
        Self::new()
    }
}

impl ElemHide {
    /// Create an empty engine with the default cache capacity.
    pub fn new() -> Self {
        Self::with_cache_capacity(STYLE_SHEET_CACHE_CAPACITY)
    }

    /// Create an empty engine caching style sheets for up to `capacity`
    /// domain suffixes.
    pub fn with_cache_capacity(capacity: usize) -> Self {
        Self {
            filters_by_domain: FiltersByDomain::new(),
            unconditional: UnconditionalFilters::default(),
            unconditional_selectors: Tier::Stale,
            default_style_sheet: Tier::Stale,
            common_style_sheet: Tier::Stale,
            style_sheet_cache: StyleSheetCache::new(capacity),
            filters: HashSet::new(),
            exception_domains: HashSet::new(),
            exceptions: ElemHideExceptions::new(),
            notifier: FilterNotifier::new(),
        }
    }

    /// Subscribe to update notifications. Receivers that are not drained
    /// are dropped once their queue fills up.
    pub fn subscribe(&mut self) -> Receiver<ElemHideEvent> {
        self.notifier.subscribe()
    }

    /// Read access to the exception store.
    pub fn exceptions(&self) -> &ElemHideExceptions {
        &self.exceptions
    }

    // -------------------------------------------------------------------------
    // Filters
    // -------------------------------------------------------------------------

    /// Add an element hiding filter. Returns `false` if it was already known.
    pub fn add(&mut self, filter: Arc<ElemHideFilter>) -> bool {
        if self.filters.contains(&filter) {
            return false;
        }

        self.invalidate_domain_style_sheets();

        if filter.domains.is_none() && !self.exceptions.has_exceptions(&filter.selector) {
            // Applies to all domains unconditionally
            self.unconditional.insert(Arc::clone(&filter));
            self.invalidate_unconditional();
        } else {
            self.filters_by_domain.add(Arc::clone(&filter), filter.domains.as_ref());
        }

        self.filters.insert(filter);
        self.notifier.emit(ElemHideEvent::Updated);
        true
    }

    /// Remove an element hiding filter. Returns `false` if it was not known.
    pub fn remove(&mut self, filter: &ElemHideFilter) -> bool {
        if !self.filters.contains(filter) {
            return false;
        }

        self.invalidate_domain_style_sheets();

        if self.unconditional.remove(filter) {
            self.invalidate_unconditional();
        } else {
            self.filters_by_domain.remove(filter);
        }

        self.filters.remove(filter);
        self.notifier.emit(ElemHideEvent::Updated);
        true
    }

    /// Remove all filters. Exceptions stay registered.
    pub fn clear(&mut self) {
        self.filters_by_domain.clear();
        self.unconditional.clear();
        self.filters.clear();
        self.style_sheet_cache.clear();
        self.unconditional_selectors.invalidate();
        self.default_style_sheet.invalidate();
        self.common_style_sheet.invalidate();

        // Exceptions outlive a filter reset; their domains must stay known.
        self.exception_domains.clear();
        let domains: Vec<String> = self
            .exceptions
            .iter()
            .filter_map(|exception| exception.domains.as_ref())
            .flat_map(|domains| domains.keys().filter(|d| !d.is_empty()).map(str::to_string))
            .collect();
        self.exception_domains.extend(domains);

        self.notifier.emit(ElemHideEvent::Updated);
    }

    pub fn contains(&self, filter: &ElemHideFilter) -> bool {
        self.filters.contains(filter)
    }

    // -------------------------------------------------------------------------
    // Exceptions
    // -------------------------------------------------------------------------

    /// Add an exception. Returns `false` if it was already known.
    pub fn add_exception(&mut self, exception: Arc<ElemHideException>) -> bool {
        match self.exceptions.add(exception) {
            Some(event) => {
                self.on_exception_event(event);
                true
            }
            None => false,
        }
    }

    /// Remove an exception. Returns `false` if it was not known.
    pub fn remove_exception(&mut self, exception: &ElemHideException) -> bool {
        match self.exceptions.remove(exception) {
            Some(event) => {
                self.on_exception_event(event);
                true
            }
            None => false,
        }
    }

    /// Remove all exceptions.
    pub fn clear_exceptions(&mut self) {
        self.exceptions.clear();
        self.invalidate_domain_style_sheets();
        self.restore_unconditional(None);
        self.notifier.emit(ElemHideEvent::Updated);
    }

    fn on_exception_event(&mut self, event: ExceptionEvent) {
        self.invalidate_domain_style_sheets();

        match event {
            ExceptionEvent::Added(exception) => {
                if let Some(domains) = &exception.domains {
                    // Once known, an exception domain stays known even after
                    // every exception naming it is gone.
                    for domain in domains.keys().filter(|d| !d.is_empty()) {
                        if !self.exception_domains.contains(domain) {
                            self.exception_domains.insert(domain.to_string());
                        }
                    }
                }

                // The first exception for an unconditional selector moves its
                // filters to the domain-aware lookup.
                let migrated = self.unconditional.take(&exception.selector);
                if !migrated.is_empty() {
                    debug!("elemhide: {} is now conditional", exception.selector);
                    for filter in migrated {
                        self.filters_by_domain.add(filter, None);
                    }
                    self.invalidate_unconditional();
                }

                self.notifier.emit(ElemHideEvent::ExceptionAdded(exception));
            }
            ExceptionEvent::Removed(exception) => {
                if !self.exceptions.has_exceptions(&exception.selector) {
                    self.restore_unconditional(Some(&exception.selector));
                }

                self.notifier.emit(ElemHideEvent::ExceptionRemoved(exception));
            }
        }

        self.notifier.emit(ElemHideEvent::Updated);
    }

    /// Move filters without domain restrictions back to the unconditional
    /// lookup once no exception targets their selector.
    fn restore_unconditional(&mut self, selector: Option<&str>) {
        let candidates: Vec<Arc<ElemHideFilter>> = match self.filters_by_domain.get("") {
            Some(bucket) => bucket
                .iter()
                .filter(|(filter, include)| *include && filter.domains.is_none())
                .filter(|(filter, _)| selector.map_or(true, |s| filter.selector == s))
                .map(|(filter, _)| Arc::clone(filter))
                .collect(),
            None => return,
        };

        for filter in candidates {
            if self.exceptions.has_exceptions(&filter.selector) || self.unconditional.contains(&filter) {
                continue;
            }

            debug!("elemhide: {} is unconditional again", filter.selector);
            self.filters_by_domain.remove(&filter);
            self.unconditional.insert(filter);
            self.invalidate_unconditional();
        }
    }

    // -------------------------------------------------------------------------
    // Style Sheets
    // -------------------------------------------------------------------------

    /// Generate the style sheet for a domain from the current filters.
    pub fn generate_style_sheet_for_domain(&mut self, domain: &str, options: StyleSheetOptions) -> ElemHideStyleSheet {
        let domain = normalize_hostname(domain);
        let include_selectors = options.contains(StyleSheetOptions::INCLUDE_SELECTORS);
        let include_exceptions = options.contains(StyleSheetOptions::INCLUDE_EXCEPTIONS);

        let code;
        let mut selectors = Vec::new();
        let mut exceptions = Vec::new();

        if options.contains(StyleSheetOptions::SPECIFIC_ONLY) {
            if include_exceptions {
                (selectors, exceptions) = self.conditional_selectors_with_exceptions(&domain, true);
            } else {
                selectors = self.conditional_selectors(&domain, true);
            }

            code = create_style_sheet(&selectors);
        } else {
            let known_suffix = self.known_suffix(&domain).to_string();

            if include_selectors || include_exceptions {
                // The caches hold CSS only, so lists are always recomputed.
                (selectors, exceptions) = self.conditional_selectors_with_exceptions(&known_suffix, false);

                code = if known_suffix.is_empty() {
                    self.common_style_sheet().to_string()
                } else {
                    let mut code = self.default_style_sheet().to_string();
                    code.push_str(&create_style_sheet(&selectors));
                    code
                };

                let mut all = self.unconditional_selectors().to_vec();
                all.append(&mut selectors);
                selectors = all;
            } else if known_suffix.is_empty() {
                code = self.common_style_sheet().to_string();
            } else {
                let mut combined = self.default_style_sheet().to_string();
                combined.push_str(&self.domain_specific_style_sheet(&known_suffix));
                code = combined;
            }
        }

        ElemHideStyleSheet {
            code,
            selectors: include_selectors.then_some(selectors),
            exceptions: include_exceptions.then_some(exceptions),
        }
    }

    /// Most specific suffix of `domain` that has filters or exceptions of its
    /// own, or `""` if there is none.
    pub fn known_suffix<'d>(&self, domain: &'d str) -> &'d str {
        let mut domain = domain;

        while !domain.is_empty()
            && !self.filters_by_domain.has(domain)
            && !self.exception_domains.contains(domain)
        {
            domain = get_parent_domain(domain).unwrap_or("");
        }

        domain
    }

    /// Visit conditional filters that apply on `domain`, most specific
    /// suffix first.
    ///
    /// A filter excluded at some suffix is skipped at every less specific
    /// suffix of the same walk.
    fn for_each_conditional(&self, domain: &str, specific_only: bool, mut visit: impl FnMut(&ElemHideFilter)) {
        let mut excluded: HashSet<&ElemHideFilter> = HashSet::new();

        for current in domain_suffixes(domain, !specific_only) {
            let Some(bucket) = self.filters_by_domain.get(current) else {
                continue;
            };

            for (filter, include) in bucket.iter() {
                if !include {
                    excluded.insert(&**filter);
                } else if excluded.is_empty() || !excluded.contains(&**filter) {
                    visit(&**filter);
                }
            }
        }
    }

    fn conditional_selectors(&self, domain: &str, specific_only: bool) -> Vec<String> {
        let mut selectors = Vec::new();

        self.for_each_conditional(domain, specific_only, |filter| {
            if self.exceptions.get_exception(&filter.selector, Some(domain)).is_none() {
                selectors.push(filter.selector.clone());
            }
        });

        selectors
    }

    fn conditional_selectors_with_exceptions(
        &self,
        domain: &str,
        specific_only: bool,
    ) -> (Vec<String>, Vec<Arc<ElemHideException>>) {
        let mut selectors = Vec::new();
        let mut exceptions = Vec::new();

        self.for_each_conditional(domain, specific_only, |filter| {
            match self.exceptions.get_exception(&filter.selector, Some(domain)) {
                Some(exception) => exceptions.push(Arc::clone(exception)),
                None => selectors.push(filter.selector.clone()),
            }
        });

        (selectors, exceptions)
    }

    fn unconditional_selectors(&mut self) -> &[String] {
        let Self { unconditional, unconditional_selectors, .. } = self;
        unconditional_selectors.get_or_insert_with(|| unconditional.selectors())
    }

    fn default_style_sheet(&mut self) -> &str {
        let Self {
            unconditional,
            unconditional_selectors,
            default_style_sheet,
            ..
        } = self;

        default_style_sheet.get_or_insert_with(|| {
            create_style_sheet(unconditional_selectors.get_or_insert_with(|| unconditional.selectors()))
        })
    }

    fn common_style_sheet(&mut self) -> &str {
        if !self.common_style_sheet.is_fresh() {
            trace!("elemhide: rebuilding common style sheet");
            let mut style_sheet = self.default_style_sheet().to_string();
            style_sheet.push_str(&create_style_sheet(&self.conditional_selectors("", false)));
            self.common_style_sheet = Tier::Fresh(style_sheet);
        }

        self.common_style_sheet.get_or_insert_with(String::new)
    }

    fn domain_specific_style_sheet(&mut self, domain: &str) -> String {
        if let Some(style_sheet) = self.style_sheet_cache.get(domain) {
            trace!("elemhide: cache hit for {domain}");
            return style_sheet.to_string();
        }

        trace!("elemhide: cache miss for {domain}");
        let style_sheet = create_style_sheet(&self.conditional_selectors(domain, false));
        self.style_sheet_cache.set(domain.to_string(), style_sheet.clone());
        style_sheet
    }

    /// Tiers 3 and 4: anything that depends on conditional filters.
    fn invalidate_domain_style_sheets(&mut self) {
        self.style_sheet_cache.clear();
        self.common_style_sheet.invalidate();
    }

    /// Tiers 1 and 2: anything that depends on unconditional filters.
    fn invalidate_unconditional(&mut self) {
        self.unconditional_selectors.invalidate();
        self.default_style_sheet.invalidate();
    }

    // -------------------------------------------------------------------------
    // Statistics
    // -------------------------------------------------------------------------

    pub fn filter_count(&self) -> usize {
        self.filters.len()
    }

    pub fn unconditional_selector_count(&self) -> usize {
        self.unconditional.len()
    }

    pub fn conditional_filter_count(&self) -> usize {
        self.filters_by_domain.filter_count()
    }

    /// Number of domain keys in the domain index, including the generic key.
    pub fn known_domain_count(&self) -> usize {
        self.filters_by_domain.domain_count()
    }

    pub fn exception_domain_count(&self) -> usize {
        self.exception_domains.len()
    }

    pub fn cached_style_sheet_count(&self) -> usize {
        self.style_sheet_cache.len()
    }
}
