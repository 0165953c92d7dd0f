//! Domain-indexed filter store
//!
//! Conditional filters are recorded under every domain key of their domain
//! mapping together with the include flag for that key. Filters without a
//! mapping go under the generic `""` key.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::types::{Domains, ElemHideFilter};

/// Filters recorded under one domain key, in insertion order.
#[derive(Debug, Default)]
pub struct FilterBucket {
    entries: BTreeMap<u64, (Arc<ElemHideFilter>, bool)>,
}

impl FilterBucket {
    /// Iterate over `(filter, include)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Arc<ElemHideFilter>, bool)> {
        self.entries.values().map(|(filter, include)| (filter, *include))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Where a filter was recorded, for removal without a full scan.
#[derive(Debug)]
struct Registration {
    seq: u64,
    domains: Vec<String>,
}

/// Lookup table of filters by domain.
#[derive(Debug, Default)]
pub struct FiltersByDomain {
    buckets: HashMap<String, FilterBucket>,
    registrations: HashMap<Arc<ElemHideFilter>, Registration>,
    next_seq: u64,
}

impl FiltersByDomain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a filter under each domain of `domains`.
    ///
    /// Without a domain mapping the filter is recorded as included under the
    /// generic key. Adding a filter that is already present re-records it.
    pub fn add(&mut self, filter: Arc<ElemHideFilter>, domains: Option<&Domains>) {
        if self.registrations.contains_key(&filter) {
            self.remove(&filter);
        }

        let seq = self.next_seq;
        self.next_seq += 1;

        let entries: Vec<(String, bool)> = match domains {
            Some(domains) => domains.iter().map(|(domain, include)| (domain.to_string(), include)).collect(),
            None => vec![(String::new(), true)],
        };

        let mut registered = Vec::with_capacity(entries.len());
        for (domain, include) in entries {
            self.buckets
                .entry(domain.clone())
                .or_default()
                .entries
                .insert(seq, (Arc::clone(&filter), include));
            registered.push(domain);
        }

        self.registrations.insert(filter, Registration { seq, domains: registered });
    }

    /// Remove a filter from every bucket it was recorded under.
    pub fn remove(&mut self, filter: &ElemHideFilter) -> bool {
        let Some(registration) = self.registrations.remove(filter) else {
            return false;
        };

        for domain in &registration.domains {
            if let Some(bucket) = self.buckets.get_mut(domain) {
                bucket.entries.remove(&registration.seq);
                if bucket.is_empty() {
                    self.buckets.remove(domain);
                }
            }
        }

        true
    }

    /// Bucket for an exact domain key.
    #[inline]
    pub fn get(&self, domain: &str) -> Option<&FilterBucket> {
        self.buckets.get(domain)
    }

    /// Check whether an exact domain key has any filters.
    #[inline]
    pub fn has(&self, domain: &str) -> bool {
        self.buckets.contains_key(domain)
    }

    pub fn contains(&self, filter: &ElemHideFilter) -> bool {
        self.registrations.contains_key(filter)
    }

    /// Number of distinct filters in the store.
    pub fn filter_count(&self) -> usize {
        self.registrations.len()
    }

    /// Number of domain keys with at least one filter.
    pub fn domain_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn clear(&mut self) {
        self.buckets.clear();
        self.registrations.clear();
    }
}
