//! Element Hiding Core Library
//!
//! This crate indexes element hiding filters and exceptions and turns them
//! into the CSS text that hides matching page elements on a given domain.
//!
//! # Architecture
//!
//! Filters are split into two index structures. Filters that apply on every
//! domain and have no exception for their selector are kept in a flat
//! selector map and rendered once into a default style sheet. Everything else
//! is indexed by domain and resolved per request by walking the domain's
//! suffix chain. Generated style sheets are cached in several tiers that are
//! invalidated as filters and exceptions come and go.
//!
//! # Modules
//!
//! - `types`: Filter, exception and style sheet result types
//! - `domain`: Hostname normalization and suffix iteration
//! - `cache`: Bounded LRU style sheet cache and lazily rebuilt tiers
//! - `filters_by_domain`: Domain-indexed filter store
//! - `exceptions`: Exception store keyed by selector
//! - `notifier`: Update notifications for external observers
//! - `stylesheet`: CSS text generation
//! - `elem_hide`: The engine tying it all together

pub mod cache;
pub mod domain;
pub mod elem_hide;
pub mod exceptions;
pub mod filters_by_domain;
pub mod notifier;
pub mod stylesheet;
pub mod types;

// Re-export commonly used types
pub use domain::{domain_suffixes, normalize_hostname};
pub use elem_hide::ElemHide;
pub use exceptions::ElemHideExceptions;
pub use notifier::{ElemHideEvent, FilterNotifier, SUBSCRIBER_QUEUE_CAPACITY};
pub use stylesheet::{create_style_sheet, rules_from_style_sheet, SELECTOR_GROUP_SIZE};
pub use types::{Domains, ElemHideException, ElemHideFilter, ElemHideStyleSheet, StyleSheetOptions};
