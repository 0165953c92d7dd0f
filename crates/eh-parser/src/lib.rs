//! Element Hiding Filter List Parser
//!
//! This crate turns ABP-style filter list text into element hiding filters
//! and exceptions for the `eh-core` engine.

pub mod parser;

pub use parser::{parse_domains, parse_filter, parse_filter_list, ElemHideRule, ParseError, ParsedList};
