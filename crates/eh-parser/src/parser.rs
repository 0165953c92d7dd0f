use std::sync::Arc;

use log::{debug, warn};

use eh_core::{normalize_hostname, Domains, ElemHide, ElemHideException, ElemHideFilter};

/// Error for a line that looks like an element hiding rule but is invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("Empty selector")]
    EmptySelector,
    #[error("Empty domain in domain list")]
    EmptyDomain,
    #[error("Invalid domain: {0}")]
    InvalidDomain(String),
}

/// A parsed element hiding rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElemHideRule {
    Filter(Arc<ElemHideFilter>),
    Exception(Arc<ElemHideException>),
}

/// Element hiding rules of a filter list.
#[derive(Debug, Default)]
pub struct ParsedList {
    pub filters: Vec<Arc<ElemHideFilter>>,
    pub exceptions: Vec<Arc<ElemHideException>>,
    /// Lines that are not element hiding rules
    pub skipped: usize,
    /// Element hiding lines rejected as invalid
    pub invalid: usize,
}

impl ParsedList {
    /// Add every rule to an engine. Returns the number of new rules.
    pub fn apply_to(&self, engine: &mut ElemHide) -> usize {
        let mut added = 0;

        for exception in &self.exceptions {
            if engine.add_exception(Arc::clone(exception)) {
                added += 1;
            }
        }

        for filter in &self.filters {
            if engine.add(Arc::clone(filter)) {
                added += 1;
            }
        }

        added
    }

    pub fn len(&self) -> usize {
        self.filters.len() + self.exceptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Parse all element hiding rules of a filter list.
///
/// Invalid rules are logged and counted, never fatal.
pub fn parse_filter_list(text: &str) -> ParsedList {
    let mut list = ParsedList::default();

    for (index, raw_line) in text.lines().enumerate() {
        match parse_filter(raw_line) {
            Ok(Some(ElemHideRule::Filter(filter))) => list.filters.push(filter),
            Ok(Some(ElemHideRule::Exception(exception))) => list.exceptions.push(exception),
            Ok(None) => list.skipped += 1,
            Err(e) => {
                warn!("line {}: {} in '{}'", index + 1, e, raw_line.trim());
                list.invalid += 1;
            }
        }
    }

    debug!(
        "parsed {} filters, {} exceptions ({} skipped, {} invalid)",
        list.filters.len(),
        list.exceptions.len(),
        list.skipped,
        list.invalid
    );

    list
}

/// Parse a single line.
///
/// Returns `Ok(None)` for lines that are not element hiding rules: blanks,
/// comments, list headers, network rules and extended cosmetic syntaxes.
pub fn parse_filter(line: &str) -> Result<Option<ElemHideRule>, ParseError> {
    let line = line.trim();
    if line.is_empty() || is_comment_line(line) {
        return Ok(None);
    }

    let Some((source, separator, selector)) = split_elemhide(line) else {
        return Ok(None);
    };

    let selector = selector.trim();
    if selector.is_empty() {
        return Err(ParseError::EmptySelector);
    }

    let domains = parse_domains(source)?;

    let rule = match separator {
        Separator::Hide => ElemHideRule::Filter(Arc::new(ElemHideFilter::new(line, selector, domains))),
        Separator::Exception => {
            ElemHideRule::Exception(Arc::new(ElemHideException::new(line, selector, domains)))
        }
    };

    Ok(Some(rule))
}

/// Parse a comma separated domain list (`example.com,~ads.example.com`).
///
/// Returns `None` for an empty list. The generic entry is included unless
/// at least one domain is listed without `~`.
pub fn parse_domains(source: &str) -> Result<Option<Domains>, ParseError> {
    let source = source.trim();
    if source.is_empty() {
        return Ok(None);
    }

    let mut domains = Domains::new();
    let mut has_includes = false;

    for raw in source.split(',') {
        let raw = raw.trim();
        let (include, name) = match raw.strip_prefix('~') {
            Some(name) => (false, name),
            None => (true, raw),
        };

        if name.is_empty() {
            return Err(ParseError::EmptyDomain);
        }

        let domain = normalize_domain(name).ok_or_else(|| ParseError::InvalidDomain(name.to_string()))?;

        has_includes |= include;
        domains.insert(domain, include);
    }

    domains.insert("", !has_includes);
    Ok(Some(domains))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Separator {
    /// `##`
    Hide,
    /// `#@#`
    Exception,
}

fn split_elemhide(line: &str) -> Option<(&str, Separator, &str)> {
    let hash = line.find('#')?;
    let (source, rest) = line.split_at(hash);

    // Network rules may contain '#' in their pattern
    if source.contains(['/', '|', '@', '"', '!', '$', '*', '^']) {
        return None;
    }

    if let Some(selector) = rest.strip_prefix("##") {
        Some((source, Separator::Hide, selector))
    } else if let Some(selector) = rest.strip_prefix("#@#") {
        Some((source, Separator::Exception, selector))
    } else {
        // #?#, #$#, #%# and anything else
        None
    }
}

fn is_comment_line(line: &str) -> bool {
    line.starts_with('!') || line.starts_with('[')
}

fn normalize_domain(name: &str) -> Option<String> {
    let domain = normalize_hostname(name);
    if domain.is_empty() {
        return None;
    }

    if !domain
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'.' || b == b'-' || b == b'_' || !b.is_ascii())
    {
        return None;
    }

    Some(domain)
}
