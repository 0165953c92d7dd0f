//! Hostname utilities
//!
//! Normalization and suffix walking for document domains. These work on
//! string slices and only allocate when a hostname has to be rewritten.

/// Normalize a hostname for lookup.
///
/// Trims surrounding whitespace and trailing dots and lowercases ASCII.
/// Input that cannot be a hostname normalizes to `""`, which callers treat
/// as "no known domain".
pub fn normalize_hostname(host: &str) -> String {
    let host = host.trim().trim_end_matches('.');

    if host.bytes().any(is_forbidden_host_byte) {
        return String::new();
    }

    host.to_ascii_lowercase()
}

#[inline]
fn is_forbidden_host_byte(b: u8) -> bool {
    b.is_ascii_whitespace()
        || b.is_ascii_control()
        || matches!(b, b'/' | b'\\' | b'?' | b'#' | b'@')
}

/// Get the parent domain (strip leftmost label).
pub fn get_parent_domain(host: &str) -> Option<&str> {
    host.find('.').map(|idx| &host[idx + 1..])
}

/// Iterator over a domain and its ancestor suffixes.
///
/// `www.example.com` yields `www.example.com`, `example.com`, `com` and,
/// when requested, a final `""` for the generic scope.
pub struct DomainSuffixes<'a> {
    current: &'a str,
    include_blank: bool,
    done: bool,
}

impl<'a> DomainSuffixes<'a> {
    pub fn new(domain: &'a str, include_blank: bool) -> Self {
        Self {
            current: domain,
            include_blank,
            done: false,
        }
    }
}

impl<'a> Iterator for DomainSuffixes<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        if self.current.is_empty() {
            self.done = true;
            return if self.include_blank { Some("") } else { None };
        }

        let result = self.current;
        self.current = get_parent_domain(self.current).unwrap_or("");
        Some(result)
    }
}

/// Walk domain suffixes from most specific to least specific.
pub fn domain_suffixes(domain: &str, include_blank: bool) -> DomainSuffixes<'_> {
    DomainSuffixes::new(domain, include_blank)
}
