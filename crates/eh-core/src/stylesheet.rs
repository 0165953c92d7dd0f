//! CSS text generation
//!
//! Turns a list of selectors into `display: none` rules. Output of
//! [`create_style_sheet`] has one rule per line, which
//! [`rules_from_style_sheet`] relies on.

/// The maximum number of selectors in a single CSS rule.
///
/// Blink accepts at most 8,192 simple selectors per rule and the weight of a
/// selector is not known here, so lists are split into groups small enough
/// for selectors of average weight up to 8. See https://crbug.com/804179.
pub const SELECTOR_GROUP_SIZE: usize = 1024;

const HIDING_DECLARATION: &str = " {display: none !important;}\n";

/// Escape curly braces to prevent CSS rule injection.
pub fn escape_selector(selector: &str) -> String {
    if !selector.contains(['{', '}']) {
        return selector.to_string();
    }

    selector.replace('{', "\\7B ").replace('}', "\\7D ")
}

/// Split a list of selectors into groups of at most [`SELECTOR_GROUP_SIZE`].
pub fn split_selectors<S: AsRef<str>>(selectors: &[S]) -> std::slice::Chunks<'_, S> {
    selectors.chunks(SELECTOR_GROUP_SIZE)
}

/// Create a hiding rule for a group of selectors.
pub fn create_rule<S: AsRef<str>>(selectors: &[S]) -> String {
    let mut rule = String::new();
    append_rule(&mut rule, selectors);
    rule
}

fn append_rule<S: AsRef<str>>(out: &mut String, selectors: &[S]) {
    for (i, selector) in selectors.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push_str(&escape_selector(selector.as_ref()));
    }
    out.push_str(HIDING_DECLARATION);
}

/// Create a style sheet from a list of selectors.
///
/// Returns an empty string for an empty list.
pub fn create_style_sheet<S: AsRef<str>>(selectors: &[S]) -> String {
    let mut style_sheet = String::new();

    for group in split_selectors(selectors) {
        append_rule(&mut style_sheet, group);
    }

    style_sheet
}

/// Iterator over the rules of a style sheet returned by
/// [`create_style_sheet`]. Any other input gives unspecified results.
pub struct Rules<'a> {
    rest: &'a str,
}

impl<'a> Iterator for Rules<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }

        match self.rest.find('\n') {
            Some(end) => {
                let rule = &self.rest[..end];
                self.rest = &self.rest[end + 1..];
                Some(rule)
            }
            None => {
                let rule = self.rest;
                self.rest = "";
                Some(rule)
            }
        }
    }
}

/// Yield each rule of a generated style sheet, without its newline.
pub fn rules_from_style_sheet(style_sheet: &str) -> Rules<'_> {
    Rules { rest: style_sheet }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_list() {
        let selectors: [&str; 0] = [];
        assert_eq!(create_style_sheet(&selectors), "");
    }

    #[test]
    fn test_single_rule() {
        assert_eq!(
            create_style_sheet(&["#foo", ".bar"]),
            "#foo, .bar {display: none !important;}\n"
        );
    }

    #[test]
    fn test_escape_braces() {
        assert_eq!(
            create_style_sheet(&["a{b}"]),
            "a\\7B b\\7D  {display: none !important;}\n"
        );
    }

    #[test]
    fn test_escape_every_brace() {
        let escaped = escape_selector("}}{{");
        assert!(!escaped.contains('{'));
        assert!(!escaped.contains('}'));
        assert_eq!(escaped.matches("\\7D ").count(), 2);
        assert_eq!(escaped.matches("\\7B ").count(), 2);
    }

    #[test]
    fn test_injection_cannot_close_rule() {
        let css = create_style_sheet(&["div} body {background: red"]);
        assert_eq!(css.matches('{').count(), 1);
        assert_eq!(css.matches('}').count(), 1);
        assert!(css.ends_with("{display: none !important;}\n"));
    }

    #[test]
    fn test_grouping_boundary() {
        let selectors: Vec<String> = (0..SELECTOR_GROUP_SIZE + 1).map(|i| format!(".s{i}")).collect();
        let css = create_style_sheet(&selectors);

        let rules: Vec<&str> = rules_from_style_sheet(&css).collect();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].matches(", ").count(), SELECTOR_GROUP_SIZE - 1);
        assert_eq!(rules[1], ".s1024 {display: none !important;}");
    }

    #[test]
    fn test_exact_group_size_is_one_rule() {
        let selectors: Vec<String> = (0..SELECTOR_GROUP_SIZE).map(|i| format!(".s{i}")).collect();
        assert_eq!(rules_from_style_sheet(&create_style_sheet(&selectors)).count(), 1);
    }

    #[test]
    fn test_split_selectors() {
        let selectors: Vec<String> = (0..2500).map(|i| i.to_string()).collect();
        let sizes: Vec<usize> = split_selectors(&selectors).map(<[String]>::len).collect();
        assert_eq!(sizes, vec![1024, 1024, 452]);
    }

    #[test]
    fn test_create_rule() {
        assert_eq!(create_rule(&[".ad"]), ".ad {display: none !important;}\n");
    }

    #[test]
    fn test_rules_from_style_sheet() {
        let css = format!("{}{}", create_rule(&["a", "b"]), create_rule(&["c"]));
        let rules: Vec<&str> = rules_from_style_sheet(&css).collect();
        assert_eq!(
            rules,
            vec!["a, b {display: none !important;}", "c {display: none !important;}"]
        );
        assert_eq!(rules_from_style_sheet("").count(), 0);
    }
}
