use std::fs;
use std::path::Path;

use eh_core::ElemHide;
use eh_parser::parse_filter_list;

#[derive(Debug, Clone, Default)]
pub struct LoadStats {
    pub lines: usize,
    pub filters: usize,
    /// Filters that also apply on domains they do not name
    pub generic_filters: usize,
    pub exceptions: usize,
    pub skipped: usize,
    pub invalid: usize,
}

/// Read filter lists and load their element hiding rules into a new engine.
pub fn load_engine(inputs: &[String], verbose: bool) -> Result<(ElemHide, LoadStats), String> {
    if inputs.is_empty() {
        return Err("No input files specified".to_string());
    }

    let mut engine = ElemHide::new();
    let mut stats = LoadStats::default();

    for (list_id, path) in inputs.iter().enumerate() {
        let content = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read '{}': {}", path, e))?;

        let line_count = content.lines().count();
        let list = parse_filter_list(&content);
        list.apply_to(&mut engine);

        if verbose {
            eprintln!(
                "  [{}] {} - {} lines, {} filters, {} exceptions, {} invalid",
                list_id,
                Path::new(path).file_name().unwrap_or_default().to_string_lossy(),
                line_count,
                list.filters.len(),
                list.exceptions.len(),
                list.invalid
            );
        }

        stats.lines += line_count;
        stats.filters += list.filters.len();
        stats.generic_filters += list.filters.iter().filter(|filter| filter.is_generic()).count();
        stats.exceptions += list.exceptions.len();
        stats.skipped += list.skipped;
        stats.invalid += list.invalid;
    }

    Ok((engine, stats))
}
