//! Search query parameters.
//!
//! This module turns a `Query` into the query-string parameters the search
//! endpoint understands.

use serde_json::json;

use search_tank_shared::{Query, Range};

/// Build the query-string parameters for a search or delete-by-search call.
///
/// Parameters left at their default are omitted so the service applies its
/// own defaults:
/// - `q`: the query text (always present)
/// - `start`, `len`: pagination
/// - `function`: scoring function slot
/// - `snippet`, `fetch`: comma-separated field lists
/// - `fetch_variables`, `fetch_categories`: `true` when requested
/// - `var<N>`: query variables
/// - `category_filters`: JSON object of category to accepted values
/// - `filter_docvar<N>`, `filter_function<N>`: comma-separated `floor:ceil`
///   ranges, `*` for an open bound
pub fn search_params(query: &Query) -> Vec<(String, String)> {
    let mut params = vec![("q".to_string(), query.text.clone())];

    if let Some(start) = query.start {
        params.push(("start".to_string(), start.to_string()));
    }
    if let Some(len) = query.len {
        params.push(("len".to_string(), len.to_string()));
    }
    if let Some(function) = query.function {
        params.push(("function".to_string(), function.to_string()));
    }
    if !query.snippet_fields.is_empty() {
        params.push(("snippet".to_string(), query.snippet_fields.join(",")));
    }
    if !query.fetch_fields.is_empty() {
        params.push(("fetch".to_string(), query.fetch_fields.join(",")));
    }
    if query.fetch_variables {
        params.push(("fetch_variables".to_string(), "true".to_string()));
    }
    if query.fetch_categories {
        params.push(("fetch_categories".to_string(), "true".to_string()));
    }
    for (index, value) in &query.variables {
        params.push((format!("var{}", index), value.to_string()));
    }
    if !query.category_filters.is_empty() {
        params.push((
            "category_filters".to_string(),
            json!(query.category_filters).to_string(),
        ));
    }
    for (index, ranges) in &query.docvar_filters {
        if !ranges.is_empty() {
            params.push((format!("filter_docvar{}", index), format_ranges(ranges)));
        }
    }
    for (slot, ranges) in &query.function_filters {
        if !ranges.is_empty() {
            params.push((format!("filter_function{}", slot), format_ranges(ranges)));
        }
    }

    params
}

fn format_ranges(ranges: &[Range]) -> String {
    ranges
        .iter()
        .map(format_range)
        .collect::<Vec<_>>()
        .join(",")
}

fn format_range(range: &Range) -> String {
    let bound = |value: Option<f64>| value.map_or_else(|| "*".to_string(), |v| v.to_string());
    format!("{}:{}", bound(range.floor), bound(range.ceil))
}
