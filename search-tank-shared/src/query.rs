//! Search query parameters.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Page length used by the service when a query does not set one.
pub const DEFAULT_PAGE_LEN: u32 = 10;

/// An inclusive numeric range. A missing bound is unbounded on that side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub floor: Option<f64>,
    pub ceil: Option<f64>,
}

impl Range {
    /// Range with both bounds.
    pub fn new(floor: f64, ceil: f64) -> Self {
        Self {
            floor: Some(floor),
            ceil: Some(ceil),
        }
    }

    /// Range bounded below only.
    pub fn at_least(floor: f64) -> Self {
        Self {
            floor: Some(floor),
            ceil: None,
        }
    }

    /// Range bounded above only.
    pub fn at_most(ceil: f64) -> Self {
        Self {
            floor: None,
            ceil: Some(ceil),
        }
    }

    /// Check whether `value` falls inside the range.
    pub fn contains(&self, value: f64) -> bool {
        self.floor.map_or(true, |floor| value >= floor) && self.ceil.map_or(true, |ceil| value <= ceil)
    }
}

/// A search request.
///
/// Plain text converts into a query with every option left at the service
/// default:
///
/// ```
/// use search_tank_shared::Query;
///
/// let query: Query = "shoe".into();
/// assert_eq!(query.text, "shoe");
/// assert!(query.start.is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Query {
    /// The query text.
    pub text: String,
    /// Offset of the first result to return.
    pub start: Option<u32>,
    /// Number of results to return.
    pub len: Option<u32>,
    /// Scoring function slot used to rank results.
    pub function: Option<u32>,
    /// Fields to return snippets for.
    pub snippet_fields: Vec<String>,
    /// Fields to return verbatim. `*` fetches every field.
    pub fetch_fields: Vec<String>,
    /// Return each hit's variables.
    pub fetch_variables: bool,
    /// Return each hit's categories.
    pub fetch_categories: bool,
    /// Query variables available to scoring functions.
    pub variables: BTreeMap<u32, f32>,
    /// Category name to the accepted values.
    pub category_filters: BTreeMap<String, Vec<String>>,
    /// Document variable index to accepted ranges.
    pub docvar_filters: BTreeMap<u32, Vec<Range>>,
    /// Scoring function slot to accepted ranges of its value.
    pub function_filters: BTreeMap<u32, Vec<Range>>,
}

impl Query {
    /// Create a query for the given text.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_start(mut self, start: u32) -> Self {
        self.start = Some(start);
        self
    }

    pub fn with_len(mut self, len: u32) -> Self {
        self.len = Some(len);
        self
    }

    /// Rank results with the function registered at `slot`.
    pub fn with_scoring_function(mut self, slot: u32) -> Self {
        self.function = Some(slot);
        self
    }

    pub fn with_snippet_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.snippet_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_fetch_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fetch_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_fetch_variables(mut self) -> Self {
        self.fetch_variables = true;
        self
    }

    pub fn with_fetch_categories(mut self) -> Self {
        self.fetch_categories = true;
        self
    }

    pub fn with_query_variable(mut self, index: u32, value: f32) -> Self {
        self.variables.insert(index, value);
        self
    }

    /// Only match documents whose `category` is one of `values`.
    pub fn with_category_filter<I, S>(mut self, category: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.category_filters
            .insert(category.into(), values.into_iter().map(Into::into).collect());
        self
    }

    /// Only match documents whose variable `index` falls in `range`.
    /// Repeated calls for the same index accept any of the ranges.
    pub fn with_docvar_filter(mut self, index: u32, range: Range) -> Self {
        self.docvar_filters.entry(index).or_default().push(range);
        self
    }

    /// Only match documents for which function `slot` evaluates inside `range`.
    pub fn with_function_filter(mut self, slot: u32, range: Range) -> Self {
        self.function_filters.entry(slot).or_default().push(range);
        self
    }

    /// Effective page length.
    pub fn page_len(&self) -> u32 {
        self.len.unwrap_or(DEFAULT_PAGE_LEN)
    }
}

impl From<&str> for Query {
    fn from(text: &str) -> Self {
        Query::new(text)
    }
}

impl From<String> for Query {
    fn from(text: String) -> Self {
        Query::new(text)
    }
}
