//! Wire formats of the REST API.
//!
//! Response bodies are decoded here into the shared types.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::errors::IndexError;
use search_tank_shared::{IndexMetadata, SearchHit, SearchResults};

/// Index metadata as sent by the service.
#[derive(Debug, Deserialize)]
pub(crate) struct MetadataWire {
    code: String,
    creation_time: String,
    #[serde(default)]
    started: bool,
    #[serde(default)]
    size: u64,
    #[serde(default)]
    public_search: bool,
}

impl TryFrom<MetadataWire> for IndexMetadata {
    type Error = IndexError;

    fn try_from(wire: MetadataWire) -> Result<Self, Self::Error> {
        Ok(IndexMetadata {
            creation_time: parse_timestamp(&wire.creation_time)?,
            code: wire.code,
            started: wire.started,
            size: wire.size,
            public_search: wire.public_search,
        })
    }
}

/// Per-document answer to a batch add.
#[derive(Debug, Deserialize)]
pub(crate) struct AddOutcome {
    pub added: bool,
    #[serde(default)]
    pub error: Option<String>,
}

/// Per-document answer to a batch delete.
#[derive(Debug, Deserialize)]
pub(crate) struct DeleteOutcome {
    pub deleted: bool,
    #[serde(default)]
    pub error: Option<String>,
}

/// Parse a creation timestamp.
///
/// The service sends naive UTC timestamps (`2010-08-11T20:50:10`), RFC 3339
/// is accepted as well.
pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, IndexError> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| Utc.from_utc_datetime(&naive))
        .map_err(|e| IndexError::transport(format!("Invalid creation_time {:?}: {}", raw, e)))
}

/// Decode a search response body.
pub(crate) fn parse_search_response(body: &Value) -> Result<SearchResults, IndexError> {
    let object = body
        .as_object()
        .ok_or_else(|| IndexError::transport("search response is not a JSON object"))?;

    let hits: Vec<SearchHit> = object
        .get("results")
        .and_then(Value::as_array)
        .map(|results| results.iter().filter_map(parse_hit).collect())
        .unwrap_or_default();

    let matches = object
        .get("matches")
        .and_then(Value::as_u64)
        .unwrap_or(hits.len() as u64);

    let mut facets = BTreeMap::new();
    if let Some(raw_facets) = object.get("facets").and_then(Value::as_object) {
        for (category, values) in raw_facets {
            let counts: BTreeMap<String, u64> = values
                .as_object()
                .map(|values| {
                    values
                        .iter()
                        .filter_map(|(value, count)| count.as_u64().map(|c| (value.clone(), c)))
                        .collect()
                })
                .unwrap_or_default();
            facets.insert(category.clone(), counts);
        }
    }

    // search_time comes back as a string of seconds
    let search_time = object.get("search_time").and_then(|value| match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    });

    let did_you_mean = object
        .get("didyoumean")
        .and_then(Value::as_str)
        .map(str::to_string);

    Ok(SearchResults {
        matches,
        hits,
        facets,
        search_time,
        did_you_mean,
    })
}

/// Decode one entry of `results`.
///
/// Entries are flat objects: `docid`, `query_relevance_score`, `variable_<N>`,
/// `category_<name>`, `snippet_<field>`, and any fetched field by name.
/// Entries without a docid are skipped.
pub(crate) fn parse_hit(hit: &Value) -> Option<SearchHit> {
    let object = hit.as_object()?;
    let docid = match object.get("docid").and_then(Value::as_str) {
        Some(docid) => docid.to_string(),
        None => {
            warn!("Search result without docid skipped");
            return None;
        }
    };

    let mut result = SearchHit::new(docid);
    for (key, value) in object {
        if key == "docid" {
            continue;
        }
        if key == "query_relevance_score" {
            result.score = value.as_f64();
        } else if let Some(index) = key.strip_prefix("variable_") {
            if let (Ok(index), Some(value)) = (index.parse::<u32>(), value.as_f64()) {
                result.variables.insert(index, value);
            }
        } else if let Some(category) = key.strip_prefix("category_") {
            if let Some(value) = value.as_str() {
                result.categories.insert(category.to_string(), value.to_string());
            }
        } else if let Some(field) = key.strip_prefix("snippet_") {
            if let Some(value) = value.as_str() {
                result.snippets.insert(field.to_string(), value.to_string());
            }
        } else if let Some(value) = value.as_str() {
            result.fields.insert(key.clone(), value.to_string());
        }
    }

    Some(result)
}
