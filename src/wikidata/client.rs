//! Access to the Wikidata APIs: the entity-data endpoint for full records
//! and the SPARQL endpoint for graph queries.

use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{MediaGraphError, Result};
use crate::wikidata::ids::ItemRef;

const DEFAULT_ENTITY_DATA_BASE: &str = "https://www.wikidata.org/wiki/Special:EntityData";
const DEFAULT_QUERY_ENDPOINT: &str = "https://query.wikidata.org/sparql";

/// One typed value from a SPARQL result row.
///
/// Binding kinds outside URI and literal are kept as opaque markers; every
/// use site must validate against the kind it expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    Uri(String),
    Literal {
        value: String,
        language: Option<String>,
        datatype: Option<String>,
    },
    Opaque,
}

impl Binding {
    /// The bound item, requiring a URI binding in canonical entity form.
    pub fn item(&self) -> Result<ItemRef> {
        match self {
            Binding::Uri(uri) => ItemRef::parse(uri),
            _ => Err(MediaGraphError::Validation(
                "expected a URI binding, got a literal or opaque value".to_string(),
            )),
        }
    }

    /// The bound string, requiring a plain literal. Language-tagged and
    /// datatyped literals are rejected.
    pub fn plain_string(&self) -> Result<&str> {
        match self {
            Binding::Literal {
                value,
                language: None,
                datatype: None,
            } => Ok(value),
            Binding::Literal { .. } => Err(MediaGraphError::Validation(
                "expected a plain string literal, got a tagged or typed literal".to_string(),
            )),
            _ => Err(MediaGraphError::Validation(
                "expected a plain string literal, got a URI or opaque value".to_string(),
            )),
        }
    }
}

/// One SPARQL result row: variable name to bound value.
pub type QueryRow = HashMap<String, Binding>;

/// Lookup capabilities consumed by the store and fetcher.
///
/// The production implementation is [`WikidataClient`]; tests substitute a
/// deterministic fake.
pub trait DataSource {
    /// Point lookup of one node's full record, unwrapped to the entity
    /// object itself.
    fn entity_data(&self, item: ItemRef) -> Result<serde_json::Value>;

    /// Run a SPARQL SELECT query and return the typed result rows.
    fn run_query(&self, query: &str) -> Result<Vec<QueryRow>>;
}

/// HTTP client for the Wikidata APIs.
///
/// Issues one blocking request per call; retry and deadline policy live in
/// the underlying HTTP client configuration, not here.
pub struct WikidataClient {
    client: reqwest::blocking::Client,
    entity_data_base: String,
    query_endpoint: String,
}

impl WikidataClient {
    /// Create a client against the public Wikidata endpoints.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be created (should not happen in
    /// normal operation)
    pub fn new(user_agent: &str, timeout: Duration) -> Self {
        Self::with_endpoints(
            user_agent,
            timeout,
            DEFAULT_ENTITY_DATA_BASE,
            DEFAULT_QUERY_ENDPOINT,
        )
    }

    /// Create a client against specific endpoints (e.g. a local mirror).
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be created (should not happen in
    /// normal operation)
    pub fn with_endpoints(
        user_agent: &str,
        timeout: Duration,
        entity_data_base: &str,
        query_endpoint: &str,
    ) -> Self {
        let client = reqwest::blocking::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .expect("Failed to build HTTP client");
        Self {
            client,
            entity_data_base: entity_data_base.trim_end_matches('/').to_string(),
            query_endpoint: query_endpoint.to_string(),
        }
    }

    fn get_json(&self, request: reqwest::blocking::RequestBuilder) -> Result<serde_json::Value> {
        let response = request
            .send()
            .map_err(|e| MediaGraphError::DataFetch(format!("Network error: {e}")))?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(MediaGraphError::DataFetch(format!(
                "Wikidata API error {status}: {body}"
            )));
        }
        response
            .json()
            .map_err(|e| MediaGraphError::Validation(format!("Failed to parse response: {e}")))
    }
}

impl DataSource for WikidataClient {
    fn entity_data(&self, item: ItemRef) -> Result<serde_json::Value> {
        log::debug!("Fetching entity data for {item}");
        let url = format!("{}/{item}.json", self.entity_data_base);
        let body = self.get_json(self.client.get(url))?;
        extract_entity(body, item)
    }

    fn run_query(&self, query: &str) -> Result<Vec<QueryRow>> {
        log::debug!("Running graph query ({} bytes)", query.len());
        let request = self
            .client
            .get(&self.query_endpoint)
            .query(&[("query", query), ("format", "json")])
            .header("Accept", "application/sparql-results+json");
        let body = self.get_json(request)?;
        parse_query_response(body)
    }
}

/// Unwrap the entity object for `item` from an entity-data response.
pub(crate) fn extract_entity(body: serde_json::Value, item: ItemRef) -> Result<serde_json::Value> {
    body.get("entities")
        .and_then(|entities| entities.get(item.to_string()))
        .cloned()
        .ok_or_else(|| {
            MediaGraphError::Validation(format!(
                "entity record for {item} missing from response"
            ))
        })
}

#[derive(Debug, Deserialize)]
struct RawQueryResponse {
    results: RawQueryResults,
}

#[derive(Debug, Deserialize)]
struct RawQueryResults {
    bindings: Vec<HashMap<String, RawCell>>,
}

#[derive(Debug, Deserialize)]
struct RawCell {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    value: Option<serde_json::Value>,
    #[serde(rename = "xml:lang", default)]
    language: Option<String>,
    #[serde(default)]
    datatype: Option<String>,
}

fn cell_string(cell_value: Option<serde_json::Value>, kind: &str) -> Result<String> {
    match cell_value {
        Some(serde_json::Value::String(s)) => Ok(s),
        _ => Err(MediaGraphError::Validation(format!(
            "{kind} binding without a string value in query response"
        ))),
    }
}

/// Decode a SPARQL JSON results document into typed rows.
pub(crate) fn parse_query_response(body: serde_json::Value) -> Result<Vec<QueryRow>> {
    let raw: RawQueryResponse = serde_json::from_value(body)
        .map_err(|e| MediaGraphError::Validation(format!("malformed query response: {e}")))?;
    let mut rows = Vec::with_capacity(raw.results.bindings.len());
    for raw_row in raw.results.bindings {
        let mut row = QueryRow::new();
        for (variable, cell) in raw_row {
            let binding = match cell.kind.as_str() {
                "uri" => Binding::Uri(cell_string(cell.value, "uri")?),
                "literal" => Binding::Literal {
                    value: cell_string(cell.value, "literal")?,
                    language: cell.language,
                    datatype: cell.datatype,
                },
                _ => Binding::Opaque,
            };
            row.insert(variable, binding);
        }
        rows.push(row);
    }
    Ok(rows)
}
