//! Deterministic in-memory data source and JSON builders for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use serde_json::json;

use crate::error::{MediaGraphError, Result};
use crate::wikidata::client::{Binding, DataSource, QueryRow};
use crate::wikidata::ids::{ItemRef, PropertyRef};

/// Fake data source programmed with canned entities, subclass closures, and
/// relation-query rows.
///
/// Subclass queries for unprogrammed classes answer with just the class
/// itself; relation queries for unprogrammed items answer with no rows.
pub(crate) struct FakeDataSource {
    entities: Mutex<HashMap<ItemRef, serde_json::Value>>,
    subclasses: Mutex<HashMap<ItemRef, Vec<ItemRef>>>,
    relations: Mutex<HashMap<ItemRef, Vec<QueryRow>>>,
    entity_fetches: AtomicUsize,
    queries_run: AtomicUsize,
}

impl FakeDataSource {
    pub(crate) fn new() -> Self {
        Self {
            entities: Mutex::new(HashMap::new()),
            subclasses: Mutex::new(HashMap::new()),
            relations: Mutex::new(HashMap::new()),
            entity_fetches: AtomicUsize::new(0),
            queries_run: AtomicUsize::new(0),
        }
    }

    pub(crate) fn put_entity(&self, item: ItemRef, data: serde_json::Value) {
        self.entities.lock().unwrap().insert(item, data);
    }

    pub(crate) fn put_subclasses(&self, class: ItemRef, closure: Vec<ItemRef>) {
        self.subclasses.lock().unwrap().insert(class, closure);
    }

    pub(crate) fn put_relations(&self, item: ItemRef, rows: Vec<QueryRow>) {
        self.relations.lock().unwrap().insert(item, rows);
    }

    pub(crate) fn entity_fetches(&self) -> usize {
        self.entity_fetches.load(Ordering::SeqCst)
    }

    pub(crate) fn queries_run(&self) -> usize {
        self.queries_run.load(Ordering::SeqCst)
    }
}

fn item_after(query: &str, marker: &str) -> Option<ItemRef> {
    let start = query.find(marker)? + marker.len();
    let digits: String = query[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    ItemRef::parse(&format!("Q{digits}")).ok()
}

impl DataSource for FakeDataSource {
    fn entity_data(&self, item: ItemRef) -> Result<serde_json::Value> {
        self.entity_fetches.fetch_add(1, Ordering::SeqCst);
        self.entities
            .lock()
            .unwrap()
            .get(&item)
            .cloned()
            .ok_or_else(|| MediaGraphError::DataFetch(format!("no entity record for {item}")))
    }

    fn run_query(&self, query: &str) -> Result<Vec<QueryRow>> {
        self.queries_run.fetch_add(1, Ordering::SeqCst);
        if let Some(class) = item_after(query, "wdt:P279* wd:Q") {
            let closure = self
                .subclasses
                .lock()
                .unwrap()
                .get(&class)
                .cloned()
                .unwrap_or_else(|| vec![class]);
            return Ok(closure
                .into_iter()
                .map(|c| {
                    let mut row = QueryRow::new();
                    row.insert("class".to_string(), uri(c));
                    row
                })
                .collect());
        }
        if let Some(item) = item_after(query, "{ wd:Q") {
            return Ok(self
                .relations
                .lock()
                .unwrap()
                .get(&item)
                .cloned()
                .unwrap_or_default());
        }
        Err(MediaGraphError::Validation(format!(
            "fake data source cannot answer query: {query}"
        )))
    }
}

pub(crate) fn uri(item: ItemRef) -> Binding {
    Binding::Uri(item.uri())
}

pub(crate) fn plain(value: &str) -> Binding {
    Binding::Literal {
        value: value.to_string(),
        language: None,
        datatype: None,
    }
}

/// Rows a relation query would return for one neighbor: a bare row plus one
/// row per class and per form binding, the way a real endpoint fans out
/// optional bindings.
pub(crate) fn relation_rows(
    neighbor: ItemRef,
    category: &str,
    classes: &[ItemRef],
    forms: &[ItemRef],
) -> Vec<QueryRow> {
    let base: QueryRow = [
        ("item".to_string(), uri(neighbor)),
        ("relation".to_string(), plain(category)),
    ]
    .into_iter()
    .collect();
    let mut rows = vec![base.clone()];
    for &class in classes {
        let mut row = base.clone();
        row.insert("itemClass".to_string(), uri(class));
        rows.push(row);
    }
    for &form in forms {
        let mut row = base.clone();
        row.insert("itemForm".to_string(), uri(form));
        rows.push(row);
    }
    rows
}

pub(crate) fn item_statement(rank: &str, target: ItemRef) -> serde_json::Value {
    json!({
        "mainsnak": {
            "snaktype": "value",
            "datavalue": {
                "type": "wikibase-entityid",
                "value": {"entity-type": "item", "id": target.to_string()},
            },
        },
        "rank": rank,
    })
}

pub(crate) fn string_statement(rank: &str, value: &str) -> serde_json::Value {
    json!({
        "mainsnak": {
            "snaktype": "value",
            "datavalue": {"type": "string", "value": value},
        },
        "rank": rank,
    })
}

/// Entity-data JSON assembled from label/description pairs and per-property
/// statement lists.
pub(crate) fn entity_with(
    labels: &[(&str, &str)],
    descriptions: &[(&str, &str)],
    claims: Vec<(PropertyRef, Vec<serde_json::Value>)>,
) -> serde_json::Value {
    let labels: serde_json::Map<String, serde_json::Value> = labels
        .iter()
        .map(|(language, value)| {
            (
                language.to_string(),
                json!({"language": language, "value": value}),
            )
        })
        .collect();
    let descriptions: serde_json::Map<String, serde_json::Value> = descriptions
        .iter()
        .map(|(language, value)| {
            (
                language.to_string(),
                json!({"language": language, "value": value}),
            )
        })
        .collect();
    let claims: serde_json::Map<String, serde_json::Value> = claims
        .into_iter()
        .map(|(property, statements)| (property.to_string(), serde_json::Value::Array(statements)))
        .collect();
    json!({"labels": labels, "descriptions": descriptions, "claims": claims})
}
