//! Caching accessor for entities, their classes, class-hierarchy closures,
//! and creative-work forms.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use crate::error::{MediaGraphError, Result};
use crate::wikidata::client::DataSource;
use crate::wikidata::entity::Entity;
use crate::wikidata::ids::{ItemRef, P_FORM_OF_CREATIVE_WORK, P_INSTANCE_OF, P_SUBCLASS_OF};

/// Caching store for graph-node data.
///
/// Every accessor is cached by key for the lifetime of the store, and
/// entries are never invalidated. This is a correctness requirement: two
/// evaluations inside one run (e.g. a filter and its negation) must observe
/// byte-identical upstream data. A store must therefore not outlive the run
/// it was created for.
pub struct EntityStore<C> {
    source: C,
    entities: Mutex<HashMap<ItemRef, Arc<Entity>>>,
    classes: Mutex<HashMap<ItemRef, Arc<HashSet<ItemRef>>>>,
    subclasses: Mutex<HashMap<ItemRef, Arc<HashSet<ItemRef>>>>,
    forms: Mutex<HashMap<ItemRef, Arc<HashSet<ItemRef>>>>,
}

impl<C: DataSource> EntityStore<C> {
    pub fn new(source: C) -> Self {
        Self {
            source,
            entities: Mutex::new(HashMap::new()),
            classes: Mutex::new(HashMap::new()),
            subclasses: Mutex::new(HashMap::new()),
            forms: Mutex::new(HashMap::new()),
        }
    }

    /// The underlying data source, for callers that issue their own queries.
    pub fn source(&self) -> &C {
        &self.source
    }

    /// Full decoded record for one node.
    pub fn entity(&self, item: ItemRef) -> Result<Arc<Entity>> {
        if let Some(entity) = self.entities.lock().unwrap().get(&item) {
            return Ok(Arc::clone(entity));
        }
        let data = self.source.entity_data(item)?;
        let entity = Arc::new(Entity::decode(data)?);
        let mut cache = self.entities.lock().unwrap();
        Ok(Arc::clone(cache.entry(item).or_insert(entity)))
    }

    /// Truthy "instance of" values for one node.
    pub fn classes(&self, item: ItemRef) -> Result<Arc<HashSet<ItemRef>>> {
        if let Some(classes) = self.classes.lock().unwrap().get(&item) {
            return Ok(Arc::clone(classes));
        }
        let entity = self.entity(item)?;
        let classes: HashSet<ItemRef> = entity
            .truthy_item_values(P_INSTANCE_OF)?
            .into_iter()
            .collect();
        let classes = Arc::new(classes);
        let mut cache = self.classes.lock().unwrap();
        Ok(Arc::clone(cache.entry(item).or_insert(classes)))
    }

    /// Truthy "form of creative work" values for one node.
    pub fn forms_of_creative_work(&self, item: ItemRef) -> Result<Arc<HashSet<ItemRef>>> {
        if let Some(forms) = self.forms.lock().unwrap().get(&item) {
            return Ok(Arc::clone(forms));
        }
        let entity = self.entity(item)?;
        let forms: HashSet<ItemRef> = entity
            .truthy_item_values(P_FORM_OF_CREATIVE_WORK)?
            .into_iter()
            .collect();
        let forms = Arc::new(forms);
        let mut cache = self.forms.lock().unwrap();
        Ok(Arc::clone(cache.entry(item).or_insert(forms)))
    }

    /// Every class reachable from `class` via zero or more subclass edges,
    /// restricted to classes with at least one site link (which filters out
    /// maintenance and other meta classes).
    ///
    /// Computed with one recursive graph query rather than per-hop lookups.
    pub fn transitive_subclasses(&self, class: ItemRef) -> Result<Arc<HashSet<ItemRef>>> {
        if let Some(subclasses) = self.subclasses.lock().unwrap().get(&class) {
            return Ok(Arc::clone(subclasses));
        }
        let rows = self.source.run_query(&subclass_query(class))?;
        let mut subclasses = HashSet::with_capacity(rows.len());
        for row in &rows {
            let binding = row.get("class").ok_or_else(|| {
                MediaGraphError::Validation(
                    "subclass query row is missing the ?class binding".to_string(),
                )
            })?;
            subclasses.insert(binding.item()?);
        }
        let subclasses = Arc::new(subclasses);
        let mut cache = self.subclasses.lock().unwrap();
        Ok(Arc::clone(cache.entry(class).or_insert(subclasses)))
    }

    /// Record classes for a node observed in a relation query, avoiding a
    /// later entity fetch. Never overwrites an existing entry.
    pub fn seed_classes(&self, item: ItemRef, classes: HashSet<ItemRef>) {
        self.classes
            .lock()
            .unwrap()
            .entry(item)
            .or_insert_with(|| Arc::new(classes));
    }

    /// Record creative-work forms for a node observed in a relation query.
    /// Never overwrites an existing entry.
    pub fn seed_forms(&self, item: ItemRef, forms: HashSet<ItemRef>) {
        self.forms
            .lock()
            .unwrap()
            .entry(item)
            .or_insert_with(|| Arc::new(forms));
    }
}

fn subclass_query(class: ItemRef) -> String {
    format!(
        "SELECT ?class WHERE {{ \
         ?class wdt:{P_SUBCLASS_OF}* wd:{class}. \
         ?class wikibase:sitelinks ?sitelinks. \
         FILTER(?sitelinks > 0) \
         }}"
    )
}
