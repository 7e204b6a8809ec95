//! The categorized relation query: one batched request per node returning
//! its parent, sibling, child, and loose neighbors.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::{Arc, Mutex};

use crate::error::{MediaGraphError, Result};
use crate::wikidata::client::DataSource;
use crate::wikidata::ids::{
    ItemRef, PropertyRef, P_BASED_ON, P_DERIVATIVE_WORK, P_FOLLOWED_BY, P_FOLLOWS,
    P_FORM_OF_CREATIVE_WORK, P_HAS_PARTS, P_INSTANCE_OF, P_MEDIA_FRANCHISE, P_MODIFIED_VERSION_OF,
    P_PART_OF, P_PART_OF_THE_SERIES, P_TAKES_PLACE_IN_FICTIONAL_UNIVERSE,
};
use crate::wikidata::store::EntityStore;

/// Properties whose forward direction points at a containing work.
pub(crate) const PARENT_PROPERTIES: [PropertyRef; 4] = [
    P_PART_OF,
    P_PART_OF_THE_SERIES,
    P_MEDIA_FRANCHISE,
    P_TAKES_PLACE_IN_FICTIONAL_UNIVERSE,
];

/// Properties linking works at the same level, read in both directions.
pub(crate) const SIBLING_PROPERTIES: [PropertyRef; 2] = [P_FOLLOWS, P_FOLLOWED_BY];

/// Properties whose forward direction points at a contained work.
pub(crate) const CHILD_PROPERTIES: [PropertyRef; 1] = [P_HAS_PARTS];

/// Weak associations, recorded but not traversed unless explicitly known.
pub(crate) const LOOSE_PROPERTIES: [PropertyRef; 3] =
    [P_BASED_ON, P_DERIVATIVE_WORK, P_MODIFIED_VERSION_OF];

/// Neighbors of one node, as returned by one relation query.
///
/// The four sets are independently populated and may overlap: nothing stops
/// a node from being asserted both as a sibling and as a loose relation.
/// Ordered sets so that iteration, and therefore traversal, is
/// deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelatedMedia {
    pub parents: BTreeSet<ItemRef>,
    pub siblings: BTreeSet<ItemRef>,
    pub children: BTreeSet<ItemRef>,
    pub loose: BTreeSet<ItemRef>,
}

/// Issues the combined relation query, caching results per node and eagerly
/// seeding the entity store with every neighbor's classes and forms carried
/// in the response.
pub struct RelationFetcher<C> {
    store: Arc<EntityStore<C>>,
    related: Mutex<HashMap<ItemRef, Arc<RelatedMedia>>>,
}

impl<C: DataSource> RelationFetcher<C> {
    pub fn new(store: Arc<EntityStore<C>>) -> Self {
        Self {
            store,
            related: Mutex::new(HashMap::new()),
        }
    }

    /// All neighbors of `item`, categorized.
    pub fn related_media(&self, item: ItemRef) -> Result<Arc<RelatedMedia>> {
        if let Some(related) = self.related.lock().unwrap().get(&item) {
            return Ok(Arc::clone(related));
        }
        let rows = self.store.source().run_query(&related_media_query(item))?;

        let mut media = RelatedMedia::default();
        let mut classes: HashMap<ItemRef, HashSet<ItemRef>> = HashMap::new();
        let mut forms: HashMap<ItemRef, HashSet<ItemRef>> = HashMap::new();
        for row in &rows {
            let neighbor = row
                .get("item")
                .ok_or_else(|| {
                    MediaGraphError::Validation(
                        "relation query row is missing the ?item binding".to_string(),
                    )
                })?
                .item()?;
            let category = row
                .get("relation")
                .ok_or_else(|| {
                    MediaGraphError::Validation(
                        "relation query row is missing the ?relation binding".to_string(),
                    )
                })?
                .plain_string()?;
            match category {
                "parent" => media.parents.insert(neighbor),
                "sibling" => media.siblings.insert(neighbor),
                "child" => media.children.insert(neighbor),
                "loose" => media.loose.insert(neighbor),
                other => {
                    return Err(MediaGraphError::Validation(format!(
                        "unexpected relation category {other:?} in query response"
                    )))
                }
            };
            let neighbor_classes = classes.entry(neighbor).or_default();
            if let Some(binding) = row.get("itemClass") {
                neighbor_classes.insert(binding.item()?);
            }
            let neighbor_forms = forms.entry(neighbor).or_default();
            if let Some(binding) = row.get("itemForm") {
                neighbor_forms.insert(binding.item()?);
            }
        }
        for (neighbor, neighbor_classes) in classes {
            self.store.seed_classes(neighbor, neighbor_classes);
        }
        for (neighbor, neighbor_forms) in forms {
            self.store.seed_forms(neighbor, neighbor_forms);
        }

        let related = Arc::new(media);
        let mut cache = self.related.lock().unwrap();
        Ok(Arc::clone(cache.entry(item).or_insert(related)))
    }
}

fn property_path(properties: &[PropertyRef]) -> String {
    properties
        .iter()
        .map(|p| format!("wdt:{p}"))
        .collect::<Vec<_>>()
        .join("|")
}

/// One query covering all four categories. Parents are the forward parent
/// properties plus inverted child properties, and children the reverse;
/// siblings and loose relations read their properties in both directions.
/// Every row also carries the neighbor's classes and forms so that nodes
/// which are classified but never expanded cost no extra round trip.
fn related_media_query(item: ItemRef) -> String {
    let parent = property_path(&PARENT_PROPERTIES);
    let sibling = property_path(&SIBLING_PROPERTIES);
    let child = property_path(&CHILD_PROPERTIES);
    let loose = property_path(&LOOSE_PROPERTIES);
    format!(
        "SELECT REDUCED ?item ?relation ?itemClass ?itemForm WHERE {{ \
         {{ \
         {{ wd:{item} {parent} ?item. }} UNION {{ ?item {child} wd:{item}. }} \
         BIND(\"parent\" AS ?relation) \
         }} UNION {{ \
         {{ wd:{item} {sibling} ?item. }} UNION {{ ?item {sibling} wd:{item}. }} \
         BIND(\"sibling\" AS ?relation) \
         }} UNION {{ \
         {{ wd:{item} {child} ?item. }} UNION {{ ?item {parent} wd:{item}. }} \
         BIND(\"child\" AS ?relation) \
         }} UNION {{ \
         {{ wd:{item} {loose} ?item. }} UNION {{ ?item {loose} wd:{item}. }} \
         BIND(\"loose\" AS ?relation) \
         }} \
         OPTIONAL {{ ?item wdt:{P_INSTANCE_OF} ?itemClass. }} \
         OPTIONAL {{ ?item wdt:{P_FORM_OF_CREATIVE_WORK} ?itemForm. }} \
         }}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wikidata::client::{Binding, QueryRow};
    use crate::wikidata::testing::{plain, relation_rows, uri, FakeDataSource};

    fn q(n: u64) -> ItemRef {
        ItemRef::from_numeric(n)
    }

    fn fetcher_with(source: FakeDataSource) -> RelationFetcher<FakeDataSource> {
        RelationFetcher::new(Arc::new(EntityStore::new(source)))
    }

    #[test]
    fn test_query_covers_all_categories() {
        let query = related_media_query(q(42));
        for category in ["parent", "sibling", "child", "loose"] {
            assert!(query.contains(&format!("BIND(\"{category}\" AS ?relation)")));
        }
        // Forward parent properties and inverted child properties.
        assert!(query.contains("wd:Q42 wdt:P361|wdt:P179|wdt:P8345|wdt:P1434 ?item."));
        assert!(query.contains("?item wdt:P527 wd:Q42."));
        // Sibling properties in both directions.
        assert!(query.contains("wd:Q42 wdt:P155|wdt:P156 ?item."));
        assert!(query.contains("?item wdt:P155|wdt:P156 wd:Q42."));
        assert!(query.contains("OPTIONAL { ?item wdt:P31 ?itemClass. }"));
        assert!(query.contains("OPTIONAL { ?item wdt:P7937 ?itemForm. }"));
    }

    #[test]
    fn test_related_media_categorizes_rows() {
        let source = FakeDataSource::new();
        let mut rows = relation_rows(q(2), "parent", &[], &[]);
        rows.extend(relation_rows(q(3), "sibling", &[], &[]));
        rows.extend(relation_rows(q(4), "child", &[], &[]));
        rows.extend(relation_rows(q(5), "loose", &[], &[]));
        source.put_relations(q(1), rows);
        let fetcher = fetcher_with(source);
        let related = fetcher.related_media(q(1)).unwrap();
        assert_eq!(related.parents, [q(2)].into_iter().collect());
        assert_eq!(related.siblings, [q(3)].into_iter().collect());
        assert_eq!(related.children, [q(4)].into_iter().collect());
        assert_eq!(related.loose, [q(5)].into_iter().collect());
    }

    #[test]
    fn test_related_media_allows_category_overlap() {
        let source = FakeDataSource::new();
        let mut rows = relation_rows(q(2), "sibling", &[], &[]);
        rows.extend(relation_rows(q(2), "loose", &[], &[]));
        source.put_relations(q(1), rows);
        let fetcher = fetcher_with(source);
        let related = fetcher.related_media(q(1)).unwrap();
        assert!(related.siblings.contains(&q(2)));
        assert!(related.loose.contains(&q(2)));
    }

    #[test]
    fn test_related_media_rejects_unknown_category() {
        let source = FakeDataSource::new();
        source.put_relations(q(1), relation_rows(q(2), "cousin", &[], &[]));
        let fetcher = fetcher_with(source);
        let err = fetcher.related_media(q(1)).unwrap_err();
        assert!(err.to_string().contains("cousin"));
    }

    #[test]
    fn test_related_media_rejects_tagged_category_literal() {
        let source = FakeDataSource::new();
        let mut row = QueryRow::new();
        row.insert("item".to_string(), uri(q(2)));
        row.insert(
            "relation".to_string(),
            Binding::Literal {
                value: "parent".to_string(),
                language: Some("en".to_string()),
                datatype: None,
            },
        );
        source.put_relations(q(1), vec![row]);
        let fetcher = fetcher_with(source);
        assert!(fetcher.related_media(q(1)).is_err());
    }

    #[test]
    fn test_related_media_seeds_classes_and_forms() {
        let source = FakeDataSource::new();
        source.put_relations(q(1), relation_rows(q(2), "parent", &[q(10), q(11)], &[q(20)]));
        let store = Arc::new(EntityStore::new(source));
        let fetcher = RelationFetcher::new(Arc::clone(&store));
        fetcher.related_media(q(1)).unwrap();
        // The neighbor's classes and forms are now available without any
        // entity fetch.
        let classes = store.classes(q(2)).unwrap();
        assert_eq!(*classes, [q(10), q(11)].into_iter().collect());
        let forms = store.forms_of_creative_work(q(2)).unwrap();
        assert_eq!(*forms, [q(20)].into_iter().collect());
        assert_eq!(store.source().entity_fetches(), 0);
    }

    #[test]
    fn test_related_media_seeds_empty_sets() {
        let source = FakeDataSource::new();
        source.put_relations(q(1), relation_rows(q(2), "parent", &[], &[]));
        let store = Arc::new(EntityStore::new(source));
        let fetcher = RelationFetcher::new(Arc::clone(&store));
        fetcher.related_media(q(1)).unwrap();
        assert!(store.classes(q(2)).unwrap().is_empty());
        assert!(store.forms_of_creative_work(q(2)).unwrap().is_empty());
        assert_eq!(store.source().entity_fetches(), 0);
    }

    #[test]
    fn test_related_media_cached() {
        let source = FakeDataSource::new();
        source.put_relations(q(1), relation_rows(q(2), "parent", &[], &[]));
        let fetcher = fetcher_with(source);
        let first = fetcher.related_media(q(1)).unwrap();
        let second = fetcher.related_media(q(1)).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(fetcher.store.source().queries_run(), 1);
    }

    #[test]
    fn test_related_media_missing_bindings_rejected() {
        let source = FakeDataSource::new();
        let mut row = QueryRow::new();
        row.insert("relation".to_string(), plain("parent"));
        source.put_relations(q(1), vec![row]);
        let fetcher = fetcher_with(source);
        assert!(fetcher.related_media(q(1)).is_err());
    }
}
