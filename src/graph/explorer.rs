//! Bounded exploration of everything related to one start node.
//!
//! The worklist is a pair of explicit FIFO queues (normal drained before
//! low-priority), and within one expansion candidates are enqueued in
//! category order (parents, children, siblings, loose) and ascending id
//! order inside each category. Traversal order is therefore deterministic,
//! including which nodes are cut off when the node budget is exceeded.

use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};
use std::sync::Arc;

use crate::error::{MediaGraphError, ReachedFromTrace, Result};
use crate::graph::relations::{RelatedMedia, RelationFetcher};
use crate::graph::rules::{ClassificationRules, IgnoreConfig, IgnoreSet};
use crate::wikidata::client::DataSource;
use crate::wikidata::ids::ItemRef;
use crate::wikidata::store::EntityStore;

/// Hard cap on discovered nodes per exploration. The external graph has
/// effectively unbounded fan-out; exceeding this aborts with the full
/// predecessor trace.
pub const NODE_LIMIT: usize = 1000;

/// Partition of everything discovered from one start node, as four disjoint
/// ordered sets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelatedMediaSummary {
    /// Traversed nodes that are neither configured nor integral children.
    pub related: BTreeSet<ItemRef>,
    /// Nodes only ever seen as loose relations.
    pub loosely_related: BTreeSet<ItemRef>,
    /// Configured nodes the traversal never reached.
    pub known_but_unrelated: BTreeSet<ItemRef>,
    /// Configured ignore entries that never matched anything; a config
    /// hygiene diagnostic.
    pub ignored_but_not_found: BTreeSet<ItemRef>,
}

/// The exploration engine: store, fetcher, and precomputed rules for one
/// run. Owns all caches; create a fresh engine per run.
pub struct RelatedMediaEngine<C> {
    store: Arc<EntityStore<C>>,
    fetcher: RelationFetcher<C>,
    rules: ClassificationRules<C>,
}

impl<C: DataSource> RelatedMediaEngine<C> {
    /// Build an engine over `store`, precomputing the fixed classification
    /// closures up front.
    pub fn new(store: Arc<EntityStore<C>>) -> Result<Self> {
        let rules = ClassificationRules::new(Arc::clone(&store))?;
        let fetcher = RelationFetcher::new(Arc::clone(&store));
        Ok(Self {
            store,
            fetcher,
            rules,
        })
    }

    /// The engine's store, e.g. for rendering labels of the result.
    pub fn store(&self) -> &Arc<EntityStore<C>> {
        &self.store
    }

    /// Discover, classify, and partition everything related to `start`.
    ///
    /// `known` is the set of nodes already configured by the user. Any data
    /// or validation failure aborts the whole exploration with no partial
    /// output.
    pub fn evaluate_related_media(
        &self,
        start: ItemRef,
        known: &HashSet<ItemRef>,
        config: &IgnoreConfig,
    ) -> Result<RelatedMediaSummary> {
        let ignore = self.rules.compile_ignore(config)?;
        Exploration {
            engine: self,
            known,
            ignore,
            processed: HashSet::new(),
            queue_normal: VecDeque::new(),
            queue_low: VecDeque::new(),
            queued: HashSet::new(),
            reached_from: BTreeMap::new(),
            loose: HashSet::new(),
            integral_children: HashSet::new(),
            ignore_matched: HashSet::new(),
        }
        .run(start)
    }
}

/// Transient per-call state; created at the start of one exploration and
/// discarded at the end.
struct Exploration<'a, C> {
    engine: &'a RelatedMediaEngine<C>,
    known: &'a HashSet<ItemRef>,
    ignore: IgnoreSet,
    processed: HashSet<ItemRef>,
    queue_normal: VecDeque<ItemRef>,
    queue_low: VecDeque<ItemRef>,
    /// Members currently sitting in either queue.
    queued: HashSet<ItemRef>,
    reached_from: BTreeMap<ItemRef, ItemRef>,
    /// Every node ever seen as a loose relation, expanded or not.
    loose: HashSet<ItemRef>,
    integral_children: HashSet<ItemRef>,
    /// Active ignore-list entries that matched something.
    ignore_matched: HashSet<ItemRef>,
}

impl<C: DataSource> Exploration<'_, C> {
    fn run(mut self, start: ItemRef) -> Result<RelatedMediaSummary> {
        self.queue_normal.push_back(start);
        self.queued.insert(start);

        while !self.queue_normal.is_empty() || !self.queue_low.is_empty() {
            let discovered =
                self.processed.len() + self.queue_normal.len() + self.queue_low.len();
            if discovered > NODE_LIMIT {
                return Err(MediaGraphError::Explosion {
                    limit: NODE_LIMIT,
                    trace: ReachedFromTrace(self.reached_from),
                });
            }
            let current = match self.queue_normal.pop_front() {
                Some(item) => item,
                None => match self.queue_low.pop_front() {
                    Some(item) => item,
                    None => break,
                },
            };
            self.queued.remove(&current);
            self.processed.insert(current);
            log::debug!("Expanding {current} ({discovered} discovered so far)");

            let related = self.engine.fetcher.related_media(current)?;
            self.expand(current, &related)?;

            // An integral child must never be traversed on its own, even if
            // it was queued before being recognized as integral.
            self.queue_normal
                .retain(|item| !self.integral_children.contains(item));
            self.queue_low
                .retain(|item| !self.integral_children.contains(item));
            self.queued
                .retain(|item| !self.integral_children.contains(item));
        }

        Ok(self.into_summary())
    }

    fn expand(&mut self, current: ItemRef, related: &RelatedMedia) -> Result<()> {
        for &child in &related.children {
            if self.engine.rules.is_integral_child(current, child)? {
                self.integral_children.insert(child);
            }
        }
        for &parent in &related.parents {
            if self.engine.rules.is_integral_child(parent, current)? {
                self.integral_children.insert(current);
            }
        }

        for &parent in &related.parents {
            if self.is_discovered(parent) || self.check_ignored(parent)? {
                continue;
            }
            if !self.engine.rules.should_cross_border(parent, current)? {
                continue;
            }
            self.enqueue(parent, current)?;
        }
        for &child in &related.children {
            if self.is_discovered(child) || self.check_ignored(child)? {
                continue;
            }
            if !self.engine.rules.should_cross_border(current, child)? {
                continue;
            }
            self.enqueue(child, current)?;
        }
        for &sibling in &related.siblings {
            if self.is_discovered(sibling) || self.check_ignored(sibling)? {
                continue;
            }
            self.enqueue(sibling, current)?;
        }
        for &item in &related.loose {
            if self.check_ignored(item)? {
                continue;
            }
            self.loose.insert(item);
            // A loose relation is only worth expanding when the user
            // explicitly tracks it; everything else stays unexpanded.
            if self.known.contains(&item) && !self.is_discovered(item) {
                self.enqueue(item, current)?;
            }
        }
        Ok(())
    }

    fn is_discovered(&self, item: ItemRef) -> bool {
        self.processed.contains(&item) || self.queued.contains(&item)
    }

    /// Ignore check that also records which configured entries matched, for
    /// the not-found diagnostic.
    fn check_ignored(&mut self, item: ItemRef) -> Result<bool> {
        if self.ignore.listed().contains(&item) {
            self.ignore_matched.insert(item);
            return Ok(true);
        }
        self.engine.rules.is_ignored(item, &self.ignore)
    }

    fn enqueue(&mut self, item: ItemRef, from: ItemRef) -> Result<()> {
        self.reached_from.entry(item).or_insert(from);
        if self.engine.rules.is_low_priority(item)? {
            self.queue_low.push_back(item);
        } else {
            self.queue_normal.push_back(item);
        }
        self.queued.insert(item);
        Ok(())
    }

    fn into_summary(self) -> RelatedMediaSummary {
        let related = self
            .processed
            .iter()
            .copied()
            .filter(|item| {
                !self.known.contains(item) && !self.integral_children.contains(item)
            })
            .collect();
        let loosely_related = self
            .loose
            .iter()
            .copied()
            .filter(|item| {
                !self.processed.contains(item)
                    && !self.known.contains(item)
                    && !self.integral_children.contains(item)
            })
            .collect();
        let known_but_unrelated = self
            .known
            .iter()
            .copied()
            .filter(|item| !self.processed.contains(item) && !self.loose.contains(item))
            .collect();
        let ignored_but_not_found = self
            .ignore
            .listed()
            .iter()
            .copied()
            .filter(|item| !self.ignore_matched.contains(item))
            .collect();
        RelatedMediaSummary {
            related,
            loosely_related,
            known_but_unrelated,
            ignored_but_not_found,
        }
    }
}
