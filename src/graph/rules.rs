//! Domain heuristics for classifying relations: what to ignore, which
//! children are integral to their parent, where traversal must not cross,
//! and which nodes can wait at the back of the worklist.
//!
//! All predicates are pure over the store; the fixed class tables are
//! expanded to transitive-subclass closures once at construction time and
//! immutable afterwards.

use std::collections::HashSet;
use std::sync::Arc;

use crate::error::Result;
use crate::wikidata::client::DataSource;
use crate::wikidata::ids::{
    ItemRef, P_SERIES_ORDINAL, Q_ANTHOLOGY, Q_AUDIOVISUAL_WORK, Q_DC_UNIVERSE, Q_FICTIONAL_ENTITY,
    Q_FICTIONAL_UNIVERSE, Q_LITERARY_WORK, Q_MARVEL_UNIVERSE, Q_MUSICAL_WORK,
    Q_PART_OF_TELEVISION_SEASON, Q_PLACEHOLDER_NAME, Q_RELEASE_GROUP, Q_TELEVISION_PILOT,
    Q_TELEVISION_SERIES, Q_TELEVISION_SERIES_EPISODE, Q_TELEVISION_SERIES_SEASON,
    Q_TELEVISION_SPECIAL, Q_WIKIMEDIA_LIST_ARTICLE,
};
use crate::wikidata::store::EntityStore;

/// Universe nodes with effectively unbounded fan-out; never traversed.
const IGNORED_UNIVERSES: [ItemRef; 2] = [Q_MARVEL_UNIVERSE, Q_DC_UNIVERSE];

/// Per-item ignore configuration, as the surrounding config supplies it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnoreConfig {
    /// Items to ignore, cutting off everything reachable only through them.
    pub ignore: Vec<ItemRef>,
    /// Items exempted from `ignore`.
    pub ignore_exceptions: Vec<ItemRef>,
    /// Classes whose instances are ignored, including instances of any
    /// transitive subclass.
    pub ignore_classes: Vec<ItemRef>,
    /// Classes exempted from `ignore_classes`, also expanded transitively.
    pub ignore_class_exceptions: Vec<ItemRef>,
}

/// An [`IgnoreConfig`] compiled against the class hierarchy: the active item
/// list and the expanded class set.
#[derive(Debug, Clone, Default)]
pub struct IgnoreSet {
    listed: HashSet<ItemRef>,
    classes: HashSet<ItemRef>,
}

impl IgnoreSet {
    /// The active ignore-list entries (list minus exceptions).
    pub fn listed(&self) -> &HashSet<ItemRef> {
        &self.listed
    }
}

pub struct ClassificationRules<C> {
    store: Arc<EntityStore<C>>,
    /// Fixed class denylist: fictional entities (except fictional
    /// universes), list articles, placeholder names.
    ignored_classes: HashSet<ItemRef>,
    anthology_classes: HashSet<ItemRef>,
    /// (parent classes, child classes) pairs whose children are integral.
    integral_pairs: Vec<(HashSet<ItemRef>, HashSet<ItemRef>)>,
    pilot_classes: HashSet<ItemRef>,
    episode_classes: HashSet<ItemRef>,
    special_classes: HashSet<ItemRef>,
    episode_container_classes: HashSet<ItemRef>,
    low_priority_classes: HashSet<ItemRef>,
}

fn intersects(a: &HashSet<ItemRef>, b: &HashSet<ItemRef>) -> bool {
    a.iter().any(|item| b.contains(item))
}

fn union(mut a: HashSet<ItemRef>, b: &HashSet<ItemRef>) -> HashSet<ItemRef> {
    a.extend(b.iter().copied());
    a
}

impl<C: DataSource> ClassificationRules<C> {
    /// Expand every fixed class table into its transitive-subclass closure.
    /// Issues one recursive query per table root (cached in the store).
    pub fn new(store: Arc<EntityStore<C>>) -> Result<Self> {
        let closure = |class: ItemRef| -> Result<HashSet<ItemRef>> {
            Ok(store.transitive_subclasses(class)?.as_ref().clone())
        };

        let fictional = closure(Q_FICTIONAL_ENTITY)?;
        let universes = closure(Q_FICTIONAL_UNIVERSE)?;
        let mut ignored_classes: HashSet<ItemRef> = fictional
            .into_iter()
            .filter(|class| !universes.contains(class))
            .collect();
        ignored_classes = union(ignored_classes, &closure(Q_WIKIMEDIA_LIST_ARTICLE)?);
        ignored_classes = union(ignored_classes, &closure(Q_PLACEHOLDER_NAME)?);

        let series = closure(Q_TELEVISION_SERIES)?;
        let season = closure(Q_TELEVISION_SERIES_SEASON)?;
        let season_part = closure(Q_PART_OF_TELEVISION_SEASON)?;
        let episode = closure(Q_TELEVISION_SERIES_EPISODE)?;
        let release_group = closure(Q_RELEASE_GROUP)?;
        let literary = closure(Q_LITERARY_WORK)?;

        let integral_pairs = vec![
            (series.clone(), season.clone()),
            (union(series.clone(), &season), season_part.clone()),
            (closure(Q_AUDIOVISUAL_WORK)?, release_group.clone()),
            (closure(Q_MUSICAL_WORK)?, release_group),
            (literary.clone(), literary),
        ];

        let episode_container_classes = union(union(series, &season), &season_part);
        let low_priority_classes = union(union(season, &season_part), &episode);
        let anthology_classes = closure(Q_ANTHOLOGY)?;
        let pilot_classes = closure(Q_TELEVISION_PILOT)?;
        let special_classes = closure(Q_TELEVISION_SPECIAL)?;

        Ok(Self {
            store,
            ignored_classes,
            anthology_classes,
            integral_pairs,
            pilot_classes,
            episode_classes: episode,
            special_classes,
            episode_container_classes,
            low_priority_classes,
        })
    }

    /// Expand a per-item configuration against the class hierarchy.
    pub fn compile_ignore(&self, config: &IgnoreConfig) -> Result<IgnoreSet> {
        let mut listed: HashSet<ItemRef> = config.ignore.iter().copied().collect();
        for exception in &config.ignore_exceptions {
            listed.remove(exception);
        }
        let mut classes = HashSet::new();
        for &class in &config.ignore_classes {
            classes = union(classes, self.store.transitive_subclasses(class)?.as_ref());
        }
        for &class in &config.ignore_class_exceptions {
            for excepted in self.store.transitive_subclasses(class)?.iter() {
                classes.remove(excepted);
            }
        }
        Ok(IgnoreSet { listed, classes })
    }

    /// Whether a node must be dropped from every relation category.
    pub fn is_ignored(&self, item: ItemRef, ignore: &IgnoreSet) -> Result<bool> {
        if ignore.listed.contains(&item) || IGNORED_UNIVERSES.contains(&item) {
            return Ok(true);
        }
        let classes = self.store.classes(item)?;
        Ok(classes
            .iter()
            .any(|class| self.ignored_classes.contains(class) || ignore.classes.contains(class)))
    }

    /// Whether `child` is something a user would implicitly consume along
    /// with `parent` (a season with its show, a release group with its
    /// work), and must therefore never be reported on its own.
    pub fn is_integral_child(&self, parent: ItemRef, child: ItemRef) -> Result<bool> {
        let parent_classes = self.store.classes(parent)?;
        let child_classes = self.store.classes(child)?;
        for (parent_table, child_table) in &self.integral_pairs {
            if intersects(&parent_classes, parent_table) && intersects(&child_classes, child_table)
            {
                return Ok(true);
            }
        }
        if intersects(&child_classes, &self.pilot_classes) {
            // A pilot folds into its show only when it sits at a definite
            // position in it; every declared ordinal must be a positive
            // integer.
            let entity = self.store.entity(child)?;
            let ordinals = entity.truthy_text_values(P_SERIES_ORDINAL)?;
            if !ordinals.is_empty()
                && ordinals
                    .iter()
                    .all(|ordinal| ordinal.parse::<i64>().map(|n| n > 0).unwrap_or(false))
            {
                return Ok(true);
            }
        }
        if intersects(&child_classes, &self.episode_classes)
            && !intersects(&child_classes, &self.special_classes)
            && intersects(&parent_classes, &self.episode_container_classes)
        {
            return Ok(true);
        }
        Ok(false)
    }

    /// Whether traversal may follow a parent/child edge. False when the
    /// parent side is an anthology container, by class or by declared form:
    /// anthologies connect works that are otherwise unrelated.
    pub fn should_cross_border(&self, parent: ItemRef, _child: ItemRef) -> Result<bool> {
        let classes = self.store.classes(parent)?;
        if intersects(&classes, &self.anthology_classes) {
            return Ok(false);
        }
        let forms = self.store.forms_of_creative_work(parent)?;
        Ok(!intersects(&forms, &self.anthology_classes))
    }

    /// Whether a node is unlikely to lead anywhere new (seasons, season
    /// parts, episodes). Only affects worklist order, never the result.
    pub fn is_low_priority(&self, item: ItemRef) -> Result<bool> {
        let classes = self.store.classes(item)?;
        Ok(intersects(&classes, &self.low_priority_classes))
    }
}
