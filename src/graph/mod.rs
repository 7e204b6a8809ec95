//! Relation-graph exploration: the categorized relation query, the
//! classification heuristics, and the bounded worklist traversal that
//! partitions everything related to a start node.

pub mod explorer;
pub mod relations;
pub mod rules;

pub use explorer::{RelatedMediaEngine, RelatedMediaSummary, NODE_LIMIT};
pub use relations::{RelatedMedia, RelationFetcher};
pub use rules::{ClassificationRules, IgnoreConfig, IgnoreSet};
