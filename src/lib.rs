pub mod config;
pub mod error;
pub mod graph;
pub mod report;
pub mod wikidata;

pub use config::Config;
pub use error::{MediaGraphError, Result};
pub use graph::{IgnoreConfig, RelatedMediaEngine, RelatedMediaSummary};
pub use wikidata::{DataSource, EntityStore, ItemRef, PropertyRef, WikidataClient};
