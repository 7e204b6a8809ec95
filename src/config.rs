use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

use crate::graph::IgnoreConfig;
use crate::wikidata::ItemRef;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub wikidata: WikidataConfig,
    /// Tracked media items. The set of their links forms the known set
    /// passed to the explorer.
    #[serde(default)]
    pub items: Vec<ItemConfig>,
}

/// Wikidata access configuration
#[derive(Debug, Clone, Deserialize)]
pub struct WikidataConfig {
    /// Ordered language preference for labels and descriptions.
    #[serde(default = "default_languages")]
    pub languages: Vec<String>,
    #[serde(default = "default_entity_data_base")]
    pub entity_data_base: String,
    #[serde(default = "default_query_endpoint")]
    pub query_endpoint: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for WikidataConfig {
    fn default() -> Self {
        Self {
            languages: default_languages(),
            entity_data_base: default_entity_data_base(),
            query_endpoint: default_query_endpoint(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

fn default_languages() -> Vec<String> {
    vec!["en".to_string()]
}

fn default_entity_data_base() -> String {
    "https://www.wikidata.org/wiki/Special:EntityData".to_string()
}

fn default_query_endpoint() -> String {
    "https://query.wikidata.org/sparql".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

/// One tracked media item
#[derive(Debug, Clone, Deserialize)]
pub struct ItemConfig {
    pub name: String,
    /// Item id or URL in the knowledge graph, e.g. "Q3107329".
    pub item: String,
    #[serde(default)]
    pub related_media: RelatedMediaConfig,
}

/// Per-item related-media ignore configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RelatedMediaConfig {
    /// Items to ignore, cutting off everything reachable only through them.
    #[serde(default)]
    pub ignore: Vec<String>,
    #[serde(default)]
    pub ignore_exceptions: Vec<String>,
    /// Classes whose instances (including instances of transitive
    /// subclasses) are ignored.
    #[serde(default)]
    pub ignore_classes: Vec<String>,
    #[serde(default)]
    pub ignore_class_exceptions: Vec<String>,
}

fn parse_refs(values: &[String], what: &str) -> Result<Vec<ItemRef>> {
    values
        .iter()
        .map(|value| {
            ItemRef::parse(value).with_context(|| format!("Invalid {what} entry: {value}"))
        })
        .collect()
}

impl RelatedMediaConfig {
    /// Parse the string lists into the explorer's ignore configuration.
    pub fn to_ignore_config(&self) -> Result<IgnoreConfig> {
        Ok(IgnoreConfig {
            ignore: parse_refs(&self.ignore, "ignore")?,
            ignore_exceptions: parse_refs(&self.ignore_exceptions, "ignore_exceptions")?,
            ignore_classes: parse_refs(&self.ignore_classes, "ignore_classes")?,
            ignore_class_exceptions: parse_refs(
                &self.ignore_class_exceptions,
                "ignore_class_exceptions",
            )?,
        })
    }
}

impl ItemConfig {
    /// The item's parsed graph link.
    pub fn item_ref(&self) -> Result<ItemRef> {
        ItemRef::parse(&self.item)
            .with_context(|| format!("Invalid item link for {:?}: {}", self.name, self.item))
    }
}

impl Config {
    /// Load configuration from a TOML file and validate it.
    pub fn load(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        if self.wikidata.languages.is_empty() {
            anyhow::bail!("wikidata.languages must list at least one language");
        }
        if self.wikidata.timeout_seconds == 0 {
            anyhow::bail!("wikidata.timeout_seconds must be greater than 0");
        }

        let mut names = HashSet::new();
        for item in &self.items {
            if item.name.trim().is_empty() {
                anyhow::bail!("Every item needs a non-empty name");
            }
            if !names.insert(item.name.as_str()) {
                anyhow::bail!("Duplicate item name: {}", item.name);
            }
            item.item_ref()?;
            item.related_media.to_ignore_config()?;
        }
        Ok(())
    }

    /// Links of all configured items: the known set for exploration.
    pub fn known_set(&self) -> Result<HashSet<ItemRef>> {
        self.items.iter().map(|item| item.item_ref()).collect()
    }

    /// Find a configured item by its name.
    pub fn find_item(&self, name: &str) -> Option<&ItemConfig> {
        self.items.iter().find(|item| item.name == name)
    }
}
