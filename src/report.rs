//! Rendering of an exploration result into human-readable annotation lines.

use crate::error::Result;
use crate::graph::explorer::RelatedMediaSummary;
use crate::wikidata::client::DataSource;
use crate::wikidata::ids::ItemRef;
use crate::wikidata::store::EntityStore;

/// One line per node: `<category>: <label> (<description>) <uri>`, with the
/// label and description independently omitted when no configured language
/// matches. Unmatched ignore entries come last, as plain diagnostics.
pub fn render_summary<C: DataSource>(
    store: &EntityStore<C>,
    summary: &RelatedMediaSummary,
    languages: &[String],
) -> Result<Vec<String>> {
    let buckets = [
        ("related", &summary.related),
        ("loosely related", &summary.loosely_related),
        ("known but unrelated", &summary.known_but_unrelated),
    ];
    let mut lines = Vec::new();
    for (category, items) in buckets {
        for &item in items {
            lines.push(annotation_line(store, category, item, languages)?);
        }
    }
    for &item in &summary.ignored_but_not_found {
        lines.push(format!(
            "ignored item {} did not match anything; it can probably be removed from the config",
            item.uri()
        ));
    }
    Ok(lines)
}

fn annotation_line<C: DataSource>(
    store: &EntityStore<C>,
    category: &str,
    item: ItemRef,
    languages: &[String],
) -> Result<String> {
    let entity = store.entity(item)?;
    let mut parts: Vec<String> = Vec::new();
    if let Some(label) = entity.label(languages) {
        parts.push(label.to_string());
    }
    if let Some(description) = entity.description(languages) {
        parts.push(format!("({description})"));
    }
    parts.push(item.uri());
    Ok(format!("{category}: {}", parts.join(" ")))
}
