use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use mediagraph::graph::IgnoreConfig;
use mediagraph::report::render_summary;
use mediagraph::wikidata::{EntityStore, ItemRef, WikidataClient};
use mediagraph::{Config, RelatedMediaEngine};

#[derive(Parser, Debug)]
#[command(name = "mediagraph")]
#[command(about = "Explore media related to tracked items via the Wikidata knowledge graph")]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Discover and report everything related to one item
    Explore {
        /// Configured item name, or a bare item id like Q3107329
        target: String,
    },
    /// Print an item's label and description in the configured languages
    Show {
        /// Item id or URL
        item: String,
    },
}

fn main() -> Result<()> {
    // Initialize logger from environment variable or default to info level
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("RUST_LOG", "info")).init();

    let args = Args::parse();
    let config = Config::load(&args.config)?;

    let user_agent = format!("mediagraph/{}", env!("CARGO_PKG_VERSION"));
    let client = WikidataClient::with_endpoints(
        &user_agent,
        Duration::from_secs(config.wikidata.timeout_seconds),
        &config.wikidata.entity_data_base,
        &config.wikidata.query_endpoint,
    );
    let store = Arc::new(EntityStore::new(client));

    match args.command {
        Command::Explore { target } => run_explore(&config, store, &target),
        Command::Show { item } => run_show(&config, &store, &item),
    }
}

fn run_explore(
    config: &Config,
    store: Arc<EntityStore<WikidataClient>>,
    target: &str,
) -> Result<()> {
    // A configured item brings its ignore settings along; a bare id gets
    // none.
    let (start, ignore) = match config.find_item(target) {
        Some(item) => (item.item_ref()?, item.related_media.to_ignore_config()?),
        None => (
            ItemRef::parse(target).with_context(|| {
                format!("{target:?} is neither a configured item name nor a valid item id")
            })?,
            IgnoreConfig::default(),
        ),
    };
    let known = config.known_set()?;

    log::info!("Precomputing classification tables");
    let engine = RelatedMediaEngine::new(store)?;

    log::info!("Exploring items related to {start}");
    let summary = engine.evaluate_related_media(start, &known, &ignore)?;
    log::info!(
        "Exploration finished: {} related, {} loosely related, {} known but unrelated",
        summary.related.len(),
        summary.loosely_related.len(),
        summary.known_but_unrelated.len()
    );

    for line in render_summary(engine.store(), &summary, &config.wikidata.languages)? {
        println!("{line}");
    }
    Ok(())
}

fn run_show(config: &Config, store: &EntityStore<WikidataClient>, item: &str) -> Result<()> {
    let item = ItemRef::parse(item)?;
    let entity = store.entity(item)?;
    let languages = &config.wikidata.languages;
    println!(
        "{item}: {} ({})",
        entity.label(languages).unwrap_or("<no label>"),
        entity.description(languages).unwrap_or("<no description>")
    );
    Ok(())
}
