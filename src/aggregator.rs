use crate::config::Config;
use crate::dedup::dedupe_and_cap;
use crate::fallback::apply_fallbacks;
use crate::feeds::extract::extract_items;
use crate::fetch::{Fetch, fetch_all};
use crate::models::{AggregationResult, Category, FeedSource, Item};
use crate::scrapers::enrich_items;
use tracing::{debug, info, instrument};

/// Run the whole pipeline for one category.
///
/// Stages run strictly in sequence: fetch every feed, extract, dedupe and
/// cap, enrich, fallback. Nothing here can fail; broken feeds and pages
/// just contribute less.
#[instrument(level = "info", skip_all, fields(category = %category))]
pub async fn aggregate_category<F: Fetch>(
    config: &Config,
    fetcher: &F,
    category: &str,
    sources: &[FeedSource],
) -> Category {
    let urls: Vec<String> = sources.iter().map(|s| s.url.clone()).collect();

    let bodies = fetch_all(fetcher, &urls).await;
    let fetched = bodies.iter().filter(|b| b.is_some()).count();

    let extracted: Vec<Item> = sources
        .iter()
        .zip(bodies)
        .filter_map(|(source, body)| body.map(|xml| (source, xml)))
        .flat_map(|(source, xml)| {
            let items = extract_items(
                &xml,
                &source.url,
                config.entries_per_feed,
                config.description_max_chars,
            );
            debug!(
                category = %source.category,
                feed = %source.url,
                items = items.len(),
                "Feed extracted"
            );
            items
        })
        .collect();
    let extracted_count = extracted.len();

    let mut items = dedupe_and_cap(extracted, config.max_items_per_category);
    info!(
        feeds = urls.len(),
        fetched,
        extracted = extracted_count,
        kept = items.len(),
        "Feeds collected"
    );

    enrich_items(fetcher, &mut items, config.enrich_concurrency).await;
    apply_fallbacks(
        &mut items,
        &config.placeholder_base,
        config.placeholder_title_chars,
    );

    Category {
        category: category.to_string(),
        items,
    }
}

/// Aggregate every configured category, one after the other, in config order
#[instrument(level = "info", skip_all, fields(categories = config.categories.len()))]
pub async fn aggregate<F: Fetch>(config: &Config, fetcher: &F) -> AggregationResult {
    let mut result = AggregationResult::default();
    for feeds in &config.categories {
        let sources = feeds.sources();
        let category = aggregate_category(config, fetcher, &feeds.category, &sources).await;
        info!(
            category = %category.category,
            items = category.items.len(),
            "Category done"
        );
        result.categories.push(category);
    }
    result
}
