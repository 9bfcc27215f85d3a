//! Article-page enrichment: recover a missing image or body by scraping the item's link.

pub mod body;
pub mod image;

use crate::fetch::{Fetch, fetch_text};
use crate::models::Item;
use futures::future::join_all;
use scraper::Html;
use tracing::{debug, info, instrument};

/// Fill `image`/`body` from the article page where they are still empty.
///
/// Never fails: a failed fetch or a page with nothing usable leaves the
/// fields empty for the fallback stage.
#[instrument(level = "debug", skip_all, fields(link = %item.link))]
pub async fn enrich_item<F: Fetch>(fetcher: &F, item: &mut Item) {
    if !item.needs_enrichment() {
        return;
    }
    let Some(html) = fetch_text(fetcher, &item.link).await else {
        return;
    };

    let document = Html::parse_document(&html);
    if item.image.is_empty() {
        if let Some(found) = image::extract_image(&document, &item.link) {
            item.image = found;
        }
    }
    if item.body.is_empty() {
        if let Some(text) = body::extract_body(&document) {
            debug!(chars = text.chars().count(), "Body extracted");
            item.body = text;
        }
    }
}

/// Enrich items in fixed-width batches.
///
/// At most `width` article requests are in flight, and a batch must settle
/// completely before the next one is issued. Items needing nothing are not
/// scheduled at all.
#[instrument(level = "info", skip_all, fields(items = items.len(), width = width))]
pub async fn enrich_items<F: Fetch>(fetcher: &F, items: &mut [Item], width: usize) {
    let width = width.max(1);
    let mut pending: Vec<&mut Item> = items
        .iter_mut()
        .filter(|i| i.needs_enrichment())
        .collect();
    let scheduled = pending.len();

    for (n, batch) in pending.chunks_mut(width).enumerate() {
        debug!(batch = n, size = batch.len(), "Enrichment batch starting");
        join_all(batch.iter_mut().map(|item| enrich_item(fetcher, &mut **item))).await;
    }

    let with_image = items.iter().filter(|i| !i.image.is_empty()).count();
    let with_body = items.iter().filter(|i| !i.body.is_empty()).count();
    info!(scheduled, with_image, with_body, "Enrichment finished");
}
