use crate::models::Item;
use crate::utils::parse_pub_date;
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Merge items sharing a `link`, newest first.
///
/// Linkless items are dropped. Links are compared as exact strings. On a
/// collision the later `pubDate` wins; if either date does not parse the item
/// seen first is kept. Unparsable dates sort after every parsable one.
#[instrument(level = "debug", skip_all, fields(input = items.len()))]
pub fn dedupe(items: Vec<Item>) -> Vec<Item> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut kept: Vec<Item> = Vec::new();
    let mut dropped_linkless = 0usize;

    for item in items {
        if item.link.is_empty() {
            dropped_linkless += 1;
            continue;
        }
        match index.get(&item.link).copied() {
            Some(at) => {
                let candidate = parse_pub_date(&item.pub_date);
                let existing = parse_pub_date(&kept[at].pub_date);
                let newer = match (candidate, existing) {
                    (Some(candidate), Some(existing)) => candidate > existing,
                    _ => false,
                };
                if newer {
                    kept[at] = item;
                }
            }
            None => {
                index.insert(item.link.clone(), kept.len());
                kept.push(item);
            }
        }
    }

    let mut dated: Vec<_> = kept
        .into_iter()
        .map(|item| (parse_pub_date(&item.pub_date), item))
        .collect();
    dated.sort_by(|(a, _), (b, _)| match (a, b) {
        (Some(a), Some(b)) => b.cmp(a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    let out: Vec<Item> = dated.into_iter().map(|(_, item)| item).collect();
    debug!(output = out.len(), dropped_linkless, "Deduplicated items");
    out
}

/// Deduplicate, then keep the `max` most recent
pub fn dedupe_and_cap(items: Vec<Item>, max: usize) -> Vec<Item> {
    let mut out = dedupe(items);
    out.truncate(max);
    out
}
