use crate::models::Item;
use crate::utils::truncate_chars;
use tracing::debug;

/// Placeholder image keyed by a short slice of the title (or the source name)
pub fn placeholder_image(item: &Item, base: &str, title_chars: usize) -> String {
    let label = [item.title.trim(), item.source.trim()]
        .into_iter()
        .find(|s| !s.is_empty())
        .unwrap_or("News");
    let label = truncate_chars(label, title_chars);
    format!("{}?text={}", base, urlencoding::encode(label.trim()))
}

/// Make sure every item has an image and a body.
///
/// Missing images get a placeholder; a missing body falls back to the
/// description, then the title, then the link. Never drops an item.
pub fn apply_fallbacks(items: &mut [Item], placeholder_base: &str, title_chars: usize) {
    let mut images = 0usize;
    let mut bodies = 0usize;

    for item in items.iter_mut() {
        if item.image.is_empty() {
            item.image = placeholder_image(item, placeholder_base, title_chars);
            images += 1;
        }
        if item.body.is_empty() {
            item.body = [&item.description, &item.title, &item.link]
                .into_iter()
                .find(|s| !s.is_empty())
                .cloned()
                .unwrap_or_default();
            bodies += 1;
        }
    }

    debug!(placeholder_images = images, fallback_bodies = bodies, "Applied fallbacks");
}
